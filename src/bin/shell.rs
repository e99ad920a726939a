use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use namesurfer::chart::{ChartStyle, GraphSurface, SvgCanvas};
use namesurfer::database::NameDatabase;
use namesurfer::export::{self, OutputFormat};
use namesurfer::fonts::{CosmicTextMeasure, TextMeasure};
use namesurfer::theme::Theme;

const HELP: &str = "\
commands:
  graph NAME     add NAME to the chart (a bare NAME works too)
  clear          remove every name from the chart
  resize W H     change the canvas size
  list           show the names on the chart
  show NAME      print the ranks stored for NAME
  save PATH      write the chart (.svg, .png, .pdf or .json)
  help           this text
  quit           leave";

/// Interactive name chart session over stdin
#[derive(Parser, Debug)]
#[command(name = "namesurfer-shell")]
#[command(version)]
#[command(about = "Build a name popularity chart interactively", long_about = None)]
struct Args {
    /// Name data file
    #[arg(value_name = "DATA", default_value = "data/names-data.txt")]
    data: PathBuf,

    /// Built-in theme name, or a path to a theme file
    #[arg(short, long, value_name = "THEME", default_value = "classic")]
    theme: String,

    /// Initial canvas width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Initial canvas height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,
}

enum Command<'a> {
    Graph(&'a str),
    Clear,
    Resize(f32, f32),
    List,
    Show(&'a str),
    Save(&'a str),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command<'_>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();

    match (head.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("graph", [name]) => Ok(Command::Graph(*name)),
        ("clear", []) => Ok(Command::Clear),
        ("resize", [w, h]) => {
            let w = w.parse::<f32>().map_err(|_| format!("bad width '{}'", w))?;
            let h = h.parse::<f32>().map_err(|_| format!("bad height '{}'", h))?;
            Ok(Command::Resize(w, h))
        }
        ("list", []) => Ok(Command::List),
        ("show", [name]) => Ok(Command::Show(*name)),
        ("save", [path]) => Ok(Command::Save(*path)),
        ("help", []) => Ok(Command::Help),
        ("quit" | "exit", []) => Ok(Command::Quit),
        (_, []) => Ok(Command::Graph(head)),
        _ => Err(format!("unrecognized command: {} (try 'help')", line.trim())),
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let theme = Theme::resolve(&args.theme)?;

    let database = NameDatabase::load_or_empty(&args.data);
    if let Some(err) = database.load_error() {
        eprintln!("{}", err);
    }

    let style = ChartStyle::from_theme(&theme);
    let canvas = SvgCanvas::new(args.width, args.height, &style.background);
    let measure = CosmicTextMeasure::new(&style.font_family)?;
    let mut surface = GraphSurface::new(canvas, measure, style);
    surface.update();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt(&mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line.map_err(|e| format!("Failed to read from stdin: {}", e))?;
        if line.trim().is_empty() {
            prompt(&mut stdout)?;
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(message) = run(command, &database, &mut surface) {
                    eprintln!("{}", message);
                }
            }
            Err(message) => eprintln!("{}", message),
        }
        prompt(&mut stdout)?;
    }

    Ok(())
}

fn run<M: TextMeasure>(
    command: Command<'_>,
    database: &NameDatabase,
    surface: &mut GraphSurface<SvgCanvas, M>,
) -> Result<(), String> {
    match command {
        Command::Graph(name) => {
            let series = database.lookup(name).map_err(|e| e.to_string())?;
            surface.add_entry(series);
            surface.update();
        }
        Command::Clear => {
            surface.clear();
            surface.update();
        }
        Command::Resize(width, height) => {
            surface.canvas_mut().set_size(width, height);
            surface.on_resize();
        }
        Command::List => {
            for (position, entry) in surface.entries().iter().enumerate() {
                println!("{:>2}  {}", position + 1, entry.name());
            }
        }
        Command::Show(name) => {
            let series = database.lookup(name).map_err(|e| e.to_string())?;
            println!("{}", series);
        }
        Command::Save(path) => {
            let path = PathBuf::from(path);
            let svg = surface.canvas().to_svg();
            let bytes = match OutputFormat::from_path(&path)? {
                OutputFormat::Svg => svg.into_bytes(),
                OutputFormat::Png => export::svg_to_png(&svg, 1.0)?,
                OutputFormat::Pdf => export::svg_to_pdf(&svg)?,
                OutputFormat::Json => match surface.last_layout() {
                    Some(layout) => export::layout_to_json(layout)?.into_bytes(),
                    None => return Err("Nothing was laid out".to_string()),
                },
            };
            std::fs::write(&path, bytes)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!("saved {}", path.display());
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> Result<(), String> {
    write!(stdout, "name> ")
        .and_then(|_| stdout.flush())
        .map_err(|e| format!("Failed to write prompt: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_word_graphs_a_name() {
        assert!(matches!(parse_command("Eric"), Ok(Command::Graph("Eric"))));
        assert!(matches!(parse_command("graph mary"), Ok(Command::Graph("mary"))));
    }

    #[test]
    fn resize_needs_two_numbers() {
        assert!(matches!(
            parse_command("resize 640 480"),
            Ok(Command::Resize(w, h)) if w == 640.0 && h == 480.0
        ));
        assert!(parse_command("resize 640").is_err());
        assert!(parse_command("resize wide 480").is_err());
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert!(matches!(parse_command("CLEAR"), Ok(Command::Clear)));
        assert!(matches!(parse_command("exit"), Ok(Command::Quit)));
    }
}
