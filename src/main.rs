use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use namesurfer::chart::{Canvas, ChartStyle, GraphSurface, SvgCanvas};
use namesurfer::database::NameDatabase;
use namesurfer::error::LookupError;
use namesurfer::export::{self, OutputFormat};
use namesurfer::fonts::{CosmicTextMeasure, TextMeasure};
use namesurfer::theme::Theme;

/// Chart baby-name popularity by decade
#[derive(Parser, Debug)]
#[command(name = "namesurfer")]
#[command(version)]
#[command(about = "Render name popularity charts to SVG, PNG, PDF or JSON", long_about = None)]
struct Args {
    /// Name data file: one `name rank1900 ... rank1990` record per line
    #[arg(value_name = "DATA", default_value = "data/names-data.txt")]
    data: PathBuf,

    /// Name to chart (repeatable; order sets color and marker)
    #[arg(short, long = "name", value_name = "NAME")]
    names: Vec<String>,

    /// Output file path (extension determines format: .svg, .png, .pdf or .json)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Built-in theme name, or a path to a theme file (TOML or YAML, native or Alacritty)
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "namesurfer", &mut io::stdout());
        return Ok(());
    }
    let output = args.output.ok_or("Missing --output")?;
    let format = OutputFormat::from_path(&output)?;

    let theme = match args.theme.as_deref() {
        Some(theme) => Theme::resolve(theme)?,
        None => Theme::default(),
    };

    // A missing or malformed source still yields a chart with just the grid.
    let database = NameDatabase::load_or_empty(&args.data);
    if let Some(err) = database.load_error() {
        eprintln!("{}", err);
    }

    let style = ChartStyle::from_theme(&theme);
    let canvas = SvgCanvas::new(args.width, args.height, &style.background);
    let measure = CosmicTextMeasure::new(&style.font_family)?;
    let mut surface = GraphSurface::new(canvas, measure, style);

    for err in add_names(&mut surface, &database, &args.names) {
        eprintln!("{}", err);
    }
    surface.update();

    let svg = surface.canvas().to_svg();
    let bytes = match format {
        OutputFormat::Svg => svg.into_bytes(),
        OutputFormat::Png => export::svg_to_png(&svg, args.png_scale)?,
        OutputFormat::Pdf => export::svg_to_pdf(&svg)?,
        OutputFormat::Json => match surface.last_layout() {
            Some(layout) => export::layout_to_json(layout)?.into_bytes(),
            None => return Err("Nothing was laid out".to_string()),
        },
    };

    std::fs::write(&output, bytes)
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    eprintln!("{:?} saved to: {}", format, output.display());

    Ok(())
}

/// Put every known name on the surface, in order, and return the lookup
/// failures for the rest.
fn add_names<C: Canvas, M: TextMeasure>(
    surface: &mut GraphSurface<C, M>,
    database: &NameDatabase,
    names: &[String],
) -> Vec<LookupError> {
    let mut missing = Vec::new();
    for name in names {
        match database.lookup(name) {
            Ok(series) => surface.add_entry(series),
            Err(err) => missing.push(err),
        }
    }
    missing
}
