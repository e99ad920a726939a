use crate::fonts::FontWeight;

use super::primitive::{Bounds, FontSpec, Point, Primitive};
use super::surface::Canvas;

/// Canvas that records primitives and serializes them as a standalone SVG.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f32,
    height: f32,
    background: String,
    primitives: Vec<Primitive>,
}

impl SvgCanvas {
    pub fn new(width: f32, height: f32, background: &str) -> Self {
        Self {
            width,
            height,
            background: background.to_string(),
            primitives: Vec::new(),
        }
    }

    /// Change the reported size. Callers redraw through the surface afterwards.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn to_svg(&self) -> String {
        let mut body = String::new();
        for primitive in &self.primitives {
            body.push_str(&render_primitive(primitive));
        }

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}"><rect width="100%" height="100%" fill="{bg}" />{body}</svg>"#,
            w = self.width,
            h = self.height,
            bg = escape_xml(&self.background),
            body = body,
        )
    }
}

impl Canvas for SvgCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.primitives.clear();
    }

    fn draw_line(&mut self, from: Point, to: Point, color: &str) {
        self.primitives.push(Primitive::Line {
            from,
            to,
            color: color.to_string(),
        });
    }

    fn fill_polygon(&mut self, vertices: &[Point], color: &str) {
        self.primitives.push(Primitive::Polygon {
            vertices: vertices.to_vec(),
            color: color.to_string(),
        });
    }

    fn fill_ellipse(&mut self, bounds: Bounds, color: &str) {
        self.primitives.push(Primitive::Ellipse {
            bounds,
            color: color.to_string(),
        });
    }

    fn draw_text(&mut self, position: Point, text: &str, font: &FontSpec, color: &str) {
        self.primitives.push(Primitive::Text {
            position,
            text: text.to_string(),
            font: font.clone(),
            color: color.to_string(),
        });
    }
}

fn render_primitive(primitive: &Primitive) -> String {
    let color = escape_xml(primitive.color());
    match primitive {
        Primitive::Line { from, to, .. } => format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1" />"#,
            from.x, from.y, to.x, to.y, color
        ),
        Primitive::Polygon { vertices, .. } => {
            let points = vertices
                .iter()
                .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(" ");
            format!(r#"<polygon points="{}" fill="{}" stroke="{}" />"#, points, color, color)
        }
        Primitive::Ellipse { bounds, .. } => {
            let center = bounds.center();
            format!(
                r#"<ellipse cx="{:.2}" cy="{:.2}" rx="{:.2}" ry="{:.2}" fill="{}" stroke="{}" />"#,
                center.x,
                center.y,
                bounds.width / 2.0,
                bounds.height / 2.0,
                color,
                color
            )
        }
        Primitive::Text {
            position,
            text,
            font,
            ..
        } => {
            let weight_attr = match font.weight {
                FontWeight::Bold => " font-weight=\"700\"",
                FontWeight::Plain => "",
            };
            format!(
                r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}" fill="{}"{} xml:space="preserve">{}</text>"#,
                position.x,
                position.y,
                escape_xml(&font.family),
                font.size,
                color,
                weight_attr,
                escape_xml(text),
            )
        }
    }
}

/// Escape markup characters and drop code points XML 1.0 cannot carry.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 || matches!(c as u32, 0xFFFE | 0xFFFF) => {}
            _ => escaped.push(c),
        }
    }
    escaped
}
