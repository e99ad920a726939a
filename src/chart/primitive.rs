use serde::Serialize;

use crate::fonts::FontWeight;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `size`×`size` box centered on `center`.
    pub fn centered(center: Point, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[cfg(test)]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub family: String,
    pub weight: FontWeight,
    pub size: f32,
}

/// One draw call for a [`super::Canvas`]. Colors are CSS color strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Line {
        from: Point,
        to: Point,
        color: String,
    },
    Polygon {
        vertices: Vec<Point>,
        color: String,
    },
    Ellipse {
        bounds: Bounds,
        color: String,
    },
    Text {
        position: Point,
        text: String,
        font: FontSpec,
        color: String,
    },
}

impl Primitive {
    pub fn color(&self) -> &str {
        match self {
            Primitive::Line { color, .. }
            | Primitive::Polygon { color, .. }
            | Primitive::Ellipse { color, .. }
            | Primitive::Text { color, .. } => color,
        }
    }

    #[cfg(test)]
    pub fn is_marker(&self) -> bool {
        matches!(self, Primitive::Polygon { .. } | Primitive::Ellipse { .. })
    }

    /// Label text, if this is a text primitive.
    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        match self {
            Primitive::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}
