mod layout;
mod primitive;
mod style;
mod surface;
mod svg;

pub use layout::{ChartLayout, GraphLayout, MarkerShape, SeriesLayout, VISUAL_CYCLE, VisualIndex};
pub use primitive::{Bounds, FontSpec, Point, Primitive};
pub use style::ChartStyle;
pub use surface::{Canvas, GraphSurface};
pub use svg::SvgCanvas;
