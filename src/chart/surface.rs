use std::rc::Rc;

use crate::fonts::TextMeasure;
use crate::series::RankSeries;

use super::layout::{ChartLayout, GraphLayout};
use super::primitive::{Bounds, FontSpec, Point, Primitive};
use super::style::ChartStyle;

/// A passive drawing target that knows its own pixel size.
pub trait Canvas {
    /// Current `(width, height)` in pixels.
    fn size(&self) -> (f32, f32);

    /// Remove everything drawn so far.
    fn clear(&mut self);

    fn draw_line(&mut self, from: Point, to: Point, color: &str);

    fn fill_polygon(&mut self, vertices: &[Point], color: &str);

    fn fill_ellipse(&mut self, bounds: Bounds, color: &str);

    /// `position` is the left end of the text baseline.
    fn draw_text(&mut self, position: Point, text: &str, font: &FontSpec, color: &str);

    fn draw(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Line { from, to, color } => self.draw_line(*from, *to, color),
            Primitive::Polygon { vertices, color } => self.fill_polygon(vertices, color),
            Primitive::Ellipse { bounds, color } => self.fill_ellipse(*bounds, color),
            Primitive::Text {
                position,
                text,
                font,
                color,
            } => self.draw_text(*position, text, font, color),
        }
    }
}

/// Holds the names currently on display and redraws them onto a canvas.
///
/// `add_entry` and `clear` only change the display list; nothing reaches the
/// canvas until `update` (or `on_resize`) runs, which clears the canvas and
/// redraws the grid plus every entry from scratch.
pub struct GraphSurface<C: Canvas, M: TextMeasure> {
    canvas: C,
    measure: M,
    style: ChartStyle,
    entries: Vec<Rc<RankSeries>>,
    last_layout: Option<ChartLayout>,
}

impl<C: Canvas, M: TextMeasure> GraphSurface<C, M> {
    pub fn new(canvas: C, measure: M, style: ChartStyle) -> Self {
        Self {
            canvas,
            measure,
            style,
            entries: Vec::new(),
            last_layout: None,
        }
    }

    /// Append a series to the display list. Duplicates are kept.
    pub fn add_entry(&mut self, entry: Rc<RankSeries>) {
        log::debug!("adding {} at position {}", entry.name(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        log::debug!("clearing {} entries", self.entries.len());
        self.entries.clear();
    }

    /// Rebuild the whole drawing from the display list at the canvas' current size.
    pub fn update(&mut self) {
        let (width, height) = self.canvas.size();
        let layout = GraphLayout::new(&mut self.measure, &self.style).layout(
            width,
            height,
            &self.entries,
        );

        self.canvas.clear();
        for primitive in layout.primitives() {
            self.canvas.draw(primitive);
        }
        self.last_layout = Some(layout);
    }

    /// Call after the host has resized the canvas.
    pub fn on_resize(&mut self) {
        self.update();
    }

    pub fn entries(&self) -> &[Rc<RankSeries>] {
        &self.entries
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    /// Layout used by the most recent `update`, if any.
    pub fn last_layout(&self) -> Option<&ChartLayout> {
        self.last_layout.as_ref()
    }
}
