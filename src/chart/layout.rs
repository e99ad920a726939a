use crate::fonts::{FontWeight, TextMeasure};
use crate::series::{NDECADES, MAX_RANK, Rank, RankSeries};

use super::primitive::{Bounds, FontSpec, Point, Primitive};
use super::style::ChartStyle;

/// Plain (unranked) labels are drawn at this fraction of the bold size.
const PLAIN_FONT_RATIO: f32 = 0.8;

/// Number of distinct colors before the palette repeats.
pub const VISUAL_CYCLE: usize = 4;

/// Marker drawn on every ranked decade of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Triangle,
    Square,
    Diamond,
    Circle,
}

/// Color and marker assigned to a series by its display-list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualIndex {
    pub color_index: usize,
    pub shape: MarkerShape,
}

impl VisualIndex {
    pub fn for_position(position: usize) -> Self {
        let color_index = position % VISUAL_CYCLE;
        let shape = match color_index {
            0 => MarkerShape::Triangle,
            1 => MarkerShape::Square,
            2 => MarkerShape::Diamond,
            _ => MarkerShape::Circle,
        };
        Self { color_index, shape }
    }
}

/// Geometry of one series on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLayout {
    pub name: String,
    pub visual: VisualIndex,
    pub color: String,
    pub lines: Vec<Primitive>,
    pub markers: Vec<Primitive>,
    pub labels: Vec<Primitive>,
}

impl SeriesLayout {
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.lines
            .iter()
            .chain(self.markers.iter())
            .chain(self.labels.iter())
    }
}

/// Everything drawn for one canvas size and display list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f32,
    pub height: f32,
    pub grid: Vec<Primitive>,
    pub series: Vec<SeriesLayout>,
}

impl ChartLayout {
    /// All primitives in draw order: grid first, then each series in display order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.grid
            .iter()
            .chain(self.series.iter().flat_map(SeriesLayout::primitives))
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives().count()
    }
}

/// Scale factors derived from the canvas size. Rebuilt on every layout pass.
#[derive(Debug, Clone)]
struct Geometry {
    width: f32,
    height: f32,
    margin: f32,
    step_x: f32,
    step_y: f32,
    bold: FontSpec,
    plain: FontSpec,
}

impl Geometry {
    fn new(width: f32, height: f32, style: &ChartStyle) -> Self {
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);
        let margin = style.graph_margin;
        let scale = style.text_scale(width, height);

        Self {
            width,
            height,
            margin,
            step_x: width / NDECADES as f32,
            step_y: (height - margin * 2.0) / MAX_RANK as f32,
            bold: FontSpec {
                family: style.font_family.clone(),
                weight: FontWeight::Bold,
                size: (style.font_size * scale).trunc(),
            },
            plain: FontSpec {
                family: style.font_family.clone(),
                weight: FontWeight::Plain,
                size: (style.font_size * PLAIN_FONT_RATIO * scale).trunc(),
            },
        }
    }

    fn decade_x(&self, decade: usize) -> f32 {
        decade as f32 * self.step_x
    }

    fn rank_y(&self, rank: u16) -> f32 {
        rank as f32 * self.step_y + self.margin
    }

    fn bottom(&self) -> f32 {
        self.height - self.margin
    }

    /// Mapped point of a ranked decade; `None` for unranked ones.
    fn point(&self, decade: usize, rank: Rank) -> Option<Point> {
        match rank {
            Rank::Ranked(r) => Some(Point::new(self.decade_x(decade), self.rank_y(r))),
            Rank::Unranked => None,
        }
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Maps rank series onto canvas coordinates.
pub struct GraphLayout<'a, T: TextMeasure> {
    measure: &'a mut T,
    style: &'a ChartStyle,
}

impl<'a, T: TextMeasure> GraphLayout<'a, T> {
    pub fn new(measure: &'a mut T, style: &'a ChartStyle) -> Self {
        Self { measure, style }
    }

    /// Lay out the grid and every series for a `width`×`height` canvas.
    ///
    /// Series are colored by their index in `series`. Any size is accepted;
    /// empty or negative canvases produce collapsed geometry.
    pub fn layout<S: AsRef<RankSeries>>(
        &mut self,
        width: f32,
        height: f32,
        series: &[S],
    ) -> ChartLayout {
        let geometry = Geometry::new(width, height, self.style);

        let grid = self.layout_grid(&geometry);
        let series = series
            .iter()
            .enumerate()
            .map(|(position, entry)| self.layout_series(&geometry, entry.as_ref(), position))
            .collect();

        let layout = ChartLayout {
            width: geometry.width,
            height: geometry.height,
            grid,
            series,
        };
        log::debug!(
            "laid out {}x{} chart: {} series, {} primitives",
            layout.width,
            layout.height,
            layout.series.len(),
            layout.primitive_count()
        );
        layout
    }

    fn layout_grid(&mut self, g: &Geometry) -> Vec<Primitive> {
        let stroke = &self.style.grid_stroke;
        let mut grid = Vec::with_capacity(2 + NDECADES * 2);

        grid.push(Primitive::Line {
            from: Point::new(0.0, g.bottom()),
            to: Point::new(g.width, g.bottom()),
            color: stroke.clone(),
        });
        grid.push(Primitive::Line {
            from: Point::new(0.0, g.margin),
            to: Point::new(g.width, g.margin),
            color: stroke.clone(),
        });

        for decade in 0..NDECADES {
            let x = g.decade_x(decade);
            grid.push(Primitive::Line {
                from: Point::new(x, 0.0),
                to: Point::new(x, g.height),
                color: stroke.clone(),
            });
            grid.push(Primitive::Text {
                position: Point::new(x + g.step_x / 4.0, g.height - g.margin / 4.0),
                text: RankSeries::decade_year(decade).to_string(),
                font: g.bold.clone(),
                color: self.style.axis_text.clone(),
            });
        }

        grid
    }

    fn layout_series(&mut self, g: &Geometry, series: &RankSeries, position: usize) -> SeriesLayout {
        let visual = VisualIndex::for_position(position);
        let color = self.style.series_colors[visual.color_index].clone();
        let ranks = series.ranks();

        let mut lines = Vec::new();
        for decade in 0..NDECADES - 1 {
            if let (Some(from), Some(to)) = (
                g.point(decade, ranks[decade]),
                g.point(decade + 1, ranks[decade + 1]),
            ) {
                lines.push(Primitive::Line {
                    from,
                    to,
                    color: color.clone(),
                });
            }
        }

        let markers = (0..NDECADES)
            .filter_map(|decade| g.point(decade, ranks[decade]))
            .map(|point| self.marker(visual.shape, point, &color))
            .collect();

        let labels = (0..NDECADES)
            .map(|decade| self.label(g, series, decade, visual, &color))
            .collect();

        SeriesLayout {
            name: series.name().to_string(),
            visual,
            color,
            lines,
            markers,
            labels,
        }
    }

    fn label(
        &mut self,
        g: &Geometry,
        series: &RankSeries,
        decade: usize,
        visual: VisualIndex,
        color: &str,
    ) -> Primitive {
        let rank = series.rank(decade);
        let x = g.decade_x(decade);

        let (text, font, y) = match rank {
            Rank::Unranked => {
                let text = format!("{}*", series.name());
                let metrics = self
                    .measure
                    .measure_text(&text, g.plain.size, FontWeight::Plain);
                // Stack by display position so coincident unranked labels separate.
                let y = g.bottom() - metrics.ascent * visual.color_index as f32 - metrics.descent;
                (text, g.plain.clone(), y)
            }
            Rank::Ranked(r) => {
                let text = format!("{} ", series.name());
                let metrics = self
                    .measure
                    .measure_text(&text, g.bold.size, FontWeight::Bold);
                // Put the label on the side of the point the next segment leaves empty.
                let improving = decade + 1 < NDECADES && series.rank(decade + 1).raw() < r;
                let y = if improving {
                    g.rank_y(r) + metrics.ascent
                } else {
                    g.rank_y(r) - metrics.descent
                };
                (text, g.bold.clone(), y)
            }
        };

        Primitive::Text {
            position: Point::new(x, y),
            text,
            font,
            color: color.to_string(),
        }
    }

    fn marker(&self, shape: MarkerShape, center: Point, color: &str) -> Primitive {
        let d = self.style.point_diameter;
        let reach = d * 2.0 / 3.0;
        let Point { x, y } = center;

        match shape {
            MarkerShape::Triangle => Primitive::Polygon {
                vertices: vec![
                    Point::new(x - reach, y),
                    Point::new(x, y - reach),
                    Point::new(x + reach, y),
                ],
                color: color.to_string(),
            },
            MarkerShape::Diamond => Primitive::Polygon {
                vertices: vec![
                    Point::new(x - reach, y),
                    Point::new(x, y - reach),
                    Point::new(x + reach, y),
                    Point::new(x, y + reach),
                ],
                color: color.to_string(),
            },
            MarkerShape::Square => {
                let b = Bounds::centered(center, d);
                Primitive::Polygon {
                    vertices: vec![
                        Point::new(b.x, b.y),
                        Point::new(b.x + b.width, b.y),
                        Point::new(b.x + b.width, b.y + b.height),
                        Point::new(b.x, b.y + b.height),
                    ],
                    color: color.to_string(),
                }
            }
            MarkerShape::Circle => Primitive::Ellipse {
                bounds: Bounds::centered(center, d),
                color: color.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::RatioMeasure;
    use proptest::prelude::*;

    fn series(line: &str) -> RankSeries {
        line.parse().unwrap()
    }

    fn layout_of(width: f32, height: f32, list: &[RankSeries]) -> ChartLayout {
        let style = ChartStyle::default();
        let mut measure = RatioMeasure::default();
        GraphLayout::new(&mut measure, &style).layout(width, height, list)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn visual_index_cycles_every_four_positions() {
        for k in 0..12 {
            assert_eq!(
                VisualIndex::for_position(k),
                VisualIndex::for_position(k + VISUAL_CYCLE)
            );
        }
        assert_eq!(VisualIndex::for_position(0).shape, MarkerShape::Triangle);
        assert_eq!(VisualIndex::for_position(1).shape, MarkerShape::Square);
        assert_eq!(VisualIndex::for_position(2).shape, MarkerShape::Diamond);
        assert_eq!(VisualIndex::for_position(3).shape, MarkerShape::Circle);
        assert_eq!(VisualIndex::for_position(6).shape, MarkerShape::Diamond);
        assert_eq!(VisualIndex::for_position(7).shape, MarkerShape::Circle);
    }

    #[test]
    fn grid_has_margins_decade_lines_and_labels() {
        let layout = layout_of(500.0, 300.0, &[]);
        let lines: Vec<_> = layout
            .grid
            .iter()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .collect();
        let labels: Vec<_> = layout.grid.iter().filter_map(Primitive::text).collect();

        assert_eq!(lines.len(), 2 + NDECADES);
        assert_eq!(labels.first(), Some(&"1900"));
        assert_eq!(labels.last(), Some(&"1990"));
        assert_eq!(
            layout.grid[0],
            Primitive::Line {
                from: Point::new(0.0, 280.0),
                to: Point::new(500.0, 280.0),
                color: "#000000".to_string(),
            }
        );
        match &layout.grid[4] {
            Primitive::Line { from, to, .. } => {
                assert_eq!(*from, Point::new(50.0, 0.0));
                assert_eq!(*to, Point::new(50.0, 300.0));
            }
            other => panic!("expected second decade line, got {other:?}"),
        }
    }

    #[test]
    fn decade_label_sits_a_quarter_step_right_of_its_line() {
        let layout = layout_of(500.0, 300.0, &[]);
        match &layout.grid[3] {
            Primitive::Text { position, text, font, .. } => {
                assert_eq!(text, "1900");
                assert_eq!(*position, Point::new(12.5, 295.0));
                assert_eq!(font.weight, FontWeight::Bold);
            }
            other => panic!("expected decade label, got {other:?}"),
        }
    }

    #[test]
    fn ranked_points_map_linearly_between_margins() {
        let layout = layout_of(
            1000.0,
            1040.0,
            &[series("ann 1 1000 500 0 0 0 0 0 0 0")],
        );
        let ann = &layout.series[0];
        // step_y = (1040 - 40) / 1000 = 1
        assert_eq!(
            ann.lines[0],
            Primitive::Line {
                from: Point::new(0.0, 21.0),
                to: Point::new(100.0, 1020.0),
                color: "#0000ff".to_string(),
            }
        );
        assert_eq!(
            ann.lines[1],
            Primitive::Line {
                from: Point::new(100.0, 1020.0),
                to: Point::new(200.0, 520.0),
                color: "#0000ff".to_string(),
            }
        );
    }

    #[test]
    fn unranked_decades_get_no_marker_or_line() {
        let layout = layout_of(500.0, 300.0, &[series("bob 0 5 0 7 8 0 0 9 0 0")]);
        let bob = &layout.series[0];

        // only 3-4 is a ranked pair
        assert_eq!(bob.lines.len(), 1);
        assert_eq!(bob.markers.len(), 4);
        assert!(bob.markers.iter().all(Primitive::is_marker));

        let unranked_xs: Vec<f32> = [0usize, 2, 5, 6, 8, 9]
            .iter()
            .map(|d| *d as f32 * 50.0)
            .collect();
        for line in &bob.lines {
            if let Primitive::Line { from, to, .. } = line {
                assert!(!unranked_xs.contains(&from.x));
                assert!(!unranked_xs.contains(&to.x));
            }
        }
        for marker in &bob.markers {
            let center = match marker {
                Primitive::Ellipse { bounds, .. } => bounds.center(),
                Primitive::Polygon { vertices, .. } => {
                    Point::new(vertices[1].x, vertices[0].y)
                }
                other => panic!("unexpected marker {other:?}"),
            };
            assert!(!unranked_xs.iter().any(|x| close(*x, center.x)));
        }
    }

    #[test]
    fn ranked_label_moves_below_point_when_rank_improves() {
        let mut measure = RatioMeasure::default();
        let layout = layout_of(800.0, 600.0, &[series("cy 10 5 5 900 0 0 0 0 0 3")]);
        let cy = &layout.series[0];
        let bold = 14.0;
        let ascent = measure.measure_text("cy ", bold, FontWeight::Bold).ascent;
        let descent = measure.measure_text("cy ", bold, FontWeight::Bold).descent;
        let step_y = 560.0 / 1000.0;

        let y_of = |i: usize| match &cy.labels[i] {
            Primitive::Text { position, .. } => position.y,
            other => panic!("expected label, got {other:?}"),
        };

        // 10 -> 5 improves
        assert!(close(y_of(0), 10.0 * step_y + 20.0 + ascent));
        // 5 -> 5 does not
        assert!(close(y_of(1), 5.0 * step_y + 20.0 - descent));
        // 900 -> unranked counts as improving, matching on-disk comparison
        assert!(close(y_of(3), 900.0 * step_y + 20.0 + ascent));
        // final decade always nudges down by descent
        assert!(close(y_of(9), 3.0 * step_y + 20.0 - descent));
    }

    #[test]
    fn unranked_labels_stack_by_display_position() {
        let list = [
            series("a 0 0 0 0 0 0 0 0 0 0"),
            series("b 0 0 0 0 0 0 0 0 0 0"),
            series("c 0 0 0 0 0 0 0 0 0 0"),
        ];
        let layout = layout_of(800.0, 600.0, &list);
        let plain = 14.0 * 0.8_f32;
        let plain = plain.trunc();
        let ascent = plain * 0.8;
        let descent = plain * 0.2;

        for (k, s) in layout.series.iter().enumerate() {
            match &s.labels[4] {
                Primitive::Text {
                    position,
                    text,
                    font,
                    ..
                } => {
                    assert_eq!(text, &format!("{}*", s.name));
                    assert_eq!(font.weight, FontWeight::Plain);
                    assert!(close(position.y, 580.0 - ascent * k as f32 - descent));
                }
                other => panic!("expected label, got {other:?}"),
            }
        }
    }

    #[test]
    fn colors_repeat_after_four_series() {
        let list: Vec<RankSeries> = (0..8)
            .map(|i| series(&format!("n{i} 1 2 3 4 5 6 7 8 9 10")))
            .collect();
        let layout = layout_of(500.0, 300.0, &list);

        for k in 0..4 {
            assert_eq!(layout.series[k].color, layout.series[k + 4].color);
            assert_ne!(layout.series[k].color, layout.series[(k + 1) % 4].color);
        }
        assert!(layout.series[0].markers.iter().all(|m| m.color() == "#0000ff"));
        assert!(layout.series[5].labels.iter().all(|m| m.color() == "#ff0000"));
    }

    #[test]
    fn circle_and_square_markers_are_centered_boxes() {
        let list = [
            series("a 1 0 0 0 0 0 0 0 0 0"),
            series("b 500 0 0 0 0 0 0 0 0 0"),
            series("c 1 0 0 0 0 0 0 0 0 0"),
            series("d 1000 0 0 0 0 0 0 0 0 0"),
        ];
        let layout = layout_of(1000.0, 1040.0, &list);

        match &layout.series[3].markers[0] {
            Primitive::Ellipse { bounds, .. } => {
                assert_eq!(*bounds, Bounds::new(-3.0, 1017.0, 6.0, 6.0));
            }
            other => panic!("expected circle, got {other:?}"),
        }
        match &layout.series[1].markers[0] {
            Primitive::Polygon { vertices, .. } => {
                assert_eq!(vertices.len(), 4);
                assert!(
                    vertices
                        .iter()
                        .all(|v| Bounds::new(-3.0, 517.0, 6.0, 6.0).contains(*v))
                );
            }
            other => panic!("expected square, got {other:?}"),
        }
        match &layout.series[0].markers[0] {
            Primitive::Polygon { vertices, .. } => assert_eq!(vertices.len(), 3),
            other => panic!("expected triangle, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_canvas_does_not_panic() {
        let list = [series("eric 1 2 3 0 0 0 0 0 0 0")];
        for (w, h) in [(0.0, 0.0), (1.0, 10.0), (-5.0, f32::NAN), (f32::INFINITY, 3.0)] {
            let layout = layout_of(w, h, &list);
            assert_eq!(layout.series[0].labels.len(), NDECADES);
            assert!(layout.width >= 0.0 && layout.height >= 0.0);
        }
    }

    proptest! {
        #[test]
        fn layout_is_deterministic(
            width in 0.0f32..2000.0,
            height in 0.0f32..2000.0,
            rows in proptest::collection::vec(proptest::array::uniform10(0u16..=1000), 0..6),
        ) {
            let list: Vec<RankSeries> = rows
                .iter()
                .enumerate()
                .map(|(i, ranks)| {
                    let ranks = (*ranks).map(|r| Rank::from_raw(r as i64).unwrap());
                    RankSeries::new(&format!("name{i}"), ranks)
                })
                .collect();

            let first = layout_of(width, height, &list);
            let second = layout_of(width, height, &list);
            prop_assert_eq!(&first, &second);

            for s in &first.series {
                let ranked = list
                    .iter()
                    .find(|l| l.name() == s.name)
                    .map(|l| l.ranks().iter().filter(|r| r.is_ranked()).count())
                    .unwrap_or_default();
                prop_assert_eq!(s.markers.len(), ranked);
            }
        }
    }
}
