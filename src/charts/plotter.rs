//! Chart Plotter Module
//! Backend-independent figure model: panels, stacked bars, lines, markers.
//!
//! Builders in `report` fill a [`Figure`]; the renderer turns it into pixels.
//! Geometry (bar stacking, axis ranges, legend entries) lives here so it can
//! be checked without drawing anything.

use crate::charts::palette::ColorMap;
use crate::data::{DivergingMatrix, Matrix};
use plotters::style::RGBColor;
use std::collections::BTreeMap;

/// Share of a category slot covered by its bar groups.
pub const GROUP_WIDTH: f64 = 0.8;
/// Width of an overlay bar drawn on top of the groups.
pub const OVERLAY_WIDTH: f64 = 0.1;
/// Headroom applied to the stacked extremes.
pub const RANGE_PADDING: f64 = 1.1;

/// One coloured series, `values[i]` belonging to category `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, color: RGBColor, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            color,
            values,
        }
    }
}

/// Layers stacked in one bar per category. Non-negative values stack up from
/// zero, negative values stack down.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarGroup {
    pub layers: Vec<Series>,
}

impl BarGroup {
    pub fn new(layers: Vec<Series>) -> Self {
        Self { layers }
    }

    pub fn single(series: Series) -> Self {
        Self {
            layers: vec![series],
        }
    }

    /// One layer per matrix column, categories following the matrix rows.
    pub fn from_matrix(matrix: &Matrix, colors: &ColorMap) -> Self {
        let layers = matrix
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| Series::new(name.clone(), colors.get(name, i), matrix.column(i)))
            .collect();
        Self { layers }
    }

    /// Decrease layers followed by increase layers.
    pub fn diverging(matrix: &DivergingMatrix, colors: &ColorMap) -> Self {
        let mut group = Self::from_matrix(&matrix.decrease, colors);
        group
            .layers
            .extend(Self::from_matrix(&matrix.increase, colors).layers);
        group
    }

    /// `(negative sum, positive sum)` of category `index`.
    pub fn extent(&self, index: usize) -> (f64, f64) {
        self.layers
            .iter()
            .filter_map(|s| s.values.get(index))
            .fold((0.0, 0.0), |(neg, pos), v| {
                if *v < 0.0 {
                    (neg + v, pos)
                } else {
                    (neg, pos + v)
                }
            })
    }
}

/// Line on a secondary y-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TwinLine {
    pub series: Series,
    pub axis_label: String,
}

/// Labelled point on a map panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    /// Side-by-side stacked groups, an optional thin overlay bar and an
    /// optional secondary-axis line.
    Bars {
        groups: Vec<BarGroup>,
        overlay: Option<Series>,
        line: Option<TwinLine>,
    },
    Lines {
        series: Vec<Series>,
    },
    /// `extent = [x_min, x_max, y_min, y_max]`
    Map {
        extent: [f64; 4],
        markers: Vec<Marker>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub body: PanelBody,
}

impl Panel {
    pub fn bars(
        title: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
        groups: Vec<BarGroup>,
    ) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            categories,
            body: PanelBody::Bars {
                groups,
                overlay: None,
                line: None,
            },
        }
    }

    pub fn lines(
        title: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
        series: Vec<Series>,
    ) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            categories,
            body: PanelBody::Lines { series },
        }
    }

    pub fn map(title: impl Into<String>, extent: [f64; 4], markers: Vec<Marker>) -> Self {
        Self {
            title: title.into(),
            y_label: "Latitude".to_string(),
            categories: Vec::new(),
            body: PanelBody::Map { extent, markers },
        }
    }

    /// Single `Total` bar of a diverging horizon matrix.
    pub fn total(y_label: impl Into<String>, matrix: &DivergingMatrix, colors: &ColorMap) -> Self {
        Self::bars(
            "",
            y_label,
            vec!["Total".to_string()],
            vec![BarGroup::diverging(matrix, colors)],
        )
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_overlay(mut self, series: Series) -> Self {
        if let PanelBody::Bars { overlay, .. } = &mut self.body {
            *overlay = Some(series);
        }
        self
    }

    pub fn with_line(mut self, series: Series, axis_label: impl Into<String>) -> Self {
        if let PanelBody::Bars { line, .. } = &mut self.body {
            *line = Some(TwinLine {
                series,
                axis_label: axis_label.into(),
            });
        }
        self
    }

    /// Primary y-axis range.
    ///
    /// Bars use `[min(negative stacks) * 1.1, max(positive stacks) * 1.1]`;
    /// a panel with nothing to show gets a symmetric unit range.
    pub fn y_range(&self) -> (f64, f64) {
        let (lo, hi) = match &self.body {
            PanelBody::Bars { groups, overlay, .. } => {
                let mut lo: f64 = 0.0;
                let mut hi: f64 = 0.0;
                for group in groups {
                    for i in 0..self.categories.len() {
                        let (neg, pos) = group.extent(i);
                        lo = lo.min(neg);
                        hi = hi.max(pos);
                    }
                }
                if let Some(overlay) = overlay {
                    for v in &overlay.values {
                        lo = lo.min(*v);
                        hi = hi.max(*v);
                    }
                }
                (lo * RANGE_PADDING, hi * RANGE_PADDING)
            }
            PanelBody::Lines { series } => {
                let values = series.iter().flat_map(|s| s.values.iter().copied());
                Self::padded(values)
            }
            PanelBody::Map { extent, .. } => return (extent[2], extent[3]),
        };

        if lo == 0.0 && hi == 0.0 {
            (-1.0, 1.0)
        } else {
            (lo, hi)
        }
    }

    /// Secondary y-axis range of the twin line, if any.
    pub fn secondary_range(&self) -> Option<(f64, f64)> {
        match &self.body {
            PanelBody::Bars {
                line: Some(line), ..
            } => {
                let (lo, hi) = Self::padded(line.series.values.iter().copied());
                Some(if lo == 0.0 && hi == 0.0 { (-1.0, 1.0) } else { (lo, hi) })
            }
            _ => None,
        }
    }

    /// Range over `values` that always includes zero.
    fn padded(values: impl Iterator<Item = f64>) -> (f64, f64) {
        let (lo, hi) = values
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        (lo * RANGE_PADDING, hi * RANGE_PADDING)
    }

    /// Rectangles of every bar, in drawing order.
    pub fn bar_rects(&self) -> Vec<BarRect> {
        let PanelBody::Bars {
            groups, overlay, ..
        } = &self.body
        else {
            return Vec::new();
        };

        let mut rects = Vec::new();
        let slot = if groups.is_empty() {
            GROUP_WIDTH
        } else {
            GROUP_WIDTH / groups.len() as f64
        };

        for (g, group) in groups.iter().enumerate() {
            for category in 0..self.categories.len() {
                let x0 = category as f64 - GROUP_WIDTH / 2.0 + g as f64 * slot;
                let mut up = 0.0;
                let mut down = 0.0;
                for layer in &group.layers {
                    let value = layer.values.get(category).copied().unwrap_or(0.0);
                    if value == 0.0 || !value.is_finite() {
                        continue;
                    }
                    let (y0, y1) = if value > 0.0 {
                        up += value;
                        (up - value, up)
                    } else {
                        down += value;
                        (down - value, down)
                    };
                    rects.push(BarRect {
                        x0,
                        x1: x0 + slot,
                        y0,
                        y1,
                        color: layer.color,
                    });
                }
            }
        }

        if let Some(overlay) = overlay {
            for (category, value) in overlay.values.iter().enumerate() {
                if *value == 0.0 || !value.is_finite() {
                    continue;
                }
                let x0 = category as f64 - OVERLAY_WIDTH / 2.0;
                rects.push(BarRect {
                    x0,
                    x1: x0 + OVERLAY_WIDTH,
                    y0: 0.0,
                    y1: *value,
                    color: overlay.color,
                });
            }
        }
        rects
    }
}

/// Axis-aligned bar segment in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub color: RGBColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub kind: LegendKind,
}

/// Grid of panels sharing a title and legend.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Panel>,
    pub columns: usize,
    /// Relative column widths; empty means equal widths.
    pub width_ratios: Vec<u32>,
    /// Pixel size.
    pub size: (u32, u32),
    pub legend_title: Option<String>,
}

impl Figure {
    pub fn new(title: impl Into<String>, panels: Vec<Panel>) -> Self {
        Self {
            title: title.into(),
            panels,
            columns: 1,
            width_ratios: Vec::new(),
            size: (1000, 600),
            legend_title: None,
        }
    }

    /// Horizon total next to its time series (`1:10` columns).
    pub fn total_and_series(title: impl Into<String>, total: Panel, series: Panel) -> Self {
        Self::new(title, vec![total, series]).with_grid(2, vec![1, 10])
    }

    pub fn with_grid(mut self, columns: usize, width_ratios: Vec<u32>) -> Self {
        self.columns = columns.max(1);
        self.width_ratios = width_ratios;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_legend_title(mut self, title: impl Into<String>) -> Self {
        self.legend_title = Some(title.into());
        self
    }

    pub fn rows(&self) -> usize {
        self.panels.len().div_ceil(self.columns.max(1))
    }

    /// Column widths in pixels for a row `width` wide.
    pub fn column_widths(&self, width: u32) -> Vec<u32> {
        let columns = self.columns.max(1);
        let ratios: Vec<u32> = if self.width_ratios.len() == columns {
            self.width_ratios.clone()
        } else {
            vec![1; columns]
        };
        let total: u32 = ratios.iter().sum::<u32>().max(1);
        ratios.iter().map(|r| width * r / total).collect()
    }

    /// Unique labelled series across all panels, sorted by label.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut entries: BTreeMap<String, LegendEntry> = BTreeMap::new();
        let mut add = |series: &Series, kind: LegendKind| {
            if !series.label.is_empty() {
                entries
                    .entry(series.label.clone())
                    .or_insert_with(|| LegendEntry {
                        label: series.label.clone(),
                        color: series.color,
                        kind,
                    });
            }
        };

        for panel in &self.panels {
            match &panel.body {
                PanelBody::Bars {
                    groups,
                    overlay,
                    line,
                } => {
                    for layer in groups.iter().flat_map(|g| &g.layers) {
                        add(layer, LegendKind::Bar);
                    }
                    if let Some(overlay) = overlay {
                        add(overlay, LegendKind::Bar);
                    }
                    if let Some(line) = line {
                        add(&line.series, LegendKind::Line);
                    }
                }
                PanelBody::Lines { series } => {
                    for s in series {
                        add(s, LegendKind::Line);
                    }
                }
                PanelBody::Map { .. } => {}
            }
        }
        entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: RGBColor = RGBColor(255, 0, 0);
    const BLUE: RGBColor = RGBColor(0, 0, 255);

    fn categories(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn mixed_signs_stack_away_from_zero() {
        let group = BarGroup::new(vec![
            Series::new("COA", RED, vec![-2.0, 1.0]),
            Series::new("SPV", BLUE, vec![3.0, -1.0]),
            Series::new("WON", RED, vec![-1.0, 2.0]),
        ]);
        let panel = Panel::bars("", "GW", categories(2), vec![group]);
        let rects = panel.bar_rects();

        let first: Vec<(f64, f64)> = rects
            .iter()
            .filter(|r| r.x0 < 0.0)
            .map(|r| (r.y0, r.y1))
            .collect();
        assert_eq!(first, vec![(0.0, -2.0), (0.0, 3.0), (-2.0, -3.0)]);
        assert_eq!(panel.y_range(), (-3.0 * 1.1, 3.0 * 1.1));
    }

    #[test]
    fn groups_sit_side_by_side() {
        let panel = Panel::bars(
            "",
            "",
            categories(1),
            vec![
                BarGroup::single(Series::new("Low", RED, vec![1.0])),
                BarGroup::single(Series::new("High", BLUE, vec![2.0])),
            ],
        );
        let rects = panel.bar_rects();
        assert_eq!(rects.len(), 2);
        assert!((rects[0].x0 + 0.4).abs() < 1e-9);
        assert!((rects[0].x1 - rects[1].x0).abs() < 1e-9);
        assert!((rects[1].x1 - 0.4).abs() < 1e-9);
    }

    #[test]
    fn overlay_bar_is_thin_and_counts_towards_range() {
        let panel = Panel::bars(
            "",
            "GW",
            categories(1),
            vec![BarGroup::single(Series::new("Built", RED, vec![1.0]))],
        )
        .with_overlay(Series::new("Max", BLUE, vec![4.0]));
        let rects = panel.bar_rects();
        let overlay = rects.last().unwrap();
        assert!((overlay.x1 - overlay.x0 - OVERLAY_WIDTH).abs() < 1e-9);
        assert_eq!(panel.y_range().1, 4.0 * 1.1);
    }

    #[test]
    fn empty_panel_gets_symmetric_range() {
        let panel = Panel::bars("", "", categories(3), vec![BarGroup::default()]);
        assert_eq!(panel.y_range(), (-1.0, 1.0));
        assert!(panel.bar_rects().is_empty());
    }

    #[test]
    fn diverging_group_uses_both_halves() {
        let matrix = DivergingMatrix::clip(&Matrix {
            rows: vec!["2023".into()],
            columns: vec!["COA".into(), "SPV".into()],
            values: vec![vec![-2.0, 5.0]],
        });
        let group = BarGroup::diverging(&matrix, &ColorMap::default());
        assert_eq!(group.layers.len(), 4);
        assert_eq!(group.extent(0), (-2.0, 5.0));
    }

    #[test]
    fn legend_is_unique_and_sorted() {
        let total = Panel::bars(
            "",
            "",
            categories(1),
            vec![BarGroup::new(vec![
                Series::new("SPV", BLUE, vec![1.0]),
                Series::new("COA", RED, vec![-1.0]),
            ])],
        );
        let series = Panel::bars(
            "",
            "",
            categories(1),
            vec![BarGroup::single(Series::new("COA", RED, vec![1.0]))],
        )
        .with_line(Series::new("Intensity", BLUE, vec![0.5]), "kt/PJ");
        let figure = Figure::total_and_series("", total, series);
        let labels: Vec<String> = figure.legend().into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["COA", "Intensity", "SPV"]);
        assert_eq!(figure.legend()[1].kind, LegendKind::Line);
    }

    #[test]
    fn column_widths_follow_ratios() {
        let figure = Figure::new("", Vec::new()).with_grid(4, vec![1, 10, 1, 10]);
        assert_eq!(figure.column_widths(1100), vec![50, 500, 50, 500]);
        let even = Figure::new("", Vec::new()).with_grid(2, Vec::new());
        assert_eq!(even.column_widths(1000), vec![500, 500]);
    }

    #[test]
    fn line_panel_range_includes_zero() {
        let panel = Panel::lines("", "", categories(2), vec![Series::new("a", RED, vec![2.0, 5.0])]);
        assert_eq!(panel.y_range(), (0.0, 5.0 * 1.1));
        assert_eq!(panel.secondary_range(), None);
    }
}
