//! Static Chart Renderer
//! Draws a [`Figure`] with plotters into an RGB buffer and saves it as PNG.
//!
//! Layout:
//! 1. Title centered at the top
//! 2. Panel grid, columns sized by the figure's width ratios
//! 3. Legend strip below the grid: coloured boxes (bars) or strokes (lines)

use crate::charts::plotter::{
    BarRect, Figure, LegendEntry, LegendKind, Marker, Panel, PanelBody, Series, TwinLine,
};
use image::RgbImage;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

const FONT: &str = "sans-serif";
const LEGEND_ROW_HEIGHT: u32 = 22;
const LEGEND_ENTRY_WIDTH: u32 = 150;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to create output folder: {0}")]
    Io(#[from] std::io::Error),
    #[error("Pixel buffer does not match a {0}x{1} image")]
    Buffer(u32, u32),
}

impl<E> From<DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

type Coords = Cartesian2d<RangedCoordf64, RangedCoordf64>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `figure` and write it to `path` as PNG.
    pub fn render_to_file(figure: &Figure, path: &Path) -> Result<(), RenderError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let img = Self::render_image(figure)?;
        img.save(path)?;
        tracing::debug!(path = %path.display(), "wrote chart image");
        Ok(())
    }

    /// Render `figure` into an in-memory image.
    pub fn render_image(figure: &Figure) -> Result<RgbImage, RenderError> {
        let (width, height) = figure.size;
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw_figure(&root, figure)?;
            root.present()?;
        }
        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer(width, height))
    }

    pub fn draw_figure<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: &Figure,
    ) -> Result<(), RenderError> {
        root.fill(&WHITE)?;
        let body = if figure.title.is_empty() {
            root.clone()
        } else {
            root.titled(&figure.title, (FONT, 22))?
        };

        let legend = figure.legend();
        let (width, height) = body.dim_in_pixel();
        let per_row = (width / LEGEND_ENTRY_WIDTH).max(1) as usize;
        let legend_rows = legend.len().div_ceil(per_row) as u32;
        let title_rows = u32::from(figure.legend_title.is_some());
        let legend_height = if legend.is_empty() {
            0
        } else {
            (legend_rows + title_rows) * LEGEND_ROW_HEIGHT + 10
        };

        let (grid, legend_area) = body.split_vertically(height.saturating_sub(legend_height) as i32);
        Self::draw_grid(&grid, figure)?;
        if !legend.is_empty() {
            Self::draw_legend(&legend_area, &legend, figure.legend_title.as_deref(), per_row)?;
        }
        Ok(())
    }

    fn draw_grid<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        figure: &Figure,
    ) -> Result<(), RenderError> {
        let rows = area.split_evenly((figure.rows().max(1), 1));
        let (width, _) = area.dim_in_pixel();
        let widths = figure.column_widths(width);
        let breakpoints: Vec<i32> = widths
            .iter()
            .take(widths.len().saturating_sub(1))
            .scan(0u32, |acc, w| {
                *acc += w;
                Some(*acc as i32)
            })
            .collect();

        let mut panels = figure.panels.iter();
        for row in &rows {
            let cells = row.split_by_breakpoints(&breakpoints, Vec::<i32>::new());
            for cell in &cells {
                match panels.next() {
                    Some(panel) => Self::draw_panel(cell, panel)?,
                    None => return Ok(()),
                }
            }
        }
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
    ) -> Result<(), RenderError> {
        match &panel.body {
            PanelBody::Bars { line, .. } => Self::draw_bar_panel(area, panel, line.as_ref()),
            PanelBody::Lines { series } => Self::draw_line_panel(area, panel, series),
            PanelBody::Map { extent, markers } => Self::draw_map_panel(area, panel, extent, markers),
        }
    }

    fn x_range(panel: &Panel) -> std::ops::Range<f64> {
        -0.5..(panel.categories.len().max(1) as f64 - 0.5)
    }

    fn category_label(categories: &[String], x: f64) -> String {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        categories
            .get(index as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn draw_bar_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
        line: Option<&TwinLine>,
    ) -> Result<(), RenderError> {
        let (lo, hi) = panel.y_range();
        let mut builder = ChartBuilder::on(area);
        builder
            .margin(8)
            .x_label_area_size(35)
            .y_label_area_size(60);
        if !panel.title.is_empty() {
            builder.caption(&panel.title, (FONT, 16));
        }
        if line.is_some() {
            builder.right_y_label_area_size(60);
        }
        let x_range = Self::x_range(panel);
        let mut chart = builder.build_cartesian_2d(x_range.clone(), lo..hi)?;
        let rects = panel.bar_rects();

        match (line, panel.secondary_range()) {
            (Some(line), Some((slo, shi))) => {
                let mut chart = chart.set_secondary_coord(x_range, slo..shi);
                Self::draw_bars(&mut chart, panel, &rects)?;
                chart
                    .configure_secondary_axes()
                    .y_desc(line.axis_label.as_str())
                    .draw()?;
                let points = line
                    .series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as f64, *v));
                chart.draw_secondary_series(LineSeries::new(
                    points,
                    line.series.color.stroke_width(2),
                ))?;
            }
            _ => Self::draw_bars(&mut chart, panel, &rects)?,
        }
        Ok(())
    }

    fn draw_bars<DB: DrawingBackend>(
        chart: &mut ChartContext<'_, DB, Coords>,
        panel: &Panel,
        rects: &[BarRect],
    ) -> Result<(), RenderError> {
        let categories = &panel.categories;
        let label = |x: &f64| Self::category_label(categories, *x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len().clamp(1, 30))
            .x_label_formatter(&label)
            .y_desc(panel.y_label.as_str())
            .draw()?;

        chart.draw_series(
            rects
                .iter()
                .map(|r| Rectangle::new([(r.x0, r.y0), (r.x1, r.y1)], r.color.filled())),
        )?;
        chart.draw_series(
            rects
                .iter()
                .map(|r| Rectangle::new([(r.x0, r.y0), (r.x1, r.y1)], BLACK.stroke_width(1))),
        )?;

        let x = Self::x_range(panel);
        chart.draw_series(LineSeries::new(
            vec![(x.start, 0.0), (x.end, 0.0)],
            BLACK.stroke_width(1),
        ))?;
        Ok(())
    }

    fn draw_line_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
        series: &[Series],
    ) -> Result<(), RenderError> {
        let (lo, hi) = panel.y_range();
        let mut builder = ChartBuilder::on(area);
        builder
            .margin(8)
            .x_label_area_size(35)
            .y_label_area_size(60);
        if !panel.title.is_empty() {
            builder.caption(&panel.title, (FONT, 16));
        }
        let mut chart = builder.build_cartesian_2d(Self::x_range(panel), lo..hi)?;

        let categories = &panel.categories;
        let label = |x: &f64| Self::category_label(categories, *x);
        chart
            .configure_mesh()
            .x_labels(categories.len().clamp(1, 30))
            .x_label_formatter(&label)
            .y_desc(panel.y_label.as_str())
            .draw()?;

        for s in series {
            let points = s.values.iter().enumerate().map(|(i, v)| (i as f64, *v));
            chart.draw_series(LineSeries::new(points, s.color.stroke_width(2)))?;
        }
        Ok(())
    }

    fn draw_map_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
        extent: &[f64; 4],
        markers: &[Marker],
    ) -> Result<(), RenderError> {
        let mut builder = ChartBuilder::on(area);
        builder
            .margin(8)
            .x_label_area_size(35)
            .y_label_area_size(50);
        if !panel.title.is_empty() {
            builder.caption(&panel.title, (FONT, 16));
        }
        let mut chart = builder.build_cartesian_2d(extent[0]..extent[1], extent[2]..extent[3])?;
        chart
            .configure_mesh()
            .x_desc("Longitude")
            .y_desc(panel.y_label.as_str())
            .draw()?;

        chart.draw_series(markers.iter().map(|m| {
            EmptyElement::at((m.x, m.y))
                + Circle::new((0, 0), 5, m.color.filled())
                + Text::new(m.label.clone(), (7, -7), (FONT, 13).into_font())
        }))?;
        Ok(())
    }

    fn draw_legend<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        entries: &[LegendEntry],
        title: Option<&str>,
        per_row: usize,
    ) -> Result<(), RenderError> {
        let row_height = LEGEND_ROW_HEIGHT as i32;
        let mut top = 5;
        if let Some(title) = title {
            area.draw(&Text::new(title, (10, top), (FONT, 14).into_font()))?;
            top += row_height;
        }

        for (i, entry) in entries.iter().enumerate() {
            let x = 10 + (i % per_row) as i32 * LEGEND_ENTRY_WIDTH as i32;
            let y = top + (i / per_row) as i32 * row_height;
            match entry.kind {
                LegendKind::Bar => {
                    area.draw(&Rectangle::new([(x, y), (x + 14, y + 14)], entry.color.filled()))?;
                    area.draw(&Rectangle::new([(x, y), (x + 14, y + 14)], BLACK.stroke_width(1)))?;
                }
                LegendKind::Line => {
                    area.draw(&PathElement::new(
                        vec![(x, y + 7), (x + 14, y + 7)],
                        entry.color.stroke_width(2),
                    ))?;
                }
            }
            area.draw(&Text::new(
                entry.label.as_str(),
                (x + 20, y),
                (FONT, 13).into_font(),
            ))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::plotter::BarGroup;

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let categories = vec!["2023".to_string(), "2024".to_string()];
        assert_eq!(StaticChartRenderer::category_label(&categories, 1.0), "2024");
        assert_eq!(StaticChartRenderer::category_label(&categories, 0.5), "");
        assert_eq!(StaticChartRenderer::category_label(&categories, -1.0), "");
        assert_eq!(StaticChartRenderer::category_label(&categories, 5.0), "");
    }

    #[test]
    fn x_range_covers_every_category() {
        let panel = Panel::bars("", "", vec!["a".into(), "b".into(), "c".into()], Vec::new());
        assert_eq!(StaticChartRenderer::x_range(&panel), -0.5..2.5);
    }

    fn rendered_size(figure: &Figure) -> (u32, u32) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chart.png");
        StaticChartRenderer::render_to_file(figure, &path).unwrap();
        assert!(path.is_file());
        let image = image::open(&path).unwrap();
        (image.width(), image.height())
    }

    #[test]
    fn renders_bars_with_secondary_line_to_png() {
        let years = vec!["2023".to_string(), "2024".to_string(), "2025".to_string()];
        let panel = Panel::bars(
            "BWA",
            "GW",
            years,
            vec![BarGroup::new(vec![
                Series::new("COA", RGBColor(0, 0, 0), vec![3.0, 2.0, 1.0]),
                Series::new("SPV", RGBColor(255, 165, 0), vec![1.0, 2.5, 4.0]),
            ])],
        )
        .with_line(
            Series::new("Demand", RGBColor(255, 0, 0), vec![10.0, 11.0, 12.5]),
            "TWh",
        );
        let figure = Figure::new("Power Capacity", vec![panel]).with_size(800, 500);
        assert_eq!(rendered_size(&figure), (800, 500));
    }

    #[test]
    fn renders_map_panel_to_png() {
        let markers = vec![
            Marker {
                label: "BWA".into(),
                x: 24.7,
                y: -22.3,
                color: RGBColor(0, 0, 255),
            },
            Marker {
                label: "ZMB".into(),
                x: 27.8,
                y: -13.1,
                color: RGBColor(0, 128, 0),
            },
        ];
        let figure = Figure::new(
            "Transmission",
            vec![Panel::map("Projects", [10.0, 42.0, -35.0, -4.0], markers)],
        )
        .with_size(700, 700);
        assert_eq!(rendered_size(&figure), (700, 700));
    }

    #[test]
    fn in_memory_image_matches_figure_size() {
        let series = Series::new("RENEWABLE", RGBColor(0, 128, 0), vec![40.0, 55.0]);
        let figure = Figure::new(
            "Generation Shares",
            vec![Panel::lines("", "%", vec!["2023".into(), "2024".into()], vec![series])],
        )
        .with_size(640, 480);
        let image = StaticChartRenderer::render_image(&figure).unwrap();
        assert_eq!(image.dimensions(), (640, 480));
    }
}
