//! Static Chart Renderer
//! Renders the dashboard charts to PNG with plotters, for export without a
//! window.
//!
//! Layout per image:
//! 1. Caption with crime type and year
//! 2. Chart body (map polygons, trend line or category bars)

use crate::charts::scale;
use crate::data::{AggregationResult, CrimeType, FilterSelection, StateTotal, YearTotal};
use crate::geo::ChoroplethLayer;
use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAP_FILE: &str = "map.png";
pub const STATES_FILE: &str = "states.png";
pub const TREND_FILE: &str = "trend.png";
pub const CATEGORIES_FILE: &str = "categories.png";
pub const AGGREGATES_FILE: &str = "aggregates.json";

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 1000;
const CAPTION_FONT: (&str, u32) = ("sans-serif", 30);
const LABEL_FONT: (&str, u32) = ("sans-serif", 16);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Nothing to draw: {0}")]
    Empty(&'static str),
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    selection: &'a FilterSelection,
    #[serde(flatten)]
    result: &'a AggregationResult,
    unmatched_states: &'a [String],
}

/// Renders dashboard charts into RGB images.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write every chart plus `aggregates.json` into `dir`.
    ///
    /// Without a choropleth layer the map is replaced by a bar chart of the
    /// state totals.
    pub fn export_dashboard(
        dir: &Path,
        selection: &FilterSelection,
        result: &AggregationResult,
        layer: Option<&ChoroplethLayer>,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let map_title = format!(
            "{} Cases Distribution ({})",
            selection.crime_type, selection.year
        );
        match layer {
            Some(layer) if layer.bounds().is_some() => {
                let path = dir.join(MAP_FILE);
                Self::render_choropleth(layer, &map_title)?.save(&path)?;
                written.push(path);
            }
            _ if !result.state_totals.is_empty() => {
                let path = dir.join(STATES_FILE);
                Self::render_state_bars(&result.state_totals, &map_title)?.save(&path)?;
                written.push(path);
            }
            _ => log::warn!("No state totals for {}, skipping map", map_title),
        }

        if !result.year_totals.is_empty() {
            let path = dir.join(TREND_FILE);
            Self::render_trend(&result.year_totals, selection.crime_type)?.save(&path)?;
            written.push(path);
        }

        if !result.category_totals.is_empty() {
            let path = dir.join(CATEGORIES_FILE);
            let labels: Vec<String> = result
                .category_totals
                .iter()
                .map(|t| t.label().to_string())
                .collect();
            let values: Vec<i64> = result.category_totals.iter().map(|t| t.count).collect();
            let colors: Vec<[u8; 3]> = (0..values.len()).map(scale::palette).collect();
            Self::render_bars("Crime Categories Distribution", &labels, &values, &colors)?
                .save(&path)?;
            written.push(path);
        }

        let path = dir.join(AGGREGATES_FILE);
        let document = ExportDocument {
            selection,
            result,
            unmatched_states: layer.map(|l| l.unmatched.as_slice()).unwrap_or(&[]),
        };
        serde_json::to_writer_pretty(BufWriter::new(File::create(&path)?), &document)?;
        written.push(path);

        log::info!("Exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Line chart of yearly totals.
    pub fn render_trend(totals: &[YearTotal], crime: CrimeType) -> Result<RgbImage, RenderError> {
        let (first, last) = match (totals.first(), totals.last()) {
            (Some(first), Some(last)) => (first.year, last.year),
            _ => return Err(RenderError::Empty("year totals")),
        };
        let max = totals.iter().map(|t| t.count).max().unwrap_or(0);
        let title = format!("{} Cases Trend Over Time", crime);

        Self::render(WIDTH, HEIGHT, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(&title, CAPTION_FONT)
                .margin(24)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .build_cartesian_2d(first..(last + 1), 0i64..scale::nice_upper_bound(max))
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .x_desc("Year")
                .y_desc(format!("{} cases", crime))
                .x_labels(((last - first) as usize + 2).min(20))
                .x_label_formatter(&|year: &i32| year.to_string())
                .label_style(LABEL_FONT)
                .draw()
                .map_err(drawing)?;

            let color = rgb(scale::TREND);
            chart
                .draw_series(LineSeries::new(
                    totals.iter().map(|t| (t.year, t.count)),
                    color.stroke_width(3),
                ))
                .map_err(drawing)?;
            chart
                .draw_series(
                    totals
                        .iter()
                        .map(|t| Circle::new((t.year, t.count), 5, color.filled())),
                )
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// Per-state totals as bars, largest first.
    pub fn render_state_bars(totals: &[StateTotal], title: &str) -> Result<RgbImage, RenderError> {
        let mut ranked: Vec<&StateTotal> = totals.iter().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.state.cmp(&b.state)));

        let labels: Vec<String> = ranked.iter().map(|t| t.state.clone()).collect();
        let values: Vec<i64> = ranked.iter().map(|t| t.count).collect();
        let colors = [scale::TREND];
        Self::render_bars(title, &labels, &values, &colors)
    }

    /// Vertical bar chart with rotated category labels.
    pub fn render_bars(
        title: &str,
        labels: &[String],
        values: &[i64],
        colors: &[[u8; 3]],
    ) -> Result<RgbImage, RenderError> {
        if values.is_empty() || colors.is_empty() {
            return Err(RenderError::Empty("bar values"));
        }
        let max = values.iter().copied().max().unwrap_or(0);

        Self::render(WIDTH, HEIGHT, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, CAPTION_FONT)
                .margin(24)
                .x_label_area_size(260)
                .y_label_area_size(90)
                .build_cartesian_2d(
                    (0..values.len()).into_segmented(),
                    0i64..scale::nice_upper_bound(max),
                )
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(values.len())
                .x_label_formatter(&|value: &SegmentValue<usize>| match value {
                    SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                    _ => String::new(),
                })
                .x_label_style(
                    ("sans-serif", 16)
                        .into_font()
                        .transform(FontTransform::Rotate90),
                )
                .y_desc("Count")
                .label_style(LABEL_FONT)
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(values.iter().enumerate().map(|(i, &value)| {
                    let style = rgb(colors[i % colors.len()]).filled();
                    let mut bar = Rectangle::new(
                        [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), value)],
                        style,
                    );
                    bar.set_margin(0, 0, 6, 6);
                    bar
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// State polygons filled on the Reds scale.
    pub fn render_choropleth(
        layer: &ChoroplethLayer,
        title: &str,
    ) -> Result<RgbImage, RenderError> {
        let bounds = layer.bounds().ok_or(RenderError::Empty("boundaries"))?;

        // Keep degrees square so the country is not stretched.
        let span_x = (bounds.max_x - bounds.min_x).max(f64::EPSILON);
        let span_y = (bounds.max_y - bounds.min_y).max(f64::EPSILON);
        let height = HEIGHT;
        let width = ((height as f64 - 80.0) * span_x / span_y + 40.0).clamp(400.0, 2000.0) as u32;

        Self::render(width, height, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, CAPTION_FONT)
                .margin(20)
                .build_cartesian_2d(bounds.min_x..bounds.max_x, bounds.min_y..bounds.max_y)
                .map_err(drawing)?;

            let outline = RGBColor(90, 90, 90);
            for region in &layer.regions {
                let fill = rgb(scale::region_fill(region.intensity));
                for ring in &region.rings {
                    let points: Vec<(f64, f64)> = ring.iter().map(|p| (p[0], p[1])).collect();
                    chart
                        .draw_series(std::iter::once(Polygon::new(points.clone(), fill.filled())))
                        .map_err(drawing)?;
                    chart
                        .draw_series(std::iter::once(PathElement::new(points, outline)))
                        .map_err(drawing)?;
                }
            }
            Ok(())
        })
    }

    /// Run `draw` against an in-memory RGB buffer and wrap it as an image.
    fn render<F>(width: u32, height: u32, draw: F) -> Result<RgbImage, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), RenderError>,
    {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;
            draw(&root)?;
            root.present().map_err(drawing)?;
        }
        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Drawing("image buffer size mismatch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_are_rejected_before_drawing() {
        assert!(matches!(
            StaticChartRenderer::render_trend(&[], CrimeType::Murder),
            Err(RenderError::Empty(_))
        ));
        assert!(matches!(
            StaticChartRenderer::render_bars("empty", &[], &[], &[scale::TREND]),
            Err(RenderError::Empty(_))
        ));
        assert!(matches!(
            StaticChartRenderer::render_choropleth(&ChoroplethLayer::default(), "empty"),
            Err(RenderError::Empty("boundaries"))
        ));
    }

    #[test]
    fn export_skips_charts_for_empty_tables() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let selection = FilterSelection::new(2013, Default::default(), CrimeType::Murder);

        let written = StaticChartRenderer::export_dashboard(
            dir.path(),
            &selection,
            &AggregationResult::default(),
            None,
        )?;
        assert_eq!(written, vec![dir.path().join(AGGREGATES_FILE)]);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(AGGREGATES_FILE))?)?;
        assert_eq!(json["selection"]["year"], 2013);
        assert_eq!(json["category_totals"], serde_json::json!([]));
        Ok(())
    }
}
