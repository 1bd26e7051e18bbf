//! Chart Plotter Module
//! Draws the map, trend and category charts with egui_plot.

use crate::charts::scale;
use crate::data::{CategoryTotal, CrimeType, StateTotal, YearTotal};
use crate::geo::ChoroplethLayer;
use egui::{Color32, RichText, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

const CHART_HEIGHT: f32 = 600.0;

pub fn color(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Interactive dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw state polygons shaded by their joined counts.
    pub fn draw_choropleth(ui: &mut egui::Ui, layer: &ChoroplethLayer, crime: CrimeType) {
        let outline = Stroke::new(0.8, Color32::from_gray(90));

        Plot::new(format!("choropleth_{}", crime.slug()))
            .height(CHART_HEIGHT - 60.0)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_scroll(false)
            .label_formatter(|name, _value| name.to_string())
            .show(ui, |plot_ui| {
                for region in &layer.regions {
                    let fill = color(scale::region_fill(region.intensity));
                    let name = match region.count {
                        Some(count) => format!("{}: {}", region.name, count),
                        None => format!("{}: no data", region.name),
                    };

                    for ring in &region.rings {
                        let points: PlotPoints = ring.iter().copied().collect();
                        plot_ui.polygon(
                            Polygon::new(points)
                                .fill_color(fill)
                                .stroke(outline)
                                .name(&name),
                        );
                    }
                }
            });

        Self::draw_color_legend(ui, layer.max_count);
    }

    /// Horizontal Reds gradient from 0 to `max_count`.
    pub fn draw_color_legend(ui: &mut egui::Ui, max_count: i64) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("0").size(11.0));
            let steps = 24;
            let (rect, _) = ui.allocate_exact_size(egui::vec2(240.0, 14.0), egui::Sense::hover());
            let step_width = rect.width() / steps as f32;
            for i in 0..steps {
                let t = i as f64 / (steps - 1) as f64;
                let x = rect.left() + i as f32 * step_width;
                let cell = egui::Rect::from_min_size(
                    egui::pos2(x, rect.top()),
                    egui::vec2(step_width + 0.5, rect.height()),
                );
                ui.painter().rect_filled(cell, 0.0, color(scale::reds(t)));
            }
            ui.label(RichText::new(max_count.to_string()).size(11.0));
            ui.add_space(16.0);

            let (swatch, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
            ui.painter().rect_filled(swatch, 2.0, color(scale::NO_DATA));
            ui.label(RichText::new("No data").size(11.0));
        });
    }

    /// Line with markers, one point per year.
    pub fn draw_trend_chart(ui: &mut egui::Ui, totals: &[YearTotal], crime: CrimeType) {
        let line_color = color(scale::TREND);
        let points: Vec<[f64; 2]> = totals
            .iter()
            .map(|t| [t.year as f64, t.count as f64])
            .collect();

        Plot::new(format!("trend_{}", crime.slug()))
            .height(CHART_HEIGHT)
            .x_axis_label("Year")
            .y_axis_label(format!("{} cases", crime.label()))
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_formatter(|mark, _range| {
                // Only whole years carry a label.
                if mark.value.fract() == 0.0 {
                    format!("{}", mark.value as i32)
                } else {
                    String::new()
                }
            })
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(line_color)
                        .width(2.0)
                        .name(crime.label()),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(4.0)
                        .color(line_color),
                );
            });
    }

    /// One colored bar per crime category.
    pub fn draw_category_chart(ui: &mut egui::Ui, totals: &[CategoryTotal]) {
        let labels: Vec<String> = totals.iter().map(|t| t.label().to_string()).collect();

        let bars: Vec<Bar> = totals
            .iter()
            .enumerate()
            .map(|(i, total)| {
                Bar::new(i as f64, total.count as f64)
                    .name(total.label())
                    .fill(color(scale::palette(i)))
                    .width(0.7)
            })
            .collect();

        Plot::new("category_totals")
            .height(CHART_HEIGHT)
            .x_axis_label("Category")
            .y_axis_label("Count")
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Ranked state totals; also the map fallback without boundaries.
    pub fn draw_state_table(ui: &mut egui::Ui, totals: &[StateTotal], crime: CrimeType) {
        let mut ranked: Vec<&StateTotal> = totals.iter().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.state.cmp(&b.state)));

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("state_table_{}", crime.slug())))
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("#").strong().size(12.0));
                        ui.label(RichText::new("State/UT").strong().size(12.0));
                        ui.label(RichText::new(crime.label()).strong().size(12.0));
                        ui.end_row();

                        for (rank, total) in ranked.iter().enumerate() {
                            ui.label(RichText::new((rank + 1).to_string()).size(12.0));
                            ui.label(RichText::new(&total.state).size(12.0));
                            ui.label(RichText::new(total.count.to_string()).size(12.0));
                            ui.end_row();
                        }
                    });
            });
    }
}
