//! Crime Dashboard Main Application
//! Main window with the filter panel and the tabbed chart viewer.

use crate::charts::StaticChartRenderer;
use crate::data::{Aggregator, FilterSelection, UnifiedTable};
use crate::geo::{ChoroplethLayer, NameMatcher, StateBoundaries};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Export result from background thread
enum ExportResult {
    Complete { dir: PathBuf, files: usize },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    table: Arc<UnifiedTable>,
    boundaries: Option<StateBoundaries>,
    matcher: NameMatcher,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async export
    export_rx: Option<Receiver<ExportResult>>,
    is_exporting: bool,
}

impl DashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        table: Arc<UnifiedTable>,
        boundaries: Option<StateBoundaries>,
        matcher: NameMatcher,
        selection: FilterSelection,
    ) -> Self {
        let control_panel = ControlPanel::new(&table, selection);
        let mut app = Self {
            table,
            boundaries,
            matcher,
            control_panel,
            chart_viewer: ChartViewer::new(),
            export_rx: None,
            is_exporting: false,
        };
        app.refresh();
        app
    }

    /// Recompute the view tables for the current selection. Each tab keeps
    /// its own outcome.
    fn refresh(&mut self) {
        let selection = self.control_panel.selection.clone();
        let views = Aggregator::compute(&self.table, &selection);

        let layer = match (&self.boundaries, &views.state_totals) {
            (Some(boundaries), Ok(totals)) => {
                Some(ChoroplethLayer::join(boundaries, totals, &self.matcher))
            }
            _ => None,
        };

        let errors: Vec<String> = [
            views.state_totals.as_ref().err(),
            views.year_totals.as_ref().err(),
            views.category_totals.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .map(|e| e.to_string())
        .collect();

        if let Some(first) = errors.first() {
            for error in &errors {
                log::error!("Aggregation failed: {}", error);
            }
            self.control_panel.set_status(&format!("Error: {}", first));
        } else if let Ok(totals) = &views.state_totals {
            self.control_panel.set_status(&format!(
                "{} states, {} total cases",
                totals.len(),
                totals.iter().map(|t| t.count).sum::<i64>()
            ));
        }

        self.control_panel.export_enabled = true;
        self.chart_viewer.set_views(selection, views, layer);
    }

    /// Handle chart export - pick a folder and render off the UI thread
    fn handle_export_charts(&mut self) {
        if self.is_exporting {
            return;
        }

        let (Some(selection), Some(result)) = (
            self.chart_viewer.selection().cloned(),
            self.chart_viewer.export_result(),
        ) else {
            self.control_panel.set_status("No charts to export");
            return;
        };
        let layer = self.chart_viewer.layer().cloned();

        // User cancelled
        let Some(dir) = rfd::FileDialog::new()
            .set_title("Export charts to folder")
            .pick_folder()
        else {
            return;
        };

        let (tx, rx) = channel();
        self.export_rx = Some(rx);
        self.is_exporting = true;
        self.control_panel.set_status("Rendering charts...");

        thread::spawn(move || {
            let message = match StaticChartRenderer::export_dashboard(
                &dir,
                &selection,
                &result,
                layer.as_ref(),
            ) {
                Ok(files) => ExportResult::Complete {
                    dir,
                    files: files.len(),
                },
                Err(e) => ExportResult::Error(e.to_string()),
            };
            let _ = tx.send(message);
        });
    }

    /// Check for export results
    fn check_export_results(&mut self) {
        let Some(rx) = self.export_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(ExportResult::Complete { dir, files }) => {
                self.control_panel
                    .set_status(&format!("Exported {} files to {}", files, dir.display()));
                if let Err(e) = open::that(&dir) {
                    log::warn!("Could not open {}: {}", dir.display(), e);
                }
                self.is_exporting = false;
            }
            Ok(ExportResult::Error(error)) => {
                log::error!("Export failed: {}", error);
                self.control_panel.set_status(&format!("Error: {}", error));
                self.is_exporting = false;
            }
            Err(TryRecvError::Empty) => self.export_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.control_panel.set_status("Error: export worker stopped");
                self.is_exporting = false;
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_export_results();

        if self.is_exporting {
            ctx.request_repaint();
        }

        // Left panel - Filters
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::SelectionChanged => self.refresh(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("Data Source: National Crime Records Bureau (NCRB)")
                        .size(11.0)
                        .color(egui::Color32::GRAY),
                );
            });
        });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
