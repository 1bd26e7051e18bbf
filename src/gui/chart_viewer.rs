//! Chart Viewer Widget
//! Central panel with the map, trend and category tabs.

use crate::charts::ChartPlotter;
use crate::data::{
    AggregationResult, CategoryTotal, FilterSelection, StateTotal, ViewTables, YearTotal,
};
use crate::geo::ChoroplethLayer;
use egui::{Color32, RichText, ScrollArea};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Map,
    Trend,
    Category,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [
        DashboardTab::Map,
        DashboardTab::Trend,
        DashboardTab::Category,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DashboardTab::Map => "🗺️ Map View",
            DashboardTab::Trend => "📈 Trend Analysis",
            DashboardTab::Category => "📊 Category Analysis",
        }
    }
}

/// Each tab keeps its own outcome so one failing table leaves the others up.
#[derive(Debug, Clone)]
struct TabTables {
    state_totals: Result<Vec<StateTotal>, String>,
    year_totals: Result<Vec<YearTotal>, String>,
    category_totals: Result<Vec<CategoryTotal>, String>,
}

impl From<ViewTables> for TabTables {
    fn from(views: ViewTables) -> Self {
        Self {
            state_totals: views.state_totals.map_err(|e| e.to_string()),
            year_totals: views.year_totals.map_err(|e| e.to_string()),
            category_totals: views.category_totals.map_err(|e| e.to_string()),
        }
    }
}

/// Tabbed chart display for the current aggregation.
#[derive(Default)]
pub struct ChartViewer {
    pub active_tab: DashboardTab,
    selection: Option<FilterSelection>,
    tables: Option<TabTables>,
    layer: Option<ChoroplethLayer>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_views(
        &mut self,
        selection: FilterSelection,
        views: ViewTables,
        layer: Option<ChoroplethLayer>,
    ) {
        self.selection = Some(selection);
        self.tables = Some(views.into());
        self.layer = layer;
    }

    pub fn selection(&self) -> Option<&FilterSelection> {
        self.selection.as_ref()
    }

    pub fn layer(&self) -> Option<&ChoroplethLayer> {
        self.layer.as_ref()
    }

    /// Error shown in place of `tab`'s chart, if its table failed.
    pub fn tab_error(&self, tab: DashboardTab) -> Option<&str> {
        let tables = self.tables.as_ref()?;
        let error = match tab {
            DashboardTab::Map => tables.state_totals.as_ref().err(),
            DashboardTab::Trend => tables.year_totals.as_ref().err(),
            DashboardTab::Category => tables.category_totals.as_ref().err(),
        };
        error.map(String::as_str)
    }

    /// The tables that succeeded, for export. Failed ones are empty.
    pub fn export_result(&self) -> Option<AggregationResult> {
        let tables = self.tables.as_ref()?;
        Some(AggregationResult {
            state_totals: tables.state_totals.clone().unwrap_or_default(),
            year_totals: tables.year_totals.clone().unwrap_or_default(),
            category_totals: tables.category_totals.clone().unwrap_or_default(),
        })
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ui.heading(
            RichText::new("India Crime Analytics Dashboard")
                .size(26.0)
                .strong(),
        );
        ui.label(RichText::new("Interactive Crime Analysis Across India").size(15.0));
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for tab in DashboardTab::ALL {
                ui.selectable_value(
                    &mut self.active_tab,
                    tab,
                    RichText::new(tab.title()).size(15.0),
                );
            }
        });
        ui.separator();

        let (Some(selection), Some(tables)) = (&self.selection, &self.tables) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            let crime = selection.crime_type;
            match self.active_tab {
                DashboardTab::Map => {
                    ui.heading(format!("{} Distribution Map", crime));
                    ui.label(format!(
                        "{} Cases Distribution ({}, {})",
                        crime, selection.year, selection.state
                    ));
                    ui.add_space(6.0);

                    let state_totals = match &tables.state_totals {
                        Ok(totals) => totals,
                        Err(error) => return show_error(ui, error),
                    };
                    if state_totals.is_empty() {
                        ui.label(
                            RichText::new(format!(
                                "No records for {} in {}",
                                selection.state, selection.year
                            ))
                            .color(Color32::GRAY),
                        );
                        return;
                    }

                    if let Some(layer) = &self.layer {
                        ChartPlotter::draw_choropleth(ui, layer, crime);
                        if !layer.unmatched.is_empty() {
                            ui.label(
                                RichText::new(format!(
                                    "Not on map: {}",
                                    layer.unmatched.join(", ")
                                ))
                                .size(11.0)
                                .color(Color32::GRAY),
                            );
                        }
                        ui.add_space(10.0);
                    }
                    ChartPlotter::draw_state_table(ui, state_totals, crime);
                }
                DashboardTab::Trend => {
                    ui.heading(format!("{} Trends Over Time", crime));
                    ui.label(format!("{} Cases Trend Over Time", crime));
                    ui.add_space(6.0);
                    match &tables.year_totals {
                        Ok(totals) => ChartPlotter::draw_trend_chart(ui, totals, crime),
                        Err(error) => show_error(ui, error),
                    }
                }
                DashboardTab::Category => {
                    ui.heading("Crime Category Analysis");
                    ui.label("Crime Categories Distribution");
                    ui.add_space(6.0);
                    match &tables.category_totals {
                        Ok(totals) => ChartPlotter::draw_category_chart(ui, totals),
                        Err(error) => show_error(ui, error),
                    }
                }
            }
        });
    }
}

fn show_error(ui: &mut egui::Ui, error: &str) {
    ui.label(
        RichText::new(format!("Error: {}", error))
            .size(16.0)
            .color(Color32::from_rgb(220, 53, 69)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AggregationError, CrimeType};

    fn views() -> ViewTables {
        ViewTables {
            state_totals: Ok(vec![StateTotal {
                state: "Kerala".to_string(),
                count: 4,
            }]),
            year_totals: Ok(vec![YearTotal {
                year: 2013,
                count: 4,
            }]),
            category_totals: Err(AggregationError::UnknownCrimeColumn {
                crime: CrimeType::Rape,
                column: "RAPE",
            }),
        }
    }

    #[test]
    fn failed_table_only_blocks_its_own_tab() {
        let mut viewer = ChartViewer::new();
        assert_eq!(viewer.tab_error(DashboardTab::Category), None);

        let selection = FilterSelection::new(2013, Default::default(), CrimeType::Murder);
        viewer.set_views(selection, views(), None);

        assert_eq!(viewer.tab_error(DashboardTab::Map), None);
        assert_eq!(viewer.tab_error(DashboardTab::Trend), None);
        assert!(viewer
            .tab_error(DashboardTab::Category)
            .is_some_and(|e| e.contains("RAPE")));
    }

    #[test]
    fn export_keeps_the_tables_that_succeeded() {
        let mut viewer = ChartViewer::new();
        assert!(viewer.export_result().is_none());

        let selection = FilterSelection::new(2013, Default::default(), CrimeType::Murder);
        viewer.set_views(selection, views(), None);

        let result = viewer.export_result().unwrap();
        assert_eq!(result.state_total("Kerala"), Some(4));
        assert_eq!(result.year_totals.len(), 1);
        assert!(result.category_totals.is_empty());
    }
}
