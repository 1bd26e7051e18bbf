//! Control Panel Widget
//! Left side panel with the year, state and crime type filters.

use crate::data::{CrimeType, FilterSelection, StateFilter, UnifiedTable};
use egui::{Color32, ComboBox, RichText};

/// Left side control panel with the dashboard filters.
pub struct ControlPanel {
    pub selection: FilterSelection,
    states: Vec<String>,
    year_range: (i32, i32),
    crime_types: Vec<CrimeType>,
    row_count: usize,
    pub status: String,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(table: &UnifiedTable, selection: FilterSelection) -> Self {
        let year_range = table
            .year_range()
            .unwrap_or((selection.year, selection.year));

        Self {
            selection,
            states: table.states().to_vec(),
            year_range,
            crime_types: table.crime_types(),
            row_count: table.height(),
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let before = self.selection.clone();

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Filters")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Year =====
        ui.label(RichText::new("Select Year").size(14.0).strong());
        ui.add_space(5.0);
        let (min_year, max_year) = self.year_range;
        ui.add(egui::Slider::new(&mut self.selection.year, min_year..=max_year).show_value(true));

        ui.add_space(15.0);

        // ===== State =====
        ui.label(RichText::new("Select State").size(14.0).strong());
        ui.add_space(5.0);
        ComboBox::from_id_salt("state")
            .width(ui.available_width())
            .selected_text(self.selection.state.label())
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.selection.state, StateFilter::All, "All");
                for state in &self.states {
                    ui.selectable_value(
                        &mut self.selection.state,
                        StateFilter::Named(state.clone()),
                        state,
                    );
                }
            });

        ui.add_space(15.0);

        // ===== Crime type =====
        ui.label(RichText::new("Select Crime Type").size(14.0).strong());
        ui.add_space(5.0);
        ComboBox::from_id_salt("crime_type")
            .width(ui.available_width())
            .selected_text(self.selection.crime_type.label())
            .show_ui(ui, |ui| {
                for crime in CrimeType::ALL {
                    let backed = self.crime_types.contains(&crime);
                    ui.add_enabled_ui(backed, |ui| {
                        ui.selectable_value(&mut self.selection.crime_type, crime, crime.label());
                    });
                }
            });

        if self.selection != before {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);
        ui.label(
            RichText::new("ℹ️ Use the filters above to explore crime statistics across India.")
                .size(11.0)
                .color(Color32::GRAY),
        );
        ui.label(
            RichText::new(format!(
                "{} district records, {}-{}",
                self.row_count, min_year, max_year
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export Charts").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(10.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    ExportCharts,
}
