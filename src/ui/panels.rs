use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::PortLocation;
use crate::data::model::Dimension;
use crate::state::AppState;
use crate::ui::metrics::format_count;

const ALL_LABEL: &str = "All";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let options = dataset.options(dim);
                let current = state.selection.get(dim).map(str::to_string);
                let mut choice = current.clone();

                ui.strong(dim.label());
                egui::ComboBox::from_id_salt(dim.label())
                    .selected_text(current.as_deref().unwrap_or(ALL_LABEL))
                    .width(ui.available_width())
                    .show_ui(ui, |ui: &mut Ui| {
                        ui.selectable_value(&mut choice, None, ALL_LABEL);
                        for value in options {
                            ui.selectable_value(&mut choice, Some(value.clone()), value);
                        }
                    });
                ui.add_space(6.0);

                if choice != current {
                    state.set_filter(dim, choice);
                }
            }

            ui.separator();
            let constrained = !state.selection.is_unconstrained();
            if ui
                .add_enabled(constrained, egui::Button::new("Clear filters"))
                .clicked()
            {
                state.clear_filters();
            }

            if let Some((first, last)) = dataset.date_range() {
                ui.add_space(8.0);
                ui.label(RichText::new(format!("Data from {first} to {last}")).weak());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dashboard.is_some(), egui::Button::new("Export summary…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(dash)) = (&state.dataset, &state.dashboard) {
            if let Some(name) = state.cache.path().and_then(|p| p.file_name()) {
                ui.label(RichText::new(name.to_string_lossy()).strong());
            }
            ui.label(format!(
                "{} records loaded, {} match",
                format_count(ds.len() as u64),
                format_count(dash.row_count as u64)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Port table (below the map)
// ---------------------------------------------------------------------------

/// Tabular view of the mapped ports.
pub fn port_table(ui: &mut Ui, locations: &[PortLocation]) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(160.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Port");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Total crossings");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Latitude");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Longitude");
            });
        })
        .body(|body| {
            body.rows(18.0, locations.len(), |mut row| {
                let loc = &locations[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&loc.port_name);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format_count(loc.total));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", loc.latitude));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", loc.longitude));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open border crossing data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard summary")
        .add_filter("JSON", &["json"])
        .set_file_name("border-summary.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_summary(&path) {
            log::error!("Failed to export summary: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
