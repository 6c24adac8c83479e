use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{metrics, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BorderDashApp {
    pub state: AppState,
}

impl BorderDashApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState, dark_mode: bool) -> Self {
        let visuals = if dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        cc.egui_ctx.set_visuals(visuals);
        Self { state }
    }
}

impl eframe::App for BorderDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dash) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a border crossing file to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("U.S. Border Crossing Entry Dashboard");
            ui.add_space(6.0);
            metrics::metric_row(ui, &dash.summary);
            ui.add_space(12.0);

            if dash.no_rows {
                ui.label(
                    RichText::new("No rows match the current selection.")
                        .italics()
                        .size(16.0),
                );
                return;
            }

            ui.heading(format!("Top {} Ports by Total Crossings", dash.top_ports.len()));
            plot::top_ports_chart(ui, &dash.top_ports, &state.port_colors);
            ui.add_space(12.0);

            ui.heading("Monthly Border Crossings Over Time");
            plot::monthly_chart(ui, &dash.monthly);
            ui.add_space(12.0);

            ui.heading("Port Locations");
            if dash.port_locations.is_empty() {
                ui.label(RichText::new("No matching rows carry coordinates.").weak());
                return;
            }
            plot::port_map(ui, &dash.port_locations, &state.port_colors);
            egui::CollapsingHeader::new("Port table")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    panels::port_table(ui, &dash.port_locations);
                });
        });
}
