// Main application layout
// Navbar, status line, the current page and any open modal

use crate::state::{AppState, Route};
use crate::ui::components::status_line;
use crate::ui::pages;
use eframe::egui;

/// Render one frame of the dashboard
pub fn render_app_layout(ctx: &egui::Context, state: &mut AppState) {
    if state.route.shows_navbar() {
        render_navbar(ctx, state);
    }

    egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
        ui.add_space(4.0);
        status_line(ui, state.status.as_ref(), state.in_flight);
        ui.add_space(4.0);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .id_source("page_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| match state.route {
                Route::Home => pages::home(ui, state),
                Route::Hub => pages::hub(ui, state),
                Route::CostManagementHub => pages::cost_management_hub(ui, state),
                Route::CostManagementAgent(_) => pages::cost_management_agent(ui, state),
                Route::AgentManagementHub => pages::agent_management_hub(ui, state),
                Route::AgentManagementAgent(_) => pages::agent_management_agent(ui, state),
            });
    });

    pages::agent_creation_modal(ctx, state);
    pages::knowledge_source_modal(ctx, state);
}

/// Top bar with links to the feature areas
fn render_navbar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            if ui
                .button(egui::RichText::new("Copilot Governance").strong())
                .clicked()
            {
                state.navigate(Route::Home);
            }
            ui.separator();

            let current = state.route;
            let links = [
                ("Hub", Route::Hub),
                ("Cost Management", Route::CostManagementHub),
                ("Agent Management", Route::AgentManagementHub),
            ];
            for (label, route) in links {
                if ui.selectable_label(current == route, label).clicked() {
                    state.navigate(route);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut dark_mode = ctx.style().visuals.dark_mode;
                if ui.checkbox(&mut dark_mode, "Dark Mode").changed() {
                    let visuals = if dark_mode {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    };
                    ctx.set_visuals(visuals);
                }
                if ui.button("⟳ Refresh").clicked() {
                    state.refresh();
                }
            });
        });
    });
}
