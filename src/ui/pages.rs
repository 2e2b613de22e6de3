// One render function per page

use crate::state::charts::MONTHLY_COSTS;
use crate::state::forms::{error_for, LOCATION_OPTIONS, MODEL_OPTIONS};
use crate::state::{AppState, Route};
use crate::ui::components::*;
use eframe::egui;

fn page_header(ui: &mut egui::Ui, title: &str, subtitle: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(20.0);
        ui.heading(egui::RichText::new(title).size(28.0));
        if !subtitle.is_empty() {
            ui.label(subtitle);
        }
        ui.add_space(12.0);
    });
}

pub fn home(ui: &mut egui::Ui, state: &mut AppState) {
    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.heading(egui::RichText::new("Copilot Governance").size(30.0));
        ui.add_space(16.0);
        ui.label("Cost management and agent management for Copilot agents");
        ui.add_space(24.0);
        if primary_button(ui, "Enter").clicked() {
            state.navigate(Route::Hub);
        }
    });
}

pub fn hub(ui: &mut egui::Ui, state: &mut AppState) {
    page_header(ui, "User Hub", "");

    ui.vertical_centered(|ui| {
        ui.set_max_width(250.0);
        let size = egui::vec2(250.0, 32.0);
        if ui
            .add_sized(size, egui::Button::new("Cost Management"))
            .clicked()
        {
            state.navigate(Route::CostManagementHub);
        }
        ui.add_space(10.0);
        if ui
            .add_sized(size, egui::Button::new("Data Governance"))
            .clicked()
        {
            state.set_info("Going to data governance");
        }
        ui.add_space(10.0);
        if ui
            .add_sized(size, egui::Button::new("Agent Management"))
            .clicked()
        {
            state.navigate(Route::AgentManagementHub);
        }
    });
}

pub fn cost_management_hub(ui: &mut egui::Ui, state: &mut AppState) {
    page_header(
        ui,
        "Cost Management",
        "This is Cost Management for Microsoft Copilot.",
    );

    ui.vertical_centered(|ui| {
        ui.label("The cost of one prompt of conversation in Microsoft Copilot is £0.01");
        ui.add_space(16.0);
        ui.label(egui::RichText::new("Total cost of all agents (£)").strong());
        let width = (ui.available_width() * 0.6).max(360.0);
        line_chart(ui, &MONTHLY_COSTS, egui::vec2(width, 300.0));
        ui.add_space(20.0);
    });

    let selected = if state.agents.is_empty() {
        ui.vertical_centered(|ui| {
            ui.label("No data to show - you have not created any agents.");
        });
        None
    } else {
        agent_table(ui, "cost_agents", &state.agents)
    };

    if let Some(id) = selected {
        state.navigate(Route::CostManagementAgent(id));
    }
}

pub fn cost_management_agent(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(detail) = state.detail.as_ref() else {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.spinner();
        });
        return;
    };

    page_header(ui, &detail.agent.display_name, &detail.agent.description);

    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new("Amount used for this month (£)").strong());
        ui.add_space(8.0);
        if let Some(slices) = state.budget_slices() {
            pie_chart(ui, &slices, 120.0);
        }
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.label("Status:");
            active_badge(ui, detail.agent.active);
        });
        if let Some(unit) = &detail.current_spend.unit {
            ui.label(egui::RichText::new(format!("Currency: {}", unit)).weak());
        }
    });
}

pub fn agent_management_hub(ui: &mut egui::Ui, state: &mut AppState) {
    page_header(ui, "Agent Management", "Home for managing agents.");

    ui.vertical_centered(|ui| {
        if primary_button(ui, "Create an agent").clicked() {
            state.creation_form.open = true;
        }
    });
    ui.add_space(16.0);

    ui.heading("Your agents:");
    ui.add_space(6.0);
    let selected = if state.agents.is_empty() {
        ui.label(egui::RichText::new("No agents yet").italics().weak());
        None
    } else {
        agent_table(ui, "managed_agents", &state.agents)
    };

    if let Some(id) = selected {
        state.navigate(Route::AgentManagementAgent(id));
    }
}

pub fn agent_management_agent(ui: &mut egui::Ui, state: &mut AppState) {
    match state.detail.as_ref() {
        Some(detail) => {
            let agent = &detail.agent;
            page_header(ui, &agent.display_name, "");
            ui.vertical_centered(|ui| {
                ui.label(format!("Status: {}", agent.status));
                ui.label(format!("Hosted Location: {}", location_label(&agent.location)));
                ui.label(format!("Owner: {} <{}>", agent.owner, agent.owner_email));
                ui.label(format!("Model: {}", agent.model_base));
                ui.label(format!("Monthly budget: £{:.2}", agent.budget));
                if let Some(deployment) = &agent.deployment_status {
                    ui.label(format!("Deployment: {}", deployment));
                }
            });
        }
        None => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
            });
        }
    }

    ui.add_space(30.0);
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new("Knowledge sources").strong());
        ui.add_space(6.0);
        if ui.button("Add Knowledge Source").clicked() {
            state.knowledge_form.open = true;
        }
        ui.add_space(6.0);
        ui.label("Current knowledge sources:");
    });
    if state.knowledge_sources.is_empty() {
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("None attached").italics().weak());
        });
    } else {
        knowledge_table(ui, &state.knowledge_sources);
    }

    ui.add_space(20.0);
    chat_panel(ui, state);

    ui.add_space(20.0);
    ui.separator();
    ui.horizontal(|ui| {
        if state.confirm_delete {
            ui.label("Delete this agent and its cloud resources?");
            if danger_button(ui, "Confirm delete").clicked() {
                state.delete_current_agent();
            }
            if ui.button("Cancel").clicked() {
                state.confirm_delete = false;
            }
        } else if danger_button(ui, "Delete agent").clicked() {
            state.confirm_delete = true;
        }
    });
}

fn chat_panel(ui: &mut egui::Ui, state: &mut AppState) {
    ui.label(egui::RichText::new("Chat:").strong());
    egui::Frame::group(ui.style()).show(ui, |ui| {
        egui::ScrollArea::vertical()
            .id_source("chat_scroll")
            .max_height(300.0)
            .auto_shrink([false, true])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for message in &state.chat.messages {
                    chat_bubble(ui, message);
                }
                if state.chat.awaiting_reply {
                    ui.spinner();
                }
            });
    });

    ui.horizontal(|ui| {
        let width = ui.available_width() - 80.0;
        let input = ui.add(
            egui::TextEdit::singleline(&mut state.chat.input)
                .hint_text("Type your message...")
                .desired_width(width),
        );
        let enter = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let send = ui
            .add_enabled(!state.chat.awaiting_reply, egui::Button::new("Send"))
            .clicked();
        if enter || send {
            state.send_chat();
            input.request_focus();
        }
    });
}

fn location_label(value: &str) -> &str {
    LOCATION_OPTIONS
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
        .unwrap_or(value)
}

/// "Agent Creation Form" modal
pub fn agent_creation_modal(ctx: &egui::Context, state: &mut AppState) {
    if !state.creation_form.open {
        return;
    }

    let mut open = true;
    let mut submitted = false;
    let form = &mut state.creation_form;

    egui::Window::new("Agent Creation Form")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(360.0)
        .show(ctx, |ui| {
            text_field(ui, "Name of your agent:", &mut form.name, "", error_for(&form.errors, "name"));
            text_field(
                ui,
                "Description of your agent:",
                &mut form.description,
                "",
                error_for(&form.errors, "description"),
            );

            ui.label("Model of agent to use:");
            egui::ComboBox::from_id_source("model_base")
                .selected_text(form.model_base.as_str())
                .show_ui(ui, |ui| {
                    for model in MODEL_OPTIONS {
                        ui.selectable_value(&mut form.model_base, model.to_string(), model);
                    }
                });
            ui.add_space(6.0);

            ui.label("Location of agent:");
            egui::ComboBox::from_id_source("location")
                .selected_text(location_label(&form.location).to_string())
                .show_ui(ui, |ui| {
                    for (value, label) in LOCATION_OPTIONS {
                        ui.selectable_value(&mut form.location, value.to_string(), label);
                    }
                });
            ui.add_space(6.0);

            text_field(ui, "Owner of agent:", &mut form.owner, "", error_for(&form.errors, "owner"));
            text_field(
                ui,
                "Owner's email:",
                &mut form.owner_email,
                "name@example.com",
                error_for(&form.errors, "owner_email"),
            );

            ui.label("Budget (per month) of your agent:");
            ui.add(
                egui::DragValue::new(&mut form.budget)
                    .speed(0.01)
                    .fixed_decimals(2)
                    .prefix("£"),
            );
            field_error(ui, error_for(&form.errors, "budget"));

            ui.add_space(12.0);
            if primary_button(ui, "Create").clicked() {
                submitted = true;
            }
        });

    if submitted {
        state.submit_agent_form();
    } else if !open {
        state.creation_form.open = false;
    }
}

/// "Add a knowledge source" modal
pub fn knowledge_source_modal(ctx: &egui::Context, state: &mut AppState) {
    if !state.knowledge_form.open {
        return;
    }

    let mut open = true;
    let mut submitted = false;
    let form = &mut state.knowledge_form;

    egui::Window::new("Add a knowledge source")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(360.0)
        .show(ctx, |ui| {
            text_field(
                ui,
                "Name:",
                &mut form.name,
                "Enter knowledge source name",
                error_for(&form.errors, "name"),
            );
            text_field(
                ui,
                "Source:",
                &mut form.source,
                "Enter source URL or file path",
                None,
            );
            if primary_button(ui, "Submit").clicked() {
                submitted = true;
            }
        });

    if submitted {
        state.submit_knowledge_form();
    } else if !open {
        state.knowledge_form.open = false;
    }
}
