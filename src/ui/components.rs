// Reusable UI components
// Badges, tables, form fields and the two hand-painted charts

use crate::api::{Agent, KnowledgeSource};
use crate::state::app_state::{ChatMessage, StatusMessage};
use crate::state::charts::{slice_fractions, PieSlice};
use crate::state::ChatRole;
use eframe::egui;
use std::f32::consts::{FRAC_PI_2, TAU};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 0, 0);
const OK_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 180, 0);
const PENDING_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 180, 0);
const LINE_COLOR: egui::Color32 = egui::Color32::from_rgb(0x88, 0x84, 0xD8);

/// Active (green) or Disabled (gray)
pub fn active_badge(ui: &mut egui::Ui, active: bool) {
    if active {
        ui.colored_label(OK_COLOR, "Active");
    } else {
        ui.colored_label(egui::Color32::GRAY, "Disabled");
    }
}

/// Approval label for a knowledge source
pub fn approval_badge(ui: &mut egui::Ui, source: &KnowledgeSource) {
    let color = if source.approved {
        OK_COLOR
    } else {
        PENDING_COLOR
    };
    ui.colored_label(color, source.approval_label());
}

/// Render a primary action button
pub fn primary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.button(egui::RichText::new(text).strong())
}

/// Red button for destructive actions
pub fn danger_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.button(egui::RichText::new(text).color(ERROR_COLOR))
}

/// Labelled single-line text input with its validation message
pub fn text_field(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut String,
    hint: &str,
    error: Option<&str>,
) {
    ui.label(label);
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );
    field_error(ui, error);
    ui.add_space(6.0);
}

pub fn field_error(ui: &mut egui::Ui, error: Option<&str>) {
    if let Some(message) = error {
        ui.label(egui::RichText::new(message).color(ERROR_COLOR).small());
    }
}

/// Bottom status line: spinner while requests run, last message otherwise
pub fn status_line(ui: &mut egui::Ui, status: Option<&StatusMessage>, in_flight: usize) {
    ui.horizontal(|ui| {
        if in_flight > 0 {
            ui.spinner();
        }
        match status {
            Some(status) if status.is_error => {
                ui.colored_label(ERROR_COLOR, &status.text);
            }
            Some(status) => {
                ui.label(&status.text);
            }
            None => {
                ui.label(egui::RichText::new("Ready").weak());
            }
        }
    });
}

/// Agent table used by both hubs
/// Returns the id of the row whose name was clicked
pub fn agent_table(ui: &mut egui::Ui, id_source: &str, agents: &[Agent]) -> Option<i64> {
    let mut clicked = None;

    egui::Grid::new(id_source)
        .striped(true)
        .num_columns(5)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            for header in ["ID", "Agent Name", "Description", "Owner", "Status"] {
                ui.label(egui::RichText::new(header).strong());
            }
            ui.end_row();

            for agent in agents {
                ui.label(agent.id.to_string());
                if ui.link(&agent.name).clicked() {
                    clicked = Some(agent.id);
                }
                ui.add(egui::Label::new(&agent.description).truncate(true));
                ui.label(&agent.owner);
                ui.label(&agent.status);
                ui.end_row();
            }
        });

    clicked
}

pub fn knowledge_table(ui: &mut egui::Ui, sources: &[KnowledgeSource]) {
    egui::Grid::new("knowledge_sources")
        .striped(true)
        .num_columns(3)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            for header in ["Knowledge Source Name", "Source", "Approval Status"] {
                ui.label(egui::RichText::new(header).strong());
            }
            ui.end_row();

            for source in sources {
                ui.label(egui::RichText::new(&source.name).strong());
                ui.add(egui::Label::new(source.source.as_deref().unwrap_or("-")).truncate(true));
                approval_badge(ui, source);
                ui.end_row();
            }
        });
}

/// One chat bubble, user messages on the left and replies on the right
pub fn chat_bubble(ui: &mut egui::Ui, message: &ChatMessage) {
    let (layout, fill) = match message.role {
        ChatRole::User => (
            egui::Layout::left_to_right(egui::Align::TOP),
            ui.visuals().widgets.inactive.bg_fill,
        ),
        ChatRole::Assistant => (
            egui::Layout::right_to_left(egui::Align::TOP),
            ui.visuals().selection.bg_fill,
        ),
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::none()
            .fill(fill)
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::symmetric(10.0, 6.0))
            .show(ui, |ui| {
                ui.set_max_width(500.0);
                ui.label(&message.text);
            });
    });
    ui.add_space(6.0);
}

/// Pie chart with legend
///
/// Each slice is painted as convex sectors of at most a quarter turn.
pub fn pie_chart(ui: &mut egui::Ui, slices: &[PieSlice], radius: f32) {
    let size = egui::vec2(radius * 2.0 + 8.0, radius * 2.0 + 8.0);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let center = response.rect.center();
    let fractions = slice_fractions(slices);

    if fractions.iter().all(|f| *f <= 0.0) {
        painter.circle_stroke(center, radius, egui::Stroke::new(1.0, egui::Color32::GRAY));
    }

    // Start at twelve o'clock, clockwise
    let mut start = -FRAC_PI_2;
    for (slice, fraction) in slices.iter().zip(fractions) {
        if fraction <= 0.0 {
            continue;
        }
        let sweep = fraction as f32 * TAU;
        let end = start + sweep;

        let mut sector_start = start;
        while sector_start < end - f32::EPSILON {
            let sector_end = (sector_start + FRAC_PI_2).min(end);
            let steps = (((sector_end - sector_start) / TAU) * 128.0).ceil().max(2.0) as usize;
            let mut points = Vec::with_capacity(steps + 2);
            points.push(center);
            for i in 0..=steps {
                let angle = sector_start + (sector_end - sector_start) * i as f32 / steps as f32;
                points.push(center + radius * egui::vec2(angle.cos(), angle.sin()));
            }
            painter.add(egui::Shape::convex_polygon(
                points,
                slice.color,
                egui::Stroke::NONE,
            ));
            sector_start = sector_end;
        }

        // Value label at the middle of the slice
        let mid = start + sweep / 2.0;
        painter.text(
            center + radius * 0.6 * egui::vec2(mid.cos(), mid.sin()),
            egui::Align2::CENTER_CENTER,
            format!("{:.2}", slice.value),
            egui::FontId::proportional(13.0),
            egui::Color32::WHITE,
        );
        start = end;
    }

    ui.horizontal(|ui| {
        for slice in slices {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, slice.color);
            ui.label(format!("{}: {:.2}", slice.label, slice.value));
            ui.add_space(12.0);
        }
    });
}

/// Line chart over labelled points, with grid and hover readout
pub fn line_chart(ui: &mut egui::Ui, points: &[(&str, f64)], size: egui::Vec2) {
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let frame = response.rect;
    let plot = egui::Rect::from_min_max(
        frame.min + egui::vec2(40.0, 10.0),
        frame.max - egui::vec2(10.0, 24.0),
    );
    let text_color = ui.visuals().text_color();
    let grid_stroke = egui::Stroke::new(0.5, ui.visuals().weak_text_color());

    if points.is_empty() {
        return;
    }

    let max = points
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        .ceil();
    let ticks = 4;
    for i in 0..=ticks {
        let value = max * i as f64 / ticks as f64;
        let y = plot.bottom() - plot.height() * (i as f32 / ticks as f32);
        painter.line_segment(
            [egui::pos2(plot.left(), y), egui::pos2(plot.right(), y)],
            grid_stroke,
        );
        painter.text(
            egui::pos2(plot.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            format!("{:.0}", value),
            egui::FontId::proportional(11.0),
            text_color,
        );
    }

    let step = if points.len() > 1 {
        plot.width() / (points.len() - 1) as f32
    } else {
        0.0
    };
    let positions: Vec<egui::Pos2> = points
        .iter()
        .enumerate()
        .map(|(i, (_, value))| {
            egui::pos2(
                plot.left() + step * i as f32,
                plot.bottom() - plot.height() * (*value / max) as f32,
            )
        })
        .collect();

    for ((label, _), pos) in points.iter().zip(&positions) {
        painter.text(
            egui::pos2(pos.x, plot.bottom() + 4.0),
            egui::Align2::CENTER_TOP,
            *label,
            egui::FontId::proportional(11.0),
            text_color,
        );
    }

    painter.add(egui::Shape::line(
        positions.clone(),
        egui::Stroke::new(2.0, LINE_COLOR),
    ));
    for pos in &positions {
        painter.circle_filled(*pos, 3.0, LINE_COLOR);
    }

    if let Some(hover) = response.hover_pos() {
        let nearest = positions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.x - hover.x).abs().total_cmp(&(b.x - hover.x).abs())
            })
            .map(|(i, _)| i);
        if let Some(i) = nearest {
            let (label, value) = points[i];
            painter.circle_stroke(positions[i], 6.0, egui::Stroke::new(1.5, LINE_COLOR));
            painter.text(
                positions[i] + egui::vec2(0.0, -10.0),
                egui::Align2::CENTER_BOTTOM,
                format!("{}: £{:.2}", label, value),
                egui::FontId::proportional(12.0),
                text_color,
            );
        }
    }
}
