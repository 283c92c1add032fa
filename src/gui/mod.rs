//! The eframe/egui implementation for the dashboard.
//!
//! Immediate-mode rendering over the latest [`CabSnapshot`]: the update loop
//! runs the poller inline when an interval has elapsed, then draws the
//! panels from the snapshot it produced. There is no observer plumbing;
//! every frame re-renders from current state.
//!
//! Layout:
//! - `TopBottomPanel` (top): title, backend badge, both link states.
//! - `SidePanel` (left): locomotive identity, the set-name command, device
//!   info, and the scalar readings.
//! - `CentralPanel`: watched-controller history plot and the controller
//!   table, with the set-value command underneath.
//! - `TopBottomPanel` (bottom): the filterable log panel.

mod log_panel;

use std::collections::VecDeque;
use std::time::Instant;

use eframe::egui::{self, Color32};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Line, Plot, PlotPoints};
use log::{info, LevelFilter};

use crate::app::DashApp;
use crate::config::Backend;
use crate::core::{CabSnapshot, LinkStatus};
use crate::log_capture::LogBuffer;

/// Plotted history samples for the watched controller (~1 minute at the
/// default cadence).
const HISTORY_CAPACITY: usize = 600;

/// The main GUI struct.
pub struct Gui {
    app: DashApp,
    snapshot: CabSnapshot,
    started: Instant,
    history: VecDeque<[f64; 2]>,
    // Set-name command state
    new_loco_name: String,
    // Set-value command state
    selected_controller: usize,
    pending_value: f32,
    // Log panel state
    log_buffer: LogBuffer,
    log_filter_text: String,
    log_level_filter: LevelFilter,
    scroll_to_bottom: bool,
}

impl Gui {
    /// Creates the GUI and seeds the display with one immediate poll, so
    /// the first frame is not empty.
    pub fn new(_cc: &eframe::CreationContext<'_>, mut app: DashApp, log_buffer: LogBuffer) -> Self {
        let snapshot = app.poller.tick().clone();
        info!(
            "Dashboard ready ({} backend, polling every {:?})",
            app.backend(),
            app.poller.interval()
        );

        Self {
            app,
            snapshot,
            started: Instant::now(),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            new_loco_name: String::new(),
            selected_controller: 0,
            pending_value: 0.0,
            log_buffer,
            log_filter_text: String::new(),
            log_level_filter: LevelFilter::Info,
            scroll_to_bottom: true,
        }
    }

    fn poll_if_due(&mut self) {
        if !self.app.poller.poll_due(Instant::now()) {
            return;
        }
        self.snapshot = self.app.poller.tick().clone();

        if self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back([
            self.started.elapsed().as_secs_f64(),
            f64::from(self.snapshot.watched_value),
        ]);
    }

    fn locomotive_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Locomotive");
        egui::Grid::new("loco_grid").num_columns(2).show(ui, |ui| {
            ui.label("Name:");
            ui.strong(&self.snapshot.loco_name);
            ui.end_row();

            ui.label("Loco set:");
            ui.label(self.snapshot.loco_set.to_string());
            ui.end_row();

            ui.label("Changed:");
            ui.label(if self.snapshot.loco_changed { "1" } else { "0" });
            ui.end_row();
        });

        ui.separator();
        ui.label("New name:");
        ui.text_edit_singleline(&mut self.new_loco_name);
        if ui.button("Set Name").clicked() {
            let name = self.new_loco_name.clone();
            self.snapshot.loco_name = self.app.poller.set_loco_name(&name);
            self.new_loco_name.clear();
        }

        ui.separator();
        ui.heading("Device");
        egui::Grid::new("device_grid").num_columns(2).show(ui, |ui| {
            ui.label("Id:");
            ui.monospace(self.snapshot.device_id.to_string());
            ui.end_row();

            ui.label("Type:");
            ui.monospace(self.snapshot.device_type.to_string());
            ui.end_row();

            ui.label("Next id:");
            ui.monospace(self.snapshot.next_device_id.to_string());
            ui.end_row();
        });

        ui.separator();
        ui.heading("Readings");
        egui::Grid::new("readings_grid").num_columns(2).show(ui, |ui| {
            ui.label("Current controller:");
            ui.monospace(format_value(self.snapshot.current_controller_value));
            ui.end_row();

            ui.label("Throttle/brake:");
            ui.monospace(format_value(self.snapshot.combined_throttle_brake));
            ui.end_row();

            ui.label("Sim value:");
            ui.monospace(format_value(self.snapshot.sim_value));
            ui.end_row();

            ui.label("Driver value:");
            ui.monospace(format_value(self.snapshot.driver_value));
            ui.end_row();
        });
    }

    fn controllers_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading(format!("{} history", self.app.poller.watched()));
        let points = PlotPoints::from_iter(self.history.iter().copied());
        Plot::new("watched_history")
            .height(160.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(points));
            });

        ui.separator();
        ui.heading(format!("Controllers ({})", self.snapshot.controllers.len()));

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder())
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(60.0))
            .column(Column::auto().at_least(60.0))
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Controller");
                });
                header.col(|ui| {
                    ui.strong("Value");
                });
                header.col(|ui| {
                    ui.strong("Min");
                });
                header.col(|ui| {
                    ui.strong("Max");
                });
            })
            .body(|body| {
                let controllers = &self.snapshot.controllers;
                body.rows(18.0, controllers.len(), |mut row| {
                    let reading = &controllers[row.index()];
                    row.col(|ui| {
                        ui.label(&reading.name);
                    });
                    row.col(|ui| {
                        ui.monospace(format_value(reading.value));
                    });
                    row.col(|ui| {
                        ui.monospace(format_value(reading.min));
                    });
                    row.col(|ui| {
                        ui.monospace(format_value(reading.max));
                    });
                });
            });

        ui.separator();
        self.set_value_row(ui);
    }

    fn set_value_row(&mut self, ui: &mut egui::Ui) {
        if self.snapshot.controllers.is_empty() {
            ui.label("No controllers reported.");
            return;
        }
        if self.selected_controller >= self.snapshot.controllers.len() {
            self.selected_controller = 0;
        }
        let names: Vec<String> = self
            .snapshot
            .controllers
            .iter()
            .map(|c| c.name.clone())
            .collect();
        let (min, max) = {
            let selected = &self.snapshot.controllers[self.selected_controller];
            (selected.min, selected.max)
        };

        ui.horizontal(|ui| {
            ui.label("Set");
            egui::ComboBox::from_id_salt("controller_select")
                .selected_text(names[self.selected_controller].clone())
                .show_ui(ui, |ui| {
                    for (i, name) in names.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_controller, i, name);
                    }
                });
            ui.label("to");
            ui.add(
                egui::DragValue::new(&mut self.pending_value)
                    .range(min..=max)
                    .speed(0.01),
            );
            if ui.button("Apply").clicked() {
                self.app
                    .poller
                    .set_controller_value(self.selected_controller, self.pending_value);
            }
        });
    }
}

impl eframe::App for Gui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_if_due();

        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .min_height(120.0)
            .show(ctx, |ui| {
                log_panel::render(ui, self);
            });

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("RailDriver Dashboard");
                ui.separator();

                let (color, label) = backend_badge(self.app.backend());
                ui.colored_label(color, label);
                ui.separator();

                ui.colored_label(
                    link_color(self.snapshot.driver_link),
                    format!("RailDriver: {}", self.snapshot.driver_link),
                );
                ui.colored_label(
                    link_color(self.snapshot.sim_link),
                    format!("RailSim: {}", self.snapshot.sim_link),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "Updated {}",
                        self.snapshot.taken_at.format("%H:%M:%S%.3f")
                    ));
                });
            });
        });

        egui::SidePanel::left("loco_panel")
            .resizable(true)
            .min_width(240.0)
            .show(ctx, |ui| {
                self.locomotive_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.controllers_panel(ui);
        });

        // Wake up again when the next poll is due.
        ctx.request_repaint_after(self.app.poller.time_until_due(Instant::now()));
    }
}

/// Display color for a link state.
fn link_color(status: LinkStatus) -> Color32 {
    if status.is_connected() {
        Color32::GREEN
    } else {
        Color32::RED
    }
}

/// Status-dot badge for the active backend.
fn backend_badge(backend: Backend) -> (Color32, &'static str) {
    match backend {
        Backend::Simulated => (Color32::YELLOW, "● Simulated"),
        Backend::Hardware => (Color32::GREEN, "● Hardware"),
    }
}

/// Fixed-precision rendering for reading values.
fn format_value(value: f32) -> String {
    format!("{value:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_color_mapping() {
        assert_eq!(link_color(LinkStatus::Connected), Color32::GREEN);
        assert_eq!(link_color(LinkStatus::Disconnected), Color32::RED);
    }

    #[test]
    fn test_backend_badge() {
        assert_eq!(backend_badge(Backend::Simulated).1, "● Simulated");
        assert_eq!(backend_badge(Backend::Hardware).1, "● Hardware");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.5), "0.500");
        assert_eq!(format_value(-1.0), "-1.000");
        assert_eq!(format_value(119.948), "119.948");
    }
}
