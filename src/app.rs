//! eframe application: load, train, predict, chart

use crate::data::CallDataset;
use crate::forecast::{forecast_week, WeekForecast};
use crate::models::gradient_boost::{GradientBoost, TrainedGradientBoost};
use crate::models::WeekdayModel;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use eframe::egui;
use egui_plot::{
    Corner, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, PlotUi, Points,
    Text,
};

const ACCENT_BLUE: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
const ACCENT_RED: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const ACCENT_GREEN: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const ACCENT_YELLOW: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);

const BG_DARK: egui::Color32 = egui::Color32::from_rgb(15, 15, 20);
const BG_CARD: egui::Color32 = egui::Color32::from_rgb(24, 24, 32);
const TEXT_PRIMARY: egui::Color32 = egui::Color32::from_rgb(226, 232, 240);
const TEXT_SECONDARY: egui::Color32 = egui::Color32::from_rgb(148, 163, 184);
const BORDER_SUBTLE: egui::Color32 = egui::Color32::from_rgb(51, 51, 68);

#[derive(Clone, Copy, PartialEq)]
enum NoticeKind {
    Info,
    Error,
}

/// A dismissable in-window notification
#[derive(Clone)]
struct Notice {
    kind: NoticeKind,
    text: String,
}

/// Application state: the in-memory dataset and model, replaced wholesale on
/// each reload / retrain, plus the widget inputs
#[derive(Default)]
pub struct CallForecastApp {
    path_input: String,
    week_input: String,
    dataset: Option<CallDataset>,
    model: Option<TrainedGradientBoost>,
    forecast: Option<WeekForecast>,
    notice: Option<Notice>,
}

impl CallForecastApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::apply_theme(&cc.egui_ctx);
        Self::default()
    }

    fn apply_theme(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        style.visuals = egui::Visuals::dark();
        style.visuals.panel_fill = BG_DARK;
        style.visuals.window_rounding = egui::Rounding::same(8.0);
        style.visuals.widgets.inactive.rounding = egui::Rounding::same(6.0);
        style.visuals.widgets.active.rounding = egui::Rounding::same(6.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        });
    }

    fn load(&mut self) {
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            self.error("No file selected!");
            return;
        }

        match CallDataset::from_path(&path) {
            Ok(dataset) => {
                self.dataset = Some(dataset);
                self.model = None;
                self.forecast = None;
                self.info("File loaded successfully!");
            }
            Err(err) => {
                log::error!("failed to load {}: {}", path, err);
                self.error(format!("Failed to load file: {}", err));
            }
        }
    }

    fn train(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.error("Please load a data file first!");
            return;
        };

        match GradientBoost::new().train(dataset) {
            Ok(model) => {
                self.model = Some(model);
                self.forecast = None;
                self.info("Model trained successfully!");
            }
            Err(err) => {
                log::error!("training failed: {}", err);
                self.error(format!("Training failed: {}", err));
            }
        }
    }

    fn predict(&mut self) {
        match self.week_forecast() {
            Ok(forecast) => {
                self.forecast = Some(forecast);
                self.notice = None;
            }
            Err(message) => {
                log::error!("prediction failed: {}", message);
                self.error(message);
            }
        }
    }

    /// Validate the prediction inputs and run the forecast, mapping every
    /// failure state to user-facing text
    fn week_forecast(&self) -> Result<WeekForecast, String> {
        let (model, dataset) = match (&self.model, &self.dataset) {
            (Some(model), Some(dataset)) => (model, dataset),
            _ => return Err("Please train the model first!".to_string()),
        };

        let week = self
            .week_input
            .trim()
            .parse::<u32>()
            .map_err(|_| "Please enter a valid week number".to_string())?;

        forecast_week(model, dataset, week).map_err(|err| format!("Prediction failed: {}", err))
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|file| file.path) {
            self.path_input = path.display().to_string();
            self.load();
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new("Call Volume Forecast")
                .size(20.0)
                .strong()
                .color(TEXT_PRIMARY),
        );
        ui.label(
            egui::RichText::new("Weekday call volumes, actual vs. predicted")
                .size(12.0)
                .color(TEXT_SECONDARY),
        );
        ui.add_space(6.0);
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Data file:");
            ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .desired_width(340.0)
                    .hint_text("path to .csv, .xlsx or .xls (or drop a file on the window)"),
            );
            if ui.button("Load").clicked() {
                self.load();
            }
            if ui.button("Train").clicked() {
                self.train();
            }
        });

        ui.horizontal(|ui| {
            ui.label("Future week number:");
            ui.add(egui::TextEdit::singleline(&mut self.week_input).desired_width(80.0));
            if ui.button("Predict").clicked() {
                self.predict();
            }
        });
    }

    fn render_notice(&mut self, ui: &mut egui::Ui) {
        let Some(notice) = self.notice.clone() else {
            return;
        };

        let (fill, color) = match notice.kind {
            NoticeKind::Info => (egui::Color32::from_rgb(16, 38, 24), ACCENT_GREEN),
            NoticeKind::Error => (egui::Color32::from_rgb(45, 18, 18), ACCENT_RED),
        };

        let mut dismissed = false;
        egui::Frame::none()
            .fill(fill)
            .rounding(egui::Rounding::same(6.0))
            .inner_margin(egui::Margin::symmetric(10.0, 6.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&notice.text).size(12.0).color(color));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Dismiss").clicked() {
                            dismissed = true;
                        }
                    });
                });
            });
        if dismissed {
            self.notice = None;
        }
    }

    fn render_summary(&self, ui: &mut egui::Ui) {
        let weeks = self
            .dataset
            .as_ref()
            .and_then(|d| d.week_range())
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        let predictable = self
            .dataset
            .as_ref()
            .and_then(|d| d.max_week())
            .map(|w| format!("{} onwards", w + 1))
            .unwrap_or_else(|| "-".to_string());

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("Weeks available in dataset: {}", weeks))
                    .size(12.0)
                    .color(TEXT_SECONDARY),
            );
            ui.separator();
            ui.label(
                egui::RichText::new(format!("Predictable from week: {}", predictable))
                    .size(12.0)
                    .color(TEXT_SECONDARY),
            );
        });

        if let Some(forecast) = &self.forecast {
            ui.label(
                egui::RichText::new(format!(
                    "Predicted total calls offered for week {}: {}",
                    forecast.week,
                    forecast.total()
                ))
                .size(14.0)
                .strong()
                .color(ACCENT_YELLOW),
            );
        }
    }

    fn render_chart(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(BG_CARD)
            .rounding(egui::Rounding::same(8.0))
            .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
            .inner_margin(egui::Margin::same(8.0))
            .show(ui, |ui| {
                if self.dataset.is_none() {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("Load a data file to see the chart")
                                .color(TEXT_SECONDARY),
                        );
                    });
                    return;
                }

                let plot = Plot::new("calls_chart")
                    .legend(Legend::default().position(Corner::LeftTop))
                    .x_axis_formatter(|mark, _range| {
                        Utc.timestamp_opt(mark.value as i64, 0)
                            .single()
                            .map(|dt| dt.format("%a, %d-%b").to_string())
                            .unwrap_or_default()
                    })
                    .label_formatter(|name, value| {
                        let date = Utc
                            .timestamp_opt(value.x as i64, 0)
                            .single()
                            .map(|dt| dt.format("%Y-%m-%d").to_string())
                            .unwrap_or_default();
                        format!("{}\nDate: {}\nCalls: {:.0}", name, date, value.y)
                    })
                    .allow_drag(true)
                    .allow_zoom(true);

                plot.show(ui, |plot_ui| {
                    self.draw_chart_data(plot_ui);
                });
            });
    }

    fn draw_chart_data(&self, plot_ui: &mut PlotUi) {
        let Some(data) = &self.dataset else {
            return;
        };

        // Actual call volumes over the last three observed weeks
        let past = data.last_weeks(3);
        let actual: PlotPoints = past
            .iter()
            .map(|r| [date_ts(r.date), r.calls_offered])
            .collect();
        plot_ui.line(
            Line::new(actual)
                .name("Actual Calls")
                .color(ACCENT_BLUE)
                .width(1.8),
        );
        let actual_markers: PlotPoints = past
            .iter()
            .map(|r| [date_ts(r.date), r.calls_offered])
            .collect();
        plot_ui.points(
            Points::new(actual_markers)
                .shape(MarkerShape::Circle)
                .radius(3.0)
                .color(ACCENT_BLUE),
        );
        for record in &past {
            annotate(plot_ui, date_ts(record.date), record.calls_offered, ACCENT_BLUE);
        }

        let Some(forecast) = &self.forecast else {
            return;
        };

        let predicted: PlotPoints = forecast
            .points
            .iter()
            .map(|p| [date_ts(p.date), p.calls])
            .collect();
        plot_ui.line(
            Line::new(predicted)
                .name("Predicted Calls")
                .color(ACCENT_RED)
                .style(LineStyle::Dashed { length: 8.0 })
                .width(1.8),
        );
        let predicted_markers: PlotPoints = forecast
            .points
            .iter()
            .map(|p| [date_ts(p.date), p.calls])
            .collect();
        plot_ui.points(
            Points::new(predicted_markers)
                .shape(MarkerShape::Circle)
                .radius(3.0)
                .color(ACCENT_RED),
        );
        for point in &forecast.points {
            annotate(plot_ui, date_ts(point.date), point.calls, ACCENT_RED);
        }

        // Connect the last actual point to the first predicted one
        if let (Some(last), Some(first)) = (data.records().last(), forecast.points.first()) {
            let bridge = PlotPoints::new(vec![
                [date_ts(last.date), last.calls_offered],
                [date_ts(first.date), first.calls],
            ]);
            plot_ui.line(
                Line::new(bridge)
                    .color(egui::Color32::from_rgba_premultiplied(148, 163, 184, 80))
                    .style(LineStyle::Dotted { spacing: 4.0 })
                    .width(1.2),
            );
        }
    }
}

impl eframe::App for CallForecastApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            self.render_controls(ui);
            self.render_notice(ui);
            self.render_summary(ui);
            ui.add_space(6.0);
            self.render_chart(ui);
        });
    }
}

/// Midnight UTC timestamp for a calendar date, as plot x coordinate
fn date_ts(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

/// Integer point-value annotation drawn just above a chart point
fn annotate(plot_ui: &mut PlotUi, x: f64, y: f64, color: egui::Color32) {
    plot_ui.text(
        Text::new(
            PlotPoint::new(x, y),
            egui::RichText::new(format!("{:.0}", y)).size(9.0),
        )
        .color(color)
        .anchor(egui::Align2::CENTER_BOTTOM),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::FORECAST_DAYS;

    /// App with three weeks of data loaded, as after a successful Load
    fn loaded_app() -> CallForecastApp {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut pairs = Vec::new();
        for week in 0..3u32 {
            for day in 0..5u32 {
                let date = start + chrono::Duration::days((week * 7 + day) as i64);
                pairs.push((date, 100.0 + day as f64 * 10.0));
            }
        }

        CallForecastApp {
            dataset: Some(CallDataset::from_records(pairs).unwrap()),
            ..Default::default()
        }
    }

    fn trained_app() -> CallForecastApp {
        let mut app = loaded_app();
        let dataset = app.dataset.as_ref().unwrap();
        app.model = Some(GradientBoost::new().train(dataset).unwrap());
        app
    }

    #[test]
    fn forecast_requires_a_trained_model() {
        let mut app = loaded_app();
        app.week_input = "4".to_string();
        assert_eq!(
            app.week_forecast().unwrap_err(),
            "Please train the model first!"
        );
    }

    #[test]
    fn forecast_rejects_non_numeric_week_input() {
        let mut app = trained_app();
        app.week_input = "week four".to_string();
        assert_eq!(
            app.week_forecast().unwrap_err(),
            "Please enter a valid week number"
        );
    }

    #[test]
    fn forecast_reports_rejected_week_numbers() {
        let mut app = trained_app();
        app.week_input = "3".to_string();
        let message = app.week_forecast().unwrap_err();
        assert!(message.starts_with("Prediction failed:"), "{}", message);
    }

    #[test]
    fn forecast_runs_with_model_and_dataset() {
        let mut app = trained_app();
        app.week_input = "4".to_string();
        let forecast = app.week_forecast().unwrap();
        assert_eq!(forecast.week, 4);
        assert_eq!(forecast.points.len(), FORECAST_DAYS);
    }
}
