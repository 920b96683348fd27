use call_forecast::app::CallForecastApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([980.0, 640.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Call Volume Forecast",
        options,
        Box::new(|cc| Ok(Box::new(CallForecastApp::new(cc)))),
    )
}
