use eframe::egui;

use ciphercanvas::app::CanvasApp;

fn main() {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("CipherCanvas"),
        ..Default::default()
    };

    eframe::run_native(
        "CipherCanvas — messages become light",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(CanvasApp::new()))
        }),
    )
    .expect("Failed to start CipherCanvas");
}
