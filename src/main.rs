#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

mod app;
mod config;
mod ingest;
mod raster;
mod state;
mod toggle;

use eframe::egui;

use crate::app::CropFlicker;
use crate::config::{APP_NAME, FlickerConfig, WINDOW_SIZE};

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = FlickerConfig::default();
    log::info!(
        "starting {APP_NAME}: left {:?}, right {:?}, period {:?}",
        config.left,
        config.right,
        config.period
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(CropFlicker::new(cc, config)))),
    )
}
