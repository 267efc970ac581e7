// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! vidbox - Video Bounding-Box Annotator
//!
//! A cross-platform desktop application for drawing, typing, or importing
//! rectangle annotations over video frames in native pixel coordinates.

mod app;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::AnnotatorApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings = io::serialization::load_startup_settings();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("vidbox - Video Bounding-Box Annotator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "vidbox",
        options,
        Box::new(|_cc| Ok(Box::new(AnnotatorApp::new(settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
