use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use paint_surface::app::PaintApp;
use paint_surface::{config, logging, Surface, SurfaceConfig};

/// Draw shapes and ink over an image and export the result as JPEG.
#[derive(Parser, Debug)]
#[command(name = "paint-surface")]
#[command(version = env!("CARGO_PKG_VERSION"), long_about = None)]
struct Cli {
    /// JSON settings file (defaults to ./paint-surface.json when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image to open as the background
    image: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    let args = Cli::parse();

    let loaded = config::resolve(args.config.as_deref());
    logging::init(loaded.as_ref().is_ok_and(|c| c.debug_logging));
    let config = loaded.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "using default configuration");
        SurfaceConfig::default()
    });

    let mut app = PaintApp::new(Surface::with_config(&config));
    if let Some(image) = &args.image {
        app.open_path(image);
    }

    let title = match &args.image {
        Some(path) => format!(
            "paint-surface — {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "paint-surface".to_string(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(app))))
}
