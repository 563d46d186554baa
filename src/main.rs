#![cfg_attr(windows, windows_subsystem = "windows")]

mod app;
mod style;

use std::time::Duration;

use eframe::egui;
use linkshelf_core::config::{self, Config, RendererConfig};
use linkshelf_core::prefs::PreferenceStore;
use linkshelf_core::probe::{self, CheckSchedule};
use linkshelf_core::source;
use linkshelf_core::tree::LinkTree;
use tracing_subscriber::{fmt, EnvFilter};

use app::{AppInit, LinkshelfApp};

fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    fmt().with_env_filter(filter).with_target(true).init();
}

fn to_renderer(renderer: RendererConfig) -> eframe::Renderer {
    match renderer {
        RendererConfig::Auto => eframe::Renderer::default(),
        RendererConfig::Wgpu => eframe::Renderer::Wgpu,
        RendererConfig::Glow => eframe::Renderer::Glow,
    }
}

fn main() -> eframe::Result {
    let config = Config::load();
    init_logging(&config);
    tracing::info!("Starting Linkshelf v{}", env!("CARGO_PKG_VERSION"));

    let prefs = PreferenceStore::open(PreferenceStore::default_path());

    let timeout = Duration::from_secs(config.accessibility.timeout_secs);
    let location = source::resolve_location(config::config_dir().as_deref(), &config.data.source);
    let fetched = source::load_tree(&location, timeout).unwrap_or_else(|err| {
        tracing::error!(%err, "could not load tree; starting empty");
        LinkTree::default()
    });

    let schedule = CheckSchedule::from_days(config.accessibility.retention_days);
    let startup = probe::plan_startup(
        &prefs,
        fetched,
        &schedule,
        probe::now_millis(),
        config.accessibility.enabled,
    );
    tracing::info!(probe = startup.probe, "startup plan ready");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                config.appearance.window_width as f32,
                config.appearance.window_height as f32,
            ])
            .with_title("Linkshelf"),
        renderer: to_renderer(config.appearance.renderer),
        ..Default::default()
    };

    eframe::run_native(
        "Linkshelf",
        options,
        Box::new(move |cc| {
            Ok(Box::new(LinkshelfApp::new(
                cc,
                AppInit {
                    config,
                    prefs,
                    startup,
                },
            )))
        }),
    )
}
