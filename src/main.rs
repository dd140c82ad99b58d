use anyhow::{Context, Result};
use gtk4::prelude::*;
use libadwaita as adw;
use std::sync::Arc;

use report_forms_core::{ui::MainWindow, AppState};

fn main() -> Result<()> {
    env_logger::init();

    // Report requests run here; the GTK main loop only awaits them.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;
    let handle = runtime.handle().clone();

    let app = adw::Application::builder()
        .application_id("com.example.report-forms")
        .flags(gio::ApplicationFlags::FLAGS_NONE)
        .build();

    app.connect_activate(move |app| {
        if let Err(e) = setup_app(app, handle.clone()) {
            log::error!("Failed to setup application: {:#}", e);
            std::process::exit(1);
        }
    });

    app.run();

    Ok(())
}

fn setup_app(app: &adw::Application, runtime: tokio::runtime::Handle) -> Result<()> {
    let app_state = Arc::new(AppState::new(runtime)?);

    {
        let config = app_state.config.read();
        log::info!(
            "Report service at {}, {} endpoints registered",
            config.server.base_url,
            app_state.registry.endpoints().len()
        );
    }

    let _main_window = MainWindow::new(app, app_state.clone());

    Ok(())
}
