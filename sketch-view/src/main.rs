//! Application entry point for the generative sketches viewer.
//!
//! This binary sets up logging and eframe/egui, loads the saved settings
//! and delegates all interactive logic and rendering to [`Viewer`] from
//! the `viewer` module.

mod prefs;
mod viewer;

use log::warn;
use prefs::Settings;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Settings come from [`prefs::settings_path`]; a file that cannot be read
/// is reported and the defaults are used instead.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let prefs_path = prefs::settings_path();
    let settings = Settings::load(prefs_path.as_deref()).unwrap_or_else(|err| {
        warn!("could not load settings ({err}), using defaults");
        Settings::default()
    });

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Generative Sketches",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(settings, prefs_path)))),
    )
}
