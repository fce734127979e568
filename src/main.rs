// Satranj: egui chess board, two players or one player against a UCI engine
// v 0.1
//
// Rules come from shakmaty, moves for the engine side from an external UCI
// engine (Stockfish by default) or, failing that, from a random legal move.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release
#![allow(rustdoc::missing_crate_level_docs)]

use eframe::egui;

mod app;
mod config;
mod engine;
mod input;
mod opponent;
mod pieces;
mod render;
mod rules;
mod session;

use app::{SatranjApp, TITLE};
use config::Config;

fn main() -> eframe::Result<()> {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    log::info!(
        "engine {}, pieces from {}, {} points per square",
        config.engine_path.display(),
        config.pieces_dir.display(),
        config.square_size
    );

    let side = config.board_size();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([side, side])
            .with_resizable(false)
            .with_title(TITLE),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(SatranjApp::new(cc, config)))),
    )
}
