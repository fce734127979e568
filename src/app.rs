// The eframe app: collects input once per frame, feeds it to the session, runs
// the commands it returns and repaints.

use std::time::Duration;

use eframe::egui;

use crate::config::Config;
use crate::input::square_at;
use crate::opponent::Opponent;
use crate::pieces::PieceSet;
use crate::render;
use crate::session::{Command, Event, Key, Session};

pub const TITLE: &str = "Satranj (Player vs AI / Player vs Player)";

pub struct SatranjApp {
    config: Config,
    session: Session,
    pieces: PieceSet,

    // Created when a difficulty is picked; owns the engine process.
    opponent: Option<Opponent>,
}

impl SatranjApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let pieces = PieceSet::load_or_figures(&cc.egui_ctx, &config.pieces_dir);
        Self {
            config,
            session: Session::new(),
            pieces,
            opponent: None,
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, event: Event) {
        let (session, command) = std::mem::take(&mut self.session).update(event);
        self.session = session;

        match command {
            Command::None => {}

            Command::LaunchEngine(difficulty) => {
                let opponent = Opponent::launch(&self.config.engine_path, difficulty);
                let title = format!(
                    "{TITLE} - {} vs {}",
                    difficulty.label(),
                    opponent.engine_name().unwrap_or("random moves")
                );
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
                self.opponent = Some(opponent);
            }

            // Blocks the loop until the engine answers.
            Command::EngineTurn => {
                let opponent = self.opponent.get_or_insert_with(Opponent::random);
                let reply = opponent.choose(self.session.game());
                self.dispatch(ctx, Event::EngineMove(reply));
            }

            Command::Quit => {
                log::info!("quit");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}

fn pressed_keys(input: &egui::InputState) -> Vec<Key> {
    let mut keys = Vec::new();
    for (key, menu_key) in [
        (egui::Key::Num1, Key::One),
        (egui::Key::Num2, Key::Two),
        (egui::Key::Num3, Key::Three),
        (egui::Key::R, Key::Restart),
        (egui::Key::Q, Key::Quit),
        (egui::Key::Escape, Key::Quit),
    ] {
        if input.key_pressed(key) && !keys.contains(&menu_key) {
            keys.push(menu_key);
        }
    }
    keys
}

impl eframe::App for SatranjApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Fixed-rate loop, also keeps the check highlight blinking.
        ctx.request_repaint_after(Duration::from_secs_f64(1.0 / f64::from(self.config.fps)));

        let (keys, elapsed) = ctx.input(|i| (pressed_keys(i), Duration::from_secs_f64(i.time)));
        for key in keys {
            self.dispatch(ctx, Event::Key(key));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let board = egui::Rect::from_min_size(
                    ui.max_rect().min,
                    egui::Vec2::splat(self.config.board_size()),
                );
                let response = ui.allocate_rect(board, egui::Sense::click());
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        let square = square_at(pos - board.min, self.config.square_size);
                        self.dispatch(ui.ctx(), Event::Click(square));
                    }
                }

                render::paint(ui.painter(), board, &self.session, &self.pieces, elapsed);
            });
    }
}
