// Move source for the engine's side: the UCI engine when it is running, a
// uniformly random legal move otherwise.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use shakmaty::Move;

use crate::engine::{EngineError, UciEngine};
use crate::rules::Game;
use crate::session::Difficulty;

const SKILL_LEVEL: &str = "20";

pub struct Opponent {
    engine: Option<UciEngine>,
    depth: u32,
    rng: StdRng,
}

impl Opponent {
    /// Starts the engine at `path` for `difficulty`. A missing or broken engine
    /// is not an error: the opponent then plays random legal moves.
    pub fn launch(path: &Path, difficulty: Difficulty) -> Self {
        let depth = difficulty.depth();
        let engine = match start(path) {
            Ok(engine) => {
                log::info!(
                    "engine {} loaded from {} ({}, depth {depth})",
                    engine.name(),
                    path.display(),
                    difficulty.label()
                );
                Some(engine)
            }
            Err(e) => {
                log::warn!(
                    "cannot start engine {}: {e}; using random moves",
                    path.display()
                );
                None
            }
        };
        Self {
            engine,
            depth,
            rng: StdRng::from_os_rng(),
        }
    }

    /// An opponent without engine.
    pub fn random() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            engine: None,
            depth: 0,
            rng,
        }
    }

    /// Name the engine reported, `None` when playing random moves.
    pub fn engine_name(&self) -> Option<&str> {
        self.engine.as_ref().map(UciEngine::name)
    }

    /// Picks a move for the side to move. Blocks while the engine searches.
    /// `None` only when the position has no legal move.
    pub fn choose(&mut self, game: &Game) -> Option<Move> {
        if let Some(engine) = self.engine.as_mut() {
            match ask(engine, game, self.depth) {
                Ok(m) => return Some(m),
                Err(e) => log::warn!("engine failed: {e}; playing a random move"),
            }
        }
        self.random_move(game)
    }

    fn random_move(&mut self, game: &Game) -> Option<Move> {
        game.legal_moves().choose(&mut self.rng).copied()
    }
}

fn start(path: &Path) -> Result<UciEngine, EngineError> {
    let mut engine = UciEngine::launch(path)?;
    engine.set_option("Skill Level", SKILL_LEVEL)?;
    Ok(engine)
}

fn ask(engine: &mut UciEngine, game: &Game, depth: u32) -> Result<Move, EngineError> {
    let uci = engine.best_move(game.history(), depth)?;
    uci.to_move(game.position())
        .map_err(|_| EngineError::IllegalMove(uci.to_string()))
}
