// Session state machine: menus, selection and turn sequencing.
//
// Everything here is a plain value. `Session::update` consumes the session and an
// input event and hands back the next session plus a `Command` for the main loop
// to carry out (launching the engine, asking it for a move, quitting).

use shakmaty::{Color, Move, Square};

use crate::rules::{Game, Outcome};

/// The engine always plays Black.
pub const ENGINE_SIDE: Color = Color::Black;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameMode {
    PlayerVsPlayer,
    PlayerVsEngine,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Master,
}

impl Difficulty {
    /// Search depth handed to the engine.
    pub fn depth(self) -> u32 {
        match self {
            Difficulty::Beginner => 6,
            Difficulty::Intermediate => 12,
            Difficulty::Master => 18,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Master => "Master",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    // Waiting for 1 (two players) or 2 (against the engine).
    ModeMenu,

    // Engine mode only: waiting for 1/2/3.
    StrengthMenu,

    // Board on screen, moves being played.
    Playing,

    // Result banner; R restarts, Q/Escape quits.
    GameOver(Outcome),
}

/// Menu keys the session understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    One,
    Two,
    Three,
    Restart,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Key(Key),
    /// A click on the board, already mapped to a square (`None` when off the board).
    Click(Option<Square>),
    /// The move picked for the engine's side; `None` if there was nothing to play.
    EngineMove(Option<Move>),
}

/// Side effect requested by an update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    None,
    LaunchEngine(Difficulty),
    EngineTurn,
    Quit,
}

/// A selected origin square and every legal move starting there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub from: Square,
    pub moves: Vec<Move>,
}

impl Selection {
    pub fn targets(&self) -> impl Iterator<Item = Square> + '_ {
        self.moves.iter().map(|m| m.to())
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    phase: Phase,
    mode: Option<GameMode>,
    game: Game,
    selection: Option<Selection>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            phase: Phase::ModeMenu,
            mode: None,
            game: Game::new(),
            selection: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Result text while the game-over banner is up.
    pub fn banner(&self) -> Option<&'static str> {
        match self.phase {
            Phase::GameOver(outcome) => Some(outcome.banner()),
            _ => None,
        }
    }

    pub fn is_engine_turn(&self) -> bool {
        self.mode == Some(GameMode::PlayerVsEngine) && self.game.turn() == ENGINE_SIDE
    }

    pub fn update(mut self, event: Event) -> (Self, Command) {
        let command = match (self.phase, event) {
            (Phase::ModeMenu, Event::Key(Key::One)) => {
                self.mode = Some(GameMode::PlayerVsPlayer);
                self.phase = Phase::Playing;
                Command::None
            }
            (Phase::ModeMenu, Event::Key(Key::Two)) => {
                self.mode = Some(GameMode::PlayerVsEngine);
                self.phase = Phase::StrengthMenu;
                Command::None
            }

            (Phase::StrengthMenu, Event::Key(key)) => {
                let difficulty = match key {
                    Key::One => Difficulty::Beginner,
                    Key::Two => Difficulty::Intermediate,
                    Key::Three => Difficulty::Master,
                    Key::Restart | Key::Quit => return (self, Command::None),
                };
                self.phase = Phase::Playing;
                Command::LaunchEngine(difficulty)
            }

            (Phase::Playing, Event::Click(Some(sq))) if !self.is_engine_turn() => self.click(sq),

            (Phase::Playing, Event::EngineMove(Some(m))) if self.is_engine_turn() => {
                match self.game.play(m) {
                    Ok(played) => {
                        log::debug!("engine played {played:?}");
                        self.after_move()
                    }
                    Err(e) => {
                        log::warn!("rejected engine move: {e}");
                        Command::None
                    }
                }
            }

            (Phase::GameOver(_), Event::Key(Key::Restart)) => {
                self.game.reset();
                self.selection = None;
                self.phase = Phase::Playing;
                log::info!("new game");
                Command::None
            }
            (Phase::GameOver(_), Event::Key(Key::Quit)) => Command::Quit,

            _ => Command::None,
        };
        (self, command)
    }

    fn click(&mut self, sq: Square) -> Command {
        match self.selection.take() {
            None => {
                let own_piece = self
                    .game
                    .piece_at(sq)
                    .is_some_and(|piece| piece.color == self.game.turn());
                if own_piece {
                    self.selection = Some(Selection {
                        from: sq,
                        moves: self.game.legal_moves_from(sq),
                    });
                }
                Command::None
            }
            Some(selection) => {
                let candidate = self.game.candidate(selection.from, sq);
                match self.game.play_uci(&candidate) {
                    Ok(_) => self.after_move(),
                    Err(e) => {
                        log::debug!("{e}");
                        Command::None
                    }
                }
            }
        }
    }

    fn after_move(&mut self) -> Command {
        if let Some(outcome) = self.game.outcome() {
            log::info!("game over: {}", outcome.banner());
            self.phase = Phase::GameOver(outcome);
            Command::None
        } else if self.is_engine_turn() {
            Command::EngineTurn
        } else {
            Command::None
        }
    }
}
