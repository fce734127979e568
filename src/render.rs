// Drawing. Reads the session, never changes it.

use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, Painter, Rect, Stroke, StrokeKind};
use shakmaty::Square;

use crate::input::square_rect;
use crate::pieces::PieceSet;
use crate::session::{Phase, Session};

const LIGHT: Color32 = Color32::from_rgb(240, 217, 181);
const DARK: Color32 = Color32::from_rgb(181, 136, 99);
const HIGHLIGHT: Color32 = Color32::from_rgb(186, 202, 68);
const CHECK: Color32 = Color32::from_rgb(255, 0, 0);
const BACKGROUND: Color32 = Color32::from_rgb(30, 30, 30);

const TARGET_STROKE: f32 = 4.0;
const CHECK_STROKE: f32 = 5.0;

// Menu layout is given for a 640 point board and scaled from there.
const REFERENCE_SIZE: f32 = 640.0;
const FONT_SIZE: f32 = 38.0;

const BLINK_PERIOD: Duration = Duration::from_millis(1000);

/// Whether the check outline is lit `elapsed` after startup: on for the first
/// half of every period, off for the second.
pub fn check_flash_visible(elapsed: Duration) -> bool {
    elapsed.as_millis() % BLINK_PERIOD.as_millis() < BLINK_PERIOD.as_millis() / 2
}

pub fn is_light(sq: Square) -> bool {
    // a1 is dark
    (u32::from(sq.file()) + u32::from(sq.rank())) % 2 == 1
}

/// Text lines of a full-screen menu: (text, y offset at reference size).
pub fn screen_lines(session: &Session) -> Vec<(&'static str, f32)> {
    match session.phase() {
        Phase::ModeMenu => vec![
            ("Choose Game Mode", 150.0),
            ("1. Player vs Player", 280.0),
            ("2. Player vs AI", 340.0),
        ],
        Phase::StrengthMenu => vec![
            ("Select AI Strength", 150.0),
            ("1. Beginner (Depth 6)", 260.0),
            ("2. Intermediate (Depth 12)", 320.0),
            ("3. Master (Depth 18)", 380.0),
        ],
        Phase::GameOver(outcome) => vec![
            ("Game Over", 150.0),
            (outcome.banner(), 240.0),
            ("Press R to Restart", 340.0),
            ("Press Q to Quit", 400.0),
        ],
        Phase::Playing => Vec::new(),
    }
}

pub fn paint(
    painter: &Painter,
    board: Rect,
    session: &Session,
    pieces: &PieceSet,
    elapsed: Duration,
) {
    if session.phase() == Phase::Playing {
        paint_board(painter, board, session, pieces, check_flash_visible(elapsed));
    } else {
        paint_screen(painter, board, &screen_lines(session));
    }
}

fn paint_board(painter: &Painter, board: Rect, session: &Session, pieces: &PieceSet, flash: bool) {
    let size = board.width() / 8.0;
    let game = session.game();

    for sq in Square::ALL {
        let rect = square_rect(sq, board.min, size);
        painter.rect_filled(rect, 0.0, if is_light(sq) { LIGHT } else { DARK });
    }

    if let Some(selection) = session.selection() {
        for target in selection.targets() {
            let rect = square_rect(target, board.min, size);
            painter.rect_stroke(rect, 0.0, Stroke::new(TARGET_STROKE, HIGHLIGHT), StrokeKind::Inside);
        }
    }

    for sq in Square::ALL {
        if let Some(piece) = game.piece_at(sq) {
            pieces.paint(painter, square_rect(sq, board.min, size), piece);
        }
    }

    if flash {
        if let Some(king) = game.checked_king() {
            let rect = square_rect(king, board.min, size);
            painter.rect_stroke(rect, 0.0, Stroke::new(CHECK_STROKE, CHECK), StrokeKind::Inside);
        }
    }
}

fn paint_screen(painter: &Painter, board: Rect, lines: &[(&str, f32)]) {
    let scale = board.width() / REFERENCE_SIZE;
    painter.rect_filled(board, 0.0, BACKGROUND);
    for (text, y) in lines {
        painter.text(
            egui::pos2(board.center().x, board.min.y + y * scale),
            Align2::CENTER_TOP,
            *text,
            FontId::proportional(FONT_SIZE * scale),
            Color32::WHITE,
        );
    }
}
