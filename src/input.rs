// Screen geometry: pixels <-> squares. White sits at the bottom, so screen
// row 0 is rank 8.

use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};
use shakmaty::{File, Rank, Square};

/// Square under `offset`, measured from the board's top-left corner.
pub fn square_at(offset: Vec2, square_size: f32) -> Option<Square> {
    if offset.x < 0.0 || offset.y < 0.0 || square_size <= 0.0 {
        return None;
    }
    let col = (offset.x / square_size) as u32;
    let row = (offset.y / square_size) as u32;
    if col >= 8 || row >= 8 {
        return None;
    }
    Some(Square::from_coords(File::new(col), Rank::new(7 - row)))
}

/// Screen rectangle covered by `sq`.
pub fn square_rect(sq: Square, origin: Pos2, square_size: f32) -> Rect {
    let col = u32::from(sq.file()) as f32;
    let row = (7 - u32::from(sq.rank())) as f32;
    Rect::from_min_size(
        pos2(origin.x + col * square_size, origin.y + row * square_size),
        vec2(square_size, square_size),
    )
}
