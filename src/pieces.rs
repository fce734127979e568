// Piece artwork: twelve PNGs uploaded as textures, or Unicode figures when the
// images are not available.

use std::path::{Path, PathBuf};

use eframe::egui;
use shakmaty::{Color, Piece, Role};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("cannot load {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

// Same order as `index`.
const FILES: [&str; 12] = [
    "wp.png", "wn.png", "wb.png", "wr.png", "wq.png", "wk.png", //
    "bp.png", "bn.png", "bb.png", "br.png", "bq.png", "bk.png",
];

const FIGURES: [&str; 12] = [
    "♙", "♘", "♗", "♖", "♕", "♔", //
    "♟", "♞", "♝", "♜", "♛", "♚",
];

fn index(piece: Piece) -> usize {
    let role = match piece.role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    };
    match piece.color {
        Color::White => role,
        Color::Black => role + 6,
    }
}

pub fn figure(piece: Piece) -> &'static str {
    FIGURES[index(piece)]
}

pub enum PieceSet {
    Textures(Vec<egui::TextureHandle>),
    Figures,
}

impl PieceSet {
    /// Loads every image in `dir`; falls back to figures if any of them fails.
    pub fn load_or_figures(ctx: &egui::Context, dir: &Path) -> Self {
        match Self::load(ctx, dir) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("{e}; drawing pieces as figures");
                PieceSet::Figures
            }
        }
    }

    pub fn load(ctx: &egui::Context, dir: &Path) -> Result<Self, AssetError> {
        let mut textures = Vec::with_capacity(FILES.len());
        for name in FILES {
            let path = dir.join(name);
            let image = decode(&path)?;
            textures.push(ctx.load_texture(name, image, egui::TextureOptions::LINEAR));
        }
        log::info!("piece images loaded from {}", dir.display());
        Ok(PieceSet::Textures(textures))
    }

    pub fn paint(&self, painter: &egui::Painter, rect: egui::Rect, piece: Piece) {
        match self {
            PieceSet::Textures(textures) => {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(textures[index(piece)].id(), rect, uv, egui::Color32::WHITE);
            }
            PieceSet::Figures => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    figure(piece),
                    egui::FontId::proportional(rect.height() * 0.8),
                    egui::Color32::BLACK,
                );
            }
        }
    }
}

fn decode(path: &Path) -> Result<egui::ColorImage, AssetError> {
    let rgba = image::open(path)
        .map_err(|source| AssetError::Image {
            path: path.to_owned(),
            source,
        })?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_name(piece: Piece) -> &'static str {
        FILES[index(piece)]
    }

    fn all_pieces() -> impl Iterator<Item = Piece> {
        [Color::White, Color::Black].into_iter().flat_map(|color| {
            [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen, Role::King]
                .into_iter()
                .map(move |role| Piece { color, role })
        })
    }

    #[test]
    fn file_names_follow_color_and_role() {
        let white_knight = Piece {
            color: Color::White,
            role: Role::Knight,
        };
        let black_king = Piece {
            color: Color::Black,
            role: Role::King,
        };
        assert_eq!(file_name(white_knight), "wn.png");
        assert_eq!(file_name(black_king), "bk.png");
        assert_eq!(figure(black_king), "♚");
    }

    #[test]
    fn every_piece_has_its_own_image() {
        let mut names: Vec<&str> = all_pieces().map(file_name).collect();
        for piece in all_pieces() {
            // wp.png <-> 'P', bp.png <-> 'p'
            let name = file_name(piece);
            let expected = if piece.color == Color::White { 'w' } else { 'b' };
            assert!(name.starts_with(expected));
            assert_eq!(name.as_bytes()[1] as char, piece.char().to_ascii_lowercase());
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn missing_directory_is_an_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        match decode(&dir.path().join("wp.png")) {
            Err(AssetError::Image { path, .. }) => assert!(path.ends_with("wp.png")),
            Ok(_) => panic!("nothing to decode"),
        }
    }

    #[test]
    fn missing_images_fall_back_to_figures() {
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PieceSet::load_or_figures(&ctx, dir.path()),
            PieceSet::Figures
        ));
    }

    #[test]
    fn decodes_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wq.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();
        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.size, [4, 2]);
    }
}
