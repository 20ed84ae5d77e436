// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use anyhow::Result;
use std::fmt;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::material::Material;
use super::position::BoardState;
use super::square::{Square, BOARD_SIZE};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Surface has {0} cells, expecting 64 (not fully drawn)")]
    Inconsistent(usize),
}

/// Something that draws a board as cells and can be asked what it drew.
pub trait Surface {
    fn cell_count(&self) -> usize;
    fn asset_at(&self, square: Square) -> Option<&str>;
}

/// Rebuilds a board from what `surface` currently shows, one query per
/// square in text order.
///
/// # Errors
///
/// `SnapshotError::Inconsistent` if the surface is not fully drawn, or a
/// `GlyphError` if a cell shows an asset outside the piece table.
pub fn read_current<S: Surface + ?Sized>(surface: &S) -> Result<BoardState> {
    let cells = surface.cell_count();
    if cells != BOARD_SIZE * BOARD_SIZE {
        return Err(SnapshotError::Inconsistent(cells).into());
    }
    let mut board = BoardState::empty();
    for square in Square::iter() {
        if let Some(asset) = surface.asset_at(square) {
            board.place(square, Material::from_asset(asset)?);
        }
    }
    Ok(board)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    square: Square,
    material: Option<Material>,
}

impl Cell {
    pub fn square(&self) -> Square {
        self.square
    }
    pub fn material(&self) -> Option<Material> {
        self.material
    }
    /// Element id of the cell, `"<x> <y>"`.
    pub fn id(&self) -> String {
        self.square.to_string()
    }
    /// Element id of the piece image in the cell, `"<asset> <x> <y>"`.
    pub fn piece_id(&self) -> Option<String> {
        self.material
            .map(|material| format!("{} {}", material.asset(), self.square))
    }
}

/// A surface that is a pure projection of a `BoardState`.
///
/// Drawing replaces every cell before returning, so a read that follows a
/// draw always sees the whole new board.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    cells: Vec<Cell>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, board: &BoardState) {
        self.cells = Square::iter()
            .map(|square| Cell {
                square,
                material: board[square],
            })
            .collect();
    }

    pub fn is_drawn(&self) -> bool {
        self.cells.len() == BOARD_SIZE * BOARD_SIZE
    }

    pub fn cell(&self, square: Square) -> Option<&Cell> {
        self.cells.get(square.to_index())
    }
}

impl Surface for Projection {
    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn asset_at(&self, square: Square) -> Option<&str> {
        self.cell(square)?.material.map(|material| material.asset())
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_drawn() {
            return writeln!(f, "(board not drawn)");
        }
        write!(f, "  ")?;
        for x in 0..BOARD_SIZE {
            write!(f, " {x}")?;
        }
        writeln!(f)?;
        for row in self.cells.chunks(BOARD_SIZE) {
            write!(f, "{} ", row[0].square.y())?;
            for cell in row {
                let glyph = match cell.material {
                    Some(material) => material.glyph(),
                    None if cell.square.is_light() => ' ',
                    None => '·',
                };
                write!(f, " {glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Square::*;

    struct Partial(usize);

    impl Surface for Partial {
        fn cell_count(&self) -> usize {
            self.0
        }
        fn asset_at(&self, _square: Square) -> Option<&str> {
            None
        }
    }

    struct Smudged;

    impl Surface for Smudged {
        fn cell_count(&self) -> usize {
            64
        }
        fn asset_at(&self, square: Square) -> Option<&str> {
            (square == E4).then_some("assets/white_unicorn.png")
        }
    }

    #[test]
    fn test_read_back_matches_drawn_board() {
        let board = BoardState::standard().set_contents(E4, Some(Material::WQ));
        let mut projection = Projection::new();
        projection.draw(&board);
        assert_eq!(read_current(&projection).unwrap(), board);
    }
    #[test]
    fn test_redraw_replaces_board() {
        let mut projection = Projection::new();
        projection.draw(&BoardState::standard());
        projection.draw(&BoardState::empty());
        assert_eq!(read_current(&projection).unwrap(), BoardState::empty());
    }
    #[test]
    fn test_undrawn_surface_is_inconsistent() {
        let err = read_current(&Projection::new()).unwrap_err();
        assert_eq!(err.downcast_ref::<SnapshotError>(), Some(&SnapshotError::Inconsistent(0)));
        assert!(read_current(&Partial(63)).is_err());
        assert!(read_current(&Partial(64)).is_ok());
    }
    #[test]
    fn test_unknown_asset_fails() {
        assert!(read_current(&Smudged).is_err());
    }
    #[test]
    fn test_cell_ids() {
        let mut projection = Projection::new();
        projection.draw(&BoardState::standard());
        let cell = projection.cell(E2).unwrap();
        assert_eq!(cell.id(), "4 6");
        assert_eq!(cell.piece_id().as_deref(), Some("assets/white_pawn.png 4 6"));
        assert_eq!(projection.cell(E4).unwrap().piece_id(), None);
    }
    #[test]
    fn test_terminal_rendering() {
        let mut projection = Projection::new();
        projection.draw(&BoardState::standard());
        let text = projection.to_string();
        assert_eq!(text.lines().count(), 9);
        assert!(text.lines().nth(1).unwrap().contains('♜'));
        assert!(text.lines().last().unwrap().contains('♔'));
    }
}
