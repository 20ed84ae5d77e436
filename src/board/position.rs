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

use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;

use super::material::{Color, Material, Piece};
use super::square::{Mask, Square, BOARD_SIZE};

use Color::*;
use Piece::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Squares([Option<Material>; 64]);

impl Squares {
    fn empty() -> Self {
        Self([None; 64])
    }
}

impl Index<Square> for Squares {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

/// The 8x8 grid of a position at one point in time.
///
/// A board is replaced wholesale by the next decoded board; the mutators
/// below exist to build boards, not to track moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardState {
    squares: Squares,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoardState {
    pub fn empty() -> Self {
        Self {
            squares: Squares::empty(),
        }
    }

    /// The starting position with black on the first two lines of the text
    /// and white on the last two.
    pub fn standard() -> Self {
        const BACK_RANK: [Piece; BOARD_SIZE] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut board = Self::empty();
        for (x, piece) in BACK_RANK.into_iter().enumerate() {
            board.init_file(x, piece);
        }
        board
    }

    fn init_file(&mut self, x: usize, piece: Piece) {
        const ROWS: [(Color, usize, usize); 2] = [(Black, 0, 1), (White, 7, 6)];
        for (color, back, pawns) in ROWS {
            if let Some(square) = Square::new(x, back) {
                self.place(square, Material::new(color, piece));
            }
            if let Some(square) = Square::new(x, pawns) {
                self.place(square, Material::new(color, Pawn));
            }
        }
    }

    #[inline]
    pub fn contents(&self, square: Square) -> Option<Material> {
        self.squares[square]
    }

    /// Builder-style setter, handy in tests.
    pub fn set_contents(mut self, square: Square, contents: Option<Material>) -> Self {
        self.squares[square] = contents;
        self
    }

    /// Places `material` on `square`, returning whatever was there.
    pub fn place(&mut self, square: Square, material: Material) -> Option<Material> {
        self.squares[square].replace(material)
    }

    pub fn remove(&mut self, square: Square) -> Option<Material> {
        self.squares[square].take()
    }

    /// Occupied squares with their contents, in text order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Material)> + '_ {
        Square::iter().filter_map(move |square| self.squares[square].map(|material| (square, material)))
    }

    pub fn occupied_by(&self, color: Color) -> Mask {
        self.pieces()
            .filter(|(_, material)| material.color() == color)
            .map(|(square, _)| square)
            .collect()
    }

    /// Iterates the rows of the grid, first line of the text first.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Material>]> + '_ {
        self.squares.0.chunks(BOARD_SIZE)
    }
}

impl Index<Square> for BoardState {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}
