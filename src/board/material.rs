// Copyright 2026 Tobin Edwards
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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;
use strum_macros::{Display, EnumIter, EnumString};

/// A piece of a specific color, e.g. a white pawn.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Material {
    color: Color,
    piece: Piece,
}

impl Material {
    pub const WK: Self = Self::white(King);
    pub const WQ: Self = Self::white(Queen);
    pub const WR: Self = Self::white(Rook);
    pub const WB: Self = Self::white(Bishop);
    pub const WN: Self = Self::white(Knight);
    pub const WP: Self = Self::white(Pawn);

    pub const BK: Self = Self::black(King);
    pub const BQ: Self = Self::black(Queen);
    pub const BR: Self = Self::black(Rook);
    pub const BB: Self = Self::black(Bishop);
    pub const BN: Self = Self::black(Knight);
    pub const BP: Self = Self::black(Pawn);

    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        Self { color, piece }
    }

    #[inline]
    pub const fn white(piece: Piece) -> Self {
        Self::new(White, piece)
    }

    #[inline]
    pub const fn black(piece: Piece) -> Self {
        Self::new(Black, piece)
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn is_white(&self) -> bool {
        self.color == White
    }

    /// Dense index in `0..12`, black pieces first.
    #[inline]
    pub fn to_index(&self) -> usize {
        (1 - self.color.to_index()) * 6 + self.piece.to_index()
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.piece)
    }
}

use Color::{Black, White};

#[derive(Debug, Serialize, Deserialize, Display, EnumString, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
}

impl Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            White => Black,
            Black => White,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, EnumString, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Piece {
    Bishop,
    King,
    Knight,
    Pawn,
    Queen,
    Rook,
}
use Piece::{Bishop, King, Knight, Pawn, Queen, Rook};

impl Piece {
    pub fn to_index(&self) -> usize {
        *self as usize
    }
}
