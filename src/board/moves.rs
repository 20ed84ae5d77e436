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
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::material::Material;
use super::position::BoardState;
use super::square::{Mask, Square};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ActionError {
    #[error("No piece at ({0})")]
    MissingOrigin(Square),
    #[error("Expecting {expected} at ({square}), found {found:?}")]
    OriginMismatch {
        square: Square,
        expected: Material,
        found: Option<Material>,
    },
}
use ActionError::*;

/// A proposed move: the piece on `from` goes to `to`.
///
/// Whether the move is legal is for the engine to decide; an `Action` only
/// promises that both squares are on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    material: Material,
    from: Square,
    to: Square,
}

impl Action {
    #[inline]
    pub const fn new(material: Material, from: Square, to: Square) -> Self {
        Self { material, from, to }
    }

    /// Builds an action for whatever piece stands on `from`.
    ///
    /// # Errors
    ///
    /// `ActionError::MissingOrigin` if `from` is empty.
    pub fn on(board: &BoardState, from: Square, to: Square) -> Result<Self> {
        let material = board[from].ok_or(MissingOrigin(from))?;
        Ok(Self::new(material, from, to))
    }

    /// Checks that `board` still holds the moving piece on its origin.
    pub fn check(&self, board: &BoardState) -> Result<()> {
        match board[self.from] {
            Some(found) if found == self.material => Ok(()),
            None => Err(MissingOrigin(self.from).into()),
            found => Err(OriginMismatch {
                square: self.from,
                expected: self.material,
                found,
            }
            .into()),
        }
    }

    #[inline]
    pub fn material(&self) -> Material {
        self.material
    }
    #[inline]
    pub fn from(&self) -> Square {
        self.from
    }
    #[inline]
    pub fn to(&self) -> Square {
        self.to
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) -> ({})", self.material, self.from, self.to)
    }
}

/// `{"icon": "♙", "x": 4, "y": 6}`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct WirePiece {
    pub icon: char,
    pub x: i64,
    pub y: i64,
}

/// `{"piece": {...}, "x": 4, "y": 4}`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct WireAction {
    pub piece: WirePiece,
    pub x: i64,
    pub y: i64,
}

impl From<&Action> for WireAction {
    fn from(action: &Action) -> Self {
        Self {
            piece: WirePiece {
                icon: action.material.glyph(),
                x: action.from.x() as i64,
                y: action.from.y() as i64,
            },
            x: action.to.x() as i64,
            y: action.to.y() as i64,
        }
    }
}

impl TryFrom<WireAction> for Action {
    type Error = anyhow::Error;

    fn try_from(wire: WireAction) -> Result<Self> {
        let material = Material::from_glyph(wire.piece.icon)?;
        let from = Square::try_from_coords(wire.piece.x, wire.piece.y)?;
        let to = Square::try_from_coords(wire.x, wire.y)?;
        Ok(Self::new(material, from, to))
    }
}

/// Destinations the engine reports as legal, keyed by origin square.
///
/// Advisory only, and only for the board it was requested for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalActions(HashMap<Square, Mask>);

impl LegalActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: Square, to: Square) {
        *self.0.entry(from).or_default() |= to;
    }

    pub fn destinations(&self, from: Square) -> Mask {
        self.0.get(&from).copied().unwrap_or_default()
    }

    pub fn allows(&self, from: Square, to: Square) -> bool {
        self.destinations(from).contains(to)
    }

    pub fn origins(&self) -> impl Iterator<Item = Square> + '_ {
        self.0.keys().copied()
    }

    /// Number of (origin, destination) pairs.
    pub fn len(&self) -> usize {
        self.0.values().map(Mask::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Groups a wire action list by origin.
    ///
    /// # Errors
    ///
    /// Fails on the first entry with an unknown icon or off-board coordinates.
    pub fn from_wire<I>(actions: I) -> Result<Self>
    where
        I: IntoIterator<Item = WireAction>,
    {
        let mut legal = Self::new();
        for wire in actions {
            let action = Action::try_from(wire)?;
            legal.insert(action.from, action.to);
        }
        Ok(legal)
    }
}

impl FromIterator<(Square, Square)> for LegalActions {
    fn from_iter<I: IntoIterator<Item = (Square, Square)>>(iter: I) -> Self {
        let mut legal = Self::new();
        for (from, to) in iter {
            legal.insert(from, to);
        }
        legal
    }
}
