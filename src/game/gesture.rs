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

use anyhow::Result;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::{Action, BoardState, Color, LegalActions, Material, Square};

/// The engine plays black from the top two rows; the human always has white
/// and moves first.
pub const HUMAN_SIDE: Color = Color::White;

/// Why a gesture was dropped without contacting the engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Nothing was being dragged")]
    MalformedGesture,
    #[error("That is not a square")]
    InvalidTarget,
    #[error("Illegal move from ({from}) to ({to})")]
    IllegalMove { from: Square, to: Square },
    #[error("No piece on ({0})")]
    EmptySquare(Square),
    #[error("The piece on ({0}) is not yours")]
    NotYourPiece(Square),
    #[error("Waiting for the engine")]
    Busy,
    #[error("The board has not been drawn yet")]
    NoBoard,
}

/// What a drag carries from its start to its drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragPayload {
    material: Material,
    from: Square,
}

impl DragPayload {
    pub const fn new(material: Material, from: Square) -> Self {
        Self { material, from }
    }
    pub fn material(&self) -> Material {
        self.material
    }
    pub fn from(&self) -> Square {
        self.from
    }
    /// Element id of the dragged piece image, `"<asset> <x> <y>"`.
    pub fn id(&self) -> String {
        format!("{} {}", self.material.asset(), self.from)
    }
}

impl FromStr for DragPayload {
    type Err = anyhow::Error;

    /// Parses a piece element id.
    fn from_str(s: &str) -> Result<Self> {
        let (asset, square) = s
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("Not a piece identifier: {s:?}"))?;
        Ok(Self::new(Material::from_asset(asset)?, square.parse()?))
    }
}

/// Where a piece was let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// An empty part of a cell.
    Cell(Square),
    /// A piece image sitting in a cell.
    Piece(Square),
    /// Anything else: the page margin, another widget.
    Outside,
}

impl DropTarget {
    /// Resolves an element id, either `"<x> <y>"` for a cell or
    /// `"<asset> <x> <y>"` for a piece image.
    pub fn from_id(id: &str) -> Self {
        if let Ok(square) = id.parse::<Square>() {
            return DropTarget::Cell(square);
        }
        match id.parse::<DragPayload>() {
            Ok(payload) => DropTarget::Piece(payload.from()),
            Err(_) => DropTarget::Outside,
        }
    }

    pub fn square(&self) -> Option<Square> {
        match *self {
            DropTarget::Cell(square) | DropTarget::Piece(square) => Some(square),
            DropTarget::Outside => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Accepted(Action),
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragPayload),
}

/// Turns one drag-and-drop into an `Action`, or a reason not to send one.
#[derive(Debug, Clone, Default)]
pub struct ActionBuilder {
    gesture: Gesture,
}

impl ActionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Only white pieces can be picked up, and nothing while a request is
    /// outstanding.
    pub fn can_drag(&self, material: Material, busy: bool) -> bool {
        !busy && material.color() == HUMAN_SIDE
    }

    pub fn begin_drag(
        &mut self,
        board: &BoardState,
        from: Square,
        busy: bool,
    ) -> Result<DragPayload, Rejection> {
        let material = board[from].ok_or(Rejection::EmptySquare(from))?;
        if busy {
            return Err(Rejection::Busy);
        }
        if !self.can_drag(material, busy) {
            return Err(Rejection::NotYourPiece(from));
        }
        let payload = DragPayload::new(material, from);
        self.gesture = Gesture::Dragging(payload);
        debug!(id = %payload.id(), "drag started");
        Ok(payload)
    }

    /// Finishes the gesture. Whatever the outcome the builder is idle
    /// afterwards.
    ///
    /// `payload` is the context attached to the drag; `legal`, when
    /// present, is the engine's list for the board being shown.
    pub fn drop(
        &mut self,
        payload: Option<DragPayload>,
        target: DropTarget,
        legal: Option<&LegalActions>,
    ) -> DropOutcome {
        self.gesture = Gesture::Idle;
        let outcome = Self::resolve(payload, target, legal);
        if let DropOutcome::Rejected(rejection) = outcome {
            debug!(%rejection, ?target, "drop rejected");
        }
        outcome
    }

    fn resolve(
        payload: Option<DragPayload>,
        target: DropTarget,
        legal: Option<&LegalActions>,
    ) -> DropOutcome {
        let Some(payload) = payload else {
            return DropOutcome::Rejected(Rejection::MalformedGesture);
        };
        let Some(to) = target.square() else {
            return DropOutcome::Rejected(Rejection::InvalidTarget);
        };
        let from = payload.from();
        if let Some(legal) = legal {
            if !legal.allows(from, to) {
                return DropOutcome::Rejected(Rejection::IllegalMove { from, to });
            }
        }
        DropOutcome::Accepted(Action::new(payload.material(), from, to))
    }
}
