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

//! Board state and the encodings it travels in
//!
//! The engine service owns the rules. This side of the wire only has to
//! carry positions and proposed moves back and forth without losing
//! anything, and refuse input that is structurally wrong.
//!
//! Some of the key abstractions include:
//!
//! * A `Square` is one of the 64 cells. Squares are numbered in the order
//!   they appear in board text: `x` is the column (0 is leftmost) and `y`
//!   the line (0 is the first line). The variants are named after the
//!   usual algebraic names, so `A8` is (0, 0) and `H1` is (7, 7). A
//!   square's surface identifier is `"<x> <y>"`.
//!
//! * A `Mask` is a 64-bit set of squares, used here for the destinations
//!   the engine allows from one origin.
//!
//! * `Material` is a `Piece` of a `Color`. Each of the twelve materials
//!   has exactly one board glyph (`♙`, `♞`, ...) and one asset reference
//!   (`assets/white_pawn.png`, ...). The empty square glyph is `□`.
//!
//! * A `BoardState` is the 8x8 grid. It is decoded from and encoded to the
//!   board text with `text::decode` / `text::encode` (also available as
//!   `FromStr` and `Display`).
//!
//! * A `Surface` is anything that draws cells. `read_current` rebuilds a
//!   board from a surface; `Projection` is the surface this crate draws
//!   itself, a plain projection of a `BoardState`.
//!
//! * An `Action` is a material moving from one square to another, and
//!   `LegalActions` the engine's advisory list of destinations per origin.
//!

mod glyph;
mod material;
mod moves;
mod position;
mod snapshot;
mod square;
pub mod text;

pub use glyph::*;
pub use material::*;
pub use moves::*;
pub use position::*;
pub use snapshot::*;
pub use square::*;
pub use text::FormatError;
