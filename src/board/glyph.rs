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

//! Conversions between the three ways a piece is named: the board glyph
//! used on the wire, the asset reference a surface draws, and `Material`.
//!
//! The mapping is a bijection over the twelve piece identities. The empty
//! square glyph `□` is part of the board alphabet but has no asset, so the
//! functions here reject it and callers handle emptiness first.

use anyhow::Result;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::material::{Color, Material, Piece};

pub const EMPTY_GLYPH: char = '□';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GlyphError {
    #[error("Not a piece glyph: {0:?}")]
    UnknownGlyph(char),
    #[error("Not a piece asset: {0:?}")]
    UnknownAsset(String),
}

use GlyphError::*;

// Indexed by `Material::to_index`: black bishop, king, knight, pawn, queen,
// rook, then the white pieces in the same order.
const GLYPHS: [char; 12] = [
    '♝', '♚', '♞', '♟', '♛', '♜',
    '♗', '♔', '♘', '♙', '♕', '♖',
];

const ASSETS: [&str; 12] = [
    "assets/black_bishop.png",
    "assets/black_king.png",
    "assets/black_knight.png",
    "assets/black_pawn.png",
    "assets/black_queen.png",
    "assets/black_rook.png",
    "assets/white_bishop.png",
    "assets/white_king.png",
    "assets/white_knight.png",
    "assets/white_pawn.png",
    "assets/white_queen.png",
    "assets/white_rook.png",
];

static MATERIALS: Lazy<Vec<Material>> = Lazy::new(|| {
    let mut materials: Vec<Material> = Color::iter()
        .flat_map(|color| Piece::iter().map(move |piece| Material::new(color, piece)))
        .collect();
    materials.sort_by_key(|material| material.to_index());
    materials
});

static BY_GLYPH: Lazy<HashMap<char, Material>> = Lazy::new(|| {
    MATERIALS
        .iter()
        .map(|material| (GLYPHS[material.to_index()], *material))
        .collect()
});

static BY_ASSET: Lazy<HashMap<&'static str, Material>> = Lazy::new(|| {
    MATERIALS
        .iter()
        .map(|material| (ASSETS[material.to_index()], *material))
        .collect()
});

impl Material {
    #[inline]
    pub fn glyph(&self) -> char {
        GLYPHS[self.to_index()]
    }

    #[inline]
    pub fn asset(&self) -> &'static str {
        ASSETS[self.to_index()]
    }

    /// # Errors
    ///
    /// Returns `GlyphError::UnknownGlyph` for the empty glyph and for any
    /// character outside the board alphabet.
    pub fn from_glyph(glyph: char) -> Result<Self> {
        BY_GLYPH
            .get(&glyph)
            .copied()
            .ok_or_else(|| UnknownGlyph(glyph).into())
    }

    /// # Errors
    ///
    /// Returns `GlyphError::UnknownAsset` for any reference not in the
    /// twelve-entry asset table.
    pub fn from_asset(asset: &str) -> Result<Self> {
        BY_ASSET
            .get(asset)
            .copied()
            .ok_or_else(|| UnknownAsset(asset.to_string()).into())
    }

    /// Every piece identity, in `to_index` order.
    pub fn all() -> impl Iterator<Item = Material> {
        MATERIALS.iter().copied()
    }
}

/// Either spelling of a piece identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity<'a> {
    Glyph(char),
    Asset(&'a str),
}

impl From<char> for Identity<'_> {
    fn from(value: char) -> Self {
        Identity::Glyph(value)
    }
}

impl<'a> From<&'a str> for Identity<'a> {
    fn from(value: &'a str) -> Self {
        Identity::Asset(value)
    }
}

impl Identity<'_> {
    pub fn material(&self) -> Result<Material> {
        match *self {
            Identity::Glyph(glyph) => Material::from_glyph(glyph),
            Identity::Asset(asset) => Material::from_asset(asset),
        }
    }
}

pub fn glyph_to_asset(glyph: char) -> Result<&'static str> {
    Ok(Material::from_glyph(glyph)?.asset())
}

pub fn asset_to_glyph(asset: &str) -> Result<char> {
    Ok(Material::from_asset(asset)?.glyph())
}

/// # Errors
///
/// Fails for anything that is not one of the twelve piece identities,
/// including the empty glyph.
pub fn is_white<'a, I: Into<Identity<'a>>>(identity: I) -> Result<bool> {
    Ok(identity.into().material()?.is_white())
}

/// True for the thirteen characters a board text may contain.
#[inline]
pub fn is_board_glyph(glyph: char) -> bool {
    glyph == EMPTY_GLYPH || BY_GLYPH.contains_key(&glyph)
}
