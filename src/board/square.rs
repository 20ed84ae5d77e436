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
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use strum_macros::EnumIter;
use thiserror::Error;

pub const BOARD_SIZE: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SquareError {
    #[error("Coordinates ({0}, {1}) are off the board (expecting 0..8)")]
    OutOfRange(i64, i64),
    #[error("Not a square identifier: {0:?}")]
    BadIdentifier(String),
}

use SquareError::*;

/// Squares in the order they appear in board text. `A8` is the first glyph
/// of the first line (x = 0, y = 0) and `H1` the last glyph of the last line.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Square {
    A8, B8, C8, D8, E8, F8, G8, H8,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A1, B1, C1, D1, E1, F1, G1, H1,
}

use Square::{
    A8, B8, C8, D8, E8, F8, G8, H8,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A1, B1, C1, D1, E1, F1, G1, H1,
};

impl Square {
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        const VALUES: [Square; 64] = [
            A8, B8, C8, D8, E8, F8, G8, H8,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A1, B1, C1, D1, E1, F1, G1, H1,
        ];
        debug_assert!(index < 64);
        VALUES[index]
    }

    /// Square at column `x` of line `y`, or `None` when either is off the board.
    #[inline]
    pub const fn new(x: usize, y: usize) -> Option<Self> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Self::from_index(y * BOARD_SIZE + x))
        } else {
            None
        }
    }

    /// Same as `new` but for signed wire coordinates.
    ///
    /// # Errors
    ///
    /// Returns `SquareError::OutOfRange` when either coordinate is outside `0..8`.
    pub fn try_from_coords(x: i64, y: i64) -> Result<Self> {
        let x_ok = usize::try_from(x).ok().filter(|x| *x < BOARD_SIZE);
        let y_ok = usize::try_from(y).ok().filter(|y| *y < BOARD_SIZE);
        match (x_ok, y_ok) {
            (Some(x), Some(y)) => Ok(Self::from_index(y * BOARD_SIZE + x)),
            _ => Err(OutOfRange(x, y).into()),
        }
    }

    #[inline]
    pub const fn to_index(&self) -> usize {
        *self as usize
    }
    #[inline]
    pub const fn to_mask(&self) -> Mask {
        Mask::new(0x1 << (63 - self.to_index()))
    }
    #[inline]
    pub const fn x(&self) -> usize {
        self.to_index() % BOARD_SIZE
    }
    #[inline]
    pub const fn y(&self) -> usize {
        self.to_index() / BOARD_SIZE
    }
    #[inline]
    pub const fn is_light(&self) -> bool {
        (self.x() + self.y()) % 2 == 0
    }
}

/// Formats the square as its surface identifier, `"<x> <y>"`.
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x(), self.y())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || -> anyhow::Error { BadIdentifier(s.to_string()).into() };
        let (x, y) = s.split_once(' ').ok_or_else(bad)?;
        let x: usize = x.parse().map_err(|_| bad())?;
        let y: usize = y.parse().map_err(|_| bad())?;
        Self::new(x, y).ok_or_else(bad)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask(u64);

impl Mask {
    #[inline]
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_squares<I>(squares: I) -> Self
    where
        I: IntoIterator<Item = Square>,
    {
        squares
            .into_iter()
            .map(|square| square.to_mask())
            .reduce(|m1, m2| m1 | m2)
            .unwrap_or_default()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn set(&mut self, square: Square) {
        self.0 |= square.to_mask().0;
    }

    #[inline]
    pub const fn contains(&self, square: Square) -> bool {
        (self.0 & square.to_mask().0) != 0
    }

    pub fn iter(&self) -> MaskIter {
        MaskIter(self.0)
    }
}

impl FromIterator<Square> for Mask {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        Self::from_squares(iter)
    }
}

impl BitOr for Mask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign<Square> for Mask {
    fn bitor_assign(&mut self, rhs: Square) {
        self.0 |= rhs.to_mask().0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskIter(u64);

impl Iterator for MaskIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            let square = Square::from_index(self.0.leading_zeros() as usize);
            self.0 &= !square.to_mask().0;
            return Some(square);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_order_matches_coordinates() {
        assert_eq!(Square::new(0, 0), Some(A8));
        assert_eq!(Square::new(7, 7), Some(H1));
        assert_eq!(Square::new(4, 1), Some(E7));
        assert_eq!(E2.x(), 4);
        assert_eq!(E2.y(), 6);
    }
    #[test]
    fn test_off_board_is_none() {
        assert_eq!(Square::new(8, 0), None);
        assert_eq!(Square::new(0, 8), None);
        assert!(Square::try_from_coords(-1, 3).is_err());
        assert!(Square::try_from_coords(3, 8).is_err());
        assert_eq!(Square::try_from_coords(3, 4).unwrap(), D4);
    }
    #[test]
    fn test_identifier_format() {
        assert_eq!(E7.to_string(), "4 1");
        assert_eq!("4 3".parse::<Square>().unwrap(), E5);
    }
    #[test]
    fn test_identifier_rejects_malformed() {
        assert!("4".parse::<Square>().is_err());
        assert!("4  3".parse::<Square>().is_err());
        assert!("4 8".parse::<Square>().is_err());
        assert!("a b".parse::<Square>().is_err());
        let err = "9 9".parse::<Square>().unwrap_err();
        assert_eq!(
            err.downcast_ref::<SquareError>(),
            Some(&BadIdentifier("9 9".to_string()))
        );
    }
    #[test]
    fn test_mask_iterates_in_text_order() {
        let mask: Mask = [E5, E6, A8].into_iter().collect();
        assert_eq!(mask.len(), 3);
        assert!(mask.contains(E6));
        assert!(!mask.contains(E4));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![A8, E6, E5]);
    }
    #[test]
    fn test_light_squares() {
        assert!(A8.is_light());
        assert!(!B8.is_light());
        assert!(H1.is_light());
    }
}
