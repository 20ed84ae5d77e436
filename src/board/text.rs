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

//! The board text exchanged with the engine service: eight lines of eight
//! glyphs, each line terminated by `\n`. Line `y`, column `x` holds the
//! contents of `Square::new(x, y)`.

use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::glyph::EMPTY_GLYPH;
use super::material::Material;
use super::position::BoardState;
use super::square::{Square, BOARD_SIZE};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Expecting 8 lines, found {0}")]
    LineCount(usize),
    #[error("Expecting 8 glyphs on line {line}, found {found}")]
    RowLength { line: usize, found: usize },
    #[error("Unknown glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

use FormatError::*;

/// Decodes board text.
///
/// A single trailing newline is optional; anything else that is not exactly
/// eight rows of eight board glyphs fails with a `FormatError`.
pub fn decode(text: &str) -> Result<BoardState> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() != BOARD_SIZE {
        return Err(LineCount(lines.len()).into());
    }
    let mut board = BoardState::empty();
    for (y, line) in lines.into_iter().enumerate() {
        let found = line.chars().count();
        if found != BOARD_SIZE {
            return Err(RowLength { line: y, found }.into());
        }
        for (x, glyph) in line.chars().enumerate() {
            if glyph == EMPTY_GLYPH {
                continue;
            }
            let material = Material::from_glyph(glyph).map_err(|_| UnknownGlyph { glyph, x, y })?;
            if let Some(square) = Square::new(x, y) {
                board.place(square, material);
            }
        }
    }
    Ok(board)
}

pub fn encode(board: &BoardState) -> String {
    let mut text = String::with_capacity(BOARD_SIZE * (BOARD_SIZE * 3 + 1));
    for row in board.rows() {
        for cell in row {
            text.push(cell.map_or(EMPTY_GLYPH, |material| material.glyph()));
        }
        text.push('\n');
    }
    text
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for BoardState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use strum::IntoEnumIterator;

    const STANDARD: &str = "\
♜♞♝♛♚♝♞♜
♟♟♟♟♟♟♟♟
□□□□□□□□
□□□□□□□□
□□□□□□□□
□□□□□□□□
♙♙♙♙♙♙♙♙
♖♘♗♕♔♗♘♖
";

    fn scattered(rng: &mut StdRng, count: usize) -> BoardState {
        let mut squares: Vec<Square> = Square::iter().collect();
        squares.shuffle(rng);
        let materials: Vec<Material> = Material::all().collect();
        let mut board = BoardState::empty();
        for square in squares.into_iter().take(count) {
            board.place(square, materials[rng.gen_range(0..materials.len())]);
        }
        board
    }

    #[test]
    fn test_standard_text_decodes() {
        let board = decode(STANDARD).unwrap();
        assert_eq!(board, BoardState::standard());
        for (square, _) in board.pieces() {
            assert!([0, 1, 6, 7].contains(&square.y()));
        }
        assert_eq!(Square::iter().filter(|square| board[*square].is_none()).count(), 32);
    }
    #[test]
    fn test_standard_board_encodes() {
        assert_eq!(encode(&BoardState::standard()), STANDARD);
        assert_eq!(BoardState::standard().to_string(), STANDARD);
    }
    #[test]
    fn test_decode_orientation() {
        let text = STANDARD.replacen('□', "♕", 1);
        let board = decode(&text).unwrap();
        assert_eq!(board[Square::A6], Some(Material::WQ));
        assert_eq!(board[Square::new(0, 2).unwrap()], Some(Material::WQ));
    }
    #[test]
    fn test_trailing_newline_is_optional() {
        let board = decode(STANDARD.trim_end_matches('\n')).unwrap();
        assert_eq!(board, BoardState::standard());
    }
    #[test]
    fn test_boards_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for count in 0..=32 {
            let board = scattered(&mut rng, count);
            assert_eq!(board.pieces().count(), count);
            assert_eq!(decode(&encode(&board)).unwrap(), board);
        }
    }
    #[test]
    fn test_texts_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut alphabet: Vec<char> = Material::all().map(|material| material.glyph()).collect();
        alphabet.push(EMPTY_GLYPH);
        for _ in 0..50 {
            let mut text = String::new();
            for _ in 0..8 {
                for _ in 0..8 {
                    text.push(*alphabet.choose(&mut rng).unwrap());
                }
                text.push('\n');
            }
            assert_eq!(encode(&decode(&text).unwrap()), text);
        }
    }
    #[test]
    fn test_seven_lines_rejected() {
        let text: String = STANDARD.lines().take(7).map(|line| format!("{line}\n")).collect();
        let err = decode(&text).unwrap_err();
        assert_eq!(err.downcast_ref::<FormatError>(), Some(&LineCount(7)));
    }
    #[test]
    fn test_long_row_rejected() {
        let text = STANDARD.replacen("□□□□□□□□", "□□□□□□□□□", 1);
        let err = decode(&text).unwrap_err();
        assert_eq!(err.downcast_ref::<FormatError>(), Some(&RowLength { line: 2, found: 9 }));
    }
    #[test]
    fn test_unknown_glyph_rejected() {
        let text = STANDARD.replacen('□', "x", 1);
        let err = decode(&text).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormatError>(),
            Some(&UnknownGlyph { glyph: 'x', x: 0, y: 2 })
        );
    }
    #[test]
    fn test_spaced_rows_rejected() {
        let text = "♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜\n".repeat(8);
        assert!(decode(&text).is_err());
    }
    #[test]
    fn test_blank_ninth_line_rejected() {
        let text = format!("{STANDARD}\n");
        assert!(decode(&text).is_err());
    }
}
