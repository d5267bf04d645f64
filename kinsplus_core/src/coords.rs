//! Coordinate-letter parser.
//!
//! A coordinate string lists axis letters in joint order, e.g. `"XYZ"` or
//! `"xyzb w"`. The parser hands out one axis per call, skipping whitespace,
//! until the string is exhausted. Duplicate letters are accepted silently.

use thiserror::Error;

use crate::pose::Axis;

/// Parser failure modes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordsError {
    /// The next meaningful character is not a recognized axis letter.
    #[error("invalid character {0:?} in coordinates")]
    InvalidCharacter(char),

    /// The coordinate string is exhausted. Setup uses this as its
    /// loop-termination signal.
    #[error("no more coordinates")]
    EndOfCoordinates,
}

/// Cursor over a coordinate string.
#[derive(Debug, Clone)]
pub struct CoordinateParser<'a> {
    chars: std::str::Chars<'a>,
    consumed: usize,
}

impl<'a> CoordinateParser<'a> {
    /// Create a parser over `coordinates`.
    pub fn new(coordinates: &'a str) -> Self {
        Self {
            chars: coordinates.chars(),
            consumed: 0,
        }
    }

    /// Consume the next meaningful character and return its axis.
    ///
    /// Whitespace is skipped. An unrecognized non-whitespace character is an
    /// error; so is calling past the end of the string.
    pub fn next_axis(&mut self) -> Result<Axis, CoordsError> {
        for c in self.chars.by_ref() {
            if c.is_ascii_whitespace() {
                continue;
            }
            return match Axis::from_letter(c) {
                Some(axis) => {
                    self.consumed += 1;
                    Ok(axis)
                }
                None => Err(CoordsError::InvalidCharacter(c)),
            };
        }
        Err(CoordsError::EndOfCoordinates)
    }

    /// Number of coordinates successfully consumed so far.
    #[inline]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }
}
