//! Shareable text form of an obstacle layout.
//!
//! A layout travels as `torus:v1:<columns>x<rows>:<cells>`, where `<cells>`
//! is unpadded base64 over a JSON list of blocked cells.

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use torus_snake_core::{Cell, ObstacleSet};

const SCHEME: &str = "torus";
const FORMAT_VERSION: &str = "v1";
const SEPARATOR: char = ':';
const SECTIONS: usize = 4;

/// Obstacle layout together with the board it was captured on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ObstacleLayout {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    /// Blocked cells in ascending order.
    pub(crate) obstacles: Vec<Cell>,
}

impl ObstacleLayout {
    pub(crate) fn capture(columns: u32, rows: u32, obstacles: &ObstacleSet) -> Self {
        Self {
            columns,
            rows,
            obstacles: obstacles.iter().collect(),
        }
    }

    /// Single-line transfer string for this layout.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let cells = CellList {
            obstacles: self.obstacles.clone(),
        };
        let json = serde_json::to_vec(&cells).map_err(LayoutTransferError::Json)?;
        Ok(format!(
            "{SCHEME}{SEPARATOR}{FORMAT_VERSION}{SEPARATOR}{}x{}{SEPARATOR}{}",
            self.columns,
            self.rows,
            STANDARD_NO_PAD.encode(json)
        ))
    }

    /// Parses a transfer string, checking every cell against the declared board.
    pub(crate) fn decode(text: &str) -> Result<Self, LayoutTransferError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LayoutTransferError::Blank);
        }

        let sections: Vec<&str> = text.splitn(SECTIONS, SEPARATOR).collect();
        let [scheme, version, board, cells] = sections[..] else {
            return Err(LayoutTransferError::Truncated {
                found: sections.len(),
            });
        };
        if scheme != SCHEME {
            return Err(LayoutTransferError::ForeignScheme(scheme.to_owned()));
        }
        if version != FORMAT_VERSION {
            return Err(LayoutTransferError::UnknownVersion(version.to_owned()));
        }

        let (columns, rows) = parse_board(board)?;
        let json = STANDARD_NO_PAD
            .decode(cells)
            .map_err(LayoutTransferError::Base64)?;
        let CellList { obstacles } =
            serde_json::from_slice(&json).map_err(LayoutTransferError::Json)?;

        match obstacles
            .iter()
            .find(|cell| cell.column() >= columns || cell.row() >= rows)
        {
            Some(cell) => Err(LayoutTransferError::CellOutOfBounds(*cell)),
            None => Ok(Self {
                columns,
                rows,
                obstacles,
            }),
        }
    }

    pub(crate) fn to_obstacles(&self) -> ObstacleSet {
        self.obstacles.iter().copied().collect()
    }
}

#[derive(Serialize, Deserialize)]
struct CellList {
    obstacles: Vec<Cell>,
}

/// Reasons a transfer string cannot be produced or read back.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// Nothing but whitespace was supplied.
    Blank,
    /// Fewer than four `:`-separated sections were present.
    Truncated {
        /// Number of sections actually found.
        found: usize,
    },
    /// The string was produced by something other than this game.
    ForeignScheme(String),
    /// The format revision is not one this build reads.
    UnknownVersion(String),
    /// The `<columns>x<rows>` section is malformed or describes an empty board.
    BadDimensions(String),
    Base64(base64::DecodeError),
    Json(serde_json::Error),
    /// A listed obstacle lies outside the declared board.
    CellOutOfBounds(Cell),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("no layout given"),
            Self::Truncated { found } => write!(
                f,
                "expected {SECTIONS} layout sections separated by '{SEPARATOR}', found {found}"
            ),
            Self::ForeignScheme(scheme) => {
                write!(f, "'{scheme}' layouts cannot be loaded, expected '{SCHEME}'")
            }
            Self::UnknownVersion(version) => {
                write!(f, "layout format {version} is unknown, expected {FORMAT_VERSION}")
            }
            Self::BadDimensions(board) => {
                write!(f, "board size '{board}' is not <columns>x<rows>")
            }
            Self::Base64(error) => write!(f, "cell list is not base64: {error}"),
            Self::Json(error) => write!(f, "cell list is not valid JSON: {error}"),
            Self::CellOutOfBounds(cell) => {
                write!(f, "obstacle {cell} lies outside the declared board")
            }
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Base64(error) => Some(error),
            Self::Json(error) => Some(error),
            Self::Blank
            | Self::Truncated { .. }
            | Self::ForeignScheme(_)
            | Self::UnknownVersion(_)
            | Self::BadDimensions(_)
            | Self::CellOutOfBounds(_) => None,
        }
    }
}

fn parse_board(board: &str) -> Result<(u32, u32), LayoutTransferError> {
    let malformed = || LayoutTransferError::BadDimensions(board.to_owned());
    let (columns, rows) = board.split_once('x').ok_or_else(malformed)?;
    let columns: u32 = columns.parse().map_err(|_| malformed())?;
    let rows: u32 = rows.parse().map_err(|_| malformed())?;
    if columns == 0 || rows == 0 {
        return Err(malformed());
    }
    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populated_layout_survives_transfer() {
        let obstacles: ObstacleSet = [Cell::new(5, 7), Cell::new(12, 4)].into_iter().collect();
        let layout = ObstacleLayout::capture(20, 15, &obstacles);

        let encoded = layout.encode().expect("layout encodes");
        assert!(encoded.starts_with("torus:v1:20x15:"));

        let decoded = ObstacleLayout::decode(&encoded).expect("layout decodes");
        assert_eq!(decoded, layout);
        assert_eq!(decoded.to_obstacles(), obstacles);
    }

    #[test]
    fn foreign_scheme_is_rejected() {
        assert!(matches!(
            ObstacleLayout::decode("maze:v1:10x10:e30"),
            Err(LayoutTransferError::ForeignScheme(scheme)) if scheme == "maze"
        ));
    }

    #[test]
    fn obstacles_outside_the_board_are_rejected() {
        let layout = ObstacleLayout {
            columns: 4,
            rows: 4,
            obstacles: vec![Cell::new(4, 1)],
        };
        let encoded = layout.encode().expect("layout encodes");
        assert!(matches!(
            ObstacleLayout::decode(&encoded),
            Err(LayoutTransferError::CellOutOfBounds(cell)) if cell == Cell::new(4, 1)
        ));
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(
            ObstacleLayout::decode("torus:v1:10by8:e30"),
            Err(LayoutTransferError::BadDimensions(_))
        ));
        assert!(matches!(
            ObstacleLayout::decode("torus:v1:10x8"),
            Err(LayoutTransferError::Truncated { found: 3 })
        ));
        assert!(matches!(
            ObstacleLayout::decode("   "),
            Err(LayoutTransferError::Blank)
        ));
        assert!(matches!(
            ObstacleLayout::decode("torus:v2:10x8:e30"),
            Err(LayoutTransferError::UnknownVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            ObstacleLayout::decode("torus:v1:0x8:e30"),
            Err(LayoutTransferError::BadDimensions(_))
        ));
    }
}
