//! Minesweeper over a real-world hexagonal grid.
//!
//! Polygon features become [`Cell`]s in a [`CellRegistry`], a
//! [`NeighborGraph`] recovers their hex adjacency from centroid spacing, and a
//! [`GameSession`] assigns mines by count threshold and plays the board.

pub use config::*;
pub use engine::*;
pub use error::*;
pub use geometry::*;
pub use load::*;
pub use neighbors::*;
pub use registry::*;
pub use source::{RawCell, parse_count, parse_feature_collection};
pub use tile::*;
pub use types::*;
pub use view::*;

mod config;
mod engine;
mod error;
mod geometry;
mod load;
mod neighbors;
mod registry;
mod source;
mod tile;
mod types;
mod view;

#[cfg(test)]
mod fixtures;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}
