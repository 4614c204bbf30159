/// Stable index of a cell, assigned in input order at load time.
pub type CellId = usize;

/// Count type used for adjacency counts and aggregate cell totals.
pub type CellCount = u32;

/// Neighbor list storage; flat-top hex cells have at most six real neighbors.
pub type NeighborList = smallvec::SmallVec<[CellId; 6]>;

pub(crate) fn to_count(n: usize) -> CellCount {
    CellCount::try_from(n).unwrap_or(CellCount::MAX)
}
