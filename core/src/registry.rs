use core::ops::Index;
use serde::{Deserialize, Serialize};

use crate::*;

/// One polygon of the source collection together with its game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    ring: Vec<Point>,
    centroid: Point,
    count: Option<f64>,
    path: String,
    neighbors: NeighborList,
    pub(crate) is_mine: bool,
    pub(crate) adj_mines: CellCount,
    pub(crate) state: CellState,
    pub(crate) boom: bool,
}

impl Cell {
    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn ring(&self) -> &[Point] {
        &self.ring
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn count(&self) -> Option<f64> {
        self.count
    }

    /// Cells without count data are inert and take no part in the game.
    pub fn is_zero(&self) -> bool {
        self.count.is_none()
    }

    /// Drawable outline in view coordinates.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    pub fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub fn adj_mines(&self) -> CellCount {
        self.adj_mines
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    /// Whether this is the mine the player set off.
    pub fn boom(&self) -> bool {
        self.boom
    }

    /// Mine-eligible and at or above the threshold.
    pub(crate) fn qualifies_as_mine(&self, threshold: f64) -> bool {
        self.count.is_some_and(|count| count >= threshold)
    }
}

/// In-order store of every cell, plus the view transform shared by all of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRegistry {
    cells: Vec<Cell>,
    view: ViewTransform,
}

impl CellRegistry {
    /// Builds unconnected cells from parsed features. Ids follow input order.
    pub fn from_raw(raw: Vec<RawCell>, view_config: &ViewConfig) -> Result<Self, LoadError> {
        let view = ViewTransform::fit_rings(raw.iter().map(|c| c.ring.as_slice()), view_config)
            .ok_or(LoadError::NoFeatures)?;

        let cells = raw
            .into_iter()
            .enumerate()
            .map(|(id, RawCell { ring, count })| {
                let centroid = centroid(&ring).ok_or(LoadError::EmptyRing { index: id })?;
                Ok(Cell {
                    id,
                    path: view.path_data(&ring),
                    ring,
                    centroid,
                    count,
                    neighbors: NeighborList::new(),
                    is_mine: false,
                    adj_mines: 0,
                    state: CellState::Hidden,
                    boom: false,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(Self { cells, view })
    }

    /// Parses a GeoJSON feature collection, derives geometry and builds the
    /// neighbor graph. Nothing is returned unless every step succeeds.
    pub fn load(json: &str, config: &BoardConfig) -> Result<Self, LoadError> {
        config.validate()?;
        let raw = parse_feature_collection(json, &config.count_field)?;
        let mut registry = Self::from_raw(raw, &config.view)?;
        log::debug!(
            "loaded {} cells ({} inert)",
            registry.len(),
            registry.iter().filter(|c| c.is_zero()).count()
        );

        let graph = NeighborGraph::build(&registry.centroids(), &config.neighbors);
        registry.connect(graph);
        Ok(registry)
    }

    /// Installs the neighbor lists of `graph`.
    ///
    /// # Panics
    ///
    /// Panics if `graph` does not cover exactly this registry's cells.
    pub fn connect(&mut self, graph: NeighborGraph) {
        assert_eq!(graph.len(), self.cells.len(), "graph does not match registry");
        for (cell, neighbors) in self.cells.iter_mut().zip(graph.into_lists()) {
            cell.neighbors = neighbors;
        }
    }

    /// Current adjacency as a standalone graph.
    pub fn neighbor_graph(&self) -> NeighborGraph {
        NeighborGraph::from_lists(self.cells.iter().map(|c| c.neighbors.clone()).collect())
    }

    pub fn centroids(&self) -> Vec<Point> {
        self.cells.iter().map(|c| c.centroid).collect()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn validate_id(&self, id: CellId) -> Result<CellId> {
        if id < self.cells.len() {
            Ok(id)
        } else {
            Err(GameError::InvalidCell(id))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id]
    }
}

impl Index<CellId> for CellRegistry {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Self::Output {
        &self.cells[id]
    }
}
