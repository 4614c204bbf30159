use serde::{Deserialize, Serialize};

use crate::*;

/// What the presentation layer needs to draw one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub id: CellId,
    pub path: String,
    pub state: CellState,
    pub is_zero: bool,
    pub is_mine: bool,
    pub boom: bool,
    pub adj_mines: CellCount,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            id: cell.id(),
            path: cell.path().into(),
            state: cell.state(),
            is_zero: cell.is_zero(),
            is_mine: cell.is_mine(),
            boom: cell.boom(),
            adj_mines: cell.adj_mines(),
        }
    }
}

/// Full board plus the aggregates shown in the status line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: f64,
    pub height: f64,
    pub state: GameState,
    pub threshold: f64,
    pub revealed_count: CellCount,
    pub total_safe: CellCount,
    pub cells: Vec<CellView>,
}

impl GameSession {
    pub fn snapshot(&self) -> BoardSnapshot {
        let view = self.registry().view();
        BoardSnapshot {
            width: view.width(),
            height: view.height(),
            state: self.state(),
            threshold: self.threshold(),
            revealed_count: self.revealed_count(),
            total_safe: self.total_safe(),
            cells: self.cells().map(CellView::from).collect(),
        }
    }

    /// Views of the cells touched since the last call, for incremental redraws.
    pub fn take_changed_views(&mut self) -> Vec<CellView> {
        let changes = self.take_changes();
        changes
            .into_iter()
            .map(|id| CellView::from(&self.registry()[id]))
            .collect()
    }
}
