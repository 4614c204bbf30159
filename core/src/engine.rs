use core::num::Saturating;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
///
/// Mine assignment puts any state back to InProgress.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GameState {
    /// Indicates the game has ended and player input is ignored
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A game over one loaded registry: owns the cells and every counter derived from them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    registry: CellRegistry,
    threshold: f64,
    state: GameState,
    revealed_count: Saturating<CellCount>,
    total_safe: CellCount,
    mine_count: CellCount,
    flagged_count: Saturating<CellCount>,
    #[serde(skip)]
    changes: Vec<CellId>,
}

impl GameSession {
    pub fn new(registry: CellRegistry, threshold: f64) -> Self {
        let mut session = Self {
            registry,
            threshold,
            state: GameState::InProgress,
            revealed_count: Saturating(0),
            total_safe: 0,
            mine_count: 0,
            flagged_count: Saturating(0),
            changes: Vec::new(),
        };
        session.assign_mines(threshold);
        session
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn total_safe(&self) -> CellCount {
        self.total_safe
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count.0
    }

    pub fn mines_left(&self) -> i64 {
        i64::from(self.mine_count) - i64::from(self.flagged_count.0)
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.registry.get(id)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.registry.iter()
    }

    /// Count per cell for display, absent counts as zero.
    pub fn count_distribution(&self) -> Vec<f64> {
        self.registry
            .iter()
            .map(|c| c.count().unwrap_or(0.0))
            .collect()
    }

    /// Ids of cells touched since the last call, sorted and without repeats.
    pub fn take_changes(&mut self) -> Vec<CellId> {
        let mut changes = core::mem::take(&mut self.changes);
        changes.sort_unstable();
        changes.dedup();
        changes
    }

    /// Reclassifies every cell against `threshold` and starts a fresh game.
    ///
    /// The result depends only on counts, `threshold` and the neighbor lists,
    /// so repeating the call is harmless.
    pub fn assign_mines(&mut self, threshold: f64) {
        self.threshold = threshold;

        for cell in self.registry.iter_mut() {
            cell.is_mine = cell.qualifies_as_mine(threshold);
            cell.adj_mines = 0;
            cell.state = CellState::Hidden;
            cell.boom = false;
        }

        let mines: Vec<bool> = self.registry.iter().map(|c| c.is_mine()).collect();
        for cell in self.registry.iter_mut() {
            let adjacent = cell.neighbors().iter().filter(|&&n| mines[n]).count();
            cell.adj_mines = to_count(adjacent);
        }

        self.mine_count = to_count(mines.iter().filter(|&&m| m).count());
        self.total_safe = to_count(
            self.registry
                .iter()
                .filter(|c| !c.is_zero() && !c.is_mine())
                .count(),
        );
        self.revealed_count = Saturating(0);
        self.flagged_count = Saturating(0);
        self.state = GameState::InProgress;
        self.changes = (0..self.registry.len()).collect();

        log::debug!(
            "threshold {}: {} mines, {} safe cells",
            threshold,
            self.mine_count,
            self.total_safe
        );
    }

    /// Starts over with the current threshold.
    pub fn reset(&mut self) {
        self.assign_mines(self.threshold);
    }

    pub fn toggle_flag(&mut self, id: CellId) -> Result<FlagOutcome> {
        use FlagOutcome::*;

        let id = self.registry.validate_id(id)?;
        if self.state.is_finished() || self.registry[id].is_zero() {
            return Ok(NoChange);
        }

        let cell = self.registry.cell_mut(id);
        let outcome = match cell.state {
            CellState::Hidden => {
                cell.state = CellState::Flagged;
                self.flagged_count += 1;
                Changed
            }
            CellState::Flagged => {
                cell.state = CellState::Hidden;
                self.flagged_count -= 1;
                Changed
            }
            CellState::Revealed => NoChange,
        };
        if outcome.has_update() {
            self.changes.push(id);
        }
        Ok(outcome)
    }

    pub fn reveal(&mut self, id: CellId) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let id = self.registry.validate_id(id)?;
        let cell = &self.registry[id];
        if self.state.is_finished() || cell.is_zero() || cell.state() != CellState::Hidden {
            return Ok(NoChange);
        }

        if cell.is_mine() {
            self.explode(id);
            return Ok(HitMine);
        }

        if cell.adj_mines() == 0 {
            self.flood_reveal(id);
        } else {
            self.registry.cell_mut(id).state = CellState::Revealed;
            self.revealed_count += 1;
            self.changes.push(id);
        }

        Ok(if self.check_win() { Won } else { Revealed })
    }

    /// Breadth-first reveal from a zero cell. Cells with adjacent mines are
    /// revealed but do not spread further; mines and inert cells are never queued.
    fn flood_reveal(&mut self, start: CellId) {
        let mut seen = HashSet::new();
        let mut to_visit = VecDeque::from([start]);

        while let Some(id) = to_visit.pop_front() {
            if !seen.insert(id) {
                continue;
            }

            let cell = self.registry.cell_mut(id);
            match cell.state {
                CellState::Revealed => continue,
                CellState::Flagged => self.flagged_count -= 1,
                CellState::Hidden => {}
            }
            cell.state = CellState::Revealed;
            self.revealed_count += 1;
            self.changes.push(id);

            if cell.adj_mines() == 0 {
                let registry = &self.registry;
                to_visit.extend(registry[id].neighbors().iter().copied().filter(|&n| {
                    let neighbor = &registry[n];
                    neighbor.state() != CellState::Revealed
                        && !neighbor.is_mine()
                        && !neighbor.is_zero()
                        && !seen.contains(&n)
                }));
            }
        }
    }

    /// Uncovers the whole board after the player set off the mine at `id`.
    fn explode(&mut self, id: CellId) {
        self.registry.cell_mut(id).boom = true;
        for cell in self.registry.iter_mut() {
            if cell.is_mine() || !cell.is_zero() {
                cell.state = CellState::Revealed;
            }
        }
        self.changes.extend(self.registry.iter().filter(|c| !c.is_zero()).map(|c| c.id()));
        self.revealed_count = Saturating(self.total_safe);
        self.flagged_count = Saturating(0);
        self.state = GameState::Lost;
        log::info!("mine hit at cell {id}, game lost");
    }

    fn check_win(&mut self) -> bool {
        if self.total_safe > 0 && self.revealed_count.0 >= self.total_safe {
            self.state = GameState::Won;
            log::info!("all {} safe cells revealed, game won", self.total_safe);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    const THRESHOLD: f64 = 15.0;

    /// Mine 0 in the middle of three safe cells, plus an inert cell 4.
    fn star() -> GameSession {
        let counts = [Some(20.0), Some(1.0), Some(1.0), Some(1.0), None];
        let registry = registry_with_edges(&counts, &[(0, 1), (0, 2), (0, 3), (3, 4)]);
        GameSession::new(registry, THRESHOLD)
    }

    fn lattice_session() -> GameSession {
        let json = hex_lattice_geojson(6, 6, |id| match id % 7 {
            0 => Some(30.0),
            3 => None,
            _ => Some(2.0),
        });
        let registry = CellRegistry::load(&json, &BoardConfig::default()).unwrap();
        GameSession::new(registry, THRESHOLD)
    }

    fn mine_fields(session: &GameSession) -> Vec<(bool, CellCount)> {
        session.cells().map(|c| (c.is_mine(), c.adj_mines())).collect()
    }

    #[test]
    fn assign_mines_is_idempotent() {
        let mut session = lattice_session();
        let first = (mine_fields(&session), session.total_safe());

        session.assign_mines(THRESHOLD);
        session.assign_mines(THRESHOLD);

        assert_eq!((mine_fields(&session), session.total_safe()), first);
    }

    #[test]
    fn total_safe_counts_playable_non_mines() {
        let session = lattice_session();

        let expected = session.cells().filter(|c| !c.is_zero() && !c.is_mine()).count();
        assert_eq!(session.total_safe() as usize, expected);
        assert!(session.cells().filter(|c| c.is_zero()).all(|c| !c.is_mine()));
        assert!(session.mine_count() > 0);
    }

    #[test]
    fn adj_mines_counts_mine_neighbors() {
        let session = lattice_session();

        for cell in session.cells() {
            let expected = cell
                .neighbors()
                .iter()
                .filter(|&&n| session.registry()[n].is_mine())
                .count();
            assert_eq!(cell.adj_mines() as usize, expected);
        }
    }

    #[test]
    fn threshold_change_reclassifies_cells() {
        let mut session = GameSession::new(
            line_registry(&[Some(1.0), Some(20.0), Some(1.0)]),
            THRESHOLD,
        );

        assert!(session.registry()[1].is_mine());
        assert_eq!(session.registry()[0].adj_mines(), 1);
        assert_eq!(session.registry()[2].adj_mines(), 1);
        assert_eq!(session.total_safe(), 2);

        session.assign_mines(25.0);

        assert!(!session.registry()[1].is_mine());
        assert_eq!(session.registry()[0].adj_mines(), 0);
        assert_eq!(session.registry()[2].adj_mines(), 0);
        assert_eq!(session.total_safe(), 3);
        assert_eq!(session.threshold(), 25.0);
    }

    #[test]
    fn count_equal_to_threshold_is_a_mine() {
        let session = GameSession::new(line_registry(&[Some(15.0), Some(14.9)]), THRESHOLD);

        assert!(session.registry()[0].is_mine());
        assert!(!session.registry()[1].is_mine());
    }

    #[test]
    fn revealing_every_safe_cell_wins_on_the_last_one() {
        let mut session = star();
        assert_eq!(session.total_safe(), 3);

        assert_eq!(session.reveal(1).unwrap(), RevealOutcome::Revealed);
        assert_eq!(session.reveal(2).unwrap(), RevealOutcome::Revealed);
        assert_eq!(session.state(), GameState::InProgress);
        assert_eq!(session.revealed_count(), 2);

        assert_eq!(session.reveal(3).unwrap(), RevealOutcome::Won);
        assert_eq!(session.state(), GameState::Won);
        assert_eq!(session.revealed_count(), 3);

        assert_eq!(session.reveal(0).unwrap(), RevealOutcome::NoChange);
        assert!(!session.registry()[0].boom());
    }

    #[test]
    fn hitting_a_mine_reveals_board_and_locks_it() {
        let mut session = star();
        session.reveal(1).unwrap();
        session.toggle_flag(2).unwrap();

        assert_eq!(session.reveal(0).unwrap(), RevealOutcome::HitMine);

        assert_eq!(session.state(), GameState::Lost);
        assert!(session.registry()[0].boom());
        assert!(session.cells().skip(1).all(|c| !c.boom()));
        for id in 0..4 {
            assert_eq!(session.registry()[id].state(), CellState::Revealed);
        }
        assert_eq!(session.registry()[4].state(), CellState::Hidden);
        assert_eq!(session.revealed_count(), session.total_safe());
        assert_eq!(session.flagged_count(), 0);

        assert_eq!(session.reveal(3).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag(3).unwrap(), FlagOutcome::NoChange);
    }

    #[test]
    fn inert_cells_never_change() {
        let mut session = star();

        assert!(session.registry()[4].is_zero());
        assert_eq!(session.reveal(4).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag(4).unwrap(), FlagOutcome::NoChange);
        assert_eq!(session.registry()[4].state(), CellState::Hidden);

        session.assign_mines(0.0);
        assert!(session.registry()[4].is_zero());
        assert!(!session.registry()[4].is_mine());

        session.reveal(0).unwrap();
        assert_eq!(session.state(), GameState::Lost);
        assert_eq!(session.reveal(4).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.registry()[4].state(), CellState::Hidden);
    }

    #[test]
    fn flags_toggle_and_block_reveal() {
        let mut session = star();

        assert_eq!(session.toggle_flag(1).unwrap(), FlagOutcome::Changed);
        assert_eq!(session.flagged_count(), 1);
        assert_eq!(session.mines_left(), 0);
        assert_eq!(session.reveal(1).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.registry()[1].state(), CellState::Flagged);

        assert_eq!(session.toggle_flag(1).unwrap(), FlagOutcome::Changed);
        assert_eq!(session.registry()[1].state(), CellState::Hidden);
        assert_eq!(session.reveal(1).unwrap(), RevealOutcome::Revealed);
        assert_eq!(session.toggle_flag(1).unwrap(), FlagOutcome::NoChange);
    }

    #[test]
    fn restored_session_with_stale_counters_does_not_underflow() {
        let mut session = star();
        session.toggle_flag(1).unwrap();
        let mut saved = serde_json::to_value(&session).unwrap();
        saved["flagged_count"] = serde_json::json!(0);

        let mut session: GameSession = serde_json::from_value(saved).unwrap();

        assert_eq!(session.toggle_flag(1).unwrap(), FlagOutcome::Changed);
        assert_eq!(session.flagged_count(), 0);
        assert_eq!(session.registry()[1].state(), CellState::Hidden);
    }

    #[test]
    fn flood_stops_at_mine_adjacent_cells() {
        let counts = [Some(1.0), Some(1.0), Some(1.0), Some(20.0), Some(1.0), Some(1.0)];
        let mut session = GameSession::new(line_registry(&counts), THRESHOLD);

        assert_eq!(session.reveal(0).unwrap(), RevealOutcome::Revealed);

        let states: Vec<_> = session.cells().map(|c| c.state()).collect();
        use CellState::*;
        assert_eq!(states, vec![Revealed, Revealed, Revealed, Hidden, Hidden, Hidden]);
        assert_eq!(session.revealed_count(), 3);
    }

    #[test]
    fn flood_skips_inert_cells() {
        let mut session = GameSession::new(line_registry(&[Some(1.0), None, Some(1.0)]), THRESHOLD);

        session.reveal(0).unwrap();

        assert_eq!(session.registry()[1].state(), CellState::Hidden);
        assert_eq!(session.registry()[2].state(), CellState::Hidden);
        assert_eq!(session.revealed_count(), 1);
    }

    #[test]
    fn flood_terminates_on_cycles_and_counts_once() {
        let edges: Vec<_> = (0..6).map(|i| (i, (i + 1) % 6)).chain([(0, 3), (1, 4)]).collect();
        let mut session = GameSession::new(registry_with_edges(&[Some(1.0); 6], &edges), THRESHOLD);

        assert_eq!(session.reveal(2).unwrap(), RevealOutcome::Won);
        assert_eq!(session.revealed_count(), 6);
        assert_eq!(session.total_safe(), 6);
    }

    #[test]
    fn flood_clears_flags_it_passes_over() {
        let mut session = GameSession::new(line_registry(&[Some(1.0); 3]), THRESHOLD);
        session.toggle_flag(2).unwrap();

        assert_eq!(session.reveal(0).unwrap(), RevealOutcome::Won);
        assert_eq!(session.registry()[2].state(), CellState::Revealed);
        assert_eq!(session.flagged_count(), 0);
    }

    #[test]
    fn revealed_count_stays_within_total_safe() {
        let mut session = lattice_session();
        let mut last = 0;

        for id in 0..session.registry().len() {
            let is_mine = session.registry()[id].is_mine();
            if is_mine {
                continue;
            }
            session.reveal(id).unwrap();
            assert!(session.revealed_count() >= last);
            assert!(session.revealed_count() <= session.total_safe());
            last = session.revealed_count();
        }

        assert_eq!(session.state(), GameState::Won);
        assert!(session.cells().filter(|c| c.is_mine()).all(|c| c.state() == CellState::Hidden));
    }

    #[test]
    fn reset_starts_a_fresh_game() {
        let mut session = star();
        session.reveal(0).unwrap();
        assert_eq!(session.state(), GameState::Lost);

        session.reset();

        assert_eq!(session.state(), GameState::InProgress);
        assert_eq!(session.revealed_count(), 0);
        assert!(session.cells().all(|c| c.state() == CellState::Hidden && !c.boom()));
        assert_eq!(session.threshold(), THRESHOLD);
    }

    #[test]
    fn no_safe_cells_never_wins() {
        let mut session = GameSession::new(line_registry(&[Some(20.0), None]), THRESHOLD);

        assert_eq!(session.total_safe(), 0);
        assert_eq!(session.reveal(1).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.state(), GameState::InProgress);
    }

    #[test]
    fn invalid_ids_are_errors() {
        let mut session = star();

        assert_eq!(session.reveal(99), Err(GameError::InvalidCell(99)));
        assert_eq!(session.toggle_flag(5), Err(GameError::InvalidCell(5)));
    }

    #[test]
    fn changes_record_touched_cells() {
        let counts = [Some(1.0), Some(1.0), Some(20.0), Some(1.0)];
        let mut session = GameSession::new(line_registry(&counts), THRESHOLD);
        assert_eq!(session.take_changes(), vec![0, 1, 2, 3]);

        session.reveal(0).unwrap();
        assert_eq!(session.take_changes(), vec![0, 1]);

        session.toggle_flag(2).unwrap();
        session.toggle_flag(2).unwrap();
        assert_eq!(session.take_changes(), vec![2]);
        assert!(session.take_changes().is_empty());
    }

    #[test]
    fn count_distribution_maps_absent_to_zero() {
        let session = star();

        assert_eq!(session.count_distribution(), vec![20.0, 1.0, 1.0, 1.0, 0.0]);
    }
}
