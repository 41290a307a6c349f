//! Dartboards: the shared pool of physical stations.

use crate::models::game::MatchId;
use crate::models::tournament::{Tournament, TournamentError, TournamentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a dartboard.
pub type DartboardId = Uuid;

/// The match currently occupying a board.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoardBinding {
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Dartboard {
    pub id: DartboardId,
    /// Board 1, 2, 3... unique within the pool.
    pub number: u32,
    /// Optional label like "Main Stage".
    pub name: Option<String>,
    pub binding: Option<BoardBinding>,
}

impl Dartboard {
    pub fn new(number: u32, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            name,
            binding: None,
        }
    }

    /// A board is available while nothing is bound to it.
    pub fn is_available(&self) -> bool {
        self.binding.is_none()
    }
}

/// Every board known to the venue, across tournaments.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoardPool {
    boards: Vec<Dartboard>,
}

impl BoardPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a board. Numbers must be unique.
    pub fn add(&mut self, number: u32, name: Option<String>) -> Result<Dartboard, TournamentError> {
        if number == 0 {
            return Err(TournamentError::InvalidBoardNumber);
        }
        if self.boards.iter().any(|b| b.number == number) {
            return Err(TournamentError::DuplicateBoardNumber(number));
        }
        let board = Dartboard::new(number, name);
        self.boards.push(board.clone());
        self.boards.sort_by_key(|b| b.number);
        Ok(board)
    }

    /// Remove a board that is not bound to any live match.
    pub fn remove(&mut self, id: DartboardId) -> Result<Dartboard, TournamentError> {
        let idx = self
            .boards
            .iter()
            .position(|b| b.id == id)
            .ok_or(TournamentError::BoardNotFound(id))?;
        if !self.boards[idx].is_available() {
            return Err(TournamentError::BoardInUse(id));
        }
        Ok(self.boards.remove(idx))
    }

    pub fn get(&self, id: DartboardId) -> Option<&Dartboard> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: DartboardId) -> Option<&mut Dartboard> {
        self.boards.iter_mut().find(|b| b.id == id)
    }

    /// All boards ordered by number, optionally only the available ones.
    pub fn list(&self, available_only: bool) -> Vec<Dartboard> {
        self.boards
            .iter()
            .filter(|b| !available_only || b.is_available())
            .cloned()
            .collect()
    }

    /// Ids of available boards in number order.
    pub fn available_ids(&self) -> Vec<DartboardId> {
        self.boards
            .iter()
            .filter(|b| b.is_available())
            .map(|b| b.id)
            .collect()
    }

    /// Unbind every board held by a match of `tournament` that is terminal, or that no
    /// longer references the board. Returns how many boards were freed.
    pub fn release_finished(&mut self, tournament: &Tournament) -> usize {
        let mut freed = 0;
        for board in &mut self.boards {
            let Some(binding) = board.binding else {
                continue;
            };
            if binding.tournament_id != tournament.id {
                continue;
            }
            let still_held = tournament
                .get_match(binding.match_id)
                .is_some_and(|m| !m.status.is_terminal() && m.dartboard_id == Some(board.id));
            if !still_held {
                board.binding = None;
                freed += 1;
            }
        }
        freed
    }

    /// Unbind every board held by `tournament`, whatever the match state.
    pub fn release_tournament(&mut self, tournament_id: TournamentId) -> usize {
        let mut freed = 0;
        for board in &mut self.boards {
            if board.binding.is_some_and(|b| b.tournament_id == tournament_id) {
                board.binding = None;
                freed += 1;
            }
        }
        freed
    }
}
