//! In-memory tournament store shared by concurrent scorers.
//!
//! Each tournament sits behind its own mutex, so every status change and slot write of a
//! tournament is serialised while different tournaments proceed in parallel. The board
//! pool has one mutex of its own. Lock order is always tournament, then board pool.

use crate::models::{
    BoardPool, Dartboard, DartboardId, Tournament, TournamentError, TournamentId,
};
use std::collections::HashMap;
use std::sync::{Arc, LockResult, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
#[derive(Debug)]
pub struct TournamentEntry {
    pub tournament: Tournament,
    pub last_activity: Instant,
}

type SharedEntry = Arc<Mutex<TournamentEntry>>;

/// Staged updates keep the data consistent even if a writer panicked.
fn relock<'a, T>(result: LockResult<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct TournamentStore {
    tournaments: RwLock<HashMap<TournamentId, SharedEntry>>,
    boards: Mutex<BoardPool>,
}

impl TournamentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        let entry = Arc::new(Mutex::new(TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        }));
        self.tournaments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, entry);
        id
    }

    fn entry(&self, id: TournamentId) -> Result<SharedEntry, TournamentError> {
        self.tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    /// Snapshot of a tournament. Touching it refreshes last_activity.
    pub fn get(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let entry = self.entry(id)?;
        let mut guard = relock(entry.lock());
        guard.last_activity = Instant::now();
        Ok(guard.tournament.clone())
    }

    pub fn len(&self) -> usize {
        self.tournaments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run a tournament operation under that tournament's lock. Boards bound to matches
    /// that finished are released afterwards.
    pub fn update<T>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let entry = self.entry(id)?;
        let mut guard = relock(entry.lock());
        guard.last_activity = Instant::now();
        let out = guard.tournament.transaction(f)?;
        relock(self.boards.lock()).release_finished(&guard.tournament);
        Ok(out)
    }

    /// Run an operation that needs both a tournament and the board pool. Both are staged
    /// and committed together.
    pub fn update_with_boards<T>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament, &mut BoardPool) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let entry = self.entry(id)?;
        let mut guard = relock(entry.lock());
        guard.last_activity = Instant::now();
        let mut pool = relock(self.boards.lock());

        let mut staged_tournament = guard.tournament.clone();
        let mut staged_pool = pool.clone();
        let out = f(&mut staged_tournament, &mut staged_pool)?;
        staged_pool.release_finished(&staged_tournament);
        guard.tournament = staged_tournament;
        *pool = staged_pool;
        Ok(out)
    }

    /// Cancel hook: drop every binding the tournament holds.
    pub fn release_tournament_boards(&self, id: TournamentId) -> usize {
        relock(self.boards.lock()).release_tournament(id)
    }

    pub fn add_board(&self, number: u32, name: Option<String>) -> Result<Dartboard, TournamentError> {
        relock(self.boards.lock()).add(number, name)
    }

    pub fn remove_board(&self, id: DartboardId) -> Result<Dartboard, TournamentError> {
        relock(self.boards.lock()).remove(id)
    }

    pub fn board(&self, id: DartboardId) -> Result<Dartboard, TournamentError> {
        relock(self.boards.lock())
            .get(id)
            .cloned()
            .ok_or(TournamentError::BoardNotFound(id))
    }

    pub fn list_boards(&self, available_only: bool) -> Vec<Dartboard> {
        relock(self.boards.lock()).list(available_only)
    }

    /// Remove tournaments idle for at least `timeout`, releasing their boards.
    /// Returns how many were removed.
    pub fn evict_inactive(&self, timeout: Duration) -> usize {
        let mut map = self
            .tournaments
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let stale: Vec<TournamentId> = map
            .iter()
            .filter(|(_, entry)| relock(entry.lock()).last_activity.elapsed() >= timeout)
            .map(|(id, _)| *id)
            .collect();
        let mut pool = relock(self.boards.lock());
        for id in &stale {
            map.remove(id);
            pool.release_tournament(*id);
        }
        stale.len()
    }
}
