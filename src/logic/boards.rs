//! Board assignment: binds pool boards to matches and feeds the "ready to play" signal.
//!
//! Each operation validates everything before touching either the tournament or the pool,
//! so a rejected call changes nothing.

use crate::logic::lifecycle::require_running;
use crate::models::{
    BoardBinding, BoardPool, DartboardId, MatchId, MatchStatus, Tournament, TournamentError,
};

fn bind(t: &mut Tournament, pool: &mut BoardPool, idx: usize, board_id: DartboardId) {
    let m = &mut t.matches[idx];
    if let Some(board) = pool.get_mut(board_id) {
        board.binding = Some(BoardBinding {
            tournament_id: m.tournament_id,
            match_id: m.id,
        });
    }
    m.dartboard_id = Some(board_id);
    if m.status == MatchStatus::Pending && m.is_fully_populated() {
        m.status = MatchStatus::WaitingForPlayers;
    }
    m.touch();
    log::debug!("Board {} assigned to {}", board_id, m.bracket_position);
}

/// Bind `board_id` to a match.
///
/// Rejected if the board is taken, the match already holds a board, or the match is
/// finished. A match with both sides known moves to waiting_for_players.
pub fn assign_board(
    tournament: &mut Tournament,
    pool: &mut BoardPool,
    match_id: MatchId,
    board_id: DartboardId,
) -> Result<(), TournamentError> {
    require_running(tournament, "assign boards")?;
    pool.release_finished(tournament);
    let idx = tournament.match_index(match_id)?;
    let m = &tournament.matches[idx];
    if m.status.is_terminal() {
        return Err(TournamentError::InvalidTransition {
            from: m.status,
            action: "assign a dartboard",
        });
    }
    if m.dartboard_id.is_some() {
        return Err(TournamentError::MatchHasBoard(match_id));
    }
    let board = pool
        .get(board_id)
        .ok_or(TournamentError::BoardNotFound(board_id))?;
    if !board.is_available() {
        return Err(TournamentError::BoardUnavailable(board_id));
    }
    bind(tournament, pool, idx, board_id);
    Ok(())
}

/// Free the board held by a match that has not completed.
///
/// A match waiting for players goes back to pending and forgets arrivals; a match in
/// progress keeps its status.
pub fn release_board(
    tournament: &mut Tournament,
    pool: &mut BoardPool,
    match_id: MatchId,
) -> Result<DartboardId, TournamentError> {
    require_running(tournament, "release boards")?;
    let idx = tournament.match_index(match_id)?;
    let m = &mut tournament.matches[idx];
    if m.status.is_terminal() {
        return Err(TournamentError::InvalidTransition {
            from: m.status,
            action: "release a dartboard",
        });
    }
    let board_id = m
        .dartboard_id
        .ok_or(TournamentError::MatchHasNoBoard(match_id))?;
    if let Some(board) = pool.get_mut(board_id) {
        if board.binding.is_some_and(|b| b.match_id == match_id) {
            board.binding = None;
        }
    }
    m.dartboard_id = None;
    if m.status == MatchStatus::WaitingForPlayers {
        m.status = MatchStatus::Pending;
        for slot in m.slots.iter_mut() {
            if let Some(p) = slot.participant_mut() {
                p.arrived_at_board = false;
            }
        }
    }
    m.touch();
    Ok(board_id)
}

/// Greedily pair boardless, fully seated matches with available boards, earliest
/// (round_number, match_number) first. Returns how many were assigned.
pub fn auto_assign_boards(
    tournament: &mut Tournament,
    pool: &mut BoardPool,
) -> Result<usize, TournamentError> {
    require_running(tournament, "assign boards")?;
    pool.release_finished(tournament);
    let mut waiting: Vec<usize> = tournament
        .matches
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            m.dartboard_id.is_none()
                && matches!(
                    m.status,
                    MatchStatus::Pending | MatchStatus::WaitingForPlayers | MatchStatus::InProgress
                )
                && !m.has_placeholder()
                && m.is_fully_populated()
        })
        .map(|(i, _)| i)
        .collect();
    waiting.sort_by_key(|&i| {
        let m = &tournament.matches[i];
        (m.round_number, m.match_number)
    });

    let boards = pool.available_ids();
    let mut assigned = 0;
    for (idx, board_id) in waiting.into_iter().zip(boards) {
        bind(tournament, pool, idx, board_id);
        assigned += 1;
    }
    if assigned > 0 {
        log::info!("Auto-assigned {} board(s) in tournament {}", assigned, tournament.id);
    }
    Ok(assigned)
}
