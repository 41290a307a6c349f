//! Shared helpers: build tournaments and drive matches through the full lifecycle.

#![allow(dead_code)]

use dart_bracket_engine::{
    assign_board, generate_bracket, record_arrival, record_winner, BoardPool, BracketPosition,
    Entrant, EntrantId, GameMatch, MatchId, MatchStatus, SeedingMethod, Slot, Tournament,
    TournamentFormat,
};
use std::collections::HashMap;

/// `n` single-player entrants named P1..Pn, in seed order.
pub fn entrants(n: usize) -> Vec<Entrant> {
    (1..=n).map(|i| Entrant::new(format!("P{i}"))).collect()
}

/// A tournament with its bracket generated for `n` entrants, seeded as listed.
pub fn started(format: TournamentFormat, n: usize) -> Tournament {
    let mut t = Tournament::new(format!("{n}-entrant cup"), format);
    generate_bracket(&mut t, entrants(n), SeedingMethod::AsListed).unwrap();
    t
}

pub fn pool_with_boards(count: u32) -> BoardPool {
    let mut pool = BoardPool::new();
    for number in 1..=count {
        pool.add(number, None).unwrap();
    }
    pool
}

pub fn at(t: &Tournament, code: &str) -> GameMatch {
    let position: BracketPosition = code.parse().unwrap();
    t.match_at(position)
        .unwrap_or_else(|| panic!("no match at {code}"))
        .clone()
}

pub fn entrant_in(m: &GameMatch, slot: Slot) -> EntrantId {
    m.slot(slot)
        .participant()
        .unwrap_or_else(|| panic!("{} slot {:?} is empty", m.bracket_position, slot))
        .entrant_id()
}

/// Take a match from pending to in progress: board, then both arrivals.
pub fn start_match(t: &mut Tournament, pool: &mut BoardPool, match_id: MatchId) {
    if t.get_match(match_id).unwrap().dartboard_id.is_none() {
        pool.release_finished(t);
        let board = pool.available_ids()[0];
        assign_board(t, pool, match_id, board).unwrap();
    }
    let ids: Vec<EntrantId> = t
        .get_match(match_id)
        .unwrap()
        .participants()
        .map(|p| p.entrant_id())
        .collect();
    for id in ids {
        record_arrival(t, match_id, id).unwrap();
    }
    assert_eq!(t.get_match(match_id).unwrap().status, MatchStatus::InProgress);
}

/// Play a match to completion with the side in `winner` winning.
pub fn play(t: &mut Tournament, pool: &mut BoardPool, match_id: MatchId, winner: Slot) {
    start_match(t, pool, match_id);
    let winner_id = entrant_in(t.get_match(match_id).unwrap(), winner);
    record_winner(t, match_id, winner_id).unwrap();
}

/// The earliest match that can be played right now.
pub fn next_playable(t: &Tournament) -> Option<MatchId> {
    t.matches
        .iter()
        .filter(|m| !m.status.is_terminal() && m.is_fully_populated())
        .min_by_key(|m| (m.round_number, m.match_number))
        .map(|m| m.id)
}

/// Play every match until nothing is playable, choosing winners with `pick`.
pub fn play_out(t: &mut Tournament, mut pick: impl FnMut(&GameMatch) -> Slot) {
    let mut pool = pool_with_boards(1);
    while let Some(id) = next_playable(t) {
        let slot = pick(t.get_match(id).unwrap());
        play(t, &mut pool, id, slot);
    }
}

/// Losses per entrant over every completed two-sided match.
pub fn losses(t: &Tournament) -> HashMap<EntrantId, usize> {
    let mut out: HashMap<EntrantId, usize> = t.entrants.iter().map(|e| (e.id, 0)).collect();
    for m in &t.matches {
        if m.status != MatchStatus::Completed || !m.is_fully_populated() {
            continue;
        }
        let winner = m.winner_id.unwrap();
        for p in m.participants() {
            if p.entrant_id() != winner {
                *out.entry(p.entrant_id()).or_default() += 1;
            }
        }
    }
    out
}
