//! Integration tests for dispute resolution.

mod common;

use common::{at, entrant_in, pool_with_boards, start_match, started};
use dart_bracket_engine::{
    report_result, resolve_dispute, EntrantId, MatchStatus, Slot, Tournament, TournamentError,
    TournamentFormat,
};
use uuid::Uuid;

/// Tournament with R1M1 disputed (both sides claimed the win). Returns both entrant ids.
fn disputed(format: TournamentFormat) -> (Tournament, Uuid, EntrantId, EntrantId) {
    let mut t = started(format, 4);
    let mut pool = pool_with_boards(1);
    let code = match format {
        TournamentFormat::DoubleElimination => "WR1M1",
        _ => "R1M1",
    };
    let m = at(&t, code);
    start_match(&mut t, &mut pool, m.id);
    let (one, two) = (entrant_in(&m, Slot::One), entrant_in(&m, Slot::Two));
    report_result(&mut t, m.id, one, true).unwrap();
    report_result(&mut t, m.id, two, true).unwrap();
    assert_eq!(t.get_match(m.id).unwrap().status, MatchStatus::Disputed);
    (t, m.id, one, two)
}

#[test]
fn resolution_completes_and_advances() {
    let (mut t, id, _, two) = disputed(TournamentFormat::SingleElimination);
    resolve_dispute(&mut t, id, two, Some("  Marker saw the double-16  ".into())).unwrap();

    let m = t.get_match(id).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner_id, Some(two));
    assert_eq!(m.resolution_note.as_deref(), Some("Marker saw the double-16"));
    assert_eq!(entrant_in(&at(&t, "R2M1"), Slot::One), two);
}

#[test]
fn resolution_sends_the_loser_to_the_losers_bracket() {
    let (mut t, id, one, two) = disputed(TournamentFormat::DoubleElimination);
    resolve_dispute(&mut t, id, one, None).unwrap();
    assert_eq!(entrant_in(&at(&t, "WR2M1"), Slot::One), one);
    assert_eq!(entrant_in(&at(&t, "LR1M1"), Slot::One), two);
    assert!(t.get_match(id).unwrap().resolution_note.is_none());
}

#[test]
fn blank_note_is_dropped() {
    let (mut t, id, one, _) = disputed(TournamentFormat::SingleElimination);
    resolve_dispute(&mut t, id, one, Some("   ".into())).unwrap();
    assert!(t.get_match(id).unwrap().resolution_note.is_none());
}

#[test]
fn winner_must_be_in_the_match() {
    let (mut t, id, _, _) = disputed(TournamentFormat::SingleElimination);
    let outsider = Uuid::new_v4();
    assert_eq!(
        resolve_dispute(&mut t, id, outsider, None),
        Err(TournamentError::WinnerNotParticipant(outsider))
    );
    assert_eq!(t.get_match(id).unwrap().status, MatchStatus::Disputed);
}

#[test]
fn repeated_resolution_is_idempotent() {
    let (mut t, id, one, two) = disputed(TournamentFormat::SingleElimination);
    resolve_dispute(&mut t, id, one, Some("first".into())).unwrap();
    let snapshot = t.matches.clone();
    resolve_dispute(&mut t, id, one, Some("second".into())).unwrap();
    assert_eq!(t.matches, snapshot);
    assert_eq!(
        resolve_dispute(&mut t, id, two, None),
        Err(TournamentError::AlreadyCompleted { match_id: id })
    );
}

#[test]
fn only_disputed_matches_can_be_resolved() {
    let mut t = started(TournamentFormat::SingleElimination, 4);
    let m = at(&t, "R1M1");
    let err = resolve_dispute(&mut t, m.id, entrant_in(&m, Slot::One), None).unwrap_err();
    assert!(matches!(err, TournamentError::InvalidTransition { from: MatchStatus::Pending, .. }));
}

#[test]
fn self_reports_cannot_reopen_a_dispute() {
    let (mut t, id, one, _) = disputed(TournamentFormat::SingleElimination);
    // Repeating the same claim is accepted, changing it is not.
    assert_eq!(report_result(&mut t, id, one, true), Ok(MatchStatus::Disputed));
    assert!(matches!(
        report_result(&mut t, id, one, false),
        Err(TournamentError::InvalidTransition { from: MatchStatus::Disputed, .. })
    ));
}
