//! Dart league bracket engine: library with models, bracket logic and a shared store.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::Settings;
pub use logic::{
    assign_board, auto_assign_boards, cancel_match, cancel_tournament, ensure_version,
    generate_bracket, generate_bracket_with_rng, open_registration, record_arrival, record_score,
    record_winner, release_board, report_result, resolve_dispute, seed_entrants, seed_order,
    BracketShape, Routing, SeedingMethod,
};
pub use models::{
    BoardPool, BracketPosition, Dartboard, DartboardId, Entrant, EntrantId, ErrorKind, GameMatch,
    MatchId, MatchParticipant, MatchStatus, SelfReport, Side, Slot, SlotEntry, SlotRef, Tournament,
    TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
pub use store::TournamentStore;
