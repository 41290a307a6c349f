//! Bracket engine logic: generation, lifecycle, advancement, boards, disputes.

mod advancement;
mod boards;
mod bracket;
mod disputes;
mod grand_final;
mod lifecycle;
mod seeding;
mod setup;
mod topology;

pub use boards::{assign_board, auto_assign_boards, release_board};
pub use bracket::{generate_bracket, generate_bracket_with_rng};
pub use disputes::resolve_dispute;
pub use lifecycle::{
    cancel_match, ensure_version, record_arrival, record_score, record_winner, report_result,
};
pub use seeding::{seed_entrants, SeedingMethod};
pub use setup::{cancel_tournament, open_registration};
pub use topology::{seed_order, BracketShape, PlannedMatch, Routing};
