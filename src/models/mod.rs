//! Data structures for the bracket engine: entrants, matches, boards, tournament state.

mod dartboard;
mod entrant;
mod game;
mod position;
mod tournament;

pub use dartboard::{BoardBinding, BoardPool, Dartboard, DartboardId};
pub use entrant::{Entrant, EntrantId, PlayerId, Roster, TeamMember};
pub use game::{
    Consensus, GameMatch, MatchId, MatchParticipant, MatchStatus, SeatedMember, SelfReport, Side,
    SlotEntry,
};
pub use position::{BracketPosition, BracketSide, ParsePositionError, Slot, SlotRef};
pub use tournament::{
    ErrorKind, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
