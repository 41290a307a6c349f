//! Match (game), its participant slots, and the match lifecycle status.

use crate::models::dartboard::DartboardId;
use crate::models::entrant::{Entrant, EntrantId, PlayerId, Roster};
use crate::models::position::{BracketPosition, Slot, SlotRef};
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Created; slots may still be open or no board assigned yet.
    #[default]
    Pending,
    /// Board assigned and both sides known; waiting for both to arrive.
    WaitingForPlayers,
    InProgress,
    /// Self-reports contradicted each other; only an admin resolution leaves this state.
    Disputed,
    Completed,
    Cancelled,
}

impl MatchStatus {
    /// Completed and cancelled matches are immutable.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::WaitingForPlayers => "waiting_for_players",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Disputed => "disputed",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side's claim about its own result.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfReport {
    #[default]
    Unset,
    Won,
    Lost,
}

impl SelfReport {
    pub fn from_won(won: bool) -> Self {
        if won {
            SelfReport::Won
        } else {
            SelfReport::Lost
        }
    }
}

/// Outcome of comparing both sides' self-reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Consensus {
    /// At least one side has not reported.
    Incomplete,
    /// Exactly one side claims the win.
    Agreed { winner: Slot },
    /// Both claim the win, or both claim the loss.
    Conflict,
}

impl Consensus {
    pub fn of(one: SelfReport, two: SelfReport) -> Self {
        use SelfReport::*;
        match (one, two) {
            (Unset, _) | (_, Unset) => Consensus::Incomplete,
            (Won, Lost) => Consensus::Agreed { winner: Slot::One },
            (Lost, Won) => Consensus::Agreed { winner: Slot::Two },
            (Won, Won) | (Lost, Lost) => Consensus::Conflict,
        }
    }
}

/// A member of a doubles side, as seated in a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeatedMember {
    pub player_id: PlayerId,
    pub team_position: u8,
}

/// Who occupies a slot: one player, or a team with its members grouped explicitly.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Side {
    Single { entrant_id: EntrantId },
    Team { team_id: EntrantId, members: Vec<SeatedMember> },
}

impl Side {
    pub fn for_entrant(entrant: &Entrant) -> Self {
        match &entrant.roster {
            Roster::Single => Side::Single { entrant_id: entrant.id },
            Roster::Team { members } => Side::Team {
                team_id: entrant.id,
                members: members
                    .iter()
                    .map(|m| SeatedMember {
                        player_id: m.player_id,
                        team_position: m.team_position,
                    })
                    .collect(),
            },
        }
    }

    /// The bracket entrant this side stands for (team id for doubles).
    pub fn entrant_id(&self) -> EntrantId {
        match self {
            Side::Single { entrant_id } => *entrant_id,
            Side::Team { team_id, .. } => *team_id,
        }
    }

    /// Whether `actor` may act for this side: the entrant itself or any team member.
    pub fn is_represented_by(&self, actor: Uuid) -> bool {
        match self {
            Side::Single { entrant_id } => *entrant_id == actor,
            Side::Team { team_id, members } => {
                *team_id == actor || members.iter().any(|m| m.player_id == actor)
            }
        }
    }
}

/// A side seated in a match slot, with its per-match state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchParticipant {
    pub side: Side,
    pub slot: Slot,
    pub legs_won: u32,
    pub sets_won: u32,
    pub arrived_at_board: bool,
    pub reported_win: SelfReport,
}

impl MatchParticipant {
    pub fn seat(side: Side, slot: Slot) -> Self {
        Self {
            side,
            slot,
            legs_won: 0,
            sets_won: 0,
            arrived_at_board: false,
            reported_win: SelfReport::Unset,
        }
    }

    pub fn entrant_id(&self) -> EntrantId {
        self.side.entrant_id()
    }
}

/// Contents of one of a match's two slots.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotEntry {
    /// Not decided yet; a placeholder waiting for an upstream result.
    #[default]
    Open,
    /// A ghost entrant: nobody will ever occupy this slot.
    Bye,
    Filled(MatchParticipant),
}

impl SlotEntry {
    pub fn participant(&self) -> Option<&MatchParticipant> {
        match self {
            SlotEntry::Filled(p) => Some(p),
            _ => None,
        }
    }

    pub fn participant_mut(&mut self) -> Option<&mut MatchParticipant> {
        match self {
            SlotEntry::Filled(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, SlotEntry::Open)
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, SlotEntry::Bye)
    }
}

/// A single bracket match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round_number: u32,
    /// Sequential within the tournament.
    pub match_number: u32,
    pub bracket_position: BracketPosition,
    pub round_name: String,
    pub status: MatchStatus,
    pub dartboard_id: Option<DartboardId>,
    /// Entrant id (team id for doubles) of the winner.
    pub winner_id: Option<EntrantId>,
    pub slots: [SlotEntry; 2],
    /// Fixed at generation time.
    pub winner_to: Option<SlotRef>,
    /// Fixed at generation time; only set in double elimination.
    pub loser_to: Option<SlotRef>,
    pub resolution_note: Option<String>,
    /// Bumped on every write; lets clients detect stale reads.
    pub version: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(
        tournament_id: TournamentId,
        round_number: u32,
        match_number: u32,
        bracket_position: BracketPosition,
        round_name: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round_number,
            match_number,
            bracket_position,
            round_name,
            status: MatchStatus::Pending,
            dartboard_id: None,
            winner_id: None,
            slots: [SlotEntry::Open, SlotEntry::Open],
            winner_to: None,
            loser_to: None,
            resolution_note: None,
            version: 0,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn slot(&self, slot: Slot) -> &SlotEntry {
        &self.slots[slot.index()]
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut SlotEntry {
        &mut self.slots[slot.index()]
    }

    /// Real participants in slot order.
    pub fn participants(&self) -> impl Iterator<Item = &MatchParticipant> {
        self.slots.iter().filter_map(SlotEntry::participant)
    }

    /// Both slots hold real entrants.
    pub fn is_fully_populated(&self) -> bool {
        self.slots.iter().all(|s| s.participant().is_some())
    }

    /// At least one slot still waits for an upstream result.
    pub fn has_placeholder(&self) -> bool {
        self.slots.iter().any(SlotEntry::is_open)
    }

    /// The slot whose side is the given entrant (team id for doubles).
    pub fn slot_of_entrant(&self, entrant_id: EntrantId) -> Option<Slot> {
        [Slot::One, Slot::Two].into_iter().find(|s| {
            self.slot(*s)
                .participant()
                .is_some_and(|p| p.entrant_id() == entrant_id)
        })
    }

    /// The slot `actor` may act for: entrant id, team id, or a team member's player id.
    pub fn slot_of_actor(&self, actor: Uuid) -> Option<Slot> {
        [Slot::One, Slot::Two].into_iter().find(|s| {
            self.slot(*s)
                .participant()
                .is_some_and(|p| p.side.is_represented_by(actor))
        })
    }

    pub fn consensus(&self) -> Consensus {
        let report = |s: Slot| {
            self.slot(s)
                .participant()
                .map(|p| p.reported_win)
                .unwrap_or_default()
        };
        Consensus::of(report(Slot::One), report(Slot::Two))
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }
}
