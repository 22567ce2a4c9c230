//! Behaviour statistics at round, match and tournament granularity.
//!
//! Throughout the crate a *trust* is a [`Move::Cooperate`] and a *betrayal* is a
//! [`Move::Defect`]. A *one-sided betrayal* is a round where one player defected while
//! the other cooperated; it is attributed to the player who defected.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::agent::PlayerId;
use crate::game_interface::Move;

/// What happened in a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundReport {
    /// Move of the first player.
    pub move_a: Move,
    /// Move of the second player.
    pub move_b: Move,
    /// Score of the first player.
    pub score_a: u32,
    /// Score of the second player.
    pub score_b: u32,
}

impl RoundReport {
    /// Who, if anyone, defected against a cooperating opponent.
    pub fn one_sided_betrayer(&self) -> Option<Role> {
        match (self.move_a, self.move_b) {
            (Move::Defect, Move::Cooperate) => Some(Role::A),
            (Move::Cooperate, Move::Defect) => Some(Role::B),
            _ => None,
        }
    }
}

/// Slot of a player within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// First player of the pairing.
    A,
    /// Second player of the pairing.
    B,
}

impl Role {
    fn index(self) -> usize {
        match self {
            Role::A => 0,
            Role::B => 1,
        }
    }
}

/// Counters that do not depend on who played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BehaviourTally {
    /// Cooperations, both players counted.
    pub trusts: u64,
    /// Defections, both players counted.
    pub betrayals: u64,
    /// Rounds where both cooperated.
    pub mutual_trusts: u64,
    /// Rounds where both defected.
    pub mutual_betrayals: u64,
    /// Rounds where exactly one player defected.
    pub one_sided_betrayals: u64,
}

impl BehaviourTally {
    fn record(&mut self, round: &RoundReport) {
        for m in [round.move_a, round.move_b] {
            match m {
                Move::Cooperate => self.trusts += 1,
                Move::Defect => self.betrayals += 1,
            }
        }
        match (round.move_a, round.move_b) {
            (Move::Cooperate, Move::Cooperate) => self.mutual_trusts += 1,
            (Move::Defect, Move::Defect) => self.mutual_betrayals += 1,
            _ => self.one_sided_betrayals += 1,
        }
    }

    fn merge(&mut self, other: &BehaviourTally) {
        self.trusts += other.trusts;
        self.betrayals += other.betrayals;
        self.mutual_trusts += other.mutual_trusts;
        self.mutual_betrayals += other.mutual_betrayals;
        self.one_sided_betrayals += other.one_sided_betrayals;
    }

    fn write_entries(&self, entries: &mut BTreeMap<String, u64>) {
        entries.insert("# trusts".to_owned(), self.trusts);
        entries.insert("# betrayals".to_owned(), self.betrayals);
        entries.insert("# mutual trusts".to_owned(), self.mutual_trusts);
        entries.insert("# mutual betrayals".to_owned(), self.mutual_betrayals);
        entries.insert("# one-sided betrayals".to_owned(), self.one_sided_betrayals);
    }
}

/// Counters of one player within a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleTally {
    /// Times this player cooperated.
    pub trusts: u64,
    /// Times this player defected.
    pub betrayals: u64,
    /// Times this player defected while the opponent cooperated.
    pub one_sided_betrayals: u64,
}

/// Statistics of a whole match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// First player.
    pub player_a: PlayerId,
    /// Second player.
    pub player_b: PlayerId,
    /// Rounds played.
    pub rounds: u64,
    /// Final score of `player_a`.
    pub score_a: u64,
    /// Final score of `player_b`.
    pub score_b: u64,
    /// Identity-agnostic counters, the only part folded into the tournament report.
    pub tally: BehaviourTally,
    /// Per-player counters, indexed by [`Role`].
    pub by_role: [RoleTally; 2],
}

impl MatchReport {
    pub(crate) fn new(player_a: PlayerId, player_b: PlayerId) -> Self {
        Self {
            player_a,
            player_b,
            rounds: 0,
            score_a: 0,
            score_b: 0,
            tally: BehaviourTally::default(),
            by_role: [RoleTally::default(); 2],
        }
    }

    pub(crate) fn record(&mut self, round: &RoundReport) {
        self.rounds += 1;
        self.score_a += u64::from(round.score_a);
        self.score_b += u64::from(round.score_b);
        self.tally.record(round);

        for (role, m) in [(Role::A, round.move_a), (Role::B, round.move_b)] {
            let counters = &mut self.by_role[role.index()];
            match m {
                Move::Cooperate => counters.trusts += 1,
                Move::Defect => counters.betrayals += 1,
            }
        }
        if let Some(role) = round.one_sided_betrayer() {
            self.by_role[role.index()].one_sided_betrayals += 1;
        }
    }

    /// Counters of one side of the match.
    pub fn role(&self, role: Role) -> &RoleTally {
        &self.by_role[role.index()]
    }

    /// Final scores, `(score_a, score_b)`.
    pub fn scores(&self) -> (u64, u64) {
        (self.score_a, self.score_b)
    }

    /// Named counters, including the ones qualified by player id
    /// (e.g. `"# trusts by 12"`, `"12 one-sided betrayals"`).
    pub fn entries(&self) -> BTreeMap<String, u64> {
        let mut entries = BTreeMap::new();
        self.tally.write_entries(&mut entries);
        for (id, role) in [(&self.player_a, Role::A), (&self.player_b, Role::B)] {
            let counters = self.role(role);
            entries.insert(format!("# trusts by {id}"), counters.trusts);
            entries.insert(format!("# betrayals by {id}"), counters.betrayals);
            entries.insert(
                format!("{id} one-sided betrayals"),
                counters.one_sided_betrayals,
            );
        }
        entries
    }
}

/// Statistics accumulated over every match of a tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TournamentReport {
    /// Matches folded in.
    pub matches: u64,
    /// Rounds played over all folded matches.
    pub rounds: u64,
    /// Identity-agnostic counters summed over all folded matches.
    pub tally: BehaviourTally,
}

impl TournamentReport {
    /// Add a finished match. The report is consumed so that it cannot be counted twice.
    pub(crate) fn fold(&mut self, report: MatchReport) {
        self.matches += 1;
        self.rounds += report.rounds;
        self.tally.merge(&report.tally);
    }

    /// Named counters. Only identity-agnostic keys are present.
    pub fn entries(&self) -> BTreeMap<String, u64> {
        let mut entries = BTreeMap::new();
        entries.insert("# matches".to_owned(), self.matches);
        entries.insert("# rounds".to_owned(), self.rounds);
        self.tally.write_entries(&mut entries);
        entries
    }
}
