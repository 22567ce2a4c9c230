//! Registered players and pairwise results of a tournament.
//!
//! [`ResultStore`] is the single source of truth for who plays and what was scored. Every
//! failing call leaves it untouched. It is not synchronised by itself: the judge keeps it
//! behind a mutex so that registrations and commits never overlap.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::agent::PlayerId;
use crate::error::TournamentError;

/// A committed result, scores in the order of the players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairResult {
    /// First player of the pair.
    pub player_a: PlayerId,
    /// Second player of the pair.
    pub player_b: PlayerId,
    /// Total score of `player_a` over the match.
    pub score_a: u64,
    /// Total score of `player_b` over the match.
    pub score_b: u64,
}

/// Key of the unordered pair `{a, b}`: the smaller id always comes first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey(PlayerId, PlayerId);

impl PairKey {
    /// Returns the key and whether `a` and `b` were swapped to build it.
    fn of(a: &PlayerId, b: &PlayerId) -> (PairKey, bool) {
        if a <= b {
            (PairKey(a.clone(), b.clone()), false)
        } else {
            (PairKey(b.clone(), a.clone()), true)
        }
    }
}

/// Holds the registered players and the result of every match played so far.
#[derive(Debug, Default)]
pub struct ResultStore {
    players: HashSet<PlayerId>,
    // scores in key order
    results: HashMap<PairKey, (u64, u64)>,
    closed: bool,
}

impl ResultStore {
    /// An empty store, open for registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player.
    ///
    /// # Errors
    /// - [`TournamentError::RegistrationClosed`] once any result was committed
    /// - [`TournamentError::DuplicatePlayer`] if `id` is already registered
    pub fn register(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        if self.closed {
            return Err(TournamentError::RegistrationClosed);
        }
        if self.players.contains(&id) {
            return Err(TournamentError::DuplicatePlayer(id));
        }
        self.players.insert(id);
        Ok(())
    }

    /// Record the scores of the match between `a` and `b`, and close registration for
    /// good.
    ///
    /// # Errors
    /// - [`TournamentError::UnknownPlayer`] if either player is not registered
    /// - [`TournamentError::SelfMatch`] if `a == b`
    /// - [`TournamentError::DuplicateResult`] if the pair, in any order, already has a
    ///   result
    pub fn commit(
        &mut self,
        a: &PlayerId,
        b: &PlayerId,
        score_a: u64,
        score_b: u64,
    ) -> Result<(), TournamentError> {
        self.check_registered(a, b)?;
        if a == b {
            return Err(TournamentError::SelfMatch(a.clone()));
        }

        let (key, swapped) = PairKey::of(a, b);
        if self.results.contains_key(&key) {
            return Err(TournamentError::DuplicateResult(a.clone(), b.clone()));
        }
        let scores = if swapped {
            (score_b, score_a)
        } else {
            (score_a, score_b)
        };
        self.results.insert(key, scores);
        self.closed = true;
        Ok(())
    }

    /// Scores of the match between `a` and `b`, in that order.
    ///
    /// # Errors
    /// - [`TournamentError::UnknownPlayer`] if either player is not registered
    /// - [`TournamentError::ResultNotFound`] if they have not played yet
    pub fn result_for(&self, a: &PlayerId, b: &PlayerId) -> Result<(u64, u64), TournamentError> {
        self.check_registered(a, b)?;
        let (key, swapped) = PairKey::of(a, b);
        match self.results.get(&key) {
            Some(&(x, y)) if swapped => Ok((y, x)),
            Some(&scores) => Ok(scores),
            None => Err(TournamentError::ResultNotFound(a.clone(), b.clone())),
        }
    }

    /// Whether `id` is registered.
    pub fn is_registered(&self, id: &PlayerId) -> bool {
        self.players.contains(id)
    }

    /// Whether registration is closed (at least one result was committed).
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of committed results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True if no result was committed yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Registered players, in no particular order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.iter()
    }

    /// Every committed result, sorted by pair.
    pub fn snapshot(&self) -> Vec<PairResult> {
        let mut all = self
            .results
            .iter()
            .map(|(PairKey(a, b), &(score_a, score_b))| PairResult {
                player_a: a.clone(),
                player_b: b.clone(),
                score_a,
                score_b,
            })
            .collect::<Vec<_>>();
        all.sort_by(|x, y| (&x.player_a, &x.player_b).cmp(&(&y.player_a, &y.player_b)));
        all
    }

    /// Sum of every committed score per registered player.
    pub fn totals(&self) -> HashMap<PlayerId, u64> {
        let mut totals: HashMap<PlayerId, u64> =
            self.players.iter().map(|id| (id.clone(), 0)).collect();
        for (PairKey(a, b), &(score_a, score_b)) in &self.results {
            *totals.entry(a.clone()).or_default() += score_a;
            *totals.entry(b.clone()).or_default() += score_b;
        }
        totals
    }

    fn check_registered(&self, a: &PlayerId, b: &PlayerId) -> Result<(), TournamentError> {
        for id in [a, b] {
            if !self.players.contains(id) {
                return Err(TournamentError::UnknownPlayer(id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> ResultStore {
        let mut store = ResultStore::new();
        for name in names {
            store.register(PlayerId::new(name)).unwrap();
        }
        store
    }

    fn id(name: &str) -> PlayerId {
        PlayerId::new(name)
    }

    #[test]
    fn test_duplicate_player() {
        let mut store = store_with(&["1"]);
        assert_eq!(
            store.register(id("1")),
            Err(TournamentError::DuplicatePlayer(id("1")))
        );
    }

    #[test]
    fn test_registration_closes_on_first_commit() {
        let mut store = store_with(&["1", "2"]);
        assert!(!store.is_closed());
        store.commit(&id("1"), &id("2"), 9, 9).unwrap();
        assert!(store.is_closed());
        assert_eq!(
            store.register(id("3")),
            Err(TournamentError::RegistrationClosed)
        );
        assert!(!store.is_registered(&id("3")));
    }

    #[test]
    fn test_closed_wins_over_duplicate() {
        let mut store = store_with(&["1", "2"]);
        store.commit(&id("1"), &id("2"), 0, 0).unwrap();
        assert_eq!(
            store.register(id("1")),
            Err(TournamentError::RegistrationClosed)
        );
    }

    #[test]
    fn test_commit_unknown_player() {
        let mut store = store_with(&["1"]);
        assert_eq!(
            store.commit(&id("1"), &id("ghost"), 1, 1),
            Err(TournamentError::UnknownPlayer(id("ghost")))
        );
        // failed commit must not close registration
        assert!(!store.is_closed());
        assert!(store.is_empty());
    }

    #[test]
    fn test_self_match_rejected() {
        let mut store = store_with(&["1"]);
        assert_eq!(
            store.commit(&id("1"), &id("1"), 1, 1),
            Err(TournamentError::SelfMatch(id("1")))
        );
        assert!(!store.is_closed());
    }

    #[test]
    fn test_duplicate_result_keeps_first() {
        let mut store = store_with(&["1", "2"]);
        store.commit(&id("1"), &id("2"), 10, 0).unwrap();

        assert_eq!(
            store.commit(&id("2"), &id("1"), 3, 3),
            Err(TournamentError::DuplicateResult(id("2"), id("1")))
        );
        assert_eq!(
            store.commit(&id("1"), &id("2"), 3, 3),
            Err(TournamentError::DuplicateResult(id("1"), id("2")))
        );
        assert_eq!(store.result_for(&id("1"), &id("2")), Ok((10, 0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_result_for_swaps_roles() {
        let mut store = store_with(&["b", "a"]);
        // committed in the "wrong" order relative to the key
        store.commit(&id("b"), &id("a"), 7, 2).unwrap();
        assert_eq!(store.result_for(&id("b"), &id("a")), Ok((7, 2)));
        assert_eq!(store.result_for(&id("a"), &id("b")), Ok((2, 7)));
    }

    #[test]
    fn test_result_not_found_and_unknown() {
        let store = store_with(&["1", "2"]);
        assert_eq!(
            store.result_for(&id("1"), &id("2")),
            Err(TournamentError::ResultNotFound(id("1"), id("2")))
        );
        assert_eq!(
            store.result_for(&id("3"), &id("2")),
            Err(TournamentError::UnknownPlayer(id("3")))
        );
    }

    #[test]
    fn test_snapshot_and_totals() {
        let mut store = store_with(&["1", "2", "3"]);
        store.commit(&id("2"), &id("1"), 5, 0).unwrap();
        store.commit(&id("1"), &id("3"), 3, 3).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(
            snapshot,
            vec![
                PairResult {
                    player_a: id("1"),
                    player_b: id("2"),
                    score_a: 0,
                    score_b: 5,
                },
                PairResult {
                    player_a: id("1"),
                    player_b: id("3"),
                    score_a: 3,
                    score_b: 3,
                },
            ]
        );

        let totals = store.totals();
        assert_eq!(totals[&id("1")], 3);
        assert_eq!(totals[&id("2")], 5);
        assert_eq!(totals[&id("3")], 3);
    }
}
