//! Deduplicator.
//!
//! Collapses multiple book-specific quotes of the same logical bet into one
//! winner. The grouping key is the candidate's `pick_id` — a content hash
//! of identity attributes that deliberately excludes score and book, so
//! quotes of the same bet always collide. Within a group, the best score
//! wins; score ties resolve purely by the fixed preferred-book ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info};

use super::ScoredPick;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Fixed sportsbook preference ordering used to break score ties. Index 0
/// is the most preferred; books not in the list share the lowest
/// preference (priority = list length).
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub preferred_books: Vec<String>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            preferred_books: [
                "novig",
                "prophetx",
                "pinnacle",
                "draftkings",
                "fanduel",
                "betmgm",
                "caesars",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Priority of a quoting book: its index in the preferred ordering, or the
/// list length when unlisted. Lower is better.
pub fn book_priority(book: &str, cfg: &DedupConfig) -> usize {
    let book = book.trim();
    cfg.preferred_books
        .iter()
        .position(|b| b.eq_ignore_ascii_case(book))
        .unwrap_or(cfg.preferred_books.len())
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Audit record for one identity group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupGroup {
    /// The canonical key (pick_id) the group collapsed on.
    pub key: String,
    /// Number of quotes seen for this identity.
    pub quotes: usize,
    pub kept_book: String,
    pub dropped_books: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub kept: Vec<ScoredPick>,
    pub dropped: usize,
    pub groups: Vec<DedupGroup>,
}

/// Partition by canonical identity and keep one winner per group.
///
/// Group output order follows first appearance in the input, and the
/// per-group sort is stable, so identical inputs always produce identical
/// outputs.
pub fn dedupe(picks: Vec<ScoredPick>, cfg: &DedupConfig) -> DedupOutcome {
    let total = picks.len();
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Vec<ScoredPick>> = HashMap::new();

    for pick in picks {
        let key = pick.pick.pick_id.clone();
        if !by_key.contains_key(&key) {
            order.push(key.clone());
        }
        by_key.entry(key).or_default().push(pick);
    }

    let mut kept = Vec::with_capacity(order.len());
    let mut groups = Vec::with_capacity(order.len());
    let mut dropped = 0;

    for key in order {
        let mut group = by_key.remove(&key).unwrap_or_default();
        group.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    book_priority(&a.pick.book, cfg).cmp(&book_priority(&b.pick.book, cfg))
                })
        });

        let winner = group.remove(0);
        dropped += group.len();

        if !group.is_empty() {
            debug!(
                key = %key,
                kept_book = %winner.pick.book,
                kept_score = format!("{:.2}", winner.final_score),
                dropped = group.len(),
                "Collapsed duplicate quotes"
            );
        }

        groups.push(DedupGroup {
            key,
            quotes: group.len() + 1,
            kept_book: winner.pick.book.clone(),
            dropped_books: group.iter().map(|p| p.pick.book.clone()).collect(),
        });
        kept.push(winner);
    }

    info!(
        candidates_in = total,
        kept = kept.len(),
        dropped,
        "Deduplication complete"
    );

    DedupOutcome {
        kept,
        dropped,
        groups,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::titanium::{classify, TitaniumConfig};
    use crate::types::{CandidatePick, RawCandidate, Tier};

    fn scored(event: &str, player: &str, book: &str, score: f64) -> ScoredPick {
        let pick = CandidatePick::from_raw(&RawCandidate {
            sport: Some("nba".into()),
            event_id: Some(event.into()),
            market: Some("player_points".into()),
            side: Some("over".into()),
            line: Some(27.5),
            player_name: if player.is_empty() {
                None
            } else {
                Some(player.into())
            },
            book: Some(book.into()),
            ..Default::default()
        });
        let titanium = classify(&pick.scores, &TitaniumConfig::default());
        ScoredPick {
            pick,
            final_score: score,
            titanium,
            tier: Tier::Standard,
            reasons: Vec::new(),
        }
    }

    #[test]
    fn test_three_quotes_collapse_to_best_score() {
        let picks = vec![
            scored("E-1", "Jayson Tatum", "draftkings", 7.5),
            scored("E-1", "Jayson Tatum", "fanduel", 8.2),
            scored("E-1", "Jayson Tatum", "betmgm", 7.9),
        ];
        let out = dedupe(picks, &DedupConfig::default());
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.dropped, 2);
        assert!((out.kept[0].final_score - 8.2).abs() < 1e-10);
        assert_eq!(out.kept[0].pick.book, "fanduel");
    }

    #[test]
    fn test_score_tie_resolves_by_book_priority() {
        // novig is the designated primary book; at equal score it must win
        // over every competitor regardless of input order.
        let picks = vec![
            scored("E-1", "Jayson Tatum", "fanduel", 8.0),
            scored("E-1", "Jayson Tatum", "novig", 8.0),
            scored("E-1", "Jayson Tatum", "draftkings", 8.0),
        ];
        let out = dedupe(picks, &DedupConfig::default());
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.kept[0].pick.book, "novig");
    }

    #[test]
    fn test_unlisted_book_gets_lowest_preference() {
        let cfg = DedupConfig::default();
        assert_eq!(book_priority("novig", &cfg), 0);
        assert_eq!(book_priority("CAESARS", &cfg), 6);
        assert_eq!(book_priority("some_offshore", &cfg), cfg.preferred_books.len());

        let picks = vec![
            scored("E-1", "Jayson Tatum", "some_offshore", 8.0),
            scored("E-1", "Jayson Tatum", "caesars", 8.0),
        ];
        let out = dedupe(picks, &cfg);
        assert_eq!(out.kept[0].pick.book, "caesars");
    }

    #[test]
    fn test_distinct_identities_never_merge() {
        let picks = vec![
            scored("E-1", "Jayson Tatum", "draftkings", 8.0),
            scored("E-1", "Jaylen Brown", "draftkings", 7.0),
            scored("E-2", "Jayson Tatum", "draftkings", 6.0),
        ];
        let out = dedupe(picks, &DedupConfig::default());
        assert_eq!(out.kept.len(), 3);
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn test_group_order_follows_first_appearance() {
        let picks = vec![
            scored("E-2", "A B", "draftkings", 5.0),
            scored("E-1", "C D", "draftkings", 9.0),
            scored("E-2", "A B", "fanduel", 6.0),
        ];
        let out = dedupe(picks, &DedupConfig::default());
        assert_eq!(out.kept.len(), 2);
        // E-2's group appeared first in the input.
        assert_eq!(out.kept[0].pick.event, "E-2");
        assert_eq!(out.kept[1].pick.event, "E-1");
    }

    #[test]
    fn test_debug_records_per_group() {
        let picks = vec![
            scored("E-1", "Jayson Tatum", "draftkings", 7.5),
            scored("E-1", "Jayson Tatum", "fanduel", 8.2),
            scored("E-2", "Jaylen Brown", "betmgm", 7.0),
        ];
        let out = dedupe(picks, &DedupConfig::default());
        assert_eq!(out.groups.len(), 2);
        let g = &out.groups[0];
        assert_eq!(g.quotes, 2);
        assert_eq!(g.kept_book, "fanduel");
        assert_eq!(g.dropped_books, vec!["draftkings"]);
        assert_eq!(out.groups[1].quotes, 1);
        assert!(out.groups[1].dropped_books.is_empty());
    }

    #[test]
    fn test_over_merge_on_shared_empty_identity() {
        // Two genuinely distinct bets missing the same identity fields
        // collide silently — a documented risk, not an error.
        let picks = vec![
            scored("E-1", "", "draftkings", 7.0),
            scored("E-1", "", "fanduel", 6.0),
        ];
        let out = dedupe(picks, &DedupConfig::default());
        assert_eq!(out.kept.len(), 1);
        assert_eq!(out.dropped, 1);
    }

    #[test]
    fn test_empty_input() {
        let out = dedupe(Vec::new(), &DedupConfig::default());
        assert!(out.kept.is_empty());
        assert_eq!(out.dropped, 0);
        assert!(out.groups.is_empty());
    }
}
