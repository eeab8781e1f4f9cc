mod config;
pub mod builder;
pub mod manual;
pub mod pairing;
pub mod quick_start;

use log::{debug, info, warn};

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::pairing::{PairSelector, UniformSelector};

/// The mutable rating state for one list: one [Rating] record per item,
/// plus counters describing how the history folded so far.
///
/// The board can be driven two ways, with identical results:
/// replay the full log through [compute_leaderboard], or keep a board
/// alive and call [RatingBoard::apply] as each new event is appended.
pub struct RatingBoard {
    rules: RatingRules,
    by_item: HashMap<ItemId, Rating>,
    counted_events: usize,
    skipped_events: usize,
    passed_events: usize,
}

impl RatingBoard {
    /// Builds a board with every item at the initial rating and zeroed
    /// tallies. Fewer than two items is a distinguished error: a
    /// comparison leaderboard over one name is nonsense.
    pub fn new(items: &[Item], rules: &RatingRules) -> Result<RatingBoard, RatingErrors> {
        if items.len() < 2 {
            return Err(RatingErrors::NotEnoughItems);
        }
        let mut by_item: HashMap<ItemId, Rating> = HashMap::with_capacity(items.len());
        for item in items.iter() {
            let prev = by_item.insert(
                item.id,
                Rating {
                    item: item.id,
                    name: item.name.clone(),
                    score: rules.initial_rating,
                    wins: 0,
                    losses: 0,
                    draws: 0,
                },
            );
            if prev.is_some() {
                return Err(RatingErrors::DuplicateItem(item.id));
            }
        }
        Ok(RatingBoard {
            rules: *rules,
            by_item,
            counted_events: 0,
            skipped_events: 0,
            passed_events: 0,
        })
    }

    /// Folds one event into the board. Returns true when the event
    /// changed ratings or tallies.
    ///
    /// Malformed events (self-comparison, reference to an item that is
    /// not on the board anymore) are dropped with a warning, never an
    /// error: the log may legitimately mention deleted names.
    pub fn apply(&mut self, event: &ComparisonEvent) -> bool {
        if event.item_a == event.item_b {
            warn!(
                "apply: event {} compares item {} with itself, skipping",
                event.id, event.item_a.0
            );
            self.skipped_events += 1;
            return false;
        }
        if !self.by_item.contains_key(&event.item_a) || !self.by_item.contains_key(&event.item_b) {
            warn!(
                "apply: event {} references an unknown item ({} vs {}), skipping",
                event.id, event.item_a.0, event.item_b.0
            );
            self.skipped_events += 1;
            return false;
        }
        if event.outcome == Outcome::Skip {
            // A true no-op: no rating change, no tally change.
            debug!("apply: event {} is a skip", event.id);
            self.passed_events += 1;
            return false;
        }

        let rating_a = self.by_item[&event.item_a].score;
        let rating_b = self.by_item[&event.item_b].score;
        let expected_a = 1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0));
        let expected_b = 1.0 - expected_a;

        let (score_a, score_b) = match event.outcome {
            Outcome::AWins => (1.0, 0.0),
            Outcome::BWins => (0.0, 1.0),
            // A draw still nudges both ratings toward each other, but it
            // does not touch the win/loss tallies.
            Outcome::Both => (0.5, 0.5),
            Outcome::Skip => unreachable!("skip handled above"),
        };

        let k = self.rules.k_factor;
        {
            let a = self.by_item.get_mut(&event.item_a).unwrap();
            a.score += k * (score_a - expected_a);
            match event.outcome {
                Outcome::AWins => a.wins += 1,
                Outcome::BWins => a.losses += 1,
                Outcome::Both => a.draws += 1,
                Outcome::Skip => {}
            }
        }
        {
            let b = self.by_item.get_mut(&event.item_b).unwrap();
            b.score += k * (score_b - expected_b);
            match event.outcome {
                Outcome::AWins => b.losses += 1,
                Outcome::BWins => b.wins += 1,
                Outcome::Both => b.draws += 1,
                Outcome::Skip => {}
            }
        }
        debug!(
            "apply: event {} outcome {:?}: item {} {:.4} -> {:.4}, item {} {:.4} -> {:.4}",
            event.id,
            event.outcome,
            event.item_a.0,
            rating_a,
            self.by_item[&event.item_a].score,
            event.item_b.0,
            rating_b,
            self.by_item[&event.item_b].score,
        );
        self.counted_events += 1;
        true
    }

    /// The current rating record for one item.
    pub fn rating(&self, item: ItemId) -> Option<&Rating> {
        self.by_item.get(&item)
    }

    /// The current leaderboard: descending score, ties broken by
    /// ascending item id so that reruns are reproducible.
    pub fn rankings(&self) -> Vec<Rating> {
        let mut res: Vec<Rating> = self.by_item.values().cloned().collect();
        res.sort_by(|p, q| {
            q.score
                .partial_cmp(&p.score)
                .unwrap_or(Ordering::Equal)
                .then(p.item.cmp(&q.item))
        });
        res
    }

    pub fn counted_events(&self) -> usize {
        self.counted_events
    }

    pub fn skipped_events(&self) -> usize {
        self.skipped_events
    }

    pub fn passed_events(&self) -> usize {
        self.passed_events
    }

    fn into_summary(self) -> RatingSummary {
        RatingSummary {
            rankings: self.rankings(),
            counted_events: self.counted_events,
            skipped_events: self.skipped_events,
            passed_events: self.passed_events,
        }
    }
}

/// Folds a chronologically ordered comparison history into a leaderboard.
///
/// Arguments:
/// * `items` the items of the list, in any order
/// * `history` the comparison log, in the order events were appended
/// * `rules` the rating update rules
pub fn compute_leaderboard(
    items: &[Item],
    history: &[ComparisonEvent],
    rules: &RatingRules,
) -> Result<RatingSummary, RatingErrors> {
    info!(
        "compute_leaderboard: folding {} events over {} items",
        history.len(),
        items.len()
    );
    let mut board = RatingBoard::new(items, rules)?;
    for event in history.iter() {
        board.apply(event);
    }
    let summary = board.into_summary();
    for (pos, r) in summary.rankings.iter().enumerate() {
        info!(
            "compute_leaderboard: #{} {} rating {:.1} W:{} L:{} D:{}",
            pos + 1,
            r.name,
            r.score,
            r.wins,
            r.losses,
            r.draws
        );
    }
    if summary.skipped_events > 0 {
        warn!(
            "compute_leaderboard: {} malformed events were skipped",
            summary.skipped_events
        );
    }
    Ok(summary)
}

/// Aggregates the feedback left on the comparisons where `item` was the
/// chosen one: the winner of the event, or either side of a `Both`.
///
/// Feedback attached to skip events counts for no one. Blank free-text
/// reasons are dropped.
pub fn aggregate_feedback(
    item: ItemId,
    history: &[ComparisonEvent],
    feedback: &[FeedbackEntry],
) -> FeedbackSummary {
    let chosen_events: HashSet<i64> = history
        .iter()
        .filter(|event| match event.outcome {
            Outcome::AWins => event.item_a == item,
            Outcome::BWins => event.item_b == item,
            Outcome::Both => event.item_a == item || event.item_b == item,
            Outcome::Skip => false,
        })
        .map(|event| event.id)
        .collect();

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut custom_reasons: Vec<String> = Vec::new();
    for entry in feedback.iter() {
        if !chosen_events.contains(&entry.comparison_id) {
            continue;
        }
        if let Some(label) = &entry.option {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        if let Some(reason) = &entry.custom_reason {
            if !reason.trim().is_empty() {
                custom_reasons.push(reason.clone());
            }
        }
    }

    let mut option_counts: Vec<(String, u64)> = counts.into_iter().collect();
    option_counts.sort_by(|p, q| q.1.cmp(&p.1).then(p.0.cmp(&q.0)));
    debug!(
        "aggregate_feedback: item {}: {} preset labels, {} free-text reasons",
        item.0,
        option_counts.len(),
        custom_reasons.len()
    );
    FeedbackSummary {
        option_counts,
        custom_reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<Item> {
        let _ = env_logger::builder().is_test(true).try_init();
        names
            .iter()
            .enumerate()
            .map(|(idx, name)| Item {
                id: ItemId((idx + 1) as i64),
                name: name.to_string(),
            })
            .collect()
    }

    fn event(id: i64, a: i64, b: i64, outcome: Outcome) -> ComparisonEvent {
        ComparisonEvent {
            id,
            item_a: ItemId(a),
            item_b: ItemId(b),
            outcome,
            timestamp_ms: id * 1000,
            voter: None,
        }
    }

    const RULES: RatingRules = RatingRules::DEFAULT_RULES;

    #[test]
    fn equal_ratings_win_moves_sixteen_points() {
        let its = items(&["X", "Y", "Z"]);
        let history = vec![
            event(1, 1, 2, Outcome::AWins),
            event(2, 1, 3, Outcome::AWins),
            event(3, 2, 3, Outcome::Skip),
        ];
        let summary = compute_leaderboard(&its, &history, &RULES).unwrap();
        assert_eq!(summary.counted_events, 2);
        assert_eq!(summary.passed_events, 1);
        assert_eq!(summary.skipped_events, 0);

        // Z lost to a stronger X than Y did, so Z keeps more points.
        let names: Vec<&str> = summary.rankings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Z", "Y"]);

        // First event: equal ratings, expected 0.5 each, delta is +-16.
        let y = &summary.rankings[2];
        assert!((y.score - 984.0).abs() < 1e-9, "Y at {}", y.score);
        assert_eq!((y.wins, y.losses, y.draws), (0, 1, 0));
        // Second event: X already above 1000, so Z loses slightly less
        // than 16 points.
        let z = &summary.rankings[1];
        assert!((z.score - 984.7363).abs() < 1e-3, "Z at {}", z.score);
        assert!(z.score > y.score);
        let x = &summary.rankings[0];
        assert!(x.score > 1016.0 && x.score < 1032.0, "X at {}", x.score);
        assert_eq!((x.wins, x.losses, x.draws), (2, 0, 0));
    }

    #[test]
    fn win_deltas_are_symmetric() {
        let its = items(&["A", "B"]);
        let mut board = RatingBoard::new(&its, &RULES).unwrap();
        // Put the two items at different ratings first.
        assert!(board.apply(&event(1, 1, 2, Outcome::AWins)));
        let before_a = board.rating(ItemId(1)).unwrap().score;
        let before_b = board.rating(ItemId(2)).unwrap().score;
        assert!(board.apply(&event(2, 1, 2, Outcome::BWins)));
        let delta_a = board.rating(ItemId(1)).unwrap().score - before_a;
        let delta_b = board.rating(ItemId(2)).unwrap().score - before_b;
        assert!((delta_a + delta_b).abs() < 1e-9);
        assert!(delta_b > 0.0);
    }

    #[test]
    fn both_at_equal_ratings_only_increments_draws() {
        let its = items(&["A", "B"]);
        let summary =
            compute_leaderboard(&its, &[event(1, 1, 2, Outcome::Both)], &RULES).unwrap();
        for r in summary.rankings.iter() {
            assert!((r.score - 1000.0).abs() < 1e-9);
            assert_eq!((r.wins, r.losses, r.draws), (0, 0, 1));
        }
        assert_eq!(summary.counted_events, 1);
    }

    #[test]
    fn both_at_unequal_ratings_pulls_scores_together() {
        let its = items(&["A", "B"]);
        let mut board = RatingBoard::new(&its, &RULES).unwrap();
        board.apply(&event(1, 1, 2, Outcome::AWins));
        let before_a = board.rating(ItemId(1)).unwrap().score;
        let before_b = board.rating(ItemId(2)).unwrap().score;
        board.apply(&event(2, 1, 2, Outcome::Both));
        let after_a = board.rating(ItemId(1)).unwrap().score;
        let after_b = board.rating(ItemId(2)).unwrap().score;
        assert!(after_a < before_a);
        assert!(after_b > before_b);
        assert!((after_a - before_a + (after_b - before_b)).abs() < 1e-9);
        assert_eq!(board.rating(ItemId(1)).unwrap().draws, 1);
    }

    #[test]
    fn skip_leaves_the_board_untouched() {
        let its = items(&["A", "B", "C"]);
        let mut board = RatingBoard::new(&its, &RULES).unwrap();
        board.apply(&event(1, 1, 2, Outcome::AWins));
        let before = board.rankings();
        assert!(!board.apply(&event(2, 2, 3, Outcome::Skip)));
        assert_eq!(board.rankings(), before);
        assert_eq!(board.passed_events(), 1);
    }

    #[test]
    fn dangling_and_self_references_are_skipped() {
        let its = items(&["A", "B"]);
        let history = vec![
            event(1, 1, 99, Outcome::AWins),
            event(2, 2, 2, Outcome::BWins),
            event(3, 1, 2, Outcome::AWins),
        ];
        let summary = compute_leaderboard(&its, &history, &RULES).unwrap();
        assert_eq!(summary.skipped_events, 2);
        assert_eq!(summary.counted_events, 1);
        let a = &summary.rankings[0];
        assert!((a.score - 1016.0).abs() < 1e-9);
        assert_eq!(a.wins, 1);
    }

    #[test]
    fn incremental_apply_matches_full_fold() {
        let its = items(&["A", "B", "C", "D"]);
        let history = vec![
            event(1, 1, 2, Outcome::AWins),
            event(2, 3, 4, Outcome::BWins),
            event(3, 1, 3, Outcome::Both),
            event(4, 2, 4, Outcome::Skip),
            event(5, 4, 1, Outcome::AWins),
        ];
        let full = compute_leaderboard(&its, &history, &RULES).unwrap();

        let mut board = RatingBoard::new(&its, &RULES).unwrap();
        for e in history[..history.len() - 1].iter() {
            board.apply(e);
        }
        board.apply(&history[history.len() - 1]);
        assert_eq!(board.rankings(), full.rankings);
        assert_eq!(board.counted_events(), full.counted_events);
    }

    #[test]
    fn leaderboard_is_deterministic() {
        let its = items(&["A", "B", "C"]);
        let history = vec![
            event(1, 1, 2, Outcome::AWins),
            event(2, 2, 3, Outcome::Both),
            event(3, 3, 1, Outcome::BWins),
        ];
        let first = compute_leaderboard(&its, &history, &RULES).unwrap();
        let second = compute_leaderboard(&its, &history, &RULES).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ties_are_broken_by_item_id() {
        // No events: everyone sits at the initial rating.
        let its = vec![
            Item {
                id: ItemId(7),
                name: "G".to_string(),
            },
            Item {
                id: ItemId(3),
                name: "C".to_string(),
            },
            Item {
                id: ItemId(5),
                name: "E".to_string(),
            },
        ];
        let summary = compute_leaderboard(&its, &[], &RULES).unwrap();
        let ids: Vec<i64> = summary.rankings.iter().map(|r| r.item.0).collect();
        assert_eq!(ids, vec![3, 5, 7]);
    }

    #[test]
    fn tally_counts_stay_below_event_references() {
        let its = items(&["A", "B", "C"]);
        let history = vec![
            event(1, 1, 2, Outcome::AWins),
            event(2, 1, 3, Outcome::Skip),
            event(3, 1, 99, Outcome::BWins),
            event(4, 1, 2, Outcome::Both),
        ];
        let summary = compute_leaderboard(&its, &history, &RULES).unwrap();
        let a = summary.rankings.iter().find(|r| r.item == ItemId(1)).unwrap();
        let referencing_a = 4;
        assert!(a.wins + a.losses + a.draws <= referencing_a);
        // One skip and one dangling reference: exactly two events counted.
        assert_eq!(a.wins + a.losses + a.draws, 2);
    }

    #[test]
    fn not_enough_items_is_a_distinguished_error() {
        let one = items(&["A"]);
        assert_eq!(
            compute_leaderboard(&one, &[], &RULES),
            Err(RatingErrors::NotEnoughItems)
        );
        assert_eq!(
            compute_leaderboard(&[], &[], &RULES),
            Err(RatingErrors::NotEnoughItems)
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let its = vec![
            Item {
                id: ItemId(1),
                name: "A".to_string(),
            },
            Item {
                id: ItemId(1),
                name: "B".to_string(),
            },
        ];
        assert_eq!(
            compute_leaderboard(&its, &[], &RULES),
            Err(RatingErrors::DuplicateItem(ItemId(1)))
        );
    }

    #[test]
    fn outcome_tags_round_trip() {
        for outcome in [Outcome::AWins, Outcome::BWins, Outcome::Both, Outcome::Skip] {
            assert_eq!(Outcome::parse(outcome.tag()), Some(outcome));
        }
        assert_eq!(Outcome::parse("neither"), Some(Outcome::Skip));
        assert_eq!(Outcome::parse("tie"), None);
    }

    fn fb(comparison_id: i64, option: Option<&str>, reason: Option<&str>) -> FeedbackEntry {
        FeedbackEntry {
            comparison_id,
            option: option.map(|s| s.to_string()),
            custom_reason: reason.map(|s| s.to_string()),
        }
    }

    #[test]
    fn feedback_counts_chosen_events_only() {
        let history = vec![
            event(1, 1, 2, Outcome::AWins),
            event(2, 2, 1, Outcome::BWins),
            event(3, 1, 3, Outcome::Both),
            event(4, 1, 2, Outcome::BWins),
            event(5, 1, 3, Outcome::Skip),
        ];
        let feedback = vec![
            fb(1, Some("Sounds nice"), None),
            fb(2, Some("Classic"), None),
            fb(3, Some("Sounds nice"), Some("goes well with the last name")),
            fb(4, Some("Trendy"), None),
            fb(5, Some("Sounds nice"), Some("ignored, skip chose no one")),
        ];
        let summary = aggregate_feedback(ItemId(1), &history, &feedback);
        assert_eq!(
            summary.option_counts,
            vec![
                ("Sounds nice".to_string(), 2),
                ("Classic".to_string(), 1)
            ]
        );
        assert_eq!(
            summary.custom_reasons,
            vec!["goes well with the last name".to_string()]
        );
    }

    #[test]
    fn feedback_ties_are_broken_by_label() {
        let history = vec![
            event(1, 1, 2, Outcome::AWins),
            event(2, 1, 2, Outcome::AWins),
        ];
        let feedback = vec![
            fb(1, Some("Vintage"), Some("   ")),
            fb(2, Some("Modern"), None),
        ];
        let summary = aggregate_feedback(ItemId(1), &history, &feedback);
        assert_eq!(
            summary.option_counts,
            vec![("Modern".to_string(), 1), ("Vintage".to_string(), 1)]
        );
        // Whitespace-only reasons are not reported.
        assert!(summary.custom_reasons.is_empty());
    }
}
