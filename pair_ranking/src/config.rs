// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Identifier of an item (a candidate name). Assigned by the caller,
/// unique within a list.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ItemId(pub i64);

/// A candidate name being ranked. Immutable once created.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

/// The recorded outcome of showing two items side by side.
///
/// `Both` and `Skip` are not the same thing: `Both` counts as a draw for
/// each side and still applies the symmetric rating nudge, while `Skip`
/// leaves every rating and tally untouched.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Outcome {
    AWins,
    BWins,
    Both,
    Skip,
}

impl Outcome {
    /// Reads an outcome tag as stored in a comparison log. Unknown tags
    /// yield `None` and the event should be dropped by the caller.
    pub fn parse(tag: &str) -> Option<Outcome> {
        match tag {
            "a" => Some(Outcome::AWins),
            "b" => Some(Outcome::BWins),
            "both" => Some(Outcome::Both),
            "skip" | "neither" => Some(Outcome::Skip),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Outcome::AWins => "a",
            Outcome::BWins => "b",
            Outcome::Both => "both",
            Outcome::Skip => "skip",
        }
    }
}

/// One recorded pairwise outcome. Events are immutable once recorded and
/// are folded in the order they appear in the log: the timestamp is
/// carried for display, ties are broken by log order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ComparisonEvent {
    pub id: i64,
    pub item_a: ItemId,
    pub item_b: ItemId,
    pub outcome: Outcome,
    pub timestamp_ms: i64,
    /// The acting user, when known.
    pub voter: Option<String>,
}

/// An optional annotation attached to one comparison: a preset reason
/// label and/or a free-text reason. Used only for display aggregation,
/// never for rating computation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeedbackEntry {
    pub comparison_id: i64,
    pub option: Option<String>,
    pub custom_reason: Option<String>,
}

// ******** Output data structures *********

/// Derived per-item state: the current score plus win/loss/draw tallies.
/// Scores are only meaningful relative to other items of the same list.
#[derive(PartialEq, Debug, Clone)]
pub struct Rating {
    pub item: ItemId,
    pub name: String,
    pub score: f64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

/// The outcome of folding a full comparison history.
#[derive(PartialEq, Debug, Clone)]
pub struct RatingSummary {
    /// All items sorted by descending score, ties broken by ascending
    /// item id.
    pub rankings: Vec<Rating>,
    /// Events that moved ratings or tallies.
    pub counted_events: usize,
    /// Malformed events (dangling reference, self-comparison) that were
    /// dropped during the fold.
    pub skipped_events: usize,
    /// Explicit skip events, which are valid but have no effect.
    pub passed_events: usize,
}

/// Aggregated feedback for one item: preset reason counts in descending
/// order (ties broken by label), then the free-text reasons in log order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeedbackSummary {
    pub option_counts: Vec<(String, u64)>,
    pub custom_reasons: Vec<String>,
}

/// Errors that prevent a leaderboard from being computed at all.
/// Malformed history is never one of them: bad events are skipped.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RatingErrors {
    /// Fewer than two items were supplied.
    NotEnoughItems,
    /// Two items share the same id.
    DuplicateItem(ItemId),
}

impl Error for RatingErrors {}

impl Display for RatingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingErrors::NotEnoughItems => write!(f, "not enough items to compare"),
            RatingErrors::DuplicateItem(id) => write!(f, "duplicate item id {}", id.0),
        }
    }
}

// ********* Configuration **********

/// The rating update rules.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct RatingRules {
    /// Update sensitivity: how far one comparison moves a rating.
    pub k_factor: f64,
    /// Score assigned to every item before any comparison.
    pub initial_rating: f64,
}

impl RatingRules {
    pub const DEFAULT_RULES: RatingRules = RatingRules {
        k_factor: 32.0,
        initial_rating: 1000.0,
    };
}
