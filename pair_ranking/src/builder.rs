use log::warn;

pub use crate::config::*;
use crate::compute_leaderboard;

/// A builder for assembling a list and its comparisons by name.
///
/// It assigns item ids and event ids itself, which makes it the simplest
/// entry point when the caller has no persistent log.
///
/// ```
/// pub use pair_ranking::builder::Builder;
/// pub use pair_ranking::RatingRules;
/// # use pair_ranking::RatingErrors;
///
/// let mut builder = Builder::new(&RatingRules::DEFAULT_RULES)
///     .items(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_comparison("Anna", "Bob", "a")?;
/// let summary = builder.leaderboard()?;
/// assert_eq!(summary.rankings[0].name, "Anna");
///
/// # Ok::<(), RatingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: RatingRules,
    pub(crate) _items: Vec<Item>,
    pub(crate) _events: Vec<ComparisonEvent>,
}

impl Builder {
    pub fn new(rules: &RatingRules) -> Builder {
        Builder {
            _rules: *rules,
            _items: Vec::new(),
            _events: Vec::new(),
        }
    }

    /// Declares the candidate names. Ids are assigned in order, starting
    /// at 1. Names are expected to be distinct: comparisons are recorded
    /// by name and resolve to the first match.
    pub fn items(self, names: &[String]) -> Result<Builder, RatingErrors> {
        let items: Vec<Item> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Item {
                id: ItemId((idx + 1) as i64),
                name: name.clone(),
            })
            .collect();
        Ok(Builder {
            _rules: self._rules,
            _items: items,
            _events: self._events,
        })
    }

    /// Records one comparison by name, with an outcome tag
    /// (`"a"`, `"b"`, `"both"`, `"skip"`).
    ///
    /// Unknown names and unknown tags are dropped with a warning rather
    /// than failing: the engine treats malformed history the same way.
    pub fn add_comparison(
        &mut self,
        name_a: &str,
        name_b: &str,
        tag: &str,
    ) -> Result<(), RatingErrors> {
        let item_a = self._items.iter().find(|it| it.name == name_a);
        let item_b = self._items.iter().find(|it| it.name == name_b);
        let (item_a, item_b) = match (item_a, item_b) {
            (Some(a), Some(b)) => (a.id, b.id),
            _ => {
                warn!(
                    "add_comparison: unknown name in pair {:?} / {:?}, dropping",
                    name_a, name_b
                );
                return Ok(());
            }
        };
        let outcome = match Outcome::parse(tag) {
            Some(o) => o,
            None => {
                warn!("add_comparison: unknown outcome tag {:?}, dropping", tag);
                return Ok(());
            }
        };
        let id = (self._events.len() + 1) as i64;
        self._events.push(ComparisonEvent {
            id,
            item_a,
            item_b,
            outcome,
            timestamp_ms: id,
            voter: None,
        });
        Ok(())
    }

    /// Folds everything recorded so far.
    pub fn leaderboard(&self) -> Result<RatingSummary, RatingErrors> {
        compute_leaderboard(&self._items, &self._events, &self._rules)
    }
}
