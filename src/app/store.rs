// JSON-file-backed persistence for a name list, its append-only
// comparison log and the feedback attached to comparisons.

use log::{debug, warn};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use std::fs;

use pair_ranking::{ComparisonEvent, FeedbackEntry, Item, ItemId, Outcome};

/// Failures coming from the persistence layer. These are propagated
/// unchanged to the caller: retrying is the caller's business.
#[derive(Debug, Snafu)]
pub enum StoreError {
    #[snafu(display("Error opening list file {path}"))]
    OpeningList {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing list file {path}"))]
    ParsingList {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing list file {path}"))]
    WritingList {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing list file {path}"))]
    SerializingList {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("No name with id {id} in list {title:?}"))]
    UnknownName { id: i64, title: String },
    #[snafu(display("A comparison must reference two distinct names, got id {id} twice"))]
    SelfComparison { id: i64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The preset reason labels a fresh list starts with. They can be edited
/// in the list file afterwards.
pub const DEFAULT_FEEDBACK_OPTIONS: [&str; 4] = [
    "Sounds nice",
    "Easy to spell",
    "Good meaning",
    "Family connection",
];

// ********* On-disk records **********
// Field names mirror the hosted tables this data originally lived in.

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ListSettings {
    pub title: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "parentNames")]
    pub parent_names: Option<String>,
    #[serde(rename = "siblingNames")]
    pub sibling_names: Option<String>,
    #[serde(rename = "preferredAttributes")]
    pub preferred_attributes: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct NameRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: i64,
    #[serde(rename = "nameAId")]
    pub name_a_id: i64,
    #[serde(rename = "nameBId")]
    pub name_b_id: i64,
    pub chosen: String,
    #[serde(rename = "recordedAt")]
    pub recorded_at: Option<i64>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackOptionRecord {
    pub id: i64,
    pub label: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "comparisonId")]
    pub comparison_id: i64,
    #[serde(rename = "optionId")]
    pub option_id: Option<i64>,
    #[serde(rename = "customReason")]
    pub custom_reason: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ListFile {
    pub list: ListSettings,
    pub names: Vec<NameRecord>,
    pub comparisons: Vec<ComparisonRecord>,
    #[serde(rename = "feedbackOptions", default)]
    pub feedback_options: Vec<FeedbackOptionRecord>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
}

impl ListFile {
    /// A fresh list with no comparisons. Name ids are assigned in order,
    /// starting at 1.
    pub fn new(
        title: &str,
        description: Option<String>,
        last_name: Option<String>,
        names: &[String],
    ) -> ListFile {
        ListFile {
            list: ListSettings {
                title: title.to_string(),
                description,
                tags: None,
                visibility: Some("private".to_string()),
                last_name,
                parent_names: None,
                sibling_names: None,
                preferred_attributes: None,
            },
            names: names
                .iter()
                .enumerate()
                .map(|(idx, name)| NameRecord {
                    id: (idx + 1) as i64,
                    name: name.clone(),
                })
                .collect(),
            comparisons: Vec::new(),
            feedback_options: DEFAULT_FEEDBACK_OPTIONS
                .iter()
                .enumerate()
                .map(|(idx, label)| FeedbackOptionRecord {
                    id: (idx + 1) as i64,
                    label: label.to_string(),
                })
                .collect(),
            feedback: Vec::new(),
        }
    }
}

// ********* Store operations **********

/// The persistence operations the commands depend on. Handed to callers
/// explicitly so the tabulation code never reaches for a global client.
pub trait Store {
    fn load_settings(&self) -> StoreResult<ListSettings>;
    fn load_items(&self) -> StoreResult<Vec<Item>>;
    /// The comparison log in append order. Records with an outcome tag
    /// the engine does not know are dropped with a warning.
    fn load_comparison_history(&self) -> StoreResult<Vec<ComparisonEvent>>;
    /// Appends one outcome and returns its id. Fails when either name is
    /// no longer part of the list.
    fn append_comparison_event(
        &mut self,
        item_a: ItemId,
        item_b: ItemId,
        outcome: Outcome,
        voter: Option<String>,
    ) -> StoreResult<i64>;
    /// Attaches feedback to a recorded comparison. A label that does not
    /// match any feedback option is stored with no option id.
    fn append_feedback(
        &mut self,
        comparison_id: i64,
        option_label: Option<&str>,
        custom_reason: Option<&str>,
    ) -> StoreResult<()>;
    fn load_feedback(&self) -> StoreResult<Vec<FeedbackEntry>>;
}

/// A [Store] over a single JSON document, rewritten on every append.
/// Concurrent writers must be serialized outside of this process.
pub struct JsonFileStore {
    path: String,
    doc: ListFile,
}

impl JsonFileStore {
    pub fn open(path: &str) -> StoreResult<JsonFileStore> {
        let contents = fs::read_to_string(path).context(OpeningListSnafu { path })?;
        let doc: ListFile = serde_json::from_str(&contents).context(ParsingListSnafu { path })?;
        debug!(
            "open: {}: {} names, {} comparisons",
            path,
            doc.names.len(),
            doc.comparisons.len()
        );
        Ok(JsonFileStore {
            path: path.to_string(),
            doc,
        })
    }

    pub fn create(path: &str, doc: ListFile) -> StoreResult<JsonFileStore> {
        let store = JsonFileStore {
            path: path.to_string(),
            doc,
        };
        store.save()?;
        Ok(store)
    }

    fn save(&self) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(&self.doc).context(SerializingListSnafu {
            path: self.path.clone(),
        })?;
        fs::write(&self.path, contents).context(WritingListSnafu {
            path: self.path.clone(),
        })?;
        Ok(())
    }

    fn ensure_name(&self, id: ItemId) -> StoreResult<()> {
        ensure!(
            self.doc.names.iter().any(|n| n.id == id.0),
            UnknownNameSnafu {
                id: id.0,
                title: self.doc.list.title.clone(),
            }
        );
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn load_settings(&self) -> StoreResult<ListSettings> {
        Ok(self.doc.list.clone())
    }

    fn load_items(&self) -> StoreResult<Vec<Item>> {
        Ok(self
            .doc
            .names
            .iter()
            .map(|n| Item {
                id: ItemId(n.id),
                name: n.name.clone(),
            })
            .collect())
    }

    fn load_comparison_history(&self) -> StoreResult<Vec<ComparisonEvent>> {
        let mut res: Vec<ComparisonEvent> = Vec::new();
        for record in self.doc.comparisons.iter() {
            let outcome = match Outcome::parse(record.chosen.as_str()) {
                Some(o) => o,
                None => {
                    warn!(
                        "load_comparison_history: comparison {} has unknown outcome tag {:?}, ignoring",
                        record.id, record.chosen
                    );
                    continue;
                }
            };
            res.push(ComparisonEvent {
                id: record.id,
                item_a: ItemId(record.name_a_id),
                item_b: ItemId(record.name_b_id),
                outcome,
                timestamp_ms: record.recorded_at.unwrap_or(0),
                voter: record.user_id.clone(),
            });
        }
        Ok(res)
    }

    fn append_comparison_event(
        &mut self,
        item_a: ItemId,
        item_b: ItemId,
        outcome: Outcome,
        voter: Option<String>,
    ) -> StoreResult<i64> {
        ensure!(item_a != item_b, SelfComparisonSnafu { id: item_a.0 });
        self.ensure_name(item_a)?;
        self.ensure_name(item_b)?;
        let id = self.doc.comparisons.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        self.doc.comparisons.push(ComparisonRecord {
            id,
            name_a_id: item_a.0,
            name_b_id: item_b.0,
            chosen: outcome.tag().to_string(),
            recorded_at: Some(crate::app::now_millis() as i64),
            user_id: voter,
        });
        self.save()?;
        Ok(id)
    }

    fn append_feedback(
        &mut self,
        comparison_id: i64,
        option_label: Option<&str>,
        custom_reason: Option<&str>,
    ) -> StoreResult<()> {
        let option_id = match option_label {
            Some(label) => {
                let found = self
                    .doc
                    .feedback_options
                    .iter()
                    .find(|opt| opt.label == label)
                    .map(|opt| opt.id);
                if found.is_none() {
                    warn!(
                        "append_feedback: {:?} is not a feedback option of this list, storing without an option id",
                        label
                    );
                }
                found
            }
            None => None,
        };
        self.doc.feedback.push(FeedbackRecord {
            comparison_id,
            option_id,
            custom_reason: custom_reason.map(|s| s.to_string()),
        });
        self.save()?;
        Ok(())
    }

    fn load_feedback(&self) -> StoreResult<Vec<FeedbackEntry>> {
        let label_of = |id: i64| -> String {
            self.doc
                .feedback_options
                .iter()
                .find(|opt| opt.id == id)
                .map(|opt| opt.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        Ok(self
            .doc
            .feedback
            .iter()
            .map(|record| FeedbackEntry {
                comparison_id: record.comparison_id,
                option: record.option_id.map(|id| label_of(id)),
                custom_reason: record.custom_reason.clone(),
            })
            .collect())
    }
}
