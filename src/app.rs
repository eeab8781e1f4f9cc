use log::{debug, info, warn};

use pair_ranking::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod io_names;
pub mod store;

use crate::app::store::{JsonFileStore, ListFile, ListSettings, Store, StoreError};
use crate::args::{Args, Command};

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error opening names file {path}"))]
    OpeningNames {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in the Excel file"))]
    EmptyExcel {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error reading summary file {path}"))]
    OpeningSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing summary file {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error handling JSON summary"))]
    ParsingSummary { source: serde_json::Error },
    #[snafu(display("Store failure"))]
    StoreFailure { source: StoreError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AppResult<T> = Result<T, AppError>;

pub fn run(args: &Args) -> AppResult<()> {
    match &args.command {
        Command::Import {
            input,
            input_type,
            excel_worksheet_name,
            data,
            title,
            description,
            last_name,
        } => run_import(
            input,
            input_type.as_deref(),
            excel_worksheet_name.as_ref(),
            data,
            title,
            description.clone(),
            last_name.clone(),
        ),
        Command::Next {
            data,
            seed,
            full_names,
        } => {
            let store = JsonFileStore::open(data).context(StoreFailureSnafu {})?;
            run_next(&store, *seed, *full_names)
        }
        Command::Record {
            data,
            name_a,
            name_b,
            chosen,
            reason,
            note,
            voter,
        } => {
            let mut store = JsonFileStore::open(data).context(StoreFailureSnafu {})?;
            run_record(
                &mut store,
                name_a,
                name_b,
                chosen,
                reason.as_deref(),
                note.as_deref(),
                voter.clone(),
            )
        }
        Command::Rank {
            data,
            out,
            reference,
        } => {
            let store = JsonFileStore::open(data).context(StoreFailureSnafu {})?;
            run_rank(&store, out.clone(), reference.clone())
        }
        Command::Feedback { data, name } => {
            let store = JsonFileStore::open(data).context(StoreFailureSnafu {})?;
            run_feedback(&store, name.as_deref())
        }
    }
}

fn run_import(
    input: &str,
    input_type: Option<&str>,
    worksheet: Option<&String>,
    data: &str,
    title: &str,
    description: Option<String>,
    last_name: Option<String>,
) -> AppResult<()> {
    let names = match input_type.unwrap_or("txt") {
        "txt" => io_names::read_txt_names(input)?,
        "csv" => io_names::read_csv_names(input)?,
        "xlsx" | "excel" => io_names::read_excel_names(input, worksheet)?,
        x => whatever!("Input type not implemented {:?}", x),
    };
    if names.is_empty() {
        whatever!("No candidate names found in {:?}", input);
    }
    info!("run_import: read {} names from {}", names.len(), input);
    let doc = ListFile::new(title, description, last_name, &names);
    JsonFileStore::create(data, doc).context(StoreFailureSnafu {})?;
    println!("Created list {:?} with {} names at {}", title, names.len(), data);
    Ok(())
}

fn run_next(store: &dyn Store, seed: Option<u64>, full_names: bool) -> AppResult<()> {
    let settings = store.load_settings().context(StoreFailureSnafu {})?;
    let items = store.load_items().context(StoreFailureSnafu {})?;
    let history = store.load_comparison_history().context(StoreFailureSnafu {})?;

    let seed = seed.unwrap_or_else(now_millis);
    debug!("run_next: drawing with seed {}", seed);
    let selector = UniformSelector { seed };
    let (item_a, item_b) = match selector.select_pair(&items, &history) {
        Result::Ok(pair) => pair,
        Result::Err(x) => whatever!("Cannot pick a pair: {}", x),
    };

    let display = |id: ItemId| -> String {
        let name = items
            .iter()
            .find(|it| it.id == id)
            .map(|it| it.name.clone())
            .unwrap_or_default();
        match (&settings.last_name, full_names) {
            (Some(last), true) => format!("{} {}", name, last),
            _ => name,
        }
    };
    println!("Which name do you prefer?");
    println!("  [a] {}", display(item_a));
    println!("  [b] {}", display(item_b));
    Ok(())
}

fn run_record(
    store: &mut dyn Store,
    name_a: &str,
    name_b: &str,
    chosen: &str,
    reason: Option<&str>,
    note: Option<&str>,
    voter: Option<String>,
) -> AppResult<()> {
    let items = store.load_items().context(StoreFailureSnafu {})?;
    let find = |name: &str| items.iter().find(|it| it.name == name).map(|it| it.id);
    let item_a = match find(name_a) {
        Some(x) => x,
        None => whatever!("The name {:?} is not part of this list", name_a),
    };
    let item_b = match find(name_b) {
        Some(x) => x,
        None => whatever!("The name {:?} is not part of this list", name_b),
    };
    let outcome = match Outcome::parse(chosen) {
        Some(o) => o,
        None => whatever!("Unknown outcome tag {:?} (expected a, b, both or skip)", chosen),
    };

    let event_id = store
        .append_comparison_event(item_a, item_b, outcome, voter)
        .context(StoreFailureSnafu {})?;
    if reason.is_some() || note.is_some() {
        store
            .append_feedback(event_id, reason, note)
            .context(StoreFailureSnafu {})?;
    }
    info!(
        "run_record: appended comparison {} ({} vs {}, chosen {})",
        event_id,
        name_a,
        name_b,
        outcome.tag()
    );
    println!("Recorded comparison {}", event_id);
    Ok(())
}

fn run_rank(
    store: &dyn Store,
    out: Option<String>,
    reference: Option<String>,
) -> AppResult<()> {
    let settings = store.load_settings().context(StoreFailureSnafu {})?;
    let items = store.load_items().context(StoreFailureSnafu {})?;
    let history = store.load_comparison_history().context(StoreFailureSnafu {})?;

    let res = compute_leaderboard(&items, &history, &RatingRules::DEFAULT_RULES);
    let summary = match res {
        Result::Ok(x) => x,
        Result::Err(x) => {
            whatever!("Rating error: {}", x)
        }
    };

    println!("{}", settings.title);
    for (pos, r) in summary.rankings.iter().enumerate() {
        println!(
            "{:>3}. {}  Elo: {:.0}  W: {} | L: {} | D: {}",
            pos + 1,
            r.name,
            r.score,
            r.wins,
            r.losses,
            r.draws
        );
    }

    // Assemble the final json
    let result_js = build_summary_js(&settings, &summary);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingSummarySnafu {})?;

    match out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(out_path) => {
            fs::write(out_path, &pretty_js_stats).context(WritingSummarySnafu { path: out_path })?;
            info!("run_rank: wrote summary to {}", out_path);
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingSummarySnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

fn run_feedback(store: &dyn Store, name: Option<&str>) -> AppResult<()> {
    let items = store.load_items().context(StoreFailureSnafu {})?;
    let history = store.load_comparison_history().context(StoreFailureSnafu {})?;
    let feedback = store.load_feedback().context(StoreFailureSnafu {})?;

    let targets: Vec<&Item> = match name {
        Some(n) => match items.iter().find(|it| it.name == n) {
            Some(it) => vec![it],
            None => whatever!("The name {:?} is not part of this list", n),
        },
        None => items.iter().collect(),
    };

    for item in targets {
        let agg = aggregate_feedback(item.id, &history, &feedback);
        println!("{}:", item.name);
        if agg.option_counts.is_empty() && agg.custom_reasons.is_empty() {
            println!("  (no feedback)");
            continue;
        }
        for (label, count) in agg.option_counts.iter() {
            println!("  {}: {}", label, count);
        }
        for reason in agg.custom_reasons.iter() {
            println!("  \"{}\"", reason);
        }
    }
    Ok(())
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
struct OutputConfig {
    title: String,
    description: Option<String>,
    #[serde(rename = "lastName")]
    last_name: Option<String>,
    #[serde(rename = "countedEvents")]
    counted_events: String,
    #[serde(rename = "skippedEvents")]
    skipped_events: String,
    #[serde(rename = "passedEvents")]
    passed_events: String,
}

fn build_summary_js(settings: &ListSettings, summary: &RatingSummary) -> JSValue {
    let c = OutputConfig {
        title: settings.title.clone(),
        description: settings.description.clone(),
        last_name: settings.last_name.clone(),
        counted_events: summary.counted_events.to_string(),
        skipped_events: summary.skipped_events.to_string(),
        passed_events: summary.passed_events.to_string(),
    };
    let mut rankings: Vec<JSValue> = Vec::new();
    for (pos, r) in summary.rankings.iter().enumerate() {
        let mut entry: JSMap<String, JSValue> = JSMap::new();
        entry.insert("rank".to_string(), json!((pos + 1).to_string()));
        entry.insert("name".to_string(), json!(r.name));
        // Formatted with a fixed precision so that reference checks are
        // not at the mercy of float printing.
        entry.insert("rating".to_string(), json!(format!("{:.4}", r.score)));
        entry.insert("wins".to_string(), json!(r.wins.to_string()));
        entry.insert("losses".to_string(), json!(r.losses.to_string()));
        entry.insert("draws".to_string(), json!(r.draws.to_string()));
        rankings.push(JSValue::Object(entry));
    }
    json!({ "config": c, "rankings": rankings })
}

fn read_summary(path: String) -> AppResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningSummarySnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingSummarySnafu {})?;
    Ok(js)
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> String {
        std::env::temp_dir()
            .join(format!("namerank-app-{}-{}.json", tag, std::process::id()))
            .display()
            .to_string()
    }

    fn fixture(tag: &str) -> (String, JsonFileStore) {
        let path = temp_path(tag);
        let doc = ListFile::new(
            "Baby names",
            None,
            Some("Miller".to_string()),
            &["Anna".to_string(), "Bob".to_string(), "Clara".to_string()],
        );
        let mut store = JsonFileStore::create(&path, doc).unwrap();
        run_record(&mut store, "Anna", "Bob", "a", Some("Sounds nice"), None, None).unwrap();
        run_record(&mut store, "Anna", "Clara", "a", None, Some("feels right"), None).unwrap();
        run_record(&mut store, "Bob", "Clara", "skip", None, None, None).unwrap();
        (path, store)
    }

    #[test]
    fn rank_matches_its_own_summary_as_reference() {
        let (path, store) = fixture("rank-ref");
        let out = temp_path("rank-ref-out");
        run_rank(&store, Some(out.clone()), None).unwrap();

        // The summary just written must check out as a reference.
        run_rank(&store, None, Some(out.clone())).unwrap();

        let contents = fs::read_to_string(&out).unwrap();
        assert!(contents.contains("\"Anna\""));
        assert!(contents.contains("\"countedEvents\": \"2\""));
        assert!(contents.contains("\"passedEvents\": \"1\""));

        // A reopened store tabulates identically.
        let reopened = JsonFileStore::open(&path).unwrap();
        run_rank(&reopened, None, Some(out)).unwrap();
    }

    #[test]
    fn rank_fails_on_a_diverging_reference() {
        let (_path, store) = fixture("rank-diff");
        let out = temp_path("rank-diff-out");
        run_rank(&store, Some(out.clone()), None).unwrap();

        let tampered = fs::read_to_string(&out).unwrap().replace("Anna", "Zoe");
        fs::write(&out, tampered).unwrap();
        let res = run_rank(&store, None, Some(out));
        assert!(res.is_err());
    }

    #[test]
    fn record_validates_names_and_tags() {
        let (_path, mut store) = fixture("record");
        assert!(run_record(&mut store, "Anna", "Zoe", "a", None, None, None).is_err());
        assert!(run_record(&mut store, "Anna", "Bob", "tie", None, None, None).is_err());
        // Nothing was appended by the failed attempts.
        assert_eq!(store.load_comparison_history().unwrap().len(), 3);
    }

    #[test]
    fn next_is_reproducible_for_a_seed() {
        let (_path, store) = fixture("next");
        run_next(&store, Some(7), false).unwrap();
        run_next(&store, Some(7), true).unwrap();
    }

    #[test]
    fn feedback_report_covers_known_names_only() {
        let (_path, store) = fixture("feedback");
        run_feedback(&store, Some("Anna")).unwrap();
        run_feedback(&store, None).unwrap();
        assert!(run_feedback(&store, Some("Zoe")).is_err());
    }

    #[test]
    fn summary_rankings_are_ordered() {
        let (_path, store) = fixture("summary");
        let settings = store.load_settings().unwrap();
        let items = store.load_items().unwrap();
        let history = store.load_comparison_history().unwrap();
        let summary =
            compute_leaderboard(&items, &history, &RatingRules::DEFAULT_RULES).unwrap();
        assert_eq!(summary.rankings[0].name, "Anna");

        let js = build_summary_js(&settings, &summary);
        assert_eq!(js["rankings"][0]["name"], json!("Anna"));
        assert_eq!(js["rankings"][0]["rank"], json!("1"));
        assert_eq!(js["config"]["title"], json!("Baby names"));
    }
}
