//! Industry-code normalization for stores and surveys.
//!
//! Older writers stored industries as romanized codes (`deriheru`,
//! `hotel_health`, …) or full-width variants (`ＤＣ`). This job rewrites them
//! to the canonical labels in [`catalog::INDUSTRIES`]. It is idempotent: a
//! canonical value is never rewritten, so a second `--apply` run updates
//! nothing.

use crate::core::broker::WriteBroker;
use crate::core::catalog;
use crate::core::config::MaintenanceConfig;
use crate::core::docstore::{DocumentStore, MongoStore};
use crate::core::error::MakotoError;
use crate::core::interrupt::Interrupt;
use crate::core::output;
use mongodb::bson::{Bson, Document, doc};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

/// Known spelling → canonical label. Canonical labels map to themselves.
pub const SYNONYMS: [(&str, &str); 22] = [
    ("deriheru", "デリヘル"),
    ("delivery_health", "デリヘル"),
    ("デリヘル", "デリヘル"),
    ("hoteheru", "ホテヘル"),
    ("hotel_health", "ホテヘル"),
    ("ホテヘル", "ホテヘル"),
    ("hakoheru", "箱ヘル"),
    ("hako_heru", "箱ヘル"),
    ("箱ヘル", "箱ヘル"),
    ("sopu", "ソープ"),
    ("soap", "ソープ"),
    ("ソープ", "ソープ"),
    ("dc", "DC"),
    ("ＤＣ", "DC"),
    ("Ｄｃ", "DC"),
    ("DC", "DC"),
    ("huesu", "風エス"),
    ("fuesu", "風エス"),
    ("風エス", "風エス"),
    ("menesu", "メンエス"),
    ("mens_es", "メンエス"),
    ("メンエス", "メンエス"),
];

const STORE_FIELD: &str = "industry";
const STORE_LIST_FIELD: &str = "industryCodes";
const SURVEY_FIELD: &str = "storeIndustry";
const SURVEY_LEGACY_FIELD: &str = "industryCode";

fn lookup(key: &str) -> Option<&'static str> {
    SYNONYMS
        .iter()
        .find(|(spelling, _)| *spelling == key)
        .map(|(_, label)| *label)
}

/// Canonical label for one raw value.
///
/// Trims, then tries the exact spelling before its lowercase form, so a key
/// that differs from another only by case is never collapsed into it.
/// Unknown values come back trimmed but otherwise untouched. Absent or blank
/// input yields `""`, which callers treat as "no label".
pub fn normalize_code(value: Option<&str>) -> String {
    let Some(raw) = value else {
        return String::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if let Some(label) = lookup(trimmed) {
        return label.to_string();
    }
    if let Some(label) = lookup(&trimmed.to_lowercase()) {
        return label.to_string();
    }
    trimmed.to_string()
}

/// Normalize each value, drop blanks, and keep the first occurrence of each
/// label.
pub fn normalize_codes<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = FxHashSet::default();
    let mut normalized = Vec::new();
    for value in values {
        let label = normalize_code(Some(value));
        if label.is_empty() || !seen.insert(label.clone()) {
            continue;
        }
        normalized.push(label);
    }
    normalized
}

/// Whether `label` belongs to the closed canonical set.
pub fn is_canonical(label: &str) -> bool {
    catalog::is_canonical_industry(label)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub stores_updated: usize,
    pub surveys_updated: usize,
}

/// The `$set` a store document needs, if any.
///
/// A list holding anything but strings is left as stored: rewriting it would
/// drop the entries normalization cannot read.
pub fn store_update(doc: &Document) -> Option<Document> {
    if let Some(stored) = doc.get(STORE_LIST_FIELD) {
        let original: Vec<Bson> = match stored {
            Bson::Array(items) => items.clone(),
            Bson::Null => Vec::new(),
            other => vec![other.clone()],
        };
        let labels: Option<Vec<&str>> = original.iter().map(Bson::as_str).collect();
        let Some(labels) = labels else {
            debug!(
                target: "audit",
                id = ?doc.get("_id"),
                field = STORE_LIST_FIELD,
                "skipping list with non-string entries"
            );
            return None;
        };
        let normalized = normalize_codes(labels);
        let normalized: Vec<Bson> = normalized.into_iter().map(Bson::String).collect();
        if normalized == original {
            return None;
        }
        return Some(doc! { STORE_LIST_FIELD: normalized });
    }

    let original = doc.get_str(STORE_FIELD).ok();
    let normalized = normalize_code(original);
    if normalized.is_empty() || original == Some(normalized.as_str()) {
        return None;
    }
    Some(doc! { STORE_FIELD: normalized })
}

/// The `$set` a survey document needs, if any. The current field wins over the
/// legacy one; the result is always written to the current field.
pub fn survey_update(doc: &Document) -> Option<Document> {
    let original = doc
        .get_str(SURVEY_FIELD)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| doc.get_str(SURVEY_LEGACY_FIELD).ok());
    let normalized = normalize_code(original);
    if normalized.is_empty() || original == Some(normalized.as_str()) {
        return None;
    }
    Some(doc! { SURVEY_FIELD: normalized })
}

fn apply_updates(
    broker: &WriteBroker<'_>,
    interrupt: &Interrupt,
    op: &str,
    collection: &str,
    fields: &[&str],
    plan: fn(&Document) -> Option<Document>,
) -> Result<usize, MakotoError> {
    let mut updated = 0;
    broker.scan(collection, fields, &mut |doc| {
        interrupt.check()?;
        let Some(update) = plan(&doc) else {
            return Ok(());
        };
        let Some(id) = doc.get("_id") else {
            debug!(collection, "skipping document without _id");
            return Ok(());
        };
        updated += 1;
        broker.set_fields(op, collection, id, update)
    })?;
    interrupt.check()?;
    Ok(updated)
}

pub fn normalize_stores(
    broker: &WriteBroker<'_>,
    collection: &str,
    interrupt: &Interrupt,
) -> Result<usize, MakotoError> {
    apply_updates(
        broker,
        interrupt,
        "normalize.store",
        collection,
        &[STORE_LIST_FIELD, STORE_FIELD],
        store_update,
    )
}

pub fn normalize_surveys(
    broker: &WriteBroker<'_>,
    collection: &str,
    interrupt: &Interrupt,
) -> Result<usize, MakotoError> {
    apply_updates(
        broker,
        interrupt,
        "normalize.survey",
        collection,
        &[SURVEY_FIELD, SURVEY_LEGACY_FIELD],
        survey_update,
    )
}

pub fn run_normalize(
    store: &dyn DocumentStore,
    config: &MaintenanceConfig,
    interrupt: &Interrupt,
) -> Result<NormalizeReport, MakotoError> {
    let broker = WriteBroker::new(store, config.mode);
    let outcome = normalize_all(&broker, config, interrupt);
    let report = interrupt.settle(outcome)?;
    info!(
        mode = ?config.mode,
        stores_updated = report.stores_updated,
        surveys_updated = report.surveys_updated,
        applied = broker.applied(),
        "industry normalization finished"
    );
    Ok(report)
}

fn normalize_all(
    broker: &WriteBroker<'_>,
    config: &MaintenanceConfig,
    interrupt: &Interrupt,
) -> Result<NormalizeReport, MakotoError> {
    let stores_updated = normalize_stores(broker, &config.store_collection, interrupt)?;
    let surveys_updated = normalize_surveys(broker, &config.survey_collection, interrupt)?;
    Ok(NormalizeReport {
        stores_updated,
        surveys_updated,
    })
}

pub fn report_lines(report: &NormalizeReport) -> Vec<String> {
    vec![
        output::count_line("stores to update", report.stores_updated, 17),
        output::count_line("surveys to update", report.surveys_updated, 17),
    ]
}

pub fn run_normalize_cli(
    config: &MaintenanceConfig,
    interrupt: &Interrupt,
) -> Result<(), MakotoError> {
    let store = MongoStore::connect(config)?;
    output::print_run_header(config);

    let report = run_normalize(&store, config, interrupt)?;

    println!();
    for line in report_lines(&report) {
        println!("{}", line);
    }
    output::print_dry_run_hint(config.mode);
    Ok(())
}
