//! Recalculation of the denormalized `stats` block on store documents.
//!
//! Surveys are folded once into a per-store aggregate; then every store gets
//! its `stats` rewritten from that map. There is no change detection: each
//! store is counted as processed and, with `--apply`, written.

use crate::core::broker::WriteBroker;
use crate::core::config::MaintenanceConfig;
use crate::core::docstore::{DocumentStore, MongoStore};
use crate::core::error::MakotoError;
use crate::core::interrupt::Interrupt;
use crate::core::output;
use crate::core::time;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document, doc};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

pub const APPROVED_STATUS: &str = "approved";

const SURVEY_FIELDS: [&str; 6] = [
    "storeId",
    "status",
    "rating",
    "averageEarning",
    "waitTimeHours",
    "createdAt",
];

/// Surveys count toward stats when unmoderated (no `status` field) or approved.
pub fn is_eligible(survey: &Document) -> bool {
    match survey.get("status") {
        None => true,
        Some(Bson::String(status)) => status == APPROVED_STATUS,
        Some(_) => false,
    }
}

fn numeric(value: Option<&Bson>) -> Option<f64> {
    match value? {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

/// Running mean that, like `$avg`, skips missing and non-numeric values.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    n: u64,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: i64,
    rating: Mean,
    earning: Mean,
    wait_time: Mean,
    last_surveyed_at: Option<bson::DateTime>,
}

impl Accumulator {
    fn push(&mut self, survey: &Document) {
        self.count += 1;
        self.rating.push(numeric(survey.get("rating")));
        self.earning.push(numeric(survey.get("averageEarning")));
        self.wait_time.push(numeric(survey.get("waitTimeHours")));
        if let Some(Bson::DateTime(created)) = survey.get("createdAt") {
            self.last_surveyed_at = Some(match self.last_surveyed_at {
                Some(latest) if latest >= *created => latest,
                _ => *created,
            });
        }
    }

    fn finish(&self) -> StoreAggregate {
        StoreAggregate {
            survey_count: self.count,
            avg_rating: self.rating.value(),
            avg_earning: self.earning.value(),
            avg_wait_time: self.wait_time.value(),
            last_surveyed_at: self.last_surveyed_at,
        }
    }
}

/// Aggregate over one store's eligible surveys. Averages are `None` when no
/// survey carried a numeric value, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreAggregate {
    pub survey_count: i64,
    pub avg_rating: Option<f64>,
    pub avg_earning: Option<f64>,
    pub avg_wait_time: Option<f64>,
    pub last_surveyed_at: Option<bson::DateTime>,
}

impl StoreAggregate {
    /// Stats for a store nothing eligible refers to.
    pub fn empty() -> Self {
        Self {
            survey_count: 0,
            avg_rating: None,
            avg_earning: None,
            avg_wait_time: None,
            last_surveyed_at: None,
        }
    }
}

fn optional<T: Into<Bson>>(value: Option<T>) -> Bson {
    value.map_or(Bson::Null, Into::into)
}

/// `$set` payload for one store.
pub fn stats_update(aggregate: &StoreAggregate, now: bson::DateTime) -> Document {
    doc! {
        "stats.surveyCount": aggregate.survey_count,
        "stats.avgRating": optional(aggregate.avg_rating),
        "stats.avgEarning": optional(aggregate.avg_earning),
        "stats.avgWaitTime": optional(aggregate.avg_wait_time),
        "stats.lastSurveyedAt": optional(aggregate.last_surveyed_at),
        "updatedAt": now,
    }
}

/// Single pass over the survey collection, grouped by `storeId`.
pub fn aggregate_surveys(
    broker: &WriteBroker<'_>,
    collection: &str,
    interrupt: &Interrupt,
) -> Result<FxHashMap<ObjectId, StoreAggregate>, MakotoError> {
    let mut accumulators: FxHashMap<ObjectId, Accumulator> = FxHashMap::default();
    broker.scan(collection, &SURVEY_FIELDS, &mut |survey| {
        interrupt.check()?;
        if !is_eligible(&survey) {
            return Ok(());
        }
        let Some(Bson::ObjectId(store_id)) = survey.get("storeId") else {
            debug!(survey = ?survey.get("_id"), "skipping survey without ObjectId storeId");
            return Ok(());
        };
        accumulators.entry(*store_id).or_default().push(&survey);
        Ok(())
    })?;
    interrupt.check()?;

    Ok(accumulators
        .into_iter()
        .map(|(store_id, acc)| (store_id, acc.finish()))
        .collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecalcReport {
    /// Stores that had at least one eligible survey.
    pub aggregated_stores: usize,
    /// Every store with an ObjectId `_id`, changed or not.
    pub processed: usize,
    /// Processed stores that received empty stats.
    pub zeroed: usize,
}

impl RecalcReport {
    pub fn reflected(&self) -> usize {
        self.processed - self.zeroed
    }
}

pub fn recalc_stores(
    broker: &WriteBroker<'_>,
    collection: &str,
    stats: &FxHashMap<ObjectId, StoreAggregate>,
    now: bson::DateTime,
    interrupt: &Interrupt,
) -> Result<RecalcReport, MakotoError> {
    let empty = StoreAggregate::empty();
    let mut report = RecalcReport {
        aggregated_stores: stats.len(),
        ..RecalcReport::default()
    };

    broker.scan(collection, &["_id"], &mut |store| {
        interrupt.check()?;
        let Some(id @ Bson::ObjectId(oid)) = store.get("_id") else {
            return Ok(());
        };
        let aggregate = match stats.get(oid) {
            Some(aggregate) => aggregate,
            None => {
                report.zeroed += 1;
                &empty
            }
        };
        report.processed += 1;
        broker.set_fields("stats.recalc", collection, id, stats_update(aggregate, now))
    })?;
    interrupt.check()?;

    Ok(report)
}

pub fn run_recalc(
    store: &dyn DocumentStore,
    config: &MaintenanceConfig,
    interrupt: &Interrupt,
) -> Result<RecalcReport, MakotoError> {
    let broker = WriteBroker::new(store, config.mode);
    let outcome = recalc_all(&broker, config, interrupt);
    let report = interrupt.settle(outcome)?;
    info!(
        mode = ?config.mode,
        processed = report.processed,
        zeroed = report.zeroed,
        applied = broker.applied(),
        "store stats recalculation finished"
    );
    Ok(report)
}

fn recalc_all(
    broker: &WriteBroker<'_>,
    config: &MaintenanceConfig,
    interrupt: &Interrupt,
) -> Result<RecalcReport, MakotoError> {
    let now = time::run_timestamp();
    let stats = aggregate_surveys(broker, &config.survey_collection, interrupt)?;
    info!(stores = stats.len(), "survey aggregation finished");
    recalc_stores(broker, &config.store_collection, &stats, now, interrupt)
}

pub fn report_lines(report: &RecalcReport) -> Vec<String> {
    vec![
        output::count_line("stores processed", report.processed, 28),
        output::count_line("stores zeroed", report.zeroed, 28),
        output::count_line("stores with stats reflected", report.reflected(), 28),
    ]
}

pub fn run_recalc_cli(
    config: &MaintenanceConfig,
    interrupt: &Interrupt,
) -> Result<(), MakotoError> {
    let store = MongoStore::connect(config)?;
    output::print_run_header(config);

    let report = run_recalc(&store, config, interrupt)?;

    println!();
    println!("aggregated surveys for {} stores", report.aggregated_stores);
    println!();
    for line in report_lines(&report) {
        println!("{}", line);
    }
    output::print_dry_run_hint(config.mode);
    Ok(())
}
