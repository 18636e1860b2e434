//! Development seed data: one store per prefecture × industry, each with a
//! handful of surveys, written as MongoDB extended JSON ready for
//! `mongoimport --jsonArray`.
//!
//! The store layer is a pure function of the catalog. For surveys, a seeded RNG
//! picks the per-store survey count and each survey's work type; every other
//! survey field is derived from the store index and the survey offset. Only the
//! ids come from an [`IdSource`], so a fixed source makes the output
//! byte-for-byte reproducible.

use crate::core::catalog::{self, AREAS, GENRES, INDUSTRIES, PREFECTURES, WORK_TYPES};
use crate::core::error::MakotoError;
use crate::core::time;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SAMPLE_DIR: &str = "sample";
pub const STORES_FILE: &str = "stores.json";
pub const SURVEYS_FILE: &str = "surveys.json";

/// RNG seed for the survey layer.
pub const SEED: u64 = 42;

pub const SURVEYS_PER_STORE: RangeInclusive<usize> = 2..=10;
pub const RATING_FLOOR: f64 = 3.1;
pub const RATING_CEILING: f64 = 5.0;

const IMAGE_CDN: &str = "https://cdn.example.com/surveys";

const CUSTOMER_COMMENTS: [&str; 3] = [
    "{name}は{area}エリアで客層が落ち着いており、常連比率が高くて安定して稼げました。",
    "{name}ではSNS指名が伸びやすく、短期の{work_type}でもリピートがつきました。",
    "{name}は旅行客が多いので、推しオプションを提案すると単価が伸びます。",
];

const STAFF_COMMENTS: [&str; 3] = [
    "受付スタッフがこまめに連絡をくれるので、待機中の不安がありませんでした。",
    "シフト管理がアプリ化されていて、急な調整もすぐ対応してもらえました。",
    "送迎ドライバーさんが各ホテル事情を熟知しており、道に迷うことがありません。",
];

const ENVIRONMENT_COMMENTS: [&str; 3] = [
    "控室が個室で、仮眠スペースやWi-Fiが完備されている点が助かります。",
    "衣装と備品が常に清潔で、バックヤードの雰囲気も穏やかです。",
    "待機フロアに軽食と飲み物があり、長時間のシフトでも体調管理が楽でした。",
];

/// Supplies document ids as 24 lowercase hex chars (an ObjectId's text form).
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// 12 random bytes per id. No uniqueness check; collisions are negligible at
/// seed-data scale.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        hex::encode(rand::random::<[u8; 12]>())
    }
}

/// Counter ids (`000…001`, `000…002`, …) for reproducible output.
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: u64,
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        self.issued += 1;
        format!("{:024x}", self.issued)
    }
}

/// Extended-JSON ObjectId: `{"$oid": "…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtOid {
    #[serde(rename = "$oid")]
    pub oid: String,
}

/// Extended-JSON date: `{"$date": "2024-01-01T03:00:00Z"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtDate {
    #[serde(rename = "$date")]
    pub date: String,
}

impl ExtDate {
    pub fn from_utc(ts: &DateTime<Utc>) -> Self {
        Self {
            date: time::iso_z(ts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub open: String,
    pub close: String,
}

/// A generated store before its rating is known.
#[derive(Debug, Clone)]
pub struct StoreRecord {
    pub oid: String,
    /// 1-based position in prefecture-major, industry-minor order.
    pub index: usize,
    pub name: String,
    pub branch: Option<String>,
    pub prefecture: &'static str,
    pub area: &'static str,
    pub industry: &'static str,
    pub genre: &'static str,
    pub business_hours: BusinessHours,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(rename = "_id")]
    pub id: ExtOid,
    pub name: String,
    pub prefecture: String,
    pub industry: String,
    pub business_hours: BusinessHours,
    pub average_rating: f64,
    pub created_at: ExtDate,
    pub updated_at: ExtDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDocument {
    #[serde(rename = "_id")]
    pub id: ExtOid,
    pub store_id: ExtOid,
    pub store_name: String,
    pub store_prefecture: String,
    pub store_industry: String,
    pub visited_period: String,
    pub work_type: String,
    pub age: u32,
    pub spec_score: u32,
    pub wait_time_hours: u32,
    pub average_earning: u32,
    pub rating: f64,
    pub customer_comment: String,
    pub staff_comment: String,
    pub work_environment_comment: String,
    pub email_address: String,
    pub image_urls: Vec<String>,
    pub helpful_count: u32,
    pub created_at: ExtDate,
    pub updated_at: ExtDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_genre: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SeedDataset {
    pub stores: Vec<StoreDocument>,
    pub surveys: Vec<SurveyDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub stores: usize,
    pub surveys: usize,
    pub dir: PathBuf,
}

impl SeedSummary {
    pub fn line(&self) -> String {
        format!(
            "Generated {} stores and {} surveys at {}",
            self.stores,
            self.surveys,
            self.dir.display()
        )
    }
}

/// Round half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn fill_template(template: &str, store: &StoreRecord, work_type: &str) -> String {
    template
        .replace("{name}", &store.name)
        .replace("{area}", store.area)
        .replace("{work_type}", work_type)
}

fn pick_comment(templates: &[&str], store: &StoreRecord, work_type: &str) -> String {
    fill_template(templates[store.index % templates.len()], store, work_type)
}

pub fn generate_store_records(ids: &mut dyn IdSource) -> Result<Vec<StoreRecord>, MakotoError> {
    let base = time::utc_datetime(2024, 1, 1, 3, 0, 0)?;
    let mut stores = Vec::with_capacity(PREFECTURES.len() * INDUSTRIES.len());
    let mut index = 0usize;

    for prefecture in PREFECTURES {
        for industry in INDUSTRIES {
            index += 1;
            let title = catalog::industry_title(industry).ok_or_else(|| {
                MakotoError::ValidationError(format!("no store title for industry '{industry}'"))
            })?;
            let area = AREAS[(index - 1) % AREAS.len()];
            let genre = GENRES[(index - 1) % GENRES.len()];
            let open_hour = 9 + index % 4;
            let close_hour = (open_hour + 12).min(23);
            let day = 2 * index as i64;

            stores.push(StoreRecord {
                oid: ids.next_id(),
                index,
                name: format!("{prefecture}{title} {}号店", index % 3 + 1),
                branch: (index % 4 == 0).then(|| format!("{area}店")),
                prefecture,
                area,
                industry,
                genre,
                business_hours: BusinessHours {
                    open: format!("{open_hour:02}:00"),
                    close: format!("{close_hour:02}:30"),
                },
                created_at: time::days_after(base, day),
                updated_at: time::days_after(base, day + 8),
                slug: format!("store-{index:02}"),
            });
        }
    }
    Ok(stores)
}

pub fn build_store_document(store: &StoreRecord, average_rating: f64) -> StoreDocument {
    StoreDocument {
        id: ExtOid {
            oid: store.oid.clone(),
        },
        name: store.name.clone(),
        prefecture: store.prefecture.to_string(),
        industry: store.industry.to_string(),
        business_hours: store.business_hours.clone(),
        average_rating: round1(average_rating),
        created_at: ExtDate::from_utc(&store.created_at),
        updated_at: ExtDate::from_utc(&store.updated_at),
        branch_name: store.branch.clone(),
        area: Some(store.area.to_string()).filter(|a| !a.is_empty()),
        genre: Some(store.genre.to_string()).filter(|g| !g.is_empty()),
    }
}

/// Surveys for one store plus the mean of their stored (rounded) ratings.
pub fn generate_surveys_for_store<R: Rng + ?Sized>(
    store: &StoreRecord,
    rng: &mut R,
    ids: &mut dyn IdSource,
) -> Result<(Vec<SurveyDocument>, f64), MakotoError> {
    let base = time::utc_datetime(2024, 2, 1, 6, 0, 0)?;
    let count = rng.gen_range(SURVEYS_PER_STORE);
    let idx = store.index;
    let mut surveys = Vec::with_capacity(count);
    let mut ratings = Vec::with_capacity(count);

    for offset in 0..count {
        let id = ids.next_id();
        let work_type = WORK_TYPES[rng.gen_range(0..WORK_TYPES.len())];
        let rating = round1(
            (RATING_FLOOR + ((idx * 3 + offset * 5) % 22) as f64 / 10.0)
                .clamp(RATING_FLOOR, RATING_CEILING),
        );
        ratings.push(rating);
        let day = (idx * 5 + offset) as i64;

        surveys.push(SurveyDocument {
            id: ExtOid { oid: id },
            store_id: ExtOid {
                oid: store.oid.clone(),
            },
            store_name: store.name.clone(),
            store_prefecture: store.prefecture.to_string(),
            store_industry: store.industry.to_string(),
            visited_period: format!("2024-{:02}", (offset + idx) % 12 + 1),
            work_type: work_type.to_string(),
            age: (20 + (idx + offset) % 18) as u32,
            spec_score: (80 + (idx * 5 + offset * 7) % 55) as u32,
            wait_time_hours: (1 + (idx + offset) % 6) as u32,
            average_earning: (5 + (idx + offset) % 12) as u32,
            rating,
            customer_comment: pick_comment(&CUSTOMER_COMMENTS, store, work_type),
            staff_comment: pick_comment(&STAFF_COMMENTS, store, work_type),
            work_environment_comment: pick_comment(&ENVIRONMENT_COMMENTS, store, work_type),
            email_address: format!("{}-survey-{}@example.com", store.slug, offset + 1),
            image_urls: vec![
                format!("{IMAGE_CDN}/{}/photo-{}.jpg", store.slug, offset + 1),
                format!("{IMAGE_CDN}/{}/photo-{}.jpg", store.slug, offset + 2),
            ],
            helpful_count: ((idx * 17 + offset * 23) % 180) as u32,
            created_at: ExtDate::from_utc(&time::days_after(base, day)),
            updated_at: ExtDate::from_utc(&time::days_after(base, day + 1)),
            store_branch_name: store.branch.clone(),
            store_area: Some(store.area.to_string()).filter(|a| !a.is_empty()),
            store_genre: Some(store.genre.to_string()).filter(|g| !g.is_empty()),
        });
    }

    let average = mean(&ratings).ok_or_else(|| {
        MakotoError::ValidationError(format!("store {} generated no surveys", store.slug))
    })?;
    Ok((surveys, average))
}

pub fn generate_dataset(seed: u64, ids: &mut dyn IdSource) -> Result<SeedDataset, MakotoError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = generate_store_records(ids)?;
    let mut stores = Vec::with_capacity(records.len());
    let mut surveys = Vec::new();

    for record in &records {
        let (store_surveys, average) = generate_surveys_for_store(record, &mut rng, ids)?;
        debug!(
            store = %record.slug,
            surveys = store_surveys.len(),
            average,
            "generated store"
        );
        surveys.extend(store_surveys);
        stores.push(build_store_document(record, average));
    }

    Ok(SeedDataset { stores, surveys })
}

/// Check the cross-collection invariants before anything is written.
pub fn verify_dataset(dataset: &SeedDataset) -> Result<(), MakotoError> {
    let expected = PREFECTURES.len() * INDUSTRIES.len();
    if dataset.stores.len() != expected {
        return Err(MakotoError::ValidationError(format!(
            "expected {expected} stores, generated {}",
            dataset.stores.len()
        )));
    }

    let mut pairs = FxHashSet::default();
    let mut by_id: FxHashMap<&str, &StoreDocument> = FxHashMap::default();
    for store in &dataset.stores {
        if !pairs.insert((store.prefecture.as_str(), store.industry.as_str())) {
            return Err(MakotoError::ValidationError(format!(
                "duplicate store for {} / {}",
                store.prefecture, store.industry
            )));
        }
        by_id.insert(store.id.oid.as_str(), store);
    }

    let mut ratings: FxHashMap<&str, Vec<f64>> = FxHashMap::default();
    for survey in &dataset.surveys {
        let Some(store) = by_id.get(survey.store_id.oid.as_str()) else {
            return Err(MakotoError::ValidationError(format!(
                "survey {} references unknown store {}",
                survey.id.oid, survey.store_id.oid
            )));
        };
        if survey.store_name != store.name
            || survey.store_prefecture != store.prefecture
            || survey.store_industry != store.industry
            || survey.store_branch_name != store.branch_name
            || survey.store_area != store.area
            || survey.store_genre != store.genre
        {
            return Err(MakotoError::ValidationError(format!(
                "survey {} carries a stale snapshot of store {}",
                survey.id.oid, store.id.oid
            )));
        }
        ratings
            .entry(survey.store_id.oid.as_str())
            .or_default()
            .push(survey.rating);
    }

    for store in &dataset.stores {
        let Some(mean) = ratings.get(store.id.oid.as_str()).and_then(|r| mean(r)) else {
            return Err(MakotoError::ValidationError(format!(
                "store {} has no surveys",
                store.id.oid
            )));
        };
        if store.average_rating != round1(mean) {
            return Err(MakotoError::ValidationError(format!(
                "store {} averageRating {} does not match survey mean {mean:.3}",
                store.id.oid, store.average_rating
            )));
        }
    }
    Ok(())
}

pub fn write_dataset(dataset: &SeedDataset, dir: &Path) -> Result<SeedSummary, MakotoError> {
    fs::create_dir_all(dir)?;
    fs::write(
        dir.join(STORES_FILE),
        serde_json::to_string_pretty(&dataset.stores)?,
    )?;
    fs::write(
        dir.join(SURVEYS_FILE),
        serde_json::to_string_pretty(&dataset.surveys)?,
    )?;
    Ok(SeedSummary {
        stores: dataset.stores.len(),
        surveys: dataset.surveys.len(),
        dir: dir.to_path_buf(),
    })
}

/// Generate, verify and write the seed files into `out_dir`.
pub fn run_seed(out_dir: &Path, ids: &mut dyn IdSource) -> Result<SeedSummary, MakotoError> {
    let dataset = generate_dataset(SEED, ids)?;
    verify_dataset(&dataset)?;
    let summary = write_dataset(&dataset, out_dir)?;
    info!(
        stores = summary.stores,
        surveys = summary.surveys,
        dir = %summary.dir.display(),
        "seed data written"
    );
    Ok(summary)
}

pub fn run_seed_cli(out_dir: &Path) -> Result<(), MakotoError> {
    let summary = run_seed(out_dir, &mut RandomIds)?;
    println!("{}", summary.line());
    Ok(())
}
