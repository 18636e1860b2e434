use makoto_tools::core::catalog::{INDUSTRIES, PREFECTURES};
use makoto_tools::plugins::seed::{
    self, RandomIds, STORES_FILE, SURVEYS_FILE, SequentialIds, generate_dataset, run_seed,
    verify_dataset,
};
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn read_json(path: &Path) -> Vec<Value> {
    let raw = fs::read_to_string(path).unwrap();
    serde_json::from_str::<Value>(&raw)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

fn oid(value: &Value) -> &str {
    value["$oid"].as_str().unwrap()
}

#[test]
fn test_seed_writes_one_store_per_pair() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("sample");
    let summary = run_seed(&out, &mut SequentialIds::default()).unwrap();

    let stores = read_json(&out.join(STORES_FILE));
    assert_eq!(stores.len(), 329);
    assert_eq!(summary.stores, 329);

    let pairs: HashSet<(String, String)> = stores
        .iter()
        .map(|s| {
            (
                s["prefecture"].as_str().unwrap().to_string(),
                s["industry"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(pairs.len(), PREFECTURES.len() * INDUSTRIES.len());

    // Prefecture-major, industry-minor.
    assert_eq!(stores[0]["prefecture"], "北海道");
    assert_eq!(stores[0]["industry"], INDUSTRIES[0]);
    assert_eq!(stores[7]["prefecture"], PREFECTURES[1]);
    assert_eq!(stores[328]["prefecture"], "沖縄県");
    assert_eq!(stores[328]["industry"], INDUSTRIES[6]);
}

#[test]
fn test_surveys_reference_existing_stores_with_matching_snapshot() {
    let tmp = tempdir().unwrap();
    let summary = run_seed(tmp.path(), &mut SequentialIds::default()).unwrap();

    let stores = read_json(&tmp.path().join(STORES_FILE));
    let surveys = read_json(&tmp.path().join(SURVEYS_FILE));
    assert_eq!(surveys.len(), summary.surveys);

    let by_id: HashMap<&str, &Value> = stores.iter().map(|s| (oid(&s["_id"]), s)).collect();
    let mut per_store: HashMap<&str, Vec<f64>> = HashMap::new();
    for survey in &surveys {
        let store = by_id
            .get(oid(&survey["storeId"]))
            .expect("survey points at a generated store");
        assert_eq!(survey["storeName"], store["name"]);
        assert_eq!(survey["storePrefecture"], store["prefecture"]);
        assert_eq!(survey["storeIndustry"], store["industry"]);
        assert_eq!(survey["storeArea"], store["area"]);
        per_store
            .entry(oid(&survey["storeId"]))
            .or_default()
            .push(survey["rating"].as_f64().unwrap());
    }

    for store in &stores {
        let ratings = &per_store[oid(&store["_id"])];
        assert!((2..=10).contains(&ratings.len()));
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        let average = store["averageRating"].as_f64().unwrap();
        assert_eq!(average, seed::round1(mean), "mean of surveys is {mean}");
    }
}

#[test]
fn test_survey_fields_stay_in_range() {
    let dataset = generate_dataset(seed::SEED, &mut SequentialIds::default()).unwrap();
    let email = Regex::new(r"^store-\d{2,3}-survey-\d+@example\.com$").unwrap();
    for survey in &dataset.surveys {
        assert!((3.1..=5.0).contains(&survey.rating), "{}", survey.rating);
        assert_eq!((survey.rating * 10.0).round() / 10.0, survey.rating);
        assert!((20..=37).contains(&survey.age));
        assert!((80..=134).contains(&survey.spec_score));
        assert!((1..=6).contains(&survey.wait_time_hours));
        assert!((5..=16).contains(&survey.average_earning));
        assert!(survey.work_type == "在籍" || survey.work_type == "出稼ぎ");
        assert!(email.is_match(&survey.email_address));
        assert_eq!(survey.image_urls.len(), 2);
        assert!(!survey.customer_comment.contains('{'));
    }
}

#[test]
fn test_sequential_ids_give_byte_identical_output() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    run_seed(first.path(), &mut SequentialIds::default()).unwrap();
    run_seed(second.path(), &mut SequentialIds::default()).unwrap();

    for file in [STORES_FILE, SURVEYS_FILE] {
        assert_eq!(
            fs::read(first.path().join(file)).unwrap(),
            fs::read(second.path().join(file)).unwrap(),
            "{file} differs between runs"
        );
    }
}

#[test]
fn test_random_ids_change_only_ids() {
    let a = generate_dataset(seed::SEED, &mut RandomIds).unwrap();
    let b = generate_dataset(seed::SEED, &mut RandomIds).unwrap();
    assert_eq!(a.surveys.len(), b.surveys.len());
    assert_ne!(a.stores[0].id, b.stores[0].id);

    for (x, y) in a.stores.iter().zip(&b.stores) {
        assert_eq!(x.name, y.name);
        assert_eq!(x.average_rating, y.average_rating);
        assert_eq!(x.created_at, y.created_at);
    }
    for (x, y) in a.surveys.iter().zip(&b.surveys) {
        assert_eq!(x.rating, y.rating);
        assert_eq!(x.customer_comment, y.customer_comment);
        assert_eq!(x.visited_period, y.visited_period);
    }
}

#[test]
fn test_extended_json_shapes() {
    let tmp = tempdir().unwrap();
    run_seed(tmp.path(), &mut RandomIds).unwrap();

    let oid_re = Regex::new(r"^[0-9a-f]{24}$").unwrap();
    let date_re = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").unwrap();

    let stores = read_json(&tmp.path().join(STORES_FILE));
    let surveys = read_json(&tmp.path().join(SURVEYS_FILE));
    for store in &stores {
        assert!(oid_re.is_match(oid(&store["_id"])));
        assert!(date_re.is_match(store["createdAt"]["$date"].as_str().unwrap()));
        assert!(date_re.is_match(store["updatedAt"]["$date"].as_str().unwrap()));
    }
    let branches = stores.iter().filter(|s| s.get("branchName").is_some()).count();
    assert_eq!(branches, 329 / 4);
    for survey in &surveys {
        assert!(oid_re.is_match(oid(&survey["_id"])));
        assert!(oid_re.is_match(oid(&survey["storeId"])));
        assert!(date_re.is_match(survey["createdAt"]["$date"].as_str().unwrap()));
    }
}

#[test]
fn test_summary_line_names_the_output_dir() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("nested").join("sample");
    let summary = run_seed(&out, &mut SequentialIds::default()).unwrap();
    assert!(out.join(STORES_FILE).is_file());
    assert_eq!(
        summary.line(),
        format!(
            "Generated 329 stores and {} surveys at {}",
            summary.surveys,
            out.display()
        )
    );
}

#[test]
fn test_verify_rejects_a_dangling_store_reference() {
    let mut dataset = generate_dataset(seed::SEED, &mut SequentialIds::default()).unwrap();
    dataset.surveys[0].store_id.oid = "f".repeat(24);
    assert!(verify_dataset(&dataset).is_err());
}

#[test]
fn test_verify_rejects_an_average_within_half_a_step() {
    let mut dataset = generate_dataset(seed::SEED, &mut SequentialIds::default()).unwrap();
    verify_dataset(&dataset).unwrap();

    // Off by less than the rounding step still is not the rounded mean.
    dataset.stores[0].average_rating += 0.04;
    assert!(verify_dataset(&dataset).is_err());
}
