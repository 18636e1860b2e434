use clap::Parser;
use makoto_tools::core::broker::WriteBroker;
use makoto_tools::core::catalog::{self, AREAS, GENRES, INDUSTRIES, PREFECTURES, WORK_TYPES};
use makoto_tools::core::config::{
    DEFAULT_DATABASE, DEFAULT_STORE_COLLECTION, DEFAULT_URI, MaintenanceCli, MaintenanceConfig,
    Mode,
};
use makoto_tools::core::docstore::{DocumentStore, MemoryStore};
use makoto_tools::core::error::MakotoError;
use makoto_tools::core::output;
use makoto_tools::{Cli, Command};
use mongodb::bson::{Bson, doc};

#[derive(Parser, Debug)]
struct MaintenanceHarness {
    #[clap(flatten)]
    args: MaintenanceCli,
}

#[test]
fn catalog_sizes_and_titles() {
    assert_eq!(PREFECTURES.len(), 47);
    assert_eq!(INDUSTRIES.len(), 7);
    assert_eq!(AREAS.len(), 8);
    assert_eq!(GENRES.len(), 5);
    assert_eq!(WORK_TYPES, ["在籍", "出稼ぎ"]);
    for industry in INDUSTRIES {
        assert!(catalog::industry_title(industry).is_some(), "{industry}");
        assert!(catalog::is_canonical_industry(industry));
    }
    assert!(catalog::industry_title("ピンサロ").is_none());
}

#[test]
fn flags_override_defaults() {
    let harness = MaintenanceHarness::try_parse_from([
        "makoto",
        "--apply",
        "--survey-collection",
        "reviews",
        "--database",
        "staging",
    ])
    .unwrap();
    let config = MaintenanceConfig::from(harness.args);

    assert_eq!(config.mode, Mode::Apply);
    assert_eq!(config.survey_collection, "reviews");
    assert_eq!(config.database, "staging");
}

#[test]
fn missing_flags_fall_back_to_defaults() {
    // Only meaningful when the variables are not exported in the test env.
    if std::env::var_os("MONGO_URI").is_some()
        || std::env::var_os("MONGO_DB").is_some()
        || std::env::var_os("STORE_COLLECTION").is_some()
    {
        return;
    }
    let harness = MaintenanceHarness::try_parse_from(["makoto"]).unwrap();
    let config = MaintenanceConfig::from(harness.args);

    assert_eq!(config.mode, Mode::DryRun);
    assert_eq!(config.uri, DEFAULT_URI);
    assert_eq!(config.database, DEFAULT_DATABASE);
    assert_eq!(config.store_collection, DEFAULT_STORE_COLLECTION);
}

#[test]
fn cli_exposes_three_subcommands() {
    let seed = Cli::try_parse_from(["makoto", "seed"]).unwrap();
    assert!(matches!(seed.command, Command::Seed));

    let normalize = Cli::try_parse_from(["makoto", "normalize", "--apply"]).unwrap();
    match normalize.command {
        Command::Normalize(args) => assert!(args.apply),
        other => panic!("unexpected command: {other:?}"),
    }

    let recalc = Cli::try_parse_from(["makoto", "recalc-stats"]).unwrap();
    match recalc.command {
        Command::RecalcStats(args) => assert!(!args.apply),
        other => panic!("unexpected command: {other:?}"),
    }

    assert!(Cli::try_parse_from(["makoto", "seed", "--apply"]).is_err());
    assert!(Cli::try_parse_from(["makoto", "vacuum"]).is_err());
}

#[test]
fn broker_counts_only_applied_writes() {
    let store = MemoryStore::new();
    store.insert_many("stores", (1..=3).map(|i| doc! { "_id": i, "n": 0 }));

    let dry = WriteBroker::new(&store, Mode::DryRun);
    let apply = WriteBroker::new(&store, Mode::Apply);
    for i in 1..=3 {
        dry.set_fields("test", "stores", &Bson::Int32(i), doc! { "n": i })
            .unwrap();
    }
    apply
        .set_fields("test", "stores", &Bson::Int32(2), doc! { "n": 2 })
        .unwrap();

    assert_eq!(dry.applied(), 0);
    assert_eq!(apply.applied(), 1);
    assert_eq!(apply.mode(), Mode::Apply);
    let values: Vec<i32> = store
        .documents("stores")
        .iter()
        .map(|d| d.get_i32("n").unwrap())
        .collect();
    assert_eq!(values, vec![0, 2, 0]);
}

#[test]
fn memory_store_scan_allows_writes_from_the_visitor() {
    let store = MemoryStore::new();
    store.insert_many("stores", (1..=2).map(|i| doc! { "_id": i, "seen": false }));

    store
        .scan("stores", &["seen"], &mut |doc| {
            let id = doc.get("_id").cloned().unwrap_or(Bson::Null);
            store.set_fields("stores", &id, doc! { "seen": true })
        })
        .unwrap();

    assert!(
        store
            .documents("stores")
            .iter()
            .all(|d| d.get_bool("seen").unwrap())
    );
    assert_eq!(store.write_count(), 2);
}

#[test]
fn error_messages_carry_context() {
    let err = MakotoError::ValidationError("expected 329 stores".into());
    assert_eq!(err.to_string(), "Validation error: expected 329 stores");
    assert_eq!(MakotoError::Interrupted.to_string(), "Interrupted");

    let io: MakotoError = std::io::Error::other("disk full").into();
    assert!(io.to_string().starts_with("I/O error"));
}

#[test]
fn header_reports_apply_mode() {
    let config = MaintenanceConfig::with_mode(Mode::Apply);
    let lines = output::run_header_lines(&config);
    assert_eq!(lines[3], "== mode: apply (changes are written)");
}
