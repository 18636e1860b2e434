//! Run configuration for the maintenance jobs.
//!
//! Each value resolves flag → environment variable → literal default, once, at
//! startup. The resulting [`MaintenanceConfig`] is passed by reference into every
//! job; nothing else reads the environment.

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "makoto-club";
pub const DEFAULT_STORE_COLLECTION: &str = "stores";
pub const DEFAULT_SURVEY_COLLECTION: &str = "surveys";

/// Whether a maintenance run persists its changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compute and count changes, write nothing.
    DryRun,
    /// Compute, count and write.
    Apply,
}

impl Mode {
    pub fn from_apply_flag(apply: bool) -> Self {
        if apply { Mode::Apply } else { Mode::DryRun }
    }

    pub fn is_apply(self) -> bool {
        self == Mode::Apply
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct MaintenanceCli {
    /// Apply the updates. Without this flag the run is a dry-run.
    #[clap(long)]
    pub apply: bool,
    /// Survey collection name.
    #[clap(long, env = "SURVEY_COLLECTION", default_value = DEFAULT_SURVEY_COLLECTION)]
    pub survey_collection: String,
    /// Store collection name.
    #[clap(long, env = "STORE_COLLECTION", default_value = DEFAULT_STORE_COLLECTION)]
    pub store_collection: String,
    /// MongoDB database name.
    #[clap(long, env = "MONGO_DB", default_value = DEFAULT_DATABASE)]
    pub database: String,
    /// MongoDB connection URI.
    #[clap(long, env = "MONGO_URI", default_value = DEFAULT_URI)]
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceConfig {
    pub uri: String,
    pub database: String,
    pub store_collection: String,
    pub survey_collection: String,
    pub mode: Mode,
}

impl MaintenanceConfig {
    /// Defaults for everything, in the given mode. Mostly useful for tests and
    /// library callers that never touch the environment.
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            store_collection: DEFAULT_STORE_COLLECTION.to_string(),
            survey_collection: DEFAULT_SURVEY_COLLECTION.to_string(),
            mode,
        }
    }
}

impl From<MaintenanceCli> for MaintenanceConfig {
    fn from(cli: MaintenanceCli) -> Self {
        Self {
            uri: cli.uri,
            database: cli.database,
            store_collection: cli.store_collection,
            survey_collection: cli.survey_collection,
            mode: Mode::from_apply_flag(cli.apply),
        }
    }
}
