use crate::core::config::MaintenanceConfig;
use crate::core::error;
use mongodb::sync::{Client, Database};

/// Open a handle on the configured database.
///
/// The driver connects lazily, so an unreachable server surfaces on the first
/// query rather than here.
pub fn db_connect(config: &MaintenanceConfig) -> Result<Database, error::MakotoError> {
    let client = Client::with_uri_str(&config.uri)?;
    Ok(client.database(&config.database))
}
