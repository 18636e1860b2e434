use crate::core::config::Mode;
use crate::core::docstore::{DocumentStore, Visitor};
use crate::core::error;
use mongodb::bson::{Bson, Document};
use std::cell::Cell;
use tracing::debug;

/// The write broker is the single path from a maintenance job to the store.
///
/// Reads pass straight through. Writes are applied only in [`Mode::Apply`]; in
/// [`Mode::DryRun`] they are logged and dropped, so a dry-run shares every code
/// path with the real run up to the final `$set`.
pub struct WriteBroker<'a> {
    store: &'a dyn DocumentStore,
    mode: Mode,
    applied: Cell<usize>,
}

impl<'a> WriteBroker<'a> {
    pub fn new(store: &'a dyn DocumentStore, mode: Mode) -> Self {
        Self {
            store,
            mode,
            applied: Cell::new(0),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scan(
        &self,
        collection: &str,
        fields: &[&str],
        visit: &mut Visitor<'_>,
    ) -> Result<(), error::MakotoError> {
        self.store.scan(collection, fields, visit)
    }

    /// `$set` `fields` on one document, or only log it in dry-run.
    pub fn set_fields(
        &self,
        op: &str,
        collection: &str,
        id: &Bson,
        fields: Document,
    ) -> Result<(), error::MakotoError> {
        if !self.mode.is_apply() {
            debug!(target: "audit", op, collection, id = %id, update = %fields, "would update");
            return Ok(());
        }

        let update = fields.to_string();
        let result = self.store.set_fields(collection, id, fields);
        let status = if result.is_ok() { "success" } else { "error" };
        debug!(target: "audit", op, collection, id = %id, update = %update, status, "update");
        result?;

        self.applied.set(self.applied.get() + 1);
        Ok(())
    }

    /// Writes actually sent to the store; always 0 in dry-run.
    pub fn applied(&self) -> usize {
        self.applied.get()
    }
}
