//! Document-store seam for the maintenance jobs.
//!
//! The jobs only need two primitives: a projected scan over a whole collection
//! and a `$set` on one document by `_id`. [`MongoStore`] backs them with the
//! MongoDB sync driver; [`MemoryStore`] keeps collections in process so the
//! jobs can run without a server.

use crate::core::config::MaintenanceConfig;
use crate::core::db;
use crate::core::error::MakotoError;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::FindOptions;
use mongodb::sync::Database;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub type Visitor<'a> = dyn FnMut(Document) -> Result<(), MakotoError> + 'a;

pub trait DocumentStore {
    /// Visit every document of `collection`, restricted to `_id` plus `fields`.
    /// Visiting stops at the first error, which is returned.
    fn scan(
        &self,
        collection: &str,
        fields: &[&str],
        visit: &mut Visitor<'_>,
    ) -> Result<(), MakotoError>;

    /// `$set` each entry of `fields` (dotted paths allowed) on the document whose
    /// `_id` equals `id`.
    fn set_fields(&self, collection: &str, id: &Bson, fields: Document) -> Result<(), MakotoError>;
}

fn projection(fields: &[&str]) -> Document {
    let mut projection = Document::new();
    for field in fields {
        projection.insert(*field, 1);
    }
    projection
}

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn connect(config: &MaintenanceConfig) -> Result<Self, MakotoError> {
        Ok(Self {
            db: db::db_connect(config)?,
        })
    }
}

impl DocumentStore for MongoStore {
    fn scan(
        &self,
        collection: &str,
        fields: &[&str],
        visit: &mut Visitor<'_>,
    ) -> Result<(), MakotoError> {
        let options = FindOptions::builder()
            .projection(projection(fields))
            .build();
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(None, options)?;
        for doc in cursor {
            visit(doc?)?;
        }
        Ok(())
    }

    fn set_fields(&self, collection: &str, id: &Bson, fields: Document) -> Result<(), MakotoError> {
        self.db.collection::<Document>(collection).update_one(
            doc! { "_id": id.clone() },
            doc! { "$set": fields },
            None,
        )?;
        Ok(())
    }
}

/// In-process collections with MongoDB-like projection and `$set` semantics.
#[derive(Default)]
pub struct MemoryStore {
    collections: RefCell<BTreeMap<String, Vec<Document>>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, doc: Document) {
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    pub fn insert_many(&self, collection: &str, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            self.insert(collection, doc);
        }
    }

    /// Full documents currently held in `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn find_by_id(&self, collection: &str, id: &Bson) -> Option<Document> {
        self.collections
            .borrow()
            .get(collection)?
            .iter()
            .find(|doc| doc.get("_id") == Some(id))
            .cloned()
    }

    /// Number of `set_fields` calls that matched a document.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

fn project(doc: &Document, fields: &[&str]) -> Document {
    let mut out = Document::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id", id.clone());
    }
    for field in fields {
        if let Some(value) = doc.get(*field) {
            out.insert(*field, value.clone());
        }
    }
    out
}

fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = doc.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    fn scan(
        &self,
        collection: &str,
        fields: &[&str],
        visit: &mut Visitor<'_>,
    ) -> Result<(), MakotoError> {
        // Snapshot first so the visitor may write back into the same collection.
        let snapshot: Vec<Document> = self
            .documents(collection)
            .iter()
            .map(|doc| project(doc, fields))
            .collect();
        for doc in snapshot {
            visit(doc)?;
        }
        Ok(())
    }

    fn set_fields(&self, collection: &str, id: &Bson, fields: Document) -> Result<(), MakotoError> {
        let mut collections = self.collections.borrow_mut();
        let Some(target) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.get("_id") == Some(id)))
        else {
            return Ok(());
        };
        for (path, value) in fields {
            set_path(target, &path, value);
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
