use chrono::Utc;
use diesel::prelude::*;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    backend::{DbPool, StoreError},
    schema::documents,
};

pub type Fields = Map<String, Value>;

/// A document read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// A schemaless store of JSON documents grouped into named collections.
///
/// Implementations do not enforce uniqueness of any field: callers that need
/// a "unique" pair have to query before creating, and two callers doing so
/// at the same time can both succeed.
pub trait DocumentStore: Send + Sync {
    /// Stores `fields` as a new document and returns its identifier.
    fn create(&self, collection: &str, fields: Fields)
    -> Result<String, StoreError>;

    /// Every document in the collection, oldest first.
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Documents whose fields equal every `(name, value)` pair in `filters`.
    fn query_eq(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Document>, StoreError>;

    /// Deletes a document. Deleting an identifier that does not exist is not
    /// an error.
    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

pub struct SqliteDocumentStore {
    pool: DbPool,
}

impl SqliteDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl DocumentStore for SqliteDocumentStore {
    #[tracing::instrument(skip(self, fields))]
    fn create(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<String, StoreError> {
        let mut conn = self.pool.get()?;
        let id = Uuid::now_v7().to_string();

        diesel::insert_into(documents::table)
            .values((
                documents::id.eq(&id),
                documents::collection.eq(collection),
                documents::fields.eq(serde_json::to_string(&fields)?),
                documents::created_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        tracing::debug!("created document {id}");
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut conn = self.pool.get()?;

        documents::table
            .filter(documents::collection.eq(collection))
            .order_by((documents::created_at.asc(), documents::id.asc()))
            .select((documents::id, documents::fields))
            .load::<(String, String)>(&mut conn)?
            .into_iter()
            .map(|(id, fields)| -> Result<Document, StoreError> {
                Ok(Document {
                    id,
                    fields: serde_json::from_str(&fields)?,
                })
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    fn query_eq(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self.list(collection)?;

        Ok(docs
            .into_iter()
            .filter(|doc| {
                filters
                    .iter()
                    .all(|(name, value)| doc.fields.get(*name) == Some(value))
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;

        let n = diesel::delete(
            documents::table.filter(
                documents::collection
                    .eq(collection)
                    .and(documents::id.eq(id)),
            ),
        )
        .execute(&mut conn)?;

        tracing::debug!("deleted {n} document(s)");
        Ok(())
    }
}
