use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};

use crate::category::{Category, PriceShape};
use crate::models::{CatalogEntry, NewEntry, Price, SizedPrice};

const DEFAULT_DATABASE: &str = "pizzaria";

/// Persistent storage of catalog entries, one collection per category
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a new entry and return its store-assigned id
    async fn insert(&self, category: Category, entry: NewEntry) -> Result<String>;

    /// Return every entry of the category in store-native order
    async fn list_all(&self, category: Category) -> Result<Vec<CatalogEntry>>;

    /// Verify the backing database is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Document layout inside a category collection.
///
/// Reads tolerate documents written by older revisions of the service,
/// which may lack `preco` or `imagem` and carry extra fields such as `__v`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(default)]
    nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ingredientes: Option<String>,
    #[serde(default)]
    preco: Option<Price>,
    #[serde(default)]
    imagem: Option<String>,
}

impl StoredEntry {
    fn new(id: ObjectId, entry: NewEntry) -> Self {
        StoredEntry {
            id: Some(id),
            nome: Some(entry.nome),
            ingredientes: entry.ingredientes,
            preco: Some(entry.preco),
            imagem: Some(entry.imagem),
        }
    }

    fn into_entry(self, category: Category) -> CatalogEntry {
        let preco = self.preco.unwrap_or_else(|| match category.price_shape() {
            PriceShape::Sized => Price::Sized(SizedPrice::default()),
            PriceShape::Single => Price::Single(String::new()),
        });

        CatalogEntry {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            nome: self.nome.unwrap_or_default(),
            ingredientes: self.ingredientes,
            preco,
            imagem: self.imagem.unwrap_or_default(),
        }
    }
}

/// MongoDB-backed item store, cheap to clone across handlers
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Create a MongoDB client from a connection string
    ///
    /// The database is `database` when given, otherwise the default database
    /// named in the connection string, otherwise `pizzaria`. The driver
    /// connects lazily, so a malformed connection string fails here while an
    /// unreachable server only fails on first use.
    pub async fn connect(uri: &str, database: Option<&str>) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to create MongoDB client")?;

        let db = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        };

        tracing::info!("MongoDB client ready for database: {}", db.name());

        Ok(Self { client, db })
    }

    fn collection(&self, category: Category) -> Collection<StoredEntry> {
        self.db.collection(category.collection())
    }
}

#[async_trait]
impl ItemStore for MongoStore {
    /// Insert a document into the category's collection
    ///
    /// The ObjectId is generated client-side so the id is known without
    /// inspecting the driver's insert result.
    ///
    /// # Errors
    /// Returns an error if the MongoDB insert fails
    async fn insert(&self, category: Category, entry: NewEntry) -> Result<String> {
        let id = ObjectId::new();
        let stored = StoredEntry::new(id, entry);

        self.collection(category)
            .insert_one(&stored, None)
            .await
            .with_context(|| format!("Failed to insert into collection '{}'", category.collection()))?;

        tracing::debug!("Inserted {} entry with id: {}", category, id);
        Ok(id.to_hex())
    }

    /// # Errors
    /// Returns an error if the query fails or a document cannot be decoded
    async fn list_all(&self, category: Category) -> Result<Vec<CatalogEntry>> {
        let cursor = self
            .collection(category)
            .find(None, None)
            .await
            .with_context(|| format!("Failed to query collection '{}'", category.collection()))?;

        let stored: Vec<StoredEntry> = cursor
            .try_collect()
            .await
            .with_context(|| format!("Failed to read documents from '{}'", category.collection()))?;

        tracing::debug!("Listed {} {} entries", stored.len(), category);
        Ok(stored
            .into_iter()
            .map(|entry| entry.into_entry(category))
            .collect())
    }

    async fn health_check(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}
