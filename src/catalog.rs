use anyhow::Result;
use std::sync::Arc;

use crate::category::{Category, PriceShape};
use crate::image::{ImageInput, ImageResolver};
use crate::models::{CatalogEntry, NewEntry, Price, SizedPrice};
use crate::store::ItemStore;

/// Fields of a create request, independent of how they were transported.
///
/// Every field is optional; missing values become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePayload {
    pub nome: Option<String>,
    pub ingredientes: Option<String>,
    pub preco: Option<String>,
    pub preco_pequeno: Option<String>,
    pub preco_medio: Option<String>,
    pub preco_grande: Option<String>,
    pub imagem: ImageInput,
}

impl CreatePayload {
    fn price_for(&self, shape: PriceShape) -> Price {
        match shape {
            PriceShape::Sized => Price::Sized(SizedPrice {
                pequeno: self.preco_pequeno.clone().unwrap_or_default(),
                medio: self.preco_medio.clone().unwrap_or_default(),
                grande: self.preco_grande.clone().unwrap_or_default(),
            }),
            PriceShape::Single => Price::Single(self.preco.clone().unwrap_or_default()),
        }
    }
}

/// Outcome of a successful create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEntry {
    pub id: String,
    pub message: &'static str,
}

/// Create and list operations shared by every category
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ItemStore>,
    images: ImageResolver,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ItemStore>, images: ImageResolver) -> Self {
        Self { store, images }
    }

    pub fn store(&self) -> &dyn ItemStore {
        self.store.as_ref()
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    /// Build an entry from the payload and persist it
    ///
    /// The price is shaped by the category; the image is resolved before
    /// the insert, so a failed write never reaches the store, and an upload
    /// is removed again when the insert fails.
    ///
    /// # Errors
    /// Returns an error if the image cannot be stored or the insert fails
    pub async fn create(&self, category: Category, payload: CreatePayload) -> Result<CreatedEntry> {
        let preco = payload.price_for(category.price_shape());
        let uploaded = matches!(payload.imagem, ImageInput::Upload { .. });
        let imagem = self.images.resolve(payload.imagem).await?;

        let entry = NewEntry {
            nome: payload.nome.unwrap_or_default(),
            ingredientes: payload.ingredientes,
            preco,
            imagem: imagem.clone(),
        };

        let id = match self.store.insert(category, entry).await {
            Ok(id) => id,
            Err(e) => {
                // No entry references the file, so it must not outlive the failed insert
                if uploaded {
                    self.images.discard(&imagem).await;
                }
                return Err(e);
            }
        };

        Ok(CreatedEntry {
            id,
            message: category.created_message(),
        })
    }

    /// # Errors
    /// Returns an error if the store query fails
    pub async fn list_all(&self, category: Category) -> Result<Vec<CatalogEntry>> {
        self.store.list_all(category).await
    }
}
