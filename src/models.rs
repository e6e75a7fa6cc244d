use serde::{Deserialize, Serialize};

/// Per-size prices of a pizza; sizes without a price are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SizedPrice {
    #[serde(default)]
    pub pequeno: String,
    #[serde(default)]
    pub medio: String,
    #[serde(default)]
    pub grande: String,
}

/// Price of a catalog entry, shaped by its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum Price {
    Sized(SizedPrice),
    Single(String),
}

/// An entry ready to be inserted; the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredientes: Option<String>,
    pub preco: Price,
    #[serde(default)]
    pub imagem: String,
}

/// A stored menu item as returned by list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CatalogEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredientes: Option<String>,
    pub preco: Price,
    /// Upload path, inline base64 payload, or empty
    pub imagem: String,
}

#[cfg(test)]
impl CatalogEntry {
    pub fn from_new(id: String, entry: NewEntry) -> Self {
        CatalogEntry {
            id,
            nome: entry.nome,
            ingredientes: entry.ingredientes,
            preco: entry.preco,
            imagem: entry.imagem,
        }
    }
}

/// Response type for successful create operations
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_wire_shape() {
        let entry = CatalogEntry {
            id: "65f0c0ffee".to_string(),
            nome: "Margherita".to_string(),
            ingredientes: None,
            preco: Price::Sized(SizedPrice {
                pequeno: "30.00".to_string(),
                ..SizedPrice::default()
            }),
            imagem: String::new(),
        };

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "_id": "65f0c0ffee",
                "nome": "Margherita",
                "preco": { "pequeno": "30.00", "medio": "", "grande": "" },
                "imagem": ""
            })
        );
    }

    #[test]
    fn test_price_shapes_deserialize() {
        let single: Price = serde_json::from_value(json!("8.00")).unwrap();
        assert_eq!(single, Price::Single("8.00".to_string()));

        let sized: Price = serde_json::from_value(json!({ "grande": "55.00" })).unwrap();
        assert_eq!(
            sized,
            Price::Sized(SizedPrice {
                grande: "55.00".to_string(),
                ..SizedPrice::default()
            })
        );
    }
}
