//! services/api/src/catalog.rs
//!
//! The static product catalog shown in the sidebar. It ships embedded in the
//! binary and can be replaced by a JSON file named in the configuration.

use lumiere_core::Product;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use utoipa::ToSchema;

const BUNDLED_CATALOG: &str = include_str!("../catalog/products.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {0}: {1}")]
    Read(String, std::io::Error),
    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate product id in catalog: {0}")]
    DuplicateId(String),
}

/// The wire form of a product. Drag payloads carry exactly this JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category: String,
    pub image: String,
    pub description: String,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            id: r.id,
            name: r.name,
            price: r.price,
            category: r.category,
            image: r.image,
            description: r.description,
        }
    }
}

impl From<&Product> for ProductRecord {
    fn from(p: &Product) -> Self {
        ProductRecord {
            id: p.id.clone(),
            name: p.name.clone(),
            price: p.price.clone(),
            category: p.category.clone(),
            image: p.image.clone(),
            description: p.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Loads the catalog from `path`, or the bundled one when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| CatalogError::Read(path.display().to_string(), e))?;
                Self::from_json(&json)?
            }
            None => Self::from_json(BUNDLED_CATALOG)?,
        };
        info!("Loaded {} catalog products.", catalog.products.len());
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<ProductRecord> = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        for r in &records {
            if !seen.insert(r.id.clone()) {
                return Err(CatalogError::DuplicateId(r.id.clone()));
            }
        }
        Ok(Self {
            products: records.into_iter().map(Product::from).collect(),
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
