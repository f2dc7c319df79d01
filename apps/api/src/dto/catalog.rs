use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Incoming payload for product creation and replacement.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price_cents: i64,
}

/// API representation of a product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: u64,
    pub name: String,
    pub price_cents: i64,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price_cents: value.price_cents,
        }
    }
}

/// Incoming login credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login result returned to the caller.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub login: String,
}
