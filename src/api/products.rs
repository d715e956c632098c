use super::segment;
use crate::{ApiResponse, Client, Result};
use serde_json::Value;
use std::fmt::Display;

/// `/products`
pub struct ProductsApi<'a> {
    client: &'a Client,
}

impl<'a> ProductsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<ApiResponse> {
        self.client.get("/products").await
    }

    pub async fn get(&self, id: impl Display) -> Result<ApiResponse> {
        self.client.get(&format!("/products/{}", segment(id))).await
    }

    pub async fn create(&self, product: Value) -> Result<ApiResponse> {
        self.client.post("/products", product).await
    }

    pub async fn update(&self, id: impl Display, product: Value) -> Result<ApiResponse> {
        self.client
            .put(&format!("/products/{}", segment(id)), product)
            .await
    }

    pub async fn delete(&self, id: impl Display) -> Result<ApiResponse> {
        self.client.delete(&format!("/products/{}", segment(id))).await
    }

    pub async fn by_merchant(&self, merchant_id: impl Display) -> Result<ApiResponse> {
        self.client
            .get(&format!("/products/merchant/{}", segment(merchant_id)))
            .await
    }
}
