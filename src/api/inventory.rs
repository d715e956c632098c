use super::segment;
use crate::{ApiResponse, Client, Result};
use serde_json::{Value, json};
use std::fmt::Display;

/// `/merchants/{merchant}/inventory`
pub struct InventoryApi<'a> {
    client: &'a Client,
}

impl<'a> InventoryApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base(merchant_id: impl Display) -> String {
        format!("/merchants/{}/inventory", segment(merchant_id))
    }

    pub async fn list(&self, merchant_id: impl Display) -> Result<ApiResponse> {
        self.client.get(&Self::base(merchant_id)).await
    }

    pub async fn summary(&self, merchant_id: impl Display) -> Result<ApiResponse> {
        self.client
            .get(&format!("{}/summary", Self::base(merchant_id)))
            .await
    }

    pub async fn create(&self, merchant_id: impl Display, ingredient: Value) -> Result<ApiResponse> {
        self.client.post(&Self::base(merchant_id), ingredient).await
    }

    pub async fn update(
        &self,
        merchant_id: impl Display,
        ingredient_id: impl Display,
        update: Value,
    ) -> Result<ApiResponse> {
        self.client
            .put(
                &format!("{}/{}", Self::base(merchant_id), segment(ingredient_id)),
                update,
            )
            .await
    }

    pub async fn delete(
        &self,
        merchant_id: impl Display,
        ingredient_id: impl Display,
    ) -> Result<ApiResponse> {
        self.client
            .delete(&format!("{}/{}", Self::base(merchant_id), segment(ingredient_id)))
            .await
    }
}

/// `/products/{product}/ingredients`
pub struct ProductIngredientsApi<'a> {
    client: &'a Client,
}

impl<'a> ProductIngredientsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base(product_id: impl Display) -> String {
        format!("/products/{}/ingredients", segment(product_id))
    }

    pub async fn list(&self, product_id: impl Display) -> Result<ApiResponse> {
        self.client.get(&Self::base(product_id)).await
    }

    pub async fn add(&self, product_id: impl Display, ingredient: Value) -> Result<ApiResponse> {
        self.client.post(&Self::base(product_id), ingredient).await
    }

    pub async fn remove(
        &self,
        product_id: impl Display,
        ingredient_id: impl Display,
    ) -> Result<ApiResponse> {
        self.client
            .delete(&format!("{}/{}", Self::base(product_id), segment(ingredient_id)))
            .await
    }

    pub async fn update_quantity(
        &self,
        product_id: impl Display,
        ingredient_id: impl Display,
        quantity: f64,
    ) -> Result<ApiResponse> {
        self.client
            .put(
                &format!("{}/{}", Self::base(product_id), segment(ingredient_id)),
                json!({ "quantity": quantity }),
            )
            .await
    }
}
