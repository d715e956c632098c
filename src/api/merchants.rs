use super::segment;
use crate::{ApiResponse, Client, Result};
use std::fmt::Display;

/// `/merchants`
pub struct MerchantsApi<'a> {
    client: &'a Client,
}

impl<'a> MerchantsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<ApiResponse> {
        self.client.get("/merchants").await
    }

    pub async fn get(&self, id: impl Display) -> Result<ApiResponse> {
        self.client.get(&format!("/merchants/{}", segment(id))).await
    }

    pub async fn by_username(&self, username: &str) -> Result<ApiResponse> {
        self.client
            .get(&format!("/merchants/username/{}", segment(username)))
            .await
    }
}
