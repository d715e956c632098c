//! Convenience wrappers per REST resource
//!
//! Each wrapper only builds the path and forwards to [`Client::send`], so
//! every call gets the same failover and redirect handling. Payloads are
//! opaque JSON values.

mod auth;
mod inventory;
mod merchants;
mod orders;
mod products;
mod users;

pub use auth::AuthApi;
pub use inventory::{InventoryApi, ProductIngredientsApi};
pub use merchants::MerchantsApi;
pub use orders::OrdersApi;
pub use products::ProductsApi;
pub use users::{CartApi, UsersApi};

use crate::Client;
use std::fmt::Display;

impl Client {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi::new(self)
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn cart(&self) -> CartApi<'_> {
        CartApi::new(self)
    }

    pub fn merchants(&self) -> MerchantsApi<'_> {
        MerchantsApi::new(self)
    }

    pub fn inventory(&self) -> InventoryApi<'_> {
        InventoryApi::new(self)
    }

    pub fn product_ingredients(&self) -> ProductIngredientsApi<'_> {
        ProductIngredientsApi::new(self)
    }
}

/// Percent-encode one path segment or query value
pub(crate) fn segment(value: impl Display) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_passes_unreserved() {
        assert_eq!(segment(42), "42");
        assert_eq!(segment("bar-tender_1.x~"), "bar-tender_1.x~");
    }

    #[test]
    fn test_segment_escapes_reserved() {
        assert_eq!(segment("a/b"), "a%2Fb");
        assert_eq!(segment("joe's bar"), "joe%27s%20bar");
        assert_eq!(segment("café"), "caf%C3%A9");
    }
}
