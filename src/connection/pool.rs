use super::origin;
use crate::core::{ClientError, Result};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Endpoint pool
///
/// A fixed, ordered list of backend origins and a cursor naming the one
/// presumed to be the leader. The cursor is the only mutable state; it is
/// moved by the failure rotator (`set_active`) and by the redirect follower
/// (`set_active` or `set_ad_hoc`).
///
/// An ad hoc base overrides where requests go without moving the durable
/// index, so a later rotation continues from the last configured member.
#[derive(Debug)]
pub struct EndpointPool {
    /// Normalized origins, never empty
    addresses: Vec<String>,
    /// Path prefix such as `/api`
    prefix: String,
    cursor: RwLock<Cursor>,
}

#[derive(Debug, Clone)]
struct Cursor {
    active_index: usize,
    base: String,
    ad_hoc: Option<String>,
}

/// Point-in-time view of the pool cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub active_index: usize,
    pub current_base: String,
    pub ad_hoc: Option<String>,
}

impl EndpointPool {
    /// Create a pool, failing fast on an empty or malformed origin list
    pub fn new<I, S>(addresses: I, prefix: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let addresses = addresses
            .into_iter()
            .map(|a| origin::normalize(a.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if addresses.is_empty() {
            return Err(ClientError::Configuration(
                "endpoint pool needs at least one origin".into(),
            ));
        }

        let prefix = prefix.to_string();
        let base = format!("{}{}", addresses[0], prefix);

        Ok(Self {
            addresses,
            prefix,
            cursor: RwLock::new(Cursor {
                active_index: 0,
                base,
                ad_hoc: None,
            }),
        })
    }

    /// Number of configured origins
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Configured origin at the durable index
    pub fn current(&self) -> String {
        let cursor = self.read();
        self.addresses[cursor.active_index].clone()
    }

    /// Base URL requests are sent to: origin plus prefix
    ///
    /// This is the ad hoc base while one is set.
    pub fn current_base(&self) -> String {
        self.read().base.clone()
    }

    pub fn active_index(&self) -> usize {
        self.read().active_index
    }

    /// Move the durable cursor, normalizing `index` into range
    ///
    /// Clears any ad hoc override.
    pub fn set_active(&self, index: usize) {
        let index = index % self.addresses.len();
        let base = format!("{}{}", self.addresses[index], self.prefix);
        let mut cursor = self.write();
        cursor.active_index = index;
        cursor.base = base;
        cursor.ad_hoc = None;
    }

    /// Route requests to `origin` without moving the durable cursor
    pub fn set_ad_hoc(&self, origin: &str) {
        let origin = origin.trim_end_matches('/').to_string();
        let base = format!("{}{}", origin, self.prefix);
        let mut cursor = self.write();
        cursor.base = base;
        cursor.ad_hoc = Some(origin);
    }

    /// Advance the durable cursor by one
    ///
    /// Returns `(tried, next)`; both are equal for a single-origin pool.
    pub fn rotate(&self) -> (usize, usize) {
        let mut cursor = self.write();
        let tried = cursor.active_index;
        let next = (tried + 1) % self.addresses.len();
        cursor.active_index = next;
        cursor.base = format!("{}{}", self.addresses[next], self.prefix);
        cursor.ad_hoc = None;
        (tried, next)
    }

    /// Index of a configured origin, compared in normalized form
    pub fn index_of(&self, candidate: &str) -> Option<usize> {
        let candidate = origin::normalize(candidate).ok()?;
        self.addresses.iter().position(|a| *a == candidate)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let cursor = self.read();
        PoolSnapshot {
            active_index: cursor.active_index,
            current_base: cursor.base.clone(),
            ad_hoc: cursor.ad_hoc.clone(),
        }
    }

    // The cursor is plain data; a panic while holding the lock cannot leave
    // it half-written, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Cursor> {
        self.cursor.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cursor> {
        self.cursor.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> EndpointPool {
        EndpointPool::new(["http://a", "http://b", "http://c"], "/api").unwrap()
    }

    #[test]
    fn test_pool_creation() {
        let pool = pool();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.active_index(), 0);
        assert_eq!(pool.current(), "http://a");
        assert_eq!(pool.current_base(), "http://a/api");
    }

    #[test]
    fn test_empty_pool_fails_fast() {
        let result = EndpointPool::new(Vec::<String>::new(), "/api");
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_malformed_origin_fails_fast() {
        assert!(EndpointPool::new(["http://a", "b:9002"], "/api").is_err());
    }

    #[test]
    fn test_set_active_wraps() {
        let pool = pool();
        pool.set_active(4);
        assert_eq!(pool.active_index(), 1);
        assert_eq!(pool.current_base(), "http://b/api");

        pool.set_active(3);
        assert_eq!(pool.active_index(), 0);
    }

    #[test]
    fn test_ad_hoc_keeps_durable_index() {
        let pool = pool();
        pool.set_active(1);
        pool.set_ad_hoc("http://d:9004");

        assert_eq!(pool.active_index(), 1);
        assert_eq!(pool.current(), "http://b");
        assert_eq!(pool.current_base(), "http://d:9004/api");
        assert_eq!(pool.snapshot().ad_hoc.as_deref(), Some("http://d:9004"));

        let (tried, next) = pool.rotate();
        assert_eq!((tried, next), (1, 2));
        assert_eq!(pool.current_base(), "http://c/api");
        assert_eq!(pool.snapshot().ad_hoc, None);
    }

    #[test]
    fn test_rotate_single_origin() {
        let pool = EndpointPool::new(["http://only"], "/api").unwrap();
        assert_eq!(pool.rotate(), (0, 0));
        assert_eq!(pool.current_base(), "http://only/api");
    }

    #[test]
    fn test_index_of_normalizes() {
        let pool = EndpointPool::new(["http://a:80", "http://B:9002/"], "/api").unwrap();
        assert_eq!(pool.index_of("http://a"), Some(0));
        assert_eq!(pool.index_of("http://b:9002"), Some(1));
        assert_eq!(pool.index_of("http://c"), None);
        assert_eq!(pool.index_of("garbage"), None);
    }

    #[test]
    fn test_duplicates_resolve_to_first() {
        let pool = EndpointPool::new(["http://a", "http://a"], "").unwrap();
        assert_eq!(pool.index_of("http://a"), Some(0));
        assert_eq!(pool.current_base(), "http://a");
    }
}
