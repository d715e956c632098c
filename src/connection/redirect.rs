use super::origin;
use super::pool::EndpointPool;
use super::response::ApiResponse;
use crate::core::{ClientError, Result};
use std::str::FromStr;

/// Status a follower node answers with when the leader lives elsewhere.
pub const LEADER_REDIRECT_STATUS: u16 = 307;

/// Which redirect targets the follower is allowed to adopt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectPolicy {
    /// Follow any origin, admitting unknown ones as an ad hoc base.
    #[default]
    FollowAny,
    /// Follow only origins that are part of the configured pool.
    ConfiguredOnly,
}

impl FromStr for RedirectPolicy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "follow_any" => Ok(Self::FollowAny),
            "configured" | "configured_only" => Ok(Self::ConfiguredOnly),
            other => Err(ClientError::Configuration(format!(
                "unknown redirect policy '{}', expected 'any' or 'configured'",
                other
            ))),
        }
    }
}

/// Where a leader redirect points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// A configured pool member.
    Known { index: usize, origin: String },
    /// An origin outside the configured pool.
    AdHoc { origin: String },
}

impl RedirectTarget {
    /// Resolve the `Location` of a 307 response against the pool
    pub fn from_response(response: &ApiResponse, pool: &EndpointPool) -> Result<Self> {
        let location = response.header("location").ok_or_else(|| {
            ClientError::RedirectUnresolvable("307 response without Location header".into())
        })?;
        Self::resolve(location, pool)
    }

    /// Resolve an absolute URL against the pool
    ///
    /// Only the origin matters; the path of the URL is discarded.
    pub fn resolve(location: &str, pool: &EndpointPool) -> Result<Self> {
        let origin = origin::of_url(location).map_err(|_| {
            ClientError::RedirectUnresolvable(format!("malformed Location '{}'", location))
        })?;

        Ok(match pool.index_of(&origin) {
            Some(index) => Self::Known { index, origin },
            None => Self::AdHoc { origin },
        })
    }

    pub fn origin(&self) -> &str {
        match self {
            Self::Known { origin, .. } | Self::AdHoc { origin } => origin,
        }
    }

    /// Point the pool at this target
    ///
    /// Returns false when the policy refuses the target and the pool is left
    /// untouched.
    pub fn apply(&self, pool: &EndpointPool, policy: RedirectPolicy) -> bool {
        match (self, policy) {
            (Self::Known { index, .. }, _) => {
                pool.set_active(*index);
                true
            }
            (Self::AdHoc { origin }, RedirectPolicy::FollowAny) => {
                pool.set_ad_hoc(origin);
                true
            }
            (Self::AdHoc { .. }, RedirectPolicy::ConfiguredOnly) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> EndpointPool {
        EndpointPool::new(["http://a", "http://b:9002"], "/api").unwrap()
    }

    fn redirect(location: Option<&str>) -> ApiResponse {
        let headers = location
            .map(|l| vec![("Location".to_string(), l.to_string())])
            .unwrap_or_default();
        ApiResponse::new(307, headers, Vec::new())
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("any".parse::<RedirectPolicy>().unwrap(), RedirectPolicy::FollowAny);
        assert_eq!(
            " Configured ".parse::<RedirectPolicy>().unwrap(),
            RedirectPolicy::ConfiguredOnly
        );
        assert!("never".parse::<RedirectPolicy>().is_err());
    }

    #[test]
    fn test_resolve_known_origin_ignores_path() {
        let target = RedirectTarget::resolve("http://b:9002/api/orders?x=1", &pool()).unwrap();
        assert_eq!(
            target,
            RedirectTarget::Known {
                index: 1,
                origin: "http://b:9002".into()
            }
        );
    }

    #[test]
    fn test_resolve_unknown_origin_is_ad_hoc() {
        let target = RedirectTarget::resolve("http://c/api/orders", &pool()).unwrap();
        assert_eq!(target, RedirectTarget::AdHoc { origin: "http://c".into() });
    }

    #[test]
    fn test_missing_or_malformed_location() {
        let err = RedirectTarget::from_response(&redirect(None), &pool()).unwrap_err();
        assert!(matches!(err, ClientError::RedirectUnresolvable(_)));

        let err = RedirectTarget::from_response(&redirect(Some("/api/orders")), &pool()).unwrap_err();
        assert!(matches!(err, ClientError::RedirectUnresolvable(_)));
    }

    #[test]
    fn test_apply_respects_policy() {
        let pool = pool();
        let ad_hoc = RedirectTarget::AdHoc { origin: "http://c".into() };

        assert!(!ad_hoc.apply(&pool, RedirectPolicy::ConfiguredOnly));
        assert_eq!(pool.current_base(), "http://a/api");

        assert!(ad_hoc.apply(&pool, RedirectPolicy::FollowAny));
        assert_eq!(pool.current_base(), "http://c/api");
        assert_eq!(pool.active_index(), 0);

        let known = RedirectTarget::Known { index: 1, origin: "http://b:9002".into() };
        assert!(known.apply(&pool, RedirectPolicy::ConfiguredOnly));
        assert_eq!(pool.active_index(), 1);
        assert_eq!(pool.current_base(), "http://b:9002/api");
    }
}
