pub mod auth;
pub mod config;
pub mod failover;
pub mod origin;
pub mod pool;
pub mod redirect;
pub mod request;
pub mod response;
pub mod transport;

pub use auth::{NoToken, SharedTokenStore, StaticToken, TokenStore};
pub use config::{ClientConfig, RecoveryBudget};
pub use failover::{EndpointHealth, FailoverDispatcher};
pub use pool::{EndpointPool, PoolSnapshot};
pub use redirect::{RedirectPolicy, RedirectTarget};
pub use request::{OutboundRequest, RequestBody};
pub use response::ApiResponse;
pub use transport::{HttpTransport, PreparedRequest, Transport};
