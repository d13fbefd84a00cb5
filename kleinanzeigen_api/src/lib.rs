//! HTTP transport for the Kleinanzeigen marketplace: search URL building and
//! page retrieval with browser-like headers and bounded timeouts.

mod client;
mod errors;
mod query;
mod user_agent;
pub use self::client::{Client, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::query::SearchQuery;
pub use self::user_agent::DEFAULT_USER_AGENT;
