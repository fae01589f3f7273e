//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! The [`RequireActor`] extractor resolves the acting user per handler.

pub mod actor;
pub mod request_id;

pub use actor::{ACTOR_HEADER, RequireActor};
pub use request_id::request_id_middleware;
