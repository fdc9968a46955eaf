//! Middleware chain.
//!
//! Applied outermost first: request-id tagging, panic recovery,
//! authentication, upload size guard, CORS. See [`crate::routes::with_gateway_layers`].

mod auth;
mod body_limit;
mod cors;
mod panic;
mod request_id;

pub use auth::require_bearer;
pub use body_limit::guard_upload_size;
pub use cors::build_cors_layer;
pub use panic::handle_panic;
pub use request_id::{RequestContext, tag_request};
