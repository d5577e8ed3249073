//! Request and response rewriting.
//!
//! URL, request header and request body transforms run before the request
//! is dispatched; response body, header and status transforms run after any
//! stub substitution.

mod plan;
mod replacement;

pub use plan::{RewritePlan, NO_STATUS_OVERRIDE};
pub use replacement::{apply_chain, RewriteReplacement, INVALID_REGEX_SENTINEL};
