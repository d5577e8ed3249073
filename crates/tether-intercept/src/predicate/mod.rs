//! Request predicates for rule matching.
//!
//! # Module Structure
//!
//! - `pattern` - Regex matcher with `!` inversion
//! - `query` - Query-term matching against the `&`-prefixed query string
//! - `headers` - Header name/value pattern pairs
//! - `request` - Composite request predicate (`RequestMatch`)
//! - `identifier` - Canonical encoding and content-hash identifiers

mod headers;
mod identifier;
mod pattern;
mod query;
mod request;

pub use headers::CompiledHeaderMatcher;
pub use identifier::{canonical_encoding, canonical_identifier};
pub use pattern::PatternMatcher;
pub use query::{reconstructed_query, CompiledQueryMatcher};
pub use request::{CompiledRequestMatch, RequestMatch};
