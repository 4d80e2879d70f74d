//! Project discovery, accessor resolution and breadth-first closure.
//!
//! A [`traversal::Resolver`] owns the extractor registry and the lazily built
//! [`accessor::AccessorMapping`] for one invocation; rules and seeds are passed
//! to each call.

pub mod accessor;
pub mod discovery;
pub mod repair;
pub mod traversal;
