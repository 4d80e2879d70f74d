//! Static dependency extraction from build scripts.
//!
//! Strategies implement [`strategy::DependencyExtractor`] and are ranked in an
//! [`strategy::ExtractorRegistry`]. The fast [`pattern::PatternExtractor`]
//! handles every scripting dialect; [`treesitter::KotlinSyntaxExtractor`] parses
//! Kotlin scripts fully and wins wherever it is registered.

pub mod pattern;
pub mod strategy;
pub mod treesitter;
