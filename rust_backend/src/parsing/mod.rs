//! Parsers and token normalization for natal chart input.
//!
//! # Parsers
//!
//! - [`json_parser`]: Parse loosely-typed chart JSON into a [`json_parser::RawChart`]
//! - [`normalizer`]: Map localized planet, sign and aspect names to canonical keys
//!
//! # Example
//!
//! ```no_run
//! use astroplan_rust::parsing::json_parser::parse_chart_json;
//! use astroplan_rust::parsing::normalizer::normalize_chart;
//! use std::path::Path;
//!
//! let raw = parse_chart_json(Path::new("chart.json")).expect("Failed to parse chart");
//! let normalized = normalize_chart(raw);
//! ```

pub mod json_parser;
pub mod normalizer;

#[cfg(test)]
mod json_parser_tests;

pub use json_parser::{RawAspect, RawChart, RawPlanet};
