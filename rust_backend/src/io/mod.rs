//! File loading utilities.
//!
//! Loaders wrap parsing with file handling and error context. They return
//! `anyhow` errors, which suit binaries and scripts better than the typed
//! pipeline errors.
//!
//! # Example
//!
//! ```no_run
//! use astroplan_rust::io::loaders::{CatalogLoader, ChartLoader};
//! use std::path::Path;
//!
//! let chart = ChartLoader::load_from_file(Path::new("chart.json"))
//!     .expect("Failed to load chart");
//! let catalog = CatalogLoader::load_from_file(Path::new("exercise_catalog.json"))
//!     .expect("Failed to load catalog");
//! println!("Loaded {} planets and {} exercises", chart.num_planets, catalog.len());
//! ```

pub mod loaders;


pub use loaders::{CatalogLoader, ChartLoadResult, ChartLoader, InputSourceType};
