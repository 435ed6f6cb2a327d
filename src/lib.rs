//! Skyline queries
//!
//! Computes the set of points that are not dominated by any other point, using balanced pivots
//! and region bitmaps to avoid most dominance tests.
//!
//! ```
//! use skyline::skyline::{Algorithm, Skyline, SkylineOptions};
//!
//! let points = vec![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5], [1.0, 1.0]];
//! let mut options = SkylineOptions::default();
//! options.set_algorithm(Algorithm::Tree);
//!
//! let mut result = Skyline::new(&points, options).unwrap().execute();
//! result.sort();
//! assert_eq!(result, vec![0, 1, 2]);
//! ```
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod domain;
pub mod dominance;
pub mod helpers;
pub mod partition;
pub mod pivot;
pub mod skyline;
pub mod sweep;
pub mod threads;
pub mod traits;
pub mod tree;
pub mod types;

pub use skyline::{skyline, Algorithm, Skyline, SkylineOptions};
pub use types::{Error, Result, Statistics};
