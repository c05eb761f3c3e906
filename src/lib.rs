//! HTTP service that classifies uploaded animal photos.
//!
//! An upload goes through [`normalize::normalize`] into a `(1, 150, 150, 3)`
//! tensor, is scored by a [`classifier::Classifier`] and mapped to a label by
//! [`labels::LabelMap`]. [`routes::router`] exposes this as `POST /predict`.

pub mod classifier;
pub mod config;
pub mod error;
pub mod fetch;
pub mod labels;
pub mod normalize;
pub mod routes;
pub mod service;

pub use classifier::Classifier;
pub use config::Config;
pub use error::{Error, Result};
pub use labels::LabelMap;
pub use service::{PredictionResult, PredictionService};
