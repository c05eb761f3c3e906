//! The classifier seam: anything that maps an `ImageTensor` to per-class scores.

#[cfg(feature = "tensorflow")]
mod frozen_graph;

#[cfg(feature = "tensorflow")]
pub use self::frozen_graph::{GraphOps, TensorflowClassifier};

use crate::{error::Result, normalize::ImageTensor};

/// Produces one score per known class for a single image tensor.
///
/// Implementations are loaded once at startup and shared read-only between
/// requests, so `classify` takes `&self`.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>>;
}

impl<F> Classifier for F
where
    F: Fn(&ImageTensor) -> Result<Vec<f32>> + Send + Sync,
{
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        self(input)
    }
}
