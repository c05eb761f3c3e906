use std::path::Path;

use tensorflow::{Graph, ImportGraphDefOptions, Session, SessionOptions, SessionRunArgs, Tensor};

use super::Classifier;
use crate::{
    error::{Error, Result},
    normalize::{ImageTensor, TENSOR_SHAPE},
};

/// Names of the graph operations the classifier feeds and fetches.
#[derive(Debug, Clone)]
pub struct GraphOps {
    pub input: String,
    pub output: String,
}

impl Default for GraphOps {
    fn default() -> Self {
        Self {
            input: "x".to_string(),
            output: "Identity".to_string(),
        }
    }
}

/// Classifier backed by a frozen TensorFlow `GraphDef`.
pub struct TensorflowClassifier {
    session: Session,
    graph: Graph,
    ops: GraphOps,
}

impl TensorflowClassifier {
    pub fn new(model_path: impl AsRef<Path>, ops: GraphOps) -> Result<Self> {
        let model_path = model_path.as_ref();
        let load_err = |reason: String| Error::ModelLoad {
            path: model_path.to_path_buf(),
            reason,
        };

        let model_bytes = std::fs::read(model_path).map_err(|e| load_err(e.to_string()))?;

        let mut graph = Graph::new();
        graph
            .import_graph_def(&model_bytes, &ImportGraphDefOptions::new())
            .map_err(|e| load_err(e.to_string()))?;

        for name in [&ops.input, &ops.output] {
            match graph.operation_by_name(name) {
                Ok(Some(_)) => {}
                Ok(None) => return Err(load_err(format!("operation '{name}' not found in graph"))),
                Err(e) => return Err(load_err(e.to_string())),
            }
        }

        let session =
            Session::new(&SessionOptions::new(), &graph).map_err(|e| load_err(e.to_string()))?;

        tracing::info!(
            path = %model_path.display(),
            input = %ops.input,
            output = %ops.output,
            "loaded frozen graph"
        );

        Ok(Self {
            session,
            graph,
            ops,
        })
    }

    fn input_tensor(input: &ImageTensor) -> Result<Tensor<f32>> {
        if input.shape() != TENSOR_SHAPE {
            return Err(Error::ShapeMismatch {
                expected: format!("{TENSOR_SHAPE:?}"),
                actual: format!("{:?}", input.shape()),
            });
        }

        let contiguous = input.as_standard_layout();
        let values = contiguous.as_slice().ok_or_else(|| Error::ShapeMismatch {
            expected: "contiguous tensor".to_string(),
            actual: "non-contiguous tensor".to_string(),
        })?;

        let dims: Vec<u64> = TENSOR_SHAPE.iter().map(|&d| d as u64).collect();
        let mut tensor = Tensor::new(&dims);
        tensor.copy_from_slice(values);
        Ok(tensor)
    }
}

impl Classifier for TensorflowClassifier {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        let input_tensor = Self::input_tensor(input)?;

        let input_operation = self
            .graph
            .operation_by_name_required(&self.ops.input)
            .map_err(|e| Error::inference(e.to_string()))?;
        let output_operation = self
            .graph
            .operation_by_name_required(&self.ops.output)
            .map_err(|e| Error::inference(e.to_string()))?;

        let mut args = SessionRunArgs::new();
        args.add_feed(&input_operation, 0, &input_tensor);
        let output_token = args.request_fetch(&output_operation, 0);

        self.session
            .run(&mut args)
            .map_err(|e| Error::inference(e.to_string()))?;
        let output_tensor: Tensor<f32> = args
            .fetch(output_token)
            .map_err(|e| Error::inference(e.to_string()))?;

        let scores = output_tensor.to_vec();
        if scores.is_empty() {
            return Err(Error::inference("model returned an empty output tensor"));
        }
        Ok(scores)
    }
}
