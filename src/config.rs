use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::error::{Error, Result};

/// Serve an animal image classifier over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "animal_classifier")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Maximum request body size in megabytes.
    #[arg(long, env = "BODY_LIMIT_MB", default_value_t = 5)]
    pub body_limit_mb: usize,

    /// Frozen TensorFlow graph to load.
    #[arg(long, env = "MODEL_PATH", default_value = "./model/frozen_graph.pb")]
    pub model_path: PathBuf,

    /// Where to download the model from when `model_path` does not exist.
    #[arg(long, env = "MODEL_URL")]
    pub model_url: Option<String>,

    /// Class list with one label per line. The built-in labels are used when unset.
    #[arg(long, env = "CLASS_LIST_PATH")]
    pub class_list_path: Option<PathBuf>,

    #[arg(long, env = "CLASS_LIST_URL")]
    pub class_list_url: Option<String>,

    /// Graph operation fed with the image tensor.
    #[arg(long, env = "MODEL_INPUT_OP", default_value = "x")]
    pub input_op: String,

    /// Graph operation holding class probabilities.
    #[arg(long, env = "MODEL_OUTPUT_OP", default_value = "Identity")]
    pub output_op: String,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("bad bind address {}: {e}", self.host)))
    }
}
