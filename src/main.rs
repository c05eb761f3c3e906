use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use animal_classifier::{
    classifier::{GraphOps, TensorflowClassifier},
    fetch::ensure_file,
    routes, Config, LabelMap, PredictionService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    let log_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("animal_classifier={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(config).await {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;

    tracing::info!("checking model...");
    ensure_file(&config.model_path, config.model_url.as_deref())
        .await
        .context("model artifact unavailable")?;

    let labels = match &config.class_list_path {
        Some(path) => {
            ensure_file(path, config.class_list_url.as_deref())
                .await
                .context("class list unavailable")?;
            LabelMap::from_file(path)?
        }
        None => LabelMap::default(),
    };

    let ops = GraphOps {
        input: config.input_op.clone(),
        output: config.output_op.clone(),
    };
    let classifier =
        TensorflowClassifier::new(&config.model_path, ops).context("failed to load model")?;

    let service = PredictionService::new(Arc::new(classifier), labels);
    tracing::info!(classes = service.labels().len(), "prediction service ready");

    let app = routes::router(service, config.body_limit_bytes());

    tracing::info!("listening on http://{addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
