//! Startup download of model artifacts that are missing on disk.

use std::{env, path::Path};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::error::{Error, Result};

async fn download_file(url: &str, path: &Path) -> Result<()> {
    tracing::info!(url, path = %path.display(), "downloading artifact");

    let mut header_map = HeaderMap::new();
    if let Ok(token) = env::var("GITHUB_TOKEN") {
        let auth_value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::InvalidConfig("GITHUB_TOKEN is not a valid header value".into()))?;
        header_map.insert(AUTHORIZATION, auth_value);
    }
    header_map.insert(ACCEPT, HeaderValue::from_static("application/octet-stream"));

    let download_err = |source| Error::Download {
        url: url.to_string(),
        source,
    };

    let response = reqwest::Client::new()
        .get(url)
        .headers(header_map)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;
    let bytes = response.bytes().await.map_err(download_err)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, &bytes).await?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "artifact saved");
    Ok(())
}

/// Make sure `path` exists, downloading it from `url` when it does not.
pub async fn ensure_file(path: &Path, url: Option<&str>) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    match url {
        Some(url) => download_file(url, path).await,
        None => Err(Error::InvalidConfig(format!(
            "{} does not exist and no download URL is configured",
            path.display()
        ))),
    }
}
