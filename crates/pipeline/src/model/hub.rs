//! Model hub downloads
//!
//! Files are cached by `hf-hub` under its own cache directory; repeated
//! calls for the same artifact return the cached path.

use std::path::PathBuf;

use aksa_tts_core::ModelError;
use hf_hub::{api::sync::Api, Repo, RepoType};

/// Fetch `filename` from the model repository `repo_id`
pub fn fetch_artifact(repo_id: &str, filename: &str) -> Result<PathBuf, ModelError> {
    let download_error = |message: String| ModelError::Download {
        repo: repo_id.to_string(),
        file: filename.to_string(),
        message,
    };

    if repo_id.trim().is_empty() {
        return Err(download_error("repository id is empty".to_string()));
    }

    tracing::info!(repo = %repo_id, file = %filename, "Fetching model artifact");

    let api = Api::new().map_err(|e| download_error(e.to_string()))?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let path = repo.get(filename).map_err(|e| download_error(e.to_string()))?;

    tracing::debug!(path = %path.display(), "Artifact available");
    Ok(path)
}
