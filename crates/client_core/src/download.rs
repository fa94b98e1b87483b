//! Writing generated images to the local filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use moodpaper_shared::domain::GeneratedImage;

pub fn suggested_filename(image: &GeneratedImage) -> String {
    format!("moodpaper-{}.png", image.id)
}

pub async fn save_to_path(image: &GeneratedImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    tokio::fs::write(path, image.bytes())
        .await
        .with_context(|| format!("failed to write image to '{}'", path.display()))?;
    tracing::info!(image_id = %image.id, path = %path.display(), "saved image");
    Ok(())
}

/// Saves under [`suggested_filename`] inside `dir` and returns the written path.
pub async fn save_into_dir(image: &GeneratedImage, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(suggested_filename(image));
    save_to_path(image, &path).await?;
    Ok(path)
}
