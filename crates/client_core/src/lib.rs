//! Generation core: provider seam, Gemini HTTP provider, prompt framing and the
//! fan-out orchestrator that produces a batch of wallpapers per request.

use anyhow::Result;
use async_trait::async_trait;

pub mod download;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod settings;

pub use error::GenerationError;
pub use orchestrator::{Orchestrator, VARIATION_COUNT};
pub use prompt::{ImageRequest, ReferenceImage};
pub use provider::GeminiImageProvider;
pub use settings::ProviderSettings;

/// One request to the image provider.
///
/// `Ok(None)` means the provider answered but the response carried no image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<Vec<u8>>>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
