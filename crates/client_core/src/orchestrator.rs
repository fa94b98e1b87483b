//! Fan-out of one prompt into a fixed batch of independent provider calls.

use std::sync::Arc;

use futures::future::join_all;
use moodpaper_shared::domain::GeneratedImage;
use tracing::{info, warn};

use crate::{
    error::GenerationError,
    prompt::{ImageRequest, ReferenceImage},
    ImageProvider,
};

/// Number of variations requested per generation cycle.
pub const VARIATION_COUNT: usize = 4;

#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn ImageProvider>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self { provider }
    }

    /// Issues [`VARIATION_COUNT`] concurrent calls and keeps whichever succeed.
    ///
    /// Individual failures and empty responses are logged and dropped. Waits for every
    /// call to settle; fails only when none produced an image.
    pub async fn generate(
        &self,
        prompt: &str,
        reference: Option<ReferenceImage>,
    ) -> Result<Vec<GeneratedImage>, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let request = Arc::new(ImageRequest::new(prompt, reference));
        info!(
            remix = request.is_remix(),
            variations = VARIATION_COUNT,
            "starting generation cycle"
        );

        let calls = (0..VARIATION_COUNT).map(|slot| {
            let provider = Arc::clone(&self.provider);
            let request = Arc::clone(&request);
            tokio::spawn(async move {
                match provider.generate_image(&request).await {
                    Ok(Some(bytes)) => Some(bytes),
                    Ok(None) => {
                        warn!(slot, "provider returned no image");
                        None
                    }
                    Err(err) => {
                        warn!(slot, "provider call failed: {err:#}");
                        None
                    }
                }
            })
        });

        let settled = join_all(calls).await;

        let mut images = Vec::with_capacity(VARIATION_COUNT);
        for (slot, outcome) in settled.into_iter().enumerate() {
            match outcome {
                Ok(Some(bytes)) => images.push(GeneratedImage::new(bytes, prompt)),
                Ok(None) => {}
                Err(err) => warn!(slot, "provider task aborted: {err}"),
            }
        }

        if images.is_empty() {
            warn!(attempted = VARIATION_COUNT, "generation cycle produced no images");
            return Err(GenerationError::NoImagesProduced {
                attempted: VARIATION_COUNT,
            });
        }

        info!(
            produced = images.len(),
            attempted = VARIATION_COUNT,
            "generation cycle finished"
        );
        Ok(images)
    }
}
