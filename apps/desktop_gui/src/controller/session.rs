//! Session state for one wallpaper view: status machine, prompt, results, remix
//! reference and full-screen selection.
//!
//! Operations mutate state and return [`Effect`]s; the UI shell and backend worker
//! execute them. The controller itself never touches the network or the screen.

use std::time::Duration;

use moodpaper_shared::domain::{GeneratedImage, SessionStatus};
use tracing::{debug, info, warn};

use crate::controller::events::{UiError, UiErrorContext};

pub const RESULTS_SCROLL_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub cycle: u64,
    pub prompt: String,
    pub reference: Option<GeneratedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    DispatchGeneration(GenerationJob),
    ScrollToResults { after: Duration },
    ScrollToTop,
    Download(GeneratedImage),
}

#[derive(Debug, Default)]
pub struct SessionController {
    status: SessionStatus,
    prompt: String,
    images: Vec<GeneratedImage>,
    reference: Option<GeneratedImage>,
    selected: Option<GeneratedImage>,
    last_error: Option<UiError>,
    next_cycle: u64,
    in_flight: Option<u64>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Bound directly to the prompt text box.
    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    pub fn reference(&self) -> Option<&GeneratedImage> {
        self.reference.as_ref()
    }

    pub fn selected(&self) -> Option<&GeneratedImage> {
        self.selected.as_ref()
    }

    pub fn last_error(&self) -> Option<&UiError> {
        self.last_error.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.status == SessionStatus::Generating
    }

    pub fn is_remix_mode(&self) -> bool {
        self.reference.is_some()
    }

    pub fn shows_error_banner(&self) -> bool {
        self.status == SessionStatus::Error
    }

    pub fn can_submit(&self) -> bool {
        !self.prompt.trim().is_empty() && !self.is_generating()
    }

    /// Starts a generation cycle. Inert when the prompt is blank or a cycle is in flight.
    pub fn submit(&mut self) -> Option<Effect> {
        if !self.can_submit() {
            debug!(
                generating = self.is_generating(),
                "ignoring submit: blank prompt or generation in flight"
            );
            return None;
        }

        let cycle = self.next_cycle;
        self.next_cycle += 1;
        self.in_flight = Some(cycle);
        self.status = SessionStatus::Generating;
        self.last_error = None;

        info!(cycle, remix = self.reference.is_some(), "generation submitted");
        Some(Effect::DispatchGeneration(GenerationJob {
            cycle,
            prompt: self.prompt.clone(),
            reference: self.reference.clone(),
        }))
    }

    /// Applies the outcome of a cycle. Outcomes for any other cycle are dropped.
    pub fn complete_generation(
        &mut self,
        cycle: u64,
        outcome: Result<Vec<GeneratedImage>, UiError>,
    ) -> Vec<Effect> {
        if self.in_flight != Some(cycle) {
            warn!(cycle, in_flight = ?self.in_flight, "dropping stale generation outcome");
            return Vec::new();
        }
        self.in_flight = None;

        let outcome = outcome.and_then(|images| {
            if images.is_empty() {
                Err(UiError::from_message(
                    UiErrorContext::Generate,
                    "no images produced",
                ))
            } else {
                Ok(images)
            }
        });

        match outcome {
            Ok(images) => {
                info!(cycle, produced = images.len(), "generation succeeded");
                self.images = images;
                self.reference = None;
                self.prompt.clear();
                self.status = SessionStatus::Success;
                vec![Effect::ScrollToResults {
                    after: RESULTS_SCROLL_DELAY,
                }]
            }
            Err(error) => {
                warn!(
                    cycle,
                    category = ?error.category(),
                    "generation failed: {}",
                    error.message()
                );
                self.last_error = Some(error);
                self.status = SessionStatus::Error;
                Vec::new()
            }
        }
    }

    /// Makes `image` the remix reference and returns to the prompt.
    pub fn remix(&mut self, image: &GeneratedImage) -> Effect {
        debug!(image_id = %image.id, "remix requested");
        self.reference = Some(image.clone());
        self.selected = None;
        self.prompt.clear();
        Effect::ScrollToTop
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    pub fn select(&mut self, image: &GeneratedImage) {
        self.selected = Some(image.clone());
    }

    pub fn dismiss_selected(&mut self) {
        self.selected = None;
    }

    pub fn download(&self, image: &GeneratedImage) -> Effect {
        Effect::Download(image.clone())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
