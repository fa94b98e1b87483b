//! UI/backend events and error modeling for the wallpaper session.

use std::path::PathBuf;

use moodpaper_shared::domain::{GeneratedImage, ImageId};

use crate::media::PreviewImage;

pub const GENERATION_FAILED_BANNER: &str = "Something went wrong. Please try again in a moment.";

pub enum UiEvent {
    Info(String),
    GenerationSucceeded {
        cycle: u64,
        images: Vec<GeneratedImage>,
        previews: Vec<(ImageId, PreviewImage)>,
    },
    GenerationFailed {
        cycle: u64,
        error: UiError,
    },
    ImageSaved {
        image_id: ImageId,
        path: PathBuf,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Provider,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Generate,
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("api key")
            || message_lower.contains("permission_denied")
            || message_lower.contains("unauthenticated")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("failed to reach")
            || message_lower.contains("dns")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("no images produced")
            || message_lower.contains("provider")
            || message_lower.contains("quota")
            || message_lower.contains("resource_exhausted")
        {
            UiErrorCategory::Provider
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Text shown to the user. Generation failures stay generic.
    pub fn banner_text(&self) -> String {
        match self.context {
            UiErrorContext::Generate => GENERATION_FAILED_BANNER.to_string(),
            UiErrorContext::BackendStartup => {
                format!("Image service unavailable: {}", self.message)
            }
            UiErrorContext::Download => format!("Download failed: {}", self.message),
        }
    }
}
