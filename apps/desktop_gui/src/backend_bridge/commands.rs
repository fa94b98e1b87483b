//! Backend commands queued from UI to backend worker.

use moodpaper_shared::domain::GeneratedImage;

pub enum BackendCommand {
    Generate {
        cycle: u64,
        prompt: String,
        reference: Option<GeneratedImage>,
    },
    SaveImage {
        image: GeneratedImage,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generate { .. } => "generate",
            Self::SaveImage { .. } => "save_image",
        }
    }
}
