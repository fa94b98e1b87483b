use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("no images produced ({attempted} attempts failed)")]
    NoImagesProduced { attempted: usize },
}
