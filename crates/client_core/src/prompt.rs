//! Instruction framing for fresh and remix requests.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use moodpaper_shared::{
    domain::{AspectRatio, GeneratedImage, PNG_MIME_TYPE},
    protocol::{Content, GenerateContentRequest, GenerationConfig, ImageConfig, Part},
};

/// Reference image for a remix, already base64 encoded for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub mime_type: String,
    pub data_b64: String,
}

impl ReferenceImage {
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self {
            mime_type: PNG_MIME_TYPE.to_string(),
            data_b64: STANDARD.encode(bytes),
        }
    }

    pub fn from_generated(image: &GeneratedImage) -> Self {
        Self::from_png_bytes(image.bytes())
    }

    /// Accepts a bare base64 payload or a `data:<mime>;base64,<payload>` URI.
    /// Line breaks and other ASCII whitespace inside the payload are dropped.
    pub fn from_encoded(encoded: &str) -> Self {
        let data = match encoded.split_once(',') {
            Some((_, payload)) if !payload.is_empty() => payload,
            _ => encoded,
        };
        Self {
            mime_type: PNG_MIME_TYPE.to_string(),
            data_b64: data
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub instruction: String,
    pub reference: Option<ReferenceImage>,
    pub aspect_ratio: AspectRatio,
}

impl ImageRequest {
    pub fn new(prompt: &str, reference: Option<ReferenceImage>) -> Self {
        let instruction = match reference {
            Some(_) => remix_instruction(prompt),
            None => fresh_instruction(prompt, AspectRatio::Portrait9x16),
        };
        Self {
            instruction,
            reference,
            aspect_ratio: AspectRatio::Portrait9x16,
        }
    }

    pub fn is_remix(&self) -> bool {
        self.reference.is_some()
    }

    /// Reference part first, instruction last.
    pub fn to_wire(&self) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(reference) = &self.reference {
            parts.push(Part::inline(
                reference.mime_type.clone(),
                reference.data_b64.clone(),
            ));
        }
        parts.push(Part::text(self.instruction.clone()));

        GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: self.aspect_ratio,
                }),
            }),
        }
    }
}

pub fn fresh_instruction(prompt: &str, aspect_ratio: AspectRatio) -> String {
    format!("{prompt}. High quality, aesthetic phone wallpaper, {aspect_ratio} aspect ratio.")
}

pub fn remix_instruction(prompt: &str) -> String {
    format!(
        "Remix this image based on the following instruction: {prompt}. Ensure high quality, aesthetic phone wallpaper style."
    )
}
