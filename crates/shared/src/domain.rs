use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(ImageId);

pub const PNG_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Portrait phone wallpaper.
    #[default]
    #[serde(rename = "9:16")]
    Portrait9x16,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait9x16 => "9:16",
        }
    }

    /// Width over height.
    pub fn ratio(self) -> f32 {
        match self {
            Self::Portrait9x16 => 9.0 / 16.0,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Generating,
    Success,
    Error,
}

/// One generated wallpaper. Image bytes are shared, so clones are cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub id: ImageId,
    pub data: Arc<[u8]>,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
}

impl GeneratedImage {
    pub fn new(data: impl Into<Arc<[u8]>>, prompt: impl Into<String>) -> Self {
        Self {
            id: ImageId::new_random(),
            data: data.into(),
            prompt: prompt.into(),
            created_at: Utc::now(),
        }
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("id", &self.id)
            .field("data_len", &self.data.len())
            .field("prompt", &self.prompt)
            .field("created_at", &self.created_at)
            .finish()
    }
}
