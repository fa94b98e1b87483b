use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodpaper_client::{
    download, GeminiImageProvider, Orchestrator, ProviderSettings, ReferenceImage,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "moodpaper", about = "Generate phone wallpapers from a mood description")]
struct Args {
    /// Path to a moodpaper.toml with provider settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the image model.
    #[arg(long, global = true)]
    model: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a batch of wallpapers and write them as PNG files.
    Generate {
        prompt: String,
        /// Remix an existing image instead of generating from scratch.
        #[arg(long)]
        reference: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut settings = ProviderSettings::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        settings = settings.with_model(model);
    }
    let orchestrator = Orchestrator::new(Arc::new(GeminiImageProvider::new(&settings)?));

    match args.command {
        Command::Generate {
            prompt,
            reference,
            out,
        } => {
            let reference = match reference {
                Some(path) => Some(read_reference(&path).await?),
                None => None,
            };
            let images = orchestrator.generate(&prompt, reference).await?;
            tracing::info!(count = images.len(), out = %out.display(), "writing wallpapers");
            for image in &images {
                let path = download::save_into_dir(image, &out).await?;
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

/// Raw image bytes, or a text file holding base64 / a data URI.
async fn read_reference(path: &std::path::Path) -> Result<ReferenceImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read reference image '{}'", path.display()))?;
    match std::str::from_utf8(&bytes) {
        Ok(text) if !text.trim().is_empty() && is_base64_text(text.trim()) => {
            Ok(ReferenceImage::from_encoded(text.trim()))
        }
        _ => Ok(ReferenceImage::from_png_bytes(&bytes)),
    }
}

fn is_base64_text(text: &str) -> bool {
    text.starts_with("data:")
        || text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'\n' | b'\r'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_encoded_reference_text() {
        assert!(is_base64_text("data:image/png;base64,QUJD"));
        assert!(is_base64_text("QUJD\nRUZH=="));
        assert!(!is_base64_text("\u{89}PNG binary"));
    }

    #[tokio::test]
    async fn multi_line_reference_file_loads_as_one_payload() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("moodpaper-cli-ref-{nanos}.txt"));
        tokio::fs::write(&path, "QUJD\nREVG\nR0hJ\n")
            .await
            .expect("write reference");

        let reference = read_reference(&path).await.expect("read reference");
        assert_eq!(reference.data_b64, "QUJDREVGR0hJ");

        tokio::fs::remove_file(&path).await.expect("cleanup");
    }

    #[test]
    fn parses_generate_arguments() {
        let args = Args::try_parse_from([
            "moodpaper",
            "--model",
            "other-model",
            "generate",
            "rainy pastel city skyline",
            "--out",
            "walls",
        ])
        .expect("parse");
        assert_eq!(args.model.as_deref(), Some("other-model"));
        match args.command {
            Command::Generate {
                prompt,
                reference,
                out,
            } => {
                assert_eq!(prompt, "rainy pastel city skyline");
                assert!(reference.is_none());
                assert_eq!(out, PathBuf::from("walls"));
            }
        }
    }
}
