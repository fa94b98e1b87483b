//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use moodpaper_client::{
    download, GeminiImageProvider, Orchestrator, ProviderSettings, ReferenceImage,
};
use moodpaper_shared::domain::GeneratedImage;
use tokio::runtime::Runtime;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::media::decode_preview_image;

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ProviderSettings) {
    launch_with_save_picker(cmd_rx, ui_tx, settings, prompt_save_path);
}

/// Starts the worker thread. `choose_save_path` receives the suggested file name and
/// returns `None` when the user cancels.
pub(crate) fn launch_with_save_picker<F>(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: ProviderSettings,
    choose_save_path: F,
) where
    F: Fn(&str) -> Option<PathBuf> + Send + 'static,
{
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let orchestrator = match GeminiImageProvider::new(&settings) {
            Ok(provider) => {
                tracing::info!(endpoint = provider.endpoint(), "image provider ready");
                Some(Orchestrator::new(Arc::new(provider)))
            }
            Err(err) => {
                tracing::error!("image provider unavailable: {err:#}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("{err:#}"),
                )));
                None
            }
        };

        serve_commands(&runtime, &cmd_rx, &ui_tx, orchestrator.as_ref(), choose_save_path);
        tracing::info!("backend worker stopping: command queue closed");
    });
}

/// Generations run as runtime tasks so a save request is served while a cycle is in flight.
fn serve_commands<F>(
    runtime: &Runtime,
    cmd_rx: &Receiver<BackendCommand>,
    ui_tx: &Sender<UiEvent>,
    orchestrator: Option<&Orchestrator>,
    choose_save_path: F,
) where
    F: Fn(&str) -> Option<PathBuf>,
{
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::Generate {
                cycle,
                prompt,
                reference,
            } => {
                tracing::info!(cycle, remix = reference.is_some(), "backend: generate");
                let ui_tx = ui_tx.clone();
                match orchestrator.cloned() {
                    Some(orchestrator) => {
                        runtime.spawn(async move {
                            let event =
                                run_generation(&orchestrator, cycle, &prompt, reference.as_ref())
                                    .await;
                            deliver_completion(&ui_tx, cycle, event);
                        });
                    }
                    None => deliver_completion(
                        &ui_tx,
                        cycle,
                        UiEvent::GenerationFailed {
                            cycle,
                            error: UiError::from_message(
                                UiErrorContext::Generate,
                                "image provider is not configured",
                            ),
                        },
                    ),
                }
            }
            BackendCommand::SaveImage { image } => {
                let suggested = download::suggested_filename(&image);
                let event = match choose_save_path(&suggested) {
                    Some(path) => runtime.block_on(save_image(image, path)),
                    None => UiEvent::Info("Download cancelled".to_string()),
                };
                if ui_tx.try_send(event).is_err() {
                    tracing::warn!("ui event queue unavailable; dropped download outcome");
                }
            }
        }
    }
}

/// Completion events drive the session state, so they wait for queue space.
fn deliver_completion(ui_tx: &Sender<UiEvent>, cycle: u64, event: UiEvent) {
    if ui_tx.send(event).is_err() {
        tracing::warn!(cycle, "ui event queue closed; generation outcome dropped");
    }
}

fn prompt_save_path(suggested: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(suggested)
        .add_filter("PNG image", &["png"])
        .save_file()
}

async fn run_generation(
    orchestrator: &Orchestrator,
    cycle: u64,
    prompt: &str,
    reference: Option<&GeneratedImage>,
) -> UiEvent {
    let reference = reference.map(ReferenceImage::from_generated);
    match orchestrator.generate(prompt, reference).await {
        Ok(images) => {
            let previews = images
                .iter()
                .filter_map(|image| match decode_preview_image(image.bytes()) {
                    Ok(preview) => Some((image.id, preview)),
                    Err(err) => {
                        tracing::warn!(image_id = %image.id, "preview decode failed: {err}");
                        None
                    }
                })
                .collect();
            UiEvent::GenerationSucceeded {
                cycle,
                images,
                previews,
            }
        }
        Err(err) => UiEvent::GenerationFailed {
            cycle,
            error: UiError::from_message(UiErrorContext::Generate, err.to_string()),
        },
    }
}

async fn save_image(image: GeneratedImage, path: PathBuf) -> UiEvent {
    match download::save_to_path(&image, &path).await {
        Ok(()) => UiEvent::ImageSaved {
            image_id: image.id,
            path,
        },
        Err(err) => {
            tracing::error!(image_id = %image.id, "save failed: {err:#}");
            UiEvent::Error(UiError::from_message(
                UiErrorContext::Download,
                format!("{err:#}"),
            ))
        }
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
