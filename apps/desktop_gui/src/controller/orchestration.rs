//! Command orchestration helpers from session effects to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::session::GenerationJob;

/// Queues `cmd` for the backend worker. On failure `status` explains why and the
/// command is handed back.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> Result<(), BackendCommand> {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(cmd)) => {
            *status = "UI command queue is full; please retry".to_string();
            Err(cmd)
        }
        Err(TrySendError::Disconnected(cmd)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure)"
                    .to_string();
            Err(cmd)
        }
    }
}

pub fn generation_command(job: GenerationJob) -> BackendCommand {
    BackendCommand::Generate {
        cycle: job.cycle,
        prompt: job.prompt,
        reference: job.reference,
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;
    use moodpaper_shared::domain::GeneratedImage;

    use super::*;

    fn save_command() -> BackendCommand {
        BackendCommand::SaveImage {
            image: GeneratedImage::new(vec![1], "x"),
        }
    }

    #[test]
    fn queues_command_when_capacity_allows() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, save_command(), &mut status).is_ok());
        assert!(status.is_empty());
        assert_eq!(rx.try_recv().map(|cmd| cmd.name()).ok(), Some("save_image"));
    }

    #[test]
    fn full_queue_returns_command_and_sets_status() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        assert!(dispatch_backend_command(&tx, save_command(), &mut status).is_ok());
        let rejected = dispatch_backend_command(&tx, save_command(), &mut status);
        assert!(rejected.is_err());
        assert!(status.contains("queue is full"));
    }

    #[test]
    fn disconnected_worker_is_reported() {
        let (tx, rx) = bounded::<BackendCommand>(1);
        drop(rx);
        let mut status = String::new();
        let job = GenerationJob {
            cycle: 3,
            prompt: "p".to_string(),
            reference: None,
        };
        let rejected = dispatch_backend_command(&tx, generation_command(job), &mut status);
        assert!(matches!(
            rejected,
            Err(BackendCommand::Generate { cycle: 3, .. })
        ));
        assert!(status.contains("disconnected"));
    }
}
