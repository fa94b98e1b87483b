use super::*;
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::anyhow;
use moodpaper_shared::domain::AspectRatio;
use tokio::sync::Barrier;

#[derive(Clone)]
enum Outcome {
    Image(&'static [u8]),
    DelayedImage(&'static [u8], Duration),
    /// Resolves only once every slot sharing the barrier is in flight.
    Rendezvous(&'static [u8], Arc<Barrier>),
    Empty,
    Fail(&'static str),
}

struct ScriptedProvider {
    outcomes: Vec<Outcome>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedProvider {
    fn new(outcomes: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn always(outcome: Outcome) -> Arc<Self> {
        Self::new(vec![outcome; VARIATION_COUNT])
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn recorded_requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ImageProvider for ScriptedProvider {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Option<Vec<u8>>> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        match self.outcomes.get(index).cloned().unwrap_or(Outcome::Empty) {
            Outcome::Image(bytes) => Ok(Some(bytes.to_vec())),
            Outcome::DelayedImage(bytes, delay) => {
                tokio::time::sleep(delay).await;
                Ok(Some(bytes.to_vec()))
            }
            Outcome::Rendezvous(bytes, barrier) => {
                barrier.wait().await;
                Ok(Some(bytes.to_vec()))
            }
            Outcome::Empty => Ok(None),
            Outcome::Fail(reason) => Err(anyhow!(reason)),
        }
    }
}

fn orchestrator_for(provider: &Arc<ScriptedProvider>) -> Orchestrator {
    Orchestrator::new(provider.clone() as Arc<dyn ImageProvider>)
}

#[tokio::test]
async fn fresh_prompt_fans_out_four_fresh_requests() {
    let provider = ScriptedProvider::always(Outcome::Image(b"png"));
    let orchestrator = orchestrator_for(&provider);

    let images = orchestrator
        .generate("rainy pastel city skyline", None)
        .await
        .expect("generation succeeds");

    assert_eq!(provider.call_count(), VARIATION_COUNT);
    assert_eq!(images.len(), VARIATION_COUNT);

    let ids: HashSet<_> = images.iter().map(|image| image.id).collect();
    assert_eq!(ids.len(), VARIATION_COUNT);
    assert!(images
        .iter()
        .all(|image| image.prompt == "rainy pastel city skyline"));

    for request in provider.recorded_requests() {
        assert!(!request.is_remix());
        assert_eq!(request.aspect_ratio, AspectRatio::Portrait9x16);
        assert!(request.instruction.contains("9:16 aspect ratio"));
        assert!(!request.instruction.starts_with("Remix"));
    }
}

#[tokio::test]
async fn reference_image_frames_every_request_as_remix() {
    let provider = ScriptedProvider::always(Outcome::Image(b"png"));
    let orchestrator = orchestrator_for(&provider);
    let reference = ReferenceImage::from_png_bytes(b"result-two");

    orchestrator
        .generate("darker, add rain", Some(reference.clone()))
        .await
        .expect("generation succeeds");

    let requests = provider.recorded_requests();
    assert_eq!(requests.len(), VARIATION_COUNT);
    for request in requests {
        assert_eq!(request.reference.as_ref(), Some(&reference));
        assert!(request
            .instruction
            .starts_with("Remix this image based on the following instruction: darker, add rain."));
    }
}

#[tokio::test]
async fn all_failures_surface_as_no_images_produced() {
    let provider = ScriptedProvider::new(vec![
        Outcome::Fail("connection reset"),
        Outcome::Empty,
        Outcome::Fail("HTTP 500"),
        Outcome::Empty,
    ]);
    let orchestrator = orchestrator_for(&provider);

    let err = orchestrator
        .generate("neon forest", None)
        .await
        .expect_err("nothing produced");

    assert_eq!(
        err,
        GenerationError::NoImagesProduced {
            attempted: VARIATION_COUNT
        }
    );
    // failed slots are not retried
    assert_eq!(provider.call_count(), VARIATION_COUNT);
}

#[tokio::test]
async fn partial_success_returns_only_successful_slots() {
    for successes in 1..=VARIATION_COUNT {
        let outcomes = (0..VARIATION_COUNT)
            .map(|i| {
                if i < successes {
                    Outcome::Image(b"png")
                } else {
                    Outcome::Fail("quota exceeded")
                }
            })
            .collect();
        let provider = ScriptedProvider::new(outcomes);
        let orchestrator = orchestrator_for(&provider);

        let images = orchestrator
            .generate("foggy harbor", None)
            .await
            .expect("at least one image");

        assert_eq!(images.len(), successes);
        let ids: HashSet<_> = images.iter().map(|image| image.id).collect();
        assert_eq!(ids.len(), successes);
        assert!(images.iter().all(|image| image.prompt == "foggy harbor"));
    }
}

#[tokio::test]
async fn waits_for_slow_calls_to_settle() {
    let provider = ScriptedProvider::new(vec![
        Outcome::Image(b"fast"),
        Outcome::DelayedImage(b"slow", Duration::from_millis(150)),
        Outcome::Fail("boom"),
        Outcome::Image(b"fast"),
    ]);
    let orchestrator = orchestrator_for(&provider);

    let images = orchestrator
        .generate("desert at dawn", None)
        .await
        .expect("generation succeeds");

    assert_eq!(images.len(), 3);
    assert!(images.iter().any(|image| image.bytes() == b"slow"));
}

#[tokio::test]
async fn provider_calls_are_in_flight_together() {
    let barrier = Arc::new(Barrier::new(VARIATION_COUNT));
    let provider = ScriptedProvider::always(Outcome::Rendezvous(b"png", barrier));
    let orchestrator = orchestrator_for(&provider);

    let images = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.generate("aurora over glacier", None),
    )
    .await
    .expect("all four calls overlap")
    .expect("generation succeeds");

    assert_eq!(images.len(), VARIATION_COUNT);
    assert_eq!(provider.call_count(), VARIATION_COUNT);
}

#[tokio::test]
async fn blank_prompt_issues_no_calls() {
    let provider = ScriptedProvider::always(Outcome::Image(b"png"));
    let orchestrator = orchestrator_for(&provider);

    let err = orchestrator
        .generate("   \n", None)
        .await
        .expect_err("blank prompt rejected");

    assert_eq!(err, GenerationError::EmptyPrompt);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn images_carry_creation_timestamps() {
    let before = chrono_millis_now();
    let provider = ScriptedProvider::always(Outcome::Image(b"png"));
    let images = orchestrator_for(&provider)
        .generate("aurora", None)
        .await
        .expect("generation succeeds");

    assert!(images
        .iter()
        .all(|image| image.timestamp_millis() >= before));
}

fn chrono_millis_now() -> i64 {
    let since_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock");
    i64::try_from(since_epoch.as_millis()).expect("millis fit in i64")
}
