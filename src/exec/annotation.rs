//! Annotation Worker: a bounded, drop-oldest background task that renders
//! applied-variation overlays onto produced images without blocking the
//! executor's main loop (`SPEC_FULL.md` §4.13, §9).

use crossbeam_channel::{Receiver, Sender, TrySendError};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;

/// One unit of annotation work: an image to annotate plus the variation
/// choices that produced it.
#[derive(Debug)]
pub struct AnnotationJob {
    /// Path to the image file to annotate, in place.
    pub image_path: PathBuf,
    /// Placeholder name -> chosen key, for rendering onto the image.
    pub applied_variations: IndexMap<String, String>,
}

/// Renders an annotation overlay onto an image. The executor never
/// constructs one of these directly; it's a pluggable collaborator so the
/// rendering backend (which draws pixels, a concern orthogonal to this
/// crate's resolution/generation pipeline) can be swapped in.
pub trait AnnotationRenderer: Send + 'static {
    /// Renders the job's applied variations onto its image, in place.
    fn render(&self, job: &AnnotationJob);
}

/// A renderer that does nothing, used when annotation is enabled but no
/// concrete rendering backend has been wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl AnnotationRenderer for NoopRenderer {
    fn render(&self, _job: &AnnotationJob) {}
}

/// The running worker: owns the sending half of a bounded channel and the
/// background thread consuming it.
pub struct AnnotationWorker {
    sender: Sender<AnnotationJob>,
    eviction_receiver: Receiver<AnnotationJob>,
    handle: Option<JoinHandle<()>>,
}

impl AnnotationWorker {
    /// Spawns the worker thread with a bounded queue of `capacity` jobs.
    #[must_use]
    pub fn spawn(renderer: impl AnnotationRenderer, capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let eviction_receiver = receiver.clone();
        let handle = std::thread::spawn(move || {
            while let Ok(job) = receiver.recv() {
                renderer.render(&job);
            }
        });
        Self {
            sender,
            eviction_receiver,
            handle: Some(handle),
        }
    }

    /// Enqueues a job, dropping the oldest queued job to make room if the
    /// queue is full rather than blocking the caller.
    pub fn enqueue(&self, job: AnnotationJob) {
        let mut pending = job;
        loop {
            match self.sender.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(returned)) => {
                    if self.eviction_receiver.try_recv().is_err() {
                        tracing::warn!("annotation queue full but nothing to evict; dropping job");
                        return;
                    }
                    tracing::warn!(path = %returned.image_path.display(), "annotation queue full; dropped oldest job");
                    pending = returned;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    /// Closes the queue and waits up to `grace_period` for the worker to
    /// drain it. If the grace period elapses, the worker is left to finish
    /// in the background (best-effort drain, per `SPEC_FULL.md` §4.10).
    pub fn stop(mut self, grace_period: Duration) {
        drop(self.sender);
        let Some(handle) = self.handle.take() else { return };

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        std::thread::spawn(move || {
            let _ = handle.join();
            let _ = done_tx.send(());
        });

        if done_rx.recv_timeout(grace_period).is_err() {
            tracing::warn!("annotation worker did not finish within its grace period; leaving it to drain in the background");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingRenderer(Arc<AtomicUsize>);

    impl AnnotationRenderer for CountingRenderer {
        fn render(&self, _job: &AnnotationJob) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_worker_processes_enqueued_jobs() {
        let count = Arc::new(AtomicUsize::new(0));
        let worker = AnnotationWorker::spawn(CountingRenderer(count.clone()), 4);
        for i in 0..3 {
            worker.enqueue(AnnotationJob {
                image_path: PathBuf::from(format!("{i}.png")),
                applied_variations: IndexMap::new(),
            });
        }
        worker.stop(Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_noop_renderer_does_nothing() {
        let renderer = NoopRenderer;
        renderer.render(&AnnotationJob {
            image_path: PathBuf::from("x.png"),
            applied_variations: IndexMap::new(),
        });
    }
}
