//! Batch execution: the session manager, image writer, manifest updater,
//! annotation worker, and the executor that ties them together.

pub mod annotation;
pub mod executor;
pub mod manifest;
pub mod session;

pub use annotation::{AnnotationJob, AnnotationRenderer, AnnotationWorker, NoopRenderer};
pub use executor::{ExecutionSummary, ExecutorOptions, Failure};
