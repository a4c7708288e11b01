//! The job pipeline: configuration, input backends, projections, and the local/cluster dispatch
//! strategies that fan work out to workers and fold the results back into one `Space`.

pub mod backend;
pub mod cluster;
pub mod config;
pub mod local;
pub mod progress;
pub mod projection;

pub use backend::{ImageJob, InputBackend, NullBackend};
pub use cluster::{JobId, JobScheduler, JobStatus};
pub use config::Configuration;
pub use local::run_local;
pub use progress::{ProgressEvent, ProgressSink, TracingProgressSink};
pub use projection::{IdentityProjection, Projection};
