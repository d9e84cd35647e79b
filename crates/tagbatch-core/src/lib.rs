//! tagbatch Core - embeddable batch interrogation library.
//!
//! Interrogates each image of an image-to-image batch with one or more
//! tagging backends, cleans the combined output, and splices it into the
//! job's prompt while removing what the previous image injected.
//!
//! # Architecture
//!
//! ```text
//! Job → Backends (CLIP / Deepbooru / WD) → Dedup → Replace → Filters → Compose → Job
//!                                                                       ↑
//!                                                   Contamination record (per session)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tagbatch_core::{
//!     backend::{discover, HostClient},
//!     BatchInterrogator, BatchStep, Config, GenerationJob, InterrogationSession, JobState,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> tagbatch_core::Result<()> {
//!     let config = Config::load()?;
//!     let registry = discover(HostClient::new(&config.host)).await;
//!     let interrogator = BatchInterrogator::new(Arc::new(registry));
//!
//!     let mut session = InterrogationSession::new();
//!     let mut job = GenerationJob::new("masterpiece", "lowres", 1);
//!     job.init_images.push(image::open("./image.png").unwrap());
//!
//!     let outcome = interrogator
//!         .process_batch(
//!             &mut session,
//!             &mut job,
//!             &JobState::new(),
//!             &mut BatchStep::default(),
//!             &config.interrogation,
//!         )
//!         .await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod text;
pub mod types;

pub use backend::{BackendKind, BackendRegistry, HostClient, TaggingBackend};
pub use config::Config;
pub use error::{BackendError, ConfigError, Result, SettingsError, TagBatchError};
pub use job::{GenerationJob, JobState};
pub use orchestrator::{BatchInterrogator, BatchStep, StepOutcome, StepReport};
pub use session::InterrogationSession;
pub use settings::SettingsStore;
pub use types::{Interrogation, PlacementPolicy, SubModel, Tag, TagSet};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
