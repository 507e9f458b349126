//! Retention sweeper for EPGStation.
//!
//! EPGStation keeps the raw transport stream of every recording next to the
//! encoded copy. This crate lists the recorded programs, picks the ones that
//! are old enough, unprotected and already encoded, and deletes their `ts`
//! files so only the encoded output remains.
//!
//! # Overview
//!
//! - **config**: environment-driven [`CleanerConfig`]
//! - **epgstation**: HTTP client behind the [`RecordingService`] trait
//! - **policy**: [`DeletionPolicy`] deciding which recordings are stale
//! - **sweep**: [`Sweeper`] tying it together for one run
//! - **logging**: `tracing` subscriber setup for the binary
//!
//! # Example
//!
//! ```ignore
//! use epgstation_cleaner::{CleanerConfig, EpgStationClient, Sweeper};
//!
//! let config = CleanerConfig::from_env()?;
//! let client = EpgStationClient::from_config(&config)?;
//! let report = Sweeper::from_config(client, &config).run().await?;
//! println!("deleted {} files", report.files_deleted);
//! ```

pub mod config;
pub mod epgstation;
pub mod error;
pub mod logging;
pub mod policy;
pub mod sweep;

pub use config::{CleanerConfig, ConfigError, LogFormat, LogLevel};
pub use epgstation::{EpgStationClient, RecordedItem, Records, RecordingService, VideoFile};
pub use error::{CleanerError, CleanerResult};
pub use policy::{DeletionPolicy, RecordEvaluation};
pub use sweep::{SweepReport, Sweeper};
