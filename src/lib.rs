//! RelSentry - Release tracking for starred GitHub repositories
//!
//! RelSentry lists the repositories an account has starred, looks up the latest
//! release of each one and reports which of them changed since the previous run.
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and parsing
//! - [`github`]: Read-only GitHub API access and rate limit handling
//! - [`release`]: Latest-release lookup and change classification
//! - [`state`]: The persisted release baseline
//! - [`sync`]: Orchestration of a full run

pub mod config;
pub mod error;
pub mod github;
pub mod release;
pub mod state;
pub mod sync;

pub use config::Config;
pub use error::SyncError;
pub use github::{ApiQuery, ApiResponse, GitHubClient};
pub use release::{ReleaseOutcome, ReleaseResolver};
pub use state::{Baseline, StateStore, NO_RELEASES};
pub use sync::{RepoReport, SyncEngine, SyncSummary};
