//! crup-ingestion: Domain registry and simulated document intake.
//! Covers:
//! - Domain registration with slug normalisation
//! - Per-domain tracked file lists
//! - The staged intake scheduler (queued → extracting → embedding → processed)
//! - The session controller that owns all of the above

pub mod models;
pub mod registry;
pub mod workspace;
pub mod timeline;
pub mod pipeline;
pub mod session;

pub use pipeline::{IntakeConfig, IntakePipeline, IntakeProgress};
pub use session::IntakeSession;
pub use workspace::{SharedWorkspace, Workspace};
