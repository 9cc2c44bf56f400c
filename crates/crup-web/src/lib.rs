//! crup-web: Web GUI for CRUP
//! Provides a single research dashboard with:
//!   - Domain management and document intake monitor
//!   - Correlation query form
//!   - Validated hypothesis viewer with JSON export
//! plus a JSON API and a live event stream.

pub mod error;
pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
pub mod templates;
