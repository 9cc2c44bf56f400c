//! crup-query: Mock correlation queries and result export.
//! The corpus is fixed; a query only selects and shapes from it.

pub mod corpus;
pub mod dispatcher;
pub mod export;

pub use dispatcher::{QueryDispatcher, QueryOutcome, QuerySettings};
pub use export::{ExportDocument, EXPORT_FILE_NAME};
