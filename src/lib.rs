pub mod backup;
pub mod config;
pub mod date_key;
pub mod error;
pub mod ledger;
pub mod merge;
pub mod presence;
pub mod roster;
pub mod schema;
pub mod table;

#[cfg(feature = "python")]
mod python;

pub use config::LedgerConfig;
pub use date_key::DateLike;
pub use error::LedgerError;
pub use ledger::{run, RunRequest, RunSummary};
pub use merge::{merge_attendance, MergeReport};
