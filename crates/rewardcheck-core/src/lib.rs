pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod existence;
pub mod io;
pub mod issue;
pub mod load;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod types;

pub use engine::{run, ValidationOutcome, Validator};
pub use error::{CheckError, Result};
pub use issue::{has_errors, ValidationIssue};
