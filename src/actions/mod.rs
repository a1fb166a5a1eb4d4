//! File actions module.
//!
//! Currently a single action: removing duplicate copies, either permanently
//! or to the system trash via the `trash` crate.
//!
//! ```no_run
//! use dupfind::actions::{permanent_delete, DeleteConfig};
//! use std::path::Path;
//!
//! let result = permanent_delete(Path::new("/path/to/duplicate.txt"));
//! ```

pub mod delete;

pub use delete::{
    delete_duplicates, delete_to_trash, deletion_candidates, permanent_delete,
    validate_preserves_copy, BatchDeleteResult, Confirmation, DeleteConfig, DeleteError,
    DeleteProgressCallback, DeleteResult,
};
