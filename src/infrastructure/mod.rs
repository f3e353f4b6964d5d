//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where gigscout keeps its state and trace files on the host.

pub mod paths;

pub use paths::{expand_tilde, get_data_dir, DATA_DIR_ENV};
