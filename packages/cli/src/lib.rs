// ABOUTME: Library side of the cairn binary
// ABOUTME: Store construction from environment config plus argument parsing helpers

pub mod context;
pub mod error;


pub use context::{
    build_encryption, display_value, load_overrides, open_store, parse_assignments, StoreOptions,
};
pub use error::{CliError, CliResult};
