//! Error types and result alias for rekon operations

mod builders;
mod display;
mod types;

pub use types::{CacheError, Result, StoreError};
