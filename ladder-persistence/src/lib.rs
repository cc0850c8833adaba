pub mod connection;
pub mod entities;
pub mod repositories;

pub use connection::{connect_and_migrate, connect_to_database, connect_to_memory_database};
pub use repositories::*;

/// Number of rows written per statement when fanning out friendships.
pub const BATCH_LIMIT: usize = 400;
