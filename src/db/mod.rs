pub mod connection;
pub mod migrations;
pub mod store;
pub mod task_repo;

pub use connection::*;
pub use store::TaskStore;
pub use task_repo::SqliteStore;
