mod connection_pool;
mod entity_store;
mod mappers;
mod operation_queue;
mod rows;

pub use connection_pool::ConnectionPool;
pub use entity_store::SqliteEntityStore;
pub use operation_queue::{SqliteOperationQueue, DEFAULT_MAX_ATTEMPTS};
