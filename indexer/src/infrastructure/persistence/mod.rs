pub mod connection;
pub mod entities;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod memory;
pub mod repositories;

pub use connection::DbPool;
pub use error::DbError;
pub use factory::RepositoryFactory;
pub use ledger::PgLedger;
pub use memory::{MemoryLedger, StoreCall};
pub use repositories::Repositories;
