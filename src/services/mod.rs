// Service exports
pub mod catalog;
pub mod memory;
pub mod postgres;
pub mod recommender;

pub use catalog::Catalog;
pub use memory::InMemoryCatalog;
pub use postgres::{PostgresCatalog, PostgresError};
pub use recommender::Recommender;
