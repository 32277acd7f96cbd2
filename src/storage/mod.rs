//! Entity repository interface and backends.
//!
//! The repository is the system of record. Resolution only reads from it,
//! through [`EntityRepository`]; creation and updates go through
//! [`RepositoryWriter`] and happen strictly after resolution completes.

mod fixtures;
mod memory;
mod traits;

pub use fixtures::demo_repository;
pub use memory::InMemoryRepository;
pub use traits::{EntityRepository, OpportunityUpdate, RepositoryError, RepositoryWriter};
