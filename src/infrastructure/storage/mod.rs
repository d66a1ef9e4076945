//! In-memory repository implementations

mod memory;

pub use memory::{
    InMemoryBusinessRepository, InMemoryRepositoryProvider, InMemoryReservationRepository,
    InMemoryResourceRepository, InMemoryUserRepository,
};
