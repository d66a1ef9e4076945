//! # Reserva
//!
//! Multi-tenant reservation service for restaurants and lodgings: tables and
//! rooms are booked for half-open time windows without double-booking.
//!
//! ## Architecture
//!
//! - **domain**: entities, value objects and repository traits
//! - **application**: use cases (reservations, conflict checking, tenants,
//!   identity), event bus and outbound ports
//! - **infrastructure**: SeaORM and in-memory repositories, JWT/bcrypt, mailer
//! - **interfaces**: REST API with Swagger docs and the WebSocket event stream
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::create_api_router;

// Re-export notifications
pub use application::{create_event_bus, Event, EventBus, SharedEventBus};
