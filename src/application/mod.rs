pub mod business;
pub mod events;
pub mod identity;
pub mod ports;
pub mod reservation;
pub mod resource;

// Re-export key types for convenience
pub use business::BusinessService;
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use identity::{AuthResult, UserService};
pub use ports::{NotificationError, NotificationPort, Recipient};
pub use reservation::{
    CancelOutcome, ConflictChecker, ReservationPolicy, ReservationService,
};
pub use resource::{Availability, ResourceService};
