pub mod service;

pub use service::{Availability, ResourceService};
