pub mod service;

pub use service::BusinessService;
