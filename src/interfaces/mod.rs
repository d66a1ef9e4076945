//! Inbound adapters: REST API and WebSocket notification stream

pub mod http;
pub mod ws;
