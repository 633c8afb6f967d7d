// src/lib.rs
pub mod endpoint;
pub mod listener;

pub use endpoint::{parse_endpoint, parse_endpoint_with_fallback, EndpointError, Protocol};
pub use listener::{create_listener_file, ListenError, Listener};
