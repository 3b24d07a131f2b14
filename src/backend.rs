pub mod rest;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use rest::RestClient;
pub use transport::{ErrorCode, HttpTransport, Method, Transport, TransportError};
