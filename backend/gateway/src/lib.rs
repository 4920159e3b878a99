//! signd control server.
//!
//! Local HTTP surface for pairing with an enclave and relaying identity,
//! sign and list requests to it.

pub mod enclave;
pub mod pair;
pub mod server;

#[cfg(test)]
mod testing;

pub use server::{build_router, serve, ControlState, DEFAULT_CALL_TIMEOUT};
