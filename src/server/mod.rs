pub use config::*;
pub use router::*;
pub use server::*;

/// Entry point for starting a server.
mod server;
/// Config for a server.
mod config;
/// Router for dispatching requests by method.
mod router;
/// Connection for storing state about a connection to a client.
mod connection;
/// Utility functions for polling IO and enabling async listening.
mod poll;
/// A buffered writer that handles WouldBlock errors.
pub(crate) mod nonblocking_buf_writer;
/// A slab data structure implementation for storing connections.
mod slab;
