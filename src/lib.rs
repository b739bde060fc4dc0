/// Command-line argument parser
pub mod args;
/// HTTP data types.
pub mod common;
/// Serving a directory: path resolution and the method handlers.
pub mod files;
/// Components for running an HTTP server and handling requests.
pub mod server;

/// Utility components.
pub mod util;

/// Components for parsing HTTP requests.
pub(crate) mod parse;
