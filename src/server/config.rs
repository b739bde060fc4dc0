use crate::server::Router;

/// The config for an HTTP server.
pub struct Config {
    /// The address to bind the server listener to.
    pub addr: String,
    /// The number of threads to spawn for handling connections. Each thread is used for one
    /// connection at a time.
    pub connection_handler_threads: usize,
    /// Requests with a larger body are rejected with a 413 response. None accepts bodies of any size.
    pub max_body_size: Option<u64>,
    /// The router used for handling requests.
    pub router: Router,
}
