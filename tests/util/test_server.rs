use std::thread::{sleep, spawn};
use std::time::Duration;

use tempfile::TempDir;

use filebox::files::file_router;
use filebox::files::resolve::Resolver;
use filebox::server;
use filebox::server::Config;

/// Starts a file server for a new temporary directory on the given port, with no body size limit.
/// The directory is removed when the returned handle is dropped.
pub fn start_file_server(port: u16) -> (TempDir, String) {
    start_server(port, None)
}

/// Starts a file server that rejects request bodies larger than the given size.
pub fn start_file_server_with_limit(port: u16, max_body_size: u64) -> (TempDir, String) {
    start_server(port, Some(max_body_size))
}

fn start_server(port: u16, max_body_size: Option<u64>) -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let addr = format!("127.0.0.1:{}", port);

    let config = Config {
        addr: addr.clone(),
        connection_handler_threads: 4,
        max_body_size,
        router: file_router(Resolver::new(root)),
    };
    spawn(move || server::listen_http(config).unwrap());
    sleep(Duration::from_millis(100));

    (dir, addr)
}
