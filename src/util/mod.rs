/// Basic thread pool utility.
pub mod thread_pool;

/// Utility for creating mock trait implementations.
#[cfg(test)]
pub mod mock;

/// Stream utility for buffering reads and writes over one stream.
pub mod stream;
