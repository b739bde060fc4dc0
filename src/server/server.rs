use std::io::{Error, ErrorKind, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use log::{debug, error, info, warn};

use crate::common::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, Header, HeaderMap, HeaderMapOps};
use crate::common::request::Request;
use crate::common::response::{Body, DEFAULT_CONTENT_TYPE, Response};
use crate::common::status;
use crate::common::status::Status;
use crate::common::version::HTTP_VERSION_1_1;
use crate::server::config::Config;
use crate::server::connection::Connection;
use crate::server::connection::ReadRequestError::{IoErr, ParseErr};
use crate::server::connection::ReadRequestResult::{Closed, Error as ReadError, NotReady, Ready};
use crate::server::poll::listen;
use crate::server::router::{BodySink, Router};
use crate::util::stream::{BufferedStream, BufStream};
use crate::util::thread_pool::ThreadPool;

/// Size of connection read buffers.
const READ_BUF_SIZE: usize = 4096;

/// Size of connection write buffers.
const WRITE_BUF_SIZE: usize = 8192;

/// A connection shared between the poll loop and the worker threads.
/// None once a worker has closed it.
type SharedConnection<S> = Arc<Mutex<Option<Connection<S>>>>;

/// Starts an HTTP server. This function blocks.
pub fn listen_http(config: Config) -> std::io::Result<()> {
    let addr: SocketAddr = config.addr.parse()
        .map_err(|err| Error::new(ErrorKind::InvalidInput, format!("invalid address {}: {}", config.addr, err)))?;
    let thread_pool = ThreadPool::new(config.connection_handler_threads, "filebox-worker")?;

    let max_body_size = config.max_body_size;
    let config = Arc::new(config);

    listen(addr,
           |socket, addr| {
               let stream = BufferedStream::with_capacity(READ_BUF_SIZE, WRITE_BUF_SIZE, socket);
               Arc::new(Mutex::new(Some(Connection::new(addr, stream, max_body_size))))
           },
           |connection| {
               let connection = Arc::clone(connection);
               let config = Arc::clone(&config);
               thread_pool.execute(move || handle_io_ready_connection(&config.router, connection));
           },
           |connection| match connection.try_lock() {
               Ok(connection) => connection.is_none(),
               Err(TryLockError::Poisoned(_)) => true,
               Err(TryLockError::WouldBlock) => false
           })
}

/// Sends pending data, then reads requests and responds for the given connection.
/// Leaves None in place of the connection if it should be closed.
fn handle_io_ready_connection<S: BufStream>(router: &Router, connection: SharedConnection<S>) {
    let mut lock = connection.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(mut connection) = lock.take() {
        let should_close = respond_to_requests(&mut connection, router);

        if should_close {
            debug!("Closing connection to {}", connection.addr);
        } else {
            lock.replace(connection);
        }
    }
}

/// Responds to requests in the given connection using the given router. Returns true if the connection should be dropped.
/// No request is read while an earlier response is still being sent.
fn respond_to_requests<S: BufStream>(connection: &mut Connection<S>, router: &Router) -> bool {
    loop {
        match connection.send_pending() {
            Ok(true) => {}
            Ok(false) => return false,
            Err(err) => {
                debug!("Failed to write to {}: {}", connection.addr, err);
                return true;
            }
        }

        if connection.is_closing() {
            return true;
        }

        match connection.read_request(|head| router.open_body(head)) {
            Ready(mut request, body) => {
                if should_close_after_response(&request) {
                    connection.close_after_sending();
                }

                let response = response_for(router, &mut request, body);
                info!("{} {} {} {}", connection.addr, request.method, request.uri, response.status.code);

                if let Err(err) = write_response(connection, response) {
                    debug!("Failed to write to {}: {}", connection.addr, err);
                    return true;
                }
            }
            NotReady => return false,
            Closed => return true,
            ReadError(ParseErr(err)) => {
                warn!("Bad request from {}: {}", connection.addr, err);
                connection.close_after_sending();
                let response = Response::new(err.status(), Body::Bytes(err.to_string().into_bytes()));
                if write_response(connection, response).is_err() {
                    return true;
                }
            }
            ReadError(IoErr(err)) => {
                debug!("Failed to read from {}: {}", connection.addr, err);
                return true;
            }
        }
    }
}

/// Gets the response to a request from the router, given the sink its body was read into.
/// Handler errors become a response with the error's status and message.
fn response_for(router: &Router, request: &mut Request, body: BodySink) -> Response {
    router.respond(request, body).unwrap_or_else(|err| {
        let status = err.status();
        if status == status::INTERNAL_SERVER_ERROR {
            error!("Failed to handle {} {}: {}", request.method, request.uri, err);
        }
        Response::new(status, Body::Bytes(err.to_string().into_bytes()))
    })
}

/// Checks if the given connection should be closed after a response is sent to the given request.
fn should_close_after_response(request: &Request) -> bool {
    request.headers.get(&CONNECTION)
        .map(|values| values.iter().any(|value| value.eq_ignore_ascii_case("close")))
        .unwrap_or(false)
}

/// Queues the response on the given connection. File bodies are sent later by send_pending.
fn write_response<S: BufStream>(connection: &mut Connection<S>, response: Response) -> std::io::Result<()> {
    let Response { status, mut headers, body } = response;
    if connection.is_closing() {
        headers.set_header(CONNECTION, String::from("close"));
    }

    write_head(connection, status, headers, body.len())?;

    match body {
        Body::Empty => {}
        Body::Bytes(bytes) => connection.write_all(&bytes)?,
        Body::File { file, len } => connection.stream_file(file, len)
    }
    Ok(())
}

/// Writes the status line and headers. Every response gets a default content type if it has none.
/// Responses that may carry a body get a content length. Headers are written sorted by name.
fn write_head(writer: &mut impl Write, status: Status, mut headers: HeaderMap, body_len: u64) -> std::io::Result<()> {
    headers.entry(CONTENT_TYPE).or_insert_with(|| vec![String::from(DEFAULT_CONTENT_TYPE)]);
    if status != status::NO_CONTENT {
        headers.set_header(CONTENT_LENGTH, body_len.to_string());
    }

    let mut names: Vec<&Header> = headers.keys().collect();
    names.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    // write! will call write multiple times and does not flush
    write!(writer, "{} {} {}\r\n", HTTP_VERSION_1_1, status.code, status.reason)?;
    for name in names {
        for value in &headers[name] {
            write!(writer, "{}: {}\r\n", name, value)?;
        }
    }
    writer.write_all(b"\r\n")
}
