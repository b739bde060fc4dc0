use std::io::Write;

use crate::common::header::{ALLOW, HeaderMapOps};
use crate::common::method::Method;
use crate::common::request::Request;
use crate::common::response::{Body, Response};
use crate::common::status;
use crate::files::error::ServeError;

/// A request handler. Returns either the response to send or an error to be turned into one.
pub type Handler = Box<dyn Fn(&Request) -> Result<Response, ServeError> + 'static + Send + Sync>;

/// Opens the destination of a streamed request body, given the head of the request.
pub type UploadOpener = Box<dyn Fn(&Request) -> Result<Box<dyn Upload>, ServeError> + 'static + Send + Sync>;

/// A destination that a request body is written into as it is read from the connection.
pub trait Upload: Write + Send {
    /// Called once the whole body has been written. Returns the response to send.
    fn finish(self: Box<Self>) -> Result<Response, ServeError>;
}

/// What is done with a request of some method.
enum Route {
    /// The body is read into memory, then the handler is called.
    Buffered(Handler),
    /// The body is written into an upload as it arrives.
    Streamed(UploadOpener),
}

/// Where the body of a request goes while it is being read.
pub enum BodySink {
    /// The body is collected and handed to the handler once complete.
    Buffer(Vec<u8>),
    /// The body is written into an upload.
    Upload(Box<dyn Upload>),
    /// The request has already failed. The body is read and dropped.
    Rejected(ServeError),
    /// No handler takes the request. The body is read and dropped.
    Discard,
}

impl Write for BodySink {
    /// Never fails, so that the whole body is always read. A failed upload turns into a rejection.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            BodySink::Buffer(data) => data.extend_from_slice(buf),
            BodySink::Upload(upload) => if let Err(err) = upload.write_all(buf) {
                *self = BodySink::Rejected(err.into());
            },
            BodySink::Rejected(_) | BodySink::Discard => {}
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A router that calls a handler based on the method of a request.
/// Requests with a method that has no handler get a 405 response.
pub struct Router {
    routes: Vec<(Method, Route)>,
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Router {
        Router { routes: Vec::new() }
    }

    /// Calls the given function on requests with the given method, replacing any handler already
    /// registered for that method. The request body is read into memory first.
    pub fn on(&mut self, method: Method, handler: impl Fn(&Request) -> Result<Response, ServeError> + 'static + Send + Sync) {
        self.add(method, Route::Buffered(Box::new(handler)));
    }

    /// Streams the bodies of requests with the given method into uploads opened by the given
    /// function, replacing any handler already registered for that method.
    pub fn on_upload(&mut self, method: Method, opener: impl Fn(&Request) -> Result<Box<dyn Upload>, ServeError> + 'static + Send + Sync) {
        self.add(method, Route::Streamed(Box::new(opener)));
    }

    fn add(&mut self, method: Method, route: Route) {
        match self.routes.iter_mut().find(|(m, _)| *m == method) {
            Some((_, existing)) => *existing = route,
            None => self.routes.push((method, route))
        }
    }

    fn route(&self, method: &Method) -> Option<&Route> {
        self.routes.iter().find(|(m, _)| m == method).map(|(_, route)| route)
    }

    /// The methods with a handler, in the order they were first registered.
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.routes.iter().map(|(method, _)| method.clone()).collect()
    }

    /// Gets the sink for the body of a request, given its head.
    /// Uploads are opened here, before any of the body is read.
    pub fn open_body(&self, head: &Request) -> BodySink {
        match self.route(&head.method) {
            Some(Route::Streamed(open)) => match open(head) {
                Ok(upload) => BodySink::Upload(upload),
                Err(err) => BodySink::Rejected(err)
            },
            Some(Route::Buffered(_)) => BodySink::Buffer(vec![]),
            None => BodySink::Discard
        }
    }

    /// Gets the response to a request whose body has been read into the given sink.
    pub fn respond(&self, request: &mut Request, body: BodySink) -> Result<Response, ServeError> {
        match body {
            BodySink::Buffer(data) => {
                request.body = data;
                self.handle(request)
            }
            BodySink::Upload(upload) => upload.finish(),
            BodySink::Rejected(err) => Err(err),
            BodySink::Discard => self.handle(request)
        }
    }

    /// Calls the handler for the method of the given request, with the body already in memory.
    pub fn handle(&self, request: &Request) -> Result<Response, ServeError> {
        match self.route(&request.method) {
            Some(Route::Buffered(handler)) => handler(request),
            Some(Route::Streamed(open)) => {
                let mut upload = open(request)?;
                upload.write_all(&request.body)?;
                upload.finish()
            }
            None => Ok(self.method_not_allowed(&request.method))
        }
    }

    /// Creates the response for a request with a method that has no handler.
    fn method_not_allowed(&self, method: &Method) -> Response {
        let allowed = self.routes.iter()
            .map(|(method, _)| method.as_str())
            .collect::<Vec<&str>>()
            .join(", ");

        let mut response = Response::new(status::METHOD_NOT_ALLOWED, Body::Bytes(format!("Method {} not allowed.", method).into_bytes()));
        response.headers.add_header(ALLOW, allowed);
        response
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new()
    }
}
