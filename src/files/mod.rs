use std::sync::Arc;

use crate::common::method::Method;
use crate::common::request::Request;
use crate::common::response::Response;
use crate::files::error::ServeError;
use crate::files::resolve::Resolver;
use crate::server::Router;

/// Errors returned by file handlers.
pub mod error;
/// Handlers for each supported method.
pub mod handlers;
/// Content types from file extensions.
pub mod mime;
/// Mapping of request targets to paths.
pub mod resolve;

type FileHandler = fn(&Resolver, &Request) -> Result<Response, ServeError>;

/// Creates the router that serves the base directory of the given resolver.
/// GET, PUT, DELETE and MKCOL are supported. Other methods get a 405 response.
/// PUT bodies are written to their file as they arrive.
pub fn file_router(resolver: Resolver) -> Router {
    let resolver = Arc::new(resolver);
    let mut router = Router::new();

    router.on(Method::GET, with_resolver(&resolver, handlers::get));

    let put_resolver = Arc::clone(&resolver);
    router.on_upload(Method::PUT, move |request| handlers::put(&put_resolver, request));

    router.on(Method::DELETE, with_resolver(&resolver, handlers::delete));
    router.on(Method::MKCOL, with_resolver(&resolver, handlers::mkcol));

    router
}

fn with_resolver(resolver: &Arc<Resolver>, handler: FileHandler) -> impl Fn(&Request) -> Result<Response, ServeError> + 'static + Send + Sync {
    let resolver = Arc::clone(resolver);
    move |request| handler(&resolver, request)
}
