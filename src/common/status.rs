/// An HTTP status.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Status {
    /// The status code.
    pub code: u16,
    /// The reason phrase sent after the code.
    pub reason: &'static str,
}

macro_rules! status_codes {
    (
        $(
            $(#[$docs:meta])*
            ($name:ident, $num:literal, $phrase:literal);
        )+
    ) => {
        $(
            $(#[$docs])*
            pub const $name: Status = Status { code: $num, reason: $phrase };
        )+

        impl Status {
            /// Gets the status from the given status code, if the code is one this server knows.
            pub fn from_code(code: u16) -> Option<Status> {
                match code {
                    $(
                    $num => Some($name),
                    )+
                    _ => None
                }
            }
        }
    }
}

status_codes! {
    (OK, 200, "OK");
    /// Sent by PUT, DELETE and MKCOL on success.
    (NO_CONTENT, 204, "No Content");
    (BAD_REQUEST, 400, "Bad Request");
    /// The request path escapes the served directory.
    (FORBIDDEN, 403, "Forbidden");
    (NOT_FOUND, 404, "Not Found");
    (METHOD_NOT_ALLOWED, 405, "Method Not Allowed");
    (PAYLOAD_TOO_LARGE, 413, "Payload Too Large");
    (INTERNAL_SERVER_ERROR, 500, "Internal Server Error");
    (HTTP_VERSION_NOT_SUPPORTED, 505, "HTTP Version Not Supported");
}
