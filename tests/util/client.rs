use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// A response as read off the wire.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Gets the first value of the given header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A client that keeps one connection open for all of its requests.
pub struct Client {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Client {
    pub fn connect(addr: &str) -> Client {
        let stream = TcpStream::connect(addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        Client { stream, reader }
    }

    /// Sends a request with the given body and waits for the response.
    pub fn send(&mut self, method: &str, uri: &str, body: &[u8]) -> RawResponse {
        self.write_request(method, uri, body);
        self.read_response()
    }

    /// Sends a request without waiting for the response.
    pub fn write_request(&mut self, method: &str, uri: &str, body: &[u8]) {
        let head = format!("{} {} HTTP/1.1\r\nhost: localhost\r\ncontent-length: {}\r\n\r\n", method, uri, body.len());
        self.write_raw(head.as_bytes());
        self.write_raw(body);
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).unwrap();
    }

    /// Reads one response. Bodies are read according to the content length, if any.
    pub fn read_response(&mut self) -> RawResponse {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        let status = line.split(' ').nth(1).unwrap().parse().unwrap();

        let mut headers = vec![];
        loop {
            line.clear();
            self.reader.read_line(&mut line).unwrap();
            if line == "\r\n" {
                break;
            }
            let (name, value) = line.trim_end().split_once(": ").unwrap();
            headers.push((name.to_string(), value.to_string()));
        }

        let mut response = RawResponse { status, headers, body: vec![] };
        let len: usize = response.header("content-length").map(|len| len.parse().unwrap()).unwrap_or(0);
        response.body = vec![0; len];
        self.reader.read_exact(&mut response.body).unwrap();
        response
    }

    /// Reads until the server closes the connection.
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let mut rest = vec![];
        self.reader.read_to_end(&mut rest).unwrap();
        rest
    }
}
