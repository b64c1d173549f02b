//! Minimal HTTP/1.1 serving loop
//!
//! One connection is handled at a time: read the request line, the headers
//! and a `Content-Length` body, answer, close. Connection-level failures are
//! answered with 400 or dropped; they never stop the loop.

use crate::web::WebResponse;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

const READ_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_BODY: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    /// Path plus any query string, as sent
    pub target: String,
    pub body: String,
}

/// Serve until `limit` requests were answered (forever when `None`).
pub fn serve<F>(listener: &TcpListener, limit: Option<usize>, mut handle: F) -> io::Result<()>
where
    F: FnMut(&Request) -> WebResponse,
{
    let mut served = 0;
    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(_) => continue,
        };
        let response = match read_request(&stream) {
            Ok(request) => handle(&request),
            Err(_) => WebResponse::text(400, "Bad Request"),
        };
        // The client may already be gone
        let _ = write_response(&mut stream, &response);

        served += 1;
        if limit.is_some_and(|max| served >= max) {
            break;
        }
    }
    Ok(())
}

fn read_request(stream: &TcpStream) -> io::Result<Request> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "malformed request line"));
    };

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length.min(MAX_BODY)];
    reader.read_exact(&mut body)?;

    Ok(Request {
        method: method.to_ascii_uppercase(),
        target: target.to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn write_response(stream: &mut TcpStream, response: &WebResponse) -> io::Result<()> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        response.content_type,
        response.body.len()
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(response.body.as_bytes())?;
    stream.flush()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
