//! HTTP adapters for the vector store, plus shared error handling for ureq calls.

mod qdrant_store;

pub use qdrant_store::QdrantVectorStore;

/// Upper bound on error-body bytes echoed into logs and error messages.
const MAX_ERROR_BODY: usize = 512;

/// Render a ureq failure as a single line suitable for a domain error.
pub fn describe_http_error(error: ureq::Error) -> String {
    match error {
        ureq::Error::Status(code, response) => {
            let status_text = response.status_text().to_string();
            match response.into_string() {
                Ok(body) if !body.trim().is_empty() => {
                    let body: String = body.chars().take(MAX_ERROR_BODY).collect();
                    format!("HTTP {code} {status_text}: {}", body.trim())
                }
                _ => format!("HTTP {code} {status_text}"),
            }
        }
        ureq::Error::Transport(transport) => format!("transport error: {transport}"),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Accept a single connection on an ephemeral port and answer it with a
    /// canned JSON response. The join handle yields the raw request text.
    pub fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept connection");
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .expect("set read timeout");
            let request = read_request(&mut stream);
            let reason = if status < 400 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            request
        });

        (format!("http://{addr}"), handle)
    }

    /// Accept a single connection and never answer it. The thread returns once
    /// the client hangs up or after five seconds.
    pub fn serve_silent() -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept connection");
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .expect("set read timeout");
            let mut sink = [0u8; 4096];
            while matches!(stream.read(&mut sink), Ok(read) if read > 0) {}
        });

        (format!("http://{addr}"), handle)
    }

    /// Address nothing listens on, for connection-refused paths.
    pub fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{addr}")
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = stream.read(&mut chunk).unwrap_or(0);
            if read == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..read]);

            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
