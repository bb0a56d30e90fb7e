#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};

use tempfile::TempDir;

/// A request captured by [`serve_once`].
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Answers exactly one HTTP request on a loopback port with `status` and
/// `body`, then hands back what it received.
pub fn serve_once(status: &str, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let url = format!("http://{}/api/lead", listener.local_addr().expect("local addr"));
    let status = status.to_string();
    let body = body.to_string();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush response");
        request
    });

    (url, handle)
}

fn read_request(stream: &mut impl Read) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).expect("read request");
        assert!(read > 0, "connection closed before headers were complete");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).expect("read body");
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    CapturedRequest {
        head,
        body: String::from_utf8_lossy(&buffer[header_end..]).to_string(),
    }
}

/// Temporary `QUOTE_CORE_HOME` with a config pointing both forms at `endpoint`.
pub fn home_with_endpoint(endpoint: &str) -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    write_config(temp.path(), endpoint);
    temp
}

pub fn write_config(dir: &Path, endpoint: &str) {
    let config = serde_json::json!({
        "quote_endpoint": endpoint,
        "application_endpoint": endpoint,
        "fallback_phone": "(512) 555-0142",
        "http_timeout_secs": 5,
    });
    std::fs::write(dir.join("config.json"), config.to_string()).expect("write config");
}

/// Scripted answers for a complete, valid quote request.
pub const VALID_QUOTE_INPUTS: &[&str] = &[
    "Dana Whitfield",
    "Northgate Dental",
    "dana@northgate.example",
    "(512) 555-0188",
    "1200 Congress Ave",
    "Austin",
    "78701",
    "medical",
    "5,000",
    "weekly",
    "<BLANK>",
    "Front desk closes at 6pm",
    "yes",
];

pub fn script(extra: &[&str]) -> String {
    VALID_QUOTE_INPUTS
        .iter()
        .chain(extra.iter())
        .copied()
        .collect::<Vec<_>>()
        .join("|")
}
