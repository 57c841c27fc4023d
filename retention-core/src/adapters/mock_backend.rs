//! Mock cashback backend for testing
//!
//! A tiny HTTP server on a background thread that answers the three endpoints
//! the client uses and records every request it sees:
//! - GET /user/me returns a fixed user (401 unless the token starts with `valid_`)
//! - POST /receipt returns { id: "receipt-N" } (or 409 when configured)
//! - POST /receipt/capture returns { ok: true }

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Mock backend server for testing
pub struct MockBackend {
    port: u16,
    running: Arc<AtomicBool>,
    shared: Arc<Shared>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Scenario switches for the mock
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Answer POST /receipt with 409 (QR already scanned)
    pub reject_receipts: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

/// A request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct Shared {
    requests: Mutex<Vec<RecordedRequest>>,
    receipts: AtomicUsize,
}

const USER_JSON: &str = r#"{
    "id": "user-1",
    "email": "user@example.com",
    "name": "Mock User",
    "avatar_url": "https://example.com/avatar.png",
    "balance": {
        "pending": "1234500000000000000000",
        "available": "1000000000000000000000000",
        "total": "1001234500000000000000000"
    }
}"#;

impl MockBackend {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let shared = Arc::new(Shared::default());

        // Non-blocking accept so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let shared_clone = Arc::clone(&shared);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let shared = Arc::clone(&shared_clone);
                        thread::spawn(move || handle_connection(stream, &cfg, &shared));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            shared,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, shared: &Shared) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(Duration::from_millis(config.delay_ms));
    }

    if let Ok(mut requests) = shared.requests.lock() {
        requests.push(request.clone());
    }

    let authorized = request
        .authorization
        .as_deref()
        .is_some_and(|a| a.starts_with("Bearer valid_"));
    if !authorized {
        send_response(&mut stream, 401, "Unauthorized", r#"{"message": "Invalid token"}"#);
        return;
    }

    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/user/me") => send_response(&mut stream, 200, "OK", USER_JSON),
        ("POST", "/receipt") if config.reject_receipts => send_response(
            &mut stream,
            409,
            "Conflict",
            r#"{"message": "Receipt already scanned"}"#,
        ),
        ("POST", "/receipt") => {
            let n = shared.receipts.fetch_add(1, Ordering::SeqCst) + 1;
            let body = format!(r#"{{"id": "receipt-{}"}}"#, n);
            send_response(&mut stream, 200, "OK", &body);
        }
        ("POST", "/receipt/capture") => send_response(&mut stream, 200, "OK", r#"{"ok": true}"#),
        _ => send_response(
            &mut stream,
            404,
            "Not Found",
            r#"{"error": "Endpoint not found"}"#,
        ),
    }
}

/// Read the request head and a Content-Length body
fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let mut authorization = None;
    let mut content_type = None;
    let mut content_length = 0usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim().to_ascii_lowercase().as_str() {
            "authorization" => authorization = Some(value),
            "content-type" => content_type = Some(value),
            "content-length" => content_length = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    while buffer.len() < head_end + content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let body_end = buffer.len().min(head_end + content_length);
    Some(RecordedRequest {
        method,
        path,
        authorization,
        content_type,
        body: String::from_utf8_lossy(&buffer[head_end..body_end]).to_string(),
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
