//! Mock Frankfurter server for testing
//!
//! Serves every request with one canned response, so the HTTP client can be
//! exercised without the network.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// What the server answers with
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with `{"base":"EUR","rates":{...}}`
    Rates(Vec<(&'static str, f64)>),
    /// Error status with an empty JSON object
    Status(u16),
    /// 200 with a raw body
    Body(String),
}

pub struct MockFrankfurterServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockFrankfurterServer {
    /// Start on a random free port
    pub fn start(response: MockResponse) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        // Non-blocking so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let response = response.clone();
                        thread::spawn(move || handle_connection(stream, &response));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Full endpoint URL, including the query the real API expects
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/latest?from=EUR", self.port)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockFrankfurterServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, response: &MockResponse) {
    // Accepted sockets can inherit non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 4096];
    if stream.read(&mut buffer).is_err() {
        return;
    }

    match response {
        MockResponse::Rates(rates) => {
            let rates: serde_json::Map<String, serde_json::Value> = rates
                .iter()
                .map(|(code, rate)| (code.to_string(), serde_json::json!(rate)))
                .collect();
            let body = serde_json::json!({
                "amount": 1.0,
                "base": "EUR",
                "date": "2025-01-10",
                "rates": rates,
            });
            send_response(&mut stream, 200, "OK", &body.to_string());
        }
        MockResponse::Status(status) => {
            send_response(&mut stream, *status, "Error", "{}");
        }
        MockResponse::Body(body) => {
            send_response(&mut stream, 200, "OK", body);
        }
    }
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
