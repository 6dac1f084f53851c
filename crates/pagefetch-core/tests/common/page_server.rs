//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one canned response to every request and records each request
//! head. A silent server accepts connections, reads the request and never
//! answers; it reports when the client closes the connection. A tunnel
//! server behaves like a proxy that accepts `CONNECT` and then goes silent.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Page {
    /// Status line after the protocol, e.g. "200 OK".
    pub status: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Page {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: "200 OK".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// How the server answers a request.
#[derive(Debug, Clone)]
enum Reply {
    Page(Page),
    Silent,
    Tunnel,
}

pub struct PageServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub url: String,
    requests: Receiver<String>,
    closed: Receiver<()>,
}

impl PageServer {
    /// Next recorded request head (request line and headers).
    pub fn next_request(&self) -> String {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("server saw no request")
    }

    /// True if a client closed its connection within `within`.
    pub fn saw_close(&self, within: Duration) -> bool {
        self.closed.recv_timeout(within).is_ok()
    }
}

/// Starts a server in a background thread answering every request with `page`.
/// The server runs until the process exits.
pub fn start(page: Page) -> PageServer {
    spawn(Reply::Page(page))
}

/// Starts a server that never sends a response.
pub fn start_silent() -> PageServer {
    spawn(Reply::Silent)
}

/// Starts a proxy that establishes every `CONNECT` tunnel and then never
/// forwards anything.
pub fn start_tunnel_proxy() -> PageServer {
    spawn(Reply::Tunnel)
}

fn spawn(reply: Reply) -> PageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let reply = Arc::new(reply);
    let (req_tx, requests) = mpsc::channel();
    let (closed_tx, closed) = mpsc::channel();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let reply = Arc::clone(&reply);
            let req_tx = req_tx.clone();
            let closed_tx = closed_tx.clone();
            thread::spawn(move || handle(stream, &reply, &req_tx, &closed_tx));
        }
    });
    PageServer {
        url: format!("http://127.0.0.1:{}/", port),
        requests,
        closed,
    }
}

fn handle(mut stream: TcpStream, reply: &Reply, requests: &Sender<String>, closed: &Sender<()>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(10)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let head = match read_head(&mut stream) {
        Some(h) => h,
        None => return,
    };
    let _ = requests.send(head);

    let page = match reply {
        Reply::Page(p) => p,
        Reply::Silent => return wait_for_close(stream, closed),
        Reply::Tunnel => {
            let _ = stream.write_all(b"HTTP/1.1 200 Connection established\r\n\r\n");
            let _ = stream.flush();
            return wait_for_close(stream, closed);
        }
    };

    let mut response = format!("HTTP/1.1 {}\r\n", page.status);
    for (name, value) in &page.headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        page.body.len()
    ));
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&page.body);
    let _ = stream.flush();
}

/// Swallow whatever the client sends until it hangs up.
fn wait_for_close(mut stream: TcpStream, closed: &Sender<()>) {
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => continue,
        }
    }
    let _ = closed.send(());
}

/// Read until the blank line ending the request head.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    Some(String::from_utf8_lossy(&data).into_owned())
}
