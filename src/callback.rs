// src/callback.rs
//! One-shot blocking HTTP listener for the sign-in redirect.
//!
//! Serves loopback requests until one carries the expected query
//! parameter, answers it with a small HTML page, and hands the value to
//! the caller through a rendezvous channel. Intentionally limited
//! surface: one request per connection, no keep-alive, headers only.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;

use log::{debug, warn};

use crate::error::DrError;

/// Query parameter carrying the API key on the redirect.
pub const KEY_PARAM: &str = "apiKey";

/// Maximum header section size (8 KiB); redirects are tiny.
const MAX_HEADER_SIZE: usize = 8 * 1024;

const SUCCESS_PAGE: &str = "<!DOCTYPE html>\n<html>\n  <head><title>DataRobot CLI</title></head>\n  <body>\n    <p>Sign-in complete. You can close this tab and return to the terminal.</p>\n  </body>\n</html>\n";

pub struct CallbackServer {
  listener: TcpListener,
}

impl CallbackServer {
  /// Binds the loopback listener. This happens before the browser opens
  /// so the redirect always has somewhere to land.
  pub fn bind(port: u16) -> Result<Self, DrError> {
    let listener = TcpListener::bind(("127.0.0.1", port))
      .map_err(|source| DrError::CallbackBind { port, source })?;
    Ok(CallbackServer { listener })
  }

  /// Port actually bound (needed when binding port 0 in tests).
  pub fn local_port(&self) -> std::io::Result<u16> {
    Ok(self.listener.local_addr()?.port())
  }

  /// Serves requests until one carries the key, then shuts down.
  ///
  /// The accept loop runs on a background thread and hands the key over
  /// through a single-slot rendezvous channel; the thread, and with it
  /// the listener, exits right after the handoff.
  pub fn wait_for_key(self) -> Result<String, DrError> {
    let (tx, rx) = mpsc::sync_channel::<String>(0);
    let listener = self.listener;
    let handle = thread::spawn(move || {
      for stream in listener.incoming() {
        let mut stream = match stream {
          Ok(s) => s,
          Err(e) => {
            warn!("Failed to accept callback connection: {}", e);
            continue;
          }
        };
        if let Some(key) = serve_connection(&mut stream) {
          if tx.send(key).is_err() {
            warn!("Sign-in flow went away before the key could be delivered.");
          }
          break;
        }
      }
    });

    let key = rx.recv().map_err(|_| DrError::CallbackClosed);
    let _ = handle.join();
    key
  }
}

/// Handles one connection; returns the key if this request carried it.
fn serve_connection(stream: &mut TcpStream) -> Option<String> {
  match read_request_path(stream) {
    None => None,
    Some(Err(reason)) => {
      debug!("Rejecting malformed callback request: {}", reason);
      write_response(stream, 400, "Bad Request", "Bad request.\n");
      None
    }
    Some(Ok(path)) => match extract_key(&path) {
      Some(key) => {
        debug!(
          "Received sign-in key on path {}",
          path.split('?').next().unwrap_or("/")
        );
        write_response(stream, 200, "OK", SUCCESS_PAGE);
        Some(key)
      }
      None => {
        // Browsers probe for favicons and the like; keep waiting.
        debug!("Callback request without {} parameter: {}", KEY_PARAM, path);
        write_response(stream, 404, "Not Found", "Waiting for sign-in redirect.\n");
        None
      }
    },
  }
}

/// Reads one request's header section and returns the request path.
///
/// Returns None if the connection closed before a complete request was
/// received. Returns Some(Err) for malformed requests.
fn read_request_path(stream: &mut impl Read) -> Option<Result<String, String>> {
  let mut header_buf = Vec::with_capacity(1024);
  let mut byte = [0u8; 1];

  loop {
    match stream.read(&mut byte) {
      Ok(0) => {
        if header_buf.is_empty() {
          return None; // clean close
        }
        return Some(Err("Connection closed mid-request".to_string()));
      }
      Ok(_) => {
        header_buf.push(byte[0]);
        if header_buf.len() > MAX_HEADER_SIZE {
          return Some(Err("Headers too large".to_string()));
        }
        // Check for end of headers (\r\n\r\n)
        if header_buf.len() >= 4 && header_buf[header_buf.len() - 4..] == *b"\r\n\r\n" {
          break;
        }
      }
      Err(e) => {
        if header_buf.is_empty() {
          return None; // read error on fresh connection = closed
        }
        return Some(Err(format!("Read error: {}", e)));
      }
    }
  }

  let mut parsed_headers = [httparse::EMPTY_HEADER; 32];
  let mut req = httparse::Request::new(&mut parsed_headers);
  match req.parse(&header_buf) {
    Ok(httparse::Status::Complete(_)) => {}
    Ok(httparse::Status::Partial) => {
      return Some(Err("Incomplete HTTP request".to_string()));
    }
    Err(e) => {
      return Some(Err(format!("HTTP parse error: {}", e)));
    }
  }

  Some(Ok(req.path.unwrap_or("/").to_string()))
}

/// Pulls the key out of a request path's query string. Any path is
/// accepted; only the parameter name matters.
pub fn extract_key(path: &str) -> Option<String> {
  let (_, query) = path.split_once('?')?;
  for pair in query.split('&') {
    if let Some((name, value)) = pair.split_once('=') {
      if name == KEY_PARAM && !value.is_empty() {
        return Some(value.to_string());
      }
    }
  }
  None
}

fn write_response(stream: &mut impl Write, status: u16, reason: &str, body: &str) {
  let mut response = format!("HTTP/1.1 {} {}\r\n", status, reason);
  response.push_str("Content-Type: text/html; charset=utf-8\r\n");
  response.push_str(&format!("Content-Length: {}\r\n", body.len()));
  response.push_str("Connection: close\r\n\r\n");
  response.push_str(body);
  // Write errors are ignored (the browser may have disconnected already).
  let _ = stream.write_all(response.as_bytes());
  let _ = stream.flush();
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn parse_request_path_with_query() {
    let raw = b"GET /callback?apiKey=abc HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let mut stream = Cursor::new(raw.to_vec());
    let path = read_request_path(&mut stream).unwrap().unwrap();
    assert_eq!(path, "/callback?apiKey=abc");
  }

  #[test]
  fn empty_stream_returns_none() {
    let mut stream = Cursor::new(Vec::<u8>::new());
    assert!(read_request_path(&mut stream).is_none());
  }

  #[test]
  fn truncated_request_is_an_error() {
    let raw = b"GET /callback HTTP/1.1\r\nHost: local";
    let mut stream = Cursor::new(raw.to_vec());
    let result = read_request_path(&mut stream).unwrap();
    assert!(result.is_err());
  }

  #[test]
  fn oversized_headers_are_rejected() {
    let huge = format!(
      "GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n",
      "A".repeat(MAX_HEADER_SIZE)
    );
    let mut stream = Cursor::new(huge.into_bytes());
    let result = read_request_path(&mut stream).unwrap();
    assert!(result.unwrap_err().contains("too large"));
  }

  #[test]
  fn key_is_extracted_from_any_path() {
    assert_eq!(extract_key("/?apiKey=k-123"), Some("k-123".to_string()));
    assert_eq!(
      extract_key("/some/deep/path?apiKey=k-456"),
      Some("k-456".to_string())
    );
    assert_eq!(
      extract_key("/cb?foo=bar&apiKey=k-789&baz=1"),
      Some("k-789".to_string())
    );
  }

  #[test]
  fn missing_or_empty_key_yields_nothing() {
    assert_eq!(extract_key("/favicon.ico"), None);
    assert_eq!(extract_key("/cb?foo=bar"), None);
    assert_eq!(extract_key("/cb?apiKey="), None);
  }

  #[test]
  fn response_carries_status_and_body() {
    let mut buf = Vec::new();
    write_response(&mut buf, 200, "OK", "hello");
    let output = String::from_utf8(buf).unwrap();
    assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(output.contains("Content-Length: 5\r\n"));
    assert!(output.contains("Connection: close\r\n"));
    assert!(output.ends_with("hello"));
  }

  #[test]
  fn end_to_end_loopback_handoff() {
    let server = CallbackServer::bind(0).unwrap();
    let port = server.local_port().unwrap();

    let client = std::thread::spawn(move || {
      // First request carries no key: the listener answers 404 and keeps
      // waiting for the real redirect.
      let mut probe = TcpStream::connect(("127.0.0.1", port)).unwrap();
      probe
        .write_all(b"GET /favicon.ico HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .unwrap();
      let mut response = String::new();
      probe.read_to_string(&mut response).unwrap();
      assert!(response.starts_with("HTTP/1.1 404"));

      let mut redirect = TcpStream::connect(("127.0.0.1", port)).unwrap();
      redirect
        .write_all(b"GET /cb?apiKey=test-key-42 HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .unwrap();
      let mut response = String::new();
      redirect.read_to_string(&mut response).unwrap();
      assert!(response.starts_with("HTTP/1.1 200"));
      assert!(response.contains("close this tab"));
    });

    let key = server.wait_for_key().unwrap();
    assert_eq!(key, "test-key-42");
    client.join().unwrap();
  }
}
