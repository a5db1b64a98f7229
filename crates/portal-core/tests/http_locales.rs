use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use portal_core::config::{AppConfig, ContentConfig};
use portal_core::error::PortalError;
use portal_core::i18n::{
    HttpLocaleSource, LocaleSource, Translator, bundled_bundle, load_with_fallback,
};
use serde_json::json;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: String,
}

struct ServerHarness {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    stop: Arc<AtomicBool>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl ServerHarness {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log lock").clone()
    }
}

impl Drop for ServerHarness {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = TcpStream::connect(self.endpoint.strip_prefix("http://").unwrap_or_default());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut bytes = Vec::new();
    let mut buf = [0_u8; 2048];
    stream.set_read_timeout(Some(Duration::from_secs(2))).ok()?;
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => {
                bytes.extend_from_slice(&buf[..read]);
                if bytes.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    let head = String::from_utf8_lossy(&bytes).to_string();
    head.lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(ToOwned::to_owned)
}

fn write_response(stream: &mut TcpStream, route: &Route) {
    let reason = if route.status == 200 { "OK" } else { "Error" };
    let payload = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        route.body.len(),
        route.body
    );
    let _ = stream.write_all(payload.as_bytes());
    let _ = stream.flush();
}

/// Serves `routes` by path (query string ignored); unknown paths get a 404.
fn start_server(routes: HashMap<String, Route>) -> ServerHarness {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    listener
        .set_nonblocking(true)
        .expect("set nonblocking listener");

    let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));
    let stop = Arc::new(AtomicBool::new(false));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let stop_clone = Arc::clone(&stop);
    let requests_clone = Arc::clone(&requests);

    let join_handle = thread::spawn(move || {
        loop {
            if stop_clone.load(Ordering::SeqCst) {
                break;
            }
            match listener.accept() {
                Ok((mut stream, _addr)) => {
                    let _ = stream.set_nonblocking(false);
                    if let Some(path) = read_request_path(&mut stream) {
                        requests_clone
                            .lock()
                            .expect("request log lock")
                            .push(path.clone());
                        let bare = path.split('?').next().unwrap_or_default();
                        let route = routes.get(bare).cloned().unwrap_or(Route {
                            status: 404,
                            body: "{}".to_string(),
                        });
                        write_response(&mut stream, &route);
                    }
                }
                Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    ServerHarness {
        endpoint,
        requests,
        stop,
        join_handle: Some(join_handle),
    }
}

fn ok(body: serde_json::Value) -> Route {
    Route {
        status: 200,
        body: body.to_string(),
    }
}

fn content() -> ContentConfig {
    AppConfig::default().content
}

#[test]
fn remote_bundle_is_flattened() {
    let server = start_server(HashMap::from([(
        "/locales/de.json".to_string(),
        ok(json!({ "outerSquares": { "1": { "label": "Mannschaft" } } })),
    )]));
    let source = HttpLocaleSource::new(&server.endpoint, &content()).expect("client");

    let bundle = source.fetch("de").expect("fetch");
    assert_eq!(
        bundle.get("outerSquares.1.label").map(String::as_str),
        Some("Mannschaft")
    );
    assert_eq!(server.requests(), vec!["/locales/de.json".to_string()]);
}

#[test]
fn missing_file_is_an_http_status_error_and_falls_back() {
    let server = start_server(HashMap::new());
    let source = HttpLocaleSource::new(&server.endpoint, &content()).expect("client");

    match source.fetch("en") {
        Err(PortalError::HttpStatus { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/locales/en.json"), "{url}");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert_eq!(load_with_fallback(&source, "en"), bundled_bundle("en"));
}

#[test]
fn malformed_document_falls_back() {
    let server = start_server(HashMap::from([
        (
            "/locales/en.json".to_string(),
            Route {
                status: 200,
                body: "{ not json".to_string(),
            },
        ),
        ("/locales/de.json".to_string(), ok(json!(["not", "an", "object"]))),
    ]));
    let source = HttpLocaleSource::new(&server.endpoint, &content()).expect("client");

    assert!(source.fetch("en").is_err());
    assert!(source.fetch("de").is_err());
    assert_eq!(load_with_fallback(&source, "de"), bundled_bundle("de"));
}

#[test]
fn disabled_cache_adds_timestamp_query() {
    let server = start_server(HashMap::from([(
        "/fileadmin/locales/en.json".to_string(),
        ok(json!({ "greeting": "ahoy" })),
    )]));
    let mut content = content();
    content.locales_path = "/fileadmin/locales".to_string();
    content.cache_duration = 0;
    let source = HttpLocaleSource::new(&server.endpoint, &content).expect("client");

    let bundle = load_with_fallback(&source, "en");
    assert_eq!(bundle.get("greeting").map(String::as_str), Some("ahoy"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("/fileadmin/locales/en.json?t="), "{requests:?}");
}

#[test]
fn unreachable_host_falls_back_to_bundled_copy() {
    let endpoint = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        format!("http://{}", listener.local_addr().expect("addr"))
    };
    let source = HttpLocaleSource::new(&endpoint, &content()).expect("client");
    assert_eq!(load_with_fallback(&source, "de"), bundled_bundle("de"));
}

#[test]
fn fetched_bundle_overrides_bundled_text_in_translator() {
    let server = start_server(HashMap::from([(
        "/locales/de.json".to_string(),
        ok(json!({ "outerSquares": { "1": { "label": "Ferne Crew" } } })),
    )]));
    let config = AppConfig::default();
    let source = HttpLocaleSource::new(&server.endpoint, &config.content).expect("client");
    let mut translator = Translator::new(&config.content, "de");

    translator.install("de", load_with_fallback(&source, "de"));
    assert_eq!(translator.t("outerSquares.1.label"), "Ferne Crew");
    // Keys the remote bundle lacks resolve through the fallback language.
    assert_eq!(translator.t("outerSquares.2.label"), "Ship");
}
