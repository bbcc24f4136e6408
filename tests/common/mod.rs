#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use sirene_client::auth::Authenticator;
use sirene_client::config::Settings;

pub const SIREN: &str = "497784454";
pub const SIRET: &str = "49778445400041";
pub const API_PREFIX: &str = "/api-sirene/3.11";

const NOT_FOUND_BODY: &str = r#"{"header":{"statut":404,"message":"Aucun élément trouvé"}}"#;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

type Routes = HashMap<(String, String), (u16, String)>;

/// Minimal HTTP/1.1 server answering canned responses, one connection at a time.
/// Unrouted requests get a 404.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn start(routes: &[(&str, &str, u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let routes: Routes = routes
            .iter()
            .map(|(method, path, status, body)| {
                ((method.to_string(), path.to_string()), (*status, body.to_string()))
            })
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = handle(stream, &routes, &recorded);
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn base_url(&self) -> String {
        format!("{}{}", self.url(), API_PREFIX)
    }

    pub fn token_url(&self) -> String {
        format!("{}/token", self.url())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Status",
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &Routes,
    requests: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;

    let (status, payload) = routes
        .get(&(method.clone(), path.clone()))
        .cloned()
        .unwrap_or((404, NOT_FOUND_BODY.to_string()));

    requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        payload.len(),
        payload
    )?;
    stream.flush()
}

/// `http://` URL of a local port that was bound and released, so connections are refused.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway port");
    let addr = listener.local_addr().expect("throwaway address");
    drop(listener);
    format!("http://{}", addr)
}

pub fn siren_path() -> String {
    format!("{}/siren/{}", API_PREFIX, SIREN)
}

pub fn siret_path() -> String {
    format!("{}/siret/{}", API_PREFIX, SIRET)
}

pub fn settings(server: &StubServer, authenticator: Authenticator, output: &Path) -> Settings {
    Settings {
        authenticator,
        siren: SIREN.parse().unwrap(),
        siret: SIRET.parse().unwrap(),
        base_url: server.base_url(),
        output: output.to_path_buf(),
    }
}
