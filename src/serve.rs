//! A development file server for the destination tree, built on `tiny_http`.
//! Requests are handled one at a time on the calling thread; a failed request
//! is reported to the client and logged, and the server keeps running.

use crate::url::normalize;
use anyhow::{anyhow, Result};
use log::{error, info};
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Serves files under `root` on `127.0.0.1:{port}`. Blocks forever unless the
/// server can't bind.
pub fn serve(root: &Path, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let server = Server::http(addr).map_err(|e| anyhow!("Listening on {}: {}", addr, e))?;
    info!("Listen [localhost:{}]", port);

    for request in server.incoming_requests() {
        if let Err(e) = handle(request, root) {
            error!("ERROR {}", e);
        }
    }
    Ok(())
}

fn handle(request: Request, root: &Path) -> io::Result<()> {
    let path = resolve(root, request.url());
    match File::open(&path) {
        Ok(file) => {
            info!("{}", path.display());
            let mut response = Response::from_file(file);
            if let Ok(header) = Header::from_bytes("Content-Type", content_type(&path)) {
                response.add_header(header);
            }
            request.respond(response)
        }
        Err(e) => {
            error!("ERROR {}: {}", path.display(), e);
            let response =
                Response::from_string(format!("ERROR {}", e)).with_status_code(StatusCode(404));
            request.respond(response)
        }
    }
}

// Maps a request URL onto a file under `root`. Dot segments are dropped so
// requests can't escape `root`; directories resolve to their `index.html`.
fn resolve(root: &Path, url: &str) -> PathBuf {
    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or("");
    let mut resolved = root.to_owned();
    for segment in normalize(path).split('/').filter(|s| !s.is_empty()) {
        resolved.push(segment);
    }
    if resolved.is_dir() {
        resolved.push("index.html");
    }
    resolved
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") | Some("md") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
