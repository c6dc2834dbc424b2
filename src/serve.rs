//! Development server with live reload.
//!
//! A small `tiny_http` server over the output directory:
//!
//! - `/` serves `index.html`, `/closures` falls back to `closures.html`
//! - `GET /__codewalk/generation` returns the current build generation
//! - HTML responses get a polling script injected before `</body>`; it reloads
//!   the page when the generation changes
//! - Ctrl+C unblocks the request loop and exits cleanly
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Watcher Thread  │
//! │  (HTTP Server)  │     │ (watch::watch_*) │
//! └────────┬────────┘     └────────┬─────────┘
//!          │  reads                │ bumps
//!          └──────▶ LiveReload ◀───┘
//! ```

use crate::config::SiteConfig;
use crate::watch::{self, LiveReload};
use std::fs;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Path browsers poll for the build generation.
pub const GENERATION_PATH: &str = "/__codewalk/generation";

const RELOAD_JS: &str = include_str!("../static/reload.js");

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Invalid interface address {0:?}")]
    Interface(String),
    #[error("Failed to bind after {attempts} attempts (ports {first}-{last}): {message}")]
    Bind {
        attempts: u16,
        first: u16,
        last: u16,
        message: String,
    },
    #[error("Failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Serving options from the command line.
#[derive(Debug, Clone, Copy)]
pub struct ServeOptions {
    /// Overrides `serve.port` from the config.
    pub port: Option<u16>,
    pub watch: bool,
}

/// Serve the already-built output directory until Ctrl+C.
pub fn serve(config: &SiteConfig, options: ServeOptions) -> Result<(), ServeError> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .map_err(|_| ServeError::Interface(config.serve.interface.clone()))?;
    let port = options.port.unwrap_or(config.serve.port);

    let (server, addr) = try_bind_port(interface, port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        tracing::info!("Shutting down");
        server_for_signal.unblock();
    })?;

    let reload = LiveReload::new();
    if options.watch {
        let watch_config = config.clone();
        let watch_reload = reload.clone();
        std::thread::spawn(move || {
            if let Err(e) = watch::watch_blocking(&watch_config, watch_reload) {
                tracing::error!(error = %e, "File watcher stopped");
            }
        });
    }

    println!("Serving {} at http://{}", config.output_dir().display(), addr);

    let root = config.output_dir();
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &root, &reload) {
            tracing::warn!(error = %e, "Request error");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr), ServeError> {
    let mut last_error = String::new();
    let mut last_port = base_port;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    tracing::warn!(base_port, port, "Port in use, using next free port");
                }
                return Ok((server, addr));
            }
            Err(e) => {
                last_error = e.to_string();
                last_port = port;
            }
        }
    }
    Err(ServeError::Bind {
        attempts: max_retries,
        first: base_port,
        last: last_port,
        message: last_error,
    })
}

// ============================================================================
// Request Handling
// ============================================================================

fn handle_request(request: Request, root: &Path, reload: &LiveReload) -> io::Result<()> {
    let url = request.url().to_string();
    let path = url.split(['?', '#']).next().unwrap_or("");

    if path == GENERATION_PATH {
        let response = Response::from_string(reload.current().to_string())
            .with_header(header("Content-Type", "text/plain; charset=utf-8")?)
            .with_header(header("Cache-Control", "no-store")?);
        return request.respond(response);
    }

    match resolve(root, path) {
        Some(file) => serve_file(request, &file, reload.current()),
        None => serve_not_found(request),
    }
}

/// Map a request path to a file under `root`.
///
/// Resolution order: exact file, directory `index.html`, then `<path>.html`
/// for extensionless paths. Paths that try to leave `root` resolve to nothing.
fn resolve(root: &Path, url_path: &str) -> Option<PathBuf> {
    let rel = url_path.trim_matches('/');
    if Path::new(rel)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let candidate = root.join(rel);
    if candidate.is_file() {
        return Some(candidate);
    }
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.is_file().then_some(index);
    }
    if Path::new(rel).extension().is_none() {
        let html = root.join(format!("{rel}.html"));
        if html.is_file() {
            return Some(html);
        }
    }
    None
}

// ============================================================================
// Response Helpers
// ============================================================================

fn header(field: &str, value: &str) -> io::Result<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes())
        .map_err(|()| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid header {field}")))
}

/// Serve a file with appropriate content type; HTML gets the reload script.
fn serve_file(request: Request, path: &Path, generation: u64) -> io::Result<()> {
    let content = fs::read(path)?;
    let content_type = guess_content_type(path);

    let body = if content_type.starts_with("text/html") {
        match String::from_utf8(content) {
            Ok(html) => inject_reload_script(&html, generation).into_bytes(),
            Err(e) => e.into_bytes(),
        }
    } else {
        content
    };

    let response = Response::from_data(body)
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-cache")?);
    request.respond(response)
}

fn serve_not_found(request: Request) -> io::Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(StatusCode(404))
        .with_header(header("Content-Type", "text/plain; charset=utf-8")?);
    request.respond(response)
}

/// Insert the polling script before the last `</body>`, or append it.
fn inject_reload_script(html: &str, generation: u64) -> String {
    let script = format!(
        "<script>{}</script>",
        RELOAD_JS.replace("__GENERATION__", &generation.to_string())
    );
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], script, &html[pos..]),
        None => format!("{html}{script}"),
    }
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        _ => "application/octet-stream",
    }
}
