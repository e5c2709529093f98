// ABOUTME: Live development server binding the request router to tiny_http
// ABOUTME: Handles one request at a time and shuts down cleanly on Ctrl+C

use crate::config::Config;
use crate::errors::{Result, SiteError};
use crate::metadata::MetadataStore;
use crate::router::{Reply, RequestRouter};
use crate::utils;
use anyhow::Context;
use log::{error, info};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Serve the course live until interrupted.
///
/// Course metadata is checked once up front so a broken setup fails at startup;
/// after that every request re-reads what it needs.
pub fn serve_site(config: Config) -> Result<()> {
    utils::validate_directory_exists(&config.slides_dir)?;
    MetadataStore::new(&config.slides_dir).load_course_metadata()?;

    let interface: IpAddr = config
        .interface
        .parse()
        .map_err(|e| SiteError::ConfigError(format!("Invalid interface {}: {}", config.interface, e)))?;
    let (server, addr) = try_bind_port(interface, config.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        info!("Shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    info!("Listening on http://{}/", addr);
    println!("Listening on http://{}/ (Press Ctrl+C to stop)", addr);

    let router = RequestRouter::new(config);
    for request in server.incoming_requests() {
        handle_request(&router, request);
    }

    Ok(())
}

fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    info!("Port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(SiteError::ServeError(format!(
        "Failed to bind after {} attempts starting at port {}: {}",
        max_retries,
        base_port,
        last_error.unwrap_or_default()
    )))
}

fn handle_request(router: &RequestRouter, request: Request) {
    let method = request.method().as_str().to_string();
    let url = request.url().to_string();

    let reply = router.handle(&method, &url);
    if let Err(e) = request.respond(to_response(reply)) {
        error!("Failed to send response for {}: {}", url, e);
    }
}

fn to_response(reply: Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    match Header::from_bytes("Content-Type", reply.content_type.as_bytes()) {
        Ok(header) => response.add_header(header),
        Err(()) => error!("Invalid content type header: {}", reply.content_type),
    }
    response
}
