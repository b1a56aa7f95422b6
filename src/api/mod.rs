// API module entry
// Routes address requests to handler functions

mod handlers;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::logger;
use crate::logger::AccessLogEntry;

/// Main entry point for HTTP request handling
///
/// Dispatches to handler functions based on request method and path, and
/// writes one access log line per request.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);

    let response = if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        resp
    } else {
        route_request(req, &state, &method, &path).await
    };

    if state.cached_access_log.load(Ordering::Relaxed) {
        let mut entry =
            AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.query = query;
        entry.status = response.status().as_u16();
        entry.body_bytes =
            usize::try_from(response.body().size_hint().exact().unwrap_or(0)).unwrap_or(0);
        entry.request_time_us =
            u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.format);
    }

    Ok(response)
}

/// Dispatch based on method and path
async fn route_request(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>> {
    match (method, path) {
        (&Method::POST, "/address") => handlers::handle_create(req, Arc::clone(state)).await,
        (&Method::GET, "/address") => handlers::handle_list(Arc::clone(state)).await,
        (&Method::GET, "/address/nearby") => {
            let query = req.uri().query().map(ToString::to_string);
            handlers::handle_nearby(query, Arc::clone(state)).await
        }
        // `/address/{id}` routes match integer segments only
        _ => match parse_id_segment(path) {
            Some(id) if *method == Method::PUT => {
                handlers::handle_update(req, Arc::clone(state), id).await
            }
            Some(id) if *method == Method::DELETE => {
                handlers::handle_delete(Arc::clone(state), id).await
            }
            _ => response::not_found(),
        },
    }
}

/// Parse the `{id}` segment of `/address/{id}`.
///
/// Only all-digit segments match, like a typed integer route parameter:
/// signs, non-digits, trailing segments, and out-of-range values are
/// non-matching routes, not handler errors.
fn parse_id_segment(path: &str) -> Option<i64> {
    let segment = path.strip_prefix("/address/")?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Validate the Content-Length header and reject oversized bodies with 413
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let size_str = content_length.to_str().ok()?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(response::payload_too_large())
        }
        _ => None,
    }
}
