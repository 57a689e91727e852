use anyhow::Context;
use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

use crate::ids::RequestId;
use crate::mux::HandlerRequest;

/// Extract a [`HandlerRequest`] from a raw `may_minihttp::Request`.
///
/// The query string is stripped from the path (the mux matches on the bare
/// path), header names are lowercased, and the body is kept as the raw
/// string so that decoding stays with the handler. A request id is taken
/// from `x-request-id` when the client sent a valid one, otherwise minted.
pub fn parse_request(req: Request) -> anyhow::Result<HandlerRequest> {
    let method = req
        .method()
        .parse()
        .with_context(|| format!("invalid HTTP method '{}'", req.method()))?;
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let id = RequestId::from_header_or_new(headers.get("x-request-id").map(String::as_str));

    let body = {
        let mut body_str = String::new();
        match req.body().read_to_string(&mut body_str) {
            Ok(size) if size > 0 => Some(body_str),
            Ok(_) => None,
            Err(err) => return Err(err).context("error reading request body"),
        }
    };

    debug!(
        request_id = %id,
        method = %method,
        path = %path,
        header_count = headers.len(),
        body_bytes = body.as_ref().map_or(0, String::len),
        "HTTP request parsed"
    );

    Ok(HandlerRequest {
        id,
        method,
        path,
        headers,
        body,
    })
}
