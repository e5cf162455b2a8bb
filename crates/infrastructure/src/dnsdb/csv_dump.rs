//! HTTP surface for the DNSDB CSV dump (spec §4.2 `ServeCSVDump`, §6.1).
//! The method/route are an external convention (spec §1); this module
//! only owns the body/encoding/trailer semantics, wired up as an axum
//! handler because the rest of the pack's HTTP surfaces are axum-based.

use crate::dnsdb::engine::{write_csv, DnsDbEngine};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use std::io::Write as _;
use std::sync::Arc;
use tracing::warn;

/// Result of rotating the buffer and rendering it to CSV, optionally
/// gzip-compressed (spec §6.1 "on gzip negotiation"). Kept separate
/// from the axum handler so it can be unit-tested without a request.
pub struct CsvDumpOutcome {
    pub gzip: bool,
    pub body: Vec<u8>,
    /// Set when CSV or gzip encoding failed mid-stream (spec §4.2:
    /// "any write error is surfaced in the X-Error trailer").
    pub error: Option<String>,
}

pub fn render_csv_dump(engine: &DnsDbEngine, accept_encoding: Option<&str>) -> CsvDumpOutcome {
    let records = engine.rotate();
    let gzip = accept_encoding
        .map(|v| v.to_ascii_lowercase().contains("gzip"))
        .unwrap_or(false);

    let mut raw = Vec::new();
    let mut error = None;
    if let Err(err) = write_csv(&records, &mut raw) {
        error = Some(err.to_string());
    }

    let body = if gzip {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        if let Err(err) = encoder.write_all(&raw) {
            error.get_or_insert_with(|| err.to_string());
        }
        match encoder.finish() {
            Ok(bytes) => bytes,
            Err(err) => {
                error.get_or_insert_with(|| err.to_string());
                Vec::new()
            }
        }
    } else {
        raw
    };

    CsvDumpOutcome { gzip, body, error }
}

/// `POST /dnsdb/csv` handler (spec §6.1). Always responds 200: the
/// `X-Error` trailer, not the status line, carries mid-stream failures
/// since headers are already sent by the time an encoding error could
/// surface (spec §4.2 "Failure semantics").
pub async fn csv_dump_handler(
    State(engine): State<Arc<DnsDbEngine>>,
    headers: HeaderMap,
) -> Response {
    let accept_encoding = headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok());
    let outcome = render_csv_dump(&engine, accept_encoding);

    let mut trailers = HeaderMap::new();
    if let Some(err) = &outcome.error {
        warn!(error = %err, "dnsdb csv dump reported error via trailer");
        if let Ok(value) = HeaderValue::from_str(err) {
            trailers.insert("x-error", value);
        }
    }

    let body = Full::new(Bytes::from(outcome.body))
        .with_trailers(async move { if trailers.is_empty() { None } else { Some(Ok(trailers)) } });

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header("trailer", "X-Error");
    if outcome.gzip {
        builder = builder.header(header::CONTENT_ENCODING, "gzip");
    }

    match builder.body(Body::new(body)) {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
