use actix_web::{
    http::header::{CACHE_CONTROL, HeaderName},
    web::Bytes,
    HttpResponse, HttpResponseBuilder,
};
use futures::Stream;

pub const BATCH_ID_HEADER: &str = "X-Batch-Id";

/// Frames `payload` as one SSE message. Multi-line payloads become several
/// `data:` lines of the same message.
pub fn data_frame(payload: &str) -> Bytes {
    frame(None, payload)
}

pub fn event_frame(event: &str, payload: &str) -> Bytes {
    frame(Some(event), payload)
}

fn frame(event: Option<&str>, payload: &str) -> Bytes {
    let mut chunk = String::with_capacity(payload.len() + 16);
    if let Some(event) = event {
        chunk.push_str("event: ");
        chunk.push_str(event);
        chunk.push('\n');
    }
    for line in payload.split('\n') {
        chunk.push_str("data: ");
        chunk.push_str(line.strip_suffix('\r').unwrap_or(line));
        chunk.push('\n');
    }
    chunk.push('\n');
    Bytes::from(chunk)
}

pub fn event_stream<S>(mut builder: HttpResponseBuilder, frames: S) -> HttpResponse
where
    S: Stream<Item = Result<Bytes, actix_web::Error>> + 'static,
{
    builder
        .content_type("text/event-stream")
        .insert_header((CACHE_CONTROL, "no-cache"))
        .insert_header((HeaderName::from_static("x-accel-buffering"), "no"))
        .streaming(frames)
}
