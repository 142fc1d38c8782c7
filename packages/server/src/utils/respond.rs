use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::media::MediaStore;
use tokio_util::io::ReaderStream;

use crate::error::AppError;

/// Stream a stored media object as an HTTP response.
///
/// Object names embed a content digest, so the name itself is a valid ETag:
/// a changed picture gets a new name and old caches miss naturally.
pub async fn media_response(
    media: &dyn MediaStore,
    object_name: &str,
    serve_as: &str,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let etag_value = format!("\"{object_name}\"");
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let size = media.size(object_name).await?;
    let reader = media.open(object_name).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(serve_as)
        .first()
        .map_or_else(|| "application/octet-stream".to_string(), |m| m.to_string());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(serve_as),
        )
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

/// Build a safe `Content-Disposition` header value.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    format!("inline; filename=\"{ascii_name}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_strips_unsafe_characters() {
        assert_eq!(
            content_disposition_value("por\"tra;it.jpg"),
            "inline; filename=\"portrait.jpg\""
        );
    }

    #[test]
    fn disposition_falls_back_for_empty_names() {
        assert_eq!(
            content_disposition_value("\"\""),
            "inline; filename=\"download\""
        );
    }
}
