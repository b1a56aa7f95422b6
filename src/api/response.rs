// API response utility functions module

use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build a JSON response from any serializable body
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return build(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"error":"Internal server error"}"#.to_string(),
            );
        }
    };
    build(status, json)
}

/// Success response: `{"message": <message>}`
pub fn message_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    build(
        status,
        serde_json::json!({ "message": message }).to_string(),
    )
}

/// Failure response: `{"error": <detail>}`
pub fn error_response(status: StatusCode, detail: &str) -> Response<Full<Bytes>> {
    build(status, serde_json::json!({ "error": detail }).to_string())
}

/// 400 response for create/update bodies failing presence validation
pub fn incomplete_data() -> Response<Full<Bytes>> {
    error_response(StatusCode::BAD_REQUEST, "Incomplete data provided")
}

/// 404 Not Found response for non-matching routes
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// 413 Payload Too Large response
pub fn payload_too_large() -> Response<Full<Bytes>> {
    error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
}

fn build(status: StatusCode, json: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_message_response_body_and_shape() {
        let resp = message_response(StatusCode::CREATED, "Address created successfully");
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers()["Content-Type"].to_str().unwrap(),
            "application/json"
        );
        assert_eq!(
            body_string(resp).await,
            r#"{"message":"Address created successfully"}"#
        );
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let resp = error_response(StatusCode::INTERNAL_SERVER_ERROR, "disk I/O error");
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(resp).await, r#"{"error":"disk I/O error"}"#);
    }

    #[tokio::test]
    async fn test_incomplete_data_exact_body() {
        let resp = incomplete_data();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(resp).await,
            r#"{"error":"Incomplete data provided"}"#
        );
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }
}
