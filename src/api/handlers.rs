// Address endpoint handlers module

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::response::{error_response, incomplete_data, json_response, message_response};
use super::types::{AddressPayload, NearbyQuery, NewAddress};
use crate::config::AppState;
use crate::logger;
use crate::store::{AddressStore, StoreError};

/// `POST /address`: insert a new record
pub async fn handle_create(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    match read_and_validate(req).await {
        Ok(new) => create_address(state, new).await,
        Err(resp) => resp,
    }
}

/// `PUT /address/{id}`: full-replace the record matching `id`
pub async fn handle_update(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    id: i64,
) -> Response<Full<Bytes>> {
    match read_and_validate(req).await {
        Ok(new) => update_address(state, id, new).await,
        Err(resp) => resp,
    }
}

async fn create_address(state: Arc<AppState>, new: NewAddress) -> Response<Full<Bytes>> {
    match run_store(&state, move |store| {
        store.create(&new.address, new.latitude, new.longitude)
    })
    .await
    {
        Ok(_id) => message_response(StatusCode::CREATED, "Address created successfully"),
        Err(e) => storage_failure(&e),
    }
}

/// A non-matching id is reported as success: update-by-id is a no-op on a
/// miss, not an error. The store still returns the affected-row count for
/// callers that want to distinguish.
async fn update_address(state: Arc<AppState>, id: i64, new: NewAddress) -> Response<Full<Bytes>> {
    match run_store(&state, move |store| {
        store.update(id, &new.address, new.latitude, new.longitude)
    })
    .await
    {
        Ok(_affected) => message_response(
            StatusCode::OK,
            &format!("Address with id {id} updated successfully"),
        ),
        Err(e) => storage_failure(&e),
    }
}

/// `DELETE /address/{id}`: same silent-miss semantics as update
pub async fn handle_delete(state: Arc<AppState>, id: i64) -> Response<Full<Bytes>> {
    match run_store(&state, move |store| store.delete(id)).await {
        Ok(_affected) => message_response(
            StatusCode::OK,
            &format!("Address with id {id} deleted successfully"),
        ),
        Err(e) => storage_failure(&e),
    }
}

/// `GET /address`: every record, ascending by id
pub async fn handle_list(state: Arc<AppState>) -> Response<Full<Bytes>> {
    match run_store(&state, AddressStore::list_all).await {
        Ok(records) => json_response(StatusCode::OK, &records),
        Err(e) => storage_failure(&e),
    }
}

/// `GET /address/nearby?latitude=..&longitude=..&distance=..`
///
/// Flat-plane squared-distance filter in coordinate degrees. Missing or
/// malformed query values take the 500 error path, same as a backend
/// failure.
pub async fn handle_nearby(query: Option<String>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let nearby = match NearbyQuery::from_query(query.as_deref()) {
        Ok(q) => q,
        Err(detail) => {
            logger::log_warning(&format!("Bad nearby query: {detail}"));
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &detail);
        }
    };

    match run_store(&state, move |store| {
        store.find_nearby(nearby.latitude, nearby.longitude, nearby.distance)
    })
    .await
    {
        Ok(records) => json_response(StatusCode::OK, &records),
        Err(e) => storage_failure(&e),
    }
}

/// Collect the request body and validate the address payload.
///
/// Returns the ready-to-store fields, or the 400 response to send back.
async fn read_and_validate(
    req: Request<hyper::body::Incoming>,
) -> Result<NewAddress, Response<Full<Bytes>>> {
    let whole_body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ))
        }
    };

    let payload: AddressPayload = match serde_json::from_slice(&whole_body) {
        Ok(p) => p,
        Err(e) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON: {e}"),
            ))
        }
    };

    payload.validate().ok_or_else(incomplete_data)
}

/// Run a store operation on the blocking pool.
///
/// Statements block on the connection mutex and on `SQLite` itself, so they
/// stay off the async workers; a slow statement stalls only its own request.
async fn run_store<T, F>(state: &Arc<AppState>, op: F) -> Result<T, StoreError>
where
    F: FnOnce(&AddressStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

/// Backend failure boundary: log and convert to 500 `{"error": <detail>}`
fn storage_failure(e: &StoreError) -> Response<Full<Bytes>> {
    logger::log_error(&format!("Storage failure: {e}"));
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> Arc<AppState> {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        let store = AddressStore::open_in_memory().unwrap();
        Arc::new(AppState::new(cfg, store))
    }

    fn new_address(address: &str, latitude: f64, longitude: f64) -> NewAddress {
        NewAddress {
            address: address.to_string(),
            latitude,
            longitude,
        }
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_exact_success_message() {
        let state = test_state();
        let resp = create_address(Arc::clone(&state), new_address("1 Main St", 1.0, 2.0)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            body_string(resp).await,
            r#"{"message":"Address created successfully"}"#
        );
        assert_eq!(state.store.list_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_returns_exact_message_with_id() {
        let state = test_state();
        let id = state.store.create("A", 1.0, 2.0).unwrap();

        let resp = update_address(Arc::clone(&state), id, new_address("B", 3.0, 4.0)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_string(resp).await,
            format!(r#"{{"message":"Address with id {id} updated successfully"}}"#)
        );
        assert_eq!(state.store.list_all().unwrap()[0].address, "B");
    }

    #[tokio::test]
    async fn test_update_miss_still_reports_success() {
        let state = test_state();
        let resp = update_address(Arc::clone(&state), 9999, new_address("B", 3.0, 4.0)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_string(resp).await,
            r#"{"message":"Address with id 9999 updated successfully"}"#
        );
    }

    #[tokio::test]
    async fn test_delete_miss_still_reports_success() {
        let state = test_state();
        let resp = handle_delete(Arc::clone(&state), 9999).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_string(resp).await,
            r#"{"message":"Address with id 9999 deleted successfully"}"#
        );
    }

    #[tokio::test]
    async fn test_list_empty_is_empty_json_array() {
        let resp = handle_list(test_state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "[]");
    }

    #[tokio::test]
    async fn test_list_records_carry_full_wire_shape() {
        let state = test_state();
        let id = state.store.create("1 Main St", 1.0, 2.0).unwrap();

        let resp = handle_list(state).await;
        let parsed: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(parsed[0]["id"], id);
        assert_eq!(parsed[0]["address"], "1 Main St");
        assert_eq!(parsed[0]["latitude"], 1.0);
        assert_eq!(parsed[0]["longitude"], 2.0);
    }

    #[tokio::test]
    async fn test_nearby_filters_and_returns_records() {
        let state = test_state();
        state.store.create("origin", 0.0, 0.0).unwrap();
        state.store.create("five", 0.0, 5.0).unwrap();

        let query = Some("latitude=0&longitude=0&distance=4".to_string());
        let resp = handle_nearby(query, state).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["address"], "origin");
    }

    #[tokio::test]
    async fn test_nearby_malformed_query_surfaces_as_500_error_body() {
        let state = test_state();
        let query = Some("latitude=abc&longitude=0&distance=1".to_string());
        let resp = handle_nearby(query, state).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let parsed: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("latitude"));
    }
}
