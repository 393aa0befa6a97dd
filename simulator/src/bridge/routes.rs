use crate::bridge::store::PlatformStore;
use log::{debug, warn};
use scancore::model::{PowerState, WatchListPush};
use serde::Deserialize;
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Deserialize)]
struct FileRequest {
    file: String,
}

#[derive(Debug, Deserialize)]
struct LocationRequest {
    location: String,
}

#[derive(Debug, Deserialize)]
struct PowerRequest {
    status: u8,
}

fn ack() -> Response {
    reply::json(&json!({ "status": "ok" })).into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    warn!("{message}");
    reply::with_status(reply::json(&json!({ "error": message })), status).into_response()
}

/// Every platform endpoint the viewer talks to.
pub fn routes(
    store: PlatformStore,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let state = warp::any().map(move || store.clone());

    let filenames = warp::path("getJSONfilenames")
        .and(warp::path::end())
        .and(warp::get())
        .and(state.clone())
        .map(|store: PlatformStore| reply::json(&store.environment_list()).into_response());

    let active = warp::path("getActiveFile")
        .and(warp::path::end())
        .and(warp::get())
        .and(state.clone())
        .map(|store: PlatformStore| reply::json(&store.active_hint()).into_response());

    let data = warp::path("getData")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(state.clone())
        .map(
            |request: FileRequest, store: PlatformStore| match store.document(&request.file) {
                Some(document) => reply::json(&document).into_response(),
                None => failure(
                    StatusCode::NOT_FOUND,
                    format!("unknown environment {}", request.file),
                ),
            },
        );

    let status = warp::path("getPlatformStatus")
        .and(warp::path::end())
        .and(warp::get())
        .and(state.clone())
        .map(|store: PlatformStore| reply::json(&store.status()).into_response());

    let power = warp::path("updatePlatformActiveStatus")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(state.clone())
        .map(
            |request: PowerRequest, store: PlatformStore| match PowerState::from_code(request.status)
            {
                Some(power) => {
                    store.set_power(power);
                    ack()
                }
                None => failure(
                    StatusCode::BAD_REQUEST,
                    format!("unknown power code {}", request.status),
                ),
            },
        );

    let select = warp::path("updateActiveEnviroment")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(state.clone())
        .map(|request: FileRequest, store: PlatformStore| {
            if store.set_active(&request.file) {
                ack()
            } else {
                failure(
                    StatusCode::NOT_FOUND,
                    format!("unknown environment {}", request.file),
                )
            }
        });

    let create = warp::path("createNewEnviroment")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(state.clone())
        .map(
            |request: LocationRequest, store: PlatformStore| match store
                .create_environment(&request.location)
            {
                Some(file) => reply::json(&json!({ "status": "ok", "file": file })).into_response(),
                None => failure(
                    StatusCode::BAD_REQUEST,
                    "environment name must not be empty".into(),
                ),
            },
        );

    let objects = warp::path("updateObjects")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(state)
        .map(|push: WatchListPush, store: PlatformStore| {
            debug!(
                "watch-list now {} entries (manual scan {})",
                push.entries.len(),
                push.manual_full_scan
            );
            store.replace_watch_list(push);
            ack()
        });

    filenames
        .or(active)
        .unify()
        .or(data)
        .unify()
        .or(status)
        .unify()
        .or(power)
        .unify()
        .or(select)
        .unify()
        .or(create)
        .unify()
        .or(objects)
        .unify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::template::DEMO_FILE;
    use scancore::model::{ActiveEnvironmentHint, EnvironmentDocument, EnvironmentRef, WatchListEntry};
    use serde_json::Value;

    fn platform() -> (PlatformStore, impl Filter<Extract = (Response,), Error = Rejection> + Clone)
    {
        let store = PlatformStore::seeded();
        (store.clone(), routes(store))
    }

    #[tokio::test]
    async fn lists_environments_and_serves_documents() {
        let (_, api) = platform();

        let list = warp::test::request()
            .method("GET")
            .path("/getJSONfilenames")
            .reply(&api)
            .await;
        let list: Vec<EnvironmentRef> = serde_json::from_slice(list.body()).unwrap();
        assert_eq!(list[0].filename, DEMO_FILE);

        let data = warp::test::request()
            .method("POST")
            .path("/getData")
            .json(&json!({ "file": DEMO_FILE }))
            .reply(&api)
            .await;
        assert_eq!(data.status(), StatusCode::OK);
        let document: EnvironmentDocument = serde_json::from_slice(data.body()).unwrap();
        assert_eq!(document.pins.len(), 2);

        let missing = warp::test::request()
            .method("POST")
            .path("/getData")
            .json(&json!({ "file": "nope.json" }))
            .reply(&api)
            .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_is_a_positional_array() {
        let (_, api) = platform();
        let response = warp::test::request()
            .method("GET")
            .path("/getPlatformStatus")
            .reply(&api)
            .await;
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!(["Idle", true, true, true]));
    }

    #[tokio::test]
    async fn power_codes_are_validated() {
        let (store, api) = platform();

        let ok = warp::test::request()
            .method("POST")
            .path("/updatePlatformActiveStatus")
            .json(&json!({ "status": 1 }))
            .reply(&api)
            .await;
        let bad = warp::test::request()
            .method("POST")
            .path("/updatePlatformActiveStatus")
            .json(&json!({ "status": 9 }))
            .reply(&api)
            .await;

        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.power(), PowerState::On);
    }

    #[tokio::test]
    async fn create_then_select_environment() {
        let (store, api) = platform();

        let created = warp::test::request()
            .method("POST")
            .path("/createNewEnviroment")
            .json(&json!({ "location": "North field" }))
            .reply(&api)
            .await;
        let body: Value = serde_json::from_slice(created.body()).unwrap();
        assert_eq!(body["file"], "north_field.json");

        let selected = warp::test::request()
            .method("POST")
            .path("/updateActiveEnviroment")
            .json(&json!({ "file": DEMO_FILE }))
            .reply(&api)
            .await;
        assert_eq!(selected.status(), StatusCode::OK);
        assert_eq!(store.active_file(), DEMO_FILE);
    }

    #[tokio::test]
    async fn watch_list_push_is_echoed_in_active_hint() {
        let (store, api) = platform();

        warp::test::request()
            .method("POST")
            .path("/updateObjects")
            .json(&json!({ "objects": [{ "object": "fence", "hsi": true }], "hsiManualScan": true }))
            .reply(&api)
            .await;
        let hint = warp::test::request()
            .method("GET")
            .path("/getActiveFile")
            .reply(&api)
            .await;

        let hint: ActiveEnvironmentHint = serde_json::from_slice(hint.body()).unwrap();
        assert_eq!(hint.active_id.as_deref(), Some(DEMO_FILE));
        assert_eq!(hint.watch_list, vec![WatchListEntry::new("fence", true)]);
        assert!(store.watch_list().manual_full_scan);
    }
}
