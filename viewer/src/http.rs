use async_trait::async_trait;
use log::debug;
use scancore::gateway::RemoteGateway;
use scancore::model::{
    ActiveEnvironmentHint, EnvironmentDocument, EnvironmentRef, EnvironmentSnapshot,
    PlatformStatus, PowerState, WatchListPush,
};
use scancore::prelude::{SyncError, SyncResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

/// `RemoteGateway` over the platform's HTTP/JSON API.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SyncResult<T> {
        let request = self.client.get(self.url(path));
        decode(path, send(path, request).await?).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> SyncResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        decode(path, send(path, request).await?).await
    }

    /// Posts and ignores whatever acknowledgement body comes back.
    async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> SyncResult<()> {
        let request = self.client.post(self.url(path)).json(body);
        send(path, request).await?;
        Ok(())
    }
}

async fn send(path: &str, request: reqwest::RequestBuilder) -> SyncResult<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|err| SyncError::Network(format!("{path}: {err}")))?;
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(SyncError::Network(format!("{path}: {status} {text}")))
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> SyncResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| SyncError::Network(format!("{path}: {err}")))?;
    serde_json::from_slice(&bytes).map_err(|err| {
        debug!("{path}: undecodable body {:?}", String::from_utf8_lossy(&bytes));
        SyncError::Decode(format!("{path}: {err}"))
    })
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn fetch_environment_list(&self) -> SyncResult<Vec<EnvironmentRef>> {
        self.get_json("getJSONfilenames").await
    }

    async fn fetch_environment_data(&self, id: &str) -> SyncResult<EnvironmentSnapshot> {
        let document: EnvironmentDocument =
            self.post_json("getData", &json!({ "file": id })).await?;
        Ok(EnvironmentSnapshot::new(id, document))
    }

    async fn fetch_active_environment_hint(&self) -> SyncResult<ActiveEnvironmentHint> {
        self.get_json("getActiveFile").await
    }

    async fn fetch_platform_status(&self) -> SyncResult<PlatformStatus> {
        self.get_json("getPlatformStatus").await
    }

    async fn set_active_environment(&self, id: &str) -> SyncResult<()> {
        self.post_ack("updateActiveEnviroment", &json!({ "file": id }))
            .await
    }

    async fn create_environment(&self, label: &str) -> SyncResult<()> {
        self.post_ack("createNewEnviroment", &json!({ "location": label }))
            .await
    }

    async fn set_platform_power(&self, state: PowerState) -> SyncResult<()> {
        self.post_ack(
            "updatePlatformActiveStatus",
            &json!({ "status": state.code() }),
        )
        .await
    }

    async fn push_watch_list(&self, push: &WatchListPush) -> SyncResult<()> {
        self.post_ack("updateObjects", push).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scancore::model::{OverlayKind, RecordId, WatchListEntry};
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use warp::http::StatusCode;
    use warp::Filter;

    type Received = Arc<Mutex<Vec<(String, Value)>>>;

    fn spawn_platform(received: Received) -> SocketAddr {
        let filenames = warp::path("getJSONfilenames").and(warp::get()).map(|| {
            warp::reply::json(&json!([
                {"filename": "scan1.json", "location": "Glasgow"},
                {"filename": "scan2.json", "location": "Stirling"}
            ]))
        });
        let active = warp::path("getActiveFile").and(warp::get()).map(|| {
            warp::reply::json(&json!({
                "activeFile": "scan1.json",
                "searchObjects": [{"object": "fence", "hsi": true}]
            }))
        });
        let data = warp::path("getData")
            .and(warp::post())
            .and(warp::body::json())
            .map(|body: Value| {
                let pins = if body["file"] == "scan1.json" {
                    json!([{
                        "id": 1,
                        "geo_coords": [55.85, -4.23],
                        "panorama_ref": "/img1.jpg",
                        "ndvi_ref": "/img1_ndvi.jpg",
                        "objects": [{
                            "x": 100, "y": "20",
                            "RGB_classification": "car",
                            "RGB_confidence": "0.8"
                        }]
                    }])
                } else {
                    json!([])
                };
                warp::reply::json(&json!({"location": "Glasgow", "pins": pins}))
            });
        let status = warp::path("getPlatformStatus")
            .and(warp::get())
            .map(|| warp::reply::json(&json!(["Scanning", 1, 0, true])));
        let broken = warp::path("broken")
            .and(warp::get())
            .map(|| "definitely not json");
        let refused = warp::path("refused").and(warp::get()).map(|| {
            warp::reply::with_status("boom", StatusCode::INTERNAL_SERVER_ERROR)
        });
        let acks = warp::path::param::<String>()
            .and(warp::post())
            .and(warp::body::json())
            .map(move |path: String, body: Value| {
                if let Ok(mut received) = received.lock() {
                    received.push((path, body));
                }
                warp::reply::json(&json!({"status": "ok"}))
            });

        let routes = filenames
            .or(active)
            .or(data)
            .or(status)
            .or(broken)
            .or(refused)
            .or(acks);
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn gateway(addr: SocketAddr) -> HttpGateway {
        HttpGateway::new(&format!("http://{addr}/"))
    }

    #[tokio::test]
    async fn reads_environment_list_and_hint() {
        let addr = spawn_platform(Received::default());
        let gateway = gateway(addr);

        let list = gateway.fetch_environment_list().await.unwrap();
        let hint = gateway.fetch_active_environment_hint().await.unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[1].location, "Stirling");
        assert_eq!(hint.active_id.as_deref(), Some("scan1.json"));
        assert_eq!(hint.watch_list, vec![WatchListEntry::new("fence", true)]);
    }

    #[tokio::test]
    async fn environment_data_is_keyed_by_requested_id() {
        let addr = spawn_platform(Received::default());
        let snapshot = gateway(addr)
            .fetch_environment_data("scan1.json")
            .await
            .unwrap();

        assert_eq!(snapshot.id, "scan1.json");
        let pin = snapshot.pin(&RecordId::Number(1)).unwrap();
        assert_eq!(pin.overlay(OverlayKind::Ndvi), Some("/img1_ndvi.jpg"));
        assert_eq!(pin.objects[0].y, 20.0);
        assert_eq!(pin.objects[0].rgb_confidence, 0.8);
    }

    #[tokio::test]
    async fn status_array_decodes_mixed_flags() {
        let addr = spawn_platform(Received::default());
        let status = gateway(addr).fetch_platform_status().await.unwrap();

        assert_eq!(
            status,
            PlatformStatus {
                message: "Scanning".into(),
                pi_online: true,
                gps_online: false,
                wifi_online: true,
            }
        );
    }

    #[tokio::test]
    async fn commands_post_platform_bodies() {
        let received = Received::default();
        let addr = spawn_platform(received.clone());
        let gateway = gateway(addr);

        gateway.set_active_environment("scan2.json").await.unwrap();
        gateway.create_environment("North field").await.unwrap();
        gateway
            .set_platform_power(PowerState::OneShotCapture)
            .await
            .unwrap();
        gateway
            .push_watch_list(&WatchListPush {
                entries: vec![WatchListEntry::new("gate", false)],
                manual_full_scan: true,
            })
            .await
            .unwrap();

        let received = received.lock().unwrap().clone();
        assert_eq!(
            received,
            vec![
                ("updateActiveEnviroment".to_string(), json!({"file": "scan2.json"})),
                ("createNewEnviroment".to_string(), json!({"location": "North field"})),
                ("updatePlatformActiveStatus".to_string(), json!({"status": 2})),
                (
                    "updateObjects".to_string(),
                    json!({"objects": [{"object": "gate", "hsi": false}], "hsiManualScan": true})
                ),
            ]
        );
    }

    #[tokio::test]
    async fn failures_map_to_network_and_decode() {
        let addr = spawn_platform(Received::default());
        let gateway = gateway(addr);

        let refused: SyncResult<Value> = gateway.get_json("refused").await;
        let broken: SyncResult<Value> = gateway.get_json("broken").await;

        assert!(matches!(refused, Err(SyncError::Network(_))));
        assert!(matches!(broken, Err(SyncError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_platform_is_a_network_error() {
        let gateway = HttpGateway::new("http://127.0.0.1:1");
        let err = gateway.fetch_environment_list().await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }
}
