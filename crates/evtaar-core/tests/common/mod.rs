#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use evtaar_core::auth::ACCESS_TOKEN_KEY;
use evtaar_core::{ApiClient, CredentialStore, MemoryStore, SessionContainer, SessionStatus};
use serde_json::{json, Value};
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub api: ApiClient,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_store(MemoryStore::new()).await
    }

    /// Start as if a previous run had persisted `token`
    pub async fn with_credential(token: &str) -> Self {
        Self::with_store(MemoryStore::with_entry(ACCESS_TOKEN_KEY, token)).await
    }

    async fn with_store(store: MemoryStore) -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(store);
        let api = ApiClient::with_timeout(
            &format!("{}/api/v1", server.uri()),
            CredentialStore::new(store.clone()),
            Duration::from_secs(5),
        )
        .expect("Failed to build API client");
        Self { server, store, api }
    }

    pub fn credential(&self) -> Option<String> {
        self.api.credentials().credential().expect("store readable")
    }
}

pub fn ok(data: Value) -> Value {
    json!({ "success": true, "message": "OK", "data": data })
}

pub fn paged(data: Value, page: u32, page_size: u32, total_items: u64) -> Value {
    let total_pages = total_items.div_ceil(page_size as u64);
    json!({
        "success": true,
        "data": data,
        "pagination": {
            "page": page,
            "page_size": page_size,
            "total_pages": total_pages,
            "total_items": total_items
        }
    })
}

pub fn failure(code: &str, message: &str) -> Value {
    json!({ "success": false, "error": { "code": code, "message": message } })
}

pub fn profile(id: &str, email: &str) -> Value {
    json!({ "id": id, "email": email })
}

pub async fn wait_for_status(session: &SessionContainer, status: SessionStatus) {
    let mut rx = session.subscribe();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.status() == status))
        .await
        .expect("timed out waiting for session status")
        .expect("session container dropped");
}
