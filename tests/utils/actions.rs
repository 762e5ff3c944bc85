use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Request Helpers
// ============================================================================

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is not the expected JSON")
    }

    pub fn value(&self) -> Value {
        self.json()
    }
}

impl TestSetup {
    /// Sends a request through the full router
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse { status, body }
    }

    pub async fn register(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/users",
            None,
            Some(serde_json::json!({"email": email, "password": password})),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/login",
            None,
            Some(serde_json::json!({"email": email, "password": password})),
        )
        .await
    }

    pub async fn post_chirp(&self, access_token: &str, body: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/chirps",
            Some(&format!("Bearer {}", access_token)),
            Some(serde_json::json!({"body": body})),
        )
        .await
    }
}
