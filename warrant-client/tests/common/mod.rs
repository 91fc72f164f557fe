//! Shared helpers for the wiremock-backed client tests.

#![allow(dead_code)]

use warrant_client::{AuthConfig, ClientConfig, LogConfig, WarrantClient};
use wiremock::MockServer;

pub const API_KEY: &str = "test-key";

pub fn client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_string(),
        tenant_id: None,
        auth: AuthConfig {
            api_key: Some(API_KEY.to_string()),
            jwt: None,
        },
        request_timeout_ms: 2_000,
        max_page_size: 500,
        log: LogConfig::default(),
    }
}

pub fn client_for(server: &MockServer) -> WarrantClient {
    WarrantClient::new(&client_config(&server.uri())).expect("client should build")
}
