//! Shared harness for infra integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use mople_domain::{Config, Credential};
use mople_infra::ClientContext;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REFRESH_PATH: &str = "/auth/recreate";

/// Mock API plus a fully wired client.
///
/// Fields drop in declaration order: the blocking client goes first, the
/// runtime last.
pub struct Harness {
    pub context: ClientContext,
    pub server: MockServer,
    pub runtime: Runtime,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(None)
    }

    pub fn with_storage(storage: Option<PathBuf>) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("runtime should build");
        let server = runtime.block_on(MockServer::start());
        let context = ClientContext::build(config_for(&server, storage), runtime.handle().clone())
            .expect("context should build");
        Self { context, server, runtime }
    }

    pub fn sign_in(&self, access: &str, refresh: &str) {
        self.runtime
            .block_on(self.context.session().sign_in(Credential::new(access, refresh)))
            .expect("sign in should succeed");
    }

    pub fn stored(&self) -> Option<Credential> {
        self.runtime
            .block_on(mople_core::CredentialStore::current(self.context.credentials().as_ref()))
            .expect("store should be readable")
    }

    /// `GET route` answered with `status` when sent with `Bearer token`.
    pub fn mount_get(&self, route: &str, token: &str, status: u16) {
        self.runtime.block_on(
            Mock::given(method("GET"))
                .and(path(route))
                .and(header("authorization", format!("Bearer {token}").as_str()))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({"route": route})))
                .mount(&self.server),
        );
    }

    pub fn mount_refresh(&self, refresh_token: &str, template: ResponseTemplate) {
        self.runtime.block_on(
            Mock::given(method("POST"))
                .and(path(REFRESH_PATH))
                .and(header("Refresh-Token", refresh_token))
                .respond_with(template)
                .mount(&self.server),
        );
    }

    pub fn refresh_calls(&self) -> usize {
        self.requests_to(REFRESH_PATH).len()
    }

    pub fn requests_to(&self, route: &str) -> Vec<wiremock::Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == route)
            .collect()
    }
}

pub fn config_for(server: &MockServer, storage: Option<PathBuf>) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_secs = 5;
    config.storage.path = storage.map(|p| p.display().to_string());
    config
}

pub fn issued(access: &str, refresh: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"accessToken": access, "refreshToken": refresh}))
}
