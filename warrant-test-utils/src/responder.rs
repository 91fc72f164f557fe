//! Wiremock responder that serves the policy endpoints from an
//! [`InMemoryPolicyStore`].

use crate::store::{InMemoryPolicyStore, StoreRejection};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use warrant_core::{
    AddPoliciesRequest, DeletePoliciesRequest, EditPolicyRequest, ExplainRequest, GroupingFilter,
    GroupingFilterResponse, PolicyFilter,
};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Shared store handle; tests inspect it after driving the client.
pub type SharedStore = Arc<Mutex<InMemoryPolicyStore>>;

pub fn shared(store: InMemoryPolicyStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Routes `/auth/admin/policies/*` and `/auth/admin/groupings/*`.
#[derive(Clone)]
pub struct PolicyStoreResponder {
    store: SharedStore,
    wrap_success: bool,
}

impl PolicyStoreResponder {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            wrap_success: false,
        }
    }

    /// Wrap successful bodies in `{code: 0, message, data}`.
    pub fn with_envelope(mut self) -> Self {
        self.wrap_success = true;
        self
    }

    fn success(&self, body: Value) -> ResponseTemplate {
        let body = if self.wrap_success {
            json!({"code": 0, "message": "ok", "data": body})
        } else {
            body
        };
        ResponseTemplate::new(200).set_body_json(body)
    }

    fn mutation(&self, result: Result<(), StoreRejection>) -> ResponseTemplate {
        match result {
            Ok(()) => self.success(json!({})),
            Err(rejection) => ResponseTemplate::new(rejection.status()).set_body_json(json!({
                "code": rejection.code(),
                "message": rejection.message(),
                "data": null
            })),
        }
    }

    fn route(&self, request: &Request) -> Result<ResponseTemplate, String> {
        let mut store = self.store.lock().map_err(|_| "store poisoned".to_string())?;
        let response = match request.url.path() {
            "/auth/admin/policies/filter" => {
                let filter: PolicyFilter = body(request)?;
                self.success(json!(store.filter(&filter)))
            }
            "/auth/admin/policies/add" => {
                let add: AddPoliciesRequest = body(request)?;
                self.mutation(store.add(&add.policies, add.skip))
            }
            "/auth/admin/policies/delete" => {
                let delete: DeletePoliciesRequest = body(request)?;
                self.mutation(store.delete(&delete.policies))
            }
            "/auth/admin/policies/edit" => {
                let edit: EditPolicyRequest = body(request)?;
                self.mutation(store.edit(&edit.old_policy, &edit.new_policy))
            }
            "/auth/admin/policies/explain" => {
                let explain: ExplainRequest = body(request)?;
                self.success(json!(store.explain(&explain.sub, &explain.obj, &explain.act)))
            }
            "/auth/admin/groupings/filter" => {
                let filter: GroupingFilter = body(request)?;
                let groups = store.filter_groupings(&filter);
                self.success(json!(GroupingFilterResponse { groups }))
            }
            "/auth/admin/groupings/add" => {
                let add: AddPoliciesRequest = body(request)?;
                self.mutation(store.add_groupings(&add.policies, add.skip))
            }
            "/auth/admin/groupings/delete" => {
                let delete: DeletePoliciesRequest = body(request)?;
                self.mutation(store.delete_groupings(&delete.policies))
            }
            other => ResponseTemplate::new(404).set_body_string(format!("no route for {}", other)),
        };
        Ok(response)
    }
}

impl Respond for PolicyStoreResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.route(request).unwrap_or_else(|message| {
            ResponseTemplate::new(400).set_body_json(json!({
                "code": 40001,
                "message": message,
                "data": null
            }))
        })
    }
}

fn body<T: DeserializeOwned>(request: &Request) -> Result<T, String> {
    serde_json::from_slice(&request.body).map_err(|e| format!("invalid body: {}", e))
}

/// Start a mock server answering the policy endpoints from `store`.
pub async fn start_policy_service(store: SharedStore) -> MockServer {
    let server = MockServer::start().await;
    mount_policy_service(&server, PolicyStoreResponder::new(store)).await;
    server
}

pub async fn mount_policy_service(server: &MockServer, responder: PolicyStoreResponder) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/auth/admin/(policies|groupings)/[a-z]+$"))
        .respond_with(responder)
        .mount(server)
        .await;
}
