// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for faking a cluster's API server.

use crate::cluster::ClusterConnection;
use http::{Method, Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

/// A request the fake cluster received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
}

struct Failure {
    status: u16,
    remaining: usize,
}

#[derive(Default)]
struct State {
    discovery: HashMap<String, Value>,
    /// Plural names of every served resource, used to tell collections from objects
    plurals: HashSet<String>,
    /// Objects keyed by their full item path
    objects: BTreeMap<String, Value>,
    failures: HashMap<(String, String), Failure>,
    requests: Vec<RecordedRequest>,
    /// Extra delay for requests to one path
    slow_paths: HashMap<String, Duration>,
    generated: usize,
}

/// An in-memory API server: a fixed discovery document plus an object store.
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
    latency: Option<Duration>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster serving the core group plus `apps`, `batch` (v1 preferred
    /// over v1beta1) and two groups that both expose `Gadget`.
    pub fn standard() -> Self {
        Self::new()
            .with_discovery(
                "/api",
                json!({
                    "kind": "APIVersions",
                    "apiVersion": "v1",
                    "versions": ["v1"],
                    "serverAddressByClientCIDRs": [
                        { "clientCIDR": "0.0.0.0/0", "serverAddress": "10.0.0.1:6443" }
                    ]
                }),
            )
            .with_discovery(
                "/api/v1",
                resource_list(
                    "v1",
                    &[
                        ("configmaps", "ConfigMap", true, Some("cm")),
                        ("pods", "Pod", true, Some("po")),
                        ("pods/status", "Pod", true, None),
                        ("nodes", "Node", false, Some("no")),
                        ("namespaces", "Namespace", false, Some("ns")),
                    ],
                ),
            )
            .with_discovery(
                "/apis",
                json!({
                    "kind": "APIGroupList",
                    "apiVersion": "v1",
                    "groups": [
                        api_group("beta.example.com", &["v1"], "v1"),
                        api_group("batch", &["v1beta1", "v1"], "v1"),
                        api_group("apps", &["v1"], "v1"),
                        api_group("alpha.example.com", &["v1"], "v1"),
                    ]
                }),
            )
            .with_discovery(
                "/apis/apps/v1",
                resource_list(
                    "apps/v1",
                    &[
                        ("deployments", "Deployment", true, Some("deploy")),
                        ("deployments/scale", "Scale", true, None),
                        ("statefulsets", "StatefulSet", true, Some("sts")),
                        ("daemonsets", "DaemonSet", true, Some("ds")),
                        ("workloads", "Workload", true, Some("wl")),
                    ],
                ),
            )
            .with_discovery(
                "/apis/batch/v1",
                resource_list(
                    "batch/v1",
                    &[
                        ("cronjobs", "CronJob", true, Some("cj")),
                        ("jobs", "Job", true, None),
                    ],
                ),
            )
            .with_discovery(
                "/apis/batch/v1beta1",
                resource_list("batch/v1beta1", &[("cronjobs", "CronJob", true, Some("cj"))]),
            )
            .with_discovery(
                "/apis/alpha.example.com/v1",
                resource_list("alpha.example.com/v1", &[("gadgets", "Gadget", true, None)]),
            )
            .with_discovery(
                "/apis/beta.example.com/v1",
                resource_list("beta.example.com/v1", &[("gadgets", "Gadget", false, None)]),
            )
    }

    /// Serve `body` for GET requests to exactly `path`
    pub fn with_discovery(self, path: &str, body: Value) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(resources) = body.get("resources").and_then(Value::as_array) {
                for resource in resources {
                    if let Some(name) = resource["name"].as_str() {
                        state.plurals.insert(name.to_string());
                    }
                }
            }
            state.discovery.insert(path.to_string(), body);
        }
        self
    }

    /// Answer the next `times` requests matching method and path with `status`
    pub fn fail_next(self, method: &str, path: &str, status: u16, times: usize) -> Self {
        self.state.lock().unwrap().failures.insert(
            (method.to_string(), path.to_string()),
            Failure {
                status,
                remaining: times,
            },
        );
        self
    }

    /// Delay every response
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay responses to exactly `path`; overrides `with_latency` for it
    pub fn slow_path(self, path: &str, latency: Duration) -> Self {
        self.state
            .lock()
            .unwrap()
            .slow_paths
            .insert(path.to_string(), latency);
        self
    }

    /// Build a kube Client talking to this fake
    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    pub fn connection(&self, id: &str) -> ClusterConnection {
        self.connection_with_timeout(id, Duration::from_secs(5))
    }

    pub fn connection_with_timeout(&self, id: &str, timeout: Duration) -> ClusterConnection {
        ClusterConnection::new(
            id,
            format!("https://{}.example.com", id),
            self.client(),
            timeout,
        )
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Number of GET requests to exactly `path`
    pub fn requests_to(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == "GET" && r.path == path)
            .count()
    }

    pub fn requests_with_method(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }
}

impl State {
    /// Log a request as it arrives and return how long to wait before answering
    fn record(&mut self, method: &Method, path: &str, query: &str) -> Option<Duration> {
        self.requests.push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            query: query.to_string(),
        });
        self.slow_paths.get(path).copied()
    }

    fn handle(&mut self, method: &Method, path: &str, query: &str, body: &[u8]) -> (u16, Value) {
        if let Some(failure) = self
            .failures
            .get_mut(&(method.to_string(), path.to_string()))
            .filter(|f| f.remaining > 0)
        {
            failure.remaining -= 1;
            let status = failure.status;
            return (status, status_json(status, "InternalError", "injected failure"));
        }

        if *method == Method::GET {
            if let Some(doc) = self.discovery.get(path) {
                return (200, doc.clone());
            }
        }

        let is_collection = path
            .rsplit('/')
            .next()
            .is_some_and(|last| self.plurals.contains(last));

        if *method == Method::GET && is_collection {
            (200, self.list(path, query))
        } else if *method == Method::GET {
            match self.objects.get(path) {
                Some(obj) => (200, obj.clone()),
                None => not_found(path),
            }
        } else if *method == Method::POST && is_collection {
            self.create(path, body)
        } else {
            not_found(path)
        }
    }

    fn list(&self, collection: &str, query: &str) -> Value {
        let params: HashMap<&str, String> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k, v.replace("%3D", "=").replace("%2C", ",")))
            .collect();
        let offset: usize = params
            .get("continue")
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let limit: usize = params
            .get("limit")
            .and_then(|l| l.parse().ok())
            .unwrap_or(usize::MAX);
        let selector = params.get("labelSelector").cloned().unwrap_or_default();

        let prefix = format!("{}/", collection);
        let matching: Vec<Value> = self
            .objects
            .iter()
            .filter(|(key, _)| key.strip_prefix(&prefix).is_some_and(|rest| !rest.contains('/')))
            .map(|(_, obj)| obj)
            .filter(|obj| matches_selector(obj, &selector))
            .cloned()
            .collect();

        let page: Vec<Value> = matching.iter().skip(offset).take(limit).cloned().collect();
        let next = offset + page.len();
        let mut metadata = json!({ "resourceVersion": "1" });
        if next < matching.len() {
            metadata["continue"] = json!(next.to_string());
        }

        // List items come back without apiVersion/kind, like a real server.
        let items: Vec<Value> = page
            .into_iter()
            .map(|mut obj| {
                if let Some(map) = obj.as_object_mut() {
                    map.remove("apiVersion");
                    map.remove("kind");
                }
                obj
            })
            .collect();

        json!({ "apiVersion": "v1", "kind": "List", "metadata": metadata, "items": items })
    }

    fn create(&mut self, collection: &str, body: &[u8]) -> (u16, Value) {
        let Ok(mut obj) = serde_json::from_slice::<Value>(body) else {
            return (400, status_json(400, "BadRequest", "body is not valid JSON"));
        };

        let path_namespace = collection
            .split('/')
            .skip_while(|segment| *segment != "namespaces")
            .nth(1)
            .map(str::to_string);
        let body_namespace = obj["metadata"]["namespace"].as_str().map(str::to_string);
        if body_namespace.is_some() && body_namespace != path_namespace {
            return (
                400,
                status_json(
                    400,
                    "BadRequest",
                    "the namespace of the provided object does not match the namespace sent on the request",
                ),
            );
        }

        let name = match (
            obj["metadata"]["name"].as_str(),
            obj["metadata"]["generateName"].as_str(),
        ) {
            (Some(name), _) => name.to_string(),
            (None, Some(prefix)) => {
                self.generated += 1;
                format!("{}{:05}", prefix, self.generated)
            }
            (None, None) => {
                return (
                    422,
                    status_json(422, "Invalid", "metadata.name: Required value"),
                )
            }
        };

        let key = format!("{}/{}", collection, name);
        if self.objects.contains_key(&key) {
            return (
                409,
                status_json(409, "AlreadyExists", &format!("\"{}\" already exists", name)),
            );
        }

        let metadata = &mut obj["metadata"];
        metadata["name"] = json!(name);
        if let Some(ns) = &path_namespace {
            metadata["namespace"] = json!(ns);
        }
        metadata["uid"] = json!(format!("uid-{}", self.objects.len() + 1));
        metadata["resourceVersion"] = json!((self.objects.len() + 2).to_string());
        metadata["creationTimestamp"] = json!("2026-01-01T00:00:00Z");

        self.objects.insert(key, obj.clone());
        (201, obj)
    }
}

impl Service<Request<Body>> for FakeCluster {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let latency = self.latency;

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let bytes = body.collect().await?.to_bytes();
            let path = parts.uri.path();
            let query = parts.uri.query().unwrap_or_default();

            let delay = state
                .lock()
                .unwrap()
                .record(&parts.method, path, query)
                .or(latency);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let (status, value) = state
                .lock()
                .unwrap()
                .handle(&parts.method, path, query, &bytes);

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(value.to_string().into_bytes()))
                .unwrap())
        })
    }
}

fn matches_selector(obj: &Value, selector: &str) -> bool {
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((key, value)) => obj["metadata"]["labels"][key].as_str() == Some(value),
            None => false,
        })
}

fn not_found(path: &str) -> (u16, Value) {
    let name = path.rsplit('/').next().unwrap_or_default();
    (
        404,
        status_json(404, "NotFound", &format!("\"{}\" not found", name)),
    )
}

/// Build a Status response body
pub fn status_json(code: u16, reason: &str, message: &str) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
}

/// Build an APIResourceList; entries are (name, kind, namespaced, short name)
pub fn resource_list(group_version: &str, resources: &[(&str, &str, bool, Option<&str>)]) -> Value {
    let resources: Vec<Value> = resources
        .iter()
        .map(|(name, kind, namespaced, short)| {
            let mut resource = json!({
                "name": name,
                "singularName": if name.contains('/') { String::new() } else { kind.to_ascii_lowercase() },
                "namespaced": namespaced,
                "kind": kind,
                "verbs": ["create", "get", "list"]
            });
            if let Some(short) = short {
                resource["shortNames"] = json!([short]);
            }
            resource
        })
        .collect();

    json!({
        "kind": "APIResourceList",
        "apiVersion": "v1",
        "groupVersion": group_version,
        "resources": resources
    })
}

fn api_group(name: &str, versions: &[&str], preferred: &str) -> Value {
    let version = |v: &str| json!({ "groupVersion": format!("{}/{}", name, v), "version": v });
    json!({
        "name": name,
        "versions": versions.iter().map(|v| version(v)).collect::<Vec<_>>(),
        "preferredVersion": version(preferred)
    })
}
