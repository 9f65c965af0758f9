//! Interceptor and transform pipeline through full action dispatch

mod common;

use async_trait::async_trait;
use common::RecordingTransport;
use restweave::{
    ActionDefinition, HttpMethod, Interceptor, ResourceDefinition, ResourceError, ResourceFactory, ResourceRequest, Result,
    Transform,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn plain_resource() -> ResourceDefinition {
    ResourceDefinition::new("/items/:id")
        .with_param("id", json!("@id"))
        .with_defaults(false)
        .action("get", ActionDefinition::get())
        .action("save", ActionDefinition::post())
}

/// Logs every hook it sees and passes values through
struct Tracer {
    name: &'static str,
    log: Log,
}

impl Tracer {
    fn push(&self, hook: &str) {
        self.log.lock().unwrap().push(format!("{}.{}", self.name, hook));
    }
}

#[async_trait]
impl Interceptor for Tracer {
    async fn request(&self, req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        self.push("request");
        Some(Ok(req.clone()))
    }

    async fn response(&self, data: &Value, _req: &ResourceRequest) -> Option<Result<Value>> {
        self.push("response");
        Some(Ok(data.clone()))
    }
}

struct AddHeader(&'static str, &'static str);

#[async_trait]
impl Interceptor for AddHeader {
    async fn request(&self, req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        Some(Ok(req.clone().with_header(self.0, self.1)))
    }
}

/// Rejects in its success hook and recovers in its own failure hook
struct RejectThenRecover;

#[async_trait]
impl Interceptor for RejectThenRecover {
    async fn request(&self, _req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        Some(Err(ResourceError::interceptor("not yet")))
    }

    async fn request_error(&self, _err: &ResourceError, req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        Some(Ok(req.clone().with_header("X-Recovered", "yes")))
    }
}

struct RejectRequest;

#[async_trait]
impl Interceptor for RejectRequest {
    async fn request(&self, _req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        Some(Err(ResourceError::interceptor("blocked")))
    }
}

/// Rewrites every request to POST
struct ForcePost;

#[async_trait]
impl Interceptor for ForcePost {
    async fn request(&self, req: &ResourceRequest) -> Option<Result<ResourceRequest>> {
        let mut req = req.clone();
        req.method = HttpMethod::Post;
        Some(Ok(req))
    }
}

struct RejectResponse;

#[async_trait]
impl Interceptor for RejectResponse {
    async fn response(&self, _data: &Value, _req: &ResourceRequest) -> Option<Result<Value>> {
        Some(Err(ResourceError::interceptor("bad data")))
    }
}

struct RecoverResponse(Value);

#[async_trait]
impl Interceptor for RecoverResponse {
    async fn response_error(&self, _err: &ResourceError, _req: &ResourceRequest) -> Option<Result<Value>> {
        Some(Ok(self.0.clone()))
    }
}

/// Records the data its response hook receives
struct Capture(Arc<Mutex<Vec<Value>>>);

#[async_trait]
impl Interceptor for Capture {
    async fn response(&self, data: &Value, _req: &ResourceRequest) -> Option<Result<Value>> {
        self.0.lock().unwrap().push(data.clone());
        Some(Ok(data.clone()))
    }
}

/// Recovers transport failures, echoing the header of the request that was sent
struct FallbackWithTrace;

#[async_trait]
impl Interceptor for FallbackWithTrace {
    async fn response_error(&self, err: &ResourceError, req: &ResourceRequest) -> Option<Result<Value>> {
        Some(Ok(json!({
            "status": err.status(),
            "trace": req.header("X-Trace"),
        })))
    }
}

struct Envelope;

impl Transform for Envelope {
    fn request(&self, req: ResourceRequest) -> ResourceRequest {
        let body = req.body.clone().map(|body| json!({ "data": body }));
        req.with_body(body)
    }

    fn response(&self, data: Value) -> Value {
        data.get("data").cloned().unwrap_or(data)
    }
}

#[tokio::test]
async fn test_no_interceptors_returns_raw_response() {
    let transport = RecordingTransport::new();
    transport.respond(json!({ "raw": true }));
    let factory = ResourceFactory::builder(transport.clone())
        .resource("items", plain_resource())
        .build();

    let out = factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    assert_eq!(out, json!({ "raw": true }));
}

#[tokio::test]
async fn test_request_interceptor_reshapes_request() {
    let transport = RecordingTransport::new();
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(AddHeader("Authorization", "Bearer t"))
        .resource("items", plain_resource())
        .build();

    factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    assert_eq!(transport.last().header("Authorization"), Some("Bearer t"));
}

#[tokio::test]
async fn test_interceptor_recovers_its_own_rejection() {
    let transport = RecordingTransport::new();
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(RejectThenRecover)
        .interceptor(AddHeader("X-After", "1"))
        .resource("items", plain_resource())
        .build();

    factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    let sent = transport.last();
    assert_eq!(sent.header("X-Recovered"), Some("yes"));
    assert_eq!(sent.header("X-After"), Some("1"));
}

#[tokio::test]
async fn test_request_failure_skips_transport_but_reaches_response_hooks() {
    let transport = RecordingTransport::new();
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(RejectRequest)
        .interceptor(RecoverResponse(json!("V")))
        .resource("items", plain_resource())
        .build();

    let out = factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    assert_eq!(out, json!("V"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_unrecovered_request_failure_propagates() {
    let transport = RecordingTransport::new();
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(RejectRequest)
        .resource("items", plain_resource())
        .build();

    let err = factory
        .get("items")
        .unwrap()
        .call("get", json!({ "id": 1 }), None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ResourceError::Interceptor(reason) if reason == "blocked"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_method_changed_by_interceptor_picks_transport_function() {
    let transport = RecordingTransport::new();
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(ForcePost)
        .resource("items", plain_resource())
        .build();

    factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    assert_eq!(transport.verbs(), vec!["post"]);
    assert_eq!(transport.last().method, HttpMethod::Post);
}

#[tokio::test]
async fn test_recovered_value_flows_to_later_interceptors() {
    let transport = RecordingTransport::new();
    transport.respond(json!("raw"));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(RejectResponse)
        .interceptor(RecoverResponse(json!("V")))
        .interceptor(Capture(seen.clone()))
        .resource("items", plain_resource())
        .build();

    let out = factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    assert_eq!(out, json!("V"));
    assert_eq!(*seen.lock().unwrap(), vec![json!("V")]);
}

#[tokio::test]
async fn test_transport_failure_is_recoverable() {
    let transport = RecordingTransport::new();
    transport.fail(ResourceError::Status {
        status: 503,
        body: String::new(),
    });
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(AddHeader("X-Trace", "abc"))
        .interceptor(FallbackWithTrace)
        .resource("items", plain_resource())
        .build();

    let out = factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    assert_eq!(out, json!({ "status": 503, "trace": "abc" }));
}

#[tokio::test]
async fn test_hooks_run_in_registration_order() {
    let transport = RecordingTransport::new();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(Tracer { name: "a", log: log.clone() })
        .interceptor(Tracer { name: "b", log: log.clone() })
        .interceptor(Tracer { name: "c", log: log.clone() })
        .resource("items", plain_resource())
        .build();

    factory.get("items").unwrap().call("get", json!({ "id": 1 }), None, None).await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a.request", "b.request", "c.request", "a.response", "b.response", "c.response"]
    );
}

#[tokio::test]
async fn test_transforms_wrap_request_and_unwrap_response() {
    let transport = RecordingTransport::new();
    transport.respond(json!({ "data": { "id": 9 } }));
    let factory = ResourceFactory::builder(transport.clone())
        .transform(Envelope)
        .resource("items", plain_resource())
        .build();

    let out = factory
        .get("items")
        .unwrap()
        .call("save", json!({ "id": 9 }), None, None)
        .await
        .unwrap();

    assert_eq!(transport.last().body, Some(json!({ "data": { "id": 9 } })));
    assert_eq!(transport.last().path, "/items/9");
    assert_eq!(out, json!({ "id": 9 }));
}

#[tokio::test]
async fn test_request_interceptors_do_not_touch_registered_action() {
    let transport = RecordingTransport::new();
    let factory = ResourceFactory::builder(transport.clone())
        .interceptor(AddHeader("X-A", "1"))
        .resource("items", plain_resource())
        .build();
    let items = factory.get("items").unwrap();

    items.call("get", json!({ "id": 1 }), None, None).await.unwrap();
    items.call("get", json!({ "id": 2 }), None, None).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.headers.len() == 1));
    assert_eq!(*requests[0].action, *items.action("get").unwrap().definition());
}
