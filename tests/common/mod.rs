//! Shared test double: a transport that records requests and replies with
//! queued responses.

#![allow(dead_code)]

use async_trait::async_trait;
use restweave::{ResourceError, ResourceRequest, Result, Transport};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<ResourceRequest>>>,
    verbs: Arc<Mutex<Vec<&'static str>>>,
    responses: Arc<Mutex<VecDeque<Result<Value>>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response; without one the transport echoes `null`
    pub fn respond(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub fn fail(&self, err: ResourceError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<ResourceRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Transport functions called, in order
    pub fn verbs(&self) -> Vec<&'static str> {
        self.verbs.lock().unwrap().clone()
    }

    pub fn last(&self) -> ResourceRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request was sent")
    }

    fn record(&self, verb: &'static str, req: ResourceRequest) -> Result<Value> {
        self.verbs.lock().unwrap().push(verb);
        self.requests.lock().unwrap().push(req);
        self.responses.lock().unwrap().pop_front().unwrap_or(Ok(Value::Null))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, req: ResourceRequest) -> Result<Value> {
        self.record("get", req)
    }

    async fn post(&self, req: ResourceRequest) -> Result<Value> {
        self.record("post", req)
    }

    async fn put(&self, req: ResourceRequest) -> Result<Value> {
        self.record("put", req)
    }

    async fn delete(&self, req: ResourceRequest) -> Result<Value> {
        self.record("delete", req)
    }
}
