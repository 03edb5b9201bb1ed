// In memory transports serving canned provider payloads, every request is recorded

use super::http::{HttpResponse, HttpTransport};
use super::rpc::RpcTransport;
use crate::error::SourceError;
use serde_json::Value;
use serde_json::value::RawValue;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Get {
        url: String,
        query: Vec<(String, String)>,
    },
    Post {
        url: String,
        body: Value,
    },
}

impl RecordedRequest {
    pub fn url(&self) -> &str {
        match self {
            RecordedRequest::Get { url, .. } => url,
            RecordedRequest::Post { url, .. } => url,
        }
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        match self {
            RecordedRequest::Get { query, .. } => query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            RecordedRequest::Post { .. } => None,
        }
    }
}

type HttpResponder = dyn Fn(&RecordedRequest) -> HttpResponse + Send + Sync;

pub struct MockHttp {
    responder: Box<HttpResponder>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttp {
    pub fn new(
        responder: impl Fn(&RecordedRequest) -> HttpResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, request: RecordedRequest) -> HttpResponse {
        let resp = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        resp
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockHttp {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, SourceError> {
        Ok(self.respond(RecordedRequest::Get {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, SourceError> {
        Ok(self.respond(RecordedRequest::Post {
            url: url.to_string(),
            body: body.clone(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Vec<Value>,
}

type RpcResponder = dyn Fn(&str, &[Value]) -> Result<String, SourceError> + Send + Sync;

pub struct MockRpc {
    responder: Box<RpcResponder>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRpc {
    pub fn new(
        responder: impl Fn(&str, &[Value]) -> Result<String, SourceError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }
}

impl RpcTransport for MockRpc {
    fn call(&self, method: &str, params: &[Value]) -> Result<Box<RawValue>, SourceError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params: params.to_vec(),
        });

        let text = (self.responder)(method, params)?;
        Ok(RawValue::from_string(text)?)
    }
}
