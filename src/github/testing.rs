use super::transport::{ApiResponse, Transport};
use crate::error::Result;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// In-memory transport that replays canned responses per URL.
///
/// Responses for one URL are served in the order they were routed; the
/// last one repeats. Unrouted URLs answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: RefCell<HashMap<String, VecDeque<ApiResponse>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, response: ApiResponse) -> Self {
        self.routes
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<ApiResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: url.to_string(),
            query: query.to_vec(),
        });

        let mut routes = self.routes.borrow_mut();
        let response = match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response
            .unwrap_or_else(|| ApiResponse::ok(r#"{"message":"Not Found"}"#).with_status(404)))
    }
}
