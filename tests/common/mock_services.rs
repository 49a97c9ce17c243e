//! Scripted transport for driving the vendor adapters without a network.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use gitgate::infrastructure::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use gitgate::common::result::GitgateResult;

struct Route {
    method: HttpMethod,
    url_fragment: String,
    responses: VecDeque<HttpResponse>,
}

/// Replies from route rules and records every request.
///
/// A route matches when the method is equal and the URL contains its
/// fragment. Later routes win over earlier ones. A route with several
/// responses hands them out in order and then keeps repeating the last.
/// Unmatched requests get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: HttpMethod, url_fragment: &str, response: HttpResponse) -> &Self {
        self.on_sequence(method, url_fragment, vec![response])
    }

    pub fn on_json(&self, method: HttpMethod, url_fragment: &str, status: u16, body: Value) -> &Self {
        self.on(method, url_fragment, HttpResponse::new(status, body.to_string()))
    }

    pub fn on_sequence(&self, method: HttpMethod, url_fragment: &str, responses: Vec<HttpResponse>) -> &Self {
        self.routes.lock().unwrap().push(Route {
            method,
            url_fragment: url_fragment.to_string(),
            responses: responses.into(),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: HttpMethod, url_fragment: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url.contains(url_fragment))
            .collect()
    }

    pub fn count(&self, method: HttpMethod, url_fragment: &str) -> usize {
        self.requests_to(method, url_fragment).len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> GitgateResult<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .rev()
            .find(|route| route.method == request.method && request.url.contains(&route.url_fragment));
        let response = match route {
            Some(route) if route.responses.len() > 1 => route.responses.pop_front(),
            Some(route) => route.responses.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| HttpResponse::new(404, r#"{"message":"Not Found"}"#)))
    }
}
