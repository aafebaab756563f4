//! In-memory registry for tests and single-process development.

use std::sync::{Arc, Mutex, PoisonError};

use super::{RemoteClient, RemoteRequest, RemoteResponse, TransportError};
use crate::record::HttpVerb;

pub type Reply = Result<RemoteResponse, TransportError>;

struct Route {
    verb: HttpVerb,
    endpoint: String,
    query: Option<Vec<(String, String)>>,
    replies: Vec<Reply>,
    served: usize,
}

impl Route {
    fn matches(&self, verb: HttpVerb, request: &RemoteRequest) -> bool {
        if self.verb != verb || self.endpoint != request.endpoint {
            return false;
        }
        match &self.query {
            None => true,
            Some(expected) => expected
                .iter()
                .all(|(k, v)| request.param(k) == Some(v.as_str())),
        }
    }

    /// Replies are served in order; the last one repeats.
    fn next_reply(&mut self) -> Reply {
        let index = self.served.min(self.replies.len().saturating_sub(1));
        self.served += 1;
        self.replies[index].clone()
    }
}

/// A request the in-memory registry received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub verb: HttpVerb,
    pub request: RemoteRequest,
}

#[derive(Default)]
struct RemoteState {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

/// Scripted registry that answers from configured routes.
///
/// Routes registered later take precedence. Requests with no matching route
/// get an empty 404.
///
/// ## Example
///
/// ```
/// use registry_sync::transport::{InMemoryRemote, RemoteClient, RemoteRequest, RemoteResponse};
/// use registry_sync::HttpVerb;
/// use serde_json::json;
///
/// let remote = InMemoryRemote::new();
/// remote.respond_to(
///     HttpVerb::Get,
///     "firms",
///     &[("firm", "ac100")],
///     RemoteResponse::ok_json(json!({"firm": "ac100", "name": "Acme"})),
/// );
///
/// let response = remote.get(&RemoteRequest::new("firms").with_param("firm", "ac100")).unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(remote.request_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_route(&self, verb: HttpVerb, endpoint: &str, query: Option<&[(&str, &str)]>, replies: Vec<Reply>) {
        let query = query.map(|pairs| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        });
        self.state().routes.push(Route {
            verb,
            endpoint: endpoint.to_string(),
            query,
            replies,
            served: 0,
        });
    }

    /// Answer every `verb` request to `endpoint`.
    pub fn respond(&self, verb: HttpVerb, endpoint: &str, response: RemoteResponse) {
        self.add_route(verb, endpoint, None, vec![Ok(response)]);
    }

    /// Answer requests to `endpoint` carrying all of the given query params.
    pub fn respond_to(
        &self,
        verb: HttpVerb,
        endpoint: &str,
        query: &[(&str, &str)],
        response: RemoteResponse,
    ) {
        self.add_route(verb, endpoint, Some(query), vec![Ok(response)]);
    }

    /// Answer successive matching requests with successive replies.
    pub fn respond_in_sequence(
        &self,
        verb: HttpVerb,
        endpoint: &str,
        query: &[(&str, &str)],
        replies: Vec<Reply>,
    ) {
        if replies.is_empty() {
            return;
        }
        self.add_route(verb, endpoint, Some(query), replies);
    }

    /// Fail every `verb` request to `endpoint` at the transport level.
    pub fn fail(&self, verb: HttpVerb, endpoint: &str, error: TransportError) {
        self.add_route(verb, endpoint, None, vec![Err(error)]);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    pub fn requests_to(&self, verb: HttpVerb, endpoint: &str) -> Vec<RemoteRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.verb == verb && r.request.endpoint == endpoint)
            .map(|r| r.request.clone())
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    fn handle(&self, verb: HttpVerb, request: &RemoteRequest) -> Reply {
        let mut state = self.state();
        state.requests.push(RecordedRequest {
            verb,
            request: request.clone(),
        });
        match state
            .routes
            .iter_mut()
            .rev()
            .find(|route| route.matches(verb, request))
        {
            Some(route) => route.next_reply(),
            None => Ok(RemoteResponse::new(404, "")),
        }
    }
}

impl RemoteClient for InMemoryRemote {
    fn get(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.handle(HttpVerb::Get, request)
    }

    fn post(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.handle(HttpVerb::Post, request)
    }

    fn put(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.handle(HttpVerb::Put, request)
    }

    fn patch(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.handle(HttpVerb::Patch, request)
    }

    fn delete(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.handle(HttpVerb::Delete, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unmatched_request_is_404() {
        let remote = InMemoryRemote::new();
        let response = remote.get(&RemoteRequest::new("nowhere")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(remote.request_count(), 1);
    }

    #[test]
    fn later_routes_take_precedence() {
        let remote = InMemoryRemote::new();
        remote.respond(HttpVerb::Get, "firms", RemoteResponse::new(500, "down"));
        remote.respond_to(
            HttpVerb::Get,
            "firms",
            &[("firm", "ac100")],
            RemoteResponse::ok_json(json!({"firm": "ac100"})),
        );

        let hit = remote
            .get(&RemoteRequest::new("firms").with_param("firm", "ac100"))
            .unwrap();
        let miss = remote
            .get(&RemoteRequest::new("firms").with_param("firm", "zz999"))
            .unwrap();
        assert_eq!(hit.status, 200);
        assert_eq!(miss.status, 500);
    }

    #[test]
    fn sequence_repeats_last_reply() {
        let remote = InMemoryRemote::new();
        remote.respond_in_sequence(
            HttpVerb::Post,
            "firms",
            &[],
            vec![
                Err(TransportError::Connect("refused".into())),
                Ok(RemoteResponse::ok_json(json!({"firm": "ac100"}))),
            ],
        );

        let request = RemoteRequest::new("firms");
        assert!(remote.post(&request).is_err());
        assert_eq!(remote.post(&request).unwrap().status, 200);
        assert_eq!(remote.post(&request).unwrap().status, 200);
        assert_eq!(remote.requests_to(HttpVerb::Post, "firms").len(), 3);
    }
}
