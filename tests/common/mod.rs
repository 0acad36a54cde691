//! Shared fixtures: a scripted GraphQL transport and canned payloads.

#![allow(dead_code)]

use rickdex::models::{FetchPolicy, QueryError};
use rickdex::services::{GraphQlClient, GraphQlRequest, GraphQlResponse, GraphQlTransport, QueryCoordinator};
use rickdex::{QueryMetrics, StateManager};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Hold = Box<dyn FnOnce() + Send>;

/// What the scripted transport answers for one request.
pub struct Reply {
    pub delay: Duration,
    pub response: Result<GraphQlResponse, QueryError>,
    /// Runs synchronously right before the response is returned
    pub hold: Option<Hold>,
}

impl Reply {
    pub fn response(response: Result<GraphQlResponse, QueryError>) -> Self {
        Self {
            delay: Duration::ZERO,
            response,
            hold: None,
        }
    }

    pub fn data(data: Value) -> Self {
        Self::response(Ok(GraphQlResponse {
            data: Some(data),
            errors: vec![],
        }))
    }

    pub fn error(err: QueryError) -> Self {
        Self::response(Err(err))
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Block the answering task in `hold` without yielding, so aborting the
    /// task cannot stop the response from landing.
    pub fn held(mut self, hold: impl FnOnce() + Send + 'static) -> Self {
        self.hold = Some(Box::new(hold));
        self
    }
}

type Script = dyn Fn(&GraphQlRequest) -> Reply + Send + Sync;

/// Transport that records every request and answers from a script.
pub struct ScriptedTransport {
    requests: Arc<Mutex<Vec<GraphQlRequest>>>,
    script: Box<Script>,
}

impl ScriptedTransport {
    pub fn new(script: impl Fn(&GraphQlRequest) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            script: Box::new(script),
        }
    }

    /// Shared view of the request log, usable after the transport moves into a client
    pub fn log(&self) -> RequestLog {
        RequestLog(Arc::clone(&self.requests))
    }
}

impl GraphQlTransport for ScriptedTransport {
    fn execute(
        &self,
        request: GraphQlRequest,
    ) -> impl Future<Output = Result<GraphQlResponse, QueryError>> + Send {
        let Reply {
            delay,
            response,
            hold,
        } = (self.script)(&request);
        self.requests.lock().unwrap().push(request);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(hold) = hold {
                hold();
            }
            response
        }
    }
}

#[derive(Clone)]
pub struct RequestLog(Arc<Mutex<Vec<GraphQlRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<GraphQlRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn named(&self, operation: &str) -> Vec<GraphQlRequest> {
        self.all()
            .into_iter()
            .filter(|r| r.operation_name == operation)
            .collect()
    }
}

/// Coordinator on the current runtime with fresh state and metrics.
pub fn coordinator(
    transport: ScriptedTransport,
    policy: FetchPolicy,
) -> (Arc<QueryCoordinator<ScriptedTransport>>, RequestLog) {
    let log = transport.log();
    let coordinator = QueryCoordinator::new(
        Arc::new(StateManager::new()),
        Arc::new(GraphQlClient::new(transport)),
        policy,
        tokio::runtime::Handle::current(),
        Arc::new(QueryMetrics::new()),
    );
    (Arc::new(coordinator), log)
}

pub fn character_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": "Alive",
        "species": "Human",
        "image": format!("https://rickandmortyapi.com/api/character/avatar/{id}.jpeg"),
    })
}

pub fn characters_data(characters: &[(&str, &str)]) -> Value {
    let results: Vec<Value> = characters
        .iter()
        .map(|(id, name)| character_json(id, name))
        .collect();
    json!({ "characters": { "results": results } })
}

pub fn rick_detail_data() -> Value {
    json!({
        "character": {
            "id": "1",
            "name": "Rick Sanchez",
            "status": "Alive",
            "species": "Human",
            "type": "",
            "gender": "Male",
            "origin": { "name": "Earth (C-137)" },
            "location": { "name": "Citadel of Ricks" },
            "image": "https://rickandmortyapi.com/api/character/avatar/1.jpeg",
            "episode": [
                { "id": "1", "name": "Pilot", "episode": "S01E01" },
                { "id": "2", "name": "Lawnmower Dog", "episode": "S01E02" }
            ]
        }
    })
}

pub fn episodes_data() -> Value {
    json!({
        "episodes": {
            "results": [
                { "id": "1", "name": "Pilot", "episode": "S01E01", "air_date": "December 2, 2013" },
                { "id": "2", "name": "Lawnmower Dog", "episode": "S01E02", "air_date": "December 9, 2013" }
            ]
        }
    })
}

/// The `name` variable of a `GetCharacters` request, if present
pub fn name_variable(request: &GraphQlRequest) -> Option<&str> {
    request.variables.get("name").and_then(Value::as_str)
}
