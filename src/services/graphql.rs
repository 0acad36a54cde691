use super::avatars::AvatarSource;
use super::queries::{self, CharacterData, CharactersData, EpisodesData, GraphQlRequest};
use crate::models::{
    AppConfig, CharacterLookup, CharacterPage, EpisodePage, NavigationParam, QueryError,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
}

/// Envelope of every GraphQL response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

/// Executes a GraphQL request and returns the raw envelope.
///
/// The HTTP implementation is [`HttpTransport`]; tests substitute scripted
/// transports to control latency and response order.
pub trait GraphQlTransport: Send + Sync + 'static {
    fn execute(
        &self,
        request: GraphQlRequest,
    ) -> impl Future<Output = Result<GraphQlResponse, QueryError>> + Send;
}

/// GraphQL over HTTP POST using reqwest.
///
/// Clones share one connection pool; the avatar loader uses a clone for its
/// image GETs.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from the application config
    ///
    /// # Errors
    /// Fails if a configured header is not a valid HTTP header or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, QueryError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| QueryError::Transport(format!("header {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| QueryError::Transport(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }

        let timeout = config.request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rickdex/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim().to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> QueryError {
        if err.is_timeout() {
            QueryError::Timeout(self.timeout)
        } else {
            QueryError::Transport(err.to_string())
        }
    }
}

impl GraphQlTransport for HttpTransport {
    async fn execute(&self, request: GraphQlRequest) -> Result<GraphQlResponse, QueryError> {
        tracing::debug!(
            "POST {} operation={} variables={:?}",
            self.endpoint,
            request.operation_name,
            request.variables
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;

        match serde_json::from_slice::<GraphQlResponse>(&body) {
            // GraphQL servers may report errors with a 4xx status; keep their messages.
            Ok(parsed) if status.is_success() || !parsed.errors.is_empty() => Ok(parsed),
            Ok(_) => Err(QueryError::Http {
                status: status.as_u16(),
            }),
            Err(_) if !status.is_success() => Err(QueryError::Http {
                status: status.as_u16(),
            }),
            Err(e) => Err(QueryError::Decode(e.to_string())),
        }
    }
}

impl AvatarSource for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, QueryError> {
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        Ok(body.to_vec())
    }
}

/// Typed access to the three operations.
pub struct GraphQlClient<T> {
    transport: T,
}

impl<T: GraphQlTransport> GraphQlClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GetCharacters`, optionally filtered by name
    pub async fn characters(&self, name: Option<&str>) -> Result<CharacterPage, QueryError> {
        let data: CharactersData = self.run(queries::characters_request(name)).await?;
        Ok(data.characters.unwrap_or_default())
    }

    /// `GetCharacter`; `Ok` with `character: None` means no such character
    pub async fn character(&self, param: &NavigationParam) -> Result<CharacterLookup, QueryError> {
        let data: CharacterData = self.run(queries::character_request(param)).await?;
        Ok(data)
    }

    /// `GetEpisodes`, first page
    pub async fn episodes(&self) -> Result<EpisodePage, QueryError> {
        let data: EpisodesData = self.run(queries::episodes_request()).await?;
        Ok(data.episodes.unwrap_or_default())
    }

    async fn run<D: DeserializeOwned>(&self, request: GraphQlRequest) -> Result<D, QueryError> {
        let operation = request.operation_name;
        let response = self.transport.execute(request).await?;

        if !response.errors.is_empty() {
            let messages = response.errors.into_iter().map(|e| e.message).collect();
            return Err(QueryError::GraphQl(messages));
        }

        let data = response
            .data
            .ok_or_else(|| QueryError::Decode(format!("{operation} returned no data")))?;
        serde_json::from_value(data).map_err(|e| QueryError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned envelope and records the requests it saw.
    struct CannedTransport {
        response: Result<GraphQlResponse, QueryError>,
        seen: Mutex<Vec<GraphQlRequest>>,
    }

    impl CannedTransport {
        fn new(response: Result<GraphQlResponse, QueryError>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn data(data: Value) -> Self {
            Self::new(Ok(GraphQlResponse {
                data: Some(data),
                errors: Vec::new(),
            }))
        }
    }

    impl GraphQlTransport for CannedTransport {
        async fn execute(&self, request: GraphQlRequest) -> Result<GraphQlResponse, QueryError> {
            self.seen.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    #[test]
    fn test_characters_empty_results_is_not_an_error() {
        let client = GraphQlClient::new(CannedTransport::data(
            json!({ "characters": { "results": [] } }),
        ));
        let page = tokio_test::block_on(client.characters(None)).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_character_null_is_a_miss() {
        let client = GraphQlClient::new(CannedTransport::data(json!({ "character": null })));
        let param = NavigationParam::parse("999999").unwrap();
        let lookup = tokio_test::block_on(client.character(&param)).unwrap();
        assert!(lookup.character.is_none());
    }

    #[test]
    fn test_graphql_errors_become_query_error() {
        let client = GraphQlClient::new(CannedTransport::new(Ok(GraphQlResponse {
            data: Some(json!({ "characters": null })),
            errors: vec![GraphQlErrorEntry {
                message: "404: Not Found".into(),
            }],
        })));
        let err = tokio_test::block_on(client.characters(Some("zzz"))).unwrap_err();
        assert_eq!(err, QueryError::GraphQl(vec!["404: Not Found".into()]));
    }

    #[test]
    fn test_missing_data_is_decode_error() {
        let client = GraphQlClient::new(CannedTransport::new(Ok(GraphQlResponse::default())));
        let err = tokio_test::block_on(client.episodes()).unwrap_err();
        assert!(matches!(err, QueryError::Decode(msg) if msg.contains("GetEpisodes")));
    }

    #[test]
    fn test_transport_error_passes_through() {
        let client = GraphQlClient::new(CannedTransport::new(Err(QueryError::Transport(
            "connection refused".into(),
        ))));
        let err = tokio_test::block_on(client.episodes()).unwrap_err();
        assert_eq!(err.display_message(), "Error: Network request failed: connection refused");
    }

    #[test]
    fn test_sends_trimmed_filter_variable() {
        let client = GraphQlClient::new(CannedTransport::data(
            json!({ "characters": { "results": [] } }),
        ));
        tokio_test::block_on(client.characters(Some("rick"))).unwrap();

        let seen = client.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].variables.get("name"), Some(&json!("rick")));
    }
}
