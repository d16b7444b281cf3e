use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use url::Url;

use crate::clients::Executor;
use crate::error::{Error, Result};
use crate::gql_queries::{GraphQLRequest, GraphQLResponse};

const USER_AGENT: &str = concat!("ghactivity/", env!("CARGO_PKG_VERSION"));
/// Longest provider body echoed back in an error.
const MAX_ERROR_BODY: usize = 512;

/// Client for GitHub's GraphQL endpoint
pub struct GitHubClient {
    endpoint: Url,
    token: String,
    agent: ureq::Agent,
}

/// GraphQL endpoint for a GitHub host; anything other than github.com is
/// treated as GitHub Enterprise Server.
pub fn graphql_endpoint(host: &str) -> Result<Url> {
    let raw = if host == "github.com" {
        "https://api.github.com/graphql".to_string()
    } else {
        format!("https://{host}/api/graphql")
    };
    Url::parse(&raw).map_err(|err| Error::configuration(format!("invalid host '{host}': {err}")))
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(host: &str, token: String, timeout: Duration) -> Result<Self> {
        let endpoint = graphql_endpoint(host)?;
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(GitHubClient {
            endpoint,
            token,
            agent,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn post(&self, request: &GraphQLRequest) -> Result<ureq::Response> {
        debug!("POST {} ({} bytes of query)", self.endpoint, request.query.len());
        self.agent
            .post(self.endpoint.as_str())
            .set("Authorization", &format!("Bearer {}", &self.token))
            .set("User-Agent", USER_AGENT)
            .set("Accept", "application/vnd.github+json")
            .send_json(request)
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => {
                    let body = response.into_string().unwrap_or_default();
                    warn!("GitHub GraphQL request failed with HTTP {status}");
                    Error::provider(Some(status), truncate(&body))
                }
                ureq::Error::Transport(transport) => {
                    warn!("GitHub GraphQL request failed: {transport}");
                    Error::provider(None, transport.to_string())
                }
            })
    }
}

impl Executor for GitHubClient {
    fn execute(&self, request: &GraphQLRequest) -> Result<Value> {
        let response: GraphQLResponse<Value> = self.post(request)?.into_json().map_err(|err| {
            Error::provider(None, format!("Failed to parse GitHub response as JSON: {err}"))
        })?;
        into_data(response)
    }
}

/// A response carrying any GraphQL error is a provider failure, even when
/// partial data came back with it.
fn into_data(response: GraphQLResponse<Value>) -> Result<Value> {
    if let Some(summary) = response.error_summary() {
        warn!("GitHub returned GraphQL errors: {summary}");
        return Err(Error::provider(None, summary));
    }
    match response.data {
        Some(Value::Null) | None => Err(Error::provider(None, "response carried no data")),
        Some(data) => Ok(data),
    }
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_for_github_com() {
        assert_eq!(
            graphql_endpoint("github.com").unwrap().as_str(),
            "https://api.github.com/graphql"
        );
    }

    #[test]
    fn test_endpoint_for_enterprise_host() {
        assert_eq!(
            graphql_endpoint("github.example.com").unwrap().as_str(),
            "https://github.example.com/api/graphql"
        );
    }

    #[test]
    fn test_invalid_host() {
        assert!(matches!(
            graphql_endpoint("bad host"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_into_data_prefers_errors() {
        let response: GraphQLResponse<Value> = serde_json::from_str(
            r#"{"data": {"user": null}, "errors": [{"type": "NOT_FOUND", "message": "no such user"}]}"#,
        )
        .unwrap();
        let err = into_data(response).unwrap_err();
        assert!(matches!(err, Error::Provider { status: None, .. }));
        assert!(err.to_string().contains("NOT_FOUND: no such user"));
    }

    #[test]
    fn test_into_data_requires_data() {
        let response: GraphQLResponse<Value> = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(matches!(into_data(response), Err(Error::Provider { .. })));
    }

    #[test]
    fn test_into_data_returns_data() {
        let response: GraphQLResponse<Value> =
            serde_json::from_str(r#"{"data": {"viewer": {"login": "octocat"}}}"#).unwrap();
        assert_eq!(
            into_data(response).unwrap(),
            serde_json::json!({"viewer": {"login": "octocat"}})
        );
    }

    #[test]
    fn test_truncate_long_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY + 10);
        let truncated = truncate(&body);
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate("short"), "short");
    }
}
