use serde::{Deserialize, Serialize};

pub mod activity;
pub mod contributions_collection;
pub mod document;
pub mod extract;
pub mod node;
pub mod repositories;
pub mod viewer;
pub mod vocabulary;

/// GraphQL request structure
#[derive(Debug, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

/// GraphQL response structure
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error structure
#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

impl<T> GraphQLResponse<T> {
    /// Joined messages of all errors in the response, if any.
    pub fn error_summary(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|errors| !errors.is_empty())?;
        Some(
            errors
                .iter()
                .map(|err| match &err.error_type {
                    Some(kind) => format!("{kind}: {}", err.message),
                    None => err.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_summary_joins_messages() {
        let response: GraphQLResponse<serde_json::Value> = serde_json::from_str(
            r#"{"data": null, "errors": [
                {"type": "NOT_FOUND", "message": "Could not resolve to a User"},
                {"message": "second"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            response.error_summary().as_deref(),
            Some("NOT_FOUND: Could not resolve to a User; second")
        );
    }

    #[test]
    fn test_error_summary_none_without_errors() {
        let response: GraphQLResponse<serde_json::Value> =
            serde_json::from_str(r#"{"data": {"viewer": {"login": "x"}}, "errors": []}"#).unwrap();
        assert_eq!(response.error_summary(), None);
    }
}
