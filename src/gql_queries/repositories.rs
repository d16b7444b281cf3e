use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::Result;
use crate::gql_queries::activity::user_node;
use crate::gql_queries::document::QueryDocument;
use crate::gql_queries::extract::connection_nodes;
use crate::gql_queries::node::{ArgValue, Field, QueryNode};
use crate::gql_queries::vocabulary::{
    ARG_DIRECTION, ARG_FIELD, ARG_FIRST, ARG_IS_FORK, ARG_ORDER_BY, ARG_OWNER_AFFILIATIONS,
    FIELD_CREATED_AT, FIELD_FORK_COUNT, FIELD_NAME, FIELD_SIZE, FIELD_STARGAZER_COUNT,
    FIELD_TOTAL_COUNT, FIELD_TOTAL_SIZE, MAX_PAGE_SIZE, NODE_EDGES, NODE_LANGUAGES, NODE_NODE,
    NODE_REPOSITORIES, NODE_USER, NODE_WATCHERS,
};
use crate::temporal::{deserialize_instant, serialize_instant, Created};

/// Filters and ordering for the repositories connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// `None` leaves `isFork` out, so forks and sources both come back.
    pub is_fork: Option<bool>,
    pub owner_affiliations: Vec<String>,
    pub order_field: String,
    pub order_direction: String,
    pub language_order_field: String,
    pub language_order_direction: String,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        RepositoryOptions {
            is_fork: Some(false),
            owner_affiliations: vec!["OWNER".to_string()],
            order_field: "CREATED_AT".to_string(),
            order_direction: "DESC".to_string(),
            language_order_field: "SIZE".to_string(),
            language_order_direction: "DESC".to_string(),
        }
    }
}

fn order_by(field: &str, direction: &str) -> ArgValue {
    ArgValue::Object(vec![
        (ARG_FIELD, ArgValue::enumeration(field)),
        (ARG_DIRECTION, ArgValue::enumeration(direction)),
    ])
}

/// `user(login) { repositories(...) { totalCount nodes { ... languages(...) { ... } } pageInfo { ... } } }`
pub fn query(
    login: &str,
    page_size: i64,
    page_size_ceiling: u32,
    options: &RepositoryOptions,
) -> Result<QueryDocument> {
    let language_edges = QueryNode::new(
        NODE_EDGES,
        vec![],
        vec![
            Field::Leaf(FIELD_SIZE),
            QueryNode::new(NODE_NODE, vec![], vec![Field::Leaf(FIELD_NAME)])?.into(),
        ],
    )?;
    let languages = QueryNode::new(
        NODE_LANGUAGES,
        vec![
            (ARG_FIRST, ArgValue::Int(i64::from(MAX_PAGE_SIZE))),
            (
                ARG_ORDER_BY,
                order_by(
                    &options.language_order_field,
                    &options.language_order_direction,
                ),
            ),
        ],
        vec![Field::Leaf(FIELD_TOTAL_SIZE), language_edges.into()],
    )?;
    let watchers = QueryNode::new(NODE_WATCHERS, vec![], vec![Field::Leaf(FIELD_TOTAL_COUNT)])?;

    let affiliations = options
        .owner_affiliations
        .iter()
        .map(ArgValue::enumeration)
        .collect();
    let mut args = vec![];
    if let Some(is_fork) = options.is_fork {
        args.push((ARG_IS_FORK, ArgValue::Bool(is_fork)));
    }
    args.push((ARG_OWNER_AFFILIATIONS, ArgValue::List(affiliations)));
    args.push((
        ARG_ORDER_BY,
        order_by(&options.order_field, &options.order_direction),
    ));
    let repositories = QueryNode::paginated(
        NODE_REPOSITORIES,
        page_size,
        page_size_ceiling,
        args,
        vec![
            Field::Leaf(FIELD_NAME),
            Field::Leaf(FIELD_CREATED_AT),
            Field::Leaf(FIELD_FORK_COUNT),
            Field::Leaf(FIELD_STARGAZER_COUNT),
            watchers.into(),
            languages.into(),
        ],
    )?;

    let user = user_node(login, vec![repositories.into()])?;
    QueryDocument::new(vec![user])
}

pub fn extract(envelope: &Value) -> Result<Vec<RepositoryRecord>> {
    connection_nodes(envelope, &[NODE_USER, NODE_REPOSITORIES])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub name: String,
    #[serde(
        deserialize_with = "deserialize_instant",
        serialize_with = "serialize_instant"
    )]
    pub created_at: OffsetDateTime,
    pub fork_count: u64,
    pub stargazer_count: u64,
    pub watchers: TotalCount,
    pub languages: LanguageConnection,
}

impl Created for RepositoryRecord {
    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConnection {
    pub total_size: u64,
    pub edges: Vec<LanguageEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEdge {
    pub size: u64,
    pub node: LanguageNode,
}

impl LanguageEdge {
    pub fn language_name(&self) -> &str {
        &self.node.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageNode {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn test_query_text() {
        let document = query("octocat", 10, 100, &RepositoryOptions::default()).unwrap();
        assert_eq!(
            document.serialize(),
            concat!(
                r#"query { user(login: "octocat") { repositories(first: 10, isFork: false, "#,
                r#"ownerAffiliations: [OWNER], orderBy: {field: CREATED_AT, direction: DESC}) "#,
                r#"{ totalCount nodes { name createdAt forkCount stargazerCount "#,
                r#"watchers { totalCount } languages(first: 100, orderBy: {field: SIZE, direction: DESC}) "#,
                r#"{ totalSize edges { size node { name } } } } "#,
                r#"pageInfo { endCursor hasNextPage } } } }"#
            )
        );
    }

    #[test]
    fn test_fork_filter_can_be_dropped() {
        let options = RepositoryOptions {
            is_fork: None,
            ..RepositoryOptions::default()
        };
        let text = query("octocat", 10, 100, &options).unwrap().serialize();
        assert!(!text.contains("isFork"));
        assert!(text.contains("repositories(first: 10, ownerAffiliations: [OWNER], "));
    }

    #[test]
    fn test_languages_are_not_the_paged_connection() {
        let document = query("octocat", 10, 100, &RepositoryOptions::default()).unwrap();
        assert_eq!(
            document.connection_path(),
            Some(vec!["user", "repositories"])
        );
    }

    #[test]
    fn test_bad_affiliation_rejected() {
        let options = RepositoryOptions {
            owner_affiliations: vec!["OWNER, COLLABORATOR".to_string()],
            ..RepositoryOptions::default()
        };
        assert!(matches!(
            query("octocat", 10, 100, &options),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_extract() {
        let envelope = json!({"user": {"repositories": {
            "totalCount": 1,
            "nodes": [{
                "name": "hello",
                "createdAt": "2021-03-04T05:06:07Z",
                "forkCount": 1,
                "stargazerCount": 2,
                "watchers": {"totalCount": 3},
                "languages": {
                    "totalSize": 15,
                    "edges": [
                        {"size": 10, "node": {"name": "Go"}},
                        {"size": 5, "node": {"name": "Rust"}}
                    ]
                }
            }],
            "pageInfo": {"endCursor": null, "hasNextPage": false}
        }}});
        let repos = extract(&envelope).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].created_at, datetime!(2021-03-04 5:06:07 UTC));
        assert_eq!(repos[0].watchers.total_count, 3);
        assert_eq!(repos[0].languages.edges[1].language_name(), "Rust");
    }

    #[test]
    fn test_extract_missing_languages_is_an_error() {
        let envelope = json!({"user": {"repositories": {"nodes": [{
            "name": "hello",
            "createdAt": "2021-03-04T05:06:07Z",
            "forkCount": 0,
            "stargazerCount": 0,
            "watchers": {"totalCount": 0}
        }]}}});
        assert!(matches!(extract(&envelope), Err(Error::Extraction(_))));
    }
}
