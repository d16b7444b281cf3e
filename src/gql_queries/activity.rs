//! The eight list entities that share one shape:
//! `user(login) { login <connection>(first) { totalCount nodes { createdAt } pageInfo { ... } } }`.

use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::gql_queries::document::QueryDocument;
use crate::gql_queries::extract::{connection_nodes, record_at};
use crate::gql_queries::node::{ArgValue, Field, QueryNode};
use crate::gql_queries::vocabulary::{
    ARG_LOGIN, FIELD_CREATED_AT, FIELD_LOGIN, FIELD_TOTAL_COUNT, NODE_COMMIT_COMMENTS,
    NODE_GISTS, NODE_GIST_COMMENTS, NODE_ISSUES, NODE_ISSUE_COMMENTS, NODE_PULL_REQUESTS,
    NODE_REPOSITORY_DISCUSSIONS, NODE_REPOSITORY_DISCUSSION_COMMENTS, NODE_USER,
};
use crate::temporal::{deserialize_instant, serialize_instant, Created};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ListEntity {
    CommitComments,
    GistComments,
    IssueComments,
    RepositoryDiscussionComments,
    Gists,
    Issues,
    PullRequests,
    RepositoryDiscussions,
}

impl ListEntity {
    pub const ALL: [ListEntity; 8] = [
        ListEntity::CommitComments,
        ListEntity::GistComments,
        ListEntity::IssueComments,
        ListEntity::RepositoryDiscussionComments,
        ListEntity::Gists,
        ListEntity::Issues,
        ListEntity::PullRequests,
        ListEntity::RepositoryDiscussions,
    ];

    /// Name of the connection under `user`.
    pub fn connection(self) -> &'static str {
        match self {
            ListEntity::CommitComments => NODE_COMMIT_COMMENTS,
            ListEntity::GistComments => NODE_GIST_COMMENTS,
            ListEntity::IssueComments => NODE_ISSUE_COMMENTS,
            ListEntity::RepositoryDiscussionComments => NODE_REPOSITORY_DISCUSSION_COMMENTS,
            ListEntity::Gists => NODE_GISTS,
            ListEntity::Issues => NODE_ISSUES,
            ListEntity::PullRequests => NODE_PULL_REQUESTS,
            ListEntity::RepositoryDiscussions => NODE_REPOSITORY_DISCUSSIONS,
        }
    }

    pub fn query(self, login: &str, page_size: i64, page_size_ceiling: u32) -> Result<QueryDocument> {
        let connection = QueryNode::paginated(
            self.connection(),
            page_size,
            page_size_ceiling,
            vec![],
            vec![Field::Leaf(FIELD_CREATED_AT)],
        )?;
        let user = user_node(login, vec![Field::Leaf(FIELD_LOGIN), connection.into()])?;
        QueryDocument::new(vec![user])
    }

    /// Items of one page, in provider order.
    pub fn extract(self, envelope: &Value) -> Result<Vec<ActivityItem>> {
        connection_nodes(envelope, &[NODE_USER, self.connection()])
    }

    /// `totalCount` the provider reports for the whole connection.
    pub fn total_count(self, envelope: &Value) -> Result<u64> {
        record_at(envelope, &[NODE_USER, self.connection(), FIELD_TOTAL_COUNT])
    }
}

impl Display for ListEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ListEntity::CommitComments => "commit comments",
            ListEntity::GistComments => "gist comments",
            ListEntity::IssueComments => "issue comments",
            ListEntity::RepositoryDiscussionComments => "repository discussion comments",
            ListEntity::Gists => "gists",
            ListEntity::Issues => "issues",
            ListEntity::PullRequests => "pull requests",
            ListEntity::RepositoryDiscussions => "repository discussions",
        };
        f.write_str(name)
    }
}

/// One extracted comment, gist, issue, pull request or discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    #[serde(
        deserialize_with = "deserialize_instant",
        serialize_with = "serialize_instant"
    )]
    pub created_at: OffsetDateTime,
}

impl Created for ActivityItem {
    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

/// `user(login: "...") { fields }`, the root of every user query.
pub(crate) fn user_node(login: &str, fields: Vec<Field>) -> Result<QueryNode> {
    let login = login.trim();
    if login.is_empty() {
        return Err(Error::configuration("a user login is required"));
    }
    QueryNode::new(NODE_USER, vec![(ARG_LOGIN, ArgValue::string(login))], fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gql_queries::document::PageState;
    use crate::temporal::count_before;
    use serde_json::json;
    use time::macros::datetime;

    fn commit_comments_page() -> Value {
        json!({
            "user": {
                "login": "octocat",
                "commitComments": {
                    "totalCount": 3,
                    "nodes": [
                        {"createdAt": "2023-10-28T10:00:00Z"},
                        {"createdAt": "2023-10-27T09:00:00Z"},
                        {"createdAt": "2023-10-26T08:00:00Z"}
                    ],
                    "pageInfo": {"endCursor": "cursor123", "hasNextPage": false}
                }
            }
        })
    }

    #[test]
    fn test_commit_comments_query_text() {
        let document = ListEntity::CommitComments.query("octocat", 100, 100).unwrap();
        assert_eq!(
            document.serialize(),
            r#"query { user(login: "octocat") { login commitComments(first: 100) { totalCount nodes { createdAt } pageInfo { endCursor hasNextPage } } } }"#
        );
    }

    #[test]
    fn test_every_entity_has_one_connection_shape() {
        for entity in ListEntity::ALL {
            let text = entity.query("octocat", 10, 100).unwrap().serialize();
            assert_eq!(text.matches("totalCount").count(), 1, "{entity}");
            assert_eq!(text.matches("nodes {").count(), 1, "{entity}");
            assert_eq!(
                text.matches("pageInfo { endCursor hasNextPage }").count(),
                1,
                "{entity}"
            );
            let total = text.find("totalCount").unwrap();
            let nodes = text.find("nodes {").unwrap();
            let page_info = text.find("pageInfo").unwrap();
            assert!(total < nodes && nodes < page_info, "{entity}");
        }
    }

    #[test]
    fn test_empty_login_rejected() {
        let err = ListEntity::Gists.query("  ", 10, 100).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_extract_returns_all_items_in_order() {
        let items = ListEntity::CommitComments
            .extract(&commit_comments_page())
            .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].created_at, datetime!(2023-10-28 10:00 UTC));
        assert_eq!(items[2].created_at, datetime!(2023-10-26 8:00 UTC));
        assert_eq!(
            count_before(&items, datetime!(2023-10-27 23:59:59 UTC)),
            2
        );
    }

    #[test]
    fn test_extract_empty_nodes_is_not_an_error() {
        let envelope = json!({"user": {"gists": {"nodes": []}}});
        assert!(ListEntity::Gists.extract(&envelope).unwrap().is_empty());
    }

    #[test]
    fn test_extract_missing_user_is_an_error() {
        assert!(matches!(
            ListEntity::Issues.extract(&json!({})),
            Err(Error::Extraction(_))
        ));
        assert!(matches!(
            ListEntity::Issues.extract(&json!({"user": {}})),
            Err(Error::Extraction(_))
        ));
    }

    #[test]
    fn test_extract_bad_timestamp_is_an_error() {
        let envelope = json!({"user": {"issues": {"nodes": [{"createdAt": "soon"}]}}});
        assert!(matches!(
            ListEntity::Issues.extract(&envelope),
            Err(Error::Extraction(_))
        ));
    }

    #[test]
    fn test_total_count() {
        assert_eq!(
            ListEntity::CommitComments
                .total_count(&commit_comments_page())
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_page_info_follows_connection() {
        let mut document = ListEntity::CommitComments.query("octocat", 3, 100).unwrap();
        document.next_cursor(&commit_comments_page()).unwrap();
        assert_eq!(document.state(), &PageState::Exhausted);
    }

    #[test]
    fn test_login_is_escaped() {
        let document = ListEntity::Gists.query(r#"x") { admin }"#, 1, 100).unwrap();
        assert!(document
            .serialize()
            .starts_with(r#"query { user(login: "x\") { admin }")"#));
    }
}
