use serde_json::Value;

use crate::error::Result;
use crate::gql_queries::activity::user_node;
use crate::gql_queries::document::QueryDocument;
use crate::gql_queries::extract::record_at;
use crate::gql_queries::node::{Field, QueryNode};
use crate::gql_queries::vocabulary::{FIELD_LOGIN, NODE_USER, NODE_VIEWER};

/// `query { viewer { login } }`: who the credential belongs to.
pub fn query() -> Result<QueryDocument> {
    let viewer = QueryNode::new(NODE_VIEWER, vec![], vec![Field::Leaf(FIELD_LOGIN)])?;
    QueryDocument::new(vec![viewer])
}

pub fn extract_login(envelope: &Value) -> Result<String> {
    record_at(envelope, &[NODE_VIEWER, FIELD_LOGIN])
}

/// `query { user(login: "...") { login } }`: the canonical login of a named
/// user, which also tells whether the account exists.
pub fn user_query(login: &str) -> Result<QueryDocument> {
    let user = user_node(login, vec![Field::Leaf(FIELD_LOGIN)])?;
    QueryDocument::new(vec![user])
}

pub fn extract_user_login(envelope: &Value) -> Result<String> {
    record_at(envelope, &[NODE_USER, FIELD_LOGIN])
}
