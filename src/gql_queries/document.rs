use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::gql_queries::extract::record_at;
use crate::gql_queries::node::QueryNode;
use crate::gql_queries::vocabulary::NODE_PAGE_INFO;
use crate::gql_queries::GraphQLRequest;

/// Where a document is in walking its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    NotStarted,
    InProgress(String),
    Exhausted,
}

/// `pageInfo` of one response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A full selection document: one or more root nodes, with at most one
/// connection anywhere in the tree.
///
/// Fetching pages moves the cursor of that connection in place, so one
/// document must not serve two fetches at once; build a fresh document per
/// fetch instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument {
    roots: Vec<QueryNode>,
    state: PageState,
}

impl QueryDocument {
    pub fn new(roots: Vec<QueryNode>) -> Result<Self> {
        if roots.is_empty() {
            return Err(Error::configuration("a query needs at least one root node"));
        }
        let connections: usize = roots.iter().map(QueryNode::connection_count).sum();
        if connections > 1 {
            return Err(Error::configuration(format!(
                "a query may page through one connection, found {connections}"
            )));
        }
        Ok(QueryDocument {
            roots,
            state: PageState::NotStarted,
        })
    }

    pub fn roots(&self) -> &[QueryNode] {
        &self.roots
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn is_paginated(&self) -> bool {
        self.connection_path().is_some()
    }

    /// Names from the envelope root down to the connection, e.g.
    /// `["user", "gists"]`.
    pub fn connection_path(&self) -> Option<Vec<&'static str>> {
        self.roots.iter().find_map(QueryNode::connection_path)
    }

    pub fn connection(&self) -> Option<&QueryNode> {
        let path = self.connection_path()?;
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.iter().find(|root| root.name() == *first)?;
        for name in rest {
            node = node.child(name)?;
        }
        Some(node)
    }

    /// Request text with every argument inlined as a literal.
    pub fn serialize(&self) -> String {
        let mut out = String::from("query {");
        for root in &self.roots {
            out.push(' ');
            root.write_to(&mut out);
        }
        out.push_str(" }");
        out
    }

    pub fn to_request(&self) -> GraphQLRequest {
        GraphQLRequest {
            query: self.serialize(),
            variables: json!({}),
        }
    }

    /// Reads `pageInfo` of the connection from `envelope` and advances the
    /// page state. When another page exists the connection's cursor is moved
    /// to it, so the next `serialize` asks for that page.
    pub fn next_cursor(&mut self, envelope: &Value) -> Result<PageInfo> {
        if self.state == PageState::Exhausted {
            return Err(Error::configuration(
                "all pages of this query were already read",
            ));
        }
        let mut path = self
            .connection_path()
            .ok_or_else(|| Error::configuration("this query has no connection to page through"))?;
        path.push(NODE_PAGE_INFO);
        let info: PageInfo = record_at(envelope, &path)?;

        if !info.has_next_page {
            self.state = PageState::Exhausted;
            return Ok(info);
        }

        let cursor = info.end_cursor.clone().ok_or_else(|| {
            Error::extraction(format!(
                "'{}' reports another page but no endCursor",
                path.join(".")
            ))
        })?;
        if self.state == PageState::InProgress(cursor.clone()) {
            return Err(Error::extraction(format!(
                "cursor '{cursor}' did not advance between pages"
            )));
        }
        if let Some(connection) = self.roots.iter_mut().find_map(QueryNode::connection_mut) {
            connection.set_cursor(cursor.clone())?;
        }
        self.state = PageState::InProgress(cursor);
        Ok(info)
    }
}

/// Appends one page of items to what was already fetched, in response
/// order and without de-duplication.
pub fn merge_page<T>(accumulated: &mut Vec<T>, page: Vec<T>) {
    accumulated.extend(page);
}
