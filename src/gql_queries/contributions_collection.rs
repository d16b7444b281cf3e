use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};

use crate::error::{Error, Result};
use crate::gql_queries::activity::user_node;
use crate::gql_queries::document::QueryDocument;
use crate::gql_queries::extract::record_at;
use crate::gql_queries::node::{ArgValue, Field, QueryNode};
use crate::gql_queries::vocabulary::{
    ARG_FROM, ARG_TO, FIELD_ENDED_AT, FIELD_RESTRICTED_CONTRIBUTIONS_COUNT, FIELD_STARTED_AT,
    FIELD_TOTAL_COMMIT_CONTRIBUTIONS, FIELD_TOTAL_ISSUE_CONTRIBUTIONS,
    FIELD_TOTAL_PULL_REQUEST_CONTRIBUTIONS, FIELD_TOTAL_PULL_REQUEST_REVIEW_CONTRIBUTIONS,
    FIELD_TOTAL_REPOSITORY_CONTRIBUTIONS, NODE_CONTRIBUTIONS_COLLECTION, NODE_USER,
};
use crate::temporal::format_instant;

/// `user(login) { contributionsCollection(from, to) { startedAt endedAt <six totals> } }`.
/// Not paginated: the provider answers with the totals directly.
///
/// The window is `[from, to)`: `from` is inclusive and `to` exclusive, like
/// every other window in this crate. GitHub treats its `to` argument as
/// inclusive, so the last whole second before `to` is sent instead. A window
/// shorter than one second is empty and rejected.
pub fn query(login: &str, from: OffsetDateTime, to: OffsetDateTime) -> Result<QueryDocument> {
    let last_included = to
        .checked_sub(Duration::SECOND)
        .filter(|last| *last >= from)
        .ok_or_else(|| {
            Error::configuration(format!("contribution window [{from}, {to}) is empty"))
        })?;
    let collection = QueryNode::new(
        NODE_CONTRIBUTIONS_COLLECTION,
        vec![
            (ARG_FROM, ArgValue::Str(format_instant(from)?)),
            (ARG_TO, ArgValue::Str(format_instant(last_included)?)),
        ],
        vec![
            Field::Leaf(FIELD_STARTED_AT),
            Field::Leaf(FIELD_ENDED_AT),
            Field::Leaf(FIELD_RESTRICTED_CONTRIBUTIONS_COUNT),
            Field::Leaf(FIELD_TOTAL_COMMIT_CONTRIBUTIONS),
            Field::Leaf(FIELD_TOTAL_ISSUE_CONTRIBUTIONS),
            Field::Leaf(FIELD_TOTAL_PULL_REQUEST_CONTRIBUTIONS),
            Field::Leaf(FIELD_TOTAL_PULL_REQUEST_REVIEW_CONTRIBUTIONS),
            Field::Leaf(FIELD_TOTAL_REPOSITORY_CONTRIBUTIONS),
        ],
    )?;
    let user = user_node(login, vec![collection.into()])?;
    QueryDocument::new(vec![user])
}

/// Raw collection as the provider sends it. Counters the provider leaves
/// out are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContributionsCollection {
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub restricted_contributions_count: u64,
    pub total_commit_contributions: u64,
    pub total_issue_contributions: u64,
    pub total_pull_request_contributions: u64,
    pub total_pull_request_review_contributions: u64,
    pub total_repository_contributions: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionTotals {
    pub restricted: u64,
    pub commits: u64,
    pub issues: u64,
    pub pull_requests: u64,
    pub pull_request_reviews: u64,
    pub repositories: u64,
}

impl From<&ContributionsCollection> for ContributionTotals {
    fn from(collection: &ContributionsCollection) -> Self {
        ContributionTotals {
            restricted: collection.restricted_contributions_count,
            commits: collection.total_commit_contributions,
            issues: collection.total_issue_contributions,
            pull_requests: collection.total_pull_request_contributions,
            pull_request_reviews: collection.total_pull_request_review_contributions,
            repositories: collection.total_repository_contributions,
        }
    }
}

pub fn extract(envelope: &Value) -> Result<ContributionsCollection> {
    record_at(envelope, &[NODE_USER, NODE_CONTRIBUTIONS_COLLECTION])
}

pub fn totals(envelope: &Value) -> Result<ContributionTotals> {
    Ok(ContributionTotals::from(&extract(envelope)?))
}
