//! Names shared by query construction and response extraction.
//!
//! Extraction walks the same names, at the same depth, that construction
//! emitted, so both sides must only ever use these constants.

// Nodes
pub const NODE_USER: &str = "user";
pub const NODE_VIEWER: &str = "viewer";
pub const NODE_NODES: &str = "nodes";
pub const NODE_NODE: &str = "node";
pub const NODE_EDGES: &str = "edges";
pub const NODE_PAGE_INFO: &str = "pageInfo";
pub const NODE_LANGUAGES: &str = "languages";
pub const NODE_WATCHERS: &str = "watchers";
pub const NODE_COMMIT_COMMENTS: &str = "commitComments";
pub const NODE_GIST_COMMENTS: &str = "gistComments";
pub const NODE_ISSUE_COMMENTS: &str = "issueComments";
pub const NODE_REPOSITORY_DISCUSSION_COMMENTS: &str = "repositoryDiscussionComments";
pub const NODE_GISTS: &str = "gists";
pub const NODE_ISSUES: &str = "issues";
pub const NODE_PULL_REQUESTS: &str = "pullRequests";
pub const NODE_REPOSITORY_DISCUSSIONS: &str = "repositoryDiscussions";
pub const NODE_REPOSITORIES: &str = "repositories";
pub const NODE_CONTRIBUTIONS_COLLECTION: &str = "contributionsCollection";

// Leaves
pub const FIELD_LOGIN: &str = "login";
pub const FIELD_NAME: &str = "name";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_TOTAL_COUNT: &str = "totalCount";
pub const FIELD_TOTAL_SIZE: &str = "totalSize";
pub const FIELD_SIZE: &str = "size";
pub const FIELD_END_CURSOR: &str = "endCursor";
pub const FIELD_HAS_NEXT_PAGE: &str = "hasNextPage";
pub const FIELD_FORK_COUNT: &str = "forkCount";
pub const FIELD_STARGAZER_COUNT: &str = "stargazerCount";
pub const FIELD_STARTED_AT: &str = "startedAt";
pub const FIELD_ENDED_AT: &str = "endedAt";
pub const FIELD_RESTRICTED_CONTRIBUTIONS_COUNT: &str = "restrictedContributionsCount";
pub const FIELD_TOTAL_COMMIT_CONTRIBUTIONS: &str = "totalCommitContributions";
pub const FIELD_TOTAL_ISSUE_CONTRIBUTIONS: &str = "totalIssueContributions";
pub const FIELD_TOTAL_PULL_REQUEST_CONTRIBUTIONS: &str = "totalPullRequestContributions";
pub const FIELD_TOTAL_PULL_REQUEST_REVIEW_CONTRIBUTIONS: &str =
    "totalPullRequestReviewContributions";
pub const FIELD_TOTAL_REPOSITORY_CONTRIBUTIONS: &str = "totalRepositoryContributions";

// Arguments
pub const ARG_LOGIN: &str = "login";
pub const ARG_FIRST: &str = "first";
pub const ARG_AFTER: &str = "after";
pub const ARG_IS_FORK: &str = "isFork";
pub const ARG_OWNER_AFFILIATIONS: &str = "ownerAffiliations";
pub const ARG_ORDER_BY: &str = "orderBy";
pub const ARG_FIELD: &str = "field";
pub const ARG_DIRECTION: &str = "direction";
pub const ARG_FROM: &str = "from";
pub const ARG_TO: &str = "to";

/// Every argument key a node may carry.
pub const ARGUMENTS: &[&str] = &[
    ARG_LOGIN,
    ARG_FIRST,
    ARG_AFTER,
    ARG_IS_FORK,
    ARG_OWNER_AFFILIATIONS,
    ARG_ORDER_BY,
    ARG_FIELD,
    ARG_DIRECTION,
    ARG_FROM,
    ARG_TO,
];

pub fn is_known_argument(name: &str) -> bool {
    ARGUMENTS.contains(&name)
}

/// GitHub's hard limit on `first` for any connection.
pub const MAX_PAGE_SIZE: u32 = 100;
