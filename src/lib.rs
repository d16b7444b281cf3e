//! Build, page through and reduce GitHub GraphQL activity queries.

pub mod clients;
pub mod config;
pub mod error;
pub mod gql_queries;
pub mod rollup;
pub mod service;
pub mod temporal;

pub use clients::github::GitHubClient;
pub use clients::{fetch_all, fetch_once, Executor};
pub use error::{Error, ErrorKind, Result};
pub use gql_queries::activity::{ActivityItem, ListEntity};
pub use gql_queries::document::{PageInfo, PageState, QueryDocument};
pub use gql_queries::node::{ArgValue, Field, QueryNode};
pub use service::{ActivityReport, ActivityService, ErrorReport, Outcome, RepositoryReport};
pub use temporal::{Direction, ScanOrder, TimeWindow};
