//! Request-level operations: build the query, page through it, reduce.

use std::cell::Cell;

use log::info;
use serde::Serialize;
use time::OffsetDateTime;

use crate::clients::{fetch_all, fetch_once, Executor};
use crate::error::{Error, ErrorKind, Result};
use crate::gql_queries::activity::{ActivityItem, ListEntity};
use crate::gql_queries::contributions_collection::{self, ContributionTotals};
use crate::gql_queries::repositories::{self, RepositoryOptions};
use crate::gql_queries::viewer;
use crate::rollup::{cumulate_into, LanguageStats, RepoStats};
use crate::temporal::{count_before, TimeWindow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub entity: ListEntity,
    pub login: String,
    /// `totalCount` as reported by the provider.
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<usize>,
    pub items: Vec<ActivityItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryReport {
    pub repositories: RepoStats,
    pub languages: LanguageStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        let status = match err {
            Error::Provider { status, .. } => *status,
            _ => None,
        };
        ErrorReport {
            kind: err.kind(),
            message: err.to_string(),
            status,
        }
    }
}

/// Either a result or a structured error, as handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome<T> {
    Ok(T),
    Error(ErrorReport),
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(err) => Outcome::Error(ErrorReport::from(&err)),
        }
    }
}

pub struct ActivityService<E> {
    executor: E,
    page_size: i64,
    page_size_ceiling: u32,
}

impl<E: Executor> ActivityService<E> {
    pub fn new(executor: E, page_size: i64, page_size_ceiling: u32) -> Self {
        ActivityService {
            executor,
            page_size,
            page_size_ceiling,
        }
    }

    /// Every item of `entity` for `login`, plus how many were created
    /// before `cutoff` when one is given.
    pub fn activity(
        &self,
        entity: ListEntity,
        login: &str,
        cutoff: Option<OffsetDateTime>,
    ) -> Result<ActivityReport> {
        let mut document = entity.query(login, self.page_size, self.page_size_ceiling)?;
        let total = Cell::new(None);
        let items = fetch_all(&self.executor, &mut document, |envelope| {
            if total.get().is_none() {
                total.set(Some(entity.total_count(envelope)?));
            }
            entity.extract(envelope)
        })?;
        let created_before = cutoff.map(|cutoff| count_before(&items, cutoff));
        info!("{login}: {} {entity}", items.len());
        Ok(ActivityReport {
            entity,
            login: login.trim().to_string(),
            total: total.get().unwrap_or_default(),
            created_before,
            items,
        })
    }

    /// Repository and language totals for repositories created in `window`.
    pub fn repositories(
        &self,
        login: &str,
        window: TimeWindow,
        options: &RepositoryOptions,
    ) -> Result<RepositoryReport> {
        let mut document =
            repositories::query(login, self.page_size, self.page_size_ceiling, options)?;
        let repos = fetch_all(&self.executor, &mut document, repositories::extract)?;
        let mut report = RepositoryReport::default();
        cumulate_into(
            &repos,
            window,
            &mut report.repositories,
            &mut report.languages,
        );
        info!(
            "{login}: {} of {} repositories inside the window",
            report.repositories.total_count,
            repos.len()
        );
        Ok(report)
    }

    pub fn contributions(
        &self,
        login: &str,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<ContributionTotals> {
        let document = contributions_collection::query(login, from, to)?;
        let envelope = fetch_once(&self.executor, &document)?;
        contributions_collection::totals(&envelope)
    }

    /// Login of the account the credential belongs to.
    pub fn viewer_login(&self) -> Result<String> {
        let document = viewer::query()?;
        let envelope = fetch_once(&self.executor, &document)?;
        viewer::extract_login(&envelope)
    }

    /// Canonical login of the named user; an unknown user is an error.
    pub fn user_login(&self, login: &str) -> Result<String> {
        let document = viewer::user_query(login)?;
        let envelope = fetch_once(&self.executor, &document)?;
        viewer::extract_user_login(&envelope)
    }
}
