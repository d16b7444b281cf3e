use log::{debug, info};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::gql_queries::document::{merge_page, QueryDocument};
use crate::gql_queries::GraphQLRequest;

pub mod github;

/// Sends one GraphQL request and returns its `data` object.
pub trait Executor {
    fn execute(&self, request: &GraphQLRequest) -> Result<Value>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, request: &GraphQLRequest) -> Result<Value> {
        (**self).execute(request)
    }
}

/// Reads every page of the connection in `document`, merging the items
/// `extract` pulls from each page in response order.
pub fn fetch_all<E, T, F>(executor: &E, document: &mut QueryDocument, extract: F) -> Result<Vec<T>>
where
    E: Executor + ?Sized,
    F: Fn(&Value) -> Result<Vec<T>>,
{
    let connection = document
        .connection_path()
        .ok_or_else(|| Error::configuration("this query has no connection to page through"))?
        .join(".");

    let mut items = Vec::new();
    let mut pages = 0usize;
    loop {
        let envelope = executor.execute(&document.to_request())?;
        let page = extract(&envelope)?;
        pages += 1;
        debug!("{connection}: page {pages} returned {} items", page.len());
        merge_page(&mut items, page);

        let page_info = document.next_cursor(&envelope)?;
        if !page_info.has_next_page {
            break;
        }
        debug!(
            "{connection}: continuing after cursor {}",
            page_info.end_cursor.as_deref().unwrap_or_default()
        );
    }
    info!("{connection}: fetched {} items over {pages} pages", items.len());
    Ok(items)
}

/// Sends a document that has no connection.
pub fn fetch_once<E: Executor + ?Sized>(executor: &E, document: &QueryDocument) -> Result<Value> {
    if document.is_paginated() {
        return Err(Error::configuration(
            "paginated queries must be read with fetch_all",
        ));
    }
    executor.execute(&document.to_request())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned responses and records the query text it was sent.
    pub struct ReplayExecutor {
        responses: RefCell<VecDeque<Result<Value>>>,
        pub queries: RefCell<Vec<String>>,
    }

    impl ReplayExecutor {
        pub fn new(responses: Vec<Result<Value>>) -> Self {
            ReplayExecutor {
                responses: RefCell::new(responses.into()),
                queries: RefCell::new(vec![]),
            }
        }

        pub fn pages(pages: Vec<Value>) -> Self {
            Self::new(pages.into_iter().map(Ok).collect())
        }
    }

    impl Executor for ReplayExecutor {
        fn execute(&self, request: &GraphQLRequest) -> Result<Value> {
            self.queries.borrow_mut().push(request.query.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(Error::provider(None, "no more canned responses")))
        }
    }
}
