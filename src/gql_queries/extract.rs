//! Walking a response envelope along the names a query was built from.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::gql_queries::vocabulary::NODE_NODES;

/// Follows `path` from the envelope root. A missing or `null` key at any
/// level is an extraction error.
pub fn walk<'a>(envelope: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = envelope;
    for (depth, name) in path.iter().enumerate() {
        current = match current.get(name) {
            Some(Value::Null) | None => {
                return Err(Error::extraction(format!(
                    "response is missing '{}'",
                    path[..=depth].join(".")
                )))
            }
            Some(value) => value,
        };
    }
    Ok(current)
}

/// Deserializes the value at `path`.
pub fn record_at<T: DeserializeOwned>(envelope: &Value, path: &[&str]) -> Result<T> {
    let value = walk(envelope, path)?;
    T::deserialize(value)
        .map_err(|err| Error::extraction(format!("unexpected shape at '{}': {err}", path.join("."))))
}

/// Deserializes every item of the `nodes` list of the connection at
/// `connection_path`, in provider order.
pub fn connection_nodes<T: DeserializeOwned>(
    envelope: &Value,
    connection_path: &[&str],
) -> Result<Vec<T>> {
    let mut path = connection_path.to_vec();
    path.push(NODE_NODES);
    let nodes = walk(envelope, &path)?;
    let items = nodes.as_array().ok_or_else(|| {
        Error::extraction(format!("'{}' is not a list", path.join(".")))
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).map_err(|err| {
                Error::extraction(format!("item {index} of '{}': {err}", path.join(".")))
            })
        })
        .collect()
}
