//! Repository and language totals over a creation-time window.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::gql_queries::repositories::RepositoryRecord;
use crate::temporal::TimeWindow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepoStats {
    pub total_count: u64,
    pub fork_count: u64,
    pub stargazer_count: u64,
    pub watchers_count: u64,
    pub total_size: u64,
}

/// Bytes per language, kept in the order languages were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageStats {
    entries: Vec<(String, u64)>,
}

impl LanguageStats {
    pub fn add(&mut self, language: &str, size: u64) {
        match self.entries.iter_mut().find(|(name, _)| name == language) {
            Some((_, total)) => *total += size,
            None => self.entries.push((language.to_string(), size)),
        }
    }

    pub fn get(&self, language: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == language)
            .map(|(_, size)| *size)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(name, size)| (name.as_str(), *size))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LanguageStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, size) in &self.entries {
            map.serialize_entry(name, size)?;
        }
        map.end()
    }
}

/// Folds `repos` into fresh totals. See [`cumulate_into`].
pub fn cumulate(repos: &[RepositoryRecord], window: TimeWindow) -> (RepoStats, LanguageStats) {
    let mut repo_stats = RepoStats::default();
    let mut lang_stats = LanguageStats::default();
    cumulate_into(repos, window, &mut repo_stats, &mut lang_stats);
    (repo_stats, lang_stats)
}

/// Adds every repository created inside `window` to the running totals.
///
/// Repositories without any language bytes are skipped entirely. A
/// repository's languages are added largest first; equal sizes keep the
/// provider's order.
pub fn cumulate_into(
    repos: &[RepositoryRecord],
    window: TimeWindow,
    repo_stats: &mut RepoStats,
    lang_stats: &mut LanguageStats,
) {
    for repo in repos {
        if !window.contains(repo.created_at) || repo.languages.total_size == 0 {
            continue;
        }
        repo_stats.total_count += 1;
        repo_stats.fork_count += repo.fork_count;
        repo_stats.stargazer_count += repo.stargazer_count;
        repo_stats.watchers_count += repo.watchers.total_count;
        repo_stats.total_size += repo.languages.total_size;

        let mut edges: Vec<_> = repo.languages.edges.iter().collect();
        edges.sort_by(|a, b| b.size.cmp(&a.size));
        for edge in edges {
            lang_stats.add(edge.language_name(), edge.size);
        }
    }
}
