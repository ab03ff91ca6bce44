//! Resolve a platform member against the rollup by label
//!
//! Stored labels were captured in whatever format the platform used at the
//! time: a full `name#1234` tag, a bare username, sometimes a nickname. A
//! member is matched by trying candidate labels in priority order.

use std::collections::HashMap;

use crate::models::RecruiterStats;

/// Candidate labels for one platform member, highest priority first.
///
/// Order: full tag, username, display name, then the username part of a
/// legacy `name#1234` tag. Blank and repeated candidates are dropped.
pub fn candidate_labels(tag: &str, username: Option<&str>, display_name: Option<&str>) -> Vec<String> {
    let legacy_name = tag.split_once('#').map(|(name, _)| name);

    let mut out: Vec<String> = Vec::with_capacity(4);
    for candidate in [Some(tag), username, display_name, legacy_name]
        .into_iter()
        .flatten()
    {
        if !candidate.trim().is_empty() && !out.iter().any(|c| c == candidate) {
            out.push(candidate.to_owned());
        }
    }
    out
}

/// Label index over the full stats view
#[derive(Debug, Clone, Default)]
pub struct StatsIndex {
    by_label: HashMap<String, RecruiterStats>,
}

impl StatsIndex {
    pub fn new(stats: Vec<RecruiterStats>) -> Self {
        let by_label = stats
            .into_iter()
            .map(|s| (s.recruiter_label.clone(), s))
            .collect();
        Self { by_label }
    }

    pub fn get(&self, label: &str) -> Option<&RecruiterStats> {
        self.by_label.get(label)
    }

    /// Stats for the first candidate that is a known recruiter label
    pub fn lookup<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&RecruiterStats> {
        candidates.iter().find_map(|c| self.get(c.as_ref()))
    }
}
