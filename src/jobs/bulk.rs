use serde::Serialize;
use std::collections::BTreeMap;

pub const CANCELLED_REASON: &str = "operation cancelled";

/// Per-item outcome of a bulk operation.
///
/// Every distinct input id ends up in exactly one of `successful` or
/// `failed`, so `successful.len() + failed.len() == total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkResult {
    pub successful: Vec<String>,
    pub failed: BTreeMap<String, String>,
    pub total: usize,
}

impl BulkResult {
    pub fn with_total(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn succeed(&mut self, id: &str) {
        self.successful.push(id.to_string());
    }

    pub fn fail(&mut self, id: &str, reason: impl Into<String>) {
        self.failed.insert(id.to_string(), reason.into());
    }

    pub fn is_consistent(&self) -> bool {
        self.successful.len() + self.failed.len() == self.total
            && self.successful.iter().all(|id| !self.failed.contains_key(id))
    }
}

/// Drop repeated ids, keeping first-seen order.
pub fn distinct_ids(ids: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}
