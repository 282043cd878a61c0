use std::collections::HashSet;
use crate::errors::CrmBotError;

/// Static set of chat user ids permitted to run any command.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    ids: HashSet<i64>,
}

impl AllowList {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self { ids: ids.into_iter().collect() }
    }

    pub fn is_authorized(&self, caller_id: i64) -> bool {
        self.ids.contains(&caller_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Parse a comma-separated id list such as `"123, 456"`. Blank entries
/// are skipped.
pub fn parse_ids(list: &str) -> Result<Vec<i64>, CrmBotError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| CrmBotError::Config(format!("Invalid user id in allow-list: '{}'", s)))
        })
        .collect()
}
