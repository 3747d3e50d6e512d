//! Paginated listing results.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::token::ResumptionToken;

/// Pagination metadata accompanying a partial listing.
///
/// A missing `resumption_token` marks the final page of a multi-page list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowControl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resumption_token: Option<ResumptionToken>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_list_size: Option<u64>,

    /// Offset of the first item of this page within the complete list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<u64>,
}

impl FlowControl {
    /// Returns true if more pages follow.
    pub fn has_more(&self) -> bool {
        self.resumption_token.is_some()
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Absent when the whole list fits on a single page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_control: Option<FlowControl>,
}

impl<T> Page<T> {
    /// A page holding the complete list.
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            flow_control: None,
        }
    }

    /// Returns the token for the next page, if any.
    pub fn next_token(&self) -> Option<&ResumptionToken> {
        self.flow_control
            .as_ref()
            .and_then(|fc| fc.resumption_token.as_ref())
    }
}
