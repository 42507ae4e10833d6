//! Keyset pagination over creation timestamps.
//!
//! Both ledgers list through the same contract: order by `created_at`
//! (newest first unless ascending is requested), resume strictly beyond a
//! cursor, and probe once past the last returned item so callers can tell
//! "last page" apart from "a full page that happened to end on the last
//! record".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Records that can be paged by creation time.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

/// Strict bound on `created_at`: `>` when ascending, `<` when descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetBound {
    pub created_at: DateTime<Utc>,
    pub order: SortOrder,
}

impl KeysetBound {
    pub fn new(created_at: DateTime<Utc>, order: SortOrder) -> Self {
        Self { created_at, order }
    }

    pub fn admits(&self, created_at: DateTime<Utc>) -> bool {
        match self.order {
            SortOrder::Ascending => created_at > self.created_at,
            SortOrder::Descending => created_at < self.created_at,
        }
    }
}

/// Caller-facing page parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Omitted or non-positive means unbounded.
    pub limit: Option<i64>,
    pub order: SortOrder,
    /// Cursor from a previous page's `next_cursor`.
    pub start_at: Option<DateTime<Utc>>,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, ascending: bool, start_at: Option<DateTime<Utc>>) -> Self {
        Self {
            limit,
            order: SortOrder::from_ascending(ascending),
            start_at,
        }
    }

    pub fn query(&self) -> KeysetQuery {
        KeysetQuery {
            order: self.order,
            bound: self
                .start_at
                .map(|created_at| KeysetBound::new(created_at, self.order)),
            limit: self
                .limit
                .filter(|limit| *limit > 0)
                .and_then(|limit| usize::try_from(limit).ok()),
        }
    }
}

/// Store-facing query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetQuery {
    pub order: SortOrder,
    pub bound: Option<KeysetBound>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub more: bool,
    /// Present only when `more` is true.
    pub next_cursor: Option<DateTime<Utc>>,
}

/// Run one page fetch followed by the existence probe.
pub async fn paginate<T, E, F, FFut, P, PFut>(
    request: &PageRequest,
    fetch: F,
    probe: P,
) -> Result<Page<T>, E>
where
    T: Timestamped,
    F: FnOnce(KeysetQuery) -> FFut,
    FFut: Future<Output = Result<Vec<T>, E>>,
    P: FnOnce(KeysetBound) -> PFut,
    PFut: Future<Output = Result<bool, E>>,
{
    let query = request.query();
    let items = fetch(query).await?;

    let Some(last) = items.last().map(Timestamped::created_at) else {
        return Ok(Page {
            items,
            more: false,
            next_cursor: None,
        });
    };

    let more = probe(KeysetBound::new(last, query.order)).await?;
    Ok(Page {
        items,
        more,
        next_cursor: more.then_some(last),
    })
}

/// Apply a keyset query to an in-memory candidate set.
pub fn select_page<T: Timestamped>(mut items: Vec<T>, query: &KeysetQuery) -> Vec<T> {
    if let Some(bound) = query.bound {
        items.retain(|item| bound.admits(item.created_at()));
    }
    match query.order {
        SortOrder::Ascending => items.sort_by_key(|item| item.created_at()),
        SortOrder::Descending => {
            items.sort_by_key(|item| std::cmp::Reverse(item.created_at()))
        }
    }
    if let Some(limit) = query.limit {
        items.truncate(limit);
    }
    items
}
