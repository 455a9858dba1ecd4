//! Walking paged collections to completion and batching bulk lookups.
//!
//! Endpoints come in two paging shapes: an opaque `paging_state` cursor, or
//! the last-seen id of a page used as the next page's `start` marker. Both
//! are adapted into [`Page`] so a single walker drives them. Endpoints that
//! do not page at all are a single page.

use std::future::Future;

use tracing::debug;

use crate::error::{Error, Result};

/// One page of a paged collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// A page with an explicit cursor. `has_more` without a cursor is
    /// rejected, since continuing could only repeat the first page.
    pub fn new(items: Vec<T>, cursor: Option<String>, has_more: bool) -> Result<Self> {
        if has_more && cursor.is_none() {
            return Err(Error::pagination("has_more is set but no cursor was returned"));
        }
        Ok(Self {
            items,
            cursor,
            has_more,
        })
    }

    /// All items of an endpoint (or server generation) without paging.
    pub fn single(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: None,
            has_more: false,
        }
    }

    /// Adapt a response carrying an opaque `paging_state` cursor.
    pub fn from_paging_state(
        items: Vec<T>,
        paging_state: Option<String>,
        has_more: Option<bool>,
    ) -> Result<Self> {
        let has_more = has_more.ok_or_else(|| Error::pagination("response is missing has_more"))?;
        Self::new(items, paging_state, has_more)
    }

    /// Adapt a response paged by last-seen id; the id of the final item
    /// becomes the next page's start marker.
    pub fn from_last_id(
        items: Vec<T>,
        has_more: Option<bool>,
        id_of: impl Fn(&T) -> String,
    ) -> Result<Self> {
        let has_more = has_more.ok_or_else(|| Error::pagination("response is missing has_more"))?;
        let cursor = if has_more {
            items.last().map(id_of)
        } else {
            None
        };
        Self::new(items, cursor, has_more)
    }
}

/// Conversion of a decoded page response into a [`Page`].
pub trait IntoPage<T> {
    fn into_page(self) -> Result<Page<T>>;
}

/// Fetch every page and return all items in server order.
///
/// `fetch` is called with `None` first and then with each page's cursor
/// while the server reports more pages. Exactly one call is made per page.
pub async fn walk_pages<T, E, F, Fut>(mut fetch: F) -> std::result::Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = std::result::Result<Page<T>, E>>,
    E: From<Error>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(cursor.clone()).await?;
        pages += 1;
        items.extend(page.items);

        if !page.has_more {
            debug!(pages, items = items.len(), "Pagination complete");
            return Ok(items);
        }

        let next = page.cursor.ok_or_else(|| {
            Error::pagination(format!("page {pages} has more items but no cursor"))
        })?;
        if cursor.as_deref() == Some(next.as_str()) {
            return Err(Error::pagination(format!(
                "page {pages} repeated the previous cursor"
            ))
            .into());
        }
        cursor = Some(next);
    }
}

/// Split `inputs` into chunks of at most `cap`, fetch each chunk in order
/// and concatenate the results.
pub async fn walk_batches<I, T, E, F, Fut>(
    inputs: &[I],
    cap: usize,
    mut fetch: F,
) -> std::result::Result<Vec<T>, E>
where
    I: Clone,
    F: FnMut(Vec<I>) -> Fut,
    Fut: Future<Output = std::result::Result<Vec<T>, E>>,
    E: From<Error>,
{
    if cap == 0 {
        return Err(Error::config("batch size cap must be at least 1").into());
    }

    let mut results = Vec::with_capacity(inputs.len());
    for (batch, chunk) in inputs.chunks(cap).enumerate() {
        debug!(batch, size = chunk.len(), "Fetching batch");
        results.extend(fetch(chunk.to_vec()).await?);
    }
    Ok(results)
}
