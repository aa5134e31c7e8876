//! Cursor-following reader for paged sources
//!
//! Every bulk read against a paged API or table index goes through
//! [`paginate`]: issue the request, collect the page's items, re-issue with
//! the returned cursor, and stop when the cursor runs out or the item cap is
//! reached. A failed request aborts the whole read; partial results are
//! discarded.

use serde_json::{Map, Value};
use std::future::Future;

/// One page of results from a paged source
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T, C> {
    /// Items on this page, in source order
    pub items: Vec<T>,

    /// Cursor for the next page; `None` on the last page
    pub cursor: Option<C>,
}

impl<T, C> Page<T, C> {
    pub fn new(items: Vec<T>, cursor: Option<C>) -> Self {
        Self { items, cursor }
    }
}

/// Request parameters that can be re-issued from a continuation cursor
pub trait PageRequest: Clone {
    type Cursor;

    /// Returns a copy of these parameters positioned at `cursor`
    fn with_cursor(&self, cursor: Self::Cursor) -> Self;
}

/// Drains a paged source into a single ordered list
///
/// # Arguments
///
/// * `request` - Issues one request and yields one page
/// * `params` - Parameters for the first request
/// * `cap` - Optional maximum number of items to return
///
/// # Returns
///
/// Every item from every page when `cap` is `None`; otherwise at most `cap`
/// items (exactly `cap` when the source holds that many).
pub async fn paginate<P, T, E, F, Fut>(
    mut request: F,
    params: P,
    cap: Option<usize>,
) -> Result<Vec<T>, E>
where
    P: PageRequest,
    F: FnMut(P) -> Fut,
    Fut: Future<Output = Result<Page<T, P::Cursor>, E>>,
{
    let mut items = Vec::new();
    let mut next = Some(params);

    while let Some(current) = next.take() {
        if cap.is_some_and(|cap| items.len() >= cap) {
            break;
        }

        let page = request(current.clone()).await?;
        items.extend(page.items);

        next = page.cursor.map(|cursor| current.with_cursor(cursor));
    }

    if let Some(cap) = cap {
        items.truncate(cap);
    }

    Ok(items)
}

/// Untyped request parameters whose cursor lives under a named field
#[derive(Debug, Clone)]
struct JsonRequest<'a> {
    params: Value,
    cursor_field: &'a str,
}

impl PageRequest for JsonRequest<'_> {
    type Cursor = Value;

    fn with_cursor(&self, cursor: Value) -> Self {
        let mut map = match &self.params {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        map.insert(self.cursor_field.to_string(), cursor);

        Self {
            params: Value::Object(map),
            cursor_field: self.cursor_field,
        }
    }
}

/// Splits a raw response into items and cursor by field name
///
/// A missing or non-array items field is an empty page; a missing or null
/// cursor field ends the read.
fn split_page(mut response: Value, items_field: &str, cursor_field: &str) -> Page<Value, Value> {
    let items = match response.get_mut(items_field).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let cursor = response
        .get_mut(cursor_field)
        .map(Value::take)
        .filter(|cursor| !cursor.is_null());

    Page::new(items, cursor)
}

/// Drains a paged JSON source whose fields are named by the caller
///
/// This is the shape used by list-style cloud APIs: the response carries the
/// results under `items_field` and the continuation token under
/// `cursor_field`, and the token is sent back under the same field name.
///
/// # Arguments
///
/// * `request` - Issues one request with the given parameters
/// * `params` - Parameters for the first request
/// * `items_field` - Name of the result collection in each response
/// * `cursor_field` - Name of the continuation token
/// * `cap` - Optional maximum number of items to return
pub async fn paginate_json<E, F, Fut>(
    mut request: F,
    params: Value,
    items_field: &str,
    cursor_field: &str,
    cap: Option<usize>,
) -> Result<Vec<Value>, E>
where
    F: FnMut(Value) -> Fut,
    Fut: Future<Output = Result<Value, E>>,
{
    let initial = JsonRequest {
        params,
        cursor_field,
    };

    paginate(
        |req| {
            let response = request(req.params);
            async move {
                let response = response.await?;
                Ok(split_page(response, items_field, cursor_field))
            }
        },
        initial,
        cap,
    )
    .await
}
