//! Cursor pagination state for the post board.
//!
//! The server only understands forward cursors, so backward navigation is
//! driven by a client-side stack of the cursors that produced each earlier
//! page. Page 1 is always represented by `None`.

use noticeboard_api_types::{
    Category, Post, PostListQuery, PostListResponse, SortField, SortOrder,
};
use serde::Serialize;
use thiserror::Error;
use time::Date;

/// Cursor-aware page result.
#[derive(Debug, Clone, Serialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}

impl From<PostListResponse> for CursorPage<Post> {
    /// `prevCursor`/`hasPrev` from the server are ignored; the history stack
    /// is authoritative for backward navigation.
    fn from(response: PostListResponse) -> Self {
        let next_cursor = match response.has_next {
            Some(false) => None,
            _ => response.next_cursor.filter(|cursor| !cursor.is_empty()),
        };
        Self::new(response.items, next_cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("a page fetch is already in flight")]
    FetchInFlight,
    #[error("fetch ticket does not match the outstanding fetch")]
    StaleTicket,
}

/// Proof that a fetch was started; carries the query snapshot to send.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    query: PostListQuery,
}

impl FetchTicket {
    pub fn query(&self) -> &PostListQuery {
        &self.query
    }
}

#[derive(Debug)]
pub struct PaginationController {
    query: PostListQuery,
    history: Vec<Option<String>>,
    items: Vec<Post>,
    next_cursor: Option<String>,
    loaded: bool,
    in_flight: Option<u64>,
    seq: u64,
}

impl PaginationController {
    pub fn new(page_size: u32) -> Self {
        Self::with_query(PostListQuery {
            limit: page_size,
            ..PostListQuery::default()
        })
    }

    /// Start from an explicit query. A cursor in it becomes the first page.
    pub fn with_query(query: PostListQuery) -> Self {
        Self {
            query,
            history: Vec::new(),
            items: Vec::new(),
            next_cursor: None,
            loaded: false,
            in_flight: None,
            seq: 0,
        }
    }

    pub fn query(&self) -> &PostListQuery {
        &self.query
    }

    pub fn cursor(&self) -> Option<&str> {
        self.query.cursor.as_deref()
    }

    /// Items of the most recently completed page.
    pub fn items(&self) -> &[Post] {
        &self.items
    }

    /// Whether the current query has produced a page yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    /// One-based page number derived from the history depth.
    pub fn current_page_number(&self) -> usize {
        self.history.len() + 1
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn has_prev(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn set_search(&mut self, text: Option<&str>) -> Result<(), PaginationError> {
        self.ensure_idle()?;
        self.query.search = text
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        self.restart();
        Ok(())
    }

    pub fn set_category(&mut self, category: Option<Category>) -> Result<(), PaginationError> {
        self.ensure_idle()?;
        self.query.category = category;
        self.restart();
        Ok(())
    }

    pub fn set_sort(&mut self, sort: SortField, order: SortOrder) -> Result<(), PaginationError> {
        self.ensure_idle()?;
        self.query.sort = sort;
        self.query.order = order;
        self.restart();
        Ok(())
    }

    pub fn set_date_range(
        &mut self,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<(), PaginationError> {
        self.ensure_idle()?;
        self.query.from = from;
        self.query.to = to;
        self.restart();
        Ok(())
    }

    /// Return to page 1 while keeping every filter.
    pub fn reset_pagination(&mut self) -> Result<(), PaginationError> {
        self.ensure_idle()?;
        self.restart();
        Ok(())
    }

    /// Advance to the next page. Returns `Ok(false)` when there is none.
    pub fn load_next(&mut self) -> Result<bool, PaginationError> {
        self.ensure_idle()?;
        let Some(next) = self.next_cursor.take() else {
            return Ok(false);
        };
        self.history.push(self.query.cursor.take());
        self.query.cursor = Some(next);
        self.forget_page();
        Ok(true)
    }

    /// Step back one page. Returns `Ok(false)` on page 1.
    pub fn load_prev(&mut self) -> Result<bool, PaginationError> {
        self.ensure_idle()?;
        let Some(previous) = self.history.pop() else {
            return Ok(false);
        };
        self.query.cursor = previous;
        self.next_cursor = None;
        self.forget_page();
        Ok(true)
    }

    /// Mark a fetch for the current query as outstanding.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, PaginationError> {
        self.ensure_idle()?;
        self.seq += 1;
        self.in_flight = Some(self.seq);
        Ok(FetchTicket {
            seq: self.seq,
            query: self.query.clone(),
        })
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        page: CursorPage<Post>,
    ) -> Result<(), PaginationError> {
        self.settle(&ticket)?;
        self.items = page.items;
        self.next_cursor = page.next_cursor;
        self.loaded = true;
        Ok(())
    }

    /// Release the guard after a failed fetch; navigation state is kept so the
    /// same page can be retried.
    pub fn abort_fetch(&mut self, ticket: FetchTicket) -> Result<(), PaginationError> {
        self.settle(&ticket)
    }

    fn settle(&mut self, ticket: &FetchTicket) -> Result<(), PaginationError> {
        if self.in_flight != Some(ticket.seq) {
            return Err(PaginationError::StaleTicket);
        }
        self.in_flight = None;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), PaginationError> {
        if self.is_fetching() {
            Err(PaginationError::FetchInFlight)
        } else {
            Ok(())
        }
    }

    fn restart(&mut self) {
        self.query.cursor = None;
        self.history.clear();
        self.next_cursor = None;
        self.forget_page();
    }

    /// Drop the shown page; it no longer matches the query.
    fn forget_page(&mut self) {
        self.items.clear();
        self.loaded = false;
    }
}
