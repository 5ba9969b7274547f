//! Paginated post board: the controller, the cache and the API wired together.

use std::sync::{Arc, Mutex};

use noticeboard_api_types::{Category, Post, PostListQuery, SortField, SortOrder};
use serde::Serialize;
use time::Date;
use tracing::{debug, instrument};

use crate::application::error::AppError;
use crate::application::pagination::{
    CursorPage, FetchTicket, PaginationController, PaginationError,
};
use crate::application::repos::PostsApi;
use crate::cache::PostListCache;
use crate::cache::lock::mutex_lock;

const SOURCE: &str = "application::board";

/// What the board shows after a navigation step.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub page: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_cursor: Option<String>,
    #[serde(skip)]
    pub query: PostListQuery,
    pub items: Vec<Post>,
}

impl BoardView {
    fn from_controller(controller: &PaginationController) -> Self {
        Self {
            page: controller.current_page_number(),
            has_next: controller.has_next(),
            has_prev: controller.has_prev(),
            next_cursor: controller.next_cursor().map(str::to_string),
            query: controller.query().clone(),
            items: controller.items().to_vec(),
        }
    }
}

/// Outstanding fetch. Released on drop when the navigating future is
/// abandoned before the response arrives.
struct FetchGuard<'a> {
    controller: &'a Mutex<PaginationController>,
    query: PostListQuery,
    ticket: Option<FetchTicket>,
}

impl<'a> FetchGuard<'a> {
    fn new(controller: &'a Mutex<PaginationController>, ticket: FetchTicket) -> Self {
        Self {
            controller,
            query: ticket.query().clone(),
            ticket: Some(ticket),
        }
    }

    fn complete(mut self, page: CursorPage<Post>) -> Result<BoardView, AppError> {
        let mut controller = mutex_lock(self.controller, SOURCE, "complete_fetch");
        if let Some(ticket) = self.ticket.take() {
            controller.complete_fetch(ticket, page)?;
        }
        Ok(BoardView::from_controller(&controller))
    }

    fn abort(mut self) -> Result<(), PaginationError> {
        match self.ticket.take() {
            Some(ticket) => mutex_lock(self.controller, SOURCE, "abort_fetch").abort_fetch(ticket),
            None => Ok(()),
        }
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let mut controller = mutex_lock(self.controller, SOURCE, "drop_fetch");
            if controller.abort_fetch(ticket).is_ok() {
                debug!("Released fetch abandoned before completion");
            }
        }
    }
}

pub struct BoardService {
    posts: Arc<dyn PostsApi>,
    cache: Arc<PostListCache>,
    controller: Mutex<PaginationController>,
}

impl BoardService {
    pub fn new(posts: Arc<dyn PostsApi>, cache: Arc<PostListCache>, page_size: u32) -> Self {
        Self::with_query(
            posts,
            cache,
            PostListQuery {
                limit: page_size,
                ..PostListQuery::default()
            },
        )
    }

    pub fn with_query(
        posts: Arc<dyn PostsApi>,
        cache: Arc<PostListCache>,
        query: PostListQuery,
    ) -> Self {
        Self {
            posts,
            cache,
            controller: Mutex::new(PaginationController::with_query(query)),
        }
    }

    /// Current state without fetching.
    pub fn view(&self) -> BoardView {
        BoardView::from_controller(&mutex_lock(&self.controller, SOURCE, "view"))
    }

    /// Fetch the page for the current query and cursor.
    pub async fn refresh(&self) -> Result<BoardView, AppError> {
        self.navigate(|_| Ok(true))
            .await
            .map(|view| view.unwrap_or_else(|| self.view()))
    }

    /// Returns `None` when there is no next page.
    pub async fn next_page(&self) -> Result<Option<BoardView>, AppError> {
        self.navigate(PaginationController::load_next).await
    }

    /// Returns `None` when already on page 1.
    pub async fn prev_page(&self) -> Result<Option<BoardView>, AppError> {
        self.navigate(PaginationController::load_prev).await
    }

    pub async fn search(&self, text: Option<&str>) -> Result<BoardView, AppError> {
        self.restart_with(|controller| controller.set_search(text))
            .await
    }

    pub async fn filter_category(&self, category: Option<Category>) -> Result<BoardView, AppError> {
        self.restart_with(|controller| controller.set_category(category))
            .await
    }

    pub async fn sort(&self, field: SortField, order: SortOrder) -> Result<BoardView, AppError> {
        self.restart_with(|controller| controller.set_sort(field, order))
            .await
    }

    pub async fn date_range(
        &self,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Result<BoardView, AppError> {
        self.restart_with(|controller| controller.set_date_range(from, to))
            .await
    }

    pub async fn reset(&self) -> Result<BoardView, AppError> {
        self.restart_with(PaginationController::reset_pagination)
            .await
    }

    /// Apply a mutation that always lands on page 1, then fetch it.
    async fn restart_with<F>(&self, mutate: F) -> Result<BoardView, AppError>
    where
        F: FnOnce(&mut PaginationController) -> Result<(), PaginationError>,
    {
        self.navigate(|controller| mutate(controller).map(|()| true))
            .await
            .map(|view| view.unwrap_or_else(|| self.view()))
    }

    /// Mutate the controller and start the fetch under one lock so no other
    /// navigation can slip in between; the lock is released for the await.
    async fn navigate<F>(&self, mutate: F) -> Result<Option<BoardView>, AppError>
    where
        F: FnOnce(&mut PaginationController) -> Result<bool, PaginationError>,
    {
        let guard = {
            let mut controller = mutex_lock(&self.controller, SOURCE, "navigate");
            if !mutate(&mut *controller)? {
                return Ok(None);
            }
            FetchGuard::new(&self.controller, controller.begin_fetch()?)
        };
        self.run_fetch(guard).await.map(Some)
    }

    #[instrument(skip(self, guard), fields(cursor = guard.query.cursor.as_deref()))]
    async fn run_fetch(&self, guard: FetchGuard<'_>) -> Result<BoardView, AppError> {
        match self.fetch_page(&guard.query).await {
            Ok(page) => guard.complete(page),
            Err(err) => {
                guard.abort()?;
                Err(err)
            }
        }
    }

    async fn fetch_page(&self, query: &PostListQuery) -> Result<CursorPage<Post>, AppError> {
        if let Some(page) = self.cache.get_post_list(query) {
            debug!("Serving post list from cache");
            return Ok(page);
        }
        let epoch = self.cache.epoch();
        let page = CursorPage::from(self.posts.list_posts(query).await?);
        self.cache.set_post_list(epoch, query, page.clone());
        Ok(page)
    }
}
