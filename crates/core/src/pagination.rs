//! Cursor pagination state machine
//!
//! Pure bookkeeping for walking the posts listing one page at a time. The shell
//! asks for the next request, performs it, and reports back either the decoded
//! page or the failure. This module decides when to stop and what a failure means.

use crate::posts::{Post, PostsPage, RejectedPost};

/// What to do when a listing page cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationPolicy {
    /// Treat the failed page as the last one and keep what was collected so far
    #[default]
    BestEffort,
    /// Abort the whole fetch
    FailFast,
}

/// Error type for pagination operations
#[derive(Debug, Clone, PartialEq)]
pub enum PaginationError {
    PageFailed { page: usize, reason: String },
    Finished,
}

impl std::fmt::Display for PaginationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaginationError::PageFailed { page, reason } => {
                write!(f, "Failed to fetch posts page {}: {}", page, reason)
            }
            PaginationError::Finished => write!(f, "Pagination already finished"),
        }
    }
}

impl std::error::Error for PaginationError {}

/// The next listing request to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number, for logging
    pub number: usize,
    /// `None` for the first page
    pub cursor: Option<String>,
}

/// Result of a complete walk over the listing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchedPosts {
    pub posts: Vec<Post>,
    /// Listing entries that could not be read as posts
    pub rejected: Vec<RejectedPost>,
    /// Pages that were successfully decoded
    pub pages: usize,
    /// True when a page failed and the walk stopped early
    pub truncated: bool,
}

/// Tracks position in the listing and accumulates posts in the order received
#[derive(Debug)]
pub struct Paginator {
    policy: PaginationPolicy,
    next: Option<PageRequest>,
    fetched: FetchedPosts,
}

impl Paginator {
    pub fn new(policy: PaginationPolicy) -> Self {
        Self {
            policy,
            next: Some(PageRequest {
                number: 1,
                cursor: None,
            }),
            fetched: FetchedPosts::default(),
        }
    }

    /// The request to issue next, or `None` once the listing is exhausted
    pub fn next_request(&self) -> Option<&PageRequest> {
        self.next.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.next.is_none()
    }

    /// Record a successfully decoded page.
    ///
    /// Posts are appended as-is; no deduplication happens here.
    pub fn accept(&mut self, page: PostsPage) -> Result<(), PaginationError> {
        let current = self.next.take().ok_or(PaginationError::Finished)?;

        self.next = page.next_cursor().map(|cursor| PageRequest {
            number: current.number + 1,
            cursor: Some(cursor.to_string()),
        });
        self.fetched.pages += 1;
        self.fetched.posts.extend(page.posts);
        self.fetched.rejected.extend(page.rejected);

        Ok(())
    }

    /// Record a failed page.
    ///
    /// Under [`PaginationPolicy::BestEffort`] the failure ends the walk and `Ok` is
    /// returned; under [`PaginationPolicy::FailFast`] the failure is returned.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), PaginationError> {
        let current = self.next.take().ok_or(PaginationError::Finished)?;

        match self.policy {
            PaginationPolicy::BestEffort => {
                self.fetched.truncated = true;
                Ok(())
            }
            PaginationPolicy::FailFast => Err(PaginationError::PageFailed {
                page: current.number,
                reason: reason.into(),
            }),
        }
    }

    pub fn finish(self) -> FetchedPosts {
        self.fetched
    }
}
