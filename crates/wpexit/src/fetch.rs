//! Walk every page of a site's posts listing

use colored::Colorize;
use wpexit_core::pagination::{FetchedPosts, PaginationPolicy, Paginator};

use crate::client::WordPressClient;
use crate::prelude::{eprintln, *};

/// Fetch all posts of `blog_id`, one page at a time.
///
/// A failing page is reported and, under [`PaginationPolicy::BestEffort`], ends the
/// walk with whatever was collected so far.
pub async fn fetch_all_posts(
    client: &WordPressClient,
    blog_id: &str,
    policy: PaginationPolicy,
) -> Result<FetchedPosts> {
    let mut paginator = Paginator::new(policy);

    while let Some(request) = paginator.next_request().cloned() {
        log::debug!(
            "Requesting posts page {} (cursor: {:?})",
            request.number,
            request.cursor
        );

        match client
            .list_posts_page(blog_id, request.cursor.as_deref())
            .await
        {
            Ok(page) => {
                log::debug!(
                    "Page {} returned {} post(s)",
                    request.number,
                    page.posts.len()
                );
                for rejected in &page.rejected {
                    let message = format!(
                        "Skipping unreadable post {} on page {}: {}",
                        rejected.id.as_deref().unwrap_or("<no id>"),
                        request.number,
                        rejected.reason
                    );
                    log::warn!("{}", message);
                    eprintln!("{}", message.yellow());
                }
                paginator.accept(page).map_err(Error::from)?;
            }
            Err(e) => {
                log::warn!("Posts page {} failed: {}", request.number, e);
                eprintln!("{}", e.to_string().red());
                paginator.reject(e.to_string()).map_err(Error::from)?;
            }
        }
    }

    Ok(paginator.finish())
}
