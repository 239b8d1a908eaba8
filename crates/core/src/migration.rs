//! Pure content transformation for moving posts to a new domain
//!
//! Given a post, computes the body it should have after migration: an
//! announcement banner and a link to the post's new home, either in front of the
//! original body or replacing it. Running the transformation on its own output
//! changes nothing, which is what makes repeated runs safe.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::posts::Post;

/// Where migrated posts live now
pub const DEFAULT_NEW_DOMAIN: &str = "https://dev.ahill.net";

/// Banner placed above the redirect link
pub const DEFAULT_ANNOUNCEMENT: &str = "<h2>Announcement</h2><p>This site is moving from virtualandy.wordpress.com to dev.ahill.net. All content is available on dev.ahill.net. virtualandy.wordpress.com content will not be available at this URL in 2025.</p><h2>Original Post</h2>";

/// When the old URLs stop working, as shown to readers
pub const DEFAULT_CUTOFF: &str = "2025";

/// Error type for migration transforms
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MigrationError {
    #[error("Unable to parse publish date '{date}' of post {post_id}")]
    InvalidDate { post_id: String, date: String },
}

/// Values baked into the generated markup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationSettings {
    pub new_domain: String,
    pub announcement: String,
    pub cutoff: String,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            new_domain: DEFAULT_NEW_DOMAIN.to_string(),
            announcement: DEFAULT_ANNOUNCEMENT.to_string(),
            cutoff: DEFAULT_CUTOFF.to_string(),
        }
    }
}

/// The replacement body for one post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformResult {
    pub content: String,
    /// Content differs from the original and must be written back
    pub changed: bool,
    /// The post already carried this exact link
    pub already_migrated: bool,
}

/// Extract the calendar date from a platform timestamp.
///
/// The date is taken in whatever offset the timestamp carries; no conversion to
/// UTC or local time happens.
pub fn parse_publish_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = DateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// `<new-domain>/<yyyy>/<mm>/<dd>/<slug>`
pub fn redirect_url(new_domain: &str, date: NaiveDate, slug: &str) -> String {
    format!(
        "{}/{}/{}",
        new_domain.trim_end_matches('/'),
        date.format("%Y/%m/%d"),
        slug
    )
}

/// The paragraph whose presence marks a post as migrated
pub fn link_markup(url: &str, cutoff: &str) -> String {
    format!(
        "<p><a href=\"{url}\">This content has moved to: {url}</a>, and will not be available at this URL in {cutoff}.</p>"
    )
}

/// Banner followed by the link paragraph
pub fn migration_block(announcement: &str, link: &str) -> String {
    format!("{announcement}<p>{link}</p>")
}

/// Compute the migrated body of `post`.
///
/// If the exact link markup is already somewhere in the body, the body is
/// returned untouched. Otherwise the migration block either replaces the body
/// (`clear_content`) or is prepended to it.
pub fn transform_post(
    post: &Post,
    settings: &MigrationSettings,
    clear_content: bool,
) -> Result<TransformResult, MigrationError> {
    let date = parse_publish_date(&post.date).ok_or_else(|| MigrationError::InvalidDate {
        post_id: post.id.clone(),
        date: post.date.clone(),
    })?;

    let url = redirect_url(&settings.new_domain, date, &post.slug);
    let link = link_markup(&url, &settings.cutoff);

    if post.content.contains(&link) {
        return Ok(TransformResult {
            content: post.content.clone(),
            changed: false,
            already_migrated: true,
        });
    }

    let block = migration_block(&settings.announcement, &link);
    let content = if clear_content {
        block
    } else {
        block + &post.content
    };

    Ok(TransformResult {
        changed: content != post.content,
        content,
        already_migrated: false,
    })
}
