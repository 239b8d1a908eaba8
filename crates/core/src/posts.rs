//! Wire models for the WordPress.com REST posts endpoints
//!
//! These types mirror the subset of `GET /sites/{site}/posts` that the migration
//! needs. Unknown fields are ignored.
//!
//! A page is decoded entry by entry: one malformed post is set aside as a
//! [`RejectedPost`] and the rest of the page is still usable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single post as returned by the listing endpoint
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Post {
    /// Opaque identifier. The API sends a number, older payloads a string.
    #[serde(rename = "ID", deserialize_with = "deserialize_post_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    pub slug: String,
    /// Publish date as given by the platform, e.g. `2023-09-29T10:45:00+00:00`
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// A listing entry that could not be read as a [`Post`]
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RejectedPost {
    pub id: Option<String>,
    pub title: Option<String>,
    pub reason: String,
}

/// Listing metadata
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PostsMeta {
    #[serde(default)]
    pub next_page: Option<String>,
}

/// One page of the posts listing
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct PostsPage {
    pub found: Option<u64>,
    pub posts: Vec<Post>,
    /// Entries of this page that are not usable posts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedPost>,
    pub meta: Option<PostsMeta>,
}

#[derive(Debug, Deserialize)]
struct RawPostsPage {
    #[serde(default)]
    found: Option<u64>,
    #[serde(default)]
    posts: Vec<Value>,
    #[serde(default)]
    meta: Option<PostsMeta>,
}

impl PostsPage {
    /// The cursor for the following page, if any.
    ///
    /// An empty `next_page` string is treated the same as a missing one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.next_page.as_deref())
            .filter(|cursor| !cursor.is_empty())
    }
}

fn deserialize_post_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn read_entry(entry: Value) -> Result<Post, RejectedPost> {
    let id = match entry.get("ID") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    };
    let title = entry
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);

    Post::deserialize(entry).map_err(|e| RejectedPost {
        id,
        title,
        reason: e.to_string(),
    })
}

/// Parse a listing response body.
///
/// Fails only when the body is not JSON or has no readable `posts` array.
/// Individual entries that are not valid posts end up in [`PostsPage::rejected`].
pub fn parse_posts_page(body: &str) -> Result<PostsPage, serde_json::Error> {
    let raw: RawPostsPage = serde_json::from_str(body)?;

    let mut posts = Vec::with_capacity(raw.posts.len());
    let mut rejected = Vec::new();
    for entry in raw.posts {
        match read_entry(entry) {
            Ok(post) => posts.push(post),
            Err(reject) => rejected.push(reject),
        }
    }

    Ok(PostsPage {
        found: raw.found,
        posts,
        rejected,
        meta: raw.meta,
    })
}
