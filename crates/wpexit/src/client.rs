//! WordPress.com REST client for the two endpoints the migration touches

use wpexit_core::posts::{parse_posts_page, PostsPage};

use crate::config::{create_authenticated_client, WordPressConfig};
use crate::prelude::*;

/// Authenticated access to a site's posts
#[derive(Debug, Clone)]
pub struct WordPressClient {
    http: reqwest::Client,
    api_base: String,
}

impl WordPressClient {
    pub fn new(config: &WordPressConfig, token: &str) -> Result<Self> {
        Ok(Self {
            http: create_authenticated_client(config.timeout, token)?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn posts_url(&self, blog_id: &str) -> String {
        format!("{}/sites/{}/posts", self.api_base, urlencoding::encode(blog_id))
    }

    /// Fetch one page of the listing. `cursor` is the previous page's `next_page`.
    pub async fn list_posts_page(
        &self,
        blog_id: &str,
        cursor: Option<&str>,
    ) -> Result<PostsPage> {
        let mut request = self.http.get(self.posts_url(blog_id));
        if let Some(cursor) = cursor {
            request = request.query(&[("page_handle", cursor)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request to WordPress: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Failed to retrieve posts [{}]: {}", status, body));
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| eyre!("Failed to read response body: {}", e))?;

        parse_posts_page(&body_text).map_err(|e| eyre!("Failed to parse posts response: {}", e))
    }

    /// Replace the body of a single post
    pub async fn update_post(
        &self,
        blog_id: &str,
        post_id: &str,
        content: &str,
    ) -> Result<()> {
        let url = format!("{}/{}", self.posts_url(blog_id), urlencoding::encode(post_id));

        let response = self
            .http
            .post(&url)
            .form(&[("content", content)])
            .send()
            .await
            .map_err(|e| eyre!("Failed to send update for post {}: {}", post_id, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("[{}]: {}", status, body));
        }

        Ok(())
    }
}
