//! Shared helpers for tests that talk to a mockito server

use mockito::Server;
use serde_json::json;

use crate::client::WordPressClient;
use crate::config::WordPressConfig;

pub fn config_for(server: &Server) -> WordPressConfig {
    let config = WordPressConfig::from_lookup(|name| match name {
        "WP_CLIENT_ID" => Some("12345".to_string()),
        "WP_API_KEY" => Some("s3cret".to_string()),
        _ => None,
    })
    .unwrap_or_else(|e| panic!("test config: {e}"));

    let mut oauth = config.oauth.clone();
    oauth.token_url = format!("{}/oauth2/token", server.url());

    WordPressConfig {
        oauth,
        api_base: server.url(),
        ..config
    }
}

pub fn client_for(server: &Server) -> WordPressClient {
    WordPressClient::new(&config_for(server), "tok").unwrap_or_else(|e| panic!("test client: {e}"))
}

/// Listing body with `(id, slug, content)` posts dated 2023-09-29
pub fn page_body(posts: &[(u64, &str, &str)], next_page: Option<&str>) -> String {
    let posts: Vec<_> = posts
        .iter()
        .map(|(id, slug, content)| {
            json!({
                "ID": id,
                "title": format!("Post {id}"),
                "slug": slug,
                "date": "2023-09-29T10:45:00+00:00",
                "content": content,
            })
        })
        .collect();

    let meta = match next_page {
        Some(cursor) => json!({ "next_page": cursor }),
        None => json!({}),
    };

    let found = posts.len();
    json!({ "found": found, "posts": posts, "meta": meta }).to_string()
}
