//! Fetch, transform and (optionally) write back every post of a site

use colored::Colorize;
use prettytable::row;
use wpexit_core::migration::{transform_post, MigrationSettings};
use wpexit_core::pagination::PaginationPolicy;
use wpexit_core::posts::Post;
use wpexit_core::report::{summarize, summary_lines, PostAction, PostOutcome, RunSummary};

use crate::auth::{
    authenticate, AuthorizationCodeSource, ConsoleCodeSource, StaticCodeSource,
};
use crate::client::WordPressClient;
use crate::config::{create_http_client, WordPressConfig, DEFAULT_TIMEOUT_SECS};
use crate::fetch::fetch_all_posts;
use crate::prelude::{eprintln, println, *};

/// Options for a migration run
#[derive(Debug, Clone, clap::Args)]
pub struct MigrateArgs {
    /// WordPress blog ID or site domain
    #[arg(long, env = "WP_BLOG_ID")]
    pub blog_id: String,

    /// Make actual changes to the posts. Default is dry-run mode.
    #[arg(long)]
    pub commit: bool,

    /// Clear the post content and only keep the new link and blurb at the top.
    #[arg(long)]
    pub clear_content: bool,

    /// Authorization code, skipping the interactive prompt
    #[arg(long, env = "WP_AUTH_CODE", hide_env_values = true)]
    pub code: Option<String>,

    /// Print the authorization URL without trying to open a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Abort when a listing page fails instead of stopping at the last good page
    #[arg(long)]
    pub strict_pagination: bool,

    /// Per-request timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Output the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// What the driver needs once a client exists
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub blog_id: String,
    pub commit: bool,
    pub clear_content: bool,
    pub policy: PaginationPolicy,
    /// Print per-post progress to stdout; otherwise it only goes to the log
    pub echo: bool,
}

impl From<&MigrateArgs> for MigrateOptions {
    fn from(args: &MigrateArgs) -> Self {
        Self {
            blog_id: args.blog_id.clone(),
            commit: args.commit,
            clear_content: args.clear_content,
            policy: if args.strict_pagination {
                PaginationPolicy::FailFast
            } else {
                PaginationPolicy::BestEffort
            },
            echo: !args.json,
        }
    }
}

impl MigrateOptions {
    fn progress(&self, message: impl AsRef<str>) {
        if self.echo {
            println!("{}", message.as_ref());
        } else {
            log::info!("{}", message.as_ref());
        }
    }
}

/// Process every post of the site and tally what happened
pub async fn run_migration(
    client: &WordPressClient,
    settings: &MigrationSettings,
    options: &MigrateOptions,
) -> Result<RunSummary> {
    let fetched = fetch_all_posts(client, &options.blog_id, options.policy).await?;
    log::info!(
        "Fetched {} post(s) across {} page(s)",
        fetched.posts.len(),
        fetched.pages
    );

    let mut outcomes = Vec::with_capacity(fetched.posts.len());
    for post in &fetched.posts {
        let action = process_post(client, settings, options, post).await;
        outcomes.push(PostOutcome {
            id: post.id.clone(),
            title: post.title.clone(),
            action,
        });
    }

    for rejected in fetched.rejected {
        outcomes.push(PostOutcome {
            id: rejected.id.unwrap_or_default(),
            title: rejected.title.unwrap_or_default(),
            action: PostAction::Skipped(rejected.reason),
        });
    }

    Ok(summarize(
        &options.blog_id,
        options.commit,
        fetched.truncated,
        outcomes,
    ))
}

async fn process_post(
    client: &WordPressClient,
    settings: &MigrationSettings,
    options: &MigrateOptions,
    post: &Post,
) -> PostAction {
    options.progress(format!("Processing post: {}", post.title));

    let result = match transform_post(post, settings, options.clear_content) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("{}", e);
            eprintln!("{}", e.to_string().yellow());
            return PostAction::Skipped(e.to_string());
        }
    };

    if result.already_migrated {
        options.progress(format!("Link already present in post: {}", post.title));
        return PostAction::AlreadyMigrated;
    }

    if !options.commit {
        options.progress(format!(
            "DRY RUN: Would update post {} with new content.",
            post.id
        ));
        return PostAction::WouldUpdate;
    }

    match client
        .update_post(&options.blog_id, &post.id, &result.content)
        .await
    {
        Ok(()) => {
            options.progress(format!("Post {} updated successfully.", post.id));
            PostAction::Updated
        }
        Err(e) => {
            log::error!("Failed to update post {}: {}", post.id, e);
            eprintln!(
                "{}",
                format!("Failed to update post {}: {}", post.id, e).red()
            );
            PostAction::UpdateFailed(e.to_string())
        }
    }
}

/// Authenticate, then migrate. Nothing is fetched if authentication fails.
pub async fn execute(
    config: &WordPressConfig,
    source: &dyn AuthorizationCodeSource,
    settings: &MigrationSettings,
    options: &MigrateOptions,
) -> Result<RunSummary> {
    let http = create_http_client(config.timeout)?;
    let token = authenticate(&http, &config.oauth, source).await?;

    let client = WordPressClient::new(config, &token)?;
    run_migration(&client, settings, options).await
}

fn display_outcomes(summary: &RunSummary) {
    let mut table = new_table();

    table.add_row(row![
        "ID".bold().cyan(),
        "Title".bold().cyan(),
        "Result".bold().cyan()
    ]);

    for outcome in &summary.outcomes {
        let label = outcome.action.label();
        let label = match &outcome.action {
            PostAction::WouldUpdate | PostAction::Updated => label.green(),
            PostAction::UpdateFailed(_) => label.red(),
            PostAction::Skipped(_) => label.yellow(),
            PostAction::AlreadyMigrated => label.dimmed(),
        };
        table.add_row(row![outcome.id, outcome.title, label]);
    }

    table.printstd();
}

/// Module entry point
pub async fn run(args: MigrateArgs, global: crate::Global) -> Result<()> {
    let config = WordPressConfig::from_env()?.with_timeout(args.timeout);
    let options = MigrateOptions::from(&args);
    let settings = MigrationSettings::default();

    if global.verbose {
        println!(
            "Blog: {} | mode: {} | new domain: {}",
            options.blog_id,
            if options.commit { "commit" } else { "dry-run" },
            settings.new_domain
        );
    }

    let source: Box<dyn AuthorizationCodeSource> = match args.code {
        Some(code) => Box::new(StaticCodeSource(code)),
        None => Box::new(ConsoleCodeSource {
            open_browser: !args.no_browser,
        }),
    };

    let summary = execute(&config, source.as_ref(), &settings, &options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        if let Some(notice) = summary.notice {
            eprintln!("{}", notice);
        }
        return Ok(());
    }

    if global.verbose && !summary.outcomes.is_empty() {
        println!();
        display_outcomes(&summary);
        println!();
    }

    for line in summary_lines(&summary) {
        if line.starts_with("Warning") {
            println!("{}", line.yellow().bold());
        } else {
            println!("{}", line);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{client_for, config_for, page_body};
    use mockito::{Matcher, Server};
    use wpexit_core::migration::{link_markup, migration_block, DEFAULT_ANNOUNCEMENT};

    fn options(commit: bool) -> MigrateOptions {
        MigrateOptions {
            blog_id: "123".to_string(),
            commit,
            clear_content: false,
            policy: PaginationPolicy::BestEffort,
            echo: false,
        }
    }

    fn migrated_body(slug: &str) -> String {
        let url = format!("https://dev.ahill.net/2023/09/29/{slug}");
        migration_block(DEFAULT_ANNOUNCEMENT, &link_markup(&url, "2025")) + "<p>Old</p>"
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_writes() {
        let mut server = Server::new_async().await;
        let migrated = migrated_body("b");
        let _list = server
            .mock("GET", "/sites/123/posts")
            .with_status(200)
            .with_body(page_body(
                &[(1, "a", "<p>Old</p>"), (2, "b", migrated.as_str()), (3, "c", "")],
                None,
            ))
            .create_async()
            .await;
        let writes = server
            .mock("POST", Matcher::Regex(r"^/sites/123/posts/\d+$".to_string()))
            .expect(0)
            .create_async()
            .await;

        let summary = run_migration(
            &client_for(&server),
            &MigrationSettings::default(),
            &options(false),
        )
        .await
        .unwrap();

        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.modified, 2);
        assert_eq!(summary.already_migrated, 1);
        assert_eq!(summary.outcomes[0].action, PostAction::WouldUpdate);
        assert_eq!(summary.outcomes[1].action, PostAction::AlreadyMigrated);
        assert!(!summary.commit);
        writes.assert_async().await;
    }

    #[tokio::test]
    async fn test_commit_writes_changed_posts_and_survives_failures() {
        let mut server = Server::new_async().await;
        let migrated = migrated_body("c");
        let _list = server
            .mock("GET", "/sites/123/posts")
            .with_status(200)
            .with_body(page_body(
                &[
                    (1, "a", "<p>Old</p>"),
                    (2, "b", "<p>Old</p>"),
                    (3, "c", migrated.as_str()),
                    (4, "d", "<p>Old</p>"),
                ],
                None,
            ))
            .create_async()
            .await;
        let first = server
            .mock("POST", "/sites/123/posts/1")
            .match_body(Matcher::UrlEncoded("content".into(), migrated_body("a")))
            .with_status(500)
            .with_body("internal error")
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/sites/123/posts/2")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let third = server
            .mock("POST", "/sites/123/posts/3")
            .expect(0)
            .create_async()
            .await;
        let fourth = server
            .mock("POST", "/sites/123/posts/4")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let summary = run_migration(
            &client_for(&server),
            &MigrationSettings::default(),
            &options(true),
        )
        .await
        .unwrap();

        assert_eq!(summary.modified, 3);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.already_migrated, 1);
        assert!(matches!(
            summary.outcomes[0].action,
            PostAction::UpdateFailed(_)
        ));

        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
        fourth.assert_async().await;
    }

    #[tokio::test]
    async fn test_clear_content_writes_block_only() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/sites/123/posts")
            .with_status(200)
            .with_body(page_body(&[(9, "hello", "<p>Old</p>")], None))
            .create_async()
            .await;

        let url = "https://dev.ahill.net/2023/09/29/hello";
        let expected = migration_block(DEFAULT_ANNOUNCEMENT, &link_markup(url, "2025"));
        let write = server
            .mock("POST", "/sites/123/posts/9")
            .match_body(Matcher::UrlEncoded("content".into(), expected))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let options = MigrateOptions {
            clear_content: true,
            ..options(true)
        };
        let client = client_for(&server);
        let summary = run_migration(&client, &MigrationSettings::default(), &options)
            .await
            .unwrap();

        assert_eq!(summary.updated, 1);
        write.assert_async().await;
    }

    #[tokio::test]
    async fn test_listing_failure_is_not_an_error() {
        let mut server = Server::new_async().await;
        let _page1 = server
            .mock("GET", "/sites/123/posts")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body(page_body(&[(1, "a", ""), (2, "b", "")], Some("page2")))
            .create_async()
            .await;
        let _page2 = server
            .mock("GET", "/sites/123/posts")
            .match_query(Matcher::UrlEncoded("page_handle".into(), "page2".into()))
            .with_status(503)
            .create_async()
            .await;

        let summary = run_migration(
            &client_for(&server),
            &MigrationSettings::default(),
            &options(false),
        )
        .await
        .unwrap();

        assert_eq!(summary.fetched, 2);
        assert!(summary.truncated);
    }

    #[tokio::test]
    async fn test_unparseable_date_is_skipped() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/sites/123/posts")
            .with_status(200)
            .with_body(
                r#"{"posts":[{"ID":1,"title":"Odd","slug":"odd","date":"someday","content":"x"}]}"#,
            )
            .create_async()
            .await;

        let summary = run_migration(
            &client_for(&server),
            &MigrationSettings::default(),
            &options(true),
        )
        .await
        .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.modified, 0);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_skipped_and_others_still_processed() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/sites/123/posts")
            .with_status(200)
            .with_body(
                r#"{"posts":[
                    {"ID":1,"title":null,"slug":"a","date":"2023-09-29T10:45:00+00:00","content":null},
                    {"ID":2,"title":"Broken","date":"2023-09-29T10:45:00+00:00"}
                ]}"#,
            )
            .create_async()
            .await;

        let summary = run_migration(
            &client_for(&server),
            &MigrationSettings::default(),
            &options(false),
        )
        .await
        .unwrap();

        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.truncated);
        assert_eq!(summary.outcomes[0].action, PostAction::WouldUpdate);
        assert_eq!(summary.outcomes[1].id, "2");
        assert_eq!(summary.outcomes[1].title, "Broken");
        assert!(matches!(summary.outcomes[1].action, PostAction::Skipped(_)));
    }

    #[tokio::test]
    async fn test_failed_authentication_fetches_nothing() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/oauth2/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/sites/123/posts")
            .expect(0)
            .create_async()
            .await;

        let err = execute(
            &config_for(&server),
            &StaticCodeSource("code".to_string()),
            &MigrationSettings::default(),
            &options(true),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Authentication { status: 401, .. })
        ));
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_uses_exchanged_token() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(r#"{"access_token":"fresh"}"#)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/sites/123/posts")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_body(page_body(&[(1, "a", "<p>Old</p>")], None))
            .expect(1)
            .create_async()
            .await;

        let summary = execute(
            &config_for(&server),
            &StaticCodeSource("code".to_string()),
            &MigrationSettings::default(),
            &options(false),
        )
        .await
        .unwrap();

        assert_eq!(summary.modified, 1);
        list.assert_async().await;
    }

    #[test]
    fn test_args_map_to_options() {
        let args = MigrateArgs {
            blog_id: "site.wordpress.com".to_string(),
            commit: false,
            clear_content: true,
            code: None,
            no_browser: true,
            strict_pagination: true,
            timeout: 5,
            json: true,
        };

        let options = MigrateOptions::from(&args);

        assert_eq!(options.blog_id, "site.wordpress.com");
        assert!(options.clear_content);
        assert_eq!(options.policy, PaginationPolicy::FailFast);
        assert!(!options.echo);
    }
}
