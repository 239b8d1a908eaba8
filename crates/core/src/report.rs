//! Per-post outcomes and the end-of-run summary

use serde::Serialize;

/// Closing notice of a run that wrote nothing
pub const DRY_RUN_NOTICE: &str = "Dry run complete. No actual changes were made.";

/// What happened to a single post
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "reason", rename_all = "snake_case")]
pub enum PostAction {
    /// Link was already present
    AlreadyMigrated,
    /// Dry-run: an update would have been sent
    WouldUpdate,
    Updated,
    UpdateFailed(String),
    /// Post could not be read or transformed
    Skipped(String),
}

impl PostAction {
    /// Whether the computed content differed from the original
    pub fn is_modification(&self) -> bool {
        matches!(
            self,
            PostAction::WouldUpdate | PostAction::Updated | PostAction::UpdateFailed(_)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostAction::AlreadyMigrated => "already migrated",
            PostAction::WouldUpdate => "would update",
            PostAction::Updated => "updated",
            PostAction::UpdateFailed(_) => "update failed",
            PostAction::Skipped(_) => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostOutcome {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub action: PostAction,
}

/// Everything the driver reports once all posts are processed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub blog_id: String,
    pub commit: bool,
    pub fetched: usize,
    pub modified: usize,
    pub already_migrated: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
    /// A listing page failed and the post list may be incomplete
    pub truncated: bool,
    /// Set on dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    pub outcomes: Vec<PostOutcome>,
}

/// Tally outcomes into a summary
pub fn summarize(
    blog_id: &str,
    commit: bool,
    truncated: bool,
    outcomes: Vec<PostOutcome>,
) -> RunSummary {
    let count = |pred: fn(&PostAction) -> bool| outcomes.iter().filter(|o| pred(&o.action)).count();

    RunSummary {
        blog_id: blog_id.to_string(),
        commit,
        fetched: outcomes.len(),
        modified: count(PostAction::is_modification),
        already_migrated: count(|a| matches!(a, PostAction::AlreadyMigrated)),
        updated: count(|a| matches!(a, PostAction::Updated)),
        failed: count(|a| matches!(a, PostAction::UpdateFailed(_))),
        skipped: count(|a| matches!(a, PostAction::Skipped(_))),
        truncated,
        notice: (!commit).then_some(DRY_RUN_NOTICE),
        outcomes,
    }
}

/// Closing lines printed after a run
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!("Total posts modified: {}", summary.modified)];

    match summary.notice {
        Some(notice) => lines.push(notice.to_string()),
        None => lines.push(format!(
            "Updated {} post(s), {} failed.",
            summary.updated, summary.failed
        )),
    }

    if summary.skipped > 0 {
        lines.push(format!(
            "Skipped {} post(s) that could not be read.",
            summary.skipped
        ));
    }

    if summary.truncated {
        lines.push(
            "Warning: a listing page failed, some posts may not have been processed.".to_string(),
        );
    }

    lines
}
