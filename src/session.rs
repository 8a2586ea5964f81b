// 🔁 Interaction Loop - one submit = one batch
//
// Validate → normalize + classify each line → append once → summarize.
// Validation problems are returned as a `Submission::Rejected` value and
// never reach the model or the store.

use crate::catalog::Category;
use crate::ledger::{Entry, LedgerStore, UserKey};
use crate::pipeline::Model;
use anyhow::{Context as AnyhowContext, Result};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// User-facing reasons a submission was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputWarning {
    MissingUser,
    NoMessages,
}

impl fmt::Display for InputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputWarning::MissingUser => f.write_str("Please enter your name to begin."),
            InputWarning::NoMessages => f.write_str("Please enter at least one message."),
        }
    }
}

/// How many ledger entries fall in one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Result of an accepted submission (or a history lookup)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub key: UserKey,
    /// Entries created by this submission
    pub added: usize,
    /// Full ledger after the submission
    pub entries: Vec<Entry>,
    pub frequencies: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Rejected(InputWarning),
    Accepted(Report),
}

/// Non-blank message lines, trimmed, in input order
pub fn split_messages(block: &str) -> Vec<&str> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Count entries per category: most frequent first, ties in category
/// declaration order, absent categories omitted.
pub fn category_frequencies(entries: &[Entry]) -> Vec<CategoryCount> {
    let mut frequencies: Vec<CategoryCount> = Category::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            count: entries.iter().filter(|e| e.category == category).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    // Stable sort keeps declaration order among equal counts
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies
}

/// Classify a block of messages for `user` and append them to their ledger.
///
/// Errors only come from the store; the ledger is left as it was.
pub fn submit(
    model: &Model,
    store: &dyn LedgerStore,
    user: &str,
    block: &str,
) -> Result<Submission> {
    let user = user.trim();
    let key = match UserKey::derive(user) {
        Some(key) => key,
        None => {
            warn!("submission without a user identifier");
            return Ok(Submission::Rejected(InputWarning::MissingUser));
        }
    };

    let messages = split_messages(block);
    if messages.is_empty() {
        warn!(key = %key, "submission without messages");
        return Ok(Submission::Rejected(InputWarning::NoMessages));
    }

    let new_entries: Vec<Entry> = messages
        .iter()
        .map(|message| Entry::new(user, *message, model.classify(message)))
        .collect();
    let added = new_entries.len();

    let entries = store
        .append(&key, new_entries)
        .with_context(|| format!("Failed to save transactions for {}", key))?;

    Ok(Submission::Accepted(Report {
        frequencies: category_frequencies(&entries),
        key,
        added,
        entries,
    }))
}

/// Existing ledger for `user` without classifying anything new.
/// `None` when the identifier is blank.
pub fn history(store: &dyn LedgerStore, user: &str) -> Result<Option<Report>> {
    let Some(key) = UserKey::derive(user) else {
        return Ok(None);
    };

    let entries = store
        .load(&key)
        .with_context(|| format!("Failed to load transactions for {}", key))?;

    Ok(Some(Report {
        frequencies: category_frequencies(&entries),
        key,
        added: 0,
        entries,
    }))
}

// ============================================================================
// TESTS
// ============================================================================
