//! Suggestion board storage and operations.
//!
//! Suggestions and their replies live in a single JSON document, saved with
//! the same locked atomic-rename scheme as application state. The store is
//! policy-free: who may delete or reply as admin is decided by the caller.

use crate::config::BoardConfig;
use crate::state::{load_document, save_document};
use crate::{Comment, Error, Result, Suggestion};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// The suggestion board document, newest suggestion first
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Board {
    pub suggestions: Vec<Suggestion>,
}

impl Board {
    /// Post a new suggestion, returning its id
    ///
    /// Title and content are trimmed; empty or over-long values are
    /// rejected.
    pub fn post(&mut self, title: &str, content: &str, limits: &BoardConfig) -> Result<Uuid> {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() || content.is_empty() {
            return Err(Error::Board("title and content required".into()));
        }
        if title.chars().count() > limits.title_max_len {
            return Err(Error::Board(format!(
                "title longer than {} characters",
                limits.title_max_len
            )));
        }
        if content.chars().count() > limits.content_max_len {
            return Err(Error::Board(format!(
                "content longer than {} characters",
                limits.content_max_len
            )));
        }

        let suggestion = Suggestion {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            posted_at: Utc::now(),
            comments: Vec::new(),
        };
        let id = suggestion.id;

        self.suggestions.insert(0, suggestion);
        Ok(id)
    }

    /// Look up a suggestion by id
    pub fn get(&self, id: Uuid) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.id == id)
    }

    /// Remove a suggestion and all its replies
    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        let before = self.suggestions.len();
        self.suggestions.retain(|s| s.id != id);
        if self.suggestions.len() == before {
            return Err(Error::Board(format!("no suggestion with id {}", id)));
        }
        Ok(())
    }

    /// Add a reply to a suggestion, returning the reply id
    pub fn add_comment(&mut self, id: Uuid, text: &str, from_admin: bool) -> Result<Uuid> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Board("comment text required".into()));
        }

        let suggestion = self
            .suggestions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::Board(format!("no suggestion with id {}", id)))?;

        let comment = Comment {
            id: Uuid::new_v4(),
            text: text.to_string(),
            posted_at: Utc::now(),
            from_admin,
        };
        let comment_id = comment.id;

        suggestion.comments.push(comment);
        Ok(comment_id)
    }

    /// Remove a reply from a suggestion
    pub fn delete_comment(&mut self, id: Uuid, comment_id: Uuid) -> Result<()> {
        let suggestion = self
            .suggestions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::Board(format!("no suggestion with id {}", id)))?;

        let before = suggestion.comments.len();
        suggestion.comments.retain(|c| c.id != comment_id);
        if suggestion.comments.len() == before {
            return Err(Error::Board(format!("no comment with id {}", comment_id)));
        }
        Ok(())
    }

    /// Load the board, defaulting when absent or corrupted
    pub fn load(path: &Path) -> Result<Self> {
        load_document(path, "board")
    }

    /// Save the board atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        save_document(path, self, "board")
    }

    /// Load the board, modify it, and save it back atomically
    pub fn update<F, R>(path: &Path, f: F) -> Result<R>
    where
        F: FnOnce(&mut Board) -> Result<R>,
    {
        let mut board = Self::load(path)?;
        let out = f(&mut board)?;
        board.save(path)?;
        Ok(out)
    }
}
