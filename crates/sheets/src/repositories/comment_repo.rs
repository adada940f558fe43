//! Repository for the `Comments` worksheet.

use cohort_core::error::CoreError;
use cohort_core::models::Comment;
use cohort_core::schema::Table;
use cohort_core::types::{format_timestamp, now};

use crate::error::SheetResult;
use crate::repositories::UpdateRepo;
use crate::session::SheetSession;

pub struct CommentRepo;

impl CommentRepo {
    pub async fn list(session: &SheetSession) -> SheetResult<Vec<Comment>> {
        let snapshot = session.snapshot(Table::Comments).await?;
        Ok(snapshot
            .records
            .iter()
            .map(Comment::from_record)
            .filter(|c| !c.update_id.is_empty())
            .collect())
    }

    /// Comments on one update, oldest first.
    pub async fn list_for_update(session: &SheetSession, update_id: &str) -> SheetResult<Vec<Comment>> {
        Ok(Self::list(session)
            .await?
            .into_iter()
            .filter(|c| c.update_id == update_id)
            .collect())
    }

    pub async fn create(
        session: &SheetSession,
        update_id: &str,
        email: &str,
        text: &str,
    ) -> SheetResult<Comment> {
        if text.trim().is_empty() {
            return Err(CoreError::Validation("Please enter a comment before posting".into()).into());
        }
        if UpdateRepo::find(session, update_id).await?.is_none() {
            return Err(CoreError::not_found(Table::Updates.entity(), update_id).into());
        }

        let comment = Comment {
            update_id: update_id.to_string(),
            timestamp: format_timestamp(&now()),
            email: email.to_string(),
            text: text.trim().to_string(),
        };
        let ws = session.worksheet(Table::Comments).await?;
        session
            .mutator(Table::Comments)
            .append(&comment.to_values(&ws.headers))
            .await?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::error::SheetError;
    use crate::memory::MemoryBackend;

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new().with_sheet(
            "Updates",
            vec![
                vec!["UpdateID", "Timestamp", "Team", "Email", "Update", "Phase"],
                vec!["u1", "2026-01-01 09:00:00", "Team1", "a@x.com", "first", ""],
            ],
        ))
    }

    #[tokio::test]
    async fn comments_attach_to_existing_updates() {
        let s = SheetSession::new(backend(), DEFAULT_TTL);

        CommentRepo::create(&s, "u1", "b@x.com", "Nice work").await.unwrap();

        let comments = CommentRepo::list_for_update(&s, "u1").await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "Nice work");
        assert_matches!(
            CommentRepo::create(&s, "u9", "b@x.com", "Hello").await,
            Err(SheetError::Core(CoreError::NotFound { entity: "Update", .. }))
        );
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let s = SheetSession::new(backend(), DEFAULT_TTL);
        assert_matches!(
            CommentRepo::create(&s, "u1", "b@x.com", "   ").await,
            Err(SheetError::Core(CoreError::Validation(_)))
        );
    }
}
