//! Repository for the `Likes` worksheet.

use cohort_core::error::CoreError;
use cohort_core::models::Like;
use cohort_core::schema::Table;

use crate::error::SheetResult;
use crate::repositories::UpdateRepo;
use crate::session::SheetSession;
use crate::snapshot::RowKey;

pub struct LikeRepo;

impl LikeRepo {
    pub async fn list(session: &SheetSession) -> SheetResult<Vec<Like>> {
        let snapshot = session.snapshot(Table::Likes).await?;
        Ok(snapshot
            .records
            .iter()
            .map(Like::from_record)
            .filter(|l| !l.update_id.is_empty())
            .collect())
    }

    pub async fn list_for_update(session: &SheetSession, update_id: &str) -> SheetResult<Vec<Like>> {
        Ok(Self::list(session)
            .await?
            .into_iter()
            .filter(|l| l.update_id == update_id)
            .collect())
    }

    /// Like the update, or remove the like if `email` already gave one.
    ///
    /// Returns whether the update is liked by `email` afterwards.
    pub async fn toggle(session: &SheetSession, update_id: &str, email: &str) -> SheetResult<bool> {
        if UpdateRepo::find(session, update_id).await?.is_none() {
            return Err(CoreError::not_found(Table::Updates.entity(), update_id).into());
        }

        let key = RowKey::new([update_id, email]);
        let current = session.fresh_snapshot(Table::Likes).await?;
        let mutator = session.mutator(Table::Likes);
        if current.index().row_of(&key).is_some() {
            mutator.delete(&key).await?;
            Ok(false)
        } else {
            let like = Like {
                update_id: update_id.to_string(),
                email: email.to_string(),
            };
            let ws = session.worksheet(Table::Likes).await?;
            mutator.append(&like.to_values(&ws.headers)).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn toggle_adds_then_removes_only_own_like() {
        let backend = Arc::new(
            MemoryBackend::new()
                .with_sheet(
                    "Updates",
                    vec![
                        vec!["UpdateID", "Timestamp", "Team", "Email", "Update", "Phase"],
                        vec!["u1", "2026-01-01 09:00:00", "Team1", "a@x.com", "first", ""],
                    ],
                )
                .with_sheet(
                    "Likes",
                    vec![vec!["UpdateID", "Email"], vec!["u1", "b@x.com"]],
                ),
        );
        let s = SheetSession::new(backend.clone(), DEFAULT_TTL);

        assert!(LikeRepo::toggle(&s, "u1", "a@x.com").await.unwrap());
        assert_eq!(LikeRepo::list_for_update(&s, "u1").await.unwrap().len(), 2);

        assert!(!LikeRepo::toggle(&s, "u1", "a@x.com").await.unwrap());
        let likes = LikeRepo::list_for_update(&s, "u1").await.unwrap();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].email, "b@x.com");
    }

    #[tokio::test]
    async fn liking_unknown_update_fails() {
        let backend = Arc::new(MemoryBackend::new());
        let s = SheetSession::new(backend, DEFAULT_TTL);
        assert!(LikeRepo::toggle(&s, "ghost", "a@x.com").await.is_err());
    }
}
