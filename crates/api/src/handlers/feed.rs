//! Handlers for the `/updates` feed: list, like, comment. Open to every
//! logged-in account.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use cohort_core::models::{Comment, Update};
use cohort_sheets::repositories::{CommentRepo, LikeRepo, ParticipantRepo, UpdateRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Limit the feed to one team; blank means every team.
    pub team: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: String,
}

#[derive(Debug, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub update: Update,
    pub author: String,
    pub likes: usize,
    pub liked_by_me: bool,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct Feed {
    /// Teams that have posted, for the filter.
    pub teams: Vec<String>,
    pub updates: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub update_id: String,
    pub liked: bool,
    pub likes: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/updates?team=
///
/// Updates newest first, each with its likes and comments.
pub async fn list_updates(
    RequireAuth(user): RequireAuth,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<DataResponse<Feed>>> {
    let team = query
        .team
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let updates = UpdateRepo::list(&user.sheets, team).await?;
    let teams = UpdateRepo::teams(&user.sheets).await?;
    let likes = LikeRepo::list(&user.sheets).await?;
    let comments = CommentRepo::list(&user.sheets).await?;
    let names: HashMap<String, String> = ParticipantRepo::list(&user.sheets)
        .await?
        .iter()
        .map(|p| (p.email.clone(), p.display_name().to_string()))
        .collect();
    let author = |email: &str| names.get(email).cloned().unwrap_or_else(|| email.to_string());

    let updates = updates
        .into_iter()
        .map(|update| {
            let liked_by: Vec<&str> = likes
                .iter()
                .filter(|l| l.update_id == update.id)
                .map(|l| l.email.as_str())
                .collect();
            let comments = comments
                .iter()
                .filter(|c| c.update_id == update.id)
                .map(|c| CommentView {
                    author: author(&c.email),
                    comment: c.clone(),
                })
                .collect();
            FeedItem {
                author: author(&update.email),
                likes: liked_by.len(),
                liked_by_me: liked_by.contains(&user.email.as_str()),
                comments,
                update,
            }
        })
        .collect();

    Ok(Json(DataResponse {
        data: Feed { teams, updates },
    }))
}

/// POST /api/v1/updates/{id}/like
///
/// Like the update, or withdraw the caller's like if already given.
pub async fn toggle_like(
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<LikeResponse>>> {
    let liked = LikeRepo::toggle(&user.sheets, &id, &user.email).await?;
    let likes = LikeRepo::list_for_update(&user.sheets, &id).await?.len();
    Ok(Json(DataResponse {
        data: LikeResponse {
            update_id: id,
            liked,
            likes,
        },
    }))
}

/// POST /api/v1/updates/{id}/comments
pub async fn add_comment(
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    Json(input): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CommentView>>)> {
    let comment = CommentRepo::create(&user.sheets, &id, &user.email, &input.text).await?;
    let author = ParticipantRepo::find_by_email(&user.sheets, &user.email)
        .await?
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|| user.email.clone());
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CommentView { comment, author },
        }),
    ))
}
