//! How-to and research page handlers.
//!
//! Each request mounts one page, resolves it, applies at most one action and
//! unmounts when the page is dropped.

use actix_web::{HttpResponse, web};

use commons_core::domain::{ContentKind, User};
use commons_core::error::DomainError;
use commons_core::page::{ActionOutcome, ActionTicket, ArticlePage, PageState, Route};
use commons_shared::ApiResponse;
use commons_shared::dto::{ArticleQuery, ModerationRequest, UsefulQuery};

use super::{optional_viewer, require_viewer};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn mount(
    state: &AppState,
    kind: ContentKind,
    slug: String,
    fragment: Option<String>,
    viewer: Option<User>,
) -> ArticlePage {
    let mut page = ArticlePage::new(kind, state.pages.clone(), viewer);
    page.open(Route::new(slug).with_fragment(fragment.unwrap_or_default()))
        .await;
    page
}

/// Pages that did not resolve to an article cannot take actions.
fn require_found(page: &ArticlePage) -> AppResult<()> {
    match page.state() {
        PageState::Found(_) => Ok(()),
        PageState::NotFound(not_found) => Err(AppError::NotFound(format!(
            "{} '{}' not found",
            page.kind(),
            not_found.slug
        ))),
        PageState::Failed { message } => Err(AppError::Unavailable(message.clone())),
        PageState::Loading => Err(AppError::Internal("page load did not settle".to_string())),
    }
}

async fn settle(ticket: ActionTicket) -> AppResult<()> {
    match ticket.outcome().await {
        ActionOutcome::Completed => Ok(()),
        ActionOutcome::Failed(notice) => Err(AppError::Action(notice)),
    }
}

fn current_view(page: &ArticlePage) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(page.state()))
}

/// GET /api/{how-to|research}/{slug}
pub async fn show(
    state: web::Data<AppState>,
    kind: web::Data<ContentKind>,
    path: web::Path<String>,
    query: web::Query<ArticleQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let viewer = optional_viewer(&state, identity.0.as_ref()).await?;
    let page = mount(
        &state,
        **kind,
        path.into_inner(),
        query.into_inner().fragment,
        viewer,
    )
    .await;

    match page.state() {
        PageState::Found(_) => Ok(current_view(&page)),
        PageState::NotFound(_) => {
            Ok(HttpResponse::NotFound().json(ApiResponse::failed(page.state(), "Article not found")))
        }
        _ => require_found(&page).map(|()| current_view(&page)),
    }
}

/// POST /api/{how-to|research}/{slug}/useful
pub async fn toggle_useful(
    state: web::Data<AppState>,
    kind: web::Data<ContentKind>,
    path: web::Path<String>,
    query: web::Query<UsefulQuery>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let viewer = require_viewer(&state, &identity).await?;
    let mut page = mount(&state, **kind, path.into_inner(), None, Some(viewer)).await;
    require_found(&page)?;

    let category = query
        .into_inner()
        .category
        .unwrap_or_else(|| kind.event_prefix().to_string());
    let ticket = page
        .toggle_useful(&category)
        .ok_or_else(|| AppError::Forbidden("A username is required to vote".to_string()))?;
    settle(ticket).await?;

    Ok(current_view(&page))
}

/// POST /api/{how-to|research}/{slug}/follow
pub async fn toggle_follow(
    state: web::Data<AppState>,
    kind: web::Data<ContentKind>,
    path: web::Path<String>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let viewer = require_viewer(&state, &identity).await?;
    let mut page = mount(&state, **kind, path.into_inner(), None, Some(viewer)).await;
    require_found(&page)?;

    let ticket = page
        .toggle_follow()
        .ok_or_else(|| AppError::Forbidden("A username is required to follow".to_string()))?;
    settle(ticket).await?;

    Ok(current_view(&page))
}

/// POST /api/research/{slug}/moderation
pub async fn moderate(
    state: web::Data<AppState>,
    kind: web::Data<ContentKind>,
    path: web::Path<String>,
    identity: Identity,
    body: web::Json<ModerationRequest>,
) -> AppResult<HttpResponse> {
    let viewer = require_viewer(&state, &identity).await?;
    let mut page = mount(&state, **kind, path.into_inner(), None, Some(viewer)).await;
    require_found(&page)?;

    let ticket = page.moderate(body.accepted).map_err(|err| match err {
        DomainError::Unauthorized => {
            AppError::Forbidden("Only admins can moderate research".to_string())
        }
        other => AppError::from(other),
    })?;
    settle(ticket).await?;

    Ok(current_view(&page))
}
