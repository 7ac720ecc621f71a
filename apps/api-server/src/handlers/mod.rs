//! HTTP handlers and route configuration.

mod articles;
mod auth;
mod health;

use actix_web::web;

use commons_core::domain::{ContentKind, User};
use commons_core::ports::BaseRepository;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/sign-up", web::post().to(auth::sign_up))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(article_scope(ContentKind::Howto))
            .service(
                article_scope(ContentKind::Research)
                    .route("/{slug}/moderation", web::post().to(articles::moderate)),
            ),
    );
}

fn article_scope(kind: ContentKind) -> actix_web::Scope {
    web::scope(&format!("/{}", kind.route_segment()))
        .app_data(web::Data::new(kind))
        .route("/{slug}", web::get().to(articles::show))
        .route("/{slug}/useful", web::post().to(articles::toggle_useful))
        .route("/{slug}/follow", web::post().to(articles::toggle_follow))
}

/// Profile behind a token. A token for a removed profile is not honoured.
async fn load_viewer(state: &AppState, identity: &Identity) -> AppResult<Option<User>> {
    let user = state.users.find_by_id(identity.user_id).await?;
    Ok(user.filter(|u| !u.deleted))
}

async fn require_viewer(state: &AppState, identity: &Identity) -> AppResult<User> {
    load_viewer(state, identity)
        .await?
        .ok_or(AppError::Unauthorized)
}

async fn optional_viewer(state: &AppState, identity: Option<&Identity>) -> AppResult<Option<User>> {
    match identity {
        Some(identity) => {
            let viewer = load_viewer(state, identity).await?;
            if viewer.is_none() {
                tracing::warn!(
                    user_id = %identity.user_id,
                    username = %identity.username,
                    "Token for unknown profile, serving anonymously"
                );
            }
            Ok(viewer)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests;
