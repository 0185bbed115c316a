use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use qz_core::domain::entities::{User, UserBadge, WELCOME_BADGE};
use qz_core::errors::DomainError;
use qz_core::repositories::{BADGE_REPOSITORY, USER_REPOSITORY};

use crate::app::AppState;
use crate::dto::{CreateUserRequest, UserResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/users
///
/// Creates the account and awards the welcome badge in one transaction:
/// either both rows exist afterwards or neither does.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "learner@example.com",
///     "display_name": "Learner"
/// }
/// ```
///
/// # Responses
/// * `201` - the created user with its badges
/// * `400` - invalid email or display name
/// * `409` - the email is already registered
pub async fn create_user(
    state: web::Data<AppState>,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let now = state.clock.now();
    let user = User::register(state.ids.next_id(), request.email, request.display_name, now);
    let badge = UserBadge::award(state.ids.next_id(), user.id, WELCOME_BADGE, now);

    let response = state
        .context
        .within_transaction(|scope| async move {
            let user = scope.repository(&USER_REPOSITORY)?.create(user).await?;
            let badge = scope.repository(&BADGE_REPOSITORY)?.award(badge).await?;
            Ok::<_, DomainError>(UserResponse::from_parts(user, vec![badge]))
        })
        .await?;

    tracing::info!(user_id = %response.id, "User registered");
    Ok(HttpResponse::Created().json(response))
}

/// Handler for GET /api/v1/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let user = state
        .context
        .repository(&USER_REPOSITORY)?
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("User {}", id)))?;
    let badges = state
        .context
        .repository(&BADGE_REPOSITORY)?
        .find_by_user(id)
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from_parts(user, badges)))
}
