use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        jwt::{AuthUser, JwtKeys},
        password,
    },
    checkins,
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            AuthResponse, ChangePasswordRequest, DeleteAccountRequest, LoginRequest,
            OutcomeResponse, ProfileResponse, SignupRequest, UpdateProfileRequest,
            UpdatedProfileResponse, UserIdBody,
        },
        repo::ProfileUpdate,
        repo_types::User,
    },
    validate,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(signup))
        .route("/users/token", post(login))
        .route("/users/:id", get(get_profile).put(update_profile))
        .route("/users/:id/password", put(change_password))
        .route("/users/:id/delete", delete(delete_account))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate::check(&payload, SignupRequest::RULES)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "signup with taken email");
        return Err(ApiError::EmailTaken);
    }

    let hash = password::hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.email,
        &payload.username,
        &hash,
        payload.first_name.as_deref(),
        payload.last_name.as_deref(),
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = user.id, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserIdBody { id: user.id },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password must be indistinguishable from the
    // outside; only the log knows which happened.
    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login with unknown email");
        return Err(ApiError::LoginFailed);
    };
    if !password::verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::LoginFailed);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: UserIdBody { id: user.id },
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let checkins = checkins::repo::list_by_user(&state.db, id).await?;
    Ok(Json(ProfileResponse { user, checkins }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<UpdatedProfileResponse>, ApiError> {
    if viewer != id {
        warn!(viewer, target = id, "cross-account profile update rejected");
        return Err(ApiError::Forbidden);
    }
    payload.email = payload.email.trim().to_lowercase();
    validate::check(&payload, UpdateProfileRequest::RULES)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let updated = User::update_profile(
        &state.db,
        user.id,
        ProfileUpdate {
            username: &payload.username,
            email: &payload.email,
            first_name: payload.first_name.as_deref(),
            last_name: payload.last_name.as_deref(),
            about_you: payload.about_you.as_deref(),
        },
    )
    .await?;

    info!(user_id = id, "profile updated");
    Ok(Json(UpdatedProfileResponse {
        username: updated.username,
        email: updated.email,
        first_name: updated.first_name,
        last_name: updated.last_name,
        about_you: updated.about_you,
        message: "Your account information has been successfully updated.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    if viewer != id {
        warn!(viewer, target = id, "cross-account password change rejected");
        return Err(ApiError::Forbidden);
    }
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    if !password::verify_password(&payload.old_password, &user.password_hash)? {
        warn!(user_id = id, "password change with wrong old password");
        return Ok(Json(OutcomeResponse::failed(
            "There was a problem updating your password. Please try again.",
        )));
    }

    let hash = password::hash_password(&payload.new_password)?;
    User::update_password(&state.db, id, &hash).await?;

    info!(user_id = id, "password changed");
    Ok(Json(OutcomeResponse::succeeded(
        "Your password has been successfully updated.",
    )))
}

#[instrument(skip(state, payload))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    if viewer != id {
        warn!(viewer, target = id, "cross-account delete rejected");
        return Err(ApiError::Forbidden);
    }
    if payload.delete_password != payload.confirm_delete_password {
        return Ok(Json(OutcomeResponse::failed(
            "It looks like your passwords didn't match. Please try again.",
        )));
    }

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    if !password::verify_password(&payload.delete_password, &user.password_hash)? {
        warn!(user_id = id, "account delete with wrong password");
        return Ok(Json(OutcomeResponse::failed(
            "It seems you didn't enter the correct password. Please try again.",
        )));
    }

    User::delete_cascading(&state.db, id).await?;

    info!(user_id = id, "account and all dependent records deleted");
    Ok(Json(OutcomeResponse::succeeded(
        "The user and all associated data has successfully been deleted.",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::JwtConfig;

    // The fake state's pool connects lazily, so a 401 here proves the gate
    // rejected the request before any store read was attempted.
    #[tokio::test]
    async fn profile_requires_a_bearer_token() {
        let app = crate::app::build_app(AppState::fake());
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/users/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_rejects_a_token_signed_under_another_secret() {
        let app = crate::app::build_app(AppState::fake_with_secret("the-real-secret"));
        let forged = JwtKeys::new(&JwtConfig {
            secret: "attacker-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        })
        .sign(7)
        .unwrap();
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/users/7")
                    .header("Authorization", format!("Bearer {forged}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let app = crate::app::build_app(AppState::fake());
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/users/1")
                    .header("Authorization", "Basic dXNlcjpwdw==")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signup_and_login_stay_open() {
        // No Authorization header: both must get past the gate and fail on
        // validation instead, never with a 401.
        let app = crate::app::build_app(AppState::fake());
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"email":"bad","password":"","username":""}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
