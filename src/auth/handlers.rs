use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::dto::{LoginRequest, LoginResponse, MessageResponse, SessionResponse, SignupRequest},
    error::reject,
    session::Dashboard,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/signout", post(signout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let mut controller = state.controller.lock().await;
    controller.signup(payload).await.map_err(reject)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Signup successful! Please login.".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let mut controller = state.controller.lock().await;
    let user = controller
        .login(&payload.email, &payload.password)
        .await
        .map_err(reject)?;
    Ok(Json(LoginResponse {
        message: format!("Welcome, {}!", user.name),
        user,
    }))
}

#[instrument(skip(state))]
pub async fn signout(State(state): State<AppState>) -> Json<MessageResponse> {
    state.controller.lock().await.signout();
    info!("session cleared");
    Json(MessageResponse {
        message: "Signed out successfully!".into(),
    })
}

#[instrument(skip(state))]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let controller = state.controller.lock().await;
    Json(SessionResponse {
        email: controller.current_user().map(str::to_string),
    })
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
) -> Result<Json<Dashboard>, (StatusCode, String)> {
    let controller = state.controller.lock().await;
    controller.dashboard().await.map(Json).map_err(reject)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_body(email: &str) -> SignupRequest {
        SignupRequest {
            name: "Kiran".into(),
            phone: "555".into(),
            dob: "2000-01-01".into(),
            email: email.into(),
            password: "pass".into(),
        }
    }

    fn login_body(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn signup_login_signout_over_handlers() {
        let state = AppState::fake();

        let (status, Json(body)) = signup(State(state.clone()), Json(signup_body("k@x.io")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Signup successful! Please login.");

        let Json(session) = get_session(State(state.clone())).await;
        assert_eq!(session.email, None);

        let Json(resp) = login(State(state.clone()), Json(login_body("k@x.io", "pass")))
            .await
            .unwrap();
        assert_eq!(resp.message, "Welcome, Kiran!");
        assert_eq!(resp.user.email, "k@x.io");

        let Json(session) = get_session(State(state.clone())).await;
        assert_eq!(session.email.as_deref(), Some("k@x.io"));

        let Json(me) = get_me(State(state.clone())).await.unwrap();
        assert_eq!(me.welcome, "Welcome Kiran!");

        signout(State(state.clone())).await;
        let Json(session) = get_session(State(state.clone())).await;
        assert_eq!(session.email, None);
    }

    #[tokio::test]
    async fn auth_failures_map_to_statuses() {
        let state = AppState::fake();
        signup(State(state.clone()), Json(signup_body("k@x.io")))
            .await
            .unwrap();

        let (status, msg) = signup(State(state.clone()), Json(signup_body("k@x.io")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(msg.contains("already exists"));

        let (status, msg) = login(State(state.clone()), Json(login_body("k@x.io", "wrong")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(msg, "Incorrect password.");

        let (status, _) = login(State(state.clone()), Json(login_body("nobody@x.io", "pass")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_me(State(state)).await.unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
