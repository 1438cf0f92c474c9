use crate::account::{SignupError, SignupOutcome, SignupRequest, SignupService};
use crate::api::handlers::valid_email;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    email: String,
    password: String,
    client_id: String,
}

impl std::fmt::Debug for CreateAccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAccountRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("client_id", &self.client_id)
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CreateAccountResponse {
    pub user_id: String,
    pub code: String,
}

#[utoipa::path(
    post,
    path= "/create_account",
    request_body = CreateAccountRequest,
    responses (
        (status = 201, description = "Unverified account ready, verification code issued", body = CreateAccountResponse, content_type = "application/json"),
        (status = 400, description = "Missing payload or invalid email"),
        (status = 409, description = "A verified account already owns the email"),
        (status = 500, description = "User directory or code store failed"),
    ),
    tag= "signup"
)]
// axum handler for account creation
#[instrument(skip(service, payload))]
pub async fn create_account(
    service: Extension<Arc<SignupService>>,
    payload: Option<Json<CreateAccountRequest>>,
) -> Response {
    let request: CreateAccountRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("request: {:?}", request);

    if !valid_email(&request.email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let signup = SignupRequest::new(
        request.email,
        SecretString::from(request.password),
        request.client_id,
    );

    match service.handle_signup(&signup).await {
        Ok(SignupOutcome::Created(issued)) => (
            StatusCode::CREATED,
            Json(CreateAccountResponse {
                user_id: issued.user_id,
                code: issued.code,
            }),
        )
            .into_response(),
        Ok(SignupOutcome::Conflict) => StatusCode::CONFLICT.into_response(),
        Err(SignupError::InvalidRequest(reason)) => {
            (StatusCode::BAD_REQUEST, reason.to_string()).into_response()
        }
        Err(err) => {
            error!("Error creating account: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating account".to_string(),
            )
                .into_response()
        }
    }
}
