use crate::context::RequestContext;
use crate::error::{AppError, Result};
use crate::services::registration_service::RegistrationError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ActivateParams {
    pub token: String,
}

/// Starts a registration: creates the user row when the address is unknown
/// and mails an activation link. The response is the same whether or not
/// the address already exists, so the endpoint does not reveal which emails
/// are registered.
pub async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    let email = request.email.trim();

    if email.is_empty() || !email.contains('@') || email.len() > 255 {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let ctx = RequestContext::from_headers(&headers).map_err(RegistrationError::from)?;

    let response = json!({
        "message": "An activation email will be sent if the address is eligible."
    });

    tracing::info!("Starting registration for {}", email);

    let service = &state.registration_service;
    let user = match service.find_user_by_email(email).await? {
        Some(user) if user.email_verified => return Ok(Json(response)),
        Some(user) => user,
        None => service.create_user(email).await?,
    };

    service
        .send_registration_activation_mail(&ctx, &user)
        .await?;

    Ok(Json(response))
}

/// Completes a registration: validates the token, marks the user's email
/// verified and deletes the token.
pub async fn activate_handler(
    State(state): State<AppState>,
    Query(params): Query<ActivateParams>,
) -> Result<Json<Value>> {
    let user = state.registration_service.activate(&params.token).await?;

    Ok(Json(json!({
        "message": "Account activated",
        "email": user.email,
    })))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
