use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AttachSourceRequest, CreateChargeRequest, CreateCustomerRequest, VerifySourceRequest},
    services::{self, PaymentActionError},
    types::{BankAccount, Charge, Customer},
};
use crate::{
    auth::extractors::SessionUser, envelope::Envelope, extract::JsonBody, state::AppState,
};

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/payments/customers", post(create_customer))
        .route(
            "/payments/customers/:customer_id/sources",
            post(attach_customer_source),
        )
        .route(
            "/payments/customers/:customer_id/sources/:source_id/verify",
            post(verify_customer_source),
        )
        .route("/payments/charges", post(create_charge))
}

#[instrument(skip_all, fields(user_id = %session.user.id))]
pub async fn create_customer(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    JsonBody(payload): JsonBody<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Envelope<Customer>>), PaymentActionError> {
    let customer = services::create_customer(state.payments.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(customer, "Created payment customer successfully")),
    ))
}

#[instrument(skip_all, fields(user_id = %session.user.id, customer_id = %customer_id))]
pub async fn attach_customer_source(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    Path(customer_id): Path<String>,
    JsonBody(payload): JsonBody<AttachSourceRequest>,
) -> Result<(StatusCode, Json<Envelope<BankAccount>>), PaymentActionError> {
    let account =
        services::attach_customer_source(state.payments.as_ref(), &customer_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(account, "Attached customer source successfully")),
    ))
}

#[instrument(skip_all, fields(user_id = %session.user.id, customer_id = %customer_id, source_id = %source_id))]
pub async fn verify_customer_source(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    Path((customer_id, source_id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<VerifySourceRequest>,
) -> Result<Json<Envelope<BankAccount>>, PaymentActionError> {
    let account = services::verify_customer_source(
        state.payments.as_ref(),
        &customer_id,
        &source_id,
        payload,
    )
    .await?;
    Ok(Json(Envelope::success(
        account,
        "Verified customer source successfully",
    )))
}

#[instrument(skip_all, fields(user_id = %session.user.id))]
pub async fn create_charge(
    State(state): State<AppState>,
    SessionUser(session): SessionUser,
    JsonBody(payload): JsonBody<CreateChargeRequest>,
) -> Result<(StatusCode, Json<Envelope<Charge>>), PaymentActionError> {
    let charge = services::create_charge(state.payments.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(charge, "Created charge successfully")),
    ))
}
