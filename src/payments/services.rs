use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use super::{
    client::{PaymentError, PaymentGateway},
    dto::{AttachSourceRequest, CreateChargeRequest, CreateCustomerRequest, VerifySourceRequest},
    types::{BankAccount, Charge, Customer},
};
use crate::envelope::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum PaymentActionError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Gateway(#[from] PaymentError),
}

impl PaymentActionError {
    pub fn status(&self) -> StatusCode {
        match self {
            PaymentActionError::Invalid(_) => StatusCode::BAD_REQUEST,
            PaymentActionError::Gateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for PaymentActionError {
    fn into_response(self) -> Response {
        (self.status(), Json(Envelope::<()>::error(self.to_string()))).into_response()
    }
}

fn is_object_id(id: &str) -> bool {
    lazy_static! {
        static ref OBJECT_ID_RE: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    }
    OBJECT_ID_RE.is_match(id)
}

fn require_id(id: &str, what: &'static str) -> Result<(), PaymentActionError> {
    if is_object_id(id) {
        Ok(())
    } else {
        Err(PaymentActionError::Invalid(what))
    }
}

fn gateway_failure(op: &'static str) -> impl FnOnce(PaymentError) -> PaymentActionError {
    move |e| {
        error!(error = %e, op, "payment gateway call failed");
        PaymentActionError::Gateway(e)
    }
}

pub async fn create_customer(
    gateway: &dyn PaymentGateway,
    req: CreateCustomerRequest,
) -> Result<Customer, PaymentActionError> {
    let email = req.email.trim();
    let name = req.name.trim();
    if email.is_empty() || name.is_empty() {
        warn!("create customer without email or name");
        return Err(PaymentActionError::Invalid("Email and name are required"));
    }

    let customer = gateway
        .create_customer(email, name)
        .await
        .map_err(gateway_failure("create_customer"))?;
    info!(customer_id = %customer.id, "payment customer created");
    Ok(customer)
}

pub async fn verify_customer_source(
    gateway: &dyn PaymentGateway,
    customer_id: &str,
    source_id: &str,
    req: VerifySourceRequest,
) -> Result<BankAccount, PaymentActionError> {
    require_id(customer_id, "Invalid customer id")?;
    require_id(source_id, "Invalid source id")?;
    if req.amounts.iter().any(|&a| a == 0) {
        return Err(PaymentActionError::Invalid(
            "Both micro-deposit amounts must be positive",
        ));
    }

    let account = gateway
        .verify_source(customer_id, source_id, req.amounts)
        .await
        .map_err(gateway_failure("verify_source"))?;
    info!(customer_id, source_id, status = ?account.status, "customer source verified");
    Ok(account)
}

pub async fn attach_customer_source(
    gateway: &dyn PaymentGateway,
    customer_id: &str,
    req: AttachSourceRequest,
) -> Result<BankAccount, PaymentActionError> {
    require_id(customer_id, "Invalid customer id")?;
    require_id(req.source.trim(), "Invalid source token")?;

    let account = gateway
        .attach_source(customer_id, req.source.trim())
        .await
        .map_err(gateway_failure("attach_source"))?;
    info!(customer_id, source_id = %account.id, "customer source attached");
    Ok(account)
}

pub async fn create_charge(
    gateway: &dyn PaymentGateway,
    req: CreateChargeRequest,
) -> Result<Charge, PaymentActionError> {
    require_id(&req.customer_id, "Invalid customer id")?;
    if req.amount <= 0 {
        return Err(PaymentActionError::Invalid("Amount must be positive"));
    }
    let currency = req.currency.trim().to_ascii_lowercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(PaymentActionError::Invalid(
            "Currency must be a three-letter ISO code",
        ));
    }

    let charge = gateway
        .create_charge(&req.customer_id, req.amount, &currency)
        .await
        .map_err(gateway_failure("create_charge"))?;
    info!(charge_id = %charge.id, amount = charge.amount, currency = %charge.currency, "charge created");
    Ok(charge)
}
