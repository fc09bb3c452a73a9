use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub email: String,
    pub name: String,
}

/// Body for attaching a tokenized bank account (`btok_...`).
#[derive(Debug, Deserialize)]
pub struct AttachSourceRequest {
    pub source: String,
}

/// The two micro-deposit amounts, in cents, as reported by the customer.
#[derive(Debug, Deserialize)]
pub struct VerifySourceRequest {
    pub amounts: [u32; 2],
}

#[derive(Debug, Deserialize)]
pub struct CreateChargeRequest {
    pub customer_id: String,
    /// Smallest currency unit, e.g. cents.
    pub amount: i64,
    pub currency: String,
}
