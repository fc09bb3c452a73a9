//! Payment processor API types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Remote customer object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    /// Processor-assigned customer ID (`cus_...`).
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Created timestamp (Unix).
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    /// Remaining processor fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tokenized bank account attached to a customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankAccount {
    /// Source ID (`ba_...`).
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    /// `new`, `validated`, `verified`, `verification_failed` or `errored`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Charge against a customer's source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Charge {
    pub id: String,
    /// Amount in the currency's smallest unit.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub created: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Error body returned by the processor on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}
