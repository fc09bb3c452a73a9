use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::envelope::Envelope;

/// `Json<T>` whose rejection is rendered as an error envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                warn!(error = %rejection.body_text(), "rejected request body");
                Err(BodyRejection(rejection))
            }
        }
    }
}

#[derive(Debug)]
pub struct BodyRejection(JsonRejection);

impl BodyRejection {
    pub fn message(&self) -> &'static str {
        match self.0 {
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON request body",
            _ => "Invalid request body",
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        (self.0.status(), Json(Envelope::<()>::error(self.message()))).into_response()
    }
}
