use serde::{ser::SerializeStruct, Serialize, Serializer};

/// Machine-checkable marker attached to some error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorMarker {
    TokenExpired,
}

/// Uniform result returned by every public operation.
///
/// Serializes as `{ "success": true, "message", "data" }` or
/// `{ "success": false, "message", "data"? }`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success {
        data: T,
        message: String,
    },
    Error {
        message: String,
        marker: Option<ErrorMarker>,
    },
}

impl<T> Envelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::Success {
            data,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            marker: None,
        }
    }

    pub fn error_with(message: impl Into<String>, marker: ErrorMarker) -> Self {
        Self::Error {
            message: message.into(),
            marker: Some(marker),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { data, message } => {
                let mut s = serializer.serialize_struct("Envelope", 3)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("message", message)?;
                s.serialize_field("data", data)?;
                s.end()
            }
            Self::Error { message, marker } => {
                let len = if marker.is_some() { 3 } else { 2 };
                let mut s = serializer.serialize_struct("Envelope", len)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("message", message)?;
                match marker {
                    Some(marker) => s.serialize_field("data", marker)?,
                    None => s.skip_field("data")?,
                }
                s.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_shape() {
        let env = Envelope::success(json!({"id": "cus_1"}), "done");
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"success": true, "message": "done", "data": {"id": "cus_1"}})
        );
    }

    #[test]
    fn error_without_marker_omits_data() {
        let env: Envelope<()> = Envelope::error("Invalid password");
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"success": false, "message": "Invalid password"})
        );
    }

    #[test]
    fn error_marker_is_screaming_snake() {
        let env: Envelope<()> =
            Envelope::error_with("Token expired, please login again!", ErrorMarker::TokenExpired);
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["data"], "TOKEN_EXPIRED");
        assert_eq!(value["success"], false);
    }
}
