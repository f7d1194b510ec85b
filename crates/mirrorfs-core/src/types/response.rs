//! Uniform response envelope for the operations exposed to UI/API callers.

use serde::Serialize;

use crate::error::AppError;

/// The uniform envelope every exposed operation is reported through:
/// `{ok: true, ...payload}` on success, `{ok: false, message, status}` on
/// failure.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Success payload, flattened into the envelope (absent on failure).
    #[serde(flatten)]
    pub payload: Option<T>,
    /// Human-readable failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// HTTP-style status for failures (400, 404, 409, 500, 502).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a success payload.
    pub fn success(payload: T) -> Self {
        Self {
            ok: true,
            payload: Some(payload),
            message: None,
            status: None,
        }
    }

    /// Wrap an application error.
    pub fn failure(err: &AppError) -> Self {
        Self {
            ok: false,
            payload: None,
            message: Some(err.message.clone()),
            status: Some(err.status_code()),
        }
    }

    /// Build an envelope from a result.
    pub fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => Self::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        renamed: u32,
    }

    #[test]
    fn test_success_envelope_flattens_payload() {
        let env = Envelope::success(Payload { renamed: 3 });
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["renamed"], 3);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_failure_envelope_carries_status() {
        let env = Envelope::<Payload>::failure(&AppError::conflict("destination exists"));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["status"], 409);
        assert_eq!(json["message"], "destination exists");
    }
}
