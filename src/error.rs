use serde::{ser::Serializer, Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a store operation can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseError {
    AlreadyOwned,
    UserCancelled,
    ServiceUnavailable,
    InsufficientQuantity,
    GeneralError,
    ProductRequestFailed,
}

impl PurchaseError {
    /// Wire code reported to the frontend.
    pub fn code(&self) -> &'static str {
        match self {
            PurchaseError::AlreadyOwned => "alreadyOwned",
            PurchaseError::UserCancelled => "userCancelled",
            PurchaseError::ServiceUnavailable => "serviceUnavailable",
            PurchaseError::InsufficientQuantity => "insufficientQuantity",
            PurchaseError::GeneralError => "generalError",
            PurchaseError::ProductRequestFailed => "productRequestFailed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{message}")]
    Purchase {
        error: PurchaseError,
        message: String,
    },
    #[error("{0} is not supported on this platform")]
    NotSupported(String),
    #[error("store request failed: {0}")]
    Store(String),
    #[error("store window unavailable: {0}")]
    Window(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tauri(#[from] tauri::Error),
}

impl Error {
    pub fn purchase(error: PurchaseError, message: impl Into<String>) -> Self {
        Error::Purchase {
            error,
            message: message.into(),
        }
    }

    /// The taxonomy member, if this is a purchase rejection.
    pub fn purchase_error(&self) -> Option<PurchaseError> {
        match self {
            Error::Purchase { error, .. } => Some(*error),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::Purchase { error, .. } => error.code(),
            Error::NotSupported(_) => "notSupported",
            Error::Store(_) => "storeError",
            Error::Window(_) => "windowError",
            Error::Io(_) => "ioError",
            Error::Tauri(_) => "tauriError",
        }
    }
}

/// Shape of an error as seen by the frontend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ErrorResponse::from(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_error_serializes_code_and_message() {
        let error = Error::purchase(PurchaseError::AlreadyOwned, "User already owns this item");
        let json = serde_json::to_string(&error).expect("Failed to serialize Error");
        assert_eq!(
            json,
            r#"{"code":"alreadyOwned","message":"User already owns this item"}"#
        );
    }

    #[test]
    fn test_not_supported_is_not_a_purchase_error() {
        let error = Error::NotSupported("upgrade_purchased_subscription".to_string());
        assert_eq!(error.purchase_error(), None);
        assert_eq!(error.code(), "notSupported");
        assert_eq!(
            error.to_string(),
            "upgrade_purchased_subscription is not supported on this platform"
        );
    }

    #[test]
    fn test_purchase_error_codes_are_distinct() {
        let all = [
            PurchaseError::AlreadyOwned,
            PurchaseError::UserCancelled,
            PurchaseError::ServiceUnavailable,
            PurchaseError::InsufficientQuantity,
            PurchaseError::GeneralError,
            PurchaseError::ProductRequestFailed,
        ];
        let mut codes: Vec<_> = all.iter().map(PurchaseError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_purchase_error_serde_matches_code() {
        let json = serde_json::to_string(&PurchaseError::InsufficientQuantity)
            .expect("Failed to serialize PurchaseError");
        assert_eq!(json, r#""insufficientQuantity""#);
    }
}
