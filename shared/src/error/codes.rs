//! Error codes
//!
//! Every code carries its numeric value, the HTTP status it answers with and
//! a default message. Ranges:
//!
//! | Range | Area |
//! |-------|------|
//! | 0xxx  | general |
//! | 1xxx  | auth |
//! | 4xxx  | orders and order statuses |
//! | 6xxx  | catalog, uploads, CSV import |
//! | 9xxx  | system |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! error_codes {
    ($( $(#[$doc:meta])* $name:ident = $value:literal, $status:ident, $message:literal; )+) => {
        /// Numeric error code sent to the admin UI
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$doc])* $name = $value, )+
        }

        impl ErrorCode {
            pub const fn message(&self) -> &'static str {
                match self {
                    $( Self::$name => $message, )+
                }
            }

            pub fn http_status(&self) -> StatusCode {
                match self {
                    $( Self::$name => StatusCode::$status, )+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$name), )+
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    Success = 0, OK, "Operation completed successfully";
    ValidationFailed = 2, BAD_REQUEST, "Validation failed";
    NotFound = 3, NOT_FOUND, "Resource not found";
    /// Malformed body, multipart stream or header
    InvalidRequest = 5, BAD_REQUEST, "Invalid request";
    InvalidFormat = 6, BAD_REQUEST, "Invalid format";
    RequiredField = 7, BAD_REQUEST, "Required field is missing";

    NotAuthenticated = 1001, UNAUTHORIZED, "User is not authenticated";
    InvalidCredentials = 1002, UNAUTHORIZED, "Invalid email or password";
    /// Unknown, expired or revoked session token
    TokenInvalid = 1004, UNAUTHORIZED, "Authentication token is invalid";

    OrderNotFound = 4001, NOT_FOUND, "Order not found";
    OrderEmpty = 4002, BAD_REQUEST, "Order must contain at least one item";
    OrderInvalidQuantity = 4003, BAD_REQUEST, "Item quantity must be at least 1";
    OrderStatusNotFound = 4101, NOT_FOUND, "Order status not found";
    OrderStatusInUse = 4102, CONFLICT, "Order status is used by existing orders";
    OrderStatusNameExists = 4103, CONFLICT, "Order status name already exists";
    /// Only raised when overselling is configured to be rejected
    InsufficientStock = 4201, UNPROCESSABLE_ENTITY, "Insufficient stock";

    ProductNotFound = 6001, NOT_FOUND, "Product not found";
    ProductInvalidPrice = 6002, BAD_REQUEST, "Product price is invalid";
    ProductNameRequired = 6003, BAD_REQUEST, "Product name is required";
    CategoryNotFound = 6101, NOT_FOUND, "Category not found";
    CategoryNameExists = 6102, CONFLICT, "Category name already exists";
    SubcategoryNotFound = 6111, NOT_FOUND, "Subcategory not found";
    SubcategoryNameExists = 6112, CONFLICT, "Subcategory name already exists";
    BrandNotFound = 6201, NOT_FOUND, "Brand not found";
    BrandNameExists = 6202, CONFLICT, "Brand name already exists";
    LabelNotFound = 6301, NOT_FOUND, "Label not found";
    LabelNameExists = 6302, CONFLICT, "Label name already exists";
    CarouselStateNotFound = 6401, NOT_FOUND, "Carousel state not found";
    CarouselStateNameExists = 6402, CONFLICT, "Carousel state name already exists";

    FileTooLarge = 6501, PAYLOAD_TOO_LARGE, "File is too large";
    UnsupportedFileFormat = 6502, BAD_REQUEST, "Unsupported file format";
    NoFileProvided = 6504, BAD_REQUEST, "No file provided";
    EmptyFile = 6505, BAD_REQUEST, "File is empty";
    FileStorageFailed = 6509, INTERNAL_SERVER_ERROR, "Failed to store file";

    CsvEmpty = 6601, BAD_REQUEST, "CSV file is empty";
    CsvMissingHeader = 6602, BAD_REQUEST, "CSV header has no recognized columns";

    InternalError = 9001, INTERNAL_SERVER_ERROR, "Internal server error";
    DatabaseError = 9002, INTERNAL_SERVER_ERROR, "Backend storage error";
    /// Backend unreachable; the client may retry
    NetworkError = 9003, SERVICE_UNAVAILABLE, "Network error";
}

/// Area an error code belongs to, by numeric range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Order,
    Catalog,
    System,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            0..1000 => ErrorCategory::General,
            1000..2000 => ErrorCategory::Auth,
            4000..5000 => ErrorCategory::Order,
            6000..7000 => ErrorCategory::Catalog,
            _ => ErrorCategory::System,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::OrderNotFound).unwrap(), "4001");
        let code: ErrorCode = serde_json::from_str("4102").unwrap();
        assert_eq!(code, ErrorCode::OrderStatusInUse);
        assert!(serde_json::from_str::<ErrorCode>("999").is_err());
    }

    #[test]
    fn test_try_from_matches_code() {
        for code in [
            ErrorCode::Success,
            ErrorCode::TokenInvalid,
            ErrorCode::InsufficientStock,
            ErrorCode::SubcategoryNameExists,
            ErrorCode::CsvMissingHeader,
            ErrorCode::NetworkError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(1), Err(InvalidErrorCode(1)));
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ProductNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::BrandNameExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::OrderStatusInUse.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::NotAuthenticated.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::FileTooLarge.http_status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::NetworkError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_category() {
        assert_eq!(ErrorCode::RequiredField.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::InvalidCredentials.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::OrderStatusInUse.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::EmptyFile.category(), ErrorCategory::Catalog);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::DatabaseError.message(), "Backend storage error");
    }
}
