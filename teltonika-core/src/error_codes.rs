//! Error codes reported in the `errors` array of device responses

use serde::{Deserialize, Serialize};

/// Error codes documented for the Teltonika REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ErrorCode {
    ResponseNotImplemented,
    NoActionProvided,
    ProvidedActionNotAvailable,
    InvalidOptions,
    UciGetError,
    UciDeleteError,
    UciCreateError,
    InvalidStructure,
    SectionCreationNotAllowed,
    NameAlreadyUsed,
    NameNotProvided,
    DeleteNotAllowed,
    DeletionOfWholeConfigNotAllowed,
    InvalidSectionProvided,
    NoBodyProvided,
    UciSetError,
    InvalidQueryParameter,
    GeneralConfigurationError,
    UnauthorizedAccess,
    LoginFailed,
    GeneralStructureIncorrect,
    InvalidJwtToken,
    NotEnoughFreeSpace,
    FileSizeTooBig,
}

impl ErrorCode {
    /// Every documented code, in numeric order.
    pub const ALL: [ErrorCode; 24] = [
        ErrorCode::ResponseNotImplemented,
        ErrorCode::NoActionProvided,
        ErrorCode::ProvidedActionNotAvailable,
        ErrorCode::InvalidOptions,
        ErrorCode::UciGetError,
        ErrorCode::UciDeleteError,
        ErrorCode::UciCreateError,
        ErrorCode::InvalidStructure,
        ErrorCode::SectionCreationNotAllowed,
        ErrorCode::NameAlreadyUsed,
        ErrorCode::NameNotProvided,
        ErrorCode::DeleteNotAllowed,
        ErrorCode::DeletionOfWholeConfigNotAllowed,
        ErrorCode::InvalidSectionProvided,
        ErrorCode::NoBodyProvided,
        ErrorCode::UciSetError,
        ErrorCode::InvalidQueryParameter,
        ErrorCode::GeneralConfigurationError,
        ErrorCode::UnauthorizedAccess,
        ErrorCode::LoginFailed,
        ErrorCode::GeneralStructureIncorrect,
        ErrorCode::InvalidJwtToken,
        ErrorCode::NotEnoughFreeSpace,
        ErrorCode::FileSizeTooBig,
    ];

    /// Numeric value as sent by the device.
    pub fn code(self) -> i64 {
        match self {
            ErrorCode::ResponseNotImplemented => 100,
            ErrorCode::NoActionProvided => 101,
            ErrorCode::ProvidedActionNotAvailable => 102,
            ErrorCode::InvalidOptions => 103,
            ErrorCode::UciGetError => 104,
            ErrorCode::UciDeleteError => 105,
            ErrorCode::UciCreateError => 106,
            ErrorCode::InvalidStructure => 107,
            ErrorCode::SectionCreationNotAllowed => 108,
            ErrorCode::NameAlreadyUsed => 109,
            ErrorCode::NameNotProvided => 110,
            ErrorCode::DeleteNotAllowed => 111,
            ErrorCode::DeletionOfWholeConfigNotAllowed => 112,
            ErrorCode::InvalidSectionProvided => 113,
            ErrorCode::NoBodyProvided => 114,
            ErrorCode::UciSetError => 115,
            ErrorCode::InvalidQueryParameter => 116,
            ErrorCode::GeneralConfigurationError => 117,
            ErrorCode::UnauthorizedAccess => 120,
            ErrorCode::LoginFailed => 121,
            ErrorCode::GeneralStructureIncorrect => 122,
            ErrorCode::InvalidJwtToken => 123,
            ErrorCode::NotEnoughFreeSpace => 150,
            ErrorCode::FileSizeTooBig => 151,
        }
    }

    /// Look up a documented code.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Human-readable description from the API documentation.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::ResponseNotImplemented => "Response not implemented",
            ErrorCode::NoActionProvided => "No action provided",
            ErrorCode::ProvidedActionNotAvailable => "Provided action is not available",
            ErrorCode::InvalidOptions => "Invalid options",
            ErrorCode::UciGetError => "UCI GET error",
            ErrorCode::UciDeleteError => "UCI DELETE error",
            ErrorCode::UciCreateError => "UCI CREATE error",
            ErrorCode::InvalidStructure => "Invalid structure",
            ErrorCode::SectionCreationNotAllowed => "Section creation is not allowed",
            ErrorCode::NameAlreadyUsed => "Name already used",
            ErrorCode::NameNotProvided => "Name not provided",
            ErrorCode::DeleteNotAllowed => "DELETE not allowed",
            ErrorCode::DeletionOfWholeConfigNotAllowed => {
                "Deletion of whole configuration is not allowed"
            }
            ErrorCode::InvalidSectionProvided => "Invalid section provided",
            ErrorCode::NoBodyProvided => "No body provided for the request",
            ErrorCode::UciSetError => "UCI SET error",
            ErrorCode::InvalidQueryParameter => "Invalid query parameter",
            ErrorCode::GeneralConfigurationError => "General configuration error",
            ErrorCode::UnauthorizedAccess => "Unauthorized access",
            ErrorCode::LoginFailed => "Login failed for any reason",
            ErrorCode::GeneralStructureIncorrect => "General structure of request is incorrect",
            ErrorCode::InvalidJwtToken => {
                "JWT token that is provided with authorization header is invalid"
            }
            ErrorCode::NotEnoughFreeSpace => {
                "Not enough free space in the device (when uploading files)"
            }
            ErrorCode::FileSizeTooBig => {
                "File size is bigger than the maximum size allowed (when uploading files)"
            }
        }
    }

    /// Codes 120-123 signal a rejected login or token.
    pub fn is_auth(self) -> bool {
        matches!(
            self,
            ErrorCode::UnauthorizedAccess
                | ErrorCode::LoginFailed
                | ErrorCode::GeneralStructureIncorrect
                | ErrorCode::InvalidJwtToken
        )
    }
}

/// Whether a raw code from the device is one of the authentication codes.
pub fn is_auth_code(code: i64) -> bool {
    ErrorCode::from_code(code).is_some_and(ErrorCode::is_auth)
}

impl TryFrom<i64> for ErrorCode {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("Unknown error code: {}", code))
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}
