use std::fmt;

#[derive(Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(tag = "type")]
pub enum Error {
    InvalidConfig { with: &'static str },
    BadUrl,
    BadParam { with: &'static str },
    EntropyUnavailable,

    InvalidSession,
    InternalError,

    VerifyFailed { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig { with } => write!(f, "invalid Discourse SSO configuration: {with}"),
            Error::BadUrl => write!(f, "bad URL: request has no query string"),
            Error::BadParam { with } => write!(f, "bad param: missing `{with}`"),
            Error::EntropyUnavailable => write!(f, "secure random source unavailable"),
            Error::InvalidSession => write!(f, "session slot holds unreadable SSO state"),
            Error::InternalError => write!(f, "internal error"),
            Error::VerifyFailed { reason } => write!(f, "verify callback failed: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type Success = Result<()>;
