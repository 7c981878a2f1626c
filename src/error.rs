use oauth2::basic::BasicErrorResponse;
use oauth2::RequestTokenError;
use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure on a data call
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered a data call with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The API answered with something that is not JSON
    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failure while talking to the token endpoint
    #[error("token request failed: {0}")]
    TokenTransport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The token endpoint refused the grant (bad credentials, revoked refresh token, ...)
    #[error("grant rejected: {0}")]
    GrantRejected(BasicErrorResponse),

    /// The grant response lacks `access_token`, `refresh_token` or `expires_in`
    #[error("malformed grant response: {0}")]
    MalformedGrantResponse(String),

    #[error("no session, call authenticate() first")]
    NotAuthenticated,

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("time format not supported: {0:?}, use epoch milliseconds or RFC 3339")]
    UnsupportedTimeFormat(String),

    #[error("environment variable {0} must be set")]
    MissingEnv(&'static str),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),
}

impl<RE> From<RequestTokenError<RE, BasicErrorResponse>> for Error
where
    RE: std::error::Error + Send + Sync + 'static,
{
    fn from(err: RequestTokenError<RE, BasicErrorResponse>) -> Self {
        match err {
            RequestTokenError::ServerResponse(response) => Error::GrantRejected(response),
            RequestTokenError::Request(e) => Error::TokenTransport(Box::new(e)),
            RequestTokenError::Parse(e, _body) => Error::MalformedGrantResponse(e.to_string()),
            RequestTokenError::Other(msg) => Error::MalformedGrantResponse(msg),
        }
    }
}
