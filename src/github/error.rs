use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a status of 400 or above.
    #[error("{}", describe_status(.0))]
    HttpStatus(StatusCode),

    /// The response body was not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Header(#[from] http::header::InvalidHeaderValue),
}

impl Error {
    /// Status code of a rejected request, if that is what this error is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpStatus(status) => Some(*status),
            _ => None,
        }
    }
}

fn describe_status(status: &StatusCode) -> String {
    match *status {
        StatusCode::UNAUTHORIZED => "invalid credentials, the token was rejected (401)".to_owned(),
        StatusCode::FORBIDDEN => {
            "permission denied, the token lacks the required scope (403)".to_owned()
        }
        StatusCode::NOT_FOUND => "not found, check the owner name (404)".to_owned(),
        status => format!("API request failed with status {}", status.as_u16()),
    }
}
