use wpexit_core::oauth::OAuthError;
use wpexit_core::pagination::PaginationError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),

    #[error("Error retrieving access token [{status}]: {body}")]
    Authentication { status: u16, body: String },

    #[error("No authorization code was provided")]
    EmptyAuthorizationCode,

    #[error(transparent)]
    TokenResponse(#[from] OAuthError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}
