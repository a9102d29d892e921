use reqwest::StatusCode;
use thiserror::Error;

/// Transport level failure shared by every Helix call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// The credential exchange failed. Nothing else can run without a token.
#[derive(Error, Debug)]
#[error("token exchange failed: {0}")]
pub struct AuthError(#[from] pub ApiError);

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("broadcaster not found: {0}")]
    NotFound(String),
    #[error("lookup for broadcaster {login} failed: {source}")]
    Api {
        login: String,
        #[source]
        source: ApiError,
    },
}

#[derive(Error, Debug)]
#[error("clip listing for {broadcaster} failed: {source}")]
pub struct FetchError {
    pub broadcaster: String,
    #[source]
    pub source: ApiError,
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook rejected the message with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures that end a run. Per-broadcaster problems never surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("publishing clip {clip_id} from {broadcaster} failed: {source}")]
    Publish {
        clip_id: String,
        broadcaster: String,
        #[source]
        source: PublishError,
    },
    #[error("recording clip {clip_id} as posted failed: {source}")]
    Store {
        clip_id: String,
        #[source]
        source: StoreError,
    },
}
