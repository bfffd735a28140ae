//! Error types shared by the CouchDB storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CouchDaoError`] failures.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while interacting with CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable is missing.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB rejected a GET against the target database.
    #[error("failed to query CouchDB database `{database}`")]
    DatabaseQuery {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB rejected a database creation request.
    #[error("failed to create CouchDB database `{database}`")]
    DatabaseCreate {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a database operation.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        database: String,
        status: StatusCode,
    },
    /// A request for a match or user document (or the `_all_docs` listing)
    /// could not be sent.
    #[error("failed to send CouchDB request for roster document `{document}`")]
    RequestSend {
        document: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered a roster document request with an unexpected status.
    #[error("unexpected CouchDB response status {status} for roster document `{document}`")]
    RequestStatus { document: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode CouchDB response for roster document `{document}`")]
    DecodeResponse {
        document: String,
        #[source]
        source: reqwest::Error,
    },
    /// A stored document is not a valid match or user.
    #[error("roster document `{document}` does not match the match/user model")]
    DeserializeValue {
        document: String,
        #[source]
        source: serde_json::Error,
    },
    /// Failed to parse a document ID into its key.
    #[error("invalid document ID `{doc_id}`: {kind}")]
    InvalidDocId { doc_id: String, kind: &'static str },
}
