//! Error types for the relay.
//!
//! Fault and forwarding failures never escape the executor: they are turned
//! into plain messages on the `errors` list of the node's response. Only
//! `RelayError` reaches the HTTP boundary.

use thiserror::Error;

/// Failures produced while casting or running a fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FaultError {
    #[error("fault type was not defined")]
    MissingFaultType,
    #[error("fault type {0}, is not implemented")]
    UnknownFaultType(String),
    #[error("invalid args for {fault} fault: {reason}")]
    InvalidFaultArgs { fault: String, reason: String },
    #[error("{fault} fault failed: {reason}")]
    FaultExecution { fault: String, reason: String },
}

/// Failures produced while forwarding a route to a downstream node.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("child route {designation} is malformed: {reason}")]
    InvalidRoute { designation: String, reason: String },
    #[error("destination {designation} unreachable: {reason}")]
    DestinationUnreachable { designation: String, reason: String },
    #[error("destination {designation} answered {status}: {body}")]
    DestinationRejected {
        designation: String,
        status: u16,
        body: String,
    },
    #[error("could not parse response from {designation}: {reason}")]
    ResponseParse { designation: String, reason: String },
}

/// Errors that surface at the process or HTTP boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed route payload: {0}")]
    MalformedInput(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::MalformedInput(e.to_string())
    }
}

pub type FaultResult<T> = std::result::Result<T, FaultError>;
pub type ForwardResult<T> = std::result::Result<T, ForwardError>;
