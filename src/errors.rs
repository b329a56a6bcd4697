//! Typed error hierarchy for the ticketsmith pipeline.
//!
//! Three top-level enums cover the three external collaborators:
//! - `ServiceError` — remote issue-service failures
//! - `FilesystemError` — template/destination failures during provisioning
//! - `NotificationError` — desktop notification failures
//!
//! `StepError` tags one of the above with the pipeline step that raised it,
//! so the run report can say which step sank an issue spec.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the remote issue service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to reach issue service: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Issue service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response from issue service: {0}")]
    MalformedResponse(#[source] reqwest::Error),
}

/// Errors from template reading and folder provisioning.
#[derive(Debug, Error)]
pub enum FilesystemError {
    #[error("Failed to read template directory {path}: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create destination directory {path}: {source}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the desktop notification subsystem.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to display notification: {0}")]
    Display(String),
}

/// A subsystem error tagged with the pipeline step it aborted.
///
/// Creation and estimate failures both come from the issue service but are
/// kept as separate variants so the run report can tell them apart.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("issue creation failed: {0}")]
    CreateIssue(#[source] ServiceError),

    #[error("time estimate failed: {0}")]
    SetEstimate(#[source] ServiceError),

    #[error("folder provisioning failed: {0}")]
    Provision(#[from] FilesystemError),

    #[error("notification failed: {0}")]
    Notify(#[from] NotificationError),
}
