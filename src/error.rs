//! Error types used by the jobq engine and by job code.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`]: rejected configuration, returned synchronously by
//!   [`JobQueueBuilder::build`](crate::JobQueueBuilder::build).
//! - [`RuntimeError`]: failures of the engine itself after `start()`
//!   (source resolution, closed engine). Reported through `error` events.
//! - [`JobError`]: failures reported by pull functions, streams and process
//!   functions for a single job.
//!
//! All types provide `as_label` for logs/metrics.

use std::any::Any;

use thiserror::Error;

use crate::source::SourceKind;

/// # Errors detected while building a queue.
///
/// Construction never completes when one of these is returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No process function was configured.
    #[error("required parameter [process] must be set")]
    ProcessRequired,

    /// No source was configured.
    #[error("source is required to be a sequence, pull function, deferred source or stream")]
    SourceRequired,

    /// Polling was configured for a source that cannot be pulled again.
    #[error("only pull or deferred sources can be used with polling (got {kind})")]
    PollingRequiresPullSource {
        /// Kind of the rejected source.
        kind: SourceKind,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobq::ConfigError;
    ///
    /// assert_eq!(ConfigError::ProcessRequired.as_label(), "config_process_required");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ProcessRequired => "config_process_required",
            ConfigError::SourceRequired => "config_source_required",
            ConfigError::PollingRequiresPullSource { .. } => "config_polling_requires_pull",
        }
    }
}

/// # Errors produced by the engine after it was started.
///
/// Resolution failures are always fatal to the run: the engine moves to
/// `Error` and emits `processFinish` without polling.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A deferred source resolved to an error instead of a usable source.
    #[error("source is invalid: {reason}")]
    SourceInvalid {
        /// Error reported by the deferred source.
        reason: String,
    },

    /// A deferred source resolved to a kind that cannot be polled.
    #[error("only pull or deferred sources can be used with polling (resolved to {kind})")]
    PollingRequiresPullSource {
        /// Kind the deferred source resolved to.
        kind: SourceKind,
    },

    /// The scheduler task is gone; no further progress can be observed.
    #[error("engine closed before finishing")]
    Closed,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::SourceInvalid { .. } => "runtime_source_invalid",
            RuntimeError::PollingRequiresPullSource { .. } => "runtime_polling_requires_pull",
            RuntimeError::Closed => "runtime_closed",
        }
    }
}

/// # Errors produced by a single job.
///
/// Returned by pull functions, stream items and process functions. Each one
/// increments the error counter and is published as an `error` event.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The job failed.
    #[error("job failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// User code panicked while fetching or processing the item.
    #[error("job panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// A [`Done`](crate::Done) handle was dropped without resolving the job.
    #[error("completion handle dropped without a result")]
    Abandoned,
}

impl JobError {
    /// Shorthand for [`JobError::Fail`].
    ///
    /// # Example
    /// ```
    /// use jobq::JobError;
    ///
    /// let err = JobError::fail("boom");
    /// assert_eq!(err.to_string(), "job failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        JobError::Fail {
            error: error.into(),
        }
    }

    /// Builds [`JobError::Panicked`] from a caught panic payload.
    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        JobError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Panicked { .. } => "job_panicked",
            JobError::Abandoned => "job_abandoned",
        }
    }
}

/// Renders a panic payload (`&'static str` or `String`) as text.
pub(crate) fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(ConfigError::SourceRequired.as_label(), "config_source_required");
        assert_eq!(
            RuntimeError::SourceInvalid { reason: "x".into() }.as_label(),
            "runtime_source_invalid"
        );
        assert_eq!(JobError::Abandoned.as_label(), "job_abandoned");
    }

    #[test]
    fn test_panic_message_downcasts_common_payloads() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }

    #[test]
    fn test_polling_error_names_the_kind() {
        let err = ConfigError::PollingRequiresPullSource {
            kind: SourceKind::Sequence,
        };
        assert!(err.to_string().contains("sequence"));
    }
}
