//! Run-level failure vocabulary.
//!
//! [`LhrErrorCode`] is a closed, append-only enumeration: codes are never
//! renumbered or reused once shipped. The classifier does not detect failure
//! conditions, the orchestration layer does; it defines the vocabulary, the
//! [`RuntimeError`] envelope (code + free-text message) and the
//! [`RunOutcome`] sum type that says whether results are authoritative.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::wire_enum::wire_enum;

wire_enum! {
    /// Why a run failed to complete normally.
    ///
    /// Unrecognized symbols decode as `UNKNOWN_ERROR`.
    pub enum LhrErrorCode {
        fallback UnknownError = 1 => "UNKNOWN_ERROR";
        NoError = 0 => "NO_ERROR",
        NoSpeedlineFrames = 2 => "NO_SPEEDLINE_FRAMES",
        SpeedindexOfZero = 3 => "SPEEDINDEX_OF_ZERO",
        NoScreenshots = 4 => "NO_SCREENSHOTS",
        InvalidSpeedline = 5 => "INVALID_SPEEDLINE",
        NoTracingStarted = 6 => "NO_TRACING_STARTED",
        NoNavstart = 7 => "NO_NAVSTART",
        NoFcp = 8 => "NO_FCP",
        NoDcl = 9 => "NO_DCL",
        NoDocumentRequest = 10 => "NO_DOCUMENT_REQUEST",
        FailedDocumentRequest = 11 => "FAILED_DOCUMENT_REQUEST",
        ErroredDocumentRequest = 12 => "ERRORED_DOCUMENT_REQUEST",
        TracingAlreadyStarted = 13 => "TRACING_ALREADY_STARTED",
        ParsingProblem = 14 => "PARSING_PROBLEM",
        ReadFailed = 15 => "READ_FAILED",
        InsecureDocumentRequest = 16 => "INSECURE_DOCUMENT_REQUEST",
        ProtocolTimeout = 17 => "PROTOCOL_TIMEOUT",
        PageHung = 18 => "PAGE_HUNG",
        DnsFailure = 19 => "DNS_FAILURE",
        CriTimeout = 20 => "CRI_TIMEOUT",
        NotHtml = 21 => "NOT_HTML",
        NoResourceRequest = 22 => "NO_RESOURCE_REQUEST",
        ChromeInterstitialError = 23 => "CHROME_INTERSTITIAL_ERROR",
        NoLcp = 24 => "NO_LCP",
        TargetCrashed = 25 => "TARGET_CRASHED",
    }
}

/// Coarse family of a failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorGroup {
    None,
    Uncategorized,
    /// Trace collection or processing failed.
    Trace,
    /// The main document could not be loaded.
    Navigation,
    /// The debugger protocol or the page stopped responding.
    Protocol,
}

impl LhrErrorCode {
    pub fn is_error(&self) -> bool {
        *self != LhrErrorCode::NoError
    }

    pub fn group(&self) -> ErrorGroup {
        use LhrErrorCode::*;
        match self {
            NoError => ErrorGroup::None,
            UnknownError => ErrorGroup::Uncategorized,
            NoSpeedlineFrames | SpeedindexOfZero | NoScreenshots | InvalidSpeedline
            | NoTracingStarted | NoNavstart | NoFcp | NoDcl | ParsingProblem | ReadFailed
            | NoResourceRequest | NoLcp => ErrorGroup::Trace,
            NoDocumentRequest | FailedDocumentRequest | ErroredDocumentRequest
            | InsecureDocumentRequest | DnsFailure | NotHtml | ChromeInterstitialError
            | TargetCrashed => ErrorGroup::Navigation,
            TracingAlreadyStarted | ProtocolTimeout | PageHung | CriTimeout => {
                ErrorGroup::Protocol
            }
        }
    }

    /// English fallback text used when a producer supplies no message.
    pub fn default_message(&self) -> &'static str {
        use LhrErrorCode::*;
        match self {
            NoError => "No error.",
            UnknownError => "An unknown error occurred during the run.",
            NoSpeedlineFrames => "The trace did not contain any screenshot frames.",
            SpeedindexOfZero => "No visual change was detected between the start and end of load.",
            NoScreenshots => "The trace did not contain any screenshot events.",
            InvalidSpeedline => "The computed speed index results are nonsensical.",
            NoTracingStarted => "The trace did not contain a tracing-started marker.",
            NoNavstart => "The trace did not contain a navigation-start marker.",
            NoFcp => "The page did not paint any content.",
            NoDcl => "The trace did not contain a DOMContentLoaded marker.",
            NoDocumentRequest => "No network request could be identified as the main document.",
            FailedDocumentRequest => "The main document request failed.",
            ErroredDocumentRequest => {
                "The main document request returned an HTTP 4xx or 5xx status."
            }
            TracingAlreadyStarted => "Tracing was already active when the run tried to start it.",
            ParsingProblem => "The trace data could not be parsed.",
            ReadFailed => "The trace data failed to stream from the browser.",
            InsecureDocumentRequest => "The main document was blocked as insecure.",
            ProtocolTimeout => "A debugger protocol command timed out.",
            PageHung => "The page stopped responding.",
            DnsFailure => "DNS lookup for the page's domain failed.",
            CriTimeout => "Timed out connecting to the debugger protocol.",
            NotHtml => "The page provided is not HTML.",
            NoResourceRequest => "The trace did not contain any resource requests.",
            ChromeInterstitialError => "An interstitial page blocked the load.",
            NoLcp => "The page did not produce a largest contentful paint.",
            TargetCrashed => "The browser tab crashed while loading the page.",
        }
    }
}

/// A run-level failure: code plus human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeError {
    pub code: LhrErrorCode,

    /// Kept verbatim on decode, including an empty string.
    pub message: String,
}

impl RuntimeError {
    /// Build an envelope. An empty message is replaced by the code's
    /// default text.
    pub fn new(code: LhrErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_string()
        } else {
            message
        };
        Self { code, message }
    }

    pub fn from_code(code: LhrErrorCode) -> Self {
        Self::new(code, String::new())
    }

    pub fn is_error(&self) -> bool {
        self.code.is_error()
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Terminal state of a run: either full results, or a failure whose
/// accompanying audit/category data is best-effort only.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed,
    Failed(RuntimeError),
}

impl RunOutcome {
    /// Classify an optional runtime error. `NO_ERROR` is a completed run.
    pub fn classify(runtime_error: Option<&RuntimeError>) -> Self {
        match runtime_error {
            Some(err) if err.is_error() => RunOutcome::Failed(err.clone()),
            _ => RunOutcome::Completed,
        }
    }

    /// Whether audit and category data can be taken at face value.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }

    pub fn error(&self) -> Option<&RuntimeError> {
        match self {
            RunOutcome::Completed => None,
            RunOutcome::Failed(err) => Some(err),
        }
    }

    /// The value stored in a record's `runtime_error` field.
    pub fn into_runtime_error(self) -> Option<RuntimeError> {
        match self {
            RunOutcome::Completed => None,
            RunOutcome::Failed(err) => Some(err),
        }
    }
}

impl From<RuntimeError> for RunOutcome {
    fn from(err: RuntimeError) -> Self {
        RunOutcome::classify(Some(&err))
    }
}
