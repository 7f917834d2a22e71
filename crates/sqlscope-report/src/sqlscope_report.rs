//! sqlscope report - rendering and request-boundary hooks
//!
//! Turns a finished `QueryAnalysis` into human-facing output:
//!
//! - `Formatter` - summary line, response-header value, plain-text report,
//!   HTML overlay
//! - `RequestBoundary` - wraps one request's handler in a capture scope and
//!   applies the reporting hooks (header, log, overlay injection)

pub mod boundary;
pub mod formatter;

pub use boundary::{DiagnosticRequest, DiagnosticResponse, RequestBoundary, SQLSCOPE_HEADER, with_capture};
pub use formatter::Formatter;
