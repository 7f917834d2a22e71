//! The request boundary
//!
//! One capture scope per logical request. The boundary opens the scope,
//! runs the handler, and applies the reporting hooks to the finished
//! analysis after the handler returns: the summary header is always set,
//! excess usage is logged, and in debug mode the plain-text report is
//! logged and the HTML overlay injected into interactive HTML responses.

use crate::formatter::Formatter;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlscope_capture::QueryAnalysis;
use sqlscope_core::Config;
use std::future::Future;

/// Response header carrying the aggregate metrics summary
pub const SQLSCOPE_HEADER: &str = "X-SqlScope";

static HTML_CONTENT_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)text/x?html").expect("valid regex"));

/// Request-side facts the boundary consults
pub trait DiagnosticRequest {
    /// HTTP method, for log output
    fn method(&self) -> &str;
    /// Request URL, for log output
    fn url(&self) -> &str;
    /// False for background/API calls; suppresses overlay injection
    fn is_interactive(&self) -> bool;
}

/// The response mutations and inspections the boundary needs
pub trait DiagnosticResponse {
    /// The response content type, if one is set
    fn content_type(&self) -> Option<&str>;
    /// True for redirect responses; suppresses overlay injection
    fn is_redirect(&self) -> bool;
    /// Set a response header, replacing any previous value
    fn set_header(&mut self, name: &str, value: &str);
    /// Append content to the response body
    fn append_body(&mut self, content: &str);
}

/// Run `fut` inside a capture scope and return its output together with the
/// finished analysis. Thin alias for [`QueryAnalysis::capture`] at the
/// reporting layer's level.
pub async fn with_capture<Fut>(fut: Fut) -> (Fut::Output, QueryAnalysis)
where
    Fut: Future,
{
    QueryAnalysis::capture(fut).await
}

/// Wraps one request's handler in a capture scope and reports on the result
#[derive(Debug, Default)]
pub struct RequestBoundary;

impl RequestBoundary {
    /// Run `handler` for `request`, then apply the reporting hooks to the
    /// returned response.
    ///
    /// Reporting starts only after the handler returns, so the analysis is
    /// fully populated. The handler's response comes back with the metrics
    /// header set; the body is touched only by overlay injection, which
    /// applies when debug mode is on, the analysis is flagged (or
    /// `always_show` is set), and the response is an interactive,
    /// non-redirect HTML page.
    pub async fn handle<Req, Resp, Fut>(request: &Req, handler: Fut) -> Resp
    where
        Req: DiagnosticRequest,
        Resp: DiagnosticResponse,
        Fut: Future<Output = Resp>,
    {
        let (mut response, analysis) = QueryAnalysis::capture(handler).await;
        let config = Config::get();
        let formatter = Formatter::new(&analysis);

        response.set_header(SQLSCOPE_HEADER, &formatter.header_value());

        if analysis.too_many_queries() || analysis.too_many_rows() {
            tracing::warn!(
                method = request.method(),
                url = request.url(),
                queries = analysis.total_queries(),
                rows = analysis.rows(),
                "excess database usage"
            );
        }

        if config.debug && analysis.total_queries() > 0 {
            tracing::debug!(
                method = request.method(),
                url = request.url(),
                report = %formatter.to_text(),
                "query report"
            );
            if (analysis.flagged() || config.always_show)
                && request.is_interactive()
                && !response.is_redirect()
                && is_html_response(response.content_type())
            {
                response.append_body(&formatter.to_html());
            }
        }

        response
    }
}

fn is_html_response(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|t| HTML_CONTENT_TYPE.is_match(t))
}
