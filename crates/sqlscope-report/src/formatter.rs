//! Report rendering for a finished query analysis
//!
//! One formatter, four outputs: a one-line summary, the response-header
//! value, a plain-text report for logs, and a self-contained HTML overlay
//! for injection into development pages. The overlay carries all of its
//! styling inline so it needs no stylesheet from the host page.

use sqlscope_capture::QueryAnalysis;
use sqlscope_core::Config;
use std::collections::{BTreeMap, HashMap};

const OK_COLOR: &str = "#060";
const WARN_COLOR: &str = "#C00";
const CACHE_WARN_COLOR: &str = "#A80";

/// Renders a [`QueryAnalysis`] into the supported output formats
pub struct Formatter<'a> {
    analysis: &'a QueryAnalysis,
}

impl<'a> Formatter<'a> {
    /// Create a formatter over a finished analysis
    pub fn new(analysis: &'a QueryAnalysis) -> Self {
        Self { analysis }
    }

    /// One-line totals, e.g. `3 queries, 42 rows, 1.5K, 27ms`
    pub fn summary(&self) -> String {
        let queries = self.analysis.total_queries();
        let rows = self.analysis.rows();
        let kilobytes = self.analysis.result_size() as f64 / 1024.0;
        format!(
            "{} {}, {} {}, {:.1}K, {}ms",
            queries,
            if queries == 1 { "query" } else { "queries" },
            rows,
            if rows == 1 { "row" } else { "rows" },
            kilobytes,
            self.analysis.elapsed_time().as_millis()
        )
    }

    /// Machine-readable response-header value
    pub fn header_value(&self) -> String {
        format!(
            "selects={}; rows={}; elapsed_time={}; flagged_queries={}",
            self.analysis.total_queries(),
            self.analysis.rows(),
            self.analysis.elapsed_time().as_millis(),
            self.analysis.alerted_query_count()
        )
    }

    /// Plain-text report for log output
    pub fn to_text(&self) -> String {
        let (uncached, cached) = self.split_cached();
        let mut lines = Vec::new();
        let label = if self.analysis.flagged() {
            "SQL WARNING"
        } else {
            "SQL INFO"
        };
        lines.push(format!("{label}: {}", self.summary()));
        if cached.total_queries() > 0 {
            lines.push(format!("UNCACHED: {}", Formatter::new(&uncached).summary()));
            lines.push(format!("CACHED: {}", Formatter::new(&cached).summary()));
        }
        lines.extend(self.warning_lines());
        for query in self.analysis.queries() {
            lines.push("-----------------".to_string());
            if query.cached() {
                lines.push("CACHED".to_string());
            }
            lines.push(query_measure_line(query));
            lines.extend(query.alerts().iter().cloned());
            lines.push(query.sql().to_string());
        }
        lines.join("\n")
    }

    /// Self-contained HTML overlay.
    ///
    /// Renders a small badge with the summary; clicking it toggles the full
    /// per-query listing. Container CSS comes from the configured style map
    /// merged over the defaults.
    pub fn to_html(&self) -> String {
        let config = Config::get();
        let (uncached, cached) = self.split_cached();
        let theme_color = if uncached.flagged() {
            WARN_COLOR
        } else if self.analysis.flagged() {
            CACHE_WARN_COLOR
        } else {
            OK_COLOR
        };
        let label = if self.analysis.flagged() {
            "SQL WARNING"
        } else {
            "SQL INFO"
        };
        let close_js = "document.getElementById('_sqlscope_').style.display = 'none'";
        let toggle_js = "var q = document.getElementById('_sqlscope_queries_'); \
             q.style.display = (q.style.display == 'block' ? 'none' : 'block')";

        let mut html = String::new();
        html.push_str(&format!(
            "<div id=\"_sqlscope_\" style=\"{}\">",
            escape_html(&container_style(&config.style))
        ));

        // badge
        html.push_str(&format!(
            "<div style=\"padding:4px; background-color:{theme_color}; font-weight:bold; color:#FFF;\">"
        ));
        html.push_str(&format!(
            "<a href=\"javascript:void(0)\" onclick=\"{}\" \
             style=\"float:right; display:block; color:#FFF; text-decoration:none;\">&times;</a>",
            escape_html(close_js)
        ));
        html.push_str(&format!(
            "<a href=\"javascript:void(0)\" onclick=\"{}\" \
             style=\"color:#FFF; text-decoration:none;\">{label} &raquo;</a>",
            escape_html(toggle_js)
        ));
        html.push_str(&format!(
            "<div style=\"font-weight:normal;\">{}</div>",
            escape_html(&self.summary())
        ));
        html.push_str("</div>");

        // query listing, hidden until toggled
        html.push_str(&format!(
            "<div id=\"_sqlscope_queries_\" style=\"display:none; border:1px solid {theme_color}; \
             background-color:#FFF; color:#000; overflow:auto; max-height:500px; padding:0 4px;\">"
        ));
        if cached.total_queries() > 0 {
            html.push_str(&format!(
                "<div style=\"margin:5px 0;\"><div style=\"font-weight:bold;\">Uncached</div><div>{}</div></div>",
                escape_html(&Formatter::new(&uncached).summary())
            ));
            html.push_str(&format!(
                "<div style=\"margin:5px 0; color:#066;\"><div style=\"font-weight:bold;\">Cached</div><div>{}</div></div>",
                escape_html(&Formatter::new(&cached).summary())
            ));
        }
        for warning in self.warning_lines() {
            html.push_str(&format!(
                "<div style=\"color:{WARN_COLOR}; margin:5px 0;\">{}</div>",
                escape_html(&warning)
            ));
        }
        for query in self.analysis.queries() {
            let color = if query.has_alerts() {
                if query.cached() { CACHE_WARN_COLOR } else { WARN_COLOR }
            } else {
                OK_COLOR
            };
            let background = if query.cached() { " background-color:#DEE;" } else { "" };
            html.push_str(&format!(
                "<div style=\"color:{color}; border-top:1px solid #CCC; padding:8px 4px;{background}\">"
            ));
            if query.cached() {
                html.push_str("<div style=\"color:#066;\">CACHED</div>");
            }
            html.push_str(&format!(
                "<div style=\"margin-bottom:5px;\">{}</div>",
                escape_html(&query_measure_line(query))
            ));
            if query.has_alerts() {
                html.push_str("<div style=\"margin-bottom:5px;\">");
                for alert in query.alerts() {
                    html.push_str(&format!(
                        "<div style=\"margin-bottom:2px;\">{}</div>",
                        escape_html(alert)
                    ));
                }
                html.push_str("</div>");
            }
            html.push_str(&format!(
                "<div style=\"color:#666;\">{}</div>",
                escape_html(query.sql())
            ));
            html.push_str("</div>");
        }
        html.push_str("</div></div>");
        html
    }

    fn split_cached(&self) -> (QueryAnalysis, QueryAnalysis) {
        let mut uncached = QueryAnalysis::new();
        let mut cached = QueryAnalysis::new();
        for query in self.analysis.queries() {
            if query.cached() {
                cached.push(query.clone());
            } else {
                uncached.push(query.clone());
            }
        }
        (uncached, cached)
    }

    fn warning_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.analysis.too_many_queries() {
            lines.push(format!("WARNING: {} queries", self.analysis.total_queries()));
        }
        if self.analysis.too_many_rows() {
            lines.push(format!("WARNING: {} rows returned", self.analysis.rows()));
        }
        if self.analysis.results_too_big() {
            lines.push(format!(
                "WARNING: {:.1}K returned",
                self.analysis.result_size() as f64 / 1024.0
            ));
        }
        if self.analysis.too_much_time() {
            lines.push(format!(
                "WARNING: queries took {} ms",
                self.analysis.elapsed_time().as_millis()
            ));
        }
        if self.analysis.has_alerts() {
            lines.push(format!(
                "WARNING: alerts on {} queries",
                self.analysis.alerted_query_count()
            ));
        }
        lines
    }
}

fn query_measure_line(query: &sqlscope_capture::QueryInfo) -> String {
    format!(
        "{} {} returned ({:.1}K) in {} ms",
        query.rows(),
        if query.rows() == 1 { "row" } else { "rows" },
        query.result_size() as f64 / 1024.0,
        query.elapsed().as_millis()
    )
}

/// Build the overlay container's CSS from the configured style map merged
/// over the defaults. An empty override value removes the property. Output
/// order is sorted so rendering is deterministic.
fn container_style(overrides: &HashMap<String, String>) -> String {
    let mut style: BTreeMap<String, String> = [
        ("font-family", "sans-serif"),
        ("font-size", "10px"),
        ("font-weight", "normal"),
        ("line-height", "100%"),
        ("position", "fixed"),
        ("text-align", "left"),
        ("width", "200px"),
        ("z-index", "999999"),
    ]
    .iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect();
    for (name, value) in overrides {
        if value.is_empty() {
            style.remove(name);
        } else {
            style.insert(name.clone(), value.clone());
        }
    }
    // anchor to a corner unless the overrides positioned it themselves
    if matches!(
        style.get("position").map(String::as_str),
        Some("fixed" | "static" | "absolute")
    ) {
        if !style.contains_key("top") && !style.contains_key("bottom") {
            style.insert("top".to_string(), "5px".to_string());
        }
        if !style.contains_key("left") && !style.contains_key("right") {
            style.insert("right".to_string(), "5px".to_string());
        }
    }
    style
        .iter()
        .map(|(name, value)| format!("{name}:{value};"))
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests;
