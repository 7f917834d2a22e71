use super::*;
use pretty_assertions::assert_eq;
use sqlscope_capture::{QueryInfo, QueryMeasures};
use std::time::Duration;

fn query(sql: &str, rows: u64, size: u64, ms: u64, cached: bool) -> QueryInfo {
    QueryInfo::new(
        sql,
        QueryMeasures::new()
            .with_rows(rows)
            .with_result_size(size)
            .with_elapsed(Duration::from_millis(ms))
            .with_cached(cached),
    )
}

fn sample_analysis() -> QueryAnalysis {
    let mut analysis = QueryAnalysis::new();
    analysis.push(query("SELECT * FROM users", 40, 1024, 15, false));
    analysis.push(query("SELECT * FROM orders", 2, 512, 12, true));
    analysis
}

#[tokio::test]
async fn summary_pluralizes_and_formats_kilobytes() {
    let analysis = sample_analysis();
    assert_eq!(Formatter::new(&analysis).summary(), "2 queries, 42 rows, 1.5K, 27ms");

    let mut single = QueryAnalysis::new();
    single.push(query("SELECT 1", 1, 100, 5, false));
    assert_eq!(Formatter::new(&single).summary(), "1 query, 1 row, 0.1K, 5ms");
}

#[tokio::test]
async fn empty_analysis_summary() {
    let analysis = QueryAnalysis::new();
    assert_eq!(Formatter::new(&analysis).summary(), "0 queries, 0 rows, 0.0K, 0ms");
}

#[tokio::test]
async fn header_value_format() {
    Config::override_scope(
        |c| c.returned_rows_limit = 10,
        async {
            let mut analysis = QueryAnalysis::new();
            analysis.push(query("SELECT * FROM users", 40, 1024, 15, false));
            analysis.push(query("SELECT 1", 1, 10, 5, false));
            assert_eq!(
                Formatter::new(&analysis).header_value(),
                "selects=2; rows=41; elapsed_time=20; flagged_queries=1"
            );
        },
    )
    .await;
}

#[tokio::test]
async fn text_report_lists_queries_and_warnings() {
    Config::override_scope(
        |c| c.query_limit = 1,
        async {
            let analysis = sample_analysis();
            let text = Formatter::new(&analysis).to_text();
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines[0], "SQL WARNING: 2 queries, 42 rows, 1.5K, 27ms");
            assert_eq!(lines[1], "UNCACHED: 1 query, 40 rows, 1.0K, 15ms");
            assert_eq!(lines[2], "CACHED: 1 query, 2 rows, 0.5K, 12ms");
            assert_eq!(lines[3], "WARNING: 2 queries");
            assert!(text.contains("40 rows returned (1.0K) in 15 ms"));
            assert!(text.contains("SELECT * FROM users"));
            assert!(text.contains("\nCACHED\n"));
        },
    )
    .await;
}

#[tokio::test]
async fn clean_analysis_reports_info() {
    let mut analysis = QueryAnalysis::new();
    analysis.push(query("SELECT 1", 1, 10, 1, false));
    let text = Formatter::new(&analysis).to_text();
    assert!(text.starts_with("SQL INFO:"));
    assert!(!text.contains("WARNING"));
}

#[tokio::test]
async fn alerts_appear_in_text_report() {
    let mut analysis = QueryAnalysis::new();
    let mut info = query("SELECT * FROM users", 5, 100, 1, false);
    info.append_alerts(vec!["table scan".to_string()]);
    analysis.push(info);
    let text = Formatter::new(&analysis).to_text();
    assert!(text.contains("WARNING: alerts on 1 queries"));
    assert!(text.contains("table scan"));
}

#[tokio::test]
async fn html_overlay_escapes_sql_and_shows_summary() {
    let mut analysis = QueryAnalysis::new();
    analysis.push(query("SELECT * FROM users WHERE name = 'a<b>'", 1, 10, 1, false));
    let html = Formatter::new(&analysis).to_html();
    assert!(html.contains("id=\"_sqlscope_\""));
    assert!(html.contains("SQL INFO &raquo;"));
    assert!(html.contains("1 query, 1 row, 0.0K, 1ms"));
    assert!(html.contains("SELECT * FROM users WHERE name = &#39;a&lt;b&gt;&#39;"));
    assert!(!html.contains("a<b>"));
}

#[tokio::test]
async fn flagged_overlay_uses_warning_label_and_color() {
    Config::override_scope(
        |c| c.query_limit = 0,
        async {
            let mut analysis = QueryAnalysis::new();
            analysis.push(query("SELECT 1", 1, 10, 1, false));
            let html = Formatter::new(&analysis).to_html();
            assert!(html.contains("SQL WARNING &raquo;"));
            assert!(html.contains(WARN_COLOR));
        },
    )
    .await;
}

#[tokio::test]
async fn cached_only_problems_use_the_cache_color() {
    Config::override_scope(
        |c| c.returned_rows_limit = 10,
        async {
            let mut analysis = QueryAnalysis::new();
            analysis.push(query("SELECT * FROM users", 40, 10, 1, true));
            let html = Formatter::new(&analysis).to_html();
            assert!(html.contains(&format!("background-color:{CACHE_WARN_COLOR}")));
        },
    )
    .await;
}

#[tokio::test]
async fn overlay_splits_cached_and_uncached() {
    let analysis = sample_analysis();
    let html = Formatter::new(&analysis).to_html();
    assert!(html.contains(">Uncached<"));
    assert!(html.contains(">Cached<"));
    assert!(html.contains(">CACHED<"));
}

#[test]
fn container_style_defaults_anchor_top_right() {
    let css = container_style(&HashMap::new());
    assert!(css.contains("position:fixed;"));
    assert!(css.contains("top:5px;"));
    assert!(css.contains("right:5px;"));
    assert!(css.contains("width:200px;"));
}

#[test]
fn container_style_overrides_merge_and_remove() {
    let mut overrides = HashMap::new();
    overrides.insert("width".to_string(), "400px".to_string());
    overrides.insert("bottom".to_string(), "5px".to_string());
    overrides.insert("z-index".to_string(), String::new());
    let css = container_style(&overrides);
    assert!(css.contains("width:400px;"));
    assert!(css.contains("bottom:5px;"));
    assert!(!css.contains("top:5px;"));
    assert!(!css.contains("z-index"));
}

#[test]
fn html_escaping() {
    assert_eq!(
        escape_html(r#"<a href="x">&'"#),
        "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
    );
}
