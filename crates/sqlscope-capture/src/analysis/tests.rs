use super::*;
use pretty_assertions::assert_eq;

fn quick_query(sql: &str) -> QueryInfo {
    QueryInfo::new(
        sql,
        QueryMeasures::new()
            .with_elapsed(Duration::from_millis(1))
            .with_rows(1)
            .with_result_size(10),
    )
}

#[tokio::test]
async fn no_alerts_at_or_below_limits() {
    Config::override_scope(
        |c| {
            c.elapsed_time_limit = Duration::from_millis(100);
            c.returned_rows_limit = 50;
            c.result_size_limit = 1_000;
        },
        async {
            let info = QueryInfo::new(
                "SELECT 1",
                QueryMeasures::new()
                    .with_elapsed(Duration::from_millis(100))
                    .with_rows(50)
                    .with_result_size(1_000),
            );
            assert!(!info.has_alerts());
            assert_eq!(info.alerts(), &[] as &[String]);
        },
    )
    .await;
}

#[tokio::test]
async fn threshold_alerts_above_limits() {
    Config::override_scope(
        |c| {
            c.elapsed_time_limit = Duration::from_millis(100);
            c.returned_rows_limit = 50;
            c.result_size_limit = 1_000;
        },
        async {
            let info = QueryInfo::new(
                "SELECT * FROM users",
                QueryMeasures::new()
                    .with_elapsed(Duration::from_millis(250))
                    .with_rows(51)
                    .with_result_size(2_048),
            );
            assert_eq!(
                info.alerts(),
                &[
                    "query took 250ms".to_string(),
                    "returned 51 rows".to_string(),
                    "returned ~2048 bytes".to_string(),
                ]
            );
        },
    )
    .await;
}

#[tokio::test]
async fn seeded_alerts_precede_threshold_alerts() {
    Config::override_scope(
        |c| c.returned_rows_limit = 10,
        async {
            let info = QueryInfo::new(
                "SELECT * FROM users",
                QueryMeasures::new()
                    .with_rows(11)
                    .with_alerts(vec!["table scan".to_string()]),
            );
            assert_eq!(
                info.alerts(),
                &["table scan".to_string(), "returned 11 rows".to_string()]
            );
        },
    )
    .await;
}

#[tokio::test]
async fn append_alerts_extends_in_order() {
    let mut info = quick_query("SELECT 1");
    info.append_alerts(vec!["table scan".to_string(), "no index used".to_string()]);
    assert_eq!(
        info.alerts(),
        &["table scan".to_string(), "no index used".to_string()]
    );
    assert!(info.has_alerts());
}

#[tokio::test]
async fn push_keeps_running_totals_in_sync() {
    let mut analysis = QueryAnalysis::new();
    analysis.push(QueryInfo::new(
        "SELECT a",
        QueryMeasures::new()
            .with_elapsed(Duration::from_millis(10))
            .with_rows(3)
            .with_result_size(100),
    ));
    analysis.push(QueryInfo::new(
        "SELECT b",
        QueryMeasures::new()
            .with_elapsed(Duration::from_millis(20))
            .with_rows(4)
            .with_result_size(200),
    ));
    assert_eq!(analysis.total_queries(), 2);
    assert_eq!(analysis.elapsed_time(), Duration::from_millis(30));
    assert_eq!(analysis.rows(), 7);
    assert_eq!(analysis.result_size(), 300);
}

#[tokio::test]
async fn aggregate_predicates_are_strictly_greater_than() {
    Config::override_scope(
        |c| {
            c.query_limit = 2;
            c.returned_rows_limit = 7;
            c.result_size_limit = 300;
            c.elapsed_time_limit = Duration::from_millis(30);
        },
        async {
            let mut analysis = QueryAnalysis::new();
            analysis.push(QueryInfo::new(
                "SELECT a",
                QueryMeasures::new()
                    .with_elapsed(Duration::from_millis(10))
                    .with_rows(3)
                    .with_result_size(100),
            ));
            analysis.push(QueryInfo::new(
                "SELECT b",
                QueryMeasures::new()
                    .with_elapsed(Duration::from_millis(20))
                    .with_rows(4)
                    .with_result_size(200),
            ));
            assert!(!analysis.too_many_queries());
            assert!(!analysis.too_many_rows());
            assert!(!analysis.results_too_big());
            assert!(!analysis.too_much_time());
            assert!(!analysis.flagged());

            analysis.push(quick_query("SELECT c"));
            assert!(analysis.too_many_queries());
            assert!(analysis.flagged());
        },
    )
    .await;
}

#[tokio::test]
async fn alerted_queries_flag_the_analysis() {
    Config::override_scope(
        |c| {
            c.query_limit = 100;
            c.returned_rows_limit = 5;
        },
        async {
            let mut analysis = QueryAnalysis::new();
            analysis.push(QueryInfo::new(
                "SELECT * FROM users",
                QueryMeasures::new().with_rows(6),
            ));
            analysis.push(quick_query("SELECT 1"));
            assert!(analysis.has_alerts());
            assert_eq!(analysis.alerted_query_count(), 1);
            assert!(analysis.flagged());
        },
    )
    .await;
}

#[tokio::test]
async fn capture_returns_output_and_analysis() {
    let (output, analysis) = QueryAnalysis::capture(async {
        let handle = QueryAnalysis::current().unwrap();
        handle.lock().push(quick_query("SELECT 1"));
        42
    })
    .await;
    assert_eq!(output, 42);
    assert_eq!(analysis.total_queries(), 1);
    assert_eq!(analysis.queries()[0].sql(), "SELECT 1");
}

#[tokio::test]
async fn nested_captures_do_not_leak_into_outer() {
    let ((_, inner), outer) = QueryAnalysis::capture(async {
        QueryAnalysis::current().unwrap().lock().push(quick_query("SELECT outer"));
        let nested = QueryAnalysis::capture(async {
            QueryAnalysis::current().unwrap().lock().push(quick_query("SELECT inner"));
        })
        .await;
        QueryAnalysis::current().unwrap().lock().push(quick_query("SELECT outer2"));
        nested
    })
    .await;
    assert_eq!(inner.total_queries(), 1);
    assert_eq!(inner.queries()[0].sql(), "SELECT inner");
    assert_eq!(outer.total_queries(), 2);
    assert_eq!(outer.queries()[0].sql(), "SELECT outer");
    assert_eq!(outer.queries()[1].sql(), "SELECT outer2");
}

#[tokio::test]
async fn no_current_analysis_outside_capture() {
    assert!(QueryAnalysis::current().is_none());
}
