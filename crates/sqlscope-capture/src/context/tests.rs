use super::*;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn no_analysis_outside_scope() {
    assert!(current_analysis().is_none());
}

#[tokio::test]
async fn analysis_scope_installs_and_restores() {
    let handle = Arc::new(Mutex::new(QueryAnalysis::new()));
    analysis_scope(handle.clone(), async {
        let current = current_analysis().unwrap();
        assert!(Arc::ptr_eq(&current, &handle));
    })
    .await;
    assert!(current_analysis().is_none());
}

#[tokio::test]
async fn nested_analysis_scopes_shadow_and_restore() {
    let outer = Arc::new(Mutex::new(QueryAnalysis::new()));
    let inner = Arc::new(Mutex::new(QueryAnalysis::new()));
    analysis_scope(outer.clone(), async {
        analysis_scope(inner.clone(), async {
            assert!(Arc::ptr_eq(&current_analysis().unwrap(), &inner));
        })
        .await;
        assert!(Arc::ptr_eq(&current_analysis().unwrap(), &outer));
    })
    .await;
}

#[tokio::test]
async fn cache_fetch_flag_scopes() {
    assert!(!in_cache_fetch());
    cache_fetch_scope(async {
        assert!(in_cache_fetch());
        cache_fetch_scope(async {
            assert!(in_cache_fetch());
        })
        .await;
        assert!(in_cache_fetch());
    })
    .await;
    assert!(!in_cache_fetch());
}

#[tokio::test]
async fn interception_disable_flag_scopes() {
    assert!(!interception_disabled());
    without_interception(async {
        assert!(interception_disabled());
    })
    .await;
    assert!(!interception_disabled());
}

#[tokio::test]
async fn concurrent_tasks_see_their_own_analysis() {
    let a = tokio::spawn(async {
        let handle = Arc::new(Mutex::new(QueryAnalysis::new()));
        analysis_scope(handle.clone(), async move {
            tokio::task::yield_now().await;
            Arc::ptr_eq(&current_analysis().unwrap(), &handle)
        })
        .await
    });
    let b = tokio::spawn(async {
        tokio::task::yield_now().await;
        current_analysis().is_none()
    });
    let (a, b) = tokio::join!(a, b);
    assert_eq!(a.unwrap(), true);
    assert_eq!(b.unwrap(), true);
}
