//! End-to-end runner tests against a sled-backed store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::OnceLock;

use serde_json::json;

use docshift_core::{
    document_id, CancelToken, CollectionLocation, CollectionLocator, Document,
    DocumentMigrationRunner, DocumentVersionService, FnDocumentMigration, MigrationRegistry,
    RunnerConfig, SledStore, StoreConfig, Version,
};

static TRACING: OnceLock<()> = OnceLock::new();

/// Install a test subscriber once; repeated calls are no-ops.
fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn doc(value: serde_json::Value) -> Document {
    value.as_object().unwrap().clone()
}

fn user_registry() -> Arc<MigrationRegistry> {
    // 1.0.0 renames `name` to `full_name`; 1.1.0 adds a default locale.
    let rename = FnDocumentMigration::new("User", Version::new(1, 0, 0), |document| {
        if let Some(name) = document.remove("name") {
            document.insert("full_name".to_string(), name);
        }
        Ok(())
    });
    let locale = FnDocumentMigration::new("User", Version::new(1, 1, 0), |document| {
        document.insert("locale".to_string(), json!("en"));
        Ok(())
    });

    Arc::new(
        MigrationRegistry::builder()
            .register_document(rename)
            .unwrap()
            .register_document(locale)
            .unwrap()
            .build(),
    )
}

fn user_runner(registry: Arc<MigrationRegistry>, batch_size: usize) -> DocumentMigrationRunner {
    let service = Arc::new(DocumentVersionService::new(
        Arc::clone(&registry),
        BTreeMap::new(),
        "version",
    ));
    let locator = CollectionLocator::builder()
        .location("User", CollectionLocation::new("users"))
        .unwrap()
        .build();
    DocumentMigrationRunner::new(
        registry,
        service,
        locator,
        RunnerConfig {
            batch_size,
            default_database: Some("app".to_string()),
        },
    )
}

fn collect_all(store: &SledStore, ids: &[serde_json::Value]) -> Vec<Option<Document>> {
    ids.iter()
        .map(|raw| {
            let id = document_id(&doc(json!({ "_id": raw }))).unwrap();
            store.get_document("app", "users", &id).unwrap()
        })
        .collect()
}

#[test]
fn test_unversioned_documents_reach_the_target() {
    init_tracing();
    let store = SledStore::open(StoreConfig::temporary()).unwrap();
    for i in 0..10 {
        store
            .insert_document("app", "users", &doc(json!({ "_id": i, "name": format!("u{i}") })))
            .unwrap();
    }

    let summary = user_runner(user_registry(), 3)
        .run_all(&store, &CancelToken::new())
        .unwrap();
    assert_eq!(summary.documents_migrated, 10);

    for document in collect_all(&store, &(0..10).map(|i| json!(i)).collect::<Vec<_>>()) {
        let document = document.unwrap();
        assert_eq!(document.get("version"), Some(&json!("1.1.0")));
        assert!(document.contains_key("full_name"));
        assert_eq!(document.get("locale"), Some(&json!("en")));
        assert!(!document.contains_key("name"));
    }
}

#[test]
fn test_documents_at_target_are_left_untouched() {
    init_tracing();
    let store = SledStore::open(StoreConfig::temporary()).unwrap();
    let fresh = doc(json!({
        "_id": "fresh",
        "full_name": "already migrated",
        "locale": "fr",
        "version": "1.1.0"
    }));
    store.insert_document("app", "users", &fresh).unwrap();

    let summary = user_runner(user_registry(), 5)
        .run_all(&store, &CancelToken::new())
        .unwrap();

    // Never fetched, never written.
    assert_eq!(summary.documents_examined, 0);
    assert_eq!(summary.batches_written, 0);

    let id = document_id(&fresh).unwrap();
    assert_eq!(
        store.get_document("app", "users", &id).unwrap(),
        Some(fresh)
    );
}

#[test]
fn test_chain_application_matches_stepwise_application() {
    init_tracing();
    let registry = user_registry();
    let runner = user_runner(Arc::clone(&registry), 5);

    // Full chain in one call.
    let mut chained = doc(json!({ "_id": 1, "name": "a" }));
    runner
        .run("User", &mut chained, Version::new(1, 1, 0))
        .unwrap();

    // Steps applied individually in ascending order.
    let mut stepwise = doc(json!({ "_id": 1, "name": "a" }));
    runner
        .run("User", &mut stepwise, Version::new(1, 0, 0))
        .unwrap();
    runner
        .run("User", &mut stepwise, Version::new(1, 1, 0))
        .unwrap();

    assert_eq!(chained, stepwise);
}

#[test]
fn test_rerunning_is_idempotent() {
    init_tracing();
    let store = SledStore::open(StoreConfig::temporary()).unwrap();
    let ids: Vec<serde_json::Value> = (0..6).map(|i| json!(i)).collect();
    for id in &ids {
        store
            .insert_document("app", "users", &doc(json!({ "_id": id, "name": "x" })))
            .unwrap();
    }

    let runner = user_runner(user_registry(), 4);
    runner.run_all(&store, &CancelToken::new()).unwrap();
    let after_first = collect_all(&store, &ids);

    let second = runner.run_all(&store, &CancelToken::new()).unwrap();
    let after_second = collect_all(&store, &ids);

    assert_eq!(after_first, after_second);
    assert_eq!(second.documents_examined, 0);
    assert_eq!(second.batches_written, 0);
}

#[test]
fn test_mixed_versions_each_get_their_own_chain() {
    init_tracing();
    let store = SledStore::open(StoreConfig::temporary()).unwrap();
    store
        .insert_document("app", "users", &doc(json!({ "_id": "old", "name": "a" })))
        .unwrap();
    store
        .insert_document(
            "app",
            "users",
            &doc(json!({ "_id": "mid", "full_name": "b", "version": "1.0.0" })),
        )
        .unwrap();

    user_runner(user_registry(), 5)
        .run_all(&store, &CancelToken::new())
        .unwrap();

    let fetched = collect_all(&store, &[json!("old"), json!("mid")]);
    let old = fetched[0].clone().unwrap();
    let mid = fetched[1].clone().unwrap();

    // Both converge on the target; the mid document only ran the second step.
    assert_eq!(old.get("version"), Some(&json!("1.1.0")));
    assert_eq!(mid.get("version"), Some(&json!("1.1.0")));
    assert_eq!(old.get("full_name"), Some(&json!("a")));
    assert_eq!(mid.get("full_name"), Some(&json!("b")));
    assert_eq!(mid.get("locale"), Some(&json!("en")));
}
