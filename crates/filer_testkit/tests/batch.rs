//! Batch operations and remote failure handling.

use filer_core::{ArtifactStatus, FilerError, LoadOptions, RemoveOptions, StoreOptions};
use filer_testkit::prelude::*;

#[test]
fn push_all_then_pull_all_restores_payloads() {
    with_each_backend(|fixture| {
        fixture.store_bytes(b"alpha", "a", StoreOptions::new()).unwrap();
        fixture.store_bytes(b"beta", "b", StoreOptions::new()).unwrap();

        let pushed = fixture.push_all().unwrap();
        assert!(pushed.is_success());
        assert_eq!(pushed.succeeded, vec!["a".to_string(), "b".to_string()]);
        assert!(fixture
            .list_status()
            .unwrap()
            .iter()
            .all(|(_, status)| *status == ArtifactStatus::Synced));

        fixture.drop_local_payload("a");
        fixture.drop_local_payload("b");

        let pulled = fixture.pull_all().unwrap();
        assert!(pulled.is_success());
        assert_eq!(pulled.attempted(), 2);
        assert_eq!(
            fixture.load_bytes("a", LoadOptions::new().pull(false)).unwrap(),
            b"alpha"
        );
        assert_eq!(
            fixture.load_bytes("b", LoadOptions::new().pull(false)).unwrap(),
            b"beta"
        );
    });
}

#[test]
fn push_all_isolates_missing_payload() {
    with_each_backend(|fixture| {
        fixture.store_bytes(b"1", "good", StoreOptions::new()).unwrap();
        fixture.store_bytes(b"2", "gone", StoreOptions::new()).unwrap();
        fixture.drop_local_payload("gone");

        let report = fixture.push_all().unwrap();
        assert_eq!(report.succeeded, vec!["good".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "gone");
        assert!(matches!(report.failed[0].1, FilerError::PayloadMissing { .. }));

        assert!(fixture.record("good").unwrap().unwrap().is_synced());
        assert!(fixture.record("gone").unwrap().unwrap().is_local());
    });
}

#[test]
fn batches_skip_ineligible_records() {
    let fixture = TestFiler::drive();
    fixture
        .store_bytes(b"1", "synced", StoreOptions::new().push(true))
        .unwrap();
    fixture.store_bytes(b"2", "local", StoreOptions::new()).unwrap();

    let pulled = fixture.pull_all().unwrap();
    assert_eq!(pulled.attempted(), 0);

    let pushed = fixture.push_all().unwrap();
    assert_eq!(pushed.succeeded, vec!["local".to_string()]);
}

#[test]
fn upload_failure_during_store_leaves_artifact_local() {
    let (fixture, remote) = TestFiler::faulty();
    remote.fail(RemoteOp::Upload, "m");

    let err = fixture
        .store_bytes(b"x", "m", StoreOptions::new().push(true))
        .unwrap_err();
    assert!(err.is_transport());
    assert!(fixture.record("m").unwrap().unwrap().is_local());
    assert!(fixture.has_local_payload("m"));

    remote.heal();
    fixture.push("m").unwrap();
    assert!(fixture.record("m").unwrap().unwrap().is_synced());
}

#[test]
fn pull_all_isolates_download_failures() {
    let (fixture, remote) = TestFiler::faulty();
    for name in ["a", "b", "c"] {
        fixture
            .store_bytes(name.as_bytes(), name, StoreOptions::new().push(true))
            .unwrap();
        fixture.drop_local_payload(name);
    }
    remote.fail(RemoteOp::Download, "b");

    let report = fixture.pull_all().unwrap();
    assert_eq!(report.succeeded, vec!["a".to_string(), "c".to_string()]);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.is_transport());

    assert!(!fixture.has_local_payload("b"));
    let staging = fixture.local_dir().join(".b.flr.partial");
    assert!(!staging.exists());
}

#[test]
fn failed_download_never_leaves_a_payload() {
    let (fixture, remote) = TestFiler::faulty();
    fixture
        .store_bytes(b"x", "m", StoreOptions::new().push(true))
        .unwrap();
    fixture.drop_local_payload("m");
    remote.fail_all(RemoteOp::Download);

    let err = fixture.load_bytes("m", LoadOptions::default()).unwrap_err();
    assert!(err.is_transport());
    assert!(!fixture.has_local_payload("m"));
    assert_eq!(remote.calls(RemoteOp::Download), 1);
}

#[test]
fn remote_delete_failure_surfaces_after_local_removal() {
    let (fixture, remote) = TestFiler::faulty();
    fixture
        .store_bytes(b"x", "m", StoreOptions::new().push(true))
        .unwrap();
    remote.fail(RemoteOp::Delete, "m");

    let err = fixture
        .remove("m", RemoveOptions::new().remove_remote(true))
        .unwrap_err();
    assert!(err.is_transport());
    assert_eq!(fixture.record("m").unwrap(), None);
    assert!(!fixture.has_local_payload("m"));
}

#[test]
fn remove_locals_destroys_the_only_copy() {
    with_each_backend(|fixture| {
        fixture.store_bytes(b"only", "local", StoreOptions::new()).unwrap();
        fixture
            .store_bytes(b"safe", "synced", StoreOptions::new().push(true))
            .unwrap();

        let report = fixture.remove_locals().unwrap();
        assert_eq!(report.succeeded, vec!["local".to_string()]);

        // The payload is gone everywhere; nothing can bring it back.
        assert_eq!(fixture.record("local").unwrap(), None);
        assert!(!fixture.has_local_payload("local"));
        assert!(matches!(
            fixture.load_bytes("local", LoadOptions::default()),
            Err(FilerError::NotFound { .. })
        ));

        assert_eq!(
            fixture.list_status().unwrap(),
            vec![("synced".to_string(), ArtifactStatus::Synced)]
        );
        assert!(fixture.has_local_payload("synced"));
    });
}

#[test]
fn remove_locals_never_touches_the_remote() {
    let (fixture, remote) = TestFiler::faulty();
    fixture.store_bytes(b"1", "a", StoreOptions::new()).unwrap();
    fixture.store_bytes(b"2", "b", StoreOptions::new()).unwrap();

    let report = fixture.remove_locals().unwrap();
    assert_eq!(report.attempted(), 2);
    assert_eq!(remote.calls(RemoteOp::Delete), 0);
    assert!(fixture.records().unwrap().is_empty());
}
