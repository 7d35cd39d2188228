mod support;

use std::fs;
use std::sync::atomic::Ordering;

use chromebox::engine::ContainerState;
use chromebox::error::AppError;
use chromebox::profiles::{
    DeleteStatus, ImageStatus, Orchestrator, ProfileStore, RuntimeConfig, StartStatus, StopStatus,
};
use support::{
    FakeEngine, FakeHost, FakeLauncher, IMAGE, orchestrator, orchestrator_with, snapshot,
};

#[tokio::test]
async fn create_then_status_reports_absent_container() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    let created = orch.create("work", None).await.expect("create");
    assert_eq!(created.value.name, "work");
    assert_eq!(created.value.path, root.path().join("work"));
    assert!(root.path().join("work/Downloads").is_dir());
    assert_eq!(orch.launcher().installed(), ["work"]);

    let status = orch.status("work").await.expect("status");
    assert_eq!(status.status, ContainerState::NotFound);
    assert_eq!(status.size_bytes, 0);
}

#[tokio::test]
async fn invalid_names_touch_nothing() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    for name in ["", "has space", "../escape", "dots.not.allowed", "slash/inside"] {
        let err = orch.create(name, None).await.expect_err("must reject");
        assert!(matches!(err, AppError::InvalidName(_)), "{name}: {err}");
    }
    assert_eq!(fs::read_dir(root.path()).expect("read root").count(), 0);
    assert!(orch.launcher().installed().is_empty());
}

#[tokio::test]
async fn second_create_fails_and_leaves_state_alone() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    orch.create("work", None).await.expect("first create");
    fs::write(root.path().join("work/Cookies"), b"session").expect("write");
    let before = snapshot(root.path());

    let err = orch.create("work", None).await.expect_err("second create");
    assert!(matches!(err, AppError::AlreadyExists(_)));
    assert_eq!(snapshot(root.path()), before);
}

#[tokio::test]
async fn launcher_failure_degrades_create() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator_with(
        root.path(),
        FakeEngine::with_image(IMAGE),
        FakeLauncher::failing(),
    );

    let created = orch.create("work", None).await.expect("create");
    assert!(created.is_degraded());
    assert!(created.warnings[0].contains("launcher"));
    assert!(root.path().join("work").is_dir());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    let never = orch.delete("ghost").await.expect("delete unknown");
    assert_eq!(never.value.status, DeleteStatus::NotFound);

    orch.create("work", None).await.expect("create");
    orch.start("work").await.expect("start");

    let first = orch.delete("work").await.expect("first delete");
    assert_eq!(first.value.status, DeleteStatus::Deleted);
    assert!(!root.path().join("work").exists());
    assert_eq!(orch.engine().container_count(), 0);
    assert!(orch.launcher().installed().is_empty());

    let second = orch.delete("work").await.expect("second delete");
    assert_eq!(second.value.status, DeleteStatus::NotFound);
    assert!(!second.is_degraded());
}

#[tokio::test]
async fn delete_continues_past_engine_failures() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    orch.create("work", None).await.expect("create");
    orch.engine().insert("chrome-work", ContainerState::Exited);
    orch.engine().fail_remove.store(true, Ordering::SeqCst);

    let deleted = orch.delete("work").await.expect("delete");
    assert_eq!(deleted.value.status, DeleteStatus::Deleted);
    assert!(deleted.warnings.iter().any(|w| w.contains("removal refused")));
    assert!(!root.path().join("work").exists());
}

#[tokio::test]
async fn start_creates_directory_and_container_once() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    let first = orch.start("fresh").await.expect("start");
    assert_eq!(first.value.status, StartStatus::Created);
    assert_eq!(first.value.container_id.as_deref(), Some("id-chrome-fresh"));
    assert!(root.path().join("fresh/Downloads").is_dir());
    assert!(first.warnings.iter().any(|w| w.contains("audio cookie")));
    assert!(first.warnings.iter().any(|w| w.contains("display access")));

    let spec = orch.engine().last_spec().expect("run spec");
    assert_eq!(spec.name, "chrome-fresh");
    assert_eq!(spec.env.get("CHROME_PROFILE").map(String::as_str), Some("fresh"));
    assert!(!spec.env.contains_key("PULSE_COOKIE"));
    assert!(spec.groups.contains(&"44".to_string()));

    let second = orch.start("fresh").await.expect("start again");
    assert_eq!(second.value.status, StartStatus::AlreadyRunning);
    assert_eq!(second.value.container_id, None);
    assert_eq!(orch.engine().runs(), 1);
}

#[tokio::test]
async fn start_restarts_stopped_container_in_place() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());
    orch.engine().insert("chrome-work", ContainerState::Exited);

    let started = orch.start("work").await.expect("start");
    assert_eq!(started.value.status, StartStatus::Started);
    assert_eq!(
        orch.engine().state_of("chrome-work"),
        Some(ContainerState::Running)
    );
    assert_eq!(orch.engine().runs(), 0);
}

#[tokio::test]
async fn concurrent_starts_create_exactly_one_container() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    let (left, right) = tokio::join!(orch.start("race"), orch.start("race"));
    let mut statuses = [
        left.expect("left start").value.status,
        right.expect("right start").value.status,
    ];
    statuses.sort_by_key(|status| *status == StartStatus::Created);

    assert_eq!(statuses, [StartStatus::AlreadyRunning, StartStatus::Created]);
    assert_eq!(orch.engine().runs(), 1);
    assert_eq!(orch.engine().container_count(), 1);
}

#[tokio::test]
async fn start_fails_without_image_or_build_context() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator_with(root.path(), FakeEngine::default(), FakeLauncher::default());

    let err = orch.start("work").await.expect_err("no image, no context");
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(orch.engine().runs(), 0);
    assert_eq!(orch.engine().builds(), 0);
}

#[tokio::test]
async fn ensure_image_builds_once_from_context() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = Orchestrator::new(
        ProfileStore::new(root.path().to_path_buf()),
        FakeEngine::default(),
        FakeLauncher::default(),
        FakeHost,
        RuntimeConfig {
            image: IMAGE.to_string(),
            container_prefix: "chrome-".to_string(),
            build_context: Some(root.path().to_path_buf()),
        },
    );

    let first = orch.ensure_image().await.expect("build");
    assert_eq!(first.status, ImageStatus::Built);
    let second = orch.ensure_image().await.expect("present");
    assert_eq!(second.status, ImageStatus::Present);
    assert_eq!(orch.engine().builds(), 1);
}

#[tokio::test]
async fn stop_reports_missing_container() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    let missing = orch.stop("work").await.expect("stop");
    assert_eq!(missing.status, StopStatus::NotFound);

    orch.start("work").await.expect("start");
    let stopped = orch.stop("work").await.expect("stop");
    assert_eq!(stopped.status, StopStatus::Stopped);
    assert_eq!(
        orch.engine().state_of("chrome-work"),
        Some(ContainerState::Exited)
    );
}

#[tokio::test]
async fn engine_errors_surface_from_status() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());
    orch.engine().fail_inspect.store(true, Ordering::SeqCst);

    let err = orch.status("work").await.expect_err("engine down");
    assert_eq!(err.kind(), "engine_error");
}

#[tokio::test]
async fn list_reports_every_profile_sorted() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    orch.create("zeta", None).await.expect("create");
    orch.create("alpha", None).await.expect("create");
    fs::write(root.path().join("alpha/Preferences"), vec![0u8; 2048]).expect("write");
    fs::create_dir(root.path().join("not a profile")).expect("mkdir");
    orch.engine().insert("chrome-zeta", ContainerState::Running);

    let listing = orch.list().await.expect("list");
    let names: Vec<_> = listing.profiles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["alpha", "zeta"]);
    assert_eq!(listing.profiles[0].size_bytes, 2048);
    assert_eq!(listing.profiles[0].status, ContainerState::NotFound);
    assert_eq!(listing.profiles[1].status, ContainerState::Running);
    assert!(listing.profiles.iter().all(|p| p.has_desktop_entry));
}

#[cfg(unix)]
#[tokio::test]
async fn custom_location_is_reachable_by_name() {
    let root = tempfile::tempdir().expect("tempdir");
    let elsewhere = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());
    let location = elsewhere.path().join("profiles/work");

    let created = orch.create("work", Some(&location)).await.expect("create");
    assert_eq!(created.value.path, location);
    assert!(location.join("Downloads").is_dir());
    assert!(
        fs::symlink_metadata(root.path().join("work"))
            .expect("pointer")
            .file_type()
            .is_symlink()
    );

    let listing = orch.list().await.expect("list");
    assert_eq!(listing.profiles.len(), 1);

    orch.delete("work").await.expect("delete");
    assert!(!location.exists());
    assert!(fs::symlink_metadata(root.path().join("work")).is_err());
}

#[tokio::test]
async fn custom_location_inside_the_root_is_rejected() {
    let root = tempfile::tempdir().expect("tempdir");
    let orch = orchestrator(root.path());

    let inside = root.path().join("other");
    let err = orch
        .create("work", Some(&inside))
        .await
        .expect_err("location under the root");
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(fs::read_dir(root.path()).expect("read root").count(), 0);
    assert!(orch.list().await.expect("list").profiles.is_empty());

    let default_dir = root.path().join("work");
    let created = orch.create("work", Some(&default_dir)).await.expect("default path");
    assert_eq!(created.value.path, default_dir);
}
