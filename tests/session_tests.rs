// Session tests: permission gate, scan state, filter toggle, cancel-and-replace, navigation

mod common;

use common::{FakeAdapter, MemoryKvStore, open_cafe, raspberry_ap, raw, session_with};
use std::time::Duration;
use wifi_scanner::error::ConnectionError;
use wifi_scanner::models::{PermissionStatus, Screen};
use wifi_scanner::permission::PermissionOutcome;
use wifi_scanner::session::SessionEvent;
use wifi_scanner::store::CREDENTIALS_KEY;
use wifi_scanner::workflow::ConnectStep;

#[tokio::test]
async fn permission_denied_never_scans() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap()]),
        MemoryKvStore::new(),
        PermissionOutcome::Denied,
        true,
    );
    let state = t.session.start().await;
    assert_eq!(t.adapter.scans(), 0);
    assert!(!state.loading);
    assert!(state.networks.is_empty());
    assert_eq!(state.permission, PermissionStatus::Denied);
    assert_eq!(state.last_error.as_deref(), Some("location permission denied"));
}

#[tokio::test]
async fn permission_denied_publishes_alert() {
    let t = session_with(
        FakeAdapter::new(vec![]),
        MemoryKvStore::new(),
        PermissionOutcome::Denied,
        true,
    );
    let mut rx = t.events.subscribe();
    t.session.refresh().await;
    let mut saw_alert = false;
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Alert { title, .. } = event {
            assert_eq!(title, "Permission denied");
            saw_alert = true;
        }
    }
    assert!(saw_alert);
}

#[tokio::test]
async fn start_scans_with_filter_enabled() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap(), open_cafe()]),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        true,
    );
    let state = t.session.start().await;
    assert_eq!(state.permission, PermissionStatus::Granted);
    assert!(state.filter_enabled);
    assert!(!state.loading);
    assert_eq!(state.networks.len(), 1);
    assert_eq!(state.networks[0].display_bssid(), "AA:BB:CC:DD:EE:FF");
    assert!(state.networks[0].is_secured());
}

#[tokio::test]
async fn empty_scan_sets_error_state() {
    let t = session_with(
        FakeAdapter::new(vec![]),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        false,
    );
    let state = t.session.refresh().await;
    assert!(!state.loading);
    assert_eq!(state.last_error.as_deref(), Some("no networks found"));
    assert!(state.networks.is_empty());
}

#[tokio::test]
async fn toggling_filter_rescans_with_new_setting() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap(), open_cafe()]),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        true,
    );
    assert_eq!(t.session.refresh().await.networks.len(), 1);
    let state = t.session.set_filter(false).await;
    assert!(!state.filter_enabled);
    assert_eq!(state.networks.len(), 2);
    assert_eq!(t.adapter.scans(), 2);
}

#[tokio::test]
async fn superseded_scan_result_is_discarded() {
    let t = session_with(
        FakeAdapter::new(vec![]),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        false,
    );
    t.adapter.push_scan(200, vec![raw("Stale", "01", -40, None)]);
    t.adapter.push_scan(0, vec![raw("Fresh", "02", -40, None)]);

    let slow = t.session.clone();
    let fast = t.session.clone();
    let (_, _) = tokio::join!(slow.refresh(), async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        fast.refresh().await
    });

    let state = t.session.scan_state().await;
    assert!(!state.loading);
    assert_eq!(state.networks.len(), 1);
    assert_eq!(state.networks[0].ssid, "Fresh");
}

#[tokio::test]
async fn connect_unknown_bssid_is_rejected() {
    let t = session_with(
        FakeAdapter::new(vec![open_cafe()]),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        false,
    );
    t.session.refresh().await;
    let err = t.session.connect("ffffffffffff").await.unwrap_err();
    assert!(matches!(err, ConnectionError::UnknownNetwork(_)));
    assert_eq!(t.adapter.open_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn open_connect_navigates_to_success_and_back() {
    let t = session_with(
        FakeAdapter::new(vec![open_cafe()]),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        false,
    );
    t.session.refresh().await;
    let step = t.session.connect("112233445566").await.unwrap();
    assert!(matches!(step, ConnectStep::Connected { .. }));
    assert_eq!(t.session.screen().await, Screen::connection_success("CafeOpen"));

    t.session.back_to_home().await;
    assert_eq!(t.session.screen().await, Screen::Home);
}

#[tokio::test]
async fn secured_flow_through_session_uses_remembered_secret() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap()]).accepting("rasp1234"),
        MemoryKvStore::with_value(CREDENTIALS_KEY, r#"{"RaspberryAP":"rasp1234"}"#),
        PermissionOutcome::Granted,
        true,
    );
    t.session.start().await;

    let request = match t.session.connect("aabbccddeeff").await.unwrap() {
        ConnectStep::SecretRequired(request) => request,
        other => panic!("expected prompt, got {:?}", other),
    };
    assert_eq!(request.prefill.as_deref(), Some("rasp1234"));
    assert_eq!(t.session.snapshot().await.prompt, Some(request.open_prompt()));

    let step = t
        .session
        .submit_secret(request.token, request.prefill.as_deref().unwrap())
        .await
        .unwrap();
    assert!(matches!(step, ConnectStep::Connected { .. }));
    let snapshot = t.session.snapshot().await;
    assert_eq!(snapshot.screen, Screen::connection_success("RaspberryAP"));
    assert_eq!(snapshot.prompt, None);
}

#[tokio::test]
async fn failed_secured_connect_stays_home_and_alerts() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap()]).accepting("right"),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        true,
    );
    t.session.start().await;
    let mut rx = t.events.subscribe();

    let request = match t.session.connect("aabbccddeeff").await.unwrap() {
        ConnectStep::SecretRequired(request) => request,
        other => panic!("expected prompt, got {:?}", other),
    };
    assert!(t.session.submit_secret(request.token, "wrong").await.is_err());
    assert_eq!(t.session.screen().await, Screen::Home);

    let mut alert = None;
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Alert { message, .. } = event {
            alert = Some(message);
        }
    }
    assert!(alert.unwrap().contains("verify your password"));
}

#[tokio::test]
async fn empty_secret_changes_nothing() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap()]).accepting("rasp1234"),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        true,
    );
    let before = t.session.start().await;
    let request = match t.session.connect("aabbccddeeff").await.unwrap() {
        ConnectStep::SecretRequired(request) => request,
        other => panic!("expected prompt, got {:?}", other),
    };
    let step = t.session.submit_secret(request.token, "").await.unwrap();
    assert_eq!(step, ConnectStep::Idle);
    assert!(t.adapter.secured_attempts().is_empty());
    assert_eq!(t.session.scan_state().await, before);
    assert_eq!(t.session.screen().await, Screen::Home);
    assert!(t.kv.raw(CREDENTIALS_KEY).is_none());
}

#[tokio::test]
async fn open_connect_closes_pending_prompt() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap(), open_cafe()]).accepting("rasp1234"),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        false,
    );
    t.session.start().await;
    let request = match t.session.connect("aabbccddeeff").await.unwrap() {
        ConnectStep::SecretRequired(request) => request,
        other => panic!("expected prompt, got {:?}", other),
    };

    t.session.connect("112233445566").await.unwrap();
    let snapshot = t.session.snapshot().await;
    assert_eq!(snapshot.screen, Screen::connection_success("CafeOpen"));
    assert_eq!(snapshot.prompt, None);

    t.session.back_to_home().await;
    let err = t
        .session
        .submit_secret(request.token, "rasp1234")
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectionError::NoPendingPrompt));
    assert_eq!(t.session.screen().await, Screen::Home);
    assert!(t.adapter.secured_attempts().is_empty());
}

#[tokio::test]
async fn overlapping_open_connects_end_on_last_started() {
    let t = session_with(
        FakeAdapter::new(vec![
            raw("SlowCafe", "0a0000000001", -60, None),
            raw("FastCafe", "0a0000000002", -60, None),
        ])
        .with_open_delay("SlowCafe", 200),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        false,
    );
    t.session.refresh().await;

    let slow = t.session.clone();
    let fast = t.session.clone();
    let (first, second) = tokio::join!(slow.connect("0a0000000001"), async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        fast.connect("0a0000000002").await
    });
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(t.session.screen().await, Screen::connection_success("FastCafe"));
}

#[tokio::test]
async fn rows_without_bssid_connect_by_row_key() {
    let t = session_with(
        FakeAdapter::new(vec![
            raw("HiddenOne", "", -50, None),
            raw("HiddenTwo", "", -60, None),
        ]),
        MemoryKvStore::new(),
        PermissionOutcome::Granted,
        false,
    );
    t.session.refresh().await;

    let err = t.session.connect("").await.unwrap_err();
    assert!(matches!(err, ConnectionError::UnknownNetwork(_)));

    t.session.connect("HiddenTwo#1").await.unwrap();
    assert_eq!(t.session.screen().await, Screen::connection_success("HiddenTwo"));
}

#[tokio::test]
async fn snapshots_never_carry_remembered_secret() {
    let t = session_with(
        FakeAdapter::new(vec![raspberry_ap()]),
        MemoryKvStore::with_value(CREDENTIALS_KEY, r#"{"RaspberryAP":"hunter2-saved"}"#),
        PermissionOutcome::Granted,
        true,
    );
    t.session.start().await;
    let mut rx = t.events.subscribe();

    match t.session.connect("aabbccddeeff").await.unwrap() {
        ConnectStep::SecretRequired(request) => {
            assert_eq!(request.prefill.as_deref(), Some("hunter2-saved"))
        }
        other => panic!("expected prompt, got {:?}", other),
    }

    let snapshot = serde_json::to_string(&t.session.snapshot().await).unwrap();
    assert!(snapshot.contains("RaspberryAP"));
    assert!(!snapshot.contains("hunter2-saved"));
    let mut published = 0;
    while let Ok(event) = rx.try_recv() {
        published += 1;
        assert!(!serde_json::to_string(&event).unwrap().contains("hunter2-saved"));
    }
    assert!(published > 0);
}
