// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Failure counting and session teardown

use futures::FutureExt;
use kauth_client::session::{MAX_FAILURE_MESSAGE, TOKEN_EXPIRED_MESSAGE};
use kauth_client::{configure, KauthContext, LivenessConfig, SessionEndReason};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::support::{envelope, record_session_ends, transport_failure, ScriptedProbe, PROGRAM_SECRET};

const INTERVAL: Duration = Duration::from_secs(120);

fn context() -> KauthContext {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "RSA").unwrap();
    context.credentials().put_token("live-token");
    context.credentials().put_val("ka_pwd", "saved");
    context.credentials().secure().save("ka_pwd", "saved");
    context
}

#[tokio::test(start_paused = true)]
async fn test_three_transport_failures_escalate_once() {
    let context = context();
    let device_id = context.credentials().device_id();
    let probe = Arc::new(ScriptedProbe::new(vec![
        transport_failure(),
        transport_failure(),
        transport_failure(),
    ]));
    let monitor = context.liveness_monitor(probe.clone(), LivenessConfig::default());
    let events = record_session_ends(&monitor).await;

    assert!(monitor.start().await);

    sleep(Duration::from_millis(1)).await;
    assert_eq!(monitor.failure_count().await, 1);
    assert!(monitor.is_running().await);

    sleep(INTERVAL).await;
    assert_eq!(monitor.failure_count().await, 2);
    assert!(events.lock().unwrap().is_empty());

    sleep(INTERVAL).await;
    {
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, SessionEndReason::MaxFailures);
        assert_eq!(events[0].code, -1);
        assert_eq!(events[0].message, MAX_FAILURE_MESSAGE);
    }
    assert!(!monitor.is_running().await);
    assert_eq!(monitor.failure_count().await, 0);

    // Credentials wiped, device id kept
    assert_eq!(context.credentials().token(), None);
    assert_eq!(context.credentials().get_val("ka_pwd"), Some(String::new()));
    assert_eq!(context.credentials().secure().read("ka_pwd"), None);
    assert_eq!(context.credentials().device_id(), device_id);

    // No more probes after teardown
    sleep(INTERVAL * 5).await;
    assert_eq!(probe.calls(), 3);
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_token_expired_escalates_on_first_probe() {
    let context = context();
    let probe = Arc::new(ScriptedProbe::new(vec![envelope(1050, None)]));
    let monitor = context.liveness_monitor(probe.clone(), LivenessConfig::default());
    let events = record_session_ends(&monitor).await;

    monitor.start().await;
    sleep(Duration::from_millis(1)).await;

    let events = events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, SessionEndReason::TokenExpired);
    assert_eq!(events[0].code, 1050);
    assert_eq!(events[0].message, TOKEN_EXPIRED_MESSAGE);
    assert!(!monitor.is_running().await);
    assert_eq!(context.credentials().token(), None);
    assert_eq!(probe.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_code_2000_after_earlier_failure_uses_server_message() {
    let context = context();
    let probe = Arc::new(ScriptedProbe::new(vec![
        envelope(500, Some("busy")),
        envelope(2000, Some("Signed in on another device")),
    ]));
    let monitor = context.liveness_monitor(probe, LivenessConfig::default());
    let events = record_session_ends(&monitor).await;

    monitor.start().await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(monitor.failure_count().await, 1);

    sleep(INTERVAL).await;
    let events = events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code, 2000);
    assert_eq!(events[0].message, "Signed in on another device");
}

#[tokio::test(start_paused = true)]
async fn test_other_error_codes_count_towards_max() {
    let context = context();
    let probe = Arc::new(ScriptedProbe::new(vec![
        envelope(500, None),
        transport_failure(),
        envelope(401, Some("nope")),
    ]));
    let monitor = context.liveness_monitor(probe, LivenessConfig::default());
    let events = record_session_ends(&monitor).await;

    monitor.start().await;
    sleep(Duration::from_millis(1)).await;
    sleep(INTERVAL).await;
    assert_eq!(monitor.failure_count().await, 2);

    sleep(INTERVAL).await;
    let events = events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, SessionEndReason::MaxFailures);
    assert_eq!(events[0].code, -1);
}

#[tokio::test(start_paused = true)]
async fn test_success_in_between_resets_the_count() {
    let context = context();
    let probe = Arc::new(ScriptedProbe::new(vec![
        transport_failure(),
        transport_failure(),
        envelope(200, None),
        transport_failure(),
        transport_failure(),
    ]));
    let monitor = context.liveness_monitor(probe.clone(), LivenessConfig::default());
    let events = record_session_ends(&monitor).await;

    monitor.start().await;
    sleep(Duration::from_millis(1)).await;
    sleep(INTERVAL * 4).await;

    assert_eq!(probe.calls(), 5);
    assert_eq!(monitor.failure_count().await, 2);
    assert!(monitor.is_running().await);
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_listener_may_register_another_listener() {
    let context = context();
    let probe = Arc::new(ScriptedProbe::new(vec![
        envelope(1050, None),
        envelope(2000, None),
    ]));
    let monitor = context.liveness_monitor(probe, LivenessConfig::default());

    let registered = Arc::new(AtomicUsize::new(0));
    let late_calls = Arc::new(AtomicUsize::new(0));
    {
        let monitor_handle = monitor.clone();
        let registered = registered.clone();
        let late_calls = late_calls.clone();
        monitor
            .on_session_ended(move |_| {
                let monitor = monitor_handle.clone();
                let registered = registered.clone();
                let late_calls = late_calls.clone();
                async move {
                    if registered.fetch_add(1, Ordering::SeqCst) == 0 {
                        monitor
                            .on_session_ended(move |_| {
                                late_calls.fetch_add(1, Ordering::SeqCst);
                                async {}.boxed()
                            })
                            .await;
                    }
                }
                .boxed()
            })
            .await;
    }

    monitor.start().await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(registered.load(Ordering::SeqCst), 1);
    assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    assert!(!monitor.is_running().await);

    // The listener added during the first escalation hears the second
    monitor.start().await;
    sleep(Duration::from_millis(1)).await;
    assert_eq!(registered.load(Ordering::SeqCst), 2);
    assert_eq!(late_calls.load(Ordering::SeqCst), 1);
}
