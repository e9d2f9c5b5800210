// tests/sequencer_scenario_tests.rs

mod common;

use std::time::Duration;
use followme_common::models::{GestureLabel, SetpointPair, TargetOffset};
use followme_common::traits::ArmApi;
use followme_core::arm::GestureLibrary;
use followme_core::eventbus::FollowMeEvent;
use followme_core::tasks::spawn_sequencer_task;

use common::{build_stack, fast_dialogue_config, wait_until};

#[tokio::test]
async fn test_swing_dispatches_then_rearms_then_repeats() {
    let s = build_stack(fast_dialogue_config());
    let sp1 = SetpointPair::new([1.0; 6], [-1.0; 6]);
    let sp2 = SetpointPair::new([2.0; 6], [-2.0; 6]);
    s.sequencer.register_gesture(GestureLabel::Swing, vec![sp1, sp2]).await;

    for _ in 0..4 {
        s.sequencer.tick().await;
    }

    let swing = GestureLibrary.swing();
    assert_eq!(
        s.left.position_moves().await,
        vec![sp1.left.to_vec(), sp2.left.to_vec(), swing[0].left.to_vec()]
    );
    assert_eq!(
        s.right.position_moves().await,
        vec![sp1.right.to_vec(), sp2.right.to_vec(), swing[0].right.to_vec()]
    );
    assert_eq!(s.sequencer.current_gesture().await, GestureLabel::Swing);
    assert_eq!(s.sequencer.snapshot().await.queue, vec![swing[1]]);
}

#[tokio::test]
async fn test_new_request_replaces_running_gesture() {
    let s = build_stack(fast_dialogue_config());
    s.arms.enable_arm_swinging().await;
    s.sequencer.tick().await;

    s.left.set_motion_done(false);
    s.arms.do_signal_right().await;
    s.sequencer.tick().await;

    let signal = GestureLibrary.setpoints(GestureLabel::SignalRight);
    assert_eq!(s.right.position_moves().await.last(), Some(&signal[0].right.to_vec()));
    assert_eq!(s.sequencer.snapshot().await.queue, signal[1..].to_vec());
}

#[tokio::test]
async fn test_dispatches_are_published_on_the_bus() {
    let s = build_stack(fast_dialogue_config());
    let mut rx = s.bus.subscribe(Some(16)).await;
    s.arms.do_greet().await;
    s.sequencer.tick().await;

    let mut remaining = None;
    while let Ok(evt) = rx.try_recv() {
        if let FollowMeEvent::SetpointDispatched { label, remaining: r } = evt {
            assert_eq!(label, GestureLabel::Greet);
            remaining = Some(r);
        }
    }
    assert_eq!(remaining, Some(2));
}

#[tokio::test]
async fn test_swing_rearm_is_registered_before_its_dispatch() {
    let s = build_stack(fast_dialogue_config());
    let mut rx = s.bus.subscribe(Some(16)).await;
    s.arms.do_signal_left().await;
    for _ in 0..4 {
        s.sequencer.tick().await;
    }

    let mut log = Vec::new();
    while let Ok(evt) = rx.try_recv() {
        match evt {
            FollowMeEvent::GestureRegistered { label, setpoints } => {
                log.push(format!("registered {label} {setpoints}"));
            }
            FollowMeEvent::SetpointDispatched { label, remaining } => {
                log.push(format!("dispatched {label} {remaining}"));
            }
            _ => {}
        }
    }
    assert_eq!(
        log,
        vec![
            "registered signal_left 2",
            "dispatched signal_left 1",
            "dispatched signal_left 0",
            "registered swing 2",
            "dispatched swing 1",
        ]
    );
}

#[tokio::test]
async fn test_periodic_task_and_stop() {
    let s = build_stack(fast_dialogue_config());
    let handle = spawn_sequencer_task(
        s.sequencer.clone(),
        Duration::from_millis(2),
        s.bus.shutdown_signal(),
    );

    s.arms.disable_arm_swinging().await;
    let seq = s.sequencer.clone();
    assert!(wait_until(|| {
        let seq = seq.clone();
        async move { seq.current_gesture().await == GestureLabel::Rest }
    }).await);
    assert_eq!(s.left.position_moves().await.len(), 1);

    s.arms.enable_arm_swinging().await;
    assert!(s.arms.stop_arms().await);
    let snap = s.sequencer.snapshot().await;
    assert_eq!(snap.label, GestureLabel::Rest);
    assert!(snap.queue.is_empty());

    s.bus.shutdown();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_head_offset_outside_deadband_moves_once() {
    let s = build_stack(fast_dialogue_config());
    s.head.enable_following().await;

    s.head.on_observation(TargetOffset::new(0.5, 0.0, 1.4)).await;
    s.head.on_observation(TargetOffset::new(0.01, -0.02, 1.4)).await;

    assert_eq!(s.head_joints.relative_moves().await, vec![vec![-2.0, 0.0]]);
}
