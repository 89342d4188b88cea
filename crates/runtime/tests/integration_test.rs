//! End-to-end exercise of the scheduler/hub/protocol stack: two clients join
//! a running arena, exchange commands and heartbeats over the scheduler
//! handle, and observe keyframe recovery after a forced disconnect.

use std::time::Duration;

use arena_core::{Vec2, WorldConfig};
use arena_runtime::{ClientMessage, Scheduler, ServerMessage};
use tokio::sync::mpsc;

async fn next_state(rx: &mut mpsc::Receiver<ServerMessage>) -> arena_runtime::StateFrame {
    loop {
        match rx.recv().await.expect("channel closed") {
            ServerMessage::State(frame) => return frame,
            _ => continue,
        }
    }
}

#[tokio::test]
async fn two_players_see_each_other_after_joining() {
    let (scheduler, handle) = Scheduler::new(WorldConfig::new(11, 400.0, 400.0), 0.0, 32);
    let run = tokio::spawn(scheduler.run());

    let alice = handle.join(Vec2::new(10.0, 10.0), 100.0).await.unwrap();
    let bob = handle.join(Vec2::new(20.0, 20.0), 100.0).await.unwrap();

    let (alice_tx, mut alice_rx) = mpsc::channel(16);
    let (bob_tx, mut bob_rx) = mpsc::channel(16);
    handle.subscribe(alice, alice_tx).await.unwrap();
    handle.subscribe(bob, bob_tx).await.unwrap();

    let alice_snapshot = next_state(&mut alice_rx).await;
    assert!(alice_snapshot.resync);
    assert_eq!(alice_snapshot.players.unwrap().len(), 2);

    let bob_snapshot = next_state(&mut bob_rx).await;
    assert!(bob_snapshot.resync);
    assert_eq!(bob_snapshot.players.unwrap().len(), 2);

    handle.shutdown().await.unwrap();
    run.await.unwrap();
}

#[tokio::test]
async fn movement_command_is_acked_and_reflected_in_a_later_diff() {
    let (scheduler, handle) = Scheduler::new(WorldConfig::new(3, 400.0, 400.0), 0.0, 32);
    let run = tokio::spawn(scheduler.run());

    let player = handle.join(Vec2::new(0.0, 0.0), 100.0).await.unwrap();
    let (tx, mut rx) = mpsc::channel(32);
    handle.subscribe(player, tx).await.unwrap();
    next_state(&mut rx).await; // initial snapshot

    handle
        .send_client_message(player, ClientMessage::Input { dx: 1.0, dy: 0.0, facing: None, seq: Some(1) }, 0.0)
        .await
        .unwrap();

    let mut acked = false;
    let mut moved = false;
    for _ in 0..20 {
        match rx.recv().await.unwrap() {
            ServerMessage::CommandAck { seq: 1, .. } => acked = true,
            ServerMessage::State(frame) if !frame.patches.is_empty() => moved = true,
            _ => {}
        }
        if acked && moved {
            break;
        }
    }
    assert!(acked, "expected a commandAck for sequence 1");
    assert!(moved, "expected at least one diff frame with patches after moving");

    handle.shutdown().await.unwrap();
    run.await.unwrap();
}

#[tokio::test]
async fn action_command_spawns_an_observable_melee_effect() {
    let (scheduler, handle) = Scheduler::new(WorldConfig::new(13, 400.0, 400.0), 0.0, 32);
    let run = tokio::spawn(scheduler.run());

    let player = handle.join(Vec2::new(0.0, 0.0), 100.0).await.unwrap();
    let (tx, mut rx) = mpsc::channel(32);
    handle.subscribe(player, tx).await.unwrap();
    next_state(&mut rx).await; // initial snapshot

    handle
        .send_client_message(player, ClientMessage::Action { action: "attack".to_string(), seq: Some(1) }, 0.0)
        .await
        .unwrap();

    let mut acked = false;
    for _ in 0..20 {
        if let ServerMessage::CommandAck { seq: 1, .. } = rx.recv().await.unwrap() {
            acked = true;
            break;
        }
    }
    assert!(acked, "expected a commandAck for the action command");

    // The accepted action is only applied on the world's next tick, and the
    // resulting melee effect lives for just 0.15s, so poll for a short window
    // around the effect's spawn instead of requesting a single keyframe.
    let mut spawned_effect = false;
    'poll: for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle
            .send_client_message(player, ClientMessage::KeyframeRequest { keyframe_seq: 0 }, 0.0)
            .await
            .unwrap();
        for _ in 0..10 {
            match rx.recv().await.unwrap() {
                ServerMessage::State(frame) if frame.resync => {
                    if !frame.effects.unwrap_or_default().is_empty() {
                        spawned_effect = true;
                        break 'poll;
                    }
                    break;
                }
                _ => continue,
            }
        }
    }
    assert!(spawned_effect, "expected the attack action to spawn an observable melee effect");

    handle.shutdown().await.unwrap();
    run.await.unwrap();
}

#[tokio::test]
async fn keyframe_request_ahead_of_the_current_tick_is_nacked() {
    let (scheduler, handle) = Scheduler::new(WorldConfig::new(5, 200.0, 200.0), 0.0, 16);
    let run = tokio::spawn(scheduler.run());

    let player = handle.join(Vec2::ZERO, 100.0).await.unwrap();
    let (tx, mut rx) = mpsc::channel(16);
    handle.subscribe(player, tx).await.unwrap();
    next_state(&mut rx).await;

    handle
        .send_client_message(player, ClientMessage::KeyframeRequest { keyframe_seq: 1_000_000 }, 0.0)
        .await
        .unwrap();

    let msg = rx.recv().await.unwrap();
    assert!(matches!(msg, ServerMessage::KeyframeNack { requested_seq: 1_000_000, .. }));

    handle.shutdown().await.unwrap();
    run.await.unwrap();
}
