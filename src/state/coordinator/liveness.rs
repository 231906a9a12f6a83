//! Liveness sweep.
//!
//! The sweep runs at the top of every coordinator loop iteration, gated to
//! once per [`ALIVENESS_CHECK`]. Without traffic it does not run at all
//! unless the optional timer task feeds the mailbox with ticks.

use super::{Coordinator, CoordinatorHandle, Inbound};
use crate::state::client::ClientId;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

/// Minimum spacing between two sweeps.
pub const ALIVENESS_CHECK: Duration = Duration::from_secs(10);
/// Idle time after which a registered client is pinged.
pub const PING_THRESHOLD: Duration = Duration::from_secs(90);
/// Idle time after which any client is disconnected.
pub const PING_TIMEOUT: Duration = Duration::from_secs(180);

impl Coordinator {
    pub(crate) fn sweep(&mut self, now: Instant) {
        if let Some(last) = self.last_sweep
            && now.saturating_duration_since(last) <= ALIVENESS_CHECK
        {
            return;
        }
        self.last_sweep = Some(now);

        let ping = format!("PING :{}", self.settings.hostname);
        let mut expired: Vec<ClientId> = Vec::new();
        for (id, client) in self.clients.iter_mut() {
            let idle = now.saturating_duration_since(client.last_activity);
            if idle > PING_TIMEOUT {
                expired.push(*id);
                continue;
            }
            if !client.ping_sent && idle > PING_THRESHOLD {
                if client.registered {
                    client.handle.send_raw(ping.as_str());
                    client.ping_sent = true;
                } else {
                    expired.push(*id);
                }
            }
        }

        for id in expired {
            info!(client = id, "Ping timeout");
            self.drop_client(id, "ping timeout");
        }
    }
}

/// Feed the coordinator a tick every [`ALIVENESS_CHECK`] so idle
/// connections are reaped even when nobody talks.
pub fn spawn_liveness_timer(handle: CoordinatorHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ALIVENESS_CHECK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !handle.send(Inbound::Tick) {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::super::tests::{Harness, settle};
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn idle_registered_client_is_pinged_once() {
        let mut h = Harness::new();
        let (alice, mut rx) = h.registered("alice");
        let (bob, _bob_rx) = h.connect();
        settle(&mut rx).await;

        tokio::time::advance(Duration::from_secs(95)).await;
        h.coordinator.handle_inbound(Inbound::Tick);

        assert_eq!(settle(&mut rx).await, vec!["PING :irc.test"]);
        assert!(h.client(&alice).unwrap().ping_sent);
        // Idle unregistered clients are never pinged, only dropped.
        assert!(h.client(&bob).is_none());
        assert!(bob.is_closed());

        tokio::time::advance(Duration::from_secs(20)).await;
        h.coordinator.handle_inbound(Inbound::Tick);
        assert!(settle(&mut rx).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn activity_clears_ping() {
        let mut h = Harness::new();
        let (alice, mut rx) = h.registered("alice");

        tokio::time::advance(Duration::from_secs(95)).await;
        h.coordinator.handle_inbound(Inbound::Tick);
        h.line(&alice, "PONG :irc.test");

        let client = h.client(&alice).unwrap();
        assert!(!client.ping_sent);
        assert!(settle(&mut rx).await.contains(&"PING :irc.test".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_client_times_out() {
        let mut h = Harness::new();
        let (alice, _rx) = h.registered("alice");
        let (carol, _carol_rx) = h.registered("carol");

        for _ in 0..17 {
            tokio::time::advance(Duration::from_secs(11)).await;
            h.line(&carol, "PONG :irc.test");
        }

        assert!(h.client(&alice).is_none());
        assert!(alice.is_closed());
        assert!(h.client(&carol).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_is_gated() {
        let mut h = Harness::new();
        let (alice, _rx) = h.connect();

        h.coordinator.handle_inbound(Inbound::Tick);
        tokio::time::advance(Duration::from_secs(185)).await;
        h.coordinator.last_sweep = Some(Instant::now());
        h.coordinator.handle_inbound(Inbound::Tick);

        // Too soon after the last sweep.
        assert!(h.client(&alice).is_some());

        tokio::time::advance(ALIVENESS_CHECK + Duration::from_secs(1)).await;
        h.coordinator.handle_inbound(Inbound::Tick);
        assert!(h.client(&alice).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_sends_ticks() {
        let mut h = Harness::new();
        let timer = spawn_liveness_timer(h.coordinator.handle());

        assert!(matches!(h.rx.recv().await, Some(Inbound::Tick)));
        assert!(matches!(h.rx.recv().await, Some(Inbound::Tick)));
        timer.abort();
    }
}
