//! Background TTL sweep for the reply-context and tweak-session stores: a
//! `tokio::time::sleep` loop with `tracing` progress logs, cancellable via
//! a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::reply_context::ReplyContextStore;
use crate::tweak_session::TweakSessionStore;

/// Periodically sweeps both stores for expired entries until `shutdown` fires.
pub async fn run(
    reply_contexts: Arc<ReplyContextStore>,
    tweak_sessions: Arc<TweakSessionStore>,
    interval_secs: u64,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let reaped_contexts = reply_contexts.reap_expired();
                let reaped_sessions = tweak_sessions.reap_expired();
                if reaped_contexts > 0 || reaped_sessions > 0 {
                    debug!(reaped_contexts, reaped_sessions, "state reaper swept expired entries");
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
