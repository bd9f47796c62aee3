//! Session Pool (C2, spec.md §4.2).
//!
//! Keyed by [`Fingerprint`], this maintains per-fingerprint idle queues of
//! warm [`DownstreamChannel`]s plus an invalidation generation counter.
//! Grounded on `turbomcp-proxy`'s `IdTranslator`: a `DashMap`-sharded table
//! of bounded, independently-lockable per-key state, with eviction driven
//! by an explicit policy rather than a sweep over the whole map.
//!
//! Concurrent leases for the same fingerprint that find the idle queue
//! empty do not each dial a new downstream connection — they coordinate
//! through a single shared warmup future (a `futures::future::Shared`) so
//! at most one `DownstreamChannel::open` is in flight per fingerprint at a
//! time, matching spec.md §4.2's single-flight lease policy.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Notify;

use crate::error::{GatewayError, GatewayResult};
use crate::model::{Fingerprint, ServerConfig};
use crate::transport::DownstreamChannel;

type WarmupFuture = Pin<Box<dyn Future<Output = Result<(), Arc<GatewayError>>> + Send>>;
type SharedWarmup = Shared<WarmupFuture>;

/// A leased downstream channel, returned to the caller by [`SessionPool::lease`].
///
/// Must be handed back via [`SessionPool::release`] exactly once; dropping
/// it without releasing leaks the outstanding-lease count and will make
/// [`SessionPool::shutdown`] hang.
#[derive(Clone)]
pub struct DownstreamSession {
    pub channel: Arc<DownstreamChannel>,
    pub fingerprint: Fingerprint,
    generation: u64,
}

impl DownstreamSession {
    /// True once C2 has observed an invalidation for this fingerprint more
    /// recent than the generation this session was opened under (spec.md
    /// §4.2's "marked stale"). The Aggregator (C3) polls this to decide
    /// when to close its Client Session (spec.md §4.3 "stale-lease
    /// signal").
    pub fn is_stale(&self, current_generation: u64) -> bool {
        self.generation < current_generation
    }
}

struct PooledEntry {
    channel: Arc<DownstreamChannel>,
    generation: u64,
}

struct FingerprintState {
    config: ServerConfig,
    idle: SyncMutex<VecDeque<PooledEntry>>,
    generation: AtomicU64,
    warmup: SyncMutex<Option<SharedWarmup>>,
    outstanding: AtomicUsize,
    target_idle: usize,
}

impl FingerprintState {
    fn new(config: ServerConfig, target_idle: usize) -> Self {
        Self {
            config,
            idle: SyncMutex::new(VecDeque::new()),
            generation: AtomicU64::new(0),
            warmup: SyncMutex::new(None),
            outstanding: AtomicUsize::new(0),
            target_idle,
        }
    }
}

/// Selector accepted by [`SessionPool::invalidate`]. Narrower than
/// [`crate::model::TargetSelector`]: the pool only ever keys by
/// fingerprint, so the Invalidation Bus (C7) is responsible for resolving
/// namespace/endpoint/principal selectors down to the fingerprints they
/// touch before calling in here.
#[derive(Debug, Clone, Copy)]
pub enum PoolInvalidation {
    Fingerprint(Fingerprint),
    All,
}

/// The fingerprint-keyed idle pool described by spec.md §4.2.
pub struct SessionPool {
    states: DashMap<Fingerprint, Arc<FingerprintState>>,
    target_idle_per_fingerprint: usize,
    shutting_down: std::sync::atomic::AtomicBool,
    drained: Notify,
}

impl SessionPool {
    pub fn new() -> Self {
        Self::with_target_idle(1)
    }

    pub fn with_target_idle(target_idle_per_fingerprint: usize) -> Self {
        Self {
            states: DashMap::new(),
            target_idle_per_fingerprint,
            shutting_down: std::sync::atomic::AtomicBool::new(false),
            drained: Notify::new(),
        }
    }

    /// Lease a healthy, current-generation downstream session for `config`,
    /// opening one via C1 if the idle queue is empty (spec.md §4.2 steps
    /// 1-3).
    pub async fn lease(&self, config: &ServerConfig) -> GatewayResult<DownstreamSession> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(GatewayError::resource_exhausted("session pool is shutting down"));
        }

        let fp = config.fingerprint();
        let state = self
            .states
            .entry(fp)
            .or_insert_with(|| Arc::new(FingerprintState::new(config.clone(), self.target_idle_per_fingerprint)))
            .clone();

        loop {
            if let Some(entry) = Self::pop_healthy(&state).await {
                state.outstanding.fetch_add(1, Ordering::SeqCst);
                return Ok(DownstreamSession {
                    channel: entry.channel,
                    fingerprint: fp,
                    generation: entry.generation,
                });
            }

            let warmup = Self::join_or_start_warmup(&state, fp);
            let result = warmup.await;
            // Clear the slot unconditionally: the next lease() that still
            // finds the idle queue empty starts a fresh warmup. This is
            // what keeps the pool from auto-retrying on a waiter's behalf
            // (spec.md §4.2 step 3) while still coalescing concurrent
            // waiters of the *same* attempt.
            *state.warmup.lock() = None;
            // Preserve the real variant (spec.md §4.3: a 401 surfaces as
            // `Unauthorized`, not a masked generic failure) — it is shared
            // across every waiter on this warmup as an `Arc`, so each gets
            // its own owned copy rather than the original being consumed.
            result.map_err(|e| e.clone_best_effort())?;
            // Warmup succeeded and pushed exactly one entry; loop back and
            // race the other waiters for it.
        }
    }

    /// Return a leased session. Unhealthy, non-reusable, or stale sessions
    /// are closed instead of requeued (spec.md §4.2 release policy).
    pub async fn release(&self, session: DownstreamSession, reusable: bool) {
        let Some(state) = self.states.get(&session.fingerprint).map(|e| e.clone()) else {
            session.channel.close().await;
            return;
        };

        let current_generation = state.generation.load(Ordering::SeqCst);
        let stale = session.generation < current_generation;
        let healthy = session.channel.is_healthy().await;

        if !reusable || !healthy || stale || self.shutting_down.load(Ordering::SeqCst) {
            session.channel.close().await;
        } else {
            state.idle.lock().push_back(PooledEntry {
                channel: session.channel,
                generation: session.generation,
            });
        }

        let remaining = state.outstanding.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            self.drained.notify_waiters();
        }

        if !self.shutting_down.load(Ordering::SeqCst) && state.idle.lock().len() < state.target_idle {
            self.spawn_restock(state);
        }
    }

    /// Bump a fingerprint's generation and close its idle entries
    /// immediately. Leased entries are left alone — they are discovered
    /// stale by [`DownstreamSession::is_stale`] and closed by their holder
    /// (spec.md §4.2 invalidation, §4.3 stale-lease signal).
    pub fn invalidate(&self, selector: PoolInvalidation) {
        match selector {
            PoolInvalidation::Fingerprint(fp) => {
                if let Some(state) = self.states.get(&fp) {
                    Self::bump_and_drain(&state);
                }
            }
            PoolInvalidation::All => {
                for state in self.states.iter() {
                    Self::bump_and_drain(&state);
                }
            }
        }
    }

    /// Current invalidation generation for a fingerprint, or 0 if nothing
    /// has ever been pooled under it.
    pub fn generation_of(&self, fp: Fingerprint) -> u64 {
        self.states
            .get(&fp)
            .map(|s| s.generation.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Close every idle session, refuse new leases, and wait for every
    /// outstanding lease to be released (spec.md §4.2 shutdown).
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        for state in self.states.iter() {
            Self::drain_idle(&state).await;
        }

        loop {
            let any_outstanding = self
                .states
                .iter()
                .any(|s| s.outstanding.load(Ordering::SeqCst) > 0);
            if !any_outstanding {
                break;
            }
            self.drained.notified().await;
        }
    }

    fn bump_and_drain(state: &FingerprintState) {
        state.generation.fetch_add(1, Ordering::SeqCst);
        let stale: Vec<PooledEntry> = {
            let mut idle = state.idle.lock();
            idle.drain(..).collect()
        };
        for entry in stale {
            tokio::spawn(async move {
                entry.channel.close().await;
            });
        }
    }

    async fn drain_idle(state: &FingerprintState) {
        let entries: Vec<PooledEntry> = {
            let mut idle = state.idle.lock();
            idle.drain(..).collect()
        };
        for entry in entries {
            entry.channel.close().await;
        }
    }

    /// Pop entries off the front of the idle FIFO until a healthy,
    /// current-generation one is found (or the queue empties). Stale or
    /// unhealthy entries are closed rather than requeued.
    async fn pop_healthy(state: &FingerprintState) -> Option<PooledEntry> {
        loop {
            let candidate = state.idle.lock().pop_front()?;
            let current_generation = state.generation.load(Ordering::SeqCst);
            if candidate.generation < current_generation {
                candidate.channel.close().await;
                continue;
            }
            if !candidate.channel.is_healthy().await {
                candidate.channel.close().await;
                continue;
            }
            return Some(candidate);
        }
    }

    fn join_or_start_warmup(state: &Arc<FingerprintState>, fp: Fingerprint) -> SharedWarmup {
        let mut guard = state.warmup.lock();
        if let Some(existing) = guard.as_ref() {
            return existing.clone();
        }
        let state = state.clone();
        let fut: WarmupFuture = Box::pin(async move {
            tracing::debug!(fingerprint = %fp, "warming up downstream session");
            let generation = state.generation.load(Ordering::SeqCst);
            match DownstreamChannel::open(&state.config).await {
                Ok((channel, _catalog)) => {
                    state.idle.lock().push_back(PooledEntry {
                        channel: Arc::new(channel),
                        generation,
                    });
                    Ok(())
                }
                Err(e) => Err(Arc::new(e)),
            }
        });
        let shared = fut.shared();
        *guard = Some(shared.clone());
        shared
    }

    fn spawn_restock(&self, state: Arc<FingerprintState>) {
        let fp = state.config.fingerprint();
        tokio::spawn(async move {
            let warmup = Self::join_or_start_warmup(&state, fp);
            if let Err(e) = warmup.await {
                tracing::warn!(fingerprint = %fp, "background restock failed: {e}");
            }
            *state.warmup.lock() = None;
        });
    }
}

impl Default for SessionPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransportKind;

    fn config(id: &str) -> ServerConfig {
        ServerConfig {
            id: id.to_string(),
            transport: TransportKind::Stdio {
                command: "nonexistent-binary-for-tests".to_string(),
                args: vec![],
                env: Default::default(),
            },
            description: None,
        }
    }

    #[tokio::test]
    async fn lease_on_unreachable_config_surfaces_the_open_error() {
        let pool = SessionPool::new();
        let cfg = config("unreachable");
        let err = pool.lease(&cfg).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn concurrent_leases_for_same_fingerprint_share_one_warmup_failure() {
        let pool = Arc::new(SessionPool::new());
        let cfg = Arc::new(config("shared-fingerprint"));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let pool = pool.clone();
            let cfg = cfg.clone();
            handles.push(tokio::spawn(async move { pool.lease(&cfg).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
    }

    #[tokio::test]
    async fn invalidate_all_on_empty_pool_is_a_no_op() {
        let pool = SessionPool::new();
        pool.invalidate(PoolInvalidation::All);
        pool.shutdown().await;
    }

    // spec.md §8 invariant 4: invalidating a fingerprint bumps its
    // generation monotonically, and a fingerprint never leased is
    // unaffected by invalidating a different one.
    #[tokio::test]
    async fn invalidate_bumps_generation_for_a_tracked_fingerprint_only() {
        let pool = SessionPool::new();
        let cfg = config("fp-gen");
        let fp = cfg.fingerprint();
        let other_cfg = ServerConfig {
            id: "fp-gen-untouched".to_string(),
            transport: TransportKind::Stdio {
                command: "another-nonexistent-binary".to_string(),
                args: vec![],
                env: Default::default(),
            },
            description: None,
        };
        let other_fp = other_cfg.fingerprint();
        assert_ne!(fp, other_fp, "distinct commands must fingerprint distinctly");
        assert_eq!(pool.generation_of(fp), 0);

        // The lease fails (no such binary), but registers per-fingerprint
        // state as a side effect before the open attempt.
        let _ = pool.lease(&cfg).await;

        pool.invalidate(PoolInvalidation::Fingerprint(fp));
        assert_eq!(pool.generation_of(fp), 1);
        pool.invalidate(PoolInvalidation::Fingerprint(fp));
        assert_eq!(pool.generation_of(fp), 2);

        // A fingerprint that was never leased has no state to bump.
        assert_eq!(pool.generation_of(other_fp), 0);
        pool.invalidate(PoolInvalidation::Fingerprint(other_fp));
        assert_eq!(pool.generation_of(other_fp), 0);
    }
}
