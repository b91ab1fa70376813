// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Waiting for remote resource state transitions.
//!
//! After an asynchronous mutation (create a host, deactivate a host, remove
//! a machine), the platform reports the resource in a sequence of
//! transitional states before it settles.  [`wait_for_state`] polls a
//! read-only refresh function until the resource reaches one of the
//! caller's target states, fails, or the timeout elapses.

use crate::state::ResourceState;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Parameters for one state-convergence wait
///
/// A `WaitConfig` is constructed immediately before waiting and discarded
/// afterwards; it holds no state across calls.  `pending` and `target` must
/// be disjoint.  A state found in neither set ends the wait with
/// [`WaitError::UnexpectedState`] rather than being polled through.
#[derive(Clone, Copy, Debug)]
pub struct WaitConfig<'a> {
    /// States in which the remote operation is still in progress
    pub pending: &'a [ResourceState],
    /// States that conclude the wait successfully
    pub target: &'a [ResourceState],
    /// Maximum wall-clock time to wait, measured from entry
    pub timeout: Duration,
    /// Delay before the first poll, giving the remote side time to begin
    /// processing the mutation
    pub delay: Duration,
    /// Spacing between successive polls
    pub min_interval: Duration,
}

/// Failure of a [`wait_for_state`] call
///
/// None of these is retried internally.  Retry, if wanted at all, belongs
/// to the caller, which also wraps the error with operation context before
/// surfacing it.
#[derive(Debug, thiserror::Error)]
pub enum WaitError<T, E> {
    /// A refresh attempt failed.  A failed read is terminal, not a
    /// transient condition to poll through; the underlying error is
    /// surfaced unchanged.
    #[error(transparent)]
    Refresh(#[from] E),

    /// The resource was observed in a state that is neither pending nor
    /// target.
    #[error("resource in unexpected state \"{state}\"")]
    UnexpectedState {
        state: ResourceState,
        /// Snapshot returned by the read that observed the state.
        snapshot: T,
    },

    /// The timeout elapsed before any target state was observed.
    #[error("timed out after {elapsed:?} (last state: \"{last_state}\")")]
    Timeout { elapsed: Duration, last_state: ResourceState },
}

/// Polls `refresh` until the resource reaches a state in `config.target`.
///
/// `refresh` performs one read-only query of the remote resource and
/// returns the latest snapshot together with its state label.  It must be
/// idempotent; it is invoked at least once, strictly sequentially, and at
/// most every `config.min_interval`.
///
/// On success, the returned snapshot reflects a target state as observed at
/// the moment of the final read; the resource may have moved on since, and
/// any subsequent consistency requirement is the caller's.  The calling
/// task blocks between polls; run independent waits on separate tasks.
pub async fn wait_for_state<T, E, F, Fut>(
    config: &WaitConfig<'_>,
    mut refresh: F,
) -> Result<T, WaitError<T, E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(T, ResourceState), E>>,
{
    debug_assert!(
        config.pending.iter().all(|state| !config.target.contains(state)),
        "pending and target state sets must be disjoint"
    );

    let start = Instant::now();
    tokio::time::sleep(config.delay).await;
    loop {
        let (snapshot, state) = refresh().await?;
        if config.target.contains(&state) {
            return Ok(snapshot);
        }
        if !config.pending.contains(&state) {
            return Err(WaitError::UnexpectedState { state, snapshot });
        }
        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            return Err(WaitError::Timeout { elapsed, last_state: state });
        }
        tokio::time::sleep(config.min_interval).await;
    }
}

#[cfg(test)]
mod test {
    use super::wait_for_state;
    use super::WaitConfig;
    use super::WaitError;
    use crate::state::ResourceState;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("injected refresh failure")]
    struct RefreshFailed;

    fn config<'a>(
        pending: &'a [ResourceState],
        target: &'a [ResourceState],
    ) -> WaitConfig<'a> {
        WaitConfig {
            pending,
            target,
            timeout: Duration::from_secs(10),
            delay: Duration::from_millis(10),
            min_interval: Duration::from_millis(100),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_immediately_on_target_state() {
        let polls = AtomicUsize::new(0);
        let result = wait_for_state::<_, RefreshFailed, _, _>(
            &config(&[ResourceState::Creating], &[ResourceState::Active]),
            || {
                polls.fetch_add(1, Ordering::SeqCst);
                async { Ok(("1h7", ResourceState::Active)) }
            },
        )
        .await;
        assert_eq!(result.unwrap(), "1h7");
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_polls_through_pending_states() {
        // provisioning, provisioning, then active: exactly three polls, and
        // the returned snapshot is the third one.
        let states = [
            ResourceState::Provisioning,
            ResourceState::Provisioning,
            ResourceState::Active,
        ];
        let polls = AtomicUsize::new(0);
        let result = wait_for_state::<_, RefreshFailed, _, _>(
            &config(&[ResourceState::Provisioning], &[ResourceState::Active]),
            || {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                let state = states[n];
                async move { Ok((n, state)) }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_in_pending_state() {
        let conf = WaitConfig {
            pending: &[ResourceState::Provisioning],
            target: &[ResourceState::Active],
            timeout: Duration::from_secs(2),
            delay: Duration::from_millis(10),
            min_interval: Duration::from_millis(100),
        };
        let result = wait_for_state::<_, RefreshFailed, _, _>(&conf, || {
            async { Ok(((), ResourceState::Provisioning)) }
        })
        .await;
        match result {
            Err(WaitError::Timeout { elapsed, last_state }) => {
                assert!(elapsed >= conf.timeout);
                assert_eq!(last_state, ResourceState::Provisioning);
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_fails_fast_on_unexpected_state() {
        let start = tokio::time::Instant::now();
        let result = wait_for_state::<_, RefreshFailed, _, _>(
            &config(&[ResourceState::Creating], &[ResourceState::Active]),
            || async { Ok(("1h7", ResourceState::Error)) },
        )
        .await;
        match result {
            Err(WaitError::UnexpectedState { state, snapshot }) => {
                assert_eq!(state, ResourceState::Error);
                assert_eq!(snapshot, "1h7");
            }
            other => panic!("expected an unexpected-state error, got {:?}", other),
        }
        // The failure must not wait out the (10 second) timeout.
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_surfaces_refresh_errors_without_retrying() {
        let polls = AtomicUsize::new(0);
        let result = wait_for_state(
            &config(&[ResourceState::Creating], &[ResourceState::Active]),
            || {
                polls.fetch_add(1, Ordering::SeqCst);
                async { Err::<((), ResourceState), _>(RefreshFailed) }
            },
        )
        .await;
        assert!(matches!(result, Err(WaitError::Refresh(RefreshFailed))));
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }
}
