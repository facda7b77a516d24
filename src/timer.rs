//! Timer and task plumbing that compiles for both the browser and the host.
//!
//! The browser build rides on `gloo-timers` and `wasm-bindgen-futures`; the
//! native build (tests, tooling) uses tokio. Everything in the crate is
//! single-threaded either way, so spawned futures do not need `Send`.

use std::future::Future;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Spawn a future onto the current-thread executor.
///
/// On native targets the caller must be running inside a tokio `LocalSet`.
#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    tokio::task::spawn_local(future);
}
