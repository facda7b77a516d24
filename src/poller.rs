use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::cookie::CookieBridge;
use crate::i18n::Language;
use crate::metrics::SyncMetrics;
use crate::page::Page;
use crate::timer;

/// Readiness of the widget as the poller has observed it.
///
/// The transition to `Ready` is monotonic: once the control has been seen,
/// later re-renders that briefly tear it out do not move the state back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// The live control has never been seen on this page.
    Uninitialized,
    /// The live control has been seen at least once.
    Ready,
}

struct PollerInner {
    state: PollerState,
    current: Language,
    cancelled: bool,
}

/// Inspection and cancellation handle for a running poller.
///
/// The loop stops at the next tick after `cancel()`; dropping the handle
/// cancels too, which ties the poller to its owning scope and rules out a
/// free-running timer surviving the UI that started it.
pub struct PollerHandle {
    inner: Rc<RefCell<PollerInner>>,
}

impl PollerHandle {
    pub fn state(&self) -> PollerState {
        self.inner.borrow().state
    }

    pub fn current_language(&self) -> Language {
        self.inner.borrow().current
    }

    pub fn cancel(&self) {
        self.inner.borrow_mut().cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.borrow().cancelled
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.inner.borrow_mut().cancelled = true;
    }
}

/// Periodic observer of the widget's select control.
///
/// Polls quickly while waiting for the widget to come up, then settles into
/// a slower cadence watching for drift between the language the UI believes
/// is active and the one the widget reports. The widget offers no outward
/// change event, so polling is the only portable observation.
pub struct StatePoller<P: Page> {
    page: P,
    config: Config,
    on_change: Option<Box<dyn Fn(Language)>>,
    inner: Rc<RefCell<PollerInner>>,
}

impl<P: Page> StatePoller<P> {
    /// Create a poller and the handle bound to it.
    ///
    /// Without an `on_change` callback the loop ends once the control has
    /// been seen (one-shot readiness detection); with one it keeps watching
    /// for drift until cancelled. The current language is seeded from the
    /// cookie-then-store read so the first observation can already count as
    /// drift.
    pub fn new(
        page: P,
        config: Config,
        on_change: Option<Box<dyn Fn(Language)>>,
    ) -> (Self, PollerHandle) {
        let current = CookieBridge::new(page.clone()).read();
        let inner = Rc::new(RefCell::new(PollerInner {
            state: PollerState::Uninitialized,
            current,
            cancelled: false,
        }));
        let handle = PollerHandle {
            inner: inner.clone(),
        };
        let poller = Self {
            page,
            config,
            on_change,
            inner,
        };
        (poller, handle)
    }

    /// Drive the poll loop until it completes or is cancelled.
    pub async fn run(self) {
        loop {
            if self.inner.borrow().cancelled {
                debug!("state poller cancelled");
                return;
            }

            self.tick();

            let state = self.inner.borrow().state;
            if state == PollerState::Ready && self.on_change.is_none() {
                debug!("state poller finished one-shot readiness watch");
                return;
            }

            let interval = match state {
                PollerState::Uninitialized => self.config.poll_interval_uninitialized,
                PollerState::Ready => self.config.poll_interval_ready,
            };
            timer::sleep(interval).await;
        }
    }

    /// One observation of the control.
    fn tick(&self) {
        let Some(value) = self.page.control_value() else {
            return;
        };

        {
            let mut inner = self.inner.borrow_mut();
            if inner.state == PollerState::Uninitialized {
                inner.state = PollerState::Ready;
                info!("translate control is ready");
            }
        }

        match Language::from_code(&value) {
            Ok(observed) => {
                let drifted = {
                    let mut inner = self.inner.borrow_mut();
                    if observed != inner.current {
                        inner.current = observed;
                        true
                    } else {
                        false
                    }
                };
                if drifted {
                    SyncMetrics::global().record_drift_event();
                    debug!("widget language drifted to '{}'", observed.code());
                    if let Some(on_change) = &self.on_change {
                        on_change(observed);
                    }
                }
            }
            Err(_) => warn!("widget control reports unsupported value '{}'", value),
        }
    }
}
