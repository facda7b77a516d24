use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use futures::channel::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::{Config, CALLBACK_NAME, CONTAINER_ID, SCRIPT_ID, SCRIPT_SRC};
use crate::dispatcher::{ControlDispatcher, DispatchError};
use crate::i18n::{Language, LanguageRegistry};
use crate::metrics::SyncMetrics;
use crate::page::{Page, WidgetSettings};
use crate::retry::with_retry_if;
use crate::store::PreferenceStore;
use crate::timer;

/// Brings the third-party widget into the page.
///
/// The loader owns the whole bootstrap dance: hidden container, global
/// completion callback, script injection, and the one deferred activation
/// that applies a returning visitor's saved preference.
pub struct WidgetLoader<P: Page> {
    page: P,
    config: Config,
}

/// Shared resolution slot. Whichever outcome fires first takes the sender;
/// the losing closure finds the slot empty and does nothing.
type OutcomeSlot = Rc<RefCell<Option<oneshot::Sender<bool>>>>;

fn resolve(slot: &OutcomeSlot, ready: bool) {
    if let Some(sender) = slot.borrow_mut().take() {
        let _ = sender.send(ready);
    }
}

impl<P: Page> WidgetLoader<P> {
    pub fn new(page: P, config: Config) -> Self {
        Self { page, config }
    }

    /// Load the widget, resolving `true` once its constructor has run.
    ///
    /// Resolves `false` when the script fails to load or the bootstrap
    /// throws; nothing is raised to the caller. Calling this again while
    /// the script element is already in the page resolves `true`
    /// immediately, whatever became of that earlier load: the element is
    /// the idempotency anchor, and recovering from a dead script means a
    /// reload, which removes it.
    pub async fn initialize(&self) -> bool {
        if self.page.element_exists(SCRIPT_ID) {
            debug!("widget script already present, skipping injection");
            return true;
        }

        match self.begin_bootstrap() {
            Ok(outcome) => outcome.await.unwrap_or(false),
            Err(wiring_error) => {
                error!("widget bootstrap wiring failed: {:#}", wiring_error);
                false
            }
        }
    }

    /// Synchronous part of the bootstrap: everything is in the page before
    /// this returns, which is what keeps concurrent `initialize` calls from
    /// double-injecting.
    fn begin_bootstrap(&self) -> Result<oneshot::Receiver<bool>> {
        self.page
            .mount_hidden_container(CONTAINER_ID)
            .context("mounting widget container")?;

        let (sender, receiver) = oneshot::channel();
        let slot: OutcomeSlot = Rc::new(RefCell::new(Some(sender)));

        let callback_slot = slot.clone();
        let callback_page = self.page.clone();
        let callback_config = self.config.clone();
        self.page
            .expose_init_callback(
                CALLBACK_NAME,
                Box::new(move || {
                    let ready = bootstrap_widget(&callback_page);
                    if ready {
                        schedule_initial_activation(callback_page.clone(), callback_config);
                    }
                    resolve(&callback_slot, ready);
                }),
            )
            .context("registering widget init callback")?;

        let error_slot = slot;
        self.page
            .inject_script(
                SCRIPT_ID,
                SCRIPT_SRC,
                Box::new(move || {
                    error!("widget script failed to load");
                    SyncMetrics::global().record_script_failure();
                    resolve(&error_slot, false);
                }),
            )
            .context("injecting widget script")?;

        Ok(receiver)
    }
}

/// Run the widget constructor. Called by the script's completion callback.
fn bootstrap_widget<P: Page>(page: &P) -> bool {
    let settings = WidgetSettings {
        page_language: Language::source().code(),
        included_languages: LanguageRegistry::get().included_languages(),
        container_id: CONTAINER_ID,
    };

    match page.install_widget(&settings) {
        Ok(()) => {
            info!("translate widget initialized");
            true
        }
        Err(bootstrap_error) => {
            error!("translate widget bootstrap failed: {}", bootstrap_error);
            false
        }
    }
}

/// Apply a returning visitor's saved preference once the widget settles.
///
/// The select control is rarely queryable in the tick the completion
/// callback fires, so the attempt waits out `activation_delay` and then
/// retries a bounded number of times, but only while the failure is the
/// control's absence.
fn schedule_initial_activation<P: Page>(page: P, config: Config) {
    let saved = PreferenceStore::new(page.clone()).get();
    if saved.is_source() {
        return;
    }

    debug!(
        "scheduling activation of saved language '{}' in {:?}",
        saved.code(),
        config.activation_delay
    );

    timer::spawn_local(async move {
        timer::sleep(config.activation_delay).await;

        let dispatcher = ControlDispatcher::new(page);
        let outcome = with_retry_if(
            &config.activation_retry,
            "initial language activation",
            || {
                let dispatcher = dispatcher.clone();
                async move { dispatcher.activate(saved) }
            },
            |e| matches!(e, DispatchError::ControlNotFound),
        )
        .await;

        match outcome {
            Ok(_) => debug!("initial activation settled on '{}'", saved.code()),
            Err(e) => warn!("initial activation gave up: {}", e),
        }
    });
}
