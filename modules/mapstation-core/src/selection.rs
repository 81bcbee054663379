// Selection controller: owns the info-panel state.
//
// A later select() logically supersedes an earlier one. Superseded fetches
// are never cancelled; they resolve and are discarded by the epoch check.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mapstation_common::{ActiveView, CountryFacts, Selection};

use crate::facts::FactProvider;

/// Snapshot of the info panel: the active selection, its fact sheet once
/// loaded, or a user-visible error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InfoState {
    pub selection: Option<Selection>,
    pub facts: Option<CountryFacts>,
    pub error: Option<String>,
    pub loading: bool,
}

#[derive(Default)]
struct Inner {
    info: InfoState,
    // Bumped on every select() and clear(). A fetch resolving under a
    // different epoch than it started with is stale and dropped.
    epoch: u64,
}

pub struct SelectionController {
    provider: Arc<dyn FactProvider>,
    active_view: Arc<RwLock<ActiveView>>,
    state: RwLock<Inner>,
}

impl SelectionController {
    pub fn new(provider: Arc<dyn FactProvider>, active_view: Arc<RwLock<ActiveView>>) -> Self {
        Self {
            provider,
            active_view,
            state: RwLock::new(Inner::default()),
        }
    }

    /// Handle a map click. No-op unless the info view is active; re-clicking
    /// the already-selected country is also a no-op.
    pub async fn select(&self, name: &str, id: &str) {
        if *self.active_view.read().await != ActiveView::Info {
            return;
        }

        let epoch = {
            let mut guard = self.state.write().await;
            if guard
                .info
                .selection
                .as_ref()
                .is_some_and(|current| current.id == id)
            {
                debug!(id, "country already selected");
                return;
            }
            guard.epoch += 1;
            guard.info = InfoState {
                selection: Some(Selection {
                    name: name.to_string(),
                    id: id.to_string(),
                }),
                facts: None,
                error: None,
                loading: true,
            };
            guard.epoch
        };

        let result = self.provider.country_facts(name).await;

        let mut guard = self.state.write().await;
        if guard.epoch != epoch {
            debug!(country = name, "discarding stale fact response");
            return;
        }
        guard.info.loading = false;
        match result {
            Ok(Some(facts)) => guard.info.facts = Some(facts),
            Ok(None) => guard.info.error = Some(lookup_failed(name)),
            Err(e) => {
                warn!(country = name, error = %e, "country fact fetch failed");
                guard.info.error = Some(lookup_failed(name));
            }
        }
    }

    /// Drop selection, facts, and error. Bumps the epoch so any fetch
    /// still in flight is discarded when it resolves.
    pub async fn clear(&self) {
        let mut guard = self.state.write().await;
        guard.epoch += 1;
        guard.info = InfoState::default();
    }

    pub async fn snapshot(&self) -> InfoState {
        self.state.read().await.info.clone()
    }
}

fn lookup_failed(name: &str) -> String {
    format!("Could not retrieve information for {name}.")
}
