use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use mapstation_common::ActiveView;

use crate::selection::SelectionController;

/// Switches between the three mutually exclusive right-hand panels.
///
/// Every switch clears the selection state, even when re-selecting the
/// current view. Quiz sessions live with the engine instances, not here:
/// switching away and back does not reset them.
pub struct ViewRouter {
    active: Arc<RwLock<ActiveView>>,
    selection: Arc<SelectionController>,
}

impl ViewRouter {
    pub fn new(active: Arc<RwLock<ActiveView>>, selection: Arc<SelectionController>) -> Self {
        Self { active, selection }
    }

    pub async fn set_view(&self, view: ActiveView) {
        debug!(%view, "switching view");
        *self.active.write().await = view;
        self.selection.clear().await;
    }

    pub async fn active(&self) -> ActiveView {
        *self.active.read().await
    }
}
