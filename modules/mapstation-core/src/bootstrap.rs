// Startup loading: geometry and the capital list are fetched once, then
// treated as read-only process-wide state injected into consumers.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use mapstation_atlas::WorldAtlas;
use mapstation_common::{ActiveView, Config};

use crate::facts::FactProvider;
use crate::quiz::{QuizEngine, QuizKind};
use crate::router::ViewRouter;
use crate::selection::SelectionController;

/// Everything the interaction layer needs, wired once at startup.
pub struct AppContext {
    pub atlas: Arc<WorldAtlas>,
    pub selection: Arc<SelectionController>,
    pub router: ViewRouter,
    pub capital_quiz: QuizEngine,
    pub flag_quiz: QuizEngine,
}

impl AppContext {
    /// Load geometry and the capital list, then assemble controllers.
    ///
    /// Both loads degrade rather than fail: a missing atlas renders an
    /// empty map, a missing capital list leaves the capital quiz unable to
    /// build questions. Only configuration errors abort startup, earlier.
    pub async fn load(config: &Config, provider: Arc<dyn FactProvider>) -> Self {
        let (atlas_result, capitals_result) = tokio::join!(
            WorldAtlas::fetch(&config.atlas_url),
            provider.capital_list(),
        );

        let atlas = match atlas_result {
            Ok(atlas) => Arc::new(atlas),
            Err(e) => {
                warn!(error = %e, "could not load map data; map will render empty");
                Arc::new(WorldAtlas::empty())
            }
        };

        let capitals = match capitals_result {
            Ok(Some(capitals)) if !capitals.is_empty() => {
                info!(count = capitals.len(), "capital list loaded");
                capitals
            }
            Ok(_) => {
                warn!("capital list unavailable; capital quiz cannot build questions");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "could not load capital list; capital quiz cannot build questions");
                Vec::new()
            }
        };

        Self::assemble(provider, atlas, capitals)
    }

    /// Wire controllers from already-loaded data. Tests use this with
    /// fixture atlases and scripted providers.
    pub fn assemble(
        provider: Arc<dyn FactProvider>,
        atlas: Arc<WorldAtlas>,
        capitals: Vec<String>,
    ) -> Self {
        let active_view = Arc::new(RwLock::new(ActiveView::Info));
        let selection = Arc::new(SelectionController::new(
            provider.clone(),
            active_view.clone(),
        ));
        let router = ViewRouter::new(active_view, selection.clone());
        let capital_quiz = QuizEngine::capital(provider.clone(), atlas.clone(), capitals);
        let flag_quiz = QuizEngine::flag(provider, atlas.clone());

        Self {
            atlas,
            selection,
            router,
            capital_quiz,
            flag_quiz,
        }
    }

    pub fn quiz(&self, kind: QuizKind) -> &QuizEngine {
        match kind {
            QuizKind::Capital => &self.capital_quiz,
            QuizKind::Flag => &self.flag_quiz,
        }
    }
}
