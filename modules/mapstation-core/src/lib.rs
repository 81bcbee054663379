pub mod bootstrap;
pub mod facts;
pub mod quiz;
pub mod router;
pub mod selection;

pub use bootstrap::AppContext;
pub use facts::{FactProvider, GeminiFactProvider, ScriptedFactProvider};
pub use quiz::{GameState, QuizEngine, QuizKind, QuizQuestion, QuizSession};
pub use router::ViewRouter;
pub use selection::{InfoState, SelectionController};
