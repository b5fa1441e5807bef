pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod input;
pub mod modes;
pub mod selection;
pub mod shortcuts;
pub mod tools;

pub use config::{EditorConfig, ShortcutConfig, ZoomConfig};
pub use editor::Editor;
pub use engine::TransactionEngine;
pub use error::{ConfigError, EditorError};
pub use events::{Channel, EditorEvent, EventManager, SubscriptionId};
pub use history::History;
pub use input::{InputEvent, KeyPress, Modifiers};
pub use modes::{EditorState, Mode, ModeManager, Preview, StateContext, StateId, ToolOutcome};
pub use selection::SelectionState;
pub use shortcuts::{KeyCombo, ShortcutAction, ShortcutTable};
pub use tools::{CreateShapeState, SelectState};
