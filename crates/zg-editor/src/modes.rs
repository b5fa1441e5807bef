//! Mode / state machine.
//!
//! A `Mode` owns a registry of interaction states, exactly one of which is
//! active. The `ModeManager` holds the modes; only the `Editor` mode exists
//! today. Transitions run the current state's `exit` hook and then the
//! target's `enter` hook. An unknown target is rejected up front and
//! nothing changes.

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::input::InputEvent;
use crate::selection::SelectionState;
use crate::tools::{CreateShapeState, SelectState};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use zg_core::{ChangeRecord, NodeId, NodeProps, NodeType, Scene};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateId(Cow<'static, str>);

impl StateId {
    pub const DEFAULT: StateId = StateId(Cow::Borrowed("default"));
    pub const CREATE_RECTANGLE: StateId = StateId(Cow::Borrowed("create-rectangle"));
    pub const CREATE_FRAME: StateId = StateId(Cow::Borrowed("create-frame"));

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view a state gets while handling input.
pub struct StateContext<'a> {
    pub scene: &'a Scene,
    pub selection: &'a SelectionState,
    pub config: &'a EditorConfig,
}

/// A node a state wants created once the gesture is confirmed.
#[derive(Debug, Clone)]
pub struct Creation {
    pub node_type: NodeType,
    pub parent: NodeId,
    pub props: NodeProps,
}

/// What a state asks the editor to do after handling one event.
///
/// `changes` and `create` together become one committed transaction.
#[derive(Debug, Default)]
pub struct ToolOutcome {
    pub changes: Vec<ChangeRecord>,
    /// The created node also becomes the selection.
    pub create: Option<Creation>,
    pub select: Option<Vec<NodeId>>,
    /// `Some(None)` clears the hover.
    pub hover: Option<Option<NodeId>>,
    pub next_state: Option<StateId>,
    /// The event was meaningful to the state, even if nothing changed.
    pub consumed: bool,
}

impl ToolOutcome {
    pub fn consumed() -> Self {
        Self {
            consumed: true,
            ..Self::default()
        }
    }

    pub fn ignored() -> Self {
        Self::default()
    }
}

/// Renderer-local feedback for an unconfirmed gesture. Never part of the
/// scene or the history.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Selected nodes dragged by an offset not yet committed.
    Move { ids: Vec<NodeId>, dx: f32, dy: f32 },
    /// Marquee rectangle in page space.
    Marquee(kurbo::Rect),
    /// Outline of a shape being dragged out.
    Shape {
        node_type: NodeType,
        rect: kurbo::Rect,
    },
}

/// One interaction state. Each state interprets pointer and keyboard
/// input on its own.
pub trait EditorState {
    fn id(&self) -> StateId;

    fn enter(&mut self) {}

    /// Drop any in-progress gesture.
    fn exit(&mut self) {}

    fn handle(&mut self, event: &InputEvent, ctx: &StateContext<'_>) -> ToolOutcome;

    fn preview(&self) -> Option<Preview> {
        None
    }
}

/// A named container of states with one active.
pub struct Mode {
    name: String,
    states: IndexMap<StateId, Box<dyn EditorState>>,
    home: StateId,
    current: StateId,
}

impl Mode {
    /// `home` is both the initial state and the fallback of
    /// `go_to_default_state`.
    pub fn new(name: impl Into<String>, mut home: Box<dyn EditorState>) -> Self {
        let id = home.id();
        home.enter();
        let mut states = IndexMap::new();
        states.insert(id.clone(), home);
        Self {
            name: name.into(),
            states,
            home: id.clone(),
            current: id,
        }
    }

    /// The `Editor` mode: select (default), create-rectangle, create-frame.
    pub fn editor() -> Self {
        let mut mode = Self::new("Editor", Box::new(SelectState::default()));
        mode.register(Box::new(CreateShapeState::new(
            StateId::CREATE_RECTANGLE,
            NodeType::Rectangle,
        )));
        mode.register(Box::new(CreateShapeState::new(
            StateId::CREATE_FRAME,
            NodeType::Frame,
        )));
        mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a state, replacing any state with the same id. Replacing the
    /// active state or the home state keeps it registered under that id.
    pub fn register(&mut self, state: Box<dyn EditorState>) {
        let id = state.id();
        let active = id == self.current;
        if let Some(mut old) = self.states.insert(id, state)
            && active
        {
            old.exit();
            if let Some(new) = self.states.get_mut(&self.current) {
                new.enter();
            }
        }
    }

    pub fn has_state(&self, id: &StateId) -> bool {
        self.states.contains_key(id)
    }

    pub fn state_ids(&self) -> impl Iterator<Item = &StateId> {
        self.states.keys()
    }

    pub fn current_state(&self) -> &StateId {
        &self.current
    }

    pub fn current(&self) -> Option<&dyn EditorState> {
        self.states.get(&self.current).map(|s| s.as_ref())
    }

    pub fn current_mut(&mut self) -> Option<&mut (dyn EditorState + 'static)> {
        self.states.get_mut(&self.current).map(|s| s.as_mut())
    }

    /// Exit the current state and enter `id`. Returns the previous state.
    pub fn change_state(&mut self, id: &StateId) -> Result<StateId, EditorError> {
        if !self.states.contains_key(id) {
            log::warn!("mode {}: no state `{id}`, staying in `{}`", self.name, self.current);
            return Err(EditorError::InvalidStateTransition { id: id.clone() });
        }
        if let Some(state) = self.states.get_mut(&self.current) {
            state.exit();
        }
        let previous = std::mem::replace(&mut self.current, id.clone());
        if let Some(state) = self.states.get_mut(&self.current) {
            state.enter();
        }
        log::debug!("mode {}: {previous} -> {id}", self.name);
        Ok(previous)
    }

    /// Return to the home state. Returns the previous state.
    pub fn go_to_default_state(&mut self) -> StateId {
        let home = self.home.clone();
        match self.change_state(&home) {
            Ok(previous) => previous,
            // the home state is registered at construction and can only
            // be replaced, never removed
            Err(_) => self.current.clone(),
        }
    }

    /// Exit the active state without leaving it, used when the owning
    /// mode is deactivated.
    fn suspend(&mut self) {
        if let Some(state) = self.states.get_mut(&self.current) {
            state.exit();
        }
    }

    fn resume(&mut self) {
        if let Some(state) = self.states.get_mut(&self.current) {
            state.enter();
        }
    }
}

/// Registry of named modes with one active.
pub struct ModeManager {
    modes: Vec<Mode>,
    current: usize,
}

impl ModeManager {
    pub fn new(initial: Mode) -> Self {
        Self {
            modes: vec![initial],
            current: 0,
        }
    }

    /// Add a mode, replacing one with the same name.
    pub fn register(&mut self, mode: Mode) {
        match self.modes.iter().position(|m| m.name == mode.name) {
            Some(i) if i == self.current => {
                self.modes[i].suspend();
                self.modes[i] = mode;
            }
            Some(i) => self.modes[i] = mode,
            None => self.modes.push(mode),
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.modes[self.current]
    }

    pub fn mode_mut(&mut self) -> &mut Mode {
        &mut self.modes[self.current]
    }

    pub fn mode_names(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(|m| m.name.as_str())
    }

    pub fn change_mode(&mut self, name: &str) -> Result<(), EditorError> {
        let Some(next) = self.modes.iter().position(|m| m.name == name) else {
            return Err(EditorError::UnknownMode(name.to_string()));
        };
        if next != self.current {
            self.modes[self.current].suspend();
            self.current = next;
            self.modes[self.current].resume();
            log::debug!("mode -> {name}");
        }
        Ok(())
    }
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new(Mode::editor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        id: StateId,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl EditorState for Probe {
        fn id(&self) -> StateId {
            self.id.clone()
        }

        fn enter(&mut self) {
            self.log.borrow_mut().push(format!("enter {}", self.id));
        }

        fn exit(&mut self) {
            self.log.borrow_mut().push(format!("exit {}", self.id));
        }

        fn handle(&mut self, _: &InputEvent, _: &StateContext<'_>) -> ToolOutcome {
            ToolOutcome::ignored()
        }
    }

    fn probe_mode() -> (Mode, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut mode = Mode::new(
            "Test",
            Box::new(Probe {
                id: StateId::DEFAULT,
                log: Rc::clone(&log),
            }),
        );
        mode.register(Box::new(Probe {
            id: StateId::new("draw"),
            log: Rc::clone(&log),
        }));
        log.borrow_mut().clear();
        (mode, log)
    }

    #[test]
    fn transition_runs_exit_then_enter() {
        let (mut mode, log) = probe_mode();
        let previous = mode.change_state(&StateId::new("draw")).unwrap();
        assert_eq!(previous, StateId::DEFAULT);
        assert_eq!(mode.current_state(), &StateId::new("draw"));
        assert_eq!(*log.borrow(), vec!["exit default", "enter draw"]);
    }

    #[test]
    fn unknown_state_leaves_current_untouched() {
        let (mut mode, log) = probe_mode();
        let err = mode.change_state(&StateId::new("lasso")).unwrap_err();
        assert_eq!(
            err,
            EditorError::InvalidStateTransition {
                id: StateId::new("lasso")
            }
        );
        assert_eq!(mode.current_state(), &StateId::DEFAULT);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn go_to_default_returns_home() {
        let (mut mode, _) = probe_mode();
        mode.change_state(&StateId::new("draw")).unwrap();
        assert_eq!(mode.go_to_default_state(), StateId::new("draw"));
        assert_eq!(mode.current_state(), &StateId::DEFAULT);
    }

    #[test]
    fn editor_mode_states() {
        let mode = Mode::editor();
        assert_eq!(mode.name(), "Editor");
        assert_eq!(mode.current_state(), &StateId::DEFAULT);
        assert!(mode.has_state(&StateId::CREATE_RECTANGLE));
        assert!(mode.has_state(&StateId::CREATE_FRAME));
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let mut modes = ModeManager::default();
        assert_eq!(
            modes.change_mode("Prototype"),
            Err(EditorError::UnknownMode("Prototype".into()))
        );
        assert_eq!(modes.mode().name(), "Editor");
        assert!(modes.change_mode("Editor").is_ok());
    }

    #[test]
    fn switching_modes_suspends_the_active_state() {
        let (mode, log) = probe_mode();
        let mut modes = ModeManager::default();
        modes.register(mode);
        modes.change_mode("Test").unwrap();
        assert_eq!(*log.borrow(), vec!["enter default"]);
        modes.change_mode("Editor").unwrap();
        assert_eq!(*log.borrow(), vec!["enter default", "exit default"]);
    }
}
