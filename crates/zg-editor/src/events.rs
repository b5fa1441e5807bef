//! Typed publish/subscribe for editor notifications.
//!
//! Dispatch is synchronous and in registration order. Handlers only see
//! the event, never the editor, so a handler cannot mutate the scene while
//! a transaction's notifications are still going out. A handler that
//! wants a follow-up edit queues it and applies it afterwards.

use crate::input::KeyPress;
use crate::modes::StateId;
use std::collections::HashMap;
use zg_core::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    SelectionChanged,
    HoverChanged,
    HistoryChanged,
    KeyDown,
    PageChanged,
    StateChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SelectionChanged { selected: Vec<NodeId> },
    HoverChanged { hovered: Option<NodeId> },
    HistoryChanged { can_undo: bool, can_redo: bool },
    KeyDown(KeyPress),
    PageChanged { page: NodeId },
    StateChanged { from: StateId, to: StateId },
}

impl EditorEvent {
    pub fn channel(&self) -> Channel {
        match self {
            EditorEvent::SelectionChanged { .. } => Channel::SelectionChanged,
            EditorEvent::HoverChanged { .. } => Channel::HoverChanged,
            EditorEvent::HistoryChanged { .. } => Channel::HistoryChanged,
            EditorEvent::KeyDown(_) => Channel::KeyDown,
            EditorEvent::PageChanged { .. } => Channel::PageChanged,
            EditorEvent::StateChanged { .. } => Channel::StateChanged,
        }
    }
}

pub type Handler = Box<dyn FnMut(&EditorEvent)>;

/// Returned by `on`; pass it to `off` to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventManager {
    next_id: u64,
    subscribers: HashMap<Channel, Vec<(SubscriptionId, Handler)>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, channel: Channel, handler: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers
            .entry(channel)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Unsubscribe. Returns false (and does nothing) if `id` is not
    /// registered on `channel`.
    pub fn off(&mut self, channel: Channel, id: SubscriptionId) -> bool {
        let Some(handlers) = self.subscribers.get_mut(&channel) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    pub fn emit(&mut self, event: &EditorEvent) {
        if let Some(handlers) = self.subscribers.get_mut(&event.channel()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.subscribers.get(&channel).map_or(0, Vec::len)
    }
}
