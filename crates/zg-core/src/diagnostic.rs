//! Non-fatal findings reported while applying changes.
//!
//! A record that refers to a node which no longer exists does not abort
//! its transaction. It is recorded as skipped and surfaces here instead.

use crate::id::NodeId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something the caller asked for did not happen.
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The node this diagnostic refers to.
    pub node_id: NodeId,
    pub message: String,
    pub severity: Severity,
    /// Short rule identifier (e.g. "unknown-node", "stale-old-value").
    pub rule: &'static str,
}

impl Diagnostic {
    pub fn warning(node_id: NodeId, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            node_id,
            message: message.into(),
            severity: Severity::Warning,
            rule,
        }
    }

    pub fn info(node_id: NodeId, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            node_id,
            message: message.into(),
            severity: Severity::Info,
            rule,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{level}[{}] {}: {}", self.rule, self.node_id, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_rule_and_node() {
        let d = Diagnostic::warning(NodeId::intern("gone"), "unknown-node", "skipped delete");
        assert_eq!(d.to_string(), "warning[unknown-node] gone: skipped delete");
    }
}
