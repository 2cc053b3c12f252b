use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

use super::commands::{Command, CommandOutcome, OrderCommand};
use crate::config::ShopConfig;
use crate::metrics::Metrics;

// ============================================================================
// Order Invoker - bounded command history with undo/redo
// ============================================================================
//
// History holds every executed command, failed ones included. `applied` is
// the number of commands currently in effect: the cursor sits on
// `history[applied - 1]`, and everything after it is the redo tail.
// Executing a new command discards the redo tail; exceeding the cap drops
// the oldest entry.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InvokerError {
    #[error("Max history size must be greater than 0")]
    InvalidHistorySize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub can_undo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvokerStats {
    pub total_commands: usize,
    pub current_position: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
    /// History entries that still hold undo state
    pub undoable_commands: usize,
    pub max_history_size: usize,
}

pub struct OrderInvoker {
    history: VecDeque<OrderCommand>,
    applied: usize,
    max_history_size: usize,
    metrics: Option<Arc<Metrics>>,
}

impl OrderInvoker {
    pub fn new(max_history_size: usize) -> Result<Self, InvokerError> {
        if max_history_size == 0 {
            return Err(InvokerError::InvalidHistorySize);
        }

        Ok(Self {
            history: VecDeque::new(),
            applied: 0,
            max_history_size,
            metrics: None,
        })
    }

    pub fn from_config(config: &ShopConfig) -> Result<Self, InvokerError> {
        Self::new(config.max_history_size)
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn publish_size(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.set_history_size(self.history.len());
        }
    }

    /// Execute and record. The command is kept even when it fails.
    pub fn execute_command(&mut self, mut command: OrderCommand) -> CommandOutcome {
        let outcome = command.execute();

        tracing::debug!(
            command_id = %command.command_id(),
            command = command.kind(),
            success = outcome.is_success(),
            "Command executed"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_command(command.kind(), outcome.is_success());
        }

        self.history.truncate(self.applied);
        self.history.push_back(command);
        self.applied += 1;

        if self.history.len() > self.max_history_size {
            self.history.pop_front();
            self.applied -= 1;
        }

        self.publish_size();
        outcome
    }

    pub fn execute_commands(
        &mut self,
        commands: impl IntoIterator<Item = OrderCommand>,
    ) -> Vec<CommandOutcome> {
        commands
            .into_iter()
            .map(|command| self.execute_command(command))
            .collect()
    }

    /// Undo the command at the cursor.
    ///
    /// A no-op when that command has nothing to undo: the cursor stays put,
    /// so older commands are never reached past it. A failed undo also
    /// leaves the cursor where it was.
    pub fn undo(&mut self) -> CommandOutcome {
        if !self.can_undo() {
            if let Some(metrics) = &self.metrics {
                metrics.record_history_operation("undo", false);
            }
            return CommandOutcome::failure("Nothing to undo");
        }

        let index = self.applied - 1;
        let outcome = match self.history.get_mut(index) {
            Some(command) => command.undo(),
            None => return CommandOutcome::failure("Nothing to undo"),
        };

        if outcome.is_success() {
            self.applied = index;
        } else {
            tracing::warn!(message = %outcome, "Undo did not apply");
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_history_operation("undo", outcome.is_success());
        }
        outcome
    }

    /// Re-execute the command after the cursor from its original arguments
    pub fn redo(&mut self) -> CommandOutcome {
        let Some(command) = self.history.get_mut(self.applied) else {
            if let Some(metrics) = &self.metrics {
                metrics.record_history_operation("redo", false);
            }
            return CommandOutcome::failure("Nothing to redo");
        };

        let outcome = command.execute();
        self.applied += 1;

        if let Some(metrics) = &self.metrics {
            metrics.record_history_operation("redo", outcome.is_success());
        }
        outcome
    }

    /// True when the command at the cursor still holds undo state
    pub fn can_undo(&self) -> bool {
        self.current_command().is_some_and(|command| command.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.history.len()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .map(|command| HistoryEntry {
                description: command.description(),
                timestamp: command.timestamp(),
                can_undo: command.can_undo(),
            })
            .collect()
    }

    /// Command at the cursor
    pub fn current_command(&self) -> Option<&OrderCommand> {
        self.current_position().and_then(|index| self.history.get(index))
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// Zero-based cursor, `None` when nothing is applied
    pub fn current_position(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    pub fn stats(&self) -> InvokerStats {
        InvokerStats {
            total_commands: self.history.len(),
            current_position: self.current_position(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undoable_commands: self.history.iter().filter(|c| c.can_undo()).count(),
            max_history_size: self.max_history_size,
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.applied = 0;
        self.publish_size();
        tracing::info!("Command history cleared");
    }

    pub fn display_history(&self) -> String {
        if self.history.is_empty() {
            return "No command history".to_string();
        }

        let cursor = self.current_position();
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

        let mut lines = vec!["Command History:".to_string()];
        lines.extend(self.history.iter().enumerate().map(|(index, command)| {
            format!(
                "{} [{}] {} | {} | Undo: {}",
                if Some(index) == cursor { "→" } else { " " },
                index + 1,
                command.timestamp().format("%H:%M:%S"),
                command.description(),
                if command.can_undo() { "✓" } else { "✗" }
            )
        }));
        lines.push(String::new());
        lines.push(format!("Current Position: {}/{}", self.applied, self.history.len()));
        lines.push(format!(
            "Can Undo: {} | Can Redo: {}",
            yes_no(self.can_undo()),
            yes_no(self.can_redo())
        ));

        lines.join("\n")
    }
}
