use std::collections::{HashMap, VecDeque};

use crate::models::{ThoughtAcknowledgment, ThoughtData};

/// Default bound on the number of thoughts kept in history
pub const DEFAULT_MAX_HISTORY_SIZE: usize = 1000;

/// History and branch index for one reasoning session
#[derive(Debug, Default)]
pub struct ReasoningState {
    thought_history: VecDeque<ThoughtData>,
    branches: HashMap<String, Vec<ThoughtData>>,
    /// Branch ids in the order they were first referenced
    branch_order: Vec<String>,
}

/// Applies the accept/trim/branch algorithm to a `ReasoningState`.
///
/// The tracker does no locking of its own. Callers that share one tracker
/// across tasks must serialize `accept` calls themselves.
#[derive(Debug)]
pub struct ReasoningTracker {
    state: ReasoningState,
    max_history_size: usize,
}

impl ReasoningTracker {
    /// Create a tracker; a bound of zero falls back to the default
    pub fn new(max_history_size: usize) -> Self {
        let max_history_size = if max_history_size == 0 {
            DEFAULT_MAX_HISTORY_SIZE
        } else {
            max_history_size
        };
        Self {
            state: ReasoningState::default(),
            max_history_size,
        }
    }

    /// Record a validated thought and acknowledge it
    pub fn accept(&mut self, mut thought: ThoughtData) -> ThoughtAcknowledgment {
        if thought.total_thoughts < thought.thought_number {
            thought.total_thoughts = thought.thought_number;
        }

        if let Some(step) = &thought.current_step {
            thought
                .previous_steps
                .get_or_insert_with(Vec::new)
                .push(step.clone());
        }

        let mut ack = ThoughtAcknowledgment {
            thought_number: thought.thought_number,
            total_thoughts: thought.total_thoughts,
            next_thought_needed: thought.next_thought_needed,
            branches: Vec::new(),
            thought_history_length: 0,
            available_mcp_tools: thought.available_mcp_tools.clone(),
            current_step: thought.current_step.clone(),
            previous_steps: thought.previous_steps.clone(),
            remaining_steps: thought.remaining_steps.clone(),
        };

        match thought.branch_key().map(str::to_owned) {
            Some(branch_id) => {
                self.push_history(thought.clone());
                self.push_branch(branch_id, thought);
            }
            None => self.push_history(thought),
        }

        ack.branches = self.branch_ids();
        ack.thought_history_length = self.history_len();
        ack
    }

    fn push_history(&mut self, thought: ThoughtData) {
        self.state.thought_history.push_back(thought);
        if self.state.thought_history.len() > self.max_history_size {
            let excess = self.state.thought_history.len() - self.max_history_size;
            self.state.thought_history.drain(..excess);
            tracing::debug!("History trimmed to {} items", self.max_history_size);
        }
    }

    fn push_branch(&mut self, branch_id: String, thought: ThoughtData) {
        if !self.state.branches.contains_key(&branch_id) {
            tracing::debug!("Opening branch '{}'", branch_id);
            self.state.branch_order.push(branch_id.clone());
        }
        self.state.branches.entry(branch_id).or_default().push(thought);
    }

    /// Drop all history and branches
    pub fn clear_history(&mut self) {
        self.state = ReasoningState::default();
        tracing::info!("History cleared");
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = &ThoughtData> + '_ {
        self.state.thought_history.iter()
    }

    /// Most recently accepted thought, as stored
    pub fn latest(&self) -> Option<&ThoughtData> {
        self.state.thought_history.back()
    }

    pub fn history_len(&self) -> usize {
        self.state.thought_history.len()
    }

    pub fn branch(&self, branch_id: &str) -> Option<&[ThoughtData]> {
        self.state.branches.get(branch_id).map(Vec::as_slice)
    }

    pub fn branch_ids(&self) -> Vec<String> {
        self.state.branch_order.clone()
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }
}

impl Default for ReasoningTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_SIZE)
    }
}
