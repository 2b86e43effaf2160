//! Thinking timeline
//!
//! Ordered view of the `thinking_step` events of one chat turn. Steps keep
//! the position of their first sighting; later updates replace them in
//! place.

use std::collections::HashMap;

use crate::models::ThinkingStep;

#[derive(Debug, Clone, Default)]
pub struct ThinkingTimeline {
    steps: Vec<ThinkingStep>,
    index: HashMap<String, usize>,
    thinking: bool,
}

impl ThinkingTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a step by id.
    ///
    /// Returns `true` when the id was not seen before.
    pub fn apply(&mut self, step: ThinkingStep) -> bool {
        match self.index.get(&step.id) {
            Some(&position) => {
                self.steps[position] = step;
                false
            }
            None => {
                self.index.insert(step.id.clone(), self.steps.len());
                self.steps.push(step);
                true
            }
        }
    }

    pub fn start(&mut self) {
        self.thinking = true;
    }

    pub fn end(&mut self) {
        self.thinking = false;
    }

    /// True between `thinking_start` and `thinking_end`.
    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Drop every step, ready for a new turn.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.index.clear();
        self.thinking = false;
    }

    pub fn steps(&self) -> &[ThinkingStep] {
        &self.steps
    }

    pub fn get(&self, id: &str) -> Option<&ThinkingStep> {
        self.index.get(id).map(|&position| &self.steps[position])
    }

    /// Direct children of `parent_id`, in timeline order.
    pub fn children_of(&self, parent_id: &str) -> Vec<&ThinkingStep> {
        self.steps
            .iter()
            .filter(|step| step.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// Steps without a parent, or whose parent never appeared.
    pub fn roots(&self) -> Vec<&ThinkingStep> {
        self.steps
            .iter()
            .filter(|step| match &step.parent_id {
                Some(parent) => !self.index.contains_key(parent),
                None => true,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of `duration_ms` over completed steps.
    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().filter_map(|step| step.duration_ms).sum()
    }
}
