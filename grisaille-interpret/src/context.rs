use crate::state::GraphicsState;
use log::warn;

/// The graphics state stack of a single content stream scan.
pub(crate) struct Context {
    states: Vec<GraphicsState>,
}

impl Context {
    pub(crate) fn new(initial: GraphicsState) -> Self {
        Self {
            states: vec![initial],
        }
    }

    pub(crate) fn save_state(&mut self) {
        let Some(cur) = self.states.last().cloned() else {
            warn!("attempted to save state without existing state");
            return;
        };

        self.states.push(cur);
    }

    /// Pop the current state. Returns `false` if the stack would underflow.
    pub(crate) fn restore_state(&mut self) -> bool {
        if self.states.len() > 1 {
            self.states.pop();

            true
        } else {
            warn!("graphics state underflow in `Q`, ignoring it");

            false
        }
    }

    pub(crate) fn num_states(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn get(&self) -> &GraphicsState {
        // The initial state is never popped.
        &self.states[self.states.len() - 1]
    }

    pub(crate) fn get_mut(&mut self) -> &mut GraphicsState {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }
}
