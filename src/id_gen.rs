use crate::error::{GrammarError, Result};

/// Allocator for rule ids.
///
/// Freed ids are handed out again (most recently freed first), which keeps
/// ids dense over long runs where rules are created and inlined repeatedly.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    next: u32,
    freed: Vec<u32>,
}

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&mut self) -> u32 {
        match self.freed.pop() {
            Some(id) => id,
            None => {
                let id = self.next;
                self.next += 1;
                id
            }
        }
    }

    /// Returns `id` to the pool. Freeing an id that is not handed out would
    /// let two rules share it.
    pub(crate) fn free(&mut self, id: u32) -> Result<()> {
        if id >= self.next {
            return Err(GrammarError::invariant(format!(
                "freed rule id {id} was never allocated"
            )));
        }
        if self.freed.contains(&id) {
            return Err(GrammarError::invariant(format!("rule id {id} freed twice")));
        }
        self.freed.push(id);
        Ok(())
    }

    /// Number of ids currently handed out.
    pub(crate) fn live(&self) -> usize {
        self.next as usize - self.freed.len()
    }
}
