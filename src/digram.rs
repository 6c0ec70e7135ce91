use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::symbol::SymbolValue;
use slotmap::DefaultKey;
use std::collections::hash_map::Entry;
use std::hash::Hash;

/// Index key of a digram: the values of two adjacent symbols.
///
/// Two occurrences with equal values hash and compare equal regardless of
/// which nodes hold them.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) struct DigramKey<T> {
    pub first: SymbolValue<T>,
    pub second: SymbolValue<T>,
}

/// Outcome of [`Grammar::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DigramCheck {
    /// The symbol is, or is followed by, a guard.
    NoDigram,
    /// First occurrence; now registered.
    Registered,
    /// Registered to this adjacency already, or to one overlapping it.
    Present,
    /// A second occurrence was found and factored into a rule.
    Matched,
}

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Key of the digram starting at `first`, or `None` at a rule boundary.
    pub(crate) fn digram_key(&self, first: DefaultKey) -> Result<Option<DigramKey<T>>> {
        let node = self.node(first)?;
        if node.symbol.is_guard() {
            return Ok(None);
        }
        let next = node
            .next
            .ok_or_else(|| GrammarError::invariant("digram start has no successor"))?;
        let (Some(first), Some(second)) = (node.symbol.value(), self.node(next)?.symbol.value())
        else {
            return Ok(None);
        };
        Ok(Some(DigramKey { first, second }))
    }

    /// Removes the digram starting at `first` from the index, but only if the
    /// index holds this very occurrence.
    pub(crate) fn delete_digram(&mut self, first: DefaultKey) -> Result<()> {
        let Some(digram) = self.digram_key(first)? else {
            return Ok(());
        };
        if let Entry::Occupied(e) = self.digram_index.entry(digram) {
            if *e.get() == first {
                e.remove();
            }
        }
        Ok(())
    }

    /// Records the digram starting at `first`, or resolves it against an
    /// earlier occurrence.
    pub(crate) fn check(&mut self, first: DefaultKey) -> Result<DigramCheck> {
        let Some(digram) = self.digram_key(first)? else {
            return Ok(DigramCheck::NoDigram);
        };
        let found = match self.digram_index.entry(digram) {
            Entry::Vacant(e) => {
                e.insert(first);
                return Ok(DigramCheck::Registered);
            }
            Entry::Occupied(e) => *e.get(),
        };
        if found == first {
            return Ok(DigramCheck::Present);
        }
        if !self.symbols.contains_key(found) {
            return Err(GrammarError::invariant(
                "digram index refers to a removed symbol",
            ));
        }

        // Overlapping occurrences (`a a a`) cannot both be replaced.
        let found_next = self.next_of(found)?;
        let first_next = self.next_of(first)?;
        if found_next == first || first_next == found {
            return Ok(DigramCheck::Present);
        }
        if !self.same_digram(first, found)? {
            return Err(GrammarError::invariant(
                "digram index entry disagrees with list adjacency",
            ));
        }

        self.match_digram(first, found)?;
        Ok(DigramCheck::Matched)
    }

    /// Makes the copied body of a new rule the indexed occurrence of its
    /// digram, once the occurrences it replaced are gone.
    ///
    /// If a cascade has meanwhile indexed the same digram elsewhere, that
    /// occurrence is resolved against the new rule.
    pub(crate) fn register_copy(&mut self, copy: DefaultKey) -> Result<()> {
        if !self.symbols.contains_key(copy) {
            return Ok(());
        }
        let Some(digram) = self.digram_key(copy)? else {
            return Ok(());
        };
        let other = match self.digram_index.entry(digram) {
            Entry::Vacant(e) => {
                e.insert(copy);
                return Ok(());
            }
            Entry::Occupied(e) if *e.get() == copy => return Ok(()),
            Entry::Occupied(e) => *e.get(),
        };
        if !self.symbols.contains_key(other) {
            return Err(GrammarError::invariant(
                "digram index refers to a removed symbol",
            ));
        }
        self.match_digram(other, copy)
    }

    fn same_digram(&self, a: DefaultKey, b: DefaultKey) -> Result<bool> {
        let a_next = self.next_of(a)?;
        let b_next = self.next_of(b)?;
        Ok(self.node(a)?.symbol.equals(&self.node(b)?.symbol)
            && self.node(a_next)?.symbol.equals(&self.node(b_next)?.symbol))
    }
}
