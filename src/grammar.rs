use crate::digram::{DigramCheck, DigramKey};
use crate::error::{GrammarError, Result};
use crate::id_gen::IdGenerator;
use crate::rule::{Rule, TOP_RULE};
use crate::symbol::{Symbol, SymbolNode};
use ahash::AHashMap as HashMap;
use log::trace;
use slotmap::{DefaultKey, SlotMap};
use std::hash::Hash;

/// Storage for one construction run.
///
/// Every symbol of every rule lives in `symbols`; rules own their lists only
/// through their guard key. The digram index belongs to this run alone.
#[derive(Debug)]
pub(crate) struct Grammar<T> {
    pub symbols: SlotMap<DefaultKey, SymbolNode<T>>,
    pub digram_index: HashMap<DigramKey<T>, DefaultKey>,
    pub rules: HashMap<u32, Rule>,
    pub id_gen: IdGenerator,
}

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Creates a grammar holding only the empty top-level rule.
    pub(crate) fn new() -> Self {
        let mut grammar = Self {
            symbols: SlotMap::new(),
            digram_index: HashMap::default(),
            rules: HashMap::default(),
            id_gen: IdGenerator::new(),
        };
        let top = grammar.new_rule();
        debug_assert_eq!(top, TOP_RULE);
        grammar
    }

    // ========================================================================
    // Link primitives
    // ========================================================================

    pub(crate) fn node(&self, key: DefaultKey) -> Result<&SymbolNode<T>> {
        self.symbols
            .get(key)
            .ok_or_else(|| GrammarError::invariant("link to a removed symbol"))
    }

    fn node_mut(&mut self, key: DefaultKey) -> Result<&mut SymbolNode<T>> {
        self.symbols
            .get_mut(key)
            .ok_or_else(|| GrammarError::invariant("link to a removed symbol"))
    }

    pub(crate) fn next_of(&self, key: DefaultKey) -> Result<DefaultKey> {
        self.symbols
            .get(key)
            .and_then(|node| node.next)
            .ok_or_else(|| GrammarError::invariant("symbol has no successor"))
    }

    pub(crate) fn prev_of(&self, key: DefaultKey) -> Result<DefaultKey> {
        self.symbols
            .get(key)
            .and_then(|node| node.prev)
            .ok_or_else(|| GrammarError::invariant("symbol has no predecessor"))
    }

    /// Links `left` to `right`, dropping the digram `left` used to start.
    pub(crate) fn join(&mut self, left: DefaultKey, right: DefaultKey) -> Result<()> {
        if self.node(left)?.next.is_some() {
            self.delete_digram(left)?;

            // In a run like `a a a` only one of the two overlapping digrams is
            // indexed. When the run is broken, index the pair that survives.
            if self.is_run_centre(right) {
                self.register(right)?;
            }
            if self.is_run_centre(left) {
                let prev = self.prev_of(left)?;
                self.register(prev)?;
            }
        }
        self.node_mut(right)?.prev = Some(left);
        self.node_mut(left)?.next = Some(right);
        Ok(())
    }

    /// Splices the unlinked `node` in right after `after`.
    pub(crate) fn insert_after(&mut self, after: DefaultKey, node: DefaultKey) -> Result<()> {
        let next = self.next_of(after)?;
        self.join(node, next)?;
        self.join(after, node)
    }

    /// Unlinks `key` from its list and releases what it holds: its digram,
    /// and for a non-terminal one use of the referenced rule.
    ///
    /// The node itself stays in the arena until the caller removes it.
    pub(crate) fn clean_up(&mut self, key: DefaultKey) -> Result<()> {
        let prev = self.prev_of(key)?;
        let next = self.next_of(key)?;
        self.join(prev, next)?;

        let referenced = match &self.node(key)?.symbol {
            Symbol::Guard { .. } => return Ok(()),
            Symbol::Terminal(_) => None,
            Symbol::NonTerminal { rule_id } => Some(*rule_id),
        };
        self.delete_digram(key)?;
        if let Some(rule_id) = referenced {
            self.decrement_count(rule_id)?;
        }
        Ok(())
    }

    fn is_run_centre(&self, key: DefaultKey) -> bool {
        let Some(node) = self.symbols.get(key) else {
            return false;
        };
        let (Some(prev), Some(next)) = (node.prev, node.next) else {
            return false;
        };
        match (self.symbols.get(prev), self.symbols.get(next)) {
            (Some(p), Some(n)) => node.symbol.equals(&p.symbol) && node.symbol.equals(&n.symbol),
            _ => false,
        }
    }

    fn register(&mut self, first: DefaultKey) -> Result<()> {
        if let Some(digram) = self.digram_key(first)? {
            self.digram_index.insert(digram, first);
        }
        Ok(())
    }

    // ========================================================================
    // Engine
    // ========================================================================

    /// Appends a terminal to the top-level rule and restores both grammar
    /// constraints before returning.
    pub(crate) fn append(&mut self, value: T) -> Result<()> {
        let guard = self.rule(TOP_RULE)?.guard;
        let last = self.prev_of(guard)?;
        let key = self.symbols.insert(SymbolNode::new(Symbol::Terminal(value)));
        self.insert_after(last, key)?;
        self.check(last)?;
        Ok(())
    }

    /// Resolves the repeated digram `new_digram` against the earlier
    /// occurrence `matching`.
    ///
    /// If `matching` is the entire body of a rule that rule is reused;
    /// otherwise a new rule replaces both occurrences and its body becomes the
    /// indexed occurrence of the digram. Afterwards the rule's
    /// body is checked for references to rules that are now used only once.
    pub(crate) fn match_digram(
        &mut self,
        new_digram: DefaultKey,
        matching: DefaultKey,
    ) -> Result<()> {
        let rule_id = match self.whole_rule(matching)? {
            Some(rule_id) => {
                trace!("reusing rule {rule_id}");
                self.substitute(new_digram, rule_id)?;
                rule_id
            }
            None => {
                let (rule_id, copy) = self.rule_from_digram(new_digram)?;
                self.substitute(matching, rule_id)?;
                self.substitute(new_digram, rule_id)?;
                self.register_copy(copy)?;
                rule_id
            }
        };
        self.expand_if_underused(rule_id)
    }

    /// The rule whose body is exactly the digram starting at `first`.
    fn whole_rule(&self, first: DefaultKey) -> Result<Option<u32>> {
        let before = self.prev_of(first)?;
        let after = self.next_of(self.next_of(first)?)?;
        match (&self.node(before)?.symbol, &self.node(after)?.symbol) {
            (Symbol::Guard { rule_id: a }, Symbol::Guard { rule_id: b }) if a == b => {
                Ok(Some(*a).filter(|&id| id != TOP_RULE))
            }
            (Symbol::Guard { .. }, Symbol::Guard { .. }) => Err(GrammarError::invariant(
                "digram is bounded by guards of two different rules",
            )),
            _ => Ok(None),
        }
    }

    /// Replaces the digram starting at `first` with a non-terminal for
    /// `rule_id` and checks the two adjacencies around it.
    ///
    /// The right-hand adjacency is checked unless the left-hand check already
    /// rewrote the neighbourhood.
    pub(crate) fn substitute(&mut self, first: DefaultKey, rule_id: u32) -> Result<()> {
        let prev = self.prev_of(first)?;
        let second = self.next_of(first)?;
        if self.node(second)?.symbol.is_guard() {
            return Err(GrammarError::invariant("substituted digram ends at a guard"));
        }

        self.clean_up(first)?;
        self.clean_up(second)?;
        self.symbols.remove(first);
        self.symbols.remove(second);

        let non_terminal = self.new_non_terminal(rule_id)?;
        self.insert_after(prev, non_terminal)?;
        if self.check(prev)? != DigramCheck::Matched {
            self.check(non_terminal)?;
        }
        Ok(())
    }

    /// Symbols in all rule bodies, guards excluded.
    pub(crate) fn symbol_count(&self) -> usize {
        self.symbols.len() - self.rules.len()
    }
}
