use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::symbol::{Symbol, SymbolNode};
use log::trace;
use slotmap::DefaultKey;
use std::hash::Hash;

/// Id of the top-level rule. It is never referenced and never inlined.
pub(crate) const TOP_RULE: u32 = 0;

/// A rule: the guard of its circular production list plus a usage count.
///
/// `count` is the number of non-terminals, anywhere in the grammar, that
/// reference this rule.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Rule {
    pub guard: DefaultKey,
    pub count: u32,
}

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Allocates an empty rule: a guard linked to itself.
    pub(crate) fn new_rule(&mut self) -> u32 {
        let rule_id = self.id_gen.get();
        let guard = self.symbols.insert_with_key(|key| SymbolNode {
            symbol: Symbol::Guard { rule_id },
            prev: Some(key),
            next: Some(key),
        });
        self.rules.insert(rule_id, Rule { guard, count: 0 });
        rule_id
    }

    pub(crate) fn rule(&self, rule_id: u32) -> Result<&Rule> {
        self.rules
            .get(&rule_id)
            .ok_or_else(|| GrammarError::invariant(format!("rule {rule_id} does not exist")))
    }

    /// Creates a rule whose body is a copy of the digram starting at `first`.
    ///
    /// Returns the rule id and the first symbol of the copy. The copy is not
    /// indexed yet: the occurrences it replaces still hold the index entry.
    pub(crate) fn rule_from_digram(&mut self, first: DefaultKey) -> Result<(u32, DefaultKey)> {
        let second = self.next_of(first)?;
        let first_symbol = self.node(first)?.symbol.clone();
        let second_symbol = self.node(second)?.symbol.clone();
        if first_symbol.is_guard() || second_symbol.is_guard() {
            return Err(GrammarError::invariant("cannot copy a guard into a rule body"));
        }

        let rule_id = self.new_rule();
        let guard = self.rule(rule_id)?.guard;

        let copy_first = self.symbols.insert(SymbolNode::new(first_symbol));
        let copy_second = self.symbols.insert(SymbolNode::new(second_symbol));
        self.join(guard, copy_first)?;
        self.join(copy_first, copy_second)?;
        self.join(copy_second, guard)?;

        self.increment_if_non_terminal(copy_first)?;
        self.increment_if_non_terminal(copy_second)?;

        trace!("created rule {rule_id}");
        Ok((rule_id, copy_first))
    }

    /// Inserts an unlinked non-terminal for `rule_id`, counting the reference.
    pub(crate) fn new_non_terminal(&mut self, rule_id: u32) -> Result<DefaultKey> {
        self.increment_count(rule_id)?;
        Ok(self
            .symbols
            .insert(SymbolNode::new(Symbol::NonTerminal { rule_id })))
    }

    fn increment_if_non_terminal(&mut self, key: DefaultKey) -> Result<()> {
        match self.node(key)?.symbol.referenced_rule() {
            Some(rule_id) => self.increment_count(rule_id),
            None => Ok(()),
        }
    }

    fn increment_count(&mut self, rule_id: u32) -> Result<()> {
        let rule = self.rules.get_mut(&rule_id).ok_or_else(|| {
            GrammarError::invariant(format!("reference to missing rule {rule_id}"))
        })?;
        rule.count += 1;
        Ok(())
    }

    pub(crate) fn decrement_count(&mut self, rule_id: u32) -> Result<()> {
        let rule = self.rules.get_mut(&rule_id).ok_or_else(|| {
            GrammarError::invariant(format!("reference to missing rule {rule_id}"))
        })?;
        rule.count = rule.count.checked_sub(1).ok_or_else(|| {
            GrammarError::invariant(format!("usage count of rule {rule_id} went below zero"))
        })?;
        Ok(())
    }

    /// Inlines any rule referenced from the ends of `rule_id`'s body that is
    /// now used only once.
    ///
    /// Either rule may have disappeared during an earlier cascade; that is
    /// not an error.
    pub(crate) fn expand_if_underused(&mut self, rule_id: u32) -> Result<()> {
        let Some(rule) = self.rules.get(&rule_id) else {
            return Ok(());
        };
        let first = self.next_of(rule.guard)?;
        self.expand_symbol_if_underused(first)?;

        let Some(rule) = self.rules.get(&rule_id) else {
            return Ok(());
        };
        let last = self.prev_of(rule.guard)?;
        self.expand_symbol_if_underused(last)
    }

    fn expand_symbol_if_underused(&mut self, key: DefaultKey) -> Result<()> {
        let Some(target) = self.node(key)?.symbol.referenced_rule() else {
            return Ok(());
        };
        match self.rule(target)?.count {
            0 => Err(GrammarError::invariant(format!(
                "rule {target} is referenced but has a zero count"
            ))),
            1 => self.expand(key),
            _ => Ok(()),
        }
    }

    /// Replaces the non-terminal at `key` with the body of the rule it
    /// references and discards that rule.
    ///
    /// The two adjacencies created by the splice are checked afterwards.
    pub(crate) fn expand(&mut self, key: DefaultKey) -> Result<()> {
        let rule_id = self
            .node(key)?
            .symbol
            .referenced_rule()
            .ok_or_else(|| GrammarError::invariant("only non-terminals can be expanded"))?;
        if rule_id == TOP_RULE {
            return Err(GrammarError::invariant("the top-level rule cannot be expanded"));
        }
        let guard = self.rule(rule_id)?.guard;

        let left = self.prev_of(key)?;
        let right = self.next_of(key)?;
        let first = self.next_of(guard)?;
        let last = self.prev_of(guard)?;
        if first == guard {
            return Err(GrammarError::invariant(format!("rule {rule_id} has an empty body")));
        }

        self.delete_digram(key)?;
        self.join(left, first)?;
        self.join(last, right)?;

        self.symbols.remove(key);
        self.symbols.remove(guard);
        self.rules.remove(&rule_id);
        self.id_gen.free(rule_id)?;
        trace!("inlined rule {rule_id}");

        if self.symbols.contains_key(last) {
            self.check(last)?;
        }
        if self.symbols.contains_key(left) {
            self.check(left)?;
        }
        Ok(())
    }

    /// Walks a rule body from first to last symbol.
    pub(crate) fn body(&self, rule_id: u32) -> Result<Vec<DefaultKey>> {
        let guard = self.rule(rule_id)?.guard;
        let mut keys = Vec::new();
        let mut current = self.next_of(guard)?;
        while current != guard {
            keys.push(current);
            current = self.next_of(current)?;
            if keys.len() > self.symbols.len() {
                return Err(GrammarError::invariant(format!(
                    "rule {rule_id} is not closed by its guard"
                )));
            }
        }
        Ok(keys)
    }
}
