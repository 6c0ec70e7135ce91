//! Read-only snapshots of a grammar.

use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::rule::TOP_RULE;
use crate::symbol::Symbol;
use ahash::AHashMap as HashMap;
use std::hash::Hash;

/// One symbol of a rule's production in a [`GrammarView`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductionSymbol<T> {
    /// A literal input value.
    Terminal(T),
    /// A reference to the rule with this id in the same view.
    Rule(usize),
}

/// One rule of a [`GrammarView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleView<T> {
    /// Read-out id; 0 is the top-level rule.
    pub id: usize,
    /// Number of references to this rule. Always 0 for the top-level rule.
    pub count: u32,
    /// The rule's production, in order.
    pub production: Vec<ProductionSymbol<T>>,
}

/// A snapshot of the live rules of a grammar.
///
/// Ids are assigned when the view is taken: the top-level rule is 0 and the
/// remaining rules are numbered in the order their first reference is met
/// while scanning numbered rules left to right. Only rules reachable from the
/// top-level rule are included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarView<T> {
    rules: Vec<RuleView<T>>,
}

impl<T> GrammarView<T> {
    /// The top-level rule.
    pub fn top(&self) -> &RuleView<T> {
        &self.rules[0]
    }

    /// All rules, indexed by id.
    pub fn rules(&self) -> &[RuleView<T>] {
        &self.rules
    }

    pub fn rule(&self, id: usize) -> Option<&RuleView<T>> {
        self.rules.get(id)
    }

    /// Number of rules, including the top-level rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the top-level rule is empty.
    pub fn is_empty(&self) -> bool {
        self.rules[0].production.is_empty()
    }

    /// Total number of symbols over all productions.
    pub fn symbol_count(&self) -> usize {
        self.rules.iter().map(|rule| rule.production.len()).sum()
    }
}

impl<T: Clone> GrammarView<T> {
    /// Expands every rule reference, reproducing the input sequence.
    pub fn expand(&self) -> Vec<T> {
        let mut output = Vec::new();
        let mut stack = vec![(0usize, 0usize)];

        while let Some((rule, position)) = stack.pop() {
            let production = &self.rules[rule].production;
            let Some(symbol) = production.get(position) else {
                continue;
            };
            stack.push((rule, position + 1));
            match symbol {
                ProductionSymbol::Terminal(value) => output.push(value.clone()),
                ProductionSymbol::Rule(id) => stack.push((*id, 0)),
            }
        }
        output
    }
}

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Builds a read-only snapshot of the rules reachable from the top rule.
    pub(crate) fn view(&self) -> Result<GrammarView<T>> {
        let mut order = vec![TOP_RULE];
        let mut ids: HashMap<u32, usize> = HashMap::default();
        ids.insert(TOP_RULE, 0);

        let mut rules = Vec::new();
        let mut next = 0;
        while next < order.len() {
            let rule_id = order[next];
            next += 1;
            let mut production = Vec::new();
            for key in self.body(rule_id)? {
                let symbol = match &self.node(key)?.symbol {
                    Symbol::Terminal(value) => ProductionSymbol::Terminal(value.clone()),
                    Symbol::NonTerminal { rule_id: target } => {
                        let id = *ids.entry(*target).or_insert_with(|| {
                            order.push(*target);
                            order.len() - 1
                        });
                        ProductionSymbol::Rule(id)
                    }
                    Symbol::Guard { .. } => {
                        return Err(GrammarError::invariant("guard inside a rule body"));
                    }
                };
                production.push(symbol);
            }
            rules.push(RuleView {
                id: rules.len(),
                count: self.rule(rule_id)?.count,
                production,
            });
        }
        Ok(GrammarView { rules })
    }
}
