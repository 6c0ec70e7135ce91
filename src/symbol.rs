use slotmap::DefaultKey;

/// Symbol kinds in a production body.
///
/// A closed set of variants over a common node; behaviour that differs per
/// kind (clean-up, guard tests) is a `match` on the tag.
#[derive(Debug, Clone)]
pub(crate) enum Symbol<T> {
    /// A literal value from the input.
    Terminal(T),

    /// A reference to another rule. Holds no ownership of the rule.
    NonTerminal { rule_id: u32 },

    /// Sentinel of a rule's circular list. Never part of a digram.
    Guard { rule_id: u32 },
}

impl<T> Symbol<T> {
    #[inline]
    pub(crate) fn is_guard(&self) -> bool {
        matches!(self, Symbol::Guard { .. })
    }

    /// Rule referenced by a non-terminal, if this is one.
    #[inline]
    pub(crate) fn referenced_rule(&self) -> Option<u32> {
        match self {
            Symbol::NonTerminal { rule_id } => Some(*rule_id),
            _ => None,
        }
    }
}

impl<T: Clone> Symbol<T> {
    /// Projects the symbol onto the value used in digram keys.
    ///
    /// Guards have no value and return `None`.
    pub(crate) fn value(&self) -> Option<SymbolValue<T>> {
        match self {
            Symbol::Terminal(v) => Some(SymbolValue::Terminal(v.clone())),
            Symbol::NonTerminal { rule_id } => Some(SymbolValue::Rule(*rule_id)),
            Symbol::Guard { .. } => None,
        }
    }
}

impl<T: PartialEq> Symbol<T> {
    /// Value equality as used for digrams. Guards are never equal.
    pub(crate) fn equals(&self, other: &Symbol<T>) -> bool {
        match (self, other) {
            (Symbol::Terminal(a), Symbol::Terminal(b)) => a == b,
            (Symbol::NonTerminal { rule_id: a }, Symbol::NonTerminal { rule_id: b }) => a == b,
            _ => false,
        }
    }
}

/// A node in one rule's circular doubly-linked list.
///
/// `prev` and `next` are arena keys; the rule's guard closes the circle.
/// Both are `None` only for a node that has not been linked yet.
#[derive(Debug)]
pub(crate) struct SymbolNode<T> {
    pub symbol: Symbol<T>,
    pub prev: Option<DefaultKey>,
    pub next: Option<DefaultKey>,
}

impl<T> SymbolNode<T> {
    pub(crate) fn new(symbol: Symbol<T>) -> Self {
        Self {
            symbol,
            prev: None,
            next: None,
        }
    }
}

/// The value half of a digram key.
///
/// Terminals and rule references live in disjoint spaces, so a terminal can
/// never be digram-equal to a rule reference.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) enum SymbolValue<T> {
    Terminal(T),
    Rule(u32),
}
