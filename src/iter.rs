use crate::rule::TOP_RULE;
use crate::sequitur::Sequitur;
use crate::symbol::Symbol;
use slotmap::DefaultKey;
use std::hash::Hash;

/// Iterator that reconstructs the input by walking the live grammar.
///
/// Keeps a stack of the non-terminals it has descended through; reaching a
/// rule's guard pops back to the symbol after the reference.
pub struct SequiturIter<'a, T> {
    sequitur: &'a Sequitur<T>,
    current: Option<DefaultKey>,
    stack: Vec<DefaultKey>,
}

impl<'a, T: Hash + Eq + Clone> SequiturIter<'a, T> {
    pub(crate) fn new(sequitur: &'a Sequitur<T>) -> Self {
        let grammar = &sequitur.grammar;
        let start = grammar
            .rules
            .get(&TOP_RULE)
            .and_then(|rule| grammar.symbols.get(rule.guard)?.next);

        let mut stack = Vec::new();
        let current = start.and_then(|key| Self::resolve_forward(sequitur, key, &mut stack));
        Self {
            sequitur,
            current,
            stack,
        }
    }

    /// Moves from `key` to the next terminal, descending into rules and
    /// climbing out of finished ones.
    fn resolve_forward(
        sequitur: &Sequitur<T>,
        mut key: DefaultKey,
        stack: &mut Vec<DefaultKey>,
    ) -> Option<DefaultKey> {
        let grammar = &sequitur.grammar;
        loop {
            let node = grammar.symbols.get(key)?;
            key = match &node.symbol {
                Symbol::Terminal(_) => return Some(key),
                Symbol::NonTerminal { rule_id } => {
                    stack.push(key);
                    let guard = grammar.rules.get(rule_id)?.guard;
                    grammar.symbols.get(guard)?.next?
                }
                Symbol::Guard { .. } => {
                    let parent = stack.pop()?;
                    grammar.symbols.get(parent)?.next?
                }
            };
        }
    }
}

impl<'a, T: Hash + Eq + Clone> Iterator for SequiturIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let sequitur = self.sequitur;
        let node = sequitur.grammar.symbols.get(current)?;
        let Symbol::Terminal(value) = &node.symbol else {
            unreachable!("resolve_forward only stops at terminals");
        };

        self.current = node
            .next
            .and_then(|next| Self::resolve_forward(sequitur, next, &mut self.stack));
        Some(value)
    }
}

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Returns an iterator over the reconstructed input.
    pub fn iter(&self) -> SequiturIter<'_, T> {
        SequiturIter::new(self)
    }
}

impl<'a, T: Hash + Eq + Clone> IntoIterator for &'a Sequitur<T> {
    type Item = &'a T;
    type IntoIter = SequiturIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_empty() {
        let seq = Sequitur::<char>::new();
        assert_eq!(seq.iter().count(), 0);
    }

    #[test]
    fn test_iter_single() {
        let mut seq = Sequitur::new();
        seq.push('a').unwrap();
        let collected: Vec<&char> = seq.iter().collect();
        assert_eq!(collected, vec![&'a']);
    }

    #[test]
    fn test_iter_with_repetition() {
        let mut seq = Sequitur::new();
        seq.extend(vec!['a', 'b', 'a', 'b']).unwrap();
        let collected: Vec<&char> = seq.iter().collect();
        assert_eq!(collected, vec![&'a', &'b', &'a', &'b']);
    }

    #[test]
    fn test_iter_nested_rules() {
        let mut seq = Sequitur::new();
        seq.extend("abcabcabcabc".chars()).unwrap();
        assert!(seq.num_rules() > 2);
        let result: String = seq.iter().collect();
        assert_eq!(result, "abcabcabcabc");
    }

    #[test]
    fn test_into_iterator() {
        let mut seq = Sequitur::new();
        seq.extend(vec![1, 2, 3]).unwrap();
        let collected: Vec<&i32> = (&seq).into_iter().collect();
        assert_eq!(collected, vec![&1, &2, &3]);
    }
}
