use crate::config::SequiturConfig;
use crate::error::{Capacity, GrammarError, Result};
use crate::grammar::Grammar;
use crate::view::GrammarView;
use log::{debug, error};
use std::hash::Hash;

/// One grammar-construction run.
///
/// Symbols are appended one at a time; after each [`push`](Self::push) the
/// grammar satisfies both constraints:
/// 1. Digram Uniqueness: no digram appears twice without overlapping
/// 2. Rule Utility: every rule other than the top-level one is used at least twice
///
/// Each run owns its digram index, so independent runs can be built on
/// different threads.
pub struct Sequitur<T> {
    pub(crate) grammar: Grammar<T>,
    config: SequiturConfig,

    /// Number of values added
    length: usize,

    /// Set once an invariant violation has been reported
    aborted: bool,
}

impl<T: Hash + Eq + Clone> Sequitur<T> {
    /// Starts an unbounded run holding only the empty top-level rule.
    pub fn new() -> Self {
        Self::with_config(SequiturConfig::default())
    }

    /// Starts a run bounded by `config`.
    pub fn with_config(config: SequiturConfig) -> Self {
        Self {
            grammar: Grammar::new(),
            config,
            length: 0,
            aborted: false,
        }
    }

    /// Appends a value and restores the grammar constraints.
    ///
    /// Returns [`GrammarError::CapacityExceeded`] when the rules or digrams
    /// now go beyond a configured bound. The value has been appended and the
    /// grammar is valid; the caller decides whether to carry on. An
    /// [`GrammarError::InvariantViolation`] aborts the run: every later call
    /// returns [`GrammarError::Aborted`].
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.aborted {
            return Err(GrammarError::Aborted);
        }

        if let Err(err) = self.grammar.append(value) {
            error!("aborting construction after {} symbols: {err}", self.length);
            self.aborted = true;
            return Err(err);
        }
        self.length += 1;
        self.check_capacity()
    }

    /// Appends every value of `iter`, stopping at the first error.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    fn check_capacity(&self) -> Result<()> {
        if let Some(limit) = self.config.max_rules {
            if self.grammar.rules.len() > limit {
                debug!("rule limit {limit} exceeded after {} symbols", self.length);
                return Err(GrammarError::CapacityExceeded {
                    resource: Capacity::Rules,
                    limit,
                });
            }
        }
        if let Some(limit) = self.config.max_digrams {
            if self.grammar.digram_index.len() > limit {
                debug!("digram limit {limit} exceeded after {} symbols", self.length);
                return Err(GrammarError::CapacityExceeded {
                    resource: Capacity::Digrams,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Returns the number of values added to the sequence.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if no values have been added.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of live rules, including the top-level rule.
    pub fn num_rules(&self) -> usize {
        self.grammar.rules.len()
    }

    /// True once an invariant violation has aborted this run.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn config(&self) -> &SequiturConfig {
        &self.config
    }

    /// Snapshot of the current grammar. The run can continue afterwards.
    pub fn view(&self) -> Result<GrammarView<T>> {
        if self.aborted {
            return Err(GrammarError::Aborted);
        }
        self.grammar.view()
    }

    /// Ends the run, dropping the digram index, and returns the grammar.
    pub fn finish(self) -> Result<GrammarView<T>> {
        let view = self.view()?;
        debug!(
            "finished grammar: {} symbols in, {} rules, {} grammar symbols",
            self.length,
            view.len(),
            view.symbol_count()
        );
        Ok(view)
    }

    /// Checks digram uniqueness, rule utility, usage counts and list links
    /// over the whole grammar.
    pub fn verify(&self) -> Result<()> {
        self.grammar.verify()
    }

    /// Returns compression statistics.
    pub fn stats(&self) -> CompressionStats {
        CompressionStats {
            input_length: self.length,
            grammar_symbols: self.grammar.symbol_count(),
            num_rules: self.grammar.rules.len(),
        }
    }
}

/// Statistics about the compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    /// Number of input symbols added
    pub input_length: usize,
    /// Total symbols in the grammar
    pub grammar_symbols: usize,
    /// Number of rules, the top-level rule included
    pub num_rules: usize,
}

impl CompressionStats {
    /// Returns the compression ratio as a percentage.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_length == 0 {
            0.0
        } else {
            (self.grammar_symbols as f64 / self.input_length as f64) * 100.0
        }
    }
}

impl<T: Hash + Eq + Clone> Default for Sequitur<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::TOP_RULE;
    use crate::symbol::Symbol;

    #[test]
    fn test_new() {
        let seq = Sequitur::<char>::new();
        assert_eq!(seq.len(), 0);
        assert!(seq.is_empty());
        assert_eq!(seq.num_rules(), 1);
        assert!(!seq.is_aborted());
    }

    #[test]
    fn test_push_multiple() {
        let mut seq = Sequitur::new();
        seq.push('a').unwrap();
        seq.push('b').unwrap();
        seq.push('c').unwrap();
        assert_eq!(seq.len(), 3);
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_top_rule_structure() {
        let seq = Sequitur::<u8>::new();
        let top = seq.grammar.rules[&TOP_RULE];
        let guard = &seq.grammar.symbols[top.guard];
        assert!(matches!(guard.symbol, Symbol::Guard { rule_id: 0 }));
        assert_eq!(guard.next, Some(top.guard));
    }

    #[test]
    fn test_stats() {
        let mut seq = Sequitur::new();
        seq.extend("abab".chars()).unwrap();
        let stats = seq.stats();
        assert_eq!(stats.input_length, 4);
        // top -> R R, R -> a b
        assert_eq!(stats.grammar_symbols, 4);
        assert_eq!(stats.num_rules, 2);
        assert!((stats.compression_ratio() - 100.0).abs() < f64::EPSILON);
        assert_eq!(Sequitur::<u8>::new().stats().compression_ratio(), 0.0);
    }

    #[test]
    fn test_rule_limit_at_bound_accepts_input() {
        let config = SequiturConfig::new().with_max_rules(1);
        let mut seq = Sequitur::with_config(config);
        seq.push(7u32).unwrap();
        seq.extend([8, 9]).unwrap();
        assert_eq!(seq.num_rules(), 1);

        let config = SequiturConfig::new().with_max_rules(2);
        let mut seq = Sequitur::with_config(config);
        seq.extend("abab".chars()).unwrap();
        seq.push('c').unwrap();
        assert_eq!(seq.num_rules(), 2);
    }

    #[test]
    fn test_rule_limit_reported_by_crossing_push() {
        let config = SequiturConfig::new().with_max_rules(1);
        let mut seq = Sequitur::with_config(config);
        seq.extend("aba".chars()).unwrap();

        // The second `a b` creates a rule and goes past the bound.
        let err = seq.push('b').unwrap_err();
        assert_eq!(
            err,
            GrammarError::CapacityExceeded {
                resource: Capacity::Rules,
                limit: 1
            }
        );
        assert!(err.is_recoverable());
        assert!(!seq.is_aborted());
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.num_rules(), 2);
        assert!(seq.verify().is_ok());
        assert_eq!(seq.iter().collect::<String>(), "abab");

        // Still beyond the bound, so later pushes keep reporting it.
        assert!(matches!(
            seq.push('c'),
            Err(GrammarError::CapacityExceeded { .. })
        ));
        assert_eq!(seq.iter().collect::<String>(), "ababc");
    }

    #[test]
    fn test_digram_limit() {
        let config = SequiturConfig::new().with_max_digrams(2);
        let mut seq = Sequitur::with_config(config);
        seq.extend("abc".chars()).unwrap();

        let err = seq.push('d').unwrap_err();
        assert_eq!(
            err,
            GrammarError::CapacityExceeded {
                resource: Capacity::Digrams,
                limit: 2
            }
        );
        assert_eq!(seq.len(), 4);
        assert!(seq.verify().is_ok());
    }

    #[test]
    fn test_aborted_run_rejects_input() {
        let mut seq = Sequitur::new();
        seq.extend("abc".chars()).unwrap();

        // Break the top rule's list so the next append cannot find its tail.
        let guard = seq.grammar.rules[&TOP_RULE].guard;
        seq.grammar.symbols[guard].prev = None;

        assert!(matches!(
            seq.push('d'),
            Err(GrammarError::InvariantViolation(_))
        ));
        assert!(seq.is_aborted());
        assert_eq!(seq.push('e'), Err(GrammarError::Aborted));
        assert!(matches!(seq.view(), Err(GrammarError::Aborted)));
    }

    #[test]
    fn test_stale_tail_aborts_run() {
        let mut seq = Sequitur::new();
        seq.extend("abc".chars()).unwrap();

        // The top guard still links to a node that is gone from the arena.
        let tail = seq.grammar.prev_of(seq.grammar.rules[&TOP_RULE].guard).unwrap();
        seq.grammar.symbols.remove(tail);

        assert!(matches!(
            seq.push('d'),
            Err(GrammarError::InvariantViolation(_))
        ));
        assert!(seq.is_aborted());
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_view_does_not_end_run() {
        let mut seq = Sequitur::new();
        seq.extend("abab".chars()).unwrap();
        assert_eq!(seq.view().unwrap().len(), 2);
        seq.extend("ab".chars()).unwrap();
        let view = seq.finish().unwrap();
        assert_eq!(view.expand().into_iter().collect::<String>(), "ababab");
    }
}
