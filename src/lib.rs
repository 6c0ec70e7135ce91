//! # Sequitur grammar induction
//!
//! Infers a context-free grammar from a sequence in a single left-to-right
//! pass. Every repeated digram is replaced by a reference to a shared rule,
//! and the grammar is kept under two constraints after every appended symbol:
//! 1. **Digram Uniqueness**: no pair of adjacent symbols appears twice
//!    (overlapping runs such as `a a a` excepted)
//! 2. **Rule Utility**: every rule is referenced at least twice
//!
//! ## Example
//!
//! ```
//! use sequitur_grammar::{ProductionSymbol, Sequitur};
//!
//! let mut seq = Sequitur::new();
//! seq.extend("abab".chars())?;
//!
//! let grammar = seq.finish()?;
//! assert_eq!(grammar.len(), 2);
//! assert_eq!(
//!     grammar.top().production,
//!     vec![ProductionSymbol::Rule(1), ProductionSymbol::Rule(1)]
//! );
//! assert_eq!(grammar.expand().into_iter().collect::<String>(), "abab");
//! # Ok::<(), sequitur_grammar::GrammarError>(())
//! ```
//!
//! ## Performance
//!
//! - O(1) amortized time per symbol added
//! - Symbols live in a generational arena (SlotMap); links are arena keys

mod config;
mod digram;
mod error;
mod grammar;
mod id_gen;
mod iter;
mod rule;
mod sequitur;
mod symbol;
mod verify;
mod view;

#[cfg(test)]
mod tests;

pub use config::SequiturConfig;
pub use error::{Capacity, GrammarError, Result};
pub use iter::SequiturIter;
pub use sequitur::{CompressionStats, Sequitur};
pub use view::{GrammarView, ProductionSymbol, RuleView};
