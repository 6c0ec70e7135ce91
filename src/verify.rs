use crate::digram::DigramKey;
use crate::error::{GrammarError, Result};
use crate::grammar::Grammar;
use crate::rule::TOP_RULE;
use ahash::AHashMap as HashMap;
use slotmap::DefaultKey;
use std::hash::Hash;

impl<T: Hash + Eq + Clone> Grammar<T> {
    /// Checks every structural constraint of the grammar.
    ///
    /// Overlapping occurrences of a digram (as in `a a a`) are allowed; any
    /// other repetition is reported.
    pub(crate) fn verify(&self) -> Result<()> {
        let mut references: HashMap<u32, u32> = HashMap::default();
        let mut digrams: HashMap<DigramKey<T>, DefaultKey> = HashMap::default();

        for (&rule_id, rule) in self.rules.iter() {
            let body = self.body(rule_id)?;
            if rule_id != TOP_RULE && body.len() < 2 {
                return Err(GrammarError::invariant(format!(
                    "rule {rule_id} has {} symbols",
                    body.len()
                )));
            }

            let mut prev = rule.guard;
            for &key in &body {
                let node = self.node(key)?;
                if node.prev != Some(prev) {
                    return Err(GrammarError::invariant(format!(
                        "broken back link in rule {rule_id}"
                    )));
                }
                if let Some(target) = node.symbol.referenced_rule() {
                    *references.entry(target).or_default() += 1;
                }
                if let Some(digram) = self.digram_key(key)? {
                    if !self.digram_index.contains_key(&digram) {
                        return Err(GrammarError::invariant(format!(
                            "digram in rule {rule_id} is missing from the index"
                        )));
                    }
                    if let Some(&seen) = digrams.get(&digram) {
                        if self.node(seen)?.next != Some(key) {
                            return Err(GrammarError::invariant(format!(
                                "digram repeated in rule {rule_id}"
                            )));
                        }
                    } else {
                        digrams.insert(digram, key);
                    }
                }
                prev = key;
            }
            if self.node(rule.guard)?.prev != Some(prev) {
                return Err(GrammarError::invariant(format!(
                    "guard of rule {rule_id} does not close the list"
                )));
            }
        }

        for (&rule_id, rule) in self.rules.iter() {
            let used = references.remove(&rule_id).unwrap_or(0);
            if used != rule.count {
                return Err(GrammarError::invariant(format!(
                    "rule {rule_id} has count {} but {used} references",
                    rule.count
                )));
            }
            if rule_id != TOP_RULE && rule.count < 2 {
                return Err(GrammarError::invariant(format!(
                    "rule {rule_id} is used {} times",
                    rule.count
                )));
            }
        }
        if let Some((&missing, _)) = references.iter().next() {
            return Err(GrammarError::invariant(format!(
                "reference to missing rule {missing}"
            )));
        }
        if self.id_gen.live() != self.rules.len() {
            return Err(GrammarError::invariant(format!(
                "{} rule ids allocated for {} rules",
                self.id_gen.live(),
                self.rules.len()
            )));
        }

        for (digram, &key) in self.digram_index.iter() {
            if !self.symbols.contains_key(key) {
                return Err(GrammarError::invariant("digram index refers to a removed symbol"));
            }
            if self.digram_key(key)?.as_ref() != Some(digram) {
                return Err(GrammarError::invariant(
                    "digram index entry disagrees with list adjacency",
                ));
            }
        }
        Ok(())
    }
}
