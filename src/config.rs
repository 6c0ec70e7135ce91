/// Bounds applied to one construction run.
///
/// Both bounds are checked after each appended symbol. A push that leaves
/// the grammar beyond a bound reports
/// [`GrammarError::CapacityExceeded`](crate::GrammarError::CapacityExceeded).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequiturConfig {
    /// Maximum number of live rules, counting the top-level rule.
    pub max_rules: Option<usize>,
    /// Maximum number of registered digrams.
    pub max_digrams: Option<usize>,
}

impl SequiturConfig {
    /// An unbounded configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rules(mut self, limit: usize) -> Self {
        self.max_rules = Some(limit);
        self
    }

    pub fn with_max_digrams(mut self, limit: usize) -> Self {
        self.max_digrams = Some(limit);
        self
    }
}
