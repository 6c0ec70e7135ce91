use crate::sequitur::Sequitur;
use crate::view::{GrammarView, ProductionSymbol};
use ProductionSymbol::{Rule, Terminal};

fn build(input: &[u32]) -> GrammarView<u32> {
    let mut seq = Sequitur::new();
    seq.extend(input.iter().copied()).unwrap();
    seq.verify().unwrap();
    seq.finish().unwrap()
}

const A: u32 = 1;
const B: u32 = 2;
const C: u32 = 3;

#[test]
fn test_no_repetition() {
    let grammar = build(&[A, B, C]);
    assert_eq!(grammar.len(), 1);
    assert_eq!(
        grammar.top().production,
        vec![Terminal(A), Terminal(B), Terminal(C)]
    );
}

#[test]
fn test_single_repeated_digram() {
    let grammar = build(&[A, B, A, B]);
    assert_eq!(grammar.len(), 2);
    assert_eq!(grammar.top().production, vec![Rule(1), Rule(1)]);

    let rule = grammar.rule(1).unwrap();
    assert_eq!(rule.production, vec![Terminal(A), Terminal(B)]);
    assert_eq!(rule.count, 2);
}

#[test]
fn test_cascading_repetition_nests_rules() {
    // top -> R1 R1, R1 -> R2 R2, R2 -> a b
    let grammar = build(&[A, B, A, B, A, B, A, B]);
    assert_eq!(grammar.len(), 3);
    assert_eq!(grammar.top().production, vec![Rule(1), Rule(1)]);
    assert_eq!(grammar.rule(1).unwrap().production, vec![Rule(2), Rule(2)]);
    assert_eq!(
        grammar.rule(2).unwrap().production,
        vec![Terminal(A), Terminal(B)]
    );
    assert!(grammar.rules()[1..].iter().all(|rule| rule.count == 2));
}

#[test]
fn test_underused_rule_is_inlined_immediately() {
    let mut seq = Sequitur::new();
    seq.extend([A, B, C, A, B]).unwrap();
    // top -> R c R, R -> a b
    assert_eq!(seq.num_rules(), 2);

    // The second `R c` makes a rule `R c`, which leaves `R` used once.
    seq.push(C).unwrap();
    seq.verify().unwrap();

    let grammar = seq.view().unwrap();
    assert_eq!(grammar.len(), 2);
    assert_eq!(grammar.top().production, vec![Rule(1), Rule(1)]);
    assert_eq!(
        grammar.rule(1).unwrap().production,
        vec![Terminal(A), Terminal(B), Terminal(C)]
    );
}

#[test]
fn test_longer_rule_is_not_reused_for_its_prefix() {
    // `a b c` becomes a rule; a later `a b` must not reuse it.
    let mut seq = Sequitur::new();
    seq.extend([A, B, C, A, B, C]).unwrap();
    seq.extend([A, B]).unwrap();
    seq.verify().unwrap();

    let grammar = seq.view().unwrap();
    assert_eq!(grammar.expand(), vec![A, B, C, A, B, C, A, B]);
    // top -> R1 R1 R2, R1 -> R2 c, R2 -> a b
    assert_eq!(grammar.len(), 3);
    assert_eq!(grammar.top().production, vec![Rule(1), Rule(1), Rule(2)]);
    assert_eq!(grammar.rule(1).unwrap().production, vec![Rule(2), Terminal(C)]);
    assert_eq!(
        grammar.rule(2).unwrap().production,
        vec![Terminal(A), Terminal(B)]
    );
}

#[test]
fn test_runs_of_one_value() {
    for n in 0..40 {
        let input = vec![A; n];
        let grammar = build(&input);
        assert_eq!(grammar.expand(), input, "run of length {n}");
    }
}

#[test]
fn test_classic_example() {
    let input: Vec<u32> = "abcdbcabcd".bytes().map(u32::from).collect();
    let grammar = build(&input);
    assert_eq!(grammar.expand(), input);
    assert!(grammar.rules()[1..].iter().all(|rule| rule.count >= 2));
}

#[test]
fn test_triples_keep_digram_index() {
    // `a b b b a b c b b` breaks up a run of b's; the surviving pair must
    // stay indexed or the later `b b` would go unnoticed.
    let input: Vec<u32> = "abbbabcbbabbbabcbb".bytes().map(u32::from).collect();
    let grammar = build(&input);
    assert_eq!(grammar.expand(), input);
}

#[test]
fn test_identical_runs_give_identical_grammars() {
    let input: Vec<u32> = "the quick brown fox jumps over the lazy dog the end"
        .bytes()
        .map(u32::from)
        .collect();
    assert_eq!(build(&input), build(&input));
}
