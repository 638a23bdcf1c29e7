//! Stochastic L-system style rewriting.
//!
//! A tree starts as a single [`Symbol::Forward`]. Each rewriting pass
//! replaces every `Forward` with itself and, with the configured branch
//! probability, appends a bracketed two-way split:
//!
//! ```text
//! F  ->  F [ + F ] [ - F ]
//! ```
//!
//! The rewrite is parallel: all symbols of pass `i` are rewritten from the
//! sequence produced by pass `i - 1`, so a `Forward` inserted in pass `i` is
//! first expanded in pass `i + 1`.

use crate::params::TreeType;
use log::{debug, trace};
use rand::Rng;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Grow one segment forward (`F`).
    Forward,
    /// Save the turtle state (`[`).
    Push,
    /// Restore the last saved turtle state (`]`).
    Pop,
    /// Rotate clockwise in screen space (`+`).
    TurnRight,
    /// Rotate counter-clockwise in screen space (`-`).
    TurnLeft,
}

impl Symbol {
    pub fn to_char(self) -> char {
        match self {
            Symbol::Forward => 'F',
            Symbol::Push => '[',
            Symbol::Pop => ']',
            Symbol::TurnRight => '+',
            Symbol::TurnLeft => '-',
        }
    }

    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            'F' => Some(Symbol::Forward),
            '[' => Some(Symbol::Push),
            ']' => Some(Symbol::Pop),
            '+' => Some(Symbol::TurnRight),
            '-' => Some(Symbol::TurnLeft),
            _ => None,
        }
    }
}

/// The bracketed split appended after a `Forward` that branches.
pub const SPLIT: [Symbol; 8] = [
    Symbol::Push,
    Symbol::TurnRight,
    Symbol::Forward,
    Symbol::Pop,
    Symbol::Push,
    Symbol::TurnLeft,
    Symbol::Forward,
    Symbol::Pop,
];

/// Per-symbol production rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rule {
    Growth {
        length_factor: f32,
        thickness_factor: f32,
        angle_change: f32,
    },
    Split {
        branch_count: u32,
        angle_spread: f32,
        thickness_split: f32,
    },
    Terminate {
        probability: f32,
    },
}

/// Rule table for one tree type, keyed by symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleSet {
    pub forward: Rule,
    pub push: Rule,
    pub pop: Rule,
}

impl RuleSet {
    pub fn for_type(tree_type: TreeType) -> Self {
        match tree_type {
            TreeType::Oak => Self::table((1.0, 0.9, 0.0), (2, 35.0, 0.7), 0.1),
            TreeType::Pine => Self::table((1.2, 0.8, 0.0), (3, 25.0, 0.6), 0.2),
            TreeType::Palm => Self::table((1.5, 0.9, 10.0), (5, 60.0, 0.8), 0.8),
            TreeType::Birch | TreeType::Willow | TreeType::Dead | TreeType::Custom => {
                Self::default()
            }
        }
    }

    /// The rule applied to `symbol`, if the table has one.
    ///
    /// Turns carry no rule of their own.
    pub fn rule(&self, symbol: Symbol) -> Option<&Rule> {
        match symbol {
            Symbol::Forward => Some(&self.forward),
            Symbol::Push => Some(&self.push),
            Symbol::Pop => Some(&self.pop),
            Symbol::TurnRight | Symbol::TurnLeft => None,
        }
    }

    fn table(growth: (f32, f32, f32), split: (u32, f32, f32), terminate: f32) -> Self {
        Self {
            forward: Rule::Growth {
                length_factor: growth.0,
                thickness_factor: growth.1,
                angle_change: growth.2,
            },
            push: Rule::Split {
                branch_count: split.0,
                angle_spread: split.1,
                thickness_split: split.2,
            },
            pop: Rule::Terminate {
                probability: terminate,
            },
        }
    }
}

impl Default for RuleSet {
    /// Oak-like fallback used for types without a dedicated table.
    fn default() -> Self {
        Self::table((1.0, 0.9, 0.0), (2, 30.0, 0.7), 0.1)
    }
}

/// Rewriting engine bound to one rule table.
#[derive(Clone, Debug)]
pub struct Grammar {
    pub rules: RuleSet,
}

impl Grammar {
    pub fn new(tree_type: TreeType) -> Self {
        Self {
            rules: RuleSet::for_type(tree_type),
        }
    }

    /// Expands the one-symbol axiom for `iterations` parallel passes.
    ///
    /// Exactly one draw from `rng` is made per `Forward` symbol per pass,
    /// in sequence order, so the result is a pure function of the inputs
    /// and the generator state.
    ///
    /// Once the sequence is longer than `limit`, no further passes run.
    /// The structure builder truncates to the same limit, so this only
    /// bounds memory; trees that stay under the limit are unaffected.
    ///
    /// ### Parameters
    /// - `iterations` - Number of rewriting passes.
    /// - `branch_probability` - Chance that a `Forward` grows a split.
    /// - `limit` - Sequence length after which expansion stops.
    /// - `rng` - Random source, advanced sequentially.
    ///
    /// ### Returns
    /// The rewritten symbol sequence.
    pub fn expand(
        &self,
        iterations: u32,
        branch_probability: f32,
        limit: usize,
        rng: &mut impl Rng,
    ) -> Vec<Symbol> {
        let mut current = vec![Symbol::Forward];

        for pass in 0..iterations {
            if current.len() > limit {
                debug!(
                    "grammar: stopping after {pass} passes, {} symbols exceed limit {limit}",
                    current.len()
                );
                break;
            }

            let forwards = current.iter().filter(|&&s| s == Symbol::Forward).count();
            let mut next = Vec::with_capacity(current.len() + forwards * SPLIT.len());

            for &symbol in &current {
                match symbol {
                    Symbol::Forward => {
                        next.push(Symbol::Forward);
                        if rng.random::<f32>() < branch_probability {
                            next.extend_from_slice(&SPLIT);
                        }
                    }
                    Symbol::Push | Symbol::Pop | Symbol::TurnRight | Symbol::TurnLeft => {
                        next.push(symbol);
                    }
                }
            }

            trace!("grammar: pass {pass} -> {} symbols", next.len());
            current = next;
        }

        current
    }
}

/// A symbol sequence rendered as its `F[]+-` string form.
pub struct SymbolString<'a>(pub &'a [Symbol]);

impl fmt::Display for SymbolString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in self.0 {
            write!(f, "{}", s.to_char())?;
        }
        Ok(())
    }
}

/// Parses an `F[]+-` string, ignoring any other characters.
pub fn parse(text: &str) -> Vec<Symbol> {
    text.chars().filter_map(Symbol::from_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn count(seq: &[Symbol], symbol: Symbol) -> usize {
        seq.iter().filter(|&&s| s == symbol).count()
    }

    #[test]
    fn zero_probability_never_branches() {
        let grammar = Grammar::new(TreeType::Oak);
        let mut rng = StdRng::seed_from_u64(7);

        let seq = grammar.expand(6, 0.0, usize::MAX, &mut rng);
        assert_eq!(seq, vec![Symbol::Forward]);
    }

    #[test]
    fn certain_branching_is_parallel() {
        let grammar = Grammar::new(TreeType::Oak);
        let mut rng = StdRng::seed_from_u64(7);

        // One pass: F -> F[+F][-F]; the inserted F's are not rewritten yet.
        let one = grammar.expand(1, 1.0, usize::MAX, &mut rng);
        assert_eq!(SymbolString(&one).to_string(), "F[+F][-F]");

        // Every pass triples the forward count.
        let three = grammar.expand(3, 1.0, usize::MAX, &mut rng);
        assert_eq!(count(&three, Symbol::Forward), 27);
        assert_eq!(count(&three, Symbol::Push), count(&three, Symbol::Pop));
    }

    #[test]
    fn same_seed_same_sequence() {
        let grammar = Grammar::new(TreeType::Pine);
        let a = grammar.expand(5, 0.6, usize::MAX, &mut StdRng::seed_from_u64(99));
        let b = grammar.expand(5, 0.6, usize::MAX, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn limit_stops_further_passes() {
        let grammar = Grammar::new(TreeType::Oak);
        let mut rng = StdRng::seed_from_u64(1);

        // After pass 1 there are 9 symbols, which already exceeds 5.
        let seq = grammar.expand(10, 1.0, 5, &mut rng);
        assert_eq!(seq.len(), 9);
    }

    #[test]
    fn unknown_types_fall_back_to_default_rules() {
        assert_eq!(RuleSet::for_type(TreeType::Willow), RuleSet::default());
        assert_eq!(RuleSet::for_type(TreeType::Custom), RuleSet::default());
        assert_ne!(RuleSet::for_type(TreeType::Pine), RuleSet::default());

        let rules = RuleSet::for_type(TreeType::Palm);
        assert!(matches!(
            rules.rule(Symbol::Push),
            Some(Rule::Split { branch_count: 5, .. })
        ));
        assert!(rules.rule(Symbol::TurnLeft).is_none());
    }

    #[test]
    fn parse_round_trips_display() {
        let seq = parse("F[+F]x[-F]");
        assert_eq!(SymbolString(&seq).to_string(), "F[+F][-F]");
    }
}
