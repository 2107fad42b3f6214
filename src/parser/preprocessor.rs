//! Preprocessor conditional evaluation
//!
//! Conditions are tiny boolean expressions over defined symbol names:
//!
//! ```text
//! condition ::= operand (("&&" | "||") operand)*
//! operand   ::= symbol | "true" | "false" | "(" condition ")"
//! ```
//!
//! Parenthesized groups are resolved innermost first (the rightmost `(` and the
//! first `)` after it) and replaced by a literal. The flat remainder is reduced
//! strictly left to right: `&&` and `||` share one precedence level, so
//! `A || B && C` reads as `(A || B) && C`. Negation and comparison operators are
//! not part of the language; a symbol that was never defined is simply false.

use rustc_hash::FxHashSet;

const TRUE: &str = "true";
const FALSE: &str = "false";
const AND: &str = "&&";
const OR: &str = "||";

/// The working set of preprocessor names considered true
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinedSymbols {
    symbols: FxHashSet<String>,
}

impl DefinedSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from a `;`-separated list; entries are trimmed and blanks dropped
    pub fn parse(list: &str) -> Self {
        let mut defined = Self::new();
        for symbol in list.split(';') {
            defined.define(symbol);
        }
        defined
    }

    pub fn define(&mut self, symbol: &str) {
        let symbol = symbol.trim();
        if !symbol.is_empty() {
            self.symbols.insert(symbol.to_string());
        }
    }

    pub fn undefine(&mut self, symbol: &str) {
        self.symbols.remove(symbol.trim());
    }

    /// Case-sensitive membership test
    pub fn is_defined(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Evaluate a conditional expression against the defined symbols
pub fn evaluate(condition: &str, defined: &DefinedSymbols) -> bool {
    let mut condition = condition.to_string();

    while let Some(open) = condition.rfind('(') {
        let inner_start = open + 1;
        let (inner_end, rest_start) = match condition[inner_start..].find(')') {
            Some(close) => (inner_start + close, inner_start + close + 1),
            // An unclosed group runs to the end of the condition
            None => (condition.len(), condition.len()),
        };
        let value = reduce(&condition[inner_start..inner_end], defined);
        condition = format!(
            "{} {} {}",
            &condition[..open],
            if value { TRUE } else { FALSE },
            &condition[rest_start..]
        );
    }

    reduce(&condition, defined)
}

/// Left-to-right pairwise reduction of a parenthesis-free condition
fn reduce(condition: &str, defined: &DefinedSymbols) -> bool {
    let tokens = tokenize(condition);
    let mut tokens = tokens.iter();

    let mut result = match tokens.next() {
        Some(first) => operand(first, defined),
        None => return false,
    };

    while let Some(operator) = tokens.next() {
        let next = tokens.next().is_some_and(|token| operand(token, defined));
        result = match *operator {
            AND => result && next,
            OR => result || next,
            // Unknown operators read as `||`
            _ => result || next,
        };
    }

    result
}

fn operand(token: &str, defined: &DefinedSymbols) -> bool {
    token == TRUE || defined.is_defined(token)
}

/// Split on whitespace and around `&&` / `||`; stray `)` characters are dropped
fn tokenize(condition: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let bytes = condition.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let is_operator = (c == b'&' || c == b'|') && bytes.get(i + 1) == Some(&c);
        if c.is_ascii_whitespace() || c == b')' || is_operator {
            if let Some(s) = start.take() {
                tokens.push(&condition[s..i]);
            }
            if is_operator {
                tokens.push(&condition[i..i + 2]);
                i += 2;
                continue;
            }
        } else if start.is_none() {
            start = Some(i);
        }
        i += 1;
    }
    if let Some(s) = start {
        tokens.push(&condition[s..]);
    }

    tokens
}

/// One `#if ... #endif` group
#[derive(Debug, Clone, Copy)]
struct Conditional {
    /// Whether the enclosing group is active
    parent_active: bool,
    /// Whether some branch of this group has evaluated true
    taken: bool,
    active: bool,
}

/// Nesting stack of open conditional groups
#[derive(Debug, Clone, Default)]
pub struct ConditionStack {
    groups: Vec<Conditional>,
}

impl ConditionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the current branch is excluded from parsing
    pub fn is_skipping(&self) -> bool {
        self.groups.last().is_some_and(|group| !group.active)
    }

    pub fn push_if(&mut self, result: bool) {
        let parent_active = !self.is_skipping();
        self.groups.push(Conditional {
            parent_active,
            taken: result,
            active: parent_active && result,
        });
    }

    /// `#elif`: the branch is active exactly when its own condition holds
    pub fn elif(&mut self, result: bool) {
        if let Some(group) = self.groups.last_mut() {
            group.active = group.parent_active && result;
            group.taken |= result;
        }
    }

    pub fn else_branch(&mut self) {
        if let Some(group) = self.groups.last_mut() {
            group.active = group.parent_active && !group.taken;
            group.taken = true;
        }
    }

    /// `#endif`; an unmatched one leaves the stack empty
    pub fn pop(&mut self) {
        self.groups.pop();
    }

    pub fn depth(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_group_with_or() {
        let defined = DefinedSymbols::parse("A;C");
        assert!(evaluate("A && (B || C)", &defined));
    }

    #[test]
    fn test_and_with_missing_symbol() {
        let defined = DefinedSymbols::parse("A");
        assert!(!evaluate("A && B", &defined));
    }

    #[test]
    fn test_left_to_right_without_precedence() {
        // (A || B) && C, not A || (B && C)
        let defined = DefinedSymbols::parse("A");
        assert!(!evaluate("A || B && C", &defined));
        let defined = DefinedSymbols::parse("C");
        assert!(!evaluate("A && B || C && A", &defined));
        assert!(evaluate("A && B || C", &defined));
    }

    #[test]
    fn test_literals_and_deep_nesting() {
        let defined = DefinedSymbols::new();
        assert!(evaluate("true", &defined));
        assert!(!evaluate("false", &defined));
        assert!(evaluate("((false || (true && true)))", &defined));
    }

    #[test]
    fn test_membership_is_exact_and_case_sensitive() {
        let defined = DefinedSymbols::parse(" DEBUG ; TRACE");
        assert!(evaluate("DEBUG", &defined));
        assert!(evaluate("TRACE", &defined));
        assert!(!evaluate("debug", &defined));
        assert!(!evaluate("DEBUG_X", &defined));
    }

    #[test]
    fn test_operators_without_spaces() {
        let defined = DefinedSymbols::parse("A;B");
        assert!(evaluate("A&&B", &defined));
        assert!(evaluate("X||(A&&B)", &defined));
    }

    #[test]
    fn test_malformed_conditions_do_not_panic() {
        let defined = DefinedSymbols::parse("A");
        assert!(!evaluate("", &defined));
        assert!(!evaluate("A &&", &defined));
        assert!(evaluate("(A", &defined));
        assert!(evaluate("A)", &defined));
    }

    #[test]
    fn test_condition_stack_branches() {
        let mut stack = ConditionStack::new();
        stack.push_if(false);
        assert!(stack.is_skipping());
        stack.elif(true);
        assert!(!stack.is_skipping());
        stack.else_branch();
        assert!(stack.is_skipping());
        stack.pop();
        assert!(!stack.is_skipping());
    }

    #[test]
    fn test_condition_stack_nested_in_skipped_group() {
        let mut stack = ConditionStack::new();
        stack.push_if(false);
        stack.push_if(true);
        assert!(stack.is_skipping());
        stack.pop();
        assert!(stack.is_skipping());
        stack.pop();
        assert!(!stack.is_skipping());
        assert_eq!(stack.depth(), 0);
    }
}
