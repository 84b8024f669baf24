//! Idempotent fixes for string comparisons in Java text
//!
//! Generated Java often compares strings with `==`, and sometimes drops the
//! left-hand side of the second operand of an `||`. The repairer rewrites
//! both into `.equals(...)` calls. Running it on its own output changes
//! nothing.

use cobol2java_core::{Cobol2JavaError, Cobol2JavaResult};
use regex::{Captures, Regex};

pub const INCOMPLETE_OR_COMPARISON: &str = "incomplete-or-comparison";
pub const RAW_STRING_EQUALITY: &str = "raw-string-equality";
pub const INCOMPLETE_OR_EQUALS: &str = "incomplete-or-equals";

/// A receiver expression: `name`, `a.b`, `getName()`, `a.getB().c`
const RECEIVER: &str = r"[A-Za-z_$][\w$]*(?:\(\))?(?:\.[A-Za-z_$][\w$]*(?:\(\))?)*";

/// Which part of the text a rule is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// The whole text at once
    Text,
    /// Only lines holding an `if (` condition
    ConditionalLines,
}

type Rewrite = fn(&Captures<'_>) -> String;

/// One named rewrite
pub struct RepairRule {
    name: &'static str,
    pattern: Regex,
    scope: RuleScope,
    rewrite: Rewrite,
    /// Reapply until the text stops changing
    until_stable: bool,
}

impl RepairRule {
    fn new(name: &'static str, pattern: &str, scope: RuleScope, rewrite: Rewrite) -> Cobol2JavaResult<Self> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern).map_err(|e| Cobol2JavaError::pattern(name, e))?,
            scope,
            rewrite,
            until_stable: false,
        })
    }

    fn until_stable(mut self) -> Self {
        self.until_stable = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn scope(&self) -> RuleScope {
        self.scope
    }

    /// Apply this rule to a piece of text, ignoring scope
    pub fn apply(&self, text: &str) -> String {
        let mut current = self.pattern.replace_all(text, self.rewrite).into_owned();
        while self.until_stable {
            let next = self.pattern.replace_all(&current, self.rewrite).into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

impl std::fmt::Debug for RepairRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepairRule")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("until_stable", &self.until_stable)
            .finish()
    }
}

#[derive(Debug)]
pub struct CodeRepairer {
    rules: Vec<RepairRule>,
    conditional: Regex,
}

impl CodeRepairer {
    pub fn new() -> Cobol2JavaResult<Self> {
        let rules = vec![
            RepairRule::new(
                INCOMPLETE_OR_COMPARISON,
                r#"if\s*\(\s*([^=)"|]+?)\s*==\s*("[^"]*")\s*\|\|\s*("[^"]*")\s*\)"#,
                RuleScope::Text,
                rewrite_incomplete_or,
            )?,
            RepairRule::new(
                RAW_STRING_EQUALITY,
                &format!(r#"({RECEIVER})\s*==\s*("[^"]*")"#),
                RuleScope::ConditionalLines,
                rewrite_raw_equality,
            )?,
            RepairRule::new(
                INCOMPLETE_OR_EQUALS,
                &format!(r#"({RECEIVER})\.equals\(("[^"]*")\)\s*\|\|\s*("[^"]*")(\.)?"#),
                RuleScope::Text,
                rewrite_incomplete_equals,
            )?
            .until_stable(),
        ];

        Ok(Self {
            rules,
            conditional: Regex::new(r"\bif\s*\(").map_err(|e| Cobol2JavaError::pattern("conditional-line", e))?,
        })
    }

    pub fn rules(&self) -> &[RepairRule] {
        &self.rules
    }

    /// Run every rule in order over the text
    pub fn repair(&self, code: &str) -> String {
        let mut current = code.to_string();
        for rule in &self.rules {
            let next = match rule.scope {
                RuleScope::Text => rule.apply(&current),
                RuleScope::ConditionalLines => self.apply_to_conditionals(rule, &current),
            };
            if next != current {
                log::debug!("Repair rule '{}' rewrote the code", rule.name);
            }
            current = next;
        }
        current
    }

    fn apply_to_conditionals(&self, rule: &RepairRule, code: &str) -> String {
        code.split('\n')
            .map(|line| {
                if self.conditional.is_match(line) {
                    rule.apply(line)
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `if (x == "A" || "B")` becomes `if(x.equals("A") || x.equals("B"))`
fn rewrite_incomplete_or(caps: &Captures<'_>) -> String {
    let lhs = caps[1].trim();
    format!("if({lhs}.equals({}) || {lhs}.equals({}))", &caps[2], &caps[3])
}

/// `x == "A"` becomes `x.equals("A")`
fn rewrite_raw_equality(caps: &Captures<'_>) -> String {
    format!("{}.equals({})", &caps[1], &caps[2])
}

/// `x.equals("A") || "B"` becomes `x.equals("A") || x.equals("B")`.
/// Left alone when the bare literal is itself a receiver (`"B".equals(y)`).
fn rewrite_incomplete_equals(caps: &Captures<'_>) -> String {
    if caps.get(4).is_some() {
        return caps[0].to_string();
    }
    let lhs = &caps[1];
    format!("{lhs}.equals({}) || {lhs}.equals({})", &caps[2], &caps[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repairer() -> CodeRepairer {
        CodeRepairer::new().unwrap()
    }

    #[test]
    fn test_incomplete_or_comparison() {
        assert_eq!(
            repairer().repair(r#"if(x == "A" || "B")"#),
            r#"if(x.equals("A") || x.equals("B"))"#
        );
        assert_eq!(
            repairer().repair(r#"    if (status == "OK" || "DONE") {"#),
            r#"    if(status.equals("OK") || status.equals("DONE")) {"#
        );
    }

    #[test]
    fn test_raw_equality_on_conditional_line() {
        assert_eq!(
            repairer().repair(r#"if (name == "SMITH") {"#),
            r#"if (name.equals("SMITH")) {"#
        );
        assert_eq!(
            repairer().repair(r#"} else if (rec.getCode() == "X") {"#),
            r#"} else if (rec.getCode().equals("X")) {"#
        );
    }

    #[test]
    fn test_raw_equality_outside_conditionals_untouched() {
        let code = r#"boolean same = name == "SMITH";"#;
        assert_eq!(repairer().repair(code), code);
    }

    #[test]
    fn test_incomplete_or_chain() {
        assert_eq!(
            repairer().repair(r#"if (x == "A" || "B" || "C") {"#),
            r#"if (x.equals("A") || x.equals("B") || x.equals("C")) {"#
        );
    }

    #[test]
    fn test_literal_receiver_left_alone() {
        let code = r#"if (x.equals("A") || "B".equals(y)) {"#;
        assert_eq!(repairer().repair(code), code);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let repairer = repairer();
        let samples = [
            r#"if(x == "A" || "B")"#,
            r#"if (x == "A" || "B" || "C") {"#,
            "public class A {\n    void f() {\n        if (a.b == \"1\" && c == \"2\") {}\n    }\n}",
            r#"if (x.equals("A") || "B".equals(y) || "C") {"#,
            r#"if ((a + b) == "x") {"#,
            "no comparisons here",
        ];
        for sample in samples {
            let once = repairer.repair(sample);
            assert_eq!(repairer.repair(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = repairer().rules().iter().map(RepairRule::name).collect();
        assert_eq!(names, vec![INCOMPLETE_OR_COMPARISON, RAW_STRING_EQUALITY, INCOMPLETE_OR_EQUALS]);
    }
}
