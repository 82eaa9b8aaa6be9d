//! Structural validation
//!
//! This module checks a parsed program against the language's
//! structural rules before execution. Every check is independent and
//! all defects are collected in one pass; the AST is never mutated.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::parser::ast::{
    DecideBranch, Expr, ForIterable, Program, Stmt, Subtask, TaskMember,
};
use crate::runtime::BUILTIN_NAMES;

/// Registry of every subtask in a program, keyed by normalized name.
///
/// Built once during validation and read-only afterwards; the same
/// registry shape is what the interpreter resolves calls against.
#[derive(Debug, Clone, Default)]
pub struct SubtaskRegistry {
    subtasks: HashMap<String, Subtask>,
}

impl SubtaskRegistry {
    /// Collect all subtasks declared anywhere in the program
    pub fn build(program: &Program) -> Self {
        let mut subtasks = HashMap::new();
        for task in &program.tasks {
            for member in &task.members {
                if let TaskMember::Subtask(subtask) = member {
                    subtasks.insert(Self::normalize(&subtask.name), subtask.clone());
                }
            }
        }
        Self { subtasks }
    }

    /// Normalize a subtask name for lookup: call sites write
    /// `calculate_average()` to reach the subtask declared as
    /// `"Calculate Average"`.
    pub fn normalize(name: &str) -> String {
        name.to_lowercase().replace('_', " ")
    }

    /// Look up a subtask by declared name or call-site identifier
    pub fn resolve(&self, name: &str) -> Option<&Subtask> {
        self.subtasks.get(&Self::normalize(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.subtasks.is_empty()
    }
}

/// Validate a program, returning every structural defect found.
/// An empty list means the program is safe to execute.
pub fn validate(program: &Program) -> Vec<ValidationError> {
    let registry = SubtaskRegistry::build(program);
    let mut errors = Vec::new();

    check_objective(program, &mut errors);
    check_task_names(program, &mut errors);
    check_run_targets(program, &mut errors);

    for task in &program.tasks {
        for member in &task.members {
            match member {
                TaskMember::Step(step) => {
                    check_no_return(&step.body, &step.name, &mut errors);
                    for stmt in &step.body {
                        check_statement(stmt, &registry, &mut errors);
                    }
                }
                TaskMember::Subtask(subtask) => {
                    for stmt in &subtask.body {
                        check_statement(stmt, &registry, &mut errors);
                    }
                }
            }
        }
    }

    errors
}

/// Exactly one objective: missing and every duplicate are defects
fn check_objective(program: &Program, errors: &mut Vec<ValidationError>) {
    match program.objectives.len() {
        0 => {
            let location = program
                .tasks
                .first()
                .map(|t| t.location.clone())
                .or_else(|| program.runs.first().map(|r| r.location.clone()))
                .unwrap_or_else(|| crate::error::SourceLocation::at(1, 1));
            errors.push(ValidationError::new(
                "program has no objective declaration",
                location,
            ));
        }
        1 => {}
        _ => {
            for duplicate in &program.objectives[1..] {
                errors.push(ValidationError::new(
                    "duplicate objective declaration (a program has exactly one)",
                    duplicate.location.clone(),
                ));
            }
        }
    }
}

/// Task names must be unique; the error cites both declaration sites
fn check_task_names(program: &Program, errors: &mut Vec<ValidationError>) {
    let mut seen: HashMap<&str, &crate::parser::ast::Task> = HashMap::new();
    for task in &program.tasks {
        if let Some(first) = seen.get(task.name.as_str()) {
            errors.push(ValidationError::new(
                format!(
                    "duplicate task name '{}' (first declared at {})",
                    task.name, first.location
                ),
                task.location.clone(),
            ));
        } else {
            seen.insert(task.name.as_str(), task);
        }
    }
}

/// Every run statement must target a declared task
fn check_run_targets(program: &Program, errors: &mut Vec<ValidationError>) {
    for run in &program.runs {
        if !program.tasks.iter().any(|t| t.name == run.task) {
            errors.push(ValidationError::new(
                format!("run references unknown task '{}'", run.task),
                run.location.clone(),
            ));
        }
    }
}

/// Return statements are legal only inside subtask bodies. Walk a step
/// body, including nested control flow, and flag each one found.
fn check_no_return(body: &[Stmt], step_name: &str, errors: &mut Vec<ValidationError>) {
    for stmt in body {
        match stmt {
            Stmt::Return { location, .. } => {
                errors.push(ValidationError::new(
                    format!(
                        "'return' is not allowed in step \"{}\" (only subtasks return values)",
                        step_name
                    ),
                    location.clone(),
                ));
            }
            Stmt::Decide {
                branches,
                else_body,
                ..
            } => {
                for DecideBranch { body, .. } in branches {
                    check_no_return(body, step_name, errors);
                }
                if let Some(else_body) = else_body {
                    check_no_return(else_body, step_name, errors);
                }
            }
            Stmt::For { body, .. } | Stmt::While { body, .. } => {
                check_no_return(body, step_name, errors);
            }
            Stmt::Assignment { .. } | Stmt::Expression { .. } => {}
        }
    }
}

/// Statement-level checks: decide structure and call resolution
fn check_statement(stmt: &Stmt, registry: &SubtaskRegistry, errors: &mut Vec<ValidationError>) {
    match stmt {
        Stmt::Assignment { value, .. } => check_expression(value, registry, errors),
        Stmt::Expression { expr, .. } => check_expression(expr, registry, errors),
        Stmt::Return { value, .. } => {
            if let Some(value) = value {
                check_expression(value, registry, errors);
            }
        }
        Stmt::Decide {
            branches,
            else_body,
            location,
        } => {
            if branches.is_empty() {
                errors.push(ValidationError::new(
                    "decide block has no branches",
                    location.clone(),
                ));
            }
            for branch in branches {
                check_expression(&branch.condition, registry, errors);
                for stmt in &branch.body {
                    check_statement(stmt, registry, errors);
                }
            }
            if let Some(else_body) = else_body {
                for stmt in else_body {
                    check_statement(stmt, registry, errors);
                }
            }
        }
        Stmt::For {
            iterable, body, ..
        } => {
            match iterable {
                ForIterable::Sequence(expr) | ForIterable::Enumerate(expr) => {
                    check_expression(expr, registry, errors);
                }
                ForIterable::Range { start, end } => {
                    if let Some(start) = start {
                        check_expression(start, registry, errors);
                    }
                    check_expression(end, registry, errors);
                }
            }
            for stmt in body {
                check_statement(stmt, registry, errors);
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            check_expression(condition, registry, errors);
            for stmt in body {
                check_statement(stmt, registry, errors);
            }
        }
    }
}

/// Every call to a name that is not a builtin must resolve in the
/// subtask registry. Builtins are resolved at runtime by fixed name.
fn check_expression(expr: &Expr, registry: &SubtaskRegistry, errors: &mut Vec<ValidationError>) {
    match expr {
        Expr::Call {
            name,
            arguments,
            location,
        } => {
            if !BUILTIN_NAMES.contains(&name.as_str()) && !registry.contains(name) {
                errors.push(ValidationError::new(
                    format!("call to undeclared subtask '{}'", name),
                    location.clone(),
                ));
            }
            for arg in arguments {
                check_expression(arg, registry, errors);
            }
        }
        Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
            check_expression(left, registry, errors);
            check_expression(right, registry, errors);
        }
        Expr::Unary { operand, .. } => check_expression(operand, registry, errors),
        Expr::Index { base, index, .. } => {
            check_expression(base, registry, errors);
            check_expression(index, registry, errors);
        }
        Expr::List { items, .. } => {
            for item in items {
                check_expression(item, registry, errors);
            }
        }
        Expr::Dict { entries, .. } => {
            for (key, value) in entries {
                check_expression(key, registry, errors);
                check_expression(value, registry, errors);
            }
        }
        Expr::Literal { .. } | Expr::Variable { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn validate_source(source: &str) -> Vec<ValidationError> {
        let tokens = Lexer::new(source, None).tokenize().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        validate(&program)
    }

    #[test]
    fn test_valid_program_has_no_errors() {
        let errors = validate_source(
            r#"
            objective "Calculate student grades"
            task "Process Grades":
                step "Collect":
                    scores = [85, 92, 78]
                subtask "Calculate Average":
                    total = sum(scores)
                    return total / len(scores)
                step "Report":
                    avg = calculate_average()
                    print(avg)
            run "Process Grades"
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_missing_objective() {
        let errors = validate_source(
            r#"
            task "T":
                step "S":
                    x = 1
            run "T"
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("no objective"));
    }

    #[test]
    fn test_duplicate_objective() {
        let errors = validate_source(
            r#"
            objective "One"
            objective "Two"
            task "T":
                step "S":
                    x = 1
            run "T"
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("duplicate objective"));
        assert_eq!(errors[0].location.line, 3);
    }

    #[test]
    fn test_duplicate_task_names_cite_both_positions() {
        let errors = validate_source(
            r#"
            objective "Test"
            task "X":
                step "A":
                    a = 1
            task "X":
                step "B":
                    b = 2
            run "X"
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("duplicate task name 'X'"));
        assert!(errors[0].message.contains("first declared at 3:13"));
        assert_eq!(errors[0].location.line, 6);
    }

    #[test]
    fn test_run_unknown_task() {
        let errors = validate_source(
            r#"
            objective "Test"
            task "X":
                step "A":
                    a = 1
            run "Y"
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unknown task 'Y'"));
    }

    #[test]
    fn test_all_defects_collected_together() {
        // Duplicate task names AND an unresolved run target: both reported
        let errors = validate_source(
            r#"
            objective "Test"
            task "X":
                step "A":
                    a = 1
            task "X":
                step "B":
                    b = 2
            run "Y"
            "#,
        );
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.message.contains("duplicate task")));
        assert!(errors.iter().any(|e| e.message.contains("unknown task 'Y'")));
    }

    #[test]
    fn test_return_in_step_rejected() {
        let errors = validate_source(
            r#"
            objective "Test"
            task "T":
                step "Bad":
                    return 42
            run "T"
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'return' is not allowed in step"));
        assert_eq!(errors[0].location.line, 5);
    }

    #[test]
    fn test_return_nested_in_step_control_flow_rejected() {
        let errors = validate_source(
            r#"
            objective "Test"
            task "T":
                step "Bad":
                    for x in items:
                        decide:
                            if x > 0 then:
                                return x
                        end
                    end
                    items = [1]
            run "T"
            "#,
        );
        assert!(errors
            .iter()
            .any(|e| e.message.contains("'return' is not allowed")));
    }

    #[test]
    fn test_return_in_subtask_nested_control_flow_allowed() {
        let errors = validate_source(
            r#"
            objective "Test"
            task "T":
                step "Seed":
                    items = [1, 2, 3]
                subtask "Find Positive":
                    for x in items:
                        decide:
                            if x > 0 then:
                                return x
                        end
                    end
                step "Use":
                    found = find_positive()
            run "T"
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_unresolved_subtask_call() {
        let errors = validate_source(
            r#"
            objective "Test"
            task "T":
                step "S":
                    x = missing_helper()
            run "T"
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .message
            .contains("undeclared subtask 'missing_helper'"));
    }

    #[test]
    fn test_builtin_calls_are_not_flagged() {
        let errors = validate_source(
            r#"
            objective "Test"
            task "T":
                step "S":
                    xs = [1, 2]
                    print(sum(xs), len(xs), max(xs), min(xs))
            run "T"
            "#,
        );
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_registry_normalizes_names() {
        let source = r#"
            objective "Test"
            task "T":
                subtask "Calculate Average":
                    return 1
                step "S":
                    avg = calculate_average()
            run "T"
            "#;
        let tokens = Lexer::new(source, None).tokenize().unwrap();
        let program = Parser::new(tokens).parse().unwrap();

        let registry = SubtaskRegistry::build(&program);
        assert!(registry.contains("calculate_average"));
        assert!(registry.contains("Calculate Average"));
        assert!(!registry.contains("unknown"));

        assert!(validate(&program).is_empty());
    }
}
