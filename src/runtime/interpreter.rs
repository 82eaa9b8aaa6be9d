//! Interpreter implementation
//!
//! This module implements the tree-walking execution engine for Think
//! programs: task/step/subtask execution, statement and expression
//! evaluation, builtin dispatch, and trace emission.

use std::collections::HashMap;

use crate::error::{RuntimeErrorKind, SourceLocation, ThinkError, ThinkResult};
use crate::parser::ast::{
    BinaryOp, Expr, ForIterable, Literal, LogicalOp, LoopBinding, Program, RunStmt, Step, Stmt,
    Subtask, Task, TaskMember, UnaryOp,
};
use crate::trace::{Formatter, NullSink, Recorder, TraceEvent, TraceSink, TraceStyle};
use crate::validator::SubtaskRegistry;

use super::value::{DictValue, Value};

/// Names resolved to builtins before the subtask registry is consulted
pub const BUILTIN_NAMES: &[&str] = &["print", "sum", "len", "range", "enumerate", "max", "min"];

/// Settings for one `execute` call
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Emit trace events and render them into `ExecutionResult::trace`
    pub explain: bool,
    /// Rendering style for the trace
    pub style: TraceStyle,
    /// Optional guard against runaway while loops. Off by default so
    /// non-terminating programs behave as written.
    pub max_loop_iterations: Option<u64>,
}

/// The outcome of a successful `execute` call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Text produced by `print` calls, one line per call
    pub program_output: String,
    /// Rendered trace, present when explain mode was on
    pub trace: Option<String>,
}

/// Execute a validated program.
///
/// The caller is responsible for running the validator first; a
/// program with outstanding validation errors must not reach here.
pub fn execute(program: &Program, options: &ExecuteOptions) -> ThinkResult<ExecutionResult> {
    let mut recorder = Recorder::new();
    let mut null = NullSink;

    let program_output = {
        let sink: &mut dyn TraceSink = if options.explain {
            &mut recorder
        } else {
            &mut null
        };
        let mut interpreter = Interpreter::new(program, options.clone(), sink);
        interpreter.run()?
    };

    let trace = if options.explain {
        Some(Formatter::new(options.style).render(recorder.events()))
    } else {
        None
    };

    Ok(ExecutionResult {
        program_output,
        trace,
    })
}

/// Flat, mutable environment owned by one task execution.
///
/// Steps and subtasks within a task share this single mapping, so an
/// assignment made inside a subtask is visible to every later step.
#[derive(Debug, Default)]
struct TaskEnvironment {
    values: HashMap<String, Value>,
}

impl TaskEnvironment {
    fn new() -> Self {
        Self::default()
    }

    fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Control flow signal for subtask returns
#[derive(Debug, Clone)]
enum ControlFlow {
    None,
    Return(Value),
}

/// Tree-walking interpreter for one program
pub struct Interpreter<'a, 's> {
    program: &'a Program,
    tasks: HashMap<&'a str, &'a Task>,
    subtasks: HashMap<String, &'a Subtask>,
    options: ExecuteOptions,
    env: TaskEnvironment,
    control_flow: ControlFlow,
    output: String,
    sink: &'s mut dyn TraceSink,
}

impl<'a, 's> Interpreter<'a, 's> {
    /// Create an interpreter emitting trace events into `sink`
    pub fn new(
        program: &'a Program,
        options: ExecuteOptions,
        sink: &'s mut dyn TraceSink,
    ) -> Self {
        let mut tasks = HashMap::new();
        for task in &program.tasks {
            tasks.insert(task.name.as_str(), task);
        }

        // Two-tier call dispatch resolves builtins first, then this
        // registry of normalized subtask names.
        let mut subtasks = HashMap::new();
        for task in &program.tasks {
            for member in &task.members {
                if let TaskMember::Subtask(subtask) = member {
                    subtasks.insert(SubtaskRegistry::normalize(&subtask.name), subtask);
                }
            }
        }

        Self {
            program,
            tasks,
            subtasks,
            options,
            env: TaskEnvironment::new(),
            control_flow: ControlFlow::None,
            output: String::new(),
            sink,
        }
    }

    /// Run every `run` statement in program order, returning the
    /// accumulated program output
    pub fn run(&mut self) -> ThinkResult<String> {
        let objective = self.program.objective().unwrap_or_default().to_string();
        self.emit(TraceEvent::ProgramStart { objective });

        for run in &self.program.runs {
            self.execute_run(run)?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn emit(&mut self, event: TraceEvent) {
        self.sink.record(event);
    }

    // ===== Tasks, steps, subtasks =====

    fn execute_run(&mut self, run: &RunStmt) -> ThinkResult<()> {
        let task = self.tasks.get(run.task.as_str()).copied().ok_or_else(|| {
            ThinkError::internal_error(format!(
                "run \"{}\" does not resolve to a task; execute() was called without validation",
                run.task
            ))
        })?;

        // Each run gets a fresh environment; nothing persists across tasks
        self.env = TaskEnvironment::new();
        self.control_flow = ControlFlow::None;

        self.emit(TraceEvent::TaskStart {
            name: task.name.clone(),
        });

        for member in &task.members {
            match member {
                TaskMember::Step(step) => self.execute_step(step)?,
                // Subtask declarations are inert; they run only when called
                TaskMember::Subtask(_) => {}
            }
        }

        self.emit(TraceEvent::TaskEnd {
            name: task.name.clone(),
        });

        Ok(())
    }

    fn execute_step(&mut self, step: &'a Step) -> ThinkResult<()> {
        self.emit(TraceEvent::StepStart {
            name: step.name.clone(),
        });

        self.execute_block(&step.body)?;

        self.emit(TraceEvent::StepEnd {
            name: step.name.clone(),
        });

        Ok(())
    }

    /// Run a subtask body against the shared task environment and
    /// yield its return value (None if no return fires)
    fn call_subtask(&mut self, subtask: &'a Subtask) -> ThinkResult<Value> {
        self.emit(TraceEvent::SubtaskStart {
            name: subtask.name.clone(),
        });

        for stmt in &subtask.body {
            self.execute_statement(stmt)?;
            if matches!(self.control_flow, ControlFlow::Return(_)) {
                break;
            }
        }

        self.emit(TraceEvent::SubtaskEnd {
            name: subtask.name.clone(),
        });

        let value = match std::mem::replace(&mut self.control_flow, ControlFlow::None) {
            ControlFlow::Return(value) => value,
            ControlFlow::None => Value::None,
        };
        Ok(value)
    }

    // ===== Statements =====

    fn execute_statement(&mut self, stmt: &'a Stmt) -> ThinkResult<()> {
        match stmt {
            Stmt::Assignment { target, value, .. } => {
                let value = self.evaluate(value)?;
                self.emit(TraceEvent::VariableAssigned {
                    name: target.clone(),
                    value: value.to_string(),
                });
                self.env.define(target, value);
                Ok(())
            }

            Stmt::Expression { expr, .. } => {
                self.evaluate(expr)?;
                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::None,
                };
                self.control_flow = ControlFlow::Return(value);
                Ok(())
            }

            Stmt::Decide {
                branches,
                else_body,
                ..
            } => {
                for branch in branches {
                    let condition = self.evaluate(&branch.condition)?;
                    if condition.is_truthy() {
                        return self.execute_block(&branch.body);
                    }
                }
                if let Some(else_body) = else_body {
                    return self.execute_block(else_body);
                }
                Ok(())
            }

            Stmt::For {
                binding,
                iterable,
                body,
                ..
            } => self.execute_for(binding, iterable, body),

            Stmt::While {
                condition,
                body,
                location,
            } => self.execute_while(condition, body, location),
        }
    }

    /// Execute a statement sequence, stopping early on a return signal
    fn execute_block(&mut self, body: &'a [Stmt]) -> ThinkResult<()> {
        for stmt in body {
            self.execute_statement(stmt)?;
            if matches!(self.control_flow, ControlFlow::Return(_)) {
                break;
            }
        }
        Ok(())
    }

    fn execute_for(
        &mut self,
        binding: &'a LoopBinding,
        iterable: &'a ForIterable,
        body: &'a [Stmt],
    ) -> ThinkResult<()> {
        let items: Vec<Value> = match iterable {
            ForIterable::Sequence(expr) => {
                let value = self.evaluate(expr)?;
                self.iterable_values(value, expr.location())?
            }
            ForIterable::Range { start, end } => {
                let start = match start {
                    Some(expr) => self.expect_int(expr)?,
                    None => 0,
                };
                let end = self.expect_int(end)?;
                (start..end).map(Value::Int).collect()
            }
            ForIterable::Enumerate(expr) => {
                let value = self.evaluate(expr)?;
                self.iterable_values(value, expr.location())?
            }
        };

        for (index, item) in items.into_iter().enumerate() {
            match binding {
                LoopBinding::Single(name) => {
                    self.env.define(name, item);
                }
                LoopBinding::Pair(index_name, value_name) => {
                    self.env.define(index_name, Value::Int(index as i64));
                    self.env.define(value_name, item);
                }
            }

            self.execute_block(body)?;
            if matches!(self.control_flow, ControlFlow::Return(_)) {
                break;
            }
        }

        Ok(())
    }

    fn execute_while(
        &mut self,
        condition: &'a Expr,
        body: &'a [Stmt],
        location: &SourceLocation,
    ) -> ThinkResult<()> {
        let mut iterations: u64 = 0;

        loop {
            let value = self.evaluate(condition)?;
            if !value.is_truthy() {
                break;
            }

            if let Some(limit) = self.options.max_loop_iterations {
                iterations += 1;
                if iterations > limit {
                    return Err(ThinkError::runtime_error(
                        RuntimeErrorKind::IterationLimit,
                        format!("while loop exceeded {} iterations", limit),
                        location.clone(),
                    ));
                }
            }

            self.execute_block(body)?;
            if matches!(self.control_flow, ControlFlow::Return(_)) {
                break;
            }
        }

        Ok(())
    }

    /// Elements a value yields when iterated: list items, string
    /// characters, or dict keys in insertion order
    fn iterable_values(
        &self,
        value: Value,
        location: &SourceLocation,
    ) -> ThinkResult<Vec<Value>> {
        match value {
            Value::List(items) => Ok(items),
            Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Dict(dict) => Ok(dict.keys().map(|k| Value::Str(k.clone())).collect()),
            other => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("cannot iterate over a {}", other.type_name()),
                location.clone(),
            )),
        }
    }

    fn expect_int(&mut self, expr: &'a Expr) -> ThinkResult<i64> {
        match self.evaluate(expr)? {
            Value::Int(n) => Ok(n),
            other => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("range() expects integer arguments, got {}", other.type_name()),
                expr.location().clone(),
            )),
        }
    }

    // ===== Expressions =====

    fn evaluate(&mut self, expr: &'a Expr) -> ThinkResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                Literal::Integer(n) => Value::Int(*n),
                Literal::Float(f) => Value::Float(*f),
                Literal::String(s) => Value::Str(s.clone()),
                Literal::Boolean(b) => Value::Bool(*b),
            }),

            Expr::Variable { name, location } => {
                self.env.get(name).cloned().ok_or_else(|| {
                    ThinkError::runtime_error(
                        RuntimeErrorKind::UndefinedVariable,
                        format!("variable '{}' has not been assigned", name),
                        location.clone(),
                    )
                })
            }

            Expr::List { items, .. } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate(item)?);
                }
                Ok(Value::List(values))
            }

            Expr::Dict { entries, .. } => {
                let mut dict = DictValue::new();
                for (key_expr, value_expr) in entries {
                    let key = match self.evaluate(key_expr)? {
                        Value::Str(s) => s,
                        other => {
                            return Err(ThinkError::runtime_error(
                                RuntimeErrorKind::TypeMismatch,
                                format!("dict keys must be strings, got {}", other.type_name()),
                                key_expr.location().clone(),
                            ));
                        }
                    };
                    let value = self.evaluate(value_expr)?;
                    dict.insert(key, value);
                }
                Ok(Value::Dict(dict))
            }

            Expr::Binary {
                left,
                operator,
                right,
                location,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.evaluate_binary(*operator, left, right, location)
            }

            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.evaluate(left)?;
                match operator {
                    LogicalOp::And => {
                        if !left.is_truthy() {
                            return Ok(Value::Bool(false));
                        }
                        let right = self.evaluate(right)?;
                        Ok(Value::Bool(right.is_truthy()))
                    }
                    LogicalOp::Or => {
                        if left.is_truthy() {
                            return Ok(Value::Bool(true));
                        }
                        let right = self.evaluate(right)?;
                        Ok(Value::Bool(right.is_truthy()))
                    }
                }
            }

            Expr::Unary {
                operator,
                operand,
                location,
            } => {
                let value = self.evaluate(operand)?;
                match operator {
                    UnaryOp::Negate => match value {
                        Value::Int(n) => Ok(Value::Int(-n)),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        other => Err(ThinkError::runtime_error(
                            RuntimeErrorKind::TypeMismatch,
                            format!("cannot negate a {}", other.type_name()),
                            location.clone(),
                        )),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }

            Expr::Index {
                base,
                index,
                location,
            } => {
                let base = self.evaluate(base)?;
                let index = self.evaluate(index)?;
                self.evaluate_index(base, index, location)
            }

            Expr::Call {
                name,
                arguments,
                location,
            } => self.call_function(name, arguments, location),
        }
    }

    fn evaluate_binary(
        &self,
        operator: BinaryOp,
        left: Value,
        right: Value,
        location: &SourceLocation,
    ) -> ThinkResult<Value> {
        let type_mismatch = |message: String| {
            ThinkError::runtime_error(RuntimeErrorKind::TypeMismatch, message, location.clone())
        };

        match operator {
            BinaryOp::Add => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (Value::List(mut a), Value::List(b)) => {
                    a.extend(b);
                    Ok(Value::List(a))
                }
                (a, b) if a.is_numeric() && b.is_numeric() => {
                    // Mixed numeric operands promote to float
                    Ok(Value::Float(a.as_f64().unwrap() + b.as_f64().unwrap()))
                }
                (a, b) => Err(type_mismatch(format!(
                    "cannot add {} and {}",
                    a.type_name(),
                    b.type_name()
                ))),
            },

            BinaryOp::Subtract | BinaryOp::Multiply => match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(match operator {
                    BinaryOp::Subtract => a - b,
                    _ => a * b,
                })),
                (a, b) if a.is_numeric() && b.is_numeric() => {
                    let (a, b) = (a.as_f64().unwrap(), b.as_f64().unwrap());
                    Ok(Value::Float(match operator {
                        BinaryOp::Subtract => a - b,
                        _ => a * b,
                    }))
                }
                (a, b) => Err(type_mismatch(format!(
                    "cannot apply '{}' to {} and {}",
                    operator.as_str(),
                    a.type_name(),
                    b.type_name()
                ))),
            },

            BinaryOp::Divide => match (&left, &right) {
                (a, b) if a.is_numeric() && b.is_numeric() => {
                    let divisor = b.as_f64().unwrap();
                    if divisor == 0.0 {
                        return Err(ThinkError::runtime_error(
                            RuntimeErrorKind::DivisionByZero,
                            "division by zero",
                            location.clone(),
                        ));
                    }
                    // Division always yields a float
                    Ok(Value::Float(a.as_f64().unwrap() / divisor))
                }
                (a, b) => Err(type_mismatch(format!(
                    "cannot divide {} by {}",
                    a.type_name(),
                    b.type_name()
                ))),
            },

            BinaryOp::Equal => Ok(Value::Bool(left == right)),
            BinaryOp::NotEqual => Ok(Value::Bool(left != right)),

            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                let ordering = match (&left, &right) {
                    (a, b) if a.is_numeric() && b.is_numeric() => a
                        .as_f64()
                        .unwrap()
                        .partial_cmp(&b.as_f64().unwrap()),
                    (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                    (a, b) => {
                        return Err(type_mismatch(format!(
                            "cannot compare {} with {}",
                            a.type_name(),
                            b.type_name()
                        )));
                    }
                };
                let ordering = ordering.ok_or_else(|| {
                    type_mismatch("comparison is undefined for these values".to_string())
                })?;
                Ok(Value::Bool(match operator {
                    BinaryOp::Less => ordering.is_lt(),
                    BinaryOp::LessEqual => ordering.is_le(),
                    BinaryOp::Greater => ordering.is_gt(),
                    _ => ordering.is_ge(),
                }))
            }
        }
    }

    fn evaluate_index(
        &self,
        base: Value,
        index: Value,
        location: &SourceLocation,
    ) -> ThinkResult<Value> {
        match (base, index) {
            (Value::List(items), Value::Int(i)) => {
                let len = items.len() as i64;
                // Negative indices count from the end
                let resolved = if i < 0 { len + i } else { i };
                if resolved < 0 || resolved >= len {
                    return Err(ThinkError::runtime_error(
                        RuntimeErrorKind::IndexError,
                        format!("list index {} out of range (length {})", i, len),
                        location.clone(),
                    ));
                }
                Ok(items[resolved as usize].clone())
            }
            (Value::List(_), other) => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("list indices must be integers, got {}", other.type_name()),
                location.clone(),
            )),
            (Value::Dict(dict), Value::Str(key)) => {
                dict.get(&key).cloned().ok_or_else(|| {
                    ThinkError::runtime_error(
                        RuntimeErrorKind::DictKeyError,
                        format!("key '{}' not found", key),
                        location.clone(),
                    )
                })
            }
            (Value::Dict(_), other) => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("dict keys must be strings, got {}", other.type_name()),
                location.clone(),
            )),
            (other, _) => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("cannot index into a {}", other.type_name()),
                location.clone(),
            )),
        }
    }

    // ===== Calls =====

    /// Two-tier dispatch: the fixed builtin table first, then the
    /// subtask registry by normalized name
    fn call_function(
        &mut self,
        name: &str,
        arguments: &'a [Expr],
        location: &SourceLocation,
    ) -> ThinkResult<Value> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        match name {
            "print" => {
                let text = values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                self.emit(TraceEvent::Output { text: text.clone() });
                self.output.push_str(&text);
                self.output.push('\n');
                Ok(Value::None)
            }
            "sum" => self.builtin_sum(&values, location),
            "len" => self.builtin_len(&values, location),
            "range" => self.builtin_range(&values, location),
            "enumerate" => self.builtin_enumerate(&values, location),
            "max" => self.builtin_extreme(&values, location, "max"),
            "min" => self.builtin_extreme(&values, location, "min"),
            _ => {
                // Subtasks take no parameters; arguments were
                // evaluated for their effects and are discarded
                let key = SubtaskRegistry::normalize(name);
                match self.subtasks.get(&key).copied() {
                    Some(subtask) => self.call_subtask(subtask),
                    None => Err(ThinkError::runtime_error(
                        RuntimeErrorKind::UndefinedCallable,
                        format!("'{}' is neither a builtin nor a declared subtask", name),
                        location.clone(),
                    )),
                }
            }
        }
    }

    fn builtin_sum(&self, args: &[Value], location: &SourceLocation) -> ThinkResult<Value> {
        let items = self.single_list_arg(args, location, "sum")?;

        let mut int_total: i64 = 0;
        let mut float_total: f64 = 0.0;
        let mut saw_float = false;

        for item in items {
            match item {
                Value::Int(n) => {
                    int_total += n;
                    float_total += *n as f64;
                }
                Value::Float(f) => {
                    saw_float = true;
                    float_total += f;
                }
                other => {
                    return Err(ThinkError::runtime_error(
                        RuntimeErrorKind::TypeMismatch,
                        format!("sum() expects numbers, got {}", other.type_name()),
                        location.clone(),
                    ));
                }
            }
        }

        if saw_float {
            Ok(Value::Float(float_total))
        } else {
            Ok(Value::Int(int_total))
        }
    }

    fn builtin_len(&self, args: &[Value], location: &SourceLocation) -> ThinkResult<Value> {
        match args {
            [Value::List(items)] => Ok(Value::Int(items.len() as i64)),
            [Value::Dict(dict)] => Ok(Value::Int(dict.len() as i64)),
            [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
            [other] => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("len() expects a list, dict or string, got {}", other.type_name()),
                location.clone(),
            )),
            _ => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("len() takes exactly one argument, got {}", args.len()),
                location.clone(),
            )),
        }
    }

    fn builtin_range(&self, args: &[Value], location: &SourceLocation) -> ThinkResult<Value> {
        let bounds = match args {
            [Value::Int(end)] => (0, *end),
            [Value::Int(start), Value::Int(end)] => (*start, *end),
            _ => {
                return Err(ThinkError::runtime_error(
                    RuntimeErrorKind::TypeMismatch,
                    "range() expects one or two integer arguments",
                    location.clone(),
                ));
            }
        };
        Ok(Value::List((bounds.0..bounds.1).map(Value::Int).collect()))
    }

    fn builtin_enumerate(&self, args: &[Value], location: &SourceLocation) -> ThinkResult<Value> {
        match args {
            [value] => {
                let items = self.iterable_values(value.clone(), location)?;
                Ok(Value::List(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| Value::List(vec![Value::Int(i as i64), v]))
                        .collect(),
                ))
            }
            _ => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("enumerate() takes exactly one argument, got {}", args.len()),
                location.clone(),
            )),
        }
    }

    fn builtin_extreme(
        &self,
        args: &[Value],
        location: &SourceLocation,
        which: &str,
    ) -> ThinkResult<Value> {
        let candidates: Vec<Value> = match args {
            [Value::List(items)] => items.clone(),
            [] | [_] => {
                return Err(ThinkError::runtime_error(
                    RuntimeErrorKind::TypeMismatch,
                    format!("{}() expects a list or at least two arguments", which),
                    location.clone(),
                ));
            }
            many => many.to_vec(),
        };

        if candidates.is_empty() {
            return Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("{}() of an empty sequence", which),
                location.clone(),
            ));
        }

        let all_numeric = candidates.iter().all(Value::is_numeric);
        let all_strings = candidates.iter().all(|v| matches!(v, Value::Str(_)));
        if !all_numeric && !all_strings {
            return Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("{}() expects all numbers or all strings", which),
                location.clone(),
            ));
        }

        let mut best = candidates[0].clone();
        for candidate in &candidates[1..] {
            let better = if all_numeric {
                let (a, b) = (candidate.as_f64().unwrap(), best.as_f64().unwrap());
                if which == "max" {
                    a > b
                } else {
                    a < b
                }
            } else {
                let (Value::Str(a), Value::Str(b)) = (candidate, &best) else {
                    unreachable!()
                };
                if which == "max" {
                    a > b
                } else {
                    a < b
                }
            };
            if better {
                best = candidate.clone();
            }
        }
        Ok(best)
    }

    fn single_list_arg<'v>(
        &self,
        args: &'v [Value],
        location: &SourceLocation,
        which: &str,
    ) -> ThinkResult<&'v [Value]> {
        match args {
            [Value::List(items)] => Ok(items),
            _ => Err(ThinkError::runtime_error(
                RuntimeErrorKind::TypeMismatch,
                format!("{}() expects a single list argument", which),
                location.clone(),
            )),
        }
    }
}
