//! Abstract Syntax Tree definitions
//!
//! This module defines the AST node types for the Think language.

use crate::error::SourceLocation;

/// Root AST node representing a complete program
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Every `objective` declaration seen at the top of the file.
    /// The parser collects them all so the validator can report
    /// missing or duplicate objectives with positions.
    pub objectives: Vec<Objective>,
    /// Task declarations in declaration order
    pub tasks: Vec<Task>,
    /// Run statements in execution order
    pub runs: Vec<RunStmt>,
}

impl Program {
    /// The program's objective text, if one was declared
    pub fn objective(&self) -> Option<&str> {
        self.objectives.first().map(|o| o.text.as_str())
    }
}

/// An `objective "..."` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub text: String,
    pub location: SourceLocation,
}

/// A named top-level unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub members: Vec<TaskMember>,
    pub location: SourceLocation,
}

/// A task body entry: steps and subtasks may interleave in any order
#[derive(Debug, Clone, PartialEq)]
pub enum TaskMember {
    Step(Step),
    Subtask(Subtask),
}

/// A named sequence of side-effecting statements
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub name: String,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// A named, callable, value-returning unit sharing its task's environment
#[derive(Debug, Clone, PartialEq)]
pub struct Subtask {
    pub name: String,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// A top-level `run "Task"` directive
#[derive(Debug, Clone, PartialEq)]
pub struct RunStmt {
    pub task: String,
    pub location: SourceLocation,
}

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Assignment: x = expression
    Assignment {
        target: String,
        value: Expr,
        location: SourceLocation,
    },

    /// Decide block: if/elif branches evaluated top-down, optional else
    Decide {
        branches: Vec<DecideBranch>,
        else_body: Option<Vec<Stmt>>,
        location: SourceLocation,
    },

    /// For loop over a sequence, range, or enumerate
    For {
        binding: LoopBinding,
        iterable: ForIterable,
        body: Vec<Stmt>,
        location: SourceLocation,
    },

    /// While loop, condition re-checked before each iteration
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },

    /// Return statement, legal only inside subtask bodies
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },

    /// Expression statement (typically a call)
    Expression { expr: Expr, location: SourceLocation },
}

/// One `if`/`elif` arm of a decide block
#[derive(Debug, Clone, PartialEq)]
pub struct DecideBranch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Loop variable binding
#[derive(Debug, Clone, PartialEq)]
pub enum LoopBinding {
    /// for item in ...
    Single(String),
    /// for index, value in enumerate(...)
    Pair(String, String),
}

/// The three iteration forms of a for loop
#[derive(Debug, Clone, PartialEq)]
pub enum ForIterable {
    /// for item in expr
    Sequence(Expr),
    /// for i in range(end) / range(start, end)
    Range {
        start: Option<Box<Expr>>,
        end: Box<Expr>,
    },
    /// for index, value in enumerate(expr)
    Enumerate(Expr),
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal {
        value: Literal,
        location: SourceLocation,
    },

    /// Variable reference
    Variable {
        name: String,
        location: SourceLocation,
    },

    /// List literal
    List {
        items: Vec<Expr>,
        location: SourceLocation,
    },

    /// Dict literal: ordered key/value pairs, last write wins on duplicates
    Dict {
        entries: Vec<(Expr, Expr)>,
        location: SourceLocation,
    },

    /// Binary operation
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        location: SourceLocation,
    },

    /// Logical operation (and, or) with short-circuit evaluation
    Logical {
        left: Box<Expr>,
        operator: LogicalOp,
        right: Box<Expr>,
        location: SourceLocation,
    },

    /// Unary operation
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },

    /// Indexing: base[index]
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },

    /// Call by name. Builtin-vs-subtask resolution happens at runtime.
    Call {
        name: String,
        arguments: Vec<Expr>,
        location: SourceLocation,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl Expr {
    /// Source location of this expression
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expr::Literal { location, .. }
            | Expr::Variable { location, .. }
            | Expr::List { location, .. }
            | Expr::Dict { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Logical { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Index { location, .. }
            | Expr::Call { location, .. } => location,
        }
    }
}

impl Stmt {
    /// Source location of this statement
    pub fn location(&self) -> &SourceLocation {
        match self {
            Stmt::Assignment { location, .. }
            | Stmt::Decide { location, .. }
            | Stmt::For { location, .. }
            | Stmt::While { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Expression { location, .. } => location,
        }
    }
}
