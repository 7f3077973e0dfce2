//! Abstract Syntax Tree (AST) definitions for Catapillar
//!
//! These types represent the structure of a Catapillar program after parsing.
//! Nodes are built once by the parser and only read afterwards.

use crate::errors::SourceSpan;
use crate::lexer::{ActionWord, LineState};
use serde::Serialize;
use std::fmt;

/// A complete Catapillar program
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub flows: Vec<Flow>,
}

impl Program {
    /// Every arrow edge, in source order
    pub fn arrows(&self) -> impl Iterator<Item = &Arrow> {
        self.statements().filter_map(|stmt| match stmt {
            Stmt::Arrow(arrow) => Some(arrow),
            _ => None,
        })
    }

    /// Pretty JSON dump of the tree
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// All statements, flattened across flows and segments
    pub fn statements(&self) -> impl Iterator<Item = &Stmt> {
        self.flows
            .iter()
            .flat_map(|flow| flow.segments.iter())
            .flat_map(|segment| segment.stmts.iter())
    }
}

/// An ordered run of segments
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Flow {
    pub segments: Vec<Segment>,
}

/// Statements between two segment breaks
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Segment {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    /// An action line: `置 x 5`, `若 x > 3:`
    Line(Line),
    /// A named scope header: `main:`
    Block { name: String, state: LineState },
    /// Explicit block terminator: `终`
    BlockEnd {
        state: LineState,
        pictograph: Option<String>,
    },
    /// Flow-graph edge: `a -> b`
    Arrow(Arrow),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub action: Action,
    pub state: LineState,
    pub pictograph: Option<String>,
    pub line: usize,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// The action-specific part of a line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action")]
pub enum Action {
    Set {
        name: String,
        value: Expr,
    },
    /// `置 xs [ i ] v`
    IndexSet {
        container: String,
        index: Expr,
        value: Expr,
    },
    Print {
        value: Option<Expr>,
    },
    If {
        condition: Expr,
    },
    Elif {
        condition: Expr,
    },
    Else,
    While {
        condition: Expr,
    },
    For {
        var: String,
        iterable: Expr,
    },
    Def {
        name: String,
        params: Vec<String>,
    },
    Return {
        value: Option<Expr>,
    },
    Call {
        func: String,
        args: Vec<Expr>,
    },
    Global {
        names: Vec<String>,
    },
    Break,
    Continue,
    Pass,
    Try,
    Except {
        exception: Option<String>,
    },
    Finally,
    /// Legacy standalone arithmetic: `加 result left right`.
    /// The raw words are kept; their shape is checked at generation time.
    Arith {
        op: ArithOp,
        args: Vec<String>,
    },
}

impl Action {
    /// The canonical action word this node was built from
    pub fn word(&self) -> ActionWord {
        match self {
            Action::Set { .. } | Action::IndexSet { .. } => ActionWord::Set,
            Action::Print { .. } => ActionWord::Print,
            Action::If { .. } => ActionWord::If,
            Action::Elif { .. } => ActionWord::Elif,
            Action::Else => ActionWord::Else,
            Action::While { .. } => ActionWord::While,
            Action::For { .. } => ActionWord::For,
            Action::Def { .. } => ActionWord::Def,
            Action::Return { .. } => ActionWord::Return,
            Action::Call { .. } => ActionWord::Call,
            Action::Global { .. } => ActionWord::Global,
            Action::Break => ActionWord::Break,
            Action::Continue => ActionWord::Continue,
            Action::Pass => ActionWord::Pass,
            Action::Try => ActionWord::Try,
            Action::Except { .. } => ActionWord::Except,
            Action::Finally => ActionWord::Finally,
            Action::Arith { op, .. } => match op {
                ArithOp::Add => ActionWord::Add,
                ArithOp::Sub => ActionWord::Sub,
                ArithOp::Mul => ActionWord::Mul,
                ArithOp::Div => ActionWord::Div,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub direction: ArrowDirection,
    pub state: LineState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrowDirection {
    /// `->`
    Forward,
    /// `<-`
    Backward,
}

impl ArrowDirection {
    pub fn from_marker(s: &str) -> Option<ArrowDirection> {
        match s {
            "->" => Some(ArrowDirection::Forward),
            "<-" => Some(ArrowDirection::Backward),
            _ => None,
        }
    }
}

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    /// Numeric literal, kept as written
    Number { value: String },
    Bool { value: bool },
    None,
    Ident { name: String },
    /// Text. `quoted` is set for a backtick string and clear for bare
    /// words that did not resolve to a name.
    Str { value: String, quoted: bool },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    List { elements: Vec<Expr> },
    Dict { entries: Vec<DictEntry> },
    Index {
        container: Box<Expr>,
        index: Box<Expr>,
    },
    Call { func: String, args: Vec<Expr> },
}

impl Expr {
    pub fn number(value: impl Into<String>) -> Self {
        Expr::Number {
            value: value.into(),
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident { name: name.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Str {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Expr::Str {
            value: value.into(),
            quoted: true,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Whether this node is a genuine operator combination, the only thing
    /// parentheses may wrap
    pub fn is_grouping_target(&self) -> bool {
        matches!(self, Expr::Binary { .. } | Expr::Index { .. } | Expr::Call { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictEntry {
    pub key: Expr,
    pub value: Expr,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Map a canonical comparison spelling to its operator
    pub fn comparison(s: &str) -> Option<BinaryOp> {
        match s {
            "==" => Some(BinaryOp::Eq),
            "!=" => Some(BinaryOp::Ne),
            "<" => Some(BinaryOp::Lt),
            "<=" => Some(BinaryOp::Le),
            ">" => Some(BinaryOp::Gt),
            ">=" => Some(BinaryOp::Ge),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }
}
