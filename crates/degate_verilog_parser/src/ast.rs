//! AST node types for the netlist parser.
//!
//! Every node carries a [`Span`]. Error recovery is represented by
//! `Error(Span)` variants in [`ModuleItem`], [`Statement`] and [`Expr`];
//! constructs the importer has no use for are kept as `Other` nodes naming
//! their kind, so unrecognized input stays visible downstream.

use degate_common::Span;
use serde::{Deserialize, Serialize};

// ============================================================================
// Top-level
// ============================================================================

/// A complete source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerilogSourceFile {
    /// The top-level items in this file.
    pub items: Vec<VerilogItem>,
    /// The span covering the entire file.
    pub span: Span,
}

impl VerilogSourceFile {
    /// Iterates over the module declarations in the file.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDecl> {
        self.items.iter().filter_map(|item| match item {
            VerilogItem::Module(m) => Some(m),
            VerilogItem::Error(_) => None,
        })
    }
}

/// A top-level item in a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerilogItem {
    /// A module declaration.
    Module(ModuleDecl),
    /// An error node produced during error recovery.
    Error(Span),
}

// ============================================================================
// Module
// ============================================================================

/// A module declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// The module name.
    pub name: String,
    /// Port declarations made in the header (ANSI style).
    pub ports: Vec<PortDecl>,
    /// Port names listed in the header (non-ANSI style).
    pub port_names: Vec<String>,
    /// Items declared inside the module body.
    pub items: Vec<ModuleItem>,
    /// Source span.
    pub span: Span,
}

/// A port declaration, in the header or in the module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDecl {
    /// Port direction.
    pub direction: Direction,
    /// Optional net kind (`wire` or `reg`).
    pub net_type: Option<NetType>,
    /// Optional bit range (e.g., `[7:0]`).
    pub range: Option<Range>,
    /// The declared port names.
    pub names: Vec<String>,
    /// Source span.
    pub span: Span,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
}

/// Net or variable kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetType {
    /// `wire`, `tri`, `supply0` or `supply1`
    Wire,
    /// `reg`
    Reg,
}

// ============================================================================
// Module items
// ============================================================================

/// An item declared inside a module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleItem {
    /// A port declaration in the body (non-ANSI style).
    PortDecl(PortDecl),
    /// A `wire` or `reg` declaration.
    NetDecl(NetDecl),
    /// A continuous assignment.
    ContinuousAssign(ContinuousAssign),
    /// An `always` block.
    AlwaysBlock(AlwaysBlock),
    /// An attribute instance such as `(* CARRY *)`.
    Pragma(Pragma),
    /// A construct parsed only far enough to skip it.
    Other(OtherItem),
    /// An error node produced during error recovery.
    Error(Span),
}

/// A `wire` or `reg` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetDecl {
    /// The declaration kind.
    pub net_type: NetType,
    /// Optional bit range.
    pub range: Option<Range>,
    /// Declared names with optional initial value.
    pub names: Vec<DeclName>,
    /// Source span.
    pub span: Span,
}

/// A declared name with optional initializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclName {
    /// The identifier.
    pub name: String,
    /// Optional initial value (`reg q = 0;`, `wire w = a & b;`).
    pub init: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// A continuous assignment (e.g., `assign y = a & b;`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// The target net.
    pub target: Expr,
    /// The value expression.
    pub value: Expr,
    /// Source span.
    pub span: Span,
}

/// An `always` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlwaysBlock {
    /// The body statement, normally an event-controlled statement.
    pub body: Statement,
    /// Source span.
    pub span: Span,
}

/// An attribute instance `(* name [= value], ... *)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pragma {
    /// The attribute names, in order.
    pub entries: Vec<String>,
    /// Source span.
    pub span: Span,
}

impl Pragma {
    /// Returns `true` if the pragma carries the entry `name`.
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }
}

/// A skipped construct: instance, gate, parameter, `initial`, function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherItem {
    /// The kind of construct, e.g. `initial` or `instance`.
    pub kind: String,
    /// Identifiers appearing in the construct, in order, without repeats.
    pub attributes: Vec<String>,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

/// A statement in a procedural block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// A blocking assignment (e.g., `a = b;`).
    Blocking {
        /// Target expression.
        target: Expr,
        /// Value expression.
        value: Expr,
        /// Source span.
        span: Span,
    },
    /// A non-blocking assignment (e.g., `q <= d;`).
    NonBlocking {
        /// Target expression.
        target: Expr,
        /// Value expression.
        value: Expr,
        /// Source span.
        span: Span,
    },
    /// A `begin ... end` block, optionally labeled.
    Block {
        /// Optional block label.
        label: Option<String>,
        /// Statements in the block.
        stmts: Vec<Statement>,
        /// Source span.
        span: Span,
    },
    /// An `if` statement with optional `else`.
    If {
        /// The condition.
        condition: Expr,
        /// The statement executed when the condition holds.
        then_stmt: Box<Statement>,
        /// The `else` statement, if any.
        else_stmt: Option<Box<Statement>>,
        /// Source span.
        span: Span,
    },
    /// An event-controlled statement (e.g., `@(posedge clk) stmt`).
    EventControl {
        /// The sensitivity list.
        sensitivity: SensitivityList,
        /// The controlled statement.
        body: Box<Statement>,
        /// Source span.
        span: Span,
    },
    /// A null statement (`;`).
    Null {
        /// Source span.
        span: Span,
    },
    /// A statement parsed only far enough to skip it (`case`, loops,
    /// system task calls, delays).
    Other {
        /// The kind of statement, e.g. `case`.
        kind: String,
        /// Source span.
        span: Span,
    },
    /// An error node produced during error recovery.
    Error(Span),
}

impl Statement {
    /// Returns the source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::Blocking { span, .. }
            | Statement::NonBlocking { span, .. }
            | Statement::Block { span, .. }
            | Statement::If { span, .. }
            | Statement::EventControl { span, .. }
            | Statement::Null { span }
            | Statement::Other { span, .. }
            | Statement::Error(span) => *span,
        }
    }

    /// A short name for the kind of statement, used in error messages.
    pub fn kind_name(&self) -> &str {
        match self {
            Statement::Blocking { .. } => "blocking assignment",
            Statement::NonBlocking { .. } => "non-blocking assignment",
            Statement::Block { .. } => "block",
            Statement::If { .. } => "if statement",
            Statement::EventControl { .. } => "event control",
            Statement::Null { .. } => "null statement",
            Statement::Other { kind, .. } => kind.as_str(),
            Statement::Error(_) => "error",
        }
    }
}

// ============================================================================
// Sensitivity list
// ============================================================================

/// A sensitivity list for an event control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SensitivityList {
    /// `@*` or `@(*)`
    Star,
    /// An explicit list separated by `or` or `,`.
    List(Vec<SensitivityItem>),
}

/// A single item in a sensitivity list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityItem {
    /// Optional edge specifier.
    pub edge: Option<EdgeKind>,
    /// The signal expression.
    pub signal: Expr,
    /// Source span.
    pub span: Span,
}

/// An edge specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
}

// ============================================================================
// Ranges
// ============================================================================

/// A bit range (e.g., `[7:0]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    /// The MSB (left) expression.
    pub msb: Expr,
    /// The LSB (right) expression.
    pub lsb: Expr,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

/// An expression node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// A simple identifier.
    Identifier {
        /// The identifier text.
        name: String,
        /// Source span.
        span: Span,
    },
    /// A numeric literal; the text is kept verbatim (e.g., `1'b0`).
    Literal {
        /// The literal text.
        text: String,
        /// Source span.
        span: Span,
    },
    /// A string literal.
    StringLiteral {
        /// Source span.
        span: Span,
    },
    /// A bit select (e.g., `data[7]`).
    Index {
        /// The base expression.
        base: Box<Expr>,
        /// The index expression.
        index: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A range select (e.g., `data[7:0]`).
    RangeSelect {
        /// The base expression.
        base: Box<Expr>,
        /// The MSB expression.
        msb: Box<Expr>,
        /// The LSB expression.
        lsb: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A concatenation (e.g., `{a, b, c}`).
    Concat {
        /// The concatenated expressions.
        elements: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// A replication (e.g., `{3{a}}`).
    Repeat {
        /// The repetition count expression.
        count: Box<Expr>,
        /// The replicated elements.
        elements: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// The operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A ternary conditional expression (e.g., `sel ? a : b`).
    Ternary {
        /// The condition.
        condition: Box<Expr>,
        /// The true-branch expression.
        then_expr: Box<Expr>,
        /// The false-branch expression.
        else_expr: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// A function call (e.g., `f(a, b)` or `$signed(a)`).
    FuncCall {
        /// The function name.
        name: String,
        /// The arguments.
        args: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// A parenthesized expression.
    Paren {
        /// The inner expression.
        inner: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// An error node produced during error recovery.
    Error(Span),
}

impl Expr {
    /// Returns the source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier { span, .. }
            | Expr::Literal { span, .. }
            | Expr::StringLiteral { span }
            | Expr::Index { span, .. }
            | Expr::RangeSelect { span, .. }
            | Expr::Concat { span, .. }
            | Expr::Repeat { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::FuncCall { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Error(span) => *span,
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren { inner, .. } = expr {
            expr = inner;
        }
        expr
    }

    /// Returns the identifier if this expression is a bare name.
    pub fn as_identifier(&self) -> Option<&str> {
        match self.unparen() {
            Expr::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `!`
    LogNot,
    /// `~`
    BitNot,
    /// `&`
    RedAnd,
    /// `~&`
    RedNand,
    /// `|`
    RedOr,
    /// `~|`
    RedNor,
    /// `^`
    RedXor,
    /// `~^` or `^~`
    RedXnor,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `===`
    CaseEq,
    /// `!==`
    CaseNeq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    LogAnd,
    /// `||`
    LogOr,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `~^` or `^~`
    BitXnor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `<<<`
    AShl,
    /// `>>>`
    AShr,
}

impl BinaryOp {
    /// The operator as written in source.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::CaseEq => "===",
            BinaryOp::CaseNeq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::LogAnd => "&&",
            BinaryOp::LogOr => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitXnor => "~^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AShl => "<<<",
            BinaryOp::AShr => ">>>",
        }
    }
}
