//! The `ParseTreeReader` boundary (§6): the interface lowering consumes
//! from the Objective-C grammar lexer/parser, which is itself out of
//! scope here (§1 "Non-goals").
//!
//! Nothing in this crate ships a real Objective-C grammar. What follows
//! is the trait a real parser's CST would implement, plus the one
//! concrete implementer this crate does ship: a small in-memory tree
//! built directly as an enum (`ObjcStmt`/`ObjcExpr`) rather than through
//! a real grammar, matching §10.5's "ParseTreeReader test double". Its
//! variants are Objective-C's own statement/expression shapes, so
//! lowering rules (§4.1) exercise the same dispatch they would against
//! a real CST; there is simply no tokenizer in front of it.

use swiftify_core::Span;

/// Opaque handle to a node in whatever tree a `ParseTreeReader`
/// implementer backs itself with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// The boundary the lowering layer is written against (§6 "Input to
/// lowering"). A real grammar's CST implements this; `swiftify-compiler`
/// ships none, so `lower` is written directly over [`ObjcStmt`]/
/// [`ObjcExpr`] rather than through a generic `dyn ParseTreeReader`
/// dispatcher — see `DESIGN.md` for why a rule-name-driven walker with
/// no real grammar behind it would not be load-bearing.
pub trait ParseTreeReader {
    /// The grammar rule name this node was parsed as (e.g.
    /// `"if_statement"`), used for diagnostics when a rule is
    /// unrecognised.
    fn rule_name(&self, node: NodeId) -> &str;
    fn child(&self, node: NodeId, field: &str) -> Option<NodeId>;
    fn children(&self, node: NodeId, field: &str) -> Vec<NodeId>;
    fn token_text(&self, node: NodeId) -> &str;
    fn span(&self, node: NodeId) -> Span;
}

/// Reference ownership qualifiers recognised on an Objective-C variable
/// declaration (§4.1 "Variable declarations").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjcQualifier {
    Weak,
    UnsafeUnretained,
    Strong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjcVarDeclarator {
    pub name: String,
    /// The spelled-out Objective-C type, handed to the type mapper
    /// unparsed (§4.5).
    pub type_spelling: String,
    pub qualifier: Option<ObjcQualifier>,
    pub is_const: bool,
    pub initializer: Option<ObjcExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjcCaseLabel {
    IntLiteral(i64),
    Range { lo: i64, hi: i64 },
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjcSwitchCase {
    pub labels: Vec<ObjcCaseLabel>,
    pub body: Vec<ObjcStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjcBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjcUnaryOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    AddressOf,
    Deref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjcAssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjcArgument {
    /// The keyword-argument label preceding this piece of a multi-part
    /// Objective-C selector (e.g. the `age` in `initWithName:age:`),
    /// `None` for a plain C-style call argument.
    pub label: Option<String>,
    pub value: ObjcExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjcExprKind {
    IntLiteral(i64),
    DoubleLiteral(f64),
    BoolLiteral(bool),
    StringLiteral(String),
    Nil,
    Identifier(String),
    Binary { op: ObjcBinaryOp, lhs: Box<ObjcExpr>, rhs: Box<ObjcExpr> },
    Assign { op: ObjcAssignOp, target: Box<ObjcExpr>, value: Box<ObjcExpr> },
    /// A message send or a plain C call, both surface as call syntax by
    /// the time lowering sees them; `callee` is already resolved to a
    /// receiver-like expression and `args` carries the (possibly
    /// multi-part) selector pieces.
    Call { callee: Box<ObjcExpr>, args: Vec<ObjcArgument> },
    Subscript { target: Box<ObjcExpr>, index: Box<ObjcExpr> },
    Member { target: Box<ObjcExpr>, member: String },
    Unary { op: ObjcUnaryOp, operand: Box<ObjcExpr> },
    /// A C-style cast `(T)e`; Objective-C has no checked-cast syntax, so
    /// lowering always treats this as a forced cast (§4.1).
    Cast { type_spelling: String, operand: Box<ObjcExpr> },
    Ternary { cond: Box<ObjcExpr>, then_branch: Box<ObjcExpr>, else_branch: Box<ObjcExpr> },
    /// An Objective-C block literal `^(params){ body }`.
    BlockLiteral { params: Vec<String>, body: Vec<ObjcStmt> },
    Paren(Box<ObjcExpr>),
    /// A parse-tree context lowering has no rule for; carries the
    /// verbatim spelling (§4.1 "Failure semantics").
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjcExpr {
    pub kind: ObjcExprKind,
    pub span: Span,
}

impl ObjcExpr {
    pub fn new(kind: ObjcExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjcStmtKind {
    Expr(ObjcExpr),
    VarDecl(Vec<ObjcVarDeclarator>),
    If { cond: ObjcExpr, then_branch: Box<ObjcStmt>, else_branch: Option<Box<ObjcStmt>> },
    Switch { subject: ObjcExpr, cases: Vec<ObjcSwitchCase> },
    While { cond: ObjcExpr, body: Box<ObjcStmt> },
    DoWhile { body: Box<ObjcStmt>, cond: ObjcExpr },
    For {
        init: Option<Box<ObjcStmt>>,
        cond: Option<ObjcExpr>,
        step: Option<ObjcExpr>,
        body: Box<ObjcStmt>,
    },
    /// `for (T v in e) S`.
    ForIn { var_name: String, collection: ObjcExpr, body: Box<ObjcStmt> },
    /// `@synchronized(e) { ... }` (§4.1 "Synchronisation").
    Synchronized { lock_expr: ObjcExpr, body: Vec<ObjcStmt> },
    /// `@autoreleasepool { ... }` (§4.1 "Autorelease").
    Autoreleasepool { body: Vec<ObjcStmt> },
    /// `@try { ... } @catch (T *e) { ... } ... @finally { ... }`.
    TryCatch {
        body: Vec<ObjcStmt>,
        catches: Vec<(Option<String>, Vec<ObjcStmt>)>,
        finally: Option<Vec<ObjcStmt>>,
    },
    Break,
    Continue,
    /// `@throw e;`.
    Throw(ObjcExpr),
    Return(Option<ObjcExpr>),
    Compound(Vec<ObjcStmt>),
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjcStmt {
    pub kind: ObjcStmtKind,
    pub span: Span,
}

impl ObjcStmt {
    pub fn new(kind: ObjcStmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// A minimal arena-backed tree over [`ObjcStmt`]/[`ObjcExpr`] that
/// implements [`ParseTreeReader`] directly, satisfying §6's contract
/// without a real grammar behind it. `rule_name` reports each node's
/// variant name; `child`/`children`/`token_text` are only meaningful
/// for the small set of fields callers that hold a `NodeId` (rather
/// than an owned `ObjcStmt`/`ObjcExpr`, as `lower` does) would need.
#[derive(Debug, Default)]
pub struct ObjcTree {
    stmts: Vec<ObjcStmt>,
}

impl ObjcTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stmt(&mut self, stmt: ObjcStmt) -> NodeId {
        let id = NodeId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn stmt(&self, id: NodeId) -> &ObjcStmt {
        &self.stmts[id.0 as usize]
    }
}

impl ParseTreeReader for ObjcTree {
    fn rule_name(&self, node: NodeId) -> &str {
        match &self.stmt(node).kind {
            ObjcStmtKind::Expr(_) => "expression_statement",
            ObjcStmtKind::VarDecl(_) => "declaration",
            ObjcStmtKind::If { .. } => "if_statement",
            ObjcStmtKind::Switch { .. } => "switch_statement",
            ObjcStmtKind::While { .. } => "while_statement",
            ObjcStmtKind::DoWhile { .. } => "do_statement",
            ObjcStmtKind::For { .. } => "for_statement",
            ObjcStmtKind::ForIn { .. } => "for_in_statement",
            ObjcStmtKind::Synchronized { .. } => "synchronized_statement",
            ObjcStmtKind::Autoreleasepool { .. } => "autoreleasepool_statement",
            ObjcStmtKind::TryCatch { .. } => "try_statement",
            ObjcStmtKind::Break => "break_statement",
            ObjcStmtKind::Continue => "continue_statement",
            ObjcStmtKind::Throw(_) => "throw_statement",
            ObjcStmtKind::Return(_) => "return_statement",
            ObjcStmtKind::Compound(_) => "compound_statement",
            ObjcStmtKind::Unrecognized(_) => "ERROR",
        }
    }

    fn child(&self, _node: NodeId, _field: &str) -> Option<NodeId> {
        None
    }

    fn children(&self, _node: NodeId, _field: &str) -> Vec<NodeId> {
        Vec::new()
    }

    fn token_text(&self, node: NodeId) -> &str {
        match &self.stmt(node).kind {
            ObjcStmtKind::Unrecognized(text) => text,
            _ => "",
        }
    }

    fn span(&self, node: NodeId) -> Span {
        self.stmt(node).span
    }
}
