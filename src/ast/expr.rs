use crate::ast::{
    AggregateFunc, BinaryOp, DeleteExpression, InsertExpression, InsertFromQueryExpression,
    JoinExpression, OrderType, SelectExpression, SqlType, TableExpression, UnaryOp,
    UnionExpression, UpdateExpression, Value, WindowFunc,
};
use std::any::Any;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared handle to an immutable expression node.
///
/// Rewrites compare children with [`Arc::ptr_eq`] to decide whether a parent
/// must be rebuilt.
pub type Expr = Arc<SqlExpression>;

/// Dialect-specific extra properties attached to a node.
pub type ExtraProperties = BTreeMap<String, Value>;

/// Every SQL construct sqlweave can express.
///
/// Nodes carry no behavior; visitors in [`crate::visitor`] walk and rewrite
/// them, and [`crate::formatter::SqlFormatter`] renders them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlExpression {
    Column(ColumnExpression),
    Argument(ArgumentExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Function(FunctionExpression),
    Aggregate(AggregateExpression),
    Window(WindowExpression),
    Cast(CastExpression),
    Between(BetweenExpression),
    InList(InListExpression),
    Exists(ExistsExpression),
    CaseWhen(CaseWhenExpression),
    ColumnDeclaring(ColumnDeclaringExpression),
    OrderBy(OrderByExpression),
    ColumnAssignment(ColumnAssignmentExpression),
    Table(TableExpression),
    Join(JoinExpression),
    Select(SelectExpression),
    Union(UnionExpression),
    Insert(InsertExpression),
    InsertFromQuery(InsertFromQueryExpression),
    Update(UpdateExpression),
    Delete(DeleteExpression),
    /// A node outside the closed set, contributed by a dialect.
    Extension(ExtensionExpression),
}

impl SqlExpression {
    /// Whether this node has no sub-expression children.
    pub fn is_leaf(&self) -> bool {
        match self {
            SqlExpression::Column(_) | SqlExpression::Argument(_) | SqlExpression::Table(_) => true,
            SqlExpression::Extension(ext) => ext.node.is_leaf(),
            _ => false,
        }
    }

    /// The SQL type of a scalar expression, `None` for statements and sources.
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            SqlExpression::Column(e) => Some(e.sql_type.clone()),
            SqlExpression::Argument(e) => Some(e.sql_type.clone()),
            SqlExpression::Unary(e) => Some(e.sql_type.clone()),
            SqlExpression::Binary(e) => Some(e.sql_type.clone()),
            SqlExpression::Function(e) => Some(e.sql_type.clone()),
            SqlExpression::Aggregate(e) => Some(e.sql_type.clone()),
            SqlExpression::Window(e) => Some(e.sql_type.clone()),
            SqlExpression::Cast(e) => Some(e.sql_type.clone()),
            SqlExpression::Between(_) | SqlExpression::InList(_) | SqlExpression::Exists(_) => {
                Some(SqlType::Boolean)
            }
            SqlExpression::CaseWhen(e) => Some(e.sql_type.clone()),
            SqlExpression::ColumnDeclaring(e) => e.expression.sql_type(),
            SqlExpression::OrderBy(e) => e.expression.sql_type(),
            SqlExpression::Extension(e) => e.node.sql_type(),
            _ => None,
        }
    }

    /// Extra properties of this node.
    pub fn extra(&self) -> &ExtraProperties {
        match self {
            SqlExpression::Column(e) => &e.extra,
            SqlExpression::Argument(e) => &e.extra,
            SqlExpression::Unary(e) => &e.extra,
            SqlExpression::Binary(e) => &e.extra,
            SqlExpression::Function(e) => &e.extra,
            SqlExpression::Aggregate(e) => &e.extra,
            SqlExpression::Window(e) => &e.extra,
            SqlExpression::Cast(e) => &e.extra,
            SqlExpression::Between(e) => &e.extra,
            SqlExpression::InList(e) => &e.extra,
            SqlExpression::Exists(e) => &e.extra,
            SqlExpression::CaseWhen(e) => &e.extra,
            SqlExpression::ColumnDeclaring(e) => &e.extra,
            SqlExpression::OrderBy(e) => &e.extra,
            SqlExpression::ColumnAssignment(e) => &e.extra,
            SqlExpression::Table(e) => &e.extra,
            SqlExpression::Join(e) => &e.extra,
            SqlExpression::Select(e) => &e.extra,
            SqlExpression::Union(e) => &e.extra,
            SqlExpression::Insert(e) => &e.extra,
            SqlExpression::InsertFromQuery(e) => &e.extra,
            SqlExpression::Update(e) => &e.extra,
            SqlExpression::Delete(e) => &e.extra,
            SqlExpression::Extension(e) => &e.extra,
        }
    }

    /// Short variant name, used in error messages.
    pub fn kind(&self) -> &str {
        match self {
            SqlExpression::Column(_) => "Column",
            SqlExpression::Argument(_) => "Argument",
            SqlExpression::Unary(_) => "Unary",
            SqlExpression::Binary(_) => "Binary",
            SqlExpression::Function(_) => "Function",
            SqlExpression::Aggregate(_) => "Aggregate",
            SqlExpression::Window(_) => "Window",
            SqlExpression::Cast(_) => "Cast",
            SqlExpression::Between(_) => "Between",
            SqlExpression::InList(_) => "InList",
            SqlExpression::Exists(_) => "Exists",
            SqlExpression::CaseWhen(_) => "CaseWhen",
            SqlExpression::ColumnDeclaring(_) => "ColumnDeclaring",
            SqlExpression::OrderBy(_) => "OrderBy",
            SqlExpression::ColumnAssignment(_) => "ColumnAssignment",
            SqlExpression::Table(_) => "Table",
            SqlExpression::Join(_) => "Join",
            SqlExpression::Select(_) => "Select",
            SqlExpression::Union(_) => "Union",
            SqlExpression::Insert(_) => "Insert",
            SqlExpression::InsertFromQuery(_) => "InsertFromQuery",
            SqlExpression::Update(_) => "Update",
            SqlExpression::Delete(_) => "Delete",
            SqlExpression::Extension(e) => e.node.name(),
        }
    }

    /// Select and union expressions are queries.
    pub fn is_query(&self) -> bool {
        matches!(self, SqlExpression::Select(_) | SqlExpression::Union(_))
    }

    /// Ordering of a query, empty for other nodes.
    pub fn query_order_by(&self) -> &[Expr] {
        match self {
            SqlExpression::Select(e) => &e.order_by,
            SqlExpression::Union(e) => &e.order_by,
            _ => &[],
        }
    }

    /// `(offset, limit)` of a query.
    pub fn query_pagination(&self) -> (Option<usize>, Option<usize>) {
        match self {
            SqlExpression::Select(e) => (e.offset, e.limit),
            SqlExpression::Union(e) => (e.offset, e.limit),
            _ => (None, None),
        }
    }

    /// Alias of a query used as a nested source.
    pub fn query_alias(&self) -> Option<&str> {
        match self {
            SqlExpression::Select(e) => e.table_alias.as_deref(),
            SqlExpression::Union(e) => e.table_alias.as_deref(),
            _ => None,
        }
    }

    /// Copy of a query with its ordering and pagination removed, `None` for other nodes.
    pub fn without_ordering_and_pagination(&self) -> Option<SqlExpression> {
        match self {
            SqlExpression::Select(e) => Some(SqlExpression::Select(SelectExpression {
                order_by: Vec::new(),
                offset: None,
                limit: None,
                ..e.clone()
            })),
            SqlExpression::Union(e) => Some(SqlExpression::Union(UnionExpression {
                order_by: Vec::new(),
                offset: None,
                limit: None,
                ..e.clone()
            })),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnExpression {
    /// The table or alias that qualifies this column.
    pub table: Option<Expr>,
    pub name: String,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

/// A bound argument, rendered as a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentExpression {
    pub value: Value,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnaryExpression {
    pub op: UnaryOp,
    pub operand: Expr,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryExpression {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionExpression {
    pub name: String,
    pub arguments: Vec<Expr>,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

/// An aggregate call. A missing argument renders as `count(*)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateExpression {
    pub func: AggregateFunc,
    pub argument: Option<Expr>,
    pub distinct: bool,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowExpression {
    pub func: WindowFunc,
    pub arguments: Vec<Expr>,
    pub partition_by: Vec<Expr>,
    /// [`OrderByExpression`] nodes.
    pub order_by: Vec<Expr>,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CastExpression {
    pub expression: Expr,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BetweenExpression {
    pub expression: Expr,
    pub lower: Expr,
    pub upper: Expr,
    pub not_between: bool,
    pub extra: ExtraProperties,
}

/// `left in (values...)` or `left in (query)`; `query` wins when both are set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InListExpression {
    pub left: Expr,
    pub query: Option<Expr>,
    pub values: Vec<Expr>,
    pub not_in: bool,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExistsExpression {
    pub query: Expr,
    pub not_exists: bool,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseWhenExpression {
    /// Simple-case operand, `None` for a searched case.
    pub operand: Option<Expr>,
    pub when_clauses: Vec<(Expr, Expr)>,
    pub else_clause: Option<Expr>,
    pub sql_type: SqlType,
    pub extra: ExtraProperties,
}

/// An expression in a select list, with an optional output alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDeclaringExpression {
    pub expression: Expr,
    pub declared_name: Option<String>,
    pub extra: ExtraProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderByExpression {
    pub expression: Expr,
    pub order_type: OrderType,
    pub extra: ExtraProperties,
}

/// `column = expression` inside insert and update statements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnAssignmentExpression {
    /// A [`ColumnExpression`] node.
    pub column: Expr,
    pub expression: Expr,
    pub extra: ExtraProperties,
}

/// Contract for node types contributed by dialect modules.
///
/// Extension nodes reach visitors through `visit_unknown`; a dialect that
/// formats them recognizes its own types with [`ExtensionNode::as_any`].
pub trait ExtensionNode: std::fmt::Debug + Send + Sync + 'static {
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn is_leaf(&self) -> bool {
        false
    }

    fn sql_type(&self) -> Option<SqlType> {
        None
    }

    /// Sub-expressions, in a stable order.
    fn children(&self) -> Vec<Expr> {
        Vec::new()
    }

    /// Rebuild this node from replacement children given in [`ExtensionNode::children`] order.
    fn with_children(&self, children: Vec<Expr>) -> Arc<dyn ExtensionNode>;

    fn dyn_eq(&self, other: &dyn ExtensionNode) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

/// Structural equality helper for [`ExtensionNode::dyn_eq`] implementations.
pub fn extension_eq<T: PartialEq + 'static>(this: &T, other: &dyn ExtensionNode) -> bool {
    other
        .as_any()
        .downcast_ref::<T>()
        .is_some_and(|other| other == this)
}

#[derive(Debug, Clone)]
pub struct ExtensionExpression {
    pub node: Arc<dyn ExtensionNode>,
    pub extra: ExtraProperties,
}

impl ExtensionExpression {
    pub fn new(node: Arc<dyn ExtensionNode>) -> Self {
        Self {
            node,
            extra: ExtraProperties::new(),
        }
    }
}

impl PartialEq for ExtensionExpression {
    fn eq(&self, other: &Self) -> bool {
        self.node.dyn_eq(other.node.as_ref()) && self.extra == other.extra
    }
}

impl Eq for ExtensionExpression {}

impl Hash for ExtensionExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.name().hash(state);
        self.node.dyn_hash(state);
        self.extra.hash(state);
    }
}
