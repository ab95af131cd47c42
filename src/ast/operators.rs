use serde::{Deserialize, Serialize};

/// Unary operators. `IsNull` and `IsNotNull` render as postfix keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    IsNull,
    IsNotNull,
    Minus,
    Plus,
    Not,
}

impl UnaryOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            UnaryOp::IsNull => "is null",
            UnaryOp::IsNotNull => "is not null",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "not",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::IsNull | UnaryOp::IsNotNull)
    }
}

/// Binary operators for expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Div,
    /// Modulo (%)
    Rem,
    Like,
    NotLike,
    And,
    Or,
    Xor,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
}

impl BinaryOp {
    /// Keyword or symbol, lower case; the formatter applies keyword casing.
    pub fn keyword(&self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Like => "like",
            BinaryOp::NotLike => "not like",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
        }
    }

    /// Whether the operator produces a boolean.
    pub fn is_predicate(&self) -> bool {
        !matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Div | BinaryOp::Rem
        )
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Cross,
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Cross => "cross join",
            JoinType::Inner => "inner join",
            JoinType::Left => "left join",
            JoinType::Right => "right join",
            JoinType::Full => "full join",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderType {
    #[default]
    Ascending,
    Descending,
}

impl OrderType {
    pub fn keyword(&self) -> &'static str {
        match self {
            OrderType::Ascending => "asc",
            OrderType::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunc {
    Min,
    Max,
    Avg,
    Sum,
    Count,
}

impl AggregateFunc {
    pub fn keyword(&self) -> &'static str {
        match self {
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
            AggregateFunc::Avg => "avg",
            AggregateFunc::Sum => "sum",
            AggregateFunc::Count => "count",
        }
    }
}

impl std::fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Functions usable with an `OVER (...)` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFunc {
    RowNumber,
    Rank,
    DenseRank,
    PercentRank,
    CumeDist,
    Lag,
    Lead,
    FirstValue,
    LastValue,
    NthValue,
    Ntile,
    Aggregate(AggregateFunc),
}

impl WindowFunc {
    pub fn keyword(&self) -> &'static str {
        match self {
            WindowFunc::RowNumber => "row_number",
            WindowFunc::Rank => "rank",
            WindowFunc::DenseRank => "dense_rank",
            WindowFunc::PercentRank => "percent_rank",
            WindowFunc::CumeDist => "cume_dist",
            WindowFunc::Lag => "lag",
            WindowFunc::Lead => "lead",
            WindowFunc::FirstValue => "first_value",
            WindowFunc::LastValue => "last_value",
            WindowFunc::NthValue => "nth_value",
            WindowFunc::Ntile => "ntile",
            WindowFunc::Aggregate(func) => func.keyword(),
        }
    }
}
