//! Expressions: variables, constants, calls, operators, aggregates, EXISTS.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pattern::{Constant, GraphPattern, Variable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expression {
    Variable(Variable),
    Constant(Constant),
    /// A call to a built-in or extension function by its textual name.
    ///
    /// `unresolved` marks calls whose name was not known to the function
    /// registry when the graph was written.
    FunctionCall {
        name: String,
        #[serde(default)]
        args: Vec<Expression>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        unresolved: bool,
    },
    Operator {
        op: OperatorKind,
        operands: Vec<Expression>,
    },
    /// `expression: None` is `COUNT(*)`.
    Aggregate {
        kind: AggregateKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Box<Expression>>,
        #[serde(default)]
        distinct: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        separator: Option<String>,
    },
    Exists(Box<GraphPattern>),
    NotExists(Box<GraphPattern>),
}

impl Expression {
    pub fn var(name: impl Into<String>) -> Self {
        Expression::Variable(Variable::new(name))
    }

    pub fn constant(constant: Constant) -> Self {
        Expression::Constant(constant)
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
            unresolved: false,
        }
    }

    pub fn op(op: OperatorKind, operands: Vec<Expression>) -> Self {
        Expression::Operator { op, operands }
    }

    pub fn binary(op: OperatorKind, left: Expression, right: Expression) -> Self {
        Expression::Operator {
            op,
            operands: vec![left, right],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Expression::Variable(_) => "variable",
            Expression::Constant(_) => "constant",
            Expression::FunctionCall { .. } => "function_call",
            Expression::Operator { .. } => "operator",
            Expression::Aggregate { .. } => "aggregate",
            Expression::Exists(_) => "exists",
            Expression::NotExists(_) => "not_exists",
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Or,
    And,
    Not,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    Add,
    Sub,
    Mul,
    Div,
    UnaryPlus,
    UnaryMinus,
    In,
    NotIn,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 17] = [
        OperatorKind::Or,
        OperatorKind::And,
        OperatorKind::Not,
        OperatorKind::Eq,
        OperatorKind::Neq,
        OperatorKind::Lt,
        OperatorKind::Leq,
        OperatorKind::Gt,
        OperatorKind::Geq,
        OperatorKind::Add,
        OperatorKind::Sub,
        OperatorKind::Mul,
        OperatorKind::Div,
        OperatorKind::UnaryPlus,
        OperatorKind::UnaryMinus,
        OperatorKind::In,
        OperatorKind::NotIn,
    ];

    /// The SPARQL surface symbol. Unary plus/minus get a `u` prefix so every
    /// operator has a distinct symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            OperatorKind::Or => "||",
            OperatorKind::And => "&&",
            OperatorKind::Not => "!",
            OperatorKind::Eq => "=",
            OperatorKind::Neq => "!=",
            OperatorKind::Lt => "<",
            OperatorKind::Leq => "<=",
            OperatorKind::Gt => ">",
            OperatorKind::Geq => ">=",
            OperatorKind::Add => "+",
            OperatorKind::Sub => "-",
            OperatorKind::Mul => "*",
            OperatorKind::Div => "/",
            OperatorKind::UnaryPlus => "u+",
            OperatorKind::UnaryMinus => "u-",
            OperatorKind::In => "IN",
            OperatorKind::NotIn => "NOT IN",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Aggregates
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Sample,
    GroupConcat,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 7] = [
        AggregateKind::Count,
        AggregateKind::Sum,
        AggregateKind::Avg,
        AggregateKind::Min,
        AggregateKind::Max,
        AggregateKind::Sample,
        AggregateKind::GroupConcat,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
            AggregateKind::Sample => "SAMPLE",
            AggregateKind::GroupConcat => "GROUP_CONCAT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_symbols_are_distinct_and_invertible() {
        for op in OperatorKind::ALL {
            assert_eq!(OperatorKind::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(OperatorKind::from_symbol("<>"), None);
    }

    #[test]
    fn unresolved_flag_is_omitted_when_false() {
        let e = Expression::call("STRLEN", vec![Expression::var("x")]);
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("unresolved"));
        let back: Expression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
