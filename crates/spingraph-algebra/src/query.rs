//! Query forms, dataset clauses and solution modifiers.

use serde::{Deserialize, Serialize};

use crate::expr::Expression;
use crate::pattern::{GraphPattern, TermPattern, TriplePattern, ValuesTable, Variable};
use crate::Iri;

/// A complete query: form, dataset, body and modifiers.
///
/// `pattern` is required for SELECT, CONSTRUCT and ASK and optional for
/// DESCRIBE. `values` is the trailing (query-level) VALUES block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub form: QueryForm,
    #[serde(default, skip_serializing_if = "DatasetClause::is_empty")]
    pub dataset: DatasetClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<GraphPattern>,
    #[serde(default, skip_serializing_if = "SolutionModifier::is_empty")]
    pub modifiers: SolutionModifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ValuesTable>,
}

impl Query {
    /// `SELECT <projection> WHERE <pattern>`; `None` projects `*`.
    pub fn select(projection: Option<Vec<ProjectionItem>>, pattern: GraphPattern) -> Self {
        Self::with_form(QueryForm::Select { projection }, Some(pattern))
    }

    pub fn ask(pattern: GraphPattern) -> Self {
        Self::with_form(QueryForm::Ask, Some(pattern))
    }

    pub fn construct(template: Vec<TriplePattern>, pattern: GraphPattern) -> Self {
        Self::with_form(QueryForm::Construct { template }, Some(pattern))
    }

    pub fn describe(targets: Option<Vec<TermPattern>>, pattern: Option<GraphPattern>) -> Self {
        Self::with_form(QueryForm::Describe { targets }, pattern)
    }

    fn with_form(form: QueryForm, pattern: Option<GraphPattern>) -> Self {
        Self {
            form,
            dataset: DatasetClause::default(),
            pattern,
            modifiers: SolutionModifier::default(),
            values: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryForm {
    Select {
        #[serde(default)]
        projection: Option<Vec<ProjectionItem>>,
    },
    Construct {
        template: Vec<TriplePattern>,
    },
    Ask,
    Describe {
        #[serde(default)]
        targets: Option<Vec<TermPattern>>,
    },
}

impl QueryForm {
    pub fn label(&self) -> &'static str {
        match self {
            QueryForm::Select { .. } => "select",
            QueryForm::Construct { .. } => "construct",
            QueryForm::Ask => "ask",
            QueryForm::Describe { .. } => "describe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProjectionItem {
    Variable(Variable),
    /// `(expression AS ?alias)`
    Expression {
        expression: Expression,
        alias: Variable,
    },
}

impl ProjectionItem {
    pub fn var(name: impl Into<String>) -> Self {
        ProjectionItem::Variable(Variable::new(name))
    }
}

/// FROM / FROM NAMED.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasetClause {
    #[serde(default)]
    pub default_graphs: Vec<Iri>,
    #[serde(default)]
    pub named_graphs: Vec<Iri>,
}

impl DatasetClause {
    pub fn is_empty(&self) -> bool {
        self.default_graphs.is_empty() && self.named_graphs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distinctness {
    #[default]
    None,
    Distinct,
    Reduced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCondition {
    pub expression: Expression,
    #[serde(default)]
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SolutionModifier {
    #[serde(default)]
    pub order_by: Vec<OrderCondition>,
    #[serde(default)]
    pub group_by: Vec<Expression>,
    #[serde(default)]
    pub having: Vec<Expression>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub distinct: Distinctness,
}

impl SolutionModifier {
    pub fn is_empty(&self) -> bool {
        self == &SolutionModifier::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::TriplePattern;

    #[test]
    fn minimal_json_fills_defaults() {
        let json = r#"{
            "form": { "kind": "select", "projection": [ { "kind": "variable", "value": "s" } ] },
            "pattern": { "kind": "basic_pattern", "triples": [] }
        }"#;
        let q: Query = serde_json::from_str(json).unwrap();
        assert_eq!(q.modifiers, SolutionModifier::default());
        assert!(q.dataset.is_empty());
        assert_eq!(
            q,
            Query::select(Some(vec![ProjectionItem::var("s")]), GraphPattern::basic(vec![]))
        );
    }

    #[test]
    fn describe_without_pattern_round_trips_through_json() {
        let q = Query::describe(Some(vec![TermPattern::iri("http://e/x")]), None);
        let text = serde_json::to_string(&q).unwrap();
        assert!(!text.contains("pattern"));
        assert_eq!(serde_json::from_str::<Query>(&text).unwrap(), q);
    }

    #[test]
    fn construct_keeps_template_order() {
        let template = vec![
            TriplePattern::new(TermPattern::var("a"), TermPattern::iri("http://e/p"), TermPattern::var("b")),
            TriplePattern::new(TermPattern::var("b"), TermPattern::iri("http://e/q"), TermPattern::var("a")),
        ];
        let q = Query::construct(template.clone(), GraphPattern::basic(template.clone()));
        let back: Query = serde_json::from_value(serde_json::to_value(&q).unwrap()).unwrap();
        match back.form {
            QueryForm::Construct { template: t } => assert_eq!(t, template),
            other => panic!("unexpected form {other:?}"),
        }
    }
}
