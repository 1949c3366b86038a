//! Function and operator name resolution.
//!
//! The encoder never writes a textual function name as a graph identifier; it
//! asks a [`FunctionRegistry`] for the canonical IRI. The decoder asks the same
//! registry for the reverse mapping.

use ahash::AHashMap;

use spingraph_algebra::OperatorKind;

use crate::vocab::SP_NS;

/// Read-only lookup shared by encoder and decoder.
pub trait FunctionRegistry: Send + Sync {
    /// Canonical IRI for a function name or operator symbol.
    fn resolve(&self, name: &str) -> Option<String>;

    /// Preferred textual name for a canonical IRI.
    fn name_of(&self, canonical: &str) -> Option<String>;
}

/// SPARQL 1.1 built-in functions, by keyword, with their canonical local names.
const BUILTIN_FUNCTIONS: &[(&str, &str)] = &[
    ("STR", "str"),
    ("LANG", "lang"),
    ("LANGMATCHES", "langMatches"),
    ("DATATYPE", "datatype"),
    ("BOUND", "bound"),
    ("IRI", "iri"),
    ("URI", "uri"),
    ("BNODE", "bnode"),
    ("RAND", "rand"),
    ("ABS", "abs"),
    ("CEIL", "ceil"),
    ("FLOOR", "floor"),
    ("ROUND", "round"),
    ("CONCAT", "concat"),
    ("STRLEN", "strlen"),
    ("UCASE", "ucase"),
    ("LCASE", "lcase"),
    ("ENCODE_FOR_URI", "encodeForUri"),
    ("CONTAINS", "contains"),
    ("STRSTARTS", "strStarts"),
    ("STRENDS", "strEnds"),
    ("STRBEFORE", "strBefore"),
    ("STRAFTER", "strAfter"),
    ("YEAR", "year"),
    ("MONTH", "month"),
    ("DAY", "day"),
    ("HOURS", "hours"),
    ("MINUTES", "minutes"),
    ("SECONDS", "seconds"),
    ("TIMEZONE", "timezone"),
    ("TZ", "tz"),
    ("NOW", "now"),
    ("UUID", "uuid"),
    ("STRUUID", "struuid"),
    ("MD5", "md5"),
    ("SHA1", "sha1"),
    ("SHA256", "sha256"),
    ("SHA384", "sha384"),
    ("SHA512", "sha512"),
    ("COALESCE", "coalesce"),
    ("IF", "if"),
    ("STRLANG", "strLang"),
    ("STRDT", "strDt"),
    ("SAMETERM", "sameTerm"),
    ("ISIRI", "isIRI"),
    ("ISURI", "isURI"),
    ("ISBLANK", "isBlank"),
    ("ISLITERAL", "isLiteral"),
    ("ISNUMERIC", "isNumeric"),
    ("REGEX", "regex"),
    ("SUBSTR", "substr"),
    ("REPLACE", "replace"),
];

fn operator_local_name(op: OperatorKind) -> &'static str {
    match op {
        OperatorKind::Or => "or",
        OperatorKind::And => "and",
        OperatorKind::Not => "not",
        OperatorKind::Eq => "eq",
        OperatorKind::Neq => "neq",
        OperatorKind::Lt => "lt",
        OperatorKind::Leq => "leq",
        OperatorKind::Gt => "gt",
        OperatorKind::Geq => "geq",
        OperatorKind::Add => "add",
        OperatorKind::Sub => "sub",
        OperatorKind::Mul => "mul",
        OperatorKind::Div => "divide",
        OperatorKind::UnaryPlus => "unaryPlus",
        OperatorKind::UnaryMinus => "unaryMinus",
        OperatorKind::In => "in",
        OperatorKind::NotIn => "notIn",
    }
}

/// In-memory registry: SPARQL built-ins and operators, plus extensions.
///
/// Every name matches exactly. Built-ins resolve only by their upper-case
/// keyword, so `name_of` always gives back the spelling that was resolved;
/// `strlen` is an unknown function.
#[derive(Debug, Clone, Default)]
pub struct BuiltinRegistry {
    exact: AHashMap<String, String>,
    names: AHashMap<String, String>,
}

impl BuiltinRegistry {
    /// A registry that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in functions and all operators.
    pub fn sparql() -> Self {
        let mut reg = Self::default();
        for (keyword, local) in BUILTIN_FUNCTIONS {
            let iri = format!("{SP_NS}{local}");
            reg.exact.insert((*keyword).to_string(), iri.clone());
            reg.names.insert(iri, (*keyword).to_string());
        }
        for op in OperatorKind::ALL {
            let iri = format!("{SP_NS}{}", operator_local_name(op));
            reg.exact.insert(op.symbol().to_string(), iri.clone());
            reg.names.insert(iri, op.symbol().to_string());
        }
        reg
    }

    /// Register an extension function. `name` is matched exactly and is
    /// what the decoder reports for `iri`. Registering an IRI under its own
    /// name is the usual choice for extension functions.
    pub fn with_function(mut self, name: impl Into<String>, iri: impl Into<String>) -> Self {
        let name = name.into();
        let iri = iri.into();
        self.exact.insert(name.clone(), iri.clone());
        self.names.insert(iri, name);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FunctionRegistry for BuiltinRegistry {
    fn resolve(&self, name: &str) -> Option<String> {
        self.exact.get(name).cloned()
    }

    fn name_of(&self, canonical: &str) -> Option<String> {
        self.names.get(canonical).cloned()
    }
}
