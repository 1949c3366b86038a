//! N-Triples output and N-Triples/Turtle input.
//!
//! Output is hand-written (one triple per line, insertion order, canonical
//! escaping). Input goes through Sophia's parsers; each parsed term is turned
//! back into a [`Node`] from its N-Triples display form.

use sophia::api::prelude::*;
use sophia::api::triple::Triple as _;
use std::path::Path;
use thiserror::Error;

use crate::graph::{Graph, SinkError};
use crate::term::{normalize_datatype, Literal, Node, Triple};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
}

impl RdfFormat {
    pub fn name(self) -> &'static str {
        match self {
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::Turtle => "Turtle",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Some(RdfFormat::NTriples),
            "ttl" | "turtle" => Some(RdfFormat::Turtle),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RdfSyntaxError {
    #[error("failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
    #[error("unsupported RDF term form: {0}")]
    Term(String),
}

#[derive(Debug, Error)]
#[error("{message}")]
struct TermSinkError {
    message: String,
}

impl From<RdfSyntaxError> for TermSinkError {
    fn from(value: RdfSyntaxError) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

impl From<SinkError> for TermSinkError {
    fn from(value: SinkError) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

// ============================================================================
// Output
// ============================================================================

pub fn write_ntriples<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    let mut out = String::new();
    for triple in triples {
        out.push_str(&triple.to_string());
        out.push('\n');
    }
    out
}

impl Graph {
    pub fn to_ntriples(&self) -> String {
        write_ntriples(self.iter())
    }

    pub fn from_ntriples(text: &str) -> Result<Self, RdfSyntaxError> {
        parse_graph(text.as_bytes(), RdfFormat::NTriples)
    }

    pub fn from_turtle(text: &str) -> Result<Self, RdfSyntaxError> {
        parse_graph(text.as_bytes(), RdfFormat::Turtle)
    }
}

// ============================================================================
// Input
// ============================================================================

pub fn parse_graph(bytes: &[u8], format: RdfFormat) -> Result<Graph, RdfSyntaxError> {
    let cursor = std::io::Cursor::new(bytes);
    let reader = std::io::BufReader::new(cursor);
    let mut graph = Graph::new();

    let mut sink = |s: String, p: String, o: String| -> Result<(), TermSinkError> {
        let subject = parse_node(&s)?;
        let predicate = parse_node(&p)?;
        let object = parse_node(&o)?;
        graph.try_add(Triple::new(subject, predicate, object))?;
        Ok(())
    };

    match format {
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    sink(t.s().to_string(), t.p().to_string(), t.o().to_string())
                })
                .map_err(|e| RdfSyntaxError::Parse {
                    format: format.name(),
                    message: e.to_string(),
                })?;
        }
        RdfFormat::Turtle => {
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    sink(t.s().to_string(), t.p().to_string(), t.o().to_string())
                })
                .map_err(|e| RdfSyntaxError::Parse {
                    format: format.name(),
                    message: e.to_string(),
                })?;
        }
    }
    Ok(graph)
}

/// Parse a single term in N-Triples form (`<iri>`, `_:label`, `"lex"@tag`,
/// `"lex"^^<dt>`). Also accepted by the CLI for `--root`.
pub fn parse_node(term: &str) -> Result<Node, RdfSyntaxError> {
    let s = term.trim();

    if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Node::Named(rest.to_string()));
    }

    if let Some(rest) = s.strip_prefix("_:") {
        return Ok(Node::Anonymous(rest.to_string()));
    }

    if s.starts_with('"') {
        let mut end_quote = None;
        let mut escaped = false;
        for (i, ch) in s.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '"' => {
                    end_quote = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let Some(end) = end_quote else {
            return Err(RdfSyntaxError::Term(format!(
                "missing closing quote in literal: {s}"
            )));
        };

        let lexical = unescape_lexical(&s[1..end])?;
        let rest = s[end + 1..].trim();

        if let Some(lang) = rest.strip_prefix('@') {
            return Ok(Node::Literal(Literal::lang(lexical, lang)));
        }
        if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            let dt = dt
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .unwrap_or(dt);
            return Ok(Node::Literal(match normalize_datatype(dt) {
                Some(dt) => Literal::typed(lexical, dt),
                None => Literal::simple(lexical),
            }));
        }
        if rest.is_empty() {
            return Ok(Node::Literal(Literal::simple(lexical)));
        }
        return Err(RdfSyntaxError::Term(s.to_string()));
    }

    Err(RdfSyntaxError::Term(s.to_string()))
}

fn unescape_lexical(s: &str) -> Result<String, RdfSyntaxError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(u @ ('u' | 'U')) => {
                let width = if u == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(width).collect();
                let ch = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| RdfSyntaxError::Term(format!("bad escape \\{u}{hex}")))?;
                out.push(ch);
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XSD_INTEGER_IRI;

    const SAMPLE_NT: &str = r#"
<http://example.org/q> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.org/Select> .
<http://example.org/q> <http://example.org/limit> "10"^^<http://www.w3.org/2001/XMLSchema#integer> .
_:v0 <http://example.org/varName> "s" .
_:v0 <http://example.org/label> "Straße"@de .
"#;

    #[test]
    fn parses_ntriples_into_graph() {
        let graph = Graph::from_ntriples(SAMPLE_NT).expect("parse");
        assert_eq!(graph.len(), 4);
        let limit = graph
            .objects(
                &Node::named("http://example.org/q"),
                &Node::named("http://example.org/limit"),
            )
            .into_iter()
            .next()
            .cloned();
        assert_eq!(
            limit,
            Some(Node::Literal(Literal::typed("10", XSD_INTEGER_IRI)))
        );
        let label = graph
            .objects(
                &Node::anonymous("v0"),
                &Node::named("http://example.org/label"),
            )
            .into_iter()
            .next()
            .cloned();
        assert_eq!(label, Some(Node::Literal(Literal::lang("Straße", "de"))));
    }

    #[test]
    fn parses_turtle() {
        let ttl = r#"
@prefix ex: <http://example.org/> .
ex:q a ex:Select ;
     ex:where [ ex:name "w" ] .
"#;
        let graph = Graph::from_turtle(ttl).expect("parse");
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn written_ntriples_parse_back_identically() {
        let mut graph = Graph::new();
        graph.add(Triple::new(
            Node::anonymous("a1"),
            Node::named("http://example.org/p"),
            Node::Literal(Literal::simple("line\nbreak \"quoted\" \\ tab\t")),
        ));
        graph.add(Triple::new(
            Node::anonymous("a1"),
            Node::named("http://example.org/p"),
            Node::Literal(Literal::typed("日本語", "http://example.org/dt")),
        ));
        let text = graph.to_ntriples();
        let reparsed = Graph::from_ntriples(&text).expect("reparse");
        let original: Vec<_> = graph.iter().cloned().collect();
        let back: Vec<_> = reparsed.iter().cloned().collect();
        assert_eq!(original, back);
    }

    #[test]
    fn parse_node_accepts_each_form() {
        assert_eq!(parse_node("<http://e/x>").unwrap(), Node::named("http://e/x"));
        assert_eq!(parse_node("_:b1").unwrap(), Node::anonymous("b1"));
        assert_eq!(
            parse_node("\"a\\u00E9\"").unwrap(),
            Node::Literal(Literal::simple("aé"))
        );
        assert!(parse_node("plain").is_err());
    }
}
