//! N-Triples reading and writing
//!
//! This is the line-oriented format stores persist by default. Supported:
//! IRIs, blank nodes, plain/typed/language-tagged literals, the escapes
//! `\"`, `\\`, `\n`, `\r`, `\t`, `\uXXXX`, `\UXXXXXXXX`, comments, and
//! blank lines.

use std::io::{self, BufRead, Write};

use crate::model::{BlankId, Iri, Literal, Node, Resource, Statement};
use crate::{GraphError, Result};

// ============================================================================
// Writing
// ============================================================================

/// Write statements one per line, returning how many were written
pub fn write_statements<I>(out: &mut dyn Write, statements: I) -> io::Result<usize>
where
    I: IntoIterator<Item = Statement>,
{
    let mut written = 0;
    for statement in statements {
        writeln!(out, "{}", statement.to_ntriples())?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

// ============================================================================
// Reading
// ============================================================================

/// Parse a whole N-Triples document
///
/// Errors carry the 1-based line number of the offending line.
pub fn parse_document(input: &mut dyn BufRead) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut line = String::new();
    let mut line_no = 0;
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        line_no += 1;
        if let Some(statement) = parse_line(&line, line_no)? {
            statements.push(statement);
        }
    }
    Ok(statements)
}

/// Parse one line; comments and blank lines yield `None`
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Statement>> {
    let mut cursor = Cursor::new(line, line_no);
    cursor.skip_ws();
    if cursor.at_end_of_statement() {
        return Ok(None);
    }

    let subject = match cursor.term()? {
        Node::Iri(iri) => Resource::Iri(iri),
        Node::Blank(id) => Resource::Blank(id),
        Node::Literal(_) => return Err(cursor.error("subject must be an IRI or blank node")),
    };
    cursor.skip_ws();
    let predicate = match cursor.term()? {
        Node::Iri(iri) => iri,
        _ => return Err(cursor.error("predicate must be an IRI")),
    };
    cursor.skip_ws();
    let object = cursor.term()?;
    cursor.skip_ws();
    cursor.expect('.')?;
    cursor.skip_ws();
    if !cursor.at_end_of_statement() {
        return Err(cursor.error("unexpected content after '.'"));
    }

    Ok(Some(Statement {
        subject,
        predicate,
        object,
    }))
}

/// Parse a single term such as `<urn:a>`, `_:b0`, or `"x"@en`
pub fn parse_term(text: &str) -> Result<Node> {
    let mut cursor = Cursor::new(text, 1);
    cursor.skip_ws();
    let node = cursor.term()?;
    cursor.skip_ws();
    if cursor.peek().is_some() {
        return Err(cursor.error("unexpected content after term"));
    }
    Ok(node)
}

/// A position in a single-pattern query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    /// `?name`
    Variable(String),
    Node(Node),
}

/// Parse a triple pattern of terms and `?variables`, with optional final `.`
pub fn parse_pattern(text: &str) -> Result<[PatternTerm; 3]> {
    let mut cursor = Cursor::new(text, 1);
    let mut terms = Vec::with_capacity(3);
    for _ in 0..3 {
        cursor.skip_ws();
        let term = if cursor.peek() == Some('?') {
            cursor.bump();
            let name = cursor.take_while(|c| c.is_alphanumeric() || c == '_');
            if name.is_empty() {
                return Err(cursor.error("empty variable name"));
            }
            PatternTerm::Variable(name)
        } else {
            PatternTerm::Node(cursor.term()?)
        };
        terms.push(term);
    }
    cursor.skip_ws();
    if cursor.peek() == Some('.') {
        cursor.bump();
        cursor.skip_ws();
    }
    if cursor.peek().is_some() {
        return Err(cursor.error("unexpected content after pattern"));
    }

    let mut terms = terms.into_iter();
    match (terms.next(), terms.next(), terms.next()) {
        (Some(s), Some(p), Some(o)) => Ok([s, p, o]),
        _ => Err(GraphError::Parse {
            line: 1,
            message: "pattern needs three terms".to_string(),
        }),
    }
}

// ============================================================================
// Cursor
// ============================================================================

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self {
            chars: text.chars().peekable(),
            line,
        }
    }

    fn error(&self, message: impl Into<String>) -> GraphError {
        GraphError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.bump();
        }
    }

    fn at_end_of_statement(&mut self) -> bool {
        matches!(self.peek(), None | Some('#'))
    }

    fn expect(&mut self, wanted: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(c) => Err(self.error(format!("expected '{wanted}', found '{c}'"))),
            None => Err(self.error(format!("expected '{wanted}', found end of line"))),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn term(&mut self) -> Result<Node> {
        match self.peek() {
            Some('<') => Ok(Node::Iri(self.iri()?)),
            Some('_') => Ok(Node::Blank(self.blank()?)),
            Some('"') => Ok(Node::Literal(self.literal()?)),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of line")),
        }
    }

    fn iri(&mut self) -> Result<Iri> {
        self.expect('<')?;
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some('\\') => text.push(self.unicode_escape()?),
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated IRI")),
            }
        }
        Iri::parse(text).map_err(|e| self.error(e.to_string()))
    }

    fn blank(&mut self) -> Result<BlankId> {
        self.expect('_')?;
        self.expect(':')?;
        let mut label = String::new();
        while let Some(c) = self.peek() {
            let accept = match c {
                // a '.' belongs to the label only when more label follows
                '.' => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    matches!(ahead.next(), Some(n) if is_label_char(n))
                }
                _ => is_label_char(c),
            };
            if !accept {
                break;
            }
            label.push(c);
            self.bump();
        }
        BlankId::new(label).map_err(|e| self.error(e.to_string()))
    }

    fn literal(&mut self) -> Result<Literal> {
        self.expect('"')?;
        let mut lexical = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('"') => lexical.push('"'),
                    Some('\\') => lexical.push('\\'),
                    Some('n') => lexical.push('\n'),
                    Some('r') => lexical.push('\r'),
                    Some('t') => lexical.push('\t'),
                    Some('b') => lexical.push('\u{8}'),
                    Some('f') => lexical.push('\u{c}'),
                    Some('\'') => lexical.push('\''),
                    Some('u') => lexical.push(self.hex_char(4)?),
                    Some('U') => lexical.push(self.hex_char(8)?),
                    Some(c) => return Err(self.error(format!("unknown escape '\\{c}'"))),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => lexical.push(c),
                None => return Err(self.error("unterminated literal")),
            }
        }

        match self.peek() {
            Some('@') => {
                self.bump();
                let tag = self.take_while(|c| c.is_ascii_alphanumeric() || c == '-');
                Literal::with_language(lexical, tag).map_err(|e| self.error(e.to_string()))
            }
            Some('^') => {
                self.bump();
                self.expect('^')?;
                let datatype = self.iri()?;
                Ok(Literal::typed(lexical, datatype))
            }
            _ => Ok(Literal::plain(lexical)),
        }
    }

    fn unicode_escape(&mut self) -> Result<char> {
        match self.bump() {
            Some('u') => self.hex_char(4),
            Some('U') => self.hex_char(8),
            _ => Err(self.error("only \\u and \\U escapes are allowed in IRIs")),
        }
    }

    fn hex_char(&mut self, digits: usize) -> Result<char> {
        let mut hex = String::with_capacity(digits);
        for _ in 0..digits {
            match self.bump() {
                Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                _ => return Err(self.error("malformed unicode escape")),
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid code point U+{hex}")))
    }
}

fn is_label_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_line() {
        let st = parse_line("<urn:s> <urn:p> <urn:o> .", 1).unwrap().unwrap();
        assert_eq!(st.subject, Resource::Iri(Iri::new_unchecked("urn:s")));
        assert_eq!(st.predicate, Iri::new_unchecked("urn:p"));
        assert_eq!(st.object, Node::Iri(Iri::new_unchecked("urn:o")));
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        assert!(parse_line("   ", 1).unwrap().is_none());
        assert!(parse_line("# comment", 1).unwrap().is_none());
        let st = parse_line("<urn:s> <urn:p> \"x\" . # trailing", 1).unwrap();
        assert!(st.is_some());
    }

    #[test]
    fn test_parse_literal_variants() {
        let st = parse_line(r#"_:b0 <urn:p> "a \"q\"\né"@en-GB ."#, 1)
            .unwrap()
            .unwrap();
        let lit = st.object.as_literal().unwrap();
        assert_eq!(lit.lexical(), "a \"q\"\né");
        assert_eq!(lit.language(), Some("en-GB"));
        assert!(st.subject.is_blank());

        let st = parse_line(
            r#"<urn:s> <urn:p> "5"^^<http://www.w3.org/2001/XMLSchema#int> ."#,
            1,
        )
        .unwrap()
        .unwrap();
        let lit = st.object.as_literal().unwrap();
        assert_eq!(lit.datatype().map(Iri::as_str), Some("http://www.w3.org/2001/XMLSchema#int"));
    }

    #[test]
    fn test_blank_object_followed_by_dot() {
        let st = parse_line("<urn:s> <urn:p> _:b1.", 1).unwrap().unwrap();
        assert_eq!(st.object, Node::Blank(BlankId::new("b1").unwrap()));

        let st = parse_line("_:node-1.x <urn:p> _:y.z .", 1).unwrap().unwrap();
        assert_eq!(st.subject.to_string(), "_:node-1.x");
        assert_eq!(st.object.to_string(), "_:y.z");
    }

    #[test]
    fn test_parse_errors_report_line() {
        let input = "<urn:s> <urn:p> <urn:o> .\n\"lit\" <urn:p> <urn:o> .\n";
        let err = parse_document(&mut input.as_bytes()).unwrap_err();
        match err {
            GraphError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("subject"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_line("<urn:s> <urn:p> <urn:o>", 1).is_err());
        assert!(parse_line("<urn:s> \"p\" <urn:o> .", 1).is_err());
        assert!(parse_line("<urn:s> <urn:p> \"open .", 1).is_err());
    }

    #[test]
    fn test_written_document_reads_back() {
        let statements = vec![
            Statement::new(
                Iri::new_unchecked("urn:s"),
                Iri::new_unchecked("urn:p"),
                Literal::plain("line1\nline2\t\"quoted\" \\"),
            ),
            Statement::new(
                BlankId::new("x1").unwrap(),
                Iri::new_unchecked("urn:p"),
                Literal::with_language("chat", "fr").unwrap(),
            ),
        ];
        let mut buf = Vec::new();
        let written = write_statements(&mut buf, statements.clone()).unwrap();
        assert_eq!(written, 2);

        let parsed = parse_document(&mut buf.as_slice()).unwrap();
        assert_eq!(parsed, statements);
    }

    #[test]
    fn test_parse_term_and_pattern() {
        assert_eq!(
            parse_term(" <urn:a> ").unwrap(),
            Node::Iri(Iri::new_unchecked("urn:a"))
        );
        assert!(parse_term("<urn:a> <urn:b>").is_err());

        let [s, p, o] = parse_pattern("?x <urn:p> \"v\" .").unwrap();
        assert_eq!(s, PatternTerm::Variable("x".to_string()));
        assert_eq!(p, PatternTerm::Node(Node::Iri(Iri::new_unchecked("urn:p"))));
        assert_eq!(o, PatternTerm::Node(Node::Literal(Literal::plain("v"))));

        assert!(parse_pattern("?x <urn:p>").is_err());
        assert!(parse_pattern("? <urn:p> ?y").is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_any_lexical_form_survives_escaping(text in "\\PC*") {
            let statement = Statement::new(
                Iri::new_unchecked("urn:s"),
                Iri::new_unchecked("urn:p"),
                Literal::plain(text),
            );
            let mut buf = Vec::new();
            write_statements(&mut buf, [statement.clone()]).unwrap();
            let parsed = parse_document(&mut buf.as_slice()).unwrap();
            proptest::prop_assert_eq!(parsed, vec![statement]);
        }
    }
}
