use regex::Regex;

/// Classification of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `digraph "<name>" {` - value carries the declared graph name
    DigraphDef,
    /// `node [<default attrs>];`
    NodeAttrStmt,
    /// `edge [<default attrs>];`
    EdgeAttrStmt,
    /// `Node<N> [<attrs>];` - a function definition
    NodeStmt,
    /// `Node<A> -> Node<B> [<attrs>];` - a call between functions
    EdgeStmt,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// Anything the grammar subset does not cover
    Ignored,
}

/// One classified line. The value is the statement with whitespace,
/// quotes and semicolons stripped; produced and consumed within a single
/// line's processing, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: String) -> Self {
        Self { kind, value }
    }
}

/// Line tokenizer for the doxygen call-graph subset of DOT.
///
/// The grammar handled here is deliberately line-oriented: one token per
/// line, first match wins, statements never span lines. Keywords and
/// statement shapes short-circuit the scan as soon as they match.
pub struct Lexer {
    node_stmt: Regex,
    edge_stmt: Regex,
}

impl Lexer {
    pub fn new() -> Self {
        // The shapes are fixed by the doxygen emitter, so the patterns
        // are compiled once and reused for every line.
        Self {
            node_stmt: Regex::new(r"^Node[0-9]+$").expect("node statement pattern"),
            edge_stmt: Regex::new(r"^Node[0-9]+->Node[0-9]+$").expect("edge statement pattern"),
        }
    }

    /// Scan one line and classify it.
    ///
    /// The scan accumulates non-whitespace, non-quote characters into a
    /// buffer. Braces are single-character tokens and win immediately.
    /// When the buffer equals one of the reserved keywords (`digraph`,
    /// `node`, `edge`) the rest of the line becomes the token value.
    /// When an attribute list opener or statement terminator is reached
    /// and the buffer has the shape of a node or edge statement, the
    /// whole statement becomes the value. Everything else is `Ignored`.
    pub fn tokenize(&self, line: &str) -> Token {
        let chars: Vec<char> = line.chars().collect();
        let mut buffer = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if c == '{' {
                return Token::new(TokenKind::OpenBrace, c.to_string());
            }
            if c == '}' {
                return Token::new(TokenKind::CloseBrace, c.to_string());
            }

            if c == '[' || c == ';' {
                if self.node_stmt.is_match(&buffer) {
                    let value = buffer + &scan_stripped(&chars[i..]);
                    return Token::new(TokenKind::NodeStmt, value);
                }
                if self.edge_stmt.is_match(&buffer) {
                    let value = buffer + &scan_stripped(&chars[i..]);
                    return Token::new(TokenKind::EdgeStmt, value);
                }
            }

            if c != ' ' && c != '\t' && c != '\n' && c != '\r' && c != '"' {
                buffer.push(c);
            }

            match buffer.as_str() {
                "digraph" => {
                    return Token::new(TokenKind::DigraphDef, scan_stripped(&chars[i + 1..]));
                }
                "node" => {
                    return Token::new(TokenKind::NodeAttrStmt, scan_stripped(&chars[i + 1..]));
                }
                "edge" => {
                    return Token::new(TokenKind::EdgeAttrStmt, scan_stripped(&chars[i + 1..]));
                }
                _ => {}
            }
        }

        Token::new(TokenKind::Ignored, buffer)
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan forward over the remainder of a line, dropping whitespace,
/// quotes and semicolons. A brace ends the scan: it belongs to the graph
/// body, not the statement (`digraph "X" {` must yield just `X`).
fn scan_stripped(rest: &[char]) -> String {
    let mut buffer = String::new();

    for &c in rest {
        match c {
            '{' | '}' => break,
            ' ' | '\t' | '\n' | '\r' | ';' | '"' => {}
            _ => buffer.push(c),
        }
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(line: &str) -> Token {
        Lexer::new().tokenize(line)
    }

    #[test]
    fn test_unknown_statements_are_ignored() {
        let token = tokenize("unknownsymbol");
        assert_eq!(token.kind, TokenKind::Ignored);
        assert_eq!(token.value, "unknownsymbol");
    }

    #[test]
    fn test_digraph_declaration_captures_graph_name() {
        let token = tokenize("digraph \"ADC_DoThing\" {");
        assert_eq!(token.kind, TokenKind::DigraphDef);
        assert_eq!(token.value, "ADC_DoThing");
    }

    #[test]
    fn test_node_default_attribute_statement() {
        let token = tokenize("node [somestuffwedontcareabout];");
        assert_eq!(token.kind, TokenKind::NodeAttrStmt);
        assert_eq!(token.value, "[somestuffwedontcareabout]");
    }

    #[test]
    fn test_edge_default_attribute_statement() {
        let token = tokenize("edge [somestuffwedontcareabout]");
        assert_eq!(token.kind, TokenKind::EdgeAttrStmt);
    }

    #[test]
    fn test_node_statement_with_attributes() {
        let token = tokenize("Node1 [label=\"ADC_DoThing\", fontsize=10];");
        assert_eq!(token.kind, TokenKind::NodeStmt);
        assert_eq!(token.value, "Node1[label=ADC_DoThing,fontsize=10]");
    }

    #[test]
    fn test_node_statement_without_attributes() {
        let token = tokenize("Node1;");
        assert_eq!(token.kind, TokenKind::NodeStmt);
        assert_eq!(token.value, "Node1");
    }

    #[test]
    fn test_edge_statement_with_attributes() {
        let token = tokenize("Node1 -> Node2 [color=black];");
        assert_eq!(token.kind, TokenKind::EdgeStmt);
        assert_eq!(token.value, "Node1->Node2[color=black]");
    }

    #[test]
    fn test_edge_statement_without_attributes() {
        let token = tokenize("Node1 -> Node2;");
        assert_eq!(token.kind, TokenKind::EdgeStmt);
        assert_eq!(token.value, "Node1->Node2");
    }

    #[test]
    fn test_braces_win_immediately() {
        assert_eq!(tokenize("{").kind, TokenKind::OpenBrace);
        assert_eq!(tokenize("}").kind, TokenKind::CloseBrace);
    }

    #[test]
    fn test_crlf_line_tokenizes_like_lf() {
        let token = tokenize("Node3 -> Node4;\r");
        assert_eq!(token.kind, TokenKind::EdgeStmt);
        assert_eq!(token.value, "Node3->Node4");
    }

    #[test]
    fn test_node_identifier_alone_is_not_a_statement() {
        // No `[` or `;` ever arrives, so the shape never commits.
        let token = tokenize("Node1");
        assert_eq!(token.kind, TokenKind::Ignored);
        assert_eq!(token.value, "Node1");
    }
}
