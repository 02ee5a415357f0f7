// Textual type syntax → TypeGraph, for callers and tests that have no syntax tree at hand.

use crate::type_graph::{TypeGraph, TypeKind, TypeNode};
use crate::{GraphError, Result};

/// Java primitive type keywords (including `void`).
pub const PRIMITIVES: [&str; 9] = [
    "byte", "short", "char", "int", "long", "float", "double", "boolean", "void",
];

pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

impl TypeGraph {
    /// Parse Java type syntax such as `Map<String, List<? extends T>>[]`.
    ///
    /// Top-level `A | B` yields a union and `A & B` an intersection.
    pub fn parse(text: &str) -> Result<TypeGraph> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            input: text,
            tokens,
            pos: 0,
        };
        let graph = parser.parse_top()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("trailing input"));
        }
        Ok(graph)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Annotation(String),
    Punct(char),
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '@' || is_ident_char(c) {
            chars.next();
            let mut end = start + c.len_utf8();
            while let Some(&(i, c)) = chars.peek() {
                if is_ident_char(c) || (text.as_bytes()[start] == b'@' && c == '.') {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let word = text[start..end].to_string();
            if word.starts_with('@') {
                tokens.push(Token::Annotation(word));
            } else {
                tokens.push(Token::Ident(word));
            }
        } else if "<>,[].?&|".contains(c) {
            chars.next();
            tokens.push(Token::Punct(c));
        } else {
            return Err(GraphError::TypeSyntax {
                input: text.to_string(),
                message: format!("unexpected character '{c}'"),
            });
        }
    }
    Ok(tokens)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> GraphError {
        GraphError::TypeSyntax {
            input: self.input.to_string(),
            message: format!("{message} at token {}", self.pos),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(&Token::Punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn parse_top(&mut self) -> Result<TypeGraph> {
        let first = self.parse_type()?;
        for (sep, build) in [
            ('|', TypeGraph::union as fn(Vec<TypeGraph>) -> TypeGraph),
            ('&', TypeGraph::intersection),
        ] {
            if self.peek() == Some(&Token::Punct(sep)) {
                let mut members = vec![first];
                while self.eat(sep) {
                    members.push(self.parse_type()?);
                }
                return Ok(build(members));
            }
        }
        Ok(first)
    }

    fn parse_type(&mut self) -> Result<TypeGraph> {
        let mut annotations = Vec::new();
        while let Some(Token::Annotation(a)) = self.peek() {
            annotations.push(a.clone());
            self.pos += 1;
        }

        if self.eat('?') {
            let graph = match self.peek() {
                Some(Token::Ident(kw)) if kw == "extends" => {
                    self.pos += 1;
                    TypeGraph::wildcard_extends(self.parse_type()?)
                }
                Some(Token::Ident(kw)) if kw == "super" => {
                    self.pos += 1;
                    TypeGraph::wildcard_super(self.parse_type()?)
                }
                _ => TypeGraph::wildcard(),
            };
            return Ok(graph.with_annotations(annotations));
        }

        let mut graph = self.parse_named()?.with_annotations(annotations);
        while self.eat('[') {
            self.expect(']')?;
            graph = TypeGraph::array(graph);
        }
        Ok(graph)
    }

    fn parse_named(&mut self) -> Result<TypeGraph> {
        let first = self.ident()?;
        if is_primitive_name(&first) {
            return Ok(TypeGraph::primitive(&first));
        }

        let mut name = first;
        let mut args = None;
        loop {
            if self.eat('<') {
                let mut list = Vec::new();
                if !self.eat('>') {
                    loop {
                        list.push(self.parse_type()?);
                        if self.eat('>') {
                            break;
                        }
                        self.expect(',')?;
                    }
                }
                args = Some(list);
            }
            if self.eat('.') {
                // Arguments on an enclosing segment do not survive qualification.
                args = None;
                name.push('.');
                name.push_str(&self.ident()?);
            } else {
                break;
            }
        }

        let raw = TypeGraph::leaf(TypeNode::new(TypeKind::Simple, name));
        Ok(match args {
            Some(params) => TypeGraph::parameterized(raw, params),
            None => raw,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pretty::pretty;

    fn round(text: &str) -> String {
        pretty(&TypeGraph::parse(text).unwrap())
    }

    #[test]
    fn parses_common_shapes() {
        assert_eq!(round("int"), "int");
        assert_eq!(round("java.util.List<String>"), "java.util.List<String>");
        assert_eq!(round("Map<K,V>[][]"), "Map<K, V>[][]");
        assert_eq!(round("List<? super T>"), "List<? super T>");
        assert_eq!(round("Class<?>"), "Class<?>");
        assert_eq!(round("@NonNull String"), "@NonNull String");
    }

    #[test]
    fn primitive_kind_is_detected() {
        let g = TypeGraph::parse("double").unwrap();
        assert_eq!(g.kind(), TypeKind::Primitive);
        let g = TypeGraph::parse("Double").unwrap();
        assert_eq!(g.kind(), TypeKind::Simple);
    }

    #[test]
    fn enclosing_type_arguments_are_dropped() {
        let g = TypeGraph::parse("Outer<String>.Inner").unwrap();
        assert_eq!(g, TypeGraph::simple("Outer.Inner"));
    }

    #[test]
    fn union_and_intersection() {
        let u = TypeGraph::parse("IOException | SQLException").unwrap();
        assert_eq!(u.kind(), TypeKind::Union);
        assert_eq!(u.edges.len(), 2);
        let i = TypeGraph::parse("Runnable & Serializable").unwrap();
        assert_eq!(i.kind(), TypeKind::Intersection);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(TypeGraph::parse("List<String").is_err());
        assert!(TypeGraph::parse("int[").is_err());
        assert!(TypeGraph::parse("Foo Bar").is_err());
        assert!(TypeGraph::parse("a+b").is_err());
    }
}
