//! Relational dependency expressions.
//!
//! A [`Reldep`] is either a plain name, a `(name, comparator, evr)` triple, or a
//! recursive rich boolean expression over other reldeps. Reldeps are interned by
//! [`crate::pool::Pool::intern_reldep`] / [`crate::pool::Pool::parse_rich_reldep`]:
//! structurally equal expressions always share one [`ReldepId`].

use crate::internal::id::{ReldepId, StringId};
use std::fmt;

/// Comparison flags for a versioned reldep, following RPM's sense-flag bit layout
/// (`LESS`, `GREATER`, `EQUAL`, independently combinable so that e.g. `NE` is
/// `LESS | GREATER`).
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CmpFlag(u8);

impl CmpFlag {
    pub const LESS: CmpFlag = CmpFlag(1 << 0);
    pub const GREATER: CmpFlag = CmpFlag(1 << 1);
    pub const EQUAL: CmpFlag = CmpFlag(1 << 2);

    pub const LT: CmpFlag = Self::LESS;
    pub const GT: CmpFlag = Self::GREATER;
    pub const EQ: CmpFlag = Self::EQUAL;
    pub const LE: CmpFlag = CmpFlag(Self::LESS.0 | Self::EQUAL.0);
    pub const GE: CmpFlag = CmpFlag(Self::GREATER.0 | Self::EQUAL.0);
    pub const NE: CmpFlag = CmpFlag(Self::LESS.0 | Self::GREATER.0);

    pub fn contains(self, other: CmpFlag) -> bool {
        self.0 & other.0 == other.0
    }

    /// Turns an `std::cmp::Ordering`-style `-1/0/1` evrcmp result into whether it
    /// satisfies this comparator.
    pub fn accepts(self, ordering: std::cmp::Ordering) -> bool {
        match ordering {
            std::cmp::Ordering::Less => self.contains(Self::LESS),
            std::cmp::Ordering::Equal => self.contains(Self::EQUAL),
            std::cmp::Ordering::Greater => self.contains(Self::GREATER),
        }
    }
}

impl std::ops::BitOr for CmpFlag {
    type Output = CmpFlag;

    fn bitor(self, rhs: CmpFlag) -> CmpFlag {
        CmpFlag(self.0 | rhs.0)
    }
}

impl fmt::Display for CmpFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Self::LT => "<",
            Self::GT => ">",
            Self::EQ => "=",
            Self::LE => "<=",
            Self::GE => ">=",
            Self::NE => "!=",
            _ => "?",
        };
        f.write_str(s)
    }
}

/// The boolean operator joining two rich-dependency operands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RichOp {
    And,
    Or,
    If,
    Unless,
    With,
    Without,
}

impl RichOp {
    fn keyword(self) -> &'static str {
        match self {
            RichOp::And => "and",
            RichOp::Or => "or",
            RichOp::If => "if",
            RichOp::Unless => "unless",
            RichOp::With => "with",
            RichOp::Without => "without",
        }
    }
}

/// The parsed shape of a reldep. Stored in [`crate::pool::Pool`]'s reldep arena and
/// addressed by [`ReldepId`].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Reldep {
    /// An unversioned dependency on a name, e.g. `glibc`.
    Simple { name: StringId },
    /// A versioned dependency, e.g. `glibc >= 2.34-1`.
    Versioned {
        name: StringId,
        cmp: CmpFlag,
        evr: StringId,
    },
    /// A rich boolean expression, e.g. `(glibc >= 2.34 if systemd)`.
    Rich {
        op: RichOp,
        left: ReldepId,
        right: ReldepId,
    },
}

impl Reldep {
    pub fn name(&self) -> Option<StringId> {
        match self {
            Reldep::Simple { name } | Reldep::Versioned { name, .. } => Some(*name),
            Reldep::Rich { .. } => None,
        }
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, Reldep::Rich { .. })
    }
}

/// Renders a reldep back to its textual form, resolving string ids through `resolve`.
pub fn render(reldep: &Reldep, arena: &crate::internal::arena::Arena<ReldepId, Reldep>, resolve: &impl Fn(StringId) -> String) -> String {
    match reldep {
        Reldep::Simple { name } => resolve(*name),
        Reldep::Versioned { name, cmp, evr } => {
            format!("{} {} {}", resolve(*name), cmp, resolve(*evr))
        }
        Reldep::Rich { op, left, right } => {
            format!(
                "({} {} {})",
                render(&arena[*left], arena, resolve),
                op.keyword(),
                render(&arena[*right], arena, resolve)
            )
        }
    }
}

/// A single lexical token of a rich dependency expression.
#[derive(Debug, Clone, Eq, PartialEq)]
enum Token {
    LParen,
    RParen,
    Word(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        if !current.is_empty() {
            tokens.push(Token::Word(std::mem::take(current)));
        }
    };
    for ch in text.chars() {
        match ch {
            '(' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::LParen);
            }
            ')' => {
                flush(&mut current, &mut tokens);
                tokens.push(Token::RParen);
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

/// A minimal recursive-descent parser for RPM-style rich boolean dependencies:
/// `NAME`, `NAME CMP EVR`, or `(OPERAND and|or|if|unless|with|without OPERAND)`, with
/// parenthesized operands nesting arbitrarily.
pub(crate) struct RichParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

pub(crate) enum ParsedNode {
    Simple(StringId),
    Versioned(StringId, CmpFlag, StringId),
    Rich(RichOp, Box<ParsedNode>, Box<ParsedNode>),
}

impl<'a> RichParser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn parse_operand(&mut self, intern: &mut impl FnMut(&str) -> Option<StringId>) -> Result<ParsedNode, String> {
        match self.bump() {
            Some(Token::LParen) => {
                let left = self.parse_operand(intern)?;
                let op = match self.bump() {
                    Some(Token::Word(w)) => match w.as_str() {
                        "and" => RichOp::And,
                        "or" => RichOp::Or,
                        "if" => RichOp::If,
                        "unless" => RichOp::Unless,
                        "with" => RichOp::With,
                        "without" => RichOp::Without,
                        other => return Err(format!("unknown rich operator '{other}'")),
                    },
                    other => return Err(format!("expected rich operator, found {other:?}")),
                };
                let right = self.parse_operand(intern)?;
                match self.bump() {
                    Some(Token::RParen) => {}
                    other => return Err(format!("expected ')', found {other:?}")),
                }
                Ok(ParsedNode::Rich(op, Box::new(left), Box::new(right)))
            }
            Some(Token::Word(name)) => {
                let name_id = intern(name).ok_or_else(|| format!("unknown name '{name}'"))?;
                match self.peek() {
                    Some(Token::Word(w)) if matches!(w.as_str(), "<" | ">" | "=" | "<=" | ">=" | "!=") => {
                        let cmp = match self.bump().unwrap() {
                            Token::Word(w) => match w.as_str() {
                                "<" => CmpFlag::LT,
                                ">" => CmpFlag::GT,
                                "=" => CmpFlag::EQ,
                                "<=" => CmpFlag::LE,
                                ">=" => CmpFlag::GE,
                                "!=" => CmpFlag::NE,
                                _ => unreachable!(),
                            },
                            _ => unreachable!(),
                        };
                        let evr = match self.bump() {
                            Some(Token::Word(w)) => intern(w).ok_or_else(|| format!("unknown evr '{w}'"))?,
                            other => return Err(format!("expected evr, found {other:?}")),
                        };
                        Ok(ParsedNode::Versioned(name_id, cmp, evr))
                    }
                    _ => Ok(ParsedNode::Simple(name_id)),
                }
            }
            other => Err(format!("expected operand, found {other:?}")),
        }
    }
}

/// Parses `text` into a tree of [`ParsedNode`], resolving every name/evr string via
/// `intern`. `intern` returns `None` for a string it cannot resolve to a
/// [`StringId`] (an unknown name when called read-only) or always `Some` when
/// called by a mutable interner that allocates on demand; either case surfaces as
/// `Err` with a human-readable message, which callers convert into
/// [`crate::error::PoolError::BadReldep`] or simply treat as "no match".
pub(crate) fn parse(text: &str, mut intern: impl FnMut(&str) -> Option<StringId>) -> Result<ParsedNode, String> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Err("empty reldep expression".to_string());
    }
    let mut parser = RichParser {
        tokens: &tokens,
        pos: 0,
    };
    let node = parser.parse_operand(&mut intern)?;
    if parser.pos != tokens.len() {
        return Err("trailing tokens after reldep expression".to_string());
    }
    Ok(node)
}

#[cfg(test)]
mod test {
    use super::*;

    fn dummy_intern(_s: &str) -> Option<StringId> {
        Some(StringId::from_usize_for_test(1))
    }

    impl StringId {
        fn from_usize_for_test(x: usize) -> Self {
            use crate::internal::arena::ArenaId;
            StringId::from_usize(x)
        }
    }

    #[test]
    fn parses_simple_name() {
        let node = parse("glibc", dummy_intern).unwrap();
        assert!(matches!(node, ParsedNode::Simple(_)));
    }

    #[test]
    fn parses_versioned() {
        let node = parse("glibc >= 2.34-1", dummy_intern).unwrap();
        assert!(matches!(node, ParsedNode::Versioned(_, cmp, _) if cmp == CmpFlag::GE));
    }

    #[test]
    fn parses_rich_if() {
        let node = parse("(systemd if glibc)", dummy_intern).unwrap();
        match node {
            ParsedNode::Rich(RichOp::If, _, _) => {}
            _ => panic!("expected rich If node"),
        }
    }

    #[test]
    fn rejects_unknown_operator() {
        assert!(parse("(a frobnicates b)", dummy_intern).is_err());
    }

    #[test]
    fn cmp_flag_accepts() {
        assert!(CmpFlag::GE.accepts(std::cmp::Ordering::Equal));
        assert!(CmpFlag::GE.accepts(std::cmp::Ordering::Greater));
        assert!(!CmpFlag::GE.accepts(std::cmp::Ordering::Less));
        assert!(CmpFlag::NE.accepts(std::cmp::Ordering::Less));
        assert!(!CmpFlag::NE.accepts(std::cmp::Ordering::Equal));
    }
}
