//! Token types produced by the T-SQL lexer.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// Source location of a token or error.
///
/// `offset` is a byte offset into the original text; `line` and `column`
/// are 1-based, with columns counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Reserved T-SQL words the parser cares about.
///
/// Words outside this set are lexed as identifiers, even when T-SQL treats
/// them as keywords in some contexts (e.g. `APPLY`, `TIES`, `OFFSET`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    All,
    Alter,
    And,
    As,
    Asc,
    Begin,
    Between,
    By,
    Case,
    Convert,
    Create,
    Cross,
    Declare,
    Delete,
    Desc,
    Distinct,
    Drop,
    Else,
    End,
    Escape,
    Except,
    Exec,
    Execute,
    Exists,
    For,
    From,
    Full,
    Group,
    Having,
    If,
    In,
    Inner,
    Insert,
    Intersect,
    Into,
    Is,
    Join,
    Left,
    Like,
    Merge,
    Not,
    Null,
    On,
    Option,
    Or,
    Order,
    Outer,
    Over,
    Percent,
    Right,
    Select,
    Set,
    Then,
    Top,
    Truncate,
    Union,
    Update,
    Use,
    When,
    Where,
    With,
}

static KEYWORDS: Lazy<HashMap<&'static str, Keyword>> = Lazy::new(|| {
    use Keyword::*;
    HashMap::from([
        ("ALL", All),
        ("ALTER", Alter),
        ("AND", And),
        ("AS", As),
        ("ASC", Asc),
        ("BEGIN", Begin),
        ("BETWEEN", Between),
        ("BY", By),
        ("CASE", Case),
        ("CONVERT", Convert),
        ("CREATE", Create),
        ("CROSS", Cross),
        ("DECLARE", Declare),
        ("DELETE", Delete),
        ("DESC", Desc),
        ("DISTINCT", Distinct),
        ("DROP", Drop),
        ("ELSE", Else),
        ("END", End),
        ("ESCAPE", Escape),
        ("EXCEPT", Except),
        ("EXEC", Exec),
        ("EXECUTE", Execute),
        ("EXISTS", Exists),
        ("FOR", For),
        ("FROM", From),
        ("FULL", Full),
        ("GROUP", Group),
        ("HAVING", Having),
        ("IF", If),
        ("IN", In),
        ("INNER", Inner),
        ("INSERT", Insert),
        ("INTERSECT", Intersect),
        ("INTO", Into),
        ("IS", Is),
        ("JOIN", Join),
        ("LEFT", Left),
        ("LIKE", Like),
        ("MERGE", Merge),
        ("NOT", Not),
        ("NULL", Null),
        ("ON", On),
        ("OPTION", Option),
        ("OR", Or),
        ("ORDER", Order),
        ("OUTER", Outer),
        ("OVER", Over),
        ("PERCENT", Percent),
        ("RIGHT", Right),
        ("SELECT", Select),
        ("SET", Set),
        ("THEN", Then),
        ("TOP", Top),
        ("TRUNCATE", Truncate),
        ("UNION", Union),
        ("UPDATE", Update),
        ("USE", Use),
        ("WHEN", When),
        ("WHERE", Where),
        ("WITH", With),
    ])
});

impl Keyword {
    /// Look up a bare word, ignoring case.
    pub fn lookup(word: &str) -> Option<Keyword> {
        if word.len() > 9 {
            return None;
        }
        KEYWORDS.get(word.to_ascii_uppercase().as_str()).copied()
    }

    /// Keywords that begin a statement other than a query.
    pub fn starts_other_statement(self) -> bool {
        matches!(
            self,
            Keyword::Alter
                | Keyword::Begin
                | Keyword::Create
                | Keyword::Declare
                | Keyword::Delete
                | Keyword::Drop
                | Keyword::Exec
                | Keyword::Execute
                | Keyword::If
                | Keyword::Insert
                | Keyword::Merge
                | Keyword::Set
                | Keyword::Truncate
                | Keyword::Update
                | Keyword::Use
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    NotLt,
    NotGt,
    Plus,
    Minus,
    Slash,
    Percent,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    Comma,
    LParen,
    RParen,
    Period,
    Semicolon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain, `[bracketed]` or `"quoted"` identifier.
    Identifier,
    Keyword(Keyword),
    /// `@local` or `@@global` variable.
    Variable,
    Operator(Operator),
    Punctuation(Punctuation),
    StringLiteral,
    NumberLiteral,
    /// `*`, either a wildcard or multiplication depending on context.
    Star,
    /// A line holding only `GO` (optionally `GO;`), outside comments and strings.
    BatchSeparator,
    Unknown,
    Eof,
}

/// A lexed token. `text` is the raw source slice, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
