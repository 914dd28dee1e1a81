use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("var", TokenKind::Var);
        map.insert("val", TokenKind::Val);
        map.insert("fun", TokenKind::Fun);
        map.insert("class", TokenKind::Class);
        map.insert("abstract", TokenKind::Abstract);
        map.insert("extends", TokenKind::Extends);
        map.insert("implements", TokenKind::Implements);
        map.insert("iterates", TokenKind::Iterates);
        map.insert("init", TokenKind::Init);
        map.insert("const", TokenKind::Const);
        map.insert("public", TokenKind::Public);
        map.insert("protected", TokenKind::Protected);
        map.insert("private", TokenKind::Private);
        map.insert("static", TokenKind::Static);
        map.insert("final", TokenKind::Final);
        map.insert("readonly", TokenKind::Readonly);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("for", TokenKind::For);
        map.insert("foreach", TokenKind::Foreach);
        map.insert("as", TokenKind::As);
        map.insert("try", TokenKind::Try);
        map.insert("catch", TokenKind::Catch);
        map.insert("finally", TokenKind::Finally);
        map.insert("throw", TokenKind::Throw);
        map.insert("echo", TokenKind::Echo);
        map.insert("return", TokenKind::Return);
        map.insert("match", TokenKind::Match);
        map.insert("default", TokenKind::Default);
        map.insert("new", TokenKind::New);
        map.insert("clone", TokenKind::Clone);
        map.insert("instanceof", TokenKind::Instanceof);
        map.insert("this", TokenKind::This);
        map.insert("super", TokenKind::Super);
        map.insert("null", TokenKind::Null);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Template,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment,   // =
    Equals,       // ==
    Identical,    // ===
    Not,          // !
    NotEquals,    // !=
    NotIdentical, // !==
    Spaceship,    // <=>

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,
    Pipe,      // |
    Ampersand, // &

    Dot,
    QuestionDot, // ?.
    ColonColon,  // ::
    Semicolon,
    Colon,
    Question,
    QuestionQuestion, // ??
    Comma,
    FatArrow, // =>

    PlusPlus,
    MinusMinus,
    PlusEquals,
    MinusEquals,
    SlashEquals,
    StarEquals,
    ConcatEquals, // .=

    Plus,
    PlusDot, // +.
    Dash,
    Slash,
    Star,
    StarStar,
    Percent,

    // Reserved
    Var,
    Val,
    Fun,
    Class,
    Abstract,
    Extends,
    Implements,
    Iterates,
    Init,
    Const,
    Public,
    Protected,
    Private,
    Static,
    Final,
    Readonly,
    If,
    Else,
    While,
    For,
    Foreach,
    As,
    Try,
    Catch,
    Finally,
    Throw,
    Echo,
    Return,
    Match,
    Default,
    New,
    Clone,
    Instanceof,
    This,
    Super,
    Null,
    True,
    False,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }
}
