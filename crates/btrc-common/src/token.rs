use serde::Serialize;

/// A token produced by the btrc lexer.
///
/// `text` is the literal source text of the token (string literals keep
/// their surrounding quotes; f-string tokens carry the raw body without
/// quotes). Positions are 1-based line/column pairs pointing at the first
/// character of the token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub col: u32,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}

/// Every kind of token in the btrc language.
///
/// This enum is the complete vocabulary for the lexer. The keyword and
/// operator subsets are validated against the grammar file at startup via
/// [`TokenKind::from_name`]; adding an operator to the grammar without a
/// matching enumerator here is a fatal configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Literals ───────────────────────────────────────────────────────
    /// Integer literal, e.g. `42`, `0xFF`, `0b11`, `0o17`, `42ULL`.
    IntLit,
    /// Floating-point literal, e.g. `3.14`, `1e9`, `2.5f`.
    FloatLit,
    /// String literal including the surrounding quotes.
    StringLit,
    /// Character literal including the surrounding quotes.
    CharLit,
    /// F-string literal; the token text is the raw body without quotes.
    FStringLit,
    /// Identifier, e.g. `foo`, `my_var`.
    Ident,

    // ── C keywords (32) ────────────────────────────────────────────────
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Int,
    Long,
    Register,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,

    // ── btrc keywords (28) ─────────────────────────────────────────────
    Abstract,
    Bool,
    Catch,
    Class,
    Delete,
    Extends,
    False,
    Finally,
    Function,
    Implements,
    In,
    Interface,
    Keep,
    New,
    Null,
    Override,
    Parallel,
    Private,
    Public,
    Release,
    /// The `self` keyword. Named `SelfKw` to avoid conflict with Rust's `Self`.
    SelfKw,
    Spawn,
    /// The `string` type keyword. Named `StringKw` to keep it distinct
    /// from [`TokenKind::StringLit`].
    StringKw,
    Super,
    Throw,
    True,
    Try,
    Var,

    // ── Annotation ─────────────────────────────────────────────────────
    /// `@gpu`, the only annotation in the language.
    AtGpu,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `<<`
    LtLt,
    /// `>>`
    GtGt,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `&=`
    AmpEq,
    /// `|=`
    PipeEq,
    /// `^=`
    CaretEq,
    /// `<<=`
    LtLtEq,
    /// `>>=`
    GtGtEq,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `->`
    Arrow,
    /// `=>`
    FatArrow,
    /// `.`
    Dot,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `??`
    QuestionQuestion,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `;`
    Semicolon,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    // ── Special ────────────────────────────────────────────────────────
    /// A `#...` line carried through verbatim for the C back-end.
    Preprocessor,
    /// End of file.
    Eof,
}

impl TokenKind {
    /// Resolve a grammar kind name (e.g. `"CLASS"`, `"EQ_EQ"`) to its
    /// enumerator.
    ///
    /// The grammar loader derives these names from the keyword and
    /// operator strings in the EBNF file and calls this to validate that
    /// every grammar entry has a token kind. `None` means the grammar and
    /// this enum are out of sync, which is fatal at startup.
    pub fn from_name(name: &str) -> Option<TokenKind> {
        let kind = match name {
            // C keywords
            "AUTO" => TokenKind::Auto,
            "BREAK" => TokenKind::Break,
            "CASE" => TokenKind::Case,
            "CHAR" => TokenKind::Char,
            "CONST" => TokenKind::Const,
            "CONTINUE" => TokenKind::Continue,
            "DEFAULT" => TokenKind::Default,
            "DO" => TokenKind::Do,
            "DOUBLE" => TokenKind::Double,
            "ELSE" => TokenKind::Else,
            "ENUM" => TokenKind::Enum,
            "EXTERN" => TokenKind::Extern,
            "FLOAT" => TokenKind::Float,
            "FOR" => TokenKind::For,
            "GOTO" => TokenKind::Goto,
            "IF" => TokenKind::If,
            "INT" => TokenKind::Int,
            "LONG" => TokenKind::Long,
            "REGISTER" => TokenKind::Register,
            "RETURN" => TokenKind::Return,
            "SHORT" => TokenKind::Short,
            "SIGNED" => TokenKind::Signed,
            "SIZEOF" => TokenKind::Sizeof,
            "STATIC" => TokenKind::Static,
            "STRUCT" => TokenKind::Struct,
            "SWITCH" => TokenKind::Switch,
            "TYPEDEF" => TokenKind::Typedef,
            "UNION" => TokenKind::Union,
            "UNSIGNED" => TokenKind::Unsigned,
            "VOID" => TokenKind::Void,
            "VOLATILE" => TokenKind::Volatile,
            "WHILE" => TokenKind::While,
            // btrc keywords
            "ABSTRACT" => TokenKind::Abstract,
            "BOOL" => TokenKind::Bool,
            "CATCH" => TokenKind::Catch,
            "CLASS" => TokenKind::Class,
            "DELETE" => TokenKind::Delete,
            "EXTENDS" => TokenKind::Extends,
            "FALSE" => TokenKind::False,
            "FINALLY" => TokenKind::Finally,
            "FUNCTION" => TokenKind::Function,
            "IMPLEMENTS" => TokenKind::Implements,
            "IN" => TokenKind::In,
            "INTERFACE" => TokenKind::Interface,
            "KEEP" => TokenKind::Keep,
            "NEW" => TokenKind::New,
            "NULL" => TokenKind::Null,
            "OVERRIDE" => TokenKind::Override,
            "PARALLEL" => TokenKind::Parallel,
            "PRIVATE" => TokenKind::Private,
            "PUBLIC" => TokenKind::Public,
            "RELEASE" => TokenKind::Release,
            "SELF" => TokenKind::SelfKw,
            "SPAWN" => TokenKind::Spawn,
            "STRING" => TokenKind::StringKw,
            "SUPER" => TokenKind::Super,
            "THROW" => TokenKind::Throw,
            "TRUE" => TokenKind::True,
            "TRY" => TokenKind::Try,
            "VAR" => TokenKind::Var,
            // Operators
            "PLUS" => TokenKind::Plus,
            "MINUS" => TokenKind::Minus,
            "STAR" => TokenKind::Star,
            "SLASH" => TokenKind::Slash,
            "PERCENT" => TokenKind::Percent,
            "EQ" => TokenKind::Eq,
            "EQ_EQ" => TokenKind::EqEq,
            "BANG_EQ" => TokenKind::BangEq,
            "LT" => TokenKind::Lt,
            "GT" => TokenKind::Gt,
            "LT_EQ" => TokenKind::LtEq,
            "GT_EQ" => TokenKind::GtEq,
            "AMP_AMP" => TokenKind::AmpAmp,
            "PIPE_PIPE" => TokenKind::PipePipe,
            "BANG" => TokenKind::Bang,
            "AMP" => TokenKind::Amp,
            "PIPE" => TokenKind::Pipe,
            "CARET" => TokenKind::Caret,
            "TILDE" => TokenKind::Tilde,
            "LT_LT" => TokenKind::LtLt,
            "GT_GT" => TokenKind::GtGt,
            "PLUS_EQ" => TokenKind::PlusEq,
            "MINUS_EQ" => TokenKind::MinusEq,
            "STAR_EQ" => TokenKind::StarEq,
            "SLASH_EQ" => TokenKind::SlashEq,
            "PERCENT_EQ" => TokenKind::PercentEq,
            "AMP_EQ" => TokenKind::AmpEq,
            "PIPE_EQ" => TokenKind::PipeEq,
            "CARET_EQ" => TokenKind::CaretEq,
            "LT_LT_EQ" => TokenKind::LtLtEq,
            "GT_GT_EQ" => TokenKind::GtGtEq,
            "PLUS_PLUS" => TokenKind::PlusPlus,
            "MINUS_MINUS" => TokenKind::MinusMinus,
            "ARROW" => TokenKind::Arrow,
            "FAT_ARROW" => TokenKind::FatArrow,
            "DOT" => TokenKind::Dot,
            "QUESTION" => TokenKind::Question,
            "QUESTION_DOT" => TokenKind::QuestionDot,
            "QUESTION_QUESTION" => TokenKind::QuestionQuestion,
            "COLON" => TokenKind::Colon,
            "COMMA" => TokenKind::Comma,
            "SEMICOLON" => TokenKind::Semicolon,
            // Delimiters
            "LPAREN" => TokenKind::LParen,
            "RPAREN" => TokenKind::RParen,
            "LBRACKET" => TokenKind::LBracket,
            "RBRACKET" => TokenKind::RBracket,
            "LBRACE" => TokenKind::LBrace,
            "RBRACE" => TokenKind::RBrace,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this kind can begin a type expression.
    ///
    /// The parser uses this set for the var-decl, cast, and lambda
    /// lookaheads.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Long
                | TokenKind::Unsigned
                | TokenKind::Signed
                | TokenKind::StringKw
                | TokenKind::Bool
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Union
                | TokenKind::Const
                | TokenKind::Static
                | TokenKind::Extern
                | TokenKind::Volatile
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_new_constructor() {
        let tok = Token::new(TokenKind::Class, "class", 3, 7);
        assert_eq!(tok.kind, TokenKind::Class);
        assert_eq!(tok.text, "class");
        assert_eq!(tok.line, 3);
        assert_eq!(tok.col, 7);
    }

    #[test]
    fn from_name_resolves_keywords() {
        assert_eq!(TokenKind::from_name("CLASS"), Some(TokenKind::Class));
        assert_eq!(TokenKind::from_name("SELF"), Some(TokenKind::SelfKw));
        assert_eq!(TokenKind::from_name("STRING"), Some(TokenKind::StringKw));
        assert_eq!(TokenKind::from_name("WHILE"), Some(TokenKind::While));
        assert_eq!(TokenKind::from_name("VAR"), Some(TokenKind::Var));
    }

    #[test]
    fn from_name_resolves_operators() {
        assert_eq!(TokenKind::from_name("PLUS"), Some(TokenKind::Plus));
        assert_eq!(TokenKind::from_name("EQ_EQ"), Some(TokenKind::EqEq));
        assert_eq!(TokenKind::from_name("LT_LT_EQ"), Some(TokenKind::LtLtEq));
        assert_eq!(TokenKind::from_name("ARROW"), Some(TokenKind::Arrow));
        assert_eq!(TokenKind::from_name("FAT_ARROW"), Some(TokenKind::FatArrow));
        assert_eq!(
            TokenKind::from_name("QUESTION_QUESTION"),
            Some(TokenKind::QuestionQuestion)
        );
        assert_eq!(TokenKind::from_name("LBRACE"), Some(TokenKind::LBrace));
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(TokenKind::from_name("NOT_A_KIND"), None);
        assert_eq!(TokenKind::from_name("class"), None); // names are uppercase
        assert_eq!(TokenKind::from_name(""), None);
    }

    #[test]
    fn type_keywords_cover_type_starts() {
        for kind in [
            TokenKind::Void,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::Double,
            TokenKind::Char,
            TokenKind::Short,
            TokenKind::Long,
            TokenKind::Unsigned,
            TokenKind::Signed,
            TokenKind::StringKw,
            TokenKind::Bool,
            TokenKind::Struct,
            TokenKind::Enum,
            TokenKind::Union,
            TokenKind::Const,
            TokenKind::Static,
            TokenKind::Extern,
            TokenKind::Volatile,
        ] {
            assert!(kind.is_type_keyword(), "{kind:?} should be a type keyword");
        }
        assert!(!TokenKind::Ident.is_type_keyword());
        assert!(!TokenKind::Class.is_type_keyword());
        assert!(!TokenKind::Var.is_type_keyword());
    }
}
