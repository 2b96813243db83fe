//! btrc lexer: tokenizer for the btrc language.
//!
//! Converts source text into a stream of [`Token`]s terminated by an
//! `Eof` sentinel. Keyword and operator recognition is table-driven: both
//! tables come from the grammar file through [`btrc_common::grammar`], so
//! the lexer itself contains no hard-coded operator strings. The first
//! malformed construct aborts lexing with a positioned [`LexError`].

mod cursor;

use btrc_common::error::{LexError, LexErrorKind};
use btrc_common::grammar::{grammar, GrammarInfo};
use btrc_common::token::{Token, TokenKind};
use cursor::Cursor;

/// The btrc lexer. Converts source text into a vector of tokens.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    grammar: &'static GrammarInfo,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            grammar: grammar(),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source. The returned vector always ends with
    /// an `Eof` token.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(source).run()
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_trivia()?;
            let Some(c) = self.cursor.peek() else { break };
            match c {
                '#' if self.at_line_start() => self.lex_preprocessor(),
                '@' => self.lex_annotation()?,
                '"' => self.lex_string()?,
                '\'' => self.lex_char()?,
                '0'..='9' => self.lex_number()?,
                c if is_ident_start(c) => self.lex_ident()?,
                _ => self.lex_operator()?,
            }
        }
        let (line, col) = self.here();
        self.tokens.push(Token::new(TokenKind::Eof, "", line, col));
        Ok(self.tokens)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Current 1-based position.
    fn here(&self) -> (u32, u32) {
        (self.cursor.line(), self.cursor.col())
    }

    fn emit(&mut self, kind: TokenKind, text: impl Into<String>, line: u32, col: u32) {
        self.tokens.push(Token::new(kind, text, line, col));
    }

    fn err(&self, kind: LexErrorKind, line: u32, col: u32) -> LexError {
        LexError::new(kind, line, col)
    }

    /// Whether only spaces/tabs precede the current position on this line.
    fn at_line_start(&self) -> bool {
        let before = self.cursor.slice(0, self.cursor.pos());
        for b in before.bytes().rev() {
            match b {
                b' ' | b'\t' => continue,
                b'\n' => return true,
                _ => return false,
            }
        }
        true
    }

    // ── Whitespace and comments ────────────────────────────────────────

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.peek() {
                Some(' ' | '\t' | '\n' | '\r') => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.peek_next() == Some('*') => {
                    self.skip_block_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let (line, col) = self.here();
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '*'
        loop {
            match self.cursor.peek() {
                None => return Err(self.err(LexErrorKind::UnterminatedBlockComment, line, col)),
                Some('*') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    return Ok(());
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Preprocessor passthrough ───────────────────────────────────────

    /// A `#` at line start consumes to end of line, honoring `\`-newline
    /// continuations. The directive is carried through verbatim.
    fn lex_preprocessor(&mut self) {
        let (line, col) = self.here();
        let start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                Some('\\') if self.cursor.peek_next() == Some('\n') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('\n') | None => break,
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(start, self.cursor.pos()).to_string();
        self.emit(TokenKind::Preprocessor, text, line, col);
    }

    // ── Annotations ────────────────────────────────────────────────────

    fn lex_annotation(&mut self) -> Result<(), LexError> {
        let (line, col) = self.here();
        self.cursor.advance(); // '@'
        let start = self.cursor.pos();
        self.cursor.eat_while(is_ident_continue);
        let name = self.cursor.slice(start, self.cursor.pos());
        if name == "gpu" {
            self.emit(TokenKind::AtGpu, "@gpu", line, col);
            Ok(())
        } else {
            Err(self.err(LexErrorKind::UnknownAnnotation(name.to_string()), line, col))
        }
    }

    // ── String literals ────────────────────────────────────────────────

    /// Double-quoted or triple-quoted string. The emitted token value
    /// keeps the surrounding quotes; triple-quoted bodies have raw
    /// newlines converted to `\n` escapes.
    fn lex_string(&mut self) -> Result<(), LexError> {
        let (line, col) = self.here();
        self.cursor.advance(); // opening '"'

        if self.cursor.peek() == Some('"') && self.cursor.peek_next() == Some('"') {
            self.cursor.advance();
            self.cursor.advance();
            return self.lex_triple_string(line, col);
        }

        let mut value = String::from("\"");
        loop {
            match self.cursor.peek() {
                Some('"') => {
                    self.cursor.advance();
                    value.push('"');
                    self.emit(TokenKind::StringLit, value, line, col);
                    return Ok(());
                }
                Some('\\') => {
                    value.push(self.cursor.advance().unwrap_or('\\'));
                    if let Some(c) = self.cursor.advance() {
                        value.push(c);
                    }
                }
                Some('\n') | None => {
                    return Err(self.err(LexErrorKind::UnterminatedString, line, col));
                }
                Some(_) => {
                    value.push(self.cursor.advance().unwrap_or('\0'));
                }
            }
        }
    }

    fn lex_triple_string(&mut self, line: u32, col: u32) -> Result<(), LexError> {
        let mut value = String::from("\"");
        loop {
            if self.cursor.peek() == Some('"')
                && self.cursor.peek_next() == Some('"')
                && self.cursor.peek_nth(2) == Some('"')
            {
                self.cursor.advance();
                self.cursor.advance();
                self.cursor.advance();
                value.push('"');
                self.emit(TokenKind::StringLit, value, line, col);
                return Ok(());
            }
            match self.cursor.advance() {
                None => return Err(self.err(LexErrorKind::UnterminatedTripleString, line, col)),
                Some('\n') => value.push_str("\\n"),
                Some('\r') => {
                    value.push_str("\\n");
                    if self.cursor.peek() == Some('\n') {
                        self.cursor.advance();
                    }
                }
                Some('\\') => {
                    value.push('\\');
                    if let Some(c) = self.cursor.advance() {
                        value.push(c);
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    // ── Char literals ──────────────────────────────────────────────────

    fn lex_char(&mut self) -> Result<(), LexError> {
        let (line, col) = self.here();
        self.cursor.advance(); // opening '\''
        let mut value = String::from("'");
        loop {
            match self.cursor.peek() {
                Some('\'') => {
                    self.cursor.advance();
                    value.push('\'');
                    self.emit(TokenKind::CharLit, value, line, col);
                    return Ok(());
                }
                Some('\\') => {
                    value.push(self.cursor.advance().unwrap_or('\\'));
                    if let Some(c) = self.cursor.advance() {
                        value.push(c);
                    }
                }
                None => return Err(self.err(LexErrorKind::UnterminatedChar, line, col)),
                Some(_) => {
                    value.push(self.cursor.advance().unwrap_or('\0'));
                }
            }
        }
    }

    // ── Number literals ────────────────────────────────────────────────

    fn lex_number(&mut self) -> Result<(), LexError> {
        let (line, col) = self.here();
        let start = self.cursor.pos();
        let mut is_float = false;

        if self.cursor.peek() == Some('0') {
            match self.cursor.peek_next() {
                Some('x' | 'X') => {
                    return self.lex_prefixed(
                        start,
                        line,
                        col,
                        |c| c.is_ascii_hexdigit(),
                        LexErrorKind::EmptyHexLiteral,
                    );
                }
                Some('b' | 'B') => {
                    return self.lex_prefixed(
                        start,
                        line,
                        col,
                        |c| c == '0' || c == '1',
                        LexErrorKind::EmptyBinaryLiteral,
                    );
                }
                Some('o' | 'O') => {
                    return self.lex_prefixed(
                        start,
                        line,
                        col,
                        |c| ('0'..='7').contains(&c),
                        LexErrorKind::EmptyOctalLiteral,
                    );
                }
                _ => {}
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit());

        // Fractional part only when a digit follows the dot (not `..`).
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        // Exponent forces float and requires digits.
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            is_float = true;
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if !self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(self.err(LexErrorKind::EmptyExponent, line, col));
            }
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }

        if matches!(self.cursor.peek(), Some('f' | 'F')) {
            is_float = true;
            self.cursor.advance();
        }

        if !is_float {
            self.eat_int_suffix();
        }

        let text = self.cursor.slice(start, self.cursor.pos()).to_string();
        let kind = if is_float {
            TokenKind::FloatLit
        } else {
            TokenKind::IntLit
        };
        self.emit(kind, text, line, col);
        Ok(())
    }

    /// Lex a `0x`/`0b`/`0o` literal: the prefix, at least one digit, and
    /// an optional integer suffix.
    fn lex_prefixed(
        &mut self,
        start: usize,
        line: u32,
        col: u32,
        digit: impl Fn(char) -> bool,
        empty: LexErrorKind,
    ) -> Result<(), LexError> {
        self.cursor.advance(); // '0'
        self.cursor.advance(); // prefix letter
        if !self.cursor.peek().is_some_and(&digit) {
            return Err(self.err(empty, line, col));
        }
        self.cursor.eat_while(digit);
        self.eat_int_suffix();
        let text = self.cursor.slice(start, self.cursor.pos()).to_string();
        self.emit(TokenKind::IntLit, text, line, col);
        Ok(())
    }

    /// Consume optional integer suffixes: u, l, ll and their combinations
    /// (ul, ull, lu, llu), case-insensitive.
    fn eat_int_suffix(&mut self) {
        if matches!(self.cursor.peek(), Some('u' | 'U')) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('l' | 'L')) {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('l' | 'L')) {
                    self.cursor.advance();
                }
            }
        } else if matches!(self.cursor.peek(), Some('l' | 'L')) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('l' | 'L')) {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('u' | 'U')) {
                    self.cursor.advance();
                }
            } else if matches!(self.cursor.peek(), Some('u' | 'U')) {
                self.cursor.advance();
            }
        }
    }

    // ── Identifiers, keywords, f-strings ───────────────────────────────

    fn lex_ident(&mut self) -> Result<(), LexError> {
        let (line, col) = self.here();
        let start = self.cursor.pos();
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());

        // A lone `f` immediately followed by `"` begins an f-string.
        if text == "f" && self.cursor.peek() == Some('"') {
            return self.lex_fstring(line, col);
        }

        let kind = self
            .grammar
            .keyword_kinds
            .get(text)
            .copied()
            .unwrap_or(TokenKind::Ident);
        let text = text.to_string();
        self.emit(kind, text, line, col);
        Ok(())
    }

    /// F-string body: raw content without the surrounding quotes. `{{` and
    /// `}}` stay literal; balanced `{...}` regions nest and may contain `"`.
    fn lex_fstring(&mut self, line: u32, col: u32) -> Result<(), LexError> {
        self.cursor.advance(); // opening '"'
        let mut value = String::new();
        let mut brace_depth = 0u32;
        loop {
            match self.cursor.peek() {
                Some('"') if brace_depth == 0 => {
                    self.cursor.advance();
                    self.emit(TokenKind::FStringLit, value, line, col);
                    return Ok(());
                }
                Some('{') => {
                    if brace_depth == 0 && self.cursor.peek_next() == Some('{') {
                        value.push(self.cursor.advance().unwrap_or('{'));
                        value.push(self.cursor.advance().unwrap_or('{'));
                    } else {
                        brace_depth += 1;
                        value.push(self.cursor.advance().unwrap_or('{'));
                    }
                }
                Some('}') => {
                    if brace_depth == 0 && self.cursor.peek_next() == Some('}') {
                        value.push(self.cursor.advance().unwrap_or('}'));
                        value.push(self.cursor.advance().unwrap_or('}'));
                    } else {
                        brace_depth = brace_depth.saturating_sub(1);
                        value.push(self.cursor.advance().unwrap_or('}'));
                    }
                }
                Some('\\') => {
                    value.push(self.cursor.advance().unwrap_or('\\'));
                    if let Some(c) = self.cursor.advance() {
                        value.push(c);
                    }
                }
                Some('\n') | None => {
                    return Err(self.err(LexErrorKind::UnterminatedFString, line, col));
                }
                Some(_) => {
                    value.push(self.cursor.advance().unwrap_or('\0'));
                }
            }
        }
    }

    // ── Operators ──────────────────────────────────────────────────────

    /// Greedy longest-match against the operator table from the grammar.
    fn lex_operator(&mut self) -> Result<(), LexError> {
        let (line, col) = self.here();
        let rest = self.cursor.rest();
        for op in &self.grammar.operators {
            if rest.starts_with(op.as_str()) {
                let kind = self.grammar.operator_kinds[op];
                let text = op.clone();
                for _ in 0..op.chars().count() {
                    self.cursor.advance();
                }
                self.emit(kind, text, line, col);
                return Ok(());
            }
        }
        let c = self.cursor.peek().unwrap_or('\0');
        Err(self.err(LexErrorKind::UnexpectedCharacter(c), line, col))
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_simple_declaration() {
        assert_eq!(
            kinds("int x = 42;"),
            vec![
                TokenKind::Int,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::IntLit,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_positions_are_one_based() {
        let tokens = Lexer::tokenize("int x\n  = 1").unwrap();
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1)); // int
        assert_eq!((tokens[1].line, tokens[1].col), (1, 5)); // x
        assert_eq!((tokens[2].line, tokens[2].col), (2, 3)); // =
        assert_eq!((tokens[3].line, tokens[3].col), (2, 5)); // 1
    }

    #[test]
    fn lex_greedy_operators() {
        assert_eq!(
            kinds("a <<= b >> c >= d"),
            vec![
                TokenKind::Ident,
                TokenKind::LtLtEq,
                TokenKind::Ident,
                TokenKind::GtGt,
                TokenKind::Ident,
                TokenKind::GtEq,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_optional_chaining_operators() {
        assert_eq!(
            kinds("a?.b ?? c ? d : e"),
            vec![
                TokenKind::Ident,
                TokenKind::QuestionDot,
                TokenKind::Ident,
                TokenKind::QuestionQuestion,
                TokenKind::Ident,
                TokenKind::Question,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_numeric_forms() {
        let tokens =
            Lexer::tokenize("0xFF 0b11 0o17 42ULL 3.14e-2f 10 2e3").unwrap();
        let expected = [
            (TokenKind::IntLit, "0xFF"),
            (TokenKind::IntLit, "0b11"),
            (TokenKind::IntLit, "0o17"),
            (TokenKind::IntLit, "42ULL"),
            (TokenKind::FloatLit, "3.14e-2f"),
            (TokenKind::IntLit, "10"),
            (TokenKind::FloatLit, "2e3"),
        ];
        for (i, (kind, text)) in expected.iter().enumerate() {
            assert_eq!(tokens[i].kind, *kind, "token {i}");
            assert_eq!(tokens[i].text, *text, "token {i}");
        }
    }

    #[test]
    fn lex_dot_without_digit_is_not_a_fraction() {
        assert_eq!(
            kinds("1.toString"),
            vec![
                TokenKind::IntLit,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_malformed_prefixes_fail() {
        assert!(Lexer::tokenize("0x;").is_err());
        assert!(Lexer::tokenize("0b2").is_err());
        assert!(Lexer::tokenize("0o9").is_err());
        assert!(Lexer::tokenize("1e;").is_err());
    }

    #[test]
    fn lex_string_keeps_quotes() {
        let tokens = Lexer::tokenize(r#""hello \"x\"""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLit);
        assert_eq!(tokens[0].text, r#""hello \"x\"""#);
    }

    #[test]
    fn lex_triple_quoted_string_escapes_newlines() {
        let tokens = Lexer::tokenize("\"\"\"a\nb\"\"\"").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLit);
        assert_eq!(tokens[0].text, "\"a\\nb\"");
    }

    #[test]
    fn lex_char_literal() {
        let tokens = Lexer::tokenize(r"'\n'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::CharLit);
        assert_eq!(tokens[0].text, r"'\n'");
    }

    #[test]
    fn lex_unterminated_string_fails() {
        let err = Lexer::tokenize("\"abc\n\"").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!((err.line, err.col), (1, 1));
    }

    #[test]
    fn lex_unterminated_block_comment_fails() {
        let err = Lexer::tokenize("int x; /* no close").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedBlockComment);
    }

    #[test]
    fn lex_comments_are_skipped() {
        assert_eq!(
            kinds("int /* mid */ x; // tail\nfloat y;"),
            vec![
                TokenKind::Int,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Float,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_fstring_value_is_raw_body() {
        let tokens = Lexer::tokenize(r#"f"x={y}""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::FStringLit);
        assert_eq!(tokens[0].text, "x={y}");
    }

    #[test]
    fn lex_fstring_double_braces_stay_literal() {
        let tokens = Lexer::tokenize(r#"f"{{literal}} {expr}""#).unwrap();
        assert_eq!(tokens[0].text, "{{literal}} {expr}");
    }

    #[test]
    fn lex_fstring_nested_braces_balance() {
        let tokens = Lexer::tokenize(r#"f"v={ {1: 2} }""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::FStringLit);
        assert_eq!(tokens[0].text, "v={ {1: 2} }");
    }

    #[test]
    fn lex_unterminated_fstring_fails() {
        let err = Lexer::tokenize("f\"oops").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedFString);
    }

    #[test]
    fn lex_ident_starting_with_f_is_not_fstring() {
        assert_eq!(
            kinds("fn f foo"),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_preprocessor_passthrough() {
        let tokens = Lexer::tokenize("#include <stdio.h>\nint x;").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Preprocessor);
        assert_eq!(tokens[0].text, "#include <stdio.h>");
        assert_eq!(tokens[1].kind, TokenKind::Int);
    }

    #[test]
    fn lex_preprocessor_line_continuation() {
        let tokens = Lexer::tokenize("#define X \\\n  1\nint x;").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Preprocessor);
        assert_eq!(tokens[0].text, "#define X \\\n  1");
        assert_eq!(tokens[1].kind, TokenKind::Int);
    }

    #[test]
    fn lex_hash_mid_line_is_an_error() {
        let err = Lexer::tokenize("int x; #define Y").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('#'));
    }

    #[test]
    fn lex_gpu_annotation() {
        let tokens = Lexer::tokenize("@gpu void k() {}").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::AtGpu);
        assert_eq!(tokens[0].text, "@gpu");
    }

    #[test]
    fn lex_unknown_annotation_fails() {
        let err = Lexer::tokenize("@cpu void k() {}").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnknownAnnotation("cpu".into()));
    }

    #[test]
    fn lex_keywords_from_grammar() {
        assert_eq!(
            kinds("class self var keep parallel"),
            vec![
                TokenKind::Class,
                TokenKind::SelfKw,
                TokenKind::Var,
                TokenKind::Keep,
                TokenKind::Parallel,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_round_trip_through_token_text() {
        // Re-tokenizing the space-joined token texts yields the same
        // stream (f-strings and preprocessor lines carry transformed
        // text and are excluded by construction).
        let source = "class A { private Map<string, int> m; }\n\
                      void t() { var x = 0xFF + 3.14e-2f; x <<= 2; s = \"hi\"; c = '\\n'; }";
        let tokens = Lexer::tokenize(source).unwrap();
        let joined = tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let again = Lexer::tokenize(&joined).unwrap();
        let first: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.clone())).collect();
        let second: Vec<_> = again.iter().map(|t| (t.kind, t.text.clone())).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn lex_positions_monotonic() {
        let src = "class A { private int x; }\nvoid f() { var y = [1, 2]; }";
        let tokens = Lexer::tokenize(src).unwrap();
        let mut prev = (0u32, 0u32);
        for tok in &tokens {
            let cur = (tok.line, tok.col);
            assert!(cur >= prev, "positions must be non-decreasing: {cur:?} after {prev:?}");
            prev = cur;
        }
    }
}
