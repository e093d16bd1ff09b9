//! Streaming tokenizer for PHP source files.

use super::error::PhpError;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenTag,
    Identifier,
    /// `$name`; the lexeme excludes the sigil.
    Variable,
    Number,
    /// Quoted string; the lexeme is the decoded value.
    String,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    DoubleColon,
    Arrow,
    DoubleArrow,
    Backslash,
    Ellipsis,
    Question,
    Coalesce,
    CoalesceEq,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    BangEq,
    BangEqEq,
    Eq,
    EqEq,
    EqEqEq,
    Lt,
    LtEq,
    Shl,
    Gt,
    GtEq,
    Shr,
    Plus,
    PlusEq,
    Minus,
    MinusEq,
    Star,
    StarEq,
    StarStar,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Dot,
    DotEq,
    Eof,
}

pub struct Lexer<'src> {
    src: &'src str,
    offset: usize,
    line: usize,
    column: usize,
    saw_open_tag: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            offset: 0,
            line: 1,
            column: 0,
            saw_open_tag: false,
        }
    }

    /// Produces the next token.
    pub fn next_token(&mut self) -> Result<Token, PhpError> {
        if !self.saw_open_tag {
            return self.consume_open_tag();
        }
        self.skip_ignorable()?;
        if self.is_eof() {
            let (line, column) = self.position();
            return Ok(self.make_token(TokenKind::Eof, "", line, column));
        }
        let ch = self.peek_char().expect("not eof");

        match ch {
            '{' => Ok(self.consume_single(TokenKind::LBrace)),
            '}' => Ok(self.consume_single(TokenKind::RBrace)),
            '(' => Ok(self.consume_single(TokenKind::LParen)),
            ')' => Ok(self.consume_single(TokenKind::RParen)),
            '[' => Ok(self.consume_single(TokenKind::LBracket)),
            ']' => Ok(self.consume_single(TokenKind::RBracket)),
            ',' => Ok(self.consume_single(TokenKind::Comma)),
            ';' => Ok(self.consume_single(TokenKind::Semicolon)),
            '\\' => Ok(self.consume_single(TokenKind::Backslash)),
            '~' => Ok(self.consume_single(TokenKind::Tilde)),
            '^' => Ok(self.consume_single(TokenKind::Caret)),
            ':' => Ok(self.consume_pair(':', TokenKind::DoubleColon, TokenKind::Colon)),
            '&' => Ok(self.consume_pair('&', TokenKind::AmpAmp, TokenKind::Amp)),
            '|' => Ok(self.consume_pair('|', TokenKind::PipePipe, TokenKind::Pipe)),
            '$' => self.consume_variable(),
            '?' => Ok(self.consume_question()),
            '!' => Ok(self.consume_bang()),
            '=' => Ok(self.consume_equals()),
            '<' => Ok(self.consume_less()),
            '>' => Ok(self.consume_greater()),
            '+' => Ok(self.consume_pair('=', TokenKind::PlusEq, TokenKind::Plus)),
            '%' => Ok(self.consume_pair('=', TokenKind::PercentEq, TokenKind::Percent)),
            '-' => Ok(self.consume_minus()),
            '*' => Ok(self.consume_star()),
            '/' => Ok(self.consume_single(TokenKind::Slash)),
            '.' => self.consume_dot(),
            '\'' => self.consume_single_quoted(),
            '"' => self.consume_double_quoted(),
            ch if ch.is_ascii_digit() => self.consume_number(),
            ch if is_ident_start(ch) => Ok(self.consume_identifier()),
            _ => Err(self.error(format!("unexpected character '{ch}'"))),
        }
    }

    /// Scans through leading non-PHP text to the `<?php` open tag.
    fn consume_open_tag(&mut self) -> Result<Token, PhpError> {
        loop {
            if self.is_eof() {
                return Err(self.error("missing <?php open tag".to_string()));
            }
            if self.src[self.offset..].starts_with("<?php") {
                let (line, column) = self.position();
                for _ in 0..5 {
                    self.advance_char();
                }
                self.saw_open_tag = true;
                return Ok(self.make_token(TokenKind::OpenTag, "<?php", line, column));
            }
            self.advance_char();
        }
    }

    fn consume_variable(&mut self) -> Result<Token, PhpError> {
        let (line, column) = self.position();
        self.advance_char(); // '$'
        let start = self.offset;
        if !self.peek_char().is_some_and(is_ident_start) {
            return Err(self.error("expected variable name after '$'".to_string()));
        }
        while let Some(ch) = self.peek_char() {
            if is_ident_part(ch) {
                self.advance_char();
            } else {
                break;
            }
        }
        Ok(self.make_token_from_span(TokenKind::Variable, start, self.offset, line, column))
    }

    fn consume_identifier(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        while let Some(ch) = self.peek_char() {
            if is_ident_part(ch) {
                self.advance_char();
            } else {
                break;
            }
        }
        self.make_token_from_span(TokenKind::Identifier, start, self.offset, line, column)
    }

    fn consume_number(&mut self) -> Result<Token, PhpError> {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();

        let radix_prefix = matches!(
            (self.src[start..].chars().next(), self.peek_char()),
            (Some('0'), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O'))
        );
        if radix_prefix {
            self.advance_char();
            let mut digits = 0usize;
            while let Some(ch) = self.peek_char() {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    self.advance_char();
                    digits += 1;
                } else {
                    break;
                }
            }
            if digits == 0 {
                return Err(self.error("numeric literal requires digits after prefix".to_string()));
            }
            return Ok(self.make_token_from_span(TokenKind::Number, start, self.offset, line, column));
        }

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || ch == '_' {
                self.advance_char();
            } else {
                break;
            }
        }
        // Fractional part; do not consume '.' for '..' or '.' followed by a
        // non-digit (concat operator).
        if self.peek_char() == Some('.') && self.peek_next_char().is_some_and(|c| c.is_ascii_digit())
        {
            self.advance_char();
            while let Some(ch) = self.peek_char() {
                if ch.is_ascii_digit() || ch == '_' {
                    self.advance_char();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E'))
            && self
                .peek_next_char()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            self.advance_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.advance_char();
            }
            while let Some(ch) = self.peek_char() {
                if ch.is_ascii_digit() {
                    self.advance_char();
                } else {
                    break;
                }
            }
        }
        Ok(self.make_token_from_span(TokenKind::Number, start, self.offset, line, column))
    }

    fn consume_question(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        if self.peek_char() == Some('?') {
            self.advance_char();
            if self.peek_char() == Some('=') {
                self.advance_char();
                self.make_token_from_span(TokenKind::CoalesceEq, start, self.offset, line, column)
            } else {
                self.make_token_from_span(TokenKind::Coalesce, start, self.offset, line, column)
            }
        } else {
            self.make_token_from_span(TokenKind::Question, start, self.offset, line, column)
        }
    }

    fn consume_bang(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        if self.peek_char() == Some('=') {
            self.advance_char();
            if self.peek_char() == Some('=') {
                self.advance_char();
                self.make_token_from_span(TokenKind::BangEqEq, start, self.offset, line, column)
            } else {
                self.make_token_from_span(TokenKind::BangEq, start, self.offset, line, column)
            }
        } else {
            self.make_token_from_span(TokenKind::Bang, start, self.offset, line, column)
        }
    }

    fn consume_equals(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        match self.peek_char() {
            Some('=') => {
                self.advance_char();
                if self.peek_char() == Some('=') {
                    self.advance_char();
                    self.make_token_from_span(TokenKind::EqEqEq, start, self.offset, line, column)
                } else {
                    self.make_token_from_span(TokenKind::EqEq, start, self.offset, line, column)
                }
            }
            Some('>') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::DoubleArrow, start, self.offset, line, column)
            }
            _ => self.make_token_from_span(TokenKind::Eq, start, self.offset, line, column),
        }
    }

    fn consume_less(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        match self.peek_char() {
            Some('=') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::LtEq, start, self.offset, line, column)
            }
            Some('<') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::Shl, start, self.offset, line, column)
            }
            _ => self.make_token_from_span(TokenKind::Lt, start, self.offset, line, column),
        }
    }

    fn consume_greater(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        match self.peek_char() {
            Some('=') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::GtEq, start, self.offset, line, column)
            }
            Some('>') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::Shr, start, self.offset, line, column)
            }
            _ => self.make_token_from_span(TokenKind::Gt, start, self.offset, line, column),
        }
    }

    fn consume_minus(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        match self.peek_char() {
            Some('>') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::Arrow, start, self.offset, line, column)
            }
            Some('=') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::MinusEq, start, self.offset, line, column)
            }
            _ => self.make_token_from_span(TokenKind::Minus, start, self.offset, line, column),
        }
    }

    fn consume_star(&mut self) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        match self.peek_char() {
            Some('*') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::StarStar, start, self.offset, line, column)
            }
            Some('=') => {
                self.advance_char();
                self.make_token_from_span(TokenKind::StarEq, start, self.offset, line, column)
            }
            _ => self.make_token_from_span(TokenKind::Star, start, self.offset, line, column),
        }
    }

    fn consume_dot(&mut self) -> Result<Token, PhpError> {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        if self.peek_char() == Some('.') {
            self.advance_char();
            if self.peek_char() == Some('.') {
                self.advance_char();
                return Ok(self.make_token_from_span(
                    TokenKind::Ellipsis,
                    start,
                    self.offset,
                    line,
                    column,
                ));
            }
            return Err(self.error("unexpected '..'".to_string()));
        }
        if self.peek_char() == Some('=') {
            self.advance_char();
            return Ok(self.make_token_from_span(TokenKind::DotEq, start, self.offset, line, column));
        }
        Ok(self.make_token_from_span(TokenKind::Dot, start, self.offset, line, column))
    }

    fn consume_single_quoted(&mut self) -> Result<Token, PhpError> {
        let (line, column) = self.position();
        self.advance_char(); // opening quote
        let mut value = String::new();
        while let Some(ch) = self.peek_char() {
            match ch {
                '\'' => {
                    self.advance_char();
                    return Ok(self.make_token(TokenKind::String, &value, line, column));
                }
                '\\' => {
                    self.advance_char();
                    match self.peek_char() {
                        Some('\'') => {
                            value.push('\'');
                            self.advance_char();
                        }
                        Some('\\') => {
                            value.push('\\');
                            self.advance_char();
                        }
                        Some(other) => {
                            // Single-quoted strings keep unknown escapes verbatim.
                            value.push('\\');
                            value.push(other);
                            self.advance_char();
                        }
                        None => {
                            return Err(self.error("unterminated escape sequence".to_string()));
                        }
                    }
                }
                other => {
                    value.push(other);
                    self.advance_char();
                }
            }
        }
        Err(self.error("unterminated string literal".to_string()))
    }

    fn consume_double_quoted(&mut self) -> Result<Token, PhpError> {
        let (line, column) = self.position();
        self.advance_char(); // opening quote
        let mut value = String::new();
        while let Some(ch) = self.peek_char() {
            match ch {
                '"' => {
                    self.advance_char();
                    return Ok(self.make_token(TokenKind::String, &value, line, column));
                }
                '\\' => {
                    self.advance_char();
                    let Some(escaped) = self.peek_char() else {
                        return Err(self.error("unterminated escape sequence".to_string()));
                    };
                    let actual = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '"' => '"',
                        '$' => '$',
                        '\\' => '\\',
                        other => {
                            value.push('\\');
                            other
                        }
                    };
                    value.push(actual);
                    self.advance_char();
                }
                // `"$name"`, `"${name}"`, and `"{$name}"` interpolate; the
                // supported grammar has no interpolation, so reject rather
                // than fold a dynamic value into a fixed string.
                '$' if self
                    .peek_next_char()
                    .is_some_and(|next| is_ident_start(next) || next == '{') =>
                {
                    return Err(
                        self.error("string interpolation is not supported".to_string())
                    );
                }
                '{' if self.peek_next_char() == Some('$') => {
                    return Err(
                        self.error("string interpolation is not supported".to_string())
                    );
                }
                other => {
                    value.push(other);
                    self.advance_char();
                }
            }
        }
        Err(self.error("unterminated string literal".to_string()))
    }

    fn skip_ignorable(&mut self) -> Result<(), PhpError> {
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                Some('#') => self.consume_line_comment(),
                Some('/') if self.peek_next_char() == Some('/') => self.consume_line_comment(),
                Some('/') if self.peek_next_char() == Some('*') => {
                    self.consume_block_comment()?;
                }
                Some('?') if self.peek_next_char() == Some('>') => {
                    // Close tag ends the script; anything after is raw text.
                    self.offset = self.src.len();
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    fn consume_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            self.advance_char();
            if ch == '\n' {
                break;
            }
        }
    }

    fn consume_block_comment(&mut self) -> Result<(), PhpError> {
        self.advance_char(); // '/'
        self.advance_char(); // '*'
        while let Some(ch) = self.peek_char() {
            if ch == '*' && self.peek_next_char() == Some('/') {
                self.advance_char();
                self.advance_char();
                return Ok(());
            }
            self.advance_char();
        }
        Err(self.error("unterminated block comment".to_string()))
    }

    fn consume_single(&mut self, kind: TokenKind) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        self.make_token_from_span(kind, start, self.offset, line, column)
    }

    fn consume_pair(&mut self, second: char, double: TokenKind, single: TokenKind) -> Token {
        let start = self.offset;
        let (line, column) = self.position();
        self.advance_char();
        if self.peek_char() == Some(second) {
            self.advance_char();
            self.make_token_from_span(double, start, self.offset, line, column)
        } else {
            self.make_token_from_span(single, start, self.offset, line, column)
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.src[self.offset..].chars();
        iter.next()?;
        iter.next()
    }

    fn advance_char(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        } else {
            self.offset = self.src.len();
        }
    }

    fn is_eof(&self) -> bool {
        self.offset >= self.src.len()
    }

    fn position(&self) -> (usize, usize) {
        (self.line, self.column + 1)
    }

    fn error(&self, message: String) -> PhpError {
        PhpError::Lexer {
            message,
            line: self.line,
        }
    }

    fn make_token(&self, kind: TokenKind, lexeme: &str, line: usize, column: usize) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            line,
            column,
        }
    }

    fn make_token_from_span(
        &self,
        kind: TokenKind,
        start: usize,
        end: usize,
        line: usize,
        column: usize,
    ) -> Token {
        let slice = &self.src[start..end];
        self.make_token(kind, slice, line, column)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_ident_part(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::{Lexer, TokenKind};

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().expect("tokenize");
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                break;
            }
        }
        kinds
    }

    #[test]
    fn lexes_basic_statement() {
        let stream = kinds("<?php $x = strlen('hi');");
        assert_eq!(
            stream,
            vec![
                TokenKind::OpenTag,
                TokenKind::Variable,
                TokenKind::Eq,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::String,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn distinguishes_arrow_tokens() {
        let stream = kinds("<?php $a->b; ['k' => 1];");
        assert!(stream.contains(&TokenKind::Arrow));
        assert!(stream.contains(&TokenKind::DoubleArrow));
    }

    #[test]
    fn tracks_lines_across_comments() {
        let src = "<?php\n// comment\n/* block\nspans */\n$x;\n";
        let mut lexer = Lexer::new(src);
        lexer.next_token().expect("open tag");
        let var = lexer.next_token().expect("variable");
        assert_eq!(var.kind, TokenKind::Variable);
        assert_eq!(var.line, 5);
    }

    #[test]
    fn decodes_string_escapes() {
        let mut lexer = Lexer::new("<?php 'it\\'s' \"a\\nb\"");
        lexer.next_token().expect("open tag");
        let single = lexer.next_token().expect("single");
        assert_eq!(single.lexeme, "it's");
        let double = lexer.next_token().expect("double");
        assert_eq!(double.lexeme, "a\nb");
    }

    #[test]
    fn lexes_numeric_forms() {
        let mut lexer = Lexer::new("<?php 1_000 0xFF 3.14 1e9 2 .5");
        lexer.next_token().expect("open tag");
        for expected in ["1_000", "0xFF", "3.14", "1e9", "2"] {
            let token = lexer.next_token().expect("number");
            assert_eq!(token.kind, TokenKind::Number);
            assert_eq!(token.lexeme, expected);
        }
    }

    #[test]
    fn interpolating_double_quoted_string_is_an_error() {
        for src in ["<?php \"v: $n\"", "<?php \"v: ${n}\"", "<?php \"v: {$n}\""] {
            let mut lexer = Lexer::new(src);
            lexer.next_token().expect("open tag");
            let err = lexer.next_token().unwrap_err();
            assert!(err.to_string().contains("interpolation"), "{src}");
        }
    }

    #[test]
    fn escaped_dollar_stays_literal() {
        let mut lexer = Lexer::new("<?php \"v: \\$n\" \"end $\"");
        lexer.next_token().expect("open tag");
        assert_eq!(lexer.next_token().expect("string").lexeme, "v: $n");
        assert_eq!(lexer.next_token().expect("string").lexeme, "end $");
    }

    #[test]
    fn dollar_without_name_is_an_error() {
        let mut lexer = Lexer::new("<?php $ x");
        lexer.next_token().expect("open tag");
        let err = lexer.next_token().unwrap_err();
        assert!(err.to_string().contains("variable name"));
    }

    #[test]
    fn close_tag_ends_the_stream() {
        let stream = kinds("<?php $x; ?> trailing html");
        assert_eq!(stream.last(), Some(&TokenKind::Eof));
        assert_eq!(stream.len(), 4);
    }
}
