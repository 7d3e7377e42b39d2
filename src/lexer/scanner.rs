use super::token::{Token, TokenCategory, KEYWORDS, ONE_CHAR_SYMBOLS, TWO_CHAR_SYMBOLS};

/// Hand-written scanner for Chimera source text. Scanning never fails:
/// anything unclassifiable becomes an `IllegalChar` token, which the
/// parser later rejects with a positioned syntax error. The returned
/// stream always ends with the `Eof` sentinel.
#[derive(Debug)]
pub struct Scanner {
    chars: Vec<char>,
    index: usize,
    row: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    pub fn scan(input: &str) -> Vec<Token> {
        let mut scanner = Scanner {
            chars: input.chars().collect(),
            index: 0,
            row: 1,
            column: 1,
            tokens: vec![],
        };
        scanner.run();
        scanner.tokens
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let pair: String = self.chars[self.index..].iter().take(2).collect();

            if c.is_whitespace() {
                self.bump();
            } else if pair == "//" {
                self.line_comment();
            } else if pair == "/*" {
                self.block_comment();
            } else if c.is_ascii_alphabetic() {
                self.identifier();
            } else if c.is_ascii_digit() {
                self.int_literal();
            } else if c == '"' {
                self.str_literal();
            } else if let Some(&category) = TWO_CHAR_SYMBOLS.get(pair.as_str()) {
                self.push_symbol(category, 2);
            } else if let Some(&category) = ONE_CHAR_SYMBOLS.get(&c) {
                self.push_symbol(category, 1);
            } else {
                self.push_symbol(TokenCategory::IllegalChar, 1);
            }
        }

        self.tokens
            .push(Token::new(TokenCategory::Eof, "", self.row, self.column));
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn bump(&mut self) -> char {
        let c = self.chars[self.index];
        self.index += 1;
        if c == '\n' {
            self.row += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn push_symbol(&mut self, category: TokenCategory, length: usize) {
        let (row, column) = (self.row, self.column);
        let lexeme: String = (0..length).map(|_| self.bump()).collect();
        self.tokens.push(Token::new(category, lexeme, row, column));
    }

    fn line_comment(&mut self) {
        while matches!(self.peek(), Some(c) if c != '\n') {
            self.bump();
        }
    }

    fn block_comment(&mut self) {
        let mut end = self.index + 2;
        while end + 1 < self.chars.len() && !(self.chars[end] == '*' && self.chars[end + 1] == '/') {
            end += 1;
        }
        if end + 1 < self.chars.len() {
            let end = end + 2;
            while self.index < end {
                self.bump();
            }
        } else {
            // Unterminated block comment: only the opening '/' is illegal.
            self.push_symbol(TokenCategory::IllegalChar, 1);
        }
    }

    fn identifier(&mut self) {
        let (row, column) = (self.row, self.column);
        let mut lexeme = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            lexeme.push(self.bump());
        }
        let category = KEYWORDS
            .get(lexeme.as_str())
            .copied()
            .unwrap_or(TokenCategory::Identifier);
        self.tokens.push(Token::new(category, lexeme, row, column));
    }

    fn int_literal(&mut self) {
        let (row, column) = (self.row, self.column);
        let mut lexeme = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            lexeme.push(self.bump());
        }
        self.tokens
            .push(Token::new(TokenCategory::IntLiteral, lexeme, row, column));
    }

    /// Strings cannot span lines; `""` inside a string encodes one quote.
    /// The stored lexeme is the decoded content without the quotes.
    fn str_literal(&mut self) {
        let (row, column) = (self.row, self.column);
        let mut value = String::new();
        let mut end = self.index + 1;
        let mut terminated = false;

        while end < self.chars.len() && self.chars[end] != '\n' {
            if self.chars[end] == '"' {
                if self.chars.get(end + 1) == Some(&'"') {
                    value.push('"');
                    end += 2;
                    continue;
                }
                terminated = true;
                end += 1;
                break;
            }
            value.push(self.chars[end]);
            end += 1;
        }

        if terminated {
            while self.index < end {
                self.bump();
            }
            self.tokens
                .push(Token::new(TokenCategory::StrLiteral, value, row, column));
        } else {
            // Unterminated string: only the opening quote is illegal.
            self.push_symbol(TokenCategory::IllegalChar, 1);
        }
    }
}
