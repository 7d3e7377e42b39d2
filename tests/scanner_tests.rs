use chimerac::lexer::{Scanner, Token, TokenCategory};

#[test]
fn test_simple_declaration() {
    let tokens = Scanner::scan("var x: integer;");
    assert_eq!(
        tokens,
        vec![
            Token::new(TokenCategory::Var, "var", 1, 1),
            Token::new(TokenCategory::Identifier, "x", 1, 5),
            Token::new(TokenCategory::Colon, ":", 1, 6),
            Token::new(TokenCategory::Integer, "integer", 1, 8),
            Token::new(TokenCategory::Semicolon, ";", 1, 15),
            Token::new(TokenCategory::Eof, "", 1, 16),
        ]
    );
}

#[test]
fn test_two_char_symbols_win_over_one_char() {
    let tokens = Scanner::scan(":= <= >= <> < =");
    let categories: Vec<TokenCategory> = tokens.iter().map(|t| t.category).collect();
    assert_eq!(
        categories,
        vec![
            TokenCategory::AssignConst,
            TokenCategory::SmallerEq,
            TokenCategory::GreaterEq,
            TokenCategory::NotEqual,
            TokenCategory::Smaller,
            TokenCategory::Equal,
            TokenCategory::Eof,
        ]
    );
}

#[test]
fn test_line_comment_and_row_tracking() {
    let tokens = Scanner::scan("// greeting\nvar s: string;\n");
    assert_eq!(tokens[0], Token::new(TokenCategory::Var, "var", 2, 1));
    assert_eq!(tokens[1], Token::new(TokenCategory::Identifier, "s", 2, 5));
    assert_eq!(tokens[5], Token::new(TokenCategory::Eof, "", 3, 1));
}

#[test]
fn test_block_comment_spans_lines() {
    let tokens = Scanner::scan("var /* skip\nthis */ x: integer;");
    assert_eq!(tokens[0], Token::new(TokenCategory::Var, "var", 1, 1));
    assert_eq!(tokens[1], Token::new(TokenCategory::Identifier, "x", 2, 9));
}

#[test]
fn test_string_literal_quote_escape() {
    let tokens = Scanner::scan("\"say \"\"hi\"\"\"");
    assert_eq!(
        tokens[0],
        Token::new(TokenCategory::StrLiteral, "say \"hi\"", 1, 1)
    );
}

#[test]
fn test_unterminated_string_is_illegal_quote() {
    let tokens = Scanner::scan("\"abc");
    assert_eq!(tokens[0].category, TokenCategory::IllegalChar);
    assert_eq!(tokens[0].lexeme, "\"");
    assert_eq!(tokens[1], Token::new(TokenCategory::Identifier, "abc", 1, 2));
}

#[test]
fn test_unknown_character_is_illegal() {
    let tokens = Scanner::scan("x ? y");
    assert_eq!(tokens[1].category, TokenCategory::IllegalChar);
    assert_eq!(tokens[1].lexeme, "?");
}

#[test]
fn test_keywords_are_case_sensitive() {
    let tokens = Scanner::scan("Program program");
    assert_eq!(tokens[0].category, TokenCategory::Identifier);
    assert_eq!(tokens[1].category, TokenCategory::Program);
}

#[test]
fn test_eof_sentinel_always_present() {
    let tokens = Scanner::scan("");
    assert_eq!(tokens, vec![Token::new(TokenCategory::Eof, "", 1, 1)]);
}
