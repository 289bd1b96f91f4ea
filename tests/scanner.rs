//! Scanner edge cases and error tests.

use docklett::{Literal, ScanErrorKind, Scanner, TokenKind, scan};

fn kinds(input: &str) -> Vec<TokenKind> {
    scan(input, "test.dkl")
        .expect("scan")
        .iter()
        .map(|t| t.kind)
        .collect()
}

// -----------------------------------------------------------
// Basic scanner behaviour.
// -----------------------------------------------------------

#[test]
fn scan_empty_input() {
    let tokens = scan("", "test.dkl").expect("scan");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!((tokens[0].position.line, tokens[0].position.column), (1, 1));
}

#[test]
fn scan_only_whitespace() {
    assert_eq!(
        kinds("   \t  \n\n  "),
        vec![TokenKind::Newline, TokenKind::Newline, TokenKind::Eof]
    );
}

#[test]
fn eof_carries_final_position() {
    let tokens = scan("ab", "test.dkl").expect("scan");
    let eof = tokens.last().expect("eof");
    assert_eq!((eof.position.line, eof.position.column), (1, 3));
}

#[test]
fn keyword_lexeme_keeps_at_sign() {
    let tokens = scan("@SET x", "test.dkl").expect("scan");
    assert_eq!(tokens[0].lexeme, "@SET");
    assert_eq!(tokens[1].name(), "x");
}

#[test]
fn trailing_comment_after_directive() {
    assert_eq!(
        kinds("@SET x = 1 # note\n"),
        vec![
            TokenKind::Set,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_keeps_hash_and_newline() {
    let tokens = scan("\"a#b\nc\" x", "test.dkl").expect("scan");
    assert_eq!(tokens[0].literal, Some(Literal::Str("a#b\nc".to_string())));
    assert_eq!((tokens[1].position.line, tokens[1].position.column), (2, 4));
}

#[test]
fn identifiers_allow_underscores_and_digits() {
    let tokens = scan("_base_image2", "test.dkl").expect("scan");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].name(), "_base_image2");
}

#[test]
fn crlf_line_endings() {
    let tokens = scan("@SET x = 1\r\nRUN make\r\n", "test.dkl").expect("scan");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Set,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Instruction,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[5].lexeme, "RUN make");
}

// -----------------------------------------------------------
// Instruction lines and directive lines.
// -----------------------------------------------------------

#[test]
fn host_verbs_ignore_case() {
    let tokens = scan("run echo hi\n", "test.dkl").expect("scan");
    assert_eq!(tokens[0].kind, TokenKind::Instruction);
    assert_eq!(tokens[0].lexeme, "run echo hi");
}

#[test]
fn hash_inside_instruction_is_verbatim() {
    let tokens = scan("RUN echo # not a comment\n", "test.dkl").expect("scan");
    assert_eq!(tokens[0].lexeme, "RUN echo # not a comment");
}

#[test]
fn host_verb_on_directive_line_is_identifier() {
    let tokens = scan("@SET user = \"app\"\n", "test.dkl").expect("scan");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].name(), "user");
}

#[test]
fn directive_state_ends_at_newline() {
    assert_eq!(
        kinds("@SET a = 1\nFROM alpine\n"),
        vec![
            TokenKind::Set,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Newline,
            TokenKind::Instruction,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn bare_false_only_after_directive() {
    let tokens = scan("@SET on = FALSE\n", "test.dkl").expect("scan");
    assert_eq!(tokens[3].kind, TokenKind::False);
    assert_eq!(tokens[3].literal, Some(Literal::Bool(false)));
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn unterminated_string_reports_once() {
    let errors = scan("@SET a = \"never closed\nRUN x\n", "test.dkl").unwrap_err();
    assert_eq!(errors.len(), 1);
    let error = &errors.errors()[0];
    assert_eq!(error.kind, ScanErrorKind::UnterminatedString);
    assert_eq!((error.position.line, error.position.column), (1, 10));
}

#[test]
fn all_errors_in_pass_are_reported() {
    let errors = scan("a $ b | c\n@NOPE\n", "test.dkl").unwrap_err();
    let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            ScanErrorKind::UnexpectedCharacter('$'),
            ScanErrorKind::UnexpectedCharacter('|'),
            ScanErrorKind::UnknownKeyword("@NOPE".to_string()),
        ]
    );
}

#[test]
fn lowercase_directive_is_unknown() {
    let errors = scan("@set x = 1\n", "test.dkl").unwrap_err();
    assert_eq!(
        errors.errors()[0].kind,
        ScanErrorKind::UnknownKeyword("@set".to_string())
    );
}

#[test]
fn single_ampersand() {
    let errors = scan("a & b\n", "test.dkl").unwrap_err();
    assert_eq!(
        errors.errors()[0].kind,
        ScanErrorKind::UnexpectedCharacter('&')
    );
}

#[test]
fn integer_overflow() {
    let errors = scan("@SET x = 99999999999999999999\n", "test.dkl").unwrap_err();
    assert!(matches!(
        &errors.errors()[0].kind,
        ScanErrorKind::NumberOutOfRange(text) if text == "99999999999999999999"
    ));
}

#[test]
fn scanner_returns_tokens_alongside_errors() {
    let (tokens, errors) = Scanner::new("x $\n", "test.dkl").scan_all();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![TokenKind::Identifier, TokenKind::Newline, TokenKind::Eof]
    );
}

#[test]
fn error_display_includes_location() {
    let errors = scan("\n  $", "test.dkl").unwrap_err();
    assert_eq!(
        errors.to_string(),
        "unexpected character: $ at line 2, column 3"
    );
}
