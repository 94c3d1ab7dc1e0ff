use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::{quote, error};
use crate::error::CompileError;

lazy_static! {
    pub static ref TOKEN_REGEX:    Regex = Regex::new(r"(\d+(?:\.[0-9A-Za-z-]+)+(?:\+[0-9A-Za-z.-]+)?|\b\d+\b|[;{}\[\]]|\b[A-Za-z_][A-Za-z0-9_]*\b|//.*|\s+)").unwrap();
    pub static ref WHITESPACE_RX:  Regex = Regex::new(r"^(//.*|\s+)$").unwrap();
}

#[derive(Debug, PartialEq)]
pub struct Token {
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

/// Splits schema text into tokens, dropping whitespace and `//` comments.
/// The last token is always an empty end-of-file marker.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut column = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(text) {
        let start = mat.start();
        let end   = mat.end();
        let part  = mat.as_str();

        if start > last_end {
            let unexpected = &text[last_end..start];
            return Err(error(
                &format!("Syntax error: {}", quote(unexpected)),
                line,
                column,
            ));
        }

        if !WHITESPACE_RX.is_match(part) {
            tokens.push(Token {
                text:   part.to_string(),
                line,
                column,
            });
        }

        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                column = last_line_part.len() + 1;
            }
        } else {
            column += part.len();
        }

        last_end = end;
    }

    if last_end != text.len() {
        let unexpected = &text[last_end..];
        return Err(error(
            &format!("Syntax error: {}", quote(unexpected)),
            line,
            column,
        ));
    }

    tokens.push(Token {
        text:   "".to_string(),
        line,
        column,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize_schema(input).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_simple() {
        let input = "scalar test1_int int32;";
        let expected = vec![
            Token { text: "scalar".into(),    line: 1, column: 1 },
            Token { text: "test1_int".into(), line: 1, column: 8 },
            Token { text: "int32".into(),     line: 1, column: 18 },
            Token { text: ";".into(),         line: 1, column: 23 },
            Token { text: "".into(),          line: 1, column: 24 },
        ];
        let got = tokenize_schema(input).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_tokenize_versions() {
        assert_eq!(texts("schema test1 1.2.3;"), ["schema", "test1", "1.2.3", ";", ""]);
        assert_eq!(texts("schema s 1.0.0-alpha.1+build.5;")[2], "1.0.0-alpha.1+build.5");
        assert_eq!(texts("schema s 1.2;")[2], "1.2");
    }

    #[test]
    fn test_tokenize_arrays() {
        assert_eq!(
            texts("variable_array bytes uint8[10] uint8;"),
            ["variable_array", "bytes", "uint8", "[", "10", "]", "uint8", ";", ""]
        );
    }

    #[test]
    fn test_tokenize_comments_and_lines() {
        let got = tokenize_schema("// header\nenumeration color {\n  red;\n}").unwrap();
        assert_eq!(got[0], Token { text: "enumeration".into(), line: 2, column: 1 });
        assert_eq!(got[3], Token { text: "red".into(), line: 3, column: 3 });
    }

    #[test]
    fn test_tokenize_unexpected_text() {
        let input = "scalar x int8 @";
        let err = tokenize_schema(input).unwrap_err();
        assert!(
            matches!(err, CompileError::ParseError { line: 1, column: 15, .. }),
            "expected a ParseError but got {:?}",
            err
        );
    }
}
