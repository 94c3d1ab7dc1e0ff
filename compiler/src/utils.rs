use crate::error::CompileError;
use std::collections::hash_map::{Entry, HashMap};

/// JSON-quotes `text` for use in messages.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn error(msg: &str, line: usize, column: usize) -> CompileError {
    CompileError::ParseError { msg: msg.to_string(), line, column }
}

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and converts each word
///   so that its first letter is uppercase and the rest lowercase.
/// - If the string is fully uppercase, only the first letter stays uppercase.
/// - Otherwise, it ensures only the first letter is uppercase.
pub fn to_pascal_case(s: &str) -> String {
    fn capitalize(word: &str, lower_rest: bool) -> String {
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) if lower_rest => {
                first.to_uppercase().to_string() + &chars.as_str().to_lowercase()
            }
            Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        }
    }

    if s.contains('_') {
        s.split('_').filter(|word| !word.is_empty()).map(|word| capitalize(word, true)).collect()
    } else {
        capitalize(s, s == s.to_uppercase())
    }
}

/// Converts a string to snake_case, keeping acronyms together
/// (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if (!prev.is_uppercase() && prev != '_')
                    || (prev.is_uppercase() && i + 1 < chars.len() && chars[i + 1].is_lowercase())
                {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Suffixes `s` with an underscore when it is one of `keywords`.
pub fn escape_keyword(s: &str, keywords: &[&str]) -> String {
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// Checks one scope of generated identifiers. `names` pairs each schema
/// name with the identifier it renders as; every identifier must be unique
/// and none may be one of `reserved`.
pub fn check_names<'n>(
    language: &str,
    scope: &str,
    reserved: &[&str],
    names: impl IntoIterator<Item = (&'n str, String)>,
) -> Result<(), CompileError> {
    let mut seen: HashMap<String, &'n str> = HashMap::new();
    for (name, mangled) in names {
        if reserved.contains(&mangled.as_str()) {
            return Err(CompileError::ReservedName {
                language: language.to_string(),
                scope:    scope.to_string(),
                name:     name.to_string(),
                mangled,
            });
        }
        match seen.entry(mangled) {
            Entry::Occupied(entry) => {
                return Err(CompileError::NameCollision {
                    language: language.to_string(),
                    scope:    scope.to_string(),
                    first:    entry.get().to_string(),
                    second:   name.to_string(),
                    mangled:  entry.key().clone(),
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(name);
            }
        }
    }
    Ok(())
}
