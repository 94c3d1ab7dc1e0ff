use crate::{
    tokenizer::Token,
    utils::{error, quote},
    error::CompileError,
};
use brine_wire_schema::{
    BuiltIn, Composite, Enumeration, Field, FixedArray, Group, Scalar, Schema, TypeDef,
    VariableArray,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER:       Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref SEMICOLON:        Regex = Regex::new(r"^;$").unwrap();
    static ref INTEGER:          Regex = Regex::new(r"^\d+$").unwrap();
    static ref VERSION:          Regex = Regex::new(r"^\d[0-9A-Za-z.+-]*$").unwrap();
    static ref LEFT_BRACE:       Regex = Regex::new(r"^\{$").unwrap();
    static ref RIGHT_BRACE:      Regex = Regex::new(r"^\}$").unwrap();
    static ref LEFT_BRACKET:     Regex = Regex::new(r"^\[$").unwrap();
    static ref RIGHT_BRACKET:    Regex = Regex::new(r"^\]$").unwrap();
    static ref SCHEMA_KEYWORD:   Regex = Regex::new(r"^schema$").unwrap();
    static ref SCALAR_KEYWORD:   Regex = Regex::new(r"^scalar$").unwrap();
    static ref ENUM_KEYWORD:     Regex = Regex::new(r"^enumeration$").unwrap();
    static ref COMPOSITE_KEYWORD: Regex = Regex::new(r"^composite$").unwrap();
    static ref FIXED_KEYWORD:    Regex = Regex::new(r"^fixed_array$").unwrap();
    static ref VARIABLE_KEYWORD: Regex = Regex::new(r"^variable_array$").unwrap();
    static ref GROUP_KEYWORD:    Regex = Regex::new(r"^group$").unwrap();
    static ref EOF:              Regex = Regex::new(r"^$").unwrap();
}

/// Parses a token stream into a validated [Schema]. Syntax problems are
/// reported as [CompileError::ParseError] with the offending position;
/// semantic problems come back from the type model as [CompileError::Schema].
pub fn parse_schema(tokens: &[Token]) -> Result<Schema, CompileError> {
    let mut types = Vec::new();
    let mut index = 0;

    fn current_token(tokens: &[Token], index: usize) -> Result<&Token, CompileError> {
        tokens
            .get(index)
            .ok_or_else(|| error("Unexpected end of input", 0, 0))
    }

    fn eat(tokens: &[Token], index: &mut usize, test: &Regex) -> Result<bool, CompileError> {
        if test.is_match(&current_token(tokens, *index)?.text) {
            *index += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect<'t>(
        tokens: &'t [Token],
        index: &mut usize,
        test: &Regex,
        expected: &str,
    ) -> Result<&'t Token, CompileError> {
        let tok = current_token(tokens, *index)?;
        if !eat(tokens, index, test)? {
            return Err(error(
                &format!("Expected {} but found {}", expected, quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        }
        Ok(tok)
    }

    fn expect_count(tokens: &[Token], index: &mut usize) -> Result<u64, CompileError> {
        let tok = expect(tokens, index, &INTEGER, "integer")?;
        tok.text.parse::<u64>().map_err(|_| {
            error(&format!("Invalid integer {}", quote(&tok.text)), tok.line, tok.column)
        })
    }

    fn expect_builtin(tokens: &[Token], index: &mut usize) -> Result<BuiltIn, CompileError> {
        let tok = current_token(tokens, *index)?;
        match BuiltIn::from_name(&tok.text) {
            Some(builtin) => {
                *index += 1;
                Ok(builtin)
            }
            None => Err(error(
                &format!("Expected builtin type but found {}", quote(&tok.text)),
                tok.line,
                tok.column,
            )),
        }
    }

    // `<type> <name>;` entries of composites and groups
    fn fields(tokens: &[Token], index: &mut usize) -> Result<Vec<Field>, CompileError> {
        expect(tokens, index, &LEFT_BRACE, "\"{\"")?;
        let mut fields = Vec::new();
        while !eat(tokens, index, &RIGHT_BRACE)? {
            let type_tok = expect(tokens, index, &IDENTIFIER, "identifier")?;
            let name_tok = expect(tokens, index, &IDENTIFIER, "identifier")?;
            expect(tokens, index, &SEMICOLON, "\";\"")?;
            fields.push(Field::new(name_tok.text.clone(), type_tok.text.clone()));
        }
        Ok(fields)
    }

    // Header
    expect(tokens, &mut index, &SCHEMA_KEYWORD, "\"schema\"")?;
    let name_tok = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
    let version_tok = expect(tokens, &mut index, &VERSION, "version")?;
    expect(tokens, &mut index, &SEMICOLON, "\";\"")?;

    // Declarations one by one
    while !eat(tokens, &mut index, &EOF)? {
        let def: TypeDef = if eat(tokens, &mut index, &SCALAR_KEYWORD)? {
            let name = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            let builtin = expect_builtin(tokens, &mut index)?;
            expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
            Scalar::new(name.text.clone(), builtin).into()
        } else if eat(tokens, &mut index, &ENUM_KEYWORD)? {
            let name = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            expect(tokens, &mut index, &LEFT_BRACE, "\"{\"")?;
            let mut labels = Vec::new();
            while !eat(tokens, &mut index, &RIGHT_BRACE)? {
                let label = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
                expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
                labels.push(label.text.clone());
            }
            Enumeration::new(name.text.clone(), labels)?.into()
        } else if eat(tokens, &mut index, &COMPOSITE_KEYWORD)? {
            let name = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            Composite::new(name.text.clone(), fields(tokens, &mut index)?)?.into()
        } else if eat(tokens, &mut index, &FIXED_KEYWORD)? {
            let name = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            let element = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            expect(tokens, &mut index, &LEFT_BRACKET, "\"[\"")?;
            let count = expect_count(tokens, &mut index)?;
            expect(tokens, &mut index, &RIGHT_BRACKET, "\"]\"")?;
            expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
            FixedArray::new(name.text.clone(), element.text.clone(), count)?.into()
        } else if eat(tokens, &mut index, &VARIABLE_KEYWORD)? {
            let name = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            let element = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            expect(tokens, &mut index, &LEFT_BRACKET, "\"[\"")?;
            let max = expect_count(tokens, &mut index)?;
            expect(tokens, &mut index, &RIGHT_BRACKET, "\"]\"")?;
            let size_type = expect_builtin(tokens, &mut index)?;
            expect(tokens, &mut index, &SEMICOLON, "\";\"")?;
            VariableArray::new(name.text.clone(), element.text.clone(), max, size_type)?.into()
        } else if eat(tokens, &mut index, &GROUP_KEYWORD)? {
            let name = expect(tokens, &mut index, &IDENTIFIER, "identifier")?;
            Group::new(name.text.clone(), fields(tokens, &mut index)?)?.into()
        } else {
            let tok = current_token(tokens, index)?;
            return Err(error(
                &format!("Unexpected token {}", quote(&tok.text)),
                tok.line,
                tok.column,
            ));
        };
        types.push(def);
    }

    Ok(Schema::new(name_tok.text.clone(), &version_tok.text, types)?)
}
