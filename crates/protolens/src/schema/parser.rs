// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `.proto` Schema Parser
//!
//! Parses the proto2/proto3 subset used by this crate: `syntax`, `package`,
//! messages (nested), enums (nested), labelled fields with `packed` and
//! `deprecated` options, and `reserved` declarations. Options elsewhere are
//! accepted and ignored. `oneof`, `map`, `extend`, `extensions`, groups,
//! services, imports and editions are rejected as unsupported.

use super::builder::{EnumDescriptorBuilder, MessageDescriptorBuilder};
use super::descriptor::{ElementType, FieldDescriptor, FieldKind, ScalarType};
use super::error::SchemaError;
use super::registry::{Schema, Syntax};
use crate::wire::MAX_TAG;
use std::collections::HashMap;
use std::sync::Arc;

/// Parse and validate `source`.
pub(crate) fn parse(source: &str) -> Result<Arc<Schema>, SchemaError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.parse_file()?;
    parser.finish()
}

/// Token types for the lexer.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    /// Numeric literal, kept as written.
    Number(String),
    String(String),
    Symbol(char),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Identifier(ident) => format!("'{}'", ident),
            Self::Number(number) => format!("number {}", number),
            Self::String(_) => "string literal".to_owned(),
            Self::Symbol(symbol) => format!("'{}'", symbol),
            Self::Eof => "end of input".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
    column: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), SchemaError> {
        loop {
            match (self.peek_char(), self.peek_second()) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.next_char();
                }
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.next_char() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.next_char();
                    self.next_char();
                    loop {
                        match self.next_char() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.next_char();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(SchemaError::Parse {
                                    line,
                                    column,
                                    message: "unterminated block comment".to_owned(),
                                })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_while(&mut self, mut accept: impl FnMut(char, &str) -> bool) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if accept(ch, &self.input[start..self.pos]) {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_owned()
    }

    fn read_string(&mut self, quote: char) -> Result<String, SchemaError> {
        self.next_char();
        let mut value = String::new();
        loop {
            match self.next_char() {
                Some(ch) if ch == quote => return Ok(value),
                Some('\\') => match self.next_char() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some(other) => value.push(other),
                    None => return Err(self.error("unterminated string")),
                },
                Some('\n') | None => return Err(self.error("unterminated string")),
                Some(ch) => value.push(ch),
            }
        }
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, SchemaError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);
            let token = match self.peek_char() {
                None => Token::Eof,
                Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                    Token::Identifier(self.read_while(|c, _| c.is_ascii_alphanumeric() || c == '_'))
                }
                Some(ch) if ch.is_ascii_digit() => Token::Number(self.read_while(|c, seen| {
                    let exponent_sign = (c == '+' || c == '-')
                        && (seen.ends_with('e') || seen.ends_with('E'))
                        && !seen.starts_with("0x")
                        && !seen.starts_with("0X");
                    c.is_ascii_alphanumeric() || c == '.' || exponent_sign
                })),
                Some(quote @ ('"' | '\'')) => Token::String(self.read_string(quote)?),
                Some(ch) => {
                    self.next_char();
                    Token::Symbol(ch)
                }
            };
            let done = token == Token::Eof;
            tokens.push(Spanned {
                token,
                line,
                column,
            });
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Parse an integer literal (decimal, hex or octal).
fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    None,
    Optional,
    Required,
    Repeated,
}

#[derive(Debug)]
struct RawField {
    name: String,
    label: Label,
    type_name: String,
    tag: i64,
    packed: Option<bool>,
    line: usize,
    column: usize,
}

#[derive(Debug, Default)]
struct Reserved {
    ranges: Vec<(i64, i64)>,
    names: Vec<String>,
}

#[derive(Debug)]
struct RawMessage {
    full_name: String,
    fields: Vec<RawField>,
    reserved: Reserved,
}

#[derive(Debug)]
struct RawEnum {
    full_name: String,
    values: Vec<(String, i32)>,
    allow_alias: bool,
    reserved: Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declared {
    Message,
    Enum,
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    syntax: Syntax,
    package: Option<String>,
    messages: Vec<RawMessage>,
    enums: Vec<RawEnum>,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            syntax: Syntax::default(),
            package: None,
            messages: Vec::new(),
            enums: Vec::new(),
        }
    }

    fn current(&self) -> &Spanned {
        // The token stream always ends with Eof, and `advance` never passes it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].token
    }

    fn advance(&mut self) -> Token {
        let token = self.current().token.clone();
        if token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        let span = self.current();
        SchemaError::Parse {
            line: span.line,
            column: span.column,
            message: message.into(),
        }
    }

    fn unsupported(&self, construct: &str) -> SchemaError {
        SchemaError::Unsupported {
            construct: construct.to_owned(),
            line: self.current().line,
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Identifier(ident) if ident == keyword)
    }

    fn is_symbol(&self, symbol: char) -> bool {
        *self.peek() == Token::Symbol(symbol)
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.is_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), SchemaError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected '{}', found {}",
                symbol,
                self.peek().describe()
            )))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, SchemaError> {
        match self.peek() {
            Token::Identifier(_) => match self.advance() {
                Token::Identifier(ident) => Ok(ident),
                _ => Err(self.error("expected identifier")),
            },
            other => Err(self.error(format!("expected identifier, found {}", other.describe()))),
        }
    }

    /// `ident ('.' ident)*`, optionally with a leading `.`.
    fn full_identifier(&mut self) -> Result<String, SchemaError> {
        let mut name = String::new();
        if self.eat_symbol('.') {
            name.push('.');
        }
        name.push_str(&self.expect_identifier()?);
        while self.eat_symbol('.') {
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        Ok(name)
    }

    fn expect_int(&mut self) -> Result<i64, SchemaError> {
        let negative = self.eat_symbol('-');
        if !negative {
            self.eat_symbol('+');
        }
        match self.peek().clone() {
            Token::Number(text) => {
                let value = parse_int(&text)
                    .ok_or_else(|| self.error(format!("invalid integer '{}'", text)))?;
                self.advance();
                Ok(if negative { -value } else { value })
            }
            other => Err(self.error(format!("expected integer, found {}", other.describe()))),
        }
    }

    fn expect_string(&mut self) -> Result<String, SchemaError> {
        match self.peek().clone() {
            Token::String(mut value) => {
                self.advance();
                // Adjacent literals concatenate.
                while let Token::String(next) = self.peek().clone() {
                    value.push_str(&next);
                    self.advance();
                }
                Ok(value)
            }
            other => Err(self.error(format!("expected string, found {}", other.describe()))),
        }
    }

    fn scope_name(scope: &str, name: &str) -> String {
        if scope.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{}", scope, name)
        }
    }

    fn parse_file(&mut self) -> Result<(), SchemaError> {
        let mut first = true;
        loop {
            let statement = match self.peek().clone() {
                Token::Eof => return Ok(()),
                Token::Symbol(';') => {
                    self.advance();
                    continue;
                }
                Token::Identifier(keyword) => keyword,
                other => {
                    return Err(
                        self.error(format!("expected top-level declaration, found {}", other.describe()))
                    )
                }
            };
            match statement.as_str() {
                "syntax" => {
                    if !first {
                        return Err(self.error("'syntax' must be the first statement"));
                    }
                    self.parse_syntax()?;
                }
                "package" => {
                    if self.package.is_some() {
                        return Err(self.error("multiple package declarations"));
                    }
                    self.advance();
                    let package = self.full_identifier()?;
                    self.expect_symbol(';')?;
                    log::debug!("[schema] package {}", package);
                    self.package = Some(package);
                }
                "option" => self.parse_option_statement("file")?,
                "message" => {
                    let scope = self.package.clone().unwrap_or_default();
                    self.parse_message(&scope)?;
                }
                "enum" => {
                    let scope = self.package.clone().unwrap_or_default();
                    self.parse_enum(&scope)?;
                }
                "import" | "service" | "extend" | "edition" => {
                    return Err(self.unsupported(&statement))
                }
                _ => return Err(self.error(format!("unexpected '{}'", statement))),
            }
            first = false;
        }
    }

    fn parse_syntax(&mut self) -> Result<(), SchemaError> {
        self.advance();
        self.expect_symbol('=')?;
        let syntax = self.expect_string()?;
        self.syntax = match syntax.as_str() {
            "proto2" => Syntax::Proto2,
            "proto3" => Syntax::Proto3,
            other => return Err(self.error(format!("unknown syntax '{}'", other))),
        };
        self.expect_symbol(';')
    }

    /// `option name = constant;`, returning the name and a simple value.
    fn parse_option_statement(&mut self, context: &str) -> Result<(), SchemaError> {
        self.advance();
        let (name, value) = self.parse_option_assignment()?;
        self.expect_symbol(';')?;
        log::warn!("[schema] ignoring {} option '{}' = {}", context, name, value);
        Ok(())
    }

    /// `name = constant`, where name may be `(custom.ext).field`.
    fn parse_option_assignment(&mut self) -> Result<(String, String), SchemaError> {
        let mut name = String::new();
        if self.eat_symbol('(') {
            name.push('(');
            name.push_str(&self.full_identifier()?);
            self.expect_symbol(')')?;
            name.push(')');
        } else {
            name.push_str(&self.expect_identifier()?);
        }
        while self.eat_symbol('.') {
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        self.expect_symbol('=')?;
        let value = self.parse_constant()?;
        Ok((name, value))
    }

    fn parse_constant(&mut self) -> Result<String, SchemaError> {
        match self.peek().clone() {
            Token::Identifier(_) | Token::Symbol('.') => self.full_identifier(),
            Token::String(_) => self.expect_string().map(|s| format!("{:?}", s)),
            Token::Number(number) => {
                self.advance();
                Ok(number)
            }
            Token::Symbol(sign @ ('-' | '+')) => {
                self.advance();
                match self.advance() {
                    Token::Number(number) => Ok(format!("{}{}", sign, number)),
                    Token::Identifier(ident) => Ok(format!("{}{}", sign, ident)),
                    other => Err(self.error(format!("expected number, found {}", other.describe()))),
                }
            }
            Token::Symbol('{') => {
                // Aggregate value: skip to the matching brace.
                let mut depth = 0usize;
                loop {
                    match self.advance() {
                        Token::Symbol('{') => depth += 1,
                        Token::Symbol('}') => {
                            depth -= 1;
                            if depth == 0 {
                                return Ok("{...}".to_owned());
                            }
                        }
                        Token::Eof => return Err(self.error("unterminated aggregate option")),
                        _ => {}
                    }
                }
            }
            other => Err(self.error(format!("expected constant, found {}", other.describe()))),
        }
    }

    fn parse_bool(&self, option: &str, value: &str) -> Result<bool, SchemaError> {
        match value {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.error(format!(
                "option '{}' expects true or false, found {}",
                option, other
            ))),
        }
    }

    fn parse_message(&mut self, scope: &str) -> Result<(), SchemaError> {
        self.advance();
        let name = self.expect_identifier()?;
        let full_name = Self::scope_name(scope, &name);
        self.expect_symbol('{')?;

        let index = self.messages.len();
        self.messages.push(RawMessage {
            full_name: full_name.clone(),
            fields: Vec::new(),
            reserved: Reserved::default(),
        });

        loop {
            let keyword = match self.peek().clone() {
                Token::Symbol('}') => {
                    self.advance();
                    return Ok(());
                }
                Token::Symbol(';') => {
                    self.advance();
                    continue;
                }
                Token::Eof => return Err(self.error(format!("unterminated message '{}'", name))),
                // Fully-qualified field type, e.g. `.pkg.Type field = 1;`
                Token::Symbol('.') => {
                    let field = self.parse_field()?;
                    self.messages[index].fields.push(field);
                    continue;
                }
                Token::Identifier(keyword) => keyword,
                other => {
                    return Err(self.error(format!("expected field or declaration, found {}", other.describe())))
                }
            };
            match keyword.as_str() {
                "message" => self.parse_message(&full_name)?,
                "enum" => self.parse_enum(&full_name)?,
                "option" => self.parse_option_statement("message")?,
                "reserved" => {
                    let reserved = self.parse_reserved(i64::from(MAX_TAG))?;
                    let target = &mut self.messages[index].reserved;
                    target.ranges.extend(reserved.ranges);
                    target.names.extend(reserved.names);
                }
                "oneof" | "extensions" | "extend" | "group" => {
                    return Err(self.unsupported(&keyword))
                }
                "map" if *self.peek_at(1) == Token::Symbol('<') => {
                    return Err(self.unsupported("map"))
                }
                _ => {
                    let field = self.parse_field()?;
                    self.messages[index].fields.push(field);
                }
            }
        }
    }

    fn parse_field(&mut self) -> Result<RawField, SchemaError> {
        let label = if self.is_keyword("repeated") {
            Label::Repeated
        } else if self.is_keyword("optional") {
            Label::Optional
        } else if self.is_keyword("required") {
            Label::Required
        } else {
            Label::None
        };
        if label != Label::None {
            self.advance();
        }
        if label == Label::Required && self.syntax == Syntax::Proto3 {
            return Err(self.error("required fields are not allowed in proto3"));
        }
        if self.is_keyword("group") {
            return Err(self.unsupported("group"));
        }
        if self.is_keyword("map") && *self.peek_at(1) == Token::Symbol('<') {
            return Err(self.unsupported("map"));
        }

        let (line, column) = (self.current().line, self.current().column);
        let type_name = self.full_identifier()?;
        let name = self.expect_identifier()?;
        self.expect_symbol('=')?;
        let tag = self.expect_int()?;

        let mut packed = None;
        if self.eat_symbol('[') {
            loop {
                let (option, value) = self.parse_option_assignment()?;
                match option.as_str() {
                    "packed" => packed = Some(self.parse_bool(&option, &value)?),
                    "deprecated" => {
                        if self.parse_bool(&option, &value)? {
                            log::debug!("[schema] field '{}' is deprecated", name);
                        }
                    }
                    "default" => return Err(self.unsupported("default value")),
                    _ => log::warn!("[schema] ignoring field option '{}' on '{}'", option, name),
                }
                if !self.eat_symbol(',') {
                    break;
                }
            }
            self.expect_symbol(']')?;
        }
        self.expect_symbol(';')?;

        Ok(RawField {
            name,
            label,
            type_name,
            tag,
            packed,
            line,
            column,
        })
    }

    fn parse_enum(&mut self, scope: &str) -> Result<(), SchemaError> {
        self.advance();
        let name = self.expect_identifier()?;
        let full_name = Self::scope_name(scope, &name);
        self.expect_symbol('{')?;

        let mut raw = RawEnum {
            full_name,
            values: Vec::new(),
            allow_alias: false,
            reserved: Reserved::default(),
        };

        loop {
            let keyword = match self.peek().clone() {
                Token::Symbol('}') => {
                    self.advance();
                    break;
                }
                Token::Symbol(';') => {
                    self.advance();
                    continue;
                }
                Token::Eof => return Err(self.error(format!("unterminated enum '{}'", name))),
                Token::Identifier(keyword) => keyword,
                other => {
                    return Err(self.error(format!("expected enum value, found {}", other.describe())))
                }
            };
            match keyword.as_str() {
                "option" => {
                    self.advance();
                    let (option, value) = self.parse_option_assignment()?;
                    self.expect_symbol(';')?;
                    if option == "allow_alias" {
                        raw.allow_alias = self.parse_bool(&option, &value)?;
                    } else {
                        log::warn!("[schema] ignoring enum option '{}' on '{}'", option, name);
                    }
                }
                "reserved" => {
                    let reserved = self.parse_reserved(i64::from(i32::MAX))?;
                    raw.reserved.ranges.extend(reserved.ranges);
                    raw.reserved.names.extend(reserved.names);
                }
                _ => {
                    let value_name = self.expect_identifier()?;
                    self.expect_symbol('=')?;
                    let number = self.expect_int()?;
                    let number = i32::try_from(number).map_err(|_| {
                        self.error(format!("enum value {} out of range", number))
                    })?;
                    if self.eat_symbol('[') {
                        loop {
                            self.parse_option_assignment()?;
                            if !self.eat_symbol(',') {
                                break;
                            }
                        }
                        self.expect_symbol(']')?;
                    }
                    self.expect_symbol(';')?;
                    raw.values.push((value_name, number));
                }
            }
        }

        self.enums.push(raw);
        Ok(())
    }

    /// `reserved 2, 9 to 11, 40 to max;` or `reserved "a", "b";`
    fn parse_reserved(&mut self, max: i64) -> Result<Reserved, SchemaError> {
        self.advance();
        let mut reserved = Reserved::default();
        if matches!(self.peek(), Token::String(_)) {
            loop {
                reserved.names.push(self.expect_string()?);
                if !self.eat_symbol(',') {
                    break;
                }
            }
        } else {
            loop {
                let start = self.expect_int()?;
                let end = if self.is_keyword("to") {
                    self.advance();
                    if self.is_keyword("max") {
                        self.advance();
                        max
                    } else {
                        self.expect_int()?
                    }
                } else {
                    start
                };
                reserved.ranges.push((start, end));
                if !self.eat_symbol(',') {
                    break;
                }
            }
        }
        self.expect_symbol(';')?;
        Ok(reserved)
    }

    /// Resolve types, apply packing defaults and validate.
    fn finish(self) -> Result<Arc<Schema>, SchemaError> {
        let mut declared: HashMap<&str, Declared> = HashMap::new();
        for message in &self.messages {
            if declared
                .insert(&message.full_name, Declared::Message)
                .is_some()
            {
                return Err(SchemaError::DuplicateTypeName(message.full_name.clone()));
            }
        }
        for enumeration in &self.enums {
            if declared
                .insert(&enumeration.full_name, Declared::Enum)
                .is_some()
            {
                return Err(SchemaError::DuplicateTypeName(enumeration.full_name.clone()));
            }
        }

        let mut schema = Schema::builder().syntax(self.syntax);
        if let Some(package) = &self.package {
            schema = schema.package(package.clone());
        }

        for message in &self.messages {
            let mut builder = MessageDescriptorBuilder::new(message.full_name.clone());
            for &(start, end) in &message.reserved.ranges {
                builder = builder.reserved_range(
                    u32::try_from(start).unwrap_or(0),
                    u32::try_from(end).unwrap_or(0),
                );
            }
            for name in &message.reserved.names {
                builder = builder.reserved_name(name.clone());
            }
            for field in &message.fields {
                builder = builder.with_field(self.resolve_field(message, field, &declared)?);
            }
            schema = schema.message(builder.build()?);
        }

        for enumeration in &self.enums {
            let mut builder = EnumDescriptorBuilder::new(enumeration.full_name.clone())
                .allow_alias(enumeration.allow_alias);
            for (name, number) in &enumeration.values {
                let reserved_number = enumeration
                    .reserved
                    .ranges
                    .iter()
                    .any(|&(start, end)| (start..=end).contains(&i64::from(*number)));
                if reserved_number || enumeration.reserved.names.contains(name) {
                    return Err(SchemaError::InvalidEnum {
                        name: enumeration.full_name.clone(),
                        reason: format!("value '{}' = {} is reserved", name, number),
                    });
                }
                builder = builder.value(name.clone(), *number);
            }
            schema = schema.enumeration(builder.build()?);
        }

        schema.build()
    }

    fn resolve_field(
        &self,
        message: &RawMessage,
        field: &RawField,
        declared: &HashMap<&str, Declared>,
    ) -> Result<FieldDescriptor, SchemaError> {
        let tag = u32::try_from(field.tag)
            .ok()
            .filter(|&tag| tag != 0 && tag <= MAX_TAG)
            .ok_or_else(|| SchemaError::InvalidTag {
                message: message.full_name.clone(),
                field: field.name.clone(),
                tag: field.tag,
            })?;

        let element = match ScalarType::from_keyword(&field.type_name) {
            Some(scalar) => ElementType::Scalar(scalar),
            None => {
                let (full_name, kind) = resolve_type(&message.full_name, &field.type_name, declared)
                    .ok_or_else(|| SchemaError::UnresolvedType {
                        message: message.full_name.clone(),
                        field: field.name.clone(),
                        type_name: field.type_name.clone(),
                    })?;
                match kind {
                    Declared::Message => ElementType::Message(full_name),
                    Declared::Enum => ElementType::Scalar(ScalarType::Enum(full_name)),
                }
            }
        };

        let kind = if field.label == Label::Repeated {
            let packed = field
                .packed
                .unwrap_or(self.syntax == Syntax::Proto3 && element.is_packable());
            if packed {
                FieldKind::PackedRepeated(element)
            } else {
                FieldKind::Repeated(element)
            }
        } else {
            if field.packed.is_some() {
                return Err(SchemaError::Parse {
                    line: field.line,
                    column: field.column,
                    message: format!("'packed' on non-repeated field '{}'", field.name),
                });
            }
            match element {
                ElementType::Scalar(scalar) => FieldKind::Scalar(scalar),
                ElementType::Message(name) => FieldKind::Message(name),
            }
        };

        log::debug!(
            "[schema] {}.{} = {} ({})",
            message.full_name,
            field.name,
            tag,
            kind
        );
        Ok(FieldDescriptor::new(field.name.clone(), tag, kind))
    }
}

/// Resolve `name` from `scope` outward; a leading `.` is fully qualified.
fn resolve_type(
    scope: &str,
    name: &str,
    declared: &HashMap<&str, Declared>,
) -> Option<(String, Declared)> {
    if let Some(absolute) = name.strip_prefix('.') {
        return declared
            .get(absolute)
            .map(|&kind| (absolute.to_owned(), kind));
    }
    let mut scope = scope;
    loop {
        let candidate = Parser::scope_name(scope, name);
        if let Some(&kind) = declared.get(candidate.as_str()) {
            return Some((candidate, kind));
        }
        if scope.is_empty() {
            return None;
        }
        scope = scope.rfind('.').map_or("", |index| &scope[..index]);
    }
}
