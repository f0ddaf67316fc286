// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::config::GenConfig;
use anyhow::{bail, Context, Result};
use protolens::{
    ElementType, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor, ScalarType, Schema,
};
use std::collections::{BTreeMap, HashMap, HashSet};

const BUILTIN_DERIVES: &str = "Debug, Clone, Default, PartialEq";

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// Render a whole schema as one Rust module body.
pub fn emit_module(schema: &Schema, config: &GenConfig, source: &str) -> Result<String> {
    let names = TypeNames::new(schema)?;
    let boxed = boxed_fields(schema);

    let mut out = render_header(schema, config, source)?;
    for enumeration in schema.enums() {
        out.push('\n');
        out.push_str(&emit_enum(enumeration, &names)?);
    }
    for message in schema.messages() {
        out.push('\n');
        out.push_str(&emit_message(message, &names, &boxed, config)?);
    }
    out.push('\n');
    out.push_str(&emit_fields_module(schema, config));
    Ok(out)
}

fn render_header(schema: &Schema, config: &GenConfig, source: &str) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("source", source);
    context.insert("package", schema.package().unwrap_or_default());
    context.insert("version", env!("CARGO_PKG_VERSION"));
    let mut header = tera::Tera::one_off(&config.header, &context, false)
        .context("rendering header template")?;
    if !header.is_empty() && !header.ends_with('\n') {
        header.push('\n');
    }
    Ok(header)
}

/// Rust type names for every message and enum, keyed by full proto name.
struct TypeNames {
    names: HashMap<String, String>,
}

impl TypeNames {
    fn new(schema: &Schema) -> Result<Self> {
        let package = schema.package().unwrap_or_default();
        let full_names = schema
            .messages()
            .iter()
            .map(|m| m.full_name())
            .chain(schema.enums().iter().map(|e| e.full_name()));

        let mut names = HashMap::new();
        let mut taken: HashMap<String, &str> = HashMap::new();
        for full_name in full_names {
            let rust = rust_type_name(full_name, package);
            if let Some(previous) = taken.insert(rust.clone(), full_name) {
                bail!("'{previous}' and '{full_name}' both map to Rust type '{rust}'");
            }
            names.insert(full_name.to_string(), rust);
        }
        Ok(Self { names })
    }

    fn get(&self, full_name: &str) -> Result<&str> {
        self.names
            .get(full_name)
            .map(String::as_str)
            .with_context(|| format!("no Rust name for '{full_name}'"))
    }
}

/// `pkg.Outer.Inner` -> `OuterInner`.
pub fn rust_type_name(full_name: &str, package: &str) -> String {
    let local = if package.is_empty() {
        full_name
    } else {
        full_name
            .strip_prefix(package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(full_name)
    };
    local.split('.').map(upper_camel).collect()
}

/// `PHONE_TYPE_MOBILE` / `phone_type` -> `PhoneTypeMobile` / `PhoneType`.
fn upper_camel(name: &str) -> String {
    let screaming = !name.chars().any(|c| c.is_ascii_lowercase());
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            let Some(first) = chars.next() else {
                return String::new();
            };
            let rest: String = if screaming {
                chars.flat_map(char::to_lowercase).collect()
            } else {
                chars.collect()
            };
            first.to_uppercase().chain(rest.chars()).collect()
        })
        .collect()
}

/// `zipCode` -> `zip_code`.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if previous.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        previous = Some(c);
    }
    out
}

/// Rust identifier for a proto field name, escaped where needed.
pub fn field_ident(proto_name: &str) -> String {
    let snake = snake_case(proto_name);
    if RUST_KEYWORDS.contains(&snake.as_str()) {
        format!("r#{snake}")
    } else if RESERVED_PATH_KEYWORDS.contains(&snake.as_str()) {
        format!("{snake}_")
    } else {
        snake
    }
}

/// (message, tag) pairs whose singular message field must be boxed to
/// break a cycle of inline storage.
fn boxed_fields(schema: &Schema) -> HashSet<(String, u32)> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for message in schema.messages() {
        let targets = message
            .fields()
            .iter()
            .filter_map(|f| match &f.kind {
                FieldKind::Message(target) => Some(target.as_str()),
                _ => None,
            })
            .collect();
        edges.insert(message.full_name(), targets);
    }

    let mut boxed = HashSet::new();
    for message in schema.messages() {
        for field in message.fields() {
            if let FieldKind::Message(target) = &field.kind {
                if reaches(&edges, target, message.full_name()) {
                    boxed.insert((message.full_name().to_string(), field.tag));
                }
            }
        }
    }
    boxed
}

fn reaches<'a>(edges: &HashMap<&'a str, Vec<&'a str>>, from: &'a str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if seen.insert(current) {
            if let Some(next) = edges.get(current) {
                stack.extend(next.iter().copied());
            }
        }
    }
    false
}

fn scalar_rust_type(scalar: &ScalarType) -> &'static str {
    match scalar {
        ScalarType::Double => "f64",
        ScalarType::Float => "f32",
        ScalarType::Int32 | ScalarType::SInt32 | ScalarType::SFixed32 | ScalarType::Enum(_) => {
            "i32"
        }
        ScalarType::Int64 | ScalarType::SInt64 | ScalarType::SFixed64 => "i64",
        ScalarType::UInt32 | ScalarType::Fixed32 => "u32",
        ScalarType::UInt64 | ScalarType::Fixed64 => "u64",
        ScalarType::Bool => "bool",
        ScalarType::String => "String",
        ScalarType::Bytes => "Vec<u8>",
    }
}

/// Extra `kind = ".."` / `enumeration = ".."` attribute parts.
fn scalar_attrs(scalar: &ScalarType) -> String {
    match scalar {
        ScalarType::SInt32
        | ScalarType::SInt64
        | ScalarType::Fixed32
        | ScalarType::Fixed64
        | ScalarType::SFixed32
        | ScalarType::SFixed64 => format!(", kind = \"{}\"", scalar.keyword()),
        ScalarType::Enum(name) => format!(", enumeration = \"{name}\""),
        _ => String::new(),
    }
}

struct RenderedField {
    ident: String,
    ty: String,
    attrs: String,
    comment: Option<String>,
}

fn render_field(
    message: &MessageDescriptor,
    field: &FieldDescriptor,
    names: &TypeNames,
    boxed: &HashSet<(String, u32)>,
) -> Result<RenderedField> {
    let ident = field_ident(&field.name);
    let mut attrs = format!("tag = {}", field.tag);
    let mut comment = None;

    let ty = match &field.kind {
        FieldKind::Scalar(scalar) => {
            attrs.push_str(&scalar_attrs(scalar));
            if let ScalarType::Enum(name) = scalar {
                comment = Some(format!("/// See [`{}`].", names.get(name)?));
            }
            scalar_rust_type(scalar).to_string()
        }
        FieldKind::Message(target) => {
            let target = names.get(target)?;
            if boxed.contains(&(message.full_name().to_string(), field.tag)) {
                format!("Option<Box<{target}>>")
            } else {
                format!("Option<{target}>")
            }
        }
        FieldKind::Repeated(element) | FieldKind::PackedRepeated(element) => {
            let inner = match element {
                ElementType::Scalar(scalar) => {
                    attrs.push_str(&scalar_attrs(scalar));
                    scalar_rust_type(scalar).to_string()
                }
                ElementType::Message(target) => names.get(target)?.to_string(),
            };
            if field.kind.is_packed() {
                attrs.push_str(", packed");
            }
            format!("Vec<{inner}>")
        }
    };

    if ident.trim_start_matches("r#") != field.name {
        attrs.push_str(&format!(", name = \"{}\"", field.name));
    }
    Ok(RenderedField {
        ident,
        ty,
        attrs,
        comment,
    })
}

fn emit_message(
    message: &MessageDescriptor,
    names: &TypeNames,
    boxed: &HashSet<(String, u32)>,
    config: &GenConfig,
) -> Result<String> {
    let type_name = names.get(message.full_name())?;
    let fields = message
        .fields()
        .iter()
        .map(|field| render_field(message, field, names, boxed))
        .collect::<Result<Vec<_>>>()?;

    let mut unknown = "unknown_fields".to_string();
    while fields.iter().any(|f| f.ident == unknown) {
        unknown.push('_');
    }

    let mut derives = BUILTIN_DERIVES.to_string();
    for derive in &config.extra_derives {
        derives.push_str(", ");
        derives.push_str(derive);
    }
    derives.push_str(", ::protolens::Message");

    let mut container = format!("name = \"{}\"", message.full_name());
    if config.fields_module != "fields" {
        container.push_str(&format!(", fields = \"{}\"", config.fields_module));
    }

    let mut out = format!(
        "/// `{full_name}`\n#[derive({derives})]\n#[proto({container})]\npub struct {type_name} {{\n",
        full_name = message.full_name(),
    );
    for field in &fields {
        if let Some(comment) = &field.comment {
            out.push_str(&format!("    {comment}\n"));
        }
        out.push_str(&format!(
            "    #[proto({})]\n    pub {}: {},\n",
            field.attrs, field.ident, field.ty
        ));
    }
    out.push_str(&format!(
        "    #[proto(unknown)]\n    pub {unknown}: ::protolens::UnknownFields,\n}}\n"
    ));
    Ok(out)
}

fn emit_enum(enumeration: &EnumDescriptor, names: &TypeNames) -> Result<String> {
    let type_name = names.get(enumeration.full_name())?;

    // First value per number becomes the variant; later aliases become consts.
    let mut variants: Vec<(String, &str, i32)> = Vec::new();
    let mut aliases: Vec<(&str, String)> = Vec::new();
    let mut by_number: HashMap<i32, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    for value in enumeration.values() {
        if let Some(primary) = by_number.get(&value.number) {
            aliases.push((value.name.as_str(), primary.clone()));
            continue;
        }
        let variant = upper_camel(&value.name);
        if !taken.insert(variant.clone()) {
            bail!(
                "enum {}: value '{}' maps to duplicate variant '{}'",
                enumeration.full_name(),
                value.name,
                variant
            );
        }
        by_number.insert(value.number, variant.clone());
        variants.push((variant, value.name.as_str(), value.number));
    }

    let mut out = format!(
        "/// `{}`\n#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]\n#[repr(i32)]\npub enum {} {{\n",
        enumeration.full_name(),
        type_name
    );
    for (variant, _, number) in &variants {
        if *number == 0 {
            out.push_str("    #[default]\n");
        }
        out.push_str(&format!("    {variant} = {number},\n"));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {type_name} {{\n"));
    out.push_str(&format!(
        "    pub const PROTO_NAME: &'static str = \"{}\";\n",
        enumeration.full_name()
    ));
    for (alias, primary) in &aliases {
        out.push_str(&format!("    pub const {alias}: Self = Self::{primary};\n"));
    }
    out.push_str("\n    /// Value name as written in the schema.\n");
    out.push_str("    pub fn as_str_name(self) -> &'static str {\n        match self {\n");
    for (variant, name, _) in &variants {
        out.push_str(&format!("            Self::{variant} => \"{name}\",\n"));
    }
    out.push_str("        }\n    }\n\n");
    out.push_str("    pub fn from_str_name(name: &str) -> Option<Self> {\n        match name {\n");
    for (variant, name, _) in &variants {
        out.push_str(&format!("            \"{name}\" => Some(Self::{variant}),\n"));
    }
    for (alias, primary) in &aliases {
        out.push_str(&format!("            \"{alias}\" => Some(Self::{primary}),\n"));
    }
    out.push_str("            _ => None,\n        }\n    }\n}\n\n");

    out.push_str(&format!(
        "impl ::std::convert::TryFrom<i32> for {type_name} {{\n    type Error = i32;\n\n    fn try_from(value: i32) -> ::std::result::Result<Self, i32> {{\n        match value {{\n"
    ));
    for (variant, _, number) in &variants {
        out.push_str(&format!("            {number} => Ok(Self::{variant}),\n"));
    }
    out.push_str("            other => Err(other),\n        }\n    }\n}\n\n");

    out.push_str(&format!(
        "impl ::std::convert::From<{type_name}> for i32 {{\n    fn from(value: {type_name}) -> i32 {{\n        value as i32\n    }}\n}}\n"
    ));
    Ok(out)
}

/// One lens marker per distinct field name across the schema.
fn emit_fields_module(schema: &Schema, config: &GenConfig) -> String {
    let mut markers: BTreeMap<String, String> = BTreeMap::new();
    for message in schema.messages() {
        for field in message.fields() {
            let ident = field_ident(&field.name);
            markers.insert(ident.trim_start_matches("r#").to_string(), ident);
        }
    }

    let mut out = format!(
        "/// Field lens markers shared by every message above.\npub mod {} {{\n",
        config.fields_module
    );
    if markers.is_empty() {
        out.push_str("}\n");
        return out;
    }
    out.push_str("    ::protolens::field_lenses!(\n");
    for ident in markers.values() {
        out.push_str(&format!("        {ident},\n"));
    }
    out.push_str("    );\n}\n");
    out
}
