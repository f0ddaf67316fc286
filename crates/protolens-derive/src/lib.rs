// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, GenericArgument, Ident, LitInt, LitStr, Path,
    PathArguments, Type,
};

const MAX_TAG: u64 = (1 << 29) - 1;
const RESERVED_TAGS: std::ops::RangeInclusive<u64> = 19_000..=19_999;

/// Scalar keyword, encoding marker / `ScalarType` variant, Rust storage type.
///
/// The first row for a Rust type is the one inferred when no `kind` is given.
const SCALARS: &[(&str, &str, &str)] = &[
    ("double", "Double", "f64"),
    ("float", "Float", "f32"),
    ("int32", "Int32", "i32"),
    ("int64", "Int64", "i64"),
    ("uint32", "UInt32", "u32"),
    ("uint64", "UInt64", "u64"),
    ("sint32", "SInt32", "i32"),
    ("sint64", "SInt64", "i64"),
    ("fixed32", "Fixed32", "u32"),
    ("fixed64", "Fixed64", "u64"),
    ("sfixed32", "SFixed32", "i32"),
    ("sfixed64", "SFixed64", "i64"),
    ("bool", "Bool", "bool"),
    ("string", "String", "String"),
    ("bytes", "Bytes", "Vec<u8>"),
];

#[derive(Clone)]
enum Scalar {
    Builtin {
        keyword: &'static str,
        variant: &'static str,
    },
    Enum(String),
}

impl Scalar {
    fn is_packable(&self) -> bool {
        !matches!(
            self,
            Scalar::Builtin {
                keyword: "string" | "bytes",
                ..
            }
        )
    }

    /// `::protolens::__private::<Marker>`
    fn marker(&self) -> TokenStream2 {
        let name = match self {
            Scalar::Builtin {
                variant: "String", ..
            } => "ProtoString",
            Scalar::Builtin {
                variant: "Bytes", ..
            } => "ProtoBytes",
            Scalar::Builtin { variant, .. } => variant,
            Scalar::Enum(_) => "Enumeration",
        };
        let marker = Ident::new(name, Span::call_site());
        quote! { ::protolens::__private::#marker }
    }

    /// `::protolens::ScalarType::...`
    fn type_expr(&self) -> TokenStream2 {
        match self {
            Scalar::Builtin { variant, .. } => {
                let variant = Ident::new(variant, Span::call_site());
                quote! { ::protolens::ScalarType::#variant }
            }
            Scalar::Enum(name) => {
                quote! { ::protolens::ScalarType::Enum(::std::string::String::from(#name)) }
            }
        }
    }
}

#[derive(Clone)]
enum Element {
    Scalar(Scalar),
    Message(Type),
}

impl Element {
    fn type_expr(&self) -> TokenStream2 {
        match self {
            Element::Scalar(scalar) => {
                let scalar = scalar.type_expr();
                quote! { ::protolens::ElementType::Scalar(#scalar) }
            }
            Element::Message(ty) => quote! {
                ::protolens::ElementType::Message(
                    ::std::string::String::from(<#ty as ::protolens::Message>::TYPE_NAME)
                )
            },
        }
    }
}

/// How a struct member maps onto the wire.
enum Shape {
    Singular(Scalar),
    /// `Option<T>` or `Option<Box<T>>`.
    Message(Type),
    Repeated { element: Element, packed: bool },
}

struct FieldInfo {
    ident: Ident,
    name: String,
    tag: u32,
    ty: Type,
    shape: Shape,
}

#[derive(Default)]
struct FieldAttrs {
    tag: Option<LitInt>,
    kind: Option<LitStr>,
    enumeration: Option<LitStr>,
    name: Option<LitStr>,
    packed: bool,
    unknown: bool,
}

/// `#[derive(Message)]`: descriptor, wire codec and `HasField` impls.
///
/// Container attributes: `#[proto(name = "pkg.Type", fields = "path")]`.
/// `name` defaults to the struct name, `fields` (the module holding the
/// `field_lenses!` markers) defaults to `fields`.
///
/// Field attributes: `#[proto(tag = N)]` plus optional `kind = "sint32"`,
/// `enumeration = "pkg.Enum"` (on `i32` storage), `packed` and
/// `name = "proto_name"`. Exactly one field carries `#[proto(unknown)]`
/// and has type `protolens::UnknownFields`.
///
/// Storage shapes: scalars as their Rust type, `Vec<u8>` as bytes,
/// `Option<T>` / `Option<Box<T>>` as singular messages, `Vec<T>` as
/// repeated fields.
///
/// Example:
/// ```ignore
/// #[derive(Debug, Clone, Default, PartialEq, Message)]
/// #[proto(name = "foo.FooPacked")]
/// struct FooPacked {
///     #[proto(tag = 1, packed)]
///     x: Vec<i32>,
///     #[proto(unknown)]
///     unknown_fields: protolens::UnknownFields,
/// }
/// ```
#[proc_macro_derive(Message, attributes(proto))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[allow(clippy::too_many_lines)]
fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Message cannot be derived for generic types",
        ));
    }

    let (type_name, fields_path) = container_attrs(input)?;

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let mut infos: Vec<FieldInfo> = Vec::new();
    let mut unknown: Option<Ident> = None;

    for field in named {
        let Some(field_ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let attrs = field_attrs(field)?;

        if attrs.unknown {
            if attrs.tag.is_some() || attrs.kind.is_some() || attrs.packed {
                return Err(syn::Error::new_spanned(
                    field,
                    "the unknown-field store takes no other proto attributes",
                ));
            }
            if unknown.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[proto(unknown)]",
                ));
            }
            unknown = Some(field_ident);
            continue;
        }

        let Some(tag_lit) = &attrs.tag else {
            return Err(syn::Error::new_spanned(
                field,
                "missing #[proto(tag = N)] (or #[proto(unknown)])",
            ));
        };
        let tag = tag_lit.base10_parse::<u64>()?;
        if tag == 0 || tag > MAX_TAG || RESERVED_TAGS.contains(&tag) {
            return Err(syn::Error::new_spanned(
                tag_lit,
                format!("invalid field tag {tag}: must be in 1..=536870911 and outside 19000..=19999"),
            ));
        }
        let tag = tag as u32;
        if let Some(previous) = infos.iter().find(|info| info.tag == tag) {
            return Err(syn::Error::new_spanned(
                tag_lit,
                format!("tag {tag} is already used by `{}`", previous.name),
            ));
        }

        let shape = field_shape(&field.ty, &attrs)?;
        let name = match &attrs.name {
            Some(lit) => lit.value(),
            None => field_ident.to_string().trim_start_matches("r#").to_owned(),
        };
        if let Some(previous) = infos.iter().find(|info| info.name == name) {
            let message = format!(
                "field name `{name}` is already used by `{}` (tag {})",
                previous.ident, previous.tag
            );
            return Err(match &attrs.name {
                Some(lit) => syn::Error::new_spanned(lit, message),
                None => syn::Error::new_spanned(&field_ident, message),
            });
        }
        infos.push(FieldInfo {
            ident: field_ident,
            name,
            tag,
            ty: field.ty.clone(),
            shape,
        });
    }

    let Some(unknown) = unknown else {
        return Err(syn::Error::new_spanned(
            input,
            "a field `#[proto(unknown)] unknown_fields: protolens::UnknownFields` is required",
        ));
    };

    let descriptor_fields = infos.iter().map(|f| {
        let name = &f.name;
        let tag = f.tag;
        let kind = match &f.shape {
            Shape::Singular(scalar) => {
                let scalar = scalar.type_expr();
                quote! { ::protolens::FieldKind::Scalar(#scalar) }
            }
            Shape::Message(inner) => quote! {
                ::protolens::FieldKind::Message(
                    ::std::string::String::from(<#inner as ::protolens::Message>::TYPE_NAME)
                )
            },
            Shape::Repeated { element, packed } => {
                let element = element.type_expr();
                if *packed {
                    quote! { ::protolens::FieldKind::PackedRepeated(#element) }
                } else {
                    quote! { ::protolens::FieldKind::Repeated(#element) }
                }
            }
        };
        quote! { ::protolens::FieldDescriptor::new(#name, #tag, #kind) }
    });

    let encode_fields = infos.iter().map(|f| {
        let field = &f.ident;
        let tag = f.tag;
        match &f.shape {
            Shape::Singular(scalar) => {
                let marker = scalar.marker();
                quote! { ::protolens::__private::encode_scalar::<#marker>(#tag, &self.#field, buf); }
            }
            Shape::Message(inner) => quote! {
                ::protolens::__private::encode_message_field::<#inner, _>(#tag, &self.#field, buf);
            },
            Shape::Repeated {
                element: Element::Scalar(scalar),
                packed,
            } => {
                let marker = scalar.marker();
                if *packed {
                    quote! { ::protolens::__private::encode_packed::<#marker>(#tag, &self.#field, buf); }
                } else {
                    quote! { ::protolens::__private::encode_repeated::<#marker>(#tag, &self.#field, buf); }
                }
            }
            Shape::Repeated {
                element: Element::Message(_),
                ..
            } => quote! {
                ::protolens::__private::encode_repeated_message(#tag, &self.#field, buf);
            },
        }
    });

    let field_lengths = infos.iter().map(|f| {
        let field = &f.ident;
        let tag = f.tag;
        match &f.shape {
            Shape::Singular(scalar) => {
                let marker = scalar.marker();
                quote! { ::protolens::__private::scalar_len::<#marker>(#tag, &self.#field) }
            }
            Shape::Message(inner) => quote! {
                ::protolens::__private::message_field_len::<#inner, _>(#tag, &self.#field)
            },
            Shape::Repeated {
                element: Element::Scalar(scalar),
                packed,
            } => {
                let marker = scalar.marker();
                if *packed {
                    quote! { ::protolens::__private::packed_len::<#marker>(#tag, &self.#field) }
                } else {
                    quote! { ::protolens::__private::repeated_len::<#marker>(#tag, &self.#field) }
                }
            }
            Shape::Repeated {
                element: Element::Message(_),
                ..
            } => quote! {
                ::protolens::__private::repeated_message_len(#tag, &self.#field)
            },
        }
    });

    let merge_arms = infos.iter().map(|f| {
        let field = &f.ident;
        let tag = f.tag;
        let call = match &f.shape {
            Shape::Singular(scalar) => {
                let marker = scalar.marker();
                quote! { ::protolens::__private::merge_scalar::<#marker>(tag, wire_type, &mut self.#field, reader)? }
            }
            Shape::Message(inner) => quote! {
                ::protolens::__private::merge_message_field::<#inner, _>(tag, wire_type, &mut self.#field, reader, ctx)?
            },
            Shape::Repeated {
                element: Element::Scalar(scalar),
                ..
            } => {
                let marker = scalar.marker();
                quote! { ::protolens::__private::merge_repeated::<#marker>(tag, wire_type, &mut self.#field, reader)? }
            }
            Shape::Repeated {
                element: Element::Message(_),
                ..
            } => quote! {
                ::protolens::__private::merge_repeated_message(tag, wire_type, &mut self.#field, reader, ctx)?
            },
        };
        quote! { #tag => #call, }
    });

    let has_field_impls = infos.iter().map(|f| {
        let field = &f.ident;
        let marker = quote! { #fields_path::#field };
        match &f.shape {
            Shape::Message(inner) => quote! {
                impl ::protolens::HasField<#marker> for #ident {
                    type Value = #inner;

                    #[inline]
                    fn field(&self) -> &Self::Value {
                        ::protolens::MessageField::<#inner>::view_or_default(&self.#field)
                    }

                    #[inline]
                    fn field_mut(&mut self) -> &mut Self::Value {
                        ::protolens::MessageField::<#inner>::get_or_insert_default(&mut self.#field)
                    }
                }
            },
            _ => {
                let ty = &f.ty;
                quote! {
                    impl ::protolens::HasField<#marker> for #ident {
                        type Value = #ty;

                        #[inline]
                        fn field(&self) -> &Self::Value {
                            &self.#field
                        }

                        #[inline]
                        fn field_mut(&mut self) -> &mut Self::Value {
                            &mut self.#field
                        }
                    }
                }
            }
        }
    });

    // Message fields reference their type by name, so building one
    // descriptor never forces another (recursive types stay lazy).
    let expanded = quote! {
        impl ::protolens::Message for #ident {
            const TYPE_NAME: &'static str = #type_name;

            fn descriptor() -> &'static ::protolens::MessageDescriptor {
                static DESCRIPTOR: ::protolens::__private::OnceLock<::protolens::MessageDescriptor> =
                    ::protolens::__private::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::protolens::MessageDescriptor::new_unchecked(
                        #type_name,
                        ::std::vec![#(#descriptor_fields),*],
                    )
                })
            }

            fn default_instance() -> &'static Self {
                static DEFAULT: ::protolens::__private::OnceLock<#ident> =
                    ::protolens::__private::OnceLock::new();
                DEFAULT.get_or_init(<#ident as ::std::default::Default>::default)
            }

            #[allow(unused_variables)]
            fn encode_fields(&self, buf: &mut ::std::vec::Vec<u8>) {
                #(#encode_fields)*
            }

            #[allow(unused_mut)]
            fn fields_encoded_len(&self) -> usize {
                let mut len = 0usize;
                #(len += #field_lengths;)*
                len
            }

            #[allow(unused_variables, unreachable_code)]
            fn merge_field(
                &mut self,
                tag: u32,
                wire_type: ::protolens::WireType,
                reader: &mut ::protolens::wire::WireReader<'_>,
                ctx: ::protolens::DecodeContext,
            ) -> ::std::result::Result<bool, ::protolens::DecodeError> {
                match tag {
                    #(#merge_arms)*
                    _ => return ::std::result::Result::Ok(false),
                }
                ::std::result::Result::Ok(true)
            }

            fn unknown_fields(&self) -> &::protolens::UnknownFields {
                &self.#unknown
            }

            fn unknown_fields_mut(&mut self) -> &mut ::protolens::UnknownFields {
                &mut self.#unknown
            }
        }

        #(#has_field_impls)*
    };

    Ok(expanded)
}

fn container_attrs(input: &DeriveInput) -> syn::Result<(String, Path)> {
    let mut type_name = None;
    let mut fields_path: Option<Path> = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("proto") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                type_name = Some(lit.value());
            } else if meta.path.is_ident("fields") {
                let lit: LitStr = meta.value()?.parse()?;
                fields_path = Some(lit.parse()?);
            } else {
                return Err(meta.error("unsupported container attribute, expected `name` or `fields`"));
            }
            Ok(())
        })?;
    }
    let type_name = type_name.unwrap_or_else(|| input.ident.to_string());
    let fields_path = fields_path.unwrap_or_else(|| format_ident!("fields").into());
    Ok((type_name, fields_path))
}

fn field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("proto") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                attrs.tag = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("kind") {
                attrs.kind = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("enumeration") {
                attrs.enumeration = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("name") {
                attrs.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("packed") {
                attrs.packed = true;
            } else if meta.path.is_ident("unknown") {
                attrs.unknown = true;
            } else {
                return Err(meta.error("unsupported field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

fn field_shape(ty: &Type, attrs: &FieldAttrs) -> syn::Result<Shape> {
    if let Some(inner) = single_generic(ty, "Option") {
        if attrs.kind.is_some() || attrs.enumeration.is_some() || attrs.packed {
            return Err(syn::Error::new_spanned(
                ty,
                "message fields take no `kind`, `enumeration` or `packed`",
            ));
        }
        let inner = single_generic(inner, "Box").unwrap_or(inner);
        return Ok(Shape::Message(inner.clone()));
    }

    if !is_bytes(ty) {
        if let Some(inner) = single_generic(ty, "Vec") {
            let element = match rust_scalar_name(inner) {
                Some(rust) => Element::Scalar(resolve_scalar(inner, rust, attrs)?),
                None if attrs.kind.is_some() || attrs.enumeration.is_some() => {
                    return Err(syn::Error::new_spanned(
                        inner,
                        "`kind` and `enumeration` apply to scalar elements only",
                    ))
                }
                None => Element::Message(inner.clone()),
            };
            if attrs.packed {
                let packable = matches!(&element, Element::Scalar(s) if s.is_packable());
                if !packable {
                    return Err(syn::Error::new_spanned(
                        ty,
                        "only numeric, bool and enum repeated fields can be packed",
                    ));
                }
            }
            return Ok(Shape::Repeated {
                element,
                packed: attrs.packed,
            });
        }
    }

    if attrs.packed {
        return Err(syn::Error::new_spanned(
            ty,
            "`packed` applies to repeated (Vec) fields only",
        ));
    }
    match rust_scalar_name(ty) {
        Some(rust) => Ok(Shape::Singular(resolve_scalar(ty, rust, attrs)?)),
        None => Err(syn::Error::new_spanned(
            ty,
            "unsupported field type: expected a scalar, String, Vec<u8>, Option<Message> or Vec<_>",
        )),
    }
}

/// Pick the wire representation of a scalar stored as `rust`.
fn resolve_scalar(ty: &Type, rust: &str, attrs: &FieldAttrs) -> syn::Result<Scalar> {
    if let Some(enumeration) = &attrs.enumeration {
        if rust != "i32" || attrs.kind.is_some() {
            return Err(syn::Error::new_spanned(
                enumeration,
                "enumeration fields are stored as i32 and take no `kind`",
            ));
        }
        return Ok(Scalar::Enum(enumeration.value()));
    }
    let row = match &attrs.kind {
        Some(kind) => {
            let keyword = kind.value();
            let Some(row) = SCALARS.iter().find(|(k, _, _)| *k == keyword) else {
                return Err(syn::Error::new_spanned(
                    kind,
                    format!("unknown scalar kind `{keyword}`"),
                ));
            };
            if row.2 != rust {
                return Err(syn::Error::new_spanned(
                    ty,
                    format!("`{keyword}` is stored as {}, found {rust}", row.2),
                ));
            }
            row
        }
        None => match SCALARS.iter().find(|(_, _, r)| *r == rust) {
            Some(row) => row,
            None => return Err(syn::Error::new_spanned(ty, "unsupported scalar type")),
        },
    };
    Ok(Scalar::Builtin {
        keyword: row.0,
        variant: row.1,
    })
}

/// Inner type of `Wrapper<T>`, matched on the last path segment.
fn single_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn is_bytes(ty: &Type) -> bool {
    single_generic(ty, "Vec").is_some_and(|inner| plain_ident(inner).as_deref() == Some("u8"))
}

fn plain_ident(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if !segment.arguments.is_empty() {
        return None;
    }
    Some(segment.ident.to_string())
}

fn rust_scalar_name(ty: &Type) -> Option<&'static str> {
    if is_bytes(ty) {
        return Some("Vec<u8>");
    }
    let name = plain_ident(ty)?;
    SCALARS
        .iter()
        .map(|(_, _, rust)| *rust)
        .find(|rust| *rust == name)
}
