//! Derive macros for realmlink-protocol
//!
//! `#[derive(Wire)]` generates a field-by-field codec for a data object and
//! `#[derive(Record)]` does the same for a record, adding its kind byte.
//! Fields are read and written in declaration order.
//!
//! # Field attributes
//!
//! - `#[wire(compressed)]`: the integer (or each list element) uses the
//!   compressed integer encoding
//! - `#[wire(len = u8 | u16 | i16 | i32 | compressed)]`: length prefix of a
//!   `String`, `Vec<u8>` or list (default `i16`)
//! - `#[wire(rest)]`: a `Vec<u8>` that takes every remaining byte
//! - `#[wire(trailing)]`: an `Option<T>` read only when bytes remain in the
//!   payload, written only when `Some`
//! - `#[wire(min_remaining = N)]`: like `trailing`, but requires `N` bytes
//! - `#[wire(default = EXPR)]`: a plain field that falls back to `EXPR` when
//!   the payload ends before it
//!
//! Values in the trailing part must be set as a contiguous prefix: once a
//! `#[wire(trailing)]` option is `None`, encoding a later trailing value fails
//! with `CodecError::TrailingGap`.
//!
//! # Example
//!
//! ```ignore
//! use realmlink_protocol::{Record, Wire};
//!
//! #[derive(Record)]
//! #[kind(kinds::ENEMY_SHOOT)]
//! pub struct EnemyShoot {
//!     pub bullet_id: u16,
//!     pub owner_id: i32,
//!     pub bullet_type: u8,
//!     pub location: Location,
//!     pub angle: f32,
//!     pub damage: i16,
//!     #[wire(default = 1)]
//!     pub num_shots: u8,
//!     #[wire(default = 0.0)]
//!     pub angle_inc: f32,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Expr, Field, Fields, GenericArgument, Ident, LitInt,
    Meta, PathArguments, Type,
};

/// Derives `realmlink_protocol::codec::Wire`
#[proc_macro_derive(Wire, attributes(wire))]
pub fn derive_wire(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_wire(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derives `realmlink_protocol::message_registry::Record`
///
/// Requires `#[kind(EXPR)]`, where `EXPR` is a `u8` constant expression.
#[proc_macro_derive(Record, attributes(kind, wire))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_wire(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let (decode_body, encode_body) = codec_bodies(input)?;

    Ok(quote! {
        impl #impl_generics ::realmlink_protocol::codec::Wire for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn decode(
                reader: &mut ::realmlink_protocol::codec::PacketReader<'_>,
            ) -> ::realmlink_protocol::error::CodecResult<Self> {
                #decode_body
            }

            #[allow(unused_variables)]
            fn encode(
                &self,
                writer: &mut ::realmlink_protocol::codec::PacketWriter,
            ) -> ::realmlink_protocol::error::CodecResult<()> {
                #encode_body
            }
        }
    })
}

fn expand_record(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = name.to_string();
    let kind = extract_kind(input)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let (decode_body, encode_body) = codec_bodies(input)?;

    Ok(quote! {
        impl #impl_generics ::realmlink_protocol::message_registry::Record for #name #ty_generics #where_clause {
            const KIND: u8 = #kind;
            const NAME: &'static str = #name_str;

            #[allow(unused_variables)]
            fn decode(
                reader: &mut ::realmlink_protocol::codec::PacketReader<'_>,
            ) -> ::realmlink_protocol::error::CodecResult<Self> {
                #decode_body
            }

            #[allow(unused_variables)]
            fn encode(
                &self,
                writer: &mut ::realmlink_protocol::codec::PacketWriter,
            ) -> ::realmlink_protocol::error::CodecResult<()> {
                #encode_body
            }
        }
    })
}

/// Extracts the kind from `#[kind(EXPR)]` or `#[kind(LITERAL)]`
fn extract_kind(input: &DeriveInput) -> syn::Result<Expr> {
    for attr in &input.attrs {
        if attr.path().is_ident("kind") {
            return match &attr.meta {
                Meta::List(_) => attr.parse_args::<Expr>(),
                Meta::NameValue(meta) => Ok(meta.value.clone()),
                Meta::Path(_) => Err(syn::Error::new_spanned(attr, "expected #[kind(EXPR)]")),
            };
        }
    }
    Err(syn::Error::new_spanned(
        &input.ident,
        "Record requires a #[kind(EXPR)] attribute",
    ))
}

fn codec_bodies(input: &DeriveInput) -> syn::Result<(TokenStream2, TokenStream2)> {
    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "wire codecs can only be derived for structs",
            ))
        }
    };

    match &data.fields {
        Fields::Unit => Ok((quote!(Ok(Self)), quote!(Ok(())))),
        Fields::Named(fields) => {
            let mut idents = Vec::new();
            let mut reads = Vec::new();
            let mut writes = Vec::new();
            let mut has_tail = false;
            for field in &fields.named {
                let attrs = FieldAttrs::parse(field)?;
                let ident = field.ident.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(field, "expected a named field")
                })?;
                has_tail |= attrs.trailing;
                reads.push(read_field(field, &attrs)?);
                writes.push(write_field(field, ident, &attrs)?);
                idents.push(ident);
            }
            let decode = quote! {
                #(let #idents = #reads;)*
                Ok(Self { #(#idents),* })
            };
            // Trailing values must form a contiguous prefix of the tail
            let tail_state = if has_tail {
                quote!(#[allow(unused_mut, unused_assignments)] let mut tail_open = true;)
            } else {
                quote!()
            };
            let encode = quote! {
                #tail_state
                #(#writes)*
                Ok(())
            };
            Ok((decode, encode))
        }
        Fields::Unnamed(fields) => Err(syn::Error::new_spanned(
            fields,
            "wire codecs require named fields",
        )),
    }
}

#[derive(Default)]
struct FieldAttrs {
    compressed: bool,
    len: Option<Ident>,
    rest: bool,
    trailing: bool,
    min_remaining: Option<LitInt>,
    default: Option<Expr>,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("wire") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("compressed") {
                    attrs.compressed = true;
                } else if meta.path.is_ident("rest") {
                    attrs.rest = true;
                } else if meta.path.is_ident("trailing") {
                    attrs.trailing = true;
                } else if meta.path.is_ident("len") {
                    attrs.len = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("min_remaining") {
                    attrs.min_remaining = Some(meta.value()?.parse()?);
                    attrs.trailing = true;
                } else if meta.path.is_ident("default") {
                    attrs.default = Some(meta.value()?.parse()?);
                    attrs.trailing = true;
                } else {
                    return Err(meta.error("unsupported wire attribute"));
                }
                Ok(())
            })?;
        }
        Ok(attrs)
    }

    fn prefix(&self) -> syn::Result<TokenStream2> {
        let variant = match &self.len {
            None => quote!(I16),
            Some(ident) => match ident.to_string().as_str() {
                "u8" => quote!(U8),
                "u16" => quote!(U16),
                "i16" => quote!(I16),
                "i32" => quote!(I32),
                "compressed" => quote!(Compressed),
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        "expected one of u8, u16, i16, i32, compressed",
                    ))
                }
            },
        };
        Ok(quote!(::realmlink_protocol::codec::LengthPrefix::#variant))
    }
}

enum Shape<'a> {
    Option(&'a Type),
    Vec(&'a Type),
    String,
    Other,
}

fn shape(ty: &Type) -> Shape<'_> {
    if let Type::Path(path) = ty {
        if path.qself.is_none() {
            if let Some(segment) = path.path.segments.last() {
                if segment.ident == "String" {
                    return Shape::String;
                }
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        if segment.ident == "Option" {
                            return Shape::Option(inner);
                        }
                        if segment.ident == "Vec" {
                            return Shape::Vec(inner);
                        }
                    }
                }
            }
        }
    }
    Shape::Other
}

fn is_u8(ty: &Type) -> bool {
    matches!(ty, Type::Path(path) if path.qself.is_none() && path.path.is_ident("u8"))
}

fn read_scalar(ty: &Type, compressed: bool) -> TokenStream2 {
    if compressed {
        quote!(reader.read_compressed_int()?)
    } else {
        quote!(<#ty as ::realmlink_protocol::codec::Wire>::decode(reader)?)
    }
}

fn write_scalar(ty: &Type, compressed: bool, value: TokenStream2) -> TokenStream2 {
    if compressed {
        quote!(writer.write_compressed_int(*#value);)
    } else {
        quote!(<#ty as ::realmlink_protocol::codec::Wire>::encode(#value, writer)?;)
    }
}

fn read_value(ty: &Type, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    match shape(ty) {
        Shape::Vec(elem) if attrs.rest => {
            if !is_u8(elem) {
                return Err(syn::Error::new_spanned(ty, "#[wire(rest)] requires Vec<u8>"));
            }
            Ok(quote!(reader.read_remaining().to_vec()))
        }
        Shape::Vec(elem) if is_u8(elem) && !attrs.compressed => {
            let prefix = attrs.prefix()?;
            Ok(quote!({
                let len = reader.read_length(#prefix)?;
                reader.read_bytes(len)?.to_vec()
            }))
        }
        Shape::Vec(elem) => {
            let prefix = attrs.prefix()?;
            let item = read_scalar(elem, attrs.compressed);
            Ok(quote!({
                let len = reader.read_length(#prefix)?;
                let mut items = ::std::vec::Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(#item);
                }
                items
            }))
        }
        Shape::String if attrs.len.is_some() => {
            let prefix = attrs.prefix()?;
            Ok(quote!(reader.read_string_prefixed(#prefix)?))
        }
        _ => Ok(read_scalar(ty, attrs.compressed)),
    }
}

fn write_value(ty: &Type, attrs: &FieldAttrs, value: TokenStream2) -> syn::Result<TokenStream2> {
    match shape(ty) {
        Shape::Vec(_) if attrs.rest => Ok(quote!(writer.write_bytes(#value);)),
        Shape::Vec(elem) if is_u8(elem) && !attrs.compressed => {
            let prefix = attrs.prefix()?;
            Ok(quote! {
                writer.write_length(#prefix, (#value).len())?;
                writer.write_bytes(#value);
            })
        }
        Shape::Vec(elem) => {
            let prefix = attrs.prefix()?;
            let item = write_scalar(elem, attrs.compressed, quote!(item));
            Ok(quote! {
                writer.write_length(#prefix, (#value).len())?;
                for item in (#value).iter() {
                    #item
                }
            })
        }
        Shape::String if attrs.len.is_some() => {
            let prefix = attrs.prefix()?;
            Ok(quote!(writer.write_string_prefixed(#prefix, #value)?;))
        }
        _ => Ok(write_scalar(ty, attrs.compressed, value)),
    }
}

fn read_field(field: &Field, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    if !attrs.trailing {
        return read_value(&field.ty, attrs);
    }

    let min = match &attrs.min_remaining {
        Some(lit) => quote!(#lit),
        None => quote!(1),
    };

    match (shape(&field.ty), &attrs.default) {
        (_, Some(default)) => {
            let value = read_value(&field.ty, attrs)?;
            Ok(quote! {
                if reader.remaining() >= #min { #value } else { #default }
            })
        }
        (Shape::Option(inner), None) => {
            let value = read_value(inner, attrs)?;
            Ok(quote! {
                if reader.remaining() >= #min {
                    ::std::option::Option::Some(#value)
                } else {
                    ::std::option::Option::None
                }
            })
        }
        _ => Err(syn::Error::new_spanned(
            &field.ty,
            "trailing fields must be Option<T> or carry #[wire(default = ...)]",
        )),
    }
}

fn write_field(field: &Field, ident: &Ident, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    if !attrs.trailing {
        return write_value(&field.ty, attrs, quote!(&self.#ident));
    }

    let name = ident.to_string();
    let gap = quote! {
        if !tail_open {
            return Err(::realmlink_protocol::error::CodecError::TrailingGap { field: #name });
        }
    };
    if attrs.default.is_none() {
        if let Shape::Option(inner) = shape(&field.ty) {
            let write = write_value(inner, attrs, quote!(value))?;
            // A `min_remaining` field is skipped on short tails, so its absence
            // does not end the tail
            let close = if attrs.min_remaining.is_none() {
                quote!(tail_open = false;)
            } else {
                quote!()
            };
            return Ok(quote! {
                match &self.#ident {
                    ::std::option::Option::Some(value) => {
                        #gap
                        #write
                    }
                    ::std::option::Option::None => { #close }
                }
            });
        }
    }
    let write = write_value(&field.ty, attrs, quote!(&self.#ident))?;
    Ok(quote! {
        #gap
        #write
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_detection() {
        let ty: Type = syn::parse_quote!(Option<u8>);
        assert!(matches!(shape(&ty), Shape::Option(_)));

        let ty: Type = syn::parse_quote!(::std::vec::Vec<Tile>);
        assert!(matches!(shape(&ty), Shape::Vec(_)));

        let ty: Type = syn::parse_quote!(String);
        assert!(matches!(shape(&ty), Shape::String));

        let ty: Type = syn::parse_quote!(Location);
        assert!(matches!(shape(&ty), Shape::Other));
    }

    #[test]
    fn test_u8_detection() {
        let ty: Type = syn::parse_quote!(u8);
        assert!(is_u8(&ty));
        let ty: Type = syn::parse_quote!(i8);
        assert!(!is_u8(&ty));
    }

    #[test]
    fn test_field_attrs_parse() {
        let field: Field = syn::parse_quote! {
            #[wire(len = compressed, compressed)]
            ids: Vec<i32>
        };
        let attrs = FieldAttrs::parse(&field).unwrap();
        assert!(attrs.compressed);
        assert_eq!(attrs.len.unwrap().to_string(), "compressed");
        assert!(!attrs.trailing);
    }

    #[test]
    fn test_default_implies_trailing() {
        let field: Field = syn::parse_quote! {
            #[wire(default = 1)]
            num_shots: u8
        };
        let attrs = FieldAttrs::parse(&field).unwrap();
        assert!(attrs.trailing);
        assert!(attrs.default.is_some());
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let field: Field = syn::parse_quote! {
            #[wire(packed)]
            value: u8
        };
        assert!(FieldAttrs::parse(&field).is_err());
    }
}
