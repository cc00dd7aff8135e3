//! `#[derive(EnumMembers)]` for fieldless enums.
//!
//! Emits the explicit member table the runtime cache is built from, so no
//! reflection is needed at runtime.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, LitStr, Result, UnOp};

use proc_macro_crate::{FoundCrate, crate_name};

/// Integer representations the cache supports.
const SUPPORTED_REPRS: [&str; 8] = ["i8", "u8", "i16", "u16", "i32", "u32", "i64", "u64"];

/// Integer representations Rust accepts but the cache doesn't.
const UNSUPPORTED_REPRS: [&str; 4] = ["isize", "usize", "i128", "u128"];

/// Metadata entry: `meta(key = literal)`
struct MetaEntry {
    key: Ident,
    value: Expr,
}

/// Parsed `#[enum_cache(...)]` attributes on one variant.
#[derive(Default)]
struct VariantAttrs {
    primary: bool,
    description: Option<LitStr>,
    /// Extra names for the same value, with their primacy flag.
    aliases: Vec<(LitStr, bool)>,
    meta: Vec<MetaEntry>,
}

struct VariantDef {
    ident: Ident,
    attrs: VariantAttrs,
}

struct EnumDef {
    ident: Ident,
    repr: Ident,
    is_flags: bool,
    variants: Vec<VariantDef>,
}

// =============================================================================
// Parsing
// =============================================================================

fn parse_repr(input: &DeriveInput) -> Result<Ident> {
    let mut found = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            // Skip arguments of align(N) / packed(N).
            if meta.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in meta.input);
                content.parse::<TokenStream2>()?;
                return Ok(());
            }
            let Some(ident) = meta.path.get_ident() else {
                return Ok(());
            };
            let name = ident.to_string();
            if UNSUPPORTED_REPRS.contains(&name.as_str()) {
                return Err(syn::Error::new_spanned(
                    ident,
                    format!(
                        "unsupported underlying kind '{name}': expected one of {}",
                        SUPPORTED_REPRS.join(", ")
                    ),
                ));
            }
            if SUPPORTED_REPRS.contains(&name.as_str()) {
                found = Some(ident.clone());
            }
            Ok(())
        })?;
    }
    found.ok_or_else(|| {
        syn::Error::new_spanned(
            &input.ident,
            format!("#[derive(EnumMembers)] requires #[repr({})]", SUPPORTED_REPRS.join("|")),
        )
    })
}

fn parse_enum_flags(attrs: &[Attribute]) -> Result<bool> {
    let mut is_flags = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("enum_cache")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("flags") {
                is_flags = true;
                Ok(())
            } else {
                Err(meta.error("unknown enum-level enum_cache attribute, expected `flags`"))
            }
        })?;
    }
    Ok(is_flags)
}

/// Parse variant attributes.
///
/// Handles:
/// - `primary`
/// - `description = "..."`
/// - `alias = "Name"` / `primary_alias = "Name"` (repeatable)
/// - `meta(key = literal, ...)`
fn parse_variant_attrs(attrs: &[Attribute]) -> Result<VariantAttrs> {
    let mut result = VariantAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("enum_cache")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary") {
                result.primary = true;
            } else if meta.path.is_ident("description") {
                result.description = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("alias") {
                result.aliases.push((meta.value()?.parse()?, false));
            } else if meta.path.is_ident("primary_alias") {
                result.aliases.push((meta.value()?.parse()?, true));
            } else if meta.path.is_ident("meta") {
                meta.parse_nested_meta(|entry| {
                    let key = entry
                        .path
                        .get_ident()
                        .cloned()
                        .ok_or_else(|| entry.error("metadata key must be an identifier"))?;
                    let value: Expr = entry.value()?.parse()?;
                    result.meta.push(MetaEntry { key, value });
                    Ok(())
                })?;
            } else {
                return Err(meta.error("unknown enum_cache attribute"));
            }
            Ok(())
        })?;
    }
    Ok(result)
}

fn parse_enum(input: &DeriveInput) -> Result<EnumDef> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(EnumMembers)] only supports enums",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(EnumMembers)] does not support generic enums",
        ));
    }

    let repr = parse_repr(input)?;
    let is_flags = parse_enum_flags(&input.attrs)?;

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "#[derive(EnumMembers)] requires fieldless variants",
            ));
        }
        variants.push(VariantDef {
            ident: variant.ident.clone(),
            attrs: parse_variant_attrs(&variant.attrs)?,
        });
    }

    Ok(EnumDef {
        ident: input.ident.clone(),
        repr,
        is_flags,
        variants,
    })
}

// =============================================================================
// Crate path resolution
// =============================================================================

fn enum_cache_path() -> TokenStream2 {
    match crate_name("enum-cache") {
        Ok(FoundCrate::Itself) => quote!(::enum_cache),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::enum_cache),
    }
}

// =============================================================================
// Code generation
// =============================================================================

/// Type an untyped literal gets: integers default to `i32`, floats to `f64`.
fn literal_type(lit: &Lit) -> Option<TokenStream2> {
    match lit {
        Lit::Int(int) if int.suffix().is_empty() => Some(quote!(i32)),
        Lit::Float(float) if float.suffix().is_empty() => Some(quote!(f64)),
        _ => None,
    }
}

fn generate_meta(entry: &MetaEntry, krate: &TokenStream2) -> Result<TokenStream2> {
    let key = LitStr::new(&entry.key.to_string(), entry.key.span());
    let value = &entry.value;

    let lit = match value {
        Expr::Lit(expr) => &expr.lit,
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match unary.expr.as_ref() {
            Expr::Lit(expr) if matches!(expr.lit, Lit::Int(_) | Lit::Float(_)) => &expr.lit,
            other => return Err(syn::Error::new_spanned(other, "only numeric literals can be negated")),
        },
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "metadata values must be numeric, bool or string literals",
            ));
        }
    };

    Ok(match lit {
        Lit::Str(text) => quote! {
            .with_attribute(#krate::Attribute::Meta {
                key: ::std::borrow::Cow::Borrowed(#key),
                bytes: #text.as_bytes().to_vec(),
            })
        },
        Lit::Int(_) | Lit::Float(_) | Lit::Bool(_) => match literal_type(lit) {
            Some(ty) => quote!(.with_meta(#key, &{ let value: #ty = #value; value })),
            None => quote!(.with_meta(#key, &#value)),
        },
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "metadata values must be numeric, bool or string literals",
            ));
        }
    })
}

fn generate_records(def: &EnumDef, krate: &TokenStream2) -> Result<Vec<TokenStream2>> {
    let repr = &def.repr;
    let mut records = Vec::new();

    for variant in &def.variants {
        let ident = &variant.ident;
        let name = LitStr::new(&ident.to_string(), ident.span());
        let primary = variant.attrs.primary.then(|| quote!(.primary()));
        let description = variant
            .attrs
            .description
            .as_ref()
            .map(|text| quote!(.with_description(#text)));
        let meta = variant
            .attrs
            .meta
            .iter()
            .map(|entry| generate_meta(entry, krate))
            .collect::<Result<Vec<_>>>()?;

        records.push(quote! {
            #krate::MemberRecord::new(#name, Self::#ident as #repr)
                #primary
                #description
                #(#meta)*
        });

        for (alias, is_primary) in &variant.attrs.aliases {
            let primary = is_primary.then(|| quote!(.primary()));
            records.push(quote! {
                #krate::MemberRecord::new(#alias, Self::#ident as #repr) #primary
            });
        }
    }

    Ok(records)
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let def = parse_enum(input)?;
    let krate = enum_cache_path();
    let records = generate_records(&def, &krate)?;

    let name = &def.ident;
    let repr = &def.repr;
    let is_flags = def.is_flags;
    let idents: Vec<&Ident> = def.variants.iter().map(|v| &v.ident).collect();

    Ok(quote! {
        #[automatically_derived]
        impl #krate::EnumMembers for #name {
            type Repr = #repr;

            const IS_FLAGS: bool = #is_flags;

            #[inline]
            fn to_repr(&self) -> #repr {
                match *self {
                    #(Self::#idents => Self::#idents as #repr,)*
                }
            }

            fn from_repr(value: #repr) -> ::core::option::Option<Self> {
                #(
                    if value == Self::#idents as #repr {
                        return ::core::option::Option::Some(Self::#idents);
                    }
                )*
                ::core::option::Option::None
            }

            fn member_records() -> ::std::vec::Vec<#krate::MemberRecord<#repr>> {
                ::std::vec![#(#records),*]
            }
        }
    })
}

// =============================================================================
// Entry point
// =============================================================================

/// Derive `enum_cache::EnumMembers` for a fieldless enum with an integer
/// `#[repr]`.
///
/// ```ignore
/// #[derive(Clone, Copy, EnumMembers)]
/// #[repr(u8)]
/// #[enum_cache(flags)]
/// enum Access {
///     #[enum_cache(description = "may read", meta(level = 1))]
///     Read = 1,
///     #[enum_cache(alias = "Modify")]
///     Write = 2,
/// }
/// ```
#[proc_macro_derive(EnumMembers, attributes(enum_cache))]
pub fn derive_enum_members(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    expand(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_to_string(input: DeriveInput) -> String {
        expand(&input).unwrap().to_string()
    }

    fn expand_error(input: DeriveInput) -> String {
        expand(&input).unwrap_err().to_string()
    }

    #[test]
    fn expands_repr_and_records_in_declaration_order() {
        let code = expand_to_string(parse_quote! {
            #[repr(i16)]
            enum Level { Low = -1, Mid, High }
        });

        assert!(code.contains("type Repr = i16"));
        assert!(code.contains("const IS_FLAGS : bool = false"));
        let low = code.find("\"Low\"").unwrap();
        let mid = code.find("\"Mid\"").unwrap();
        let high = code.find("\"High\"").unwrap();
        assert!(low < mid && mid < high);
    }

    #[test]
    fn flags_and_variant_attributes() {
        let code = expand_to_string(parse_quote! {
            #[derive(Clone, Copy)]
            #[repr(u8)]
            #[enum_cache(flags)]
            enum Access {
                #[enum_cache(primary, description = "may read")]
                Read = 1,
                #[enum_cache(alias = "Modify", primary_alias = "Edit")]
                Write = 2,
            }
        });

        assert!(code.contains("const IS_FLAGS : bool = true"));
        assert!(code.contains(". primary ()"));
        assert!(code.contains("with_description (\"may read\")"));
        assert!(code.contains("\"Modify\""));
        assert!(code.contains("\"Edit\""));
    }

    #[test]
    fn aliases_follow_their_variant() {
        let code = expand_to_string(parse_quote! {
            #[repr(u8)]
            enum Color {
                #[enum_cache(alias = "Crimson")]
                Red,
                Green,
            }
        });
        let red = code.find("\"Red\"").unwrap();
        let crimson = code.find("\"Crimson\"").unwrap();
        let green = code.find("\"Green\"").unwrap();
        assert!(red < crimson && crimson < green);
    }

    #[test]
    fn meta_literals_are_typed() {
        let code = expand_to_string(parse_quote! {
            #[repr(u32)]
            enum Weapon {
                #[enum_cache(meta(damage = 50, range = 100u16, weight = 1.5, offset = -3, label = "blade"))]
                Sword,
            }
        });

        assert!(code.contains("let value : i32 = 50"));
        assert!(code.contains("& 100u16"));
        assert!(code.contains("let value : f64 = 1.5"));
        assert!(code.contains("let value : i32 = - 3"));
        assert!(code.contains("\"blade\" . as_bytes ()"));
    }

    #[test]
    fn missing_repr_is_rejected() {
        let err = expand_error(parse_quote! {
            enum Plain { A, B }
        });
        assert!(err.contains("requires #[repr("));
    }

    #[test]
    fn unsupported_repr_is_named() {
        let err = expand_error(parse_quote! {
            #[repr(usize)]
            enum Wide { A }
        });
        assert!(err.contains("unsupported underlying kind 'usize'"));
    }

    #[test]
    fn other_repr_hints_are_ignored() {
        let code = expand_to_string(parse_quote! {
            #[repr(C, u64)]
            enum Mixed { A }
        });
        assert!(code.contains("type Repr = u64"));
    }

    #[test]
    fn non_unit_variants_are_rejected() {
        let err = expand_error(parse_quote! {
            #[repr(u8)]
            enum Shape { Circle(f32) }
        });
        assert!(err.contains("fieldless"));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let err = expand_error(parse_quote! {
            #[repr(u8)]
            enum Bad {
                #[enum_cache(colour = "red")]
                A,
            }
        });
        assert!(err.contains("unknown enum_cache attribute"));
    }

    #[test]
    fn non_literal_meta_is_rejected() {
        let err = expand_error(parse_quote! {
            #[repr(u8)]
            enum Bad {
                #[enum_cache(meta(size = SIZE))]
                A,
            }
        });
        assert!(err.contains("metadata values must be"));
    }
}
