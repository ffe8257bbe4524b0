extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Type};

/// Largest field number a tag can carry (29 bits).
const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;
/// Field numbers reserved by the wire format.
const RESERVED_FIELD_NUMBERS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

/// What a `#[proto(...)]` attribute says about one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
    /// Declared scalar with this field number.
    Declared(u32),
    /// Holds the record's `UnknownFieldStore`.
    Unknown,
    /// No `#[proto]` attribute: not part of the wire format.
    Ignored,
}

/// A declared field after validation.
struct DeclaredField {
    number: u32,
    ident: Ident,
    name: String,
    ty: Type,
}

/// Parse the `#[proto(...)]` attributes on a field.
///
/// # Supported Attributes
///
/// * `#[proto(number = 1)]` - Declared field with field number 1
/// * `#[proto(unknown)]` - Unknown-field storage
fn get_field_role(attrs: &[Attribute]) -> syn::Result<FieldRole> {
    let mut role = FieldRole::Ignored;
    for attr in attrs {
        if !attr.path().is_ident("proto") {
            continue;
        }
        attr.parse_args_with(|input: syn::parse::ParseStream| {
            while !input.is_empty() {
                let ident = input.parse::<Ident>()?;
                if ident == "number" {
                    input.parse::<syn::Token![=]>()?;
                    let lit = input.parse::<syn::LitInt>()?;
                    let number = lit.base10_parse::<u32>()?;
                    if number == 0 || number > MAX_FIELD_NUMBER {
                        return Err(syn::Error::new(
                            lit.span(),
                            format!("field number must be in 1..={}", MAX_FIELD_NUMBER),
                        ));
                    }
                    if RESERVED_FIELD_NUMBERS.contains(&number) {
                        return Err(syn::Error::new(
                            lit.span(),
                            "field numbers 19000..=19999 are reserved",
                        ));
                    }
                    role = FieldRole::Declared(number);
                } else if ident == "unknown" {
                    role = FieldRole::Unknown;
                } else {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("Unknown attribute: {}", ident),
                    ));
                }

                // Consume comma if present, otherwise end
                if input.peek(syn::Token![,]) {
                    input.parse::<syn::Token![,]>()?;
                }
            }
            Ok(())
        })?;
    }
    Ok(role)
}

/// Parse `#[proto(name = "pkg.Name")]` on the struct, defaulting to the
/// struct's own name.
fn get_message_name(attrs: &[Attribute], ident: &Ident) -> syn::Result<String> {
    let mut name = None;
    for attr in attrs {
        if !attr.path().is_ident("proto") {
            continue;
        }
        attr.parse_args_with(|input: syn::parse::ParseStream| {
            while !input.is_empty() {
                let key = input.parse::<Ident>()?;
                if key == "name" {
                    input.parse::<syn::Token![=]>()?;
                    let lit = input.parse::<LitStr>()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "record name must not be empty"));
                    }
                    name = Some(lit.value());
                } else {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("Unknown attribute: {}", key),
                    ));
                }
                if input.peek(syn::Token![,]) {
                    input.parse::<syn::Token![,]>()?;
                }
            }
            Ok(())
        })?;
    }
    Ok(name.unwrap_or_else(|| ident.unraw().to_string()))
}

/// Derive macro implementing `protolite::Message` for a struct.
///
/// Emits a static descriptor table (fields sorted by number) and the
/// accessor glue; parsing, serialization and merging are done by the generic
/// codec in `protolite::codec`.
///
/// ```ignore
/// #[derive(Clone, Default, protolite::Message)]
/// #[proto(name = "pkg.Example")]
/// struct Example {
///     #[proto(number = 1)]
///     str: String,
///     #[proto(number = 2)]
///     i32: i32,
///     #[proto(unknown)]
///     unknown: protolite::UnknownFieldStore,
/// }
/// ```
#[proc_macro_derive(Message, attributes(proto))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_message(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand_message(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Message cannot be derived for generic structs",
        ));
    }
    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Message can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Message can only be derived for structs",
            ))
        }
    };

    let full_name = get_message_name(&input.attrs, name)?;

    let mut declared = Vec::new();
    let mut unknown_ident: Option<Ident> = None;
    let mut seen_numbers = HashSet::new();
    for field in fields {
        // Named fields always carry an ident.
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        match get_field_role(&field.attrs)? {
            FieldRole::Declared(number) => {
                if !seen_numbers.insert(number) {
                    return Err(syn::Error::new_spanned(
                        &ident,
                        format!("field number {} is used more than once", number),
                    ));
                }
                declared.push(DeclaredField {
                    number,
                    name: ident.unraw().to_string(),
                    ident,
                    ty: field.ty.clone(),
                });
            }
            FieldRole::Unknown => {
                if unknown_ident.is_some() {
                    return Err(syn::Error::new_spanned(
                        &ident,
                        "only one field may be marked #[proto(unknown)]",
                    ));
                }
                unknown_ident = Some(ident);
            }
            FieldRole::Ignored => {}
        }
    }
    let unknown_ident = unknown_ident.ok_or_else(|| {
        syn::Error::new(
            Span::call_site(),
            "Message requires one UnknownFieldStore field marked #[proto(unknown)]",
        )
    })?;

    // The codec walks the table in order, so it must be ascending.
    declared.sort_by_key(|f| f.number);

    let count = declared.len();
    let descriptor_entries = declared.iter().map(|f| {
        let number = f.number;
        let field_name = &f.name;
        let ty = &f.ty;
        quote! {
            ::protolite::FieldDescriptor::new(
                #number,
                #field_name,
                <#ty as ::protolite::ScalarField>::KIND,
            )
        }
    });
    let ref_arms = declared.iter().map(|f| {
        let number = f.number;
        let ident = &f.ident;
        quote! {
            #number => ::core::option::Option::Some(::protolite::ScalarField::as_field_ref(&self.#ident)),
        }
    });
    let mut_arms = declared.iter().map(|f| {
        let number = f.number;
        let ident = &f.ident;
        quote! {
            #number => ::core::option::Option::Some(::protolite::ScalarField::as_field_mut(&mut self.#ident)),
        }
    });

    Ok(quote! {
        impl ::protolite::Message for #name {
            fn descriptor(&self) -> &::protolite::MessageDescriptor {
                static FIELDS: [::protolite::FieldDescriptor; #count] = [
                    #(#descriptor_entries),*
                ];
                static DESCRIPTOR: ::protolite::MessageDescriptor =
                    ::protolite::MessageDescriptor::new(#full_name, &FIELDS);
                &DESCRIPTOR
            }

            fn field(&self, number: u32) -> ::core::option::Option<::protolite::FieldRef<'_>> {
                match number {
                    #(#ref_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(&mut self, number: u32) -> ::core::option::Option<::protolite::FieldMut<'_>> {
                match number {
                    #(#mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn unknown_fields(&self) -> &::protolite::UnknownFieldStore {
                &self.#unknown_ident
            }

            fn unknown_fields_mut(&mut self) -> &mut ::protolite::UnknownFieldStore {
                &mut self.#unknown_ident
            }
        }
    })
}
