//! Derive support for `pathwalk` records.
//!
//! See [`Record`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, Ident, LitStr};

static RECORD_ATTRIBUTE_NAME: &str = "record";

/// Derives record property access for a struct with named fields.
///
/// `#[derive(Record)]` implements `pathwalk::node::Node`,
/// `pathwalk::record::Record` and `pathwalk::record::RecordType`. Every
/// named field becomes a property; the traversal engine and the
/// `RecordReader`/`RecordWriter` types reach it by name.
///
/// The type must also implement `Clone` and `Debug`.
///
/// # Field attributes
///
/// - `#[record(skip)]` — the field is not a property at all.
/// - `#[record(rename = "name")]` — the property name to use instead of
///   the field name.
/// - `#[record(readonly)]` — the property can be read but not written.
///
/// # Restrictions
///
/// Only non-generic structs with named fields are supported: the
/// generated descriptor is cached in a `static`, which generic types
/// cannot share soundly, and tuple or unit structs have no property
/// names.
///
/// # Examples
///
/// ```ignore
/// #[derive(Record, Debug, Clone)]
/// struct Employee {
///     name: String,
///     #[record(rename = "address")]
///     home_address: Address,
///     #[record(readonly)]
///     id: u64,
///     #[record(skip)]
///     cached_hash: u64,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

struct RecordField<'a> {
    ident: &'a Ident,
    ty: &'a syn::Type,
    property: String,
    readonly: bool,
}

fn expand_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "#[derive(Record)] does not support generic types",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(Error::new(
            Span::call_site(),
            "#[derive(Record)] only supports structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(Error::new(
            Span::call_site(),
            "#[derive(Record)] only supports structs with named fields",
        ));
    };

    let mut properties = Vec::new();
    for field in &fields.named {
        if let Some(record_field) = parse_field(field)? {
            properties.push(record_field);
        }
    }

    let ident = &input.ident;
    let accessor_fns = properties.iter().map(|p| expand_accessors(ident, p));
    let descriptors = properties.iter().map(expand_descriptor);

    Ok(quote! {
        const _: () = {
            #(#accessor_fns)*

            impl ::pathwalk::record::Record for #ident {
                fn record_descriptor(&self) -> &'static ::pathwalk::record::RecordDescriptor {
                    <#ident as ::pathwalk::record::RecordType>::descriptor()
                }
            }

            impl ::pathwalk::record::RecordType for #ident {
                fn descriptor() -> &'static ::pathwalk::record::RecordDescriptor {
                    static CELL: ::std::sync::OnceLock<::pathwalk::record::RecordDescriptor> =
                        ::std::sync::OnceLock::new();
                    CELL.get_or_init(|| {
                        ::pathwalk::record::RecordDescriptor::new(
                            ::core::any::type_name::<#ident>(),
                            ::core::any::TypeId::of::<#ident>(),
                            ::std::vec![#(#descriptors),*],
                        )
                    })
                }
            }

            impl ::pathwalk::node::Node for #ident {
                fn type_name(&self) -> &'static str {
                    ::core::any::type_name::<#ident>()
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                    self
                }

                fn into_any(
                    self: ::std::boxed::Box<Self>,
                ) -> ::std::boxed::Box<dyn ::core::any::Any> {
                    self
                }

                fn node_ref(&self) -> ::pathwalk::node::NodeRef<'_> {
                    ::pathwalk::node::NodeRef::Record(self)
                }

                fn node_mut(&mut self) -> ::pathwalk::node::NodeMut<'_> {
                    ::pathwalk::node::NodeMut::Record(self)
                }

                fn set(
                    &mut self,
                    value: ::std::boxed::Box<dyn ::pathwalk::node::Node>,
                ) -> ::core::result::Result<(), ::pathwalk::node::SetValueError> {
                    match value.take::<Self>() {
                        Ok(value) => {
                            *self = value;
                            Ok(())
                        }
                        Err(value) => Err(::pathwalk::node::SetValueError::new(
                            ::core::any::type_name::<Self>(),
                            value.type_name(),
                        )),
                    }
                }

                fn clone_node(&self) -> ::std::boxed::Box<dyn ::pathwalk::node::Node> {
                    ::std::boxed::Box::new(::core::clone::Clone::clone(self))
                }

                fn resolve(&self) -> &dyn ::pathwalk::node::Node {
                    self
                }
            }
        };
    })
}

fn parse_field(field: &syn::Field) -> syn::Result<Option<RecordField<'_>>> {
    let ident = field
        .ident
        .as_ref()
        .expect("named fields carry identifiers");
    let mut skip = false;
    let mut readonly = false;
    let mut property = ident.to_string();
    for attr in &field.attrs {
        if !attr.path().is_ident(RECORD_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else if meta.path.is_ident("readonly") {
                readonly = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                property = name.value();
                Ok(())
            } else {
                Err(meta.error("expected `skip`, `readonly` or `rename = \"...\"`"))
            }
        })?;
    }
    if skip {
        return Ok(None);
    }
    Ok(Some(RecordField {
        ident,
        ty: &field.ty,
        property,
        readonly,
    }))
}

fn expand_accessors(ident: &Ident, field: &RecordField<'_>) -> proc_macro2::TokenStream {
    let field_ident = field.ident;
    let get_fn = accessor_ident("get", field_ident);
    let get_mut_fn = accessor_ident("get_mut", field_ident);
    let set_fn = accessor_ident("set", field_ident);
    let setter = (!field.readonly).then(|| {
        quote! {
            fn #set_fn(
                record: &mut dyn ::pathwalk::record::Record,
                value: ::std::boxed::Box<dyn ::pathwalk::node::Node>,
            ) -> ::core::result::Result<(), ::pathwalk::node::SetValueError> {
                match record.as_any_mut().downcast_mut::<#ident>() {
                    Some(record) => {
                        ::pathwalk::node::Node::set(&mut record.#field_ident, value)
                    }
                    None => Err(::pathwalk::node::SetValueError::new(
                        ::core::any::type_name::<#ident>(),
                        value.type_name(),
                    )),
                }
            }
        }
    });
    quote! {
        fn #get_fn(
            record: &dyn ::pathwalk::record::Record,
        ) -> ::core::option::Option<&dyn ::pathwalk::node::Node> {
            record
                .as_any()
                .downcast_ref::<#ident>()
                .map(|record| &record.#field_ident as &dyn ::pathwalk::node::Node)
        }

        fn #get_mut_fn(
            record: &mut dyn ::pathwalk::record::Record,
        ) -> ::core::option::Option<&mut dyn ::pathwalk::node::Node> {
            record
                .as_any_mut()
                .downcast_mut::<#ident>()
                .map(|record| &mut record.#field_ident as &mut dyn ::pathwalk::node::Node)
        }

        #setter
    }
}

fn expand_descriptor(field: &RecordField<'_>) -> proc_macro2::TokenStream {
    let ty = field.ty;
    let property = &field.property;
    let get_fn = accessor_ident("get", field.ident);
    let get_mut_fn = accessor_ident("get_mut", field.ident);
    let set = if field.readonly {
        quote!(::core::option::Option::None)
    } else {
        let set_fn = accessor_ident("set", field.ident);
        quote!(::core::option::Option::Some(#set_fn))
    };
    quote! {
        ::pathwalk::record::PropertyDescriptor {
            name: #property,
            value_type: ::core::any::TypeId::of::<#ty>(),
            value_type_name: ::core::any::type_name::<#ty>(),
            get: #get_fn,
            get_mut: #get_mut_fn,
            set: #set,
        }
    }
}

fn accessor_ident(kind: &str, field: &Ident) -> Ident {
    format_ident!("__record_{kind}_{field}")
}
