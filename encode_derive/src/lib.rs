extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

/// Derives `bare::Encode`.
///
/// * Structs (named, tuple, or unit) are written field-by-field in
///   declaration order.
/// * Enums whose variants are all unit variants are written as a BARE enum:
///   the varint of the variant's discriminant.
/// * Any other enum is written as a BARE union, whose tag is the index of the
///   variant in declaration order; each variant must be a unit variant (with
///   a `Void` payload) or carry exactly one unnamed field.
#[proc_macro_derive(Encode)]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_encode(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn impl_encode(ast: &syn::DeriveInput) -> syn::Result<TokenStream2> {
    let encode_trait = quote! { ::bare::conv::Encode };
    let target_trait = quote! { ::bare::conv::target::Target };
    let resolve_zero_fn = quote! { ::bare::resolve_zero! };
    let write_uint_fn = quote! { ::bare::varint::write_uint };

    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(::bare::conv::Encode));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &ast.data {
        syn::Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Derive macro `Encode` not implemented for untagged unions",
            ))
        }
        syn::Data::Struct(syn::DataStruct { fields, .. }) => match fields {
            syn::Fields::Unit => quote! { #resolve_zero_fn(buf) },
            syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => {
                let i = (0..unnamed.len()).map(syn::Index::from);
                quote! {
                    #( #encode_trait::write_to(&self.#i, buf) + )* #resolve_zero_fn(buf)
                }
            }
            syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
                let ident = named.iter().filter_map(|field| field.ident.as_ref());
                quote! {
                    #( #encode_trait::write_to(&self.#ident, buf) + )* #resolve_zero_fn(buf)
                }
            }
        },
        syn::Data::Enum(syn::DataEnum { variants, .. }) => {
            if variants.is_empty() {
                return Err(syn::Error::new_spanned(
                    name,
                    "BARE enums and unions must declare at least one variant",
                ));
            }
            if variants
                .iter()
                .all(|v| matches!(v.fields, syn::Fields::Unit))
            {
                let vname = variants.iter().map(|v| &v.ident);
                let vname2 = vname.clone();
                quote! {
                    #write_uint_fn(buf, match self { #( Self::#vname => Self::#vname2 as u64 ),* })
                }
            } else {
                let mut arms = Vec::with_capacity(variants.len());
                for (tag, v) in variants.iter().enumerate() {
                    let vname = &v.ident;
                    let tag = tag as u64;
                    arms.push(match &v.fields {
                        syn::Fields::Unit => quote! {
                            Self::#vname => #write_uint_fn(buf, #tag) + #resolve_zero_fn(buf)
                        },
                        syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. })
                            if unnamed.len() == 1 =>
                        {
                            quote! {
                                Self::#vname(inner) => #write_uint_fn(buf, #tag) + #encode_trait::write_to(inner, buf)
                            }
                        }
                        _ => {
                            return Err(syn::Error::new_spanned(
                                v,
                                "union variants must be unit variants or carry exactly one unnamed field",
                            ))
                        }
                    });
                }
                quote! {
                    match self { #( #arms ),* }
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #encode_trait for #name #ty_generics #where_clause {
            fn write_to<U: #target_trait>(&self, buf: &mut U) -> usize {
                #body
            }
        }
    })
}
