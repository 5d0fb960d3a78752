extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

/// Derives `bare::Decode`, reading the layout written by `#[derive(Encode)]`.
///
/// Unknown enum values and union tags are rejected with
/// `TokenError::InvalidEnumValue` and `TokenError::InvalidUnionTag`
/// respectively.
#[proc_macro_derive(Decode)]
pub fn decode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_decode(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn impl_decode(ast: &syn::DeriveInput) -> syn::Result<TokenStream2> {
    let decode_trait = quote! { ::bare::conv::Decode };
    let parser_trait = quote! { ::bare::parse::Parser };
    let parse_result_type = quote! { ::bare::parse::ParseResult };
    let read_uint_fn = quote! { ::bare::varint::read_uint };
    let token_error = quote! { ::bare::parse::error::TokenError };
    let tag_error = quote! { ::bare::parse::error::TagError };

    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(::bare::conv::Decode));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &ast.data {
        syn::Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Derive macro `Decode` not implemented for untagged unions",
            ))
        }
        syn::Data::Struct(syn::DataStruct { fields, .. }) => match fields {
            syn::Fields::Unit => quote! {
                let _ = p;
                Ok(Self)
            },
            syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => {
                let ty = unnamed.iter().map(|x| &x.ty);
                quote! {
                    Ok(Self(#( <#ty as #decode_trait>::parse(p)? ),*))
                }
            }
            syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
                let (fname, ty): (Vec<&syn::Ident>, Vec<&syn::Type>) = named
                    .iter()
                    .filter_map(|x| x.ident.as_ref().map(|id| (id, &x.ty)))
                    .unzip();
                quote! {
                    Ok(Self { #( #fname: <#ty as #decode_trait>::parse(p)? ),* })
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
                let vname = variants.iter().map(|v| &v.ident).collect::<Vec<_>>();
                quote! {
                    let raw = #read_uint_fn(p)?;
                    #( if raw == Self::#vname as u64 { return Ok(Self::#vname); } )*
                    Err(#token_error::InvalidEnumValue(#tag_error::with_type::<Self>(
                        raw,
                        Some(vec![#( Self::#vname as u64 ),*]),
                    ))
                    .into())
                }
            } else {
                let mut arms = Vec::with_capacity(variants.len());
                for (tag, v) in variants.iter().enumerate() {
                    let vname = &v.ident;
                    let tag = tag as u64;
                    arms.push(match &v.fields {
                        syn::Fields::Unit => quote! { #tag => Ok(Self::#vname) },
                        syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. })
                            if unnamed.len() == 1 =>
                        {
                            let ty = &unnamed[0].ty;
                            quote! { #tag => Ok(Self::#vname(<#ty as #decode_trait>::parse(p)?)) }
                        }
                        _ => {
                            return Err(syn::Error::new_spanned(
                                v,
                                "union variants must be unit variants or carry exactly one unnamed field",
                            ))
                        }
                    });
                }
                let tags = 0..variants.len() as u64;
                quote! {
                    match #read_uint_fn(p)? {
                        #( #arms, )*
                        raw => Err(#token_error::InvalidUnionTag(#tag_error::with_type::<Self>(
                            raw,
                            Some(vec![#( #tags ),*]),
                        ))
                        .into()),
                    }
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics #decode_trait for #name #ty_generics #where_clause {
            fn parse<P: #parser_trait>(p: &mut P) -> #parse_result_type<Self> {
                #body
            }
        }
    })
}
