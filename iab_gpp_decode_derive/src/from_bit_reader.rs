use crate::field_attr::GPPFieldHelperAttribute;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::DataStruct;

pub fn derive_struct_from_bit_reader(input: &DataStruct, ident: &Ident) -> syn::Result<TokenStream> {
    // generate FromBitReader impl block
    // # loop over all fields
    // - by default call a FromBitReader implementation
    // - use BitReader methods if specified
    // - every failure is tagged with the name of the field
    let mut parse_statements = vec![];
    let mut field_names = vec![];

    for field in &input.fields {
        let Some(name) = &field.ident else {
            return Err(syn::Error::new_spanned(
                field,
                "tuple structs are not supported",
            ));
        };
        field_names.push(name);

        let attr = GPPFieldHelperAttribute::new(&field.attrs)?;

        // optional segments are parsed separately
        if attr.optional_segment_type.is_some() {
            parse_statements.push(quote! {
                let #name = None;
            });
        } else {
            let expr = attr.parser.to_token_stream(name);
            parse_statements.push(quote! {
                let #name = #expr?;
            });
        }
    }

    Ok(quote! {
        impl crate::core::FromBitReader for #ident {
            fn from_bit_reader(r: &mut crate::core::BitReader) -> Result<Self, crate::core::FieldError> {
                #(#parse_statements)*

                Ok(Self {
                    #(#field_names),*
                })
            }
        }
    })
}
