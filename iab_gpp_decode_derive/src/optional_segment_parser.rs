use crate::field_attr::GPPFieldHelperAttribute;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::DataStruct;

pub fn derive_optional_segment_parser(input: &DataStruct, ident: &Ident) -> syn::Result<TokenStream> {
    let mut parse_match_arms = vec![];
    let mut trailing_segment = None;

    for field in &input.fields {
        let Some(name) = &field.ident else {
            continue;
        };

        let attr = GPPFieldHelperAttribute::new(&field.attrs)?;

        let Some(segment_type) = attr.optional_segment_type else {
            continue;
        };

        let expr = attr.parser.to_token_stream(name);
        parse_match_arms.push(quote! {
            #segment_type => {
                into.#name = Some(#expr?);
            }
        });

        if attr.embedded {
            if trailing_segment.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one segment can be embedded",
                ));
            }

            trailing_segment = Some(quote! {
                fn parse_trailing_segment(r: &mut crate::core::BitReader, into: &mut Self) {
                    if Self::read_segment_type(r).ok() != Some(#segment_type) {
                        return;
                    }
                    match r.parse() {
                        Ok(segment) => into.#name = Some(segment),
                        Err(e) => log::debug!(
                            "ignoring embedded segment of type {} after the core: {e}",
                            #segment_type
                        ),
                    }
                }
            });
        }
    }

    Ok(quote! {
        impl crate::sections::OptionalSegmentParser for #ident {
            fn parse_optional_segment(
                segment_type: u8,
                r: &mut crate::core::BitReader,
                into: &mut Self,
            ) -> Result<(), crate::sections::SectionDecodeError> {
                match segment_type {
                    #(#parse_match_arms)*
                    n => {
                        return Err(crate::sections::SectionDecodeError::UnknownSegmentType { segment_type: n });
                    }
                }
                Ok(())
            }

            #trailing_segment
        }
    })
}
