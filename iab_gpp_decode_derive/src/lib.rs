use crate::from_bit_reader::derive_struct_from_bit_reader;
use crate::optional_segment_parser::derive_optional_segment_parser;
use crate::struct_attr::{GPPStructHelperAttribute, GPPStructKind};
use proc_macro::TokenStream;
use quote::{quote, TokenStreamExt};
use syn::{parse_macro_input, Attribute, Data, DataStruct, DeriveInput};

mod field_attr;
mod from_bit_reader;
mod optional_segment_parser;
mod struct_attr;

/// Generates a `FromBitReader` implementation reading each field in declaration order.
///
/// Field attributes:
/// - `#[gpp(u2)]`, `#[gpp(u6)]`, `#[gpp(bool)]`... call the matching `BitReader::read_*`
///   method.
/// - `#[gpp(two_bit_field(N))]` calls a `read_*` method with arguments.
/// - no attribute parses a nested `FromBitReader` type.
/// - `#[gpp(optional_segment_type = N)]` fields are not read and start as `None`.
#[proc_macro_derive(FromBitReader, attributes(gpp))]
pub fn derive_from_bit_reader(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    struct_data(&input)
        .and_then(|s| derive_struct_from_bit_reader(s, &input.ident))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Generates everything needed to use a struct as a typed section decoder: `FromBitReader`,
/// `FromStr`, `DecodableSection` and the conversion into `SectionFields`.
///
/// The struct name must match both a `SectionId` and a `SectionFields` variant.
///
/// With `#[gpp(with_optional_segments)]`, the section string is split on '.' into the core
/// segment then optional segments, whose 2-bit type selects the field to fill.
/// `#[gpp(optional_segment_type = N, embedded)]` additionally accepts that segment packed right
/// after the core bits.
#[proc_macro_derive(GPPSection, attributes(gpp))]
pub fn derive_gpp_section(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    derive_section(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn derive_section(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let data = struct_data(input)?;
    let struct_attr = GPPStructHelperAttribute::new(&input.attrs)?;

    let mut stream = quote! {
        impl crate::sections::DecodableSection for #ident {
            const ID: crate::sections::SectionId = crate::sections::SectionId::#ident;

            fn from_fields(fields: &crate::sections::SectionFields) -> Option<&Self> {
                match fields {
                    crate::sections::SectionFields::#ident(s) => Some(s),
                    _ => None,
                }
            }
        }

        impl From<#ident> for crate::sections::SectionFields {
            fn from(s: #ident) -> Self {
                Self::#ident(s)
            }
        }
    };

    let parse_str = match struct_attr.kind {
        GPPStructKind::Base64Data => quote! {
            use crate::sections::Base64EncodedStr;
            s.parse_base64_str()
        },
        GPPStructKind::WithOptionalSegments => quote! {
            use crate::sections::SegmentedStr;
            s.parse_segmented_str()
        },
    };

    stream.append_all(quote! {
        impl std::str::FromStr for #ident {
            type Err = crate::sections::SectionDecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                #parse_str
            }
        }
    });

    stream.append_all(derive_struct_from_bit_reader(data, ident)?);

    if matches!(struct_attr.kind, GPPStructKind::WithOptionalSegments) {
        stream.append_all(derive_optional_segment_parser(data, ident)?);
    }

    Ok(stream)
}

fn struct_data(input: &DeriveInput) -> syn::Result<&DataStruct> {
    match &input.data {
        Data::Struct(s) => Ok(s),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "gpp derives only support structs",
        )),
    }
}

fn find_gpp_attr(attrs: &[Attribute]) -> Option<&Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident("gpp"))
}
