use crate::find_gpp_attr;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::{parenthesized, parse, token, Attribute, Expr, ExprCall, LitInt, Token};

pub enum GPPFieldParser {
    FromBitReader,
    ReaderCall(ExprCall),
}

impl GPPFieldParser {
    /// Expression reading the field, evaluating to a `Result<_, FieldError>` whose field path
    /// starts with `name`.
    pub fn to_token_stream(&self, name: &Ident) -> TokenStream {
        let field = name.to_string();
        match &self {
            GPPFieldParser::FromBitReader => quote! {
                r.parse().map_err(|e: crate::core::FieldError| e.within(#field))
            },
            GPPFieldParser::ReaderCall(c) => quote! {
                r.#c.map_err(|e| crate::core::FieldError::new(#field, e))
            },
        }
    }
}

pub struct GPPFieldHelperAttribute {
    pub optional_segment_type: Option<u8>,
    pub embedded: bool,
    pub parser: GPPFieldParser,
}

impl GPPFieldHelperAttribute {
    pub fn new(attrs: &[Attribute]) -> parse::Result<Self> {
        let mut gpp_attr = Self {
            optional_segment_type: None,
            embedded: false,
            parser: GPPFieldParser::FromBitReader,
        };
        if let Some(attr) = find_gpp_attr(attrs) {
            attr.parse_nested_meta(|meta| {
                // #[gpp(optional_segment_type = N)]
                if meta.path.is_ident("optional_segment_type") {
                    let value = meta.value()?; // parses the `=`
                    let s = value.parse::<LitInt>()?;
                    gpp_attr.optional_segment_type = Some(s.base10_parse()?);
                    return Ok(());
                }

                // #[gpp(embedded)]
                if meta.path.is_ident("embedded") {
                    gpp_attr.embedded = true;
                    return Ok(());
                }

                // #[gpp(PARSER)] where PARSER interpreted as a call like r.read_PARSER
                // if no parenthesis, assume call without args
                if let Some(ident) = meta.path.get_ident() {
                    gpp_attr.parser = Self::get_parser(&meta.input, ident)?;
                    return Ok(());
                }

                Err(meta.error("unrecognized gpp field parameter"))
            })?;

            if gpp_attr.embedded && gpp_attr.optional_segment_type.is_none() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "embedded requires an optional_segment_type",
                ));
            }
        }

        Ok(gpp_attr)
    }

    fn get_parser(input: &ParseStream, ident: &Ident) -> Result<GPPFieldParser, syn::Error> {
        let args = if input.peek(token::Paren) {
            let content;
            parenthesized!(content in input);
            Punctuated::<Expr, Token![,]>::parse_terminated(&content)?
        } else {
            Punctuated::new()
        };

        Ok(GPPFieldParser::ReaderCall(Self::create_read_function_call(
            ident, args,
        )))
    }

    fn create_read_function_call(func_name: &Ident, args: Punctuated<Expr, Token![,]>) -> ExprCall {
        let name = format_ident!("read_{func_name}");
        ExprCall {
            attrs: Vec::new(),
            func: Box::new(Expr::Path(syn::ExprPath {
                attrs: Vec::new(),
                qself: None,
                path: name.into(),
            })),
            paren_token: Default::default(),
            args,
        }
    }
}
