//! Parsing of `#[remote_action(...)]` options.

use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Ident, LitStr, Meta, Token, bracketed, parenthesized};

pub(crate) const MARKER: &str = "remote_action";

/// Options of one `#[remote_action]` marker.
#[derive(Debug)]
pub(crate) struct Marker {
    pub(crate) span: Span,
    pub(crate) name: Option<LitStr>,
    pub(crate) parameters: Vec<LitStr>,
}

impl Marker {
    fn empty(span: Span) -> Self {
        Self {
            span,
            name: None,
            parameters: Vec::new(),
        }
    }

    /// Exposed name override, empty when unset.
    pub(crate) fn name_value(&self) -> String {
        self.name.as_ref().map(LitStr::value).unwrap_or_default()
    }

    fn from_attribute(attr: &Attribute) -> syn::Result<Self> {
        match &attr.meta {
            Meta::Path(_) => Ok(Self::empty(attr.span())),
            Meta::List(_) => {
                let options: MarkerOptions = attr.parse_args()?;
                Ok(Self {
                    span: attr.span(),
                    name: options.name,
                    parameters: options.parameters.unwrap_or_default(),
                })
            }
            Meta::NameValue(meta) => Err(syn::Error::new_spanned(
                meta,
                "use #[remote_action(name = \"...\")] to override the exposed name",
            )),
        }
    }
}

/// Removes the marker from `attrs`, returning its options when present.
pub(crate) fn take(attrs: &mut Vec<Attribute>) -> syn::Result<Option<Marker>> {
    let mut markers = Vec::new();
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        if attr.path().is_ident(MARKER) {
            markers.push(attr);
        } else {
            kept.push(attr);
        }
    }
    *attrs = kept;

    let mut found = markers.iter();
    let Some(first) = found.next() else {
        return Ok(None);
    };
    if let Some(repeated) = found.next() {
        return Err(syn::Error::new_spanned(
            repeated,
            "a method may carry at most one #[remote_action] marker",
        ));
    }
    Marker::from_attribute(first).map(Some)
}

#[derive(Default)]
struct MarkerOptions {
    name: Option<LitStr>,
    parameters: Option<Vec<LitStr>>,
}

impl Parse for MarkerOptions {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut options = Self::default();
        if input.peek(LitStr) {
            options.name = Some(input.parse()?);
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            if key == "name" {
                if options.name.is_some() {
                    return Err(syn::Error::new(key.span(), "the name is already set"));
                }
                input.parse::<Token![=]>()?;
                options.name = Some(input.parse()?);
            } else if key == "parameters" {
                if options.parameters.is_some() {
                    return Err(syn::Error::new(key.span(), "`parameters` is already set"));
                }
                options.parameters = Some(parse_parameter_list(input)?);
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown remote_action option `{key}`; expected `name` or `parameters`"),
                ));
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }
        Ok(options)
    }
}

/// Parses `("a", "b")` or `= ["a", "b"]`.
fn parse_parameter_list(input: ParseStream) -> syn::Result<Vec<LitStr>> {
    let content;
    if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        bracketed!(content in input);
    } else {
        parenthesized!(content in input);
    }
    let names = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    Ok(names.into_iter().collect())
}
