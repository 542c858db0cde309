//! Expansion of `#[remote_service]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, Pat, Receiver, Type};

use crate::marker::{self, Marker};

/// One marked method, validated and ready for code generation.
struct Action {
    method: syn::Ident,
    declared: String,
    takes_self: bool,
    arg_types: Vec<Type>,
    marker: Marker,
}

impl Action {
    fn from_method(method: &ImplItemFn, marker: Marker) -> syn::Result<Self> {
        let sig = &method.sig;
        if let Some(token) = &sig.asyncness {
            return Err(syn::Error::new_spanned(
                token,
                "remote actions must be synchronous methods",
            ));
        }
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "remote actions cannot be generic",
            ));
        }

        let mut takes_self = false;
        let mut arg_types = Vec::with_capacity(sig.inputs.len());
        for input in &sig.inputs {
            match input {
                FnArg::Receiver(receiver) => {
                    check_receiver(receiver)?;
                    takes_self = true;
                }
                FnArg::Typed(typed) => {
                    if !matches!(*typed.pat, Pat::Ident(_) | Pat::Wild(_)) {
                        return Err(syn::Error::new_spanned(
                            &typed.pat,
                            "remote action arguments must be plain identifiers",
                        ));
                    }
                    check_argument_type(&typed.ty)?;
                    arg_types.push((*typed.ty).clone());
                }
            }
        }

        if !marker.parameters.is_empty() && marker.parameters.len() != arg_types.len() {
            return Err(syn::Error::new(
                marker.span,
                format!(
                    "`parameters` lists {} name(s) but `{}` takes {} argument(s)",
                    marker.parameters.len(),
                    sig.ident,
                    arg_types.len()
                ),
            ));
        }

        Ok(Self {
            method: sig.ident.clone(),
            declared: sig.ident.unraw().to_string(),
            takes_self,
            arg_types,
            marker,
        })
    }

    fn definition(&self, self_ty: &Type) -> TokenStream {
        let method = &self.method;
        let declared = &self.declared;
        let name = self.marker.name_value();
        let parameters = &self.marker.parameters;
        let types = &self.arg_types;
        let args: Vec<syn::Ident> = (0..types.len())
            .map(|index| format_ident!("__remote_arg{index}"))
            .collect();

        let (capture, call) = if self.takes_self {
            (
                quote! { let __remote_service = ::std::sync::Arc::clone(&self); },
                quote! { __remote_service.#method(#(#args),*) },
            )
        } else {
            (quote! {}, quote! { <#self_ty>::#method(#(#args),*) })
        };

        quote! {
            {
                #capture
                ::remote_action::ActionDefinition::new(
                    #declared,
                    move |#(#args: #types),*| #call,
                )
                .with_marker(::remote_action::RemoteAction::declare(#name, &[#(#parameters),*]))
            }
        }
    }
}

fn check_receiver(receiver: &Receiver) -> syn::Result<()> {
    let shared_reference = receiver.reference.is_some()
        && receiver.mutability.is_none()
        && receiver.colon_token.is_none();
    if shared_reference {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            receiver,
            "remote actions take `&self`; keep mutable state behind interior mutability",
        ))
    }
}

fn check_argument_type(ty: &Type) -> syn::Result<()> {
    match ty {
        Type::Reference(_) => Err(syn::Error::new_spanned(
            ty,
            "remote action arguments must be owned types",
        )),
        Type::ImplTrait(_) => Err(syn::Error::new_spanned(
            ty,
            "remote action arguments cannot use `impl Trait`",
        )),
        _ => Ok(()),
    }
}

pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    if !attr.is_empty() {
        return Err(syn::Error::new_spanned(
            attr,
            "#[remote_service] does not take arguments",
        ));
    }
    let mut block: ItemImpl = syn::parse2(item)?;
    if let Some((_, path, _)) = &block.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[remote_service] applies to inherent impl blocks only",
        ));
    }
    if !block.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &block.generics,
            "#[remote_service] does not support generic impl blocks",
        ));
    }

    let mut actions = Vec::new();
    for item in &mut block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        if let Some(marker) = marker::take(&mut method.attrs)? {
            actions.push(Action::from_method(method, marker)?);
        }
    }

    let self_ty = &block.self_ty;
    let definitions = actions.iter().map(|action| action.definition(self_ty));
    Ok(quote! {
        #block

        impl ::remote_action::RemoteService for #self_ty {
            fn remote_actions(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::vec::Vec<::remote_action::ActionDefinition> {
                ::std::vec![#(#definitions),*]
            }
        }
    })
}
