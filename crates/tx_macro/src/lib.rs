extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, Pat, PatType};

/// Runs an async service method inside a MongoDB transaction.
///
/// The method must take a `session: &mut Session` argument. The original
/// body is moved into a `<name>_no_tx` sibling; the wrapper starts a
/// transaction on the session, commits on `Ok` and aborts on `Err`.
#[proc_macro_attribute]
pub fn tx(_args: TokenStream, input: TokenStream) -> TokenStream {
    let func = parse_macro_input!(input as ItemFn);
    let vis = &func.vis;
    let sig = &func.sig;
    let body = &func.block;

    let inner = format_ident!("{}_no_tx", sig.ident);
    let mut inner_sig = sig.clone();
    inner_sig.ident = inner.clone();

    let forwarded: Vec<_> = sig
        .inputs
        .iter()
        .map(|arg| match arg {
            FnArg::Receiver(_) => quote!(self),
            FnArg::Typed(PatType { pat, .. }) => match pat.as_ref() {
                // Forward by the binding name, dropping any `mut`/`ref`
                // qualifier so the call site is a valid expression.
                Pat::Ident(pat_ident) => {
                    let ident = &pat_ident.ident;
                    quote!(#ident)
                }
                other => quote!(#other),
            },
        })
        .collect();

    let expanded = quote! {
        #vis #inner_sig #body

        #vis #sig {
            session.start_transaction().await?;
            match Self::#inner(#(#forwarded),*).await {
                Ok(value) => {
                    session.commit_transaction().await?;
                    Ok(value)
                }
                Err(err) => {
                    session.abort_transaction().await?;
                    Err(err)
                }
            }
        }
    };

    expanded.into()
}
