//! Test attribute shared by the `rxcore` test suites.
//!
//! `#[rxcore_macro::test]` expands to `#[test]` for synchronous bodies and to
//! `#[tokio::test]` for `async fn` bodies. Async tests may pick a runtime
//! flavor: `local` (current thread) or `shared` (multi thread).

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

const USAGE: &str = "rxcore_macro::test only accepts: #[rxcore_macro::test], \
                     #[rxcore_macro::test(local)] or #[rxcore_macro::test(shared)]";

fn flavor(name: &str, span: proc_macro2::Span) -> syn::Result<proc_macro2::TokenStream> {
  match name {
    "local" => Ok(quote!(flavor = "current_thread")),
    "shared" => Ok(quote!(flavor = "multi_thread")),
    _ => Err(syn::Error::new(span, USAGE)),
  }
}

fn tokio_args(raw: proc_macro2::TokenStream, is_async: bool) -> syn::Result<proc_macro2::TokenStream> {
  if raw.is_empty() {
    return Ok(proc_macro2::TokenStream::new());
  }
  if !is_async {
    return Err(syn::Error::new(
      raw.span(),
      "flavor arguments are only supported on async tests",
    ));
  }
  if let Ok(ident) = syn::parse2::<Ident>(raw.clone()) {
    flavor(&ident.to_string(), ident.span())
  } else if let Ok(lit) = syn::parse2::<LitStr>(raw.clone()) {
    flavor(&lit.value(), lit.span())
  } else {
    Err(syn::Error::new(raw.span(), USAGE))
  }
}

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);
  let is_async = input.sig.asyncness.is_some();

  let args = match tokio_args(proc_macro2::TokenStream::from(attr), is_async) {
    Ok(args) => args,
    Err(err) => return err.to_compile_error().into(),
  };

  let wasm_attr = if is_async {
    quote!(wasm_bindgen_test::wasm_bindgen_test(async))
  } else {
    quote!(wasm_bindgen_test::wasm_bindgen_test)
  };
  let native_attr = if is_async { quote!(tokio::test(#args)) } else { quote!(test) };

  let expanded = quote! {
      #[cfg_attr(target_arch = "wasm32", #wasm_attr)]
      #[cfg_attr(not(target_arch = "wasm32"), #native_attr)]
      #input
  };

  TokenStream::from(expanded)
}
