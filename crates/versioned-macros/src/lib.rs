use proc_macro::TokenStream;

mod attr;

/// Generate a version-tracking companion next to a record.
///
/// On a `pub struct`, emits `V_<Name>` with one getter/setter pair per public
/// field and the pass-through constructors. On an inherent `impl` of the
/// record, emits a further `impl V_<Name>` mirroring the properties
/// (`fn x(&self) -> T`, `fn set_x(&mut self, T)`) and constructors found there.
#[proc_macro_attribute]
pub fn versioned(args: TokenStream, input: TokenStream) -> TokenStream {
    attr::versioned(args.into(), input.into()).into()
}

/// Mark a record for build-time generation by `versioned-codegen`.
///
/// Expands to the item unchanged.
#[proc_macro_attribute]
pub fn record(args: TokenStream, input: TokenStream) -> TokenStream {
    attr::record(args.into(), input.into()).into()
}
