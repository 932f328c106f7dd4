use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Item, Result};
use versioned_codegen::{discover, emit_companion, emit_extension, validate, GeneratorConfig};

pub fn versioned(args: TokenStream, input: TokenStream) -> TokenStream {
    match expand(args, input.clone()) {
        Ok(output) => output,
        // Keep the original item so the error is the only one reported.
        Err(err) => {
            let err = err.to_compile_error();
            quote! {
                #input
                #err
            }
        }
    }
}

pub fn record(args: TokenStream, input: TokenStream) -> TokenStream {
    if args.is_empty() {
        input
    } else {
        let err = Error::new_spanned(args, "#[record] takes no arguments").to_compile_error();
        quote! {
            #input
            #err
        }
    }
}

fn expand(args: TokenStream, input: TokenStream) -> Result<TokenStream> {
    if !args.is_empty() {
        return Err(Error::new_spanned(args, "#[versioned] takes no arguments"));
    }

    let item: Item = syn::parse2(input)?;
    let config = GeneratorConfig::default();

    let generated = match &item {
        Item::Struct(item_struct) => {
            let span = &item_struct.ident;
            let descriptor =
                discover::resolve_struct(item_struct).map_err(|e| Error::new_spanned(span, e))?;
            validate(&descriptor, &config).map_err(|f| Error::new_spanned(span, f))?;
            emit_companion(&descriptor, &config).map_err(|f| Error::new_spanned(span, f))?
        }
        Item::Impl(item_impl) => {
            let span = &item_impl.self_ty;
            let descriptor =
                discover::resolve_impl(item_impl).map_err(|e| Error::new_spanned(span, e))?;
            emit_extension(&descriptor, &config).map_err(|f| Error::new_spanned(span, f))?
        }
        other => {
            return Err(Error::new_spanned(
                other,
                "#[versioned] applies to structs and their inherent impl blocks",
            ))
        }
    };

    Ok(quote! {
        #item
        #generated
    })
}
