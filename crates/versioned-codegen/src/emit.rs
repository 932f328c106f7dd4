//! Companion emission
//!
//! Turns a validated [`ValueRecordDescriptor`] into the tokens of its
//! companion type. Emission is a pure function of the descriptor and the
//! config: member and constructor order follow the descriptor, nothing is
//! sorted or hashed, so the rendered text is byte-identical across runs.
//!
//! For a record `Stock` the companion looks like:
//!
//! ```text
//! pub struct V_Stock<'a> { inner: Versioned<'a, Stock> }
//!
//! impl<'a> V_Stock<'a> {
//!     pub fn from_versioned(inner: Versioned<'a, Stock>) -> Self   // pass-through
//!     pub fn adopt(storage: &'a mut Stock) -> Self                 // pass-through
//!     pub fn from_value(value: Stock) -> Self                      // self-allocating
//!     pub fn version(&self) -> u64
//!     pub fn quantity(&self) -> i32                                // peek().quantity
//!     pub fn set_quantity(&mut self, value: i32)                   // update(..)
//!     pub fn new(quantity: i32, unit_weight: i32) -> Self          // self-allocating
//! }
//! ```

use std::collections::HashSet;

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

use crate::config::GeneratorConfig;
use crate::descriptor::{Constructor, Member, MemberKind, ValueRecordDescriptor};
use crate::error::{Result, ValidationFailure};

/// Methods every companion carries regardless of the record.
const RESERVED: &[&str] = &[
    "from_versioned",
    "adopt",
    "from_value",
    "version",
    "owns_storage",
    "versioned",
];

/// Rendered source of one companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Name of the record the companion mirrors
    pub record: String,

    /// Fully qualified path of the record
    pub path: String,

    /// Name of the companion type
    pub companion: String,

    /// Name of the generated module (also the file stem)
    pub module: String,

    /// Rendered Rust source of the module body
    pub source: String,
}

impl GeneratedSource {
    /// File name the unit is written to.
    pub fn file_name(&self) -> String {
        format!("{}.rs", self.module)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════

/// Generate a companion with the default configuration.
///
/// # Errors
///
/// - `InaccessibleType` if the record or an enclosing scope is not `pub`
/// - `InvalidDescriptor` if types or names do not parse, or emitted
///   method names would collide
///
/// # Example
///
/// ```
/// use versioned_codegen::{generate, Member, ValueRecordDescriptor};
///
/// let desc = ValueRecordDescriptor::new("Stock")
///     .with_namespace("crate::inventory")
///     .with_member(Member::field("quantity", "i32"));
///
/// let unit = generate(&desc).unwrap();
/// assert_eq!(unit.companion, "V_Stock");
/// assert_eq!(unit.file_name(), "v_stock.rs");
/// assert_eq!(unit, generate(&desc).unwrap());
/// ```
pub fn generate(descriptor: &ValueRecordDescriptor) -> Result<GeneratedSource> {
    generate_with(descriptor, &GeneratorConfig::default())
}

/// Generate a standalone companion unit for the batch path.
///
/// The unit imports the record under its own name plus a glob of the
/// record's module, then declares the companion.
pub fn generate_with(
    descriptor: &ValueRecordDescriptor,
    config: &GeneratorConfig,
) -> Result<GeneratedSource> {
    validate(descriptor, config)?;

    let module_path = module_path(descriptor)?;
    let record = ident(&descriptor.name, &descriptor.name)?;
    let companion = emit_companion(descriptor, config)?;

    let tokens = quote! {
        use #module_path::#record;
        #[allow(unused_imports)]
        use #module_path::*;

        #companion
    };

    let companion_name = config.companion_name(&descriptor.name);
    let source = format!(
        "// @generated by versioned-codegen from `{}`. Do not edit.\n\n{}\n",
        descriptor.qualified_path(),
        tokens
    );
    log::debug!("generated {} for {}", companion_name, descriptor.qualified_path());

    Ok(GeneratedSource {
        record: descriptor.name.clone(),
        path: descriptor.qualified_path(),
        module: snake_case(&companion_name),
        companion: companion_name,
        source,
    })
}

/// Check a descriptor without emitting anything.
///
/// Accessibility is checked first: an inaccessible record is reported as
/// such even if its descriptor has other problems.
pub fn validate(descriptor: &ValueRecordDescriptor, config: &GeneratorConfig) -> Result<()> {
    if let Some(blocker) = descriptor.first_inaccessible() {
        log::debug!(
            "`{}` is hidden behind non-public `{}`",
            descriptor.name,
            blocker
        );
        return Err(ValidationFailure::InaccessibleType {
            subject: descriptor.name.clone(),
        });
    }
    check_consistency(descriptor, config)
}

/// Emit the companion struct and its full impl block.
///
/// The record is referred to by its bare name, so it must be in scope where
/// the tokens land (same module for the attribute macro, imported for the
/// batch path).
pub fn emit_companion(
    descriptor: &ValueRecordDescriptor,
    config: &GeneratorConfig,
) -> Result<TokenStream> {
    check_consistency(descriptor, config)?;

    let runtime = &config.runtime;
    let record = ident(&descriptor.name, &descriptor.name)?;
    let companion = format_ident!("{}", config.companion_name(&descriptor.name));
    let body = emit_surface(descriptor)?;

    let struct_doc = format!(
        "Version-tracking companion of [`{}`]. Every setter counts as one update.",
        descriptor.name
    );

    Ok(quote! {
        #[doc = #struct_doc]
        #[allow(non_camel_case_types)]
        pub struct #companion<'a> {
            inner: #runtime::Versioned<'a, #record>,
        }

        #[allow(dead_code)]
        impl<'a> #companion<'a> {
            /// Wrap an existing versioned binding.
            pub fn from_versioned(inner: #runtime::Versioned<'a, #record>) -> Self {
                Self { inner }
            }

            /// Adopt caller-owned storage. The companion never releases it.
            pub fn adopt(storage: &'a mut #record) -> Self {
                Self {
                    inner: #runtime::Versioned::bind(storage),
                }
            }

            /// Move `value` into storage owned by the companion.
            pub fn from_value(value: #record) -> Self {
                Self {
                    inner: #runtime::Versioned::owned(value),
                }
            }

            /// Number of updates made through this companion.
            pub fn version(&self) -> u64 {
                self.inner.version()
            }

            /// Whether this companion allocated its storage.
            pub fn owns_storage(&self) -> bool {
                self.inner.owns_storage()
            }

            /// The underlying versioned binding.
            pub fn versioned(&self) -> &#runtime::Versioned<'a, #record> {
                &self.inner
            }

            #body
        }
    })
}

/// Emit an extra impl block carrying members and constructors only.
///
/// Used when the companion struct already exists and a further `impl` of
/// the record contributes properties or constructors.
pub fn emit_extension(
    descriptor: &ValueRecordDescriptor,
    config: &GeneratorConfig,
) -> Result<TokenStream> {
    check_consistency(descriptor, config)?;

    let companion = format_ident!("{}", config.companion_name(&descriptor.name));
    let body = emit_surface(descriptor)?;

    Ok(quote! {
        #[allow(dead_code)]
        impl<'a> #companion<'a> {
            #body
        }
    })
}

// ═══════════════════════════════════════════════════════════════════════
// MEMBERS AND CONSTRUCTORS
// ═══════════════════════════════════════════════════════════════════════

fn emit_surface(descriptor: &ValueRecordDescriptor) -> Result<TokenStream> {
    let members = descriptor
        .members
        .iter()
        .map(|m| emit_member(m, &descriptor.name))
        .collect::<Result<Vec<_>>>()?;
    let constructors = descriptor
        .constructors
        .iter()
        .map(|c| emit_constructor(c, &descriptor.name))
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        #(#members)*
        #(#constructors)*
    })
}

fn emit_member(member: &Member, record: &str) -> Result<TokenStream> {
    let name = ident(&member.name, record)?;
    let ty = parse_type(&member.ty, record)?;
    let set_name = ident(&member.setter_name(), record)?;

    let read = match member.kind {
        MemberKind::Field => quote! { self.inner.peek().#name },
        MemberKind::Property => quote! { self.inner.peek().#name() },
    };
    let write = match member.kind {
        MemberKind::Field => quote! { record.#name = value },
        MemberKind::Property => quote! { record.#set_name(value) },
    };

    let getter = member.readable.then(|| {
        let doc = format!("Current `{}`.", member.name);
        quote! {
            #[doc = #doc]
            pub fn #name(&self) -> #ty {
                #read
            }
        }
    });
    let setter = member.writable.then(|| {
        let doc = format!("Set `{}`, counting one update.", member.name);
        quote! {
            #[doc = #doc]
            pub fn #set_name(&mut self, value: #ty) {
                self.inner.update(move |record| {
                    #write;
                });
            }
        }
    });

    Ok(quote! {
        #getter
        #setter
    })
}

fn emit_constructor(constructor: &Constructor, record: &str) -> Result<TokenStream> {
    let record_ident = ident(record, record)?;
    let name = ident(&constructor.name, record)?;
    let names = constructor
        .params
        .iter()
        .map(|p| ident(&p.name, record))
        .collect::<Result<Vec<_>>>()?;
    let types = constructor
        .params
        .iter()
        .map(|p| parse_type(&p.ty, record))
        .collect::<Result<Vec<_>>>()?;

    let doc = format!(
        "Build through [`{}::{}`] into storage owned by the companion.",
        record, constructor.name
    );

    Ok(quote! {
        #[doc = #doc]
        pub fn #name(#(#names: #types),*) -> Self {
            Self::from_value(#record_ident::#name(#(#names),*))
        }
    })
}

// ═══════════════════════════════════════════════════════════════════════
// CHECKS AND HELPERS
// ═══════════════════════════════════════════════════════════════════════

/// Everything parses and no two emitted methods share a name.
fn check_consistency(descriptor: &ValueRecordDescriptor, config: &GeneratorConfig) -> Result<()> {
    let subject = &descriptor.name;
    ident(subject, subject)?;
    let companion = ident(&config.companion_name(subject), subject)?;
    ident(&snake_case(&companion.to_string()), subject)?;

    let mut seen: HashSet<String> = RESERVED.iter().map(|s| s.to_string()).collect();
    let mut claim = |name: String| {
        if seen.insert(name.clone()) {
            Ok(())
        } else {
            Err(ValidationFailure::invalid(
                subject,
                format!("more than one companion method would be named `{}`", name),
            ))
        }
    };

    for member in &descriptor.members {
        parse_type(&member.ty, subject)?;
        let name = ident(&member.name, subject)?.to_string();
        if member.readable {
            claim(name.trim_start_matches("r#").to_string())?;
        }
        if member.writable {
            claim(member.setter_name())?;
        }
    }
    for constructor in &descriptor.constructors {
        let name = ident(&constructor.name, subject)?.to_string();
        claim(name.trim_start_matches("r#").to_string())?;
        for param in &constructor.params {
            ident(&param.name, subject)?;
            parse_type(&param.ty, subject)?;
        }
    }
    Ok(())
}

fn ident(name: &str, subject: &str) -> Result<Ident> {
    syn::parse_str::<Ident>(name).map_err(|_| {
        ValidationFailure::invalid(subject, format!("`{}` is not a valid identifier", name))
    })
}

fn parse_type(ty: &str, subject: &str) -> Result<syn::Type> {
    syn::parse_str::<syn::Type>(ty)
        .map_err(|_| ValidationFailure::invalid(subject, format!("`{}` is not a valid type", ty)))
}

/// Path of the module holding the record, rooted at `crate` when relative.
fn module_path(descriptor: &ValueRecordDescriptor) -> Result<syn::Path> {
    let mut segments = descriptor.module_segments();
    let rooted = matches!(segments.first(), Some(&("crate" | "self" | "super")));
    if !rooted {
        segments.insert(0, "crate");
    }
    let path = segments.join("::");
    syn::parse_str::<syn::Path>(&path).map_err(|_| {
        ValidationFailure::invalid(
            &descriptor.name,
            format!("`{}` is not a valid module path", path),
        )
    })
}

/// `V_Stock` → `v_stock`, `HTTPRequest` → `http_request`.
pub(crate) fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary =
                prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Accessibility, Param, Scope};

    fn stock() -> ValueRecordDescriptor {
        ValueRecordDescriptor::new("Stock")
            .with_namespace("crate::inventory")
            .with_member(Member::field("quantity", "i32"))
            .with_member(Member::field("unit_weight", "i32"))
            .with_member(Member::property("total_weight", "i32", true, false))
            .with_constructor(Constructor::new(
                "new",
                vec![Param::new("quantity", "i32"), Param::new("unit_weight", "i32")],
            ))
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("V_Stock"), "v_stock");
        assert_eq!(snake_case("TotalWeight"), "total_weight");
        assert_eq!(snake_case("HTTPRequest"), "http_request");
        assert_eq!(snake_case("V_Point3D"), "v_point3_d");
    }

    #[test]
    fn test_generate_names() {
        let unit = generate(&stock()).unwrap();
        assert_eq!(unit.record, "Stock");
        assert_eq!(unit.companion, "V_Stock");
        assert_eq!(unit.module, "v_stock");
        assert!(unit
            .source
            .starts_with("// @generated by versioned-codegen from `crate::inventory::Stock`"));
    }

    #[test]
    fn test_generated_source_parses() {
        let unit = generate(&stock()).unwrap();
        assert!(syn::parse_file(&unit.source).is_ok());
    }

    #[test]
    fn test_internal_record_fails() {
        let desc = stock().with_accessibility(Accessibility::Internal);
        let err = generate(&desc).unwrap_err();
        assert_eq!(
            err,
            ValidationFailure::InaccessibleType {
                subject: "Stock".to_string()
            }
        );
    }

    #[test]
    fn test_private_scope_fails_with_record_as_subject() {
        let desc = stock().with_scope(Scope::new("hidden", Accessibility::Private));
        let err = generate(&desc).unwrap_err();
        assert_eq!(err.subject(), "Stock");
    }

    #[test]
    fn test_version_member_collides() {
        let desc = stock().with_member(Member::field("version", "u64"));
        let err = generate(&desc).unwrap_err();
        assert!(matches!(err, ValidationFailure::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_constructor_colliding_with_getter() {
        let desc = stock().with_constructor(Constructor::new("quantity", vec![]));
        assert!(generate(&desc).is_err());
    }

    #[test]
    fn test_bad_type_is_invalid() {
        let desc = stock().with_member(Member::field("broken", "Vec<"));
        let err = generate(&desc).unwrap_err();
        assert!(err.to_string().contains("`Vec<` is not a valid type"));
    }

    #[test]
    fn test_keyword_module_name_is_invalid() {
        let config = GeneratorConfig::new().with_prefix("");
        let desc = ValueRecordDescriptor::new("Type").with_member(Member::field("x", "u8"));
        let err = generate_with(&desc, &config).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::InvalidDescriptor);
        assert!(err.to_string().contains("`type` is not a valid identifier"));
    }

    #[test]
    fn test_module_path_defaults_to_crate_root() {
        let desc = ValueRecordDescriptor::new("Stock");
        let path = module_path(&desc).unwrap();
        assert!(path.is_ident("crate"));
    }

    #[test]
    fn test_extension_has_no_struct() {
        let desc = ValueRecordDescriptor::new("Stock")
            .with_member(Member::property("total_weight", "i32", true, false));
        let tokens = emit_extension(&desc, &GeneratorConfig::default()).unwrap();
        let file: syn::File = syn::parse2(tokens).unwrap();
        assert_eq!(file.items.len(), 1);
        assert!(matches!(file.items[0], syn::Item::Impl(_)));
    }
}
