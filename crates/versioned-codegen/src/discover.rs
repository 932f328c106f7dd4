//! Discovery and lookup: from Rust source to descriptors
//!
//! Two separable steps feed the generator:
//!
//! ```text
//! syn::File ─[discover]─► Candidate ─[resolve]─► ValueRecordDescriptor
//! ```
//!
//! Discovery walks a parsed file (including inline modules) for structs that
//! carry the marker attribute and collects their inherent `impl` blocks from
//! the same module. Resolution reads the public surface out of a candidate:
//!
//! - every `pub` named field is a readable, writable field member
//! - `pub fn name(&self) -> Ty` is a readable property `name`
//! - `pub fn set_name(&mut self, value: Ty)` is a writable property `name`
//! - `pub fn f(..) -> Self` without a receiver is a constructor `f`
//!
//! Anything else (private items, generic methods, trait impls) is invisible.
//!
//! `Self` in a resolved type is rewritten to the record name, since the same
//! text inside the companion's `impl` would name the companion.

use indexmap::IndexMap;
use quote::ToTokens;
use syn::visit_mut::{self, VisitMut};

use crate::descriptor::{Accessibility, Constructor, Member, Param, Scope, ValueRecordDescriptor};
use crate::error::SourceError;

/// A marked struct plus what lookup needs to describe it.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The marked struct
    pub item: syn::ItemStruct,

    /// Inline modules enclosing the struct, outermost first
    pub scopes: Vec<Scope>,

    /// Inherent impl blocks for the struct in the same module
    pub impls: Vec<syn::ItemImpl>,
}

impl Candidate {
    /// Record name.
    pub fn name(&self) -> String {
        self.item.ident.to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DISCOVERY
// ═══════════════════════════════════════════════════════════════════════

/// Whether `attr` is the marker, written bare (`#[record]`) or qualified
/// (`#[versioned::record]`).
pub fn is_marker(attr: &syn::Attribute, marker: &str) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == marker)
}

/// Find every marked struct in a parsed file, in source order.
pub fn discover(file: &syn::File, marker: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut scopes = Vec::new();
    walk(&file.items, &mut scopes, marker, &mut candidates);
    candidates
}

/// Parse `source` and find every marked struct in it.
pub fn discover_source(source: &str, marker: &str) -> Result<Vec<Candidate>, SourceError> {
    let file = syn::parse_file(source)?;
    Ok(discover(&file, marker))
}

fn walk(items: &[syn::Item], scopes: &mut Vec<Scope>, marker: &str, out: &mut Vec<Candidate>) {
    for item in items {
        match item {
            syn::Item::Struct(item_struct)
                if item_struct.attrs.iter().any(|a| is_marker(a, marker)) =>
            {
                log::debug!("discovered marked record `{}`", item_struct.ident);
                out.push(Candidate {
                    item: item_struct.clone(),
                    scopes: scopes.clone(),
                    impls: inherent_impls(items, &item_struct.ident),
                });
            }
            syn::Item::Mod(item_mod) => {
                // Out-of-line modules (`mod x;`) live in other files.
                if let Some((_, content)) = &item_mod.content {
                    scopes.push(Scope::new(
                        item_mod.ident.to_string(),
                        Accessibility::of(&item_mod.vis),
                    ));
                    walk(content, scopes, marker, out);
                    scopes.pop();
                }
            }
            _ => {}
        }
    }
}

fn inherent_impls(items: &[syn::Item], ident: &syn::Ident) -> Vec<syn::ItemImpl> {
    items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Impl(item_impl)
                if item_impl.trait_.is_none()
                    && item_impl.generics.params.is_empty()
                    && self_type_ident(&item_impl.self_ty) == Some(ident) =>
            {
                Some(item_impl.clone())
            }
            _ => None,
        })
        .collect()
}

fn self_type_ident(ty: &syn::Type) -> Option<&syn::Ident> {
    match ty {
        syn::Type::Path(type_path) if type_path.qself.is_none() => type_path.path.get_ident(),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LOOKUP
// ═══════════════════════════════════════════════════════════════════════

/// Describe a candidate's public surface.
///
/// `namespace` is the module path of the file the candidate came from
/// (usually `crate` or `crate::some::module`).
///
/// # Errors
///
/// Returns `SourceError::Unsupported` for generic records.
pub fn resolve(
    candidate: &Candidate,
    namespace: Option<&str>,
) -> Result<ValueRecordDescriptor, SourceError> {
    let mut descriptor = resolve_struct(&candidate.item)?;
    descriptor.containing_scopes = candidate.scopes.clone();
    descriptor.namespace_path = namespace.map(str::to_string);

    let surface = collect_surface(&candidate.item.ident, &candidate.impls);
    descriptor.members = merge_members(descriptor.members, surface.properties);
    descriptor.constructors = surface.constructors;
    Ok(descriptor)
}

/// Describe a struct on its own: accessibility and public fields.
///
/// # Errors
///
/// Returns `SourceError::Unsupported` for generic records.
pub fn resolve_struct(item: &syn::ItemStruct) -> Result<ValueRecordDescriptor, SourceError> {
    let name = item.ident.to_string();
    if !item.generics.params.is_empty() {
        return Err(SourceError::unsupported(
            name,
            "generic records are not supported",
        ));
    }

    let mut descriptor =
        ValueRecordDescriptor::new(&name).with_accessibility(Accessibility::of(&item.vis));

    if let syn::Fields::Named(fields) = &item.fields {
        for field in &fields.named {
            let Some(ident) = &field.ident else { continue };
            if Accessibility::of(&field.vis).is_public() {
                descriptor
                    .members
                    .push(Member::field(ident.to_string(), type_string(&field.ty, &item.ident)));
            }
        }
    }
    Ok(descriptor)
}

/// Describe the properties and constructors of one inherent impl block.
///
/// The returned descriptor is named after the impl's self type and carries
/// only property members and constructors.
///
/// # Errors
///
/// Returns `SourceError::Unsupported` for trait impls, generic impls, and
/// self types that are not a plain name.
pub fn resolve_impl(item: &syn::ItemImpl) -> Result<ValueRecordDescriptor, SourceError> {
    let self_ty = item.self_ty.to_token_stream().to_string();
    let Some(ident) = self_type_ident(&item.self_ty) else {
        return Err(SourceError::unsupported(
            self_ty,
            "impl target must be a plain struct name",
        ));
    };
    if item.trait_.is_some() {
        return Err(SourceError::unsupported(
            self_ty,
            "only inherent impl blocks can be mirrored",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(SourceError::unsupported(
            self_ty,
            "generic records are not supported",
        ));
    }

    let surface = collect_surface(ident, std::slice::from_ref(item));
    let mut descriptor = ValueRecordDescriptor::new(ident.to_string());
    descriptor.members = surface.properties;
    descriptor.constructors = surface.constructors;
    Ok(descriptor)
}

/// Properties and constructors read out of impl blocks.
struct Surface {
    properties: Vec<Member>,
    constructors: Vec<Constructor>,
}

/// Accessors found so far for one property name.
#[derive(Default)]
struct Accessors {
    getter: Option<String>,
    setter: Option<String>,
}

fn collect_surface(record: &syn::Ident, impls: &[syn::ItemImpl]) -> Surface {
    let mut accessors: IndexMap<String, Accessors> = IndexMap::new();
    let mut constructors = Vec::new();

    let methods = impls.iter().flat_map(|i| &i.items).filter_map(|item| match item {
        syn::ImplItem::Fn(method) if is_plain_public(method) => Some(method),
        _ => None,
    });

    for method in methods {
        let sig = &method.sig;
        let name = sig.ident.to_string();
        match sig.receiver() {
            None => {
                if returns_record(&sig.output, record) {
                    constructors.push(constructor_of(sig, record));
                }
            }
            Some(receiver) if receiver.colon_token.is_some() => {}
            Some(receiver) => {
                if let Some(ty) = getter_type(receiver, sig, record) {
                    let entry = accessors.entry(name).or_default();
                    entry.getter.get_or_insert(ty);
                } else if let Some((property, ty)) = setter_type(receiver, sig, record) {
                    let entry = accessors.entry(property).or_default();
                    entry.setter.get_or_insert(ty);
                }
            }
        }
    }

    let properties = accessors
        .into_iter()
        .map(|(name, found)| match (found.getter, found.setter) {
            (Some(getter), Some(setter)) if getter != setter => {
                log::warn!(
                    "`{record}::set_{name}` takes `{setter}` but `{record}::{name}` returns `{getter}`; mirroring it read-only"
                );
                Member::property(name, getter, true, false)
            }
            (Some(ty), setter) => Member::property(name, ty, true, setter.is_some()),
            (None, Some(ty)) => Member::property(name, ty, false, true),
            (None, None) => unreachable!("entries are created with an accessor"),
        })
        .collect();

    Surface {
        properties,
        constructors,
    }
}

/// Public, non-generic, safe, synchronous.
fn is_plain_public(method: &syn::ImplItemFn) -> bool {
    Accessibility::of(&method.vis).is_public()
        && method.sig.generics.params.is_empty()
        && method.sig.asyncness.is_none()
        && method.sig.unsafety.is_none()
        && method.sig.variadic.is_none()
}

fn returns_record(output: &syn::ReturnType, record: &syn::Ident) -> bool {
    match output {
        syn::ReturnType::Type(_, ty) => {
            self_type_ident(ty).is_some_and(|ident| ident == "Self" || ident == record)
        }
        syn::ReturnType::Default => false,
    }
}

fn constructor_of(sig: &syn::Signature, record: &syn::Ident) -> Constructor {
    let params = sig
        .inputs
        .iter()
        .enumerate()
        .filter_map(|(index, input)| match input {
            syn::FnArg::Typed(pat_type) => {
                let name = match pat_type.pat.as_ref() {
                    syn::Pat::Ident(pat_ident) if pat_ident.subpat.is_none() => {
                        pat_ident.ident.to_string()
                    }
                    _ => format!("arg{}", index),
                };
                Some(Param::new(name, type_string(&pat_type.ty, record)))
            }
            syn::FnArg::Receiver(_) => None,
        })
        .collect();
    Constructor::new(sig.ident.to_string(), params)
}

/// `fn name(&self) -> Ty` or `fn name(self) -> Ty`, with `Ty` not a reference.
fn getter_type(
    receiver: &syn::Receiver,
    sig: &syn::Signature,
    record: &syn::Ident,
) -> Option<String> {
    let shared = match &receiver.reference {
        Some(_) => receiver.mutability.is_none(),
        None => true,
    };
    if !shared || sig.inputs.len() != 1 {
        return None;
    }
    match &sig.output {
        syn::ReturnType::Type(_, ty) if !matches!(ty.as_ref(), syn::Type::Reference(_)) => {
            Some(type_string(ty, record))
        }
        _ => None,
    }
}

/// `fn set_name(&mut self, value: Ty)`, returning the property name and `Ty`.
fn setter_type(
    receiver: &syn::Receiver,
    sig: &syn::Signature,
    record: &syn::Ident,
) -> Option<(String, String)> {
    let name = sig.ident.to_string();
    let property = name.strip_prefix("set_").filter(|p| !p.is_empty())?;
    let exclusive = receiver.reference.is_some() && receiver.mutability.is_some();
    if !exclusive || sig.inputs.len() != 2 || !matches!(sig.output, syn::ReturnType::Default) {
        return None;
    }
    match sig.inputs.iter().nth(1) {
        Some(syn::FnArg::Typed(pat_type)) => {
            Some((property.to_string(), type_string(&pat_type.ty, record)))
        }
        _ => None,
    }
}

/// Fields first; a property never overrides an earlier member of the same name.
fn merge_members(fields: Vec<Member>, properties: Vec<Member>) -> Vec<Member> {
    let mut merged: IndexMap<String, Member> = IndexMap::new();
    for member in fields.into_iter().chain(properties) {
        if merged.contains_key(&member.name) {
            log::debug!("property `{}` shadowed by a public field", member.name);
            continue;
        }
        merged.insert(member.name.clone(), member);
    }
    merged.into_values().collect()
}

/// Render `ty` with every `Self` path rewritten to `record`.
fn type_string(ty: &syn::Type, record: &syn::Ident) -> String {
    let mut ty = ty.clone();
    ReplaceSelf { record }.visit_type_mut(&mut ty);
    ty.to_token_stream().to_string()
}

struct ReplaceSelf<'r> {
    record: &'r syn::Ident,
}

impl VisitMut for ReplaceSelf<'_> {
    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        if path.leading_colon.is_none() {
            if let Some(first) = path.segments.first_mut() {
                if first.ident == "Self" {
                    first.ident = self.record.clone();
                }
            }
        }
        visit_mut::visit_path_mut(self, path);
    }
}
