use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Path};

use crate::PERSIST_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Candidate

/// A strategy a type asks for. Declaration order is priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Candidate {
    MemberDefined,
    ExternallyRegistered,
    TrivialCopy,
}

impl Candidate {
    /// Name of the matching `StrategySet` flag.
    pub(crate) fn flag(self) -> syn::Ident {
        let name = match self {
            Self::MemberDefined => "MEMBER_DEFINED",
            Self::ExternallyRegistered => "EXTERNALLY_REGISTERED",
            Self::TrivialCopy => "TRIVIAL_COPY",
        };
        syn::Ident::new(name, Span::call_site())
    }
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// `#[persist(...)]` on the type.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub trivial: Option<Span>,
    pub external: Option<Span>,
    pub save: Option<Path>,
    pub load: Option<Path>,
}

fn set_flag(slot: &mut Option<Span>, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(meta.path.require_ident()?.span());
    Ok(())
}

fn set_path(slot: &mut Option<Path>, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(meta.value()?.parse()?);
    Ok(())
}

impl TypeAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs
            .iter()
            .filter(|attr| attr.path().is_ident(PERSIST_ATTRIBUTE_NAME))
        {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("trivial") {
                    set_flag(&mut out.trivial, &meta)
                } else if meta.path.is_ident("external") {
                    set_flag(&mut out.external, &meta)
                } else if meta.path.is_ident("save") {
                    set_path(&mut out.save, &meta)
                } else if meta.path.is_ident("load") {
                    set_path(&mut out.load, &meta)
                } else if meta.path.is_ident("skip") {
                    Err(meta.error("`skip` applies to fields"))
                } else {
                    Err(meta.error(
                        "unknown attribute, expected `trivial`, `external`, `save = ..` or `load = ..`",
                    ))
                }
            })?;
        }

        match (&out.save, &out.load) {
            (Some(path), None) | (None, Some(path)) => Err(syn::Error::new_spanned(
                path,
                "`save` and `load` must be given together",
            )),
            _ => Ok(out),
        }
    }

    /// Requested strategies, highest priority first. A type without
    /// attributes is Member-Defined field by field.
    pub(crate) fn candidates(&self) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        if self.save.is_some() {
            candidates.push(Candidate::MemberDefined);
        }
        if self.external.is_some() {
            candidates.push(Candidate::ExternallyRegistered);
        }
        if self.trivial.is_some() {
            candidates.push(Candidate::TrivialCopy);
        }
        if candidates.is_empty() {
            candidates.push(Candidate::MemberDefined);
        }
        candidates.sort();
        candidates
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// `#[persist(...)]` on a field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub skip: bool,
}

impl FieldAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in attrs
            .iter()
            .filter(|attr| attr.path().is_ident(PERSIST_ATTRIBUTE_NAME))
        {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    if out.skip {
                        return Err(meta.error("duplicate attribute"));
                    }
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown field attribute, expected `skip`"))
                }
            })?;
        }

        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// Tests
