//! Name to declaration table shared by every resolution step

use crate::generation::types::{Declaration, ScalarKind, TypeRef, TypeRepr};
use crate::infrastructure::openapi::Schema;
use std::collections::BTreeMap;

/// What the registry knows about one declared name
#[derive(Debug, Clone, Default)]
pub struct RegistryEntry {
    /// Schema the name was first claimed for; `None` for synthesized types
    pub origin: Option<Schema>,
    /// Scalar the declaration ultimately wraps, if it wraps one
    pub scalar: Option<ScalarKind>,
    /// Type an alias points at
    pub alias_of: Option<TypeRef>,
}

/// Outcome of claiming a declaration name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Name was free and now belongs to the caller, who must emit the declaration
    Fresh,
    /// Name was already declared for an identical schema
    Existing,
    /// Name was already declared for a different schema; the first one wins
    Collision,
}

/// Memo table of declared names
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for a declaration built from `origin`
    ///
    /// Only schema-backed claims can be memoized: a synthesized claim
    /// (`origin` of `None`) on a taken name is always a collision.
    pub fn claim(&mut self, name: &str, origin: Option<&Schema>) -> Claim {
        match self.entries.get(name) {
            None => {
                self.entries.insert(
                    name.to_string(),
                    RegistryEntry {
                        origin: origin.cloned(),
                        ..RegistryEntry::default()
                    },
                );
                Claim::Fresh
            }
            Some(entry) if origin.is_some() && entry.origin.as_ref() == origin => Claim::Existing,
            Some(_) => Claim::Collision,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Record what a freshly built declaration wraps
    pub fn record(&mut self, declaration: &Declaration) {
        let Some(entry) = self.entries.get_mut(declaration.name()) else {
            return;
        };
        match declaration {
            Declaration::Enum(decl) => entry.scalar = Some(decl.scalar),
            Declaration::Type(decl) => {
                if let TypeRepr::Alias(target) = &decl.repr {
                    if let TypeRef::Scalar(kind) = target {
                        entry.scalar = Some(*kind);
                    }
                    entry.alias_of = Some(target.clone());
                }
            }
            Declaration::Sum(_) | Declaration::QueryEncoder(_) => {}
        }
    }

    /// Underlying scalar of a named type, following alias chains
    pub fn underlying_scalar(&self, name: &str) -> Option<ScalarKind> {
        let mut current = name;
        // alias chains are short; the bound only guards against alias cycles
        for _ in 0..self.entries.len() {
            let entry = self.entries.get(current)?;
            if let Some(kind) = entry.scalar {
                return Some(kind);
            }
            match &entry.alias_of {
                Some(TypeRef::Named(next)) => current = next,
                _ => return None,
            }
        }
        None
    }

    /// Follows `Named` aliases to the type they finally stand for
    ///
    /// Enums, structs, maps and unknown names resolve to themselves.
    pub fn resolve_alias<'r>(&'r self, type_ref: &'r TypeRef) -> TypeRef {
        let mut current = type_ref;
        for _ in 0..=self.entries.len() {
            let TypeRef::Named(name) = current else {
                return current.clone();
            };
            match self.entries.get(name).and_then(|entry| entry.alias_of.as_ref()) {
                Some(target) => current = target,
                None => return current.clone(),
            }
        }
        type_ref.clone()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::types::{EnumDeclaration, TypeDeclaration};

    fn string_schema() -> Schema {
        serde_json::from_value(serde_json::json!({ "type": "string" })).unwrap()
    }

    #[test]
    fn test_claim_memoizes_identical_schema() {
        let mut registry = Registry::new();
        let schema = string_schema();

        assert_eq!(registry.claim("Name", Some(&schema)), Claim::Fresh);
        assert_eq!(registry.claim("Name", Some(&schema)), Claim::Existing);
        assert_eq!(registry.claim("Name", None), Claim::Collision);
    }

    #[test]
    fn test_synthesized_names_never_memoize() {
        let mut registry = Registry::new();

        assert_eq!(registry.claim("ListParams", None), Claim::Fresh);
        assert_eq!(registry.claim("ListParams", None), Claim::Collision);
        assert_eq!(registry.claim("ListParams", Some(&string_schema())), Claim::Collision);
    }

    #[test]
    fn test_underlying_scalar_follows_aliases() {
        let mut registry = Registry::new();
        registry.claim("Status", None);
        registry.claim("OrderStatus", None);
        registry.claim("Id", None);

        registry.record(&Declaration::Enum(EnumDeclaration {
            name: "Status".to_string(),
            scalar: ScalarKind::String,
            variants: Vec::new(),
            documentation: None,
        }));
        registry.record(&Declaration::Type(TypeDeclaration::new(
            "OrderStatus",
            TypeRepr::Alias(TypeRef::named("Status")),
        )));
        registry.record(&Declaration::Type(TypeDeclaration::new(
            "Id",
            TypeRepr::Alias(TypeRef::Scalar(ScalarKind::Int64)),
        )));

        assert_eq!(registry.underlying_scalar("Status"), Some(ScalarKind::String));
        assert_eq!(registry.underlying_scalar("OrderStatus"), Some(ScalarKind::String));
        assert_eq!(registry.underlying_scalar("Id"), Some(ScalarKind::Int64));
        assert_eq!(registry.underlying_scalar("Missing"), None);
    }

    #[test]
    fn test_underlying_scalar_alias_cycle() {
        let mut registry = Registry::new();
        registry.claim("A", None);
        registry.claim("B", None);
        registry.record(&Declaration::Type(TypeDeclaration::new(
            "A",
            TypeRepr::Alias(TypeRef::named("B")),
        )));
        registry.record(&Declaration::Type(TypeDeclaration::new(
            "B",
            TypeRepr::Alias(TypeRef::named("A")),
        )));

        assert_eq!(registry.underlying_scalar("A"), None);
        assert_eq!(registry.resolve_alias(&TypeRef::named("A")), TypeRef::named("A"));
    }

    #[test]
    fn test_resolve_alias_reaches_final_type() {
        let mut registry = Registry::new();
        for name in ["Since", "Created", "Tags", "Status"] {
            registry.claim(name, None);
        }
        registry.record(&Declaration::Type(TypeDeclaration::new(
            "Since",
            TypeRepr::Alias(TypeRef::Timestamp),
        )));
        registry.record(&Declaration::Type(TypeDeclaration::new(
            "Created",
            TypeRepr::Alias(TypeRef::named("Since")),
        )));
        registry.record(&Declaration::Type(TypeDeclaration::new(
            "Tags",
            TypeRepr::Alias(TypeRef::array(TypeRef::string())),
        )));
        registry.record(&Declaration::Enum(EnumDeclaration {
            name: "Status".to_string(),
            scalar: ScalarKind::String,
            variants: Vec::new(),
            documentation: None,
        }));

        assert_eq!(registry.resolve_alias(&TypeRef::named("Created")), TypeRef::Timestamp);
        assert_eq!(
            registry.resolve_alias(&TypeRef::named("Tags")),
            TypeRef::array(TypeRef::string())
        );
        assert_eq!(registry.resolve_alias(&TypeRef::named("Status")), TypeRef::named("Status"));
        assert_eq!(registry.resolve_alias(&TypeRef::Date), TypeRef::Date);
    }
}
