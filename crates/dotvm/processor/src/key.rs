// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Durable keys for element handles
//!
//! A host may represent the same logical element by a different handle in
//! every round. An [`ElementKey`] captures just enough of an element to
//! compare it with keys from other rounds and to look it up again through the
//! symbol table of a later round.
//!
//! Printable signatures alone are not unique: overloads can print the same
//! (`<C>m(C)` for two differently bounded `C`), and a record can have a field
//! and a record component with the same name. Keys therefore carry the owner
//! chain and, for executables, the position among same-named siblings.

use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

use crate::element::{Element, ElementKind, SymbolTable};
use crate::error::{ProcessorError, ProcessorResult};
use crate::scanner::enclosing_type;

/// Key of a type, by fully qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    name: String,
}

impl TypeKey {
    pub fn for_type<E: Element>(element: &E) -> Self {
        Self { name: element.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve<E: Element>(&self, symbols: &dyn SymbolTable<E>) -> Option<E> {
        symbols.type_element(&self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Key of a method or constructor
///
/// Identified by owner, simple name and the index among the owner's
/// executables of that name in declaration order. The printable signature is
/// kept for messages only; it can change between rounds once a referenced
/// type is generated.
#[derive(Debug, Clone)]
pub struct ExecutableKey {
    owner: TypeKey,
    name: String,
    index: usize,
    signature: String,
}

impl ExecutableKey {
    pub fn for_executable<E: Element>(element: &E) -> ProcessorResult<Self> {
        let owner = enclosing_type(element)?;
        let name = element.simple_name();
        let siblings = same_name_executables(&owner, &name);
        let index = siblings.iter().position(|sibling| sibling == element).ok_or_else(|| ProcessorError::ExecutableNotFound {
            element: element.to_string(),
            siblings: siblings.iter().map(ToString::to_string).collect(),
        })?;

        Ok(Self {
            owner: TypeKey::for_type(&owner),
            name,
            index,
            signature: element.to_string(),
        })
    }

    pub fn owner(&self) -> &TypeKey {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn resolve<E: Element>(&self, symbols: &dyn SymbolTable<E>) -> Option<E> {
        let owner = self.owner.resolve(symbols)?;
        same_name_executables(&owner, &self.name).into_iter().nth(self.index)
    }
}

impl PartialEq for ExecutableKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.index == other.index && self.owner == other.owner
    }
}

impl Eq for ExecutableKey {}

impl Hash for ExecutableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Display for ExecutableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature)
    }
}

fn same_name_executables<E: Element>(owner: &E, name: &str) -> Vec<E> {
    owner.enclosed_elements().into_iter().filter(|e| e.kind().is_executable() && e.simple_name() == name).collect()
}

/// Durable, re-resolvable stand-in for an element handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKey<E> {
    /// Package, by fully qualified name
    Package { name: String },
    /// Class, enum, interface, annotation type or record
    Type(TypeKey),
    /// Type parameter, by signature within its owning type or executable
    TypeParameter { signature: String, owner: Box<ElementKey<E>> },
    /// Field, enum constant or record component of a type
    Member { name: String, kind: ElementKind, owner: TypeKey },
    /// Method or constructor
    Executable(ExecutableKey),
    /// Parameter, by signature within its executable
    Parameter { signature: String, owner: ExecutableKey },
    /// Element kind without a lookup strategy; the handle itself is kept
    Unsupported { kind: ElementKind, description: String, element: E },
}

impl<E: Element> ElementKey<E> {
    /// Build the key for a handle without consulting any symbol table
    ///
    /// Fails only when the handle violates the element model, e.g. a method
    /// that is not among its owner's enclosed elements.
    pub fn for_element(element: &E) -> ProcessorResult<Self> {
        let kind = element.kind();
        let key = match kind {
            ElementKind::Package => Self::Package { name: element.to_string() },
            ElementKind::Class | ElementKind::Enum | ElementKind::Interface | ElementKind::AnnotationType | ElementKind::Record => Self::Type(TypeKey::for_type(element)),
            ElementKind::TypeParameter => {
                let owner = enclosing_element_of(element)?;
                Self::TypeParameter {
                    signature: element.to_string(),
                    owner: Box::new(Self::for_element(&owner)?),
                }
            }
            ElementKind::Field | ElementKind::EnumConstant | ElementKind::RecordComponent => Self::Member {
                name: element.simple_name(),
                kind,
                owner: TypeKey::for_type(&enclosing_type(element)?),
            },
            ElementKind::Method | ElementKind::Constructor => Self::Executable(ExecutableKey::for_executable(element)?),
            ElementKind::Parameter => {
                let owner = enclosing_element_of(element)?;
                Self::Parameter {
                    signature: element.to_string(),
                    owner: ExecutableKey::for_executable(&owner)?,
                }
            }
            ElementKind::Module | ElementKind::LocalVariable | ElementKind::Initializer | ElementKind::Other => {
                debug!(kind = %kind, element = %element, "No lookup strategy for element kind, keeping the handle");
                Self::Unsupported {
                    kind,
                    description: element.to_string(),
                    element: element.clone(),
                }
            }
        };
        Ok(key)
    }

    /// Look the element up again in the given round's symbol table
    ///
    /// Returns `None` if the element (or one of its owners) does not exist
    /// in this round, or can no longer be told apart from a sibling.
    pub fn resolve(&self, symbols: &dyn SymbolTable<E>) -> Option<E> {
        match self {
            Self::Package { name } => symbols.package_element(name),
            Self::Type(key) => key.resolve(symbols),
            Self::TypeParameter { signature, owner } => {
                let owner = owner.resolve(symbols)?;
                self.unique(owner.type_parameters(), |p| p.to_string() == *signature)
            }
            Self::Member { name, kind, owner } => {
                let owner = owner.resolve(symbols)?;
                self.unique(owner.enclosed_elements(), |e| e.kind() == *kind && e.simple_name() == *name)
            }
            Self::Executable(key) => key.resolve(symbols),
            Self::Parameter { signature, owner } => {
                let owner = owner.resolve(symbols)?;
                self.unique(owner.parameters(), |p| p.to_string() == *signature)
            }
            Self::Unsupported { element, .. } => Some(element.clone()),
        }
    }

    /// Kind that made this key (or one of its owners) fall back to keeping the handle
    pub fn unsupported_kind(&self) -> Option<ElementKind> {
        match self {
            Self::Unsupported { kind, .. } => Some(*kind),
            Self::TypeParameter { owner, .. } => owner.unsupported_kind(),
            _ => None,
        }
    }

    fn unique(&self, candidates: Vec<E>, matches: impl Fn(&E) -> bool) -> Option<E> {
        let mut matching = candidates.into_iter().filter(|candidate| matches(candidate));
        let Some(first) = matching.next() else {
            debug!(key = %self, "Element no longer present in its owner");
            return None;
        };
        if matching.next().is_some() {
            debug!(key = %self, "Element is ambiguous within its owner");
            return None;
        }
        Some(first)
    }
}

fn enclosing_element_of<E: Element>(element: &E) -> ProcessorResult<E> {
    element
        .enclosing_element()
        .ok_or_else(|| ProcessorError::internal_error(format!("{} {} has no enclosing element", element.kind(), element)))
}

impl<E: Element> fmt::Display for ElementKey<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package { name } => f.write_str(name),
            Self::Type(key) => fmt::Display::fmt(key, f),
            Self::TypeParameter { signature, .. } => f.write_str(signature),
            Self::Member { name, .. } => f.write_str(name),
            Self::Executable(key) => fmt::Display::fmt(key, f),
            Self::Parameter { signature, .. } => f.write_str(signature),
            Self::Unsupported { description, .. } => f.write_str(description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryElement, NodeId, ProgramModel, ProgramSnapshot};
    use proptest::prelude::*;

    fn key(snapshot: &ProgramSnapshot, id: NodeId) -> ElementKey<MemoryElement> {
        ElementKey::for_element(&snapshot.element(id).unwrap()).unwrap()
    }

    #[test]
    fn test_round_trip_every_supported_kind() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("com.example");
        let record = model.add_record(pkg, "Point");
        let type_param = model.add_type_parameter(record, "T");
        let component = model.add_member(record, ElementKind::RecordComponent, "x");
        let field = model.add_field(record, "x");
        let constant = model.add_member(record, ElementKind::EnumConstant, "ORIGIN");
        let ctor = model.add_constructor(record, "Point(int)");
        let method = model.add_method(record, "scale", "<S>scale(S)");
        let method_type_param = model.add_type_parameter(method, "S");
        let param = model.add_parameter(method, "factor");
        let ids = [pkg, record, type_param, component, field, constant, ctor, method, method_type_param, param];

        let first = model.snapshot();
        let keys: Vec<_> = ids.iter().map(|id| key(&first, *id)).collect();

        // Same snapshot
        for (id, key) in ids.iter().zip(&keys) {
            assert_eq!(key.resolve(&first), Some(first.element(*id).unwrap()), "{}", key);
        }

        // Fresh handles in a later round
        let second = model.snapshot();
        for (id, key) in ids.iter().zip(&keys) {
            assert_eq!(key.resolve(&second), Some(second.element(*id).unwrap()), "{}", key);
            assert_eq!(&ElementKey::for_element(&second.element(*id).unwrap()).unwrap(), key);
        }
    }

    #[test]
    fn test_field_and_record_component_are_distinct() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let record = model.add_record(pkg, "R");
        let component = model.add_member(record, ElementKind::RecordComponent, "value");
        let field = model.add_field(record, "value");
        let snapshot = model.snapshot();

        assert_ne!(key(&snapshot, component), key(&snapshot, field));
        assert_eq!(key(&snapshot, component).to_string(), key(&snapshot, field).to_string());
    }

    #[test]
    fn test_type_parameters_distinguished_by_owner() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let a = model.add_class(pkg, "A");
        let b = model.add_class(pkg, "B");
        let ta = model.add_type_parameter(a, "T");
        let tb = model.add_type_parameter(b, "T");
        let snapshot = model.snapshot();

        assert_ne!(key(&snapshot, ta), key(&snapshot, tb));
    }

    #[test]
    fn test_overloads_with_colliding_signatures() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "C");
        let unrelated = model.add_method(class, "other", "other()");
        let first = model.add_method(class, "m", "<C>m(C)");
        let second = model.add_method(class, "m", "<C>m(C)");
        let snapshot = model.snapshot();

        let first_key = key(&snapshot, first);
        let second_key = key(&snapshot, second);
        assert_ne!(first_key, second_key);
        match (&first_key, &second_key) {
            (ElementKey::Executable(a), ElementKey::Executable(b)) => {
                assert_eq!((a.index(), b.index()), (0, 1));
                assert_eq!(a.owner(), b.owner());
            }
            _ => panic!("expected executable keys"),
        }

        // Unrelated members come and go, relative order of the overloads stays
        model.remove(unrelated);
        model.add_method_at(class, 0, "inserted", "inserted()");
        model.add_field(class, "m");
        let later = model.snapshot();
        assert_eq!(first_key.resolve(&later), Some(later.element(first).unwrap()));
        assert_eq!(second_key.resolve(&later), Some(later.element(second).unwrap()));
    }

    #[test]
    fn test_executable_survives_signature_change() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("test");
        let class = model.add_class(pkg, "C");
        let method = model.add_method(class, "m", "m(SomeGeneratedClass)");
        let param = model.add_parameter(method, "sgc");
        let before = model.snapshot();
        let method_key = key(&before, method);
        let param_key = key(&before, param);

        model.set_display(method, "m(test.SomeGeneratedClass)");
        let after = model.snapshot();
        assert_eq!(key(&after, method), method_key);
        assert_eq!(method_key.resolve(&after), Some(after.element(method).unwrap()));
        assert_eq!(param_key.resolve(&after), Some(after.element(param).unwrap()));
        assert_eq!(method_key.to_string(), "m(SomeGeneratedClass)");
    }

    #[test]
    fn test_resolution_fails_softly() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "Gone");
        let method = model.add_method(class, "m", "m()");
        let field = model.add_field(class, "f");
        let snapshot = model.snapshot();
        let keys = [key(&snapshot, class), key(&snapshot, method), key(&snapshot, field)];

        model.remove(class);
        let later = model.snapshot();
        for key in &keys {
            assert_eq!(key.resolve(&later), None);
        }
        assert_eq!(ElementKey::<MemoryElement>::Package { name: "missing".into() }.resolve(&later), None);
    }

    #[test]
    fn test_overload_index_out_of_range() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "C");
        model.add_method(class, "m", "m()");
        let second = model.add_method(class, "m", "m(int)");
        let snapshot = model.snapshot();
        let second_key = key(&snapshot, second);

        model.remove(second);
        let later = model.snapshot();
        assert_eq!(second_key.resolve(&later), None);
    }

    #[test]
    fn test_ambiguous_member_resolves_to_none() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "C");
        let field = model.add_field(class, "dup");
        let snapshot = model.snapshot();
        let field_key = key(&snapshot, field);

        model.add_field(class, "dup");
        let later = model.snapshot();
        assert_eq!(field_key.resolve(&later), None);
    }

    #[test]
    fn test_unsupported_kind_keeps_handle() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "C");
        let init = model.add_other(class, ElementKind::Initializer, "<clinit>");
        let snapshot = model.snapshot();
        let init_key = key(&snapshot, init);

        assert_eq!(init_key.unsupported_kind(), Some(ElementKind::Initializer));
        assert_eq!(init_key.resolve(&snapshot), Some(snapshot.element(init).unwrap()));
        // The retained handle is returned even in later rounds
        let later = model.snapshot();
        assert_eq!(init_key.resolve(&later), Some(snapshot.element(init).unwrap()));
        assert_eq!(key(&snapshot, class).unsupported_kind(), None);
    }

    /// Writer collecting formatted tracing output
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unsupported_kind_logs_below_warning() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "C");
        let init = model.add_other(class, ElementKind::Initializer, "<clinit>");
        let snapshot = model.snapshot();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).with_writer(move || writer.clone()).finish();
        tracing::subscriber::with_default(subscriber, || key(&snapshot, init));

        // The user-facing warning is a diagnostic raised by the processor
        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_misplaced_parameter_is_an_invariant_violation() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "C");
        let stray = model.add_other(class, ElementKind::Parameter, "x");
        let snapshot = model.snapshot();

        let error = ElementKey::for_element(&snapshot.element(stray).unwrap()).unwrap_err();
        assert!(matches!(error, ProcessorError::ExecutableNotFound { .. }));
        assert!(!error.is_recoverable());
    }

    fn overload_names() -> impl Strategy<Value = Vec<bool>> {
        prop::collection::vec(any::<bool>(), 1..12)
    }

    proptest! {
        #[test]
        fn prop_overloads_round_trip(names in overload_names(), shift in 0usize..4) {
            let mut model = ProgramModel::new();
            let pkg = model.add_package("p");
            let class = model.add_class(pkg, "C");
            let methods: Vec<NodeId> = names
                .iter()
                .map(|is_a| if *is_a { model.add_method(class, "a", "a(T)") } else { model.add_method(class, "b", "b(T)") })
                .collect();
            let snapshot = model.snapshot();
            let keys: Vec<_> = methods.iter().map(|id| key(&snapshot, *id)).collect();

            for i in 0..keys.len() {
                for j in 0..keys.len() {
                    prop_assert_eq!(keys[i] == keys[j], i == j);
                }
            }

            for _ in 0..shift {
                model.add_method_at(class, 0, "unrelated", "unrelated()");
            }
            let later = model.snapshot();
            for (id, key) in methods.iter().zip(&keys) {
                prop_assert_eq!(key.resolve(&later), Some(later.element(*id).unwrap()));
            }
        }
    }
}
