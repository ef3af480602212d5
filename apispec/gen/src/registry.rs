//! The type registry.
//!
//! The registry owns the canonical definition of every named type and every
//! operation in one run. It has two partitions:
//!
//! - **shared**: bare names pre-seeded from the shared-type library. Read-only.
//! - **corpus**: names registered while the corpus is loaded, usually scoped to
//!   the unit that declared them.
//!
//! Population is single-threaded and mutable. [`TypeRegistry::resolve_all`]
//! seals it; from then on it is only read, and `&TypeRegistry` is shared across
//! validation and emission workers.
//!
//! ## Examples
//!
//! ```
//! use apispec_define::{EnumSpec, EnumVariant, QualifiedName, TypeDef, Annotations};
//! use apispec_gen::registry::TypeRegistry;
//!
//! let mut registry = TypeRegistry::with_shared_library();
//! registry
//!     .register(TypeDef::Enum(EnumSpec {
//!         name: QualifiedName::scoped("inference.put_anthropic", "ServiceType"),
//!         variants: vec![EnumVariant::new("anthropic")],
//!         description: None,
//!         annotations: Annotations::default(),
//!     }))
//!     .unwrap();
//! registry.resolve_all().unwrap();
//!
//! assert!(registry.resolve(&QualifiedName::shared("Id")).is_ok());
//! assert!(registry.is_sealed());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use apispec_define::{Operation, QualifiedName, TypeDef};
use apispec_definitions::shared_types;
use tracing::{debug, info, warn};

use crate::errors::GeneratorError;

/// Canonical store of types and operations for one run.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    shared: BTreeMap<String, TypeDef>,
    corpus: BTreeMap<QualifiedName, TypeDef>,
    operations: BTreeMap<String, Operation>,
    sealed: bool,
    cycle_members: BTreeSet<QualifiedName>,
}

impl TypeRegistry {
    /// An empty registry with no shared types.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose shared partition holds `types`.
    pub fn with_shared(types: impl IntoIterator<Item = TypeDef>) -> Self {
        let shared = types
            .into_iter()
            .map(|t| (t.name().name.clone(), t))
            .collect();
        Self {
            shared,
            ..Self::default()
        }
    }

    /// A registry seeded with the bundled shared-type library.
    pub fn with_shared_library() -> Self {
        Self::with_shared(shared_types())
    }

    /// Registers a type definition under its own name.
    ///
    /// Re-registering an identical shape is a no-op.
    ///
    /// ## Errors
    ///
    /// - `RegistrySealed` after [`resolve_all`](Self::resolve_all).
    /// - `DuplicateType` when the name exists with a different shape, in
    ///   either partition.
    pub fn register(&mut self, def: TypeDef) -> Result<(), GeneratorError> {
        let name = def.name().clone();
        if self.sealed {
            return Err(GeneratorError::RegistrySealed(name.to_string()));
        }

        let existing = if name.is_shared() {
            self.shared.get(&name.name).or_else(|| self.corpus.get(&name))
        } else {
            self.corpus.get(&name)
        };

        match existing {
            Some(existing) if existing.same_shape(&def) => {
                debug!(name = %name, "identical type already registered");
                Ok(())
            }
            Some(_) => {
                warn!(name = %name, "conflicting type definition");
                Err(GeneratorError::DuplicateType {
                    name: name.to_string(),
                })
            }
            None => {
                debug!(name = %name, kind = def.kind(), "registered type");
                self.corpus.insert(name, def);
                Ok(())
            }
        }
    }

    /// Registers an operation under its rest name.
    ///
    /// ## Errors
    ///
    /// `DuplicateOperation` when the rest name is taken, `RegistrySealed`
    /// after sealing.
    pub fn register_operation(&mut self, op: Operation) -> Result<(), GeneratorError> {
        if self.sealed {
            return Err(GeneratorError::RegistrySealed(op.name));
        }
        if self.operations.contains_key(&op.name) {
            warn!(operation = %op.name, "duplicate rest name");
            return Err(GeneratorError::DuplicateOperation { name: op.name });
        }
        debug!(operation = %op.name, "registered operation");
        self.operations.insert(op.name.clone(), op);
        Ok(())
    }

    /// Looks up a type definition.
    ///
    /// Bare names resolve against the shared partition first.
    pub fn resolve(&self, name: &QualifiedName) -> Result<&TypeDef, GeneratorError> {
        let found = if name.is_shared() {
            self.shared.get(&name.name).or_else(|| self.corpus.get(name))
        } else {
            self.corpus.get(name)
        };
        found.ok_or_else(|| GeneratorError::UnresolvedType {
            name: name.to_string(),
        })
    }

    /// Whether `name` is defined in the shared partition.
    pub fn is_shared_type(&self, name: &QualifiedName) -> bool {
        name.is_shared() && self.shared.contains_key(&name.name)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Operations sorted by rest name.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Shared types sorted by name.
    pub fn shared_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.shared.values()
    }

    /// Corpus types sorted by qualified name.
    pub fn corpus_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.corpus.values()
    }

    /// Corpus types declared under `namespace`.
    pub fn types_in(&self, namespace: &str) -> Vec<&TypeDef> {
        self.corpus
            .values()
            .filter(|t| t.name().namespace.as_deref() == Some(namespace))
            .collect()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Whether `name` takes part in a by-value cycle. Meaningful once sealed.
    pub fn is_cyclic(&self, name: &QualifiedName) -> bool {
        self.cycle_members.contains(name)
    }

    pub fn cycle_members(&self) -> &BTreeSet<QualifiedName> {
        &self.cycle_members
    }

    /// Seals the registry and checks every reference reachable from every
    /// operation.
    ///
    /// Cycle members are computed over all types and cached whether or not
    /// this returns an error, so the validator can report each operation's
    /// share of the problems.
    ///
    /// ## Errors
    ///
    /// The first `CyclicType` in name order, otherwise the first
    /// `UnresolvedType` reached from an operation.
    pub fn resolve_all(&mut self) -> Result<(), GeneratorError> {
        self.sealed = true;
        self.cycle_members = self.find_cycles();
        info!(
            shared = self.shared.len(),
            corpus = self.corpus.len(),
            operations = self.operations.len(),
            cyclic = self.cycle_members.len(),
            "registry sealed"
        );

        if let Some(first) = self.cycle_members.iter().next() {
            let cycle = self.cycle_of(first);
            warn!(name = %first, "by-value cycle");
            return Err(GeneratorError::CyclicType {
                name: first.to_string(),
                cycle,
            });
        }

        let mut seen = BTreeSet::new();
        let mut stack: Vec<&QualifiedName> = self
            .operations
            .values()
            .flat_map(|op| op.references())
            .collect();
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            let def = self.resolve(name)?;
            stack.extend(def.references());
        }
        Ok(())
    }

    /// Key under which `name` resolves, if it resolves.
    fn canonical(&self, name: &QualifiedName) -> Option<QualifiedName> {
        self.resolve(name).ok().map(|def| def.name().clone())
    }

    fn all_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.shared.values().chain(self.corpus.values())
    }

    /// By-value containment edges between resolvable types.
    fn by_value_graph(&self) -> BTreeMap<QualifiedName, Vec<QualifiedName>> {
        self.all_types()
            .map(|def| {
                let targets = def
                    .by_value_references()
                    .into_iter()
                    .filter_map(|r| self.canonical(r))
                    .collect();
                (def.name().clone(), targets)
            })
            .collect()
    }

    /// Members of every strongly connected component that forms a cycle
    /// (size above one, or a self edge).
    fn find_cycles(&self) -> BTreeSet<QualifiedName> {
        let graph = self.by_value_graph();
        let mut tarjan = Tarjan {
            graph: &graph,
            index: BTreeMap::new(),
            low: BTreeMap::new(),
            stack: Vec::new(),
            on_stack: BTreeSet::new(),
            next: 0,
            members: BTreeSet::new(),
        };
        for node in graph.keys() {
            if !tarjan.index.contains_key(node) {
                tarjan.visit(node);
            }
        }
        tarjan.members
    }

    /// Members of the cycle containing `start`, sorted.
    fn cycle_of(&self, start: &QualifiedName) -> Vec<String> {
        let graph = self.by_value_graph();
        let mut reach = BTreeSet::new();
        let mut stack = vec![start.clone()];
        while let Some(node) = stack.pop() {
            for next in graph.get(&node).into_iter().flatten() {
                if self.cycle_members.contains(next) && reach.insert(next.clone()) {
                    stack.push(next.clone());
                }
            }
        }
        reach.iter().map(ToString::to_string).collect()
    }
}

struct Tarjan<'g> {
    graph: &'g BTreeMap<QualifiedName, Vec<QualifiedName>>,
    index: BTreeMap<&'g QualifiedName, usize>,
    low: BTreeMap<&'g QualifiedName, usize>,
    stack: Vec<&'g QualifiedName>,
    on_stack: BTreeSet<&'g QualifiedName>,
    next: usize,
    members: BTreeSet<QualifiedName>,
}

impl<'g> Tarjan<'g> {
    fn visit(&mut self, node: &'g QualifiedName) {
        self.index.insert(node, self.next);
        self.low.insert(node, self.next);
        self.next += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let graph = self.graph;
        let mut self_edge = false;
        for succ in graph.get(node).into_iter().flatten() {
            if succ == node {
                self_edge = true;
            }
            if !self.index.contains_key(succ) {
                self.visit(succ);
                let low = self.low[succ].min(self.low[node]);
                self.low.insert(node, low);
            } else if self.on_stack.contains(succ) {
                let low = self.index[succ].min(self.low[node]);
                self.low.insert(node, low);
            }
        }

        if self.low[node] == self.index[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                component.push(member);
                if member == node {
                    break;
                }
            }
            if component.len() > 1 || self_edge {
                self.members.extend(component.into_iter().cloned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apispec_define::{
        AliasSpec, Annotations, ClassSpec, EnumSpec, EnumVariant, FieldSpec, FieldType, Primitive,
        TypeRef,
    };

    fn make_class(ns: &str, name: &str, fields: Vec<FieldSpec>) -> TypeDef {
        TypeDef::Class(ClassSpec {
            name: QualifiedName::scoped(ns, name),
            extends: vec![],
            fields,
            description: None,
            annotations: Annotations::default(),
        })
    }

    fn make_enum(name: QualifiedName, variants: &[&str]) -> TypeDef {
        TypeDef::Enum(EnumSpec {
            name,
            variants: variants.iter().map(|v| EnumVariant::new(*v)).collect(),
            description: None,
            annotations: Annotations::default(),
        })
    }

    #[test]
    fn identical_registration_is_noop() {
        let mut registry = TypeRegistry::new();
        let def = make_enum(QualifiedName::scoped("a", "E"), &["x", "y"]);
        registry.register(def.clone()).unwrap();

        let mut reordered = make_enum(QualifiedName::scoped("a", "E"), &["y", "x"]);
        if let TypeDef::Enum(e) = &mut reordered {
            e.description = Some("docs differ".to_string());
        }
        registry.register(reordered).unwrap();
        assert_eq!(registry.corpus_types().count(), 1);
    }

    #[test]
    fn different_shape_is_duplicate() {
        let mut registry = TypeRegistry::new();
        registry
            .register(make_enum(QualifiedName::scoped("a", "E"), &["x"]))
            .unwrap();
        let err = registry
            .register(make_enum(QualifiedName::scoped("a", "E"), &["z"]))
            .unwrap_err();
        match err {
            GeneratorError::DuplicateType { name } => assert_eq!(name, "a::E"),
            other => panic!("Expected DuplicateType, got: {:?}", other),
        }
    }

    #[test]
    fn same_name_in_different_namespaces_does_not_collide() {
        let mut registry = TypeRegistry::new();
        registry
            .register(make_enum(
                QualifiedName::scoped("inference.put_anthropic", "ServiceType"),
                &["anthropic"],
            ))
            .unwrap();
        registry
            .register(make_enum(
                QualifiedName::scoped("inference.put_elasticsearch", "ServiceType"),
                &["elasticsearch"],
            ))
            .unwrap();
        assert_eq!(registry.corpus_types().count(), 2);
    }

    #[test]
    fn bare_name_colliding_with_shared_type() {
        let mut registry = TypeRegistry::with_shared_library();
        let err = registry
            .register(make_enum(QualifiedName::shared("TokenChar"), &["letter"]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateType { .. }));

        let same = registry
            .resolve(&QualifiedName::shared("TokenChar"))
            .unwrap()
            .clone();
        registry.register(same).unwrap();
    }

    #[test]
    fn resolve_unknown_name_fails() {
        let registry = TypeRegistry::with_shared_library();
        let err = registry.resolve(&QualifiedName::shared("Nope")).unwrap_err();
        match err {
            GeneratorError::UnresolvedType { name } => assert_eq!(name, "Nope"),
            other => panic!("Expected UnresolvedType, got: {:?}", other),
        }
        assert!(registry.resolve(&QualifiedName::scoped("x", "Id")).is_err());
    }

    #[test]
    fn sealed_registry_rejects_registration() {
        let mut registry = TypeRegistry::new();
        registry.resolve_all().unwrap();
        let err = registry
            .register(make_enum(QualifiedName::scoped("a", "E"), &["x"]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::RegistrySealed(_)));
        assert!(matches!(
            registry.register_operation(Operation::default()),
            Err(GeneratorError::RegistrySealed(_))
        ));
    }

    #[test]
    fn duplicate_operation_is_rejected() {
        let mut registry = TypeRegistry::new();
        let op = Operation {
            name: "a.b".to_string(),
            ..Operation::default()
        };
        registry.register_operation(op.clone()).unwrap();
        assert!(matches!(
            registry.register_operation(op),
            Err(GeneratorError::DuplicateOperation { .. })
        ));
    }

    #[test]
    fn by_value_cycle_is_detected() {
        let mut registry = TypeRegistry::new();
        registry
            .register(make_class(
                "n",
                "A",
                vec![FieldSpec::required("b", FieldType::scoped("n", "B"))],
            ))
            .unwrap();
        registry
            .register(make_class(
                "n",
                "B",
                vec![FieldSpec::required("a", FieldType::scoped("n", "A"))],
            ))
            .unwrap();

        let err = registry.resolve_all().unwrap_err();
        match err {
            GeneratorError::CyclicType { name, cycle } => {
                assert_eq!(name, "n::A");
                assert_eq!(cycle, vec!["n::A".to_string(), "n::B".to_string()]);
            }
            other => panic!("Expected CyclicType, got: {:?}", other),
        }
        assert!(registry.is_cyclic(&QualifiedName::scoped("n", "A")));
        assert!(registry.is_cyclic(&QualifiedName::scoped("n", "B")));
    }

    #[test]
    fn self_containment_is_a_cycle() {
        let mut registry = TypeRegistry::new();
        registry
            .register(make_class(
                "n",
                "Node",
                vec![FieldSpec::required("next", FieldType::scoped("n", "Node"))],
            ))
            .unwrap();
        assert!(registry.resolve_all().is_err());
        assert!(registry.is_cyclic(&QualifiedName::scoped("n", "Node")));
    }

    #[test]
    fn arrays_maps_and_optionals_break_cycles() {
        let mut registry = TypeRegistry::new();
        registry
            .register(make_class(
                "n",
                "Tree",
                vec![
                    FieldSpec::required("children", FieldType::array_of(FieldType::scoped("n", "Tree"))),
                    FieldSpec::required(
                        "index",
                        FieldType::map_of(
                            FieldType::Primitive(Primitive::String),
                            FieldType::scoped("n", "Tree"),
                        ),
                    ),
                    FieldSpec::optional("parent", FieldType::scoped("n", "Tree")),
                ],
            ))
            .unwrap();
        registry.resolve_all().unwrap();
        assert!(registry.cycle_members().is_empty());
    }

    #[test]
    fn inheritance_counts_as_containment() {
        let mut registry = TypeRegistry::new();
        let base = make_class(
            "n",
            "Base",
            vec![FieldSpec::required("child", FieldType::scoped("n", "Child"))],
        );
        let mut child = make_class("n", "Child", vec![]);
        if let TypeDef::Class(c) = &mut child {
            c.extends.push(TypeRef::new(QualifiedName::scoped("n", "Base")));
        }
        registry.register(base).unwrap();
        registry.register(child).unwrap();
        assert!(registry.resolve_all().is_err());
    }

    #[test]
    fn alias_loop_is_a_cycle() {
        let mut registry = TypeRegistry::new();
        for (name, target) in [("A", "B"), ("B", "A")] {
            registry
                .register(TypeDef::Alias(AliasSpec {
                    name: QualifiedName::scoped("n", name),
                    target: FieldType::scoped("n", target),
                    description: None,
                    annotations: Annotations::default(),
                }))
                .unwrap();
        }
        assert!(registry.resolve_all().is_err());
    }

    #[test]
    fn unresolved_reference_from_operation() {
        let mut registry = TypeRegistry::with_shared_library();
        let op = Operation {
            name: "a.b".to_string(),
            path_parts: vec![FieldSpec::required("id", FieldType::named("Missing"))],
            ..Operation::default()
        };
        registry.register_operation(op).unwrap();
        let err = registry.resolve_all().unwrap_err();
        assert!(matches!(err, GeneratorError::UnresolvedType { .. }));
        assert!(registry.is_sealed());
    }

    #[test]
    fn types_in_namespace() {
        let mut registry = TypeRegistry::new();
        registry
            .register(make_enum(QualifiedName::scoped("a", "E"), &["x"]))
            .unwrap();
        registry
            .register(make_enum(QualifiedName::scoped("b", "E"), &["x"]))
            .unwrap();
        assert_eq!(registry.types_in("a").len(), 1);
        assert!(registry.types_in("c").is_empty());
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeRegistry>();
    }
}
