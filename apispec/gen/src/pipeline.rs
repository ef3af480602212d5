//! Corpus loading and the parse, register, resolve and validate phases.
//!
//! ## Phases
//!
//! 1. **Parse and register.** Units are parsed in parallel; their types and
//!    operations are then registered one unit at a time in path order, so
//!    duplicate detection does not depend on scheduling.
//! 2. **Resolve and validate.** The registry is sealed and shared by
//!    reference; every operation and type-only unit validates independently.
//!
//! The result is a [`CheckedCorpus`]: the sealed registry, every violation,
//! and the set of certified operations that emission may use.
//!
//! ## Examples
//!
//! ```
//! use apispec_gen::pipeline::{bundled_units, check_corpus};
//!
//! let checked = check_corpus(&bundled_units(), true);
//! assert!(checked.is_certified("connector.update_pipeline"));
//! assert!(checked.violations.is_empty());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use apispec_define::{Operation, QualifiedName};
use apispec_definitions::bundled_corpus;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::GeneratorError;
use crate::parser::{ParsedUnit, parse_unit};
use crate::registry::TypeRegistry;
use crate::validation::{Violation, ViolationKind, validate_operation, validate_types};

/// The text of one schema unit and its path relative to the corpus root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaUnit {
    pub path: String,
    pub text: String,
}

impl SchemaUnit {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// The corpus embedded in `apispec-definitions`.
pub fn bundled_units() -> Vec<SchemaUnit> {
    bundled_corpus()
        .into_iter()
        .map(|u| SchemaUnit::new(u.path, u.text))
        .collect()
}

/// Reads every unit under `dir` whose extension is in `extensions`.
///
/// Units are returned sorted by their `/`-separated path relative to `dir`.
///
/// ## Errors
///
/// - `GeneratorError::CorpusNotFound` if `dir` is not a directory
/// - `GeneratorError::ReadError` if walking or reading fails
pub fn load_corpus(dir: &Path, extensions: &[String]) -> Result<Vec<SchemaUnit>, GeneratorError> {
    if !dir.is_dir() {
        return Err(GeneratorError::CorpusNotFound(dir.display().to_string()));
    }

    let mut units = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| GeneratorError::ReadError {
            path: dir.display().to_string(),
            source: e.into(),
        })?;
        let path = entry.path();
        let matches = entry.file_type().is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e == ext));
        if !matches {
            continue;
        }

        let text = fs::read_to_string(path).map_err(|e| GeneratorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let relative = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        units.push(SchemaUnit::new(relative, text));
    }

    units.sort_by(|a, b| a.path.cmp(&b.path));
    info!(dir = %dir.display(), units = units.len(), "corpus loaded");
    Ok(units)
}

/// Outcome of checking a corpus.
#[derive(Debug, Clone)]
pub struct CheckedCorpus {
    /// The sealed registry.
    pub registry: TypeRegistry,
    /// Every violation, grouped by owner in name order.
    pub violations: Vec<Violation>,
    /// Rest names of operations with no violations.
    pub certified: BTreeSet<String>,
    /// Type-only units by namespace.
    pub type_units: BTreeMap<String, Vec<QualifiedName>>,
    /// Number of units checked.
    pub units: usize,
}

impl CheckedCorpus {
    pub fn is_certified(&self, name: &str) -> bool {
        self.certified.contains(name)
    }

    /// Certified operations in rest-name order.
    pub fn certified_operations(&self) -> impl Iterator<Item = &Operation> {
        self.registry
            .operations()
            .filter(|op| self.certified.contains(&op.name))
    }

    pub fn violations_for<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.operation == owner)
    }

    /// Type-only units with no violations.
    pub fn clean_type_units(&self) -> impl Iterator<Item = (&str, &[QualifiedName])> {
        self.type_units
            .iter()
            .filter(|(ns, _)| self.violations_for(ns).next().is_none())
            .map(|(ns, names)| (ns.as_str(), names.as_slice()))
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Runs parsing, registration, resolution and validation over `units`.
///
/// Never fails: every problem becomes a [`Violation`].
pub fn check_corpus(units: &[SchemaUnit], parallel: bool) -> CheckedCorpus {
    let mut parsed: Vec<ParsedUnit> = if parallel {
        units
            .par_iter()
            .map(|u| parse_unit(&u.path, &u.text))
            .collect()
    } else {
        units.iter().map(|u| parse_unit(&u.path, &u.text)).collect()
    };
    parsed.sort_by(|a, b| a.path.cmp(&b.path));
    info!(units = parsed.len(), "parsed corpus");

    let mut registry = TypeRegistry::with_shared_library();
    let mut violations = Vec::new();
    let mut type_units: BTreeMap<String, Vec<QualifiedName>> = BTreeMap::new();

    for unit in parsed {
        register_unit(unit, &mut registry, &mut violations, &mut type_units);
    }

    if let Err(e) = registry.resolve_all() {
        warn!(error = %e, "registry resolution found problems");
    }

    let registry_ref = &registry;
    let operations: Vec<&Operation> = registry.operations().collect();
    let type_unit_list: Vec<(&String, &Vec<QualifiedName>)> = type_units.iter().collect();

    let (op_violations, type_violations): (Vec<Violation>, Vec<Violation>) = if parallel {
        (
            operations
                .par_iter()
                .flat_map_iter(|op| validate_operation(op, registry_ref))
                .collect(),
            type_unit_list
                .par_iter()
                .flat_map_iter(|(ns, names)| validate_types(ns, names, registry_ref))
                .collect(),
        )
    } else {
        (
            operations
                .iter()
                .flat_map(|op| validate_operation(op, registry_ref))
                .collect(),
            type_unit_list
                .iter()
                .flat_map(|(ns, names)| validate_types(ns, names, registry_ref))
                .collect(),
        )
    };
    violations.extend(op_violations);
    violations.extend(type_violations);

    let violations = group_violations(violations);
    let certified: BTreeSet<String> = operations
        .iter()
        .filter(|op| !violations.iter().any(|v| v.operation == op.name))
        .map(|op| op.name.clone())
        .collect();

    info!(
        operations = operations.len(),
        certified = certified.len(),
        violations = violations.len(),
        "validation complete"
    );

    CheckedCorpus {
        units: units.len(),
        certified,
        type_units,
        violations,
        registry,
    }
}

fn register_unit(
    unit: ParsedUnit,
    registry: &mut TypeRegistry,
    violations: &mut Vec<Violation>,
    type_units: &mut BTreeMap<String, Vec<QualifiedName>>,
) {
    let owner = unit.owner().to_string();
    debug!(path = %unit.path, owner = %owner, issues = unit.issues.len(), "registering unit");

    for issue in &unit.issues {
        violations.push(Violation::new(
            owner.as_str(),
            issue.path.as_str(),
            ViolationKind::MalformedSchema,
            format!("{} line {}: {}", unit.path, issue.line, issue.message),
        ));
    }

    let mut names = Vec::new();
    for def in unit.types {
        let name = def.name().clone();
        match registry.register(def) {
            Ok(()) => names.push(name),
            Err(e @ GeneratorError::DuplicateType { .. }) => violations.push(Violation::new(
                owner.as_str(),
                name.name.as_str(),
                ViolationKind::DuplicateType,
                e.to_string(),
            )),
            Err(e) => violations.push(Violation::new(
                owner.as_str(),
                name.name.as_str(),
                ViolationKind::MalformedSchema,
                e.to_string(),
            )),
        }
    }

    match unit.operation {
        Some(op) => {
            if let Err(e) = registry.register_operation(op) {
                violations.push(Violation::new(
                    owner.as_str(),
                    "",
                    ViolationKind::DuplicateType,
                    format!("{}: {e}", unit.path),
                ));
            }
        }
        None => type_units.entry(unit.namespace).or_default().extend(names),
    }
}

/// Orders violations by owner, keeping each owner's check order, and drops
/// exact repeats.
fn group_violations(violations: Vec<Violation>) -> Vec<Violation> {
    let mut seen = BTreeSet::new();
    let mut unique: Vec<Violation> = violations
        .into_iter()
        .filter(|v| {
            seen.insert((
                v.operation.clone(),
                v.path.clone(),
                v.kind,
                v.message.clone(),
            ))
        })
        .collect();
    unique.sort_by(|a, b| a.operation.cmp(&b.operation));
    unique
}
