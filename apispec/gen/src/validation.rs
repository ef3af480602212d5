//! Validation of parsed operations and type-only units.
//!
//! The validator certifies an [`Operation`] against the sealed
//! [`TypeRegistry`]. It never repairs anything: every check runs, every
//! problem becomes a [`Violation`], and an operation with none is certified.
//!
//! ## Checks
//!
//! 1. **Templates**: every `{placeholder}` has a path part and every path part
//!    is used; required path parts appear in every template; templates start
//!    with `/` and list at least one method.
//! 2. **References**: every type reference resolves, transitively, and no
//!    reachable type is part of a by-value cycle.
//! 3. **Field contract**: no field is both required and server-defaulted.
//! 4. **Enums**: inline enums are non-empty with unique variants.
//! 5. **Availability**: known targets, stability and visibility levels, and
//!    `major.minor.patch` versions.
//!
//! Field name clashes (within one object, or between path, query and body)
//! are reported with check 1.
//!
//! Generator settings are validated separately by [`validate_request_suffix`]
//! and [`check_generated_names`], which fail fast with a [`GeneratorError`].
//!
//! ## Examples
//!
//! ```
//! use apispec_define::{FieldSpec, FieldType, HttpMethod, Operation, UrlTemplate};
//! use apispec_gen::registry::TypeRegistry;
//! use apispec_gen::validation::{ViolationKind, validate_operation};
//!
//! let mut registry = TypeRegistry::with_shared_library();
//! registry.resolve_all().unwrap();
//!
//! let op = Operation {
//!     name: "connector.update_pipeline".to_string(),
//!     urls: vec![UrlTemplate::new("/_connector/{connector_id}/_pipeline", vec![HttpMethod::Put])],
//!     path_parts: vec![FieldSpec::required("id", FieldType::named("Id"))],
//!     ..Operation::default()
//! };
//!
//! let violations = validate_operation(&op, &registry);
//! assert!(violations.iter().all(|v| v.kind == ViolationKind::MalformedSchema));
//! assert_eq!(violations.len(), 2); // orphan placeholder + unused path part
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use apispec_define::{Body, FieldLocation, FieldSpec, Operation, QualifiedName, TypeDef};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::codegen::naming::{field_ident, generated_type_names, to_pascal_case};
use crate::errors::GeneratorError;
use crate::registry::TypeRegistry;

/// Category of a validation failure.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum ViolationKind {
    /// A name registered twice with different shapes.
    DuplicateType,
    /// A reference with no definition.
    UnresolvedType,
    /// A type that contains itself by value.
    CyclicType,
    /// A structurally invalid unit, template, enum or annotation.
    MalformedSchema,
    /// A field that is both required and server-defaulted.
    InvalidFieldContract,
}

/// One problem found in one operation or type-only unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Rest name, or namespace for type-only units.
    pub operation: String,
    /// Dotted path of the offending element, e.g. `body.task_settings`.
    pub path: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(
        operation: impl Into<String>,
        path: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: [{}] {}", self.operation, self.kind, self.message)
        } else {
            write!(
                f,
                "{}: {}: [{}] {}",
                self.operation, self.path, self.kind, self.message
            )
        }
    }
}

/// Runs every check against one operation.
pub fn validate_operation(op: &Operation, registry: &TypeRegistry) -> Vec<Violation> {
    let mut out = Vec::new();
    let owner = op.name.as_str();

    check_templates(op, &mut out);
    check_field_names(op, &mut out);
    check_references(owner, op_roots(op), registry, &mut out);
    check_contract(
        owner,
        op.fields().map(|(loc, f)| (loc.to_string(), f)),
        &mut out,
    );
    let inline: Vec<&TypeDef> = op
        .inline_types
        .iter()
        .filter_map(|n| registry.resolve(n).ok())
        .collect();
    check_definitions(owner, &inline, &mut out);
    check_availability(op, &mut out);

    debug!(operation = owner, violations = out.len(), "validated operation");
    out
}

/// Applies the reference, field-contract and enum checks to the types of a
/// type-only unit.
pub fn validate_types(
    owner: &str,
    names: &[QualifiedName],
    registry: &TypeRegistry,
) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut defs = Vec::new();
    for name in names {
        match registry.resolve(name) {
            Ok(def) => defs.push(def),
            Err(e) => out.push(Violation::new(
                owner,
                name.name.as_str(),
                ViolationKind::UnresolvedType,
                e.to_string(),
            )),
        }
    }

    let roots = defs
        .iter()
        .map(|d| (d.name().name.clone(), d.name().clone()))
        .collect();
    check_references(owner, roots, registry, &mut out);
    check_definitions(owner, &defs, &mut out);

    debug!(owner, violations = out.len(), "validated type unit");
    out
}

/// Validates the request-struct suffix.
///
/// ## Errors
///
/// Returns `GeneratorError::InvalidRequestSuffix` when the suffix is empty or
/// contains anything but ASCII letters and digits.
pub fn validate_request_suffix(suffix: &str) -> Result<(), GeneratorError> {
    if suffix.is_empty() {
        return Err(GeneratorError::InvalidRequestSuffix {
            suffix: suffix.to_string(),
            reason: "suffix cannot be empty".to_string(),
        });
    }
    if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GeneratorError::InvalidRequestSuffix {
            suffix: suffix.to_string(),
            reason: "suffix must contain only alphanumeric characters (letters and numbers)"
                .to_string(),
        });
    }
    Ok(())
}

/// Checks that no inline type or field of `op` takes a name the emitter generates.
///
/// ## Errors
///
/// - `GeneratorError::NamingCollision` for an inline type named like a
///   generated wrapper type
/// - `GeneratorError::FieldNameCollision` for a field whose setter would be
///   `build`, or a path/query parameter named `body` next to a body struct
pub fn check_generated_names(op: &Operation, suffix: &str) -> Result<(), GeneratorError> {
    let reserved = generated_type_names(&op.name, suffix);
    for name in &op.inline_types {
        let rust_name = to_pascal_case(&name.name);
        if reserved.contains(&rust_name) {
            return Err(GeneratorError::NamingCollision {
                operation: op.name.clone(),
                type_name: rust_name.clone(),
                suggestion: format!("{rust_name}Type"),
            });
        }
    }

    let collision = |field: &str, member: &str| GeneratorError::FieldNameCollision {
        operation: op.name.clone(),
        field: field.to_string(),
        member: member.to_string(),
    };
    let has_body_struct = !op.body.fields().is_empty();
    for (location, field) in op.fields() {
        let ident = field_ident(&field.name).to_string();
        if ident == "build" {
            return Err(collision(&field.name, "build()"));
        }
        if ident == "body" && location != FieldLocation::Body && has_body_struct {
            return Err(collision(&field.name, "body"));
        }
    }
    if let Body::Value { codegen_name, .. } = &op.body {
        if field_ident(codegen_name) == "build" {
            return Err(collision(codegen_name, "build()"));
        }
    }
    Ok(())
}

// --- check 1 ---

fn check_templates(op: &Operation, out: &mut Vec<Violation>) {
    let owner = op.name.as_str();
    let malformed = |path: String, message: String| {
        Violation::new(owner, path, ViolationKind::MalformedSchema, message)
    };

    if op.urls.is_empty() {
        out.push(malformed(
            "urls".to_string(),
            "operation declares no URL templates".to_string(),
        ));
    }

    let mut declared: BTreeMap<&str, &FieldSpec> = BTreeMap::new();
    for part in &op.path_parts {
        if declared.insert(part.name.as_str(), part).is_some() {
            out.push(malformed(
                format!("path_parts.{}", part.name),
                format!("path part `{}` is declared more than once", part.name),
            ));
        }
    }

    for (idx, url) in op.urls.iter().enumerate() {
        let at = format!("urls[{idx}]");
        if !url.path.starts_with('/') {
            out.push(malformed(
                at.clone(),
                format!("URL template `{}` does not start with `/`", url.path),
            ));
        }
        if url.methods.is_empty() {
            out.push(malformed(
                format!("{at}.methods"),
                format!("URL template `{}` has no method list", url.path),
            ));
        }
        for placeholder in url.placeholders() {
            if !declared.contains_key(placeholder) {
                out.push(malformed(
                    at.clone(),
                    format!(
                        "placeholder `{{{placeholder}}}` in `{}` has no path_parts declaration",
                        url.path
                    ),
                ));
            }
        }
    }

    let used = op.placeholders();
    for (name, part) in &declared {
        let path = format!("path_parts.{name}");
        if !used.contains(name) {
            out.push(malformed(
                path,
                format!("path part `{name}` is not used by any URL template"),
            ));
        } else if part.required {
            if let Some(url) = op.urls.iter().find(|u| !u.placeholders().contains(name)) {
                out.push(malformed(
                    path,
                    format!(
                        "required path part `{name}` is missing from `{}`; it must be optional",
                        url.path
                    ),
                ));
            }
        }
    }
}

fn check_field_names(op: &Operation, out: &mut Vec<Violation>) {
    let owner = op.name.as_str();
    let mut seen: BTreeMap<&str, FieldLocation> = BTreeMap::new();

    for (loc, field) in op.fields() {
        match seen.get(field.name.as_str()) {
            // Duplicate path parts are reported with the templates.
            Some(prev) if *prev == loc && loc == FieldLocation::Path => {}
            Some(prev) if *prev == loc => out.push(Violation::new(
                owner,
                format!("{loc}.{}", field.name),
                ViolationKind::MalformedSchema,
                format!("field `{}` is declared more than once in {loc}", field.name),
            )),
            Some(prev) => out.push(Violation::new(
                owner,
                format!("{loc}.{}", field.name),
                ViolationKind::MalformedSchema,
                format!(
                    "field `{}` is declared in both {prev} and {loc}",
                    field.name
                ),
            )),
            None => {
                seen.insert(field.name.as_str(), loc);
            }
        }
    }

    if let Body::Value { codegen_name, .. } = &op.body
        && let Some(prev) = seen.get(codegen_name.as_str())
    {
        out.push(Violation::new(
            owner,
            "body",
            ViolationKind::MalformedSchema,
            format!("body codegen name `{codegen_name}` clashes with a field in {prev}"),
        ));
    }
}

// --- check 2 ---

/// References held directly by an operation, keyed by field path.
fn op_roots(op: &Operation) -> Vec<(String, QualifiedName)> {
    let mut roots: Vec<(String, QualifiedName)> = op
        .fields()
        .flat_map(|(loc, f)| {
            let path = format!("{loc}.{}", f.name);
            f.field_type
                .references()
                .into_iter()
                .map(move |r| (path.clone(), r.clone()))
        })
        .collect();
    if let Body::Value { value_type, .. } = &op.body {
        roots.extend(
            value_type
                .references()
                .into_iter()
                .map(|r| ("body".to_string(), r.clone())),
        );
    }
    roots
}

fn check_references(
    owner: &str,
    roots: Vec<(String, QualifiedName)>,
    registry: &TypeRegistry,
    out: &mut Vec<Violation>,
) {
    let mut visited: BTreeSet<QualifiedName> = BTreeSet::new();
    let mut stack = roots;
    stack.reverse();

    while let Some((path, name)) = stack.pop() {
        let def = match registry.resolve(&name) {
            Ok(def) => def,
            Err(_) => {
                out.push(Violation::new(
                    owner,
                    path,
                    ViolationKind::UnresolvedType,
                    format!("type `{name}` is not defined"),
                ));
                continue;
            }
        };
        if !visited.insert(def.name().clone()) {
            continue;
        }
        if registry.is_cyclic(def.name()) {
            out.push(Violation::new(
                owner,
                path.as_str(),
                ViolationKind::CyclicType,
                format!("type `{}` contains itself by value", def.name()),
            ));
        }

        let type_name = &def.name().name;
        let mut next: Vec<(String, QualifiedName)> = Vec::new();
        match def {
            TypeDef::Enum(_) => {}
            TypeDef::Class(class) => {
                next.extend(
                    class
                        .extends
                        .iter()
                        .map(|b| (format!("{type_name}.extends"), b.name.clone())),
                );
                for field in &class.fields {
                    next.extend(
                        field
                            .field_type
                            .references()
                            .into_iter()
                            .map(|r| (format!("{type_name}.{}", field.name), r.clone())),
                    );
                }
            }
            TypeDef::Alias(alias) => next.extend(
                alias
                    .target
                    .references()
                    .into_iter()
                    .map(|r| (type_name.clone(), r.clone())),
            ),
        }
        next.reverse();
        stack.extend(next);
    }
}

// --- checks 3 and 4 ---

fn check_contract<'a>(
    owner: &str,
    fields: impl Iterator<Item = (String, &'a FieldSpec)>,
    out: &mut Vec<Violation>,
) {
    for (prefix, field) in fields {
        if field.required && field.has_server_default() {
            out.push(Violation::new(
                owner,
                format!("{prefix}.{}", field.name),
                ViolationKind::InvalidFieldContract,
                format!(
                    "field `{}` is required but has a server default of `{}`",
                    field.name,
                    field.annotations.server_default().unwrap_or_default()
                ),
            ));
        }
    }
}

fn check_definitions(owner: &str, defs: &[&TypeDef], out: &mut Vec<Violation>) {
    for def in defs {
        let type_name = def.name().name.as_str();
        match def {
            TypeDef::Enum(spec) => {
                if spec.variants.is_empty() {
                    out.push(Violation::new(
                        owner,
                        type_name,
                        ViolationKind::MalformedSchema,
                        format!("enum `{type_name}` has no variants"),
                    ));
                }
                let mut seen = BTreeSet::new();
                for variant in &spec.variants {
                    if !seen.insert(variant.wire_name()) {
                        out.push(Violation::new(
                            owner,
                            format!("{type_name}.{}", variant.name),
                            ViolationKind::MalformedSchema,
                            format!(
                                "enum `{type_name}` repeats variant `{}`",
                                variant.wire_name()
                            ),
                        ));
                    }
                }
            }
            TypeDef::Class(class) => {
                let mut seen = BTreeSet::new();
                for field in &class.fields {
                    if !seen.insert(field.name.as_str()) {
                        out.push(Violation::new(
                            owner,
                            format!("{type_name}.{}", field.name),
                            ViolationKind::MalformedSchema,
                            format!(
                                "field `{}` is declared more than once in `{type_name}`",
                                field.name
                            ),
                        ));
                    }
                }
                check_contract(
                    owner,
                    class.fields.iter().map(|f| (type_name.to_string(), f)),
                    out,
                );
            }
            TypeDef::Alias(_) => {}
        }
    }
}

// --- check 5 ---

fn check_availability(op: &Operation, out: &mut Vec<Violation>) {
    let owner = op.name.as_str();
    let mut targets = BTreeSet::new();

    for availability in &op.availability {
        let path = format!("availability.{}", availability.target);
        let mut report = |message: String| {
            out.push(Violation::new(
                owner,
                path.as_str(),
                ViolationKind::MalformedSchema,
                message,
            ));
        };

        if let Err(e) = availability.deployment_target() {
            report(e.to_string());
        }
        if !targets.insert(availability.target.as_str()) {
            report(format!(
                "deployment target `{}` is declared more than once",
                availability.target
            ));
        }
        if let Err(e) = availability.stability_level() {
            report(e.to_string());
        }
        if let Err(e) = availability.visibility_level() {
            report(e.to_string());
        }
        if let Err(e) = availability.since_version() {
            report(e.to_string());
        }
    }
}
