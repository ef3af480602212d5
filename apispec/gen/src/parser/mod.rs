//! Schema unit parser.
//!
//! Turns the text of one `.ts` schema unit into an [`Operation`] (when the
//! unit declares a `Request` interface) and the enum, class and alias
//! definitions declared next to it.
//!
//! ## Recovery
//!
//! Problems inside a member list are recorded as [`ParseIssue`]s and parsing
//! resumes at the next member, so one unit reports every problem at once.
//! A lexical error, or a syntax error outside a member list, ends the unit.
//!
//! ## Naming
//!
//! Types declared in the unit are scoped to the unit's namespace: the rest
//! name when there is one, else a legacy `namespace:` tag, else the unit's
//! directory. References to them are rewritten to the scoped name; every
//! other reference stays bare and resolves against the shared library.
//!
//! ## Examples
//!
//! ```
//! use apispec_gen::parser::parse_unit;
//!
//! let unit = parse_unit(
//!     "specification/demo/ping/PingRequest.ts",
//!     r#"
//!     /**
//!      * @rest_spec_name demo.ping
//!      */
//!     export interface Request extends RequestBase {
//!       urls: [{ path: '/_ping/{target}' methods: ['GET'] }]
//!       path_parts: { target: Target }
//!     }
//!     export enum Target { local, remote }
//!     "#,
//! );
//!
//! assert!(unit.issues.is_empty());
//! let op = unit.operation.unwrap();
//! assert_eq!(op.name, "demo.ping");
//! assert_eq!(op.inline_types[0].to_string(), "demo.ping::Target");
//! ```

pub mod doc;
pub mod lexer;

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

use apispec_define::annotations::keys;
use apispec_define::{
    AliasSpec, Availability, Body, ClassSpec, EnumSpec, EnumVariant, FieldSpec, FieldType,
    HttpMethod, Operation, Primitive, Privileges, QualifiedName, TypeDef, TypeRef, UrlTemplate,
};
use serde::Serialize;
use tracing::{debug, trace};

use self::doc::{DocBlock, is_valid_doc_id};
use self::lexer::{Token, TokenKind, tokenize};

/// Name of the interface that declares an operation.
const REQUEST_INTERFACE: &str = "Request";

/// One problem found while parsing a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    /// 1-based source line.
    pub line: usize,
    /// Dotted path of the offending element, e.g. `body.service`.
    pub path: String,
    pub message: String,
}

impl ParseIssue {
    fn new(line: usize, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The result of parsing one schema unit.
#[derive(Debug, Clone, Default)]
pub struct ParsedUnit {
    /// Path of the unit relative to the corpus root.
    pub path: String,
    /// Namespace the unit's types are scoped to.
    pub namespace: String,
    /// Names brought in by `import` statements.
    pub imports: Vec<String>,
    pub operation: Option<Operation>,
    /// Types declared in the unit, already scoped to `namespace`.
    pub types: Vec<TypeDef>,
    pub issues: Vec<ParseIssue>,
}

impl ParsedUnit {
    /// The name violations of this unit are reported under.
    pub fn owner(&self) -> &str {
        match &self.operation {
            Some(op) if !op.name.is_empty() => &op.name,
            _ => &self.namespace,
        }
    }

    /// Whether the unit declares types only.
    pub fn is_type_only(&self) -> bool {
        self.operation.is_none()
    }
}

/// Parses one schema unit. Never fails; problems are returned in `issues`.
pub fn parse_unit(path: &str, source: &str) -> ParsedUnit {
    let mut unit = ParsedUnit {
        path: path.to_string(),
        ..ParsedUnit::default()
    };

    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            unit.namespace = path_namespace(path);
            unit.issues.push(ParseIssue::new(e.line, "", e.message));
            return unit;
        }
    };

    let mut parser = Parser {
        tokens,
        pos: 0,
        issues: Vec::new(),
        namespace_tag: None,
    };

    let mut declarations = Declarations::default();
    if let Err(issue) = parser.parse_declarations(&mut declarations) {
        parser.issues.push(issue);
    }

    unit.imports = declarations.imports;
    unit.issues = parser.issues;

    unit.namespace = match &declarations.operation {
        Some(op) if !op.name.is_empty() => op.name.clone(),
        _ => parser
            .namespace_tag
            .unwrap_or_else(|| path_namespace(path)),
    };

    let mut local = BTreeSet::new();
    let mut types = Vec::new();
    for (line, def) in declarations.types {
        let name = def.name().name.clone();
        if !local.insert(name.clone()) {
            unit.issues.push(ParseIssue::new(
                line,
                name.as_str(),
                format!("type `{name}` is declared more than once in this unit"),
            ));
            continue;
        }
        types.push(def);
    }

    for def in &mut types {
        scope_definition(def, &unit.namespace, &local);
    }

    if let Some(mut op) = declarations.operation {
        if op.name.is_empty() {
            op.name = unit.namespace.clone();
        }
        scope_operation(&mut op, &unit.namespace, &local);
        op.inline_types = types.iter().map(|t| t.name().clone()).collect();
        unit.operation = Some(op);
    }
    unit.types = types;

    debug!(
        path,
        namespace = %unit.namespace,
        types = unit.types.len(),
        issues = unit.issues.len(),
        "parsed unit"
    );
    unit
}

fn path_namespace(path: &str) -> String {
    let parent = Path::new(path).parent().unwrap_or(Path::new(""));
    let parts: Vec<_> = parent
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|c| !c.is_empty() && *c != "." && *c != "..")
        .collect();
    if parts.is_empty() {
        Path::new(path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unit")
            .to_string()
    } else {
        parts.join(".")
    }
}

fn scope_ref(r: &mut TypeRef, namespace: &str, local: &BTreeSet<String>) {
    if r.name.is_shared() && local.contains(&r.name.name) {
        r.name = QualifiedName::scoped(namespace, r.name.name.clone());
    }
}

fn scope_fields(fields: &mut [FieldSpec], namespace: &str, local: &BTreeSet<String>) {
    for f in fields {
        f.field_type.qualify(namespace, local);
    }
}

fn scope_definition(def: &mut TypeDef, namespace: &str, local: &BTreeSet<String>) {
    match def {
        TypeDef::Enum(e) => e.name = QualifiedName::scoped(namespace, e.name.name.clone()),
        TypeDef::Class(c) => {
            c.name = QualifiedName::scoped(namespace, c.name.name.clone());
            for base in &mut c.extends {
                scope_ref(base, namespace, local);
            }
            scope_fields(&mut c.fields, namespace, local);
        }
        TypeDef::Alias(a) => {
            a.name = QualifiedName::scoped(namespace, a.name.name.clone());
            a.target.qualify(namespace, local);
        }
    }
}

fn scope_operation(op: &mut Operation, namespace: &str, local: &BTreeSet<String>) {
    scope_fields(&mut op.path_parts, namespace, local);
    scope_fields(&mut op.query_parameters, namespace, local);
    match &mut op.body {
        Body::None => {}
        Body::Properties(fields) => scope_fields(fields, namespace, local),
        Body::Value { value_type, .. } => value_type.qualify(namespace, local),
    }
}

#[derive(Default)]
struct Declarations {
    imports: Vec<String>,
    operation: Option<Operation>,
    /// Declared types with the line they start on.
    types: Vec<(usize, TypeDef)>,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    issues: Vec<ParseIssue>,
    namespace_tag: Option<String>,
}

impl Parser {
    // --- token access ---

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// True when the next tokens open a new member (`name:`, `name?` or a doc block).
    fn starts_member(&self) -> bool {
        match self.peek() {
            Some(TokenKind::Doc(_)) => true,
            Some(TokenKind::Ident(_) | TokenKind::Str(_)) => {
                matches!(self.peek_at(1), Some(TokenKind::Punct(':' | '?')))
            }
            _ => false,
        }
    }

    fn is_punct(&self, c: char) -> bool {
        matches!(self.peek(), Some(TokenKind::Punct(p)) if *p == c)
    }

    fn is_ident(&self, word: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Ident(w)) if w == word)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.is_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.is_ident(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_separator(&mut self) {
        while self.eat_punct(';') || self.eat_punct(',') {}
    }

    fn unexpected(&self, path: &str, expected: &str) -> ParseIssue {
        let found = match self.peek() {
            Some(TokenKind::Ident(w)) => format!("`{w}`"),
            Some(TokenKind::Str(s)) => format!("'{s}'"),
            Some(TokenKind::Number(n)) => n.clone(),
            Some(TokenKind::Doc(_)) => "a doc comment".to_string(),
            Some(TokenKind::Punct(c)) => format!("`{c}`"),
            None => "end of unit".to_string(),
        };
        ParseIssue::new(self.line(), path, format!("expected {expected}, found {found}"))
    }

    fn expect_punct(&mut self, c: char, path: &str) -> Result<(), ParseIssue> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.unexpected(path, &format!("`{c}`")))
        }
    }

    fn expect_ident(&mut self, path: &str, what: &str) -> Result<String, ParseIssue> {
        match self.peek() {
            Some(TokenKind::Ident(w)) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            _ => Err(self.unexpected(path, what)),
        }
    }

    fn expect_str(&mut self, path: &str, what: &str) -> Result<String, ParseIssue> {
        match self.peek() {
            Some(TokenKind::Str(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected(path, what)),
        }
    }

    /// Collects and merges consecutive doc blocks.
    fn take_docs(&mut self) -> DocBlock {
        let mut merged = DocBlock::default();
        while let Some(TokenKind::Doc(raw)) = self.peek() {
            let block = DocBlock::parse(raw);
            self.pos += 1;
            merged.merge(block);
        }
        if let Some(ns) = merged.tag(keys::NAMESPACE)
            && self.namespace_tag.is_none()
        {
            self.namespace_tag = Some(ns.to_string());
        }
        merged
    }

    /// Skips the rest of a broken member.
    ///
    /// Stops before a `}` that closes the enclosing list, after a `;` or `,`
    /// at the same depth, or at the first token on a later line.
    fn recover_member(&mut self, failed_line: usize) {
        let mut depth = 0usize;
        while let Some(token) = self.tokens.get(self.pos) {
            match &token.kind {
                TokenKind::Punct('{' | '[' | '(' | '<') => depth += 1,
                TokenKind::Punct('}' | ']' | ')' | '>') if depth > 0 => depth -= 1,
                TokenKind::Punct('}') => return,
                TokenKind::Punct(';' | ',') if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                _ if depth == 0 && token.line > failed_line => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn check_doc_ids(&mut self, path: &str, docs: &DocBlock, line: usize) {
        for key in [keys::DOC_ID, keys::EXT_DOC_ID] {
            for value in docs.tags_named(key) {
                if !is_valid_doc_id(value) {
                    self.issues.push(ParseIssue::new(
                        line,
                        path,
                        format!("@{key} `{value}` is not a valid doc id"),
                    ));
                }
            }
        }
    }

    // --- declarations ---

    fn parse_declarations(&mut self, out: &mut Declarations) -> Result<(), ParseIssue> {
        loop {
            let docs = self.take_docs();
            self.eat_ident("export");
            let line = self.line();

            let keyword = match self.peek() {
                None => return Ok(()),
                Some(TokenKind::Ident(w)) => w.clone(),
                Some(_) => return Err(self.unexpected("", "a declaration")),
            };
            trace!(keyword = %keyword, line, "declaration");

            match keyword.as_str() {
                "import" => self.parse_import(&mut out.imports)?,
                "interface" | "class" => {
                    self.pos += 1;
                    let name = self.expect_ident("", "a type name")?;
                    if name == REQUEST_INTERFACE {
                        let op = self.parse_request(docs, line)?;
                        if out.operation.is_some() {
                            self.issues.push(ParseIssue::new(
                                line,
                                REQUEST_INTERFACE,
                                "unit declares more than one Request interface",
                            ));
                        } else {
                            out.operation = Some(op);
                        }
                    } else {
                        let class = self.parse_class(name, docs, line)?;
                        out.types.push((line, TypeDef::Class(class)));
                    }
                }
                "enum" => {
                    self.pos += 1;
                    let spec = self.parse_enum(docs, line)?;
                    out.types.push((line, TypeDef::Enum(spec)));
                }
                "type" => {
                    self.pos += 1;
                    let spec = self.parse_alias(docs, line)?;
                    out.types.push((line, TypeDef::Alias(spec)));
                }
                _ => return Err(self.unexpected("", "a declaration")),
            }
        }
    }

    fn parse_import(&mut self, imports: &mut Vec<String>) -> Result<(), ParseIssue> {
        self.pos += 1;
        self.eat_ident("type");
        if self.eat_punct('{') {
            while !self.eat_punct('}') {
                let name = self.expect_ident("import", "an imported name")?;
                if self.eat_ident("as") {
                    imports.push(self.expect_ident("import", "an alias")?);
                } else {
                    imports.push(name);
                }
                self.eat_punct(',');
            }
        } else if self.eat_punct('*') {
            if !self.eat_ident("as") {
                return Err(self.unexpected("import", "`as`"));
            }
            imports.push(self.expect_ident("import", "a namespace alias")?);
        } else {
            imports.push(self.expect_ident("import", "an imported name")?);
        }
        if !self.eat_ident("from") {
            return Err(self.unexpected("import", "`from`"));
        }
        self.expect_str("import", "a module path")?;
        self.eat_punct(';');
        Ok(())
    }

    /// Skips `<...>` generic parameters, reporting them as unsupported.
    fn skip_generic_params(&mut self, path: &str) -> Result<(), ParseIssue> {
        if !self.is_punct('<') {
            return Ok(());
        }
        self.issues.push(ParseIssue::new(
            self.line(),
            path,
            "generic type parameters are not supported",
        ));
        let mut depth = 0usize;
        while let Some(token) = self.advance() {
            match token.kind {
                TokenKind::Punct('<') => depth += 1,
                TokenKind::Punct('>') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(self.unexpected(path, "`>`"))
    }

    fn parse_heritage(&mut self, path: &str) -> Result<Vec<TypeRef>, ParseIssue> {
        let mut bases = Vec::new();
        if self.eat_ident("extends") {
            loop {
                let base = self.expect_ident(path, "a base type")?;
                self.skip_generic_params(path)?;
                bases.push(TypeRef::new(QualifiedName::shared(base)));
                if !self.eat_punct(',') {
                    break;
                }
            }
        }
        if self.eat_ident("implements") {
            loop {
                self.expect_ident(path, "an interface name")?;
                self.skip_generic_params(path)?;
                if !self.eat_punct(',') {
                    break;
                }
            }
        }
        Ok(bases)
    }

    fn parse_class(
        &mut self,
        name: String,
        docs: DocBlock,
        line: usize,
    ) -> Result<ClassSpec, ParseIssue> {
        self.skip_generic_params(&name)?;
        let extends = self.parse_heritage(&name)?;
        self.check_doc_ids(&name, &docs, line);
        let fields = self.parse_object_fields(&name)?;
        Ok(ClassSpec {
            name: QualifiedName::shared(name),
            extends,
            fields,
            annotations: docs.annotations(),
            description: docs.description,
        })
    }

    fn parse_enum(&mut self, docs: DocBlock, line: usize) -> Result<EnumSpec, ParseIssue> {
        let name = self.expect_ident("", "an enum name")?;
        self.check_doc_ids(&name, &docs, line);
        self.expect_punct('{', &name)?;

        let mut variants = Vec::new();
        loop {
            let vdocs = self.take_docs();
            if self.eat_punct('}') {
                break;
            }
            if self.peek().is_none() {
                return Err(self.unexpected(&name, "`}`"));
            }
            let vline = self.line();
            match self.parse_variant(&name, vdocs) {
                Ok(v) => variants.push(v),
                Err(issue) => {
                    self.issues.push(issue);
                    self.recover_member(vline);
                }
            }
            self.eat_separator();
        }

        Ok(EnumSpec {
            name: QualifiedName::shared(name),
            variants,
            annotations: docs.annotations(),
            description: docs.description,
        })
    }

    fn parse_variant(&mut self, owner: &str, docs: DocBlock) -> Result<EnumVariant, ParseIssue> {
        let name = match self.peek() {
            Some(TokenKind::Ident(w) | TokenKind::Str(w)) => w.clone(),
            _ => return Err(self.unexpected(owner, "an enum variant")),
        };
        self.pos += 1;
        let mut variant = EnumVariant::new(name);
        if self.eat_punct('=') {
            let path = format!("{owner}.{}", variant.name);
            match self.peek() {
                Some(TokenKind::Str(v) | TokenKind::Number(v) | TokenKind::Ident(v)) => {
                    variant.wire_value = Some(v.clone());
                    self.pos += 1;
                }
                _ => return Err(self.unexpected(&path, "a variant value")),
            }
        }
        variant.annotations = docs.annotations();
        variant.description = docs.description;
        Ok(variant)
    }

    fn parse_alias(&mut self, docs: DocBlock, line: usize) -> Result<AliasSpec, ParseIssue> {
        let name = self.expect_ident("", "an alias name")?;
        self.skip_generic_params(&name)?;
        self.check_doc_ids(&name, &docs, line);
        self.expect_punct('=', &name)?;
        let target = self.parse_type(&name)?;
        self.eat_punct(';');
        Ok(AliasSpec {
            name: QualifiedName::shared(name),
            target,
            annotations: docs.annotations(),
            description: docs.description,
        })
    }

    // --- members ---

    /// Parses `{ member* }`, recovering from broken members.
    fn parse_object_fields(&mut self, owner: &str) -> Result<Vec<FieldSpec>, ParseIssue> {
        self.expect_punct('{', owner)?;
        let mut fields = Vec::new();
        loop {
            let docs = self.take_docs();
            if self.eat_punct('}') {
                break;
            }
            if self.peek().is_none() {
                return Err(self.unexpected(owner, "`}`"));
            }
            let line = self.line();
            match self.parse_field(owner, docs) {
                Ok(field) => fields.push(field),
                Err(issue) => {
                    self.issues.push(issue);
                    self.recover_member(line);
                }
            }
            self.eat_separator();
        }
        Ok(fields)
    }

    fn parse_field(&mut self, owner: &str, docs: DocBlock) -> Result<FieldSpec, ParseIssue> {
        let line = self.line();
        let name = match self.peek() {
            Some(TokenKind::Ident(w) | TokenKind::Str(w)) => w.clone(),
            _ => return Err(self.unexpected(owner, "a field name")),
        };
        self.pos += 1;
        let path = format!("{owner}.{name}");
        let optional = self.eat_punct('?');

        let missing_type = || {
            ParseIssue::new(line, path.as_str(), format!("field `{name}` has no declared type"))
        };
        let colon_line = self.line();
        if !self.eat_punct(':') {
            return Err(missing_type());
        }
        if matches!(self.peek(), None | Some(TokenKind::Punct('}' | ';' | ','))) {
            return Err(missing_type());
        }
        if self.line() > colon_line && self.starts_member() {
            return Err(missing_type());
        }
        let field_type = self.parse_type(&path)?;

        self.check_doc_ids(&path, &docs, line);
        let mut field = if optional {
            FieldSpec::optional(name, field_type)
        } else {
            FieldSpec::required(name, field_type)
        };
        field.annotations = docs.annotations();
        field.description = docs.description;
        Ok(field)
    }

    // --- type expressions ---

    fn parse_type(&mut self, path: &str) -> Result<FieldType, ParseIssue> {
        self.eat_punct('|');
        let mut members = vec![self.parse_postfix(path)?];
        while self.eat_punct('|') {
            members.push(self.parse_postfix(path)?);
        }
        if members.len() == 1 {
            Ok(members.remove(0))
        } else {
            Ok(FieldType::Union(members))
        }
    }

    fn parse_postfix(&mut self, path: &str) -> Result<FieldType, ParseIssue> {
        let mut ty = self.parse_primary(path)?;
        while self.is_punct('[') && matches!(self.peek_at(1), Some(TokenKind::Punct(']'))) {
            self.pos += 2;
            ty = FieldType::array_of(ty);
        }
        Ok(ty)
    }

    fn parse_primary(&mut self, path: &str) -> Result<FieldType, ParseIssue> {
        if self.eat_punct('(') {
            let inner = self.parse_type(path)?;
            self.expect_punct(')', path)?;
            return Ok(inner);
        }

        let name = match self.peek() {
            Some(TokenKind::Str(_)) => {
                self.pos += 1;
                return Ok(FieldType::Primitive(Primitive::String));
            }
            Some(TokenKind::Ident(w)) => w.clone(),
            _ => return Err(self.unexpected(path, "a type")),
        };
        let line = self.line();
        self.pos += 1;

        if self.is_punct('<') {
            let args = self.parse_type_args(path)?;
            return match (name.as_str(), args.as_slice()) {
                ("Array", [item]) => Ok(FieldType::array_of(item.clone())),
                ("Dictionary" | "Record" | "map" | "Map", [key, value]) => {
                    Ok(FieldType::map_of(key.clone(), value.clone()))
                }
                _ => Err(ParseIssue::new(
                    line,
                    path,
                    format!("unsupported generic type `{name}` with {} argument(s)", args.len()),
                )),
            };
        }

        Ok(match Primitive::from_str(&name) {
            Ok(p) => FieldType::Primitive(p),
            Err(_) => FieldType::named(name),
        })
    }

    fn parse_type_args(&mut self, path: &str) -> Result<Vec<FieldType>, ParseIssue> {
        self.expect_punct('<', path)?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type(path)?);
            if self.eat_punct('>') {
                return Ok(args);
            }
            self.expect_punct(',', path)?;
        }
    }

    // --- the Request interface ---

    fn parse_request(&mut self, docs: DocBlock, line: usize) -> Result<Operation, ParseIssue> {
        self.skip_generic_params(REQUEST_INTERFACE)?;
        self.parse_heritage(REQUEST_INTERFACE)?;
        self.check_doc_ids(REQUEST_INTERFACE, &docs, line);

        let mut op = Operation::default();
        match docs.tag(keys::REST_SPEC_NAME) {
            Some(name) if !name.is_empty() => op.name = name.to_string(),
            _ => self.issues.push(ParseIssue::new(
                line,
                REQUEST_INTERFACE,
                "Request interface has no @rest_spec_name",
            )),
        }
        for value in docs.tags_named("availability") {
            match Availability::parse_annotation(value) {
                Ok(a) => op.availability.push(a),
                Err(e) => self
                    .issues
                    .push(ParseIssue::new(line, "availability", e.to_string())),
            }
        }
        op.privileges = Privileges {
            cluster: split_list(docs.tags_named("cluster_privileges")),
            index: split_list(docs.tags_named("index_privileges")),
        };
        op.annotations = docs.annotations();
        op.description = docs.description;

        self.expect_punct('{', REQUEST_INTERFACE)?;
        loop {
            let mdocs = self.take_docs();
            if self.eat_punct('}') {
                break;
            }
            if self.peek().is_none() {
                return Err(self.unexpected(REQUEST_INTERFACE, "`}`"));
            }
            let mline = self.line();
            if let Err(issue) = self.parse_request_member(&mut op, mdocs) {
                self.issues.push(issue);
                self.recover_member(mline);
            }
            self.eat_separator();
        }
        Ok(op)
    }

    fn parse_request_member(&mut self, op: &mut Operation, docs: DocBlock) -> Result<(), ParseIssue> {
        let line = self.line();
        let member = self.expect_ident(REQUEST_INTERFACE, "a request member")?;
        self.eat_punct('?');
        self.expect_punct(':', &member)?;

        match member.as_str() {
            "urls" => op.urls = self.parse_urls()?,
            "path_parts" => op.path_parts = self.parse_object_fields("path_parts")?,
            "query_parameters" => {
                op.query_parameters = self.parse_object_fields("query_parameters")?
            }
            "body" if self.is_punct('{') => {
                op.body = Body::Properties(self.parse_object_fields("body")?);
            }
            "body" => {
                let value_type = self.parse_type("body")?;
                match docs.annotations().codegen_name() {
                    Some(name) if !name.is_empty() => {
                        op.body = Body::Value {
                            codegen_name: name.to_string(),
                            value_type,
                            description: docs.description,
                        };
                    }
                    _ => {
                        return Err(ParseIssue::new(
                            line,
                            "body",
                            format!("body of type `{value_type}` has no @codegen_name"),
                        ));
                    }
                }
            }
            other => {
                return Err(ParseIssue::new(
                    line,
                    other,
                    format!("unknown Request member `{other}`"),
                ));
            }
        }
        Ok(())
    }

    fn parse_urls(&mut self) -> Result<Vec<UrlTemplate>, ParseIssue> {
        self.expect_punct('[', "urls")?;
        let mut urls = Vec::new();
        while !self.eat_punct(']') {
            let idx = urls.len();
            let at = format!("urls[{idx}]");
            let line = self.line();
            self.expect_punct('{', &at)?;

            let mut path = None;
            let mut methods = None;
            while !self.eat_punct('}') {
                let key = self.expect_ident(&at, "`path` or `methods`")?;
                self.expect_punct(':', &at)?;
                match key.as_str() {
                    "path" => path = Some(self.expect_str(&at, "a path string")?),
                    "methods" => methods = Some(self.parse_methods(&at)?),
                    other => {
                        return Err(ParseIssue::new(
                            self.line(),
                            at.as_str(),
                            format!("unknown URL template key `{other}`"),
                        ));
                    }
                }
                self.eat_separator();
            }
            self.eat_separator();

            let Some(path) = path else {
                self.issues
                    .push(ParseIssue::new(line, at.as_str(), "URL template has no path"));
                continue;
            };
            let methods = methods.unwrap_or_else(|| {
                self.issues.push(ParseIssue::new(
                    line,
                    format!("{at}.methods"),
                    format!("URL template `{path}` has no method list"),
                ));
                Vec::new()
            });
            urls.push(UrlTemplate::new(path, methods));
        }
        Ok(urls)
    }

    fn parse_methods(&mut self, at: &str) -> Result<Vec<HttpMethod>, ParseIssue> {
        self.expect_punct('[', at)?;
        let mut methods = Vec::new();
        while !self.eat_punct(']') {
            let line = self.line();
            let m = self.expect_str(at, "a method string")?;
            match HttpMethod::from_str(&m) {
                Ok(method) => methods.push(method),
                Err(_) => self.issues.push(ParseIssue::new(
                    line,
                    format!("{at}.methods"),
                    format!("unknown HTTP method `{m}`"),
                )),
            }
            self.eat_punct(',');
        }
        Ok(methods)
    }
}

fn split_list<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
