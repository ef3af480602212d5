//! Identifier mapping from schema names to Rust names.
//!
//! Schema names arrive in several casings: `snake_case` fields, `PascalCase`
//! types, dotted rest names and legacy names such as `j_v_m_pool` or
//! `FilterPath`. Type names are rendered PascalCase, fields and modules
//! snake_case.

use std::collections::BTreeSet;

use proc_macro2::Ident;
use quote::format_ident;

/// Words that may be written as `r#word`.
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Words that cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Converts a schema name to PascalCase.
///
/// Segments are split on `_`, `.`, `-` and whitespace; each segment keeps its
/// own casing apart from the first letter.
///
/// ## Examples
///
/// ```
/// use apispec_gen::codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("connector.update_pipeline"), "ConnectorUpdatePipeline");
/// assert_eq!(to_pascal_case("j_v_m_pool"), "JVMPool");
/// assert_eq!(to_pascal_case("ServiceType"), "ServiceType");
/// ```
pub fn to_pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '.' || c == '-' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Converts a schema name to snake_case, splitting at case boundaries.
///
/// ## Examples
///
/// ```
/// use apispec_gen::codegen::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("FilterPath"), "filter_path");
/// assert_eq!(to_snake_case("HTTPStatus"), "http_status");
/// assert_eq!(to_snake_case("connector_id"), "connector_id");
/// assert_eq!(to_snake_case("Cluster.NodesStats"), "cluster_nodes_stats");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '.' || c == '-' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Identifier for a struct field or builder method.
///
/// Keywords become raw identifiers; words that cannot be raw gain a trailing
/// underscore, as do names starting with a digit.
pub fn field_ident(name: &str) -> Ident {
    let snake = to_snake_case(name);
    if RAW_KEYWORDS.contains(&snake.as_str()) {
        Ident::new_raw(&snake, proc_macro2::Span::call_site())
    } else if RESERVED.contains(&snake.as_str()) || !starts_like_ident(&snake) {
        format_ident!("_{}", snake.trim_start_matches('_'))
    } else {
        format_ident!("{}", snake)
    }
}

/// Identifier for a type or enum variant.
pub fn type_ident(name: &str) -> Ident {
    let pascal = to_pascal_case(name);
    if RESERVED.contains(&pascal.as_str()) {
        format_ident!("{}_", pascal)
    } else if !starts_like_ident(&pascal) {
        format_ident!("V{}", pascal)
    } else {
        format_ident!("{}", pascal)
    }
}

/// Module file stem for a namespace.
///
/// ## Examples
///
/// ```
/// use apispec_gen::codegen::naming::module_name;
///
/// assert_eq!(module_name("connector.update_pipeline"), "connector_update_pipeline");
/// assert_eq!(module_name("Document.Single.Exists"), "document_single_exists");
/// ```
pub fn module_name(namespace: &str) -> String {
    let name = namespace
        .split(['.', '/'])
        .filter(|s| !s.is_empty())
        .map(to_snake_case)
        .collect::<Vec<_>>()
        .join("_");
    if RAW_KEYWORDS.contains(&name.as_str())
        || RESERVED.contains(&name.as_str())
        || !starts_like_ident(&name)
    {
        format!("{name}_")
    } else {
        name
    }
}

/// PascalCase stem shared by the types generated for an operation.
pub fn operation_type_name(rest_name: &str) -> String {
    to_pascal_case(rest_name)
}

/// Every type name the emitter derives from a rest name.
pub fn generated_type_names(rest_name: &str, suffix: &str) -> BTreeSet<String> {
    let base = operation_type_name(rest_name);
    [
        format!("{base}{suffix}"),
        format!("{base}{suffix}Builder"),
        format!("{base}Body"),
        format!("{base}Response"),
    ]
    .into_iter()
    .collect()
}

fn starts_like_ident(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_of_legacy_names() {
        assert_eq!(to_pascal_case("tokenizer_base"), "TokenizerBase");
        assert_eq!(to_pascal_case("request"), "Request");
        assert_eq!(to_pascal_case("inference.put_anthropic"), "InferencePutAnthropic");
    }

    #[test]
    fn snake_case_keeps_digits() {
        assert_eq!(to_snake_case("top_p"), "top_p");
        assert_eq!(to_snake_case("Parent"), "parent");
        assert_eq!(to_snake_case("ipv4Address"), "ipv4_address");
        assert_eq!(to_snake_case("ngram2Gram"), "ngram2_gram");
    }

    #[test]
    fn keyword_fields_are_raw() {
        assert_eq!(field_ident("type").to_string(), "r#type");
        assert_eq!(field_ident("match").to_string(), "r#match");
        assert_eq!(field_ident("self").to_string(), "_self");
        assert_eq!(field_ident("2xx").to_string(), "_2xx");
        assert_eq!(field_ident("FilterPath").to_string(), "filter_path");
    }

    #[test]
    fn type_identifiers() {
        assert_eq!(type_ident("j_v_m_pool").to_string(), "JVMPool");
        assert_eq!(type_ident("self").to_string(), "Self_");
        assert_eq!(type_ident("1m").to_string(), "V1m");
    }

    #[test]
    fn module_names() {
        assert_eq!(module_name("inference.put_anthropic"), "inference_put_anthropic");
        assert_eq!(module_name("Cluster.NodesStats"), "cluster_nodes_stats");
        assert_eq!(module_name("type"), "type_");
    }

    #[test]
    fn generated_names_follow_suffix() {
        let names = generated_type_names("connector.update_pipeline", "Params");
        assert!(names.contains("ConnectorUpdatePipelineParams"));
        assert!(names.contains("ConnectorUpdatePipelineParamsBuilder"));
        assert!(names.contains("ConnectorUpdatePipelineBody"));
        assert!(names.contains("ConnectorUpdatePipelineResponse"));
    }
}
