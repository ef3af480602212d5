//! URL template helpers.
//!
//! Templates use `{param}` placeholders, e.g. `/_connector/{connector_id}/_pipeline`.
//! Placeholder names come from [`UrlTemplate::placeholders`].

use apispec_define::UrlTemplate;

/// Substitutes path parameters with their values in one left-to-right pass.
///
/// Each placeholder is replaced once; substituted values are never scanned
/// again. Placeholders without a value, and an unclosed `{`, are left in place.
///
/// ## Examples
///
/// ```
/// use apispec_gen::template::substitute_path_params;
///
/// let path = substitute_path_params(
///     "/_inference/{task_type}/{inference_id}",
///     &[("inference_id", "{task_type}"), ("task_type", "completion")]
/// );
/// assert_eq!(path, "/_inference/completion/{task_type}");
/// ```
pub fn substitute_path_params(path: &str, params: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rest = &rest[open..];
            break;
        };
        let name = &after[..close];
        match params.iter().find(|(k, _)| *k == name) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    result.push_str(rest);
    result
}

/// Converts a template to a `format!` string, replacing each `{param}` with `{}`.
///
/// ## Examples
///
/// ```
/// use apispec_gen::template::build_format_string;
///
/// assert_eq!(build_format_string("/{index}/_doc/{id}"), "/{}/_doc/{}");
/// ```
pub fn build_format_string(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut in_param = false;

    for c in path.chars() {
        match c {
            '{' => {
                in_param = true;
                result.push_str("{}");
            }
            '}' if in_param => in_param = false,
            _ if !in_param => result.push(c),
            _ => {}
        }
    }

    result
}

/// Orders templates from most to least specific.
///
/// More placeholders is more specific. Ties keep declaration order.
pub fn by_specificity(urls: &[UrlTemplate]) -> Vec<&UrlTemplate> {
    let mut ordered: Vec<&UrlTemplate> = urls.iter().collect();
    ordered.sort_by_key(|u| std::cmp::Reverse(u.placeholders().len()));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use apispec_define::HttpMethod;

    #[test]
    fn substitute_multiple_params() {
        assert_eq!(
            substitute_path_params(
                "/_inference/{task_type}/{inference_id}",
                &[("task_type", "completion"), ("inference_id", "claude")]
            ),
            "/_inference/completion/claude"
        );
    }

    #[test]
    fn substitute_missing_param_unchanged() {
        assert_eq!(
            substitute_path_params("/_connector/{connector_id}", &[]),
            "/_connector/{connector_id}"
        );
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        assert_eq!(
            substitute_path_params(
                "/_inference/{task_type}/{id}",
                &[("id", "{task_type}"), ("task_type", "completion")]
            ),
            "/_inference/completion/{task_type}"
        );
        assert_eq!(
            substitute_path_params(
                "/_inference/{task_type}/{id}",
                &[("task_type", "{id}"), ("id", "claude")]
            ),
            "/_inference/{id}/claude"
        );
    }

    #[test]
    fn substitution_agrees_with_format_string() {
        let template = "/{index}/_doc/{id}";
        assert_eq!(build_format_string(template), "/{}/_doc/{}");
        let (index, id) = ("{id}", "doc-1");
        assert_eq!(
            substitute_path_params(template, &[("index", index), ("id", id)]),
            format!("/{}/_doc/{}", index, id)
        );
    }

    #[test]
    fn unclosed_brace_is_kept_verbatim() {
        assert_eq!(
            substitute_path_params("/_cat/{index", &[("index", "logs")]),
            "/_cat/{index"
        );
    }

    #[test]
    fn format_string_without_params_is_identity() {
        assert_eq!(build_format_string("/_cat/indices"), "/_cat/indices");
    }

    #[test]
    fn specificity_prefers_more_placeholders() {
        let urls = vec![
            UrlTemplate::new("/_inference/{id}", vec![HttpMethod::Put]),
            UrlTemplate::new("/_inference/{task_type}/{id}", vec![HttpMethod::Put]),
            UrlTemplate::new("/_inference/{other}", vec![HttpMethod::Put]),
        ];
        let ordered: Vec<_> = by_specificity(&urls).iter().map(|u| u.path.as_str()).collect();
        assert_eq!(
            ordered,
            vec!["/_inference/{task_type}/{id}", "/_inference/{id}", "/_inference/{other}"]
        );
    }
}
