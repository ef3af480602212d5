//! Doc block interpretation.
//!
//! A doc block holds free text plus `@tag value` lines. Legacy units use two
//! further forms: a `namespace:X` line, and a block holding a single bare
//! `snake_case` flag such as `ambiguous_origin`.

use apispec_define::Annotations;
use apispec_define::annotations::keys;

/// The merged content of one or more consecutive doc blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub description: Option<String>,
    /// `@tag value` pairs in source order. Tags may repeat.
    pub tags: Vec<(String, String)>,
    pub flags: Vec<String>,
}

impl DocBlock {
    /// Interprets the raw text of a single `/** */` block.
    ///
    /// ## Examples
    ///
    /// ```
    /// use apispec_gen::parser::doc::DocBlock;
    ///
    /// let doc = DocBlock::parse("\n * Update the pipeline.\n * @doc_id connector-update-pipeline\n ");
    /// assert_eq!(doc.description.as_deref(), Some("Update the pipeline."));
    /// assert_eq!(doc.tag("doc_id"), Some("connector-update-pipeline"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let lines: Vec<&str> = raw.lines().map(strip_decoration).collect();
        let content: Vec<&str> = lines.iter().copied().filter(|l| !l.is_empty()).collect();

        let mut doc = DocBlock::default();

        if let [single] = content.as_slice()
            && is_flag(single)
        {
            doc.flags.push(single.to_string());
            return doc;
        }

        let mut text: Vec<&str> = Vec::new();
        for line in lines {
            if let Some(tag) = line.strip_prefix('@') {
                let (name, value) = tag.split_once(char::is_whitespace).unwrap_or((tag, ""));
                doc.tags.push((name.to_string(), value.trim().to_string()));
            } else if let Some(ns) = line.strip_prefix("namespace:") {
                doc.tags
                    .push((keys::NAMESPACE.to_string(), ns.trim().to_string()));
            } else {
                text.push(line);
            }
        }

        while text.first().is_some_and(|l| l.is_empty()) {
            text.remove(0);
        }
        while text.last().is_some_and(|l| l.is_empty()) {
            text.pop();
        }
        if !text.is_empty() {
            doc.description = Some(text.join("\n"));
        }

        doc
    }

    /// Appends a following block. Descriptions are joined with a blank line.
    pub fn merge(&mut self, other: DocBlock) {
        self.description = match (self.description.take(), other.description) {
            (Some(a), Some(b)) => Some(format!("{a}\n\n{b}")),
            (a, b) => a.or(b),
        };
        self.tags.extend(other.tags);
        self.flags.extend(other.flags);
    }

    /// First value of `name`.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `name`, in source order.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Tags and flags as an annotation map. A repeated tag keeps its last value;
    /// a flag maps to the empty string.
    pub fn annotations(&self) -> Annotations {
        let mut annotations = Annotations::default();
        for (k, v) in &self.tags {
            annotations.insert(k.clone(), v.clone());
        }
        for flag in &self.flags {
            annotations.insert(flag.clone(), "");
        }
        annotations
    }
}

fn strip_decoration(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix('*').map(str::trim).unwrap_or(line)
}

fn is_flag(line: &str) -> bool {
    line.contains('_')
        && line
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Whether `value` is a well-formed doc id: `[a-z0-9][a-z0-9._-]*`.
pub fn is_valid_doc_id(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_keeps_paragraphs() {
        let doc = DocBlock::parse("\n * Create an endpoint.\n *\n * Wait for deployment.\n ");
        assert_eq!(
            doc.description.as_deref(),
            Some("Create an endpoint.\n\nWait for deployment.")
        );
    }

    #[test]
    fn repeated_tags_are_kept_in_order() {
        let doc = DocBlock::parse(
            "\n * @availability stack since=8.12.0 stability=beta\n * @availability serverless stability=beta\n",
        );
        let values: Vec<_> = doc.tags_named("availability").collect();
        assert_eq!(
            values,
            vec!["stack since=8.12.0 stability=beta", "serverless stability=beta"]
        );
        assert!(doc.description.is_none());
    }

    #[test]
    fn legacy_namespace_line() {
        let doc = DocBlock::parse("namespace:Document.Single.Exists ");
        assert_eq!(doc.tag("namespace"), Some("Document.Single.Exists"));
        assert!(doc.flags.is_empty());
    }

    #[test]
    fn legacy_flag_block() {
        let doc = DocBlock::parse("ambiguous_origin");
        assert_eq!(doc.flags, vec!["ambiguous_origin".to_string()]);
        assert!(doc.annotations().contains("ambiguous_origin"));
    }

    #[test]
    fn single_word_sentence_is_not_a_flag() {
        let doc = DocBlock::parse(" Deprecated ");
        assert!(doc.flags.is_empty());
        assert_eq!(doc.description.as_deref(), Some("Deprecated"));
    }

    #[test]
    fn merge_joins_consecutive_blocks() {
        let mut doc = DocBlock::parse("\n * The connector pipeline object\n ");
        doc.merge(DocBlock::parse(" @codegen_name pipeline "));
        assert_eq!(doc.description.as_deref(), Some("The connector pipeline object"));
        assert_eq!(doc.tag("codegen_name"), Some("pipeline"));
    }

    #[test]
    fn valueless_tag() {
        let doc = DocBlock::parse(" @stability");
        assert_eq!(doc.tag("stability"), Some(""));
    }

    #[test]
    fn doc_id_format() {
        assert!(is_valid_doc_id("inference-api-put-anthropic"));
        assert!(is_valid_doc_id("anothropic-models"));
        assert!(is_valid_doc_id("8.x_notes"));
        assert!(!is_valid_doc_id(""));
        assert!(!is_valid_doc_id("Bad Id"));
        assert!(!is_valid_doc_id("-leading"));
        assert!(!is_valid_doc_id("https://example.com"));
    }
}
