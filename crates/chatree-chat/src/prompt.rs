//! Prompt templates with `${name}` / `${name:hint}` placeholders.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^:}]+?)(?::([^}]*))?\}").expect("placeholder pattern is valid")
});

const PREVIEW_BLANK: &str = "__";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldKind {
    #[default]
    Text,
    List,
}

/// A filled-in field: a single string or a list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

/// Turns a field value into the text spliced into the prompt.
#[derive(Clone)]
pub struct Transform(Arc<dyn Fn(&FieldValue) -> String + Send + Sync>);

impl Transform {
    pub fn new(f: impl Fn(&FieldValue) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Text as-is; list items one per line.
    pub fn identity() -> Self {
        Self::new(|value| match value {
            FieldValue::Single(text) => text.clone(),
            FieldValue::List(items) => items.join("\n"),
        })
    }

    /// `heading` followed by one `- item` line per non-blank item, or
    /// nothing at all when there are no items.
    pub fn bulleted(heading: impl Into<String>) -> Self {
        let heading = heading.into();
        Self::new(move |value| {
            let items: Vec<&str> = match value {
                FieldValue::Single(text) => vec![text.as_str()],
                FieldValue::List(items) => items.iter().map(String::as_str).collect(),
            };
            let bullets: Vec<String> = items
                .into_iter()
                .filter(|item| !item.trim().is_empty())
                .map(|item| format!("- {item}"))
                .collect();
            if bullets.is_empty() {
                String::new()
            } else {
                format!("{heading}\n{}", bullets.join("\n"))
            }
        })
    }

    pub fn apply(&self, value: &FieldValue) -> String {
        (self.0)(value)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    pub kind: FieldKind,
    pub transform: Transform,
}

impl FieldConfig {
    pub fn text() -> Self {
        Self::default()
    }

    pub fn list(transform: Transform) -> Self {
        Self {
            kind: FieldKind::List,
            transform,
        }
    }
}

/// A placeholder as it appears in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub hint: Option<String>,
}

impl Field {
    /// Human label: `healthCircumstances` becomes `Health Circumstances`.
    pub fn label(&self) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut prev_lower = false;
        for c in self.name.chars() {
            if c == '_' || c == '-' || c.is_whitespace() {
                words.push(String::new());
                prev_lower = false;
                continue;
            }
            if (c.is_uppercase() && prev_lower) || words.is_empty() {
                words.push(String::new());
            }
            if let Some(word) = words.last_mut() {
                if word.is_empty() {
                    word.extend(c.to_uppercase());
                } else {
                    word.push(c);
                }
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
        words.retain(|word| !word.is_empty());
        words.join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    source: String,
    fields: Vec<Field>,
    configs: HashMap<String, FieldConfig>,
}

impl PromptTemplate {
    /// Collect the placeholders of `source` in order of first appearance.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut fields: Vec<Field> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&source) {
            let name = caps[1].trim().to_string();
            if fields.iter().any(|field| field.name == name) {
                continue;
            }
            fields.push(Field {
                name,
                hint: caps.get(2).map(|hint| hint.as_str().to_string()),
            });
        }
        Self {
            source,
            fields,
            configs: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, config: FieldConfig) -> Self {
        self.configs.insert(name.into(), config);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Configuration of `name`; unconfigured fields are plain text.
    pub fn config(&self, name: &str) -> FieldConfig {
        self.configs.get(name).cloned().unwrap_or_default()
    }

    /// The template with every placeholder blanked out.
    pub fn preview(&self) -> String {
        PLACEHOLDER.replace_all(&self.source, PREVIEW_BLANK).into_owned()
    }

    /// Splice transformed values into the template. Each value replaces the
    /// first placeholder of its name; unfilled placeholders stay as written.
    pub fn materialize(&self, values: &BTreeMap<String, FieldValue>) -> String {
        let mut prompt = self.source.clone();
        for (name, value) in values {
            let range = PLACEHOLDER
                .captures_iter(&prompt)
                .find(|caps| caps[1].trim() == name.as_str())
                .and_then(|caps| caps.get(0))
                .map(|m| m.range());
            if let Some(range) = range {
                let text = self.config(name).transform.apply(value);
                prompt.replace_range(range, &text);
            }
        }
        prompt
    }
}

/// Fold flat form entries into field values. `name.N` entries accumulate
/// into a list in entry order; a bare `name` is a single value.
pub fn collect_fields<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, FieldValue>
where
    K: AsRef<str>,
    V: Into<String>,
{
    let mut values = BTreeMap::new();
    for (key, value) in entries {
        let value = value.into();
        match key.as_ref().split_once('.') {
            Some((name, _index)) => {
                let entry = values
                    .entry(name.to_string())
                    .or_insert_with(|| FieldValue::List(Vec::new()));
                if matches!(entry, FieldValue::Single(_)) {
                    *entry = FieldValue::List(Vec::new());
                }
                if let FieldValue::List(items) = entry {
                    items.push(value);
                }
            }
            None => {
                values.insert(key.as_ref().to_string(), FieldValue::Single(value));
            }
        }
    }
    values
}
