//! Class-name composition and the style sheet that resolves class lists into
//! ratatui styles.

use ratatui::style::{Color, Modifier, Style};

pub const NODE: &str = "node";
pub const NODE_ACTIVATED: &str = "node-activated";
pub const NODE_EXACT: &str = "node-exact";
pub const FIRST_NODE: &str = "first-node";
pub const LAST_NODE: &str = "last-node";
pub const MANY_CHILDREN: &str = "many-children";
pub const GUIDE: &str = "guide";
pub const COMPACT: &str = "compact";

/// Ordered, de-duplicated set of class names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: impl Into<String>) -> &mut Self {
        let class = class.into();
        if !class.is_empty() && !self.0.contains(&class) {
            self.0.push(class);
        }
        self
    }

    /// Add `class` only when `enabled`.
    pub fn toggle(&mut self, class: &str, enabled: bool) -> &mut Self {
        if enabled {
            self.add(class);
        }
        self
    }

    /// Add every whitespace-separated class in `classes`.
    pub fn extend_str(&mut self, classes: &str) -> &mut Self {
        for class in classes.split_whitespace() {
            self.add(class);
        }
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Compose a space-separated class string from `(class, enabled)` pairs.
pub fn classes<'a>(pairs: impl IntoIterator<Item = (&'a str, bool)>) -> String {
    let mut list = ClassList::new();
    for (class, enabled) in pairs {
        list.toggle(class, enabled);
    }
    list.to_string()
}

/// Ordered `class → style` rules.
///
/// Resolution patches every rule whose class is present, in sheet order, so
/// a later rule overrides an earlier one for the attributes it sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    rules: Vec<(String, Style)>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the classes the tree core itself emits.
    pub fn tree_defaults() -> Self {
        let mut sheet = Self::new();
        sheet
            .set(GUIDE, Style::default().fg(Color::DarkGray))
            .set(NODE, Style::default().fg(Color::Gray))
            .set(NODE_ACTIVATED, Style::default().fg(Color::Yellow))
            .set(
                NODE_EXACT,
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            );
        sheet
    }

    /// Set the rule for `class`. An existing rule keeps its place in the
    /// order; a new one goes last.
    pub fn set(&mut self, class: impl Into<String>, style: Style) -> &mut Self {
        let class = class.into();
        match self.rules.iter_mut().find(|(c, _)| *c == class) {
            Some((_, existing)) => *existing = style,
            None => self.rules.push((class, style)),
        }
        self
    }

    pub fn get(&self, class: &str) -> Option<Style> {
        self.rules
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, style)| *style)
    }

    pub fn resolve(&self, classes: &ClassList) -> Style {
        self.rules
            .iter()
            .filter(|(class, _)| classes.contains(class))
            .fold(Style::default(), |style, (_, rule)| style.patch(*rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
