//! Tree core: recursive rendering of any [`TreeNode`] into ratatui lines.
//!
//! The core knows nothing about what a node means. Per-node content, class
//! names and visibility come from a [`NodeRenderer`]; activation is derived
//! from the activated path on every pass. The result is a [`TreeLayout`]: one
//! [`TreeRow`] per visible node, in depth-first pre-order, which the caller
//! draws with [`crate::TreeView`] and uses for hit testing and navigation.

use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::class::{self, ClassList, StyleSheet};
use crate::event::TreeEvent;
use crate::node::TreeNode;
use crate::path::NodeId;

/// What a renderer produced for one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeView {
    /// Draw the node with this content (possibly empty).
    Content(Text<'static>),
    /// Skip the node and its whole subtree.
    Hidden,
}

impl NodeView {
    pub fn empty() -> Self {
        Self::Content(Text::default())
    }

    pub fn line(line: impl Into<Line<'static>>) -> Self {
        Self::Content(Text::from(line.into()))
    }

    pub fn lines(lines: Vec<Line<'static>>) -> Self {
        Self::Content(Text::from(lines))
    }
}

/// Per-node rendering capabilities. Every method is optional.
pub trait NodeRenderer<N> {
    /// Inner content of the node.
    fn render(&self, path: &NodeId, node: &N, activation: Activation) -> NodeView {
        let _ = (path, node, activation);
        NodeView::empty()
    }

    /// Extra space-separated class names for the node.
    fn class_name(&self, path: &NodeId, node: &N) -> String {
        let _ = (path, node);
        String::new()
    }
}

/// Renderer that draws every node with empty content.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl<N> NodeRenderer<N> for PlainRenderer {}

/// Connector glyph families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Guides {
    #[default]
    Unicode,
    Rounded,
    Ascii,
}

struct GuideSet {
    branch: &'static str,
    last: &'static str,
    vertical: &'static str,
    blank: &'static str,
}

impl Guides {
    fn set(self, compact: bool) -> GuideSet {
        match (self, compact) {
            (Guides::Unicode, false) => GuideSet {
                branch: "├── ",
                last: "└── ",
                vertical: "│   ",
                blank: "    ",
            },
            (Guides::Rounded, false) => GuideSet {
                branch: "├── ",
                last: "╰── ",
                vertical: "│   ",
                blank: "    ",
            },
            (Guides::Ascii, false) => GuideSet {
                branch: "+-- ",
                last: "`-- ",
                vertical: "|   ",
                blank: "    ",
            },
            (Guides::Unicode, true) => GuideSet {
                branch: "├ ",
                last: "└ ",
                vertical: "│ ",
                blank: "  ",
            },
            (Guides::Rounded, true) => GuideSet {
                branch: "├ ",
                last: "╰ ",
                vertical: "│ ",
                blank: "  ",
            },
            (Guides::Ascii, true) => GuideSet {
                branch: "+ ",
                last: "` ",
                vertical: "| ",
                blank: "  ",
            },
        }
    }
}

/// Layout facts about a row's position among its visible siblings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decor {
    pub first_child: bool,
    pub last_child: bool,
    pub many_children: bool,
    pub depth: usize,
}

/// One visible node.
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub path: NodeId,
    /// Content lines, connector guides included.
    pub lines: Vec<Line<'static>>,
    pub decor: Decor,
    pub classes: ClassList,
    pub activation: Activation,
    pub style: Style,
}

impl TreeRow {
    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

/// Tree render configuration for one pass.
pub struct Tree<'a, N, R: ?Sized> {
    root: &'a N,
    renderer: &'a R,
    activated: Option<&'a NodeId>,
    styles: Option<&'a StyleSheet>,
    guides: Guides,
    show_root: bool,
    compact_below: Option<u16>,
}

impl<'a, N, R> Tree<'a, N, R>
where
    N: TreeNode,
    R: NodeRenderer<N> + ?Sized,
{
    pub fn new(root: &'a N, renderer: &'a R) -> Self {
        Self {
            root,
            renderer,
            activated: None,
            styles: None,
            guides: Guides::default(),
            show_root: true,
            compact_below: None,
        }
    }

    pub fn activated(mut self, activated: Option<&'a NodeId>) -> Self {
        self.activated = activated;
        self
    }

    pub fn styles(mut self, styles: &'a StyleSheet) -> Self {
        self.styles = Some(styles);
        self
    }

    pub fn guides(mut self, guides: Guides) -> Self {
        self.guides = guides;
        self
    }

    /// Whether the root gets a row of its own. Its children are drawn
    /// either way.
    pub fn show_root(mut self, show: bool) -> Self {
        self.show_root = show;
        self
    }

    /// Collapse the guides to two columns when the viewport is narrower
    /// than `width`.
    pub fn compact_below(mut self, width: Option<u16>) -> Self {
        self.compact_below = width;
        self
    }

    /// Render the whole tree for a viewport `width` columns wide.
    pub fn layout(&self, width: u16) -> TreeLayout {
        let defaults;
        let styles = match self.styles {
            Some(styles) => styles,
            None => {
                defaults = StyleSheet::tree_defaults();
                &defaults
            }
        };
        let compact = self.compact_below.is_some_and(|below| width < below);
        let pass = Pass {
            renderer: self.renderer,
            activated: self.activated,
            styles,
            guide_style: styles.get(class::GUIDE).unwrap_or_default(),
            glyphs: self.guides.set(compact),
            compact,
        };

        let mut rows = Vec::new();
        let root_path = NodeId::root();
        let activation = Activation::of(&root_path, self.activated);
        if let NodeView::Content(content) = self.renderer.render(&root_path, self.root, activation) {
            if self.show_root {
                let placement = Placement {
                    first: true,
                    last: true,
                    lead: String::new(),
                    cont: String::new(),
                };
                pass.visit(self.root, root_path, content, activation, placement, &mut rows);
            } else {
                pass.children(self.root, &root_path, "", &mut rows);
            }
        }

        tracing::trace!(rows = rows.len(), compact, "tree layout");
        TreeLayout::new(rows)
    }
}

struct Placement {
    first: bool,
    last: bool,
    lead: String,
    cont: String,
}

struct Pass<'a, R: ?Sized> {
    renderer: &'a R,
    activated: Option<&'a NodeId>,
    styles: &'a StyleSheet,
    guide_style: Style,
    glyphs: GuideSet,
    compact: bool,
}

impl<R: ?Sized> Pass<'_, R> {
    fn visit<N>(
        &self,
        node: &N,
        path: NodeId,
        content: Text<'static>,
        activation: Activation,
        placement: Placement,
        rows: &mut Vec<TreeRow>,
    ) where
        N: TreeNode,
        R: NodeRenderer<N>,
    {
        let row_index = rows.len();
        let mut classes = ClassList::new();
        classes
            .add(class::NODE)
            .extend_str(&self.renderer.class_name(&path, node))
            .toggle(class::NODE_ACTIVATED, activation.partial)
            .toggle(class::NODE_EXACT, activation.exact)
            .toggle(class::FIRST_NODE, placement.first)
            .toggle(class::LAST_NODE, placement.last)
            .toggle(class::COMPACT, self.compact);
        let style = self.styles.resolve(&classes);

        let mut lines = Vec::with_capacity(content.lines.len().max(1));
        let mut content_lines = content.lines.into_iter();
        let first = content_lines.next().unwrap_or_default();
        lines.push(self.compose(&placement.lead, first, style));
        for line in content_lines {
            lines.push(self.compose(&placement.cont, line, style));
        }

        rows.push(TreeRow {
            path: path.clone(),
            lines,
            decor: Decor {
                first_child: placement.first,
                last_child: placement.last,
                many_children: false,
                depth: path.depth(),
            },
            classes,
            activation,
            style,
        });

        let visible = self.children(node, &path, &placement.cont, rows);
        if visible > 1 {
            let row = &mut rows[row_index];
            row.decor.many_children = true;
            row.classes.add(class::MANY_CHILDREN);
        }
    }

    /// Render the children of `node`, returning how many were visible.
    fn children<N>(&self, node: &N, path: &NodeId, prefix: &str, rows: &mut Vec<TreeRow>) -> usize
    where
        N: TreeNode,
        R: NodeRenderer<N>,
    {
        let visible: Vec<_> = node
            .children()
            .iter()
            .enumerate()
            .filter_map(|(i, child)| {
                let child_path = path.child(i);
                let activation = Activation::of(&child_path, self.activated);
                match self.renderer.render(&child_path, child, activation) {
                    NodeView::Content(content) => Some((child, child_path, content, activation)),
                    NodeView::Hidden => None,
                }
            })
            .collect();

        let count = visible.len();
        for (i, (child, child_path, content, activation)) in visible.into_iter().enumerate() {
            let last = i + 1 == count;
            let placement = Placement {
                first: i == 0,
                last,
                lead: format!(
                    "{prefix}{}",
                    if last { self.glyphs.last } else { self.glyphs.branch }
                ),
                cont: format!(
                    "{prefix}{}",
                    if last { self.glyphs.blank } else { self.glyphs.vertical }
                ),
            };
            self.visit(child, child_path, content, activation, placement, rows);
        }
        count
    }

    fn compose(&self, guide: &str, content: Line<'static>, style: Style) -> Line<'static> {
        let mut spans = Vec::with_capacity(content.spans.len() + 1);
        if !guide.is_empty() {
            spans.push(Span::styled(guide.to_string(), self.guide_style));
        }
        let base = style.patch(content.style);
        spans.extend(
            content
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content, base.patch(span.style))),
        );
        Line::from(spans)
    }
}

/// Rows of one render pass, with lookups for hit testing and navigation.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    rows: Vec<TreeRow>,
    /// First line of each row.
    offsets: Vec<usize>,
    height: usize,
}

impl TreeLayout {
    fn new(rows: Vec<TreeRow>) -> Self {
        let mut offsets = Vec::with_capacity(rows.len());
        let mut height = 0;
        for row in &rows {
            offsets.push(height);
            height += row.height();
        }
        Self {
            rows,
            offsets,
            height,
        }
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of lines.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line<'static>> {
        self.rows.iter().flat_map(|row| row.lines.iter())
    }

    fn index_of(&self, path: &NodeId) -> Option<usize> {
        self.rows.iter().position(|row| row.path == *path)
    }

    pub fn row(&self, path: &NodeId) -> Option<&TreeRow> {
        self.index_of(path).map(|i| &self.rows[i])
    }

    /// Row covering line `line` (0-based from the top of the layout).
    pub fn row_at(&self, line: usize) -> Option<&TreeRow> {
        if line >= self.height {
            return None;
        }
        let i = match self.offsets.binary_search(&line) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        self.rows.get(i)
    }

    /// First line of the row for `path`.
    pub fn offset_of(&self, path: &NodeId) -> Option<usize> {
        self.index_of(path).map(|i| self.offsets[i])
    }

    /// The activation event for a click on `line`.
    pub fn click(&self, line: usize) -> Option<TreeEvent> {
        self.row_at(line).map(|row| TreeEvent::Activate(row.path.clone()))
    }

    /// Next visible path in display order; the first row when `current` is
    /// absent or not visible, the last row when already at the end.
    pub fn next_path(&self, current: Option<&NodeId>) -> Option<NodeId> {
        let i = match current.and_then(|path| self.index_of(path)) {
            Some(i) => (i + 1).min(self.rows.len().saturating_sub(1)),
            None => 0,
        };
        self.rows.get(i).map(|row| row.path.clone())
    }

    pub fn prev_path(&self, current: Option<&NodeId>) -> Option<NodeId> {
        let i = match current.and_then(|path| self.index_of(path)) {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.rows.get(i).map(|row| row.path.clone())
    }

    /// Scroll offset that keeps the row for `path` inside a viewport of
    /// `viewport` lines, moving `scroll` as little as possible.
    pub fn scroll_for(&self, path: &NodeId, viewport: usize, scroll: usize) -> usize {
        let max_scroll = self.height.saturating_sub(viewport);
        let Some(i) = self.index_of(path) else {
            return scroll.min(max_scroll);
        };
        let top = self.offsets[i];
        let bottom = top + self.rows[i].height();
        let scroll = if top < scroll {
            top
        } else if bottom > scroll + viewport {
            bottom.saturating_sub(viewport).min(top)
        } else {
            scroll
        };
        scroll.min(max_scroll)
    }
}
