use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Widget};

use crate::render::TreeLayout;

/// Draws a [`TreeLayout`] starting `scroll` lines down.
pub struct TreeView<'a> {
    layout: &'a TreeLayout,
    scroll: usize,
    block: Option<Block<'a>>,
}

impl<'a> TreeView<'a> {
    pub fn new(layout: &'a TreeLayout) -> Self {
        Self {
            layout,
            scroll: 0,
            block: None,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for TreeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        for (y, line) in self
            .layout
            .lines()
            .skip(self.scroll)
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_line(inner.x, inner.y + y as u16, line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LabelNode;
    use crate::path::NodeId;
    use crate::render::{NodeRenderer, NodeView, Tree};
    use crate::Activation;

    struct Labels;

    impl NodeRenderer<LabelNode> for Labels {
        fn render(&self, _: &NodeId, node: &LabelNode, _: Activation) -> NodeView {
            NodeView::line(node.payload.label.clone())
        }
    }

    fn rows(buf: &Buffer) -> Vec<String> {
        let width = buf.area.width as usize;
        buf.content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_draws_scrolled_window() {
        let root = LabelNode::labelled("r")
            .with_child(LabelNode::labelled("a"))
            .with_child(LabelNode::labelled("b"));
        let layout = Tree::new(&root, &Labels).layout(10);
        let area = Rect::new(0, 0, 8, 2);
        let mut buf = Buffer::empty(area);
        TreeView::new(&layout).scroll(1).render(area, &mut buf);
        assert_eq!(rows(&buf), vec!["├── a   ", "└── b   "]);
    }
}
