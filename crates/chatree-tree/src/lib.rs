//! chatree tree core.
//!
//! A domain-agnostic recursive tree: positional path addressing, derived
//! activation state, copy-on-write structural operations, and a renderer that
//! turns any node shape into ratatui lines through caller-supplied callbacks.

pub mod activation;
pub mod class;
pub mod error;
pub mod event;
pub mod node;
pub mod ops;
pub mod path;
pub mod render;
pub mod widget;

pub use activation::*;
pub use class::{classes, ClassList, StyleSheet};
pub use error::*;
pub use event::{dispatch, TreeEvent, TreeHandler};
pub use node::*;
pub use path::*;
pub use render::{Decor, Guides, NodeRenderer, NodeView, PlainRenderer, Tree, TreeLayout, TreeRow};
pub use widget::TreeView;
