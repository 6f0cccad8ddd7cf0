//! Tree drawing for `{:#?}` output.
//!
//! ```text
//! ┓
//! ┣━━━━━━┓ Node(1)
//! ┃      ┣━ 10
//! ┃      ┗━ 20
//! ┣━ 30
//! ┗━━━━━━┓ Node(2)
//!        ┣━ 30
//!        ┗━ 40
//! ```

use std::fmt::{self, Debug, Formatter};

use super::arena::NodeId;
use super::node::Node;
use super::tree::TreeCore;

impl<K: Ord + Clone + Debug, V: Clone> TreeCore<K, V> {
    pub(crate) fn dump(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "┓")?;
        self.dump_node(self.root, String::new(), f)
    }

    fn dump_node(&self, id: NodeId, prefix: String, f: &mut Formatter<'_>) -> fmt::Result {
        match self.arena.get(id) {
            Some(Node::Leaf(leaf)) => {
                for (i, entry) in leaf.entries.iter().enumerate() {
                    let weld = if i + 1 == leaf.entries.len() { "┗" } else { "┣" };
                    writeln!(f, "{prefix}{weld}━ {:?}", entry.key)?;
                }
                Ok(())
            }
            Some(Node::Internal(node)) => {
                let children: Vec<NodeId> = node.children().collect();
                for (i, child) in children.iter().enumerate() {
                    let is_last = i + 1 == children.len();
                    if i > 0 {
                        writeln!(f, "{prefix}┣━ {:?}", node.routers[i - 1].key)?;
                    }
                    let weld = if is_last { "┗" } else { "┣" };
                    writeln!(f, "{prefix}{weld}━━━━━━┓ {child}")?;

                    let next_prefix = prefix.clone() + if is_last { "       " } else { "┃      " };
                    self.dump_node(*child, next_prefix, f)?;
                }
                Ok(())
            }
            None => writeln!(f, "{prefix}✗ {id} missing"),
        }
    }
}
