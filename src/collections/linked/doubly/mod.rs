mod iter;
mod list;
mod node;

pub use iter::*;
pub use list::*;
pub use node::NodeRef;
pub(crate) use node::{Link, Node};
