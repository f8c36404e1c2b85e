mod iter;
mod list;
mod node;
mod tests;

pub use iter::*;
pub use list::*;
pub use node::NodeRef;
pub(crate) use node::{Link, Node};
