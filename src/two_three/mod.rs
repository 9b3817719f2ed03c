mod node;
mod tree;
mod tree_iter;

pub use node::NodeRef;
pub use tree::TwoThreeSet;
pub use tree_iter::{Cursor, Iter};

// A node holds at most two values at rest. The third slot is only used while
// an insertion waits for its split
const MAX_VALUES: usize = 3;
const MAX_CHILDREN: usize = MAX_VALUES + 1;
