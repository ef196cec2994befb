pub mod delays;
pub mod generators;
pub mod rng;

pub use delays::{ConstantDelay, EdgeDelays};
pub use generators::{preferential_attachment_tree, prufer_tree, random_recursive_tree, TreeKind};
pub use rng::TreeRng;
