pub mod chain;
pub mod identify;
pub mod labels;

pub use chain::{Relation, RelationDocument, build_relations};
pub use identify::{BoxIdentifier, fresh_id};
pub use labels::join_labels;
