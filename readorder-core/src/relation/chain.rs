use serde::{Deserialize, Serialize};

use crate::{
    consts::{CONTINUES_TO, RELATION_DIRECTION, RELATION_TYPE},
    layout::element::OrderedBox,
};

/// A directed "continues-to" edge between two boxes.
///
/// Field order matches the serialized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: String,
    pub to_id: String,
    pub labels: Vec<String>,
    pub from_id: String,
    pub direction: String,
}

impl Relation {
    pub fn continues_to(from: &OrderedBox, to: &OrderedBox) -> Self {
        Self {
            kind: RELATION_TYPE.to_string(),
            to_id: to.id.clone(),
            labels: vec![CONTINUES_TO.to_string()],
            from_id: from.id.clone(),
            direction: RELATION_DIRECTION.to_string(),
        }
    }
}

/// The JSON document written for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDocument {
    pub bboxes_relation_json: Vec<Relation>,
}

/// Links every box to the next one in order.
///
/// `n` boxes yield `n - 1` relations (none for `n <= 1`). Boxes sharing a
/// header/footer identifier are not merged, so one identifier can appear in
/// several edges.
pub fn build_relations(boxes: &[OrderedBox]) -> RelationDocument {
    RelationDocument {
        bboxes_relation_json: boxes
            .windows(2)
            .map(|pair| Relation::continues_to(&pair[0], &pair[1]))
            .collect(),
    }
}
