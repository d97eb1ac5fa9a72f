use std::collections::{HashMap, HashSet};

use tracing::*;
use uuid::Uuid;

use crate::{consts::ID_LEN, inference::model::RankedBox, layout::element::OrderedBox};

/// Returns a fresh random identifier of [`ID_LEN`] lowercase hex characters.
pub fn fresh_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Assigns identifiers to ordered boxes.
///
/// Every box gets a fresh identifier, except boxes whose label is one of the
/// configured header/footer labels: all boxes sharing such a label reuse the
/// identifier handed to its first occurrence on the page.
pub struct BoxIdentifier<G = fn() -> String> {
    header_footer: HashSet<String>,
    assigned: HashMap<String, String>,
    generator: G,
}

impl BoxIdentifier {
    pub fn new<I, S>(header_footer: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_generator(header_footer, fresh_id as fn() -> String)
    }
}

impl<G: FnMut() -> String> BoxIdentifier<G> {
    pub fn with_generator<I, S>(header_footer: I, generator: G) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header_footer: header_footer.into_iter().map(Into::into).collect(),
            assigned: HashMap::new(),
            generator,
        }
    }

    /// Identifier for the next box in order.
    pub fn assign(&mut self, label: Option<&str>) -> String {
        let id = (self.generator)();

        match label {
            Some(label) if self.header_footer.contains(label) => self
                .assigned
                .entry(label.to_string())
                .or_insert(id)
                .clone(),
            _ => id,
        }
    }

    /// Builds the ordered boxes of a page from pixel-space model output and
    /// the labels joined onto it, one label slot per box.
    pub fn identify(
        &mut self,
        ranked: &[RankedBox],
        labels: Vec<Option<String>>,
    ) -> Vec<OrderedBox> {
        if labels.len() != ranked.len() {
            warn!(
                "{} label slots for {} boxes, unmatched boxes stay unlabeled",
                labels.len(),
                ranked.len()
            );
        }

        let mut labels = labels.into_iter();
        ranked
            .iter()
            .map(|item| {
                let label = labels.next().flatten();
                OrderedBox {
                    id: self.assign(label.as_deref()),
                    rank: item.rank,
                    bbox: item.bbox,
                    label,
                }
            })
            .collect()
    }
}
