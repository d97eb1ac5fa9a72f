use crate::analysis::bbox::Bbox;

/// A box placed in reading order.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedBox {
    /// Short identifier; shared across a page by header/footer boxes.
    pub id: String,
    /// Position in the predicted reading order, as reported by the model.
    pub rank: usize,
    /// Rectangle in image-pixel coordinates.
    pub bbox: Bbox,
    /// Label joined positionally from the labels file, if any.
    pub label: Option<String>,
}
