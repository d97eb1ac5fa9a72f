use crate::layout::element::OrderedBox;

/// The ordered, identified boxes of one page image.
#[derive(Debug, Clone)]
pub struct Page {
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<OrderedBox>,
}

impl Page {
    pub fn ids(&self) -> Vec<&str> {
        self.boxes.iter().map(|ordered| ordered.id.as_str()).collect()
    }
}
