use tracing::*;

/// Pairs each box, in predicted order, with a label by position.
///
/// The i-th box receives `labels[i % labels.len()]`, wrapping around when
/// there are fewer labels than boxes.
///
/// Precondition: `labels` must be listed in the same order the model
/// returns the boxes. The join is purely positional; when the predicted
/// order differs from the order the labels file was written in, boxes get
/// the labels of other boxes. Callers own that guarantee.
///
/// An empty label list leaves every box unlabeled.
///
/// # Example
/// ```
/// use readorder_core::relation::join_labels;
///
/// let labels = vec!["a".to_string(), "b".to_string()];
/// let joined = join_labels(3, &labels);
/// assert_eq!(joined, vec![Some("a".to_string()), Some("b".to_string()), Some("a".to_string())]);
/// ```
pub fn join_labels(box_count: usize, labels: &[String]) -> Vec<Option<String>> {
    if labels.is_empty() {
        if box_count > 0 {
            warn!("No labels to join onto {} boxes", box_count);
        }
        return vec![None; box_count];
    }

    if labels.len() != box_count {
        debug!(
            "Joining {} labels onto {} boxes by position",
            labels.len(),
            box_count
        );
    }

    (0..box_count)
        .map(|idx| Some(labels[idx % labels.len()].clone()))
        .collect()
}
