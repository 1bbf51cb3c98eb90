use crate::{DocId, InvertedIndex, Result};

/// Remove every duplicate document, keeping the lowest id of each group.
/// Returns the removed ids in ascending order.
pub fn remove_duplicates(index: &mut InvertedIndex) -> Result<Vec<DocId>> {
    let duplicates = index.duplicates();
    let mut removed = Vec::with_capacity(duplicates.len());
    for id in duplicates {
        index.remove(id)?;
        tracing::info!(id, "found duplicate document id");
        removed.push(id);
    }
    Ok(removed)
}
