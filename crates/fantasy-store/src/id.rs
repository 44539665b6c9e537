//! Identifier allocation

use crate::record::RecordId;

/// Next identifier for a collection: one past the largest present id, or 1
/// when the collection is empty.
///
/// Only ids currently present are considered, so deleting the record holding
/// the maximum id makes that id available again. Ids below the maximum are
/// never reused.
///
/// Returns `None` once `u64::MAX` is in use.
pub fn next_id<I>(existing: I) -> Option<RecordId>
where
    I: IntoIterator<Item = RecordId>,
{
    let max = existing
        .into_iter()
        .map(RecordId::value)
        .max()
        .unwrap_or(0);
    max.checked_add(1).map(RecordId::new)
}
