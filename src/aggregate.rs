use crate::action::{BranchTag, JointKey};
use crate::error::SearchError;
use crate::matrix::PayoffMatrix;

/// Unions matrices scored in different candidate states into one.
///
/// Every key of a source is re-tagged with that source's branch, so the same
/// nominal reply seen in two states becomes two distinct columns. A re-tagged
/// key that already exists is a [`SearchError::BranchKeyCollision`]. Sources
/// with pruned rows can only be merged alone, since a partial row minimum from
/// one state says nothing about the others.
pub fn merge(sources: Vec<(BranchTag, PayoffMatrix)>) -> Result<PayoffMatrix, SearchError> {
    let Some(perspective) = sources.first().map(|(_, m)| m.perspective()) else {
        return Err(SearchError::EmptyMatrix);
    };

    let several = sources.len() > 1;
    let mut merged = PayoffMatrix::new(perspective);
    for (tag, source) in sources {
        let parts = source.into_parts();
        if parts.perspective != perspective {
            return Err(SearchError::PerspectiveMismatch {
                expected: perspective,
                found: parts.perspective,
            });
        }
        if several && !parts.pruned.is_empty() {
            return Err(SearchError::PrunedSource { branch: tag });
        }
        for mine in parts.rows {
            merged.declare_row(mine);
        }
        for reply in &parts.columns {
            merged.declare_reply(reply.action.clone(), tag);
        }
        for mine in &parts.pruned {
            merged.mark_pruned(mine);
        }
        // Walk cells in source column order so the merged matrix stays
        // deterministic regardless of hash order.
        let mut cells = parts.cells;
        for reply in parts.columns {
            let keys: Vec<JointKey> = cells
                .keys()
                .filter(|key| key.theirs == reply.action && key.branch == reply.branch)
                .cloned()
                .collect();
            for key in keys {
                if let Some(payoff) = cells.remove(&key) {
                    let tagged = JointKey::in_branch(key.mine, key.theirs, tag);
                    if merged.insert(tagged.clone(), payoff).is_some() {
                        return Err(SearchError::BranchKeyCollision { key: tagged });
                    }
                }
            }
        }
        for failure in parts.failures {
            let key = JointKey::in_branch(failure.key.mine, failure.key.theirs, tag);
            merged.record_failure(key, failure.error);
        }
    }
    Ok(merged)
}
