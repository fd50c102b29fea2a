use crate::models::{AttributeId, AttributeSet, PreferenceSet};

/// Build the binary feature vector for a (user, team) pair.
///
/// Position `i` is 1 when the user wants `order[i]` and the team has it.
/// `order` must be the ordering the active model was trained on, not the
/// live attribute list.
#[inline]
pub fn encode(
    preferences: &PreferenceSet,
    attributes: &AttributeSet,
    order: &[AttributeId],
) -> Vec<f64> {
    order
        .iter()
        .map(|&id| {
            if preferences.is_set(id) && attributes.is_set(id) {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}
