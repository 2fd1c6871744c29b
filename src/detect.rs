use crate::domain::AvailabilitySnapshot;

/// Decide whether an availability change is worth notifying about.
///
/// New availability data always notifies, disappearing data never does, and
/// two snapshots only differ if some field differs in type or value.
pub fn has_changed(
    old: Option<&AvailabilitySnapshot>,
    new: Option<&AvailabilitySnapshot>,
) -> bool {
    match (old, new) {
        (Some(_), None) => false,
        (None, Some(_)) => true,
        (None, None) => false,
        (Some(old), Some(new)) => old != new,
    }
}
