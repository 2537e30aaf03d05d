/// Track state enumeration for object tracking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Newly created track, hit streak still below the confirmation threshold
    #[default]
    Tentative,
    /// Hit streak has reached the confirmation threshold
    Confirmed,
    /// Missed for too long; the tracker goes back to the pool
    Removed,
}
