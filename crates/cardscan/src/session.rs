/// Which card the info panel currently shows.
///
/// Owned by the caller and passed to each frame, so the panel is only
/// refreshed when the recognized card changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    last_shown: Option<String>,
}

impl DisplayState {
    pub fn last_shown(&self) -> Option<&str> {
        self.last_shown.as_deref()
    }

    /// Record `identifier` as shown. Returns `true` if it differs from the
    /// previous one.
    pub fn observe(&mut self, identifier: &str) -> bool {
        if self.last_shown.as_deref() == Some(identifier) {
            return false;
        }
        self.last_shown = Some(identifier.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.last_shown = None;
    }
}
