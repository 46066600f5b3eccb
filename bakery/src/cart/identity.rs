use std::fmt::{self, Display};

/// What makes two cart additions the same line: entry name plus size label.
///
/// Compared field by field, so a name that happens to end with a size label
/// never collides with another entry.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct IdentityKey {
    pub entry_name: String,
    /// Empty when the entry has no size variants.
    pub size_label: String,
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size_label.is_empty() {
            write!(f, "{}", self.entry_name)
        } else {
            write!(f, "{} ({})", self.entry_name, self.size_label)
        }
    }
}

impl IdentityKey {
    pub fn new(entry_name: &str, size_label: &str) -> Self {
        Self {
            entry_name: entry_name.to_owned(),
            size_label: size_label.to_owned(),
        }
    }
}
