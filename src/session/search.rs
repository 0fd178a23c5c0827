/// Staged search input and the commit length gate.
///
/// A term may be committed when it is empty (meaning "everything") or has
/// at least `min_length` characters. Anything in between stays local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInput {
    pending: String,
    min_length: usize,
}

impl SearchInput {
    pub fn new(min_length: usize) -> Self {
        Self {
            pending: String::new(),
            min_length,
        }
    }

    pub fn set(&mut self, term: impl Into<String>) {
        self.pending = term.into();
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn can_commit(&self) -> bool {
        is_committable(&self.pending, self.min_length)
    }

    /// Inline hint shown while the staged term is too short to commit
    pub fn hint(&self) -> Option<String> {
        if self.can_commit() {
            None
        } else {
            Some(format!("Enter at least {} characters to search", self.min_length))
        }
    }
}

/// Length is counted in characters, not bytes
pub fn is_committable(term: &str, min_length: usize) -> bool {
    term.is_empty() || term.chars().count() >= min_length
}
