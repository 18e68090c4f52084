/// Side channel for non-fatal findings. Every entry is mirrored through
/// `log::warn!` and kept for the caller, so a batch driver can tell a clean
/// conversion from one that succeeded with warnings.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<String>,
}

impl Diagnostics {
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.entries.push(message);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}
