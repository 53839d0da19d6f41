/// State of the "Add New Item" name-entry dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDialog {
    open: bool,
    draft: String,
}

impl EntryDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close without submitting. The draft is kept for the next open.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Take the draft and close the dialog.
    pub(crate) fn submit(&mut self) -> String {
        self.open = false;
        std::mem::take(&mut self.draft)
    }
}
