use crate::services::{ProgressDialog, ProgressIndicator, ProgressOpts};

/// A progress dialog that gets dismissed on drop
///
/// The dialog is dismissed exactly once, either through [`Progress::dismiss`]
/// or when the guard goes out of scope, e.g. if the future holding it is
/// cancelled.
pub(crate) struct Progress(Option<Box<dyn ProgressDialog>>);

impl Progress {
    pub fn show(indicator: &dyn ProgressIndicator, opts: ProgressOpts) -> Self {
        Self(Some(indicator.show(opts)))
    }

    pub fn dismiss(mut self) {
        if let Some(dialog) = self.0.take() {
            dialog.dismiss();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Some(dialog) = self.0.take() {
            dialog.dismiss();
        }
    }
}
