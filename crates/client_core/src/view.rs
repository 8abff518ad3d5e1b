use async_trait::async_trait;

use crate::Status;

/// Rendering seam between the controller and whatever surface displays the
/// inventory. Implementations own presentation only; all sequencing and
/// message composition happen in the controller.
#[async_trait]
pub trait InventoryView: Send + Sync {
    async fn set_upload_status(&self, status: Status);
    async fn set_add_device_status(&self, status: Status);
    /// Full replacement of the list area, one string per entry.
    async fn show_device_list(&self, entries: Vec<String>);
    /// Full replacement of the list area with a single error line.
    async fn show_list_error(&self, message: String);
    /// Invoked only after the backend confirmed a manual add.
    async fn clear_add_device_form(&self);
}

/// Discards every update. Backs headless runs and tests that only observe
/// the controller's state.
pub struct NullView;

#[async_trait]
impl InventoryView for NullView {
    async fn set_upload_status(&self, _status: Status) {}

    async fn set_add_device_status(&self, _status: Status) {}

    async fn show_device_list(&self, _entries: Vec<String>) {}

    async fn show_list_error(&self, _message: String) {}

    async fn clear_add_device_form(&self) {}
}
