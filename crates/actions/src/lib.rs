//! Actions on a logged-in storegate [`Session`](storegate_session::Session).
//!
//! [`UploadAction`] and [`DownloadAction`] drive the full transfer flow:
//! initiate on the control plane, select a data-plane client, move the
//! bytes, and confirm. [`FileOperationsAction`] and [`EnumFilesAction`] wrap
//! single control-plane calls.

mod download;
mod enumfiles;
mod error;
mod fileops;
pub mod paths;
mod upload;

pub use download::DownloadAction;
pub use enumfiles::EnumFilesAction;
pub use error::ActionError;
pub use fileops::FileOperationsAction;
pub use upload::UploadAction;
