//! View controllers.
//!
//! ARCHITECTURE
//! ============
//! Controllers hold per-viewer UI state (input fields, selection, modal
//! outcome) and delegate every data change to the services. Routes own the
//! transport; controllers never see a socket or a request.

pub mod landing;
pub mod modal;
