//! Headless page loading.
//!
//! A [`PageLoader`] navigates to a vetted URL and returns the raw computed-style
//! capture plus an optional screenshot. [`PlaywrightLoader`] does this through a
//! short-lived Node.js + Playwright helper process; tests substitute their own
//! loaders.
//!
//! # Module Structure
//!
//! - [`manager`] - helper process lifecycle, timeouts and retries
//! - [`playwright`] - the sampling script and availability checks
//! - [`raw`] - the JSON records the script emits

mod manager;
mod playwright;
pub mod raw;

use std::future::Future;
use std::path::PathBuf;

use crate::progress::AuditContext;
use crate::target::VettedUrl;
use crate::Result;

pub use manager::{PlaywrightLoader, PlaywrightOptions};
pub use raw::{RawCapture, RawElement, RawRect};

/// PNG bytes captured after the page settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// A rendered page, ready for sampling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedPage {
    pub capture: RawCapture,
    pub screenshot: Option<Screenshot>,
}

/// Source of rendered pages.
///
/// Implementations must release every browser resource before returning,
/// whether the load succeeded, failed or was cancelled through `ctx`.
pub trait PageLoader: Send + Sync {
    fn load(
        &self,
        url: &VettedUrl,
        ctx: &AuditContext,
    ) -> impl Future<Output = Result<LoadedPage>> + Send;
}
