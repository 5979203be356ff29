// SPDX-License-Identifier: CEPL-1.0
use ash::vk;
use thiserror::Error;

/// A backend call that returned a failure code, with the call named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{op} failed: {result}")]
pub struct BackendError {
    pub op: &'static str,
    pub result: vk::Result,
}

impl BackendError {
    pub fn new(op: &'static str, result: vk::Result) -> Self {
        Self { op, result }
    }
}

pub trait VkResultExt<T> {
    /// Names the failing operation, like `anyhow::Context` does for messages.
    fn op(self, op: &'static str) -> Result<T, BackendError>;
}

impl<T> VkResultExt<T> for ash::prelude::VkResult<T> {
    fn op(self, op: &'static str) -> Result<T, BackendError> {
        self.map_err(|result| BackendError { op, result })
    }
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no GPU available")]
    NoDevice,
    #[error("no suitable GPU available ({rejected} rejected)")]
    NoSuitableDevice { rejected: usize },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// One-time initialization failure. Always fatal.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("window handle unavailable: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),
    #[error("name contains an interior NUL: {0}")]
    InvalidName(#[from] std::ffi::NulError),
    #[error("instance creation: {0}")]
    Instance(#[source] BackendError),
    #[error("surface creation: {0}")]
    Surface(#[source] BackendError),
    #[error("device selection: {0}")]
    Select(#[from] SelectError),
    #[error("logical device creation: {0}")]
    Device(#[source] BackendError),
    #[error("swapchain creation: {0}")]
    Swapchain(#[source] BackendError),
}

/// Failure after the event loop started. Reported, not fatal.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("swapchain rebuild: {0}")]
    Rebuild(#[source] BackendError),
    #[error("wait idle: {0}")]
    WaitIdle(#[source] BackendError),
}
