// SPDX-License-Identifier: CEPL-1.0
use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

pub mod diagnostics;

pub use diagnostics::{DiagnosticSink, MessageKind, Severity, TracingSink};

/// Device extension every presenting context needs.
pub const SWAPCHAIN_EXTENSION: &str = "VK_KHR_swapchain";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

impl RenderSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimized window reports a zero axis; nothing can be presented then.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PresentMode {
    Immediate,
    Mailbox,
    #[default]
    Fifo,
    FifoRelaxed,
}

/// Tie-break between physical devices that all qualify.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DevicePreference {
    /// First qualifying discrete GPU, else the first qualifying device.
    #[default]
    PreferDiscrete,
    /// First qualifying device in enumeration order.
    FirstQualifying,
}

/// Everything the bring-up needs to know up front.
#[derive(Clone, Debug)]
pub struct ContextSettings {
    pub app_name: String,
    /// Enables the debug-utils extension, the validation layer and a messenger.
    pub validation: bool,
    pub instance_extensions: Vec<String>,
    pub instance_layers: Vec<String>,
    pub device_extensions: Vec<String>,
    pub present_mode: PresentMode,
    pub device_preference: DevicePreference,
}

impl Default for ContextSettings {
    fn default() -> Self {
        ContextSettings {
            app_name: "hearth".to_owned(),
            validation: cfg!(debug_assertions),
            instance_extensions: Vec::new(),
            instance_layers: Vec::new(),
            device_extensions: vec![SWAPCHAIN_EXTENSION.to_owned()],
            present_mode: PresentMode::Fifo,
            device_preference: DevicePreference::PreferDiscrete,
        }
    }
}

/// A window-bound graphics context that owns a presentable image chain.
pub trait Presenter {
    fn new(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
        size: RenderSize,
        settings: &ContextSettings,
    ) -> Result<Self>
    where
        Self: Sized;

    /// Rebuilds the image chain for `size`. A zero-sized target pauses instead.
    fn resize(&mut self, size: RenderSize) -> Result<()>;

    /// Blocks until all submitted device work has completed.
    fn wait_idle(&mut self) -> Result<()>;
}
