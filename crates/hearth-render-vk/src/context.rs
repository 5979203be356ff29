// SPDX-License-Identifier: CEPL-1.0
use crate::backend::DeviceBackend;
use crate::device::LogicalDevice;
use crate::error::{BackendError, RuntimeError, SetupError};
use crate::instance::{SurfaceProvider, VkInstance, WindowTarget};
use crate::selector::{pick_physical_device, PhysicalDeviceCandidate};
use crate::swapchain::{ChainTarget, SwapchainSlot};
use crate::vk_present_mode;
use anyhow::Result;
use ash::vk;
use hearth_render::{ContextSettings, DiagnosticSink, Presenter, RenderSize, TracingSink};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;
use tracing::{info, warn};

/// Instance, surface, chosen device, logical device and the image chain.
pub struct VkContext {
    instance: VkInstance,
    surface: vk::SurfaceKHR,
    physical: PhysicalDeviceCandidate,
    device: LogicalDevice,
    swapchain: SwapchainSlot,
    present_mode: vk::PresentModeKHR,
}

impl Drop for VkContext {
    fn drop(&mut self) {
        // views + chain, device, surface; the instance drops itself last
        if let Err(e) = self.device.wait_idle() {
            warn!("wait idle before teardown: {e}");
        }
        self.swapchain.destroy(&self.device);
        unsafe {
            self.device.destroy();
            self.instance.destroy_surface(self.surface);
        }
    }
}

impl VkContext {
    /// Brings up everything for the given window, reporting validation
    /// messages through `tracing`.
    pub fn create(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
        size: RenderSize,
        settings: &ContextSettings,
    ) -> Result<Self, SetupError> {
        Self::with_diagnostics(
            &WindowTarget { window, display },
            size,
            settings,
            Arc::new(TracingSink),
        )
    }

    pub fn with_diagnostics<P: SurfaceProvider + ?Sized>(
        provider: &P,
        size: RenderSize,
        settings: &ContextSettings,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, SetupError> {
        let instance = VkInstance::new(provider, settings, sink)?;
        let surface = instance.create_surface(provider)?;

        let (physical, device) = match open_device(&instance, surface, settings) {
            Ok(opened) => opened,
            Err(e) => {
                unsafe { instance.destroy_surface(surface) };
                return Err(e);
            }
        };

        let mut ctx = VkContext {
            instance,
            surface,
            physical,
            device,
            swapchain: SwapchainSlot::default(),
            present_mode: vk_present_mode(settings.present_mode),
        };
        ctx.follow_size(size).map_err(SetupError::Swapchain)?;
        Ok(ctx)
    }

    fn target(&self) -> ChainTarget {
        ChainTarget {
            physical_device: self.physical.handle,
            surface: self.surface,
            families: self.physical.queue_families,
        }
    }

    fn follow_size(&mut self, size: RenderSize) -> Result<(), BackendError> {
        let target = self.target();
        let rebuilt = self.swapchain.resize(
            &self.instance,
            &self.device,
            &target,
            size,
            self.present_mode,
        )?;
        if let Some(chain) = rebuilt {
            info!(
                "Vulkan swapchain ready ({}x{}, fmt {:?}, {} images)",
                chain.config.extent.width,
                chain.config.extent.height,
                chain.config.surface_format.format,
                chain.images.len()
            );
        }
        Ok(())
    }

    /// Rebuilds the chain for a new window size. A zero axis pauses
    /// presentation instead; the chain is kept until a real size arrives.
    pub fn resize_swapchain(&mut self, size: RenderSize) -> Result<(), RuntimeError> {
        self.follow_size(size).map_err(RuntimeError::Rebuild)
    }

    pub fn wait_device_idle(&self) -> Result<(), RuntimeError> {
        self.device.wait_idle().map_err(RuntimeError::WaitIdle)
    }

    pub fn device_name(&self) -> &str {
        &self.physical.info.name
    }
}

fn open_device(
    instance: &VkInstance,
    surface: vk::SurfaceKHR,
    settings: &ContextSettings,
) -> Result<(PhysicalDeviceCandidate, LogicalDevice), SetupError> {
    let physical = pick_physical_device(
        instance,
        surface,
        &settings.device_extensions,
        settings.device_preference,
    )?;
    let device = LogicalDevice::new(instance, &physical, &settings.device_extensions)?;
    Ok((physical, device))
}

impl Presenter for VkContext {
    fn new(
        window: &dyn HasWindowHandle,
        display: &dyn HasDisplayHandle,
        size: RenderSize,
        settings: &ContextSettings,
    ) -> Result<Self> {
        Ok(Self::create(window, display, size, settings)?)
    }

    fn resize(&mut self, size: RenderSize) -> Result<()> {
        Ok(self.resize_swapchain(size)?)
    }

    fn wait_idle(&mut self) -> Result<()> {
        Ok(self.wait_device_idle()?)
    }
}
