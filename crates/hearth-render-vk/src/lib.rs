// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
//! Vulkan bring-up: instance, device selection, logical device and a
//! rebuildable swapchain, all owned by [`VkContext`].

use ash::vk;
use hearth_render::PresentMode;

pub mod backend;
pub mod context;
pub mod debug;
pub mod device;
pub mod error;
pub mod instance;
pub mod selector;
pub mod swapchain;

#[cfg(test)]
mod mock;

pub use ash;

pub use backend::{DeviceBackend, DeviceInfo, InstanceBackend};
pub use context::VkContext;
pub use device::LogicalDevice;
pub use error::{BackendError, RuntimeError, SelectError, SetupError};
pub use instance::{
    available_instance_extensions, available_instance_layers, InstancePlan, SurfaceProvider,
    VkInstance, WindowTarget, DEBUG_UTILS_EXTENSION, VALIDATION_LAYER,
};
pub use selector::{
    pick_physical_device, query_candidates, select_device, PhysicalDeviceCandidate,
    QueueFamilyRequirement, Rejection,
};
pub use swapchain::{build_swapchain, ChainTarget, Swapchain, SwapchainConfig, SwapchainSlot};

pub fn vk_present_mode(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}
