// SPDX-License-Identifier: CEPL-1.0
//! The two seams the selector and the swapchain builder talk through.
//!
//! [`crate::VkInstance`] and [`crate::LogicalDevice`] are the ash-backed
//! implementations; the tests drive the same code through a recording mock.

use crate::error::BackendError;
use crate::swapchain::SwapchainConfig;
use ash::vk;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
}

/// Instance-level queries about physical devices and their surface support.
pub trait InstanceBackend {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>, BackendError>;

    fn device_info(&self, phys: vk::PhysicalDevice) -> DeviceInfo;

    fn queue_families(&self, phys: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    fn surface_support(
        &self,
        phys: vk::PhysicalDevice,
        family: u32,
        surface: vk::SurfaceKHR,
    ) -> Result<bool, BackendError>;

    fn device_extensions(&self, phys: vk::PhysicalDevice) -> Result<Vec<String>, BackendError>;

    fn surface_formats(
        &self,
        phys: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, BackendError>;

    fn present_modes(
        &self,
        phys: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, BackendError>;

    fn surface_capabilities(
        &self,
        phys: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<vk::SurfaceCapabilitiesKHR, BackendError>;
}

/// Logical-device operations needed to own an image chain.
pub trait DeviceBackend {
    fn create_swapchain(
        &self,
        surface: vk::SurfaceKHR,
        config: &SwapchainConfig,
        old: vk::SwapchainKHR,
    ) -> Result<vk::SwapchainKHR, BackendError>;

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR)
        -> Result<Vec<vk::Image>, BackendError>;

    /// 2D color view, identity swizzle, one mip level, one layer.
    fn create_image_view(
        &self,
        image: vk::Image,
        format: vk::Format,
    ) -> Result<vk::ImageView, BackendError>;

    fn destroy_image_view(&self, view: vk::ImageView);

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);

    /// Blocks until every queue on the device is idle.
    fn wait_idle(&self) -> Result<(), BackendError>;
}
