// SPDX-License-Identifier: CEPL-1.0
use crate::backend::DeviceBackend;
use crate::error::{BackendError, SetupError, VkResultExt};
use crate::instance::VkInstance;
use crate::selector::PhysicalDeviceCandidate;
use crate::swapchain::SwapchainConfig;
use ash::khr::swapchain;
use ash::vk;
use std::ffi::{c_char, CString};
use tracing::info;

/// The logical device, its two queues and the swapchain loader.
///
/// Has no `Drop`; the owner calls [`LogicalDevice::destroy`] after every
/// object created from it is gone.
pub struct LogicalDevice {
    device: ash::Device,
    swapchain_loader: swapchain::Device,
    pub graphics_family: u32,
    pub present_family: u32,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
}

impl LogicalDevice {
    /// One queue from each unique family, with `extensions` enabled.
    pub fn new(
        instance: &VkInstance,
        candidate: &PhysicalDeviceCandidate,
        extensions: &[String],
    ) -> Result<Self, SetupError> {
        let Some([graphics_family, present_family]) = candidate.queue_families.indices() else {
            return Err(SetupError::Device(BackendError::new(
                "queue_family_indices",
                vk::Result::ERROR_INITIALIZATION_FAILED,
            )));
        };

        let priorities = [1.0_f32];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = candidate
            .queue_families
            .unique_indices()
            .into_iter()
            .map(|family| vk::DeviceQueueCreateInfo {
                s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
                queue_family_index: family,
                queue_count: 1,
                p_queue_priorities: priorities.as_ptr(),
                ..Default::default()
            })
            .collect();

        let ext_names = extensions
            .iter()
            .map(|e| CString::new(e.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let ext_ptrs: Vec<*const c_char> = ext_names.iter().map(|e| e.as_ptr()).collect();
        let features = vk::PhysicalDeviceFeatures::default();

        let dinfo = vk::DeviceCreateInfo {
            s_type: vk::StructureType::DEVICE_CREATE_INFO,
            queue_create_info_count: queue_infos.len() as u32,
            p_queue_create_infos: queue_infos.as_ptr(),
            enabled_extension_count: ext_ptrs.len() as u32,
            pp_enabled_extension_names: ext_ptrs.as_ptr(),
            p_enabled_features: &features,
            ..Default::default()
        };

        let device = unsafe {
            instance
                .handle()
                .create_device(candidate.handle, &dinfo, None)
        }
        .op("create_device")
        .map_err(SetupError::Device)?;

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };
        let swapchain_loader = swapchain::Device::new(instance.handle(), &device);

        info!(
            "logical device ready on {} (graphics family {}, present family {})",
            candidate.info.name, graphics_family, present_family
        );

        Ok(LogicalDevice {
            device,
            swapchain_loader,
            graphics_family,
            present_family,
            graphics_queue,
            present_queue,
        })
    }

    pub fn handle(&self) -> &ash::Device {
        &self.device
    }

    /// # Safety
    /// Call once, with no swapchain, view or queue work still alive.
    pub unsafe fn destroy(&self) {
        unsafe { self.device.destroy_device(None) };
    }
}

impl DeviceBackend for LogicalDevice {
    fn create_swapchain(
        &self,
        surface: vk::SurfaceKHR,
        config: &SwapchainConfig,
        old: vk::SwapchainKHR,
    ) -> Result<vk::SwapchainKHR, BackendError> {
        let swap_info = vk::SwapchainCreateInfoKHR {
            s_type: vk::StructureType::SWAPCHAIN_CREATE_INFO_KHR,
            surface,
            min_image_count: config.image_count,
            image_format: config.surface_format.format,
            image_color_space: config.surface_format.color_space,
            image_extent: config.extent,
            image_array_layers: 1,
            image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            image_sharing_mode: config.sharing_mode,
            queue_family_index_count: config.queue_family_indices.len() as u32,
            p_queue_family_indices: config.queue_family_indices.as_ptr(),
            pre_transform: config.pre_transform,
            composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            present_mode: config.present_mode,
            clipped: vk::TRUE,
            old_swapchain: old,
            ..Default::default()
        };
        unsafe { self.swapchain_loader.create_swapchain(&swap_info, None) }
            .op("create_swapchain")
    }

    fn swapchain_images(
        &self,
        swapchain: vk::SwapchainKHR,
    ) -> Result<Vec<vk::Image>, BackendError> {
        unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }
            .op("get_swapchain_images")
    }

    fn create_image_view(
        &self,
        image: vk::Image,
        format: vk::Format,
    ) -> Result<vk::ImageView, BackendError> {
        let sub = vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        };
        let iv_info = vk::ImageViewCreateInfo {
            s_type: vk::StructureType::IMAGE_VIEW_CREATE_INFO,
            image,
            view_type: vk::ImageViewType::TYPE_2D,
            format,
            components: vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            },
            subresource_range: sub,
            ..Default::default()
        };
        unsafe { self.device.create_image_view(&iv_info, None) }.op("create_image_view")
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) };
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) };
    }

    fn wait_idle(&self) -> Result<(), BackendError> {
        unsafe { self.device.device_wait_idle() }.op("device_wait_idle")
    }
}
