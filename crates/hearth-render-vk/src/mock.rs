// SPDX-License-Identifier: CEPL-1.0
//! Recording stand-in for both backend traits.

use crate::backend::{DeviceBackend, DeviceInfo, InstanceBackend};
use crate::error::BackendError;
use crate::swapchain::SwapchainConfig;
use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};

pub fn surface() -> vk::SurfaceKHR {
    vk::SurfaceKHR::from_raw(0x5f)
}

pub fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
    vk::QueueFamilyProperties {
        queue_flags: flags,
        queue_count: 1,
        ..Default::default()
    }
}

pub fn caps(min: u32, max: u32, current: (u32, u32)) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min,
        max_image_count: max,
        current_extent: vk::Extent2D {
            width: current.0,
            height: current.1,
        },
        min_image_extent: vk::Extent2D {
            width: 1,
            height: 1,
        },
        max_image_extent: vk::Extent2D {
            width: 4096,
            height: 4096,
        },
        supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        ..Default::default()
    }
}

#[derive(Clone, Debug)]
pub struct MockDevice {
    name: String,
    kind: vk::PhysicalDeviceType,
    families: Vec<vk::QueueFamilyProperties>,
    present_on: Vec<u32>,
    extensions: Vec<String>,
    formats: Vec<vk::SurfaceFormatKHR>,
    modes: Vec<vk::PresentModeKHR>,
    caps: vk::SurfaceCapabilitiesKHR,
}

impl MockDevice {
    /// One graphics+present family, swapchain support, one format, FIFO only.
    pub fn new(name: &str) -> Self {
        MockDevice {
            name: name.to_owned(),
            kind: vk::PhysicalDeviceType::INTEGRATED_GPU,
            families: vec![family(vk::QueueFlags::GRAPHICS)],
            present_on: vec![0],
            extensions: vec![hearth_render::SWAPCHAIN_EXTENSION.to_owned()],
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            modes: vec![vk::PresentModeKHR::FIFO],
            caps: caps(2, 8, (800, 600)),
        }
    }

    pub fn kind(mut self, kind: vk::PhysicalDeviceType) -> Self {
        self.kind = kind;
        self
    }

    pub fn families(mut self, families: Vec<vk::QueueFamilyProperties>) -> Self {
        self.families = families;
        self
    }

    pub fn present_on(mut self, families: Vec<u32>) -> Self {
        self.present_on = families;
        self
    }

    pub fn extensions(mut self, extensions: Vec<&str>) -> Self {
        self.extensions = extensions.into_iter().map(str::to_owned).collect();
        self
    }

    pub fn formats(mut self, formats: Vec<vk::SurfaceFormatKHR>) -> Self {
        self.formats = formats;
        self
    }

    pub fn modes(mut self, modes: Vec<vk::PresentModeKHR>) -> Self {
        self.modes = modes;
        self
    }

    pub fn caps(mut self, caps: vk::SurfaceCapabilitiesKHR) -> Self {
        self.caps = caps;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    WaitIdle,
    CreateSwapchain {
        old: u64,
        new: u64,
        image_count: u32,
    },
    CreateView(u64),
    DestroyView(u64),
    DestroySwapchain(u64),
}

/// Serves queries from its `devices` and logs every device-level call.
pub struct MockBackend {
    devices: Vec<MockDevice>,
    pub calls: RefCell<Vec<Call>>,
    pub configs: RefCell<Vec<SwapchainConfig>>,
    pub fail_formats: Cell<bool>,
    pub fail_create_swapchain: Cell<bool>,
    /// Fails the n-th view creation (0-based, counted across the mock's life).
    pub fail_view: Cell<Option<usize>>,
    next_handle: Cell<u64>,
    views_made: Cell<usize>,
}

impl MockBackend {
    pub fn new(devices: Vec<MockDevice>) -> Self {
        MockBackend {
            devices,
            calls: RefCell::new(Vec::new()),
            configs: RefCell::new(Vec::new()),
            fail_formats: Cell::new(false),
            fail_create_swapchain: Cell::new(false),
            fail_view: Cell::new(None),
            next_handle: Cell::new(0x1000),
            views_made: Cell::new(0),
        }
    }

    pub fn handle(index: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(index as u64 + 1)
    }

    fn device(&self, phys: vk::PhysicalDevice) -> &MockDevice {
        &self.devices[phys.as_raw() as usize - 1]
    }

    fn fresh(&self) -> u64 {
        let h = self.next_handle.get();
        self.next_handle.set(h + 1);
        h
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl InstanceBackend for MockBackend {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>, BackendError> {
        Ok((0..self.devices.len()).map(Self::handle).collect())
    }

    fn device_info(&self, phys: vk::PhysicalDevice) -> DeviceInfo {
        let d = self.device(phys);
        DeviceInfo {
            name: d.name.clone(),
            device_type: d.kind,
        }
    }

    fn queue_families(&self, phys: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        self.device(phys).families.clone()
    }

    fn surface_support(
        &self,
        phys: vk::PhysicalDevice,
        family: u32,
        _surface: vk::SurfaceKHR,
    ) -> Result<bool, BackendError> {
        Ok(self.device(phys).present_on.contains(&family))
    }

    fn device_extensions(&self, phys: vk::PhysicalDevice) -> Result<Vec<String>, BackendError> {
        Ok(self.device(phys).extensions.clone())
    }

    fn surface_formats(
        &self,
        phys: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, BackendError> {
        if self.fail_formats.get() {
            return Err(BackendError::new(
                "get_physical_device_surface_formats",
                vk::Result::ERROR_SURFACE_LOST_KHR,
            ));
        }
        Ok(self.device(phys).formats.clone())
    }

    fn present_modes(
        &self,
        phys: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, BackendError> {
        Ok(self.device(phys).modes.clone())
    }

    fn surface_capabilities(
        &self,
        phys: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> Result<vk::SurfaceCapabilitiesKHR, BackendError> {
        Ok(self.device(phys).caps)
    }
}

impl DeviceBackend for MockBackend {
    fn create_swapchain(
        &self,
        _surface: vk::SurfaceKHR,
        config: &SwapchainConfig,
        old: vk::SwapchainKHR,
    ) -> Result<vk::SwapchainKHR, BackendError> {
        if self.fail_create_swapchain.get() {
            return Err(BackendError::new(
                "create_swapchain",
                vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR,
            ));
        }
        let new = self.fresh();
        self.configs.borrow_mut().push(config.clone());
        self.log(Call::CreateSwapchain {
            old: old.as_raw(),
            new,
            image_count: config.image_count,
        });
        Ok(vk::SwapchainKHR::from_raw(new))
    }

    fn swapchain_images(
        &self,
        swapchain: vk::SwapchainKHR,
    ) -> Result<Vec<vk::Image>, BackendError> {
        let count = self
            .calls
            .borrow()
            .iter()
            .find_map(|c| match c {
                Call::CreateSwapchain {
                    new, image_count, ..
                } if *new == swapchain.as_raw() => Some(*image_count),
                _ => None,
            })
            .unwrap_or(0);
        Ok((0..count).map(|_| vk::Image::from_raw(self.fresh())).collect())
    }

    fn create_image_view(
        &self,
        _image: vk::Image,
        _format: vk::Format,
    ) -> Result<vk::ImageView, BackendError> {
        let n = self.views_made.get();
        self.views_made.set(n + 1);
        if self.fail_view.get() == Some(n) {
            return Err(BackendError::new(
                "create_image_view",
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            ));
        }
        let view = self.fresh();
        self.log(Call::CreateView(view));
        Ok(vk::ImageView::from_raw(view))
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        self.log(Call::DestroyView(view.as_raw()));
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.log(Call::DestroySwapchain(swapchain.as_raw()));
    }

    fn wait_idle(&self) -> Result<(), BackendError> {
        self.log(Call::WaitIdle);
        Ok(())
    }
}
