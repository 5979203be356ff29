// SPDX-License-Identifier: CEPL-1.0
use crate::backend::{DeviceInfo, InstanceBackend};
use crate::debug::DebugMessenger;
use crate::error::{BackendError, SetupError, VkResultExt};
use ash::khr::surface;
use ash::{vk, Entry};
use hearth_render::{ContextSettings, DiagnosticSink};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::{c_char, CStr, CString};
use std::sync::Arc;
use tracing::{info, warn};

pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";
pub const DEBUG_UTILS_EXTENSION: &str = "VK_EXT_debug_utils";

const ENGINE_NAME: &str = "No Engine";

/// The window-system side of instance bring-up.
pub trait SurfaceProvider {
    /// Instance extensions the window system needs for presentation.
    fn required_instance_extensions(&self) -> Result<Vec<String>, SetupError>;

    /// # Safety
    /// `instance` must come from `entry` and have every extension named by
    /// [`Self::required_instance_extensions`] enabled.
    unsafe fn create_surface(
        &self,
        entry: &Entry,
        instance: &ash::Instance,
    ) -> Result<vk::SurfaceKHR, SetupError>;
}

/// Raw window and display handles, e.g. both borrowed from one winit window.
#[derive(Clone, Copy)]
pub struct WindowTarget<'a> {
    pub window: &'a dyn HasWindowHandle,
    pub display: &'a dyn HasDisplayHandle,
}

impl SurfaceProvider for WindowTarget<'_> {
    fn required_instance_extensions(&self) -> Result<Vec<String>, SetupError> {
        let dh = self.display.display_handle()?.as_raw();
        let names = ash_window::enumerate_required_extensions(dh)
            .op("enumerate_required_extensions")
            .map_err(SetupError::Instance)?;
        Ok(names
            .iter()
            .map(|&p| unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned())
            .collect())
    }

    unsafe fn create_surface(
        &self,
        entry: &Entry,
        instance: &ash::Instance,
    ) -> Result<vk::SurfaceKHR, SetupError> {
        let dh = self.display.display_handle()?.as_raw();
        let wh = self.window.window_handle()?.as_raw();
        unsafe { ash_window::create_surface(entry, instance, dh, wh, None) }
            .op("create_surface")
            .map_err(SetupError::Surface)
    }
}

/// Extensions and layers the instance is created with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstancePlan {
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
    /// Requested but not installed; skipped.
    pub missing_layers: Vec<String>,
}

impl InstancePlan {
    /// Window extensions first, then configured ones, then debug utils when
    /// validating. Duplicates collapse to their first occurrence.
    pub fn new(
        window_extensions: &[String],
        settings: &ContextSettings,
        available_layers: &[String],
    ) -> Self {
        let mut extensions = Vec::new();
        for ext in window_extensions.iter().chain(&settings.instance_extensions) {
            push_unique(&mut extensions, ext);
        }
        if settings.validation {
            push_unique(&mut extensions, DEBUG_UTILS_EXTENSION);
        }

        let mut requested = Vec::new();
        if settings.validation {
            push_unique(&mut requested, VALIDATION_LAYER);
        }
        for layer in &settings.instance_layers {
            push_unique(&mut requested, layer);
        }

        let (layers, missing_layers): (Vec<String>, Vec<String>) = requested
            .into_iter()
            .partition(|l| available_layers.contains(l));

        InstancePlan {
            extensions,
            layers,
            missing_layers,
        }
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_owned());
    }
}

fn cstrings(names: &[String]) -> Result<Vec<CString>, SetupError> {
    names
        .iter()
        .map(|n| CString::new(n.as_str()).map_err(SetupError::from))
        .collect()
}

fn lossy(name: Result<&CStr, std::ffi::FromBytesUntilNulError>) -> Option<String> {
    name.ok().map(|n| n.to_string_lossy().into_owned())
}

/// Names of all instance extensions the loader reports.
pub fn available_instance_extensions(entry: &Entry) -> Result<Vec<String>, BackendError> {
    let props = unsafe { entry.enumerate_instance_extension_properties(None) }
        .op("enumerate_instance_extension_properties")?;
    Ok(props
        .iter()
        .filter_map(|p| lossy(p.extension_name_as_c_str()))
        .collect())
}

/// Names of all installed instance layers.
pub fn available_instance_layers(entry: &Entry) -> Result<Vec<String>, BackendError> {
    let props = unsafe { entry.enumerate_instance_layer_properties() }
        .op("enumerate_instance_layer_properties")?;
    Ok(props
        .iter()
        .filter_map(|p| lossy(p.layer_name_as_c_str()))
        .collect())
}

/// The Vulkan instance, its surface loader and, when validating, a messenger.
///
/// Dropping it destroys the messenger and then the instance; every surface and
/// device made from it must be gone by then.
pub struct VkInstance {
    entry: Entry,
    instance: ash::Instance,
    surface_loader: surface::Instance,
    debug: Option<DebugMessenger>,
}

impl VkInstance {
    pub fn new<P: SurfaceProvider + ?Sized>(
        provider: &P,
        settings: &ContextSettings,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, SetupError> {
        let entry = Entry::linked();
        let window_extensions = provider.required_instance_extensions()?;
        let available_layers = if settings.validation || !settings.instance_layers.is_empty() {
            available_instance_layers(&entry).map_err(SetupError::Instance)?
        } else {
            Vec::new()
        };
        let plan = InstancePlan::new(&window_extensions, settings, &available_layers);
        for layer in &plan.missing_layers {
            warn!("instance layer {layer} unavailable, skipping");
        }
        Self::with_plan(entry, plan, settings, sink)
    }

    /// Creates the instance with exactly the extensions and layers of `plan`.
    pub fn with_plan(
        entry: Entry,
        plan: InstancePlan,
        settings: &ContextSettings,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, SetupError> {
        let app_name = CString::new(settings.app_name.as_str())?;
        let engine_name = CString::new(ENGINE_NAME)?;
        let ext_names = cstrings(&plan.extensions)?;
        let layer_names = cstrings(&plan.layers)?;
        let ext_ptrs: Vec<*const c_char> = ext_names.iter().map(|n| n.as_ptr()).collect();
        let layer_ptrs: Vec<*const c_char> = layer_names.iter().map(|n| n.as_ptr()).collect();

        let app_info = vk::ApplicationInfo {
            s_type: vk::StructureType::APPLICATION_INFO,
            p_application_name: app_name.as_ptr(),
            application_version: vk::make_api_version(0, 0, 0, 1),
            p_engine_name: engine_name.as_ptr(),
            engine_version: vk::make_api_version(0, 1, 0, 0),
            api_version: vk::API_VERSION_1_1,
            ..Default::default()
        };

        let create_info = vk::InstanceCreateInfo {
            s_type: vk::StructureType::INSTANCE_CREATE_INFO,
            p_application_info: &app_info,
            enabled_extension_count: ext_ptrs.len() as u32,
            pp_enabled_extension_names: ext_ptrs.as_ptr(),
            enabled_layer_count: layer_ptrs.len() as u32,
            pp_enabled_layer_names: layer_ptrs.as_ptr(),
            ..Default::default()
        };

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .op("create_instance")
            .map_err(SetupError::Instance)?;
        let surface_loader = surface::Instance::new(&entry, &instance);

        let mut this = VkInstance {
            entry,
            instance,
            surface_loader,
            debug: None,
        };
        if settings.validation {
            let messenger = unsafe { DebugMessenger::new(&this.entry, &this.instance, sink) }
                .map_err(SetupError::Instance)?;
            this.debug = Some(messenger);
        }

        info!(
            "Vulkan instance ready ({} extensions, {} layers)",
            plan.extensions.len(),
            plan.layers.len()
        );
        Ok(this)
    }

    pub fn handle(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn create_surface<P: SurfaceProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<vk::SurfaceKHR, SetupError> {
        unsafe { provider.create_surface(&self.entry, &self.instance) }
    }

    /// # Safety
    /// Nothing created from `surface` may still be alive.
    pub unsafe fn destroy_surface(&self, surface: vk::SurfaceKHR) {
        unsafe { self.surface_loader.destroy_surface(surface, None) };
    }
}

impl Drop for VkInstance {
    fn drop(&mut self) {
        unsafe {
            if let Some(mut debug) = self.debug.take() {
                debug.destroy();
            }
            self.instance.destroy_instance(None);
        }
    }
}

impl InstanceBackend for VkInstance {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>, BackendError> {
        unsafe { self.instance.enumerate_physical_devices() }.op("enumerate_physical_devices")
    }

    fn device_info(&self, phys: vk::PhysicalDevice) -> DeviceInfo {
        let props = unsafe { self.instance.get_physical_device_properties(phys) };
        DeviceInfo {
            name: lossy(props.device_name_as_c_str()).unwrap_or_else(|| "<unnamed>".to_owned()),
            device_type: props.device_type,
        }
    }

    fn queue_families(&self, phys: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe {
            self.instance
                .get_physical_device_queue_family_properties(phys)
        }
    }

    fn surface_support(
        &self,
        phys: vk::PhysicalDevice,
        family: u32,
        surface: vk::SurfaceKHR,
    ) -> Result<bool, BackendError> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_support(phys, family, surface)
        }
        .op("get_physical_device_surface_support")
    }

    fn device_extensions(&self, phys: vk::PhysicalDevice) -> Result<Vec<String>, BackendError> {
        let props = unsafe { self.instance.enumerate_device_extension_properties(phys) }
            .op("enumerate_device_extension_properties")?;
        Ok(props
            .iter()
            .filter_map(|p| lossy(p.extension_name_as_c_str()))
            .collect())
    }

    fn surface_formats(
        &self,
        phys: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::SurfaceFormatKHR>, BackendError> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(phys, surface)
        }
        .op("get_physical_device_surface_formats")
    }

    fn present_modes(
        &self,
        phys: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<Vec<vk::PresentModeKHR>, BackendError> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(phys, surface)
        }
        .op("get_physical_device_surface_present_modes")
    }

    fn surface_capabilities(
        &self,
        phys: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Result<vk::SurfaceCapabilitiesKHR, BackendError> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(phys, surface)
        }
        .op("get_physical_device_surface_capabilities")
    }
}
