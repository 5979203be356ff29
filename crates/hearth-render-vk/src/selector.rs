// SPDX-License-Identifier: CEPL-1.0
//! Physical device and queue family selection.

use crate::backend::{DeviceInfo, InstanceBackend};
use crate::error::{BackendError, SelectError};
use ash::vk;
use hearth_render::DevicePreference;
use tracing::{debug, info};

/// Queue families a presenting device needs. Both roles may share a family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueFamilyRequirement {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyRequirement {
    /// Scans `families` in order. A family that does both graphics and present
    /// takes both roles and ends the scan; otherwise the first family of each
    /// kind is kept. Families with no queues are skipped.
    pub fn scan<F>(
        families: &[vk::QueueFamilyProperties],
        mut can_present: F,
    ) -> Result<Self, BackendError>
    where
        F: FnMut(u32) -> Result<bool, BackendError>,
    {
        let mut found = Self::default();
        for (i, family) in families.iter().enumerate() {
            if family.queue_count == 0 {
                continue;
            }
            let index = i as u32;
            let graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let present = can_present(index)?;

            if graphics && present {
                return Ok(Self {
                    graphics: Some(index),
                    present: Some(index),
                });
            }
            if graphics && found.graphics.is_none() {
                found.graphics = Some(index);
            }
            if present && found.present.is_none() {
                found.present = Some(index);
            }
        }
        Ok(found)
    }

    pub fn is_satisfied(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// `[graphics, present]`, or `None` until both are known.
    pub fn indices(&self) -> Option<[u32; 2]> {
        Some([self.graphics?, self.present?])
    }

    /// Distinct family indices in graphics, present order.
    pub fn unique_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(2);
        for index in self.indices().into_iter().flatten() {
            if !out.contains(&index) {
                out.push(index);
            }
        }
        out
    }

    pub fn sharing_mode(&self) -> vk::SharingMode {
        if self.unique_indices().len() > 1 {
            vk::SharingMode::CONCURRENT
        } else {
            vk::SharingMode::EXCLUSIVE
        }
    }
}

/// A physical device together with everything selection looks at.
#[derive(Clone, Debug)]
pub struct PhysicalDeviceCandidate {
    pub handle: vk::PhysicalDevice,
    pub info: DeviceInfo,
    pub queue_families: QueueFamilyRequirement,
    pub extensions: Vec<String>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    MissingQueueFamilies,
    MissingExtension(String),
    NoSurfaceFormats,
    NoPresentModes,
}

impl PhysicalDeviceCandidate {
    /// Everything that keeps this device from qualifying; empty means it does.
    pub fn rejections<S: AsRef<str>>(&self, required_extensions: &[S]) -> Vec<Rejection> {
        let mut out = Vec::new();
        if !self.queue_families.is_satisfied() {
            out.push(Rejection::MissingQueueFamilies);
        }
        for ext in required_extensions {
            let ext = ext.as_ref();
            if !self.extensions.iter().any(|have| have == ext) {
                out.push(Rejection::MissingExtension(ext.to_owned()));
            }
        }
        if self.formats.is_empty() {
            out.push(Rejection::NoSurfaceFormats);
        }
        if self.present_modes.is_empty() {
            out.push(Rejection::NoPresentModes);
        }
        out
    }

    pub fn is_discrete(&self) -> bool {
        self.info.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
    }
}

/// Runs the capability queries once for every enumerated device.
pub fn query_candidates<B>(
    backend: &B,
    surface: vk::SurfaceKHR,
) -> Result<Vec<PhysicalDeviceCandidate>, BackendError>
where
    B: InstanceBackend + ?Sized,
{
    let devices = backend.physical_devices()?;
    info!("Found {} devices with Vulkan support", devices.len());

    let mut out = Vec::with_capacity(devices.len());
    for phys in devices {
        let families = backend.queue_families(phys);
        let queue_families = QueueFamilyRequirement::scan(&families, |index| {
            backend.surface_support(phys, index, surface)
        })?;
        out.push(PhysicalDeviceCandidate {
            handle: phys,
            info: backend.device_info(phys),
            queue_families,
            extensions: backend.device_extensions(phys)?,
            formats: backend.surface_formats(phys, surface)?,
            present_modes: backend.present_modes(phys, surface)?,
            capabilities: backend.surface_capabilities(phys, surface)?,
        });
    }
    Ok(out)
}

/// Picks one qualifying candidate. See [`DevicePreference`] for the tie-break.
pub fn select_device<S: AsRef<str>>(
    candidates: Vec<PhysicalDeviceCandidate>,
    required_extensions: &[S],
    preference: DevicePreference,
) -> Result<PhysicalDeviceCandidate, SelectError> {
    if candidates.is_empty() {
        return Err(SelectError::NoDevice);
    }

    let total = candidates.len();
    let mut qualified = Vec::with_capacity(total);
    for candidate in candidates {
        let reasons = candidate.rejections(required_extensions);
        if reasons.is_empty() {
            qualified.push(candidate);
        } else {
            debug!(device = %candidate.info.name, ?reasons, "device rejected");
        }
    }

    if qualified.is_empty() {
        return Err(SelectError::NoSuitableDevice { rejected: total });
    }

    let pick = match preference {
        DevicePreference::PreferDiscrete => qualified
            .iter()
            .position(PhysicalDeviceCandidate::is_discrete)
            .unwrap_or(0),
        DevicePreference::FirstQualifying => 0,
    };
    let chosen = qualified.swap_remove(pick);
    info!(
        "Choosing device {} ({:?})",
        chosen.info.name, chosen.info.device_type
    );
    Ok(chosen)
}

/// [`query_candidates`] followed by [`select_device`].
pub fn pick_physical_device<B, S>(
    backend: &B,
    surface: vk::SurfaceKHR,
    required_extensions: &[S],
    preference: DevicePreference,
) -> Result<PhysicalDeviceCandidate, SelectError>
where
    B: InstanceBackend + ?Sized,
    S: AsRef<str>,
{
    let candidates = query_candidates(backend, surface)?;
    select_device(candidates, required_extensions, preference)
}
