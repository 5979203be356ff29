// SPDX-License-Identifier: CEPL-1.0
//! Swapchain parameter derivation and the (re)build protocol.

use crate::backend::{DeviceBackend, InstanceBackend};
use crate::error::BackendError;
use crate::selector::QueueFamilyRequirement;
use ash::vk;
use hearth_render::RenderSize;
use tracing::{debug, info, warn};

/// `current_extent` value meaning "the client picks the size".
pub const EXTENT_SENTINEL: u32 = u32::MAX;

/// FIFO is the one present mode every implementation must expose.
pub const FALLBACK_PRESENT_MODE: vk::PresentModeKHR = vk::PresentModeKHR::FIFO;

/// Used when the surface reports a lone `UNDEFINED` format ("anything goes").
/// BGRA rather than BGR: 3-byte formats are rarely presentable, BGRA8 nearly always is.
pub const FALLBACK_SURFACE_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_UNORM,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

/// Fully resolved creation parameters for one image chain.
#[derive(Clone, Debug)]
pub struct SwapchainConfig {
    pub extent: vk::Extent2D,
    pub surface_format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub image_count: u32,
    pub sharing_mode: vk::SharingMode,
    /// Empty for exclusive sharing.
    pub queue_family_indices: Vec<u32>,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

pub fn resolve_extent(caps: &vk::SurfaceCapabilitiesKHR, desired: RenderSize) -> vk::Extent2D {
    if caps.current_extent.width != EXTENT_SENTINEL && caps.current_extent.height != EXTENT_SENTINEL
    {
        return caps.current_extent;
    }
    // not clamp(): it panics if a driver reports min > max
    vk::Extent2D {
        width: desired
            .width
            .min(caps.max_image_extent.width)
            .max(caps.min_image_extent.width),
        height: desired
            .height
            .min(caps.max_image_extent.height)
            .max(caps.min_image_extent.height),
    }
}

pub fn resolve_present_mode(
    modes: &[vk::PresentModeKHR],
    preferred: vk::PresentModeKHR,
) -> vk::PresentModeKHR {
    if modes.contains(&preferred) {
        preferred
    } else {
        FALLBACK_PRESENT_MODE
    }
}

/// First supported format, or the fallback when the surface accepts anything.
pub fn resolve_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    match formats {
        [only] if only.format == vk::Format::UNDEFINED => Some(FALLBACK_SURFACE_FORMAT),
        _ => formats.first().copied(),
    }
}

/// One more than the minimum; `max_image_count == 0` means no upper bound.
pub fn resolve_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let want = caps.min_image_count.saturating_add(1);
    if caps.max_image_count > 0 {
        want.min(caps.max_image_count)
    } else {
        want
    }
}

impl SwapchainConfig {
    pub fn derive(
        caps: &vk::SurfaceCapabilitiesKHR,
        formats: &[vk::SurfaceFormatKHR],
        modes: &[vk::PresentModeKHR],
        families: &QueueFamilyRequirement,
        desired: RenderSize,
        preferred: vk::PresentModeKHR,
    ) -> Result<Self, BackendError> {
        let surface_format = resolve_surface_format(formats).ok_or(BackendError::new(
            "get_physical_device_surface_formats",
            vk::Result::ERROR_FORMAT_NOT_SUPPORTED,
        ))?;

        let shared = families.unique_indices();
        let (sharing_mode, queue_family_indices) = if shared.len() > 1 {
            (vk::SharingMode::CONCURRENT, shared)
        } else {
            (vk::SharingMode::EXCLUSIVE, Vec::new())
        };

        Ok(SwapchainConfig {
            extent: resolve_extent(caps, desired),
            surface_format,
            present_mode: resolve_present_mode(modes, preferred),
            image_count: resolve_image_count(caps),
            sharing_mode,
            queue_family_indices,
            pre_transform: caps.current_transform,
        })
    }
}

/// Where an image chain presents: a chosen device, its surface and families.
#[derive(Clone, Copy, Debug)]
pub struct ChainTarget {
    pub physical_device: vk::PhysicalDevice,
    pub surface: vk::SurfaceKHR,
    pub families: QueueFamilyRequirement,
}

/// A live image chain: the handle, its images and one view per image.
#[derive(Debug)]
pub struct Swapchain {
    pub handle: vk::SwapchainKHR,
    pub images: Vec<vk::Image>,
    pub views: Vec<vk::ImageView>,
    pub config: SwapchainConfig,
}

impl Swapchain {
    /// Views first, then the chain. The device must be idle.
    pub fn destroy<D: DeviceBackend + ?Sized>(self, device: &D) {
        for view in self.views {
            device.destroy_image_view(view);
        }
        device.destroy_swapchain(self.handle);
    }
}

/// Queries the surface, derives a config and creates a new chain.
///
/// `old` (null for none) is handed to the backend for resource reuse. Once
/// this returns, Ok or Err, the caller owns releasing the chain behind it.
pub fn build_swapchain<I, D>(
    instance: &I,
    device: &D,
    target: &ChainTarget,
    desired: RenderSize,
    preferred: vk::PresentModeKHR,
    old: vk::SwapchainKHR,
) -> Result<Swapchain, BackendError>
where
    I: InstanceBackend + ?Sized,
    D: DeviceBackend + ?Sized,
{
    let config = query_config(instance, target, desired, preferred)?;
    create_chain(device, target.surface, config, old)
}

fn query_config<I: InstanceBackend + ?Sized>(
    instance: &I,
    target: &ChainTarget,
    desired: RenderSize,
    preferred: vk::PresentModeKHR,
) -> Result<SwapchainConfig, BackendError> {
    let phys = target.physical_device;
    let caps = instance.surface_capabilities(phys, target.surface)?;
    let formats = instance.surface_formats(phys, target.surface)?;
    let modes = instance.present_modes(phys, target.surface)?;

    let config = SwapchainConfig::derive(
        &caps,
        &formats,
        &modes,
        &target.families,
        desired,
        preferred,
    )?;

    info!(
        "format: {:?} / {:?}, present_mode: {:?}, extent: {}x{}, images(min={} → picked={}), sharing: {:?}",
        config.surface_format.format,
        config.surface_format.color_space,
        config.present_mode,
        config.extent.width,
        config.extent.height,
        caps.min_image_count,
        config.image_count,
        config.sharing_mode,
    );
    if config.present_mode != preferred {
        warn!(
            "present mode {:?} unsupported, using {:?}",
            preferred, config.present_mode
        );
    }
    Ok(config)
}

fn create_chain<D: DeviceBackend + ?Sized>(
    device: &D,
    surface: vk::SurfaceKHR,
    config: SwapchainConfig,
    old: vk::SwapchainKHR,
) -> Result<Swapchain, BackendError> {
    let handle = device.create_swapchain(surface, &config, old)?;
    let images = match device.swapchain_images(handle) {
        Ok(images) => images,
        Err(e) => {
            device.destroy_swapchain(handle);
            return Err(e);
        }
    };

    let mut views = Vec::with_capacity(images.len());
    for &image in &images {
        match device.create_image_view(image, config.surface_format.format) {
            Ok(view) => views.push(view),
            Err(e) => {
                for view in views.drain(..) {
                    device.destroy_image_view(view);
                }
                device.destroy_swapchain(handle);
                return Err(e);
            }
        }
    }

    Ok(Swapchain {
        handle,
        images,
        views,
        config,
    })
}

/// Holder for the context's image chain: either absent or live, plus whether
/// presentation is paused on a zero-sized target.
#[derive(Debug, Default)]
pub struct SwapchainSlot {
    live: Option<Swapchain>,
    paused: bool,
}

impl SwapchainSlot {
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn current(&self) -> Option<&Swapchain> {
        self.live.as_ref()
    }

    /// absent|live -> live. Waits for the device to go idle first.
    ///
    /// A failed surface query leaves the current chain untouched. Once the
    /// old chain has been passed to `create_swapchain` it is retired, so a
    /// failure from there on releases it and leaves the slot absent.
    pub fn rebuild<I, D>(
        &mut self,
        instance: &I,
        device: &D,
        target: &ChainTarget,
        desired: RenderSize,
        preferred: vk::PresentModeKHR,
    ) -> Result<&Swapchain, BackendError>
    where
        I: InstanceBackend + ?Sized,
        D: DeviceBackend + ?Sized,
    {
        device.wait_idle()?;
        let config = query_config(instance, target, desired, preferred)?;

        let old = self.live.take();
        let old_handle = old
            .as_ref()
            .map_or(vk::SwapchainKHR::null(), |chain| chain.handle);
        let built = create_chain(device, target.surface, config, old_handle);
        if let Some(old) = old {
            old.destroy(device);
        }
        Ok(&*self.live.insert(built?))
    }

    /// Follows the target size. A zero axis pauses and keeps whatever chain
    /// exists; any other size clears the pause and rebuilds. Returns the new
    /// chain, or `None` while paused.
    pub fn resize<I, D>(
        &mut self,
        instance: &I,
        device: &D,
        target: &ChainTarget,
        size: RenderSize,
        preferred: vk::PresentModeKHR,
    ) -> Result<Option<&Swapchain>, BackendError>
    where
        I: InstanceBackend + ?Sized,
        D: DeviceBackend + ?Sized,
    {
        if size.is_empty() {
            if !self.paused {
                debug!("zero-sized target, presentation paused");
            }
            self.paused = true;
            return Ok(None);
        }
        self.paused = false;
        self.rebuild(instance, device, target, size, preferred)
            .map(Some)
    }

    /// live -> absent. No-op when already absent.
    pub fn destroy<D: DeviceBackend + ?Sized>(&mut self, device: &D) {
        let Some(chain) = self.live.take() else {
            return;
        };
        if let Err(e) = device.wait_idle() {
            warn!("wait idle before swapchain teardown: {e}");
        }
        chain.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{caps, family, surface, Call, MockBackend, MockDevice};
    use ash::vk::Handle;

    fn fmt(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    fn target(families: QueueFamilyRequirement) -> ChainTarget {
        ChainTarget {
            physical_device: MockBackend::handle(0),
            surface: surface(),
            families,
        }
    }

    fn shared_family() -> QueueFamilyRequirement {
        QueueFamilyRequirement {
            graphics: Some(0),
            present: Some(0),
        }
    }

    #[test]
    fn reported_extent_wins_over_desired() {
        let c = caps(2, 8, (1280, 720));
        let e = resolve_extent(&c, RenderSize::new(800, 600));
        assert_eq!((e.width, e.height), (1280, 720));
    }

    #[test]
    fn sentinel_extent_uses_desired_size() {
        let c = caps(2, 8, (EXTENT_SENTINEL, EXTENT_SENTINEL));
        let e = resolve_extent(&c, RenderSize::new(800, 600));
        assert_eq!((e.width, e.height), (800, 600));
    }

    #[test]
    fn sentinel_extent_clamps_each_axis() {
        let c = caps(2, 8, (EXTENT_SENTINEL, EXTENT_SENTINEL));
        let e = resolve_extent(&c, RenderSize::new(10_000, 0));
        assert_eq!((e.width, e.height), (4096, 1));
    }

    #[test]
    fn preferred_mode_used_when_supported() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(
            resolve_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            vk::PresentModeKHR::MAILBOX
        );
    }

    #[test]
    fn unsupported_mode_falls_back_to_fifo() {
        let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO];
        assert_eq!(
            resolve_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn first_format_is_taken() {
        let formats = [
            fmt(vk::Format::R8G8B8A8_SRGB),
            fmt(vk::Format::B8G8R8A8_SRGB),
        ];
        let f = resolve_surface_format(&formats).unwrap();
        assert_eq!(f.format, vk::Format::R8G8B8A8_SRGB);
    }

    #[test]
    fn lone_undefined_format_means_any() {
        let f = resolve_surface_format(&[fmt(vk::Format::UNDEFINED)]).unwrap();
        assert_eq!(f.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(f.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
        assert!(resolve_surface_format(&[]).is_none());
    }

    #[test]
    fn image_count_respects_bounds() {
        assert_eq!(resolve_image_count(&caps(2, 8, (1, 1))), 3);
        assert_eq!(resolve_image_count(&caps(3, 3, (1, 1))), 3);
        assert_eq!(resolve_image_count(&caps(2, 0, (1, 1))), 3);
        for (min, max) in [(1, 1), (1, 2), (2, 3), (4, 16), (5, 0)] {
            let n = resolve_image_count(&caps(min, max, (1, 1)));
            assert!(n >= min);
            if max > 0 {
                assert!(n <= max);
            }
        }
    }

    #[test]
    fn derive_shares_concurrently_across_distinct_families() {
        let families = QueueFamilyRequirement {
            graphics: Some(0),
            present: Some(2),
        };
        let cfg = SwapchainConfig::derive(
            &caps(2, 8, (640, 480)),
            &[fmt(vk::Format::B8G8R8A8_SRGB)],
            &[vk::PresentModeKHR::FIFO],
            &families,
            RenderSize::new(640, 480),
            vk::PresentModeKHR::FIFO,
        )
        .unwrap();
        assert_eq!(cfg.sharing_mode, vk::SharingMode::CONCURRENT);
        assert_eq!(cfg.queue_family_indices, vec![0, 2]);
        assert_eq!(cfg.pre_transform, vk::SurfaceTransformFlagsKHR::IDENTITY);
    }

    #[test]
    fn derive_is_exclusive_for_one_family() {
        let cfg = SwapchainConfig::derive(
            &caps(2, 8, (640, 480)),
            &[fmt(vk::Format::B8G8R8A8_SRGB)],
            &[vk::PresentModeKHR::FIFO],
            &shared_family(),
            RenderSize::new(640, 480),
            vk::PresentModeKHR::FIFO,
        )
        .unwrap();
        assert_eq!(cfg.sharing_mode, vk::SharingMode::EXCLUSIVE);
        assert!(cfg.queue_family_indices.is_empty());
    }

    #[test]
    fn derive_without_formats_fails() {
        let err = SwapchainConfig::derive(
            &caps(2, 8, (640, 480)),
            &[],
            &[vk::PresentModeKHR::FIFO],
            &shared_family(),
            RenderSize::new(640, 480),
            vk::PresentModeKHR::FIFO,
        )
        .unwrap_err();
        assert_eq!(err.result, vk::Result::ERROR_FORMAT_NOT_SUPPORTED);
    }

    #[test]
    fn build_makes_one_view_per_image() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let chain = build_swapchain(
            &backend,
            &backend,
            &target(shared_family()),
            RenderSize::new(800, 600),
            vk::PresentModeKHR::FIFO,
            vk::SwapchainKHR::null(),
        )
        .unwrap();

        assert_eq!(chain.images.len(), 3);
        assert_eq!(chain.views.len(), chain.images.len());
        assert_eq!(chain.config.extent.width, 800);
        match &backend.calls()[0] {
            Call::CreateSwapchain { old, .. } => assert_eq!(*old, 0),
            other => panic!("unexpected first call {other:?}"),
        }
    }

    #[test]
    fn sentinel_surface_builds_at_desired_size() {
        let backend = MockBackend::new(vec![
            MockDevice::new("gpu").caps(caps(2, 8, (EXTENT_SENTINEL, EXTENT_SENTINEL)))
        ]);
        let chain = build_swapchain(
            &backend,
            &backend,
            &target(shared_family()),
            RenderSize::new(800, 600),
            vk::PresentModeKHR::MAILBOX,
            vk::SwapchainKHR::null(),
        )
        .unwrap();
        let e = chain.config.extent;
        assert_eq!((e.width, e.height), (800, 600));
        assert_eq!(chain.config.present_mode, vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn rebuild_waits_idle_then_releases_old_after_new_is_live() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();

        let first = slot
            .rebuild(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap()
            .handle
            .as_raw();
        backend.calls.borrow_mut().clear();

        let second = slot
            .rebuild(&backend, &backend, &t, RenderSize::new(1024, 768), vk::PresentModeKHR::FIFO)
            .unwrap()
            .handle
            .as_raw();
        assert_ne!(first, second);

        let calls = backend.calls();
        let wait = calls.iter().position(|c| *c == Call::WaitIdle).unwrap();
        let create = calls
            .iter()
            .position(|c| matches!(c, Call::CreateSwapchain { old, .. } if *old == first))
            .unwrap();
        let destroy = calls
            .iter()
            .position(|c| *c == Call::DestroySwapchain(first))
            .unwrap();
        let last_new_view = calls
            .iter()
            .rposition(|c| matches!(c, Call::CreateView(_)))
            .unwrap();

        assert!(wait < create);
        assert!(create < destroy);
        assert!(last_new_view < destroy);
        assert!(!calls.contains(&Call::DestroySwapchain(second)));
        assert!(slot.is_live());
    }

    #[test]
    fn old_views_released_before_old_chain() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();
        slot.rebuild(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap();
        let old = slot.current().unwrap();
        let old_handle = old.handle.as_raw();
        let old_views: Vec<u64> = old.views.iter().map(|v| v.as_raw()).collect();

        slot.rebuild(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap();
        let calls = backend.calls();
        let destroy_chain = calls
            .iter()
            .position(|c| *c == Call::DestroySwapchain(old_handle))
            .unwrap();
        for v in old_views {
            let at = calls.iter().position(|c| *c == Call::DestroyView(v)).unwrap();
            assert!(at < destroy_chain);
        }
    }

    #[test]
    fn failed_rebuild_leaves_slot_absent_and_old_released() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();
        let first = slot
            .rebuild(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap()
            .handle
            .as_raw();

        backend.fail_create_swapchain.set(true);
        let err = slot
            .rebuild(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap_err();
        assert_eq!(err.op, "create_swapchain");
        assert!(!slot.is_live());
        assert!(backend.calls().contains(&Call::DestroySwapchain(first)));
    }

    #[test]
    fn view_failure_unwinds_partial_chain() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        backend.fail_view.set(Some(1));
        let err = build_swapchain(
            &backend,
            &backend,
            &target(shared_family()),
            RenderSize::new(800, 600),
            vk::PresentModeKHR::FIFO,
            vk::SwapchainKHR::null(),
        )
        .unwrap_err();
        assert_eq!(err.op, "create_image_view");

        let calls = backend.calls();
        let made: Vec<u64> = calls
            .iter()
            .filter_map(|c| match c {
                Call::CreateView(v) => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(made.len(), 1);
        assert!(calls.contains(&Call::DestroyView(made[0])));
        assert!(matches!(calls.last(), Some(Call::DestroySwapchain(_))));
    }

    #[test]
    fn destroy_waits_idle_and_is_idempotent() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();
        slot.rebuild(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap();
        backend.calls.borrow_mut().clear();

        slot.destroy(&backend);
        slot.destroy(&backend);

        let calls = backend.calls();
        assert_eq!(calls[0], Call::WaitIdle);
        assert!(matches!(calls.last(), Some(Call::DestroySwapchain(_))));
        assert_eq!(
            calls.iter().filter(|c| **c == Call::WaitIdle).count(),
            1,
            "second destroy on an absent slot must be a no-op"
        );
        assert!(!slot.is_live());
    }

    #[test]
    fn split_families_reach_the_backend_as_concurrent() {
        let backend = MockBackend::new(vec![MockDevice::new("split")
            .families(vec![
                family(vk::QueueFlags::GRAPHICS),
                family(vk::QueueFlags::TRANSFER),
            ])
            .present_on(vec![1])]);
        let families = QueueFamilyRequirement {
            graphics: Some(0),
            present: Some(1),
        };
        build_swapchain(
            &backend,
            &backend,
            &target(families),
            RenderSize::new(800, 600),
            vk::PresentModeKHR::FIFO,
            vk::SwapchainKHR::null(),
        )
        .unwrap();
        let cfg = backend.configs.borrow()[0].clone();
        assert_eq!(cfg.sharing_mode, vk::SharingMode::CONCURRENT);
        assert_eq!(cfg.queue_family_indices, vec![0, 1]);
    }

    #[test]
    fn failed_surface_query_keeps_the_live_chain() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();
        let first = slot
            .rebuild(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap()
            .handle
            .as_raw();
        backend.calls.borrow_mut().clear();

        backend.fail_formats.set(true);
        let err = slot
            .rebuild(&backend, &backend, &t, RenderSize::new(1024, 768), vk::PresentModeKHR::FIFO)
            .unwrap_err();
        assert_eq!(err.op, "get_physical_device_surface_formats");
        assert_eq!(backend.calls(), vec![Call::WaitIdle]);
        assert_eq!(slot.current().unwrap().handle.as_raw(), first);
    }

    #[test]
    fn zero_size_pauses_and_keeps_the_chain() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();
        slot.resize(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap();
        backend.calls.borrow_mut().clear();

        let rebuilt = slot
            .resize(&backend, &backend, &t, RenderSize::new(0, 600), vk::PresentModeKHR::FIFO)
            .unwrap();
        assert!(rebuilt.is_none());
        assert!(backend.calls().is_empty());
        assert!(slot.is_live());
        assert!(slot.is_paused());
    }

    #[test]
    fn real_size_after_pause_rebuilds_once() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();
        slot.resize(&backend, &backend, &t, RenderSize::new(800, 600), vk::PresentModeKHR::FIFO)
            .unwrap();
        slot.resize(&backend, &backend, &t, RenderSize::new(0, 0), vk::PresentModeKHR::FIFO)
            .unwrap();
        backend.calls.borrow_mut().clear();

        let extent = slot
            .resize(&backend, &backend, &t, RenderSize::new(1024, 768), vk::PresentModeKHR::FIFO)
            .unwrap()
            .map(|chain| chain.config.extent);
        assert_eq!(extent.map(|e| (e.width, e.height)), Some((1024, 768)));
        let creates = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateSwapchain { .. }))
            .count();
        assert_eq!(creates, 1);
        assert!(!slot.is_paused());
    }

    #[test]
    fn starting_minimized_builds_nothing() {
        let backend = MockBackend::new(vec![MockDevice::new("gpu")]);
        let t = target(shared_family());
        let mut slot = SwapchainSlot::default();
        let rebuilt = slot
            .resize(&backend, &backend, &t, RenderSize::new(0, 0), vk::PresentModeKHR::FIFO)
            .unwrap();
        assert!(rebuilt.is_none());
        assert!(!slot.is_live());
        assert!(slot.is_paused());
        assert!(backend.calls().is_empty());
    }
}
