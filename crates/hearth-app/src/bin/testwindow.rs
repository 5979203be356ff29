// SPDX-License-Identifier: CEPL-1.0
//! Installation smoke test: window, instance, messenger, surface and device
//! enumeration, then a quick math check. Exits after reporting.

use anyhow::{bail, Result};
use glam::{Mat4, Vec3, Vec4};
use hearth_core::init_tracing;
use hearth_platform::{classify, show_error, show_info, AppEvent, WindowSpec};
use hearth_render::{ContextSettings, DevicePreference, TracingSink};
use hearth_render_vk::ash::Entry;
use hearth_render_vk::{
    available_instance_extensions, available_instance_layers, query_candidates, select_device,
    InstancePlan, SurfaceProvider, VkInstance, WindowTarget,
};
use std::sync::Arc;
use tracing::{info, warn};

use hearth_platform::winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

const TITLE: &str = "Testwindow";
const APP_NAME: &str = "Api Test";

fn math_check() -> Result<Vec4> {
    let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let v = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
    if v != Vec4::new(1.0, 2.0, 3.0, 1.0) {
        bail!("mat4 * vec4 gave {v}");
    }
    Ok(v)
}

fn run_checks(window: &Window) -> Result<()> {
    let entry = Entry::linked();

    let supported = available_instance_extensions(&entry)?;
    info!("{} instance extensions supported", supported.len());
    for ext in &supported {
        info!("  {ext}");
    }

    let target = WindowTarget {
        window,
        display: window,
    };
    let settings = ContextSettings {
        app_name: APP_NAME.to_owned(),
        validation: true,
        device_extensions: Vec::new(),
        ..ContextSettings::default()
    };
    let window_extensions = target.required_instance_extensions()?;
    let layers = available_instance_layers(&entry)?;
    let plan = InstancePlan::new(&window_extensions, &settings, &layers);
    for ext in &plan.extensions {
        info!("enabling instance extension {ext}");
    }
    for layer in &plan.layers {
        info!("enabling layer {layer}");
    }
    for layer in &plan.missing_layers {
        warn!("layer {layer} not installed");
    }

    let instance = VkInstance::with_plan(entry, plan, &settings, Arc::new(TracingSink))?;
    let surface = instance.create_surface(&target)?;

    let picked = query_candidates(&instance, surface)
        .map_err(anyhow::Error::from)
        .and_then(|candidates| {
            for c in &candidates {
                info!("device: {} ({:?})", c.info.name, c.info.device_type);
            }
            let none: [&str; 0] = [];
            Ok(select_device(
                candidates,
                &none,
                DevicePreference::PreferDiscrete,
            )?)
        });
    unsafe { instance.destroy_surface(surface) };
    let chosen = picked?;
    info!("would use {}", chosen.info.name);

    let v = math_check()?;
    info!("mat4 * vec4 = {v}");
    Ok(())
}

#[derive(Default)]
struct Smoke {
    window: Option<Window>,
}

impl ApplicationHandler for Smoke {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let outcome = WindowSpec::new(TITLE, 800, 600)
            .create(event_loop)
            .and_then(|window| run_checks(&window).map(|()| window));
        match outcome {
            Ok(window) => {
                self.window = Some(window);
                show_info(TITLE, "This seems to work. Have fun!");
            }
            Err(e) => {
                show_error(TITLE, &format!("{e:#}"));
                std::process::exit(1);
            }
        }
        event_loop.exit();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(AppEvent::Close) = classify(&event) {
            event_loop.exit();
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let event_loop: EventLoop<()> = EventLoop::new()?;
    let mut app = Smoke::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
