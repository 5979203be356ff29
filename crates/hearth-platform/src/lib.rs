// SPDX-License-Identifier: CEPL-1.0
//! Window-system side: window creation, event classification and the
//! user-facing notices.

use anyhow::{Context, Result};
use hearth_render::RenderSize;
use tracing::{error, info};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::monitor::MonitorHandle;
use winit::window::{Window, WindowAttributes};

pub use winit;

/// Title, placement and size of the one window a program opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSpec {
    pub title: String,
    /// `None` centers the window on the primary monitor.
    pub position: Option<(i32, i32)>,
    pub size: RenderSize,
}

impl WindowSpec {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        WindowSpec {
            title: title.into(),
            position: None,
            size: RenderSize::new(width, height),
        }
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }

    /// Explicit position if set, else centered on `monitor` when known.
    pub fn origin(&self, monitor: Option<&MonitorHandle>) -> Option<(i32, i32)> {
        self.position.or_else(|| {
            monitor.map(|m| {
                let pos = m.position();
                let size = m.size();
                centered_origin(
                    (pos.x, pos.y),
                    (size.width, size.height),
                    (self.size.width, self.size.height),
                )
            })
        })
    }

    pub fn attributes(&self, monitor: Option<&MonitorHandle>) -> WindowAttributes {
        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.size.width, self.size.height));
        match self.origin(monitor) {
            Some((x, y)) => attrs.with_position(PhysicalPosition::new(x, y)),
            None => attrs,
        }
    }

    pub fn create(&self, event_loop: &ActiveEventLoop) -> Result<Window> {
        let monitor = event_loop.primary_monitor();
        let window = event_loop
            .create_window(self.attributes(monitor.as_ref()))
            .with_context(|| format!("create window \"{}\"", self.title))?;
        info!(
            "window \"{}\" created ({}x{})",
            self.title, self.size.width, self.size.height
        );
        Ok(window)
    }
}

/// Top-left corner that centers a `window`-sized rect on a monitor.
/// Windows larger than the monitor are pinned to its origin.
pub fn centered_origin(
    monitor_origin: (i32, i32),
    monitor_size: (u32, u32),
    window: (u32, u32),
) -> (i32, i32) {
    let axis = |origin: i32, avail: u32, want: u32| -> i32 {
        let slack = avail.saturating_sub(want) / 2;
        origin.saturating_add(i32::try_from(slack).unwrap_or(i32::MAX))
    };
    (
        axis(monitor_origin.0, monitor_size.0, window.0),
        axis(monitor_origin.1, monitor_size.1, window.1),
    )
}

/// The window events a program reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEvent {
    Close,
    Resize(RenderSize),
}

pub fn classify(event: &WindowEvent) -> Option<AppEvent> {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(AppEvent::Close),
        WindowEvent::Resized(size) => {
            Some(AppEvent::Resize(RenderSize::new(size.width, size.height)))
        }
        _ => None,
    }
}

/// Fatal notice. The caller exits afterwards.
pub fn show_error(title: &str, message: &str) {
    error!(dialog = title, "{message}");
}

pub fn show_info(title: &str, message: &str) {
    info!(dialog = title, "{message}");
}
