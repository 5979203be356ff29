// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
use anyhow::Result;
use clap::Parser;
use hearth_core::init_tracing;
use hearth_platform::{classify, show_error, AppEvent};
use hearth_render::{Presenter, RenderSize};
use hearth_render_vk::VkContext;
use std::path::PathBuf;
use tracing::{debug, error, info};

use hearth_platform::winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

mod config;

use config::{AppCfg, PresentModeCfg};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (TOML)
    #[arg(long, default_value = config::DEFAULT_PATH)]
    config: PathBuf,
    /// Window title, also used as the application name
    #[arg(long)]
    title: Option<String>,
    #[arg(long, value_enum)]
    present_mode: Option<PresentModeCfg>,
    /// Skip the validation layer and debug messenger
    #[arg(long)]
    no_validation: bool,
}

impl Args {
    fn apply(&self, cfg: &mut AppCfg) {
        if let Some(title) = &self.title {
            cfg.window.title = title.clone();
        }
        if let Some(mode) = self.present_mode {
            cfg.vulkan.present_mode = mode;
        }
        if self.no_validation {
            cfg.vulkan.validation = false;
        }
    }
}

struct App {
    cfg: AppCfg,
    // field order: the context must drop before the window it presents to
    context: Option<VkContext>,
    window: Option<Window>,
    pending_resize: Option<RenderSize>,
    exiting: bool,
}

impl App {
    fn new(cfg: AppCfg) -> Self {
        App {
            cfg,
            context: None,
            window: None,
            pending_resize: None,
            exiting: false,
        }
    }

    fn bring_up(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = self.cfg.window_spec().create(event_loop)?;
        let size = window.inner_size();
        let size = RenderSize::new(size.width, size.height);
        let settings = self.cfg.context_settings();

        let context = <VkContext as Presenter>::new(&window, &window, size, &settings)?;
        info!("rendering on {}", context.device_name());

        self.context = Some(context);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.exiting = true;
        if let Some(mut context) = self.context.take() {
            if let Err(e) = context.wait_idle() {
                error!("{e:#}");
            }
        }
        self.window = None;
        event_loop.exit();
    }
}

/// Fatal setup failure: tell the user and leave with status 1.
fn fatal(title: &str, err: &anyhow::Error) -> ! {
    show_error(title, &format!("{err:#}"));
    std::process::exit(1);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.bring_up(event_loop) {
                fatal(&self.cfg.window.title, &e);
            }
        }
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(window) = &self.window {
            if window_id != window.id() {
                return;
            }
        }

        match classify(&event) {
            Some(AppEvent::Close) => {
                info!("CloseRequested");
                self.shutdown(event_loop);
            }
            Some(AppEvent::Resize(size)) => {
                debug!("Resized → {}x{}", size.width, size.height);
                if self.cfg.vulkan.rebuild_on_resize {
                    self.pending_resize = Some(size);
                }
            }
            None => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.exiting {
            return;
        }
        let Some(size) = self.pending_resize.take() else {
            return;
        };
        if let Some(context) = &mut self.context {
            if let Err(e) = context.resize(size) {
                error!("{e:#}");
            }
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut cfg = config::load_cfg(&args.config);
    args.apply(&mut cfg);

    let event_loop: EventLoop<()> = EventLoop::new()?;
    let mut app = App::new(cfg);
    event_loop.run_app(&mut app)?;
    Ok(())
}
