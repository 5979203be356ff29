// SPDX-License-Identifier: CEPL-1.0
use hearth_platform::WindowSpec;
use hearth_render::{ContextSettings, DevicePreference, PresentMode, SWAPCHAIN_EXTENSION};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_PATH: &str = "hearth.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WindowCfg {
    pub title: String,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowCfg {
    fn default() -> Self {
        WindowCfg {
            title: "Hello Triangle".to_owned(),
            x: None,
            y: None,
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeCfg {
    Immediate,
    Mailbox,
    #[default]
    Fifo,
    FifoRelaxed,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DevicePreferenceCfg {
    #[default]
    PreferDiscrete,
    FirstQualifying,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VulkanCfg {
    pub validation: bool,
    pub instance_extensions: Vec<String>,
    pub instance_layers: Vec<String>,
    pub device_extensions: Vec<String>,
    pub present_mode: PresentModeCfg,
    pub device_preference: DevicePreferenceCfg,
    pub rebuild_on_resize: bool,
}

impl Default for VulkanCfg {
    fn default() -> Self {
        VulkanCfg {
            validation: cfg!(debug_assertions),
            instance_extensions: Vec::new(),
            instance_layers: Vec::new(),
            device_extensions: vec![SWAPCHAIN_EXTENSION.to_owned()],
            present_mode: PresentModeCfg::Fifo,
            device_preference: DevicePreferenceCfg::PreferDiscrete,
            rebuild_on_resize: true,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct AppCfg {
    #[serde(default)]
    pub window: WindowCfg,
    #[serde(default)]
    pub vulkan: VulkanCfg,
}

impl From<PresentModeCfg> for PresentMode {
    fn from(mode: PresentModeCfg) -> Self {
        match mode {
            PresentModeCfg::Immediate => PresentMode::Immediate,
            PresentModeCfg::Mailbox => PresentMode::Mailbox,
            PresentModeCfg::Fifo => PresentMode::Fifo,
            PresentModeCfg::FifoRelaxed => PresentMode::FifoRelaxed,
        }
    }
}

impl From<DevicePreferenceCfg> for DevicePreference {
    fn from(pref: DevicePreferenceCfg) -> Self {
        match pref {
            DevicePreferenceCfg::PreferDiscrete => DevicePreference::PreferDiscrete,
            DevicePreferenceCfg::FirstQualifying => DevicePreference::FirstQualifying,
        }
    }
}

impl AppCfg {
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn window_spec(&self) -> WindowSpec {
        let w = &self.window;
        let spec = WindowSpec::new(w.title.clone(), w.width, w.height);
        match (w.x, w.y) {
            (Some(x), Some(y)) => spec.at(x, y),
            _ => spec,
        }
    }

    /// The application name doubles as the window title.
    pub fn context_settings(&self) -> ContextSettings {
        let v = &self.vulkan;
        ContextSettings {
            app_name: self.window.title.clone(),
            validation: v.validation,
            instance_extensions: v.instance_extensions.clone(),
            instance_layers: v.instance_layers.clone(),
            device_extensions: v.device_extensions.clone(),
            present_mode: v.present_mode.into(),
            device_preference: v.device_preference.into(),
        }
    }
}

/// Missing file gives defaults; a malformed one warns and gives defaults.
pub fn load_cfg(path: &Path) -> AppCfg {
    match fs::read_to_string(path) {
        Ok(s) => match AppCfg::parse(&s) {
            Ok(cfg) => {
                info!("config loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("ignoring malformed {}: {e}", path.display());
                AppCfg::default()
            }
        },
        Err(_) => AppCfg::default(),
    }
}
