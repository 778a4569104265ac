// SPDX-License-Identifier: CEPL-1.0
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ember_render_vk::{SwapchainOptions, VsyncMode, DEFAULT_CLEAR_COLOR, DEFAULT_SPIN_PER_FRAME};
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "ember.toml";
const DEFAULT_FENCE_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowCfg {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowCfg {
    fn default() -> Self {
        WindowCfg {
            width: 800,
            height: 600,
            title: "ember".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VsyncModeCfg {
    #[default]
    Fifo,
    Mailbox,
}

impl From<VsyncModeCfg> for VsyncMode {
    fn from(mode: VsyncModeCfg) -> Self {
        match mode {
            VsyncModeCfg::Fifo => VsyncMode::Fifo,
            VsyncModeCfg::Mailbox => VsyncMode::Mailbox,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RenderCfg {
    pub clear_color: [f32; 4],
    pub vsync_mode: VsyncModeCfg,
    pub frames_in_flight: usize,
    pub fence_timeout_ms: u64,
    /// Radians added to every object's rotation each frame.
    pub spin_per_frame: f32,
    /// Directory holding `simple.vert.spv` and `simple.frag.spv`.
    pub shader_dir: PathBuf,
}

impl Default for RenderCfg {
    fn default() -> Self {
        RenderCfg {
            clear_color: DEFAULT_CLEAR_COLOR,
            vsync_mode: VsyncModeCfg::Fifo,
            frames_in_flight: SwapchainOptions::default().frames_in_flight,
            fence_timeout_ms: DEFAULT_FENCE_TIMEOUT_MS,
            spin_per_frame: DEFAULT_SPIN_PER_FRAME,
            shader_dir: PathBuf::from("shaders"),
        }
    }
}

impl RenderCfg {
    pub fn swapchain_options(&self) -> SwapchainOptions {
        let timeout_ms = if self.fence_timeout_ms == 0 {
            warn!(
                "render.fence_timeout_ms = 0 would fail every wait; using {DEFAULT_FENCE_TIMEOUT_MS}"
            );
            DEFAULT_FENCE_TIMEOUT_MS
        } else {
            self.fence_timeout_ms
        };
        SwapchainOptions {
            frames_in_flight: self.frames_in_flight,
            fence_timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct AppCfg {
    pub window: WindowCfg,
    pub render: RenderCfg,
}

pub fn parse_cfg(s: &str) -> Result<AppCfg, toml::de::Error> {
    toml::from_str::<AppCfg>(s)
}

/// Reads `path`; a missing or malformed file falls back to defaults.
pub fn load_cfg(path: &Path) -> AppCfg {
    let text = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("config {} not read ({e}); using defaults", path.display());
            return AppCfg::default();
        }
    };
    match parse_cfg(&text) {
        Ok(cfg) => {
            info!("config loaded from {}", path.display());
            cfg
        }
        Err(e) => {
            warn!("config {} invalid ({e}); using defaults", path.display());
            AppCfg::default()
        }
    }
}
