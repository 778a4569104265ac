// SPDX-License-Identifier: CEPL-1.0
#![deny(unsafe_op_in_unsafe_fn)]
mod config;

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use ember_core::init_tracing;
use ember_math::{Vec2, Vec3};
use ember_platform::{PlatformWindow, WindowDesc};
use ember_render::{RenderSize, SurfaceProvider};
use ember_render_vk::{
    FrameOrchestrator, GpuDevice, Mesh, SceneObject, SimpleRenderSystem, Vertex, VulkanConfig,
    VulkanContext,
};
use tracing::{error, info};

use crate::config::{load_cfg, AppCfg, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    frames_in_flight: Option<usize>,
    /// Directory with simple.vert.spv / simple.frag.spv
    #[arg(long)]
    shader_dir: Option<PathBuf>,
}

impl Args {
    fn apply(&self, cfg: &mut AppCfg) {
        if let Some(w) = self.width {
            cfg.window.width = w;
        }
        if let Some(h) = self.height {
            cfg.window.height = h;
        }
        if let Some(n) = self.frames_in_flight {
            cfg.render.frames_in_flight = n;
        }
        if let Some(dir) = &self.shader_dir {
            cfg.render.shader_dir = dir.clone();
        }
    }
}

#[cfg(feature = "embed-shaders")]
fn shader_code(_cfg: &AppCfg) -> Result<(Vec<u8>, Vec<u8>)> {
    Ok((
        ember_render_vk::SIMPLE_VERT_SPV.to_vec(),
        ember_render_vk::SIMPLE_FRAG_SPV.to_vec(),
    ))
}

#[cfg(not(feature = "embed-shaders"))]
fn shader_code(cfg: &AppCfg) -> Result<(Vec<u8>, Vec<u8>)> {
    let dir = &cfg.render.shader_dir;
    let vert = ember_render_vk::load_shader(&dir.join("simple.vert.spv"))?;
    let frag = ember_render_vk::load_shader(&dir.join("simple.frag.spv"))?;
    Ok((vert, frag))
}

fn triangle() -> [Vertex; 3] {
    [
        Vertex::new([0.0, -0.5], [1.0, 0.0, 0.0]),
        Vertex::new([0.5, 0.5], [0.0, 1.0, 0.0]),
        Vertex::new([-0.5, 0.5], [0.0, 0.0, 1.0]),
    ]
}

struct App {
    // Field order is drop order: everything holding the device goes before the
    // context, and the context before the window it presents to.
    render_system: SimpleRenderSystem<VulkanContext>,
    objects: Vec<SceneObject<VulkanContext>>,
    frames: FrameOrchestrator<VulkanContext>,
    context: Rc<VulkanContext>,
    window: PlatformWindow,

    frame_count: u32,
    last_fps_instant: Instant,
}

impl App {
    fn new(cfg: &AppCfg) -> Result<Self> {
        let mut window = PlatformWindow::new(WindowDesc {
            title: cfg.window.title.clone(),
            size: RenderSize::new(cfg.window.width, cfg.window.height),
            resizable: true,
        })?;

        let context = Rc::new(VulkanContext::new(
            &window,
            &VulkanConfig {
                vsync_mode: cfg.render.vsync_mode.into(),
                ..VulkanConfig::default()
            },
        )?);

        let mut frames = FrameOrchestrator::new(
            context.clone(),
            &mut window,
            cfg.render.swapchain_options(),
        )?;
        frames.set_clear_color(cfg.render.clear_color);

        let (vert, frag) = shader_code(cfg)?;
        let render_system = SimpleRenderSystem::new(context.clone(), vert, frag)?
            .with_spin(cfg.render.spin_per_frame);

        let mesh = Rc::new(Mesh::new(context.clone(), &triangle(), None)?);
        let mut obj = SceneObject::new(mesh);
        obj.color = Vec3::new(0.1, 0.8, 0.1);
        obj.transform.translation.x = 0.2;
        obj.transform.scale = Vec2::new(2.0, 0.5);
        obj.transform.rotation = 0.25 * std::f32::consts::TAU;

        info!(
            "ready: {}x{}, {} frames in flight",
            frames.extent().width,
            frames.extent().height,
            frames.swapchain().frames_in_flight()
        );

        Ok(Self {
            render_system,
            objects: vec![obj],
            frames,
            context,
            window,
            frame_count: 0,
            last_fps_instant: Instant::now(),
        })
    }

    fn run(&mut self) -> Result<()> {
        let result = self.main_loop();
        // Drain before any field starts dropping, on error too.
        self.context.wait_idle()?;
        info!("exiting");
        result
    }

    fn main_loop(&mut self) -> Result<()> {
        while !self.window.should_close() {
            self.window.poll_events();
            self.draw_frame()?;
            self.tick_fps();
        }
        Ok(())
    }

    fn draw_frame(&mut self) -> Result<()> {
        let Some(cmd) = self.frames.begin_frame(&mut self.window)? else {
            return Ok(());
        };
        self.render_system
            .prepare(self.frames.render_pass(), self.frames.swapchain_generation())?;
        self.frames.begin_pass(cmd)?;
        self.render_system.render_objects(cmd, &mut self.objects)?;
        self.frames.end_pass(cmd)?;
        self.frames.end_frame(&mut self.window)?;
        self.frame_count = self.frame_count.saturating_add(1);
        Ok(())
    }

    fn tick_fps(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_fps_instant).as_secs_f32() >= 1.0 {
            info!("fps ~ {}", self.frame_count);
            self.frame_count = 0;
            self.last_fps_instant = now;
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut cfg = load_cfg(&args.config);
    args.apply(&mut cfg);

    let result = App::new(&cfg).and_then(|mut app| app.run());
    if let Err(e) = &result {
        error!("{e:#}");
    }
    result
}
