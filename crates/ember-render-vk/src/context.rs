//! `ash` implementation of [`GpuDevice`]: instance, surface, device, queues,
//! command pool and pipeline cache.

use std::ffi::{c_void, CStr};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
#[cfg(debug_assertions)]
use ash::ext::debug_utils as ext_debug;
use ash::khr::{surface, swapchain};
use ash::{vk, Entry, Instance};
use ember_render::{RenderSize, SurfaceStatus, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle};
use tracing::{debug, info, warn};

use crate::error::RenderError;
use crate::gpu::{GpuDevice, GraphicsPipelineDesc, ImageAcquire, SwapchainImages};

const ENTRY_POINT: &CStr = c"main";
const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VsyncMode {
    /// Target monitor refresh rate.
    #[default]
    Fifo,
    /// Low-latency vsync, uncapped frame rate. Falls back to FIFO.
    Mailbox,
}

#[derive(Clone, Debug)]
pub struct VulkanConfig {
    pub app_name: String,
    pub vsync_mode: VsyncMode,
    /// Directory for the driver pipeline cache; `None` disables persistence.
    pub pipeline_cache_dir: Option<PathBuf>,
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            app_name: "ember".to_owned(),
            vsync_mode: VsyncMode::Fifo,
            pipeline_cache_dir: Some(PathBuf::from(".")),
        }
    }
}

#[cfg(debug_assertions)]
struct DebugState {
    loader: ext_debug::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}
#[cfg(not(debug_assertions))]
type DebugState = ();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueueFamilies {
    graphics: u32,
    present: u32,
}

impl QueueFamilies {
    fn unique(&self) -> Vec<u32> {
        if self.graphics == self.present {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }
}

pub struct VulkanContext {
    _entry: Entry,
    instance: Instance,
    debug: Option<DebugState>,
    surface_loader: surface::Instance,
    surface: vk::SurfaceKHR,

    phys: vk::PhysicalDevice,
    mem_props: vk::PhysicalDeviceMemoryProperties,
    device: ash::Device,
    families: QueueFamilies,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,

    swapchain_loader: swapchain::Device,
    cmd_pool: vk::CommandPool,
    pipeline_cache: vk::PipelineCache,
    cache_path: Option<PathBuf>,
    depth_format: vk::Format,
    vsync_mode: VsyncMode,
}

#[cfg(debug_assertions)]
unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user: *mut c_void,
) -> vk::Bool32 {
    if data.is_null() || unsafe { (*data).p_message.is_null() } {
        return vk::FALSE;
    }
    let msg = unsafe { CStr::from_ptr((*data).p_message) }.to_string_lossy();
    use vk::DebugUtilsMessageSeverityFlagsEXT as Sev;
    if severity.contains(Sev::ERROR) {
        tracing::error!(target: "vulkan", ?types, "{msg}");
    } else if severity.contains(Sev::WARNING) {
        warn!(target: "vulkan", ?types, "{msg}");
    } else if severity.contains(Sev::INFO) {
        debug!(target: "vulkan", ?types, "{msg}");
    } else {
        tracing::trace!(target: "vulkan", ?types, "{msg}");
    }
    vk::FALSE
}

#[cfg(debug_assertions)]
unsafe fn create_debug_messenger(entry: &Entry, instance: &Instance) -> Result<DebugState> {
    let loader = ext_debug::Instance::new(entry, instance);
    let ci = vk::DebugUtilsMessengerCreateInfoEXT {
        s_type: vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
        message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
            | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
            | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
            | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        pfn_user_callback: Some(debug_callback),
        ..Default::default()
    };
    let messenger = loader
        .create_debug_utils_messenger(&ci, None)
        .context("create_debug_utils_messenger")?;
    Ok(DebugState { loader, messenger })
}

#[cfg(not(debug_assertions))]
unsafe fn create_debug_messenger(_entry: &Entry, _instance: &Instance) -> Result<DebugState> {
    Ok(())
}

#[cfg(debug_assertions)]
unsafe fn destroy_debug_messenger(dbg: DebugState) {
    dbg.loader.destroy_debug_utils_messenger(dbg.messenger, None);
}

#[cfg(not(debug_assertions))]
unsafe fn destroy_debug_messenger(_dbg: DebugState) {}

unsafe fn has_validation_layer(entry: &Entry) -> bool {
    entry
        .enumerate_instance_layer_properties()
        .unwrap_or_default()
        .iter()
        .any(|l| CStr::from_ptr(l.layer_name.as_ptr()) == VALIDATION_LAYER)
}

unsafe fn create_instance(
    entry: &Entry,
    display_raw: RawDisplayHandle,
    app_name: &CStr,
) -> Result<(Instance, bool)> {
    let app_info = vk::ApplicationInfo {
        s_type: vk::StructureType::APPLICATION_INFO,
        p_application_name: app_name.as_ptr(),
        application_version: 0,
        p_engine_name: c"ember".as_ptr(),
        engine_version: 0,
        api_version: vk::API_VERSION_1_0,
        ..Default::default()
    };

    #[cfg_attr(not(debug_assertions), allow(unused_mut))]
    let mut extensions = ash_window::enumerate_required_extensions(display_raw)
        .context("enumerate_required_extensions")?
        .to_vec();

    let validation = cfg!(debug_assertions) && has_validation_layer(entry);
    if cfg!(debug_assertions) && !validation {
        warn!("VK_LAYER_KHRONOS_validation not installed; running without validation");
    }
    #[cfg(debug_assertions)]
    if validation {
        extensions.push(ext_debug::NAME.as_ptr());
    }
    let layers = [VALIDATION_LAYER.as_ptr()];
    let (enabled_layer_count, pp_enabled_layer_names) = if validation {
        (layers.len() as u32, layers.as_ptr())
    } else {
        (0, std::ptr::null())
    };

    let create_info = vk::InstanceCreateInfo {
        s_type: vk::StructureType::INSTANCE_CREATE_INFO,
        p_application_info: &app_info,
        enabled_extension_count: extensions.len() as u32,
        pp_enabled_extension_names: extensions.as_ptr(),
        enabled_layer_count,
        pp_enabled_layer_names,
        ..Default::default()
    };

    let instance = entry
        .create_instance(&create_info, None)
        .context("create_instance")?;
    Ok((instance, validation))
}

/// Creates a presentable surface for any window exposing raw handles.
pub fn create_surface<W>(entry: &Entry, instance: &Instance, window: &W) -> Result<vk::SurfaceKHR>
where
    W: HasWindowHandle + HasDisplayHandle + ?Sized,
{
    let dh = window
        .display_handle()
        .map_err(|e| anyhow!("{e}"))?
        .as_raw();
    let wh = window
        .window_handle()
        .map_err(|e| anyhow!("{e}"))?
        .as_raw();
    unsafe { ash_window::create_surface(entry, instance, dh, wh, None) }
        .context("ash_window::create_surface")
}

unsafe fn find_queue_families(
    instance: &Instance,
    surf_i: &surface::Instance,
    surface: vk::SurfaceKHR,
    phys: vk::PhysicalDevice,
) -> Option<QueueFamilies> {
    let qprops = instance.get_physical_device_queue_family_properties(phys);
    let mut graphics = None;
    let mut present = None;
    for (i, q) in qprops.iter().enumerate() {
        let i = i as u32;
        if q.queue_count == 0 {
            continue;
        }
        let supports_present = surf_i
            .get_physical_device_surface_support(phys, i, surface)
            .unwrap_or(false);
        let supports_graphics = q.queue_flags.contains(vk::QueueFlags::GRAPHICS);
        // A family that does both wins outright.
        if supports_graphics && supports_present {
            return Some(QueueFamilies {
                graphics: i,
                present: i,
            });
        }
        if supports_graphics && graphics.is_none() {
            graphics = Some(i);
        }
        if supports_present && present.is_none() {
            present = Some(i);
        }
    }
    Some(QueueFamilies {
        graphics: graphics?,
        present: present?,
    })
}

unsafe fn is_device_suitable(
    instance: &Instance,
    surf_i: &surface::Instance,
    surface: vk::SurfaceKHR,
    phys: vk::PhysicalDevice,
) -> Option<QueueFamilies> {
    let families = find_queue_families(instance, surf_i, surface, phys)?;
    let has_swapchain = instance
        .enumerate_device_extension_properties(phys)
        .unwrap_or_default()
        .iter()
        .any(|e| CStr::from_ptr(e.extension_name.as_ptr()) == swapchain::NAME);
    if !has_swapchain {
        return None;
    }
    let formats = surf_i
        .get_physical_device_surface_formats(phys, surface)
        .unwrap_or_default();
    let modes = surf_i
        .get_physical_device_surface_present_modes(phys, surface)
        .unwrap_or_default();
    if formats.is_empty() || modes.is_empty() {
        return None;
    }
    Some(families)
}

unsafe fn pick_device(
    instance: &Instance,
    surf_i: &surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<(vk::PhysicalDevice, QueueFamilies)> {
    let devices = instance
        .enumerate_physical_devices()
        .context("enumerate_physical_devices")?;
    let mut fallback = None;
    for phys in devices {
        let Some(families) = is_device_suitable(instance, surf_i, surface, phys) else {
            continue;
        };
        let props = instance.get_physical_device_properties(phys);
        if props.device_type == vk::PhysicalDeviceType::DISCRETE_GPU {
            return Ok((phys, families));
        }
        fallback.get_or_insert((phys, families));
    }
    fallback.ok_or_else(|| anyhow!("no suitable physical device/queue family"))
}

unsafe fn create_logical_device(
    instance: &Instance,
    phys: vk::PhysicalDevice,
    families: QueueFamilies,
) -> Result<ash::Device> {
    let priorities = [1.0_f32];
    let queue_infos: Vec<vk::DeviceQueueCreateInfo> = families
        .unique()
        .into_iter()
        .map(|family| vk::DeviceQueueCreateInfo {
            s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
            queue_family_index: family,
            queue_count: 1,
            p_queue_priorities: priorities.as_ptr(),
            ..Default::default()
        })
        .collect();
    let device_exts = [swapchain::NAME.as_ptr()];
    let features = vk::PhysicalDeviceFeatures::default();

    let dinfo = vk::DeviceCreateInfo {
        s_type: vk::StructureType::DEVICE_CREATE_INFO,
        queue_create_info_count: queue_infos.len() as u32,
        p_queue_create_infos: queue_infos.as_ptr(),
        enabled_extension_count: device_exts.len() as u32,
        pp_enabled_extension_names: device_exts.as_ptr(),
        p_enabled_features: &features,
        ..Default::default()
    };
    instance
        .create_device(phys, &dinfo, None)
        .context("create_device")
}

unsafe fn pick_depth_format(instance: &Instance, phys: vk::PhysicalDevice) -> Result<vk::Format> {
    let candidates = [
        vk::Format::D32_SFLOAT,
        vk::Format::D32_SFLOAT_S8_UINT,
        vk::Format::D24_UNORM_S8_UINT,
    ];
    candidates
        .into_iter()
        .find(|&fmt| {
            instance
                .get_physical_device_format_properties(phys, fmt)
                .optimal_tiling_features
                .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
        })
        .ok_or_else(|| anyhow!("no supported depth attachment format"))
}

fn pick_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<(vk::SurfaceFormatKHR, &'static str)> {
    let srgb = |f: &&vk::SurfaceFormatKHR| f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR;
    if let Some(f) = formats
        .iter()
        .filter(srgb)
        .find(|f| f.format == vk::Format::B8G8R8A8_SRGB)
    {
        return Some((*f, "bgra8_srgb"));
    }
    if let Some(f) = formats
        .iter()
        .filter(srgb)
        .find(|f| f.format == vk::Format::R8G8B8A8_SRGB)
    {
        return Some((*f, "rgba8_srgb"));
    }
    formats.first().map(|f| (*f, "driver_default"))
}

fn choose_present_mode(modes: &[vk::PresentModeKHR], mode: VsyncMode) -> vk::PresentModeKHR {
    let preference: &[vk::PresentModeKHR] = match mode {
        VsyncMode::Mailbox => &[vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO],
        VsyncMode::Fifo => &[vk::PresentModeKHR::FIFO],
    };
    preference
        .iter()
        .copied()
        .find(|m| modes.contains(m))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

fn extent_from_caps(caps: &vk::SurfaceCapabilitiesKHR, want: RenderSize) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width: want
                .width
                .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: want
                .height
                .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    }
}

/// One more than the minimum, capped by the maximum (0 means no maximum).
fn image_count_from_caps(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let want = caps.min_image_count + 1;
    if caps.max_image_count == 0 {
        want
    } else {
        want.min(caps.max_image_count)
    }
}

fn hex_bytes(b: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(b.len() * 2);
    for x in b {
        let _ = write!(&mut s, "{x:02x}");
    }
    s
}

fn pipeline_cache_path(dir: &Path, props: &vk::PhysicalDeviceProperties) -> PathBuf {
    dir.join(format!(
        "vk_pipeline_cache_{:04x}_{:04x}_{:08x}_{}.bin",
        props.vendor_id,
        props.device_id,
        props.driver_version,
        hex_bytes(&props.pipeline_cache_uuid)
    ))
}

unsafe fn create_or_load_pipeline_cache(
    device: &ash::Device,
    path: Option<&Path>,
) -> Result<vk::PipelineCache> {
    let data = path.and_then(|p| fs::read(p).ok());
    let (p_initial_data, initial_data_size) = match &data {
        Some(bytes) => (bytes.as_ptr() as *const c_void, bytes.len()),
        None => (std::ptr::null(), 0),
    };
    if let (Some(p), Some(bytes)) = (path, &data) {
        debug!("loaded {} bytes of pipeline cache from {}", bytes.len(), p.display());
    }

    let ci = vk::PipelineCacheCreateInfo {
        s_type: vk::StructureType::PIPELINE_CACHE_CREATE_INFO,
        initial_data_size,
        p_initial_data,
        ..Default::default()
    };
    device
        .create_pipeline_cache(&ci, None)
        .context("create_pipeline_cache")
}

unsafe fn save_pipeline_cache(
    device: &ash::Device,
    cache: vk::PipelineCache,
    path: &Path,
) -> Result<()> {
    // Drivers may refuse on an empty cache or a lost device; nothing to save then.
    let Ok(bytes) = device.get_pipeline_cache_data(cache) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[inline]
fn vk_bool(b: bool) -> vk::Bool32 {
    if b {
        vk::TRUE
    } else {
        vk::FALSE
    }
}

fn timeout_ns(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX)
}

impl VulkanContext {
    pub fn new<W: WindowSurface + ?Sized>(window: &W, config: &VulkanConfig) -> Result<Self> {
        unsafe { Self::build(window, config) }
    }

    // STRICT ORDER:
    // 1) Instance (platform WSI + debug ext)
    // 2) Surface FROM THIS INSTANCE
    // 3) Physical device + queue families checked AGAINST THIS SURFACE
    // 4) Logical device, queues, command pool, pipeline cache
    unsafe fn build<W: WindowSurface + ?Sized>(window: &W, config: &VulkanConfig) -> Result<Self> {
        let entry = Entry::load().context("load Vulkan loader")?;
        let display_raw = window
            .display_handle()
            .map_err(|e| anyhow!("{e}"))?
            .as_raw();

        let app_name = std::ffi::CString::new(config.app_name.replace('\0', ""))
            .context("application name")?;
        let (instance, validation) = create_instance(&entry, display_raw, &app_name)?;
        let debug = if validation {
            Some(create_debug_messenger(&entry, &instance)?)
        } else {
            None
        };

        let surface_loader = surface::Instance::new(&entry, &instance);
        let surface = create_surface(&entry, &instance, window)?;

        let (phys, families) = pick_device(&instance, &surface_loader, surface)?;
        let props = instance.get_physical_device_properties(phys);
        let name = CStr::from_ptr(props.device_name.as_ptr()).to_string_lossy();
        info!(
            "Vulkan device: {} ({:?}), graphics family {}, present family {}",
            name, props.device_type, families.graphics, families.present
        );

        let device = create_logical_device(&instance, phys, families)?;
        let graphics_queue = device.get_device_queue(families.graphics, 0);
        let present_queue = device.get_device_queue(families.present, 0);
        let swapchain_loader = swapchain::Device::new(&instance, &device);

        let pool_info = vk::CommandPoolCreateInfo {
            s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
            queue_family_index: families.graphics,
            flags: vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER
                | vk::CommandPoolCreateFlags::TRANSIENT,
            ..Default::default()
        };
        let cmd_pool = device
            .create_command_pool(&pool_info, None)
            .context("create_command_pool")?;

        let cache_path = config
            .pipeline_cache_dir
            .as_deref()
            .map(|dir| pipeline_cache_path(dir, &props));
        let pipeline_cache = create_or_load_pipeline_cache(&device, cache_path.as_deref())?;

        let depth_format = pick_depth_format(&instance, phys)?;
        let mem_props = instance.get_physical_device_memory_properties(phys);

        Ok(Self {
            _entry: entry,
            instance,
            debug,
            surface_loader,
            surface,
            phys,
            mem_props,
            device,
            families,
            graphics_queue,
            present_queue,
            swapchain_loader,
            cmd_pool,
            pipeline_cache,
            cache_path,
            depth_format,
            vsync_mode: config.vsync_mode,
        })
    }

    #[inline]
    pub fn vsync_mode(&self) -> VsyncMode {
        self.vsync_mode
    }

    /// Takes effect at the next swapchain recreation.
    pub fn set_vsync_mode(&mut self, mode: VsyncMode) {
        self.vsync_mode = mode;
    }

    fn find_memory_type(&self, type_bits: u32, req: vk::MemoryPropertyFlags) -> Result<u32> {
        (0..self.mem_props.memory_type_count)
            .find(|&i| {
                type_bits & (1 << i) != 0
                    && self.mem_props.memory_types[i as usize]
                        .property_flags
                        .contains(req)
            })
            .ok_or_else(|| anyhow!("no memory type with {req:?} in mask {type_bits:#b}"))
    }

    unsafe fn allocate_for(
        &self,
        req: vk::MemoryRequirements,
        props: vk::MemoryPropertyFlags,
    ) -> Result<vk::DeviceMemory> {
        let alloc = vk::MemoryAllocateInfo {
            s_type: vk::StructureType::MEMORY_ALLOCATE_INFO,
            allocation_size: req.size,
            memory_type_index: self.find_memory_type(req.memory_type_bits, props)?,
            ..Default::default()
        };
        self.device
            .allocate_memory(&alloc, None)
            .context("allocate_memory")
    }
}

// STRICT TEARDOWN ORDER:
// - device_wait_idle()
// - Save and destroy the pipeline cache
// - Command pool BEFORE device (frees any buffer still allocated from it)
// - Device, THEN surface, THEN debug messenger, instance last
//
// Everything created through this context (swapchains, pipelines, buffers)
// must already be gone; they hold an `Rc` to it, so they are.
impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            let d = &self.device;
            d.device_wait_idle().ok();

            if let Some(path) = &self.cache_path {
                if let Err(e) = save_pipeline_cache(d, self.pipeline_cache, path) {
                    warn!("pipeline cache not saved: {e:#}");
                }
            }
            d.destroy_pipeline_cache(self.pipeline_cache, None);
            d.destroy_command_pool(self.cmd_pool, None);

            d.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            if let Some(dbg) = self.debug.take() {
                destroy_debug_messenger(dbg);
            }
            self.instance.destroy_instance(None);
        }
    }
}

impl GpuDevice for VulkanContext {
    fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }.context("device_wait_idle")
    }

    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        let ci = vk::SemaphoreCreateInfo::default();
        unsafe { self.device.create_semaphore(&ci, None) }.context("create_semaphore")
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe { self.device.destroy_semaphore(semaphore, None) }
    }

    fn create_fence(&self, signaled: bool) -> Result<vk::Fence> {
        let ci = vk::FenceCreateInfo {
            s_type: vk::StructureType::FENCE_CREATE_INFO,
            flags: if signaled {
                vk::FenceCreateFlags::SIGNALED
            } else {
                vk::FenceCreateFlags::empty()
            },
            ..Default::default()
        };
        unsafe { self.device.create_fence(&ci, None) }.context("create_fence")
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        unsafe { self.device.destroy_fence(fence, None) }
    }

    fn wait_for_fence(&self, fence: vk::Fence, timeout: Duration) -> Result<()> {
        match unsafe { self.device.wait_for_fences(&[fence], true, timeout_ns(timeout)) } {
            Ok(()) => Ok(()),
            Err(vk::Result::TIMEOUT) => Err(RenderError::FenceTimeout(timeout).into()),
            Err(e) => Err(anyhow!("wait_for_fences: {e:?}")),
        }
    }

    fn reset_fence(&self, fence: vk::Fence) -> Result<()> {
        unsafe { self.device.reset_fences(&[fence]) }.context("reset_fences")
    }

    fn create_swapchain(
        &self,
        extent: RenderSize,
        old: vk::SwapchainKHR,
    ) -> Result<SwapchainImages> {
        unsafe {
            let caps = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.phys, self.surface)
                .context("get_physical_device_surface_capabilities")?;
            let formats = self
                .surface_loader
                .get_physical_device_surface_formats(self.phys, self.surface)
                .context("get_physical_device_surface_formats")?;
            let modes = self
                .surface_loader
                .get_physical_device_surface_present_modes(self.phys, self.surface)
                .context("get_physical_device_surface_present_modes")?;

            let (surf_format, reason) =
                pick_surface_format(&formats).ok_or_else(|| anyhow!("surface reports no formats"))?;
            let present_mode = choose_present_mode(&modes, self.vsync_mode);
            let image_extent = extent_from_caps(&caps, extent);
            let min_image_count = image_count_from_caps(&caps);
            debug!(
                "surface format {:?}/{:?} ({reason}), present mode {:?}, extent {}x{}, images min={} picked={}",
                surf_format.format,
                surf_format.color_space,
                present_mode,
                image_extent.width,
                image_extent.height,
                caps.min_image_count,
                min_image_count
            );

            let pre_transform = if caps
                .supported_transforms
                .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
            {
                vk::SurfaceTransformFlagsKHR::IDENTITY
            } else {
                caps.current_transform
            };

            let family_indices = [self.families.graphics, self.families.present];
            let (image_sharing_mode, queue_family_index_count, p_queue_family_indices) =
                if self.families.graphics != self.families.present {
                    (vk::SharingMode::CONCURRENT, 2, family_indices.as_ptr())
                } else {
                    (vk::SharingMode::EXCLUSIVE, 0, std::ptr::null())
                };

            let swap_info = vk::SwapchainCreateInfoKHR {
                s_type: vk::StructureType::SWAPCHAIN_CREATE_INFO_KHR,
                surface: self.surface,
                min_image_count,
                image_format: surf_format.format,
                image_color_space: surf_format.color_space,
                image_extent,
                image_array_layers: 1,
                image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
                image_sharing_mode,
                queue_family_index_count,
                p_queue_family_indices,
                pre_transform,
                composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
                present_mode,
                clipped: vk::TRUE,
                old_swapchain: old,
                ..Default::default()
            };

            let swapchain = self
                .swapchain_loader
                .create_swapchain(&swap_info, None)
                .context("create_swapchain")?;
            let images = match self.swapchain_loader.get_swapchain_images(swapchain) {
                Ok(images) => images,
                Err(e) => {
                    self.swapchain_loader.destroy_swapchain(swapchain, None);
                    return Err(anyhow!("get_swapchain_images: {e:?}"));
                }
            };

            Ok(SwapchainImages {
                swapchain,
                images,
                format: surf_format.format,
                extent: image_extent,
                present_mode,
            })
        }
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) }
    }

    fn acquire_next_image(
        &self,
        swapchain: vk::SwapchainKHR,
        signal: vk::Semaphore,
        timeout: Duration,
    ) -> Result<ImageAcquire> {
        let res = unsafe {
            self.swapchain_loader.acquire_next_image(
                swapchain,
                timeout_ns(timeout),
                signal,
                vk::Fence::null(),
            )
        };
        match res {
            Ok((image_index, suboptimal)) => Ok(ImageAcquire::Ready {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(ImageAcquire::OutOfDate),
            Err(vk::Result::TIMEOUT) | Err(vk::Result::NOT_READY) => {
                Err(RenderError::FenceTimeout(timeout).into())
            }
            Err(e) => Err(anyhow!("acquire_next_image: {e:?}")),
        }
    }

    fn submit(
        &self,
        cmd: vk::CommandBuffer,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<()> {
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let submit = vk::SubmitInfo {
            s_type: vk::StructureType::SUBMIT_INFO,
            wait_semaphore_count: 1,
            p_wait_semaphores: &wait,
            p_wait_dst_stage_mask: wait_stages.as_ptr(),
            command_buffer_count: 1,
            p_command_buffers: &cmd,
            signal_semaphore_count: 1,
            p_signal_semaphores: &signal,
            ..Default::default()
        };
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, std::slice::from_ref(&submit), fence)
        }
        .context("queue_submit")
    }

    fn present(
        &self,
        swapchain: vk::SwapchainKHR,
        image_index: u32,
        wait: vk::Semaphore,
    ) -> Result<SurfaceStatus> {
        let present = vk::PresentInfoKHR {
            s_type: vk::StructureType::PRESENT_INFO_KHR,
            wait_semaphore_count: 1,
            p_wait_semaphores: &wait,
            swapchain_count: 1,
            p_swapchains: &swapchain,
            p_image_indices: &image_index,
            ..Default::default()
        };
        match unsafe { self.swapchain_loader.queue_present(self.present_queue, &present) } {
            Ok(false) => Ok(SurfaceStatus::Optimal),
            Ok(true) => Ok(SurfaceStatus::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(SurfaceStatus::OutOfDate),
            Err(e) => Err(anyhow!("queue_present: {e:?}")),
        }
    }

    fn depth_format(&self) -> Result<vk::Format> {
        Ok(self.depth_format)
    }

    fn create_image_view(
        &self,
        image: vk::Image,
        format: vk::Format,
        aspect: vk::ImageAspectFlags,
    ) -> Result<vk::ImageView> {
        let view_ci = vk::ImageViewCreateInfo {
            s_type: vk::StructureType::IMAGE_VIEW_CREATE_INFO,
            image,
            view_type: vk::ImageViewType::TYPE_2D,
            format,
            subresource_range: vk::ImageSubresourceRange {
                aspect_mask: aspect,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
            ..Default::default()
        };
        unsafe { self.device.create_image_view(&view_ci, None) }.context("create_image_view")
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn create_attachment_image(
        &self,
        extent: vk::Extent2D,
        format: vk::Format,
        usage: vk::ImageUsageFlags,
    ) -> Result<(vk::Image, vk::DeviceMemory)> {
        let img_ci = vk::ImageCreateInfo {
            s_type: vk::StructureType::IMAGE_CREATE_INFO,
            image_type: vk::ImageType::TYPE_2D,
            format,
            extent: vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            },
            mip_levels: 1,
            array_layers: 1,
            samples: vk::SampleCountFlags::TYPE_1,
            tiling: vk::ImageTiling::OPTIMAL,
            usage,
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            initial_layout: vk::ImageLayout::UNDEFINED,
            ..Default::default()
        };
        unsafe {
            let image = self
                .device
                .create_image(&img_ci, None)
                .context("create_image")?;
            let req = self.device.get_image_memory_requirements(image);
            let memory = match self.allocate_for(req, vk::MemoryPropertyFlags::DEVICE_LOCAL) {
                Ok(m) => m,
                Err(e) => {
                    self.device.destroy_image(image, None);
                    return Err(e);
                }
            };
            if let Err(e) = self.device.bind_image_memory(image, memory, 0) {
                self.device.destroy_image(image, None);
                self.device.free_memory(memory, None);
                return Err(anyhow!("bind_image_memory: {e:?}"));
            }
            Ok((image, memory))
        }
    }

    fn destroy_image(&self, image: vk::Image, memory: vk::DeviceMemory) {
        unsafe {
            self.device.destroy_image(image, None);
            self.device.free_memory(memory, None);
        }
    }

    fn create_render_pass(&self, color: vk::Format, depth: vk::Format) -> Result<vk::RenderPass> {
        let attachments = [
            vk::AttachmentDescription {
                format: color,
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: vk::AttachmentLoadOp::CLEAR,
                store_op: vk::AttachmentStoreOp::STORE,
                stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
                stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
                initial_layout: vk::ImageLayout::UNDEFINED,
                final_layout: vk::ImageLayout::PRESENT_SRC_KHR,
                ..Default::default()
            },
            vk::AttachmentDescription {
                format: depth,
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: vk::AttachmentLoadOp::CLEAR,
                store_op: vk::AttachmentStoreOp::DONT_CARE,
                stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
                stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
                initial_layout: vk::ImageLayout::UNDEFINED,
                final_layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                ..Default::default()
            },
        ];
        let color_ref = vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        };
        let depth_ref = vk::AttachmentReference {
            attachment: 1,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        };
        let subpass = vk::SubpassDescription {
            pipeline_bind_point: vk::PipelineBindPoint::GRAPHICS,
            color_attachment_count: 1,
            p_color_attachments: &color_ref,
            p_depth_stencil_attachment: &depth_ref,
            ..Default::default()
        };
        // Attachment writes wait for the acquire semaphore's stage.
        let dependency = vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            src_access_mask: vk::AccessFlags::empty(),
            dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            ..Default::default()
        };
        let ci = vk::RenderPassCreateInfo {
            s_type: vk::StructureType::RENDER_PASS_CREATE_INFO,
            attachment_count: attachments.len() as u32,
            p_attachments: attachments.as_ptr(),
            subpass_count: 1,
            p_subpasses: &subpass,
            dependency_count: 1,
            p_dependencies: &dependency,
            ..Default::default()
        };
        unsafe { self.device.create_render_pass(&ci, None) }.context("create_render_pass")
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        unsafe { self.device.destroy_render_pass(render_pass, None) }
    }

    fn create_framebuffer(
        &self,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> Result<vk::Framebuffer> {
        let ci = vk::FramebufferCreateInfo {
            s_type: vk::StructureType::FRAMEBUFFER_CREATE_INFO,
            render_pass,
            attachment_count: attachments.len() as u32,
            p_attachments: attachments.as_ptr(),
            width: extent.width,
            height: extent.height,
            layers: 1,
            ..Default::default()
        };
        unsafe { self.device.create_framebuffer(&ci, None) }.context("create_framebuffer")
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.device.destroy_framebuffer(framebuffer, None) }
    }

    fn allocate_command_buffers(&self, count: usize) -> Result<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo {
            s_type: vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO,
            command_pool: self.cmd_pool,
            level: vk::CommandBufferLevel::PRIMARY,
            command_buffer_count: count as u32,
            ..Default::default()
        };
        unsafe { self.device.allocate_command_buffers(&alloc_info) }
            .context("allocate_command_buffers")
    }

    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]) {
        if buffers.is_empty() {
            return;
        }
        unsafe { self.device.free_command_buffers(self.cmd_pool, buffers) }
    }

    fn begin_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()> {
        let bi = vk::CommandBufferBeginInfo {
            s_type: vk::StructureType::COMMAND_BUFFER_BEGIN_INFO,
            ..Default::default()
        };
        unsafe { self.device.begin_command_buffer(cmd, &bi) }.context("begin_command_buffer")
    }

    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()> {
        unsafe { self.device.end_command_buffer(cmd) }.context("end_command_buffer")
    }

    fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear: &[vk::ClearValue],
    ) {
        let bi = vk::RenderPassBeginInfo {
            s_type: vk::StructureType::RENDER_PASS_BEGIN_INFO,
            render_pass,
            framebuffer,
            render_area: vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
            clear_value_count: clear.len() as u32,
            p_clear_values: clear.as_ptr(),
            ..Default::default()
        };
        unsafe {
            self.device
                .cmd_begin_render_pass(cmd, &bi, vk::SubpassContents::INLINE)
        }
    }

    fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer) {
        unsafe { self.device.cmd_end_render_pass(cmd) }
    }

    fn cmd_set_viewport_scissor(&self, cmd: vk::CommandBuffer, extent: vk::Extent2D) {
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };
        unsafe {
            self.device.cmd_set_viewport(cmd, 0, &[viewport]);
            self.device.cmd_set_scissor(cmd, 0, &[scissor]);
        }
    }

    fn create_shader_module(&self, code: &[u32]) -> Result<vk::ShaderModule> {
        let ci = vk::ShaderModuleCreateInfo {
            s_type: vk::StructureType::SHADER_MODULE_CREATE_INFO,
            p_code: code.as_ptr(),
            code_size: code.len() * 4,
            ..Default::default()
        };
        unsafe { self.device.create_shader_module(&ci, None) }.context("create_shader_module")
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn create_pipeline_layout(
        &self,
        set_layouts: &[vk::DescriptorSetLayout],
        push_constants: &[vk::PushConstantRange],
    ) -> Result<vk::PipelineLayout> {
        let ci = vk::PipelineLayoutCreateInfo {
            s_type: vk::StructureType::PIPELINE_LAYOUT_CREATE_INFO,
            set_layout_count: set_layouts.len() as u32,
            p_set_layouts: set_layouts.as_ptr(),
            push_constant_range_count: push_constants.len() as u32,
            p_push_constant_ranges: push_constants.as_ptr(),
            ..Default::default()
        };
        unsafe { self.device.create_pipeline_layout(&ci, None) }
            .context("create_pipeline_layout")
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        unsafe { self.device.destroy_pipeline_layout(layout, None) }
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_>) -> Result<vk::Pipeline> {
        let cfg = desc.config;

        let stages = [
            vk::PipelineShaderStageCreateInfo {
                s_type: vk::StructureType::PIPELINE_SHADER_STAGE_CREATE_INFO,
                stage: vk::ShaderStageFlags::VERTEX,
                module: desc.vertex_module,
                p_name: ENTRY_POINT.as_ptr(),
                ..Default::default()
            },
            vk::PipelineShaderStageCreateInfo {
                s_type: vk::StructureType::PIPELINE_SHADER_STAGE_CREATE_INFO,
                stage: vk::ShaderStageFlags::FRAGMENT,
                module: desc.fragment_module,
                p_name: ENTRY_POINT.as_ptr(),
                ..Default::default()
            },
        ];

        let vertex_input = vk::PipelineVertexInputStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_VERTEX_INPUT_STATE_CREATE_INFO,
            vertex_binding_description_count: desc.bindings.len() as u32,
            p_vertex_binding_descriptions: desc.bindings.as_ptr(),
            vertex_attribute_description_count: desc.attributes.len() as u32,
            p_vertex_attribute_descriptions: desc.attributes.as_ptr(),
            ..Default::default()
        };
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_INPUT_ASSEMBLY_STATE_CREATE_INFO,
            topology: cfg.topology,
            primitive_restart_enable: vk_bool(cfg.primitive_restart),
            ..Default::default()
        };
        // Viewport and scissor are dynamic; only the counts matter here.
        let viewport_state = vk::PipelineViewportStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_VIEWPORT_STATE_CREATE_INFO,
            viewport_count: 1,
            scissor_count: 1,
            ..Default::default()
        };
        let raster = vk::PipelineRasterizationStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_RASTERIZATION_STATE_CREATE_INFO,
            polygon_mode: cfg.polygon_mode,
            cull_mode: cfg.cull_mode,
            front_face: cfg.front_face,
            line_width: cfg.line_width,
            ..Default::default()
        };
        let multisample = vk::PipelineMultisampleStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_MULTISAMPLE_STATE_CREATE_INFO,
            rasterization_samples: cfg.samples,
            min_sample_shading: 1.0,
            ..Default::default()
        };
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_DEPTH_STENCIL_STATE_CREATE_INFO,
            depth_test_enable: vk_bool(cfg.depth_test),
            depth_write_enable: vk_bool(cfg.depth_write),
            depth_compare_op: cfg.depth_compare,
            max_depth_bounds: 1.0,
            ..Default::default()
        };
        let color_blend_att = vk::PipelineColorBlendAttachmentState {
            blend_enable: vk_bool(cfg.blend_enable),
            src_color_blend_factor: vk::BlendFactor::SRC_ALPHA,
            dst_color_blend_factor: vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
            color_blend_op: vk::BlendOp::ADD,
            src_alpha_blend_factor: vk::BlendFactor::ONE,
            dst_alpha_blend_factor: vk::BlendFactor::ZERO,
            alpha_blend_op: vk::BlendOp::ADD,
            color_write_mask: vk::ColorComponentFlags::RGBA,
        };
        let color_blend = vk::PipelineColorBlendStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_COLOR_BLEND_STATE_CREATE_INFO,
            attachment_count: 1,
            p_attachments: &color_blend_att,
            ..Default::default()
        };
        let dynamic_state = vk::PipelineDynamicStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_DYNAMIC_STATE_CREATE_INFO,
            dynamic_state_count: cfg.dynamic_states.len() as u32,
            p_dynamic_states: cfg.dynamic_states.as_ptr(),
            ..Default::default()
        };

        let pipeline_info = vk::GraphicsPipelineCreateInfo {
            s_type: vk::StructureType::GRAPHICS_PIPELINE_CREATE_INFO,
            stage_count: stages.len() as u32,
            p_stages: stages.as_ptr(),
            p_vertex_input_state: &vertex_input,
            p_input_assembly_state: &input_assembly,
            p_viewport_state: &viewport_state,
            p_rasterization_state: &raster,
            p_multisample_state: &multisample,
            p_depth_stencil_state: &depth_stencil,
            p_color_blend_state: &color_blend,
            p_dynamic_state: &dynamic_state,
            layout: desc.layout,
            render_pass: desc.render_pass,
            subpass: cfg.subpass,
            ..Default::default()
        };

        let pipelines = unsafe {
            self.device.create_graphics_pipelines(
                self.pipeline_cache,
                std::slice::from_ref(&pipeline_info),
                None,
            )
        }
        .map_err(|(_, err)| anyhow!("create_graphics_pipelines failed: {err:?}"))?;
        pipelines
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("create_graphics_pipelines returned no pipeline"))
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) }
    }

    fn cmd_bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        unsafe {
            self.device
                .cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, pipeline)
        }
    }

    fn cmd_push_constants(
        &self,
        cmd: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) {
        unsafe { self.device.cmd_push_constants(cmd, layout, stages, offset, data) }
    }

    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> Result<(vk::Buffer, vk::DeviceMemory)> {
        let bci = vk::BufferCreateInfo {
            s_type: vk::StructureType::BUFFER_CREATE_INFO,
            size,
            usage,
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            ..Default::default()
        };
        unsafe {
            let buf = self
                .device
                .create_buffer(&bci, None)
                .context("create_buffer")?;
            let req = self.device.get_buffer_memory_requirements(buf);
            let mem = match self.allocate_for(req, properties) {
                Ok(m) => m,
                Err(e) => {
                    self.device.destroy_buffer(buf, None);
                    return Err(e);
                }
            };
            if let Err(e) = self.device.bind_buffer_memory(buf, mem, 0) {
                self.device.destroy_buffer(buf, None);
                self.device.free_memory(mem, None);
                return Err(anyhow!("bind_buffer_memory: {e:?}"));
            }
            Ok((buf, mem))
        }
    }

    fn write_memory(&self, memory: vk::DeviceMemory, data: &[u8]) -> Result<()> {
        unsafe {
            let ptr = self
                .device
                .map_memory(memory, 0, data.len() as vk::DeviceSize, vk::MemoryMapFlags::empty())
                .context("map_memory")?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), ptr as *mut u8, data.len());
            self.device.unmap_memory(memory);
        }
        Ok(())
    }

    fn destroy_buffer(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) {
        unsafe {
            self.device.destroy_buffer(buffer, None);
            self.device.free_memory(memory, None);
        }
    }

    fn cmd_bind_vertex_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer) {
        unsafe { self.device.cmd_bind_vertex_buffers(cmd, 0, &[buffer], &[0]) }
    }

    fn cmd_bind_index_buffer(&self, cmd: vk::CommandBuffer, buffer: vk::Buffer) {
        unsafe {
            self.device
                .cmd_bind_index_buffer(cmd, buffer, 0, vk::IndexType::UINT32)
        }
    }

    fn cmd_draw(&self, cmd: vk::CommandBuffer, vertex_count: u32) {
        unsafe { self.device.cmd_draw(cmd, vertex_count, 1, 0, 0) }
    }

    fn cmd_draw_indexed(&self, cmd: vk::CommandBuffer, index_count: u32) {
        unsafe { self.device.cmd_draw_indexed(cmd, index_count, 1, 0, 0, 0) }
    }
}
