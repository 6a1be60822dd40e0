/// The relighting render pipeline
///
/// Orchestrates one composited frame per draw call: environment background,
/// per-light shadow maps, an optional un-relit reference-scene pass, the
/// per-instance per-light relit draw, half-resolution compositing, and the
/// light-gizmo overlay. Shared mutable state (settings, instance list, the
/// interactive look matrix) is written by external callers and snapshotted
/// once at the top of each frame.
///
/// Draw errors are latched: the first failure per render target is logged,
/// subsequent failures are suppressed until the target changes, and the
/// application keeps running in a degraded state instead of tearing down
/// the render loop.

use glam::{Mat4, Vec3, Vec4};
use std::sync::{Arc, RwLock};

use crate::camera::ViewSet;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, Drawable, Framebuffer, FramebufferDesc, GraphicsDevice, PrimitiveTopology,
    ShaderProgram, ShaderProgramDesc, Texture, TextureData, TextureDesc, TextureFormat,
    TextureUsage,
};
use crate::lighting::{self, LightController, ShadowMapper, MAX_VIRTUAL_LIGHTS};
use crate::rendering::{
    BtfRequest, FidelityRequest, RenderRequest, RenderSettings, RequestQueue, ResampleRequest,
};
use crate::resource::ResourceBundle;
use crate::scene::{InstanceList, SceneBounds};
use crate::{engine_error, engine_info};

const SOURCE: &str = "prism::RelightRenderer";

/// Side length of the radial-falloff billboard texture
const LIGHT_GIZMO_TEXTURE_SIZE: u32 = 64;

// ===== ENVIRONMENT / REFERENCE SCENE =====

/// An environment image used for background and environment-mapped lighting
#[derive(Clone)]
pub struct EnvironmentMap {
    /// Environment texture (panorama or cubemap; the backend decides)
    pub texture: Arc<dyn Texture>,
}

/// A comparison scene drawn un-relit before the image-based passes
#[derive(Clone)]
pub struct ReferenceScene {
    /// Position vertex stream
    pub position_buffer: Arc<dyn Buffer>,
    /// Normal vertex stream
    pub normal_buffer: Arc<dyn Buffer>,
    /// Optional texture-coordinate stream (with `diffuse_texture`)
    pub tex_coord_buffer: Option<Arc<dyn Buffer>>,
    /// Optional diffuse texture
    pub diffuse_texture: Option<Arc<dyn Texture>>,
}

// ===== FRAME SNAPSHOTS =====

/// Per-frame snapshot of the externally mutated state
struct FrameState {
    settings: RenderSettings,
    instances: InstanceList,
    look: Mat4,
}

/// Values produced while binding the relighting uniforms
pub(crate) struct RelightBindings {
    /// Gamma-corrected ambient color, used to clear the frame
    pub clear_color: Vec3,
    /// Whether environment-mapped lighting is active this frame
    pub environment_active: bool,
}

// ===== RENDERER =====

/// The view-dependent relighting renderer
pub struct RelightRenderer {
    pub(crate) device: Arc<dyn GraphicsDevice>,
    pub(crate) resources: ResourceBundle,
    pub(crate) light_controller: Arc<dyn LightController>,

    settings: Arc<RwLock<RenderSettings>>,
    instances: Arc<RwLock<InstanceList>>,
    look_matrix: Arc<RwLock<Mat4>>,

    pub(crate) main_drawable: Box<dyn Drawable>,
    blit_drawable: Box<dyn Drawable>,
    pub(crate) env_background_drawable: Box<dyn Drawable>,
    light_gizmo_drawable: Box<dyn Drawable>,
    light_gizmo_texture: Arc<dyn Texture>,

    pub(crate) shadow: ShadowMapper,

    pub(crate) environment: Option<EnvironmentMap>,
    pending_environment: Option<Option<EnvironmentMap>>,
    pub(crate) env_map_matrix: Option<Mat4>,
    reference_scene: Option<ReferenceScene>,
    pending_reference_scene: Option<Option<ReferenceScene>>,

    pub(crate) scene_bounds: SceneBounds,
    error_suppressed: bool,
    last_target_size: Option<(u32, u32)>,
    requests: RequestQueue,
}

impl RelightRenderer {
    /// Create a renderer for a loaded resource bundle.
    ///
    /// Builds the shader programs and drawables, the shadow mapper (one
    /// layer per controller light, capped at [`MAX_VIRTUAL_LIGHTS`]), and
    /// the light-gizmo billboard texture.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        resources: ResourceBundle,
        light_controller: Arc<dyn LightController>,
    ) -> Result<Self> {
        let main_program = device.create_shader_program(ShaderProgramDesc::vertex_fragment(
            "relight",
            "shaders/common/imgspace.vert",
            "shaders/relight/relight.frag",
        ))?;
        let mut main_drawable = device.create_drawable(&main_program)?;
        Self::bind_geometry_streams(&mut main_drawable, &resources)?;

        let rectangle = device.create_rectangle()?;

        let blit_program = device.create_shader_program(ShaderProgramDesc::vertex_fragment(
            "texture_blit",
            "shaders/common/texture.vert",
            "shaders/common/texture.frag",
        ))?;
        let mut blit_drawable = device.create_drawable(&blit_program)?;
        blit_drawable.add_vertex_buffer("position", &rectangle)?;

        let env_background_program =
            device.create_shader_program(ShaderProgramDesc::vertex_fragment(
                "environment_background",
                "shaders/common/texture.vert",
                "shaders/common/envbackgroundtexture.frag",
            ))?;
        let mut env_background_drawable = device.create_drawable(&env_background_program)?;
        env_background_drawable.add_vertex_buffer("position", &rectangle)?;

        let light_gizmo_program = device.create_shader_program(ShaderProgramDesc::vertex_fragment(
            "light_gizmo",
            "shaders/common/imgspace.vert",
            "shaders/relight/light.frag",
        ))?;
        let mut light_gizmo_drawable = device.create_drawable(&light_gizmo_program)?;
        light_gizmo_drawable.add_vertex_buffer("position", &rectangle)?;

        let light_gizmo_texture = device.create_texture(TextureDesc {
            width: LIGHT_GIZMO_TEXTURE_SIZE,
            height: LIGHT_GIZMO_TEXTURE_SIZE,
            format: TextureFormat::R8_UNORM,
            usage: TextureUsage::Sampled,
            array_layers: 1,
            mip_levels: 4,
            linear_filtering: true,
            data: Some(TextureData::Single(Self::light_gizmo_pixels())),
        })?;

        let shadow = ShadowMapper::new(&device, resources.geometry(), light_controller.light_count())?;

        let geometry = resources.geometry();
        let scene_bounds = SceneBounds::derive(
            geometry.centroid(),
            geometry.bounding_radius(),
            &InstanceList::identity(),
        );

        engine_info!(
            SOURCE,
            "Renderer created: {} views, {} virtual lights",
            resources.view_set().view_count(),
            light_controller.light_count()
        );

        Ok(Self {
            device,
            resources,
            light_controller,
            settings: Arc::new(RwLock::new(RenderSettings::default())),
            instances: Arc::new(RwLock::new(InstanceList::identity())),
            look_matrix: Arc::new(RwLock::new(Mat4::IDENTITY)),
            main_drawable,
            blit_drawable,
            env_background_drawable,
            light_gizmo_drawable,
            light_gizmo_texture,
            shadow,
            environment: None,
            pending_environment: None,
            env_map_matrix: None,
            reference_scene: None,
            pending_reference_scene: None,
            scene_bounds,
            error_suppressed: false,
            last_target_size: None,
            requests: RequestQueue::new(),
        })
    }

    /// Radial falloff pixels for the light billboard
    fn light_gizmo_pixels() -> Vec<u8> {
        let size = LIGHT_GIZMO_TEXTURE_SIZE as usize;
        let mut data = Vec::with_capacity(size * size);
        for i in 0..size {
            let x = i as f64 * 2.0 / (size - 1) as f64 - 1.0;
            for j in 0..size {
                let y = j as f64 * 2.0 / (size - 1) as f64 - 1.0;
                let r = (x * x + y * y).sqrt().min(1.0);
                let value = ((r * std::f64::consts::PI).cos() + 1.0) * 0.5;
                data.push((value * 255.0).round() as u8);
            }
        }
        data
    }

    fn bind_geometry_streams(drawable: &mut Box<dyn Drawable>, resources: &ResourceBundle) -> Result<()> {
        let geometry = resources.geometry();
        drawable.add_vertex_buffer("position", geometry.position_buffer())?;
        if let Some(normals) = geometry.normal_buffer() {
            drawable.add_vertex_buffer("normal", normals)?;
        }
        if let Some(tex_coords) = geometry.tex_coord_buffer() {
            drawable.add_vertex_buffer("texCoord", tex_coords)?;
        }
        if let Some(tangents) = geometry.tangent_buffer() {
            drawable.add_vertex_buffer("tangent", tangents)?;
        }
        Ok(())
    }

    // ===== SHARED STATE HANDLES =====

    /// Handle to the settings written by external callers
    pub fn settings(&self) -> Arc<RwLock<RenderSettings>> {
        Arc::clone(&self.settings)
    }

    /// Handle to the transformation instance list
    pub fn instances(&self) -> Arc<RwLock<InstanceList>> {
        Arc::clone(&self.instances)
    }

    /// Handle to the interactive look matrix
    pub fn look_matrix(&self) -> Arc<RwLock<Mat4>> {
        Arc::clone(&self.look_matrix)
    }

    /// The loaded resource bundle
    pub fn resources(&self) -> &ResourceBundle {
        &self.resources
    }

    /// Scene-level centroid and bounding radius for the current instances
    pub fn scene_bounds(&self) -> SceneBounds {
        self.scene_bounds
    }

    pub(crate) fn settings_snapshot(&self) -> RenderSettings {
        match self.settings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn instances_snapshot(&self) -> InstanceList {
        match self.instances.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn look_snapshot(&self) -> Mat4 {
        match self.look_matrix.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    // ===== EXTERNAL SWAPS (applied at the next update tick) =====

    /// Swap the environment map; `None` disables the background and
    /// environment-mapped lighting. Applied at the next update tick.
    pub fn set_environment(&mut self, environment: Option<EnvironmentMap>) {
        self.pending_environment = Some(environment);
    }

    /// Swap the reference scene; `None` removes it.
    /// Applied at the next update tick.
    pub fn set_reference_scene(&mut self, scene: Option<ReferenceScene>) {
        self.pending_reference_scene = Some(scene);
    }

    /// Replace the main relighting program.
    ///
    /// Rebuilds the main drawable and releases the error latch.
    pub fn set_main_program(&mut self, desc: ShaderProgramDesc) -> Result<()> {
        let program = self.device.create_shader_program(desc)?;
        let mut drawable = self.device.create_drawable(&program)?;
        Self::bind_geometry_streams(&mut drawable, &self.resources)?;
        self.main_drawable = drawable;
        self.error_suppressed = false;
        Ok(())
    }

    // ===== LONG-OPERATION REQUESTS =====

    /// Request a resample export (drained at the next update tick)
    ///
    /// # Errors
    ///
    /// Fails with [`Error::OperationInFlight`] if another long operation
    /// is pending or executing.
    pub fn request_resample(&self, request: ResampleRequest) -> Result<()> {
        self.requests.submit(RenderRequest::Resample(request))
    }

    /// Request a fidelity / view-importance estimation
    ///
    /// # Errors
    ///
    /// Fails with [`Error::OperationInFlight`] if another long operation
    /// is pending or executing.
    pub fn request_fidelity(&self, request: FidelityRequest) -> Result<()> {
        self.requests.submit(RenderRequest::Fidelity(request))
    }

    /// Request a BTF export
    ///
    /// # Errors
    ///
    /// Fails with [`Error::OperationInFlight`] if another long operation
    /// is pending or executing.
    pub fn request_btf(&self, request: BtfRequest) -> Result<()> {
        self.requests.submit(RenderRequest::Btf(request))
    }

    /// Whether a long operation is pending or executing
    pub fn is_busy(&self) -> bool {
        self.requests.is_busy()
    }

    // ===== UPDATE TICK =====

    /// Apply pending swaps, refresh derived scene state, and drain at most
    /// one long-operation request.
    pub fn update(&mut self) -> Result<()> {
        if let Some(environment) = self.pending_environment.take() {
            engine_info!(
                SOURCE,
                "Environment map {}",
                if environment.is_some() { "updated" } else { "cleared" }
            );
            self.environment = environment;
        }

        if let Some(scene) = self.pending_reference_scene.take() {
            engine_info!(
                SOURCE,
                "Reference scene {}",
                if scene.is_some() { "updated" } else { "cleared" }
            );
            self.reference_scene = scene;
        }

        self.refresh_scene_bounds();

        if let Some(request) = self.requests.begin() {
            let result = match request {
                RenderRequest::Resample(request) => self.execute_resample(request),
                RenderRequest::Fidelity(request) => self.execute_fidelity(request),
                RenderRequest::Btf(request) => self.execute_btf(request),
            };
            self.requests.finish();
            result?;
        }

        Ok(())
    }

    fn refresh_scene_bounds(&mut self) {
        let instances = self.instances_snapshot();
        let geometry = self.resources.geometry();
        self.scene_bounds =
            SceneBounds::derive(geometry.centroid(), geometry.bounding_radius(), &instances);
    }

    // ===== FRAME MATH =====

    fn first_pose(&self) -> Mat4 {
        *self.resources.view_set().views()[0].pose()
    }

    pub(crate) fn scene_scale(&self) -> f32 {
        let geometry = self.resources.geometry();
        lighting::scene_scale(
            &self.first_pose(),
            geometry.centroid(),
            geometry.bounding_radius(),
            self.scene_bounds.bounding_radius,
        )
    }

    /// Interactive view matrix: the look matrix conjugated by the scene
    /// scale, composed with the first camera's orientation and a
    /// translation to the scene centroid.
    fn view_matrix(&self, look: &Mat4) -> Mat4 {
        let scale = self.scene_scale();
        Mat4::from_scale(Vec3::splat(scale))
            * *look
            * Mat4::from_scale(Vec3::splat(1.0 / scale))
            * Mat4::from_mat3(glam::Mat3::from_mat4(self.first_pose()))
            * Mat4::from_translation(-self.scene_bounds.centroid)
    }

    /// Interactive projection: the primary view's field of view, the
    /// target's aspect ratio, and a clip range of 0.01-100 scene scales.
    fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let view_set = self.resources.view_set();
        let fov = view_set
            .projection(view_set.primary_view())
            .map(|p| p.vertical_field_of_view())
            .unwrap_or(std::f32::consts::FRAC_PI_4);
        let scale = self.scene_scale();
        Mat4::perspective_rh(fov, width as f32 / height as f32, 0.01 * scale, 100.0 * scale)
    }

    fn light_view(&self, light_index: usize) -> Mat4 {
        lighting::light_view_matrix(
            &self.light_controller.light_matrix(light_index),
            self.scene_scale(),
            &self.first_pose(),
            self.scene_bounds.centroid,
        )
    }

    fn light_projection(&self, light_view: &Mat4) -> Mat4 {
        lighting::light_projection_matrix(
            light_view,
            self.scene_bounds.centroid,
            lighting::rotated_radius(&self.first_pose(), self.scene_bounds.bounding_radius),
        )
    }

    pub(crate) fn active_light_count(&self) -> usize {
        self.light_controller
            .light_count()
            .min(MAX_VIRTUAL_LIGHTS)
            .min(self.shadow.layer_count())
    }

    // ===== UNIFORM BINDING =====

    /// Bind the per-frame buffer/texture roster and blending tunables
    pub(crate) fn bind_frame_uniforms(
        &self,
        program: &Arc<dyn ShaderProgram>,
        settings: &RenderSettings,
    ) -> Result<()> {
        let resources = &self.resources;
        program.set_texture("viewImages", Some(&resources.color_textures))?;
        program.set_uniform_buffer("CameraWeights", &resources.camera_weight_buffer)?;
        program.set_uniform_buffer("CameraPoses", &resources.camera_pose_buffer)?;
        program.set_uniform_buffer("CameraProjections", &resources.camera_projection_buffer)?;
        program.set_uniform_buffer(
            "CameraProjectionIndices",
            &resources.camera_projection_index_buffer,
        )?;

        if let (Some(positions), Some(intensities), Some(indices)) = (
            &resources.light_position_buffer,
            &resources.light_intensity_buffer,
            &resources.light_index_buffer,
        ) {
            program.set_uniform_buffer("LightPositions", positions)?;
            program.set_uniform_buffer("LightIntensities", intensities)?;
            program.set_uniform_buffer("LightIndices", indices)?;
        }

        program.set_uniform(
            "viewCount",
            (resources.view_set().view_count() as i32).into(),
        )?;
        program.set_uniform("infiniteLightSources", true.into())?;

        if let Some(depth) = &resources.depth_textures {
            program.set_texture("depthImages", Some(depth))?;
        }

        program.set_uniform("gamma", settings.gamma.into())?;
        program.set_uniform("weightExponent", settings.weight_exponent.into())?;
        program.set_uniform("isotropyFactor", settings.isotropy_factor.into())?;
        program.set_uniform(
            "occlusionEnabled",
            (resources.has_depth_textures() && settings.occlusion_enabled).into(),
        )?;
        program.set_uniform("occlusionBias", settings.occlusion_bias.into())?;
        program.set_uniform(
            "imageBasedRenderingEnabled",
            settings.image_based_rendering_enabled.into(),
        )?;
        program.set_uniform("relightingEnabled", settings.relighting_enabled.into())?;
        program.set_uniform(
            "pbrGeometricAttenuationEnabled",
            settings.pbr_geometric_attenuation_enabled.into(),
        )?;
        program.set_uniform("fresnelEnabled", settings.fresnel_enabled.into())?;
        program.set_uniform("shadowsEnabled", settings.shadows_enabled.into())?;

        program.set_texture("luminanceMap", resources.luminance_map.as_ref())?;
        Ok(())
    }

    /// Bind material maps, environment, luminance encodings, ambient and
    /// shadow resources; returns the derived clear color and whether the
    /// environment is active this frame.
    pub(crate) fn bind_relighting_uniforms(
        &self,
        program: &Arc<dyn ShaderProgram>,
        settings: &RenderSettings,
    ) -> Result<RelightBindings> {
        let resources = &self.resources;

        let material_maps = [
            ("useNormalTexture", "normalMap", &resources.normal_texture),
            ("useDiffuseTexture", "diffuseMap", &resources.diffuse_texture),
            ("useSpecularTexture", "specularMap", &resources.specular_texture),
            ("useRoughnessTexture", "roughnessMap", &resources.roughness_texture),
        ];
        for (flag, slot, texture) in material_maps {
            match texture {
                Some(texture) => {
                    program.set_uniform(flag, settings.textures_enabled.into())?;
                    program.set_texture(slot, Some(texture))?;
                }
                None => {
                    program.set_uniform(flag, false.into())?;
                    program.set_texture(slot, None)?;
                }
            }
        }

        let environment_active = match (&self.environment, self.light_controller.environment_mapping_enabled()) {
            (Some(environment), true) => {
                let info = environment.texture.info();
                let face_size = info.width as f64;
                let view_count = resources.view_set().view_count() as f64;
                let level = (0.5 * (6.0 * face_size * face_size / view_count).log2()).ceil() as i32;
                let level = level.min(info.mip_levels as i32 - 2).max(0);

                program.set_uniform("useEnvironmentMap", true.into())?;
                program.set_texture("environmentMap", Some(&environment.texture))?;
                program.set_uniform("environmentMipMapLevel", level.into())?;
                program.set_uniform(
                    "diffuseEnvironmentMipMapLevel",
                    (info.mip_levels as i32 - 1).into(),
                )?;
                true
            }
            _ => {
                program.set_uniform("useEnvironmentMap", false.into())?;
                program.set_texture("environmentMap", None)?;
                false
            }
        };

        match &resources.luminance_map {
            Some(map) => {
                program.set_uniform("useLuminanceMap", true.into())?;
                program.set_texture("luminanceMap", Some(map))?;
            }
            None => {
                program.set_uniform("useLuminanceMap", false.into())?;
                program.set_texture("luminanceMap", None)?;
            }
        }
        match &resources.inverse_luminance_map {
            Some(map) => {
                program.set_uniform("useInverseLuminanceMap", true.into())?;
                program.set_texture("inverseLuminanceMap", Some(map))?;
            }
            None => {
                program.set_uniform("useInverseLuminanceMap", false.into())?;
                program.set_texture("inverseLuminanceMap", None)?;
            }
        }

        let ambient = self.light_controller.ambient_color();
        program.set_uniform("ambientColor", ambient.into())?;
        let gamma = 2.2f32;
        let clear_color = Vec3::new(
            ambient.x.powf(1.0 / gamma),
            ambient.y.powf(1.0 / gamma),
            ambient.z.powf(1.0 / gamma),
        );

        program.set_uniform(
            "infiniteLightSources",
            resources.view_set().infinite_light_sources().into(),
        )?;
        program.set_texture("shadowMaps", Some(self.shadow.maps()))?;

        match (&resources.shadow_matrix_buffer, &resources.shadow_textures) {
            (Some(matrices), Some(textures)) => {
                program.set_uniform("shadowTestingEnabled", true.into())?;
                program.set_uniform_buffer("ShadowMatrices", matrices)?;
                program.set_texture("shadowImages", Some(textures))?;
            }
            _ => {
                program.set_uniform("shadowTestingEnabled", false.into())?;
            }
        }

        Ok(RelightBindings {
            clear_color,
            environment_active,
        })
    }

    /// Upload one virtual light's position/intensity/matrix, derived
    /// relative to an instance transform. Returns the light matrix.
    pub(crate) fn bind_virtual_light(
        &self,
        program: &Arc<dyn ShaderProgram>,
        light_index: usize,
        instance: &Mat4,
    ) -> Result<Mat4> {
        let light_view = self.light_view(light_index);
        let light_matrix = light_view * *instance;

        if light_index == 0 {
            program.set_uniform("envMapMatrix", light_matrix.into())?;
        }

        let light_position = (light_matrix.inverse() * Vec4::new(0.0, 0.0, 0.0, 1.0)).truncate();
        program.set_uniform(&format!("lightPosVirtual[{}]", light_index), light_position.into())?;

        let light_distance = (light_view * self.scene_bounds.centroid.extend(1.0))
            .truncate()
            .length();
        let view_set = self.resources.view_set();
        let scale = if view_set.infinite_light_sources() {
            1.0
        } else {
            (self.first_pose() * self.resources.geometry().centroid().extend(1.0))
                .truncate()
                .length()
        };
        let dataset_intensity = view_set.light_intensity(0).map(|v| v.y).unwrap_or(1.0);
        let intensity = self.light_controller.light_color(light_index)
            * (light_distance * light_distance * dataset_intensity / (scale * scale));
        program.set_uniform(
            &format!("lightIntensityVirtual[{}]", light_index),
            intensity.into(),
        )?;

        program.set_uniform(
            &format!("lightMatrixVirtual[{}]", light_index),
            (self.light_projection(&light_view) * light_matrix).into(),
        )?;
        program.set_uniform("virtualLightCount", (self.active_light_count() as i32).into())?;

        Ok(light_matrix)
    }

    /// Render one light's shadow map for the given instances
    pub(crate) fn generate_shadow_maps(
        &self,
        light_index: usize,
        instances: &InstanceList,
    ) -> Result<()> {
        let light_view = self.light_view(light_index);
        let projection = self.light_projection(&light_view);
        let model_views: Vec<Mat4> = instances
            .transforms()
            .iter()
            .map(|m| light_view * *m)
            .collect();
        self.shadow.render(light_index, &projection, &model_views)
    }

    /// Configure the environment-background program for one draw
    pub(crate) fn configure_environment_background(
        &self,
        model_view: &Mat4,
        projection: &Mat4,
        intensity: Vec3,
    ) -> Result<()> {
        let environment = match &self.environment {
            Some(environment) => environment,
            None => return Err(Error::InvalidResource("no environment map set".to_string())),
        };
        let program = self.env_background_drawable.program();
        program.set_uniform("useEnvironmentTexture", true.into())?;
        program.set_texture("env", Some(&environment.texture))?;
        program.set_uniform("model_view", (*model_view).into())?;
        program.set_uniform("projection", (*projection).into())?;
        program.set_uniform(
            "envMapMatrix",
            self.env_map_matrix.unwrap_or(Mat4::IDENTITY).into(),
        )?;
        program.set_uniform("envMapIntensity", intensity.into())?;
        let gamma = if environment.texture.info().format.is_floating_point() {
            2.2f32
        } else {
            1.0f32
        };
        program.set_uniform("gamma", gamma.into())?;
        Ok(())
    }

    /// Calibrated-light setup used while probing one view's fidelity:
    /// renders the view's own light into shadow layer 0 and uploads it as
    /// the single virtual light.
    pub(crate) fn setup_fidelity_light(
        &self,
        program: &Arc<dyn ShaderProgram>,
        view_index: usize,
    ) -> Result<()> {
        let view_set = self.resources.view_set();
        let view = match view_set.view(view_index) {
            Some(view) => view,
            None => {
                return Err(Error::InvalidResource(format!(
                    "view index {} out of range",
                    view_index
                )))
            }
        };
        let light_index = match view.light_index() {
            Some(light_index) => light_index,
            None => {
                // Unlit view: probe without any virtual light
                program.set_uniform("virtualLightCount", 0i32.into())?;
                return Ok(());
            }
        };
        let intensity = view_set
            .light_intensity(light_index)
            .ok_or_else(|| Error::InvalidResource(format!("light index {} out of range", light_index)))?;
        let local_position = view_set
            .light_position(light_index)
            .ok_or_else(|| Error::InvalidResource(format!("light index {} out of range", light_index)))?;
        let light_position = (*view.inverse_pose() * local_position.extend(1.0)).truncate();

        let geometry = self.resources.geometry();
        let light_distance = light_position.distance(geometry.centroid());
        let radius = lighting::rotated_radius(&self.first_pose(), geometry.bounding_radius());
        let projection = Mat4::perspective_rh(
            2.0 * (radius / light_distance).atan(),
            1.0,
            light_distance - radius,
            light_distance + radius,
        );
        let light_matrix = Mat4::look_at_rh(light_position, geometry.centroid(), Vec3::Y);

        self.shadow.render(0, &projection, &[light_matrix])?;

        program.set_uniform("lightPosVirtual[0]", light_position.into())?;
        program.set_uniform("lightIntensityVirtual[0]", intensity.into())?;
        program.set_uniform("lightMatrixVirtual[0]", (projection * light_matrix).into())?;
        program.set_uniform("virtualLightCount", 1i32.into())?;
        Ok(())
    }

    // ===== FRAME DRAWING =====

    /// Draw one frame into the default framebuffer.
    ///
    /// Errors are latched: the first failure is logged, later ones are
    /// suppressed until the render target changes.
    pub fn draw(&mut self) {
        let target = self.device.default_framebuffer();
        let size = (target.width(), target.height());
        if self.last_target_size != Some(size) {
            self.last_target_size = Some(size);
            self.error_suppressed = false;
        }

        if let Err(error) = self.draw_frame(&target) {
            if !self.error_suppressed {
                engine_error!(SOURCE, "Frame draw failed: {}", error);
                self.error_suppressed = true;
            }
        }
    }

    fn draw_frame(&mut self, target: &Arc<dyn Framebuffer>) -> Result<()> {
        let frame = FrameState {
            settings: self.settings_snapshot(),
            instances: self.instances_snapshot(),
            look: self.look_snapshot(),
        };

        let main = Arc::clone(self.main_drawable.program());
        let bindings = self.bind_relighting_uniforms(&main, &frame.settings)?;

        self.device.set_multisampling(frame.settings.multisampling_enabled);
        self.device.set_back_face_culling(true);

        self.bind_frame_uniforms(&main, &frame.settings)?;

        let projection = self.projection_matrix(target.width(), target.height());
        main.set_uniform("projection", projection.into())?;

        let view = self.view_matrix(&frame.look);
        let environment_active = bindings.environment_active;

        // Offscreen buffer for half-resolution mode; dropped (and released)
        // on every exit path of this call.
        let offscreen: Option<Box<dyn Framebuffer>> = if frame.settings.half_resolution_enabled {
            Some(self.device.create_framebuffer(FramebufferDesc::color_depth(
                (target.width() / 2).max(1),
                (target.height() / 2).max(1),
                TextureFormat::R8G8B8_UNORM,
            ))?)
        } else {
            None
        };
        let draw_target: &dyn Framebuffer = match &offscreen {
            Some(framebuffer) => framebuffer.as_ref(),
            None => target.as_ref(),
        };

        let clear = bindings.clear_color;
        draw_target.clear_color(0, [clear.x, clear.y, clear.z, 1.0])?;
        draw_target.clear_depth(1.0)?;

        if environment_active {
            self.configure_environment_background(&view, &projection, clear)?;
            self.device.set_depth_testing(false);
            self.env_background_drawable
                .draw(PrimitiveTopology::TriangleFan, draw_target)?;
            self.device.set_depth_testing(true);
        }

        for light_index in 0..self.active_light_count() {
            self.generate_shadow_maps(light_index, &frame.instances)?;
        }

        if self.reference_scene.is_some() {
            main.set_uniform("imageBasedRenderingEnabled", false.into())?;
            self.draw_reference_scene(&main, draw_target, &view)?;
            main.set_uniform(
                "imageBasedRenderingEnabled",
                frame.settings.image_based_rendering_enabled.into(),
            )?;
            // The reference pass rebinds textures; restore the relit state.
            self.bind_relighting_uniforms(&main, &frame.settings)?;
        }

        for instance in frame.instances.transforms() {
            self.env_map_matrix = None;
            for light_index in 0..self.active_light_count() {
                let light_matrix = self.bind_virtual_light(&main, light_index, instance)?;
                if light_index == 0 {
                    self.env_map_matrix = Some(light_matrix);
                }
            }

            let model_view = view * *instance;
            main.set_uniform("model_view", model_view.into())?;
            main.set_uniform("viewPos", model_view.inverse().col(3).truncate().into())?;
            self.main_drawable
                .draw(PrimitiveTopology::TriangleList, draw_target)?;
        }

        if let Some(framebuffer) = &offscreen {
            self.device.flush()?;

            // Second pass at full resolution: upscale via a textured blit
            let blit = self.blit_drawable.program();
            blit.set_texture("tex", Some(&framebuffer.color_attachment_texture(0)?))?;
            target.clear_depth(1.0)?;
            self.blit_drawable
                .draw(PrimitiveTopology::TriangleFan, target.as_ref())?;
            self.device.flush()?;
        } else {
            self.device.flush()?;
        }
        drop(offscreen);

        if frame.settings.relighting_enabled && frame.settings.visible_lights_enabled {
            self.device.set_additive_blending(true);
            for light_index in 0..self.light_controller.light_count() {
                if !self.light_controller.light_visualization_enabled(light_index) {
                    continue;
                }
                let gizmo = self.light_gizmo_drawable.program();
                gizmo.set_uniform("color", self.light_controller.light_color(light_index).into())?;

                let light_position = (view * self.light_view(light_index).inverse())
                    .col(3)
                    .truncate();
                let width = target.width() as f32;
                let height = target.height() as f32;
                let model_view = Mat4::from_translation(light_position)
                    * Mat4::from_scale(Vec3::new(
                        height * -light_position.z / (16.0 * width),
                        -light_position.z / 16.0,
                        1.0,
                    ));
                gizmo.set_uniform("model_view", model_view.into())?;
                gizmo.set_uniform("projection", projection.into())?;
                gizmo.set_texture("lightTexture", Some(&self.light_gizmo_texture))?;
                self.light_gizmo_drawable
                    .draw(PrimitiveTopology::TriangleFan, target.as_ref())?;
            }
            self.device.set_additive_blending(false);
        }

        Ok(())
    }

    fn draw_reference_scene(
        &self,
        program: &Arc<dyn ShaderProgram>,
        target: &dyn Framebuffer,
        view: &Mat4,
    ) -> Result<()> {
        let scene = match &self.reference_scene {
            Some(scene) => scene,
            None => return Ok(()),
        };

        let mut drawable = self.device.create_drawable(program)?;
        drawable.add_vertex_buffer("position", &scene.position_buffer)?;
        drawable.add_vertex_buffer("normal", &scene.normal_buffer)?;

        match (&scene.tex_coord_buffer, &scene.diffuse_texture) {
            (Some(tex_coords), Some(texture)) => {
                drawable.add_vertex_buffer("texCoord", tex_coords)?;
                program.set_texture("diffuseMap", Some(texture))?;
                program.set_uniform("useDiffuseTexture", true.into())?;
            }
            _ => {
                program.set_uniform("useDiffuseTexture", false.into())?;
            }
        }

        program.set_uniform("model_view", (*view).into())?;
        program.set_uniform("viewPos", view.inverse().col(3).truncate().into())?;
        drawable.draw(PrimitiveTopology::TriangleList, target)
    }
}

/// Reference a target view set against loaded resources: resolves the
/// projection and clip range for one target view.
pub(crate) fn target_view_projection(target: &ViewSet, index: usize) -> Result<Mat4> {
    let projection = target
        .projection(index)
        .ok_or_else(|| Error::InvalidResource(format!("target view {} has no projection", index)))?;
    Ok(projection.matrix(target.recommended_near(), target.recommended_far()))
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
