/// Fidelity estimation - per-view error sweeps and the full report
///
/// For each source view, blending is restricted to increasingly distant
/// neighbor subsets and the per-pixel reconstruction error is measured
/// against the withheld view. Each measurement is a synchronous GPU
/// readback barrier, so a full estimation is O(views^2) barriers and runs
/// as one long blocking operation, never as per-frame work.
///
/// The error measurement itself sits behind the `ReconstructionProbe`
/// trait so the numeric pipeline (sweeps, fits, blending, ranking) can be
/// exercised without a GPU.

use glam::Vec3;
use std::io::Write;
use std::sync::Arc;

use crate::camera::ViewSet;
use crate::engine_info;
use crate::error::{Error, Result};
use crate::fidelity::{
    angular_distance, angular_distance_matrix, blend_target_curves, fit_error_curve, greedy_rank,
    match_views, FidelityCurve, FidelityReportWriter,
};
use crate::graphics_device::{
    BufferDesc, BufferUsage, ColorAttachmentDesc, Drawable, Framebuffer, FramebufferDesc,
    PrimitiveTopology, ShaderProgramDesc, TextureFormat,
};
use crate::rendering::{FidelityRequest, ProgressSink, RelightRenderer, RenderSettings};

const SOURCE: &str = "prism::FidelityEstimator";

/// Resolution of the square error-measurement buffer
const PROBE_RESOLUTION: u32 = 256;

/// Distance threshold ending a view's neighbor sweep
pub const SWEEP_STOP_DISTANCE: f64 = std::f64::consts::FRAC_PI_4;

// ===== PROBE =====

/// Measures reconstruction error for one view against a view subset
pub trait ReconstructionProbe {
    /// Per-view setup before a sweep (lighting, shadow state)
    fn prepare_view(&mut self, _view: usize) -> Result<()> {
        Ok(())
    }

    /// Render `target_view` with blending restricted to `active_views` and
    /// return the aggregate error, or `None` when no pixel carried a valid
    /// blend weight.
    fn measure(&mut self, target_view: usize, active_views: &[u32]) -> Result<Option<f64>>;
}

// ===== SWEEP =====

/// One view's accumulated (distance, error) samples
#[derive(Debug, Clone, PartialEq)]
pub struct ViewErrorSweep {
    /// Sampled minimum distances, starting at 0
    pub distances: Vec<f64>,
    /// Aggregate errors, starting at 0
    pub errors: Vec<f64>,
}

/// Sweep one view's error as increasingly distant neighbors are excluded.
///
/// Starting from threshold 0, each round keeps only the views strictly
/// farther than the threshold, measures the error, records it against the
/// subset's minimum distance, and advances the threshold to that minimum.
/// The sweep stops when the subset is empty or its minimum exceeds
/// [`SWEEP_STOP_DISTANCE`]. A measurement with no valid pixels is skipped:
/// the threshold still advances, the curve never sees the sample.
pub fn sweep_view_errors(
    probe: &mut dyn ReconstructionProbe,
    distance_row: &[f64],
    view: usize,
) -> Result<ViewErrorSweep> {
    let view_count = distance_row.len();
    let mut last_min_distance = 0.0f64;
    let mut distances = vec![0.0];
    let mut errors = vec![0.0];

    loop {
        let mut active_views: Vec<u32> = Vec::with_capacity(view_count);
        let mut min_distance = f64::INFINITY;
        for j in 0..view_count {
            if j != view && distance_row[j] > last_min_distance {
                min_distance = min_distance.min(distance_row[j]);
                active_views.push(j as u32);
            }
        }

        if active_views.is_empty() || min_distance > SWEEP_STOP_DISTANCE {
            break;
        }

        if let Some(error) = probe.measure(view, &active_views)? {
            distances.push(min_distance);
            errors.push(error);
        }
        last_min_distance = min_distance;
    }

    Ok(ViewErrorSweep { distances, errors })
}

// ===== FULL ESTIMATION =====

/// Run the complete estimation: per-view sweeps and fits, report blocks,
/// and (when a target set is supplied) the blending and greedy ranking
/// sections.
pub fn run_estimation(
    probe: &mut dyn ReconstructionProbe,
    source: &ViewSet,
    centroid: Vec3,
    weight_exponent: f64,
    target: Option<&ViewSet>,
    out: &mut dyn Write,
    progress: &dyn ProgressSink,
) -> Result<()> {
    let view_count = source.view_count();
    let source_directions = source.view_directions(centroid);
    let distance_matrix = angular_distance_matrix(&source_directions);

    let mut writer = FidelityReportWriter::new(out);
    let mut curves: Vec<FidelityCurve> = Vec::with_capacity(view_count);

    progress.set_maximum(view_count as f64);

    for view in 0..view_count {
        probe.prepare_view(view)?;

        let sweep = sweep_view_errors(probe, &distance_matrix[view], view)?;
        let curve = fit_error_curve(&sweep.distances, &sweep.errors);

        let name = source.views()[view].image_file_name().to_string();
        writer.view_block(&name, &sweep, &curve)?;
        engine_info!(
            SOURCE,
            "{}: slope {:.6}, peak {:.6}",
            name,
            curve.slope,
            curve.peak
        );

        curves.push(curve);
        progress.set_progress((view + 1) as f64);
    }

    let Some(target) = target else {
        return writer.flush();
    };

    writer.target_section_header()?;

    let target_directions = target.view_directions(centroid);
    let blended = blend_target_curves(&curves, &source_directions, &target_directions, weight_exponent);

    let source_to_target = match_views(source, target);
    let target_to_source = match_views(target, source);

    // Retire source views absent from the target set. Each retirement is
    // measured against the growing kept list, and the cumulative measured
    // error over the views still standing is re-evaluated after each one.
    let mut source_used = vec![false; view_count];
    let mut target_distances = vec![f64::MAX; target.view_count()];
    let mut active_views: Vec<u32> = Vec::with_capacity(view_count);

    for j in 0..view_count {
        if source_to_target[j].is_some() {
            continue;
        }
        source_used[j] = true;

        let measured = probe.measure(j, &active_views)?.unwrap_or(f64::NAN);
        active_views.push(j as u32);

        let mut cumulative = 0.0;
        for k in 0..view_count {
            if !source_used[k] {
                if let Some(error) = probe.measure(k, &active_views)? {
                    cumulative += error;
                }
            }
        }

        writer.source_only_row(source.views()[j].name_stem(), &curves[j], measured, cumulative)?;

        for (i, target_distance) in target_distances.iter_mut().enumerate() {
            *target_distance = target_distance
                .min(angular_distance(target_directions[i], source_directions[j]));
        }
    }

    let picks = greedy_rank(
        &target_directions,
        &blended,
        target_distances,
        &target_to_source,
        source_used,
    );

    for pick in &picks {
        writer.ranked_row(
            target.views()[pick.target_index].name_stem(),
            &blended[pick.target_index],
            pick.distance,
            pick.error,
            pick.expected_cumulative,
        )?;
    }

    writer.flush()
}

// ===== GPU PROBE =====

/// GPU-backed probe: renders the restricted blend in texture space into a
/// two-channel float buffer (squared error, blend weight) and reduces the
/// readback.
pub struct RenderedProbe<'a> {
    renderer: &'a RelightRenderer,
    drawable: Box<dyn Drawable>,
    framebuffer: Box<dyn Framebuffer>,
    settings: RenderSettings,
}

impl<'a> RenderedProbe<'a> {
    pub fn new(renderer: &'a RelightRenderer) -> Result<Self> {
        let device = &renderer.device;
        let program = device.create_shader_program(ShaderProgramDesc::vertex_fragment(
            "fidelity",
            "shaders/common/texspace_noscale.vert",
            "shaders/relight/fidelity.frag",
        ))?;

        let mut drawable = device.create_drawable(&program)?;
        let geometry = renderer.resources.geometry();
        drawable.add_vertex_buffer("position", geometry.position_buffer())?;
        if let Some(tex_coords) = geometry.tex_coord_buffer() {
            drawable.add_vertex_buffer("texCoord", tex_coords)?;
        }
        if let Some(normals) = geometry.normal_buffer() {
            drawable.add_vertex_buffer("normal", normals)?;
        }
        if let Some(tangents) = geometry.tangent_buffer() {
            drawable.add_vertex_buffer("tangent", tangents)?;
        }

        let framebuffer = device.create_framebuffer(FramebufferDesc {
            width: PROBE_RESOLUTION,
            height: PROBE_RESOLUTION,
            color_attachments: vec![ColorAttachmentDesc {
                format: TextureFormat::RG32_FLOAT,
                linear_filtering: false,
            }],
            depth_attachment: true,
        })?;

        Ok(Self {
            renderer,
            drawable,
            framebuffer,
            settings: renderer.settings_snapshot(),
        })
    }
}

impl ReconstructionProbe for RenderedProbe<'_> {
    fn prepare_view(&mut self, view: usize) -> Result<()> {
        let program = Arc::clone(self.drawable.program());
        self.renderer.bind_relighting_uniforms(&program, &self.settings)?;
        self.renderer.setup_fidelity_light(&program, view)
    }

    fn measure(&mut self, target_view: usize, active_views: &[u32]) -> Result<Option<f64>> {
        let renderer = self.renderer;
        let program = Arc::clone(self.drawable.program());
        renderer.bind_frame_uniforms(&program, &self.settings)?;

        let view_set = renderer.resources.view_set();
        let view = view_set
            .view(target_view)
            .ok_or_else(|| Error::InvalidResource(format!("view index {} out of range", target_view)))?;

        program.set_uniform("model_view", (*view.pose()).into())?;
        program.set_uniform("viewPos", view.camera_position().into())?;
        let projection = view_set
            .projection(target_view)
            .ok_or_else(|| Error::InvalidResource(format!("view {} has no projection", target_view)))?
            .matrix(view_set.recommended_near(), view_set.recommended_far());
        program.set_uniform("projection", projection.into())?;
        program.set_uniform("targetViewIndex", (target_view as i32).into())?;

        // The restricted view list lives only for this measurement
        let index_buffer = renderer.device.create_buffer(BufferDesc::with_data(
            BufferUsage::Uniform,
            bytemuck::cast_slice(active_views).to_vec(),
        ))?;
        program.set_uniform_buffer("ViewIndices", &index_buffer)?;
        program.set_uniform("viewCount", (active_views.len() as i32).into())?;

        self.framebuffer.clear_color(0, [-1.0, -1.0, -1.0, -1.0])?;
        self.framebuffer.clear_depth(1.0)?;
        self.drawable
            .draw(PrimitiveTopology::TriangleList, self.framebuffer.as_ref())?;

        let pixels = self.framebuffer.read_color_f32(0)?;
        let mut sum_square_error = 0.0f64;
        let mut valid_pixels = 0u64;
        for pixel in pixels.chunks_exact(4) {
            if pixel[1] >= 0.0 {
                sum_square_error += pixel[0] as f64;
                valid_pixels += 1;
            }
        }

        if valid_pixels == 0 {
            Ok(None)
        } else {
            Ok(Some((sum_square_error / valid_pixels as f64).sqrt()))
        }
    }
}

// ===== RENDERER ENTRY POINT =====

impl RelightRenderer {
    pub(crate) fn execute_fidelity(&mut self, request: FidelityRequest) -> Result<()> {
        engine_info!(
            SOURCE,
            "Estimating view importance for {} views",
            self.resources.view_set().view_count()
        );

        let file = std::fs::File::create(&request.export_path)?;
        let mut out = std::io::BufWriter::new(file);

        self.device.set_back_face_culling(false);
        let result = {
            let renderer: &RelightRenderer = self;
            let centroid = renderer.resources.geometry().centroid();
            let weight_exponent = renderer.settings_snapshot().weight_exponent as f64;
            match RenderedProbe::new(renderer) {
                Ok(mut probe) => run_estimation(
                    &mut probe,
                    renderer.resources.view_set(),
                    centroid,
                    weight_exponent,
                    request.target.as_ref(),
                    &mut out,
                    request.progress.as_ref(),
                ),
                Err(error) => Err(error),
            }
        };
        self.device.set_back_face_culling(true);
        result?;

        out.flush()?;
        request.progress.complete();
        engine_info!(SOURCE, "Fidelity report written to {}", request.export_path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "estimator_tests.rs"]
mod tests;
