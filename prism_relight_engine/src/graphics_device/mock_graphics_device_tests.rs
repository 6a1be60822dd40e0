use super::*;
use crate::graphics_device::{BufferUsage, ShaderStage};

fn create_device() -> MockGraphicsDevice {
    MockGraphicsDevice::new(800, 600)
}

// ============================================================================
// Resource creation
// ============================================================================

#[test]
fn test_create_texture_records_info() {
    let device = create_device();
    let texture = device
        .create_texture(TextureDesc {
            width: 128,
            height: 64,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: TextureUsage::Sampled,
            array_layers: 3,
            mip_levels: 1,
            linear_filtering: true,
            data: None,
        })
        .unwrap();

    let info = texture.info();
    assert_eq!(info.width, 128);
    assert_eq!(info.height, 64);
    assert_eq!(info.array_layers, 3);
    assert!(info.is_array());
    assert_eq!(device.created_textures.lock().unwrap().len(), 1);
}

#[test]
fn test_create_buffer_rejects_oversized_data() {
    let device = create_device();
    let result = device.create_buffer(BufferDesc {
        size: 4,
        usage: BufferUsage::Uniform,
        data: Some(vec![0u8; 16]),
    });
    assert!(result.is_err());
}

#[test]
fn test_buffer_update_bounds_checked() {
    let device = create_device();
    let buffer = device
        .create_buffer(BufferDesc {
            size: 16,
            usage: BufferUsage::Uniform,
            data: None,
        })
        .unwrap();
    assert!(buffer.update(0, &[0u8; 16]).is_ok());
    assert!(buffer.update(8, &[0u8; 16]).is_err());
}

#[test]
fn test_create_shader_program_records_label() {
    let device = create_device();
    device
        .create_shader_program(ShaderProgramDesc::vertex_fragment(
            "relight",
            "shaders/a.vert",
            "shaders/b.frag",
        ))
        .unwrap();
    assert_eq!(
        device.created_programs.lock().unwrap().as_slice(),
        &["relight".to_string()]
    );
}

// ============================================================================
// Shader program recording
// ============================================================================

#[test]
fn test_program_records_uniforms() {
    let program = MockShaderProgram::new("test".to_string());
    program.set_uniform("gamma", 2.2f32.into()).unwrap();
    assert_eq!(program.uniform("gamma"), Some(UniformValue::Float(2.2)));
    assert_eq!(program.uniform("missing"), None);
}

#[test]
fn test_program_records_texture_bindings() {
    let device = create_device();
    let texture = device
        .create_texture(TextureDesc::sampled_2d(4, 4, TextureFormat::R8_UNORM))
        .unwrap();
    let program = MockShaderProgram::new("test".to_string());

    program.set_texture("diffuseMap", Some(&texture)).unwrap();
    assert!(program.texture_bound("diffuseMap"));

    program.set_texture("diffuseMap", None).unwrap();
    assert!(!program.texture_bound("diffuseMap"));
}

// ============================================================================
// Framebuffer behavior
// ============================================================================

#[test]
fn test_clear_and_read_back() {
    let device = create_device();
    let framebuffer = device
        .create_framebuffer(FramebufferDesc::color_depth(2, 2, TextureFormat::RGBA32_FLOAT))
        .unwrap();

    framebuffer.clear_color(0, [-1.0, -1.0, -1.0, -1.0]).unwrap();
    let pixels = framebuffer.read_color_f32(0).unwrap();
    assert_eq!(pixels.len(), 2 * 2 * 4);
    assert!(pixels.iter().all(|v| *v == -1.0));
}

#[test]
fn test_depth_layer_attachment_validated() {
    let device = create_device();
    let framebuffer = device
        .create_framebuffer(FramebufferDesc::depth_only(16, 16))
        .unwrap();

    let depth_array = device
        .create_texture(TextureDesc {
            width: 16,
            height: 16,
            format: TextureFormat::D32_FLOAT,
            usage: TextureUsage::DepthStencil,
            array_layers: 2,
            mip_levels: 1,
            linear_filtering: false,
            data: None,
        })
        .unwrap();

    assert!(framebuffer.set_depth_attachment_layer(&depth_array, 1).is_ok());
    assert!(framebuffer.set_depth_attachment_layer(&depth_array, 2).is_err());

    let sampled = device
        .create_texture(TextureDesc::sampled_2d(16, 16, TextureFormat::R8_UNORM))
        .unwrap();
    assert!(framebuffer.set_depth_attachment_layer(&sampled, 0).is_err());
}

#[test]
fn test_clear_color_out_of_range_attachment() {
    let device = create_device();
    let framebuffer = device
        .create_framebuffer(FramebufferDesc::depth_only(4, 4))
        .unwrap();
    assert!(framebuffer.clear_color(0, [0.0; 4]).is_err());
}

// ============================================================================
// Command log
// ============================================================================

#[test]
fn test_draw_calls_are_logged() {
    let device = create_device();
    let program = device
        .create_shader_program(ShaderProgramDesc::vertex_fragment(
            "p",
            "a.vert",
            "b.frag",
        ))
        .unwrap();
    let drawable = device.create_drawable(&program).unwrap();

    drawable
        .draw(PrimitiveTopology::TriangleList, device.default_framebuffer().as_ref())
        .unwrap();

    let commands = device.commands();
    assert!(commands.iter().any(|c| c.starts_with("draw TriangleList")));
}

// ============================================================================
// Shader stage flags
// ============================================================================

#[test]
fn test_shader_stage_flags_from_stages() {
    use crate::graphics_device::ShaderStageFlags;
    let flags = ShaderStageFlags::from_stages(&[ShaderStage::Vertex, ShaderStage::Fragment]);
    assert!(flags.contains(ShaderStageFlags::VERTEX));
    assert!(flags.contains(ShaderStageFlags::FRAGMENT));

    let vertex_only = ShaderStageFlags::from_stages(&[ShaderStage::Vertex]);
    assert!(!vertex_only.contains(ShaderStageFlags::FRAGMENT));
}
