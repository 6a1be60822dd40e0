/// ShaderProgram trait - named uniform and texture-slot assignment
///
/// The engine binds everything by name: uniforms, texture slots, and
/// uniform-block bindings all use the names declared in the shader source.
/// The backend resolves names to locations and silently ignores names the
/// linked program optimized away (a uniform that is not consumed by the
/// current shader variant is not an error).

use crate::error::Result;
use crate::graphics_device::{Buffer, Texture};
use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use std::path::PathBuf;
use std::sync::Arc;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

bitflags! {
    /// Shader stage visibility flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x01;
        const FRAGMENT = 0x02;
    }
}

impl ShaderStageFlags {
    /// Create from a slice of ShaderStage
    pub fn from_stages(stages: &[ShaderStage]) -> Self {
        let mut flags = ShaderStageFlags::empty();
        for stage in stages {
            flags |= match stage {
                ShaderStage::Vertex => ShaderStageFlags::VERTEX,
                ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
            };
        }
        flags
    }
}

/// One shader stage of a program, identified by its source path.
///
/// The backend owns shader source lookup and compilation; the engine only
/// names which shaders make up a program.
#[derive(Debug, Clone)]
pub struct ShaderStageDesc {
    /// Stage this source feeds
    pub stage: ShaderStage,
    /// Backend-resolved path to the shader source
    pub source_path: PathBuf,
}

/// Descriptor for creating a shader program
#[derive(Debug, Clone)]
pub struct ShaderProgramDesc {
    /// Debug label
    pub label: String,
    /// Stages making up the program (vertex + fragment)
    pub stages: Vec<ShaderStageDesc>,
}

impl ShaderProgramDesc {
    /// Descriptor for a vertex + fragment program
    pub fn vertex_fragment(
        label: impl Into<String>,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            stages: vec![
                ShaderStageDesc {
                    stage: ShaderStage::Vertex,
                    source_path: vertex_path.into(),
                },
                ShaderStageDesc {
                    stage: ShaderStage::Fragment,
                    source_path: fragment_path.into(),
                },
            ],
        }
    }
}

/// A uniform value assignable by name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Bool(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<u32> for UniformValue {
    fn from(value: u32) -> Self {
        UniformValue::UInt(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

/// Shader program trait
///
/// Implemented by backend-specific program types.
/// The program is automatically destroyed when dropped.
pub trait ShaderProgram: Send + Sync {
    /// Assign a uniform by name
    ///
    /// Names the program does not consume are silently ignored.
    fn set_uniform(&self, name: &str, value: UniformValue) -> Result<()>;

    /// Assign a texture slot by name; `None` unbinds the slot
    fn set_texture(&self, name: &str, texture: Option<&Arc<dyn Texture>>) -> Result<()>;

    /// Assign a uniform block by name
    fn set_uniform_buffer(&self, name: &str, buffer: &Arc<dyn Buffer>) -> Result<()>;
}
