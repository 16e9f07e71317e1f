//! wgpu object construction for [`super::WgpuBackend`].

use crate::buffer::{BufferLayout, ShaderDataType};
use crate::context::MAX_TEXTURE_UNITS;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Group 0: the shader's uniform block.
pub fn create_uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("arcane_uniform_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Group 1: every texture unit as a binding array, plus the shared sampler.
pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("arcane_texture_units_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: std::num::NonZeroU32::new(MAX_TEXTURE_UNITS),
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Linear minification, nearest magnification, repeat on both axes.
pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("arcane_texture_sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

pub fn create_texture(
    device: &wgpu::Device,
    label: Option<&str>,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label,
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

pub fn write_texture(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, data: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// A 1x1 white texture filling texture units nothing is bound to.
pub fn create_fallback_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> (wgpu::Texture, wgpu::TextureView) {
    let (texture, view) = create_texture(device, Some("arcane_fallback_texture"), 1, 1);
    write_texture(queue, &texture, 1, 1, &[255, 255, 255, 255]);
    (texture, view)
}

pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("arcane_depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn vertex_format(data_type: ShaderDataType) -> wgpu::VertexFormat {
    match data_type {
        ShaderDataType::Float => wgpu::VertexFormat::Float32,
        ShaderDataType::Float2 => wgpu::VertexFormat::Float32x2,
        ShaderDataType::Float3 | ShaderDataType::Mat3 => wgpu::VertexFormat::Float32x3,
        ShaderDataType::Float4 | ShaderDataType::Mat4 => wgpu::VertexFormat::Float32x4,
        ShaderDataType::Int => wgpu::VertexFormat::Sint32,
        ShaderDataType::Int2 => wgpu::VertexFormat::Sint32x2,
        ShaderDataType::Int3 => wgpu::VertexFormat::Sint32x3,
        ShaderDataType::Int4 => wgpu::VertexFormat::Sint32x4,
        ShaderDataType::Bool => wgpu::VertexFormat::Uint8,
    }
}

/// Attributes for each attached vertex buffer. Locations run on across
/// buffers, and matrix elements take one location per column.
pub fn vertex_attributes(layouts: &[BufferLayout]) -> Vec<Vec<wgpu::VertexAttribute>> {
    let mut location = 0;
    layouts
        .iter()
        .map(|layout| {
            let mut attributes = Vec::new();
            for element in layout.iter() {
                let format = vertex_format(element.data_type);
                let columns = element.data_type.location_count();
                for column in 0..columns {
                    attributes.push(wgpu::VertexAttribute {
                        format,
                        offset: u64::from(element.offset) + u64::from(column) * format.size(),
                        shader_location: location,
                    });
                    location += 1;
                }
            }
            attributes
        })
        .collect()
}

pub struct PipelineDescriptor<'a> {
    pub label: &'a str,
    pub layout: &'a wgpu::PipelineLayout,
    pub vertex: &'a wgpu::ShaderModule,
    pub fragment: &'a wgpu::ShaderModule,
    pub buffers: &'a [BufferLayout],
    pub target_format: wgpu::TextureFormat,
    pub blending: bool,
    pub depth_test: bool,
}

pub fn create_render_pipeline(
    device: &wgpu::Device,
    desc: &PipelineDescriptor<'_>,
) -> wgpu::RenderPipeline {
    let attributes = vertex_attributes(desc.buffers);
    let buffers: Vec<wgpu::VertexBufferLayout<'_>> = desc
        .buffers
        .iter()
        .zip(&attributes)
        .map(|(layout, attributes)| wgpu::VertexBufferLayout {
            array_stride: u64::from(layout.stride()),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        })
        .collect();

    let blend = desc.blending.then_some(wgpu::BlendState::ALPHA_BLENDING);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.vertex,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.fragment,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.target_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_test,
            depth_compare: if desc.depth_test {
                wgpu::CompareFunction::LessEqual
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_continue_across_buffers() {
        let quad = BufferLayout::from_elements([
            (ShaderDataType::Float3, "a_Position"),
            (ShaderDataType::Float4, "a_Color"),
        ]);
        let instance = BufferLayout::from_elements([(ShaderDataType::Mat4, "a_Transform")]);

        let attributes = vertex_attributes(&[quad, instance]);
        assert_eq!(attributes[0].len(), 2);
        assert_eq!(attributes[1].len(), 4);
        assert_eq!(attributes[1][0].shader_location, 2);
        assert_eq!(attributes[1][3].shader_location, 5);
        assert_eq!(attributes[1][3].offset, 48);
    }

    #[test]
    fn test_mat3_columns() {
        let layout = BufferLayout::from_elements([(ShaderDataType::Mat3, "a_Normal")]);
        let attributes = vertex_attributes(&[layout]);
        let offsets: Vec<u64> = attributes[0].iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24]);
        assert!(attributes[0].iter().all(|a| a.format == wgpu::VertexFormat::Float32x3));
    }
}
