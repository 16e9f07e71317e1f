//! End-to-end rendering on a real adapter.
//!
//! These need a GPU with texture binding arrays. Run with
//! `cargo test -p arcane-render -- --ignored`.

use std::sync::Arc;

use arcane_core::geometry::PhysicalSize;
use arcane_render::{
    Color, GraphicsContext, GraphicsContextDescriptor, OrthographicCamera, RenderBackend,
    Renderer, Renderer2D, Texture2D, WgpuBackend,
};
use glam::{Vec2, Vec3};

const SIZE: u32 = 64;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn setup() -> (Arc<GraphicsContext>, Arc<WgpuBackend>) {
    let context = GraphicsContext::new_sync(GraphicsContextDescriptor::default())
        .expect("GPU context");
    let backend = Arc::new(WgpuBackend::new(context.clone()));
    (context, backend)
}

fn offscreen_target(context: &GraphicsContext) -> wgpu::Texture {
    context.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen_target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

/// Copy the target back to the CPU as tightly packed RGBA8 rows, top row first.
fn read_back(context: &GraphicsContext, texture: &wgpu::Texture) -> Vec<u8> {
    let bytes_per_row = (SIZE * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    let buffer = context.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: (bytes_per_row * SIZE) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = context
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    context.queue().submit(Some(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = context.device().poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: None,
    });
    rx.recv().unwrap().unwrap();

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for row in data.chunks(bytes_per_row as usize) {
        pixels.extend_from_slice(&row[..(SIZE * 4) as usize]);
    }
    pixels
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[test]
#[ignore = "requires a GPU"]
fn test_context_has_binding_arrays() {
    let (context, _) = setup();
    let features = context.device().features();
    assert!(features.contains(GraphicsContext::required_features()));
    assert!(context.max_texture_dimension_2d() >= SIZE);
}

#[test]
#[ignore = "requires a GPU"]
fn test_draws_solid_and_textured_quads() {
    let (context, backend) = setup();
    let target = offscreen_target(&context);
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let renderer = Renderer::new(backend.clone());
    let mut renderer2d = Renderer2D::new(backend.clone()).unwrap();
    let green = Arc::new(
        Texture2D::from_rgba8(backend.clone(), 1, 1, &[0, 255, 0, 255]).unwrap(),
    );
    let camera = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);

    backend.begin_frame(&view, FORMAT, PhysicalSize::new(SIZE, SIZE));
    renderer.on_window_resize(SIZE, SIZE);
    renderer.set_clear_color(Color::BLACK);
    renderer.clear();

    renderer2d.begin_scene(&camera);
    // Left half red, right half textured green.
    renderer2d.draw_quad(Vec2::new(-0.5, 0.0), Vec2::new(1.0, 2.0), Color::RED);
    renderer2d.draw_textured_quad(
        Vec3::new(0.5, 0.0, 0.0),
        Vec2::new(1.0, 2.0),
        &green,
        1.0,
        Color::WHITE,
    );
    renderer2d.end_scene();
    backend.end_frame();

    assert_eq!(renderer2d.stats().draw_calls, 1);

    let pixels = read_back(&context, &target);
    assert_eq!(pixel(&pixels, SIZE / 4, SIZE / 2), [255, 0, 0, 255]);
    assert_eq!(pixel(&pixels, SIZE * 3 / 4, SIZE / 2), [0, 255, 0, 255]);
}

#[test]
#[ignore = "requires a GPU"]
fn test_viewport_limits_drawing() {
    let (context, backend) = setup();
    let target = offscreen_target(&context);
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let renderer = Renderer::new(backend.clone());
    let mut renderer2d = Renderer2D::new(backend.clone()).unwrap();
    let camera = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);

    backend.begin_frame(&view, FORMAT, PhysicalSize::new(SIZE, SIZE));
    renderer.set_clear_color(Color::BLACK);
    renderer.clear();

    // Bottom half of the target only.
    backend.set_viewport(arcane_render::Viewport::new(0, 0, SIZE, SIZE / 2));
    renderer2d.begin_scene(&camera);
    renderer2d.draw_quad(Vec2::ZERO, Vec2::splat(2.0), Color::BLUE);
    renderer2d.end_scene();
    backend.end_frame();

    let pixels = read_back(&context, &target);
    assert_eq!(pixel(&pixels, SIZE / 2, SIZE / 4), [0, 0, 0, 255]);
    assert_eq!(pixel(&pixels, SIZE / 2, SIZE * 3 / 4), [0, 0, 255, 255]);
}
