//! Geometry upload: one vertex buffer per attribute stream, one index
//! buffer per draw mode.

use std::collections::HashMap;

use asset::GeometryData;
use corelib::DrawMode;
use wgpu::{
    Buffer, BufferUsages, Device, IndexFormat, PrimitiveTopology, RenderPass, VertexBufferLayout,
    VertexStepMode, util::DeviceExt,
};

use crate::{RenderError, RenderResult};

pub const VERTEX_POSITION: &str = "vertexPosition";
pub const VERTEX_NORMAL: &str = "vertexNormal";

pub const INDEX_FORMAT: IndexFormat = IndexFormat::Uint32;

/// Position stream: `@location(0) vec3<f32>`.
pub const POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Normal stream: `@location(1) vec3<f32>`.
pub const NORMAL_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![1 => Float32x3],
};

#[inline]
pub fn topology(mode: DrawMode) -> PrimitiveTopology {
    match mode {
        DrawMode::Triangles => PrimitiveTopology::TriangleList,
        DrawMode::Lines => PrimitiveTopology::LineList,
    }
}

/// Named float stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexStream<'a> {
    pub name: &'static str,
    pub data: &'a [f32],
}

/// Borrowed view of what gets uploaded for a [`GeometryData`].
#[derive(Clone, Debug)]
pub struct GeometryUpload<'a> {
    streams: Vec<VertexStream<'a>>,
    triangles: &'a [u32],
    lines: &'a [u32],
}

impl<'a> GeometryUpload<'a> {
    pub fn from_data(data: &'a GeometryData) -> Self {
        let mut streams = vec![VertexStream {
            name: VERTEX_POSITION,
            data: &data.vertex_positions,
        }];
        if let Some(normals) = data.vertex_normals.as_deref() {
            streams.push(VertexStream {
                name: VERTEX_NORMAL,
                data: normals,
            });
        }
        Self {
            streams,
            triangles: &data.index_triangles,
            lines: &data.index_lines,
        }
    }

    #[inline]
    pub fn streams(&self) -> &[VertexStream<'a>] {
        &self.streams
    }

    #[inline]
    pub fn index_data(&self, mode: DrawMode) -> &'a [u32] {
        match mode {
            DrawMode::Triangles => self.triangles,
            DrawMode::Lines => self.lines,
        }
    }

    /// Index count for `mode`, checked against the `u32` draw range.
    pub fn index_count(&self, mode: DrawMode) -> RenderResult<u32> {
        element_count(mode_label(mode), self.index_data(mode).len())
    }

    /// Vertex buffer layouts in slot order.
    pub fn layouts(&self) -> Vec<VertexBufferLayout<'static>> {
        self.streams
            .iter()
            .map(|s| match s.name {
                VERTEX_NORMAL => NORMAL_LAYOUT,
                _ => POSITION_LAYOUT,
            })
            .collect()
    }
}

fn mode_label(mode: DrawMode) -> &'static str {
    match mode {
        DrawMode::Triangles => "IB triangles",
        DrawMode::Lines => "IB lines",
    }
}

fn element_count(label: &str, len: usize) -> RenderResult<u32> {
    u32::try_from(len).map_err(|_| RenderError::BufferTooLarge {
        label: label.to_owned(),
        len,
    })
}

/// GPU buffer plus its element count (floats for vertex streams, indices
/// for index buffers).
#[derive(Debug)]
pub struct GpuBuffer {
    pub buffer: Buffer,
    pub len: u32,
}

/// Uploaded mesh.
#[derive(Debug)]
pub struct GpuGeometry {
    /// Stream names in slot order.
    slots: Vec<&'static str>,
    vertex_buffers: HashMap<&'static str, GpuBuffer>,
    index_lines: GpuBuffer,
    index_triangles: GpuBuffer,
}

impl GpuGeometry {
    pub fn new(device: &Device, label: &str, data: &GeometryData) -> RenderResult<Self> {
        let upload = GeometryUpload::from_data(data);

        let mut slots = Vec::with_capacity(upload.streams().len());
        let mut vertex_buffers = HashMap::new();
        for stream in upload.streams() {
            let len = element_count(stream.name, stream.data.len())?;
            let buffer = create_buffer(
                device,
                &format!("{label} {}", stream.name),
                bytemuck::cast_slice(stream.data),
                BufferUsages::VERTEX,
            );
            slots.push(stream.name);
            vertex_buffers.insert(stream.name, GpuBuffer { buffer, len });
        }

        let index_buffer = |mode: DrawMode| -> RenderResult<GpuBuffer> {
            let len = upload.index_count(mode)?;
            Ok(GpuBuffer {
                buffer: create_buffer(
                    device,
                    &format!("{label} {}", mode_label(mode)),
                    bytemuck::cast_slice(upload.index_data(mode)),
                    BufferUsages::INDEX,
                ),
                len,
            })
        };
        let index_triangles = index_buffer(DrawMode::Triangles)?;
        let index_lines = index_buffer(DrawMode::Lines)?;

        log::debug!(
            "Uploaded geometry '{}': {} vertices, {} triangle indices, {} line indices",
            label,
            data.vertex_count(),
            index_triangles.len,
            index_lines.len
        );

        Ok(Self {
            slots,
            vertex_buffers,
            index_lines,
            index_triangles,
        })
    }

    pub fn vertex_buffer(&self, name: &str) -> Option<&GpuBuffer> {
        self.vertex_buffers.get(name)
    }

    #[inline]
    pub fn index_buffer(&self, mode: DrawMode) -> &GpuBuffer {
        match mode {
            DrawMode::Triangles => &self.index_triangles,
            DrawMode::Lines => &self.index_lines,
        }
    }

    #[inline]
    pub fn index_count(&self, mode: DrawMode) -> u32 {
        self.index_buffer(mode).len
    }

    /// Bind streams and indices, then issue one indexed draw.
    pub fn record(&self, rpass: &mut RenderPass<'_>, mode: DrawMode) {
        for (slot, name) in self.slots.iter().enumerate() {
            if let Some(vb) = self.vertex_buffers.get(name) {
                rpass.set_vertex_buffer(slot as u32, vb.buffer.slice(..));
            }
        }
        let ib = self.index_buffer(mode);
        rpass.set_index_buffer(ib.buffer.slice(..), INDEX_FORMAT);
        rpass.draw_indexed(0..ib.len, 0, 0..1);
    }
}

fn create_buffer(device: &Device, label: &str, contents: &[u8], usage: BufferUsages) -> Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(normals: bool) -> GeometryData {
        GeometryData::new(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals.then(|| vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
            vec![0, 1, 2],
            vec![0, 1, 1, 2, 2, 0],
        )
    }

    #[test]
    fn normals_stream_only_when_present() {
        let without = triangle(false);
        let upload = GeometryUpload::from_data(&without);
        let names: Vec<_> = upload.streams().iter().map(|s| s.name).collect();
        assert_eq!(names, vec![VERTEX_POSITION]);

        let with = triangle(true);
        let upload = GeometryUpload::from_data(&with);
        let names: Vec<_> = upload.streams().iter().map(|s| s.name).collect();
        assert_eq!(names, vec![VERTEX_POSITION, VERTEX_NORMAL]);
        assert_eq!(upload.layouts()[1].attributes[0].shader_location, 1);
    }

    #[test]
    fn index_data_follows_draw_mode() {
        let data = triangle(false);
        let upload = GeometryUpload::from_data(&data);
        assert_eq!(upload.index_data(DrawMode::Triangles), &[0, 1, 2]);
        assert_eq!(upload.index_data(DrawMode::Lines), &[0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn draw_mode_topology() {
        assert_eq!(topology(DrawMode::Triangles), PrimitiveTopology::TriangleList);
        assert_eq!(topology(DrawMode::Lines), PrimitiveTopology::LineList);
    }

    #[test]
    fn upload_index_counts() {
        let data = triangle(true);
        let upload = GeometryUpload::from_data(&data);
        assert_eq!(upload.index_count(DrawMode::Triangles).expect("count"), 3);
        assert_eq!(upload.index_count(DrawMode::Lines).expect("count"), 6);
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let err = element_count("IB lines", u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, RenderError::BufferTooLarge { ref label, .. } if label == "IB lines"));
    }

    fn noop_device() -> (Device, wgpu::Queue) {
        Device::noop(&wgpu::DeviceDescriptor::default())
    }

    #[test]
    fn gpu_geometry_without_normals() {
        let (device, _queue) = noop_device();
        let gpu = GpuGeometry::new(&device, "tri", &triangle(false)).expect("upload");

        let positions = gpu.vertex_buffer(VERTEX_POSITION).expect("position stream");
        assert_eq!(positions.len, 9);
        assert_eq!(positions.buffer.size(), 36);
        assert!(positions.buffer.usage().contains(BufferUsages::VERTEX));
        assert!(gpu.vertex_buffer(VERTEX_NORMAL).is_none());

        assert_eq!(gpu.index_count(DrawMode::Triangles), 3);
        assert_eq!(gpu.index_count(DrawMode::Lines), 6);
        assert!(gpu.index_buffer(DrawMode::Lines).buffer.usage().contains(BufferUsages::INDEX));
    }

    #[test]
    fn gpu_geometry_with_normals() {
        let (device, _queue) = noop_device();
        let gpu = GpuGeometry::new(&device, "lit tri", &triangle(true)).expect("upload");
        assert_eq!(gpu.vertex_buffer(VERTEX_POSITION).map(|b| b.len), Some(9));
        assert_eq!(gpu.vertex_buffer(VERTEX_NORMAL).map(|b| b.len), Some(9));
        assert_eq!(gpu.index_buffer(DrawMode::Triangles).buffer.size(), 12);
    }

    #[test]
    fn position_layout_stride() {
        assert_eq!(POSITION_LAYOUT.array_stride, 12);
        assert_eq!(POSITION_LAYOUT.attributes[0].shader_location, 0);
    }
}
