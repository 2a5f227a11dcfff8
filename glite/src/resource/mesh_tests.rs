//! Unit tests for mesh.rs

use std::sync::{Arc, Mutex};

use crate::buffer::{VertexAttribute, VertexAttributes, VertexDataType};
use crate::device::mock_gl_device::{mock_context, MockGlDevice};
use crate::device::{gl, GlesVersion};
use crate::error::Error;
use crate::managed::Managed;
use crate::resource::{Mesh, ProgramState, ShaderProgram};

const VERTEX: &str = "
attribute vec4 a_position;
attribute vec4 a_color;
uniform mat4 u_projTrans;
void main() { gl_Position = u_projTrans * a_position; }
";

const FRAGMENT: &str = "
precision mediump float;
void main() { gl_FragColor = vec4(1.0); }
";

/// position (3 floats) + packed color (1 float slot) = 16 byte stride
fn layout() -> VertexAttributes {
    VertexAttributes::new(vec![VertexAttribute::position(), VertexAttribute::color_packed()]).unwrap()
}

fn quad_vertices() -> Vec<f32> {
    (0..16).map(|value| value as f32).collect()
}

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

fn quad_mesh(data_type: VertexDataType, version: GlesVersion) -> (Mesh, Arc<Mutex<MockGlDevice>>) {
    let (ctx, mock) = mock_context(version);
    let mut mesh = Mesh::with_type(&ctx, data_type, true, 4, 6, layout()).unwrap();
    mesh.set_vertices(&quad_vertices()).unwrap();
    mesh.set_indices(&QUAD_INDICES).unwrap();
    (mesh, mock)
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_new_picks_strategy_from_version() {
    let (ctx3, _mock3) = mock_context(GlesVersion::Gles3);
    let mesh = Mesh::new(&ctx3, true, 4, 6, layout()).unwrap();
    assert_eq!(mesh.vertex_data_type(), VertexDataType::VertexBufferObjectWithVao);

    let (ctx2, _mock2) = mock_context(GlesVersion::Gles2);
    let mesh = Mesh::new(&ctx2, true, 4, 6, layout()).unwrap();
    assert_eq!(mesh.vertex_data_type(), VertexDataType::VertexBufferObject);
}

#[test]
fn test_new_reuploads_whole_index_buffer() {
    let (ctx, mock) = mock_context(GlesVersion::Gles3);
    let mut mesh = Mesh::new(&ctx, false, 4, 6, layout()).unwrap();
    mesh.set_vertices(&quad_vertices()).unwrap();
    mesh.set_indices(&QUAD_INDICES).unwrap();
    mesh.render_all(None, gl::TRIANGLES).unwrap();

    mesh.update_indices(0, &[3, 2, 1]).unwrap();
    mock.lock().unwrap().clear_calls();
    mesh.render_all(None, gl::TRIANGLES).unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.call_count("buffer_sub_data"), 0);
    assert_eq!(mock.call_count("buffer_data"), 1);
}

#[test]
fn test_vao_strategy_rejected_on_gles2() {
    let (ctx, _mock) = mock_context(GlesVersion::Gles2);
    let result = Mesh::with_type(&ctx, VertexDataType::VertexBufferObjectWithVao, true, 4, 6, layout());
    assert!(matches!(result, Err(Error::InvalidState(_))));
}

#[test]
fn test_accessors() {
    let (mesh, _mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    assert_eq!(mesh.num_vertices(), 4);
    assert_eq!(mesh.num_max_vertices(), 4);
    assert_eq!(mesh.num_indices(), 6);
    assert_eq!(mesh.num_max_indices(), 6);
    assert_eq!(mesh.vertex_size(), 16);
    assert_eq!(mesh.vertex_attribute("a_color").map(|color| color.offset), Some(12));
    assert!(mesh.vertex_attribute("a_normal").is_none());
    assert!(mesh.auto_bind());
}

// ============================================================================
// BOUNDED ACCESSORS
// ============================================================================

#[test]
fn test_read_back_matches_written_data_for_every_strategy() {
    for (data_type, version) in [
        (VertexDataType::VertexArray, GlesVersion::Gles2),
        (VertexDataType::VertexBufferObject, GlesVersion::Gles2),
        (VertexDataType::VertexBufferObjectSubData, GlesVersion::Gles2),
        (VertexDataType::VertexBufferObjectWithVao, GlesVersion::Gles3),
    ] {
        let (mesh, _mock) = quad_mesh(data_type, version);

        let mut vertices = [0.0; 16];
        assert_eq!(mesh.get_vertices(&mut vertices).unwrap(), 16);
        assert_eq!(vertices.as_slice(), quad_vertices().as_slice());

        let mut indices = [0u16; 6];
        assert_eq!(mesh.get_indices(&mut indices).unwrap(), 6);
        assert_eq!(indices, QUAD_INDICES);
    }
}

#[test]
fn test_update_touches_only_its_range() {
    let (mut mesh, _mock) = quad_mesh(VertexDataType::VertexBufferObjectSubData, GlesVersion::Gles2);

    mesh.update_vertices(4, &[-1.0, -2.0]).unwrap();

    let mut vertices = [0.0; 16];
    mesh.get_vertices(&mut vertices).unwrap();
    let mut expected = quad_vertices();
    expected[4] = -1.0;
    expected[5] = -2.0;
    assert_eq!(vertices.as_slice(), expected.as_slice());
}

#[test]
fn test_get_vertices_clamps_unspecified_count_to_destination() {
    let (mesh, _mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    let mut dest = [0.0; 5];
    assert_eq!(mesh.get_vertices_from(10, &mut dest).unwrap(), 5);
    assert_eq!(dest, [10.0, 11.0, 12.0, 13.0, 14.0]);
}

#[test]
fn test_get_vertices_range_with_destination_offset() {
    let (mesh, _mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    let mut dest = [0.0; 4];
    assert_eq!(mesh.get_vertices_range(1, Some(2), &mut dest, 2).unwrap(), 2);
    assert_eq!(dest, [0.0, 0.0, 1.0, 2.0]);
}

#[test]
fn test_get_vertices_explicit_count_out_of_range_fails() {
    let (mesh, _mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    let mut dest = [0.0; 32];
    assert!(matches!(
        mesh.get_vertices_range(10, Some(8), &mut dest, 0),
        Err(Error::OutOfRange(_))
    ));
    assert!(matches!(
        mesh.get_vertices_range(0, Some(8), &mut dest, 30),
        Err(Error::OutOfRange(_))
    ));
    assert!(matches!(mesh.get_vertices_from(17, &mut dest), Err(Error::OutOfRange(_))));
}

#[test]
fn test_get_vertices_resolving_to_nothing_fails() {
    let (mesh, _mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);
    let mut dest = [0.0; 16];

    assert!(matches!(mesh.get_vertices_range(0, Some(0), &mut dest, 0), Err(Error::OutOfRange(_))));
    assert!(matches!(mesh.get_vertices_from(16, &mut dest), Err(Error::OutOfRange(_))));
    assert!(matches!(mesh.get_vertices_range(0, None, &mut dest, 16), Err(Error::OutOfRange(_))));

    let (ctx, _mock) = mock_context(GlesVersion::Gles2);
    let empty = Mesh::new(&ctx, true, 4, 6, layout()).unwrap();
    assert!(matches!(empty.get_vertices(&mut dest), Err(Error::OutOfRange(_))));
    assert_eq!(dest, [0.0; 16]);
}

#[test]
fn test_get_indices_requires_room_for_remaining_indices() {
    let (mesh, _mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    let mut small = [0u16; 4];
    assert!(matches!(mesh.get_indices(&mut small), Err(Error::OutOfRange(_))));

    assert_eq!(mesh.get_indices_from(2, &mut small).unwrap(), 4);
    assert_eq!(small, [2, 2, 3, 0]);
}

// ============================================================================
// RENDER
// ============================================================================

#[test]
fn test_zero_count_draws_nothing() {
    let (mut mesh, mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    mesh.render(None, gl::TRIANGLES, 0, 0, true).unwrap();

    assert!(mock.lock().unwrap().draws.is_empty());
    assert_eq!(mock.lock().unwrap().call_count("bind_buffer"), 0);
}

#[test]
fn test_index_range_past_capacity_is_rejected() {
    let (mut mesh, mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    let result = mesh.render(None, gl::TRIANGLES, 3, 4, true);

    assert!(matches!(result, Err(Error::OutOfRange(_))));
    assert!(mock.lock().unwrap().draws.is_empty());
    assert_eq!(mock.lock().unwrap().call_count("bind_buffer"), 0);
}

#[test]
fn test_indexed_render_uses_byte_offset() {
    let (mut mesh, mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);

    mesh.render(None, gl::TRIANGLES, 3, 3, true).unwrap();

    let draws = mock.lock().unwrap().draws.clone();
    assert_eq!(draws.len(), 1);
    assert!(draws[0].indexed);
    assert_eq!(draws[0].count, 3);
    assert_eq!(draws[0].first, 6);
}

#[test]
fn test_non_indexed_render_draws_vertex_range() {
    let (ctx, mock) = mock_context(GlesVersion::Gles2);
    let mut mesh = Mesh::with_type(&ctx, VertexDataType::VertexBufferObject, true, 4, 0, layout()).unwrap();
    mesh.set_vertices(&quad_vertices()).unwrap();

    mesh.render(None, gl::TRIANGLE_FAN, 1, 3, true).unwrap();

    let draws = mock.lock().unwrap().draws.clone();
    assert_eq!(draws.len(), 1);
    assert!(!draws[0].indexed);
    assert_eq!((draws[0].mode, draws[0].first, draws[0].count), (gl::TRIANGLE_FAN, 1, 3));
}

#[test]
fn test_client_array_render_passes_index_memory() {
    let (mut mesh, mock) = quad_mesh(VertexDataType::VertexArray, GlesVersion::Gles2);

    mesh.render(None, gl::TRIANGLES, 3, 3, true).unwrap();

    let draws = mock.lock().unwrap().draws.clone();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].client_indices, bytemuck::cast_slice::<u16, u8>(&QUAD_INDICES[3..]).to_vec());
    assert_eq!(mock.lock().unwrap().call_count("draw_elements_client"), 1);
}

#[test]
fn test_client_array_range_limited_to_defined_indices() {
    let (ctx, _mock) = mock_context(GlesVersion::Gles2);
    let mut mesh = Mesh::with_type(&ctx, VertexDataType::VertexArray, true, 4, 12, layout()).unwrap();
    mesh.set_vertices(&quad_vertices()).unwrap();
    mesh.set_indices(&QUAD_INDICES).unwrap();

    assert!(matches!(mesh.render(None, gl::TRIANGLES, 0, 9, true), Err(Error::OutOfRange(_))));
}

#[test]
fn test_render_with_shader_binds_and_unbinds() {
    let (ctx, mock) = mock_context(GlesVersion::Gles2);
    let mut shader = ShaderProgram::new(&ctx, VERTEX, FRAGMENT);
    let mut mesh = Mesh::with_type(&ctx, VertexDataType::VertexBufferObject, true, 4, 6, layout()).unwrap();
    mesh.set_vertices(&quad_vertices()).unwrap();
    mesh.set_indices(&QUAD_INDICES).unwrap();

    mesh.render_all(Some(&mut shader), gl::TRIANGLES).unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.draws.len(), 1);
    assert_eq!(mock.draws[0].count, 6);
    assert_eq!(mock.call_count("enable_vertex_attrib_array"), 2);
    assert!(mock.enabled_attributes.is_empty());
    assert_eq!(mock.bound_buffers[&gl::ARRAY_BUFFER], 0);
    assert_eq!(mock.bound_buffers[&gl::ELEMENT_ARRAY_BUFFER], 0);
}

#[test]
fn test_render_without_auto_bind_leaves_binding_to_caller() {
    let (mut mesh, mock) = quad_mesh(VertexDataType::VertexBufferObject, GlesVersion::Gles2);
    mesh.set_auto_bind(false);

    mesh.bind(None, None).unwrap();
    mesh.render_range(None, gl::TRIANGLES, 0, 6).unwrap();
    mesh.render_range(None, gl::TRIANGLES, 0, 3).unwrap();
    mesh.unbind(None, None);

    let mock = mock.lock().unwrap();
    assert_eq!(mock.draws.len(), 2);
    assert_eq!(mock.call_count("buffer_data"), 2);
}

// ============================================================================
// CONTEXT LOSS AND DISPOSAL
// ============================================================================

#[test]
fn test_invalidate_reuploads_both_backends() {
    let (mut mesh, mock) = quad_mesh(VertexDataType::VertexBufferObjectWithVao, GlesVersion::Gles3);
    mesh.render_all(None, gl::TRIANGLES).unwrap();

    mock.lock().unwrap().lose_context();
    mesh.invalidate().unwrap();
    mock.lock().unwrap().clear_calls();
    mesh.render_all(None, gl::TRIANGLES).unwrap();

    let mock = mock.lock().unwrap();
    assert_eq!(mock.call_count("buffer_data"), 1);
    assert_eq!(mock.call_count("buffer_sub_data"), 1);
    assert_eq!(mock.live_handles(), 3);
}

#[test]
fn test_invalidated_shader_relinks_before_locations_are_read() {
    let (ctx, mock) = mock_context(GlesVersion::Gles3);
    let mut shader = ShaderProgram::new(&ctx, VERTEX, FRAGMENT);
    let mut mesh = Mesh::with_type(&ctx, VertexDataType::VertexBufferObjectWithVao, true, 4, 6, layout()).unwrap();
    mesh.set_vertices(&quad_vertices()).unwrap();
    mesh.set_indices(&QUAD_INDICES).unwrap();
    mesh.render_all(Some(&mut shader), gl::TRIANGLES).unwrap();
    assert_eq!(shader.attribute_location("a_position"), 0);

    {
        let mut mock = mock.lock().unwrap();
        mock.lose_context();
        mock.attribute_location_base = 4;
    }
    shader.invalidate().unwrap();
    mesh.invalidate().unwrap();
    mesh.render_all(Some(&mut shader), gl::TRIANGLES).unwrap();

    assert_eq!(shader.state(), ProgramState::Linked);
    assert_eq!(shader.attribute_location("a_position"), 4);
    let mock = mock.lock().unwrap();
    let mut locations: Vec<u32> = mock.attrib_pointers.keys().copied().collect();
    locations.sort_unstable();
    assert_eq!(locations, vec![4, 5]);
}

#[test]
fn test_dispose_releases_every_handle() {
    let (mut mesh, mock) = quad_mesh(VertexDataType::VertexBufferObjectWithVao, GlesVersion::Gles3);
    assert_eq!(mock.lock().unwrap().live_handles(), 3);

    mesh.dispose();
    mesh.dispose();

    assert_eq!(mock.lock().unwrap().live_handles(), 0);
    assert!(matches!(mesh.bind(None, None), Err(Error::InvalidResource(_))));
}
