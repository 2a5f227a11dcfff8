//! Camera: position, orientation and projection, with the derived matrices.
//!
//! Fields are public and may be changed freely; the matrices are only
//! recomputed by `update()`. The rotation methods do not re-orthogonalize
//! direction and up.

use glam::{Mat4, Quat, Vec3};

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection with a vertical field of view in degrees
    Perspective { field_of_view: f32 },
    /// Orthographic projection scaled by `zoom`
    Orthographic { zoom: f32 },
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Unit length view direction
    pub direction: Vec3,
    /// Unit length up vector
    pub up: Vec3,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub projection_kind: Projection,

    projection: Mat4,
    view: Mat4,
    combined: Mat4,
    inv_projection_view: Mat4,
}

impl Camera {
    /// Perspective camera at the origin looking down -Z
    pub fn perspective(field_of_view: f32, viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self::with_projection(
            Projection::Perspective { field_of_view },
            viewport_width,
            viewport_height,
        );
        camera.near = 1.0;
        camera.update();
        camera
    }

    /// Orthographic camera centered on the origin
    pub fn orthographic(viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self::with_projection(Projection::Orthographic { zoom: 1.0 }, viewport_width, viewport_height);
        camera.near = 0.0;
        camera.update();
        camera
    }

    fn with_projection(projection_kind: Projection, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            near: 1.0,
            far: 100.0,
            viewport_width,
            viewport_height,
            projection_kind,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            combined: Mat4::IDENTITY,
            inv_projection_view: Mat4::IDENTITY,
        }
    }

    // ===== MATRICES =====

    /// Recompute the projection, view and combined matrices
    pub fn update(&mut self) {
        let (near, far) = (self.near.abs(), self.far.abs());
        self.projection = match self.projection_kind {
            Projection::Perspective { field_of_view } => {
                let aspect = self.viewport_width / self.viewport_height;
                Mat4::perspective_rh_gl(field_of_view.to_radians(), aspect, near, far)
            }
            Projection::Orthographic { zoom } => {
                let half_width = zoom * self.viewport_width / 2.0;
                let half_height = zoom * self.viewport_height / 2.0;
                Mat4::orthographic_rh_gl(-half_width, half_width, -half_height, half_height, self.near, self.far)
            }
        };
        self.view = Mat4::look_at_rh(self.position, self.position + self.direction, self.up);
        self.combined = self.projection * self.view;
        self.inv_projection_view = self.combined.inverse();
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Projection * view, as of the last `update()`
    pub fn combined(&self) -> &Mat4 {
        &self.combined
    }

    /// Inverse of `combined()`
    pub fn inv_projection_view(&self) -> &Mat4 {
        &self.inv_projection_view
    }

    // ===== ORIENTATION =====

    /// Turn the camera towards `target`
    ///
    /// Assumes the up vector is normalized. A target at the camera position
    /// leaves the orientation unchanged.
    pub fn look_at(&mut self, target: Vec3) {
        let direction = (target - self.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }

        // up and direction must stay orthonormal
        let dot = direction.dot(self.up);
        if (dot - 1.0).abs() < 1e-6 {
            self.up = -self.direction;
        } else if (dot + 1.0).abs() < 1e-6 {
            self.up = self.direction;
        }
        self.direction = direction;
        self.normalize_up();
    }

    /// Re-orthogonalize up against direction
    pub fn normalize_up(&mut self) {
        let right = self.direction.cross(self.up).normalize_or_zero();
        self.up = right.cross(self.direction).normalize_or_zero();
    }

    /// Rotate direction and up by `angle` degrees around `axis`
    pub fn rotate(&mut self, axis: Vec3, angle: f32) {
        self.rotate_by(Quat::from_axis_angle(axis.normalize(), angle.to_radians()));
    }

    /// Rotate direction and up by a quaternion
    pub fn rotate_by(&mut self, rotation: Quat) {
        self.direction = rotation * self.direction;
        self.up = rotation * self.up;
    }

    /// Rotate direction and up by the rotation part of a matrix
    pub fn rotate_by_matrix(&mut self, transform: &Mat4) {
        self.direction = transform.transform_vector3(self.direction);
        self.up = transform.transform_vector3(self.up);
    }

    /// Rotate the camera by `angle` degrees around an axis through `point`
    pub fn rotate_around(&mut self, point: Vec3, axis: Vec3, angle: f32) {
        let offset = point - self.position;
        self.translate(offset);
        self.rotate(axis, angle);
        let rotated = Quat::from_axis_angle(axis.normalize(), angle.to_radians()) * offset;
        self.translate(-rotated);
    }

    // ===== POSITION =====

    /// Transform position, direction and up by a matrix
    pub fn transform(&mut self, transform: &Mat4) {
        self.position = transform.transform_point3(self.position);
        self.rotate_by_matrix(transform);
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
