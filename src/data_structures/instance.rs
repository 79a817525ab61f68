//! Per-node transformation data.
//!
//! Every attached scene node carries a local and a world [`Instance`]. The
//! renderer receives world transforms either as [`Instance`] values or packed
//! into [`InstanceRaw`] for direct upload into an instance buffer.

use std::ops::Mul;

use cgmath::{Euler, One, Rad, SquareMatrix};

/// Position, rotation (as quaternion) and non-uniform scale of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation: no move, no rotation, unit scale.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Builds a transform from XYZ Euler angles in radians.
    ///
    /// Props are oriented the way scene graphs of the tracking helper expect:
    /// the angles are applied in X, Y, Z order.
    pub fn from_euler(
        position: cgmath::Vector3<f32>,
        orientation: cgmath::Vector3<f32>,
        scale: f32,
    ) -> Self {
        let euler = Euler::new(Rad(orientation.x), Rad(orientation.y), Rad(orientation.z));
        Self {
            position,
            rotation: euler.into(),
            scale: cgmath::Vector3::new(scale, scale, scale),
        }
    }

    pub fn with_uniform_scale(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }

    pub fn with_position(mut self, position: cgmath::Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        let model = self.to_matrix();
        InstanceRaw {
            model: model.into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
            // mirrored agents end up with a negative determinant
            handedness: model.determinant().signum(),
        }
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    /// Composes a parent (`self`) with a child's local transform.
    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Instance {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: cgmath::Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The packed form of an [`Instance`] as the renderer stores it in its
 * instance buffers: a model matrix, the normal matrix and the handedness.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 3]; 3],
    pub handedness: f32,
}
