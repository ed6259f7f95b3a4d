use nalgebra::Vector3;
use rigkit_api_core::{coercion, Shape, ShapeId, Value};
use rigkit_solver_core::Transform;

/// A value flowing out of a node port together with its declared shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PortValue {
    pub value: Value,
    pub shape: Shape,
}

impl PortValue {
    /// Wrap `value` with the shape inferred from it.
    pub fn new(value: Value) -> Self {
        let shape = Shape::new(ShapeId::of(&value));
        Self { value, shape }
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn as_float(&self) -> f64 {
        coercion::to_float(&self.value)
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::from(coercion::to_vec3(&self.value))
    }

    pub fn as_transform(&self) -> Transform {
        Transform::from_column_slice(&coercion::to_matrix(&self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigkit_solver_core::math::position;

    #[test]
    fn matrix_values_keep_translation_column() {
        let port = PortValue::new(Value::translation(1.0, 2.0, 3.0));
        assert_eq!(port.shape.id, ShapeId::Matrix);
        assert_eq!(position(&port.as_transform()), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn vec3_coerces_to_translation() {
        let port = PortValue::new(Value::vec3(4.0, 5.0, 6.0));
        assert_eq!(position(&port.as_transform()), Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(port.as_vector(), Vector3::new(4.0, 5.0, 6.0));
    }
}
