use glam::{vec3, Vec3};

pub trait Vec3Ext
where
    Self: Sized,
{
    /// Returns luminance of this color-vector.
    fn luma(self) -> f32;

    /// Returns this vector normalized together with its original length;
    /// zero-length vectors yield `(Vec3::ZERO, 0.0)`.
    fn normalize_and_length(self) -> (Self, f32);
}

impl Vec3Ext for Vec3 {
    fn luma(self) -> f32 {
        self.dot(vec3(0.2126, 0.7152, 0.0722))
    }

    fn normalize_and_length(self) -> (Self, f32) {
        let length = self.length();

        if length > 0.0 {
            (self / length, length)
        } else {
            (Vec3::ZERO, 0.0)
        }
    }
}
