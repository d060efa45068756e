pub trait F32Ext
where
    Self: Sized,
{
    fn sqr(self) -> Self;

    /// Returns `self`, or zero if `self` is negative, NaN or infinite.
    fn or_zero(self) -> Self;
}

impl F32Ext for f32 {
    fn sqr(self) -> Self {
        self * self
    }

    fn or_zero(self) -> Self {
        if self.is_finite() && self > 0.0 {
            self
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_zero() {
        assert_eq!(1.5, 1.5f32.or_zero());
        assert_eq!(0.0, (-1.5f32).or_zero());
        assert_eq!(0.0, f32::NAN.or_zero());
        assert_eq!(0.0, f32::INFINITY.or_zero());
    }
}
