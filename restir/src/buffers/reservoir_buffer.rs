use crate::gpu::DiReservoir;

/// Flat, per-pixel buffer of reservoirs, indexed by `x + y * width`.
#[derive(Debug)]
pub struct ReservoirBuffer {
    label: String,
    data: Vec<DiReservoir>,
}

impl ReservoirBuffer {
    pub fn new(label: impl ToString, len: usize) -> Self {
        Self {
            label: label.to_string(),
            data: vec![DiReservoir::default(); len],
        }
    }

    pub fn as_slice(&self) -> &[DiReservoir] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [DiReservoir] {
        &mut self.data
    }

    /// Returns the buffer's raw representation, as it would be uploaded to a
    /// GPU.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Copies reservoirs from `src`, skipping pixels marked as inactive.
    pub fn copy_from(&mut self, src: &[DiReservoir], active: Option<&[bool]>) {
        assert_eq!(
            self.data.len(),
            src.len(),
            "cannot copy into `{}`: expected {} reservoirs, got {}",
            self.label,
            self.data.len(),
            src.len(),
        );

        match active {
            Some(active) => {
                for ((dst, src), active) in
                    self.data.iter_mut().zip(src).zip(active)
                {
                    if *active {
                        *dst = *src;
                    }
                }
            }

            None => {
                self.data.copy_from_slice(src);
            }
        }
    }
}
