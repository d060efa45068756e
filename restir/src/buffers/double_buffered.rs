/// Pair of buffers whose roles (current / past) flip every frame.
#[derive(Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl<T> DoubleBuffered<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, alternate: bool) -> &T {
        if alternate {
            &self.b
        } else {
            &self.a
        }
    }

    pub fn get_mut(&mut self, alternate: bool) -> &mut T {
        if alternate {
            &mut self.b
        } else {
            &mut self.a
        }
    }

    /// Returns the buffer selected by `alternate` for writing, together with
    /// the other one for reading.
    pub fn split_mut(&mut self, alternate: bool) -> (&mut T, &T) {
        if alternate {
            (&mut self.b, &self.a)
        } else {
            (&mut self.a, &self.b)
        }
    }
}
