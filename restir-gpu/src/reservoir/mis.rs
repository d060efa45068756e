/// Helper for calculating the pairwise balance heuristic used when merging
/// two reservoirs.
///
/// Code assumes we'd like to merge two samples, where `lhs` is the canonical
/// one (living at the current pixel) and `rhs` is the neighbour (coming from
/// another pixel or frame, shifted onto the current pixel).
#[derive(Clone, Copy, Debug, Default)]
pub struct Mis {
    /// Confidence weight for the canonical sample
    pub lhs_m: f32,

    /// Confidence weight for the neighbour sample
    pub rhs_m: f32,

    /// Jacobian determinant of shifting the neighbour sample from rhs's pixel
    /// onto lhs's; 1.0 if not applicable
    pub rhs_jacobian: f32,

    /// `p_lhs(lhs)`, i.e. target function of lhs's sample on lhs's pixel
    pub lhs_lhs_pdf: f32,

    /// `p_rhs(lhs)`, i.e. target function of lhs's sample on rhs's pixel,
    /// already multiplied by the jacobian of shifting that sample from lhs's
    /// pixel onto rhs's
    pub lhs_rhs_pdf: f32,

    /// `p_lhs(rhs)`, i.e. target function of rhs's sample on lhs's pixel
    pub rhs_lhs_pdf: f32,

    /// `p_rhs(rhs)`, i.e. target function of rhs's sample on rhs's pixel
    pub rhs_rhs_pdf: f32,
}

impl Mis {
    pub fn eval(self) -> MisResult {
        fn mis(x: f32, y: f32) -> f32 {
            let sum = x + y;

            if sum <= 0.0 {
                0.0
            } else {
                x / sum
            }
        }

        let lhs_mis = mis(
            self.lhs_m * self.lhs_lhs_pdf,
            self.rhs_m * self.lhs_rhs_pdf,
        );

        let rhs_mis = mis(
            self.rhs_m * self.rhs_rhs_pdf * self.rhs_jacobian,
            self.lhs_m * self.rhs_lhs_pdf,
        );

        MisResult { lhs_mis, rhs_mis }
    }

    /// Returns weights proportional to the confidence of both reservoirs,
    /// ignoring their target functions.
    pub fn eval_confidence(self) -> MisResult {
        let sum = self.lhs_m + self.rhs_m;

        if sum <= 0.0 {
            return MisResult::default();
        }

        MisResult {
            lhs_mis: self.lhs_m / sum,
            rhs_mis: self.rhs_m / sum,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MisResult {
    pub lhs_mis: f32,
    pub rhs_mis: f32,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn balance_heuristic() {
        let result = Mis {
            lhs_m: 1.0,
            rhs_m: 1.0,
            rhs_jacobian: 1.0,
            lhs_lhs_pdf: 3.0,
            lhs_rhs_pdf: 1.0,
            rhs_lhs_pdf: 2.0,
            rhs_rhs_pdf: 2.0,
        }
        .eval();

        assert_relative_eq!(0.75, result.lhs_mis);
        assert_relative_eq!(0.5, result.rhs_mis);
    }

    #[test]
    fn balance_heuristic_with_confidence() {
        let result = Mis {
            lhs_m: 1.0,
            rhs_m: 3.0,
            rhs_jacobian: 0.5,
            lhs_lhs_pdf: 3.0,
            lhs_rhs_pdf: 1.0,
            rhs_lhs_pdf: 2.0,
            rhs_rhs_pdf: 2.0,
        }
        .eval();

        assert_relative_eq!(0.5, result.lhs_mis);
        assert_relative_eq!(0.6, result.rhs_mis);
    }

    #[test]
    fn degenerate() {
        let result = Mis {
            lhs_m: 1.0,
            rhs_m: 1.0,
            rhs_jacobian: 1.0,
            ..Default::default()
        };

        assert_eq!(MisResult::default(), result.eval());

        let result = Mis {
            lhs_m: 2.0,
            rhs_m: 6.0,
            ..Default::default()
        };

        assert_eq!(
            MisResult {
                lhs_mis: 0.25,
                rhs_mis: 0.75
            },
            result.eval_confidence()
        );

        assert_eq!(MisResult::default(), Mis::default().eval_confidence());
    }
}
