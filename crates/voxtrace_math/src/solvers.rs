//! Closed-form real root finding for polynomials up to degree four.
//!
//! Coefficients are passed highest degree first. Everything runs in `f64`;
//! callers tracing in `f32` widen their inputs so the quartic stays stable
//! for grazing rays.

use std::f64::consts::PI;

/// Magnitude below which an intermediate term counts as zero.
const EQN_EPS: f64 = 1e-9;

fn is_zero(x: f64) -> bool {
    x > -EQN_EPS && x < EQN_EPS
}

/// Up to four real roots, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Roots {
    values: [f64; 4],
    len: usize,
}

impl Roots {
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, x: f64) {
        if self.len < self.values.len() {
            self.values[self.len] = x;
            self.len += 1;
        }
    }

    fn shift(&mut self, by: f64) {
        for v in &mut self.values[..self.len] {
            *v -= by;
        }
    }

    fn sort(&mut self) {
        self.values[..self.len].sort_unstable_by(|a, b| a.total_cmp(b));
    }
}

/// Real roots of `a x^2 + b x + c`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Roots {
    let mut roots = Roots::default();
    if a == 0.0 {
        if b != 0.0 {
            roots.push(-c / b);
        }
        return roots;
    }
    let p = b / (2.0 * a);
    let q = c / a;
    let d = p * p - q;
    if is_zero(d) {
        roots.push(-p);
    } else if d > 0.0 {
        let sqrt_d = d.sqrt();
        roots.push(-sqrt_d - p);
        roots.push(sqrt_d - p);
    }
    roots
}

/// Real roots of `a x^3 + b x^2 + c x + d`, `a` non-zero.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Roots {
    let mut roots = Roots::default();
    if a == 0.0 {
        return solve_quadratic(b, c, d);
    }
    let a2 = b / a;
    let a1 = c / a;
    let a0 = d / a;

    // depressed form y^3 + 3p y + 2q, x = y - a2/3
    let sq_a = a2 * a2;
    let p = (-sq_a / 3.0 + a1) / 3.0;
    let q = (2.0 / 27.0 * a2 * sq_a - a2 * a1 / 3.0 + a0) / 2.0;
    let cb_p = p * p * p;
    let disc = q * q + cb_p;

    if is_zero(disc) {
        if is_zero(q) {
            roots.push(0.0);
        } else {
            let u = (-q).cbrt();
            roots.push(2.0 * u);
            roots.push(-u);
        }
    } else if disc < 0.0 {
        // three real roots
        let phi = (-q / (-cb_p).sqrt()).clamp(-1.0, 1.0).acos() / 3.0;
        let t = 2.0 * (-p).sqrt();
        roots.push(t * phi.cos());
        roots.push(-t * (phi + PI / 3.0).cos());
        roots.push(-t * (phi - PI / 3.0).cos());
    } else {
        let sqrt_d = disc.sqrt();
        let u = (sqrt_d - q).cbrt();
        let v = -(sqrt_d + q).cbrt();
        roots.push(u + v);
    }

    roots.shift(a2 / 3.0);
    roots.sort();
    roots
}

/// Real roots of `a x^4 + b x^3 + c x^2 + d x + e`, `a` non-zero.
///
/// Ferrari's method: one root of the resolvent cubic splits the quartic
/// into two quadratics.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Roots {
    if a == 0.0 {
        return solve_cubic(b, c, d, e);
    }
    let a3 = b / a;
    let a2 = c / a;
    let a1 = d / a;
    let a0 = e / a;

    // depressed form y^4 + p y^2 + q y + r, x = y - a3/4
    let sq_a = a3 * a3;
    let p = -3.0 / 8.0 * sq_a + a2;
    let q = sq_a * a3 / 8.0 - a3 * a2 / 2.0 + a1;
    let r = -3.0 / 256.0 * sq_a * sq_a + sq_a * a2 / 16.0 - a3 * a1 / 4.0 + a0;

    let mut roots = Roots::default();
    if is_zero(r) {
        // y (y^3 + p y + q) = 0
        for &y in solve_cubic(1.0, 0.0, p, q).as_slice() {
            roots.push(y);
        }
        roots.push(0.0);
    } else {
        let resolvent = solve_cubic(1.0, -p / 2.0, -r, r * p / 2.0 - q * q / 8.0);
        let Some(&z) = resolvent.as_slice().last() else {
            return roots;
        };
        let Some(u) = non_negative_sqrt(z * z - r) else {
            return roots;
        };
        let Some(v) = non_negative_sqrt(2.0 * z - p) else {
            return roots;
        };
        let v = if q < 0.0 { -v } else { v };
        for &y in solve_quadratic(1.0, v, z - u).as_slice() {
            roots.push(y);
        }
        for &y in solve_quadratic(1.0, -v, z + u).as_slice() {
            roots.push(y);
        }
    }

    roots.shift(a3 / 4.0);
    roots.sort();
    roots
}

/// Square root that snaps tiny negatives to zero and rejects the rest.
fn non_negative_sqrt(x: f64) -> Option<f64> {
    if is_zero(x) {
        Some(0.0)
    } else if x > 0.0 {
        Some(x.sqrt())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roots(roots: Roots, expected: &[f64]) {
        assert_eq!(roots.len(), expected.len(), "roots {:?}", roots.as_slice());
        for (got, want) in roots.as_slice().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {} want {}", got, want);
        }
    }

    #[test]
    fn test_quadratic() {
        assert_roots(solve_quadratic(1.0, -3.0, 2.0), &[1.0, 2.0]);
        assert_roots(solve_quadratic(1.0, -2.0, 1.0), &[1.0]);
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert_roots(solve_quadratic(0.0, 2.0, -4.0), &[2.0]);
    }

    #[test]
    fn test_cubic_three_roots() {
        // (x - 1)(x - 2)(x - 3)
        assert_roots(solve_cubic(1.0, -6.0, 11.0, -6.0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cubic_single_root() {
        // (x - 2)(x^2 + 1)
        assert_roots(solve_cubic(1.0, -2.0, 1.0, -2.0), &[2.0]);
    }

    #[test]
    fn test_quartic_four_roots() {
        // (x - 1)(x - 2)(x - 3)(x - 4)
        assert_roots(
            solve_quartic(1.0, -10.0, 35.0, -50.0, 24.0),
            &[1.0, 2.0, 3.0, 4.0],
        );
        // leading coefficient is divided out
        assert_roots(
            solve_quartic(2.0, -20.0, 70.0, -100.0, 48.0),
            &[1.0, 2.0, 3.0, 4.0],
        );
    }

    #[test]
    fn test_quartic_two_roots() {
        // (x^2 - 4)(x^2 + 1)
        assert_roots(solve_quartic(1.0, 0.0, -3.0, 0.0, -4.0), &[-2.0, 2.0]);
    }

    #[test]
    fn test_quartic_zero_constant_term() {
        // x^4 - x^2 = x^2 (x - 1)(x + 1), depressed constant vanishes
        let roots = solve_quartic(1.0, 0.0, -1.0, 0.0, 0.0);
        assert!((roots.as_slice()[0] + 1.0).abs() < 1e-6);
        assert!((roots.as_slice()[roots.len() - 1] - 1.0).abs() < 1e-6);
        assert!(roots.as_slice().iter().any(|x| x.abs() < 1e-6));
    }

    #[test]
    fn test_quartic_without_real_roots() {
        assert!(solve_quartic(1.0, 0.0, 0.0, 0.0, 1.0).is_empty());
        assert!(solve_quartic(1.0, 0.0, 2.0, 0.0, 1.0).is_empty());
    }
}
