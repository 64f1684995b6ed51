//! Small fixed capacity containers and polynomial solvers
use crate::{Scalar, EPSILON, EPSILON_SQRT, PI};
use std::{fmt, iter::FromIterator};

/// Iterator over at most `N` values stored inline
///
/// Never allocates, pushing more than `N` items panics.
#[derive(Clone, Copy)]
pub struct ArrayIter<T, const N: usize> {
    items: [T; N],
    start: usize,
    end: usize,
}

impl<T: Copy + Default, const N: usize> ArrayIter<T, N> {
    pub fn new() -> Self {
        Self {
            items: [T::default(); N],
            start: 0,
            end: 0,
        }
    }

    /// Append item at the back
    pub fn push(&mut self, item: T) {
        self.items[self.end] = item;
        self.end += 1;
    }

    /// Items which are not consumed yet
    pub fn as_slice(&self) -> &[T] {
        &self.items[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl<const N: usize> ArrayIter<Scalar, N> {
    /// Same items in increasing order
    pub fn sorted(mut self) -> Self {
        self.items[self.start..self.end].sort_by(Scalar::total_cmp);
        self
    }
}

impl<T: Copy + Default, const N: usize> Default for ArrayIter<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default + fmt::Debug, const N: usize> fmt::Debug for ArrayIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: Copy + Default, const N: usize> Extend<T> for ArrayIter<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.push(item))
    }
}

impl<T: Copy + Default, const N: usize> FromIterator<T> for ArrayIter<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<T: Copy + Default, const N: usize> Iterator for ArrayIter<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        (self.start < self.end).then(|| {
            self.start += 1;
            self.items[self.start - 1]
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl<T: Copy + Default, const N: usize> DoubleEndedIterator for ArrayIter<T, N> {
    fn next_back(&mut self) -> Option<T> {
        (self.start < self.end).then(|| {
            self.end -= 1;
            self.items[self.end]
        })
    }
}

impl<T: Copy + Default, const N: usize> ExactSizeIterator for ArrayIter<T, N> {}

/// Real roots of `a * t ^ 2 + b * t + c = 0` in increasing order
pub(crate) fn quadratic_solve(a: Scalar, b: Scalar, c: Scalar) -> ArrayIter<Scalar, 2> {
    let mut roots = ArrayIter::new();
    if a.abs() <= EPSILON * (b.abs() + c.abs()) {
        if b != 0.0 {
            roots.push(-c / b);
        }
        return roots;
    }
    let disc = b * b - 4.0 * a * c;
    if disc.abs() <= EPSILON * (b * b + (4.0 * a * c).abs()) {
        roots.push(-0.5 * b / a);
    } else if disc > 0.0 {
        // no cancellation between `b` and the square root
        let q = -0.5 * (b + b.signum() * disc.sqrt());
        roots.push(q / a);
        roots.push(c / q);
    }
    roots.sorted()
}

/// Real roots of `a * t ^ 3 + b * t ^ 2 + c * t + d = 0` in increasing order
pub(crate) fn cubic_solve(a: Scalar, b: Scalar, c: Scalar, d: Scalar) -> ArrayIter<Scalar, 3> {
    let scale = b.abs() + c.abs() + d.abs();
    if a.abs() <= EPSILON_SQRT * scale {
        return quadratic_solve(b, c, d).collect();
    }
    let mut roots = ArrayIter::new();
    if d.abs() <= EPSILON * (a.abs() + scale) {
        roots.push(0.0);
        roots.extend(quadratic_solve(a, b, c).filter(|t| *t != 0.0));
        return roots.sorted();
    }

    // depressed form `s ^ 3 + p * s + q = 0` with `t = s - shift`
    let (b, c, d) = (b / a, c / a, d / a);
    let shift = b / 3.0;
    let p = c - b * shift;
    let q = d - c * shift + 2.0 * shift.powi(3);
    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    if disc.abs() < EPSILON {
        let u = (-q / 2.0).cbrt();
        roots.push(2.0 * u - shift);
        if u != 0.0 {
            roots.push(-u - shift);
        }
    } else if disc > 0.0 {
        let sd = disc.sqrt();
        roots.push((sd - q / 2.0).cbrt() - (sd + q / 2.0).cbrt() - shift);
    } else {
        let r = (-(p / 3.0).powi(3)).sqrt();
        let phi = (-q / (2.0 * r)).clamp(-1.0, 1.0).acos();
        let m = 2.0 * r.cbrt();
        for k in 0..3 {
            roots.push(m * ((phi + 2.0 * PI * k as Scalar) / 3.0).cos() - shift);
        }
    }
    roots.sorted()
}

/// Refine root of the polynomial `coeffs[0] + coeffs[1] * t + ...` with Newton steps
///
/// A step is only taken if it reduces the residual.
pub(crate) fn polish_root(coeffs: &[Scalar], mut t: Scalar) -> Scalar {
    let eval = |t: Scalar| {
        coeffs
            .iter()
            .rev()
            .fold((0.0, 0.0), |(value, slope), coeff| (value * t + coeff, slope * t + value))
    };
    for _ in 0..4 {
        let (value, slope) = eval(t);
        if value == 0.0 || slope == 0.0 {
            break;
        }
        let next = t - value / slope;
        if !next.is_finite() || eval(next).0.abs() >= value.abs() {
            break;
        }
        t = next;
    }
    t
}

/// Real roots of a polynomial of degree at most three given by `coeffs` in
/// increasing degree order
pub(crate) fn poly_roots(coeffs: &[Scalar]) -> ArrayIter<Scalar, 3> {
    let roots = match *coeffs {
        [c0, c1] => quadratic_solve(0.0, c1, c0).collect(),
        [c0, c1, c2] => quadratic_solve(c2, c1, c0).collect(),
        [c0, c1, c2, c3] => cubic_solve(c3, c2, c1, c0),
        _ => ArrayIter::new(),
    };
    roots
        .map(|t| polish_root(coeffs, t))
        .collect::<ArrayIter<Scalar, 3>>()
        .sorted()
}
