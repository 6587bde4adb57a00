//! Кусочно-линейные функции принадлежности

use heapless::Vec;

use super::{name, FuzzyError, Name, MAX_BREAKPOINTS};
use crate::math::interpolate;

/// Функция принадлежности, заданная точками излома (x, степень)
///
/// Вне отрезка [первая точка, последняя точка] степень равна 0. Между
/// соседними точками - линейная интерполяция. Если несколько точек имеют
/// одинаковый x (вертикальное ребро), берется большая степень.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipFunction {
    pub(super) name: Name,
    universe_min: f32,
    universe_max: f32,
    breakpoints: Vec<(f32, f32), MAX_BREAKPOINTS>,
}

impl MembershipFunction {
    /// Произвольная кусочно-линейная функция
    ///
    /// Точки должны идти по неубыванию x, степени - в [0, 1].
    pub fn from_points(
        term: &str,
        universe: (f32, f32),
        points: &[(f32, f32)],
    ) -> Result<Self, FuzzyError> {
        let (universe_min, universe_max) = universe;
        if !universe_min.is_finite() || !universe_max.is_finite() || universe_min > universe_max {
            return Err(FuzzyError::InvalidShape);
        }
        if points.is_empty() {
            return Err(FuzzyError::InvalidShape);
        }

        let mut breakpoints = Vec::new();
        let mut previous_x = f32::NEG_INFINITY;
        for &(x, degree) in points {
            if !x.is_finite() || !(0.0..=1.0).contains(&degree) || x < previous_x {
                return Err(FuzzyError::InvalidShape);
            }
            previous_x = x;
            breakpoints
                .push((x, degree))
                .map_err(|_| FuzzyError::CapacityExceeded)?;
        }

        Ok(Self {
            name: name(term)?,
            universe_min,
            universe_max,
            breakpoints,
        })
    }

    /// Треугольная функция (a, b, c): 0 в a, 1 в b, 0 в c
    ///
    /// Допускаются вырожденные случаи a == b и b == c.
    pub fn triangle(
        term: &str,
        universe: (f32, f32),
        a: f32,
        b: f32,
        c: f32,
    ) -> Result<Self, FuzzyError> {
        if !(a <= b && b <= c) {
            return Err(FuzzyError::InvalidShape);
        }
        Self::from_points(term, universe, &[(a, 0.0), (b, 1.0), (c, 0.0)])
    }

    /// Трапециевидная функция (a, b, c, d): плато 1 на [b, c]
    pub fn trapezoid(
        term: &str,
        universe: (f32, f32),
        a: f32,
        b: f32,
        c: f32,
        d: f32,
    ) -> Result<Self, FuzzyError> {
        if !(a <= b && b <= c && c <= d) {
            return Err(FuzzyError::InvalidShape);
        }
        Self::from_points(term, universe, &[(a, 0.0), (b, 1.0), (c, 1.0), (d, 0.0)])
    }

    /// Имя терма
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Границы области определения
    pub fn universe(&self) -> (f32, f32) {
        (self.universe_min, self.universe_max)
    }

    /// Точки излома
    pub fn breakpoints(&self) -> &[(f32, f32)] {
        &self.breakpoints
    }

    /// Степень принадлежности x, всегда в [0, 1]
    pub fn degree_at(&self, x: f32) -> f32 {
        let points = self.breakpoints.as_slice();
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if x.is_nan() || x < first.0 || x > last.0 {
            return 0.0;
        }
        if points.len() == 1 {
            return first.1;
        }

        let mut degree = 0.0f32;
        for segment in points.windows(2) {
            let (x0, y0) = segment[0];
            let (x1, y1) = segment[1];
            if x < x0 || x > x1 {
                continue;
            }
            let value = if x1 == x0 {
                y0.max(y1)
            } else if x == x0 {
                y0
            } else if x == x1 {
                y1
            } else {
                interpolate(x0, y0, x1, y1, x)
            };
            degree = degree.max(value);
        }
        degree
    }
}
