//! Математические функции и утилиты

/// Ограничение значения в заданных пределах
#[inline(always)]
pub fn constrain(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Ограничение целочисленного значения в заданных пределах
#[inline(always)]
pub fn constrain_u8(value: u8, min: u8, max: u8) -> u8 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Линейная интерполяция между двумя значениями
/// t: 0.0 = a, 1.0 = b
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * constrain(t, 0.0, 1.0)
}

/// Обратная линейная интерполяция - получение t из значения
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if libm::fabsf(b - a) < f32::EPSILON {
        0.0
    } else {
        constrain((value - a) / (b - a), 0.0, 1.0)
    }
}

/// Линейная интерполяция по отрезку (x0, y0) - (x1, y1)
#[inline]
pub fn interpolate(x0: f32, y0: f32, x1: f32, y1: f32, x: f32) -> f32 {
    lerp(y0, y1, inverse_lerp(x0, x1, x))
}

/// Количество точек равномерной сетки [min, max] с шагом step (концы включены)
pub fn sample_count(min: f32, max: f32, step: f32) -> usize {
    if !(step > 0.0) || max < min {
        return 0;
    }
    // Небольшой допуск, чтобы 10.0 / 1.0 не превратилось в 9.999..
    libm::floorf((max - min) / step + 1e-4) as usize + 1
}

// Модульные тесты
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constrain() {
        assert_eq!(constrain(5.0, 0.0, 10.0), 5.0);
        assert_eq!(constrain(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(constrain(15.0, 0.0, 10.0), 10.0);
        assert_eq!(constrain_u8(120, 0, 100), 100);
    }

    #[test]
    fn test_interpolate() {
        assert!((interpolate(0.0, 0.0, 4.0, 1.0, 1.0) - 0.25).abs() < f32::EPSILON);
        assert!((interpolate(4.0, 1.0, 10.0, 0.0, 7.0) - 0.5).abs() < f32::EPSILON);
        // Вертикальное ребро
        assert_eq!(interpolate(2.0, 0.0, 2.0, 1.0, 2.0), 0.0);
    }

    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(0.0, 10.0, 1.0), 11);
        assert_eq!(sample_count(-10.0, 10.0, 1.0), 21);
        assert_eq!(sample_count(0.0, 100.0, 1.0), 101);
        assert_eq!(sample_count(0.0, 1.0, 0.1), 11);
        assert_eq!(sample_count(0.0, 10.0, 0.0), 0);
    }
}
