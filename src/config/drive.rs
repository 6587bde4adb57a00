//! Параметры поездки

/// Начальная скорость (км/ч)
pub const INITIAL_SPEED_KMH: f32 = 50.0;

/// Нижний предел скорости (км/ч)
pub const MIN_SPEED_KMH: f32 = 0.0;

/// Число шагов моделирования
pub const STEPS: u32 = 10;

/// Пауза между шагами (мс)
pub const STEP_DELAY_MS: u64 = 500;
