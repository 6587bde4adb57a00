//! Конфигурация аппаратного обеспечения

/// Индикация светодиодом
pub mod led {
    /// Число вспышек при старте
    pub const STARTUP_BLINKS: u32 = 3;

    /// Длительность вспышки при старте (мс)
    pub const STARTUP_BLINK_MS: u64 = 100;

    /// Полупериод мигания в аварийном режиме (мс)
    pub const EMERGENCY_BLINK_MS: u64 = 50;
}

/// Параметры системы
pub mod system {
    /// Минимальная системная частота (Гц)
    pub const MIN_SYS_FREQ_HZ: u32 = 48_000_000;

    /// Период главного цикла супервизора (мс)
    pub const SUPERVISOR_PERIOD_MS: u64 = 100;
}
