// src/data/mod.rs
use autopilot_core::{SensorSample, StepReport};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;

/// Размер буфера канала показаний: датчики не опережают регулятор больше чем на шаг
const SENSOR_CHANNEL_SIZE: usize = 1;

/// Режим движения
#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub enum DriveMode {
    /// Инициализация, регулятор не запущен
    Idle,
    /// Идет моделирование
    Driving,
    /// Все шаги выполнены
    Finished,
    /// База правил не загрузилась
    Emergency,
}

/// Каналы для передачи данных между задачами
pub struct DataChannels {
    pub sensor_channel: Channel<CriticalSectionRawMutex, SensorSample, SENSOR_CHANNEL_SIZE>,
}

impl DataChannels {
    pub const fn new() -> Self {
        Self {
            sensor_channel: Channel::new(),
        }
    }
}

/// Общее состояние системы
pub struct SystemState {
    pub drive_mode: Mutex<CriticalSectionRawMutex, DriveMode>,
    pub last_sample: Mutex<CriticalSectionRawMutex, Option<SensorSample>>,
    pub last_report: Mutex<CriticalSectionRawMutex, Option<StepReport>>,
}

impl SystemState {
    pub const fn new() -> Self {
        Self {
            drive_mode: Mutex::new(DriveMode::Idle),
            last_sample: Mutex::new(None),
            last_report: Mutex::new(None),
        }
    }

    pub async fn mode(&self) -> DriveMode {
        *self.drive_mode.lock().await
    }

    pub async fn set_mode(&self, mode: DriveMode) {
        let mut current = self.drive_mode.lock().await;
        if *current != mode {
            defmt::info!("Режим: {} -> {}", *current, mode);
            *current = mode;
        }
    }

    /// Скорость после последнего выполненного шага
    pub async fn last_speed_kmh(&self) -> Option<f32> {
        self.last_report.lock().await.as_ref().map(|report| report.speed_kmh)
    }
}

// Статические экземпляры для глобального доступа
pub static CHANNELS: DataChannels = DataChannels::new();
pub static SYSTEM_STATE: SystemState = SystemState::new();
