use autopilot_core::SampleGenerator;
use embassy_rp::clocks::RoscRng;
use embassy_time::{Duration, Ticker};

use crate::config::drive::STEP_DELAY_MS;
use crate::data::{DriveMode, CHANNELS, SYSTEM_STATE};

/// Имитация датчиков погоды, дороги и дальномера
///
/// Источник случайности - кольцевой генератор RP2040.
#[embassy_executor::task]
pub async fn task(rng: RoscRng) {
    let mut generator = SampleGenerator::new(rng);
    let sender = CHANNELS.sensor_channel.sender();
    let mut ticker = Ticker::every(Duration::from_millis(STEP_DELAY_MS));

    defmt::info!("Датчики запущены");

    loop {
        match SYSTEM_STATE.mode().await {
            DriveMode::Finished | DriveMode::Emergency => break,
            _ => {}
        }

        let sample = generator.next_sample();
        *SYSTEM_STATE.last_sample.lock().await = Some(sample);

        #[cfg(feature = "debug-sensors")]
        defmt::debug!(
            "Датчики: погода={}, дорога={}, препятствие={}",
            sample.weather,
            sample.road,
            sample.obstacle
        );

        // Канал на одно значение: ждем, пока регулятор заберет показание
        sender.send(sample).await;
        ticker.next().await;
    }

    defmt::info!("Датчики остановлены");
}
