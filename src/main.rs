#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

mod config;
mod data;
mod tasks;
mod utils;

use crate::config::hardware::{led, system};
use crate::data::{DriveMode, SYSTEM_STATE};
use crate::tasks::*;
use crate::utils::system_info;

/// Точка входа в программу
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Инициализация HAL Raspberry Pi Pico
    let p = embassy_rp::init(Default::default());

    defmt::info!("=== Нечеткий регулятор скорости v0.1.0 ===");
    defmt::info!("Инициализация системы...");
    system_info::print_clock_info();

    if let Err(e) = system_info::validate_clocks() {
        defmt::error!("Ошибка конфигурации частот: {}", e);
        SYSTEM_STATE.set_mode(DriveMode::Emergency).await;
    }

    // Встроенный светодиод Pico (GPIO25) для индикации режима
    let mut led = Output::new(p.PIN_25, Level::Low);

    for _ in 0..led::STARTUP_BLINKS {
        led.set_high();
        Timer::after_millis(led::STARTUP_BLINK_MS).await;
        led.set_low();
        Timer::after_millis(led::STARTUP_BLINK_MS).await;
    }

    if SYSTEM_STATE.mode().await == DriveMode::Idle {
        defmt::info!("Запуск задач...");
        defmt::unwrap!(spawner.spawn(sensor_task::task(RoscRng)));
        defmt::unwrap!(spawner.spawn(control_task::task()));
        SYSTEM_STATE.set_mode(DriveMode::Driving).await;
    }

    let mut reported = false;
    loop {
        match SYSTEM_STATE.mode().await {
            DriveMode::Idle => {}
            DriveMode::Driving => {
                led.toggle();
            }
            DriveMode::Finished => {
                led.set_high();
                if !reported {
                    reported = true;
                    match SYSTEM_STATE.last_speed_kmh().await {
                        Some(speed) => defmt::info!("Поездка завершена, итоговая скорость: {} км/ч", speed),
                        None => defmt::info!("Поездка завершена без шагов"),
                    }
                    if let Some(sample) = *SYSTEM_STATE.last_sample.lock().await {
                        defmt::info!(
                            "Последние показания: погода={}, дорога={}, препятствие={}",
                            sample.weather,
                            sample.road,
                            sample.obstacle
                        );
                    }
                }
            }
            DriveMode::Emergency => {
                if !reported {
                    reported = true;
                    defmt::error!("АВАРИЙНЫЙ РЕЖИМ! Регулятор остановлен");
                }
                led.toggle();
                Timer::after_millis(led::EMERGENCY_BLINK_MS).await;
                continue;
            }
        }

        Timer::after_millis(system::SUPERVISOR_PERIOD_MS).await;
    }
}
