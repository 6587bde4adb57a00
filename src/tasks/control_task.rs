// src/tasks/control_task.rs
use autopilot_core::catalog::DEFAULT as CATALOG;
use autopilot_core::knowledge::{reload, seed, DEFAULT_RULES};
use autopilot_core::{Advice, GraphRuleStore, SpeedController, VehicleState};
#[cfg(feature = "debug-control")]
use autopilot_core::{ControlSystem, SensorSample};
use embassy_time::Timer;

use crate::config::drive::{INITIAL_SPEED_KMH, MIN_SPEED_KMH, STEPS, STEP_DELAY_MS};
use crate::data::{DriveMode, CHANNELS, SYSTEM_STATE};

#[embassy_executor::task]
pub async fn task() {
    // Заполнение базы знаний и построение нечеткой системы
    let mut store = GraphRuleStore::new();
    if let Err(e) = seed(&mut store, DEFAULT_RULES) {
        defmt::error!("Ошибка заполнения базы правил: {}", e);
        SYSTEM_STATE.set_mode(DriveMode::Emergency).await;
        return;
    }

    let engine = match reload(&mut store, &CATALOG) {
        Ok(engine) => {
            defmt::info!("Нечеткая система построена, правил: {}", engine.rules().len());
            engine
        }
        Err(e) => {
            defmt::error!("Ошибка построения нечеткой системы: {}", e);
            SYSTEM_STATE.set_mode(DriveMode::Emergency).await;
            return;
        }
    };

    let mut controller =
        SpeedController::new(engine, VehicleState::new(INITIAL_SPEED_KMH, MIN_SPEED_KMH));
    let receiver = CHANNELS.sensor_channel.receiver();

    defmt::info!("Начальная скорость: {} км/ч", controller.state().speed_kmh());

    for _ in 0..STEPS {
        let sample = receiver.receive().await;
        let report = controller.step(sample);

        #[cfg(feature = "debug-control")]
        log_fuzzification(controller.engine(), &report.sample);

        defmt::info!(
            "Шаг {}: погода={}, дорога={}, препятствие={} -> dv={}, скорость={} км/ч",
            report.step,
            report.sample.weather,
            report.sample.road,
            report.sample.obstacle,
            report.advice.delta(),
            report.speed_kmh
        );

        match &report.advice {
            Advice::Adjust(_delta) => {
                #[cfg(feature = "debug-control")]
                defmt::debug!("Рекомендация регулятора: {}", _delta);
            }
            Advice::NoRecommendation => {
                defmt::warn!("Шаг {}: ни одно правило не сработало, скорость сохранена", report.step);
            }
            Advice::Rejected(e) => {
                defmt::warn!("Шаг {}: входы отклонены ({}), скорость сохранена", report.step, e);
            }
        }

        *SYSTEM_STATE.last_report.lock().await = Some(report);
        Timer::after_millis(STEP_DELAY_MS).await;
    }

    defmt::info!("Моделирование завершено, скорость: {} км/ч", controller.state().speed_kmh());
    SYSTEM_STATE.set_mode(DriveMode::Finished).await;

    // Освобождаем канал, чтобы задача датчиков увидела смену режима
    while receiver.try_receive().is_ok() {}
}

/// Степени принадлежности показаний всем термам входов
#[cfg(feature = "debug-control")]
fn log_fuzzification(engine: &ControlSystem, sample: &SensorSample) {
    let Ok(inputs) = sample.to_inputs() else {
        return;
    };
    for variable in engine.antecedents().iter() {
        let Some(x) = inputs.get(variable.name()) else {
            continue;
        };
        for (term, degree) in variable.fuzzify(x) {
            defmt::debug!("  {}({}) = {}: {}", variable.name(), x, term, degree);
        }
    }
}
