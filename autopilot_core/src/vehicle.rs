//! Модель автомобиля и пошаговое применение регулятора
//!
//! Здесь проходит граница между ядром и потребителем: отсутствие вывода и
//! ошибки вычисления превращаются в нулевое приращение скорости, но
//! различаются в отчете шага.

use crate::catalog::speed;
use crate::fuzzy::{ControlSystem, FuzzyError};
use crate::simulation::SensorSample;

/// Состояние автомобиля
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    /// Текущая скорость, км/ч
    speed_kmh: f32,
    /// Нижний предел скорости, км/ч
    floor_kmh: f32,
}

impl VehicleState {
    pub fn new(speed_kmh: f32, floor_kmh: f32) -> Self {
        Self {
            speed_kmh: speed_kmh.max(floor_kmh),
            floor_kmh,
        }
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed_kmh
    }

    /// Применение приращения с ограничением снизу
    pub fn apply(&mut self, delta_kmh: f32) -> f32 {
        self.speed_kmh = (self.speed_kmh + delta_kmh).max(self.floor_kmh);
        self.speed_kmh
    }
}

/// Рекомендация регулятора на шаге
#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    /// Изменить скорость на величину
    Adjust(f32),
    /// Ни одно правило не сработало
    NoRecommendation,
    /// Входы отклонены системой
    Rejected(FuzzyError),
}

impl Advice {
    /// Приращение скорости, применяемое к автомобилю
    pub fn delta(&self) -> f32 {
        match self {
            Advice::Adjust(delta) => *delta,
            Advice::NoRecommendation | Advice::Rejected(_) => 0.0,
        }
    }
}

/// Отчет об одном шаге
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: u32,
    pub sample: SensorSample,
    pub advice: Advice,
    pub speed_kmh: f32,
}

/// Регулятор скорости: нечеткая система и состояние автомобиля
#[derive(Debug, Clone)]
pub struct SpeedController {
    engine: ControlSystem,
    state: VehicleState,
    steps: u32,
}

impl SpeedController {
    pub fn new(engine: ControlSystem, state: VehicleState) -> Self {
        Self {
            engine,
            state,
            steps: 0,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn engine(&self) -> &ControlSystem {
        &self.engine
    }

    /// Замена системы новой (после перезагрузки базы правил)
    pub fn replace_engine(&mut self, engine: ControlSystem) -> ControlSystem {
        info!("Нечеткая система заменена, правил: {}", engine.rules().len());
        core::mem::replace(&mut self.engine, engine)
    }

    /// Один шаг: оценка показаний и обновление скорости
    pub fn step(&mut self, sample: SensorSample) -> StepReport {
        self.steps += 1;
        let sample = sample.clamped();

        let advice = match sample.to_inputs().and_then(|inputs| self.engine.evaluate(&inputs)) {
            Ok(outputs) => match outputs.get(speed::NAME) {
                Some(delta) => Advice::Adjust(delta),
                None => Advice::NoRecommendation,
            },
            Err(e) => {
                error!("Ошибка на шаге {}: {}", self.steps, e);
                Advice::Rejected(e)
            }
        };

        let speed_kmh = self.state.apply(advice.delta());
        StepReport {
            step: self.steps,
            sample,
            advice,
            speed_kmh,
        }
    }
}
