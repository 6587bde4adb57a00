//! Имитация датчиков
//!
//! Случайные целочисленные показания в пределах областей определения
//! каталога: погода и дорога 0..=10, препятствие 0..=100.

use rand_core::RngCore;

use crate::catalog::{obstacle, road, weather};
use crate::fuzzy::{FuzzyError, Inputs};
use crate::math::constrain_u8;

/// Показания датчиков за один шаг
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    /// Погода: 0 - ясно, 10 - ливень
    pub weather: u8,
    /// Дорога: 0 - сухо, 10 - гололед
    pub road: u8,
    /// Расстояние до препятствия, м
    pub obstacle: u8,
}

impl SensorSample {
    /// Ограничение показаний областями определения каталога
    pub fn clamped(&self) -> Self {
        Self {
            weather: constrain_u8(self.weather, weather::VARIABLE.min as u8, weather::VARIABLE.max as u8),
            road: constrain_u8(self.road, road::VARIABLE.min as u8, road::VARIABLE.max as u8),
            obstacle: constrain_u8(
                self.obstacle,
                obstacle::VARIABLE.min as u8,
                obstacle::VARIABLE.max as u8,
            ),
        }
    }

    /// Входы нечеткой системы
    pub fn to_inputs(&self) -> Result<Inputs, FuzzyError> {
        let mut inputs = Inputs::new();
        inputs.set(weather::NAME, self.weather as f32)?;
        inputs.set(road::NAME, self.road as f32)?;
        inputs.set(obstacle::NAME, self.obstacle as f32)?;
        Ok(inputs)
    }
}

/// Генератор случайных показаний
pub struct SampleGenerator<R> {
    rng: R,
}

impl<R: RngCore> SampleGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Следующее показание
    pub fn next_sample(&mut self) -> SensorSample {
        SensorSample {
            weather: self.uniform(weather::VARIABLE.max as u32),
            road: self.uniform(road::VARIABLE.max as u32),
            obstacle: self.uniform(obstacle::VARIABLE.max as u32),
        }
    }

    /// Равномерное целое в 0..=max
    fn uniform(&mut self, max: u32) -> u8 {
        (self.rng.next_u32() % (max + 1)) as u8
    }
}
