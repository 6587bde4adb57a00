//! Ядро нечеткого регулятора скорости беспилотного автомобиля
//!
//! Библиотека не использует аллокатор: все коллекции имеют фиксированную
//! емкость (`heapless`), поэтому одинаково работает в прошивке RP2040 и в
//! тестах на хосте.
//!
//! Поток данных: четкие входы -> [`fuzzy::ControlSystem::evaluate`] ->
//! силы срабатывания правил -> агрегирование по термам -> дефаззификация ->
//! четкое приращение скорости -> [`vehicle::SpeedController`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod catalog;
pub mod fuzzy;
pub mod knowledge;
pub mod math;
pub mod simulation;
pub mod vehicle;

pub use fuzzy::{
    Antecedent, ControlSystem, Defuzzification, FuzzyError, Inputs, LinguisticVariable,
    MembershipFunction, Outputs, Rule, TermRef, VariableKind, VariableSet,
};
pub use knowledge::{GraphRuleStore, KnowledgeError, RuleRecord, RuleSource, StoreError};
pub use simulation::{SampleGenerator, SensorSample};
pub use vehicle::{Advice, SpeedController, StepReport, VehicleState};
