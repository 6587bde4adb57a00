//! Нечеткий вывод по Мамдани
//!
//! - [`MembershipFunction`] - кусочно-линейная функция принадлежности
//! - [`LinguisticVariable`] - лингвистическая переменная с набором термов
//! - [`Rule`] - правило: посылка из термов (И = min, ИЛИ = max) и заключения
//! - [`ControlSystem`] - вычисление правил, агрегирование и дефаззификация

mod engine;
mod error;
mod membership;
mod rule;
mod variable;

pub use engine::{ControlSystem, Defuzzification, Inputs, Outputs};
pub use error::FuzzyError;
pub use membership::MembershipFunction;
pub use rule::{Antecedent, Node, Rule, TermRef};
pub use variable::{LinguisticVariable, Term, VariableKind, VariableSet};

use heapless::String;

/// Емкость имени переменной/терма в байтах (UTF-8, кириллица - 2 байта на букву)
pub const NAME_CAPACITY: usize = 24;
/// Максимум точек излома у функции принадлежности
pub const MAX_BREAKPOINTS: usize = 8;
/// Максимум термов у одной переменной
pub const MAX_TERMS: usize = 6;
/// Максимум переменных на стороне входов или выходов
pub const MAX_VARIABLES: usize = 6;
/// Максимум правил в системе
pub const MAX_RULES: usize = 16;
/// Максимум узлов в дереве посылки одного правила
pub const MAX_RULE_NODES: usize = 8;
/// Максимум заключений у одного правила
pub const MAX_CONSEQUENTS: usize = 4;

/// Имя переменной или терма
pub type Name = String<NAME_CAPACITY>;

/// Создание имени из строки с проверкой емкости
pub fn name(value: &str) -> Result<Name, FuzzyError> {
    let mut name = Name::new();
    name.push_str(value).map_err(|_| FuzzyError::CapacityExceeded)?;
    Ok(name)
}

/// Имя, обрезанное до емкости по границе символа (для сообщений об ошибках)
pub(crate) fn truncated(value: &str) -> Name {
    let mut name = Name::new();
    for c in value.chars() {
        if name.push(c).is_err() {
            break;
        }
    }
    name
}
