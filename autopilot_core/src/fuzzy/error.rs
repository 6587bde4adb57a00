//! Ошибки нечеткого вывода

use core::fmt;

use super::Name;

/// Ошибки построения и вычисления нечеткой системы
#[derive(Debug, Clone, PartialEq)]
pub enum FuzzyError {
    /// Терм не зарегистрирован в переменной
    UnknownTerm { variable: Name, term: Name },
    /// Терм с таким именем (или псевдонимом) уже есть
    DuplicateTerm { variable: Name, term: Name },
    /// Переменная объявлена дважды (в том числе на разных сторонах)
    DuplicateVariable(Name),
    /// Правило с таким идентификатором уже есть
    DuplicateRule(Name),
    /// Переменная без единого терма
    EmptyVariable(Name),
    /// Правило ссылается на неизвестную переменную или терм
    UnknownVariableReference { variable: Name, term: Name },
    /// Для переменной из посылки не передано значение
    MissingInput(Name),
    /// Значение вне области определения переменной (или не число)
    InvalidAssignment { variable: Name, value: f32 },
    /// Некорректные точки излома или границы области определения
    InvalidShape,
    /// Превышена емкость фиксированного буфера
    CapacityExceeded,
}

impl fmt::Display for FuzzyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuzzyError::UnknownTerm { variable, term } => {
                write!(f, "unknown term '{}' in variable '{}'", term, variable)
            }
            FuzzyError::DuplicateTerm { variable, term } => {
                write!(f, "duplicate term '{}' in variable '{}'", term, variable)
            }
            FuzzyError::DuplicateVariable(name) => write!(f, "duplicate variable '{}'", name),
            FuzzyError::DuplicateRule(id) => write!(f, "duplicate rule '{}'", id),
            FuzzyError::EmptyVariable(name) => write!(f, "variable '{}' has no terms", name),
            FuzzyError::UnknownVariableReference { variable, term } => {
                write!(f, "rule references unknown '{}'/'{}'", variable, term)
            }
            FuzzyError::MissingInput(name) => write!(f, "missing input for '{}'", name),
            FuzzyError::InvalidAssignment { variable, value } => {
                write!(f, "value {} is out of range for '{}'", value, variable)
            }
            FuzzyError::InvalidShape => write!(f, "invalid membership function shape"),
            FuzzyError::CapacityExceeded => write!(f, "fixed capacity exceeded"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FuzzyError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FuzzyError::UnknownTerm { variable, term } => defmt::write!(
                fmt,
                "Fuzzy: unknown term {} in {}",
                term.as_str(),
                variable.as_str()
            ),
            FuzzyError::DuplicateTerm { variable, term } => defmt::write!(
                fmt,
                "Fuzzy: duplicate term {} in {}",
                term.as_str(),
                variable.as_str()
            ),
            FuzzyError::DuplicateVariable(name) => {
                defmt::write!(fmt, "Fuzzy: duplicate variable {}", name.as_str())
            }
            FuzzyError::DuplicateRule(id) => {
                defmt::write!(fmt, "Fuzzy: duplicate rule {}", id.as_str())
            }
            FuzzyError::EmptyVariable(name) => {
                defmt::write!(fmt, "Fuzzy: variable {} has no terms", name.as_str())
            }
            FuzzyError::UnknownVariableReference { variable, term } => defmt::write!(
                fmt,
                "Fuzzy: unknown reference {}/{}",
                variable.as_str(),
                term.as_str()
            ),
            FuzzyError::MissingInput(name) => {
                defmt::write!(fmt, "Fuzzy: missing input {}", name.as_str())
            }
            FuzzyError::InvalidAssignment { variable, value } => defmt::write!(
                fmt,
                "Fuzzy: value {} out of range for {}",
                value,
                variable.as_str()
            ),
            FuzzyError::InvalidShape => defmt::write!(fmt, "Fuzzy: invalid shape"),
            FuzzyError::CapacityExceeded => defmt::write!(fmt, "Fuzzy: capacity exceeded"),
        }
    }
}
