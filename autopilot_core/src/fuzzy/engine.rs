//! Система нечеткого вывода (Мамдани)
//!
//! Вычисление: сила каждого правила (И = min, ИЛИ = max) -> агрегирование по
//! парам (выходная переменная, терм) максимумом -> отсечение функций
//! принадлежности выходных термов -> объединение максимумом -> дефаззификация.
//!
//! Система не хранит состояние между вызовами: `evaluate` читает только
//! неизменяемые таблицы правил и переменных, поэтому один экземпляр можно
//! вызывать из нескольких задач одновременно. Для смены базы правил строится
//! новый экземпляр.

use heapless::Vec;

use super::{
    name, FuzzyError, LinguisticVariable, Name, Rule, VariableSet, MAX_RULES, MAX_TERMS,
    MAX_VARIABLES,
};

/// Допуск при поиске точек максимума
const PEAK_TOLERANCE: f32 = 1e-6;

/// Четкие значения входных переменных
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: Vec<(Name, f32), MAX_VARIABLES>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Установка значения переменной (повторный вызов перезаписывает)
    pub fn set(&mut self, variable: &str, value: f32) -> Result<(), FuzzyError> {
        if let Some(slot) = self.values.iter_mut().find(|(name, _)| name.as_str() == variable) {
            slot.1 = value;
            return Ok(());
        }
        self.values
            .push((name(variable)?, value))
            .map_err(|_| FuzzyError::CapacityExceeded)
    }

    pub fn get(&self, variable: &str) -> Option<f32> {
        self.values
            .iter()
            .find(|(name, _)| name.as_str() == variable)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

/// Четкие значения выходных переменных
///
/// Переменная, для которой не сработало ни одно правило, отсутствует:
/// "нет рекомендации" отличается от "рекомендовано 0".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs {
    values: Vec<(Name, f32), MAX_VARIABLES>,
}

impl Outputs {
    pub fn get(&self, variable: &str) -> Option<f32> {
        self.values
            .iter()
            .find(|(name, _)| name.as_str() == variable)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, variable: Name, value: f32) -> Result<(), FuzzyError> {
        self.values
            .push((variable, value))
            .map_err(|_| FuzzyError::CapacityExceeded)
    }
}

/// Метод дефаззификации
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Defuzzification {
    /// Центр тяжести: sum(x * mu(x)) / sum(mu(x))
    #[default]
    Centroid,
    /// Среднее точек максимума
    MeanOfMaximum,
    /// Наименьшая точка максимума
    SmallestOfMaximum,
    /// Наибольшая точка максимума
    LargestOfMaximum,
}

/// Система нечеткого вывода
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSystem {
    antecedents: VariableSet,
    consequents: VariableSet,
    rules: Vec<Rule, MAX_RULES>,
    defuzzification: Defuzzification,
}

impl ControlSystem {
    /// Построение системы с проверкой всех ссылок правил
    pub fn new<I>(antecedents: VariableSet, consequents: VariableSet, rules: I) -> Result<Self, FuzzyError>
    where
        I: IntoIterator<Item = Rule>,
    {
        for variable in antecedents.iter().chain(consequents.iter()) {
            if variable.terms().is_empty() {
                return Err(FuzzyError::EmptyVariable(variable.key().clone()));
            }
        }
        // Переменная не может быть одновременно входом и выходом
        if let Some(shared) = antecedents.iter().find(|v| consequents.get(v.name()).is_some()) {
            return Err(FuzzyError::DuplicateVariable(shared.key().clone()));
        }

        let mut list: Vec<Rule, MAX_RULES> = Vec::new();
        for rule in rules {
            if list.iter().any(|known| known.id() == rule.id()) {
                return Err(FuzzyError::DuplicateRule(rule.id_name().clone()));
            }
            for term in rule.antecedent().terms() {
                resolve(&antecedents, term.variable(), term.term()).ok_or_else(|| term.unknown())?;
            }
            for term in rule.consequents() {
                resolve(&consequents, term.variable(), term.term()).ok_or_else(|| term.unknown())?;
            }
            list.push(rule).map_err(|_| FuzzyError::CapacityExceeded)?;
        }

        debug!(
            "Нечеткая система: входов {}, выходов {}, правил {}",
            antecedents.len(),
            consequents.len(),
            list.len()
        );

        Ok(Self {
            antecedents,
            consequents,
            rules: list,
            defuzzification: Defuzzification::default(),
        })
    }

    /// Выбор метода дефаззификации
    pub fn with_defuzzification(mut self, method: Defuzzification) -> Self {
        self.defuzzification = method;
        self
    }

    pub fn antecedents(&self) -> &VariableSet {
        &self.antecedents
    }

    pub fn consequents(&self) -> &VariableSet {
        &self.consequents
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn defuzzification(&self) -> Defuzzification {
        self.defuzzification
    }

    /// Вычисление выходов по четким входам
    ///
    /// Значение вне области определения переменной (или NaN) отклоняется с
    /// `InvalidAssignment`, без ограничения. Значения для неизвестных
    /// переменных игнорируются. Правило, для посылки которого не хватает
    /// входов, считается несработавшим.
    pub fn evaluate(&self, inputs: &Inputs) -> Result<Outputs, FuzzyError> {
        for (variable, value) in inputs.iter() {
            match self.antecedents.get(variable) {
                Some(known) if !known.contains(value) => {
                    return Err(FuzzyError::InvalidAssignment {
                        variable: known.key().clone(),
                        value,
                    });
                }
                Some(_) => {}
                None => trace!("Вход {} не используется системой", variable),
            }
        }

        // Агрегированная сила по парам (выходная переменная, терм)
        let mut activation = [[0.0f32; MAX_TERMS]; MAX_VARIABLES];
        for rule in &self.rules {
            let strength = match rule.fire_strength(&self.antecedents, inputs) {
                Ok(strength) => strength,
                Err(FuzzyError::MissingInput(variable)) => {
                    trace!("Правило {}: нет входа {}", rule.id(), variable.as_str());
                    0.0
                }
                Err(e) => return Err(e),
            };
            if strength <= 0.0 {
                continue;
            }

            for consequent in rule.consequents() {
                if let Some((variable, term)) =
                    resolve(&self.consequents, consequent.variable(), consequent.term())
                {
                    let slot = &mut activation[variable][term];
                    *slot = slot.max(strength);
                }
            }
        }

        let mut outputs = Outputs::default();
        for (index, variable) in self.consequents.iter().enumerate() {
            match self.defuzzify(variable, &activation[index]) {
                Some(value) => outputs.insert(variable.key().clone(), value)?,
                None => trace!("Для {} не сработало ни одно правило", variable.name()),
            }
        }
        Ok(outputs)
    }

    /// Дефаззификация агрегированного выходного множества переменной
    fn defuzzify(&self, variable: &LinguisticVariable, activation: &[f32]) -> Option<f32> {
        if activation.iter().all(|strength| *strength <= 0.0) {
            return None;
        }
        let membership = |x: f32| aggregated_degree(variable, activation, x);

        match self.defuzzification {
            Defuzzification::Centroid => {
                let mut weighted = 0.0f32;
                let mut total = 0.0f32;
                for x in variable.samples() {
                    let degree = membership(x);
                    weighted += x * degree;
                    total += degree;
                }
                if total > 0.0 {
                    Some(weighted / total)
                } else {
                    None
                }
            }
            method => {
                let peak = variable.samples().map(membership).fold(0.0f32, f32::max);
                if peak <= 0.0 {
                    return None;
                }
                let mut sum = 0.0f32;
                let mut count = 0u32;
                let mut smallest = None;
                let mut largest = None;
                for x in variable.samples() {
                    if libm::fabsf(membership(x) - peak) <= PEAK_TOLERANCE {
                        sum += x;
                        count += 1;
                        smallest.get_or_insert(x);
                        largest = Some(x);
                    }
                }
                match method {
                    Defuzzification::SmallestOfMaximum => smallest,
                    Defuzzification::LargestOfMaximum => largest,
                    _ => (count > 0).then(|| sum / count as f32),
                }
            }
        }
    }
}

/// Индексы (переменная, терм) в наборе
fn resolve(variables: &VariableSet, variable: &str, term: &str) -> Option<(usize, usize)> {
    let index = variables.position(variable)?;
    let term = variables.iter().nth(index)?.term_index(term)?;
    Some((index, term))
}

/// Степень принадлежности x объединению отсеченных выходных термов
fn aggregated_degree(variable: &LinguisticVariable, activation: &[f32], x: f32) -> f32 {
    variable
        .terms()
        .iter()
        .zip(activation)
        .filter(|(_, strength)| **strength > 0.0)
        .map(|(term, strength)| term.function().degree_at(x).min(*strength))
        .fold(0.0f32, f32::max)
}
