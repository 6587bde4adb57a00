//! Лингвистические переменные

use heapless::Vec;

use super::{name, truncated, FuzzyError, MembershipFunction, Name, MAX_TERMS, MAX_VARIABLES};
use crate::math::sample_count;

/// Роль переменной в системе
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VariableKind {
    /// Вход (посылка правил)
    Antecedent,
    /// Выход (заключение правил)
    Consequent,
}

/// Терм переменной: имя, необязательный псевдоним и функция принадлежности
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    label: Option<Name>,
    function: MembershipFunction,
}

impl Term {
    pub fn name(&self) -> &str {
        self.function.name()
    }

    /// Псевдоним терма (например, русская метка из базы знаний)
    pub fn label(&self) -> Option<&str> {
        self.label.as_ref().map(|label| label.as_str())
    }

    pub fn function(&self) -> &MembershipFunction {
        &self.function
    }

    fn answers_to(&self, key: &str) -> bool {
        self.name() == key || self.label() == Some(key)
    }
}

/// Лингвистическая переменная: именованная величина с набором термов
/// на общей области определения
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticVariable {
    name: Name,
    kind: VariableKind,
    universe_min: f32,
    universe_max: f32,
    /// Шаг дискретизации области определения при дефаззификации
    resolution: f32,
    terms: Vec<Term, MAX_TERMS>,
}

impl LinguisticVariable {
    /// Новая переменная без термов с шагом дискретизации 1.0
    pub fn new(
        variable: &str,
        kind: VariableKind,
        universe_min: f32,
        universe_max: f32,
    ) -> Result<Self, FuzzyError> {
        if !universe_min.is_finite() || !universe_max.is_finite() || universe_min > universe_max {
            return Err(FuzzyError::InvalidShape);
        }
        Ok(Self {
            name: name(variable)?,
            kind,
            universe_min,
            universe_max,
            resolution: 1.0,
            terms: Vec::new(),
        })
    }

    /// Входная переменная
    pub fn antecedent(variable: &str, universe_min: f32, universe_max: f32) -> Result<Self, FuzzyError> {
        Self::new(variable, VariableKind::Antecedent, universe_min, universe_max)
    }

    /// Выходная переменная
    pub fn consequent(variable: &str, universe_min: f32, universe_max: f32) -> Result<Self, FuzzyError> {
        Self::new(variable, VariableKind::Consequent, universe_min, universe_max)
    }

    /// Установка шага дискретизации (должен быть больше нуля)
    pub fn with_resolution(mut self, resolution: f32) -> Result<Self, FuzzyError> {
        if !(resolution > 0.0) || !resolution.is_finite() {
            return Err(FuzzyError::InvalidShape);
        }
        self.resolution = resolution;
        Ok(self)
    }

    /// Регистрация терма
    pub fn add_term(&mut self, function: MembershipFunction) -> Result<(), FuzzyError> {
        self.add_labeled_term(function, None)
    }

    /// Регистрация терма с псевдонимом
    ///
    /// Имя и псевдоним не должны совпадать с уже зарегистрированными именами
    /// или псевдонимами. Область определения функции должна совпадать с
    /// областью определения переменной.
    pub fn add_labeled_term(
        &mut self,
        function: MembershipFunction,
        label: Option<&str>,
    ) -> Result<(), FuzzyError> {
        let duplicate = |key: &str| self.terms.iter().any(|term| term.answers_to(key));
        if duplicate(function.name()) || label.map_or(false, duplicate) {
            return Err(FuzzyError::DuplicateTerm {
                variable: self.name.clone(),
                term: function.name.clone(),
            });
        }
        if function.universe() != self.universe() {
            return Err(FuzzyError::InvalidShape);
        }

        let label = match label {
            Some(label) => Some(name(label)?),
            None => None,
        };
        self.terms
            .push(Term { label, function })
            .map_err(|_| FuzzyError::CapacityExceeded)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub(crate) fn key(&self) -> &Name {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Границы области определения
    pub fn universe(&self) -> (f32, f32) {
        (self.universe_min, self.universe_max)
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Проверка принадлежности значения области определения
    pub fn contains(&self, x: f32) -> bool {
        x.is_finite() && x >= self.universe_min && x <= self.universe_max
    }

    /// Индекс терма по имени или псевдониму
    pub fn term_index(&self, key: &str) -> Option<usize> {
        self.terms.iter().position(|term| term.answers_to(key))
    }

    /// Степень принадлежности x терму `term`
    pub fn degree_of(&self, term: &str, x: f32) -> Result<f32, FuzzyError> {
        match self.term_index(term) {
            Some(index) => Ok(self.terms[index].function.degree_at(x)),
            None => Err(FuzzyError::UnknownTerm {
                variable: self.name.clone(),
                term: truncated(term),
            }),
        }
    }

    /// Фаззификация: степени принадлежности x всем термам
    pub fn fuzzify(&self, x: f32) -> Vec<(&str, f32), MAX_TERMS> {
        self.terms
            .iter()
            .map(|term| (term.name(), term.function.degree_at(x)))
            .collect()
    }

    /// Точки дискретизации области определения
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        let count = sample_count(self.universe_min, self.universe_max, self.resolution);
        (0..count).map(move |i| self.universe_min + i as f32 * self.resolution)
    }
}

/// Набор переменных одной стороны (входы или выходы)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    variables: Vec<LinguisticVariable, MAX_VARIABLES>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавление переменной, имена уникальны в пределах набора
    pub fn insert(&mut self, variable: LinguisticVariable) -> Result<(), FuzzyError> {
        if self.get(variable.name()).is_some() {
            return Err(FuzzyError::DuplicateVariable(variable.name.clone()));
        }
        self.variables
            .push(variable)
            .map_err(|_| FuzzyError::CapacityExceeded)
    }

    pub fn get(&self, variable: &str) -> Option<&LinguisticVariable> {
        self.variables.iter().find(|v| v.name() == variable)
    }

    pub fn position(&self, variable: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name() == variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinguisticVariable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn road() -> LinguisticVariable {
        let universe = (0.0, 10.0);
        let mut road = LinguisticVariable::antecedent("road", 0.0, 10.0).unwrap();
        road.add_labeled_term(
            MembershipFunction::triangle("dry", universe, 0.0, 0.0, 4.0).unwrap(),
            Some("сухо"),
        )
        .unwrap();
        road.add_labeled_term(
            MembershipFunction::triangle("wet", universe, 4.0, 7.0, 10.0).unwrap(),
            Some("мокро"),
        )
        .unwrap();
        road.add_term(MembershipFunction::triangle("slippery", universe, 6.0, 10.0, 10.0).unwrap())
            .unwrap();
        road
    }

    #[test]
    fn test_degree_of() {
        let road = road();
        assert_eq!(road.degree_of("wet", 7.0), Ok(1.0));
        assert_eq!(road.degree_of("мокро", 7.0), Ok(1.0));
        assert_eq!(road.degree_of("dry", 7.0), Ok(0.0));
        assert_eq!(
            road.degree_of("icy", 7.0),
            Err(FuzzyError::UnknownTerm {
                variable: name("road").unwrap(),
                term: name("icy").unwrap(),
            })
        );
    }

    #[test]
    fn test_unknown_long_term_is_named() {
        let road = road();
        // 43 байта не помещаются в имя: остается начало по границе символа
        assert_eq!(
            road.degree_of("сверхскользкий гололед", 7.0),
            Err(FuzzyError::UnknownTerm {
                variable: name("road").unwrap(),
                term: name("сверхскользк").unwrap(),
            })
        );
    }

    #[test]
    fn test_duplicate_term() {
        let mut road = road();
        let again = MembershipFunction::triangle("wet", (0.0, 10.0), 1.0, 2.0, 3.0).unwrap();
        assert!(matches!(
            road.add_term(again),
            Err(FuzzyError::DuplicateTerm { .. })
        ));

        // Псевдоним, совпадающий с уже занятой меткой
        let alias = MembershipFunction::triangle("damp", (0.0, 10.0), 1.0, 2.0, 3.0).unwrap();
        assert!(matches!(
            road.add_labeled_term(alias, Some("сухо")),
            Err(FuzzyError::DuplicateTerm { .. })
        ));
    }

    #[test]
    fn test_foreign_universe_rejected() {
        let mut road = road();
        let foreign = MembershipFunction::triangle("mud", (0.0, 100.0), 1.0, 2.0, 3.0).unwrap();
        assert_eq!(road.add_term(foreign), Err(FuzzyError::InvalidShape));
    }

    #[test]
    fn test_fuzzify() {
        let road = road();
        let degrees = road.fuzzify(7.0);
        assert_eq!(degrees.len(), 3);
        assert_eq!(degrees[0], ("dry", 0.0));
        assert_eq!(degrees[1], ("wet", 1.0));
        assert!((degrees[2].1 - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_samples_and_bounds() {
        let road = road();
        let samples: std::vec::Vec<f32> = road.samples().collect();
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[10], 10.0);
        assert!(road.contains(0.0));
        assert!(road.contains(10.0));
        assert!(!road.contains(10.01));
        assert!(!road.contains(f32::NAN));

        let fine = road.with_resolution(0.5).unwrap();
        assert_eq!(fine.samples().count(), 21);
    }

    #[test]
    fn test_variable_set() {
        let mut set = VariableSet::new();
        set.insert(road()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get("road").is_some());
        assert_eq!(
            set.insert(road()),
            Err(FuzzyError::DuplicateVariable(name("road").unwrap()))
        );
    }
}
