//! Построение нечеткой системы из записей базы знаний

use core::fmt;

use heapless::Vec;

use super::{Fact, RuleRecord, RuleSource, StoreError, MAX_FACTS};
use crate::catalog::Catalog;
use crate::fuzzy::{
    Antecedent, ControlSystem, FuzzyError, Rule, TermRef, VariableSet, MAX_RULES,
};

/// Ошибки загрузки базы знаний
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeError {
    Store(StoreError),
    Build(FuzzyError),
}

impl From<StoreError> for KnowledgeError {
    fn from(error: StoreError) -> Self {
        KnowledgeError::Store(error)
    }
}

impl From<FuzzyError> for KnowledgeError {
    fn from(error: FuzzyError) -> Self {
        KnowledgeError::Build(error)
    }
}

impl fmt::Display for KnowledgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnowledgeError::Store(e) => write!(f, "rule store: {}", e),
            KnowledgeError::Build(e) => write!(f, "rule base: {}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KnowledgeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            KnowledgeError::Store(e) => defmt::write!(fmt, "Knowledge: {}", e),
            KnowledgeError::Build(e) => defmt::write!(fmt, "Knowledge: {}", e),
        }
    }
}

/// Построение системы по каталогу и записям правил
///
/// Условия одного правила объединяются через И, каждое действие становится
/// заключением. Значения термов сопоставляются по имени или метке каталога.
/// Любая неизвестная ссылка отклоняет всю базу правил.
pub fn build_engine(catalog: &Catalog, records: &[RuleRecord]) -> Result<ControlSystem, FuzzyError> {
    let (antecedents, consequents) = catalog.build_variables()?;

    let mut rules: Vec<Rule, MAX_RULES> = Vec::new();
    for record in records {
        let mut conditions: Vec<TermRef, MAX_FACTS> = Vec::new();
        for fact in &record.conditions {
            conditions
                .push(resolve(&antecedents, fact)?)
                .map_err(|_| FuzzyError::CapacityExceeded)?;
        }
        let mut actions: Vec<TermRef, MAX_FACTS> = Vec::new();
        for fact in &record.actions {
            actions
                .push(resolve(&consequents, fact)?)
                .map_err(|_| FuzzyError::CapacityExceeded)?;
        }

        let rule = Rule::new(&record.id, Antecedent::all(conditions)?, &actions)?;
        debug!(
            "Правило {}: условий {}, действий {}",
            rule.id(),
            record.conditions.len(),
            record.actions.len()
        );
        rules.push(rule).map_err(|_| FuzzyError::CapacityExceeded)?;
    }

    ControlSystem::new(antecedents, consequents, rules)
}

/// Загрузка правил из источника и построение новой системы
pub fn reload<S: RuleSource>(source: &mut S, catalog: &Catalog) -> Result<ControlSystem, KnowledgeError> {
    let book = source.load_rules()?;
    info!("Загружено правил из базы знаний: {}", book.len());
    for record in &book {
        debug!("Правило {}:", record.id.as_str());
        for fact in &record.conditions {
            debug!("  если {} = {}", fact.name.as_str(), fact.value.as_str());
        }
        for fact in &record.actions {
            debug!("  то {} = {}", fact.name.as_str(), fact.value.as_str());
        }
    }
    let engine = build_engine(catalog, &book)?;
    Ok(engine)
}

/// Ссылка на терм каталога с каноническим именем терма
fn resolve(variables: &VariableSet, fact: &Fact) -> Result<TermRef, FuzzyError> {
    let unknown = || FuzzyError::UnknownVariableReference {
        variable: fact.name.clone(),
        term: fact.value.clone(),
    };
    let variable = variables.get(&fact.name).ok_or_else(unknown)?;
    let index = variable.term_index(&fact.value).ok_or_else(unknown)?;
    TermRef::new(variable.name(), variable.terms()[index].name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT;
    use crate::fuzzy::{name, Inputs};
    use crate::knowledge::{seed, GraphRuleStore, RuleBook, StoreError, DEFAULT_RULES};

    /// Источник, у которого запрос падает после открытия сессии
    struct FailingSource<'a>(&'a mut GraphRuleStore);

    impl RuleSource for FailingSource<'_> {
        fn load_rules(&mut self) -> Result<RuleBook, StoreError> {
            let session = self.0.session();
            session.load_rules()?;
            Err(StoreError::CapacityExceeded)
        }
    }

    fn engine() -> ControlSystem {
        let mut store = GraphRuleStore::new();
        seed(&mut store, DEFAULT_RULES).unwrap();
        reload(&mut store, &DEFAULT).unwrap()
    }

    fn evaluate(engine: &ControlSystem, weather: f32, road: f32, obstacle: f32) -> Option<f32> {
        let mut inputs = Inputs::new();
        inputs.set("weather", weather).unwrap();
        inputs.set("road", road).unwrap();
        inputs.set("obstacle", obstacle).unwrap();
        engine.evaluate(&inputs).unwrap().get("speed")
    }

    #[test]
    fn test_labels_resolved_to_catalog_terms() {
        let engine = engine();
        assert_eq!(engine.rules().len(), 5);
        let r1 = &engine.rules()[0];
        assert_eq!(r1.id(), "R1");
        let terms: std::vec::Vec<(&str, &str)> = r1
            .antecedent()
            .terms()
            .map(|term| (term.variable(), term.term()))
            .collect();
        assert_eq!(terms, [("road", "slippery"), ("obstacle", "close")]);
        assert_eq!(r1.consequents()[0].term(), "decrease");
    }

    #[test]
    fn test_slippery_road_close_obstacle_slows_down() {
        let speed = evaluate(&engine(), 5.0, 10.0, 0.0).unwrap();
        assert!((-10.0..=-5.0).contains(&speed), "speed = {}", speed);
        assert!((speed - (-7.0)).abs() < 1e-4);
    }

    #[test]
    fn test_clear_dry_far_speeds_up() {
        let speed = evaluate(&engine(), 0.0, 0.0, 100.0).unwrap();
        assert!(speed > 5.0, "speed = {}", speed);
        assert!((speed - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_wet_road_keeps_speed() {
        let speed = evaluate(&engine(), 2.0, 7.0, 40.0).unwrap();
        assert!(speed.abs() < 1e-4, "speed = {}", speed);
    }

    #[test]
    fn test_nothing_fires() {
        assert_eq!(evaluate(&engine(), 5.0, 2.0, 40.0), None);
    }

    #[test]
    fn test_unknown_reference_rejects_rule_base() {
        let mut book = RuleBook::new();
        for spec in DEFAULT_RULES {
            book.push(RuleRecord::from_spec(spec).unwrap()).unwrap();
        }
        let icy = RuleRecord::new("R6")
            .unwrap()
            .with_condition("road", "лед")
            .unwrap()
            .with_action("speed", "замедлить")
            .unwrap();
        book.push(icy).unwrap();

        assert_eq!(
            build_engine(&DEFAULT, &book),
            Err(FuzzyError::UnknownVariableReference {
                variable: name("road").unwrap(),
                term: name("лед").unwrap(),
            })
        );

        // Переменная-вход в роли выхода - тоже неизвестная ссылка
        let swapped = RuleRecord::new("R7")
            .unwrap()
            .with_condition("speed", "ровно")
            .unwrap()
            .with_action("road", "сухо")
            .unwrap();
        assert!(matches!(
            build_engine(&DEFAULT, &[swapped]),
            Err(FuzzyError::UnknownVariableReference { .. })
        ));
    }

    #[test]
    fn test_reload_errors_are_wrapped() {
        let mut store = GraphRuleStore::new();
        {
            let mut session = store.session();
            let record = RuleRecord::new("R1")
                .unwrap()
                .with_condition("visibility", "низкая")
                .unwrap()
                .with_action("speed", "замедлить")
                .unwrap();
            session.create_rule(&record).unwrap();
        }
        assert!(matches!(
            reload(&mut store, &DEFAULT),
            Err(KnowledgeError::Build(FuzzyError::UnknownVariableReference { .. }))
        ));
        assert_eq!(store.open_sessions(), 0);
    }

    #[test]
    fn test_empty_rule_base_never_fires() {
        let mut store = GraphRuleStore::new();
        seed(&mut store, &[]).unwrap();
        let engine = reload(&mut store, &DEFAULT).unwrap();
        assert!(engine.rules().is_empty());
        assert_eq!(evaluate(&engine, 0.0, 0.0, 100.0), None);
    }

    #[test]
    fn test_store_failure_releases_session() {
        let mut store = GraphRuleStore::new();
        seed(&mut store, DEFAULT_RULES).unwrap();

        let result = reload(&mut FailingSource(&mut store), &DEFAULT);
        assert_eq!(result, Err(KnowledgeError::Store(StoreError::CapacityExceeded)));
        assert_eq!(store.open_sessions(), 0);

        // Хранилище после сбоя по-прежнему отдает правила
        assert_eq!(reload(&mut store, &DEFAULT).unwrap().rules().len(), 5);
    }
}
