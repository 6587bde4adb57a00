//! Записи правил

use heapless::Vec;

use super::{GraphRuleStore, StoreError};
use crate::fuzzy::{name, Name, MAX_RULES};

/// Максимум условий (и действий) в одной записи
pub const MAX_FACTS: usize = 4;

/// Пара (имя переменной, значение терма)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub name: Name,
    pub value: Name,
}

impl Fact {
    pub fn new(variable: &str, value: &str) -> Result<Self, StoreError> {
        Ok(Self {
            name: name(variable).map_err(|_| StoreError::CapacityExceeded)?,
            value: name(value).map_err(|_| StoreError::CapacityExceeded)?,
        })
    }
}

/// Правило в том виде, в каком оно хранится и загружается
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    pub id: Name,
    pub conditions: Vec<Fact, MAX_FACTS>,
    pub actions: Vec<Fact, MAX_FACTS>,
}

impl RuleRecord {
    pub fn new(id: &str) -> Result<Self, StoreError> {
        Ok(Self {
            id: name(id).map_err(|_| StoreError::CapacityExceeded)?,
            conditions: Vec::new(),
            actions: Vec::new(),
        })
    }

    pub fn with_condition(mut self, variable: &str, value: &str) -> Result<Self, StoreError> {
        self.conditions
            .push(Fact::new(variable, value)?)
            .map_err(|_| StoreError::CapacityExceeded)?;
        Ok(self)
    }

    pub fn with_action(mut self, variable: &str, value: &str) -> Result<Self, StoreError> {
        self.actions
            .push(Fact::new(variable, value)?)
            .map_err(|_| StoreError::CapacityExceeded)?;
        Ok(self)
    }

    pub fn from_spec(spec: &RuleSpec) -> Result<Self, StoreError> {
        let mut record = Self::new(spec.id)?;
        for (variable, value) in spec.conditions {
            record = record.with_condition(variable, value)?;
        }
        for (variable, value) in spec.actions {
            record = record.with_action(variable, value)?;
        }
        Ok(record)
    }
}

/// Загруженная база правил
pub type RuleBook = Vec<RuleRecord, MAX_RULES>;

/// Статическое описание правила
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    pub id: &'static str,
    pub conditions: &'static [(&'static str, &'static str)],
    pub actions: &'static [(&'static str, &'static str)],
}

/// Базовые правила управления скоростью
pub const DEFAULT_RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "R1",
        conditions: &[("road", "скользко"), ("obstacle", "близко")],
        actions: &[("speed", "замедлить")],
    },
    RuleSpec {
        id: "R2",
        conditions: &[("weather", "дождь"), ("road", "мокро")],
        actions: &[("speed", "замедлить")],
    },
    RuleSpec {
        id: "R3",
        conditions: &[("road", "сухо"), ("weather", "ясно"), ("obstacle", "далеко")],
        actions: &[("speed", "ускорить")],
    },
    RuleSpec {
        id: "R4",
        conditions: &[("obstacle", "близко")],
        actions: &[("speed", "замедлить")],
    },
    RuleSpec {
        id: "R5",
        conditions: &[("road", "мокро")],
        actions: &[("speed", "ровно")],
    },
];

/// Заполнение хранилища: очистка и запись правил
pub fn seed(store: &mut GraphRuleStore, rules: &[RuleSpec]) -> Result<(), StoreError> {
    let mut session = store.session();
    session.clear();
    for spec in rules {
        let record = RuleRecord::from_spec(spec)?;
        session.create_rule(&record)?;
    }
    info!("База знаний создана, правил: {}", rules.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_spec() {
        let record = RuleRecord::from_spec(&DEFAULT_RULES[2]).unwrap();
        assert_eq!(record.id.as_str(), "R3");
        assert_eq!(record.conditions.len(), 3);
        assert_eq!(record.conditions[1], Fact::new("weather", "ясно").unwrap());
        assert_eq!(record.actions[0], Fact::new("speed", "ускорить").unwrap());
    }

    #[test]
    fn test_fact_capacity() {
        let mut record = RuleRecord::new("R9").unwrap();
        for _ in 0..MAX_FACTS {
            record = record.with_condition("road", "мокро").unwrap();
        }
        assert_eq!(
            record.with_condition("road", "мокро"),
            Err(StoreError::CapacityExceeded)
        );
    }
}
