//! База знаний: хранение правил и построение нечеткой системы
//!
//! Правила хранятся в виде графа (правило -> условия, правило -> действия),
//! наружу выдаются плоские записи [`RuleRecord`]. Построитель зависит только
//! от трейта [`RuleSource`].

mod builder;
mod graph;
mod record;

pub use builder::{build_engine, reload, KnowledgeError};
pub use graph::{GraphRuleStore, Session, StoreError, MAX_STORE_EDGES, MAX_STORE_NODES};
pub use record::{seed, Fact, RuleBook, RuleRecord, RuleSpec, DEFAULT_RULES, MAX_FACTS};

/// Источник правил
pub trait RuleSource {
    /// Загрузка всех правил в порядке создания
    fn load_rules(&mut self) -> Result<RuleBook, StoreError>;
}
