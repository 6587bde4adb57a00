//! Графовое хранилище правил в памяти
//!
//! Схема повторяет исходную графовую базу: узлы Rule, Condition и Action,
//! связи HAS_CONDITION и HAS_ACTION. Доступ - только через сессию, которая
//! держит хранилище на время операции и закрывается при выходе из области
//! видимости на любом пути, включая ошибку.

use core::fmt;

use heapless::Vec;

use super::{Fact, RuleBook, RuleRecord, RuleSource};
use crate::fuzzy::{Name, MAX_RULES};

/// Максимум узлов в хранилище
pub const MAX_STORE_NODES: usize = 64;
/// Максимум связей в хранилище
pub const MAX_STORE_EDGES: usize = 64;

/// Ошибки хранилища
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Превышена емкость хранилища или буфера
    CapacityExceeded,
    /// Правило с таким идентификатором уже записано
    DuplicateRule(Name),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::CapacityExceeded => write!(f, "rule store capacity exceeded"),
            StoreError::DuplicateRule(id) => write!(f, "rule '{}' already stored", id),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StoreError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            StoreError::CapacityExceeded => defmt::write!(fmt, "Store: capacity exceeded"),
            StoreError::DuplicateRule(id) => {
                defmt::write!(fmt, "Store: duplicate rule {}", id.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NodeData {
    Rule(Name),
    Condition(Fact),
    Action(Fact),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    HasCondition,
    HasAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    from: u16,
    to: u16,
    relation: Relation,
}

/// Хранилище правил
#[derive(Debug, Default)]
pub struct GraphRuleStore {
    nodes: Vec<NodeData, MAX_STORE_NODES>,
    edges: Vec<Edge, MAX_STORE_EDGES>,
    sessions_opened: u32,
    sessions_closed: u32,
}

impl GraphRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Открытие сессии; хранилище занято, пока сессия жива
    pub fn session(&mut self) -> Session<'_> {
        self.sessions_opened += 1;
        trace!("Сессия базы знаний открыта");
        Session { store: self }
    }

    /// Количество незакрытых сессий
    pub fn open_sessions(&self) -> u32 {
        self.sessions_opened - self.sessions_closed
    }

    /// Сколько сессий было открыто за все время
    pub fn sessions_opened(&self) -> u32 {
        self.sessions_opened
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn add_node(&mut self, node: NodeData) -> Result<u16, StoreError> {
        let index = self.nodes.len() as u16;
        self.nodes
            .push(node)
            .map_err(|_| StoreError::CapacityExceeded)?;
        Ok(index)
    }

    fn link(&mut self, from: u16, node: NodeData, relation: Relation) -> Result<(), StoreError> {
        let to = self.add_node(node)?;
        self.edges
            .push(Edge { from, to, relation })
            .map_err(|_| StoreError::CapacityExceeded)
    }

    fn write_rule(&mut self, record: &RuleRecord) -> Result<(), StoreError> {
        let rule = self.add_node(NodeData::Rule(record.id.clone()))?;
        for condition in &record.conditions {
            self.link(rule, NodeData::Condition(condition.clone()), Relation::HasCondition)?;
        }
        for action in &record.actions {
            self.link(rule, NodeData::Action(action.clone()), Relation::HasAction)?;
        }
        Ok(())
    }

    fn contains_rule(&self, id: &str) -> bool {
        self.nodes
            .iter()
            .any(|node| matches!(node, NodeData::Rule(known) if known.as_str() == id))
    }

    /// Факты, связанные с узлом правила отношением `relation`, в порядке записи
    fn facts(&self, rule: u16, relation: Relation) -> impl Iterator<Item = &Fact> {
        self.edges
            .iter()
            .filter(move |edge| edge.from == rule && edge.relation == relation)
            .filter_map(move |edge| match self.nodes.get(edge.to as usize) {
                Some(NodeData::Condition(fact)) | Some(NodeData::Action(fact)) => Some(fact),
                _ => None,
            })
    }
}

/// Сессия работы с хранилищем
pub struct Session<'a> {
    store: &'a mut GraphRuleStore,
}

impl Session<'_> {
    /// Удаление всех узлов и связей
    pub fn clear(&mut self) {
        self.store.nodes.clear();
        self.store.edges.clear();
        debug!("База знаний очищена");
    }

    /// Запись правила одной транзакцией
    ///
    /// При ошибке все узлы и связи, созданные этим вызовом, удаляются.
    /// Правил не больше, чем помещается в [`RuleBook`].
    pub fn create_rule(&mut self, record: &RuleRecord) -> Result<(), StoreError> {
        if self.store.contains_rule(&record.id) {
            return Err(StoreError::DuplicateRule(record.id.clone()));
        }
        if self.rule_count() >= MAX_RULES {
            warn!("Правило {} не записано: база правил заполнена", record.id.as_str());
            return Err(StoreError::CapacityExceeded);
        }

        let nodes = self.store.nodes.len();
        let edges = self.store.edges.len();
        let result = self.store.write_rule(record);
        if result.is_err() {
            self.store.nodes.truncate(nodes);
            self.store.edges.truncate(edges);
            warn!("Правило {} не записано, транзакция отменена", record.id.as_str());
        }
        result
    }

    /// Загрузка правил: каждое правило вместе с условиями и действиями
    ///
    /// Правила без условий или без действий не возвращаются.
    pub fn load_rules(&self) -> Result<RuleBook, StoreError> {
        let store = &*self.store;
        let mut book = RuleBook::new();

        for (index, node) in store.nodes.iter().enumerate() {
            let id = match node {
                NodeData::Rule(id) => id,
                _ => continue,
            };
            let index = index as u16;

            let mut record = RuleRecord {
                id: id.clone(),
                conditions: Vec::new(),
                actions: Vec::new(),
            };
            for fact in store.facts(index, Relation::HasCondition) {
                record
                    .conditions
                    .push(fact.clone())
                    .map_err(|_| StoreError::CapacityExceeded)?;
            }
            for fact in store.facts(index, Relation::HasAction) {
                record
                    .actions
                    .push(fact.clone())
                    .map_err(|_| StoreError::CapacityExceeded)?;
            }

            if record.conditions.is_empty() || record.actions.is_empty() {
                trace!("Правило {} неполное, пропущено", id.as_str());
                continue;
            }
            book.push(record).map_err(|_| StoreError::CapacityExceeded)?;
        }

        Ok(book)
    }

    /// Количество правил в хранилище
    pub fn rule_count(&self) -> usize {
        self.store
            .nodes
            .iter()
            .filter(|node| matches!(node, NodeData::Rule(_)))
            .count()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.store.sessions_closed += 1;
        trace!("Сессия базы знаний закрыта");
    }
}

impl RuleSource for GraphRuleStore {
    fn load_rules(&mut self) -> Result<RuleBook, StoreError> {
        let session = self.session();
        session.load_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{seed, DEFAULT_RULES};

    #[test]
    fn test_seed_and_load() {
        let mut store = GraphRuleStore::new();
        seed(&mut store, DEFAULT_RULES).unwrap();
        // R1: 1 + 2 + 1, R2: 4, R3: 5, R4: 3, R5: 3
        assert_eq!(store.node_count(), 19);
        assert_eq!(store.edge_count(), 14);

        let book = store.load_rules().unwrap();
        assert_eq!(book.len(), 5);
        let ids: std::vec::Vec<&str> = book.iter().map(|rule| rule.id.as_str()).collect();
        assert_eq!(ids, ["R1", "R2", "R3", "R4", "R5"]);
        for (record, spec) in book.iter().zip(DEFAULT_RULES) {
            assert_eq!(record, &RuleRecord::from_spec(spec).unwrap());
        }
        assert_eq!(store.open_sessions(), 0);
        assert_eq!(store.sessions_opened(), 2);
    }

    #[test]
    fn test_reseed_clears_previous_rules() {
        let mut store = GraphRuleStore::new();
        seed(&mut store, DEFAULT_RULES).unwrap();
        seed(&mut store, &DEFAULT_RULES[..2]).unwrap();
        assert_eq!(store.load_rules().unwrap().len(), 2);
    }

    #[test]
    fn test_incomplete_rules_skipped() {
        let mut store = GraphRuleStore::new();
        {
            let mut session = store.session();
            let no_action = RuleRecord::new("A").unwrap().with_condition("road", "мокро").unwrap();
            let no_condition = RuleRecord::new("B").unwrap().with_action("speed", "ровно").unwrap();
            let full = RuleRecord::from_spec(&DEFAULT_RULES[4]).unwrap();
            session.create_rule(&no_action).unwrap();
            session.create_rule(&no_condition).unwrap();
            session.create_rule(&full).unwrap();
            assert_eq!(session.rule_count(), 3);
        }
        let book = store.load_rules().unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book[0].id.as_str(), "R5");
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let mut store = GraphRuleStore::new();
        seed(&mut store, DEFAULT_RULES).unwrap();
        let mut session = store.session();
        let again = RuleRecord::from_spec(&DEFAULT_RULES[0]).unwrap();
        assert!(matches!(
            session.create_rule(&again),
            Err(StoreError::DuplicateRule(_))
        ));
    }

    #[test]
    fn test_failed_write_is_rolled_back() {
        let mut store = GraphRuleStore::new();
        let mut written = 0;
        {
            let mut session = store.session();
            // 5 узлов и 4 связи на правило: 13-е правило не помещается
            for i in 0..20 {
                let mut id = Name::new();
                core::fmt::Write::write_fmt(&mut id, format_args!("R{}", i)).unwrap();
                let record = RuleRecord::new(&id)
                    .unwrap()
                    .with_condition("road", "мокро")
                    .unwrap()
                    .with_condition("weather", "дождь")
                    .unwrap()
                    .with_condition("obstacle", "близко")
                    .unwrap()
                    .with_action("speed", "замедлить")
                    .unwrap();
                match session.create_rule(&record) {
                    Ok(()) => written += 1,
                    Err(e) => {
                        assert_eq!(e, StoreError::CapacityExceeded);
                        break;
                    }
                }
            }
        }
        assert_eq!(written, 12);
        assert_eq!(store.node_count(), 60);
        assert_eq!(store.edge_count(), 48);
        assert_eq!(store.load_rules().unwrap().len(), 12);
        assert_eq!(store.open_sessions(), 0);
    }

    #[test]
    fn test_rule_limit_matches_rule_book() {
        let mut store = GraphRuleStore::new();
        let mut written = 0;
        {
            let mut session = store.session();
            for i in 0..MAX_RULES + 1 {
                let mut id = Name::new();
                core::fmt::Write::write_fmt(&mut id, format_args!("W{}", i)).unwrap();
                let record = RuleRecord::new(&id)
                    .unwrap()
                    .with_condition("road", "мокро")
                    .unwrap()
                    .with_action("speed", "ровно")
                    .unwrap();
                match session.create_rule(&record) {
                    Ok(()) => written += 1,
                    Err(e) => assert_eq!(e, StoreError::CapacityExceeded),
                }
            }
            assert_eq!(session.rule_count(), MAX_RULES);
        }
        assert_eq!(written, MAX_RULES);
        // 17-е правило не оставило узлов: 3 узла и 2 связи на правило
        assert_eq!(store.node_count(), 3 * MAX_RULES);
        assert_eq!(store.edge_count(), 2 * MAX_RULES);
        assert_eq!(store.load_rules().unwrap().len(), MAX_RULES);
        assert_eq!(store.open_sessions(), 0);
    }
}
