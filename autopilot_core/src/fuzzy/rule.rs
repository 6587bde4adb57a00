//! Нечеткие правила

use heapless::Vec;

use super::{name, FuzzyError, Inputs, Name, VariableSet, MAX_CONSEQUENTS, MAX_RULE_NODES};

/// Ссылка на терм переменной: (переменная, терм)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRef {
    variable: Name,
    term: Name,
}

impl TermRef {
    pub fn new(variable: &str, term: &str) -> Result<Self, FuzzyError> {
        Ok(Self {
            variable: name(variable)?,
            term: name(term)?,
        })
    }

    pub fn variable(&self) -> &str {
        self.variable.as_str()
    }

    pub fn term(&self) -> &str {
        self.term.as_str()
    }

    pub(crate) fn unknown(&self) -> FuzzyError {
        FuzzyError::UnknownVariableReference {
            variable: self.variable.clone(),
            term: self.term.clone(),
        }
    }
}

/// Узел дерева посылки. Дочерние узлы - индексы в том же массиве.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Term(TermRef),
    /// И: минимум степеней
    And(u8, u8),
    /// ИЛИ: максимум степеней
    Or(u8, u8),
}

/// Посылка правила в виде дерева без кучи
///
/// Узлы хранятся в массиве фиксированной емкости, корень - последний узел.
#[derive(Debug, Clone, PartialEq)]
pub struct Antecedent {
    nodes: Vec<Node, MAX_RULE_NODES>,
}

impl Antecedent {
    /// Посылка из одного терма
    pub fn term(variable: &str, term: &str) -> Result<Self, FuzzyError> {
        Ok(Self::leaf(TermRef::new(variable, term)?))
    }

    pub fn leaf(term: TermRef) -> Self {
        let mut nodes = Vec::new();
        // Пустой массив всегда вмещает один узел
        let _ = nodes.push(Node::Term(term));
        Self { nodes }
    }

    /// Конъюнкция всех термов: ((t1 И t2) И t3) ...
    pub fn all<I>(terms: I) -> Result<Self, FuzzyError>
    where
        I: IntoIterator<Item = TermRef>,
    {
        let mut terms = terms.into_iter();
        let mut antecedent = match terms.next() {
            Some(first) => Self::leaf(first),
            None => return Err(FuzzyError::InvalidShape),
        };
        for term in terms {
            antecedent = antecedent.and(Self::leaf(term))?;
        }
        Ok(antecedent)
    }

    pub fn and(self, other: Antecedent) -> Result<Self, FuzzyError> {
        self.combine(other, Node::And)
    }

    pub fn or(self, other: Antecedent) -> Result<Self, FuzzyError> {
        self.combine(other, Node::Or)
    }

    fn combine(mut self, other: Antecedent, join: fn(u8, u8) -> Node) -> Result<Self, FuzzyError> {
        if self.nodes.len() + other.nodes.len() + 1 > MAX_RULE_NODES {
            return Err(FuzzyError::CapacityExceeded);
        }
        let offset = self.nodes.len() as u8;
        let left = offset - 1;
        for node in other.nodes {
            let shifted = match node {
                Node::Term(term) => Node::Term(term),
                Node::And(l, r) => Node::And(l + offset, r + offset),
                Node::Or(l, r) => Node::Or(l + offset, r + offset),
            };
            self.nodes
                .push(shifted)
                .map_err(|_| FuzzyError::CapacityExceeded)?;
        }
        let right = self.nodes.len() as u8 - 1;
        self.nodes
            .push(join(left, right))
            .map_err(|_| FuzzyError::CapacityExceeded)?;
        Ok(self)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Все термы посылки
    pub fn terms(&self) -> impl Iterator<Item = &TermRef> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Term(term) => Some(term),
            _ => None,
        })
    }

    /// Степень истинности посылки
    pub fn strength(&self, variables: &VariableSet, inputs: &Inputs) -> Result<f32, FuzzyError> {
        self.eval(self.nodes.len() - 1, variables, inputs)
    }

    fn eval(&self, index: usize, variables: &VariableSet, inputs: &Inputs) -> Result<f32, FuzzyError> {
        match &self.nodes[index] {
            Node::Term(term) => {
                let variable = variables.get(term.variable()).ok_or_else(|| term.unknown())?;
                let x = inputs
                    .get(term.variable())
                    .ok_or_else(|| FuzzyError::MissingInput(term.variable.clone()))?;
                variable.degree_of(term.term(), x)
            }
            Node::And(left, right) => {
                let left = self.eval(*left as usize, variables, inputs)?;
                let right = self.eval(*right as usize, variables, inputs)?;
                Ok(left.min(right))
            }
            Node::Or(left, right) => {
                let left = self.eval(*left as usize, variables, inputs)?;
                let right = self.eval(*right as usize, variables, inputs)?;
                Ok(left.max(right))
            }
        }
    }
}

/// Правило: ЕСЛИ посылка ТО заключения
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    id: Name,
    antecedent: Antecedent,
    consequents: Vec<TermRef, MAX_CONSEQUENTS>,
}

impl Rule {
    pub fn new(id: &str, antecedent: Antecedent, consequents: &[TermRef]) -> Result<Self, FuzzyError> {
        if consequents.is_empty() {
            return Err(FuzzyError::InvalidShape);
        }
        let mut list = Vec::new();
        for consequent in consequents {
            list.push(consequent.clone())
                .map_err(|_| FuzzyError::CapacityExceeded)?;
        }
        Ok(Self {
            id: name(id)?,
            antecedent,
            consequents: list,
        })
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub(crate) fn id_name(&self) -> &Name {
        &self.id
    }

    pub fn antecedent(&self) -> &Antecedent {
        &self.antecedent
    }

    pub fn consequents(&self) -> &[TermRef] {
        &self.consequents
    }

    /// Сила срабатывания правила в [0, 1]
    ///
    /// Возвращает `MissingInput`, если для переменной из посылки нет значения.
    pub fn fire_strength(&self, variables: &VariableSet, inputs: &Inputs) -> Result<f32, FuzzyError> {
        self.antecedent.strength(variables, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::{LinguisticVariable, MembershipFunction};

    fn variables() -> VariableSet {
        let mut road = LinguisticVariable::antecedent("road", 0.0, 10.0).unwrap();
        road.add_term(MembershipFunction::triangle("wet", (0.0, 10.0), 4.0, 7.0, 10.0).unwrap())
            .unwrap();
        road.add_term(MembershipFunction::triangle("slippery", (0.0, 10.0), 6.0, 10.0, 10.0).unwrap())
            .unwrap();
        let mut obstacle = LinguisticVariable::antecedent("obstacle", 0.0, 100.0).unwrap();
        obstacle
            .add_term(MembershipFunction::triangle("close", (0.0, 100.0), 0.0, 0.0, 30.0).unwrap())
            .unwrap();

        let mut set = VariableSet::new();
        set.insert(road).unwrap();
        set.insert(obstacle).unwrap();
        set
    }

    fn inputs(road: f32, obstacle: f32) -> Inputs {
        let mut inputs = Inputs::new();
        inputs.set("road", road).unwrap();
        inputs.set("obstacle", obstacle).unwrap();
        inputs
    }

    fn slippery_and_close() -> Antecedent {
        Antecedent::term("road", "slippery")
            .unwrap()
            .and(Antecedent::term("obstacle", "close").unwrap())
            .unwrap()
    }

    #[test]
    fn test_and_is_min() {
        let variables = variables();
        let antecedent = slippery_and_close();
        // slippery(7) = 0.25, close(15) = 0.5
        let strength = antecedent.strength(&variables, &inputs(7.0, 15.0)).unwrap();
        assert!((strength - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_or_is_max() {
        let variables = variables();
        let antecedent = Antecedent::term("road", "slippery")
            .unwrap()
            .or(Antecedent::term("obstacle", "close").unwrap())
            .unwrap();
        let strength = antecedent.strength(&variables, &inputs(7.0, 15.0)).unwrap();
        assert!((strength - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_nested_tree() {
        let variables = variables();
        // (slippery И close) ИЛИ wet
        let antecedent = slippery_and_close()
            .or(Antecedent::term("road", "wet").unwrap())
            .unwrap();
        assert_eq!(antecedent.nodes().len(), 5);
        let strength = antecedent.strength(&variables, &inputs(7.0, 15.0)).unwrap();
        assert_eq!(strength, 1.0);

        // wet И (slippery И close): правое поддерево сдвигается в массиве
        let antecedent = Antecedent::term("road", "wet")
            .unwrap()
            .and(slippery_and_close())
            .unwrap();
        let strength = antecedent.strength(&variables, &inputs(7.0, 15.0)).unwrap();
        assert!((strength - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_all_chain() {
        let terms = [
            TermRef::new("road", "slippery").unwrap(),
            TermRef::new("obstacle", "close").unwrap(),
            TermRef::new("road", "wet").unwrap(),
        ];
        let antecedent = Antecedent::all(terms).unwrap();
        assert_eq!(antecedent.terms().count(), 3);
        let strength = antecedent.strength(&variables(), &inputs(10.0, 0.0)).unwrap();
        assert_eq!(strength, 0.0);

        assert_eq!(Antecedent::all(std::iter::empty()), Err(FuzzyError::InvalidShape));
    }

    #[test]
    fn test_strength_in_unit_range() {
        let variables = variables();
        let rule = Rule::new(
            "R1",
            slippery_and_close(),
            &[TermRef::new("speed", "decrease").unwrap()],
        )
        .unwrap();
        for road in 0..=10 {
            for obstacle in (0..=100).step_by(5) {
                let strength = rule
                    .fire_strength(&variables, &inputs(road as f32, obstacle as f32))
                    .unwrap();
                assert!((0.0..=1.0).contains(&strength));
            }
        }
    }

    #[test]
    fn test_missing_input() {
        let variables = variables();
        let mut partial = Inputs::new();
        partial.set("road", 10.0).unwrap();
        let rule = Rule::new(
            "R1",
            slippery_and_close(),
            &[TermRef::new("speed", "decrease").unwrap()],
        )
        .unwrap();
        assert_eq!(
            rule.fire_strength(&variables, &partial),
            Err(FuzzyError::MissingInput(name("obstacle").unwrap()))
        );
    }

    #[test]
    fn test_capacity() {
        let mut antecedent = Antecedent::term("road", "wet").unwrap();
        // 1 + 2 + 2 + 2 = 7 узлов, следующий шаг требует 9
        for _ in 0..3 {
            antecedent = antecedent.and(Antecedent::term("road", "wet").unwrap()).unwrap();
        }
        assert_eq!(
            antecedent.and(Antecedent::term("road", "wet").unwrap()),
            Err(FuzzyError::CapacityExceeded)
        );
        assert_eq!(
            Rule::new("R0", Antecedent::term("road", "wet").unwrap(), &[]),
            Err(FuzzyError::InvalidShape)
        );
    }
}
