//! Каталог лингвистических переменных
//!
//! Области определения и параметры функций принадлежности для входов
//! (погода, дорога, препятствие) и выхода (изменение скорости). Каждый терм
//! имеет псевдоним - метку, под которой он хранится в базе знаний.

use crate::fuzzy::{
    FuzzyError, LinguisticVariable, MembershipFunction, VariableKind, VariableSet,
};
use crate::math::constrain;

/// Форма функции принадлежности
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// (a, b, c)
    Triangle(f32, f32, f32),
    /// (a, b, c, d)
    Trapezoid(f32, f32, f32, f32),
}

/// Описание терма
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub shape: Shape,
}

impl TermSpec {
    pub const fn triangle(name: &'static str, label: &'static str, a: f32, b: f32, c: f32) -> Self {
        Self {
            name,
            label,
            shape: Shape::Triangle(a, b, c),
        }
    }

    pub const fn trapezoid(
        name: &'static str,
        label: &'static str,
        a: f32,
        b: f32,
        c: f32,
        d: f32,
    ) -> Self {
        Self {
            name,
            label,
            shape: Shape::Trapezoid(a, b, c, d),
        }
    }

    fn build(&self, universe: (f32, f32)) -> Result<MembershipFunction, FuzzyError> {
        match self.shape {
            Shape::Triangle(a, b, c) => MembershipFunction::triangle(self.name, universe, a, b, c),
            Shape::Trapezoid(a, b, c, d) => {
                MembershipFunction::trapezoid(self.name, universe, a, b, c, d)
            }
        }
    }
}

/// Описание переменной
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableSpec {
    pub name: &'static str,
    pub kind: VariableKind,
    pub min: f32,
    pub max: f32,
    pub terms: &'static [TermSpec],
}

impl VariableSpec {
    /// Построение переменной со всеми термами
    pub fn build(&self) -> Result<LinguisticVariable, FuzzyError> {
        let mut variable = LinguisticVariable::new(self.name, self.kind, self.min, self.max)?;
        for term in self.terms {
            variable.add_labeled_term(term.build((self.min, self.max))?, Some(term.label))?;
        }
        Ok(variable)
    }

    /// Ограничение значения областью определения
    pub fn clamp(&self, value: f32) -> f32 {
        constrain(value, self.min, self.max)
    }
}

/// Погода: 0 - ясно, 10 - ливень
pub mod weather {
    use super::*;

    pub const NAME: &str = "weather";
    pub const CLEAR: TermSpec = TermSpec::triangle("clear", "ясно", 0.0, 0.0, 4.0);
    pub const RAIN: TermSpec = TermSpec::triangle("rain", "дождь", 4.0, 7.0, 10.0);

    pub const VARIABLE: VariableSpec = VariableSpec {
        name: NAME,
        kind: VariableKind::Antecedent,
        min: 0.0,
        max: 10.0,
        terms: &[CLEAR, RAIN],
    };
}

/// Состояние дороги: 0 - сухо, 10 - гололед
pub mod road {
    use super::*;

    pub const NAME: &str = "road";
    pub const DRY: TermSpec = TermSpec::triangle("dry", "сухо", 0.0, 0.0, 4.0);
    pub const WET: TermSpec = TermSpec::triangle("wet", "мокро", 4.0, 7.0, 10.0);
    pub const SLIPPERY: TermSpec = TermSpec::triangle("slippery", "скользко", 6.0, 10.0, 10.0);

    pub const VARIABLE: VariableSpec = VariableSpec {
        name: NAME,
        kind: VariableKind::Antecedent,
        min: 0.0,
        max: 10.0,
        terms: &[DRY, WET, SLIPPERY],
    };
}

/// Расстояние до препятствия (метры)
pub mod obstacle {
    use super::*;

    pub const NAME: &str = "obstacle";
    pub const FAR: TermSpec = TermSpec::triangle("far", "далеко", 50.0, 100.0, 100.0);
    pub const CLOSE: TermSpec = TermSpec::triangle("close", "близко", 0.0, 0.0, 30.0);

    pub const VARIABLE: VariableSpec = VariableSpec {
        name: NAME,
        kind: VariableKind::Antecedent,
        min: 0.0,
        max: 100.0,
        terms: &[FAR, CLOSE],
    };
}

/// Изменение скорости за шаг (км/ч)
pub mod speed {
    use super::*;

    pub const NAME: &str = "speed";
    pub const DECREASE: TermSpec = TermSpec::triangle("decrease", "замедлить", -10.0, -10.0, 0.0);
    pub const STABLE: TermSpec = TermSpec::triangle("stable", "ровно", -2.0, 0.0, 2.0);
    pub const INCREASE: TermSpec = TermSpec::triangle("increase", "ускорить", 0.0, 10.0, 10.0);

    pub const VARIABLE: VariableSpec = VariableSpec {
        name: NAME,
        kind: VariableKind::Consequent,
        min: -10.0,
        max: 10.0,
        terms: &[DECREASE, STABLE, INCREASE],
    };
}

/// Набор переменных, из которого строится система
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Catalog {
    pub variables: &'static [VariableSpec],
}

/// Каталог регулятора скорости
pub const DEFAULT: Catalog = Catalog {
    variables: &[
        weather::VARIABLE,
        road::VARIABLE,
        obstacle::VARIABLE,
        speed::VARIABLE,
    ],
};

impl Catalog {
    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|spec| spec.name == name)
    }

    /// Построение наборов входных и выходных переменных
    pub fn build_variables(&self) -> Result<(VariableSet, VariableSet), FuzzyError> {
        let mut antecedents = VariableSet::new();
        let mut consequents = VariableSet::new();
        for spec in self.variables {
            let variable = spec.build()?;
            match spec.kind {
                VariableKind::Antecedent => antecedents.insert(variable)?,
                VariableKind::Consequent => consequents.insert(variable)?,
            }
        }
        Ok((antecedents, consequents))
    }
}
