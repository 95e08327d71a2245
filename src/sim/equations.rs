//! Equation table loading and per-level selection

use std::collections::HashSet;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Deserialize;

use crate::consts::LEVEL_COUNT;
use crate::error::{Error, Result};

/// One row of the equation table
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    /// Level 1..=LEVEL_COUNT
    pub level: u8,
    /// Text shown on the target
    pub expression: String,
    /// Expected answer
    pub answer: f64,
}

impl Equation {
    pub fn new(level: u8, expression: &str, answer: f64) -> Self {
        Self {
            level,
            expression: expression.to_string(),
            answer,
        }
    }
}

/// Raw table row; every field is optional so bad rows can be skipped
#[derive(Debug, Deserialize)]
struct Row {
    level: Option<String>,
    equation: Option<String>,
    answer: Option<String>,
}

impl Row {
    fn into_equation(self) -> Option<Equation> {
        let non_empty = |field: Option<String>| field.filter(|s| !s.is_empty());
        let level = non_empty(self.level)?
            .parse::<u8>()
            .ok()
            .filter(|l| (1..=LEVEL_COUNT).contains(l))?;
        let expression = non_empty(self.equation)?;
        let answer = non_empty(self.answer)?
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())?;
        Some(Equation {
            level,
            expression,
            answer,
        })
    }
}

/// All equations available to a run (immutable once loaded)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EquationBank {
    equations: Vec<Equation>,
}

impl EquationBank {
    pub fn new(equations: Vec<Equation>) -> Self {
        Self { equations }
    }

    /// Small built-in table used when the data file is unavailable
    pub fn fallback() -> Self {
        Self::new(vec![
            Equation::new(1, "2+3", 5.0),
            Equation::new(1, "4*3", 12.0),
            Equation::new(1, "10-5", 5.0),
            Equation::new(2, "3x-4=2", 2.0),
            Equation::new(2, "2x+5=11", 3.0),
            Equation::new(3, "sqrt(16)", 4.0),
            Equation::new(3, "654/2", 327.0),
        ])
    }

    /// Parse a `level,equation,answer` table with a header row.
    ///
    /// Columns are found by header name in any order. Rows with a missing or
    /// empty field, a level outside 1..=LEVEL_COUNT or a non-finite answer
    /// are dropped.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut equations = Vec::new();
        let mut dropped = 0usize;
        for row in reader.deserialize::<Row>() {
            match row.ok().and_then(Row::into_equation) {
                Some(equation) => equations.push(equation),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            log::debug!("Dropped {} malformed equation rows", dropped);
        }
        if equations.is_empty() {
            return Err(Error::NoEquations);
        }
        Ok(Self::new(equations))
    }

    /// Parse a table, falling back to the built-in list on failure
    pub fn from_csv_or_fallback(text: &str) -> Self {
        match Self::from_csv(text) {
            Ok(bank) => {
                log::info!("Equations loaded: {}", bank.len());
                bank
            }
            Err(e) => {
                log::warn!("{e}; using built-in equations");
                Self::fallback()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equation> {
        self.equations.iter()
    }

    /// Equations belonging to a level, in table order
    pub fn for_level(&self, level: u8) -> impl Iterator<Item = &Equation> {
        self.equations.iter().filter(move |eq| eq.level == level)
    }

    /// Pick a random equation for `level` that is not in `used`, recording
    /// it. Once every equation of the level was used the set starts over.
    pub fn select(&self, level: u8, used: &mut HashSet<String>, rng: &mut Pcg32) -> Option<&Equation> {
        let available: Vec<&Equation> = self
            .for_level(level)
            .filter(|eq| !used.contains(&eq.expression))
            .collect();

        let pool = if available.is_empty() {
            used.clear();
            self.for_level(level).collect()
        } else {
            available
        };
        if pool.is_empty() {
            return None;
        }

        let selected = pool[rng.random_range(0..pool.len())];
        used.insert(selected.expression.clone());
        Some(selected)
    }
}
