//! Epidemiological compartments and population counts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model family a result belongs to.
///
/// The family only changes how the second compartment is labelled: SIR calls
/// it "Infectious" (`I`), the threshold model SAR calls it "Active" (`A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Simple contagion: one contact is enough.
    Sir,
    /// Complex contagion: activation needs a per-node number of exposures.
    Sar,
    /// Discrete-time SIR with vaccination.
    VacSir,
}

impl ModelKind {
    /// Compartments that appear in this model's output, in column order.
    pub fn compartments(self) -> &'static [Compartment] {
        match self {
            ModelKind::Sir | ModelKind::Sar => &[
                Compartment::Susceptible,
                Compartment::Infectious,
                Compartment::Recovered,
            ],
            ModelKind::VacSir => &[
                Compartment::Susceptible,
                Compartment::Infectious,
                Compartment::Vaccinated,
                Compartment::Recovered,
            ],
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Sir => write!(f, "SIR"),
            ModelKind::Sar => write!(f, "SAR"),
            ModelKind::VacSir => write!(f, "VacSIR"),
        }
    }
}

/// A node's epidemiological state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Compartment {
    /// Can still be reached by a transmission.
    #[default]
    Susceptible,
    /// Infectious (SIR) or Active (SAR): transmits to susceptible neighbours.
    Infectious,
    /// Terminal: neither transmits nor can be infected.
    Recovered,
    /// Terminal, discrete-time vaccination model only.
    Vaccinated,
}

impl Compartment {
    /// Short column label (`S`, `I`/`A`, `R`, `V`) for the given model.
    pub fn label(self, model: ModelKind) -> &'static str {
        match (self, model) {
            (Compartment::Susceptible, _) => "S",
            (Compartment::Infectious, ModelKind::Sar) => "A",
            (Compartment::Infectious, _) => "I",
            (Compartment::Recovered, _) => "R",
            (Compartment::Vaccinated, _) => "V",
        }
    }
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compartment::Susceptible => write!(f, "Susceptible"),
            Compartment::Infectious => write!(f, "Infectious"),
            Compartment::Recovered => write!(f, "Recovered"),
            Compartment::Vaccinated => write!(f, "Vaccinated"),
        }
    }
}

/// Number of nodes in each compartment at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompartmentCounts {
    pub susceptible: usize,
    pub infectious: usize,
    pub recovered: usize,
    pub vaccinated: usize,
}

impl CompartmentCounts {
    /// A population of `n` nodes, all susceptible.
    pub fn all_susceptible(n: usize) -> Self {
        Self {
            susceptible: n,
            ..Default::default()
        }
    }

    /// Total population across every compartment.
    pub fn total(&self) -> usize {
        self.susceptible + self.infectious + self.recovered + self.vaccinated
    }

    /// Count for a single compartment.
    pub fn get(&self, compartment: Compartment) -> usize {
        match compartment {
            Compartment::Susceptible => self.susceptible,
            Compartment::Infectious => self.infectious,
            Compartment::Recovered => self.recovered,
            Compartment::Vaccinated => self.vaccinated,
        }
    }

    fn slot_mut(&mut self, compartment: Compartment) -> &mut usize {
        match compartment {
            Compartment::Susceptible => &mut self.susceptible,
            Compartment::Infectious => &mut self.infectious,
            Compartment::Recovered => &mut self.recovered,
            Compartment::Vaccinated => &mut self.vaccinated,
        }
    }

    /// Move one node from `from` to `to`.
    ///
    /// Returns `None` (leaving the counts untouched) if `from` is empty.
    pub fn transfer(&mut self, from: Compartment, to: Compartment) -> Option<()> {
        let source = self.slot_mut(from);
        *source = source.checked_sub(1)?;
        *self.slot_mut(to) += 1;
        Some(())
    }

    /// Nodes that were ever reached by the contagion.
    pub fn ever_infected(&self) -> usize {
        self.infectious + self.recovered
    }
}
