use std::fmt;
use std::io::{self, Write};

use ndarray::Array3;
use serde::Serialize;

use crate::experience::ExperienceTable;
use crate::model::Model;

/// Write a model tensor as fixed-precision tab separated text.
///
/// One block per action, one row per starting state, one column per next
/// state. Every `columns` values three extra tabs are inserted so wide rows
/// stay readable. Blocks are separated by blank lines.
pub fn write_tensor_dump<W: Write>(
    tensor: &Array3<f64>, precision: usize, columns: usize, mut writer: W
) -> io::Result<()> {
    let (n_states, _, n_actions) = tensor.dim();
    for a in 0..n_actions {
        for s in 0..n_states {
            for s1 in 0..n_states {
                if columns > 0 && s1 > 0 && s1 % columns == 0 {
                    write!(writer, "\t\t\t")?;
                }
                write!(writer, "{:.*}\t", precision, tensor[[s, s1, a]])?;
            }
            writeln!(writer)?;
        }
        write!(writer, "\n\n\n\n\n")?;
    }
    writer.flush()
}


/// A single reachable transition of a derived model.
#[derive(Debug, Serialize, PartialEq)]
pub struct TransitionRecord {
    pub state: usize,
    pub next_state: usize,
    pub action: usize,
    pub probability: f64,
    pub reward: f64,
}

/// Transitions with non-zero probability, state then action then next state.
pub fn transition_records(model: &Model) -> Vec<TransitionRecord> {
    let p = model.transitions();
    let r = model.rewards();
    let mut records = Vec::new();
    for s in 0..model.n_states() {
        for a in 0..model.n_actions() {
            for s1 in 0..model.n_states() {
                if p[[s, s1, a]] > 0.0 {
                    records.push(TransitionRecord {
                        state: s,
                        next_state: s1,
                        action: a,
                        probability: p[[s, s1, a]],
                        reward: r[[s, s1, a]],
                    });
                }
            }
        }
    }
    records
}

/// Export the reachable transitions of `model` as CSV with a header row.
pub fn write_model_csv<W: Write>(model: &Model, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in transition_records(model) {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}


/// Totals used to sanity check a loaded table.
#[derive(Debug, PartialEq)]
pub struct ExperienceSummary {
    pub n_states: usize,
    pub n_actions: usize,
    /// Number of recorded transitions.
    pub total_visits: u64,
    /// (s, a) pairs with at least one recorded transition.
    pub observed_pairs: usize,
    /// (s, a) pairs that will become shadow self-loops.
    pub shadow_pairs: usize,
    pub total_reward: f64,
}

impl ExperienceSummary {
    pub fn from_table(table: &ExperienceTable) -> ExperienceSummary {
        let mut observed_pairs = 0;
        for s in 0..table.n_states() {
            for a in 0..table.n_actions() {
                if table.action_total(s, a) > 0 {
                    observed_pairs += 1;
                }
            }
        }
        ExperienceSummary {
            n_states: table.n_states(),
            n_actions: table.n_actions(),
            total_visits: table.visits().sum(),
            observed_pairs,
            shadow_pairs: table.n_states() * table.n_actions() - observed_pairs,
            total_reward: table.reward_sums().sum(),
        }
    }
}

impl fmt::Display for ExperienceSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "States: {}, actions: {}", self.n_states, self.n_actions)?;
        writeln!(f, "Transitions recorded: {}", self.total_visits)?;
        writeln!(f, "Observed state/action pairs: {}", self.observed_pairs)?;
        writeln!(f, "Unobserved state/action pairs: {}", self.shadow_pairs)?;
        write!(f, "Total reward: {:.4}", self.total_reward)
    }
}
