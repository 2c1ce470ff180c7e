use std::fmt;
use std::io::{Read, Write};
use std::str::{FromStr, SplitWhitespace};

use log::{debug, warn};
use ndarray::{s, Array3};

use crate::error::{ExperienceError, TokenKind};
use crate::model::{self, Model};

/// Observed transition counts and reward sums.
///
/// Both tensors have shape `[n_states, n_states, n_actions]` and are indexed
/// `[[s, s1, a]]`: action `a` taken in state `s` led to state `s1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceTable {
    n_states: usize,
    n_actions: usize,
    /// Times each (s, s1, a) transition was observed.
    visits: Array3<u64>,
    /// Sum of the rewards received on each (s, s1, a) transition.
    reward_sums: Array3<f64>,
}

impl ExperienceTable {
    pub fn new(n_states: usize, n_actions: usize) -> ExperienceTable {
        let dimensions = (n_states, n_states, n_actions);
        ExperienceTable {
            n_states,
            n_actions,
            visits: Array3::<u64>::zeros(dimensions),
            reward_sums: Array3::<f64>::zeros(dimensions),
        }
    }

    /// Build a table from previously accumulated tensors.
    ///
    /// Both tensors must share one `[S, S, A]` shape.
    pub fn from_parts(
        visits: Array3<u64>, reward_sums: Array3<f64>
    ) -> Result<ExperienceTable, ExperienceError> {
        let found = visits.dim();
        let expected = (found.0, found.0, found.2);
        if found != expected {
            return Err(ExperienceError::Shape { expected, found });
        }
        if reward_sums.dim() != expected {
            return Err(ExperienceError::Shape { expected, found: reward_sums.dim() });
        }
        Ok(ExperienceTable {
            n_states: expected.0,
            n_actions: expected.2,
            visits,
            reward_sums,
        })
    }

    /// Record one observed transition.
    ///
    /// Indices are not checked beyond ndarray's own bounds checks, which
    /// panic on out-of-range access.
    pub fn accumulate(&mut self, s: usize, s1: usize, a: usize, reward: f64) {
        self.visits[[s, s1, a]] += 1;
        self.reward_sums[[s, s1, a]] += reward;
    }

    pub fn reset(&mut self) {
        self.visits.fill(0);
        self.reward_sums.fill(0.0);
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn visits(&self) -> &Array3<u64> {
        &self.visits
    }

    pub fn reward_sums(&self) -> &Array3<f64> {
        &self.reward_sums
    }

    /// Number of times action `a` was taken in state `s`.
    pub fn action_total(&self, s: usize, a: usize) -> u64 {
        self.visits.slice(s![s, .., a]).sum()
    }

    /// Maximum-likelihood model of the experience collected so far.
    pub fn derive_model(&self) -> Model {
        model::derive_model(self)
    }

    /// Write the table as one line per state.
    ///
    /// Each line holds a `visits reward_sum` pair for every (s1, a), next
    /// state outer and action inner.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ExperienceError> {
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }

    /// Replace the table contents with a table read from `reader`.
    ///
    /// Line breaks are not significant. Tokens past the last pair are
    /// ignored. Dimensions are not stored in the text and must match the
    /// ones this table was built with. If anything goes wrong the table is
    /// left entirely zeroed, never partially loaded.
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<(), ExperienceError> {
        let mut text = String::new();
        let parsed = reader.read_to_string(&mut text)
            .map_err(ExperienceError::from)
            .and_then(|_| self.parse(&text));
        match parsed {
            Ok((visits, reward_sums)) => {
                self.visits = visits;
                self.reward_sums = reward_sums;
                debug!("Loaded {} observed transitions.", self.visits.sum());
                Ok(())
            }
            Err(e) => {
                warn!("Discarding experience table: {}", e);
                self.reset();
                Err(e)
            }
        }
    }

    /// Parse into scratch tensors so the live table is untouched on failure.
    fn parse(&self, text: &str) -> Result<(Array3<u64>, Array3<f64>), ExperienceError> {
        let dimensions = (self.n_states, self.n_states, self.n_actions);
        let mut visits = Array3::<u64>::zeros(dimensions);
        let mut reward_sums = Array3::<f64>::zeros(dimensions);
        let mut tokens = Tokens {
            inner: text.split_whitespace(),
            position: 0,
            expected: 2 * visits.len(),
        };
        for s in 0..self.n_states {
            for s1 in 0..self.n_states {
                for a in 0..self.n_actions {
                    visits[[s, s1, a]] = tokens.next_value(TokenKind::Visits)?;
                    reward_sums[[s, s1, a]] = tokens.next_value(TokenKind::Reward)?;
                }
            }
        }
        Ok((visits, reward_sums))
    }
}

impl fmt::Display for ExperienceTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for s in 0..self.n_states {
            let mut first = true;
            for s1 in 0..self.n_states {
                for a in 0..self.n_actions {
                    if !first {
                        write!(f, " ")?;
                    }
                    first = false;
                    // `{}` on f64 prints the shortest text that parses back exactly.
                    write!(f, "{} {}", self.visits[[s, s1, a]], self.reward_sums[[s, s1, a]])?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Whitespace tokenizer that tracks how far it got.
struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    position: usize,
    expected: usize,
}

impl Tokens<'_> {
    fn next_value<T: FromStr>(&mut self, kind: TokenKind) -> Result<T, ExperienceError> {
        let token = self.inner.next().ok_or(ExperienceError::Truncated {
            expected: self.expected,
            found: self.position,
        })?;
        let value = token.parse::<T>().map_err(|_| ExperienceError::InvalidToken {
            position: self.position,
            token: token.to_string(),
            kind,
        })?;
        self.position += 1;
        Ok(value)
    }
}
