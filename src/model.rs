use log::debug;
use ndarray::Array3;

use crate::experience::ExperienceTable;

/// Transition probabilities, indexed `[[s, s1, a]]`.
pub type TransitionTensor = Array3<f64>;
/// Expected reward of each transition, indexed `[[s, s1, a]]`.
pub type RewardTensor = Array3<f64>;

/// Empirical MDP model derived from an [`ExperienceTable`].
///
/// For every (s, a) pair, `transitions[[s, .., a]]` sums to one. Rewards are
/// only meaningful where the matching transition probability is non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    transitions: TransitionTensor,
    rewards: RewardTensor,
}

impl Model {
    pub fn n_states(&self) -> usize {
        self.transitions.dim().0
    }

    pub fn n_actions(&self) -> usize {
        self.transitions.dim().2
    }

    pub fn transitions(&self) -> &TransitionTensor {
        &self.transitions
    }

    pub fn rewards(&self) -> &RewardTensor {
        &self.rewards
    }

    pub fn into_parts(self) -> (TransitionTensor, RewardTensor) {
        (self.transitions, self.rewards)
    }
}

/// Normalize visit counts into transition probabilities and reward sums into
/// mean rewards.
///
/// A (s, a) pair that was never observed becomes a shadow self-loop:
/// probability 1 of staying in `s`, with zero reward.
pub fn derive_model(table: &ExperienceTable) -> Model {
    let n_states = table.n_states();
    let n_actions = table.n_actions();
    let visits = table.visits();
    let mut transitions =
        TransitionTensor::zeros((n_states, n_states, n_actions));
    let mut rewards = table.reward_sums().clone();
    let mut shadow_pairs = 0;

    for s in 0..n_states {
        for a in 0..n_actions {
            let mut action_total = 0.0;
            for s1 in 0..n_states {
                action_total += visits[[s, s1, a]] as f64;
            }
            // Never took `a` in `s`. Reward sums are already zero.
            if action_total == 0.0 {
                transitions[[s, s, a]] = 1.0;
                shadow_pairs += 1;
                continue;
            }
            for s1 in 0..n_states {
                let n = visits[[s, s1, a]] as f64;
                if n > 0.0 {
                    rewards[[s, s1, a]] /= n;
                }
                transitions[[s, s1, a]] = n / action_total;
            }
        }
    }
    debug!(
        "Derived model for {} states and {} actions ({} shadow self-loops).",
        n_states, n_actions, shadow_pairs
    );
    Model { transitions, rewards }
}
