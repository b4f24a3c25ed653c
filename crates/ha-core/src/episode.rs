//! Running whole episodes through the hooked step.

use log::info;
use serde::{Deserialize, Serialize};

use crate::emulator::{Action, Emulator};
use crate::error::HookError;
use crate::hook::HookedEmulator;

/// Chooses the next action from the latest observation.
pub trait Policy<O> {
    fn act(&mut self, observation: &O) -> Action;
}

impl<O, F: FnMut(&O) -> Action> Policy<O> for F {
    fn act(&mut self, observation: &O) -> Action {
        self(observation)
    }
}

/// Result of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub episode: usize,
    pub total_reward: f64,
    /// Frames played
    pub length: u64,
    /// True if the step cap ended the episode rather than the game
    pub capped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRunner {
    episodes: usize,
    max_steps: Option<u64>,
}

impl EpisodeRunner {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            max_steps: None,
        }
    }

    /// End each episode after at most `max_steps` frames.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Play all episodes, resetting the emulator before each one.
    ///
    /// Stops at the first hook error; episodes finished before it are lost
    /// with it, since the variant is broken.
    pub fn run<E, P>(&self, hooked: &mut HookedEmulator<E>, policy: &mut P) -> Result<Vec<EpisodeStats>, HookError>
    where
        E: Emulator,
        P: Policy<E::Observation> + ?Sized,
    {
        let mut stats = Vec::with_capacity(self.episodes);
        for episode in 0..self.episodes {
            let mut observation = hooked.reset();
            let mut total_reward = 0.0;
            let mut length = 0;
            let mut capped = false;

            loop {
                if self.max_steps.is_some_and(|max| length >= max) {
                    capped = true;
                    break;
                }
                let action = policy.act(&observation);
                let result = hooked.hooked_step(action)?;
                total_reward += result.reward;
                length += 1;
                let done = result.is_done();
                observation = result.observation;
                if done {
                    break;
                }
            }

            info!(
                "{}: reward in episode {episode} is {total_reward}, length is {length}",
                hooked.variant().name()
            );
            stats.push(EpisodeStats {
                episode,
                total_reward,
                length,
                capped,
            });
        }
        Ok(stats)
    }
}

/// Mean total reward, `None` for no episodes.
pub fn mean_reward(stats: &[EpisodeStats]) -> Option<f64> {
    if stats.is_empty() {
        return None;
    }
    Some(stats.iter().map(|s| s.total_reward).sum::<f64>() / stats.len() as f64)
}
