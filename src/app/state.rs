//! Arkanoid game state machine
//!
//! Pure transition function: it returns the next state together with the
//! side effects the caller has to carry out. Nothing in here touches a
//! timer, which keeps the machine testable without a scheduler.

use std::time::Duration;

use crate::domain::game::StepOutcome;

/// Delay before a finished round restarts
pub const RESET_DELAY: Duration = Duration::from_millis(5000);

/// Current state of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    /// Ball in play, model updates run
    #[default]
    Running,
    /// Every block has been hit
    Won,
    /// The ball left the bottom of the viewport
    Lost,
}

/// Possible state transition events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// The last unhit block was hit
    WallCleared,
    /// Ball dropped below the viewport
    BallLost,
    /// The delayed auto-reset fired
    ResetElapsed,
}

impl From<StepOutcome> for StateEvent {
    fn from(outcome: StepOutcome) -> Self {
        match outcome {
            StepOutcome::WallCleared => StateEvent::WallCleared,
            StepOutcome::BallLost => StateEvent::BallLost,
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    /// Register a one-shot timer that feeds [`StateEvent::ResetElapsed`]
    ScheduleReset { delay: Duration },
    /// Replace the wall and re-center ball and paddle
    RebuildWall,
}

/// Result of processing one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub commands: Vec<GameCommand>,
}

impl Transition {
    fn stay(state: GameState) -> Self {
        Self {
            state,
            commands: Vec::new(),
        }
    }

    /// True if the event moved the machine to a different state
    pub fn changed_from(&self, previous: GameState) -> bool {
        self.state != previous
    }
}

/// State machine for game state transitions
pub struct StateMachine;

impl StateMachine {
    /// Processes a state event and returns the new state plus commands
    ///
    /// # Arguments
    /// * `current_state` - Current game state
    /// * `event` - Event to process
    ///
    /// # Returns
    /// Transition describing the next state and the side effects to run
    pub fn process_event(current_state: GameState, event: StateEvent) -> Transition {
        match (current_state, event) {
            (GameState::Running, StateEvent::WallCleared) => Transition {
                state: GameState::Won,
                commands: vec![GameCommand::ScheduleReset { delay: RESET_DELAY }],
            },

            (GameState::Running, StateEvent::BallLost) => Transition {
                state: GameState::Lost,
                commands: vec![GameCommand::ScheduleReset { delay: RESET_DELAY }],
            },

            (GameState::Won | GameState::Lost, StateEvent::ResetElapsed) => Transition {
                state: GameState::Running,
                commands: vec![GameCommand::RebuildWall],
            },

            // Re-entering a state or crossing between WON and LOST is ignored
            (state, _) => Transition::stay(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [GameState; 3] = [GameState::Running, GameState::Won, GameState::Lost];
    const EVENTS: [StateEvent; 3] = [
        StateEvent::WallCleared,
        StateEvent::BallLost,
        StateEvent::ResetElapsed,
    ];

    #[test]
    fn default_state_is_running() {
        assert_eq!(GameState::default(), GameState::Running);
    }

    #[test]
    fn clearing_the_wall_wins() {
        let t = StateMachine::process_event(GameState::Running, StateEvent::WallCleared);
        assert_eq!(t.state, GameState::Won);
        assert_eq!(
            t.commands,
            vec![GameCommand::ScheduleReset { delay: RESET_DELAY }]
        );
    }

    #[test]
    fn losing_the_ball_loses() {
        let t = StateMachine::process_event(GameState::Running, StateEvent::BallLost);
        assert_eq!(t.state, GameState::Lost);
        assert_eq!(
            t.commands,
            vec![GameCommand::ScheduleReset {
                delay: Duration::from_millis(5000)
            }]
        );
    }

    #[test]
    fn reset_returns_to_running() {
        for finished in [GameState::Won, GameState::Lost] {
            let t = StateMachine::process_event(finished, StateEvent::ResetElapsed);
            assert_eq!(t.state, GameState::Running);
            assert_eq!(t.commands, vec![GameCommand::RebuildWall]);
        }
    }

    #[test]
    fn won_and_lost_do_not_cross() {
        let t = StateMachine::process_event(GameState::Won, StateEvent::BallLost);
        assert_eq!(t.state, GameState::Won);
        assert!(t.commands.is_empty());

        let t = StateMachine::process_event(GameState::Lost, StateEvent::WallCleared);
        assert_eq!(t.state, GameState::Lost);
        assert!(t.commands.is_empty());
    }

    #[test]
    fn only_four_edges_are_reachable() {
        let mut edges = Vec::new();
        for state in STATES {
            for event in EVENTS {
                let t = StateMachine::process_event(state, event);
                if t.changed_from(state) {
                    edges.push((state, t.state));
                } else {
                    assert!(t.commands.is_empty(), "no-op must not emit commands");
                }
            }
        }

        edges.sort_by_key(|(from, to)| (*from as u8, *to as u8));
        assert_eq!(
            edges,
            vec![
                (GameState::Running, GameState::Won),
                (GameState::Running, GameState::Lost),
                (GameState::Won, GameState::Running),
                (GameState::Lost, GameState::Running),
            ]
        );
    }

    #[test]
    fn step_outcomes_map_to_events() {
        assert_eq!(StateEvent::from(StepOutcome::WallCleared), StateEvent::WallCleared);
        assert_eq!(StateEvent::from(StepOutcome::BallLost), StateEvent::BallLost);
    }
}
