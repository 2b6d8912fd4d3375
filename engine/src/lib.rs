pub mod audio;

use std::collections::VecDeque;

/// Bounded record of the states a game has passed through.
///
/// The oldest states are dropped once `limit` is reached, so long sessions don't grow
/// without bound. `frame` keeps counting across evictions.
#[derive(Debug)]
pub struct TimeMachine<State> {
    states: VecDeque<State>,
    frame: usize,
    limit: usize,
}

impl<State> TimeMachine<State> {
    pub const DEFAULT_LIMIT: usize = 256;

    pub fn new(initial_state: State) -> Self {
        Self::bounded(initial_state, Self::DEFAULT_LIMIT)
    }

    pub fn bounded(initial_state: State, limit: usize) -> Self {
        let mut states = VecDeque::new();
        states.push_back(initial_state);
        Self {
            states,
            frame: 0,
            limit: limit.max(1),
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self) -> &State {
        // Never empty: constructed with one state and `record` only evicts after pushing.
        &self.states[self.states.len() - 1]
    }

    pub fn history(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    pub fn record(&mut self, state: State) -> usize {
        self.states.push_back(state);
        while self.states.len() > self.limit {
            self.states.pop_front();
        }
        self.frame += 1;
        self.frame
    }

    pub fn reset(&mut self, state: State) {
        self.states.clear();
        self.states.push_back(state);
        self.frame = 0;
    }
}

/// Result of a single pure step: the next state plus the side effects the caller should run.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<State, Effect> {
    pub state: State,
    pub effects: Vec<Effect>,
}

impl<State, Effect> Transition<State, Effect> {
    pub fn new(state: State) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

pub trait GameLogic {
    type State;
    type Input;
    type Effect;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Transition<Self::State, Self::Effect>;
}

#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    timemachine: TimeMachine<G::State>,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let initial_state = game.initial_state();
        Self {
            game,
            timemachine: TimeMachine::new(initial_state),
        }
    }

    pub fn with_history_limit(game: G, limit: usize) -> Self {
        let initial_state = game.initial_state();
        Self {
            game,
            timemachine: TimeMachine::bounded(initial_state, limit),
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn frame(&self) -> usize {
        self.timemachine.frame()
    }

    pub fn state(&self) -> &G::State {
        self.timemachine.state()
    }

    pub fn timemachine(&self) -> &TimeMachine<G::State> {
        &self.timemachine
    }

    /// Applies one input and returns the effects it produced.
    pub fn step(&mut self, input: G::Input) -> Vec<G::Effect> {
        let Transition { state, effects } = self.game.step(self.timemachine.state(), input);
        self.timemachine.record(state);
        effects
    }

    /// Applies every input in order, collecting all effects.
    pub fn run<I>(&mut self, inputs: I) -> Vec<G::Effect>
    where
        I: IntoIterator<Item = G::Input>,
    {
        let mut effects = Vec::new();
        for input in inputs {
            effects.extend(self.step(input));
        }
        effects
    }

    pub fn reset(&mut self) {
        let initial_state = self.game.initial_state();
        self.timemachine.reset(initial_state);
    }
}
