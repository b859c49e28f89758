//! Deterministic strategy extraction.
//!
//! A strategy node is a winning game state `g` paired with the index `j` of the
//! system goal currently pursued. When `g` satisfies goal `j`, the counter moves
//! on to `j' = (j + 1) mod n`; otherwise `j' = j`. Responses are then chosen
//! from the first non-empty class below, using the layers of goal `j'`:
//!
//! 1. responses landing in a strictly lower layer than the one of `g`;
//! 2. if `g` already satisfies goal `j'`, responses staying winning;
//! 3. for the smallest environment goal `i` that `g` is waiting on
//!    (`g ∈ X_i ∖ J^e_i` in its layer), responses staying in that `X_i`.
//!
//! A state where the environment has no admissible move is won vacuously; any
//! commitment will do there.
//!
//! Within a class the smallest game-state id wins (Mealy, per environment
//! move) or the smallest commitment id wins (Moore).

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, info, warn};

use crate::config::Watchdog;
use crate::error::{ExtractionError, SynthesisError};
use crate::game::GameGraph;
use crate::solver::WinningRegion;
use crate::symbolic::SymbolicSet;

/// One chosen edge: the intermediate node taken and the resulting game state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Response {
    pub choice: usize,
    pub target: usize,
}

/// What the strategy does at a `(game state, goal)` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Goal pursued after this step.
    pub next_goal: usize,
    /// One response per admissible environment move, in environment-move order.
    pub responses: Vec<Response>,
}

/// An explicit strategy over the `(game state, goal)` nodes it reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    initial: Vec<usize>,
    order: Vec<(usize, usize)>,
    decisions: HashMap<(usize, usize), Decision>,
}

impl Strategy {
    /// Initial game states, one per environment initial valuation.
    pub fn initial(&self) -> &[usize] {
        &self.initial
    }

    /// Strategy nodes in discovery (breadth-first) order.
    pub fn nodes(&self) -> &[(usize, usize)] {
        &self.order
    }

    pub fn decision(&self, state: usize, goal: usize) -> Option<&Decision> {
        self.decisions.get(&(state, goal))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Turns a winning region into a [`Strategy`].
pub struct StrategyExtractor<'a, S: SymbolicSet> {
    game: &'a GameGraph<S>,
    region: &'a WinningRegion<S>,
    watchdog: Watchdog,
}

impl<'a, S: SymbolicSet> StrategyExtractor<'a, S> {
    pub fn new(game: &'a GameGraph<S>, region: &'a WinningRegion<S>) -> Self {
        Self {
            game,
            region,
            watchdog: Watchdog::default(),
        }
    }

    /// Checks `watchdog` before deciding each strategy node.
    pub fn with_watchdog(mut self, watchdog: Watchdog) -> Self {
        self.watchdog = watchdog;
        self
    }

    /// Explores the strategy from the given winning initial game states (goal 0).
    pub fn extract(&self, initial: &[usize]) -> Result<Strategy, SynthesisError> {
        let mut order = Vec::new();
        let mut decisions = HashMap::new();
        let mut discovered = HashSet::new();
        let mut queue = VecDeque::new();

        for &g in initial {
            if discovered.insert((g, 0)) {
                order.push((g, 0));
                queue.push_back((g, 0));
            }
        }

        while let Some((g, j)) = queue.pop_front() {
            if let Err(interrupt) = self.watchdog.check() {
                warn!("Strategy extraction interrupted after {} nodes: {}", decisions.len(), interrupt);
                return Err(interrupt.into());
            }
            let decision = self.decide(g, j)?;
            for response in &decision.responses {
                let node = (response.target, decision.next_goal);
                if discovered.insert(node) {
                    order.push(node);
                    queue.push_back(node);
                }
            }
            decisions.insert((g, j), decision);
        }

        info!("Strategy: {} (game state, goal) nodes", order.len());
        Ok(Strategy {
            initial: initial.to_vec(),
            order,
            decisions,
        })
    }

    /// Chooses the responses of winning game state `g` while pursuing goal `j`.
    pub fn decide(&self, g: usize, j: usize) -> Result<Decision, ExtractionError> {
        let game = self.game;
        let region = self.region;
        let num_goals = region.num_goals();

        let next_goal = if game.sys_goals()[j].contains(g) { (j + 1) % num_goals } else { j };
        let fail = ExtractionError { state: g, goal: next_goal };

        let layers = region.layers(next_goal);
        let rank = region.rank(next_goal, g).ok_or_else(|| fail.clone())?;

        let mut classes: Vec<&S> = Vec::with_capacity(3);
        if rank > 0 {
            classes.push(&layers[rank - 1].y);
        }
        if game.sys_goals()[next_goal].contains(g) {
            classes.push(region.winning());
        }
        let waiting = game
            .env_goals()
            .iter()
            .zip(&layers[rank].xs)
            .find(|(justice, x)| x.contains(g) && !justice.contains(g));
        if let Some((_, x)) = waiting {
            classes.push(x);
        }
        // No admissible environment move: the round is won vacuously.
        if game.env_moves(g).next().is_none() {
            classes.push(region.winning());
        }

        let responses = if game.is_moore() {
            // A single commitment; its outcomes are all the environment's moves.
            let choice = classes
                .iter()
                .find_map(|class| game.choices(g).find(|&c| game.outcomes(c).iter().all(|&o| class.contains(o))))
                .ok_or_else(|| fail.clone())?;
            game.outcomes(choice).iter().map(|&target| Response { choice, target }).collect()
        } else {
            game.choices(g)
                .map(|choice| {
                    classes
                        .iter()
                        .find_map(|class| game.outcomes(choice).iter().copied().filter(|&o| class.contains(o)).min())
                        .map(|target| Response { choice, target })
                        .ok_or_else(|| fail.clone())
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        debug!(
            "Node ({}, {}): rank {} toward goal {}, {} responses",
            g,
            j,
            rank,
            next_goal,
            responses.len()
        );
        Ok(Decision { next_goal, responses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::config::{CancelToken, SynthesisConfig};
    use crate::domain::Domain;
    use crate::error::Interrupt;
    use crate::expr::Expr;
    use crate::solver::FixpointSolver;
    use crate::spec::Specification;
    use crate::symbolic::ExplicitSet;
    use crate::transition::TransitionSystem;
    use crate::types::StateId;

    /// A line `a - b - c` with self-loops; `a` is initial, `c` is labeled `far`.
    fn line() -> TransitionSystem {
        let mut ts = TransitionSystem::new();
        ts.add_states(["a", "b", "c"]).unwrap();
        ts.add_initial("a").unwrap();
        for (x, y) in [("a", "a"), ("a", "b"), ("b", "a"), ("b", "b"), ("b", "c"), ("c", "b"), ("c", "c")] {
            ts.add_transition(x, y).unwrap();
        }
        ts.add_label("a", "near").unwrap();
        ts.add_label("c", "far").unwrap();
        ts
    }

    fn extract(spec: &Specification) -> (GameGraph<ExplicitSet>, WinningRegion<ExplicitSet>, Strategy) {
        let config = SynthesisConfig::default();
        let game = GameGraph::build(&line(), spec, &config).unwrap();
        let region = FixpointSolver::new(&game, &config).solve().unwrap();
        let initial = region.initial_choices(&game).unwrap();
        let strategy = StrategyExtractor::new(&game, &region).extract(&initial).unwrap();
        (game, region, strategy)
    }

    #[test]
    fn test_rank_decreases_until_goal() {
        let spec = Specification::new().with_sys_prog(Expr::var("far"));
        let (game, region, strategy) = extract(&spec);

        for &(g, j) in strategy.nodes() {
            let decision = strategy.decision(g, j).unwrap();
            assert_eq!(decision.responses.len(), 1);
            let target = decision.responses[0].target;
            assert!(region.contains(target));
            if game.location(g) != StateId::new(2) {
                assert!(region.rank(0, target) < region.rank(0, g));
            }
        }
    }

    #[test]
    fn test_round_robin_goals() {
        let spec = Specification::new()
            .with_sys_prog(Expr::var("near"))
            .with_sys_prog(Expr::var("far"));
        let (game, _, strategy) = extract(&spec);

        // Walk the only path: a (goal 0 reached) ... c (goal 1 reached) ... a.
        let mut node = (strategy.initial()[0], 0);
        let mut visited = Vec::new();
        for _ in 0..8 {
            visited.push(game.location(node.0).index());
            let decision = strategy.decision(node.0, node.1).unwrap();
            node = (decision.responses[0].target, decision.next_goal);
        }
        assert!(visited.contains(&0));
        assert!(visited.contains(&2));
        // a -> b -> c -> b -> a -> ...
        assert_eq!(&visited[..5], &[0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_mealy_responds_per_env_move() {
        let spec = Specification::new()
            .with_env_var("e", Domain::Boolean)
            .with_sys_var("s", Domain::Boolean)
            .with_sys_safe(Expr::var("s").next().iff(Expr::var("e").next()));
        let (game, _, strategy) = extract(&spec);
        for &(g, j) in strategy.nodes() {
            let decision = strategy.decision(g, j).unwrap();
            assert_eq!(decision.responses.len(), 2);
            for response in &decision.responses {
                assert_eq!(game.env_values(response.target), game.sys_values(response.target));
            }
        }
    }

    #[test]
    fn test_moore_single_commitment() {
        let spec = Specification::new()
            .with_env_var("e", Domain::Boolean)
            .with_sys_prog(Expr::var("far"))
            .with_moore(true);
        let (game, _, strategy) = extract(&spec);
        for &(g, j) in strategy.nodes() {
            let decision = strategy.decision(g, j).unwrap();
            assert_eq!(decision.responses.len(), 2);
            let choice = decision.responses[0].choice;
            assert!(decision.responses.iter().all(|r| r.choice == choice));
            let locations: Vec<_> = decision.responses.iter().map(|r| game.location(r.target)).collect();
            assert_eq!(locations[0], locations[1]);
        }
    }

    #[test]
    fn test_moore_without_env_moves() {
        // Once `e` is raised the environment has no admissible move left.
        let spec = Specification::new()
            .with_env_var("e", Domain::Boolean)
            .with_env_safe(Expr::var("e").implies(Expr::ff()))
            .with_sys_prog(Expr::var("far"))
            .with_moore(true);
        let (game, _, strategy) = extract(&spec);

        let mut dead_ends = 0;
        for &(g, j) in strategy.nodes() {
            let decision = strategy.decision(g, j).unwrap();
            if game.env_values(g)[0] == 1 {
                assert!(decision.responses.is_empty());
                dead_ends += 1;
            } else {
                assert_eq!(decision.responses.len(), 2);
            }
        }
        assert!(dead_ends > 0);
    }

    #[test]
    fn test_extraction_observes_watchdog() {
        let spec = Specification::new().with_sys_prog(Expr::var("far"));
        let (game, region, _) = extract(&spec);
        let initial = region.initial_choices(&game).unwrap();

        let token = CancelToken::new();
        let watchdog = SynthesisConfig::default().with_cancel(token.clone()).watchdog();
        token.cancel();
        let result = StrategyExtractor::new(&game, &region)
            .with_watchdog(watchdog)
            .extract(&initial);
        assert_eq!(result, Err(SynthesisError::Timeout(Interrupt::Cancelled)));
    }

    #[test]
    fn test_losing_state_is_an_error() {
        let spec = Specification::new()
            .with_sys_safe(Expr::var("far").next().not())
            .with_sys_prog(Expr::var("far"));
        let config = SynthesisConfig::default();
        let game = GameGraph::<ExplicitSet>::build(&line(), &spec, &config).unwrap();
        let region = FixpointSolver::new(&game, &config).solve().unwrap();
        let extractor = StrategyExtractor::new(&game, &region);
        assert_eq!(extractor.decide(0, 0), Err(ExtractionError { state: 0, goal: 0 }));
    }
}
