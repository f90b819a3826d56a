use crate::result::RoutingResult;
use layerroute_common::db::core::Net;
use layerroute_common::util::config::{SearchConfig, StrategyKind};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// Source of candidate net orderings.
///
/// Orderings are lists of indices into the net slice being optimized.
/// `best` is the best result seen so far (none before the first batch).
/// At most `max` orderings may be returned; an empty batch ends the search.
pub trait OrderingStrategy: Send {
    fn name(&self) -> &'static str;

    fn next_batch(&mut self, best: Option<&RoutingResult>, max: usize) -> Vec<Vec<usize>>;
}

pub fn build(kind: StrategyKind, nets: &[Net], config: &SearchConfig) -> Box<dyn OrderingStrategy> {
    match kind {
        StrategyKind::Exhaustive => Box::new(Exhaustive::new(nets.len())),
        StrategyKind::Random => Box::new(RandomSampling::new(
            nets.len(),
            config.random_samples,
            config.seed,
        )),
        StrategyKind::Greedy => Box::new(ShortestFirst::new(nets)),
        StrategyKind::Local | StrategyKind::Auto => {
            Box::new(LocalSearch::new(nets, config.local_search_rounds))
        }
    }
}

pub struct Exhaustive {
    current: Option<Vec<usize>>,
}

impl Exhaustive {
    pub fn new(n: usize) -> Self {
        Self {
            current: Some((0..n).collect()),
        }
    }
}

impl OrderingStrategy for Exhaustive {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn next_batch(&mut self, _best: Option<&RoutingResult>, max: usize) -> Vec<Vec<usize>> {
        let mut batch = Vec::new();
        while batch.len() < max {
            let Some(current) = self.current.as_mut() else {
                break;
            };
            batch.push(current.clone());
            if !next_permutation(current) {
                self.current = None;
            }
        }
        batch
    }
}

/// Rearranges `order` into the next lexicographic permutation. Returns false
/// (leaving `order` untouched) when it already is the last one.
pub fn next_permutation(order: &mut [usize]) -> bool {
    if order.len() < 2 {
        return false;
    }
    let Some(pivot) = (0..order.len() - 1).rev().find(|&i| order[i] < order[i + 1]) else {
        return false;
    };
    let successor = (pivot + 1..order.len())
        .rev()
        .find(|&j| order[j] > order[pivot])
        .unwrap_or(pivot + 1);
    order.swap(pivot, successor);
    order[pivot + 1..].reverse();
    true
}

/// The netlist order followed by `samples` uniformly shuffled orderings.
pub struct RandomSampling {
    n: usize,
    remaining: usize,
    first: bool,
    rng: StdRng,
}

impl RandomSampling {
    pub fn new(n: usize, samples: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            n,
            remaining: samples.saturating_add(1),
            first: true,
            rng,
        }
    }
}

impl OrderingStrategy for RandomSampling {
    fn name(&self) -> &'static str {
        "random"
    }

    fn next_batch(&mut self, _best: Option<&RoutingResult>, max: usize) -> Vec<Vec<usize>> {
        let count = self.remaining.min(max);
        self.remaining -= count;
        (0..count)
            .map(|_| {
                let mut order: Vec<usize> = (0..self.n).collect();
                if !std::mem::take(&mut self.first) {
                    order.shuffle(&mut self.rng);
                }
                order
            })
            .collect()
    }
}

pub fn shortest_first_order(nets: &[Net]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..nets.len()).collect();
    order.sort_by_key(|&i| {
        let net = &nets[i];
        (
            net.start.manhattan(&net.end) + net.start.layer_diff(&net.end) as u32,
            i,
        )
    });
    order
}

pub struct ShortestFirst {
    order: Option<Vec<usize>>,
}

impl ShortestFirst {
    pub fn new(nets: &[Net]) -> Self {
        Self {
            order: Some(shortest_first_order(nets)),
        }
    }
}

impl OrderingStrategy for ShortestFirst {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn next_batch(&mut self, _best: Option<&RoutingResult>, max: usize) -> Vec<Vec<usize>> {
        if max == 0 {
            return Vec::new();
        }
        self.order.take().into_iter().collect()
    }
}

/// Hill climbing over pairwise swaps, seeded with the shortest-first order.
///
/// Each round proposes every swap of the current best ordering. The search
/// ends after a round that brings no improvement or after `max_rounds`.
pub struct LocalSearch {
    current: Vec<usize>,
    pending: VecDeque<Vec<usize>>,
    seeded: bool,
    round: usize,
    max_rounds: usize,
}

impl LocalSearch {
    pub fn new(nets: &[Net], max_rounds: usize) -> Self {
        Self {
            current: shortest_first_order(nets),
            pending: VecDeque::new(),
            seeded: false,
            round: 0,
            max_rounds,
        }
    }

    fn swaps(&self) -> VecDeque<Vec<usize>> {
        let n = self.current.len();
        let mut out = VecDeque::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                let mut order = self.current.clone();
                order.swap(i, j);
                out.push_back(order);
            }
        }
        out
    }
}

impl OrderingStrategy for LocalSearch {
    fn name(&self) -> &'static str {
        "local"
    }

    fn next_batch(&mut self, best: Option<&RoutingResult>, max: usize) -> Vec<Vec<usize>> {
        if max == 0 {
            return Vec::new();
        }
        if !self.seeded {
            self.seeded = true;
            return vec![self.current.clone()];
        }

        if self.pending.is_empty() {
            let Some(best) = best else {
                return Vec::new();
            };
            let improved = best.order != self.current;
            if (self.round > 0 && !improved) || self.round >= self.max_rounds {
                return Vec::new();
            }
            if improved {
                log::debug!(
                    "Local search round {}: moved to {} routed / cost {}",
                    self.round,
                    best.routed,
                    best.total_cost
                );
            }
            self.current = best.order.clone();
            self.round += 1;
            self.pending = self.swaps();
        }

        let take = max.min(self.pending.len());
        self.pending.drain(..take).collect()
    }
}
