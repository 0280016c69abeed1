//! Strategy parameter optimization.
//!
//! Two searches are provided, both treating the strategy as a black-box fitness function:
//! - [`Optimizer`] evaluates every combination produced by a [`ParameterCombination`],
//!   in parallel chunks.
//! - [`GeneticOptimizer`] evolves a population over discrete [`ParameterRange`]s when the
//!   grid is too large to walk.
//!
//! A combination whose evaluation fails is rejected and logged; the search goes on.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::BacktestConfig;
use crate::engine::{Backtest, Candle};
use crate::errors::{Error, Result};

/// Trait defining how to generate parameter combinations for optimization.
///
/// Implement this trait for your parameter types to define how combinations should be generated.
/// The associated type `Output` represents a single parameter combination (e.g., a tuple of values).
pub trait ParameterCombination: Sync {
    /// Type representing a single parameter combination (e.g., `(usize, f64)`).
    type Output: Clone + Debug + Send + Sync;

    /// Generates all possible parameter combinations to test.
    fn generate() -> Vec<Self::Output>;
}

/// Outcome of a grid search.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct GridSearch<P> {
    /// Every evaluated combination with its fitness, in generation order.
    pub results: Vec<(P, f64)>,
    /// Combinations whose evaluation failed, with the reason.
    pub rejected: Vec<(P, String)>,
}

impl<P: Clone> GridSearch<P> {
    /// Combination with the highest fitness.
    pub fn best(&self) -> Option<(P, f64)> {
        self.results
            .iter()
            .filter(|(_, fitness)| !fitness.is_nan())
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .cloned()
    }
}

/// Grid search over the combinations of `PC`.
#[derive(Debug, Clone)]
pub struct Optimizer<PC: ParameterCombination> {
    data: Arc<[Candle]>,
    _marker: PhantomData<PC>,
}

impl<PC: ParameterCombination> From<&Backtest> for Optimizer<PC> {
    fn from(value: &Backtest) -> Self {
        Self::new(value.data())
    }
}

impl<PC: ParameterCombination> Optimizer<PC> {
    /// Creates an optimizer over `data`.
    pub fn new(data: Arc<[Candle]>) -> Self {
        Self {
            data,
            _marker: PhantomData,
        }
    }

    /// Scores every combination with `fitness`, which receives the raw candles so it can
    /// label them with its own signals.
    ///
    /// ### Errors
    /// [`Error::Optimizer`] when `PC` generates no combination.
    pub fn with<F>(&self, fitness: F) -> Result<GridSearch<PC::Output>>
    where
        F: Fn(&[Candle], &PC::Output) -> Result<f64> + Sync,
    {
        let combinations = PC::generate();
        if combinations.is_empty() {
            return Err(Error::Optimizer("no parameter combination to evaluate".to_string()));
        }

        let num_cpus = num_cpus::get();
        let chunk_size = combinations.len().div_ceil(num_cpus).max(1);
        info!(
            "grid search: {} combinations in chunks of {chunk_size}",
            combinations.len()
        );

        let chunks = combinations
            .par_chunks(chunk_size)
            .map(|par_combinations| {
                let mut results = Vec::with_capacity(par_combinations.len());
                let mut rejected = Vec::new();
                for param_set in par_combinations {
                    match fitness(&self.data[..], param_set) {
                        Ok(score) => results.push((param_set.clone(), score)),
                        Err(e) => {
                            warn!("rejected combination {param_set:?}: {e}");
                            rejected.push((param_set.clone(), e.to_string()));
                        }
                    }
                }
                (results, rejected)
            })
            .collect::<Vec<_>>();

        let mut search = GridSearch {
            results: Vec::with_capacity(combinations.len()),
            rejected: Vec::new(),
        };
        for (mut results, mut rejected) in chunks {
            search.results.append(&mut results);
            search.rejected.append(&mut rejected);
        }

        if let Some((params, fitness)) = search.best() {
            info!(
                "grid search done: best {params:?} with {fitness:.2}, {} rejected",
                search.rejected.len()
            );
        }
        Ok(search)
    }

    /// Scores every combination by the final funds of a buyer built by `combinator`.
    pub fn with_config<C>(&self, combinator: C) -> Result<GridSearch<PC::Output>>
    where
        C: Fn(&PC::Output) -> Result<BacktestConfig> + Sync,
    {
        let backtest = Backtest::new(Arc::clone(&self.data))?;
        self.with(|_, params| backtest.evaluate(&combinator(params)?))
    }
}

/// Discrete set of values one parameter may take.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRange {
    values: Vec<f64>,
}

impl ParameterRange {
    /// Creates a range from explicit values, which must be finite and non-empty.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::Optimizer("empty parameter range".to_string()));
        }
        if let Some(value) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::Optimizer(format!("non-finite parameter value {value}")));
        }
        Ok(Self { values })
    }

    /// Every integer of `range`.
    pub fn integers(range: std::ops::RangeInclusive<i64>) -> Result<Self> {
        Self::new(range.map(|v| v as f64).collect())
    }

    /// `start`, `start + step`, ... up to `end` included.
    pub fn stepped(start: f64, end: f64, step: f64) -> Result<Self> {
        if step <= 0.0 || !step.is_finite() || end < start {
            return Err(Error::Optimizer(format!("invalid range {start}..={end} by {step}")));
        }
        let count = ((end - start) / step + 1e-9).floor() as usize + 1;
        Self::new((0..count).map(|i| start + step * i as f64).collect())
    }

    /// Returns the allowed values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the number of allowed values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no value is allowed, which a built range never is.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn nearest_index(&self, value: f64) -> usize {
        self.values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
            .map(|(index, _)| index)
            .unwrap_or_default()
    }

    fn nearest(&self, value: f64) -> f64 {
        self.values[self.nearest_index(value)]
    }
}

/// Parameter name to value.
pub type Parameters = BTreeMap<String, f64>;

/// Outcome of a genetic search.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Evolution {
    /// Best individual found.
    pub best: Parameters,
    /// Its fitness.
    pub best_fitness: f64,
    /// Best fitness so far, per generation.
    pub fitness_history: Vec<f64>,
    /// Population diversity, per generation.
    pub diversity_history: Vec<f64>,
    /// Number of population restarts.
    pub restarts: usize,
}

/// Genetic search with elitism, tournament selection, arithmetic crossover and
/// diversity-adaptive circular mutation.
///
/// The population restarts (elite kept) when its diversity falls below the minimum
/// or when the best fitness has not improved for more than `patience` generations.
/// Runs are reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct GeneticOptimizer {
    ranges: BTreeMap<String, ParameterRange>,
    population_size: usize,
    elite_size: usize,
    tournament_size: usize,
    mutation_rate: f64,
    mutation_strength: f64,
    min_diversity: f64,
    patience: usize,
    seed: u64,
}

impl GeneticOptimizer {
    /// Creates an optimizer over `ranges` with a population of 50, 5 elites,
    /// tournaments of 3, mutation rate 0.2 and strength 0.3, minimum diversity 0.3,
    /// patience 10 and seed 0.
    pub fn new(ranges: impl IntoIterator<Item = (impl Into<String>, ParameterRange)>) -> Result<Self> {
        let ranges = ranges
            .into_iter()
            .map(|(name, range)| (name.into(), range))
            .collect::<BTreeMap<String, ParameterRange>>();
        if ranges.is_empty() {
            return Err(Error::Optimizer("no parameter to optimize".to_string()));
        }

        Ok(Self {
            ranges,
            population_size: 50,
            elite_size: 5,
            tournament_size: 3,
            mutation_rate: 0.2,
            mutation_strength: 0.3,
            min_diversity: 0.3,
            patience: 10,
            seed: 0,
        })
    }

    /// Sets the population size.
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets how many of the best individuals survive unchanged.
    pub fn elite_size(mut self, size: usize) -> Self {
        self.elite_size = size;
        self
    }

    /// Sets the number of contestants per tournament.
    pub fn tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the base mutation rate and strength.
    pub fn mutation(mut self, rate: f64, strength: f64) -> Self {
        self.mutation_rate = rate;
        self.mutation_strength = strength;
        self
    }

    /// Sets the diversity below which the population restarts.
    pub fn min_diversity(mut self, diversity: f64) -> Self {
        self.min_diversity = diversity;
        self
    }

    /// Sets how many generations without improvement are tolerated before a restart.
    pub fn patience(mut self, generations: usize) -> Self {
        self.patience = generations;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn check(&self, generations: usize) -> Result<()> {
        if generations == 0 {
            return Err(Error::Optimizer("at least one generation is required".to_string()));
        }
        if self.population_size == 0 || self.elite_size >= self.population_size {
            return Err(Error::Optimizer(format!(
                "elite size {} must be below the population size {}",
                self.elite_size, self.population_size
            )));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(Error::Optimizer(format!(
                "tournament size {} must be within 1..={}",
                self.tournament_size, self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::Optimizer(format!(
                "mutation rate {} must be within [0, 1]",
                self.mutation_rate
            )));
        }
        if !self.mutation_strength.is_finite() || self.mutation_strength < 0.0 {
            return Err(Error::Optimizer(format!(
                "mutation strength {} must be finite and non-negative",
                self.mutation_strength
            )));
        }
        if !self.min_diversity.is_finite() {
            return Err(Error::Optimizer(format!(
                "minimum diversity {} must be finite",
                self.min_diversity
            )));
        }
        Ok(())
    }

    fn random_individual(&self, rng: &mut StdRng) -> Parameters {
        self.ranges
            .iter()
            .map(|(name, range)| (name.clone(), range.values[rng.random_range(0..range.len())]))
            .collect()
    }

    fn generate_population(&self, size: usize, rng: &mut StdRng) -> Vec<Parameters> {
        (0..size).map(|_| self.random_individual(rng)).collect()
    }

    /// Mean share of each range covered by the population, in `[0, 1]`.
    fn diversity(&self, population: &[Parameters]) -> f64 {
        let total = self
            .ranges
            .iter()
            .map(|(name, range)| {
                let distinct = population
                    .iter()
                    .filter_map(|individual| individual.get(name))
                    .map(|value| value.to_bits())
                    .collect::<BTreeSet<_>>();
                distinct.len() as f64 / range.len() as f64
            })
            .sum::<f64>();
        total / self.ranges.len() as f64
    }

    fn tournament<'a>(&self, population: &'a [Parameters], fitness: &[f64], rng: &mut StdRng) -> &'a Parameters {
        let winner = rand::seq::index::sample(rng, population.len(), self.tournament_size)
            .iter()
            .max_by(|&a, &b| fitness[a].total_cmp(&fitness[b]))
            .unwrap_or_default();
        &population[winner]
    }

    fn crossover(&self, first: &Parameters, second: &Parameters, rng: &mut StdRng) -> Parameters {
        self.ranges
            .iter()
            .map(|(name, range)| {
                let a = first.get(name).copied().unwrap_or(range.values[0]);
                let b = second.get(name).copied().unwrap_or(range.values[0]);
                let weight = rng.random::<f64>();
                (name.clone(), range.nearest(a * weight + b * (1.0 - weight)))
            })
            .collect()
    }

    fn mutate(&self, individual: &mut Parameters, diversity: f64, rng: &mut StdRng) {
        let boost = 2.0 - diversity;
        let rate = self.mutation_rate * boost;
        for (name, range) in &self.ranges {
            if rng.random::<f64>() >= rate {
                continue;
            }
            let Some(value) = individual.get_mut(name) else {
                continue;
            };
            let len = range.len() as i64;
            let step_size = (len as f64 * self.mutation_strength * boost) as i64;
            let step = rng.random_range(-step_size..=step_size);
            let index = (range.nearest_index(*value) as i64 + step).rem_euclid(len);
            *value = range.values[index as usize];
        }
    }

    /// Evolves the population for `generations` and returns the best individual seen.
    ///
    /// `fitness` runs in parallel; individuals whose evaluation fails (or is NaN) score
    /// negative infinity.
    ///
    /// ### Errors
    /// [`Error::Optimizer`] on invalid settings or when no individual scored above
    /// negative infinity.
    pub fn optimize<F>(&self, generations: usize, fitness: F) -> Result<Evolution>
    where
        F: Fn(&Parameters) -> Result<f64> + Sync,
    {
        self.check(generations)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut population = self.generate_population(self.population_size, &mut rng);
        let mut best: Option<(Parameters, f64)> = None;
        let mut stale = 0;
        let mut restarts = 0;
        let mut fitness_history = Vec::with_capacity(generations);
        let mut diversity_history = Vec::with_capacity(generations);

        for generation in 0..generations {
            let scores = population
                .par_iter()
                .map(|individual| match fitness(individual) {
                    Ok(score) if !score.is_nan() => score,
                    Ok(_) => f64::NEG_INFINITY,
                    Err(e) => {
                        warn!("rejected individual {individual:?}: {e}");
                        f64::NEG_INFINITY
                    }
                })
                .collect::<Vec<_>>();

            let mut ranking = (0..population.len()).collect::<Vec<_>>();
            ranking.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

            let leader = ranking[0];
            let best_fitness = best.as_ref().map_or(f64::NEG_INFINITY, |(_, f)| *f);
            if scores[leader] > best_fitness {
                best = Some((population[leader].clone(), scores[leader]));
                stale = 0;
            } else {
                stale += 1;
            }

            let diversity = self.diversity(&population);
            diversity_history.push(diversity);
            fitness_history.push(best.as_ref().map_or(f64::NEG_INFINITY, |(_, f)| *f));

            let mut next = ranking[..self.elite_size]
                .iter()
                .map(|&index| population[index].clone())
                .collect::<Vec<_>>();

            if diversity < self.min_diversity || stale > self.patience {
                info!("restarting population at generation {}", generation + 1);
                next.extend(self.generate_population(self.population_size - self.elite_size, &mut rng));
                stale = 0;
                restarts += 1;
            } else {
                while next.len() < self.population_size {
                    let first = self.tournament(&population, &scores, &mut rng);
                    let second = self.tournament(&population, &scores, &mut rng);
                    let mut child = self.crossover(first, second, &mut rng);
                    self.mutate(&mut child, diversity, &mut rng);
                    next.push(child);
                }
            }

            info!(
                "generation {}/{generations}: best fitness {:.2}, diversity {diversity:.2}",
                generation + 1,
                fitness_history[generation]
            );
            population = next;
        }

        let (best, best_fitness) =
            best.ok_or_else(|| Error::Optimizer("no individual produced a usable fitness".to_string()))?;
        Ok(Evolution {
            best,
            best_fitness,
            fitness_history,
            diversity_history,
            restarts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuyerKind, FuturesConfig, SpotConfig};
    use crate::engine::{CandleBuilder, Signal};
    use chrono::{DateTime, Duration};
    use ta::Next;
    use ta::indicators::ExponentialMovingAverage;

    fn get_data() -> Arc<[Candle]> {
        (0..120)
            .map(|i| {
                let close = 100.0 + 10.0 * (i as f64 / 8.0).sin() + i as f64 * 0.1;
                let open = close - 0.5 * (i as f64 / 3.0).cos();
                CandleBuilder::builder()
                    .open(open)
                    .high(open.max(close) + 1.0)
                    .low(open.min(close) - 1.0)
                    .close(close)
                    .timestamp(DateTime::from_timestamp(1_515_151_515, 0).unwrap() + Duration::hours(i))
                    .build()
                    .unwrap()
            })
            .collect()
    }

    fn ema_cross(candles: &[Candle], fast: usize, slow: usize) -> Result<Vec<Candle>> {
        let mut fast = ExponentialMovingAverage::new(fast).map_err(|e| Error::Msg(e.to_string()))?;
        let mut slow = ExponentialMovingAverage::new(slow).map_err(|e| Error::Msg(e.to_string()))?;
        let mut above = None;
        Ok(candles
            .iter()
            .map(|candle| {
                let is_above = fast.next(candle.close()) > slow.next(candle.close());
                let signal = match above.replace(is_above) {
                    Some(false) if is_above => Signal::Buy,
                    Some(true) if !is_above => Signal::Sell,
                    _ => Signal::Hold,
                };
                candle.with_signal(signal)
            })
            .collect())
    }

    struct EmaPeriods;

    impl ParameterCombination for EmaPeriods {
        type Output = (usize, usize);

        fn generate() -> Vec<Self::Output> {
            (2..=6).flat_map(|fast| (4..=10).map(move |slow| (fast, slow))).collect()
        }
    }

    struct Leverages;

    impl ParameterCombination for Leverages {
        type Output = f64;

        fn generate() -> Vec<Self::Output> {
            vec![0.5, 1.0, 2.0, 5.0]
        }
    }

    struct Nothing;

    impl ParameterCombination for Nothing {
        type Output = ();

        fn generate() -> Vec<Self::Output> {
            Vec::new()
        }
    }

    fn spot() -> BacktestConfig {
        BacktestConfig {
            initial_funds: 1000.0,
            buyer: BuyerKind::Spot(SpotConfig {
                trade_value: 100.0,
                commission: 0.001,
            }),
        }
    }

    #[test]
    fn grid_search_with_ema_cross() {
        let optimizer = Optimizer::<EmaPeriods>::new(get_data());
        let search = optimizer
            .with(|candles, &(fast, slow)| {
                if fast >= slow {
                    return Err(Error::Msg(format!("fast {fast} must be below slow {slow}")));
                }
                let labelled = ema_cross(candles, fast, slow)?;
                Backtest::new(Arc::from_iter(labelled))?.evaluate(&spot())
            })
            .unwrap();

        let rejected = EmaPeriods::generate().iter().filter(|(f, s)| f >= s).count();
        assert_eq!(search.rejected.len(), rejected);
        assert_eq!(search.results.len(), EmaPeriods::generate().len() - rejected);
        assert!(search.results.iter().all(|((f, s), _)| f < s));

        let (_, best) = search.best().unwrap();
        assert!(search.results.iter().all(|(_, fitness)| *fitness <= best));
    }

    #[test]
    fn grid_search_over_configs() {
        let data = ema_cross(&get_data(), 3, 8)
            .unwrap()
            .into_iter()
            .map(|candle| match candle.signal() {
                Some(Signal::Buy) => candle.with_risk(None, Some(candle.close() * 0.97)),
                Some(Signal::Sell) => candle.with_risk(None, Some(candle.close() * 1.03)),
                _ => candle,
            })
            .collect::<Vec<_>>();
        let backtest = Backtest::new(Arc::from_iter(data)).unwrap();
        let optimizer = Optimizer::<Leverages>::from(&backtest);

        let search = optimizer
            .with_config(|&leverage| {
                Ok(BacktestConfig {
                    initial_funds: 1000.0,
                    buyer: BuyerKind::Futures(FuturesConfig {
                        margin: 20.0,
                        leverage,
                        taker_commission: 0.0004,
                        maker_commission: 0.0002,
                        risk_reward: Some(2.0),
                    }),
                })
            })
            .unwrap();

        assert_eq!(search.rejected.len(), 1);
        assert_eq!(search.rejected[0].0, 0.5);
        assert!(search.rejected[0].1.contains("Leverage"));
        assert_eq!(search.results.len(), 3);
        assert!(search.best().is_some());
    }

    #[test]
    fn grid_search_without_combinations() {
        let optimizer = Optimizer::<Nothing>::new(get_data());
        assert!(matches!(optimizer.with(|_, _| Ok(0.0)), Err(Error::Optimizer(_))));
    }

    fn paraboloid(params: &Parameters) -> Result<f64> {
        let x = params["x"];
        let y = params["y"];
        Ok(-(x - 7.0).powi(2) - (y - 3.0).powi(2))
    }

    fn genetic() -> GeneticOptimizer {
        GeneticOptimizer::new([
            ("x", ParameterRange::integers(0..=10).unwrap()),
            ("y", ParameterRange::integers(0..=10).unwrap()),
        ])
        .unwrap()
        .population_size(40)
        .elite_size(4)
        .seed(42)
    }

    #[test]
    fn genetic_finds_the_peak() {
        let evolution = genetic().optimize(30, paraboloid).unwrap();

        assert!(evolution.best_fitness >= -1.0);
        assert_eq!(evolution.fitness_history.len(), 30);
        assert_eq!(evolution.diversity_history.len(), 30);
        assert!(evolution.fitness_history.windows(2).all(|w| w[0] <= w[1]));
        assert!(evolution.diversity_history.iter().all(|d| (0.0..=1.0).contains(d)));
        assert_eq!(evolution.fitness_history.last(), Some(&evolution.best_fitness));
    }

    #[test]
    fn genetic_is_reproducible() {
        let first = genetic().optimize(10, paraboloid).unwrap();
        let second = genetic().optimize(10, paraboloid).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn genetic_rejects_failing_individuals() {
        let evolution = genetic()
            .optimize(15, |params| {
                if params["x"] > 5.0 {
                    return Err(Error::Msg("x too large".to_string()));
                }
                paraboloid(params)
            })
            .unwrap();
        assert!(evolution.best["x"] <= 5.0);

        let result = genetic().optimize(3, |_| Err(Error::Msg("always".to_string())));
        assert!(matches!(result, Err(Error::Optimizer(_))));
    }

    #[test]
    fn genetic_settings() {
        assert!(matches!(genetic().optimize(0, paraboloid), Err(Error::Optimizer(_))));
        assert!(genetic().elite_size(40).optimize(1, paraboloid).is_err());
        assert!(genetic().tournament_size(41).optimize(1, paraboloid).is_err());
        assert!(GeneticOptimizer::new(Vec::<(String, ParameterRange)>::new()).is_err());

        let negative_strength = genetic().mutation(1.0, -0.5).optimize(3, paraboloid);
        assert!(matches!(negative_strength, Err(Error::Optimizer(_))));
        assert!(genetic().mutation(0.2, f64::INFINITY).optimize(1, paraboloid).is_err());
        assert!(genetic().mutation(1.5, 0.1).optimize(1, paraboloid).is_err());
        assert!(genetic().mutation(-0.1, 0.1).optimize(1, paraboloid).is_err());
        assert!(genetic().mutation(f64::NAN, 0.1).optimize(1, paraboloid).is_err());
        assert!(genetic().min_diversity(f64::NAN).optimize(1, paraboloid).is_err());
        assert!(genetic().mutation(0.0, 0.0).optimize(1, paraboloid).is_ok());
    }

    #[test]
    fn parameter_ranges() {
        let range = ParameterRange::stepped(0.5, 2.0, 0.5).unwrap();
        assert_eq!(range.values(), &[0.5, 1.0, 1.5, 2.0]);
        assert_eq!(range.nearest(1.2), 1.0);
        assert_eq!(range.nearest(9.0), 2.0);
        assert!(ParameterRange::new(vec![]).is_err());
        assert!(ParameterRange::new(vec![f64::NAN]).is_err());
        assert!(ParameterRange::stepped(1.0, 0.0, 0.1).is_err());
    }
}
