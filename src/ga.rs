//! GA operators and the evolution driver.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use crate::evaluator::evaluate_and_cache;
use crate::model::{Genome, InputDescriptor, Layout};
use crate::rng::task_rng;

/// Fixed GA parameters. All five are compile-time defaults exposed as CLI
/// flags in `main.rs`.
#[derive(Debug, Clone, Copy)]
pub struct GAConfig {
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub mutation_rate: f64,
    pub elite_size: usize,
}

impl Default for GAConfig {
    fn default() -> Self {
        GAConfig {
            population_size: 100,
            generations: 50,
            tournament_size: 3,
            mutation_rate: 0.15,
            elite_size: 10,
        }
    }
}

/// Tournament selection: draw `tournament_size` random indices from
/// `population`, return the index of the one with the highest fitness.
/// Assumes `population` has already been evaluated.
pub fn tournament_select(population: &[Genome], tournament_size: usize, rng: &mut impl Rng) -> usize {
    let mut best = rng.gen_range(0..population.len());
    for _ in 1..tournament_size {
        let candidate = rng.gen_range(0..population.len());
        if population[candidate].fitness_or_worst() > population[best].fitness_or_worst() {
            best = candidate;
        }
    }
    best
}

/// Order crossover (OX) on `sequence`, plus per-piece-id rotation
/// inheritance. `rotation` is keyed by piece id so a 50/50 coin flip per id
/// is independent of how `sequence` was recombined.
pub fn order_crossover(parent1: &Genome, parent2: &Genome, rng: &mut impl Rng) -> Genome {
    let n = parent1.sequence.len();
    let mut cut_a = rng.gen_range(0..n);
    let mut cut_b = rng.gen_range(0..n);
    if cut_a > cut_b {
        std::mem::swap(&mut cut_a, &mut cut_b);
    }

    let mut child: Vec<Option<usize>> = vec![None; n];
    let mut present: HashSet<usize> = HashSet::with_capacity(n);
    for i in cut_a..=cut_b {
        child[i] = Some(parent1.sequence[i]);
        present.insert(parent1.sequence[i]);
    }

    let remaining = n - (cut_b - cut_a + 1);
    let mut fill_pos = (cut_b + 1) % n;
    let mut scan_pos = (cut_b + 1) % n;
    for _ in 0..remaining {
        while present.contains(&parent2.sequence[scan_pos]) {
            scan_pos = (scan_pos + 1) % n;
        }
        let gene = parent2.sequence[scan_pos];
        child[fill_pos] = Some(gene);
        present.insert(gene);
        scan_pos = (scan_pos + 1) % n;
        fill_pos = (fill_pos + 1) % n;
    }

    let sequence: Vec<usize> = child.into_iter().map(|g| g.expect("every slot filled")).collect();
    let rotation: Vec<usize> = (0..parent1.rotation.len())
        .map(|piece_id| {
            if rng.gen_bool(0.5) {
                parent1.rotation[piece_id]
            } else {
                parent2.rotation[piece_id]
            }
        })
        .collect();

    Genome::new(sequence, rotation)
}

/// 2-4 candidate swaps on `sequence`, each accepted with probability
/// `mutation_rate`, then 3-6 candidate rotation changes, each accepted with
/// the same probability.
pub fn mutate(genome: &mut Genome, allowed_angle_counts: &[usize], mutation_rate: f64, rng: &mut impl Rng) {
    let n = genome.sequence.len();
    let swap_candidates = rng.gen_range(2..=4);
    for _ in 0..swap_candidates {
        if rng.gen::<f64>() < mutation_rate && n > 1 {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            genome.sequence.swap(i, j);
        }
    }

    let rotation_candidates = rng.gen_range(3..=6);
    for _ in 0..rotation_candidates {
        if rng.gen::<f64>() < mutation_rate {
            let piece_id = rng.gen_range(0..genome.rotation.len());
            let count = allowed_angle_counts[piece_id];
            if count > 0 {
                genome.rotation[piece_id] = rng.gen_range(0..count);
            }
        }
    }

    genome.invalidate();
}

fn greedy_genome(input: &InputDescriptor) -> Genome {
    let mut sequence: Vec<usize> = (0..input.pieces.len()).collect();
    sequence.sort_by(|&a, &b| {
        input.pieces[b]
            .area
            .partial_cmp(&input.pieces[a].area)
            .unwrap_or(Ordering::Equal)
    });
    let rotation = vec![0usize; input.pieces.len()];
    Genome::new(sequence, rotation)
}

fn random_genome(input: &InputDescriptor, rng: &mut impl Rng) -> Genome {
    let mut sequence: Vec<usize> = (0..input.pieces.len()).collect();
    sequence.shuffle(rng);
    let rotation = input
        .pieces
        .iter()
        .map(|p| rng.gen_range(0..p.allowed_angles.len().max(1)))
        .collect();
    Genome::new(sequence, rotation)
}

/// Population-based search over (permutation, rotation) genomes.
pub struct Evolution<'a> {
    input: &'a InputDescriptor,
    config: GAConfig,
    master_seed: u64,
    population: Vec<Genome>,
    best_ever: Option<(Genome, Layout)>,
}

impl<'a> Evolution<'a> {
    /// Initialize with 10% greedy genomes (pieces ordered by decreasing
    /// area, rotation index 0) and 90% random genomes (Fisher-Yates
    /// permutation, uniformly sampled rotation).
    pub fn new(input: &'a InputDescriptor, config: GAConfig, master_seed: u64) -> Self {
        let mut init_rng = task_rng(master_seed, u64::MAX);
        let greedy_count = ((config.population_size as f64) * 0.10).round() as usize;
        let mut population = Vec::with_capacity(config.population_size);
        for _ in 0..greedy_count {
            population.push(greedy_genome(input));
        }
        while population.len() < config.population_size {
            population.push(random_genome(input, &mut init_rng));
        }
        Evolution { input, config, master_seed, population, best_ever: None }
    }

    /// Evaluate every genome in the population in parallel: initial
    /// population evaluation and per-generation child evaluation are both
    /// independent, parallelizable units of work.
    fn evaluate_population(&mut self) {
        let input = self.input;
        self.population.par_iter_mut().for_each(|genome| {
            evaluate_and_cache(genome, input);
        });
    }

    fn sort_by_fitness_desc(&mut self) {
        self.population.sort_by(|a, b| {
            b.fitness_or_worst()
                .partial_cmp(&a.fitness_or_worst())
                .unwrap_or(Ordering::Equal)
        });
    }

    fn maybe_capture_best_ever(&mut self, generation: usize) {
        let top_fitness = self.population[0].fitness_or_worst();
        let improves = match &self.best_ever {
            Some((best, _)) => top_fitness > best.fitness_or_worst(),
            None => true,
        };
        if improves {
            // Re-evaluate to regenerate the layout for the deep-cloned
            // best-ever record. The fitness recomputed here may differ in
            // the last few floating-point bits from the value cached during
            // the generation's own evaluation pass on platforms with
            // different FP modes; this is a documented, not hidden,
            // consequence of capturing a fresh layout rather than caching
            // every generation's scratch layout.
            let mut captured = self.population[0].clone();
            let layout = evaluate_and_cache(&mut captured, self.input);
            info!(
                "generation {generation}: new best-ever fitness={:.3} boards={}",
                captured.fitness_or_worst(),
                captured.board_count.unwrap_or(0)
            );
            self.best_ever = Some((captured, layout));
        }
    }

    /// Build the next population: copy the top `elite_size` genomes
    /// unchanged, then fill remaining slots via tournament selection,
    /// crossover, and mutation, each using its own worker-local RNG.
    fn next_generation(&self) -> Vec<Genome> {
        let elite = self.config.elite_size.min(self.population.len());
        let angle_counts: Vec<usize> = self.input.pieces.iter().map(|p| p.allowed_angles.len()).collect();
        let master_seed = self.master_seed;
        let population = &self.population;
        let config = self.config;

        (0..config.population_size)
            .into_par_iter()
            .map(|i| {
                if i < elite {
                    population[i].clone()
                } else {
                    let mut rng = task_rng(master_seed, i as u64);
                    let p1 = tournament_select(population, config.tournament_size, &mut rng);
                    let p2 = tournament_select(population, config.tournament_size, &mut rng);
                    let mut child = order_crossover(&population[p1], &population[p2], &mut rng);
                    mutate(&mut child, &angle_counts, config.mutation_rate, &mut rng);
                    child
                }
            })
            .collect()
    }

    /// Evolve for [`GAConfig::generations`] fixed generations. The best-ever
    /// layout, authoritative after the final generation, is returned
    /// alongside the genome that produced it.
    pub fn evolve(mut self) -> (Genome, Layout) {
        for generation in 0..self.config.generations {
            self.evaluate_population();
            self.sort_by_fitness_desc();
            self.maybe_capture_best_ever(generation);
            info!(
                "generation {generation}: population best fitness={:.3}",
                self.population[0].fitness_or_worst()
            );
            self.population = self.next_generation();
        }
        self.evaluate_population();
        self.sort_by_fitness_desc();
        self.maybe_capture_best_ever(self.config.generations);
        self.best_ever.expect("population is never empty, so best-ever is always captured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn genome(sequence: Vec<usize>, rotation: Vec<usize>) -> Genome {
        let mut g = Genome::new(sequence, rotation);
        g.fitness = Some(0.0);
        g
    }

    #[test]
    fn order_crossover_produces_a_permutation() {
        let mut rng = SmallRng::seed_from_u64(1);
        let p1 = genome(vec![0, 1, 2, 3, 4], vec![0, 0, 0, 0, 0]);
        let p2 = genome(vec![4, 3, 2, 1, 0], vec![0, 0, 0, 0, 0]);
        for _ in 0..20 {
            let child = order_crossover(&p1, &p2, &mut rng);
            let mut sorted = child.sequence.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn rotation_inheritance_picks_one_parent_per_piece_id() {
        let mut rng = SmallRng::seed_from_u64(2);
        let p1 = genome(vec![0, 1, 2], vec![0, 0, 0]);
        let p2 = genome(vec![2, 1, 0], vec![1, 1, 1]);
        let child = order_crossover(&p1, &p2, &mut rng);
        for &r in &child.rotation {
            assert!(r == 0 || r == 1);
        }
    }

    #[test]
    fn tournament_select_prefers_higher_fitness() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut population = vec![
            genome(vec![0, 1], vec![0, 0]),
            genome(vec![1, 0], vec![0, 0]),
            genome(vec![0, 1], vec![0, 0]),
        ];
        population[0].fitness = Some(-10.0);
        population[1].fitness = Some(100.0);
        population[2].fitness = Some(-5.0);
        let mut wins = 0;
        for _ in 0..200 {
            if tournament_select(&population, 3, &mut rng) == 1 {
                wins += 1;
            }
        }
        assert!(wins > 150);
    }

    #[test]
    fn greedy_genome_orders_by_decreasing_area() {
        let pieces = vec![
            crate::model::Piece::new(0, vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)], vec![0]),
            crate::model::Piece::new(1, vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)], vec![0]),
        ];
        let input = InputDescriptor {
            board_width: 100.0,
            board_height: 100.0,
            distance_between_boards: 0.0,
            distance_between_pieces: 0.0,
            pieces,
        };
        let g = greedy_genome(&input);
        assert_eq!(g.sequence, vec![1, 0]);
    }

    #[test]
    fn evolution_runs_to_completion_and_captures_a_best_ever() {
        let pieces = (0..4)
            .map(|i| {
                crate::model::Piece::new(
                    i,
                    vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0), Point::new(50.0, 50.0), Point::new(0.0, 50.0)],
                    vec![0],
                )
            })
            .collect();
        let input = InputDescriptor {
            board_width: 100.0,
            board_height: 100.0,
            distance_between_boards: 0.0,
            distance_between_pieces: 0.0,
            pieces,
        };
        let config = GAConfig { population_size: 8, generations: 3, tournament_size: 3, mutation_rate: 0.15, elite_size: 2 };
        let evolution = Evolution::new(&input, config, 42);
        let (genome, layout) = evolution.evolve();
        assert_eq!(genome.board_count, Some(layout.boards.len()));
        assert!((layout.efficiency() - 1.0).abs() < 1e-9);
    }
}
