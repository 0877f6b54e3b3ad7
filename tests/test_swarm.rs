//! Tests for the swarm engine.
//!
//! These tests drive complete runs on small analytic problems and check the
//! properties every run must keep:
//! - positions never leave the bounds
//! - the archive stays mutually non-dominated and feasible once feasibility is reached
//! - runs are reproducible for a fixed seed, with or without parallel evaluation
//! - failed evaluations are absorbed and counted

#[cfg(test)]
mod test_swarm {
    use std::sync::{Arc, Mutex};

    use approx::assert_relative_eq;
    use bmpswarm::prelude::*;
    use ndarray::Array1;
    use pretty_assertions::assert_eq;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Schaffer's two-objective problem, optionally restricted to `x >= min_x`.
    struct Schaffer {
        min_x: Option<f64>,
    }

    impl Problem for Schaffer {
        fn dimension(&self) -> usize {
            1
        }

        fn n_objectives(&self) -> usize {
            2
        }

        fn evaluate(&self, x: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
            let objectives = vec![x[0].powi(2), (x[0] - 2.0).powi(2)];
            let margins = self.min_x.map(|m| vec![x[0] - m]).unwrap_or_default();
            Ok(Evaluation::new(objectives, margins))
        }
    }

    /// Single objective equal to the position, no constraints.
    struct Identity;

    impl Problem for Identity {
        fn dimension(&self) -> usize {
            1
        }

        fn n_objectives(&self) -> usize {
            1
        }

        fn evaluate(&self, x: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
            Ok(Evaluation::unconstrained(vec![x[0]]))
        }
    }

    /// Constraint that no position can satisfy.
    struct Unreachable;

    impl Problem for Unreachable {
        fn dimension(&self) -> usize {
            2
        }

        fn n_objectives(&self) -> usize {
            1
        }

        fn evaluate(&self, x: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
            let norm = x.mapv(|v| v * v).sum();
            Ok(Evaluation::new(vec![norm], vec![-1.0 - norm]))
        }
    }

    /// Fails for every position with `x > 0.3`.
    struct Flaky;

    impl Problem for Flaky {
        fn dimension(&self) -> usize {
            1
        }

        fn n_objectives(&self) -> usize {
            1
        }

        fn evaluate(&self, x: &Array1<f64>) -> Result<Evaluation, EvaluationError> {
            if x[0] > 0.3 {
                return Err(EvaluationError::Custom("outside lookup table".into()));
            }
            Ok(Evaluation::unconstrained(vec![(x[0] - 0.2).abs()]))
        }
    }

    /// Checks that the archive never gets worse between iterations: the least
    /// violation while it is infeasible, the per-objective bests once it is feasible.
    fn assert_non_degrading(history: &[IterationSummary]) {
        for pair in history.windows(2) {
            let (earlier, later) = (&pair[0], &pair[1]);
            if earlier.feasible_archive {
                assert!(later.feasible_archive);
                for (e, l) in earlier.best_objectives.iter().zip(&later.best_objectives) {
                    assert!(l <= e);
                }
            } else if !later.feasible_archive {
                assert!(later.min_violation <= earlier.min_violation);
            }
        }
    }

    fn config(nparts: usize, dimension: usize, nobjs: usize, max_iterations: usize) -> PsoConfig {
        PsoConfigBuilder::default()
            .nparts(nparts)
            .dimension(dimension)
            .nobjs(nobjs)
            .max_iterations(max_iterations)
            .lower_bound(-5.0)
            .upper_bound(5.0)
            .seed(Some(2024))
            .build()
            .expect("Failed to build config")
    }

    #[test]
    fn test_positions_stay_within_bounds() {
        init_logger();

        // ARRANGE
        let mut cfg = config(20, 1, 2, 30);
        cfg.w = 1.2;
        cfg.c1 = 2.5;
        cfg.c2 = 2.5;
        let mut swarm = Swarm::new(cfg, Schaffer { min_x: None }).unwrap();

        // ACT & ASSERT
        swarm.initialize().unwrap();
        while swarm.state() != SwarmState::Finalized {
            swarm.step().unwrap();
            for particle in swarm.particles() {
                assert!(particle.position().iter().all(|x| (-5.0..=5.0).contains(x)));
            }
        }
    }

    #[test]
    fn test_archive_is_mutually_non_dominated() {
        init_logger();

        let mut swarm = Swarm::new(config(15, 1, 2, 25), Schaffer { min_x: Some(1.0) }).unwrap();
        swarm.initialize().unwrap();

        while swarm.state() != SwarmState::Finalized {
            swarm.step().unwrap();
            let archive = swarm.archive();
            assert!(archive.is_mutually_non_dominated());
            if archive.has_feasible() {
                assert!(archive.members().iter().all(|m| m.feasible));
            }
        }
    }

    #[test]
    fn test_feasible_candidates_replace_infeasible_ones() {
        init_logger();

        let result = Swarm::new(config(20, 1, 2, 40), Schaffer { min_x: Some(1.5) })
            .unwrap()
            .run()
            .unwrap();

        assert!(result.feasible_found);
        for member in &result.final_pareto_set {
            assert!(member.feasible);
            assert_eq!(member.violation, 0.0);
            assert!(member.position[0] >= 1.5);
        }
    }

    #[test]
    fn test_trade_off_front_has_several_members() {
        let result = Swarm::new(config(20, 1, 2, 30), Schaffer { min_x: None })
            .unwrap()
            .run()
            .unwrap();

        assert!(result.final_pareto_set.len() >= 2);

        let front: Vec<Vec<f64>> = result
            .final_pareto_set
            .iter()
            .map(|m| m.objectives.clone())
            .collect();
        assert_eq!(dominated_count(&front), 0);
        assert!(hypervolume_2d(&front, [4.0, 4.0]) > 0.0);
    }

    #[test]
    fn test_best_objectives_never_degrade() {
        let result = Swarm::new(config(10, 1, 2, 30), Schaffer { min_x: None })
            .unwrap()
            .run()
            .unwrap();

        for pair in result.history.windows(2) {
            for (earlier, later) in pair[0].best_objectives.iter().zip(&pair[1].best_objectives) {
                assert!(later <= earlier);
            }
        }
    }

    #[test]
    fn test_constrained_runs_never_degrade() {
        init_logger();

        let mut cfg = config(10, 1, 2, 40);
        cfg.seed = Some(31);
        let constrained = Swarm::new(cfg, Schaffer { min_x: Some(4.5) })
            .unwrap()
            .run()
            .unwrap();
        assert!(constrained.feasible_found);
        assert_non_degrading(&constrained.history);

        let unreachable = Swarm::new(config(10, 2, 1, 20), Unreachable)
            .unwrap()
            .run()
            .unwrap();
        assert!(unreachable.history.iter().all(|s| !s.feasible_archive));
        assert_non_degrading(&unreachable.history);
    }

    #[test]
    fn test_same_seed_reproduces_run() {
        let first = Swarm::new(config(12, 1, 2, 20), Schaffer { min_x: Some(0.5) })
            .unwrap()
            .run()
            .unwrap();
        let second = Swarm::new(config(12, 1, 2, 20), Schaffer { min_x: Some(0.5) })
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(first.final_pareto_set, second.final_pareto_set);
        assert_eq!(first.final_population, second.final_population);
        assert_eq!(first.history, second.history);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let serial = Swarm::new(config(16, 1, 2, 20), Schaffer { min_x: Some(0.5) })
            .unwrap()
            .run()
            .unwrap();

        let mut cfg = config(16, 1, 2, 20);
        cfg.parallel = true;
        let parallel = Swarm::new(cfg, Schaffer { min_x: Some(0.5) })
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(serial.final_pareto_set, parallel.final_pareto_set);
        assert_eq!(serial.final_population, parallel.final_population);
    }

    #[test]
    fn test_different_seeds_give_different_populations() {
        let mut cfg = config(8, 1, 2, 5);
        let first = Swarm::new(cfg.clone(), Schaffer { min_x: None })
            .unwrap()
            .run()
            .unwrap();
        cfg.seed = Some(7);
        let second = Swarm::new(cfg, Schaffer { min_x: None }).unwrap().run().unwrap();

        assert_ne!(first.final_population, second.final_population);
    }

    #[test]
    fn test_unseeded_run_records_its_seed() {
        let mut cfg = config(6, 1, 2, 5);
        cfg.seed = None;
        let result = Swarm::new(cfg.clone(), Schaffer { min_x: None })
            .unwrap()
            .run()
            .unwrap();

        cfg.seed = Some(result.seed);
        let replay = Swarm::new(cfg, Schaffer { min_x: None }).unwrap().run().unwrap();
        assert_eq!(result.final_pareto_set, replay.final_pareto_set);
    }

    #[test]
    fn test_no_feasible_candidate_keeps_least_infeasible() {
        init_logger();

        let result = Swarm::new(config(10, 2, 1, 15), Unreachable)
            .unwrap()
            .run()
            .unwrap();

        assert!(!result.feasible_found);
        assert!(!result.final_pareto_set.is_empty());

        let least = result
            .final_population
            .iter()
            .map(|c| c.violation)
            .fold(f64::INFINITY, f64::min);
        for member in &result.final_pareto_set {
            assert!(!member.feasible);
            assert!(member.violation <= least);
            assert!(member.violation >= 1.0);
        }
    }

    #[test]
    fn test_failed_evaluations_are_absorbed() {
        init_logger();

        let cfg = PsoConfigBuilder::default()
            .nparts(30)
            .dimension(1)
            .nobjs(1)
            .max_iterations(10)
            .seed(Some(5))
            .build()
            .unwrap();

        let result = Swarm::new(cfg, Flaky).unwrap().run().unwrap();

        assert_eq!(result.iterations, 10);
        assert!(result.evaluation_failures > 0);
        assert!(result.feasible_found);
        for member in &result.final_pareto_set {
            assert!(member.violation.is_finite());
            assert!(member.position[0] <= 0.3);
        }

        let per_iteration: usize = result.history.iter().map(|s| s.evaluation_failures).sum();
        assert!(per_iteration <= result.evaluation_failures);
    }

    #[test]
    fn test_single_particle_single_dimension() {
        // ARRANGE
        let cfg = PsoConfigBuilder::default()
            .nparts(1)
            .dimension(1)
            .nobjs(1)
            .max_iterations(1)
            .lower_bound(0.0)
            .upper_bound(10.0)
            .w(0.5)
            .c1(1.0)
            .c2(1.0)
            .seed(Some(2024))
            .build()
            .expect("Failed to build config");
        let mut swarm = Swarm::new(cfg, Identity).unwrap();

        // ACT
        swarm.initialize().unwrap();

        // ASSERT
        let particle = &swarm.particles()[0];
        assert_eq!(particle.current_objectives(), &[particle.position()[0]]);
        assert_eq!(particle.personal_best_objectives(), particle.current_objectives());
        assert_eq!(swarm.archive().len(), 1);
        assert_eq!(&swarm.archive().members()[0], particle.personal_best());

        // The archive keeps tracking the personal best through the only iteration
        swarm.step().unwrap();
        assert_eq!(swarm.state(), SwarmState::Finalized);
        let particle = &swarm.particles()[0];
        assert_eq!(swarm.archive().len(), 1);
        assert_eq!(&swarm.archive().members()[0], particle.personal_best());
    }

    #[test]
    fn test_invalid_configuration_fails_before_particles_exist() {
        let mut cfg = config(10, 1, 2, 5);
        cfg.nparts = 0;
        assert!(matches!(
            Swarm::new(cfg, Schaffer { min_x: None }),
            Err(OptimizeError::NonPositiveCount { field: "nparts", .. })
        ));

        let mut cfg = config(10, 1, 2, 5);
        cfg.lower_bound = 3.0;
        cfg.upper_bound = -3.0;
        assert!(matches!(
            Swarm::new(cfg, Schaffer { min_x: None }),
            Err(OptimizeError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_config_from_json_drives_a_run() {
        let cfg = PsoConfig::from_json_str(
            r#"{
                "nparts": 8,
                "dimension": 1,
                "max_iterations": 6,
                "lower_bound": -3.0,
                "upper_bound": 3.0,
                "seed": 17,
                "guidance": "least_aggregate",
                "parallel": true
            }"#,
        )
        .unwrap();

        let result = Swarm::new(cfg.clone(), Schaffer { min_x: None })
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.iterations, 6);

        let round_trip = PsoConfig::from_json_str(&serde_json::to_string(&cfg).unwrap()).unwrap();
        assert_eq!(round_trip, cfg);
    }

    #[test]
    fn test_optimize_runner_with_callback_and_sink() {
        init_logger();

        let iterations = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&iterations);
        let callback = CallbackObserver::new(move |summary: &IterationSummary| {
            seen.lock().unwrap().push(summary.iteration);
        });

        let emitted = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&emitted);
        let sink: Box<dyn ReportSink> = Box::new(move |result: &RunResult| {
            *slot.lock().unwrap() = Some(result.final_pareto_set.len());
        });

        let result = optimize()
            .problem(Schaffer { min_x: None })
            .config(config(10, 1, 2, 8))
            .callback(callback)
            .sink(sink)
            .call()
            .unwrap();

        assert_eq!(*iterations.lock().unwrap(), (1..=8).collect::<Vec<_>>());
        assert_eq!(*emitted.lock().unwrap(), Some(result.final_pareto_set.len()));
        assert!(result.to_string().contains("Swarm Run Summary"));
    }

    #[test]
    fn test_ideal_point_matches_archive_minima() {
        let result = Swarm::new(config(10, 1, 2, 10), Schaffer { min_x: None })
            .unwrap()
            .run()
            .unwrap();

        let ideal = result.ideal_point();
        let last = result.history.last().unwrap();
        assert_eq!(ideal.len(), 2);
        assert_relative_eq!(ideal[0], last.best_objectives[0]);
        assert_relative_eq!(ideal[1], last.best_objectives[1]);
    }
}
