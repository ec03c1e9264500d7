use optim_core::{Adagrad, Adam, Optimizer, Sgd, SgdState};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 0.5 * ||x - target||^2, minimized at `target`.
fn quadratic(target: Vec<f32>) -> impl FnMut(&[f32]) -> (f32, Vec<f32>) {
    move |x: &[f32]| {
        let grad: Vec<f32> = x.iter().zip(&target).map(|(xi, ti)| xi - ti).collect();
        let loss = grad.iter().map(|g| 0.5 * g * g).sum();
        (loss, grad)
    }
}

/// Drives any algorithm through the shared protocol with one persistent
/// state, returning the full loss history.
fn minimize<O: Optimizer>(
    algorithm: &O,
    x: &mut [f32],
    target: Vec<f32>,
    iters: usize,
) -> Vec<f32> {
    let mut objective = quadratic(target);
    let mut state = O::State::default();
    let mut history = Vec::new();

    for _ in 0..iters {
        let losses = algorithm.step(&mut objective, x, &mut state).unwrap();
        assert_eq!(losses.len(), 1);
        history.extend(losses);
    }

    history
}

#[test]
fn plain_sgd_reaches_the_minimum() {
    init_logging();
    let mut x = [4., -3., 0.];

    let history = minimize(&Sgd::new(0.1), &mut x, vec![1., 2., -1.], 200);

    assert!(history[0] > history[history.len() - 1]);
    for (xi, ti) in x.iter().zip([1., 2., -1.]) {
        assert!((xi - ti).abs() < 1e-3, "x = {x:?}");
    }
}

#[test]
fn momentum_sgd_reaches_the_minimum() {
    init_logging();
    let sgd = Sgd {
        learning_rate: 0.05,
        momentum: 0.9,
        dampening: Some(0.),
        nesterov: true,
        ..Sgd::default()
    };
    let mut x = [4., -3.];

    minimize(&sgd, &mut x, vec![0.5, 0.5], 400);

    for xi in x {
        assert!((xi - 0.5).abs() < 1e-3, "x = {x:?}");
    }
}

#[test]
fn adagrad_reaches_the_minimum() {
    init_logging();
    let mut x = [2., -2.];

    minimize(&Adagrad::new(0.5), &mut x, vec![1., 0.], 400);

    assert!((x[0] - 1.).abs() < 1e-2, "x = {x:?}");
    assert!(x[1].abs() < 1e-2, "x = {x:?}");
}

#[test]
fn adam_reaches_the_minimum() {
    init_logging();
    let mut x = [2., -2.];

    minimize(&Adam::new(0.02), &mut x, vec![1., 0.], 800);

    assert!((x[0] - 1.).abs() < 0.1, "x = {x:?}");
    assert!(x[1].abs() < 0.1, "x = {x:?}");
}

#[test]
fn state_persists_across_minibatches() {
    init_logging();

    // Two alternating minibatch objectives with different optima; the
    // shared configuration and state survive across all of them, as in a
    // training loop.
    let mut batch_a = quadratic(vec![1., 1.]);
    let mut batch_b = quadratic(vec![3., 3.]);

    let sgd = Sgd {
        learning_rate: 0.1,
        momentum: 0.5,
        dampening: Some(0.),
        ..Sgd::default()
    };
    let mut state = SgdState::default();
    let mut x = [10., -10.];

    let mut first = None;
    let mut last = 0.;
    for epoch in 0..100 {
        for on_a in [true, false] {
            let losses = if on_a {
                sgd.step(&mut batch_a, &mut x, &mut state).unwrap()
            } else {
                sgd.step(&mut batch_b, &mut x, &mut state).unwrap()
            };
            first.get_or_insert(losses[0]);
            last = losses[0];
        }
        assert_eq!(state.iteration(), (epoch + 1) * 2);
    }

    // The run settles between the two batch optima.
    assert!(last < first.unwrap());
    for xi in x {
        assert!((1. ..=3.).contains(&xi), "x = {x:?}");
    }
}

#[test]
fn losses_arrive_in_evaluation_order() {
    init_logging();

    let mut calls = 0;
    let mut objective = |_: &[f32]| {
        calls += 1;
        (calls as f32, vec![0.])
    };

    let sgd = Sgd::new(0.1);
    let mut state = SgdState::default();
    let mut x = [0.];

    let mut history = Vec::new();
    for _ in 0..3 {
        history.extend(sgd.step(&mut objective, &mut x, &mut state).unwrap());
    }

    assert_eq!(history, [1., 2., 3.]);
    assert_eq!(calls, 3);
}
