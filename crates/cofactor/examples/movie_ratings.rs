//! Movie ratings example
//!
//! Factorizes a small in-memory ratings table (5 movies, 4 viewers, ratings
//! 1-5 with 0 meaning "not rated") and prints the completed table.
//!
//! Run with: RUST_LOG=info cargo run --example movie_ratings

use cofactor::prelude::*;
use tracing_subscriber::EnvFilter;

const MOVIES: [&str; 5] = [
    "Love at last",
    "Romance forever",
    "Cute puppies of love",
    "Nonstop car chases",
    "Swords vs. karate",
];

fn main() -> cofactor::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Movie Ratings Factorization ===\n");

    #[rustfmt::skip]
    let ratings = DMatrix::from_row_slice(5, 4, &[
        5.0, 5.0, 0.0, 0.0,
        5.0, 0.0, 0.0, 0.0,
        0.0, 4.0, 0.0, 0.0,
        0.0, 0.0, 5.0, 4.0,
        0.0, 0.0, 5.0, 0.0,
    ]);
    let mask = ObservationMask::from_sentinel(&ratings, 0.0);
    println!(
        "Observed {} of {} ratings ({:.0}%)\n",
        mask.observed_count(),
        ratings.len(),
        mask.density() * 100.0
    );

    let model = MatrixFactorization::new(
        FactorizationConfig::new()
            .with_factors(2)
            .with_learning_rate(0.01)
            .with_regularization(0.1)
            .with_iterations(2_000)
            .with_report_every(200)
            .with_seed(42),
    )?;
    println!("Model: {}", model.name());

    let result = model.fit_with_callback(&ratings, &mask, &mut LoggingCallback)?;
    println!(
        "\nFinished {} iterations in {:?}, final cost {:.4}",
        result.iterations, result.duration, result.final_cost
    );
    if let Some(rmse) = result.observed_rmse(&ratings, &mask)? {
        println!("RMSE on observed ratings: {:.4}", rmse);
    }

    println!("\nPredicted ratings (* = observed):");
    let predicted = result.predict();
    for (i, movie) in MOVIES.iter().enumerate() {
        let row: Vec<String> = (0..predicted.ncols())
            .map(|j| {
                let marker = if mask.is_observed(i, j) { "*" } else { " " };
                format!("{:5.2}{}", predicted[(i, j)], marker)
            })
            .collect();
        println!("  {:<22} {}", movie, row.join(" "));
    }

    Ok(())
}
