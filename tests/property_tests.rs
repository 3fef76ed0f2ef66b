use proptest::prelude::*;

use taste_twin::models::{Dataset, Movie, Rating};
use taste_twin::services::{cosine_similarity, Recommender, RecommenderSettings};

const MOVIE_IDS: u32 = 12;

fn rating_strategy() -> impl Strategy<Value = f64> {
    (1u32..=10).prop_map(|half_stars| half_stars as f64 / 2.0)
}

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec((1u32..8, 1u32..=MOVIE_IDS, rating_strategy()), 1..60).prop_map(
        |triples| {
            let movies = (1..=MOVIE_IDS)
                .map(|id| {
                    let genres = if id % 3 == 0 { "Drama" } else { "Comedy|Drama" };
                    Movie::new(id, format!("Movie {}", id), genres)
                })
                .collect();
            let ratings = triples
                .into_iter()
                .map(|(user, movie, rating)| Rating::new(user, movie, rating))
                .collect();
            Dataset::new(movies, ratings).unwrap()
        },
    )
}

fn vector_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..16).prop_flat_map(|len| {
        (
            prop::collection::vec(prop_oneof![Just(0.0), rating_strategy()], len),
            prop::collection::vec(prop_oneof![Just(0.0), rating_strategy()], len),
        )
    })
}

proptest! {
    #[test]
    fn prop_cosine_is_symmetric_and_bounded((a, b) in vector_strategy()) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn prop_success_rate_in_range(dataset in dataset_strategy()) {
        for stats in dataset.all_stats() {
            prop_assert!((0.0..=100.0).contains(&stats.success_rate));
        }
    }

    #[test]
    fn prop_target_never_its_own_neighbor(dataset in dataset_strategy()) {
        let settings = RecommenderSettings { min_votes: 0, ..RecommenderSettings::default() };
        let recommender = Recommender::new(&dataset, &settings);

        for user_id in dataset.user_ids() {
            if let Ok(ranking) = recommender.similarity(user_id) {
                prop_assert!(ranking.neighbors.iter().all(|n| n.user_id != user_id));
                prop_assert_eq!(ranking.neighbors.len(), dataset.user_count() - 1);
                for pair in ranking.neighbors.windows(2) {
                    prop_assert!(
                        pair[0].score > pair[1].score
                            || (pair[0].score == pair[1].score && pair[0].user_id < pair[1].user_id)
                    );
                }
            }
        }
    }

    #[test]
    fn prop_recommendations_skip_watched_movies(dataset in dataset_strategy()) {
        let settings = RecommenderSettings { min_votes: 0, ..RecommenderSettings::default() };
        let recommender = Recommender::new(&dataset, &settings);

        for user_id in dataset.user_ids() {
            let watched = dataset.user_ratings(user_id).unwrap();

            let item_based = recommender.item_based(user_id).unwrap();
            prop_assert!(item_based.len() <= 5);
            prop_assert!(item_based.iter().all(|r| !watched.contains_key(&r.movie_id())));

            let content = recommender.content_based(user_id).unwrap();
            prop_assert!(content.recommendations.iter().all(|r| !watched.contains_key(&r.movie_id())));

            if let Ok(user_based) = recommender.user_based(user_id) {
                prop_assert!(user_based.recommendations.iter().all(|r| !watched.contains_key(&r.movie_id())));
            }
        }
    }
}
