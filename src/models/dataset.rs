use std::collections::BTreeMap;

use super::{Movie, MovieId, MovieStats, Rating, UserId, MAX_RATING, MIN_RATING};
use crate::error::{EngineError, EngineResult};

/// Immutable snapshot of the two input tables and everything derived from them
///
/// Built once per load and shared by reference with every engine call.
/// All indexes are ordered maps so iteration order is reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    movies: BTreeMap<MovieId, Movie>,
    stats: BTreeMap<MovieId, MovieStats>,
    ratings: Vec<Rating>,
    by_user: BTreeMap<UserId, BTreeMap<MovieId, f64>>,
    by_movie: BTreeMap<MovieId, BTreeMap<UserId, f64>>,
    orphan_ratings: usize,
    duplicate_ratings: usize,
}

impl Dataset {
    /// Joins ratings onto movies and derives per-movie statistics
    ///
    /// Ratings for movies missing from the movie table are dropped and
    /// counted. Every surviving row feeds the movie statistics; a repeated
    /// (user, movie) pair is averaged into a single cell of the user and
    /// movie indexes. A repeated movie id in the movie table is a load error.
    pub fn new(movies: Vec<Movie>, ratings: Vec<Rating>) -> EngineResult<Self> {
        if movies.is_empty() {
            return Err(EngineError::EmptyDataset(
                "movie table has no rows".to_string(),
            ));
        }
        if ratings.is_empty() {
            return Err(EngineError::EmptyDataset(
                "rating table has no rows".to_string(),
            ));
        }

        let mut by_id: BTreeMap<MovieId, Movie> = BTreeMap::new();
        for movie in movies {
            let movie_id = movie.movie_id;
            if by_id.insert(movie_id, movie).is_some() {
                return Err(EngineError::data_load(
                    "movies",
                    format!("movie {} appears more than once", movie_id),
                ));
            }
        }
        let movies = by_id;

        let mut kept = Vec::with_capacity(ratings.len());
        let mut cells: BTreeMap<UserId, BTreeMap<MovieId, (f64, usize)>> = BTreeMap::new();
        let mut received: BTreeMap<MovieId, Vec<f64>> = BTreeMap::new();
        let mut orphan_ratings = 0;
        let mut duplicate_ratings = 0;

        for r in ratings {
            if !r.rating.is_finite() || r.rating < MIN_RATING || r.rating > MAX_RATING {
                return Err(EngineError::data_load(
                    "ratings",
                    format!(
                        "rating {} for user {} movie {} is outside {}-{}",
                        r.rating, r.user_id, r.movie_id, MIN_RATING, MAX_RATING
                    ),
                ));
            }
            if !movies.contains_key(&r.movie_id) {
                orphan_ratings += 1;
                continue;
            }

            let cell = cells
                .entry(r.user_id)
                .or_default()
                .entry(r.movie_id)
                .or_insert((0.0, 0));
            if cell.1 > 0 {
                duplicate_ratings += 1;
            }
            cell.0 += r.rating;
            cell.1 += 1;

            received.entry(r.movie_id).or_default().push(r.rating);
            kept.push(r);
        }

        if kept.is_empty() {
            return Err(EngineError::EmptyDataset(format!(
                "none of the {} ratings reference a known movie",
                orphan_ratings
            )));
        }

        let mut by_user: BTreeMap<UserId, BTreeMap<MovieId, f64>> = BTreeMap::new();
        let mut by_movie: BTreeMap<MovieId, BTreeMap<UserId, f64>> = BTreeMap::new();
        for (user_id, rated) in cells {
            let row = by_user.entry(user_id).or_default();
            for (movie_id, (sum, count)) in rated {
                let rating = sum / count as f64;
                row.insert(movie_id, rating);
                by_movie.entry(movie_id).or_default().insert(user_id, rating);
            }
        }

        let stats = movies
            .keys()
            .map(|&movie_id| {
                let rows = received.get(&movie_id).into_iter().flatten().copied();
                (movie_id, MovieStats::from_ratings(movie_id, rows))
            })
            .collect();

        Ok(Self {
            movies,
            stats,
            ratings: kept,
            by_user,
            by_movie,
            orphan_ratings,
            duplicate_ratings,
        })
    }

    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movies.get(&movie_id)
    }

    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    pub fn stats(&self, movie_id: MovieId) -> Option<&MovieStats> {
        self.stats.get(&movie_id)
    }

    pub fn all_stats(&self) -> impl Iterator<Item = &MovieStats> {
        self.stats.values()
    }

    /// Success rate of a movie, 0 when it is unknown or unrated
    pub fn success_rate(&self, movie_id: MovieId) -> f64 {
        self.stats
            .get(&movie_id)
            .map(|s| s.success_rate)
            .unwrap_or(0.0)
    }

    /// Every rating row that survived the orphan filter, in input order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// A user's ratings keyed by movie, `None` if the user never rated anything
    pub fn user_ratings(&self, user_id: UserId) -> Option<&BTreeMap<MovieId, f64>> {
        self.by_user.get(&user_id)
    }

    /// Like [`Dataset::user_ratings`] but an unknown user is an error
    pub fn require_user(&self, user_id: UserId) -> EngineResult<&BTreeMap<MovieId, f64>> {
        self.user_ratings(user_id)
            .ok_or(EngineError::UnknownUser(user_id))
    }

    /// Ratings a movie received keyed by user
    pub fn movie_ratings(&self, movie_id: MovieId) -> Option<&BTreeMap<UserId, f64>> {
        self.by_movie.get(&movie_id)
    }

    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.by_user.keys().copied()
    }

    pub fn has_user(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Ratings dropped because their movie is missing from the movie table
    pub fn orphan_ratings(&self) -> usize {
        self.orphan_ratings
    }

    /// Extra rows for a (user, movie) pair already rated; averaged into one cell
    pub fn duplicate_ratings(&self) -> usize {
        self.duplicate_ratings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> Vec<Movie> {
        vec![
            Movie::new(10, "Heat (1995)", "Action|Crime|Thriller"),
            Movie::new(20, "Casino (1995)", "Crime|Drama"),
            Movie::new(30, "Nixon (1995)", "Drama"),
        ]
    }

    #[test]
    fn test_stats_filled_for_unrated_movie() {
        let ratings = vec![Rating::new(1, 10, 4.0), Rating::new(2, 10, 5.0)];
        let dataset = Dataset::new(movies(), ratings).unwrap();

        assert_eq!(dataset.success_rate(10), 90.0);
        let unrated = dataset.stats(30).unwrap();
        assert_eq!(unrated.rating_count, 0);
        assert_eq!(unrated.success_rate, 0.0);
    }

    #[test]
    fn test_orphan_ratings_are_dropped() {
        let ratings = vec![Rating::new(1, 10, 4.0), Rating::new(1, 99, 5.0)];
        let dataset = Dataset::new(movies(), ratings).unwrap();

        assert_eq!(dataset.rating_count(), 1);
        assert_eq!(dataset.orphan_ratings(), 1);
        assert!(dataset.stats(99).is_none());
    }

    #[test]
    fn test_duplicate_ratings_all_count_toward_stats() {
        let ratings = vec![
            Rating::new(1, 10, 2.0),
            Rating::new(1, 10, 4.0),
            Rating::new(2, 10, 3.0),
        ];
        let dataset = Dataset::new(movies(), ratings).unwrap();

        assert_eq!(dataset.duplicate_ratings(), 1);
        assert_eq!(dataset.rating_count(), 3);

        let stats = dataset.stats(10).unwrap();
        assert_eq!(stats.rating_count, 3);
        assert_eq!(stats.mean_rating, 3.0);
        assert_eq!(stats.success_rate, 60.0);

        // the repeated pair collapses to its mean in both indexes
        assert_eq!(dataset.user_ratings(1).unwrap()[&10], 3.0);
        assert_eq!(dataset.movie_ratings(10).unwrap()[&1], 3.0);
        assert_eq!(dataset.movie_ratings(10).unwrap().len(), 2);
    }

    #[test]
    fn test_repeated_movie_id_rejected() {
        let mut movies = movies();
        movies.push(Movie::new(10, "Heat (2025)", "Action"));
        let err = Dataset::new(movies, vec![Rating::new(1, 10, 4.0)]).unwrap_err();
        assert!(matches!(err, EngineError::DataLoad { source_name: "movies", .. }));
    }

    #[test]
    fn test_empty_tables_rejected() {
        let err = Dataset::new(Vec::new(), vec![Rating::new(1, 10, 4.0)]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset(_)));

        let err = Dataset::new(movies(), Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset(_)));
    }

    #[test]
    fn test_all_orphans_is_empty_dataset() {
        let err = Dataset::new(movies(), vec![Rating::new(1, 99, 4.0)]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset(_)));
    }

    #[test]
    fn test_out_of_scale_rating_rejected() {
        let err = Dataset::new(movies(), vec![Rating::new(1, 10, 7.0)]).unwrap_err();
        assert!(matches!(err, EngineError::DataLoad { .. }));

        let err = Dataset::new(movies(), vec![Rating::new(1, 10, 0.0)]).unwrap_err();
        assert!(matches!(err, EngineError::DataLoad { .. }));
    }

    #[test]
    fn test_require_user() {
        let dataset = Dataset::new(movies(), vec![Rating::new(1, 10, 4.0)]).unwrap();
        assert!(dataset.require_user(1).is_ok());
        assert_eq!(
            dataset.require_user(2).unwrap_err(),
            EngineError::UnknownUser(2)
        );
    }
}
