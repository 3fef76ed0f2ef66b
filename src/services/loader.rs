//! CSV ingestion for the ratings and movies tables.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    error::{EngineError, EngineResult},
    models::{Dataset, Movie, Rating},
};

const RATINGS: &str = "ratings";
const MOVIES: &str = "movies";

/// Loads both tables and derives the immutable [`Dataset`]
///
/// Header names are trimmed before matching and unknown columns are ignored.
/// A table without data rows is an [`EngineError::EmptyDataset`]; a missing
/// column or an unparseable cell is an [`EngineError::DataLoad`].
pub fn load<R, M>(ratings_source: R, movies_source: M) -> EngineResult<Dataset>
where
    R: Read,
    M: Read,
{
    let movies = read_movies(movies_source)?;
    let ratings = read_ratings(ratings_source)?;
    Dataset::new(movies, ratings)
}

/// Opens the two CSV files and loads them
pub fn load_from_paths(ratings_path: &Path, movies_path: &Path) -> EngineResult<Dataset> {
    let start = Instant::now();

    let ratings = open(RATINGS, ratings_path)?;
    let movies = open(MOVIES, movies_path)?;
    let dataset = load(ratings, movies)?;

    tracing::info!(
        ratings_path = %ratings_path.display(),
        movies_path = %movies_path.display(),
        movies = dataset.movie_count(),
        ratings = dataset.rating_count(),
        users = dataset.user_count(),
        elapsed_ms = start.elapsed().as_millis(),
        "Dataset loaded"
    );

    if dataset.orphan_ratings() > 0 {
        tracing::warn!(
            count = dataset.orphan_ratings(),
            "Dropped ratings for movies missing from the movie table"
        );
    }
    if dataset.duplicate_ratings() > 0 {
        tracing::warn!(
            count = dataset.duplicate_ratings(),
            "Repeated user/movie ratings; averaged into one cell"
        );
    }

    Ok(dataset)
}

fn open(source_name: &'static str, path: &Path) -> EngineResult<File> {
    File::open(path).map_err(|e| {
        EngineError::data_load(source_name, format!("cannot open {}: {}", path.display(), e))
    })
}

fn read_ratings<R: Read>(source: R) -> EngineResult<Vec<Rating>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| EngineError::data_load(RATINGS, e.to_string()))?
        .clone();
    let user_idx = find_column(RATINGS, &headers, "userId")?;
    let movie_idx = find_column(RATINGS, &headers, "movieId")?;
    let rating_idx = find_column(RATINGS, &headers, "rating")?;

    let mut ratings = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| EngineError::data_load(RATINGS, e.to_string()))?;
        ratings.push(Rating {
            user_id: parse_cell(RATINGS, &record, user_idx, "userId")?,
            movie_id: parse_cell(RATINGS, &record, movie_idx, "movieId")?,
            rating: parse_cell(RATINGS, &record, rating_idx, "rating")?,
        });
    }

    if ratings.is_empty() {
        return Err(EngineError::EmptyDataset(format!(
            "{} table has no rows",
            RATINGS
        )));
    }
    Ok(ratings)
}

fn read_movies<R: Read>(source: R) -> EngineResult<Vec<Movie>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| EngineError::data_load(MOVIES, e.to_string()))?
        .clone();
    let movie_idx = find_column(MOVIES, &headers, "movieId")?;
    let title_idx = find_column(MOVIES, &headers, "title")?;
    let genres_idx = find_column(MOVIES, &headers, "genres")?;

    let mut movies = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| EngineError::data_load(MOVIES, e.to_string()))?;
        let movie_id = parse_cell(MOVIES, &record, movie_idx, "movieId")?;
        let title = get_required(MOVIES, &record, title_idx, "title")?;
        let genres = record.get(genres_idx).unwrap_or_default();
        movies.push(Movie::new(movie_id, title, genres));
    }

    if movies.is_empty() {
        return Err(EngineError::EmptyDataset(format!(
            "{} table has no rows",
            MOVIES
        )));
    }
    Ok(movies)
}

fn find_column(
    source_name: &'static str,
    headers: &StringRecord,
    name: &str,
) -> EngineResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| EngineError::data_load(source_name, format!("column '{}' not found", name)))
}

fn get_required<'a>(
    source_name: &'static str,
    record: &'a StringRecord,
    idx: usize,
    name: &str,
) -> EngineResult<&'a str> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            EngineError::data_load(
                source_name,
                format!("{}: missing value for column '{}'", line_of(record), name),
            )
        })
}

fn parse_cell<T: FromStr>(
    source_name: &'static str,
    record: &StringRecord,
    idx: usize,
    name: &str,
) -> EngineResult<T> {
    let raw = get_required(source_name, record, idx, name)?;
    raw.parse().map_err(|_| {
        EngineError::data_load(
            source_name,
            format!("{}: invalid value '{}' for column '{}'", line_of(record), raw, name),
        )
    })
}

fn line_of(record: &StringRecord) -> String {
    match record.position() {
        Some(pos) => format!("line {}", pos.line()),
        None => "unknown line".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIES_CSV: &str = "movieId,title,genres\n\
        1,Toy Story (1995),Adventure|Animation|Children\n\
        2,\"American President, The (1995)\",Comedy|Drama|Romance\n\
        3,Unrated Film (2001),(no genres listed)\n";

    const RATINGS_CSV: &str = "userId,movieId,rating,timestamp\n\
        1,1,4.0,964982703\n\
        1,2,5.0,964981247\n\
        2,1,3.0,964982224\n";

    #[test]
    fn test_load_computes_stats() {
        let dataset = load(RATINGS_CSV.as_bytes(), MOVIES_CSV.as_bytes()).unwrap();

        assert_eq!(dataset.movie_count(), 3);
        assert_eq!(dataset.rating_count(), 3);
        assert_eq!(dataset.user_count(), 2);
        assert_eq!(dataset.success_rate(1), 70.0);
        assert_eq!(dataset.success_rate(2), 100.0);
        assert_eq!(dataset.success_rate(3), 0.0);
        assert_eq!(
            dataset.movie(2).unwrap().title,
            "American President, The (1995)"
        );
        assert!(dataset.movie(3).unwrap().genres.is_empty());
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        let ratings = " userId , movieId ,rating \n1, 1 ,4.5\n";
        let movies = "movieId , title,  genres\n1,Heat (1995),Action\n";
        let dataset = load(ratings.as_bytes(), movies.as_bytes()).unwrap();
        assert_eq!(dataset.user_ratings(1).unwrap()[&1], 4.5);
    }

    #[test]
    fn test_missing_column_is_data_load_error() {
        let ratings = "userId,movieId\n1,1\n";
        let err = load(ratings.as_bytes(), MOVIES_CSV.as_bytes()).unwrap_err();
        match err {
            EngineError::DataLoad {
                source_name,
                message,
            } => {
                assert_eq!(source_name, "ratings");
                assert!(message.contains("'rating'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_cell_is_data_load_error() {
        let ratings = "userId,movieId,rating\n1,1,great\n";
        let err = load(ratings.as_bytes(), MOVIES_CSV.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::DataLoad { .. }));
        assert!(err.to_string().contains("great"));
    }

    #[test]
    fn test_header_only_table_is_empty_dataset() {
        let ratings = "userId,movieId,rating\n";
        let err = load(ratings.as_bytes(), MOVIES_CSV.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset(_)));

        let movies = "movieId,title,genres\n";
        let err = load(RATINGS_CSV.as_bytes(), movies.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDataset(_)));
    }

    #[test]
    fn test_repeated_rating_rows_are_averaged() {
        let ratings = "userId,movieId,rating\n1,1,2.0\n1,1,4.0\n2,1,3.0\n";
        let dataset = load(ratings.as_bytes(), MOVIES_CSV.as_bytes()).unwrap();

        assert_eq!(dataset.duplicate_ratings(), 1);
        assert_eq!(dataset.stats(1).unwrap().rating_count, 3);
        assert_eq!(dataset.success_rate(1), 60.0);
        assert_eq!(dataset.user_ratings(1).unwrap()[&1], 3.0);
    }

    #[test]
    fn test_repeated_movie_row_is_data_load_error() {
        let movies = "movieId,title,genres\n1,Heat (1995),Action\n1,Heat (1995),Crime\n";
        let err = load(RATINGS_CSV.as_bytes(), movies.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DataLoad {
                source_name: "movies",
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = load_from_paths(
            Path::new("/nonexistent/ratings.csv"),
            Path::new("/nonexistent/movies.csv"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::DataLoad {
                source_name: "ratings",
                ..
            }
        ));
    }

    #[test]
    fn test_load_is_deterministic() {
        let a = load(RATINGS_CSV.as_bytes(), MOVIES_CSV.as_bytes()).unwrap();
        let b = load(RATINGS_CSV.as_bytes(), MOVIES_CSV.as_bytes()).unwrap();
        assert_eq!(a, b);
    }
}
