//! End-to-end tests for the recommender and the view controller.
//!
//! Posters come from a counting fake so nothing touches the network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use accounts::{CredentialStore, Gender, NewUser, ReviewStore, StarRating};
use async_trait::async_trait;
use data_loader::{Book, BookRating, Catalog, BOOKS_FILE, RATINGS_FILE};
use poster_client::{PosterClientError, PosterFetcher, VolumeLookup};
use server::{AppConfig, AppContext, BookRecommender, Session, View};
use similarity::RatingMatrixBuilder;

#[derive(Clone, Default)]
struct FakeCovers {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl VolumeLookup for FakeCovers {
    async fn thumbnail(&self, title: &str) -> Result<String, PosterClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if title == "Emma" {
            return Err(PosterClientError::Status(404));
        }
        Ok(format!("https://covers.example/{}.jpg", title.len()))
    }
}

/// A and B are rated identically by users 1-3; C shares one rater with them.
/// D and E are rated by a separate crowd. "Orphan" has no ratings at all.
fn catalog() -> Catalog {
    let books = vec![
        Book::new("A", "Clara Callan"),
        Book::new("B", "Decision in Normandy"),
        Book::new("C", "Flu"),
        Book::new("D", "The Mummies of Urumchi"),
        Book::new("E", "Emma"),
        Book::new("F", "Orphan"),
    ];
    let mut ratings = Vec::new();
    for (user, score) in [(1, 9), (2, 4), (3, 7)] {
        ratings.push(BookRating::new(user, "A", score));
        ratings.push(BookRating::new(user, "B", score));
    }
    ratings.push(BookRating::new(3, "C", 5));
    ratings.push(BookRating::new(4, "C", 8));
    ratings.push(BookRating::new(5, "D", 6));
    ratings.push(BookRating::new(6, "D", 2));
    ratings.push(BookRating::new(5, "E", 3));
    ratings.push(BookRating::new(6, "E", 9));
    // rated, but its metadata row is missing
    ratings.push(BookRating::new(1, "Z", 9));
    Catalog::from_parts(books, ratings)
}

fn recommender(covers: FakeCovers) -> BookRecommender {
    BookRecommender::from_catalog(
        catalog(),
        RatingMatrixBuilder::new(),
        6,
        PosterFetcher::new(covers, 64),
    )
}

#[tokio::test]
async fn unknown_title_gives_empty_lists() {
    let recommender = recommender(FakeCovers::default());

    for title in ["Not A Book", "Orphan", ""] {
        let (titles, posters) = recommender.recommend_lists(title).await.unwrap();
        assert!(titles.is_empty());
        assert_eq!(titles.len(), posters.len());
    }
}

#[tokio::test]
async fn identical_raters_come_first() {
    let recommender = recommender(FakeCovers::default());

    let recs = recommender.recommend("Clara Callan").await.unwrap();

    assert!(recs.len() <= 6);
    // the queried book is not excluded, then its twin
    assert_eq!(recs[0].title, "Clara Callan");
    assert_eq!(recs[1].title, "Decision in Normandy");
    assert!(recs[1].distance < 1e-9);
    // "Z" has no title and is dropped
    assert!(recs.iter().all(|r| r.isbn != "Z"));
    assert_eq!(
        recs[1].links.amazon,
        "https://www.amazon.in/s?k=Decision+in+Normandy"
    );
}

#[tokio::test]
async fn every_title_has_a_poster_slot() {
    let recommender = recommender(FakeCovers::default());

    let (titles, posters) = recommender
        .recommend_lists("The Mummies of Urumchi")
        .await
        .unwrap();

    assert!(!titles.is_empty() && titles.len() <= 6);
    assert_eq!(titles.len(), posters.len());
    let emma = titles.iter().position(|t| t == "Emma").unwrap();
    assert_eq!(posters[emma], None);
}

#[tokio::test]
async fn posters_are_fetched_once_per_title() {
    let covers = FakeCovers::default();
    let recommender = recommender(covers.clone());

    let first = recommender.recommend("Flu").await.unwrap();
    let calls = covers.calls.load(Ordering::SeqCst);
    assert_eq!(calls, first.len());

    recommender.recommend("Flu").await.unwrap();
    assert_eq!(covers.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn index_is_built_lazily_and_rebuilt_after_invalidate() {
    let recommender = recommender(FakeCovers::default());
    assert_eq!(recommender.index_builds(), 0);

    recommender.recommend("Flu").await.unwrap();
    recommender.recommend("Clara Callan").await.unwrap();
    recommender.book_titles().await.unwrap();
    assert_eq!(recommender.index_builds(), 1);

    recommender.invalidate().await;
    recommender.recommend("Flu").await.unwrap();
    assert_eq!(recommender.index_builds(), 2);
}

#[tokio::test]
async fn selector_lists_only_indexed_books() {
    let recommender = recommender(FakeCovers::default());

    let titles = recommender.book_titles().await.unwrap();
    assert_eq!(titles.len(), 5);
    assert!(!titles.contains(&"Orphan".to_string()));

    assert_eq!(recommender.search("EMMA").await.unwrap(), vec!["Emma"]);
    assert_eq!(
        recommender.search("the").await.unwrap(),
        vec!["The Mummies of Urumchi"]
    );
}

#[tokio::test]
async fn changed_dataset_files_trigger_a_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let books = "\"ISBN\";\"Book-Title\"\n\"A\";\"Clara Callan\"\n\"B\";\"Flu\"\n";
    std::fs::write(dir.path().join(BOOKS_FILE), books).unwrap();
    std::fs::write(
        dir.path().join(RATINGS_FILE),
        "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\"1\";\"A\";\"5\"\n",
    )
    .unwrap();

    let config = AppConfig {
        data_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let recommender = BookRecommender::from_config(&config).unwrap();

    assert_eq!(recommender.book_titles().await.unwrap(), vec!["Clara Callan"]);
    assert_eq!(recommender.book_titles().await.unwrap(), vec!["Clara Callan"]);
    assert_eq!(recommender.index_builds(), 1);

    std::fs::write(
        dir.path().join(RATINGS_FILE),
        "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\"1\";\"A\";\"5\"\n\"2\";\"B\";\"7\"\n",
    )
    .unwrap();
    assert_eq!(
        recommender.book_titles().await.unwrap(),
        vec!["Clara Callan", "Flu"]
    );
    assert_eq!(recommender.index_builds(), 2);
}

#[tokio::test]
async fn review_flow_through_the_controller() {
    let dir = tempfile::tempdir().unwrap();
    let app = AppContext::new(
        CredentialStore::new(dir.path().join("users.csv")),
        ReviewStore::new(dir.path().join("reviews.csv")),
        recommender(FakeCovers::default()),
    );
    let mut session = Session::new();
    let five = StarRating::try_from(5).unwrap();

    assert!(app.submit_review(&session, five, "too early").is_err());

    app.register(NewUser {
        name: "Ana".to_string(),
        college: "West".to_string(),
        domain: "Physics".to_string(),
        roll_no: "P-9".to_string(),
        contact: "5550123".to_string(),
        gender: Gender::Female,
        username: "ana".to_string(),
        password: "pw".to_string(),
    })
    .unwrap();
    app.login(&mut session, "ana", "pw").unwrap();
    assert_eq!(session.current_view(), View::Recommender);

    session.select_book("Flu");
    app.submit_review(&session, five, "Gripping").unwrap();

    let reviews = app.reviews().reviews().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].user, "ana");
    assert_eq!(reviews[0].book, "Flu");
    assert_eq!(reviews[0].rating, five);
    assert_eq!(reviews[0].review, "Gripping");

    app.logout(&mut session);
    assert_eq!(session.current_view(), View::Login);
}
