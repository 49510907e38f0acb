//! Integration tests for the credential and review stores.
//!
//! These exercise the file-level behavior: what ends up on disk after
//! registrations, logins and reviews.

use accounts::{
    AccountError, BcryptVerifier, CredentialStore, Gender, NewUser, ReviewStore, StarRating,
};
use std::path::Path;

fn form(username: &str, password: &str) -> NewUser {
    NewUser {
        name: "Ravi Kumar".to_string(),
        college: "North Campus".to_string(),
        domain: "Literature".to_string(),
        roll_no: "LIT-7".to_string(),
        contact: "5550199".to_string(),
        gender: Gender::Male,
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn row_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|content| content.lines().count().saturating_sub(1))
        .unwrap_or(0)
}

#[test]
fn empty_field_never_creates_a_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("users.csv"));

    let blanks: [fn(&mut NewUser); 7] = [
        |u| u.name.clear(),
        |u| u.college.clear(),
        |u| u.domain.clear(),
        |u| u.roll_no.clear(),
        |u| u.contact.clear(),
        |u| u.username.clear(),
        |u| u.password.clear(),
    ];
    for blank in blanks {
        let mut user = form("ravi", "pw");
        blank(&mut user);
        assert!(matches!(
            store.register(user),
            Err(AccountError::MissingField(_))
        ));
    }

    assert!(!store.path().exists());
    assert_eq!(row_count(store.path()), 0);
}

#[test]
fn duplicate_usernames_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("users.csv"));

    store.register(form("ravi", "first")).unwrap();
    store.register(form("ravi", "second")).unwrap();

    assert_eq!(store.users().unwrap().len(), 2);
    assert_eq!(store.login("ravi", "first").unwrap().password, "first");
    assert_eq!(store.login("ravi", "second").unwrap().password, "second");
}

#[test]
fn unknown_pairs_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("users.csv"));
    store.register(form("ravi", "secret")).unwrap();
    store.register(form("asha", "other")).unwrap();

    for (user, pass) in [("ravi", "other"), ("asha", "secret"), ("nobody", "secret"), ("ravi", "")] {
        assert!(matches!(
            store.login(user, pass),
            Err(AccountError::InvalidCredentials)
        ));
    }
}

#[test]
fn bcrypt_store_never_writes_the_password() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        CredentialStore::new(dir.path().join("users.csv")).with_verifier(BcryptVerifier::new(4));

    store.register(form("ravi", "secret")).unwrap();

    let content = std::fs::read_to_string(store.path()).unwrap();
    assert!(!content.contains(",secret"));
    assert!(store.login("ravi", "secret").is_ok());
    assert!(store.login("ravi", "guess").is_err());
}

#[test]
fn each_review_appends_exactly_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReviewStore::new(dir.path().join("reviews.csv"));
    let four = StarRating::try_from(4).unwrap();

    // pre-existing content from an earlier session
    store.submit("asha", "Emma", StarRating::default(), "").unwrap();
    assert_eq!(row_count(store.path()), 1);

    store
        .submit("ravi", "Clara Callan", four, "Line one\nline two")
        .unwrap();
    store.submit("ravi", "", four, "no book selected").unwrap();

    let reviews = store.reviews().unwrap();
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[1].user, "ravi");
    assert_eq!(reviews[1].book, "Clara Callan");
    assert_eq!(reviews[1].rating, four);
    assert_eq!(reviews[1].review, "Line one\nline two");
    assert_eq!(reviews[2].book, "");
}
