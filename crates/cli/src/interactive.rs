//! Interactive terminal session: the login/register screen and the
//! recommender screen, routed by the session's current view.

use std::fmt::Display;
use std::io::{BufRead, Write};

use accounts::{AccountError, Gender, NewUser, StarRating};
use anyhow::Result;
use colored::Colorize;
use server::{AppContext, BookRecommendation, Session, View};

/// How many recommendations are shown side by side
const DISPLAY_COLUMNS: usize = 5;
/// How many selector entries are listed at once
const SELECTOR_ROWS: usize = 20;

enum Flow {
    Continue,
    Quit,
}

/// Line-based terminal over any reader/writer pair
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a label and read one line; `None` on end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

/// Run until the user quits or input ends
pub async fn run<R: BufRead, W: Write>(app: &AppContext, term: &mut Terminal<R, W>) -> Result<()> {
    let mut session = Session::new();
    loop {
        let flow = match session.current_view() {
            View::Login => login_register_page(app, &mut session, term)?,
            View::Recommender => recommender_page(app, &mut session, term).await?,
        };
        if let Flow::Quit = flow {
            term.say("Goodbye!")?;
            return Ok(());
        }
    }
}

fn login_register_page<R: BufRead, W: Write>(
    app: &AppContext,
    session: &mut Session,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    term.say("")?;
    term.say("Books Recommender System - Login/Register".bold().blue())?;
    term.say("[1] Login  [2] Register  [q] Quit")?;
    let Some(choice) = term.prompt("> ")? else {
        return Ok(Flow::Quit);
    };

    match choice.trim().to_lowercase().as_str() {
        "1" | "login" => {
            let Some(username) = term.prompt("Username: ")? else {
                return Ok(Flow::Quit);
            };
            let Some(password) = term.prompt("Password: ")? else {
                return Ok(Flow::Quit);
            };
            match app.login(session, &username, &password) {
                Ok(()) => {}
                Err(AccountError::NoUsersFile) => term.say("No users registered yet.".red())?,
                Err(AccountError::InvalidCredentials) => term.say("Invalid credentials".red())?,
                Err(e) => return Err(e.into()),
            }
        }
        "2" | "register" => {
            let Some(form) = registration_form(term)? else {
                return Ok(Flow::Quit);
            };
            match app.register(form) {
                Ok(()) => term.say("Registration successful! You can now login.".green())?,
                Err(AccountError::MissingField(_)) => term.say("Please fill all fields.".red())?,
                Err(e) => return Err(e.into()),
            }
        }
        "q" | "quit" => return Ok(Flow::Quit),
        other => term.say(format!("Unknown choice: {}", other))?,
    }
    Ok(Flow::Continue)
}

/// Read the registration fields; `None` on end of input
fn registration_form<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<Option<NewUser>> {
    let mut fields = Vec::with_capacity(5);
    for label in [
        "Full Name: ",
        "College Name: ",
        "Domain / Field of Interest: ",
        "Roll Number: ",
        "Contact Number: ",
    ] {
        let Some(value) = term.prompt(label)? else {
            return Ok(None);
        };
        fields.push(value);
    }

    let gender = loop {
        let Some(value) = term.prompt("Gender (Male/Female/Other) [Male]: ")? else {
            return Ok(None);
        };
        if value.trim().is_empty() {
            break Gender::Male;
        }
        match value.parse::<Gender>() {
            Ok(gender) => break gender,
            Err(e) => term.say(e.to_string().red())?,
        }
    };

    let Some(username) = term.prompt("Choose a Username: ")? else {
        return Ok(None);
    };
    let Some(password) = term.prompt("Choose a Password: ")? else {
        return Ok(None);
    };

    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();
    Ok(Some(NewUser {
        name: next(),
        college: next(),
        domain: next(),
        roll_no: next(),
        contact: next(),
        gender,
        username,
        password,
    }))
}

async fn recommender_page<R: BufRead, W: Write>(
    app: &AppContext,
    session: &mut Session,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    let username = session.username().unwrap_or_default().to_string();
    term.say("")?;
    term.say(format!("✓ Logged in as {}", username).green())?;
    term.say(format!("Welcome, {}!", username).bold())?;

    // like a select box, the first indexed title is selected by default
    if session.selected_book().is_none() {
        match app.recommender().book_titles().await {
            Ok(titles) => {
                if let Some(first) = titles.into_iter().next() {
                    session.select_book(first);
                }
            }
            Err(e) => term.say(format!("Could not load the catalog: {:#}", e).red())?,
        }
    }
    if let Some(book) = session.selected_book() {
        term.say(format!("Selected book: {}", book))?;
    }

    term.say("[1] Select a book  [2] Show recommendation  [3] Rate & review  [4] Logout  [q] Quit")?;
    let Some(choice) = term.prompt("> ")? else {
        return Ok(Flow::Quit);
    };

    match choice.trim().to_lowercase().as_str() {
        "1" | "select" => return select_book(app, session, term).await,
        "2" | "show" => show_recommendations(app, session, term).await?,
        "3" | "review" => return rate_and_review(app, session, term),
        "4" | "logout" => {
            app.logout(session);
            term.say("Logged out.")?;
        }
        "q" | "quit" => return Ok(Flow::Quit),
        other => term.say(format!("Unknown choice: {}", other))?,
    }
    Ok(Flow::Continue)
}

async fn select_book<R: BufRead, W: Write>(
    app: &AppContext,
    session: &mut Session,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    let Some(query) = term.prompt("Type or select a book (empty lists all): ")? else {
        return Ok(Flow::Quit);
    };
    let recommender = app.recommender();
    let titles = if query.trim().is_empty() {
        recommender.book_titles().await
    } else {
        recommender.search(query.trim()).await
    };
    let titles = match titles {
        Ok(titles) => titles,
        Err(e) => {
            term.say(format!("Could not load the catalog: {:#}", e).red())?;
            return Ok(Flow::Continue);
        }
    };
    if titles.is_empty() {
        term.say("No matching books.")?;
        return Ok(Flow::Continue);
    }

    let shown = titles.len().min(SELECTOR_ROWS);
    for (i, title) in titles.iter().take(shown).enumerate() {
        term.say(format!("{:>3}. {}", (i + 1).to_string().cyan(), title))?;
    }
    if titles.len() > shown {
        term.say(format!("... and {} more, refine the search", titles.len() - shown))?;
    }

    let Some(pick) = term.prompt("Pick a number: ")? else {
        return Ok(Flow::Quit);
    };
    match pick.trim().parse::<usize>() {
        Ok(n) if (1..=shown).contains(&n) => {
            let title = titles[n - 1].clone();
            if let Some(cover) = recommender.poster(&title).await {
                term.say(format!("Cover: {}", cover))?;
            }
            term.say(format!("Selected book: {}", title))?;
            session.select_book(title);
        }
        _ => term.say("Invalid selection".red())?,
    }
    Ok(Flow::Continue)
}

async fn show_recommendations<R: BufRead, W: Write>(
    app: &AppContext,
    session: &Session,
    term: &mut Terminal<R, W>,
) -> Result<()> {
    let Some(book) = session.selected_book() else {
        term.say("Select a book first.")?;
        return Ok(());
    };

    match app.recommender().recommend(book).await {
        Ok(recommendations) if recommendations.is_empty() => {
            term.say("No recommendations available.")?;
        }
        Ok(recommendations) => print_recommendations(term, &recommendations)?,
        Err(e) => term.say(format!("Could not load the catalog: {:#}", e).red())?,
    }
    Ok(())
}

fn print_recommendations<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    recommendations: &[BookRecommendation],
) -> Result<()> {
    term.say("Recommended books:".bold().blue())?;
    for (i, rec) in recommendations.iter().take(DISPLAY_COLUMNS).enumerate() {
        term.say(format!("{}. {}", (i + 1).to_string().green(), rec.title))?;
        if let Some(poster) = &rec.poster {
            term.say(format!("   Cover: {}", poster))?;
        }
        term.say(format!("   Buy on Amazon: {}", rec.links.amazon))?;
        term.say(format!("   Buy on Flipkart: {}", rec.links.flipkart))?;
    }
    Ok(())
}

fn rate_and_review<R: BufRead, W: Write>(
    app: &AppContext,
    session: &Session,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    term.say("Rate & Review".bold())?;
    let Some(raw) = term.prompt("Rating (1-5) [3]: ")? else {
        return Ok(Flow::Quit);
    };
    let rating = if raw.trim().is_empty() {
        StarRating::default()
    } else {
        let parsed = raw.trim().parse::<u8>().ok().map(StarRating::try_from);
        match parsed {
            Some(Ok(rating)) => rating,
            _ => {
                term.say("Rating must be a number from 1 to 5".red())?;
                return Ok(Flow::Continue);
            }
        }
    };
    let Some(text) = term.prompt("Write a review: ")? else {
        return Ok(Flow::Quit);
    };

    app.submit_review(session, rating, &text)?;
    term.say(format!("Thank you for your rating of {} and review!", rating).green())?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounts::{CredentialStore, ReviewStore};
    use async_trait::async_trait;
    use data_loader::{Book, BookRating, Catalog};
    use poster_client::{PosterClientError, PosterFetcher, VolumeLookup};
    use server::BookRecommender;
    use similarity::RatingMatrixBuilder;

    struct NoCovers;

    #[async_trait]
    impl VolumeLookup for NoCovers {
        async fn thumbnail(&self, _title: &str) -> Result<String, PosterClientError> {
            Err(PosterClientError::InvalidResponse("offline".into()))
        }
    }

    fn app(dir: &std::path::Path) -> AppContext {
        let catalog = Catalog::from_parts(
            vec![
                Book::new("1", "Flu"),
                Book::new("2", "Emma"),
                Book::new("3", "Persuasion"),
            ],
            vec![
                BookRating::new(1, "1", 8),
                BookRating::new(2, "1", 3),
                BookRating::new(1, "2", 7),
                BookRating::new(2, "2", 4),
                BookRating::new(3, "3", 9),
            ],
        );
        AppContext::new(
            CredentialStore::new(dir.join("users.csv")),
            ReviewStore::new(dir.join("reviews.csv")),
            BookRecommender::from_catalog(
                catalog,
                RatingMatrixBuilder::new(),
                6,
                PosterFetcher::new(NoCovers, 16),
            ),
        )
    }

    async fn run_script(app: &AppContext, script: &str) -> String {
        let mut term = Terminal::new(script.as_bytes(), Vec::new());
        run(app, &mut term).await.unwrap();
        String::from_utf8(term.into_output()).unwrap()
    }

    #[tokio::test]
    async fn test_login_before_registration() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script(&app(dir.path()), "1\nana\npw\nq\n").await;

        assert!(out.contains("No users registered yet."));
        assert!(out.contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_incomplete_registration() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script(&app(dir.path()), "2\nAna\n\nPhysics\nP-1\n555\n\nana\npw\nq\n").await;

        assert!(out.contains("Please fill all fields."));
        assert!(!dir.path().join("users.csv").exists());
    }

    #[tokio::test]
    async fn test_full_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        let script = "\
2\nAna\nWest\nPhysics\nP-1\n555\nfemale\nana\npw\n\
1\nana\nwrong\n\
1\nana\npw\n\
1\nem\n1\n\
2\n\
3\n4\nQuiet and sharp\n\
4\n\
q\n";
        let out = run_script(&app, script).await;

        assert!(out.contains("Registration successful! You can now login."));
        assert!(out.contains("Invalid credentials"));
        assert!(out.contains("Welcome, ana!"));
        assert!(out.contains("Selected book: Emma"));
        assert!(out.contains("Buy on Amazon: https://www.amazon.in/s?k=Flu"));
        assert!(out.contains("Thank you for your rating of 4 and review!"));
        assert!(out.contains("Logged out."));

        let reviews = app.reviews().reviews().unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].book, "Emma");
        assert_eq!(reviews[0].review, "Quiet and sharp");
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_script(&app(dir.path()), "").await;
        assert!(out.contains("Goodbye!"));
    }
}
