//! The terminal front end: one command per line, results printed to stdout.
use crate::feedapi::{self, structs::{Post, PostId}};
use crate::identity;
use crate::metrics;
use crate::storage::Storage;
use crate::sync::{AuthMode, Synchronizer};
use crate::twoface::Fallible;
use std::fmt::Write as _;
use std::io;
use tracing::error;

pub const HELP: &str = "\
commands:
  register <email> <password>
  login <email> <password>
  logout
  whoami
  feed                       fetch and show the feed
  show                       show the feed without fetching
  post <text>
  like <post id>
  reply <post id> <text>
  summary <post id>
  profile
  profile set <username> [image url]
  metrics
  help
  quit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Auth {
        mode: AuthMode,
        email: String,
        password: String,
    },
    Logout,
    WhoAmI,
    Feed,
    Show,
    Post(String),
    Like(PostId),
    Reply(PostId, String),
    Summary(PostId),
    Profile,
    SetProfile {
        username: String,
        image_url: Option<String>,
    },
    Metrics,
    Help,
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    // Only the start is trimmed: trailing spaces can belong to a password.
    let line = line.trim_start();
    if line.trim_end().is_empty() {
        return Ok(None);
    }
    let (word, rest) = split_word(line);
    let command = match word {
        "register" | "login" => {
            let mode = if word == "register" {
                AuthMode::Register
            } else {
                AuthMode::Login
            };
            let (email, password) = split_once(rest);
            if email.is_empty() || password.is_empty() {
                return Err(format!("usage: {} <email> <password>", word));
            }
            Command::Auth {
                mode,
                email: email.to_owned(),
                password: password.to_owned(),
            }
        }
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,
        "feed" => Command::Feed,
        "show" => Command::Show,
        // Blank text is passed through; the synchronizer owns that rule.
        "post" => Command::Post(rest.to_owned()),
        "like" => Command::Like(post_id(rest)?),
        "reply" => {
            let (id, text) = split_word(rest);
            Command::Reply(post_id(id)?, text.to_owned())
        }
        "summary" => Command::Summary(post_id(rest)?),
        "profile" => {
            let (sub, args) = split_word(rest);
            match sub {
                "" => Command::Profile,
                "set" => {
                    let (username, image_url) = split_word(args);
                    Command::SetProfile {
                        username: username.to_owned(),
                        image_url: Some(image_url).filter(|u| !u.is_empty()).map(str::to_owned),
                    }
                }
                other => return Err(format!("unknown profile command '{}'", other)),
            }
        }
        "metrics" => Command::Metrics,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// Like `split_word`, but the remainder keeps everything after the one separator.
fn split_once(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((i, c)) => (&s[..i], &s[i + c.len_utf8()..]),
        None => (s, ""),
    }
}

fn post_id(s: &str) -> Result<PostId, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("'{}' isn't a post id", s.trim()))
}

/// What the caller should do after a command ran.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

/// Run one command. Errors become their user-facing text; the rest of the error is logged.
pub async fn run<A, P, S>(sync: &Synchronizer<A, P, S>, command: Command) -> Outcome
where
    A: feedapi::Client,
    P: identity::Provider,
    S: Storage,
{
    if command == Command::Quit {
        return Outcome::Quit;
    }
    match dispatch(sync, command).await {
        Ok(output) => Outcome::Continue(output),
        Err(e) => {
            error!("{}", e.internal);
            Outcome::Continue(format!("error: {}", e))
        }
    }
}

async fn dispatch<A, P, S>(sync: &Synchronizer<A, P, S>, command: Command) -> Fallible<String>
where
    A: feedapi::Client,
    P: identity::Provider,
    S: Storage,
{
    let output = match command {
        Command::Auth {
            mode,
            email,
            password,
        } => {
            let session = sync.authenticate(mode, &email, &password).await?;
            format!(
                "Welcome, {}\n{}",
                session.display_name,
                render_feed(&sync.posts(), |id| sync.summary(id))
            )
        }
        Command::Logout => {
            sync.logout().await?;
            "Signed out.".to_owned()
        }
        Command::WhoAmI => match sync.session() {
            Some(s) => format!("{} <{}> (user {})", s.display_name, s.email, s.local_id),
            None => "Not signed in.".to_owned(),
        },
        Command::Feed => {
            sync.fetch_posts().await;
            render_feed(&sync.posts(), |id| sync.summary(id))
        }
        Command::Show => render_feed(&sync.posts(), |id| sync.summary(id)),
        Command::Post(text) => {
            sync.create_post(&text).await?;
            render_feed(&sync.posts(), |id| sync.summary(id))
        }
        Command::Like(id) => {
            sync.like(id).await?;
            render_feed(&sync.posts(), |id| sync.summary(id))
        }
        Command::Reply(id, text) => {
            sync.reply(id, &text).await?;
            render_feed(&sync.posts(), |id| sync.summary(id))
        }
        Command::Summary(id) => format!("Summary: {}", sync.summarize(id).await?),
        Command::Profile => {
            let profile = sync.fetch_profile().await?;
            match profile.profile_image_url {
                Some(url) => format!("{} ({})", profile.username, url),
                None => profile.username,
            }
        }
        Command::SetProfile {
            username,
            image_url,
        } => {
            let profile = sync
                .update_profile(&username, image_url.as_deref())
                .await?;
            format!("Profile updated: {}", profile.username)
        }
        Command::Metrics => metrics::gather()?,
        Command::Help => HELP.to_owned(),
        Command::Quit => String::new(),
    };
    Ok(output)
}

/// Greet the user, then run commands from `lines` until EOF or `quit`.
pub async fn serve<A, P, S>(
    sync: &Synchronizer<A, P, S>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    out: &mut impl io::Write,
) -> anyhow::Result<()>
where
    A: feedapi::Client,
    P: identity::Provider,
    S: Storage,
{
    match sync.restore_session().await {
        Some(session) => {
            writeln!(out, "Welcome back, {}", session.display_name)?;
            writeln!(out, "{}", render_feed(&sync.posts(), |id| sync.summary(id)))?;
        }
        None => writeln!(out, "Not signed in. Type 'help' for commands.")?,
    }

    loop {
        write!(out, "> ")?;
        out.flush()?;
        guard!(let Some(line) = lines.next() else {
            // EOF
            return Ok(())
        });
        match parse(&line?) {
            Ok(None) => continue,
            Ok(Some(command)) => match run(sync, command).await {
                Outcome::Continue(output) => writeln!(out, "{}", output)?,
                Outcome::Quit => return Ok(()),
            },
            Err(usage) => writeln!(out, "{}", usage)?,
        }
    }
}

pub fn render_feed(posts: &[Post], summary: impl Fn(PostId) -> Option<String>) -> String {
    if posts.is_empty() {
        return "(no posts)".to_owned();
    }
    let mut out = String::new();
    for post in posts {
        // Writing to a String can't fail.
        let _ = writeln!(out, "#{} {}  [{} likes]", post.id, post.content, post.like_count);
        for reply in &post.replies {
            let _ = writeln!(out, "    - {}", reply.content);
        }
        if let Some(summary) = summary(post.id) {
            let _ = writeln!(out, "    summary: {}", summary);
        }
    }
    out.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedapi::mock::{self, post};
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(
            parse("login a@b.com secret1").unwrap(),
            Some(Command::Auth {
                mode: AuthMode::Login,
                email: "a@b.com".to_owned(),
                password: "secret1".to_owned(),
            })
        );
        assert_eq!(
            parse("reply 12   thanks for   sharing").unwrap(),
            Some(Command::Reply(PostId(12), "thanks for   sharing".to_owned()))
        );
        assert_eq!(parse("post").unwrap(), Some(Command::Post(String::new())));
        assert_eq!(
            parse("profile set ann").unwrap(),
            Some(Command::SetProfile {
                username: "ann".to_owned(),
                image_url: None,
            })
        );
        assert_eq!(parse("exit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_passwords_keep_their_spaces() {
        assert_eq!(
            parse("register a@b.com  pass phrase ").unwrap(),
            Some(Command::Auth {
                mode: AuthMode::Register,
                email: "a@b.com".to_owned(),
                password: " pass phrase ".to_owned(),
            })
        );
        assert_eq!(parse("feed  ").unwrap(), Some(Command::Feed));
        assert_eq!(parse("like 3 ").unwrap(), Some(Command::Like(PostId(3))));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("register a@b.com").is_err());
        assert_eq!(parse("like x").unwrap_err(), "'x' isn't a post id");
        assert!(parse("dance").unwrap_err().contains("unknown command"));
        assert!(parse("profile delete").is_err());
    }

    #[test]
    fn test_render_feed() {
        let posts = vec![post(2, "hello", &["hi"]), post(1, "first", &[])];
        let text = render_feed(&posts, |id| {
            if id == PostId(2) {
                Some("a greeting".to_owned())
            } else {
                None
            }
        });
        assert_eq!(
            text,
            "#2 hello  [0 likes]\n    - hi\n    summary: a greeting\n#1 first  [0 likes]"
        );
        assert_eq!(render_feed(&[], |_| None), "(no posts)");
    }

    #[actix_rt::test]
    async fn test_errors_show_only_the_external_text() {
        let sync = Synchronizer::new(
            mock::Client::default(),
            identity::mock::Provider::default(),
            MemoryStorage::default(),
        );
        let outcome = run(&sync, Command::Post("hello".to_owned())).await;
        assert_eq!(
            outcome,
            Outcome::Continue("error: NotAuthenticated: Sign in first".to_owned())
        );
        assert_eq!(run(&sync, Command::Quit).await, Outcome::Quit);
    }

    #[actix_rt::test]
    async fn test_serve_runs_script_until_quit() {
        let api = mock::Client::default();
        api.set_posts(vec![post(1, "first", &[])]);
        let sync = Synchronizer::new(
            api.clone(),
            identity::mock::Provider::default().with_account("a@b.com", "secret1", "uid-a"),
            MemoryStorage::default(),
        );
        let script = vec!["", "login a@b.com secret1", "dance", "quit", "whoami"];
        let mut lines = script.into_iter().map(|l| Ok(l.to_owned()));
        let mut out = Vec::new();
        serve(&sync, &mut lines, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Not signed in."));
        assert!(out.contains("Welcome, a@b.com\n#1 first  [0 likes]"));
        assert!(out.contains("unknown command 'dance'"));
        // Nothing after quit runs.
        assert!(!out.contains("(user "));
        assert!(lines.next().is_some());
    }

    #[actix_rt::test]
    async fn test_serve_stops_at_eof() {
        let sync = Synchronizer::new(
            mock::Client::default(),
            identity::mock::Provider::default(),
            MemoryStorage::default(),
        );
        let mut lines = std::iter::empty();
        let mut out = Vec::new();
        serve(&sync, &mut lines, &mut out).await.unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("> "));
    }
}
