//! Interactive board view: the feed, an open-question detail view, and the
//! add/edit answer form, driven by a line-based prompt. Owns the transient
//! `Session` so the repositories stay stateless.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::commands::{excerpt, list, show};
use crate::error::BoardError;
use crate::models::SUBJECTS;
use crate::session::{EditTarget, Session};
use crate::store::Store;
use crate::validate::{validate_answer, validate_post};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cmd {
    Feed,
    Open(i64),
    Close,
    Ask,
    Edit(i64),
    Delete(i64),
    Answer(String),
    EditAnswer(i64),
    DeleteAnswer(i64),
    Cancel,
    Name(Option<String>),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Cmd {
    let line = line.trim();
    if line.is_empty() {
        return Cmd::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let parse_id = |cmd: fn(i64) -> Cmd| -> Cmd {
        match rest.parse() {
            Ok(id) => cmd(id),
            Err(_) => Cmd::Unknown(line.to_string()),
        }
    };

    match word {
        "feed" | "f" => Cmd::Feed,
        "open" | "o" => parse_id(Cmd::Open),
        "close" | "c" => Cmd::Close,
        "ask" => Cmd::Ask,
        "edit" | "e" => parse_id(Cmd::Edit),
        "delete" | "d" => parse_id(Cmd::Delete),
        "answer" | "a" => {
            if rest.is_empty() {
                Cmd::Unknown(line.to_string())
            } else {
                Cmd::Answer(rest.to_string())
            }
        }
        "ea" => parse_id(Cmd::EditAnswer),
        "da" => parse_id(Cmd::DeleteAnswer),
        "cancel" => Cmd::Cancel,
        "name" | "n" => {
            if rest.is_empty() {
                Cmd::Name(None)
            } else {
                Cmd::Name(Some(rest.to_string()))
            }
        }
        "help" | "h" | "?" => Cmd::Help,
        "quit" | "q" | "exit" => Cmd::Quit,
        _ => Cmd::Unknown(line.to_string()),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  feed               Show the question feed");
    println!("  open <id>          Open a question and its answers");
    println!("  close              Close the open question");
    println!("  ask                Post a new question (prompts for fields)");
    println!("  edit <id>          Edit your own question (prompts for fields)");
    println!("  delete <id>        Delete your own question");
    println!("  answer <text>      Answer the open question (or save an answer edit)");
    println!("  ea <id>            Start editing your own answer");
    println!("  da <id>            Delete your own answer");
    println!("  cancel             Abandon the answer edit in progress");
    println!("  name [name]        Show or set your display name");
    println!("  quit               Leave the board");
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}

pub fn run(store: &Store) -> Result<()> {
    let mut session = Session::new();

    list::run(store)?;
    println!("Type 'help' for commands.");

    let stdin = io::stdin();
    loop {
        print!("board> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        match parse_command(&line) {
            Cmd::Feed => list::run(store)?,
            Cmd::Open(id) => open_question(store, &mut session, id)?,
            Cmd::Close => {
                session.close();
                println!("Closed.");
            }
            Cmd::Ask => ask_question(store)?,
            Cmd::Edit(id) => edit_question(store, &mut session, id)?,
            Cmd::Delete(id) => delete_question(store, &mut session, id)?,
            Cmd::Answer(text) => submit_answer(store, &mut session, &text)?,
            Cmd::EditAnswer(id) => begin_answer_edit(store, &mut session, id)?,
            Cmd::DeleteAnswer(id) => delete_answer(store, &session, id)?,
            Cmd::Cancel => {
                session.end_edit();
                println!("Edit cancelled.");
            }
            Cmd::Name(name) => crate::commands::name::run(store, name.as_deref())?,
            Cmd::Help => print_help(),
            Cmd::Quit => break,
            Cmd::Empty => {}
            Cmd::Unknown(line) => {
                println!("Unrecognized: '{}'. Type 'help' for commands.", line)
            }
        }
    }

    Ok(())
}

fn open_question(store: &Store, session: &mut Session, id: i64) -> Result<()> {
    if store.get_post(id)?.is_none() {
        // Stale id, e.g. deleted since the feed was rendered
        println!("Question #{} not found.", id);
        return Ok(());
    }
    session.open(id);
    show::run(store, id)?;
    Ok(())
}

fn ask_question(store: &Store) -> Result<()> {
    let remembered = store.current_name()?;
    let label = if remembered.is_empty() {
        "Your name".to_string()
    } else {
        format!("Your name [{}]", remembered)
    };
    let mut author = prompt(&label)?;
    if author.is_empty() {
        author = remembered;
    }
    let subject = prompt(&format!("Subject ({})", SUBJECTS.join(", ")))?;
    let title = prompt("Title")?;
    let details = prompt("Details")?;

    if let Err(errors) = validate_post(&author, &subject, &title, &details) {
        println!("{}", BoardError::Validation(errors));
        return Ok(());
    }

    store.set_current_name(author.trim())?;
    let post = store.create_post(&author, &subject, &title, &details)?;
    println!("Posted question #{}", post.id);
    Ok(())
}

fn edit_question(store: &Store, session: &mut Session, id: i64) -> Result<()> {
    let post = match store.get_post(id)? {
        Some(p) => p,
        None => {
            println!("Question #{} not found.", id);
            return Ok(());
        }
    };

    session.begin_post_edit(id);
    println!("Editing question #{} (blank keeps the current value)", id);

    let subject = or_current(prompt(&format!("Subject [{}]", post.subject))?, &post.subject);
    let title = or_current(prompt(&format!("Title [{}]", post.title))?, &post.title);
    let details = or_current(
        prompt(&format!("Details [{}]", excerpt(&post.details, 60)))?,
        &post.details,
    );

    let author = store.current_name()?;
    if let Err(errors) = validate_post(&author, &subject, &title, &details) {
        println!("{}", BoardError::Validation(errors));
        session.end_edit();
        return Ok(());
    }

    match store.update_post(id, &author, &subject, &title, &details) {
        Ok(_) => println!("Updated question #{}", id),
        Err(BoardError::NotOwner) => println!("You can only edit your own question."),
        Err(BoardError::NotFound) => println!("Question #{} not found.", id),
        Err(e) => return Err(e.into()),
    }
    session.end_edit();
    Ok(())
}

fn or_current(entered: String, current: &str) -> String {
    if entered.is_empty() {
        current.to_string()
    } else {
        entered
    }
}

fn delete_question(store: &Store, session: &mut Session, id: i64) -> Result<()> {
    let confirm = prompt(&format!("Delete question #{}? This cannot be undone. [y/N]", id))?;
    if !confirm.eq_ignore_ascii_case("y") {
        println!("Cancelled.");
        return Ok(());
    }

    match store.delete_post(id, &store.current_name()?) {
        Ok(()) => {
            println!("Deleted question #{}", id);
            if session.open_post() == Some(id) {
                session.close();
            }
        }
        Err(BoardError::NotOwner) => println!("You can only delete your own question."),
        Err(BoardError::NotFound) => println!("Question #{} not found.", id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// The single answer form: saves the edit in progress if one is active,
/// otherwise adds a new answer to the open question.
fn submit_answer(store: &Store, session: &mut Session, text: &str) -> Result<()> {
    let post_id = match session.open_post() {
        Some(id) => id,
        None => {
            println!("Open a question first.");
            return Ok(());
        }
    };

    let author = store.current_name()?;
    if let Err(errors) = validate_answer(&author, text) {
        println!("{}", BoardError::Validation(errors));
        return Ok(());
    }

    if let EditTarget::Answer { post_id, answer_id } = session.edit() {
        match store.update_answer(post_id, answer_id, &author, text) {
            Ok(_) => {
                println!("Updated answer #{}", answer_id);
                session.end_edit();
            }
            Err(BoardError::NotOwner) => println!("You can only edit your own answer."),
            Err(BoardError::NotFound) => {
                // The answer vanished under us; drop the stale edit session
                println!("That answer no longer exists.");
                session.end_edit();
            }
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    let answer = store.create_answer(post_id, &author, text)?;
    println!("Posted answer #{}", answer.id);
    Ok(())
}

fn begin_answer_edit(store: &Store, session: &mut Session, answer_id: i64) -> Result<()> {
    let post_id = match session.open_post() {
        Some(id) => id,
        None => {
            println!("Open a question first.");
            return Ok(());
        }
    };

    let answers = store.answers_for(post_id)?;
    let answer = match answers.iter().find(|a| a.id == answer_id) {
        Some(a) => a,
        None => {
            println!("Answer #{} not found.", answer_id);
            return Ok(());
        }
    };

    if answer.author.is_empty() || answer.author != store.current_name()? {
        println!("You can only edit your own answer.");
        return Ok(());
    }

    session.begin_answer_edit(post_id, answer_id);
    println!("Editing answer #{}: {}", answer_id, answer.details);
    println!("Save with: answer <new text>   (or 'cancel')");
    Ok(())
}

fn delete_answer(store: &Store, session: &Session, answer_id: i64) -> Result<()> {
    let post_id = match session.open_post() {
        Some(id) => id,
        None => {
            println!("Open a question first.");
            return Ok(());
        }
    };

    let confirm = prompt(&format!("Delete answer #{}? [y/N]", answer_id))?;
    if !confirm.eq_ignore_ascii_case("y") {
        println!("Cancelled.");
        return Ok(());
    }

    match store.delete_answer(post_id, answer_id, &store.current_name()?) {
        Ok(()) => println!("Deleted answer #{}", answer_id),
        Err(BoardError::NotOwner) => println!("You can only delete your own answer."),
        Err(BoardError::NotFound) => println!("Answer #{} not found.", answer_id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
