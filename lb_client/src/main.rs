//! A terminal client for a link-board server.
//!
//! The client signs in against the REST backend, browses the front page,
//! and submits posts and comments, either through a plain command loop
//! or a TUI.

use anyhow::{Context, Result};
use pico_args::Arguments;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use lb_client::commands::{self, Command};
use lb_client::shell::Shell;
use lb_client::tui_app::TuiApp;
use link_board::auth::flows::{SignInFlow, SignInForm, SignUpFlow, SignUpForm};
use link_board::content::comments::{CommentDraft, CommentService};
use link_board::content::groups::{GroupDraft, GroupService};
use link_board::content::models::Post;
use link_board::content::posts::{PostDraft, PostService};
use link_board::net::http::AuthTokenHeader;
use link_board::users::UserService;
use link_board::{ApiError, ClientConfig, HttpClient, SessionHolder, Storage};

const HELP: &str = "\
Connect to a link-board server

USAGE:
  lb_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: http://localhost:12000]
  --email EMAIL         Email for sign-in
  --password PASS       Password for sign-in
  --state-dir DIR       Directory for cached state  [default: ~/.link_board]
  --tui                 Use TUI (Terminal UI) mode [default: false]

FLAGS:
  -h, --help            Print help information
";

const COMMANDS_HELP: &str = "\
feed
        Show the front-page feed.
open <uuid>
        Open a post's detail view.
post
        Compose and submit a new post.
comment <text>
        Comment on the currently open post.
group
        Create a group.
search <query>
        Search posts.
login
        Sign in with email and password.
register
        Create an account, then sign in separately.
logout
        Log out and clear local state.
me
        Show the current user.
bookmarks
        Show the current user's bookmarks.
help
        Show this help.
quit
        Exit the client.
";

struct Args {
    server_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    state_dir: Option<PathBuf>,
    use_tui: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        server_url: pargs.opt_value_from_str("--server").ok().flatten(),
        email: pargs.opt_value_from_str("--email").ok().flatten(),
        password: pargs.opt_value_from_str("--password").ok().flatten(),
        state_dir: pargs.opt_value_from_str("--state-dir").ok().flatten(),
        use_tui: pargs.contains("--tui"),
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::from_env(args.server_url, args.state_dir)
        .context("Failed to load configuration")?;
    let storage = Storage::new(&config.state_dir);
    let http = HttpClient::new(config.server_url.clone())
        .context("Failed to build HTTP client")?
        .with(AuthTokenHeader::new(storage.clone()));

    let session = Arc::new(SessionHolder::new(storage.clone()));
    let users = UserService::new(http.clone());
    let posts = PostService::new(http.clone());
    let comments = CommentService::new(http.clone());
    let groups = GroupService::new(http.clone());
    let mut sign_in_flow = SignInFlow::new(
        http.clone(),
        storage.clone(),
        session.clone(),
        users.clone(),
    );
    let sign_up_flow = SignUpFlow::new(http);
    let mut shell = Shell::new(config, storage, session.clone(), users.clone());

    // Credentials passed on the command line sign in before any UI starts.
    if let (Some(email), Some(password)) = (args.email, args.password) {
        println!("Signing in as {email}...");
        shell.navigate("/sign-in").await;
        let form = SignInForm { email, password };
        match sign_in_flow.submit(&form).await {
            Ok(_) => println!("Successfully logged in"),
            Err(error) => println!(
                "{}",
                error.user_message(SignInFlow::MESSAGE_FIELDS, SignInFlow::FALLBACK)
            ),
        }
    }

    if args.use_tui {
        let app = TuiApp::new(shell, session, posts, comments, sign_in_flow, sign_up_flow);
        let terminal = ratatui::init();
        let result = app.run(terminal).await;
        ratatui::restore();
        result
    } else {
        run_plain(
            shell,
            session,
            users,
            posts,
            comments,
            groups,
            sign_in_flow,
            sign_up_flow,
        )
        .await
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_plain(
    mut shell: Shell,
    session: Arc<SessionHolder>,
    users: UserService,
    posts: PostService,
    comments: CommentService,
    groups: GroupService,
    mut sign_in_flow: SignInFlow,
    mut sign_up_flow: SignUpFlow,
) -> Result<()> {
    shell.init().await;
    match session.current() {
        Some(user) => println!("Signed in as {}", user.display_name()),
        None => println!("Not signed in. Type 'login' or 'register' to get started."),
    }
    println!("Type 'help' to see available commands.");

    let mut open_post: Option<Post> = None;
    loop {
        let Some(line) = prompt("lb> ")? else { break };
        if line.is_empty() {
            continue;
        }
        let command = match commands::parse_command(&line) {
            Ok(command) => command,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };
        match command {
            Command::Help => print!("{COMMANDS_HELP}"),
            Command::Quit => break,
            Command::Feed => {
                shell.navigate("/").await;
                show_feed(&posts, None).await;
            }
            Command::Search(query) => {
                shell.navigate(&Shell::search_route(&query)).await;
                show_feed(&posts, Some(&query)).await;
            }
            Command::Open(uuid) => match posts.get(&uuid).await {
                Ok(post) => {
                    shell.navigate(&format!("/{}", post.uuid)).await;
                    print_post(&post);
                    open_post = Some(post);
                }
                Err(error) => println!("{}", error.user_message(&[], "Could not open post")),
            },
            Command::Post => {
                if let Some(post) = submit_post(&mut shell, &session, &posts).await? {
                    open_post = Some(post);
                }
            }
            Command::Comment(body) => {
                submit_comment(&session, &comments, open_post.as_ref(), body).await;
            }
            Command::Group => create_group(&session, &groups).await?,
            Command::Login => run_login(&mut shell, &mut sign_in_flow).await?,
            Command::Register => run_register(&mut shell, &mut sign_up_flow).await?,
            Command::Logout => {
                let destination = shell.logout().await;
                println!("Signed out. Continue at {destination}");
            }
            Command::Me => match session.current() {
                Some(user) => println!("{} <{}> (id {})", user.display_name(), user.email, user.id),
                None => println!("Not signed in."),
            },
            Command::Bookmarks => show_bookmarks(&session, &users).await,
        }
    }
    println!("Bye.");
    Ok(())
}

/// Read one line of input. `None` means end of input.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

async fn show_feed(posts: &PostService, search: Option<&str>) {
    match posts.list(search).await {
        Ok(page) => {
            if page.results.is_empty() {
                println!("No posts.");
                return;
            }
            for post in &page.results {
                let votes = post.upvote_count - post.downvote_count;
                println!("  {votes:>4}  {}  ({})", post.title, post.uuid);
            }
        }
        Err(error) => println!("{}", error.user_message(&[], "Could not load the feed")),
    }
}

fn print_post(post: &Post) {
    println!("\n{}\n", post.title);
    println!("{}", post.content);
    println!("\n({} up / {} down)", post.upvote_count, post.downvote_count);
}

async fn run_login(shell: &mut Shell, flow: &mut SignInFlow) -> Result<()> {
    shell.navigate("/sign-in").await;
    let Some(email) = prompt("Email: ")? else {
        return Ok(());
    };
    let Some(password) = prompt("Password: ")? else {
        return Ok(());
    };
    let form = SignInForm { email, password };
    match flow.submit(&form).await {
        Ok(_) => {
            println!("Successfully logged in");
            shell.navigate("/").await;
        }
        Err(error) => println!(
            "{}",
            error.user_message(SignInFlow::MESSAGE_FIELDS, SignInFlow::FALLBACK)
        ),
    }
    Ok(())
}

async fn run_register(shell: &mut Shell, flow: &mut SignUpFlow) -> Result<()> {
    shell.navigate("/sign-up").await;
    let Some(first_name) = prompt("First name: ")? else {
        return Ok(());
    };
    let Some(last_name) = prompt("Last name: ")? else {
        return Ok(());
    };
    let Some(email) = prompt("Email: ")? else {
        return Ok(());
    };
    let Some(password1) = prompt("Password: ")? else {
        return Ok(());
    };
    let Some(password2) = prompt("Confirm password: ")? else {
        return Ok(());
    };
    let mut form = SignUpForm {
        first_name,
        last_name,
        email,
        password1,
        password2,
    };
    match flow.submit(&mut form).await {
        Ok(()) => {
            println!("Registered successfully. Proceed to login");
            shell.navigate("/sign-in").await;
        }
        Err(error) => println!(
            "{}",
            error.user_message(SignUpFlow::MESSAGE_FIELDS, SignUpFlow::FALLBACK)
        ),
    }
    Ok(())
}

async fn submit_post(
    shell: &mut Shell,
    session: &Arc<SessionHolder>,
    posts: &PostService,
) -> Result<Option<Post>> {
    let Some(user) = session.current() else {
        println!("Sign in to submit a post");
        return Ok(None);
    };
    shell.navigate("/submit").await;
    let Some(title) = prompt("Title: ")? else {
        return Ok(None);
    };
    let Some(content) = prompt("Content: ")? else {
        return Ok(None);
    };
    let draft = PostDraft { title, content };
    match posts.create(&draft, user.id, None).await {
        Ok(post) => {
            // A new top-level post lands on its detail view.
            shell.navigate(&format!("/{}", post.uuid)).await;
            print_post(&post);
            Ok(Some(post))
        }
        Err(ApiError::Validation(errors)) => {
            println!("{errors}");
            Ok(None)
        }
        Err(error) => {
            println!("{}", error.user_message(&[], "Could not create post"));
            Ok(None)
        }
    }
}

async fn submit_comment(
    session: &Arc<SessionHolder>,
    comments: &CommentService,
    open_post: Option<&Post>,
    body: String,
) {
    let Some(user) = session.current() else {
        println!("Sign in to comment");
        return;
    };
    let Some(post) = open_post else {
        println!("Open a post first (see 'open')");
        return;
    };
    let draft = CommentDraft {
        comment: body,
        ..Default::default()
    };
    match comments.create(&post.uuid, &draft, user.id).await {
        Ok(comment) => println!("Comment #{} added.", comment.id),
        Err(ApiError::Validation(errors)) => println!("{errors}"),
        Err(error) => println!("{}", error.user_message(&[], "Could not post comment")),
    }
}

async fn create_group(session: &Arc<SessionHolder>, groups: &GroupService) -> Result<()> {
    let Some(user) = session.current() else {
        println!("Sign in to create a group");
        return Ok(());
    };
    let Some(name) = prompt("Group name: ")? else {
        return Ok(());
    };
    let Some(description) = prompt("Description: ")? else {
        return Ok(());
    };
    let draft = GroupDraft { name, description };
    match groups.create(&draft, user.id).await {
        Ok(group) => println!("Group '{}' created (id {}).", group.name, group.id),
        Err(ApiError::Validation(errors)) => println!("{errors}"),
        Err(error) => println!("{}", error.user_message(&[], "Could not create group")),
    }
    Ok(())
}

async fn show_bookmarks(session: &Arc<SessionHolder>, users: &UserService) {
    let Some(user) = session.current() else {
        println!("Not signed in.");
        return;
    };
    match users.bookmarks(&user.username).await {
        Ok(page) => {
            if page.results.is_empty() {
                println!("No bookmarks.");
                return;
            }
            for post in &page.results {
                println!("  {}  ({})", post.title, post.uuid);
            }
        }
        Err(error) => println!("{}", error.user_message(&[], "Could not load bookmarks")),
    }
}
