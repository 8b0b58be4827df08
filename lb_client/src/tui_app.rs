//! TUI application for the link-board client.
//!
//! Screens map one-to-one onto routes, so the shell controller sees the
//! same navigation a browser client would: sign-in and sign-up are auth
//! routes with the chrome suppressed, and moving from them into the feed
//! refreshes the session.

use anyhow::Result;
use ratatui::{
    DefaultTerminal, Frame,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::{Line, Span},
    widgets::{Block, Clear, List, ListItem, Paragraph, Wrap},
};
use std::sync::Arc;
use std::time::Duration;

use link_board::auth::flows::{SignInFlow, SignInForm, SignUpFlow, SignUpForm};
use link_board::content::comments::{COMMENT_MAX_LEN, CommentDraft, CommentService};
use link_board::content::models::{Comment, Post};
use link_board::content::posts::{PostDraft, PostService};
use link_board::session::SessionHolder;

use crate::shell::Shell;

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

const HELP: &str = "\
Tab / Shift+Tab
        Move between form fields.
Enter
        Submit the focused form or open the selected post.
Up / Down
        Move the feed selection.
n
        Compose a new post.
/
        Search the feed.
r
        Reload the feed.
l
        Log out.
Esc
        Back to the feed.
q / Ctrl+C
        Quit.
";

/// Screens the client navigates between.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Screen {
    SignIn,
    SignUp,
    Feed,
    Compose,
    Thread,
}

/// TUI App state
pub struct TuiApp {
    shell: Shell,
    session: Arc<SessionHolder>,
    posts: PostService,
    comments: CommentService,
    sign_in_flow: SignInFlow,
    sign_up_flow: SignUpFlow,
    sign_in_form: SignInForm,
    sign_up_form: SignUpForm,
    post_draft: PostDraft,
    comment_input: String,
    screen: Screen,
    /// Focused field index on form screens
    focus: usize,
    feed: Vec<Post>,
    selected: usize,
    open_post: Option<Post>,
    /// Comments submitted while this thread has been open
    thread_comments: Vec<Comment>,
    /// Search query, present while the search box is active
    search_input: Option<String>,
    /// Transient status message (the snackbar analog)
    notice: Option<String>,
    show_help: bool,
}

impl TuiApp {
    pub fn new(
        shell: Shell,
        session: Arc<SessionHolder>,
        posts: PostService,
        comments: CommentService,
        sign_in_flow: SignInFlow,
        sign_up_flow: SignUpFlow,
    ) -> Self {
        Self {
            shell,
            session,
            posts,
            comments,
            sign_in_flow,
            sign_up_flow,
            sign_in_form: SignInForm::default(),
            sign_up_form: SignUpForm::default(),
            post_draft: PostDraft::default(),
            comment_input: String::new(),
            screen: Screen::SignIn,
            focus: 0,
            feed: Vec::new(),
            selected: 0,
            open_post: None,
            thread_comments: Vec::new(),
            search_input: None,
            notice: None,
            show_help: false,
        }
    }

    /// Run the event loop until the user quits.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.shell.init().await;
        if self.session.current().is_some() {
            self.enter_feed(None).await;
        } else {
            self.go(Screen::SignIn).await;
        }
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(POLL_TIMEOUT)? {
                continue;
            }
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && self.handle_key(key).await?
            {
                return Ok(());
            }
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        let now = chrono::Local::now();
        self.notice = Some(format!("[{}] {}", now.format("%H:%M:%S"), message.into()));
    }

    /// Change screen through the shell so route tracking stays honest.
    async fn go(&mut self, screen: Screen) {
        self.screen = screen;
        self.focus = 0;
        let route = self.route_for(screen);
        self.shell.navigate(&route).await;
    }

    fn route_for(&self, screen: Screen) -> String {
        match screen {
            Screen::SignIn => "/sign-in".to_string(),
            Screen::SignUp => "/sign-up".to_string(),
            Screen::Feed => "/".to_string(),
            Screen::Compose => "/submit".to_string(),
            Screen::Thread => self
                .open_post
                .as_ref()
                .map(|post| format!("/{}", post.uuid))
                .unwrap_or_else(|| "/".to_string()),
        }
    }

    /// Load the feed (optionally narrowed by a search) and show it.
    async fn enter_feed(&mut self, search: Option<String>) {
        self.screen = Screen::Feed;
        self.focus = 0;
        let route = match &search {
            Some(query) => Shell::search_route(query),
            None => "/".to_string(),
        };
        self.shell.navigate(&route).await;
        match self.posts.list(search.as_deref()).await {
            Ok(page) => {
                self.feed = page.results;
                self.selected = 0;
            }
            Err(error) => {
                let message = error.user_message(&[], "Could not load the feed");
                self.notify(message);
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        if self.show_help {
            self.show_help = false;
            return Ok(false);
        }
        match self.screen {
            Screen::SignIn => self.handle_sign_in_key(key).await,
            Screen::SignUp => self.handle_sign_up_key(key).await,
            Screen::Feed => return self.handle_feed_key(key).await,
            Screen::Compose => self.handle_compose_key(key).await,
            Screen::Thread => self.handle_thread_key(key).await,
        }
        Ok(false)
    }

    // Sign-in: email, password, [Sign in], [Create an account].
    async fn handle_sign_in_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 4,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 3) % 4,
            KeyCode::Esc => self.enter_feed(None).await,
            KeyCode::Enter => {
                if self.focus == 3 {
                    self.go(Screen::SignUp).await;
                } else {
                    self.submit_sign_in().await;
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.sign_in_field() {
                    field.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.sign_in_field() {
                    field.push(c);
                }
            }
            _ => {}
        }
    }

    fn sign_in_field(&mut self) -> Option<&mut String> {
        match self.focus {
            0 => Some(&mut self.sign_in_form.email),
            1 => Some(&mut self.sign_in_form.password),
            _ => None,
        }
    }

    async fn submit_sign_in(&mut self) {
        match self.sign_in_flow.submit(&self.sign_in_form).await {
            Ok(_) => {
                self.sign_in_form = SignInForm::default();
                self.notify("Successfully logged in");
                self.enter_feed(None).await;
            }
            Err(error) => {
                let message =
                    error.user_message(SignInFlow::MESSAGE_FIELDS, SignInFlow::FALLBACK);
                self.notify(message);
            }
        }
    }

    // Sign-up: five fields, [Register], [Back to sign-in].
    async fn handle_sign_up_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 7,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 6) % 7,
            KeyCode::Esc => self.go(Screen::SignIn).await,
            KeyCode::Enter => {
                if self.focus == 6 {
                    self.go(Screen::SignIn).await;
                } else {
                    self.submit_sign_up().await;
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.sign_up_field() {
                    field.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.sign_up_field() {
                    field.push(c);
                }
            }
            _ => {}
        }
    }

    fn sign_up_field(&mut self) -> Option<&mut String> {
        match self.focus {
            0 => Some(&mut self.sign_up_form.first_name),
            1 => Some(&mut self.sign_up_form.last_name),
            2 => Some(&mut self.sign_up_form.email),
            3 => Some(&mut self.sign_up_form.password1),
            4 => Some(&mut self.sign_up_form.password2),
            _ => None,
        }
    }

    async fn submit_sign_up(&mut self) {
        match self.sign_up_flow.submit(&mut self.sign_up_form).await {
            Ok(()) => {
                self.notify("Registered successfully. Proceed to login");
                self.go(Screen::SignIn).await;
            }
            Err(error) => {
                let message =
                    error.user_message(SignUpFlow::MESSAGE_FIELDS, SignUpFlow::FALLBACK);
                self.notify(message);
            }
        }
    }

    async fn handle_feed_key(&mut self, key: KeyEvent) -> Result<bool> {
        // While the search box is open, keys edit the query.
        if self.search_input.is_some() {
            match key.code {
                KeyCode::Esc => self.search_input = None,
                KeyCode::Enter => {
                    let query = self.search_input.take().unwrap_or_default();
                    let search = (!query.is_empty()).then_some(query);
                    self.enter_feed(search).await;
                }
                KeyCode::Backspace => {
                    if let Some(query) = self.search_input.as_mut() {
                        query.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(query) = self.search_input.as_mut() {
                        query.push(c);
                    }
                }
                _ => {}
            }
            return Ok(false);
        }
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.feed.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('o') => self.open_selected().await,
            KeyCode::Char('n') => {
                if self.session.current().is_some() {
                    self.post_draft = PostDraft::default();
                    self.go(Screen::Compose).await;
                } else {
                    self.notify("Sign in to submit a post");
                    self.go(Screen::SignIn).await;
                }
            }
            KeyCode::Char('/') => self.search_input = Some(String::new()),
            KeyCode::Char('r') => self.enter_feed(None).await,
            KeyCode::Char('l') => {
                let destination = self.shell.logout().await;
                self.notify(format!("Signed out. Continue at {destination}"));
                // Hard navigation: straight to the sign-in screen.
                self.screen = Screen::SignIn;
                self.focus = 0;
            }
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        Ok(false)
    }

    async fn open_selected(&mut self) {
        let Some(post) = self.feed.get(self.selected).cloned() else {
            return;
        };
        // Refresh the record so the detail view is current.
        match self.posts.get(&post.uuid).await {
            Ok(fresh) => self.open_post = Some(fresh),
            Err(error) => {
                log::debug!("post refresh failed: {error}");
                self.open_post = Some(post);
            }
        }
        self.thread_comments.clear();
        self.comment_input.clear();
        self.go(Screen::Thread).await;
    }

    // Compose: title, content, [Submit].
    async fn handle_compose_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 2) % 3,
            KeyCode::Esc => self.enter_feed(None).await,
            KeyCode::Enter => match self.focus {
                1 => self.post_draft.content.push('\n'),
                2 => self.submit_post().await,
                _ => self.focus = 1,
            },
            KeyCode::Backspace => {
                if let Some(field) = self.compose_field() {
                    field.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.compose_field() {
                    field.push(c);
                }
            }
            _ => {}
        }
    }

    fn compose_field(&mut self) -> Option<&mut String> {
        match self.focus {
            0 => Some(&mut self.post_draft.title),
            1 => Some(&mut self.post_draft.content),
            _ => None,
        }
    }

    async fn submit_post(&mut self) {
        let Some(user) = self.session.current() else {
            self.notify("Sign in to submit a post");
            return;
        };
        match self.posts.create(&self.post_draft, user.id, None).await {
            Ok(post) => {
                self.post_draft = PostDraft::default();
                self.notify("Post created");
                // A new top-level post lands on its detail view.
                self.open_post = Some(post);
                self.thread_comments.clear();
                self.comment_input.clear();
                self.go(Screen::Thread).await;
            }
            Err(error) => {
                let message = error.user_message(&[], "Could not create post");
                self.notify(message);
            }
        }
    }

    async fn handle_thread_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.enter_feed(None).await,
            KeyCode::Enter => self.submit_comment().await,
            KeyCode::Backspace => {
                self.comment_input.pop();
            }
            KeyCode::Char(c) => self.comment_input.push(c),
            _ => {}
        }
    }

    async fn submit_comment(&mut self) {
        let Some(user) = self.session.current() else {
            self.notify("Sign in to comment");
            return;
        };
        let Some(post) = self.open_post.clone() else {
            return;
        };
        let draft = CommentDraft {
            comment: self.comment_input.clone(),
            ..Default::default()
        };
        match self.comments.create(&post.uuid, &draft, user.id).await {
            Ok(comment) => {
                self.comment_input.clear();
                self.thread_comments.push(comment);
            }
            Err(link_board::ApiError::Validation(errors)) => self.notify(errors.to_string()),
            Err(error) => {
                let message = error.user_message(&[], "Could not post comment");
                self.notify(message);
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [header_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.draw_header(frame, header_area);
        match self.screen {
            Screen::SignIn => self.draw_sign_in(frame, body_area),
            Screen::SignUp => self.draw_sign_up(frame, body_area),
            Screen::Feed => self.draw_feed(frame, body_area),
            Screen::Compose => self.draw_compose(frame, body_area),
            Screen::Thread => self.draw_thread(frame, body_area),
        }
        self.draw_status(frame, status_area);

        if self.show_help {
            frame.render_widget(Clear, body_area);
            frame.render_widget(
                Paragraph::new(HELP).block(Block::bordered().title("help")),
                body_area,
            );
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        // Auth routes get no chrome beyond the title.
        let line = if self.shell.is_auth_route() {
            Line::from(vec!["link board".bold()])
        } else {
            let user_repr = match self.session.current() {
                Some(user) => format!("{} ", user.display_name()),
                None => "guest ".to_string(),
            };
            let hint = match &self.search_input {
                Some(query) => format!("search: {query}_"),
                None => "/:search  n:new post  l:logout  ?:help".to_string(),
            };
            Line::from(vec![
                "link board".bold(),
                Span::raw("  "),
                Span::raw(self.shell.path().to_string()),
                Span::raw("  "),
                Span::raw(hint),
                Span::raw("  "),
                user_repr.light_green(),
            ])
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_sign_in(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from("  Sign in".bold()),
            Line::from(""),
            form_field("email", &self.sign_in_form.email, self.focus == 0, false),
            form_field("password", &self.sign_in_form.password, self.focus == 1, true),
            Line::from(""),
            button("[ Sign in ]", self.focus == 2),
            button("[ Create an account ]", self.focus == 3),
        ];
        frame.render_widget(Paragraph::new(lines).block(Block::bordered()), area);
    }

    fn draw_sign_up(&self, frame: &mut Frame, area: Rect) {
        let form = &self.sign_up_form;
        let lines = vec![
            Line::from(""),
            Line::from("  Create an account".bold()),
            Line::from(""),
            form_field("first name", &form.first_name, self.focus == 0, false),
            form_field("last name", &form.last_name, self.focus == 1, false),
            form_field("email", &form.email, self.focus == 2, false),
            form_field("password", &form.password1, self.focus == 3, true),
            form_field("confirm", &form.password2, self.focus == 4, true),
            Line::from(""),
            button("[ Register ]", self.focus == 5),
            button("[ Back to sign-in ]", self.focus == 6),
        ];
        frame.render_widget(Paragraph::new(lines).block(Block::bordered()), area);
    }

    fn draw_feed(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .feed
            .iter()
            .enumerate()
            .map(|(index, post)| {
                let marker = if index == self.selected { "> " } else { "  " };
                let votes = post.upvote_count - post.downvote_count;
                let title = if index == self.selected {
                    post.title.clone().bold()
                } else {
                    Span::raw(post.title.clone())
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{marker}{votes:>4}  ")),
                    title,
                ]))
            })
            .collect();
        let title = if self.feed.is_empty() {
            "front page (empty)".to_string()
        } else {
            format!("front page ({} posts)", self.feed.len())
        };
        frame.render_widget(
            List::new(items).block(Block::bordered().title(title)),
            area,
        );
    }

    fn draw_compose(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(""),
            Line::from("  New post".bold()),
            Line::from(""),
            form_field("title", &self.post_draft.title, self.focus == 0, false),
            Line::from(""),
            if self.focus == 1 {
                Line::from("  >    content:".bold())
            } else {
                Line::from("       content:")
            },
        ];
        for row in self.post_draft.content.lines() {
            lines.push(Line::from(format!("       {row}")));
        }
        lines.push(Line::from(""));
        lines.push(button("[ Submit ]", self.focus == 2));
        frame.render_widget(Paragraph::new(lines).block(Block::bordered()), area);
    }

    fn draw_thread(&self, frame: &mut Frame, area: Rect) {
        let Some(post) = &self.open_post else {
            frame.render_widget(Paragraph::new("No post selected"), area);
            return;
        };
        let [post_area, comments_area, input_area] = Layout::vertical([
            Constraint::Length(7),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .areas(area);

        let mut lines = vec![Line::from(post.title.clone().bold()), Line::from("")];
        for row in post.content.lines() {
            lines.push(Line::from(row.to_string()));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::bordered()),
            post_area,
        );

        let items: Vec<ListItem> = self
            .thread_comments
            .iter()
            .map(|comment| {
                ListItem::new(Line::from(format!("#{}  {}", comment.user, comment.comment)))
            })
            .collect();
        frame.render_widget(
            List::new(items).block(Block::bordered().title("comments (this session)")),
            comments_area,
        );

        let remaining = COMMENT_MAX_LEN.saturating_sub(self.comment_input.chars().count());
        frame.render_widget(
            Paragraph::new(self.comment_input.clone())
                .block(Block::bordered().title(format!("comment ({remaining} left)"))),
            input_area,
        );
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let message = self.notice.clone().unwrap_or_default();
        frame.render_widget(Paragraph::new(message.light_yellow()), area);
    }
}

fn form_field(label: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let rendered = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let marker = if focused { "> " } else { "  " };
    let repr = format!("  {marker}{label:>10}: {rendered}");
    if focused {
        Line::from(repr.bold())
    } else {
        Line::from(repr)
    }
}

fn button(label: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let repr = format!("  {marker}{label}");
    if focused {
        Line::from(repr.bold())
    } else {
        Line::from(repr)
    }
}
