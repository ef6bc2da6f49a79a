use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::api::{AuthService, ProjectService, TaskService};
use crate::helpers::{
    format_date_long, format_date_time, is_overdue, priority_level_text, status_color,
};
use crate::session::SessionStore;
use crate::task::Task;
use crate::ui::app::{App, Screen};
use crate::views::{
    AddTask, Banner, Dashboard, DetailMode, FilterMode, Form, Notice, TaskDetail, TaskList,
};

const APP_NAME: &str = "TaskDeck";

fn accent() -> Style {
    Style::default().fg(Color::Cyan)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Bold, and struck through once the task is done.
fn title_style(task: &Task) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    if task.is_completed() {
        style.add_modifier(Modifier::CROSSED_OUT)
    } else {
        style
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default().title(title).borders(Borders::ALL)
}

pub fn draw<A, S>(f: &mut Frame, app: &App<A, S>)
where
    A: AuthService + ProjectService + TaskService + Sync,
    S: SessionStore,
{
    let notice = match app.screen() {
        Screen::Dashboard(v) => Some(&v.notice),
        Screen::Tasks(v) => Some(&v.notice),
        Screen::Detail(v) => Some(&v.notice),
        Screen::AddTask(v) => Some(&v.notice),
        Screen::Login(_) | Screen::Register(_) => None,
    };
    let banner = notice.and_then(Notice::banner);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(if banner.is_some() { 3 } else { 0 }),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    let user = app.ctx().user().map(|u| u.display_name()).unwrap_or("");
    let nav = Paragraph::new(Line::from(vec![
        Span::styled(APP_NAME, accent().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(app.route().path(), dim()),
        Span::raw("  "),
        Span::raw(user.to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(nav, chunks[0]);

    if let Some(banner) = banner {
        let color = match banner {
            Banner::Error(_) => Color::Red,
            Banner::Success(_) => Color::Green,
        };
        let p = Paragraph::new(format!("{}  (x to dismiss)", banner.text()))
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
        f.render_widget(p, chunks[1]);
    }

    let body = chunks[2];
    match app.screen() {
        Screen::Login(v) => draw_form(f, body, "Login", &v.form, v.loading),
        Screen::Register(v) => draw_form(f, body, "Create Account", &v.form, v.loading),
        Screen::Dashboard(v) => draw_dashboard(f, body, v),
        Screen::Tasks(v) => draw_task_list(f, body, v),
        Screen::Detail(v) => draw_detail(f, body, v),
        Screen::AddTask(v) => draw_add_task(f, body, v),
    }

    let footer = match app.busy() {
        Some(label) => Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Yellow)),
            Span::styled("  Esc to cancel", dim()),
        ]),
        None => Line::from(Span::styled(help(app.screen()), dim())),
    };
    f.render_widget(Paragraph::new(footer), chunks[3]);
}

fn help(screen: &Screen) -> &'static str {
    match screen {
        Screen::Login(_) => "Tab: next field  Enter: log in  Ctrl-R: register  Esc: quit",
        Screen::Register(_) => "Tab: next field  Enter: create account  Esc: back to login",
        Screen::Dashboard(v) if v.confirm.pending().is_some() => "Delete this project? y/n",
        Screen::Dashboard(v) if v.form.is_some() => "Tab: next field  Enter: create  Esc: close",
        Screen::Dashboard(_) => "j/k: move  Enter: open  n: new project  d: delete  r: reload  L: logout  q: quit",
        Screen::Tasks(v) if v.confirm.pending().is_some() => "Delete this task? y/n",
        Screen::Tasks(_) => "j/k: move  Enter: open  a: add task  t: top 5 / all  d: delete  q: back",
        Screen::Detail(v) if v.confirm.pending().is_some() => "Delete this task? y/n",
        Screen::Detail(v) if v.is_editing() => "Tab: next field  Left/Right: status/priority  Enter: save  Esc: cancel",
        Screen::Detail(_) => "e: edit  c: complete / reopen  d: delete  p: project  q: back",
        Screen::AddTask(_) => "Tab: next field  Left/Right: status/priority  Enter: add  Esc: cancel",
    }
}

fn form_lines(form: &dyn Form) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = form
        .labels()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let focused = form.focus() == i;
            let style = if focused { accent().add_modifier(Modifier::BOLD) } else { Style::default() };
            Line::from(vec![
                Span::styled(format!("{label:<16}"), style),
                Span::raw(form.value(i)),
                Span::styled(if focused { "_" } else { "" }, accent()),
            ])
        })
        .collect();
    if let Some(err) = form.error() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red)));
    }
    lines
}

fn draw_form(f: &mut Frame, area: Rect, title: &str, form: &dyn Form, busy: bool) {
    let mut lines = form_lines(form);
    if busy {
        lines.push(Line::styled("Please wait...", dim()));
    }
    f.render_widget(Paragraph::new(lines).block(bordered(title)), area);
}

fn draw_dashboard(f: &mut Frame, area: Rect, view: &Dashboard) {
    let (list_area, form_area) = match &view.form {
        Some(_) => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            (halves[0], Some(halves[1]))
        }
        None => (area, None),
    };

    if view.loading {
        f.render_widget(Paragraph::new("Loading projects...").block(bordered("My Projects")), list_area);
    } else if view.projects.is_empty() {
        f.render_widget(
            Paragraph::new("No projects yet. Press n to create your first project.")
                .block(bordered("My Projects")),
            list_area,
        );
    } else {
        let items: Vec<ListItem> = view
            .projects
            .iter()
            .map(|p| {
                let mut lines = vec![Line::from(Span::styled(
                    p.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ))];
                if let Some(desc) = p.description.as_deref().filter(|d| !d.is_empty()) {
                    lines.push(Line::raw(format!("  {desc}")));
                }
                if let Some(dates) = p.date_range() {
                    lines.push(Line::styled(format!("  {dates}"), dim()));
                }
                ListItem::new(lines)
            })
            .collect();
        let mut state = ListState::default().with_selected(Some(view.selected));
        let list = List::new(items)
            .block(bordered("My Projects").border_style(accent()))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, list_area, &mut state);
    }

    if let (Some(form), Some(area)) = (&view.form, form_area) {
        draw_form(f, area, "Create New Project", form, false);
    }
}

fn task_item(task: &Task) -> ListItem<'static> {
    let color = status_color(Some(task.status.as_str())).color();
    let mut spans = vec![
        Span::styled(format!("[{}] ", task.status.label()), Style::default().fg(color)),
        Span::styled(task.title.clone(), title_style(task)),
        Span::raw(format!(
            "  P{} {}",
            task.effective_priority(),
            priority_level_text(task.priority)
        )),
        Span::styled(format!("  Due: {}", format_date_long(task.due_date.as_deref())), dim()),
    ];
    if is_overdue(task.due_date.as_deref(), task.status) {
        spans.push(Span::styled("  OVERDUE", Style::default().fg(Color::Red)));
    }
    if let Some(title) = task.project_title() {
        spans.push(Span::styled(format!("  ({title})"), dim()));
    }
    ListItem::new(Line::from(spans))
}

fn draw_task_list(f: &mut Frame, area: Rect, view: &TaskList) {
    if view.loading {
        f.render_widget(Paragraph::new("Loading tasks...").block(bordered("Tasks")), area);
        return;
    }
    if view.is_not_found() {
        f.render_widget(
            Paragraph::new("Project not found. Press q to return to the dashboard.")
                .block(bordered("Tasks")),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(4), Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    if let Some(project) = &view.project {
        let header = Paragraph::new(vec![
            Line::from(Span::styled(project.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::raw(project.description.clone().unwrap_or_default()),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(header, chunks[0]);
    }

    let title = match view.mode {
        FilterMode::All => format!("Tasks ({})", view.count_label()),
        FilterMode::Top5 => format!("Top Priority Tasks ({})", view.count_label()),
    };
    if view.filter_loading {
        f.render_widget(Paragraph::new("Loading...").block(bordered(&title)), chunks[1]);
    } else if view.tasks.is_empty() {
        f.render_widget(Paragraph::new(view.empty_hint()).block(bordered(&title)), chunks[1]);
    } else {
        let items: Vec<ListItem> = view.tasks.iter().map(task_item).collect();
        let mut state = ListState::default().with_selected(Some(view.selected));
        let list = List::new(items)
            .block(bordered(&title).border_style(accent()))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, chunks[1], &mut state);
    }

    let legend = Paragraph::new(Line::from(Span::styled(
        "Priority: 9-10 Very High  7-8 High  5-6 Medium  3-4 Low  1-2 Very Low",
        dim(),
    )))
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(legend, chunks[2]);
}

fn draw_detail(f: &mut Frame, area: Rect, view: &TaskDetail) {
    if view.loading {
        f.render_widget(Paragraph::new("Loading task...").block(bordered("Task")), area);
        return;
    }
    let Some(task) = &view.task else {
        f.render_widget(
            Paragraph::new("Task not found. It may have been deleted.").block(bordered("Task")),
            area,
        );
        return;
    };
    if let DetailMode::Editing(form) = &view.mode {
        let title = if view.saving { "Edit Task (saving...)" } else { "Edit Task" };
        draw_form(f, area, title, form, false);
        return;
    }

    let color = status_color(Some(task.status.as_str())).color();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(task.title.clone(), title_style(task)),
            Span::raw("  "),
            Span::styled(task.status.label(), Style::default().fg(color)),
        ]),
        Line::raw(""),
        Line::raw(
            task.description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "No description provided".to_string()),
        ),
        Line::raw(""),
        Line::raw(format!(
            "Priority:  {} ({})",
            task.effective_priority(),
            priority_level_text(task.priority)
        )),
    ];
    let mut due = vec![Span::raw(format!(
        "Due:       {}",
        format_date_long(task.due_date.as_deref())
    ))];
    if is_overdue(task.due_date.as_deref(), task.status) {
        due.push(Span::styled("  OVERDUE", Style::default().fg(Color::Red)));
    }
    lines.push(Line::from(due));
    if let Some(title) = task.project_title() {
        lines.push(Line::raw(format!("Project:   {title}")));
    }
    lines.push(Line::styled(
        format!("Created:   {}", format_date_time(task.created_at.as_deref())),
        dim(),
    ));
    lines.push(Line::styled(
        format!("Updated:   {}", format_date_time(task.updated_at.as_deref())),
        dim(),
    ));
    if view.deleting {
        lines.push(Line::styled("Deleting...", Style::default().fg(Color::Yellow)));
    }

    let title = format!("Task #{}", view.id());
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(bordered(&title).border_style(Style::default().fg(color)));
    f.render_widget(p, area);
}

fn draw_add_task(f: &mut Frame, area: Rect, view: &AddTask) {
    let title = match view.project_id() {
        Some(id) => format!("Add Task to project #{id}"),
        None => "Add Task".to_string(),
    };
    draw_form(f, area, &title, &view.form, view.submitting);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{project, task, user, FakeBackend};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use crate::router::Route;
    use crate::session::{AuthContext, MemorySessionStore, StoredSession};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;

    fn text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn backend() -> FakeBackend {
        FakeBackend::new()
            .with_user(user(1, "Ada"))
            .with_project(project(1, "Home", 1))
            .with_task(task(10, "Dishes", 1, Some(9)))
    }

    fn app(session: bool) -> App<FakeBackend, MemorySessionStore> {
        with_backend(backend(), session)
    }

    fn with_backend(api: FakeBackend, session: bool) -> App<FakeBackend, MemorySessionStore> {
        let store = if session {
            MemorySessionStore::with(StoredSession {
                token: Some("t".into()),
                user: serde_json::to_string(&user(1, "Ada")).ok(),
            })
        } else {
            MemorySessionStore::new()
        };
        App::new(api, AuthContext::init(store), Duration::from_secs(3))
    }

    #[test]
    fn login_screen_shows_fields() {
        let app = app(false);
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let screen = text(&terminal);
        assert!(screen.contains("Email *"));
        assert!(screen.contains("Name *"));
        assert!(screen.contains("/login"));
    }

    #[tokio::test]
    async fn task_list_shows_priority_text() {
        let (_tx, mut rx) = unbounded_channel();
        let mut app = app(true);
        app.go(Route::ProjectTasks(1), &mut rx).await;
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let screen = text(&terminal);
        assert!(screen.contains("Dishes"));
        assert!(screen.contains("P9 Very High"));
        assert!(screen.contains("Tasks (1)"));
        assert!(screen.contains("Ada"));
    }

    #[tokio::test]
    async fn missing_task_renders_not_found() {
        let (_tx, mut rx) = unbounded_channel();
        let mut app = app(true);
        app.go(Route::task(99), &mut rx).await;
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(text(&terminal).contains("Task not found"));
    }

    #[tokio::test]
    async fn completing_shows_at_once_and_reverts_on_failure() {
        let (_tx, mut rx) = unbounded_channel();
        let api = backend();
        api.fail("patch_task");
        let mut app = with_backend(api, true);
        app.go(Route::task(10), &mut rx).await;
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();

        let toggle = app.key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)).unwrap();
        app.prepare(&toggle);
        terminal.draw(|f| draw(f, &app)).unwrap();
        let screen = text(&terminal);
        assert!(screen.contains("Task #10"));
        assert!(screen.contains("Completed"));
        assert!(screen.contains("Updating..."));

        app.perform(toggle, &mut rx).await;
        terminal.draw(|f| draw(f, &app)).unwrap();
        let screen = text(&terminal);
        assert!(screen.contains("Pending"));
        assert!(screen.contains("Failed to update status"));
    }

    #[tokio::test]
    async fn completed_titles_are_struck_through() {
        let (_tx, mut rx) = unbounded_channel();
        let api = backend();
        api.tasks.lock().unwrap()[0].status = crate::task::TaskStatus::Completed;
        let mut app = with_backend(api, true);
        app.go(Route::ProjectTasks(1), &mut rx).await;
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let cells = &terminal.backend().buffer().content;
        let start = cells
            .windows(6)
            .position(|w| w.iter().map(|c| c.symbol()).collect::<String>() == "Dishes")
            .unwrap();
        assert!(cells[start].modifier.contains(Modifier::CROSSED_OUT));
    }
}
