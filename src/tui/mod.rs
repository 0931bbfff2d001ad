// TUI module - interactive terminal preview
//
// This module renders a live page in the terminal using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard and mouse input, frame ticks, page timers)
// - Mapping terminal input onto page events
//
// The page's virtual clock follows the wall clock through LiveClock, so
// counters, reveals and notification dismissals play out in real time.

pub mod theme;
pub mod ui;

use crate::config::Config;
use crate::dom::{Document, NodeId};
use crate::logging::LogBuffer;
use crate::runtime::{LiveClock, Page};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::time::Instant;

/// Redraw cadence while nothing else happens
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Rows taken by the nav bar (3) and the status bar (1)
pub const CHROME_ROWS: u16 = 4;

/// Rows the mouse wheel scrolls per notch
const WHEEL_ROWS: f64 = 3.0;

/// Something the user asked the preview to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Scroll by a number of terminal rows (negative is up)
    ScrollRows(f64),
    /// Scroll by whole screens
    ScrollPages(f64),
    /// Click the nth nav link, zero-based
    ClickNav(usize),
    Hamburger,
    ToggleTheme,
    LinkedIn,
    CloseNotification,
    BackToTop,
    /// Click whatever sits under a body cell
    ClickAt { column: u16, row: u16 },
    Quit,
}

/// Preview state: the page plus what the terminal needs to draw it
pub struct Preview {
    pub page: Page,
    pub log_buffer: LogBuffer,
    pub px_per_row: f64,
    pub columns: u16,
    pub should_quit: bool,
}

impl Preview {
    pub fn new(page: Page, log_buffer: LogBuffer, px_per_row: f64) -> Self {
        Self {
            page,
            log_buffer,
            px_per_row: px_per_row.max(1.0),
            columns: 80,
            should_quit: false,
        }
    }

    /// Match the page viewport height to the body area of a terminal
    pub fn fit_viewport(&mut self, columns: u16, rows: u16) {
        self.columns = columns.max(1);
        let body_rows = rows.saturating_sub(CHROME_ROWS).max(1);
        let width = self.page.viewport().width;
        self.page.resize(width, f64::from(body_rows) * self.px_per_row);
    }

    /// Page pixels per terminal column
    pub fn px_per_column(&self) -> f64 {
        self.page.viewport().width / f64::from(self.columns)
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::ScrollRows(rows) => self.page.scroll_by(rows * self.px_per_row),
            Action::ScrollPages(pages) => {
                let screen = (self.page.viewport().height - self.px_per_row).max(self.px_per_row);
                self.page.scroll_by(pages * screen);
            }
            Action::ClickNav(index) => self.click_nth(".nav-link", index),
            Action::Hamburger => self.click_nth(".hamburger", 0),
            Action::ToggleTheme => self.click_nth("#theme-toggle", 0),
            Action::LinkedIn => self.click_nth(".linkedin-btn", 0),
            Action::CloseNotification => self.page.close_notification(),
            Action::BackToTop => {
                if let Some(button) = self.page.back_to_top() {
                    self.page.click(button);
                }
            }
            Action::ClickAt { column, row } => {
                let viewport = self.page.viewport();
                let x = f64::from(column) * self.px_per_column();
                let y = viewport.scroll_y + f64::from(row) * self.px_per_row;
                if let Some(node) = hit_test(self.page.doc(), x, y) {
                    self.page.click(node);
                }
            }
            Action::Quit => self.should_quit = true,
        }
    }

    fn click_nth(&mut self, selector: &str, index: usize) {
        match self.page.doc().select(selector) {
            Ok(nodes) => match nodes.get(index) {
                Some(&node) => self.page.click(node),
                None => tracing::debug!("Nothing to click: {} #{}", selector, index),
            },
            Err(e) => tracing::warn!("Bad selector '{}': {:#}", selector, e),
        }
    }
}

/// Deepest in-flow element containing a page point. Fixed-position layers
/// and the nav bar are drawn separately and never hit.
pub fn hit_test(doc: &Document, x: f64, y: f64) -> Option<NodeId> {
    let mut hit = None;
    for node in doc.descendants(doc.body()) {
        if ui::is_out_of_flow(doc, node) {
            continue;
        }
        let rect = doc.element(node).rect;
        if x >= rect.left() && x < rect.right() && y >= rect.top() && y < rect.bottom() {
            hit = Some(node);
        }
    }
    hit
}

/// Map a key press to an action
pub fn key_action(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollRows(1.0),
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollRows(-1.0),
        KeyCode::PageDown | KeyCode::Char(' ') => Action::ScrollPages(1.0),
        KeyCode::PageUp => Action::ScrollPages(-1.0),
        KeyCode::Char(c @ '1'..='9') => Action::ClickNav(c as usize - '1' as usize),
        KeyCode::Char('m') => Action::Hamburger,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('l') => Action::LinkedIn,
        KeyCode::Char('x') => Action::CloseNotification,
        KeyCode::Home => Action::BackToTop,
        _ => return None,
    };
    Some(action)
}

/// Map a mouse event to an action; `body_top` is the first body row
pub fn mouse_action(mouse: MouseEvent, body_top: u16) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Action::ScrollRows(WHEEL_ROWS)),
        MouseEventKind::ScrollUp => Some(Action::ScrollRows(-WHEEL_ROWS)),
        MouseEventKind::Down(MouseButton::Left) if mouse.row >= body_top => Some(Action::ClickAt {
            column: mouse.column,
            row: mouse.row - body_top,
        }),
        _ => None,
    }
}

/// Run the preview
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// when done, even if the loop failed.
pub async fn run_preview(page: Page, config: &Config, log_buffer: LogBuffer) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )
    .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut preview = Preview::new(page, log_buffer, config.layout.px_per_row);
    let size = terminal.size().context("Failed to read terminal size")?;
    preview.fit_viewport(size.width, size.height);

    let clock = LiveClock::start();
    let result = run_event_loop(&mut terminal, &mut preview, &clock).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    tracing::info!(
        "Preview closed after {}ms with {} fault(s)",
        preview.page.now().as_millis(),
        preview.page.faults()
    );
    result
}

/// Main event loop
///
/// Waits on terminal input, the frame tick and the page's next timer with
/// tokio::select!. Whatever wakes the loop, the page clock is synced before
/// the next frame is drawn.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    preview: &mut Preview,
    clock: &LiveClock,
) -> Result<()> {
    let mut frame_interval = tokio::time::interval(FRAME_INTERVAL);

    loop {
        clock.sync(&mut preview.page);
        terminal
            .draw(|f| ui::draw(f, preview))
            .context("Failed to draw terminal")?;

        let deadline = clock.next_deadline(&preview.page);

        tokio::select! {
            // Keyboard, mouse, focus and resize
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(event) => handle_terminal_event(preview, event),
                        Err(e) => tracing::warn!("Failed to read terminal event: {}", e),
                    }
                }
            } => {}

            // Periodic redraw for counters and reveals
            _ = frame_interval.tick() => {}

            // Next page timer
            _ = wait_until(deadline) => {}
        }

        if preview.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_terminal_event(preview: &mut Preview, event: Event) {
    let action = match event {
        Event::Key(key) => key_action(key),
        Event::Mouse(mouse) => mouse_action(mouse, ui::BODY_TOP),
        Event::Resize(columns, rows) => {
            preview.fit_viewport(columns, rows);
            None
        }
        Event::FocusLost => {
            preview.page.set_hidden(true);
            None
        }
        Event::FocusGained => {
            preview.page.set_hidden(false);
            None
        }
        _ => None,
    };
    if let Some(action) = action {
        preview.apply(action);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::storage::MemoryStore;
    use crate::viewport::Viewport;

    fn preview() -> Preview {
        let config = Config::default();
        let doc = demo::demo_page().unwrap().build(1280.0).unwrap();
        let page = Page::load(
            doc,
            &config,
            Viewport::new(1280.0, 800.0),
            Box::new(MemoryStore::new()),
        )
        .unwrap();
        let mut preview = Preview::new(page, LogBuffer::new(), 20.0);
        preview.fit_viewport(128, 44);
        preview
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_action(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(key_action(press(KeyCode::Char('j'))), Some(Action::ScrollRows(1.0)));
        assert_eq!(key_action(press(KeyCode::Up)), Some(Action::ScrollRows(-1.0)));
        assert_eq!(key_action(press(KeyCode::Char('3'))), Some(Action::ClickNav(2)));
        assert_eq!(key_action(press(KeyCode::Home)), Some(Action::BackToTop));
        assert_eq!(key_action(press(KeyCode::Char('z'))), None);
        assert_eq!(
            key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_mouse_click_below_chrome_only() {
        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(mouse_action(click(1), 3), None);
        assert_eq!(
            mouse_action(click(7), 3),
            Some(Action::ClickAt { column: 5, row: 4 })
        );
    }

    #[test]
    fn test_viewport_follows_terminal() {
        let preview = preview();
        assert_eq!(preview.page.viewport().height, 40.0 * 20.0);
        assert_eq!(preview.px_per_column(), 10.0);
    }

    #[test]
    fn test_nav_key_scrolls_to_section() {
        let mut preview = preview();
        // Second link is #about at 700, minus the nav offset
        preview.apply(Action::ClickNav(1));
        assert_eq!(preview.page.viewport().scroll_y, 620.0);
        assert_eq!(preview.page.active_section().as_deref(), Some("about"));
    }

    #[test]
    fn test_theme_and_menu_keys() {
        let mut preview = preview();
        let before = preview.page.color_scheme();
        preview.apply(Action::ToggleTheme);
        assert_ne!(preview.page.color_scheme(), before);

        preview.apply(Action::Hamburger);
        assert!(preview.page.is_menu_open());
        preview.apply(Action::Hamburger);
        assert!(!preview.page.is_menu_open());
    }

    #[test]
    fn test_linkedin_key_then_close() {
        let mut preview = preview();
        preview.apply(Action::LinkedIn);
        assert!(preview.page.notification().is_some());

        preview.apply(Action::CloseNotification);
        preview.page.advance_by(Duration::from_millis(300));
        assert!(preview.page.notification().is_none());
    }

    #[test]
    fn test_scroll_pages_and_back_to_top() {
        let mut preview = preview();
        preview.apply(Action::ScrollPages(1.0));
        assert_eq!(preview.page.viewport().scroll_y, 780.0);

        preview.apply(Action::BackToTop);
        assert_eq!(preview.page.viewport().scroll_y, 0.0);
    }

    #[test]
    fn test_click_at_hits_deepest_element() {
        let preview = preview();
        let doc = preview.page.doc();
        let button = doc.select(".linkedin-btn").unwrap()[0];
        let rect = doc.element(button).rect;
        assert_eq!(hit_test(doc, rect.left() + 1.0, rect.top() + 1.0), Some(button));
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_clock_drives_notification_dismissal() {
        let mut preview = preview();
        let clock = LiveClock::start();
        preview.apply(Action::LinkedIn);
        assert!(preview.page.notification().is_some());

        // Sleep to each timer deadline the way the event loop does
        for _ in 0..100 {
            if preview.page.notification().is_none() {
                break;
            }
            let deadline = clock.next_deadline(&preview.page);
            assert!(deadline.is_some());
            wait_until(deadline).await;
            clock.sync(&mut preview.page);
        }
        assert!(preview.page.notification().is_none());
        assert!(preview.page.now() >= Duration::from_millis(5300));
    }
}
