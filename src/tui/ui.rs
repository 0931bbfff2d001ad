// UI rendering logic
//
// Every frame is drawn from the page's current document. Body elements are
// placed by their page rectangle: one terminal row per `px_per_row` pixels,
// columns scaled from the viewport width. Fixed layers (the notification
// panel and the back-to-top button) are drawn as overlays.

use super::theme::Palette;
use super::Preview;
use crate::animate::{FADE_IN_UP, HERO_SELECTOR, OBSERVED_SELECTOR, SLIDE_IN_LEFT};
use crate::dom::{Document, NodeId, Selector};
use crate::scroll::{ANIMATED, REVEAL_SELECTOR};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// First terminal row of the page body
pub const BODY_TOP: u16 = 3;

/// Cells used by a progress bar, excluding the percentage
const BAR_CELLS: usize = 20;

const PROGRESS_CLASSES: [&str; 2] = ["skill-progress", "progress-fill"];

/// Main render function - called on every frame
pub fn draw(f: &mut Frame, preview: &Preview) {
    let palette = Palette::for_scheme(preview.page.color_scheme());

    // Nav bar (3 lines), page body (rest), status bar (1 line)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(BODY_TOP),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(Block::default().style(palette.base()), f.area());
    render_nav(f, chunks[0], preview, &palette);
    render_body(f, chunks[1], preview, &palette);
    render_back_to_top(f, chunks[1], preview, &palette);
    render_notification(f, chunks[1], preview, &palette);
    render_status(f, chunks[2], preview, &palette);
}

/// Whether an element is drawn outside the body flow: the nav bar, fixed
/// layers and anything under `display: none`
pub fn is_out_of_flow(doc: &Document, node: NodeId) -> bool {
    std::iter::once(node).chain(doc.ancestors(node)).any(|n| {
        let el = doc.element(n);
        el.tag == "nav"
            || el.style("position") == Some("fixed")
            || el.style("display") == Some("none")
    })
}

fn render_nav(f: &mut Frame, area: Rect, preview: &Preview, palette: &Palette) {
    let doc = preview.page.doc();
    let mut spans = Vec::new();

    let links = doc.query_all(&Selector::class("nav-link"));
    for (i, link) in links.iter().enumerate() {
        let el = doc.element(*link);
        let label = format!(" {} {} ", i + 1, doc.text_content(*link).trim());
        let style = if el.has_class("active") {
            Style::default()
                .fg(palette.nav_active)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(palette.fg)
        };
        spans.push(Span::styled(label, style));
    }

    if preview.page.is_menu_open() {
        spans.push(Span::styled(
            "  ≡ menu open",
            Style::default().fg(palette.nav_active),
        ));
    }

    let title = match preview.page.color_scheme() {
        Some(scheme) => format!(" folio · {} ", scheme),
        None => " folio ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(palette.title)
                .add_modifier(Modifier::BOLD),
        ));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Content of one element placed at a body column
struct Cell {
    column: u16,
    spans: Vec<Span<'static>>,
}

fn render_body(f: &mut Frame, area: Rect, preview: &Preview, palette: &Palette) {
    let doc = preview.page.doc();
    let scroll_y = preview.page.viewport().scroll_y;
    let px_per_column = preview.px_per_column().max(1.0);
    let revealable = Selector::parse(&format!(
        "{}, {}, {}, .hero-buttons",
        OBSERVED_SELECTOR, HERO_SELECTOR, REVEAL_SELECTOR
    ))
    .ok();

    let mut rows: Vec<Vec<Cell>> = (0..area.height).map(|_| Vec::new()).collect();
    for node in doc.descendants(doc.body()) {
        if is_out_of_flow(doc, node) {
            continue;
        }
        let rect = doc.element(node).rect;
        let row = ((rect.top() - scroll_y) / preview.px_per_row).floor();
        if row < 0.0 || row >= f64::from(area.height) {
            continue;
        }

        let state = reveal_state(doc, node, revealable.as_ref());
        let Some(spans) = element_spans(doc, node, state, palette) else {
            continue;
        };
        rows[row as usize].push(Cell {
            column: (rect.left() / px_per_column).floor() as u16,
            spans,
        });
    }

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|cells| compose_line(cells, usize::from(area.width)))
        .collect();
    f.render_widget(Paragraph::new(lines).style(palette.base()), area);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevealState {
    /// Never animated
    Static,
    /// Will animate once scrolled into view
    Pending,
    Revealed,
}

fn reveal_state(doc: &Document, node: NodeId, revealable: Option<&Selector>) -> RevealState {
    let revealed = std::iter::once(node).chain(doc.ancestors(node)).any(|n| {
        let el = doc.element(n);
        el.has_class(FADE_IN_UP) || el.has_class(SLIDE_IN_LEFT) || el.has_class(ANIMATED)
    });
    if revealed {
        RevealState::Revealed
    } else if revealable.is_some_and(|s| doc.closest(node, s).is_some()) {
        RevealState::Pending
    } else {
        RevealState::Static
    }
}

/// What an element contributes to its row, if anything
fn element_spans(
    doc: &Document,
    node: NodeId,
    state: RevealState,
    palette: &Palette,
) -> Option<Vec<Span<'static>>> {
    let el = doc.element(node);

    if el.tag == "img" {
        let (label, style) = match (el.attribute("src"), el.attribute("data-src")) {
            (Some(src), _) => (
                format!("[img {}]", el.attribute("alt").unwrap_or(src)),
                Style::default().fg(palette.image),
            ),
            (None, Some(_)) => ("[img loading…]".to_string(), palette.pending()),
            (None, None) => ("[img]".to_string(), palette.pending()),
        };
        return Some(vec![Span::styled(label, style)]);
    }

    if PROGRESS_CLASSES.iter().any(|c| el.has_class(c)) {
        let percent = el
            .style("width")
            .and_then(|w| w.trim().strip_suffix('%'))
            .and_then(|w| w.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        return Some(progress_bar(percent, BAR_CELLS, palette));
    }

    let text = el.text().trim();
    if text.is_empty() {
        return None;
    }
    let style = match state {
        RevealState::Pending => palette.pending(),
        _ if matches!(el.tag.as_str(), "h1" | "h2" | "h3") => Style::default()
            .fg(palette.heading)
            .add_modifier(Modifier::BOLD),
        RevealState::Revealed => palette.emphasized(),
        RevealState::Static => Style::default().fg(palette.fg),
    };
    Some(vec![Span::styled(text.to_string(), style)])
}

fn progress_bar(percent: f64, cells: usize, palette: &Palette) -> Vec<Span<'static>> {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * cells as f64).round() as usize;
    vec![
        Span::styled("█".repeat(filled), Style::default().fg(palette.bar_filled)),
        Span::styled(
            "░".repeat(cells - filled),
            Style::default().fg(palette.bar_empty),
        ),
        Span::styled(format!(" {:>3}%", percent.round()), Style::default().fg(palette.fg)),
    ]
}

/// Lay cells out left to right, padding to each cell's column. A cell that
/// would overlap the previous one starts one space after it instead.
fn compose_line(mut cells: Vec<Cell>, width: usize) -> Line<'static> {
    cells.sort_by_key(|c| c.column);

    let mut spans = Vec::new();
    let mut cursor = 0usize;
    for cell in cells {
        let column = usize::from(cell.column);
        let gap = if column > cursor {
            column - cursor
        } else if cursor > 0 {
            1
        } else {
            0
        };
        if cursor + gap >= width {
            break;
        }
        if gap > 0 {
            spans.push(Span::raw(" ".repeat(gap)));
            cursor += gap;
        }

        for span in cell.spans {
            let remaining = width.saturating_sub(cursor);
            if remaining == 0 {
                break;
            }
            let content = truncate(&span.content, remaining);
            cursor += content.width();
            spans.push(Span::styled(content, span.style));
        }
    }
    Line::from(spans)
}

/// Cut `text` to at most `max` display cells, marking the cut with an ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    if max > 0 {
        out.push('…');
    }
    out
}

fn render_back_to_top(f: &mut Frame, area: Rect, preview: &Preview, palette: &Palette) {
    let doc = preview.page.doc();
    let visible = preview
        .page
        .back_to_top()
        .is_some_and(|b| doc.element(b).style("visibility") == Some("visible"));
    if !visible {
        return;
    }

    let label = " ↑ top [Home] ";
    let width = (label.width() as u16).min(area.width);
    let marker = Rect::new(
        area.right().saturating_sub(width + 1),
        area.bottom().saturating_sub(1),
        width,
        1,
    );
    f.render_widget(Clear, marker);
    f.render_widget(
        Paragraph::new(label).style(
            Style::default()
                .fg(palette.status_fg)
                .bg(palette.status_bg)
                .add_modifier(Modifier::BOLD),
        ),
        marker,
    );
}

/// Notification panel in the top-right corner of the body
///
/// Uses `Clear` so the panel sits on top of page content.
fn render_notification(f: &mut Frame, area: Rect, preview: &Preview, palette: &Palette) {
    let Some(notification) = preview.page.notification() else {
        return;
    };
    let doc = preview.page.doc();
    let leaving = doc
        .element(notification.node)
        .style("animation")
        .is_some_and(|a| a.starts_with("slideOut"));

    // Message plus " ×", one cell of padding each side, and the border
    let content_width = notification.message.width() + 2;
    let width = ((content_width + 4).max(14) as u16).min(area.width.saturating_sub(2));
    let height = 3u16.min(area.height);
    let panel = Rect::new(
        area.right().saturating_sub(width + 1),
        area.top() + 1.min(area.height.saturating_sub(height)),
        width,
        height,
    );

    let accent = palette.severity(notification.severity);
    let border_style = if leaving {
        palette.pending()
    } else {
        Style::default().fg(accent)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} ", notification.severity),
            Style::default().fg(accent),
        ))
        .style(palette.base());

    let inner = usize::from(width.saturating_sub(4));
    let text = truncate(&notification.message, inner.saturating_sub(2));
    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(text, Style::default().fg(palette.fg)),
        Span::styled(" ×", palette.pending()),
    ]);

    f.render_widget(Clear, panel);
    f.render_widget(Paragraph::new(line).block(block), panel);
}

fn render_status(f: &mut Frame, area: Rect, preview: &Preview, palette: &Palette) {
    let page = &preview.page;
    let viewport = page.viewport();
    let bar = Style::default().fg(palette.status_fg).bg(palette.status_bg);

    let mut spans = vec![
        Span::styled(format!(" t={:.1}s", page.now().as_secs_f64()), bar),
        Span::styled(
            format!(
                " │ y={:.0}/{:.0}",
                viewport.scroll_y,
                viewport.max_scroll_y(page.doc())
            ),
            bar,
        ),
    ];
    if let Some(section) = page.active_section() {
        spans.push(Span::styled(format!(" │ #{}", section), bar));
    }
    if let Some(scheme) = page.color_scheme() {
        spans.push(Span::styled(format!(" │ {}", scheme), bar));
    }
    let fault_style = if page.faults() > 0 {
        bar.fg(palette.fault).add_modifier(Modifier::BOLD)
    } else {
        bar
    };
    spans.push(Span::styled(format!(" │ faults={}", page.faults()), fault_style));
    if page.is_hidden() {
        spans.push(Span::styled(" │ hidden", bar));
    }

    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    let remaining = usize::from(area.width).saturating_sub(used + 3);
    let last_log = preview
        .log_buffer
        .latest()
        .map(|entry| truncate(&entry.message, remaining))
        .unwrap_or_default();
    spans.push(Span::styled(format!(" │ {}", last_log), bar));

    f.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::demo;
    use crate::logging::LogBuffer;
    use crate::runtime::Page;
    use crate::storage::MemoryStore;
    use crate::viewport::Viewport;
    use ratatui::{backend::TestBackend, Terminal};

    fn cell(column: u16, text: &str) -> Cell {
        Cell {
            column,
            spans: vec![Span::raw(text.to_string())],
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn render(preview: &Preview) -> String {
        let mut terminal = Terminal::new(TestBackend::new(128, 44)).unwrap();
        terminal.draw(|f| draw(f, preview)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn preview() -> Preview {
        let doc = demo::demo_page().unwrap().build(1280.0).unwrap();
        let page = Page::load(
            doc,
            &Config::default(),
            Viewport::new(1280.0, 800.0),
            Box::new(MemoryStore::new()),
        )
        .unwrap();
        let mut preview = Preview::new(page, LogBuffer::new(), 20.0);
        preview.fit_viewport(128, 44);
        preview
    }

    #[test]
    fn test_compose_pads_to_columns() {
        let line = compose_line(vec![cell(6, "right"), cell(0, "left")], 40);
        assert_eq!(line_text(&line), "left  right");
    }

    #[test]
    fn test_compose_separates_overlaps_and_truncates() {
        let line = compose_line(vec![cell(0, "abcdef"), cell(2, "xyz")], 8);
        assert_eq!(line_text(&line), "abcdef …");
    }

    #[test]
    fn test_truncate_counts_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("日本語テキスト", 7), "日本語…");
    }

    #[test]
    fn test_progress_bar_fill() {
        let spans = progress_bar(50.0, 10, &Palette::dark());
        assert_eq!(spans[0].content, "█████");
        assert_eq!(spans[1].content, "░░░░░");
        assert_eq!(spans[2].content, "  50%");
    }

    #[test]
    fn test_draws_nav_and_status() {
        let screen = render(&preview());
        assert!(screen.contains("1 Home"));
        assert!(screen.contains("faults=0"));
        assert!(!screen.contains("top [Home]"));
    }

    #[test]
    fn test_draws_notification_and_back_to_top() {
        let mut preview = preview();
        preview.page.scroll_to(1300.0);
        preview.page.show_notification("Saved", crate::notify::Severity::Success);

        let screen = render(&preview);
        assert!(screen.contains("Saved ×"));
        assert!(screen.contains("success"));
        assert!(screen.contains("top [Home]"));
    }

    #[test]
    fn test_nav_and_fixed_layers_are_out_of_flow() {
        let preview = preview();
        let doc = preview.page.doc();
        let link = doc.select_one(".nav-link").unwrap().unwrap();
        let back = preview.page.back_to_top().unwrap();
        let about = doc.get_element_by_id("about").unwrap();
        assert!(is_out_of_flow(doc, link));
        assert!(is_out_of_flow(doc, back));
        assert!(!is_out_of_flow(doc, about));
    }
}
