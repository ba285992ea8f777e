use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::io;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::mpsc;

/// Message types for communication between the extraction run and the TUI
#[derive(Debug, Clone)]
pub enum ExtractMessage {
    /// Extraction started against an endpoint
    SessionStarted { endpoint: String },
    /// A class was discovered
    ClassFound {
        name: String,
        uri: String,
        instance_count: u64,
    },
    /// A relation between two nodes was discovered
    RelationFound {
        source: String,
        predicate: String,
        target: String,
    },
    /// Request counter update
    Stats {
        pending: usize,
        successful: usize,
        failed: usize,
    },
    /// Log message
    Log { level: LogLevel, message: String },
    /// Extraction completed
    Complete { classes: usize, relations: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One row in the discoveries panel
#[derive(Debug, Clone)]
enum Discovery {
    Class {
        name: String,
        uri: String,
        instance_count: u64,
    },
    Relation {
        source: String,
        predicate: String,
        target: String,
    },
}

/// TUI state for monitoring extraction progress
pub struct ExtractMonitor {
    discoveries: Vec<Discovery>,
    selected: Option<usize>,
    logs: Vec<(LogLevel, String)>,
    pending: usize,
    successful: usize,
    failed: usize,
    endpoint: Option<String>,
    progress_message: String,
    is_complete: bool,
    scroll_discoveries: usize,
    scroll_logs: usize,
    rx: mpsc::UnboundedReceiver<ExtractMessage>,
}

impl ExtractMonitor {
    pub fn new(rx: mpsc::UnboundedReceiver<ExtractMessage>) -> Self {
        Self {
            discoveries: Vec::new(),
            selected: None,
            logs: Vec::new(),
            pending: 0,
            successful: 0,
            failed: 0,
            endpoint: None,
            progress_message: "Starting extraction...".to_string(),
            is_complete: false,
            scroll_discoveries: 0,
            scroll_logs: 0,
            rx,
        }
    }

    /// Process incoming messages from the extraction run
    fn process_messages(&mut self) {
        // Process all available messages without blocking
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                ExtractMessage::SessionStarted { endpoint } => {
                    self.endpoint = Some(endpoint);
                }
                ExtractMessage::ClassFound {
                    name,
                    uri,
                    instance_count,
                } => {
                    self.discoveries.push(Discovery::Class {
                        name,
                        uri,
                        instance_count,
                    });
                    self.cap_discoveries();
                }
                ExtractMessage::RelationFound {
                    source,
                    predicate,
                    target,
                } => {
                    self.discoveries.push(Discovery::Relation {
                        source,
                        predicate,
                        target,
                    });
                    self.cap_discoveries();
                }
                ExtractMessage::Stats {
                    pending,
                    successful,
                    failed,
                } => {
                    self.pending = pending;
                    self.successful = successful;
                    self.failed = failed;
                }
                ExtractMessage::Log { level, message } => {
                    self.logs.push((level, message));

                    // Keep only last 500 log entries
                    if self.logs.len() > 500 {
                        self.logs.drain(0..self.logs.len() - 500);
                    }
                }
                ExtractMessage::Complete { classes, relations } => {
                    self.is_complete = true;
                    self.progress_message = format!(
                        "Extraction complete! {} classes, {} relations",
                        classes, relations
                    );
                }
            }
        }
    }

    /// Keep only the last 1000 discoveries to bound memory
    fn cap_discoveries(&mut self) {
        if self.discoveries.len() > 1000 {
            let overflow = self.discoveries.len() - 1000;
            self.discoveries.drain(0..overflow);
            if let Some(selected) = self.selected {
                self.selected = Some(selected.saturating_sub(overflow));
            }
        }
    }

    fn render_discoveries(&self, f: &mut Frame, area: Rect) {
        let title = format!(" Discoveries ({}) ", self.discoveries.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        f.render_widget(block, area);

        let height = inner.height as usize;
        let total_items = self.discoveries.len();

        if total_items == 0 {
            let empty_msg = Paragraph::new("Nothing discovered yet... waiting for results")
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            f.render_widget(empty_msg, inner);
            return;
        }

        // Keep the selected item in view, otherwise follow the tail
        let scroll_offset = if let Some(selected) = self.selected {
            if selected < self.scroll_discoveries {
                selected
            } else if selected >= self.scroll_discoveries + height {
                selected.saturating_sub(height - 1)
            } else {
                self.scroll_discoveries
            }
        } else if self.scroll_discoveries == 0 && total_items > height {
            total_items.saturating_sub(height)
        } else {
            self.scroll_discoveries
                .min(total_items.saturating_sub(height))
        };

        let items: Vec<ListItem> = self
            .discoveries
            .iter()
            .enumerate()
            .skip(scroll_offset)
            .take(height)
            .map(|(idx, discovery)| {
                let (text, color) = match discovery {
                    Discovery::Class {
                        name,
                        instance_count,
                        ..
                    } => (
                        format!("◆ {} ({} instances)", name, instance_count),
                        Color::Green,
                    ),
                    Discovery::Relation {
                        source,
                        predicate,
                        target,
                    } => (
                        format!("  {} -> {} via {}", source, target, predicate),
                        Color::Cyan,
                    ),
                };

                let mut style = Style::default().fg(color);
                if Some(idx) == self.selected {
                    style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
                }

                ListItem::new(text).style(style)
            })
            .collect();

        let list = List::new(items);
        f.render_widget(list, inner);

        if total_items > height {
            self.render_scrollbar(f, area, total_items, height, scroll_offset);
        }
    }

    fn render_scrollbar(
        &self,
        f: &mut Frame,
        area: Rect,
        total_items: usize,
        visible_items: usize,
        scroll_offset: usize,
    ) {
        let scrollbar_height = area.height.saturating_sub(2) as usize;
        if scrollbar_height == 0 {
            return;
        }

        let thumb_size = ((visible_items as f32 / total_items as f32) * scrollbar_height as f32)
            .max(1.0)
            .floor() as usize;

        let scroll_ratio = scroll_offset as f32 / (total_items - visible_items) as f32;
        let thumb_position =
            (scroll_ratio * (scrollbar_height - thumb_size) as f32).floor() as usize;

        let scrollbar_x = area.x + area.width - 1;
        let scrollbar_start_y = area.y + 1;

        for i in 0..scrollbar_height {
            let y = scrollbar_start_y + i as u16;
            let in_thumb = i >= thumb_position && i < thumb_position + thumb_size;
            let symbol = if in_thumb { "█" } else { "│" };
            let style = if in_thumb {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            f.render_widget(
                Paragraph::new(symbol).style(style),
                Rect {
                    x: scrollbar_x,
                    y,
                    width: 1,
                    height: 1,
                },
            );
        }
    }

    fn render_progress(&self, f: &mut Frame, area: Rect) {
        let (title, border_color) = if self.is_complete {
            (" Complete ", Color::Green)
        } else {
            (" Progress ", Color::Yellow)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(area);
        f.render_widget(block, area);

        let status_icon = if self.is_complete { "✓" } else { "⠋" };

        let mut text = vec![
            Line::from(vec![
                Span::styled(status_icon, Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled(
                    format!(
                        "{} queries ({} pending, {} failed)",
                        self.successful, self.pending, self.failed
                    ),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];

        if let Some(ref endpoint) = self.endpoint {
            text.push(Line::from(vec![
                Span::styled("Endpoint: ", Style::default().fg(Color::DarkGray)),
                Span::styled(endpoint.clone(), Style::default().fg(Color::Cyan)),
            ]));
            text.push(Line::from(""));
        }

        text.push(Line::from(self.progress_message.clone()));

        let paragraph = Paragraph::new(text).wrap(Wrap { trim: true });
        f.render_widget(paragraph, inner);
    }

    fn render_logs(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Logs ")
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(area);
        f.render_widget(block, area);

        let height = inner.height as usize;
        let total_items = self.logs.len();

        // Auto-scroll to bottom if not manually scrolled
        let scroll_offset = if self.scroll_logs == 0 && total_items > height {
            total_items.saturating_sub(height)
        } else {
            self.scroll_logs.min(total_items.saturating_sub(height))
        };

        let items: Vec<ListItem> = self
            .logs
            .iter()
            .skip(scroll_offset)
            .take(height)
            .map(|(level, message)| {
                let (prefix, style) = match level {
                    LogLevel::Info => ("INFO ", Style::default().fg(Color::Blue)),
                    LogLevel::Warn => ("WARN ", Style::default().fg(Color::Yellow)),
                    LogLevel::Error => ("ERROR", Style::default().fg(Color::Red)),
                };
                ListItem::new(format!("[{}] {}", prefix, message)).style(style)
            })
            .collect();

        let list = List::new(items);
        f.render_widget(list, inner);
    }

    fn render_hints(&self, f: &mut Frame, area: Rect) {
        let hints = if self.is_complete {
            Line::from(vec![
                Span::styled(" q/ESC ", Style::default().fg(Color::Black).bg(Color::Gray)),
                Span::raw(" Exit  "),
                Span::styled(" ↑/↓ ", Style::default().fg(Color::Black).bg(Color::Gray)),
                Span::raw(" Select  "),
                Span::styled(
                    " PgUp/PgDn ",
                    Style::default().fg(Color::Black).bg(Color::Gray),
                ),
                Span::raw(" Scroll  "),
                Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Gray)),
                Span::raw(" Details"),
            ])
        } else {
            Line::from(vec![
                Span::styled(" Ctrl+C ", Style::default().fg(Color::Black).bg(Color::Gray)),
                Span::raw(" Stop  "),
                Span::styled(" ↑/↓ ", Style::default().fg(Color::Black).bg(Color::Gray)),
                Span::raw(" Select  "),
                Span::styled(
                    " PgUp/PgDn ",
                    Style::default().fg(Color::Black).bg(Color::Gray),
                ),
                Span::raw(" Scroll  "),
                Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Gray)),
                Span::raw(" Details"),
            ])
        };

        let paragraph =
            Paragraph::new(hints).style(Style::default().bg(Color::Black).fg(Color::Gray));
        f.render_widget(paragraph, area);
    }

    fn push_details(&mut self, index: usize) {
        let Some(discovery) = self.discoveries.get(index).cloned() else {
            return;
        };
        self.logs.push((LogLevel::Info, "".to_string()));
        match discovery {
            Discovery::Class {
                name,
                uri,
                instance_count,
            } => {
                self.logs.push((LogLevel::Info, format!("Class: {}", name)));
                self.logs.push((LogLevel::Info, format!("  URI: {}", uri)));
                self.logs
                    .push((LogLevel::Info, format!("  Instances: {}", instance_count)));
            }
            Discovery::Relation {
                source,
                predicate,
                target,
            } => {
                self.logs
                    .push((LogLevel::Info, format!("Relation: {} -> {}", source, target)));
                self.logs
                    .push((LogLevel::Info, format!("  Predicate: {}", predicate)));
            }
        }
    }
}

/// Run the extraction monitor TUI (blocking function, should be run in a
/// separate thread)
pub fn run_monitor(
    rx: mpsc::UnboundedReceiver<ExtractMessage>,
    should_exit: Arc<AtomicBool>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut monitor = ExtractMonitor::new(rx);

    // Main loop
    loop {
        monitor.process_messages();

        terminal.draw(|f| {
            let size = f.area();

            // Split vertically: main area + hints bar
            let vertical_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(10), Constraint::Length(1)])
                .split(size);

            // Split main area into left (discoveries) and right (progress + logs)
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(vertical_chunks[0]);

            let right_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(8), Constraint::Min(10)])
                .split(main_chunks[1]);

            monitor.render_discoveries(f, main_chunks[0]);
            monitor.render_progress(f, right_chunks[0]);
            monitor.render_logs(f, right_chunks[1]);
            monitor.render_hints(f, vertical_chunks[1]);
        })?;

        // Check for exit signal (but don't auto-exit on completion)
        if should_exit.load(Ordering::Relaxed) {
            break;
        }

        // Poll for keyboard events (non-blocking with timeout)
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    break;
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    break;
                }
                KeyCode::Up => {
                    if !monitor.discoveries.is_empty() {
                        if let Some(selected) = monitor.selected {
                            let new_selected = selected.saturating_sub(1);
                            monitor.selected = Some(new_selected);
                            if new_selected < monitor.scroll_discoveries {
                                monitor.scroll_discoveries = new_selected;
                            }
                        } else {
                            monitor.selected =
                                Some(monitor.discoveries.len().saturating_sub(1));
                        }
                    }
                }
                KeyCode::Down => {
                    if !monitor.discoveries.is_empty() {
                        if let Some(selected) = monitor.selected {
                            monitor.selected =
                                Some((selected + 1).min(monitor.discoveries.len() - 1));
                        } else {
                            monitor.selected = Some(monitor.scroll_discoveries);
                        }
                    }
                }
                KeyCode::Enter => {
                    if let Some(selected) = monitor.selected {
                        monitor.push_details(selected);
                    }
                }
                KeyCode::PageUp => {
                    if !monitor.discoveries.is_empty() {
                        let height = 10;
                        monitor.scroll_discoveries =
                            monitor.scroll_discoveries.saturating_sub(height);
                        if let Some(selected) = monitor.selected {
                            if selected >= monitor.scroll_discoveries + height {
                                monitor.selected =
                                    Some(monitor.scroll_discoveries + height - 1);
                            }
                        }
                    }
                }
                KeyCode::PageDown => {
                    if !monitor.discoveries.is_empty() {
                        let height = 10;
                        let max_scroll = monitor.discoveries.len().saturating_sub(height);
                        monitor.scroll_discoveries =
                            (monitor.scroll_discoveries + height).min(max_scroll);
                        if let Some(selected) = monitor.selected {
                            if selected < monitor.scroll_discoveries {
                                monitor.selected = Some(monitor.scroll_discoveries);
                            }
                        }
                    }
                }
                KeyCode::Home => {
                    monitor.scroll_discoveries = 0;
                    monitor.selected = Some(0);
                }
                KeyCode::End => {
                    if !monitor.discoveries.is_empty() {
                        monitor.selected = Some(monitor.discoveries.len() - 1);
                        monitor.scroll_discoveries =
                            monitor.discoveries.len().saturating_sub(10);
                    }
                }
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

/// Create a channel pair for extraction monitoring
pub fn create_monitor_channel() -> (
    mpsc::UnboundedSender<ExtractMessage>,
    mpsc::UnboundedReceiver<ExtractMessage>,
) {
    mpsc::unbounded_channel()
}
