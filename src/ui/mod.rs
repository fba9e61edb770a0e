use crate::client::DebuggerClient;
use crate::graph::raw::EdgeRole;
use crate::graph::render::{NodeKind, RenderGraph};
use crate::session::{DebugSession, NodeDetail};
use crate::transform;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color as TuiColor, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Borders, Paragraph, Widget,
    },
    Terminal,
};
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::io::{self, Stdout};
use std::time::Duration;

const LOG_LIMIT: usize = 64;

/// Interactive session explorer: program source on the left, the rendered
/// graph on the right, node data below the source. All state is rebuilt from
/// the session on every fetch; nothing persists.
pub struct DebuggerTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    session: DebugSession,
    client: Option<DebuggerClient>,
    include_relinearize: bool,
    rendered: RenderGraph,
    layout: GraphLayout,
    selected: Option<usize>,
    selected_line: usize,
    detail: Option<NodeDetail>,
    status: String,
    logs: VecDeque<String>,
    finished: bool,
}

impl DebuggerTui {
    pub fn new(
        session: DebugSession,
        client: Option<DebuggerClient>,
        include_relinearize: bool,
    ) -> io::Result<Self> {
        let rendered = transform::render_graph(session.raw_graph(), include_relinearize).map_err(
            |err| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("transform session graph: {err}"),
                )
            },
        )?;
        let layout = GraphLayout::build(&rendered);

        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            session,
            client,
            include_relinearize,
            rendered,
            layout,
            selected: None,
            selected_line: 1,
            detail: None,
            status: "ready - ←/→ nodes, ↑/↓ lines, r fold, f refetch, q quit".to_string(),
            logs: VecDeque::with_capacity(LOG_LIMIT),
            finished: false,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.push_log(format!("viewing session {}", self.session.name));
        self.render()?;
        loop {
            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                        code => {
                            self.handle_key(code);
                            self.render()?;
                        }
                    },
                    Event::Resize(_, _) => {
                        self.render()?;
                    }
                    _ => {}
                }
            }
        }
        self.finish()
    }

    pub fn finish(&mut self) -> io::Result<()> {
        self.restore_terminal()
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Right | KeyCode::Char('n') => self.select_offset(1),
            KeyCode::Left | KeyCode::Char('p') => self.select_offset(-1),
            KeyCode::Down => self.move_line(1),
            KeyCode::Up => self.move_line(-1),
            KeyCode::Char('r') => self.toggle_relinearize(),
            KeyCode::Char('f') => self.refetch(),
            _ => {}
        }
    }

    fn select_offset(&mut self, delta: isize) {
        let count = self.rendered.nodes.len();
        if count == 0 {
            self.status = "graph has no nodes".to_string();
            return;
        }
        let position = match self.selected {
            Some(position) => (position as isize + delta).rem_euclid(count as isize) as usize,
            None if delta >= 0 => 0,
            None => count - 1,
        };
        self.selected = Some(position);
        let id = self.rendered.nodes[position].id;
        self.status = format!("selected node {id}");

        // Prefer data captured in the session; fall back to the backend.
        self.detail = self.session.node_detail(id).cloned();
        if self.detail.is_none() {
            let fetched = self
                .client
                .as_ref()
                .map(|client| client.node_data(&self.session.name, id));
            match fetched {
                Some(Ok(detail)) => self.detail = Some(detail),
                Some(Err(err)) => {
                    self.status = format!("node {id}: {err}");
                    self.push_log(self.status.clone());
                }
                None => {}
            }
        }
    }

    fn move_line(&mut self, delta: isize) {
        let line_count = self.session.source_code.lines().count().max(1);
        let line = self.selected_line as isize + delta;
        self.selected_line = line.clamp(1, line_count as isize) as usize;
    }

    fn toggle_relinearize(&mut self) {
        let target = !self.include_relinearize;
        match transform::render_graph(self.session.raw_graph(), target) {
            Ok(rendered) => {
                self.include_relinearize = target;
                self.layout = GraphLayout::build(&rendered);
                self.rendered = rendered;
                self.selected = None;
                self.detail = None;
                self.status = if target {
                    "relinearize nodes shown".to_string()
                } else {
                    "relinearize nodes folded".to_string()
                };
                self.push_log(self.status.clone());
            }
            Err(err) => {
                self.status = format!("transform failed: {err}");
                self.push_log(self.status.clone());
            }
        }
    }

    fn refetch(&mut self) {
        let name = self.session.name.clone();
        let fetched = match self.client.as_ref() {
            None => {
                self.status = "no backend attached".to_string();
                return;
            }
            Some(client) => client
                .session_graph(&name)
                .and_then(|envelope| Ok((envelope, client.program_source(&name)?))),
        };

        match fetched {
            Ok((envelope, source)) => {
                match transform::render_graph(envelope.raw(), self.include_relinearize) {
                    Ok(rendered) => {
                        let node_count = envelope.raw().nodes.len();
                        self.session.envelope = envelope;
                        self.session.source_code = source;
                        self.session.node_data = vec![None; node_count];
                        self.layout = GraphLayout::build(&rendered);
                        self.rendered = rendered;
                        self.selected = None;
                        self.detail = None;
                        self.selected_line = 1;
                        self.status = format!("refetched session {name}");
                        self.push_log(self.status.clone());
                    }
                    Err(err) => {
                        self.status = format!("transform failed: {err}");
                        self.push_log(self.status.clone());
                    }
                }
            }
            Err(err) => {
                self.status = format!("fetch failed: {err}");
                self.push_log(self.status.clone());
            }
        }
    }

    fn push_log(&mut self, entry: String) {
        if self.logs.len() == LOG_LIMIT {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);
    }

    fn render(&mut self) -> io::Result<()> {
        let source = self.session.source_code.clone();
        let selected_line = self.selected_line;
        let info_lines = self.node_info_lines();
        let status = self.status.clone();
        let logs = self.logs.clone();
        let layout = self.layout.clone();
        let selected_id = self
            .selected
            .map(|position| self.rendered.nodes[position].id);
        let node_count = self.rendered.nodes.len();
        let include = self.include_relinearize;
        let session_name = self.session.name.clone();

        self.terminal.draw(|frame| {
            let size = frame.size();
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(size);

            let left = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(8), Constraint::Length(10)])
                .split(columns[0]);

            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(10),
                    Constraint::Length(3),
                    Constraint::Length(9),
                ])
                .split(columns[1]);

            let code_area = left[0];
            let visible = code_area.height.saturating_sub(2) as usize;
            frame.render_widget(
                Self::code_block(&source, selected_line, visible, &session_name),
                code_area,
            );
            frame.render_widget(Self::info_block(&info_lines), left[1]);
            frame.render_widget(
                Self::graph_canvas(layout, selected_id, node_count, include),
                right[0],
            );
            frame.render_widget(Self::status_block(&status), right[1]);
            frame.render_widget(Self::log_block(&logs), right[2]);
        })?;
        Ok(())
    }

    fn code_block(
        source: &str,
        selected: usize,
        visible: usize,
        session_name: &str,
    ) -> Paragraph<'static> {
        let mut lines: Vec<Line> = Vec::new();
        if source.is_empty() {
            lines.push(Line::from("(no source attached)"));
        }
        for (index, text) in source.lines().enumerate() {
            let number = index + 1;
            let content = format!("{number:>3} │ {text}");
            if number == selected {
                lines.push(Line::from(Span::styled(
                    content,
                    Style::default()
                        .bg(TuiColor::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(content));
            }
        }
        let offset = selected.saturating_sub(1).saturating_sub(visible / 2) as u16;
        Paragraph::new(lines).scroll((offset, 0)).block(
            Block::default()
                .title(format!("Program ({session_name})"))
                .borders(Borders::ALL),
        )
    }

    fn info_block(info_lines: &[String]) -> Paragraph<'static> {
        let lines: Vec<Line> = info_lines
            .iter()
            .map(|entry| Line::from(entry.clone()))
            .collect();
        Paragraph::new(lines).block(Block::default().title("Node info").borders(Borders::ALL))
    }

    fn status_block(status: &str) -> Paragraph<'static> {
        Paragraph::new(Line::from(status.to_string()))
            .block(Block::default().title("Status").borders(Borders::ALL))
    }

    fn log_block(logs: &VecDeque<String>) -> Paragraph<'static> {
        let mut lines: Vec<Line> = logs
            .iter()
            .rev()
            .map(|entry| Line::from(entry.clone()))
            .collect();
        if lines.is_empty() {
            lines.push(Line::from("logs will appear here"));
        }
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title("Live log (newest first)")
                    .borders(Borders::ALL),
            )
            .style(Style::default().fg(TuiColor::Gray))
    }

    fn graph_canvas(
        layout: GraphLayout,
        selected_id: Option<usize>,
        node_count: usize,
        include_relinearize: bool,
    ) -> impl Widget {
        let title = if include_relinearize {
            format!("Graph view ({node_count} nodes)")
        } else {
            format!("Graph view ({node_count} nodes, relinearize folded)")
        };
        Canvas::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .x_bounds([-1.2, 1.2])
            .y_bounds([-1.2, 1.2])
            .paint(move |ctx: &mut Context<'_>| {
                for edge in &layout.edges {
                    let base_line = CanvasLine {
                        x1: edge.x1,
                        y1: edge.y1,
                        x2: edge.x2,
                        y2: edge.y2,
                        color: role_color(edge.role),
                    };
                    ctx.draw(&base_line);
                    let focused = selected_id
                        .map(|id| edge.source == id || edge.target == id)
                        .unwrap_or(false);
                    if focused {
                        ctx.draw(&CanvasLine {
                            color: TuiColor::White,
                            ..base_line
                        });
                    }
                }

                let mut coords = Vec::with_capacity(layout.nodes.len());
                let mut input_coords = Vec::new();
                let mut selected_coords = Vec::new();
                for node in &layout.nodes {
                    coords.push((node.x, node.y));
                    if node.kind == NodeKind::Input {
                        input_coords.push((node.x, node.y));
                    }
                    if selected_id == Some(node.id) {
                        selected_coords.push((node.x, node.y));
                    }
                }
                ctx.draw(&Points {
                    coords: &coords,
                    color: TuiColor::White,
                });
                if !input_coords.is_empty() {
                    ctx.draw(&Points {
                        coords: &input_coords,
                        color: TuiColor::Green,
                    });
                }
                if !selected_coords.is_empty() {
                    ctx.draw(&Points {
                        coords: &selected_coords,
                        color: TuiColor::Cyan,
                    });
                }

                for node in &layout.nodes {
                    ctx.print(node.x + 0.02, node.y + 0.02, format!("{}", node.id));
                }
            })
    }

    fn node_info_lines(&self) -> Vec<String> {
        let Some(position) = self.selected else {
            return vec![
                "no node selected".to_string(),
                "←/→ cycle nodes, ↑/↓ move source line".to_string(),
                "r toggles relinearize folding, f refetches".to_string(),
            ];
        };
        let node = &self.rendered.nodes[position];
        let mut lines = vec![
            format!("node {} ({:?})", node.id, node.kind),
            format!("title: {}", node.title),
        ];
        for edge in self.rendered.incoming(node.id) {
            lines.push(format!("  in  {} ({:?})", edge.source, edge.role));
        }
        for edge in self.rendered.outgoing(node.id) {
            lines.push(format!("  out {} ({:?})", edge.target, edge.role));
        }
        match &self.detail {
            Some(detail) => {
                lines.push(format!("value: {}", detail.value));
                if let Some(budget) = detail.noise_budget {
                    lines.push(format!("noise budget: {budget} bits"));
                }
                lines.push(format!(
                    "multiplicative depth: {}",
                    detail.multiplicative_depth
                ));
            }
            None => lines.push("no node data".to_string()),
        }
        lines
    }

    fn restore_terminal(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for DebuggerTui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

#[derive(Clone)]
struct NodePoint {
    id: usize,
    kind: NodeKind,
    x: f64,
    y: f64,
}

#[derive(Clone)]
struct EdgeSegment {
    source: usize,
    target: usize,
    role: EdgeRole,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

#[derive(Clone)]
struct GraphLayout {
    nodes: Vec<NodePoint>,
    edges: Vec<EdgeSegment>,
}

impl GraphLayout {
    /// Nodes on a circle in render order; edges as chords. Good enough for
    /// the straight-line programs the debugger sees.
    fn build(rendered: &RenderGraph) -> Self {
        let count = rendered.nodes.len().max(1);
        let mut nodes = Vec::with_capacity(rendered.nodes.len());
        for (position, node) in rendered.nodes.iter().enumerate() {
            let angle = 2.0 * PI * (position as f64) / (count as f64);
            nodes.push(NodePoint {
                id: node.id,
                kind: node.kind,
                x: angle.cos(),
                y: angle.sin(),
            });
        }

        let position_of = |id: usize| nodes.iter().find(|node| node.id == id);
        let mut edges = Vec::with_capacity(rendered.edges.len());
        for edge in &rendered.edges {
            let (Some(src), Some(dst)) = (position_of(edge.source), position_of(edge.target))
            else {
                continue;
            };
            edges.push(EdgeSegment {
                source: edge.source,
                target: edge.target,
                role: edge.role,
                x1: src.x,
                y1: src.y,
                x2: dst.x,
                y2: dst.y,
            });
        }

        GraphLayout { nodes, edges }
    }
}

fn role_color(role: EdgeRole) -> TuiColor {
    match role {
        EdgeRole::Left => TuiColor::Green,
        EdgeRole::Right => TuiColor::Yellow,
        EdgeRole::Unary => TuiColor::Blue,
    }
}
