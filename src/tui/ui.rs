//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::MEMORY_SIZE;
use crate::cpu::registers::SP;
use super::app::DebuggerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),
            Constraint::Percentage(40),
        ])
        .split(frame.area());

    // Left side: code and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory, program output, help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(5),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_output(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw the disassembly view centered on the PC.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(&(*addr as u8)) { "●" } else { " " };
            let text = format!("{}{}{:02}: {}", bp, prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(&(*addr as u8)) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw the register file, control registers, and machine state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.cpu.regs;

    let reg_line = |range: std::ops::Range<u8>| {
        let spans: Vec<Span> = range
            .flat_map(|reg| {
                let label = if reg == SP { format!("R{}*", reg) } else { format!("R{} ", reg) };
                vec![
                    Span::raw(format!("{}=", label)),
                    Span::styled(
                        format!("{:3}  ", regs.get(reg)),
                        Style::default().fg(Color::White),
                    ),
                ]
            })
            .collect();
        Line::from(spans)
    };

    let content = vec![
        reg_line(0..4),
        reg_line(4..8),
        Line::from(vec![
            Span::raw("PC: "),
            Span::styled(format!("{:02}", regs.pc), Style::default().fg(Color::Yellow)),
            Span::raw("   FL: "),
            Span::styled(regs.fl.to_string(), Style::default().fg(Color::Magenta)),
            Span::raw("   SP: "),
            Span::styled(format!("{:02}", regs.sp()), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            Span::styled(
                format!("{:?}", app.cpu.state),
                if app.cpu.is_running() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                },
            ),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers (* = SP) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw the memory view.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll;
    let end = (start + visible_rows).min(MEMORY_SIZE);
    let sp = app.cpu.regs.sp() as usize;

    let items: Vec<ListItem> = (start..end)
        .map(|addr| {
            let value = app.cpu.mem.get(addr);
            let is_pc = addr == app.cpu.regs.pc as usize;
            let in_stack = addr >= sp;

            let marker = if addr == sp { " ◀ SP" } else { "" };
            let text = format!("{:02}: {:08b} = {:3}{}", addr, value, value, marker);

            let style = if is_pc {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if in_stack {
                Style::default().fg(Color::Cyan)
            } else if value != 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw the program output pane (PRN lines).
fn draw_output(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let lines = &app.cpu.output;
    let start = lines.len().saturating_sub(visible_rows);

    let items: Vec<ListItem> = lines[start..]
        .iter()
        .map(|line| ListItem::new(line.clone()).style(Style::default().fg(Color::White)))
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)));

    frame.render_widget(list, area);
}

/// Draw the help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
