// SPDX-License-Identifier: GPL-3.0-only

//! Terminal live preview
//!
//! Renders the filtered display surface to the terminal using Unicode
//! half-block characters for improved vertical resolution.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbaImage;
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::{error, info};

use crate::app::{self, AppModel, Message};
use crate::backends::camera::SourceSpec;
use crate::config::Config;
use crate::export::ExportOutcome;
use crate::pipelines::video::RecordingState;

/// Run the terminal preview until the user quits
pub fn run(config: Config, spec: SourceSpec) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let mut app = AppModel::new(config, &spec);
    app.start();

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown();
    if let Err(e) = app.config.save() {
        error!(error = %e, "Failed to save settings");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppModel,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut show_help = false;
    let mut notice = String::new();
    let mut was_recording = false;
    let mut filter_changes = app.context.filter.subscribe();

    loop {
        if filter_changes.has_changed().unwrap_or(false) {
            let filter = *filter_changes.borrow_and_update();
            notice = if filter.enabled {
                format!("Filter {:.0}%", filter.intensity * 100.0)
            } else {
                "Filter off".to_string()
            };
        }

        // Export the clip as soon as a session has been finalized
        let recording = app.recording.state();
        if was_recording && recording == RecordingState::Idle {
            notice = match app.recording.last_error() {
                Some(e) => format!("Recording failed: {}", e),
                None => describe(app.update(Message::ExportClip)),
            };
        }
        was_recording = recording != RecordingState::Idle;

        let camera_error = app.camera_error().map(|e| e.to_string());
        let frame = app.context.surface.snapshot();
        let status = if show_help {
            help_message()
        } else if notice.is_empty() {
            app.status_line()
        } else {
            format!("{} | {}", app.status_line(), notice)
        };

        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let camera_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };
            match &camera_error {
                Some(error) => f.render_widget(CameraErrorWidget { error }, camera_area),
                None => f.render_widget(FrameWidget { frame: frame.as_ref() }, camera_area),
            }

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(StatusBar { message: &status }, status_area);
        })?;

        // Handle input with timeout for frame updates
        if event::poll(Duration::from_millis(33))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            let message = match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Char('h') => {
                    show_help = !show_help;
                    continue;
                }
                KeyCode::Char('r') if camera_error.is_some() => Message::RetryCamera,
                KeyCode::Char('p') => Message::CapturePhoto,
                KeyCode::Char('r') => Message::ToggleRecording,
                KeyCode::Char('s') => Message::SwitchCamera,
                KeyCode::Char('f') => Message::ToggleFilter,
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    Message::AdjustIntensity(app::INTENSITY_STEP)
                }
                KeyCode::Char('-') => Message::AdjustIntensity(-app::INTENSITY_STEP),
                _ => continue,
            };
            show_help = false;

            notice = match app.update(message) {
                // Stills are saved right away
                Ok(_) if message == Message::CapturePhoto => {
                    describe(app.update(Message::ExportPhoto))
                }
                Ok(_) => String::new(),
                Err(e) => describe(Err(e)),
            };
        }
    }

    Ok(())
}

fn describe(result: crate::errors::AppResult<app::Event>) -> String {
    match result {
        Ok(app::Event::Exported(ExportOutcome::Downloaded(path))) => {
            info!(path = %path.display(), "Saved");
            format!("Saved: {}", path.display())
        }
        Ok(app::Event::Exported(ExportOutcome::AppShared)) => "Opened share link".to_string(),
        Ok(app::Event::Exported(ExportOutcome::Shared)) => "Shared".to_string(),
        Ok(app::Event::CameraAcquired) => "Camera ready".to_string(),
        Ok(_) => String::new(),
        Err(e) => {
            error!(error = %e, "Action failed");
            format!("Error: {}", e)
        }
    }
}

fn help_message() -> String {
    "p: Picture | r: Record | s: Switch camera | f: Filter | +/-: Intensity | h: Help | q: Quit"
        .to_string()
}

/// Widget that renders the display surface using half-block characters
struct FrameWidget<'a> {
    frame: Option<&'a RgbaImage>,
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        let (width, height) = frame.dimensions();
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels
        let frame_aspect = width as f64 / height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let w = term_height * frame_aspect;
            (w as u16, area.height)
        } else {
            // Terminal is taller - fit to width
            let h = term_width / frame_aspect;
            (area.width, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = width as f64 / display_width as f64;
        let y_scale = height as f64 / (display_height as f64 * 2.0);

        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, src_x, src_y_top));
                    cell.set_bg(sample_pixel(frame, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn sample_pixel(frame: &RgbaImage, x: u32, y: u32) -> Color {
    let x = x.min(frame.width() - 1);
    let y = y.min(frame.height() - 1);
    let [r, g, b, _] = frame.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Full-screen retry state shown while no camera could be acquired
struct CameraErrorWidget<'a> {
    error: &'a str,
}

impl Widget for CameraErrorWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines = [self.error, "", "Press r to retry or q to quit"];
        let top = area.y + area.height.saturating_sub(lines.len() as u16) / 2;
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let text: String = line.chars().take(area.width as usize).collect();
            let x = area.x + area.width.saturating_sub(text.chars().count() as u16) / 2;
            buf.set_string(
                x,
                y,
                text,
                ratatui::style::Style::default().fg(Color::LightRed),
            );
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Truncate on a character boundary
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
