// SPDX-License-Identifier: GPL-3.0-only

//! Interactive photo-booth terminal UI
//!
//! Renders the live camera feed with Unicode half-block characters for
//! improved vertical resolution, runs the countdown session, then shows the
//! finished strip with retake/save/email actions.

use crate::capture::{BoothCamera, CaptureSource, Frame};
use crate::collage::{Artifact, CollagePipeline};
use crate::config::Config;
use crate::constants::session::{COUNTDOWN_TICK, MAX_PHOTOS};
use crate::constants::timing;
use crate::delivery::{self, DeliveryStatus, EmailDelivery};
use crate::errors::DeliveryError;
use crate::session::{Session, SessionEvent};
use crate::storage;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Run the interactive booth
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize GStreamer
    gstreamer::init()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Capture,
    Review,
    EmailForm,
}

struct BoothApp {
    config: Config,
    camera: BoothCamera,
    session: Session,
    pipeline: CollagePipeline,
    delivery: EmailDelivery,
    view: View,
    /// Newest preview frame, refreshed every pass
    preview: Option<Frame>,
    /// Rendered strip; exists only while reviewing
    artifact: Option<Artifact>,
    /// Why the camera could not open, when it could not
    camera_error: Option<String>,
    /// Deadline of the next countdown step
    next_tick: Option<Instant>,
    status: String,
    email_input: String,
    email_error: Option<String>,
    last_saved: Option<PathBuf>,
    rt: tokio::runtime::Runtime,
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let pipeline = CollagePipeline::with_config(config.output_format, config.quality);

    let mut app = BoothApp {
        config,
        camera: BoothCamera::new(),
        session: Session::new(),
        pipeline,
        delivery: EmailDelivery::new(),
        view: View::Capture,
        preview: None,
        artifact: None,
        camera_error: None,
        next_tick: None,
        status: String::new(),
        email_input: String::new(),
        email_error: None,
        last_saved: None,
        rt,
    };

    app.open_camera();

    loop {
        app.advance();

        terminal.draw(|f| app.draw(f))?;

        if event::poll(timing::POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && app.handle_key(key)
        {
            break;
        }
    }

    app.camera.close();
    Ok(())
}

impl BoothApp {
    /// Open (or re-open) the camera; failures are retryable
    fn open_camera(&mut self) {
        match self.camera.open(self.config.preferred_facing) {
            Ok(()) => {
                self.camera_error = None;
                self.status.clear();
            }
            Err(e) => {
                error!(error = %e, "Could not open camera");
                self.camera_error = Some(e.to_string());
            }
        }
    }

    /// Per-pass housekeeping: preview, countdown, delivery
    fn advance(&mut self) {
        self.preview = self.camera.poll_frame().cloned();

        if self.session.countdown().is_some()
            && let Some(due) = self.next_tick
            && Instant::now() >= due
        {
            let event = self.session.tick(&mut self.camera);
            self.next_tick = self
                .session
                .countdown()
                .map(|_| Instant::now() + COUNTDOWN_TICK);
            if let Some(event) = event {
                self.on_session_event(event);
            }
        }

        self.delivery.poll();
    }

    fn on_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::CountdownTick(_) => {}
            SessionEvent::FrameCaptured(count) => {
                self.status = format!("Photo {} of {}", count, MAX_PHOTOS);
            }
            SessionEvent::SessionComplete => {
                info!("Session complete; rendering strip");
                self.render_strip();
                self.view = View::Review;
            }
            SessionEvent::CaptureFailed(err) => {
                self.status = format!("{} (space to retry)", err);
            }
        }
    }

    /// Render the strip from the completed session
    fn render_strip(&mut self) {
        let result = self.rt.block_on(self.pipeline.render(self.session.frames()));
        match result {
            Ok(artifact) => {
                self.status = "Here's your strip!".to_string();
                self.artifact = Some(artifact);
            }
            Err(e) => {
                error!(error = %e, "Strip render failed");
                self.status = format!("Could not render strip: {}", e);
                self.artifact = None;
            }
        }
    }

    /// Handle a key press; returns true to quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Ctrl+C quits from anywhere
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.view {
            View::Capture => self.handle_capture_key(key),
            View::Review => self.handle_review_key(key),
            View::EmailForm => self.handle_form_key(key),
        }
    }

    fn handle_capture_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.camera_error.is_some() {
                    self.open_camera();
                } else if self.session.request_capture() {
                    self.next_tick = Some(Instant::now() + COUNTDOWN_TICK);
                }
            }
            KeyCode::Char('r') => {
                if self.camera_error.is_some() {
                    self.open_camera();
                }
            }
            KeyCode::Char('s') => self.switch_camera(),
            KeyCode::Char('m') => {
                self.config.mirror_preview = !self.config.mirror_preview;
                if let Err(e) = self.config.save() {
                    error!(error = %e, "Could not save config");
                }
            }
            _ => {}
        }
        false
    }

    fn handle_review_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.retake(),
            KeyCode::Char('s') | KeyCode::Char('d') => self.save_strip(),
            KeyCode::Char('e') => {
                self.email_error = None;
                self.delivery.reset();
                self.view = View::EmailForm;
            }
            KeyCode::Char('o') => self.open_strip(),
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.delivery.reset();
                self.email_error = None;
                self.view = View::Review;
            }
            KeyCode::Enter => {
                if matches!(self.delivery.status(), DeliveryStatus::Success { .. }) {
                    // Form is done; close it
                    self.delivery.reset();
                    self.view = View::Review;
                } else {
                    self.submit_email();
                }
            }
            KeyCode::Backspace => {
                self.email_input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if !c.is_control() {
                    self.email_input.push(c);
                }
            }
            _ => {}
        }
        false
    }

    fn submit_email(&mut self) {
        // The strip normally exists by now; produce a fresh one when the
        // completion render failed earlier.
        if self.artifact.is_none() && self.session.is_reviewing() {
            self.render_strip();
        }

        match self.delivery.submit(self.artifact.as_ref(), &self.email_input) {
            Ok(()) => self.email_error = None,
            Err(err @ DeliveryError::NothingToSend(_)) => {
                self.email_error = Some(err.to_string());
                self.delivery.fail(err);
            }
            Err(err) => self.email_error = Some(err.to_string()),
        }
    }

    /// Clear everything and start a new session
    fn retake(&mut self) {
        self.session.reset();
        self.artifact = None;
        self.delivery.reset();
        self.email_input.clear();
        self.email_error = None;
        self.next_tick = None;
        self.status.clear();
        self.view = View::Capture;
    }

    fn switch_camera(&mut self) {
        // A pending capture belongs to the old stream; drop it
        self.session.cancel_countdown();
        self.next_tick = None;

        match self.camera.switch() {
            Ok(facing) => {
                self.camera_error = None;
                self.status = format!("Switched to {} camera", facing);
            }
            Err(e) => {
                error!(error = %e, "Camera switch failed");
                self.camera_error = Some(e.to_string());
            }
        }
    }

    fn save_strip(&mut self) {
        let dir = storage::strip_directory(&self.config.save_folder);
        match delivery::download(self.artifact.as_ref(), &dir) {
            Ok(Some(path)) => {
                self.status = format!("Saved {}", path.display());
                self.last_saved = Some(path);
            }
            Ok(None) => self.status = "Nothing to save yet".to_string(),
            Err(e) => self.status = format!("Save failed: {}", e),
        }
    }

    /// Open the most recently saved strip with the system viewer
    fn open_strip(&mut self) {
        let dir = storage::strip_directory(&self.config.save_folder);
        let target = self
            .last_saved
            .clone()
            .or_else(|| storage::latest_strip(&dir));

        match target {
            Some(path) => match open::that(&path) {
                Ok(()) => self.status = format!("Opened {}", path.display()),
                Err(e) => self.status = format!("Could not open strip: {}", e),
            },
            None => self.status = "No saved strip yet, press 's' first".to_string(),
        }
    }

    fn draw(&self, f: &mut ratatui::Frame) {
        let area = f.area();

        // Reserve the bottom line for status
        let main_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: area.height.saturating_sub(1),
        };
        let status_area = Rect {
            x: area.x,
            y: area.height.saturating_sub(1),
            width: area.width,
            height: 1,
        };

        match self.view {
            View::Capture => {
                let widget = PreviewWidget {
                    frame: self.preview.as_ref(),
                    mirror: self.config.mirror_preview,
                    message: self.camera_error.as_deref(),
                };
                f.render_widget(widget, main_area);

                if let Some(value) = self.session.countdown() {
                    f.render_widget(CountdownOverlay { value }, main_area);
                }
            }
            View::Review => {
                let widget = StripWidget {
                    artifact: self.artifact.as_ref(),
                };
                f.render_widget(widget, main_area);
            }
            View::EmailForm => {
                let widget = StripWidget {
                    artifact: self.artifact.as_ref(),
                };
                f.render_widget(widget, main_area);

                let form = EmailFormWidget {
                    input: &self.email_input,
                    error: self.email_error.as_deref(),
                    status: self.delivery.status(),
                };
                f.render_widget(form, main_area);
            }
        }

        let message = self.status_line();
        f.render_widget(StatusBar { message: &message }, status_area);
    }

    /// Bottom-line text for the current view
    fn status_line(&self) -> String {
        match self.view {
            View::Capture => {
                let dots: String = (0..MAX_PHOTOS)
                    .map(|i| if i < self.session.frame_count() { '●' } else { '○' })
                    .collect();

                let mut message = format!("{}  ", dots);
                if self.camera_error.is_some() {
                    message.push_str("'r' retry camera");
                } else if let Some(value) = self.session.countdown() {
                    message.push_str(&format!("{}...", value));
                } else {
                    message.push_str("space photo");
                }
                if self.camera.camera_count() > 1 {
                    message.push_str(" | 's' switch");
                }
                message.push_str(" | 'm' mirror | 'q' quit");

                if !self.status.is_empty() {
                    message.push_str(" :: ");
                    message.push_str(&self.status);
                }
                if let Some(name) = self.camera.current_name() {
                    message.push_str(" :: ");
                    message.push_str(name);
                }
                message
            }
            View::Review => {
                let mut message =
                    "'r' retake | 's' save | 'e' email | 'o' open | 'q' quit".to_string();
                if !self.status.is_empty() {
                    message.push_str(" :: ");
                    message.push_str(&self.status);
                }
                message
            }
            View::EmailForm => "type address | enter send | esc back".to_string(),
        }
    }
}

/// Compute display dimensions (in cells) preserving the source aspect ratio
///
/// Each terminal cell shows two vertical pixels via half-block characters.
fn fit_display(area: Rect, source_width: u32, source_height: u32) -> (u16, u16) {
    let aspect = source_width as f64 / source_height as f64;
    let term_width = area.width as f64;
    let term_height = (area.height * 2) as f64;

    if term_width / term_height > aspect {
        // Terminal is wider - fit to height
        let h = term_height;
        let w = h * aspect;
        (w as u16, (h / 2.0) as u16)
    } else {
        // Terminal is taller - fit to width
        let w = term_width;
        let h = w / aspect;
        (w as u16, (h / 2.0) as u16)
    }
}

/// Paint a pixel grid into the buffer with half-block characters
///
/// `sample` maps source pixel coordinates to RGB.
fn render_half_blocks<S>(
    area: Rect,
    buf: &mut Buffer,
    source_width: u32,
    source_height: u32,
    sample: S,
) where
    S: Fn(u32, u32) -> (u8, u8, u8),
{
    if source_width == 0 || source_height == 0 || area.width == 0 || area.height == 0 {
        return;
    }

    let (display_width, display_height) = fit_display(area, source_width, source_height);
    if display_width == 0 || display_height == 0 {
        return;
    }

    let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
    let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

    let x_scale = source_width as f64 / display_width as f64;
    let y_scale = source_height as f64 / (display_height * 2) as f64;

    // Each cell: upper half (▀) colored with fg, lower half with bg
    for ty in 0..display_height {
        for tx in 0..display_width {
            let term_x = x_offset + tx;
            let term_y = y_offset + ty;
            if term_x >= area.x + area.width || term_y >= area.y + area.height {
                continue;
            }

            let src_x = ((tx as f64 * x_scale) as u32).min(source_width - 1);
            let src_y_top = ((ty as f64 * 2.0 * y_scale) as u32).min(source_height - 1);
            let src_y_bottom =
                (((ty as f64 * 2.0 + 1.0) * y_scale) as u32).min(source_height - 1);

            let (tr, tg, tb) = sample(src_x, src_y_top);
            let (br, bg, bb) = sample(src_x, src_y_bottom);

            if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                cell.set_char('▀');
                cell.set_fg(Color::Rgb(tr, tg, tb));
                cell.set_bg(Color::Rgb(br, bg, bb));
            }
        }
    }
}

/// Center a line of text in the area
fn set_centered(buf: &mut Buffer, area: Rect, y: u16, text: &str, style: Style) {
    let width = text.chars().count() as u16;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    if y >= area.y && y < area.y + area.height {
        buf.set_string(x, y, text, style);
    }
}

/// Live camera preview
struct PreviewWidget<'a> {
    frame: Option<&'a Frame>,
    mirror: bool,
    message: Option<&'a str>,
}

impl Widget for PreviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(message) = self.message {
            let mid = area.y + area.height / 2;
            set_centered(buf, area, mid.saturating_sub(1), message, Style::default());
            set_centered(
                buf,
                area,
                mid + 1,
                "Press 'r' to try again",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let Some(frame) = self.frame else {
            let mid = area.y + area.height / 2;
            set_centered(buf, area, mid, "Waiting for camera...", Style::default());
            return;
        };

        let mirror = self.mirror;
        let width = frame.width;
        render_half_blocks(area, buf, frame.width, frame.height, |x, y| {
            let sx = if mirror { width - 1 - x } else { x };
            frame.rgb_at(sx, y)
        });
    }
}

/// Countdown digit over the preview
struct CountdownOverlay {
    value: u32,
}

impl Widget for CountdownOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = format!("  {}  ", self.value);
        let width = text.chars().count() as u16;
        let height: u16 = 3;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;

        for row in 0..height {
            for col in 0..width {
                if let Some(cell) = buf.cell_mut((x + col, y + row)) {
                    cell.set_char(' ');
                    cell.set_bg(Color::Black);
                }
            }
        }

        buf.set_string(
            x + width / 2,
            y + 1,
            self.value.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
    }
}

/// Finished strip preview
struct StripWidget<'a> {
    artifact: Option<&'a Artifact>,
}

impl Widget for StripWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(artifact) = self.artifact else {
            let mid = area.y + area.height / 2;
            set_centered(buf, area, mid, "Strip not rendered", Style::default());
            return;
        };

        let image = &artifact.image;
        render_half_blocks(area, buf, image.width(), image.height(), |x, y| {
            let pixel = image.get_pixel(x, y);
            (pixel[0], pixel[1], pixel[2])
        });
    }
}

/// Centered email form over the review screen
struct EmailFormWidget<'a> {
    input: &'a str,
    error: Option<&'a str>,
    status: &'a DeliveryStatus,
}

impl Widget for EmailFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width.saturating_sub(4)).min(48).max(20);
        let height: u16 = 6;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let form = Rect {
            x,
            y,
            width,
            height,
        };

        for row in form.y..form.y + form.height {
            for col in form.x..form.x + form.width {
                if let Some(cell) = buf.cell_mut((col, row)) {
                    cell.set_char(' ');
                    cell.set_bg(Color::Black);
                    cell.set_fg(Color::White);
                }
            }
        }

        let base = Style::default().fg(Color::White).bg(Color::Black);
        set_centered(buf, form, form.y, "Email your strip", base.add_modifier(Modifier::BOLD));

        // Input line with a block cursor
        let prompt = format!("> {}_", self.input);
        let max = form.width.saturating_sub(2) as usize;
        let shown: String = if prompt.chars().count() > max {
            // Keep the tail visible while typing long addresses
            prompt
                .chars()
                .skip(prompt.chars().count() - max)
                .collect()
        } else {
            prompt
        };
        buf.set_string(form.x + 1, form.y + 2, &shown, base);

        let detail_y = form.y + 4;
        match self.status {
            DeliveryStatus::Sending { .. } => {
                set_centered(buf, form, detail_y, "Sending...", base.fg(Color::Yellow));
            }
            DeliveryStatus::Success { address } => {
                let text = format!("Sent to {} (enter to close)", address);
                set_centered(buf, form, detail_y, &text, base.fg(Color::Green));
            }
            DeliveryStatus::Failed(err) => {
                let text = err.to_string();
                set_centered(buf, form, detail_y, &text, base.fg(Color::Red));
            }
            DeliveryStatus::Idle => {
                if let Some(error) = self.error {
                    set_centered(buf, form, detail_y, error, base.fg(Color::Red));
                }
            }
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

        // Truncate on character boundaries
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}
