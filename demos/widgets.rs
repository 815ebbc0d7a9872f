//! panelkit demo - a bordered window with a list, an input line and a button
//!
//! Press Tab to move focus, 'q' (outside the input box) or Ctrl-C to quit.
//! Logs go to `panelkit-demo.log`; set `RUST_LOG=panelkit=debug` for detail.

use anyhow::{Context, Result};
use panelkit::input::EventKind;
use panelkit::style::AnsiColor;
use panelkit::{
    Alignment, App, Border, BorderStyle, Color, Config, Control, Direction, Panel, Sides, Style,
    TextAlign, Widget, WidgetKind,
};
use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let log = File::create("panelkit-demo.log").context("failed to create log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(log))
        .with_ansi(false)
        .init();

    let mut app = App::new(Config::from_env())?;
    let status_text = Rc::new(RefCell::new(String::from("Tab cycles focus")));

    let screen = app.screen_mut();
    let root = screen.root();
    screen
        .tree_mut()
        .set_alignment(root, Alignment::Start, Alignment::Stretch)?;

    let window = screen.add_widget(
        Widget::new(
            "window",
            Panel::new(Direction::Horizontal)
                .with_title("panelkit")
                .with_alignment(Alignment::Start, Alignment::Stretch),
        )
        .with_border(Border::new(BorderStyle::Rounded))
        .with_grow_factor(1.0)?,
    )?;

    let tracks = screen.add_widget_to(
        window,
        Widget::list_box(
            "tracks",
            ["Intro", "Overture", "Nocturne", "Interlude", "Finale"],
        )
        .with_border(Border::new(BorderStyle::Single))
        .with_min_size(16, 5)
        .with_grow_factor(1.0)?
        .with_shrink_factor(1.0)?,
    )?;

    let side = screen.add_widget_to(
        window,
        Widget::panel("side", Direction::Vertical)
            .with_padding(Sides::symmetric(0, 1))
            .with_grow_factor(2.0)?
            .with_shrink_factor(1.0)?,
    )?;

    screen.add_widget_to(
        side,
        Widget::label("heading", "Add a track").with_style(Style::new().bold(true)),
    )?;
    let entry = screen.add_widget_to(
        side,
        Widget::input_box("entry", 24).with_border(Border::new(BorderStyle::Single)),
    )?;
    let add = screen.add_widget_to(
        side,
        Widget::button("add", "Add").with_style(
            Style::new().fg(Color::Ansi16(AnsiColor::BrightGreen)),
        ),
    )?;

    let status = screen.add_widget(
        Widget::label("status", "")
            .with_content_size(1, 1)
            .with_style(Style::new().reverse(true)),
    )?;
    screen.tree_mut().set_text_align(status, TextAlign::Left)?;

    // Widget callbacks only see their own payload, so they report through
    // shared state that the event handler copies into the widgets
    let pending_title: Rc<RefCell<Option<String>>> = Rc::default();
    if let WidgetKind::InputBox(input) = screen.tree_mut().get_mut(entry)?.kind_mut() {
        let pending = pending_title.clone();
        input.submitted.connect(move |text: &String| {
            *pending.borrow_mut() = Some(text.clone());
        });
    }
    let add_clicks = Rc::new(RefCell::new(0u32));
    if let WidgetKind::Button(button) = screen.tree_mut().get_mut(add)?.kind_mut() {
        let clicks = add_clicks.clone();
        button.pressed.connect(move |_| *clicks.borrow_mut() += 1);
    }
    if let WidgetKind::ListBox(list) = screen.tree_mut().get_mut(tracks)?.kind_mut() {
        let status_text = status_text.clone();
        list.selection_changed.connect(move |index: &usize| {
            *status_text.borrow_mut() = format!("Selected track {}", index + 1);
        });
    }

    screen.focus(tracks)?;
    tracing::info!("demo ready");

    app.run(move |screen, event| {
        let typing = screen.focused() == Some(entry);
        match event.kind {
            EventKind::ControlChar { key: 0x03, .. } => return Control::Quit,
            EventKind::PrintableChar { key: 'q', .. } if !typing => return Control::Quit,
            _ => {}
        }

        let submitted = pending_title.borrow_mut().take();
        let pressed = std::mem::take(&mut *add_clicks.borrow_mut()) > 0;
        let title = submitted.or_else(|| {
            if !pressed {
                return None;
            }
            match screen.tree().get(entry).map(Widget::kind) {
                Ok(WidgetKind::InputBox(input)) if !input.is_empty() => {
                    Some(input.value().to_string())
                }
                _ => None,
            }
        });

        if let Some(title) = title {
            if let Err(err) = add_track(screen, tracks, entry, &title) {
                tracing::warn!(error = %err, "could not add track");
            }
            *status_text.borrow_mut() = format!("Added \"{title}\"");
        }

        let text = status_text.borrow().clone();
        if let Err(err) = screen.tree_mut().set_text(status, text) {
            tracing::warn!(error = %err, "could not update status line");
        }
        Control::Continue
    })
}

fn add_track<W: std::io::Write>(
    screen: &mut panelkit::Screen<W>,
    tracks: panelkit::WidgetId,
    entry: panelkit::WidgetId,
    title: &str,
) -> panelkit::Result<()> {
    let mut items = match screen.tree().get(tracks)?.kind() {
        WidgetKind::ListBox(list) => list.items().to_vec(),
        _ => Vec::new(),
    };
    items.push(title.to_string());
    screen.tree_mut().set_items(tracks, items)?;
    screen.tree_mut().set_text(entry, "")
}
