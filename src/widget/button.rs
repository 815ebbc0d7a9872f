//! Push button

use super::draw::{fit_line, text_width, Canvas};
use crate::error::Result;
use crate::geometry::Rect;
use crate::input::{EventKind, NavKey};
use crate::signal::Signal;
use crate::style::{Style, TextAlign};

/// A one-line caption drawn as `[ caption ]`
///
/// `pressed` fires on a mouse press and on Enter or space while focused.
#[derive(Debug, Default)]
pub struct Button {
    caption: String,
    pub pressed: Signal<()>,
}

impl Button {
    pub fn new(caption: impl Into<String>) -> Self {
        Button {
            caption: caption.into(),
            pressed: Signal::new(),
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub(crate) fn set_caption(&mut self, caption: String) {
        self.caption = caption;
    }

    fn face(&self) -> String {
        format!("[ {} ]", self.caption)
    }

    pub fn natural_size(&self) -> (u16, u16) {
        (text_width(&self.face()), 1)
    }

    pub(crate) fn press(&mut self) {
        self.pressed.emit(&());
    }

    pub(crate) fn handle_key(&mut self, kind: &EventKind) -> bool {
        match kind {
            EventKind::NavigationKey {
                key: NavKey::Enter,
                ..
            }
            | EventKind::PrintableChar { key: ' ', .. } => {
                self.press();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn render(
        &self,
        canvas: &mut Canvas,
        area: Rect,
        style: Style,
        focused: bool,
    ) -> Result<()> {
        let face_style = if focused { style.reverse(true) } else { style };
        let middle = area.height / 2;
        let face = self.face();
        for row in 0..area.height {
            let y = area.y + row;
            if row == middle {
                let face_width = text_width(&face).min(area.width);
                let offset = TextAlign::Center.offset(area.width, face_width);
                let tail = area.width - offset - face_width;
                // Padding keeps the widget style, only the face is highlighted
                canvas.put_str(area.x, y, &" ".repeat(offset as usize), style)?;
                canvas.put_str(
                    area.x + offset,
                    y,
                    &fit_line(&face, face_width, TextAlign::Left),
                    face_style,
                )?;
                canvas.put_str(
                    area.x + offset + face_width,
                    y,
                    &" ".repeat(tail as usize),
                    style,
                )?;
            } else {
                canvas.put_str(area.x, y, &" ".repeat(area.width as usize), style)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_face_size() {
        assert_eq!(Button::new("OK").natural_size(), (6, 1));
    }

    #[test]
    fn test_enter_and_space_press() {
        let hits = Rc::new(Cell::new(0));
        let mut button = Button::new("Go");
        let h = hits.clone();
        button.pressed.connect(move |_| h.set(h.get() + 1));

        assert!(button.handle_key(&EventKind::NavigationKey {
            key_code: 0x0D,
            key: NavKey::Enter
        }));
        assert!(button.handle_key(&EventKind::PrintableChar {
            key: ' ',
            shift: false
        }));
        assert!(!button.handle_key(&EventKind::PrintableChar {
            key: 'x',
            shift: false
        }));
        assert_eq!(hits.get(), 2);
    }
}
