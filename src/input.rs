use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use std::time::Duration;

const MAX_EVENTS_PER_FRAME: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    TogglePause,
    ToggleHud,
    /// Pointer press at a terminal cell.
    Burst { col: u16, row: u16 },
    /// Burst in the middle of the tank, for terminals without mouse reporting.
    BurstCentre,
    Resized { cols: u16, rows: u16 },
}

pub(crate) fn collect_actions(max_frame_time: Duration) -> anyhow::Result<Vec<Action>> {
    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    drain(|| event::poll(timeout), event::read)
}

/// Reads at most `MAX_EVENTS_PER_FRAME` events, mapped or not, so a flood of
/// mouse motion cannot stall the frame.
fn drain<P, R>(mut poll: P, mut read: R) -> anyhow::Result<Vec<Action>>
where
    P: FnMut() -> std::io::Result<bool>,
    R: FnMut() -> std::io::Result<Event>,
{
    let mut out = Vec::new();
    let mut seen = 0;
    while seen < MAX_EVENTS_PER_FRAME && poll()? {
        seen += 1;
        out.extend(map_event(read()?));
    }
    Ok(out)
}

pub(crate) fn map_event(ev: Event) -> Option<Action> {
    match ev {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) => {
            if kind != KeyEventKind::Press {
                return None;
            }
            match code {
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
                KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => {
                    Some(Action::TogglePause)
                }
                KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::ToggleHud),
                KeyCode::Char('b') | KeyCode::Char('B') => Some(Action::BurstCentre),
                _ => None,
            }
        }
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(_),
            column,
            row,
            ..
        }) => Some(Action::Burst { col: column, row }),
        Event::Resize(cols, rows) => Some(Action::Resized { cols, rows }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseButton;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(map_event(key(KeyCode::Char('q'), KeyModifiers::NONE)), Some(Action::Quit));
        assert_eq!(map_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Action::Quit));
        assert_eq!(map_event(key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(map_event(key(KeyCode::Char(' '), KeyModifiers::NONE)), Some(Action::TogglePause));
        assert_eq!(map_event(key(KeyCode::Char('H'), KeyModifiers::SHIFT)), Some(Action::ToggleHud));
        assert_eq!(map_event(key(KeyCode::Char('b'), KeyModifiers::NONE)), Some(Action::BurstCentre));
    }

    #[test]
    fn any_button_press_is_a_burst() {
        let ev = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(ev), Some(Action::Burst { col: 12, row: 7 }));

        let drag = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(drag), None);
    }

    #[test]
    fn motion_events_count_toward_the_frame_limit() {
        let mut events: std::collections::VecDeque<Event> = (0..100)
            .map(|i| {
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Moved,
                    column: i,
                    row: 0,
                    modifiers: KeyModifiers::NONE,
                })
            })
            .collect();
        events.push_back(key(KeyCode::Char('q'), KeyModifiers::NONE));
        let pending = std::cell::Cell::new(events.len());

        let actions = drain(
            || Ok(pending.get() > 0),
            || {
                pending.set(pending.get() - 1);
                Ok(events.pop_front().unwrap())
            },
        )
        .unwrap();
        assert!(actions.is_empty());
        assert_eq!(pending.get(), 101 - MAX_EVENTS_PER_FRAME);
    }

    #[test]
    fn resize_is_forwarded() {
        assert_eq!(map_event(Event::Resize(80, 24)), Some(Action::Resized { cols: 80, rows: 24 }));
    }
}
