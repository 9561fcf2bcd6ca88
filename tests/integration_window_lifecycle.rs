use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use retro_desk::applets::{
    Applet, AppletArgs, AppletContext, AppletEntry, AppletHost, AppletRegistry, CANVAS, DesktopRequest,
    NUMPAD, TEXT_PAD, TIMER,
};
use retro_desk::component_context::ComponentContext;
use retro_desk::config::DesktopConfig;
use retro_desk::error::{AppletError, WmError};
use retro_desk::ui::UiFrame;
use retro_desk::window::{OpenOptions, Visibility, WindowManager};

fn manager_with(registry: AppletRegistry, config: &DesktopConfig) -> WindowManager {
    let mut wm = WindowManager::with_config(registry, config);
    let desktop = wm.taskbar_mut().split_area(Rect::new(0, 0, 100, 30));
    wm.set_area(desktop);
    wm
}

fn manager() -> WindowManager {
    manager_with(AppletRegistry::with_defaults(), &DesktopConfig::default())
}

fn left_click(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

#[test]
fn reopening_from_icon_focuses_then_close_clears_everything() {
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager();

    let first_index = wm.next_stack_index();
    let pad = wm.open(TEXT_PAD, OpenOptions::desktop(), &mut host, t0).unwrap();
    assert_eq!(wm.window(pad).unwrap().stack_index(), first_index);

    let again = wm.open(TEXT_PAD, OpenOptions::desktop(), &mut host, t0).unwrap();
    assert_eq!(again, pad);
    assert_eq!(wm.len(), 1);
    assert_eq!(wm.window(pad).unwrap().stack_index(), first_index + 1);

    wm.close(pad).unwrap();
    assert!(wm.is_empty());
    assert!(wm.taskbar().is_empty());
}

#[test]
fn taskbar_click_restores_minimized_canvas_in_place() {
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager();
    let other = wm.open(NUMPAD, OpenOptions::desktop(), &mut host, t0).unwrap();
    let canvas = wm.open(CANVAS, OpenOptions::desktop().at(30, 4), &mut host, t0).unwrap();
    let position = wm.window(canvas).unwrap().position();

    wm.minimize(canvas, t0).unwrap();
    assert_eq!(wm.window(canvas).unwrap().visibility(), Visibility::Minimized);
    assert!(!wm.is_revealed(canvas, t0));
    assert_eq!(wm.focused(), Some(other));

    let entry = wm.taskbar().entry_rect(canvas).unwrap();
    let t1 = t0 + Duration::from_secs(1);
    assert!(wm.handle_event(&left_click(entry.x, entry.y), &mut host, t1));

    let window = wm.window(canvas).unwrap();
    assert_eq!(window.visibility(), Visibility::Open);
    assert_eq!(window.position(), position);
    assert_eq!(wm.focused(), Some(canvas));
    assert!(window.stack_index() > wm.window(other).unwrap().stack_index());
    assert!(!wm.taskbar().entry(canvas).unwrap().minimized);

    // Drawn only once the restore animation lands.
    assert!(!wm.is_revealed(canvas, t1));
    assert!(wm.is_revealed(canvas, t1 + Duration::from_millis(300)));
}

#[test]
fn indirect_launches_are_not_unique() {
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager();
    let doc = |name: &str| AppletArgs::Document {
        name: name.into(),
        body: "text".into(),
    };
    let a = wm
        .open(TEXT_PAD, OpenOptions::spawned().with_title("a.txt").with_args(doc("a.txt")), &mut host, t0)
        .unwrap();
    let b = wm
        .open(TEXT_PAD, OpenOptions::spawned().with_title("b.txt").with_args(doc("b.txt")), &mut host, t0)
        .unwrap();
    let from_icon = wm.open(TEXT_PAD, OpenOptions::desktop(), &mut host, t0).unwrap();
    assert_ne!(a, b);
    assert_ne!(from_icon, a);
    assert_eq!(wm.handles_for(TEXT_PAD).len(), 3);
    assert_eq!(wm.window(a).unwrap().title(), "a.txt");
    assert_eq!(wm.window(from_icon).unwrap().title(), TEXT_PAD);
}

#[test]
fn one_taskbar_entry_per_window() {
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager();
    let handles: Vec<_> = [NUMPAD, TIMER, CANVAS]
        .into_iter()
        .map(|app| wm.open(app, OpenOptions::desktop(), &mut host, t0).unwrap())
        .collect();
    let labels: Vec<_> = wm.taskbar().entries().iter().map(|e| e.label.clone()).collect();
    assert_eq!(labels, vec![NUMPAD, TIMER, CANVAS]);

    wm.close(handles[1]).unwrap();
    let remaining: Vec<_> = wm.taskbar().entries().iter().map(|e| e.handle).collect();
    assert_eq!(remaining, vec![handles[0], handles[2]]);
}

#[test]
fn closed_handle_is_invalid_everywhere() {
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager();
    let timer = wm.open(TIMER, OpenOptions::desktop(), &mut host, t0).unwrap();
    wm.close(timer).unwrap();

    assert_eq!(wm.focus(timer), Err(WmError::InvalidHandle(timer)));
    assert_eq!(wm.minimize(timer, t0), Err(WmError::InvalidHandle(timer)));
    assert_eq!(wm.restore(timer, t0), Err(WmError::InvalidHandle(timer)));
    assert_eq!(wm.close(timer), Err(WmError::InvalidHandle(timer)));
    assert_eq!(wm.begin_drag(timer, 0, 0), Err(WmError::InvalidHandle(timer)));
    assert!(wm.taskbar().entry(timer).is_none());

    let reopened = wm.open(TIMER, OpenOptions::desktop(), &mut host, t0).unwrap();
    assert_ne!(reopened, timer);
}

#[test]
fn focus_strictly_increases_stacking() {
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager();
    let a = wm.open(NUMPAD, OpenOptions::desktop(), &mut host, t0).unwrap();
    let b = wm.open(TIMER, OpenOptions::desktop(), &mut host, t0).unwrap();
    let before = wm.window(b).unwrap().stack_index();
    let raised = wm.focus(a).unwrap();
    assert!(raised > before);
    assert_eq!(wm.focused(), Some(a));
    assert_eq!(wm.stacking_order(), vec![b, a]);
}

#[test]
fn drag_applies_latest_sample_once_per_interval() {
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager();
    let canvas = wm.open(CANVAS, OpenOptions::desktop().at(16, 1), &mut host, t0).unwrap();

    assert_eq!(wm.move_window(canvas, 1, 0), Err(WmError::NoActiveDrag(canvas)));

    wm.begin_drag(canvas, 20, 1).unwrap();
    wm.drag_to(22, 1, t0);
    wm.drag_to(25, 3, t0 + Duration::from_millis(10));
    assert_eq!(wm.window(canvas).unwrap().position(), (16, 1));

    wm.drag_to(30, 4, t0 + Duration::from_millis(50));
    assert_eq!(wm.window(canvas).unwrap().position(), (26, 4));

    // Releasing drops the pending sample even once its interval is over.
    wm.drag_to(40, 4, t0 + Duration::from_millis(60));
    wm.end_drag();
    wm.tick(&mut host, t0 + Duration::from_millis(200));
    assert_eq!(wm.window(canvas).unwrap().position(), (26, 4));
    assert!(wm.drag().is_none());
}

#[derive(Debug)]
struct Broken;

impl Applet for Broken {
    fn init(&mut self, _cx: &mut AppletContext<'_>) -> Result<(), AppletError> {
        Err(AppletError::Init("no sound card".into()))
    }

    fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ComponentContext<'_>) {}
}

fn broken(_args: &AppletArgs) -> Box<dyn Applet> {
    Box::new(Broken)
}

#[test]
fn failing_init_keeps_window_and_reports() {
    let mut registry = AppletRegistry::with_defaults();
    registry.register(AppletEntry {
        name: "Broken",
        icon: "[!]",
        size: (20, 6),
        create: broken,
    });
    let t0 = Instant::now();
    let mut host = AppletHost::default();
    let mut wm = manager_with(registry, &DesktopConfig::default());
    let handle = wm.open("Broken", OpenOptions::desktop(), &mut host, t0).unwrap();
    assert!(wm.contains(handle));
    assert!(matches!(
        host.requests(),
        [DesktopRequest::ShowDialog { title, body }] if title == "Error" && body.contains("no sound card")
    ));
}

#[test]
fn unknown_app_is_rejected() {
    let mut host = AppletHost::default();
    let mut wm = manager();
    let err = wm
        .open("Solitaire", OpenOptions::desktop(), &mut host, Instant::now())
        .unwrap_err();
    assert_eq!(err, WmError::UnknownApp("Solitaire".into()));
    assert!(wm.refresh("Solitaire", &mut host, Instant::now()).is_err());
}
