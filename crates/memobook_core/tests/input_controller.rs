use memobook_core::window::{
    InputPanelController, InputSettings, PanelBounds, QueuedHost, WindowCommand, WindowRole,
    WorkArea,
};

fn setup() -> (QueuedHost, InputPanelController) {
    (
        QueuedHost::new(WorkArea::new(1920, 1080)),
        InputPanelController::new(InputSettings::default()),
    )
}

#[test]
fn show_creates_one_centered_borderless_topmost_window() {
    let (mut host, mut input) = setup();

    input.show(&mut host).unwrap();

    let window = input.window_id().unwrap();
    let effects = host.drain();
    match effects[0] {
        WindowCommand::Create { window: w, spec } => {
            assert_eq!(w, window);
            assert_eq!(spec.role, WindowRole::Input);
            assert_eq!(spec.bounds, PanelBounds::new(760, 440, 400, 200));
            assert!(spec.frameless);
            assert!(spec.always_on_top);
        }
        ref other => panic!("unexpected first effect: {other:?}"),
    }
    assert_eq!(effects[1..], [
        WindowCommand::Show { window },
        WindowCommand::Focus { window },
    ]);
}

#[test]
fn second_show_focuses_existing_window() {
    let (mut host, mut input) = setup();
    input.show(&mut host).unwrap();
    let window = input.window_id().unwrap();
    host.drain();

    input.show(&mut host).unwrap();

    assert_eq!(host.drain(), vec![WindowCommand::Focus { window }]);
    assert_eq!(host.live_window_count(), 1);
}

#[test]
fn blur_destroys_and_next_show_starts_fresh() {
    let (mut host, mut input) = setup();
    input.show(&mut host).unwrap();
    let first = input.window_id().unwrap();
    host.drain();

    input.blur(&mut host);

    assert!(!input.is_open());
    assert_eq!(host.drain(), vec![WindowCommand::Destroy { window: first }]);

    input.show(&mut host).unwrap();
    assert_ne!(input.window_id(), Some(first));
    assert_eq!(host.live_window_count(), 1);
}

#[test]
fn dismiss_without_window_is_a_noop() {
    let (mut host, mut input) = setup();
    input.dismiss(&mut host);
    assert!(host.drain().is_empty());
}

#[test]
fn host_closed_window_clears_reference_only() {
    let (mut host, mut input) = setup();
    input.show(&mut host).unwrap();
    let window = input.window_id().unwrap();
    host.drain();

    assert!(!input.window_closed(&mut host, window + 5));
    assert!(input.window_closed(&mut host, window));

    assert!(!input.is_open());
    assert!(host.drain().is_empty());
    assert_eq!(host.live_window_count(), 0);
}

#[test]
fn centering_follows_the_work_area() {
    let mut host = QueuedHost::new(WorkArea::new(1280, 800));
    let mut input = InputPanelController::new(InputSettings {
        width: 480,
        height: 120,
    });

    input.show(&mut host).unwrap();

    match host.drain()[0] {
        WindowCommand::Create { spec, .. } => {
            assert_eq!(spec.bounds, PanelBounds::new(400, 340, 480, 120));
        }
        ref other => panic!("unexpected first effect: {other:?}"),
    }
}
