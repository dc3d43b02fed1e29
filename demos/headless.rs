use gosub_viewhost::config::HostConfig;
use gosub_viewhost::engine::backends::null::NullRuntime;
use gosub_viewhost::engine::{ChildKind, Modifiers, ViewSignal};
use gosub_viewhost::geometry::{Rect, Size};
use gosub_viewhost::host::headless::{HeadlessCanvas, HeadlessWindowFactory};
use gosub_viewhost::host::{HostApp, HostInput, HostMouseButton, PaintOutcome, WindowEvent};
use gosub_viewhost::HostError;
use url::Url;

fn main() -> Result<(), HostError> {
    // Configure the host through the config builder. The data path is where the session keeps
    // its cache; without one, a Cache directory next to the executable is used.
    let data_path = std::env::temp_dir().join("gosub-viewhost-demo");
    let config = HostConfig::builder()
        .data_path(data_path.clone())
        .start_page("https://gosub.io")
        .accept_languages("en-US,en;q=0.9")
        .build()
        .expect("Configuration is not valid");

    // The runtime log level is the default filter; RUST_LOG still wins.
    env_logger::Builder::new()
        .filter_level(config.runtime.log_level.as_filter())
        .parse_default_env()
        .init();

    // The null runtime does not load any content but paints every view with a solid colour,
    // and the headless factory creates windows that only record what they were told. Keep
    // clones around so we can look inside after handing them to the app.
    let runtime = NullRuntime::new().with_fill([0x33, 0x66, 0x99, 0xff]);
    let factory = HeadlessWindowFactory::new();
    let mut app = HostApp::new(config, Box::new(runtime.clone()), Box::new(factory.clone()))?;

    // Opening the first window starts the runtime and creates the session.
    let main = app.open_window(None)?;
    println!("runtime running: {}", app.is_runtime_running());

    // One event loop turn turns surface updates into invalidations. The toolkit would then
    // ask us to paint.
    app.pump();
    println!("invalidated regions: {:?}", factory.take_invalidations(main));

    let mut canvas = HeadlessCanvas::new();
    if app.paint(main, &mut canvas) == PaintOutcome::Painted {
        if let Some(image) = &canvas.image {
            let path = data_path.join("main.png");
            match image.write_png(&path) {
                Ok(()) => println!("wrote {}", path.display()),
                Err(e) => println!("cannot write snapshot: {e:#}"),
            }
        }
    }

    // Simulate a little user input (mouse move + click at 100,100, then a typed character)
    for input in [
        HostInput::MouseMove { x: 100, y: 100 },
        HostInput::MouseDown { button: HostMouseButton::Left },
        HostInput::MouseUp { button: HostMouseButton::Left },
        HostInput::KeyPress { ch: 'g', modifiers: Modifiers::empty() },
    ] {
        app.dispatch(main, WindowEvent::Input(input));
    }

    // Minimizing the window suspends rendering; restoring it resumes.
    app.dispatch(main, WindowEvent::Resized(Size::new(0, 0)));
    app.dispatch(main, WindowEvent::Resized(Size::new(800, 600)));

    // Let the page open a popup with a requested geometry. The spawner wraps the new view in
    // a tool window at that position.
    let parent = app
        .window(main)
        .and_then(|w| w.view_host())
        .map(|v| v.id())
        .expect("main window has a view");
    let target = Url::parse("https://gosub.io/popup").expect("valid url");
    let popup_view = runtime
        .request_child(parent, ChildKind::Popup, Some(Rect::from_xywh(200, 150, 320, 240)), target)
        .expect("parent view exists");
    app.pump();
    println!("open windows after popup: {}", app.open_windows());

    // The popup asks to be closed (window.close() in the page).
    runtime.emit(popup_view, ViewSignal::CloseRequested);
    app.pump();
    println!("open windows after close request: {}", app.open_windows());

    // Closing the last window shuts the runtime down.
    app.dispatch(main, WindowEvent::Closed);
    println!("runtime running: {}", app.is_runtime_running());

    Ok(())
}
