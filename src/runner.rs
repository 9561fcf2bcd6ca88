//! Glue between the event loop, the output driver and the desktop.

use std::io;
use std::time::{Duration, Instant};

use crate::desktop::Desktop;
use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};

/// Hands outbound URLs (searches, `mailto:` links, the creator site) to
/// something outside the terminal.
pub trait UrlLauncher {
    fn launch(&mut self, url: &str) -> io::Result<()>;
}

/// Opens URLs in the user's default browser or mail client.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl UrlLauncher for SystemBrowser {
    fn launch(&mut self, url: &str) -> io::Result<()> {
        webbrowser::open(url)
    }
}

/// Keeps every URL it is given. Useful wherever a browser must not open.
#[derive(Debug, Default, Clone)]
pub struct RecordingLauncher {
    pub urls: Vec<String>,
}

impl UrlLauncher for RecordingLauncher {
    fn launch(&mut self, url: &str) -> io::Result<()> {
        self.urls.push(url.to_string());
        Ok(())
    }
}

fn launch_outbound<L: UrlLauncher>(desktop: &mut Desktop, launcher: &mut L) {
    for url in desktop.take_outbound_urls() {
        if let Err(err) = launcher.launch(&url) {
            tracing::warn!(url, error = %err, "failed to open url");
            desktop
                .dialog_mut()
                .show("Error", format!("Could not open {url}: {err}"));
        }
    }
}

/// Run `desktop` until it asks to quit.
///
/// Each loop iteration ticks the desktop and draws a frame; input events
/// are routed between ticks. The output driver is entered for the duration
/// of the run and left again on the way out, also on error.
pub fn run_desktop<O, D, L>(
    output: &mut O,
    input: D,
    desktop: &mut Desktop,
    launcher: &mut L,
    poll_interval: Duration,
) -> io::Result<()>
where
    O: OutputDriver,
    D: InputDriver,
    L: UrlLauncher,
{
    output.enter()?;
    let mut event_loop = EventLoop::new(input, poll_interval);
    let result = event_loop.driver().set_mouse_capture(true).and_then(|()| {
        event_loop.run(|_, event| {
            let now = Instant::now();
            match event {
                Some(event) => {
                    desktop.handle_event(&event, now);
                }
                None => {
                    desktop.tick(now);
                    output.draw(|frame| desktop.render(frame, now))?;
                }
            }
            launch_outbound(desktop, launcher);
            Ok(if desktop.should_quit() {
                ControlFlow::Quit
            } else {
                ControlFlow::Continue
            })
        })
    });
    let exited = output.exit();
    result.and(exited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applets::DesktopRequest;
    use crate::config::DesktopConfig;

    struct FailingLauncher;

    impl UrlLauncher for FailingLauncher {
        fn launch(&mut self, _url: &str) -> io::Result<()> {
            Err(io::Error::other("no browser"))
        }
    }

    #[test]
    fn failed_launch_shows_dialog() {
        let mut desktop = Desktop::new(DesktopConfig::default(), Instant::now());
        desktop
            .host_mut()
            .push(DesktopRequest::OpenUrl("https://example.com".into()));
        desktop.process_requests(Instant::now());
        launch_outbound(&mut desktop, &mut FailingLauncher);
        assert!(desktop.dialog().is_visible());
        assert_eq!(desktop.dialog().title(), "Error");
        assert!(desktop.dialog().body().contains("https://example.com"));
    }

    #[test]
    fn recorded_urls_leave_desktop_queue() {
        let mut desktop = Desktop::new(DesktopConfig::default(), Instant::now());
        desktop
            .host_mut()
            .push(DesktopRequest::OpenUrl("mailto:someone@example.com".into()));
        desktop.process_requests(Instant::now());
        let mut launcher = RecordingLauncher::default();
        launch_outbound(&mut desktop, &mut launcher);
        assert_eq!(launcher.urls, vec!["mailto:someone@example.com"]);
        assert!(desktop.take_outbound_urls().is_empty());
    }
}
