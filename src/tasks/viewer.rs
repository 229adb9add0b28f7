use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::catalog::Catalog;
use crate::config::Configuration;
use crate::events::SlideEvent;
use crate::gpu::GpuSurface;
use crate::slider::Slider;

#[derive(Debug)]
enum ViewerEvent {
    Cancelled,
}

struct ViewerApp {
    cfg: Configuration,
    catalog: Catalog,
    cancel: CancellationToken,
    window: Option<Arc<Window>>,
    slider: Option<Slider<GpuSurface>>,
    origin: Instant,
}

impl ViewerApp {
    fn new(cfg: Configuration, catalog: Catalog, cancel: CancellationToken) -> Self {
        Self {
            cfg,
            catalog,
            cancel,
            window: None,
            slider: None,
            origin: Instant::now(),
        }
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attrs = WindowAttributes::default().with_title(self.cfg.window_title.clone());
        if self.cfg.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create slider window")?,
        );
        let surface = GpuSurface::new(window.clone(), &self.catalog)?;
        let atlas = surface.atlas();
        let size = surface.size();
        self.origin = Instant::now();
        self.slider = Some(Slider::mount(
            self.catalog.clone(),
            atlas,
            surface,
            size,
            self.cfg.slider_settings(),
            Duration::ZERO,
        ));
        self.window = Some(window);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let now = self.now();
        let Some(slider) = self.slider.as_mut() else {
            return;
        };
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Named(NamedKey::ArrowRight | NamedKey::Space) => {
                let _ = slider.next(now);
            }
            Key::Named(NamedKey::ArrowLeft) => {
                let len = slider.catalog().len();
                let prev = (slider.pagination().active() + len - 1) % len;
                let _ = slider.go_to_slide(prev, now);
            }
            Key::Character(c) => {
                if let Some(digit) = c.chars().next().and_then(|ch| ch.to_digit(10)) {
                    if digit > 0 {
                        let _ = slider.go_to_slide(digit as usize - 1, now);
                    }
                }
            }
            _ => {}
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.now();
        let Some(slider) = self.slider.as_mut() else {
            return;
        };
        match slider.tick(now) {
            Ok(events) => {
                for event in events {
                    if let SlideEvent::SlideCommitted(index) = event {
                        if let Some(slide) = slider.catalog().get(index) {
                            info!(index, title = %slide.title, "now showing");
                        }
                    }
                }
            }
            Err(err) => {
                error!(error = ?err, "frame failed; closing slider");
                event_loop.exit();
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(slider) = self.slider.as_mut() {
            slider.unmount();
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }
        if self.slider.is_some() {
            return;
        }
        if let Err(err) = self.mount(event_loop) {
            error!(error = ?err, "failed to initialize slider");
            event_loop.exit();
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("slider window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let now = self.now();
                if let Some(slider) = self.slider.as_mut() {
                    slider.resize(size.width, size.height, now);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Cancelled => {
                info!("slider received cancellation event");
                event_loop.exit();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Open a window and run the slider until it is closed or `cancel` fires.
pub fn run_windowed(cfg: Configuration, catalog: Catalog, cancel: CancellationToken) -> Result<()> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build slider event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(cfg, catalog, cancel);
    let run_result = event_loop.run_app(&mut app);
    cancel_task.abort();

    run_result.context("slider event loop failed")
}
