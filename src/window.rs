use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::EventLoop,
    window::Window,
};

use crate::{
    demo::DemoState,
    engine,
    interaction::{Hand, SelectEvent, TargetRayMode},
    rendering::renderer::Renderer,
};

struct App {
    renderer: Option<Renderer>,
    demo_state: DemoState,
    mouse_pos: Vec2,
    last_frame: Instant,
}

impl App {
    fn from_demo_state(demo_state: DemoState) -> Self {
        Self {
            renderer: None,
            demo_state,
            mouse_pos: Vec2::ZERO,
            last_frame: Instant::now(),
        }
    }

    /// Desktop stand-in for the XR input sources: the mouse buttons drive the
    /// two controllers' select events.
    fn select_event_for(button: MouseButton) -> Option<SelectEvent> {
        let hand = match button {
            MouseButton::Left => Hand::Left,
            MouseButton::Right => Hand::Right,
            _ => return None,
        };

        Some(SelectEvent {
            hand,
            target_ray_mode: TargetRayMode::Screen,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let window_attributes = Window::default_attributes().with_title("molroom");
        let window = event_loop.create_window(window_attributes).unwrap();

        let renderer = pollster::block_on(Renderer::new(Arc::new(window), &self.demo_state)).unwrap();
        self.renderer = Some(renderer);

        self.renderer
            .as_mut()
            .unwrap()
            .upload_meshes(&mut self.demo_state);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.renderer.as_mut().unwrap().resize(new_size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(select_event) = Self::select_event_for(button) {
                    match state {
                        ElementState::Pressed => self.demo_state.select_start(select_event),
                        ElementState::Released => self.demo_state.select_end(select_event),
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let delta_time = self.last_frame.elapsed();
                self.last_frame = Instant::now();

                let renderer = self.renderer.as_mut().unwrap();
                renderer.window.request_redraw();

                let resolution = Vec2::new(renderer.size.width as f32, renderer.size.height as f32);
                self.demo_state.aim_controllers(self.mouse_pos, resolution);

                engine::update(&mut self.demo_state, delta_time.as_secs_f32());

                match renderer.render(&mut self.demo_state) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.resize(renderer.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Timeout");
                    }
                    Err(other) => {
                        log::error!("Unexpected error: {:?}", other);
                    }
                }
            }
            _ => (),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state = DemoState::new();
    let mut app = App::from_demo_state(demo_state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
