use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::{AssetError, ImageStore, LevelError};
use crate::world::{RenderList, Vec2};
use crate::StartupError;

use super::input::{ActionStates, PressEdge};
use super::metrics::MetricsAccumulator;
use super::rendering::{Renderer, Viewport};
use super::{InputAction, InputSnapshot, Scene, SceneCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Size of the framebuffer scenes draw into; scaled up to the window.
    pub display_width: u32,
    pub display_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "ninja game".to_string(),
            window_width: 640,
            window_height: 480,
            display_width: 320,
            display_height: 240,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: Some(60),
        }
    }
}

impl LoopConfig {
    pub fn display(&self) -> Viewport {
        Viewport::new(self.display_width, self.display_height)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    images: ImageStore,
    mut scene: Box<dyn Scene>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let display_size = config.display();
    let mut renderer =
        Renderer::new(Arc::clone(&window), display_size).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::new();

    scene.load();
    info!(images = images.len(), "scene_loaded");
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        display_width = display_size.width,
        display_height = display_size.height,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;
    let mut render_list = RenderList::new();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize_surface(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    input_collector.handle_mouse_wheel(delta);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.update_from_physical_key(
                        event.physical_key,
                        event.state == ElementState::Pressed,
                    );
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector
                            .snapshot_for_tick(|position| renderer.window_to_display_px(position));
                        let command = scene.update(&input_snapshot);
                        metrics_accumulator.record_tick();
                        if command == SceneCommand::Quit {
                            info!(reason = "scene_command", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        metrics_accumulator.record_clamp();
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    render_list.clear();
                    scene.render(&mut render_list);
                    if let Err(error) = renderer.render(&images, &render_list) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            clamped_frames = snapshot.clamped_frames,
                            draw_commands = render_list.len(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    jump: PressEdge,
    grid_toggle: PressEdge,
    save: PressEdge,
    left_mouse: PressEdge,
    right_mouse: PressEdge,
    pending_wheel_steps: i32,
    /// Raw window-space position; converted to display pixels per snapshot.
    cursor_position_px: Option<Vec2>,
}

impl InputCollector {
    fn new() -> Self {
        Self {
            quit_requested: false,
            action_states: ActionStates::default(),
            jump: PressEdge::default(),
            grid_toggle: PressEdge::default(),
            save: PressEdge::default(),
            left_mouse: PressEdge::default(),
            right_mouse: PressEdge::default(),
            pending_wheel_steps: 0,
            cursor_position_px: None,
        }
    }

    fn snapshot_for_tick(&mut self, to_display: impl Fn(Vec2) -> Option<Vec2>) -> InputSnapshot {
        let cursor = self.cursor_position_px.and_then(to_display);
        let mut snapshot = InputSnapshot::empty()
            .with_quit_requested(self.quit_requested)
            .with_jump_pressed(self.jump.take())
            .with_grid_toggle_pressed(self.grid_toggle.take())
            .with_save_pressed(self.save.take())
            .with_cursor_position_px(cursor)
            .with_left_mouse(self.left_mouse.is_down(), self.left_mouse.take())
            .with_right_mouse(self.right_mouse.is_down(), self.right_mouse.take())
            .with_wheel_steps(std::mem::take(&mut self.pending_wheel_steps));
        for action in [
            InputAction::MoveUp,
            InputAction::MoveDown,
            InputAction::MoveLeft,
            InputAction::MoveRight,
            InputAction::Shift,
            InputAction::Quit,
        ] {
            snapshot = snapshot.with_action_down(action, self.action_states.is_down(action));
        }
        snapshot
    }

    fn update_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
                self.jump.update(is_pressed);
            }
            KeyCode::Space => self.jump.update(is_pressed),
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                self.action_states.set(InputAction::Shift, is_pressed);
            }
            KeyCode::KeyG => self.grid_toggle.update(is_pressed),
            KeyCode::KeyO => self.save.update(is_pressed),
            KeyCode::Escape => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2::new(x, y));
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        let steps = wheel_steps_from_scroll_delta(delta);
        self.pending_wheel_steps = self.pending_wheel_steps.saturating_add(steps);
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left_mouse.update(is_pressed),
            MouseButton::Right => self.right_mouse.update(is_pressed),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    // Whatever a capped frame could not simulate is dropped, not carried.
    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

fn wheel_steps_from_scroll_delta(delta: MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
        MouseScrollDelta::PixelDelta(position) => {
            if position.y > 0.0 {
                1
            } else if position.y < 0.0 {
                -1
            } else {
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::app::rendering::window_to_display_px;

    const DISPLAY: Viewport = Viewport::new(320, 240);

    fn collector() -> InputCollector {
        InputCollector::new()
    }

    fn double_scale(window_px: Vec2) -> Option<Vec2> {
        window_to_display_px(window_px, Viewport::new(640, 480), DISPLAY)
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(50), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn jump_keys_are_edge_triggered_for_single_tick() {
        let mut input = collector();

        input.update_from_physical_key(PhysicalKey::Code(KeyCode::Space), true);
        let first = input.snapshot_for_tick(double_scale);
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::Space), true);
        let held = input.snapshot_for_tick(double_scale);
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::Space), false);
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::ArrowUp), true);
        let arrow = input.snapshot_for_tick(double_scale);

        assert!(first.jump_pressed());
        assert!(!held.jump_pressed());
        assert!(arrow.jump_pressed());
        assert!(arrow.is_down(InputAction::MoveUp));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = collector();

        input.update_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::ShiftLeft), true);

        let snapshot = input.snapshot_for_tick(double_scale);
        assert!(snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Shift));
        assert_eq!(snapshot.horizontal_intent(), 0.0);
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = collector();
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);

        let snapshot = input.snapshot_for_tick(double_scale);
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn editor_keys_are_edge_triggered() {
        let mut input = collector();
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::KeyG), true);
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::KeyO), true);

        let first = input.snapshot_for_tick(double_scale);
        let second = input.snapshot_for_tick(double_scale);

        assert!(first.grid_toggle_pressed());
        assert!(first.save_pressed());
        assert!(!second.grid_toggle_pressed());
        assert!(!second.save_pressed());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = collector();
        input.update_from_physical_key(PhysicalKey::Code(KeyCode::Escape), true);

        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick(double_scale).quit_requested());
    }

    #[test]
    fn held_mouse_buttons_report_down_every_tick_but_press_once() {
        let mut input = collector();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick(double_scale);
        let second = input.snapshot_for_tick(double_scale);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        let third = input.snapshot_for_tick(double_scale);

        assert!(first.left_mouse_down() && first.left_click_pressed());
        assert!(second.left_mouse_down() && !second.left_click_pressed());
        assert!(!third.left_mouse_down());
    }

    #[test]
    fn right_click_is_edge_triggered_for_single_tick() {
        let mut input = collector();
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        let first = input.snapshot_for_tick(double_scale);
        let second = input.snapshot_for_tick(double_scale);

        assert!(first.right_click_pressed());
        assert!(!second.right_click_pressed());
        assert!(second.right_mouse_down());
    }

    #[test]
    fn snapshot_scales_cursor_to_display() {
        let mut input = collector();
        input.set_cursor_position_px(100.0, 200.0);
        let snapshot = input.snapshot_for_tick(double_scale);

        let cursor = snapshot.cursor_position_px().expect("cursor");
        assert!((cursor.x - 50.0).abs() < 0.0001);
        assert!((cursor.y - 100.0).abs() < 0.0001);

        input.clear_cursor_position();
        assert!(input.snapshot_for_tick(double_scale).cursor_position_px().is_none());
    }

    #[test]
    fn cursor_on_letterboxed_window_maps_through_borders() {
        let mut input = collector();
        let window = Viewport::new(800, 600);
        let resized = |window_px: Vec2| window_to_display_px(window_px, window, DISPLAY);

        input.set_cursor_position_px(80.0, 60.0);
        let cursor = input
            .snapshot_for_tick(resized)
            .cursor_position_px()
            .expect("cursor");
        assert_eq!(cursor, Vec2::ZERO);

        input.set_cursor_position_px(40.0, 300.0);
        assert!(input.snapshot_for_tick(resized).cursor_position_px().is_none());
    }

    #[test]
    fn mouse_wheel_accumulates_and_snapshot_resets_pending() {
        let mut input = collector();
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, -2.0));

        let first = input.snapshot_for_tick(double_scale);
        let second = input.snapshot_for_tick(double_scale);

        assert_eq!(first.wheel_steps(), -1);
        assert_eq!(second.wheel_steps(), 0);
    }

    #[test]
    fn pixel_wheel_delta_maps_to_single_discrete_step_direction() {
        let positive = wheel_steps_from_scroll_delta(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 3.0),
        ));
        let negative = wheel_steps_from_scroll_delta(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, -5.0),
        ));
        let none = wheel_steps_from_scroll_delta(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 0.0),
        ));

        assert_eq!(positive, 1);
        assert_eq!(negative, -1);
        assert_eq!(none, 0);
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        let duration = target_frame_duration(Some(60)).expect("duration");
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn compute_cap_sleep_only_when_under_budget() {
        let target = target_frame_duration(Some(60));
        assert_eq!(compute_cap_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
    }
}
