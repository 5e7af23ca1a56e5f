use crate::demo::DemoState;

pub fn update(state: &mut DemoState, dt: f32) {
    state.update(dt);
    state.scene.late_update();
}
