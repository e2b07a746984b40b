use learn_gl::scene::SceneKind;

fn main() {
    learn_gl::tutorial_main(SceneKind::Quad)
}
