fn main() {
    rift_arena::game::run();
}
