fn main() {
    rulecraft::cli::run();
}
