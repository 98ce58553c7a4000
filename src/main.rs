fn main() {
    std::process::exit(reposift::app::startup::startup());
}
