fn main() {
    if let Err(err) = tubesheet_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
