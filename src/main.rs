fn main() {
    if let Err(err) = neon_rs_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
