fn main() {
    if let Err(err) = codeshot::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
