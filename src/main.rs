fn main() {
    if let Err(err) = physio_prep::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
