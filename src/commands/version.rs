//! Version command

/// Run the version command.
pub fn run() {
    println!("apiary {}", env!("CARGO_PKG_VERSION"));
}
