fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    println!("kestrel v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));

    let perft_mode = std::env::args().nth(1).as_deref() == Some("perft");

    // Launches a perft test
    if perft_mode {
        let expected_format = "Expected : perft <depth> [<record>]";
        let depth = match std::env::args().nth(2).and_then(|d| d.parse::<u32>().ok()) {
            Some(d) => d,
            None => {
                eprintln!("{}", expected_format);
                std::process::exit(2);
            }
        };
        let record = std::env::args().nth(3);

        if let Err(e) = kestrel::run_perft(depth, record) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    } else {
        // Normal UCI
        kestrel::uci::UCI::default().run()
    }
}
