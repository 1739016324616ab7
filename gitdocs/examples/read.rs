//! Read a document tree from a remote and print it.
//! Usage: cargo run --example read -- <checkout_dir> <remote_url> <version> [path]

use gitdocs::{DocStore, OpenOptions};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: read <checkout_dir> <remote_url> <version> [path]");
        std::process::exit(1);
    }

    let checkout = &args[1];
    let remote = &args[2];
    let version = &args[3];
    let path = args.get(4).map(String::as_str).unwrap_or("");

    let store = DocStore::open(
        checkout,
        OpenOptions {
            url: Some(remote.clone()),
            ..Default::default()
        },
    )
    .unwrap_or_else(|e| {
        eprintln!("open failed: {e}");
        std::process::exit(1);
    });

    match store.get_object(version, path) {
        Ok(Some(value)) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap());
        }
        Ok(None) => {
            eprintln!("not found: {path}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("read failed: {e}");
            std::process::exit(1);
        }
    }
}
