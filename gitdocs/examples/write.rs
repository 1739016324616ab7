//! Replace the documents under a path with JSON files from disk.
//! Usage: cargo run --example write -- <checkout_dir> <remote_url> <parent> <path> <file.json>...

use std::collections::BTreeMap;
use std::path::Path;

use gitdocs::{DocStore, OpenOptions, WriteRequest};
use serde_json::Value;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 6 {
        eprintln!("Usage: write <checkout_dir> <remote_url> <parent> <path> <file.json>...");
        std::process::exit(1);
    }

    let checkout = &args[1];
    let remote = &args[2];
    let parent = &args[3];
    let target = &args[4];

    let mut files: BTreeMap<String, Value> = BTreeMap::new();
    for file in &args[5..] {
        let name = Path::new(file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_else(|| {
                eprintln!("bad file name: {file}");
                std::process::exit(1);
            });
        let text = std::fs::read_to_string(file).unwrap_or_else(|e| {
            eprintln!("{file}: {e}");
            std::process::exit(1);
        });
        let doc: Value = serde_json::from_str(&text).unwrap_or_else(|e| {
            eprintln!("{file}: {e}");
            std::process::exit(1);
        });
        files.insert(name.to_string(), doc);
    }

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

    match store.write(&WriteRequest {
        parent: parent.clone(),
        update_branch: None,
        path: target.clone(),
        files,
    }) {
        Ok(commit) => println!("{commit}"),
        Err(e) => {
            eprintln!("write failed: {e}");
            std::process::exit(1);
        }
    }
}
