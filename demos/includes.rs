//! Split a description over several files with `include`.
//!
//! Run with: cargo run --example includes

use std::error::Error;
use std::fs;
use ztk::{Document, ZtkOptions};

fn main() -> Result<(), Box<dyn Error>> {
    let dir = std::env::temp_dir().join("ztk-includes-demo");
    fs::create_dir_all(dir.join("parts"))?;
    fs::write(dir.join("parts/wheel.ztk"), "[part]\nname: wheel\ncount: 4\n")?;
    fs::write(
        dir.join("parts/body.ztk"),
        "[part]\nname: body\ncount: 1\ninclude wheel\n",
    )?;
    // "car" includes itself through parts/loop.ztk; the cycle is refused.
    fs::write(dir.join("parts/loop.ztk"), "include ../car.ztk\n")?;
    fs::write(
        dir.join("car.ztk"),
        "% top level\ninclude parts/body.ztk\ninclude parts/loop.ztk\n",
    )?;

    let options = ZtkOptions::new()
        .with_relative_includes(true)
        .with_collect_discarded(true);
    let mut doc = Document::with_options(options);
    doc.register_definition("part", ["name", "count"])?;
    doc.parse_file(dir.join("car"))?;

    println!("{doc}");
    for skipped in doc.discarded() {
        println!(
            "skipped {:?} {:?} at {}:{}",
            skipped.kind,
            skipped.text,
            skipped.source.display(),
            skipped.line
        );
    }

    fs::remove_dir_all(&dir)?;
    Ok(())
}
