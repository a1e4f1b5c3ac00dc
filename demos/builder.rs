//! Build a document in code and write it out.
//!
//! Run with: cargo run --example builder

use std::error::Error;
use ztk::{ztk, Document};

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = Document::new();
    doc.add_tag("shape");
    doc.add_key("name")?;
    doc.add_value("unit box")?;
    doc.add_key("size")?;
    doc.add_double(1.0)?;
    doc.add_double(2.5)?;
    doc.add_key("faces")?;
    doc.add_int(6)?;

    println!("Built with the cursor API:\n{doc}");

    let same = ztk! {
        "shape" => {
            "name" => ["unit box"],
            "size" => [1, 2.5],
            "faces" => [6],
        },
    };
    assert_eq!(doc.tags(), same.tags());
    println!("✓ ztk! builds the same document");

    let mut out = Vec::new();
    ztk::to_writer(&mut out, &same)?;
    let text = String::from_utf8(out)?;
    let parsed = ztk::from_str(&text, &[("shape", &["name", "size", "faces"][..])])?;
    assert_eq!(parsed.tags(), same.tags());
    println!("✓ Round-trip successful");

    Ok(())
}
