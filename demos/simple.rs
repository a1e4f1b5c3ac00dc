//! Parse ZTK text, walk it with the cursors, and print it back.
//!
//! Run with: cargo run --example simple

use std::error::Error;
use ztk::Document;

const ROBOT: &str = "\
% a two-link arm
[link]
name: base
mass: 1.5
vert: 0, 0, 0

[sensor]
type: camera

[link]
name: arm
mass: 0.75
vert: 0, 0, 1
vert: 0, 0, 2
";

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = Document::new();
    doc.register_definition("link", ["name", "mass", "vert"])?;
    doc.parse_str(ROBOT)?;

    println!("{} links", doc.count_tag_occurrences("link"));
    println!("[sensor] is not registered and was dropped\n");

    let mut total = 0.0;
    if doc.rewind_tags() {
        loop {
            loop {
                if doc.is_key("mass") {
                    total += doc.take_double().unwrap_or(0.0);
                }
                if !doc.next_key() {
                    break;
                }
            }
            if !doc.next_tag() {
                break;
            }
        }
    }
    println!("total mass: {total}\n");

    println!("{doc}");
    Ok(())
}
