//! Load and save application objects with property tables.
//!
//! Run with: cargo run --example property_table

use std::error::Error as StdError;
use std::io::{self, Write};
use ztk::{
    evaluate_keys, evaluate_tags, print_keys, print_tags, Count, Document, Error, Property,
    PropertyTable,
};

#[derive(Debug, Default)]
struct Light {
    name: String,
    color: [f64; 3],
}

#[derive(Debug, Default)]
struct Scene {
    lights: Vec<Light>,
}

const LIGHT_KEYS: [Property<Light>; 2] = [
    Property::new(
        "name",
        Count::Exact(1),
        Some(|light, _, doc| {
            light.name = doc
                .take_value()
                .ok_or_else(|| Error::custom("light without a name"))?;
            Ok(())
        }),
        Some(|light, _, out| Ok(write!(out, "{}", light.name)?)),
    ),
    Property::new(
        "color",
        Count::Exact(1),
        Some(|light, _, doc| {
            for c in light.color.iter_mut() {
                *c = doc.take_double().unwrap_or(0.0);
            }
            Ok(())
        }),
        Some(|light, _, out| {
            let [r, g, b] = light.color;
            Ok(write!(out, "{r}, {g}, {b}")?)
        }),
    ),
];

const SCENE_TAGS: [Property<Scene>; 1] = [Property::new(
    "light",
    Count::Any,
    Some(|scene, _, doc| {
        let mut light = Light::default();
        evaluate_keys(&mut light, doc, &LIGHT_KEYS)?;
        scene.lights.push(light);
        Ok(())
    }),
    Some(|scene, i, out| print_keys(out, &scene.lights[i], &LIGHT_KEYS)),
)];

fn main() -> Result<(), Box<dyn StdError>> {
    let mut doc = Document::new();
    doc.register_properties("light", &LIGHT_KEYS)?;
    doc.parse_str(
        "[light]\nname: key\ncolor: (1, 0.9, 0.8)\n\n[light]\nname: fill\ncolor: 0.2 0.2 0.3\n",
    )?;

    let mut scene = Scene::default();
    evaluate_tags(&mut scene, &mut doc, &SCENE_TAGS)?;
    println!("Loaded {:?}\n", scene.lights);

    let mut table = PropertyTable::new(&SCENE_TAGS);
    table.set_count("light", scene.lights.len());
    print_tags(&mut io::stdout().lock(), &scene, &table)?;

    Ok(())
}
