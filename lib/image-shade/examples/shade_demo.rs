/// Shade effect example
/// Builds a red gradient test image and re-tints it with a few colours

use image::{Rgba, RgbaImage};
use image_shade::ShadeConfig;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    // Red ramp on the left, grey ramp on the right
    let mut img = RgbaImage::new(512, 256);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let v = y as u8;
        *pixel = if x < 256 {
            Rgba([v, (x / 32) as u8, 0, 255])
        } else {
            Rgba([v, v, v, 255])
        };
    }

    let img_path = output_dir.join("shade_source.png");
    img.save(&img_path)?;

    let tints = [
        (64, 64, 64, "grey"),
        (40, 90, 200, "blue"),
        (30, 160, 60, "green"),
        (255, 200, 0, "gold"),
    ];

    for (r, g, b, name) in tints {
        let filename = format!("shade_{}.png", name);
        image_shade::shade_image_file(
            &img_path,
            output_dir.join(&filename),
            &ShadeConfig::from_rgb(r, g, b),
        )?;
        println!("✓ Generated {}", filename);
    }

    println!("\n✓ All shade effects applied successfully!");
    println!("  Images saved to: tmp/");

    Ok(())
}
